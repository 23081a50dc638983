//! Property tests over randomly generated hardware

use proptest::prelude::*;
use std::collections::HashSet;

use analog_media_core::{
    reconcile, scan_devices, AudioAddress, Device, DeviceConfig, DeviceEntry, FingerprintTable,
    HardwareSnapshot, MatchSettings, RawAudioCard, Resolver, VideoGroup,
};

fn type_tag() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["USB Audio", "bcm2835 ALSA", "Analog Input", "HDA Intel PCH"])
        .prop_map(str::to_string)
}

fn audio_card() -> impl Strategy<Value = RawAudioCard> {
    (0u32..4, 0u32..2, "[A-Za-z0-9 ]{0,20}", type_tag())
        .prop_map(|(card, device, name, tag)| RawAudioCard::new(card, device, name, tag))
}

fn video_group() -> impl Strategy<Value = VideoGroup> {
    ("[A-Za-z ]{1,16}", "[a-z0-9.-]{1,12}", prop::collection::vec(0u32..6, 0..3)).prop_map(
        |(name, bus, nodes)| {
            VideoGroup::new(
                format!("{} ({})", name.trim(), bus),
                nodes.into_iter().map(|n| format!("/dev/video{}", n)),
            )
        },
    )
}

fn snapshot() -> impl Strategy<Value = HardwareSnapshot> {
    (
        prop::collection::vec(audio_card(), 0..6),
        prop::collection::vec(video_group(), 0..4),
    )
        .prop_map(|(cards, groups)| HardwareSnapshot::new(cards, groups))
}

/// Card names that must never pair with the "AV Grabber" group, including
/// other bracketed camera microphones
fn unrelated_card_name() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,10}",
        "[a-z]{1,6} \\[[A-Z][a-z]{1,6} Cam\\]",
        "[a-z]{1,6} \\[AV Grabber [0-9]\\]",
        Just("[AV Grabber] Mic".to_string()),
    ]
}

/// A camera's microphone among unrelated cards, in two orders
fn grabber_cards() -> impl Strategy<Value = (Vec<RawAudioCard>, Vec<RawAudioCard>)> {
    (prop::collection::vec(unrelated_card_name(), 0..5), 0usize..6).prop_flat_map(|(unrelated, position)| {
        let mut cards: Vec<RawAudioCard> = unrelated
            .iter()
            .enumerate()
            .map(|(i, name)| RawAudioCard::new(i as u32 + 2, 0, name.as_str(), "USB Audio"))
            .collect();
        let at = position.min(cards.len());
        cards.insert(at, RawAudioCard::new(1, 0, "Grabber [AV Grabber]", "USB Audio"));
        (Just(cards.clone()), Just(cards).prop_shuffle())
    })
}

fn blacklist() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[A-Za-z0-9 ]{0,20}", 0..3)
}

proptest! {
    #[test]
    fn prop_audio_candidates_sorted(snapshot in snapshot(), query in "[A-Za-z0-9 ]{0,20}") {
        let resolver = Resolver::new(&snapshot, MatchSettings::default());
        let ranked = resolver.find_audio_device(&query);
        prop_assert_eq!(ranked.len(), snapshot.audio_cards.len());
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn prop_video_candidates_sorted(snapshot in snapshot(), query in "[A-Za-z0-9/ ]{0,16}") {
        let resolver = Resolver::new(&snapshot, MatchSettings::default());
        let ranked = resolver.find_video_device(&query);
        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn prop_audio_threshold_monotonic(
        snapshot in snapshot(),
        query in "[A-Za-z0-9 ]{1,20}",
        slack in 0.001f64..0.5,
    ) {
        let best = Resolver::new(&snapshot, MatchSettings::default())
            .find_audio_device(&query)
            .first()
            .map(|c| c.score);
        prop_assume!(best.is_some());
        let best = best.unwrap_or_default();

        let below = MatchSettings { acceptance_threshold: best - slack, ..MatchSettings::default() };
        let at = MatchSettings { acceptance_threshold: best, ..MatchSettings::default() };
        let above = MatchSettings { acceptance_threshold: best + slack, ..MatchSettings::default() };

        prop_assert!(Resolver::new(&snapshot, below).resolve_audio_device(Some(query.as_str())).is_ok());
        prop_assert!(Resolver::new(&snapshot, at).resolve_audio_device(Some(query.as_str())).is_ok());
        prop_assert!(Resolver::new(&snapshot, above).resolve_audio_device(Some(query.as_str())).is_err());
    }

    #[test]
    fn prop_video_threshold_monotonic(
        snapshot in snapshot(),
        query in "[A-Za-z0-9 ]{1,16}",
        slack in 0.001f64..0.5,
    ) {
        let best = Resolver::new(&snapshot, MatchSettings::default())
            .find_video_device(&query)
            .first()
            .filter(|c| c.target.canonical_node().is_some())
            .map(|c| c.score);
        prop_assume!(best.is_some());
        let best = best.unwrap_or_default();

        let below = MatchSettings { acceptance_threshold: best - slack, ..MatchSettings::default() };
        let above = MatchSettings { acceptance_threshold: best + slack, ..MatchSettings::default() };

        prop_assert!(Resolver::new(&snapshot, below).resolve_video_device(Some(query.as_str())).is_ok());
        prop_assert!(Resolver::new(&snapshot, above).resolve_video_device(Some(query.as_str())).is_err());
    }

    #[test]
    fn prop_merge_ignores_unrelated_card_order((cards, shuffled) in grabber_cards()) {
        let group = VideoGroup::new("AV Grabber (usb-1.3)", ["/dev/video4"]);
        let table = FingerprintTable::empty();

        for order in [cards, shuffled] {
            let snapshot = HardwareSnapshot::new(order, vec![group.clone()]);
            match scan_devices(&snapshot, &table).next() {
                Some(Device::Composite(composite)) => {
                    prop_assert_eq!(composite.audio.address, AudioAddress::new(1, 0));
                    prop_assert_eq!(composite.video.node.as_str(), "/dev/video4");
                }
                other => prop_assert!(false, "expected composite, got {:?}", other),
            }
        }
    }

    #[test]
    fn prop_identity_keys_unique(
        snapshot in snapshot(),
        queries in prop::collection::vec(("[A-Za-z ]{1,12}", prop::option::of("video[0-5]")), 0..4),
    ) {
        let config = DeviceConfig {
            devices: queries
                .into_iter()
                .enumerate()
                .map(|(i, (audio, video))| {
                    let entry = DeviceEntry::new(format!("Configured {}", i)).with_audio(audio);
                    match video {
                        Some(v) => entry.with_video(v),
                        None => entry,
                    }
                })
                .collect(),
            ..DeviceConfig::default()
        };
        let set = reconcile(&snapshot, &FingerprintTable::builtin(), &config);

        let mut seen = HashSet::new();
        for device in &set {
            prop_assert!(seen.insert(device.identity()), "duplicate {}", device.identity());
        }
    }

    #[test]
    fn prop_blacklisted_names_never_discovered(snapshot in snapshot(), extra in blacklist()) {
        // Include some of the names actually present
        let mut blacklist = extra;
        blacklist.extend(snapshot.audio_cards.iter().step_by(2).map(|c| c.name.clone()));
        let config = DeviceConfig {
            blacklist: Some(blacklist),
            ..DeviceConfig::default()
        };
        let effective = config.blacklist();
        let set = reconcile(&snapshot, &FingerprintTable::builtin(), &config);
        for device in &set {
            prop_assert!(!effective.iter().any(|b| b == device.display_name()));
        }
    }

    #[test]
    fn prop_scan_emits_each_card_once(snapshot in snapshot()) {
        let table = FingerprintTable::empty();
        let audio_halves = scan_devices(&snapshot, &table)
            .filter(|d| d.audio_address().is_some())
            .count();
        prop_assert_eq!(audio_halves, snapshot.audio_cards.len());
    }
}
