//! Known hardware fingerprints
//!
//! A fingerprint maps substrings of raw enumeration fields to a friendly alias
//! and icon. Rules are evaluated in declaration order and the first match wins.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::device::{IconRef, RawAudioCard, VideoGroup};

/// Raw field a rule inspects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchField {
    /// Audio card name
    CardName,
    /// Audio card type tag
    CardType,
    /// Video group name
    DeviceName,
}

/// Modality a rule applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    Audio,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintRule {
    pub alias: String,
    #[serde(rename = "type")]
    pub kind: RuleKind,
    pub match_fields: BTreeMap<MatchField, String>,
    pub icon: IconRef,
}

impl FingerprintRule {
    pub fn new(alias: impl Into<String>, kind: RuleKind, icon: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            kind,
            match_fields: BTreeMap::new(),
            icon: IconRef::new(icon),
        }
    }

    /// Require `field` to contain `needle`
    pub fn with_field(mut self, field: MatchField, needle: impl Into<String>) -> Self {
        self.match_fields.insert(field, needle.into());
        self
    }

    /// True when every declared field is contained in the card's fields
    ///
    /// A rule without fields, or with a field the card does not have, never matches.
    pub fn matches_audio(&self, card: &RawAudioCard) -> bool {
        self.kind == RuleKind::Audio
            && !self.match_fields.is_empty()
            && self.match_fields.iter().all(|(field, needle)| match field {
                MatchField::CardName => card.name.contains(needle.as_str()),
                MatchField::CardType => card.type_tag.contains(needle.as_str()),
                MatchField::DeviceName => false,
            })
    }

    pub fn matches_video(&self, group: &VideoGroup) -> bool {
        self.kind == RuleKind::Video
            && !self.match_fields.is_empty()
            && self.match_fields.iter().all(|(field, needle)| match field {
                MatchField::DeviceName => group.name.contains(needle.as_str()),
                MatchField::CardName | MatchField::CardType => false,
            })
    }
}

/// Ordered set of fingerprint rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FingerprintTable {
    rules: Vec<FingerprintRule>,
}

impl FingerprintTable {
    pub fn new(rules: Vec<FingerprintRule>) -> Self {
        Self { rules }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Table of known hardware
    ///
    /// The PlayStation Eye is deliberately split into a separate mic and camera
    /// so showing the camera does not loop its microphone back.
    pub fn builtin() -> Self {
        Self::new(vec![
            FingerprintRule::new("Playstation Eye Mic", RuleKind::Audio, "pseye.png")
                .with_field(MatchField::CardName, "USB Camera-B4.09.24.1")
                .with_field(MatchField::CardType, "USB Audio"),
            FingerprintRule::new("Playstation Eye Camera", RuleKind::Video, "pseye.png")
                .with_field(MatchField::DeviceName, "USB Camera-B4.09.24.1"),
            FingerprintRule::new("USB Soundcard", RuleKind::Audio, IconRef::SOUNDCARD)
                .with_field(MatchField::CardName, "USB PnP Sound Device")
                .with_field(MatchField::CardType, "USB Audio"),
        ])
    }

    /// Place `rules` ahead of the existing ones
    pub fn with_overrides(mut self, rules: impl IntoIterator<Item = FingerprintRule>) -> Self {
        let mut merged: Vec<FingerprintRule> = rules.into_iter().collect();
        merged.append(&mut self.rules);
        self.rules = merged;
        self
    }

    pub fn rules(&self) -> &[FingerprintRule] {
        &self.rules
    }

    pub fn first_audio_match(&self, card: &RawAudioCard) -> Option<&FingerprintRule> {
        self.rules.iter().find(|rule| rule.matches_audio(card))
    }

    pub fn first_video_match(&self, group: &VideoGroup) -> Option<&FingerprintRule> {
        self.rules.iter().find(|rule| rule.matches_video(group))
    }
}
