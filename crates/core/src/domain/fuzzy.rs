//! Fuzzy string scoring
//!
//! Device names reported by `arecord` and `v4l2-ctl` are free text and rarely
//! agree with what a user types. Scores here are normalized to `[0, 1]` and
//! computed from the longest common subsequence of the two inputs, so they are
//! deterministic and independent of any locale or OS state.

/// How two strings are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    /// Whole-string similarity after lowercasing and trimming
    Simple,
    /// Token order insensitive, aligned against the best window of the longer input
    #[default]
    PartialTokenSort,
}

/// Score `query` against `candidate` with the given strategy
///
/// Empty input on either side scores `0.0`.
pub fn fuzzy_match(query: &str, candidate: &str, strategy: MatchStrategy) -> f64 {
    match strategy {
        MatchStrategy::Simple => ratio(query, candidate),
        MatchStrategy::PartialTokenSort => partial_token_sort_ratio(query, candidate),
    }
}

/// Default scorer used for device names
pub fn score(query: &str, candidate: &str) -> f64 {
    fuzzy_match(query, candidate, MatchStrategy::PartialTokenSort)
}

/// Simple similarity of the lowercased, trimmed strings
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.trim().to_lowercase().chars().collect();
    let b: Vec<char> = b.trim().to_lowercase().chars().collect();
    indel_ratio(&a, &b)
}

/// Similarity of the token-sorted strings, aligning the shorter one against
/// the best matching window of the longer one
///
/// `"USB Camera B4"` and `"USB Camera-B4.09.24.1"` score `1.0`: punctuation is
/// dropped and the version tokens fall outside the aligned window.
pub fn partial_token_sort_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = token_sort(a).chars().collect();
    let b: Vec<char> = token_sort(b).chars().collect();
    if a.len() <= b.len() {
        partial_ratio(&a, &b)
    } else {
        partial_ratio(&b, &a)
    }
}

/// Return the best scoring candidate, first one wins on ties
pub fn best_match<'a, I>(query: &str, candidates: I, strategy: MatchStrategy) -> Option<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, f64)> = None;
    for candidate in candidates {
        let s = fuzzy_match(query, candidate, strategy);
        match best {
            Some((_, current)) if s <= current => {}
            _ => best = Some((candidate, s)),
        }
    }
    best
}

/// Lowercase, replace anything non-alphanumeric with a space, sort tokens
fn token_sort(s: &str) -> String {
    let cleaned: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase();
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// `shorter` must not be longer than `longer`
fn partial_ratio(shorter: &[char], longer: &[char]) -> f64 {
    let m = shorter.len();
    let n = longer.len();
    if m == 0 || n == 0 {
        return 0.0;
    }
    if m == n {
        return indel_ratio(shorter, longer);
    }

    let mut best = 0.0f64;

    // Full-length windows
    for start in 0..=(n - m) {
        best = best.max(indel_ratio(shorter, &longer[start..start + m]));
        if best >= 1.0 {
            return 1.0;
        }
    }

    // Windows hanging off either edge of the longer string
    for k in 1..m {
        best = best.max(indel_ratio(shorter, &longer[..k]));
        best = best.max(indel_ratio(shorter, &longer[n - k..]));
    }

    best
}

fn indel_ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    (2 * lcs_len(a, b)) as f64 / total as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
