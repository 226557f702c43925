//! Allowed keys per block context and "did you mean" suggestions.

/// Where a `name: value` line sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyContext {
    Suite,
    Fixture,
    Bench,
}

impl KeyContext {
    /// Valid keys, sorted.
    pub fn valid_keys(&self) -> &'static [&'static str] {
        match self {
            KeyContext::Suite => &["description", "iterations", "warmup"],
            KeyContext::Fixture => &["description", "go", "hex", "rust", "ts"],
            KeyContext::Bench => &["description", "go", "iterations", "rust", "ts"],
        }
    }

    pub fn accepts(&self, key: &str) -> bool {
        self.valid_keys().contains(&key)
    }
}

/// Largest dissimilarity score still offered as a suggestion.
const MAX_SUGGESTION_SCORE: usize = 5;

/// Pick the candidate closest to `typo`.
///
/// The score is the length difference plus the number of mismatched
/// lowercase characters over the shorter length. It is a coarse positional
/// measure, not an edit distance: a single inserted character shifts every
/// later position. A case-insensitive exact match wins outright and ties go
/// to the alphabetically first candidate.
pub fn closest_key<'a, I>(typo: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let a: Vec<char> = typo.to_lowercase().chars().collect();
    let mut best: Option<(usize, &'a str)> = None;

    for candidate in candidates {
        let b: Vec<char> = candidate.to_lowercase().chars().collect();
        if a == b {
            return Some(candidate);
        }
        let common = a.len().min(b.len());
        let mismatches = (0..common).filter(|&i| a[i] != b[i]).count();
        let score = a.len().abs_diff(b.len()) + mismatches;

        let better = match best {
            None => true,
            Some((best_score, best_name)) => {
                score < best_score || (score == best_score && candidate < best_name)
            }
        };
        if better {
            best = Some((score, candidate));
        }
    }

    best.filter(|(score, _)| *score <= MAX_SUGGESTION_SCORE)
        .map(|(_, name)| name)
}

/// Message for a key not allowed in `context`, or None when it is allowed.
pub fn unknown_key_message(key: &str, context: KeyContext) -> Option<String> {
    if context.accepts(key) {
        return None;
    }
    let valid = context.valid_keys();
    Some(match closest_key(key, valid.iter().copied()) {
        Some(suggestion) => format!("Unknown key '{}'. Did you mean '{}'?", key, suggestion),
        None => format!("Unknown key '{}'. Valid keys here: {}.", key, valid.join(", ")),
    })
}
