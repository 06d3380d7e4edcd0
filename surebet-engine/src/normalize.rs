//! String canonicalisation for comparable event-name keys.

/// Shortest normalised length the matcher will score.
pub const MIN_MATCHABLE_LEN: usize = 2;

/// Lower-case `raw`, drop every character outside `[a-z0-9]` and whitespace, then trim.
pub fn normalize(raw: &str) -> String {
    let kept: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    kept.trim().to_string()
}

/// Whether a normalised string is long enough to be scored.
pub fn is_matchable(normalized: &str) -> bool {
    normalized.chars().count() >= MIN_MATCHABLE_LEN
}
