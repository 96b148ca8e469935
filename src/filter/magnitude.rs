use std::sync::LazyLock;

use regex::Regex;

static MAGNITUDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)([KkMmBb])$").unwrap());

/// Parse a unit-suffixed amount like `10M` or `1.5K` into its magnitude.
///
/// Only K, M and B are recognised (case-insensitive). Anything else, including
/// bare numbers, signs or surrounding whitespace, yields `None`.
pub fn parse_magnitude(text: &str) -> Option<f64> {
    let caps = MAGNITUDE_RE.captures(text)?;
    let value: f64 = caps[1].parse().ok()?;
    let multiplier = match caps[2].as_bytes()[0].to_ascii_uppercase() {
        b'K' => 1_000.0,
        b'M' => 1_000_000.0,
        b'B' => 1_000_000_000.0,
        _ => return None,
    };
    Some(value * multiplier)
}
