/// Fuzzy include/exclude check used by the free-text filter dimensions.
///
/// Case-insensitive, and containment runs both ways: `"Tech"` matches
/// `"Technology"`, and `"Senior Software Engineer"` matches `"Engineer"`.
/// Exclusion wins over inclusion. An empty value never matches.
pub fn matches<S: AsRef<str>>(value: &str, include: &[S], exclude: &[S]) -> bool {
    if value.is_empty() {
        return false;
    }
    let value = value.to_lowercase();

    if exclude.iter().any(|term| contains_either_way(&value, term.as_ref())) {
        return false;
    }
    if include.is_empty() {
        return true;
    }
    include.iter().any(|term| contains_either_way(&value, term.as_ref()))
}

/// `value` must already be lower-cased.
fn contains_either_way(value: &str, term: &str) -> bool {
    let term = term.to_lowercase();
    value.contains(&term) || term.contains(value)
}

/// Strip `http://` / `https://` and lower-case a domain filter entry.
pub fn clean_domain(entry: &str) -> String {
    let lower = entry.trim().to_lowercase();
    lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower)
        .to_string()
}

/// One-directional: the candidate domain must contain a cleaned entry.
pub fn domain_matches<S: AsRef<str>>(domain: &str, entries: &[S]) -> bool {
    let domain = domain.to_lowercase();
    entries
        .iter()
        .map(|e| clean_domain(e.as_ref()))
        .any(|entry| domain.contains(&entry))
}
