//! Version ordering for effective-version resolution.
//!
//! Module versions are compared numerically when both sides look like
//! release versions (an optional `v` prefix followed by dot-separated
//! numeric components). Anything else, such as a pre-release suffix or
//! a pseudo-version, falls back to bytewise lexical comparison, so the
//! ordering is total over all strings.

use std::cmp::Ordering;

/// Splits a version string into numeric release components.
///
/// Returns `None` unless every dot-separated component is a nonempty
/// run of ASCII digits. A single leading `v` is tolerated.
fn release_components(version: &str) -> Option<Vec<u64>> {
    let trimmed = version.strip_prefix('v').unwrap_or(version);
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .split('.')
        .map(|part| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            part.parse::<u64>().ok()
        })
        .collect()
}

/// Compares two version strings.
///
/// Numeric component-wise comparison when both sides parse as release
/// versions, with the shorter side ordering first on prefix equality
/// (`v1.2` < `v1.2.0`); bytewise lexical comparison otherwise.
pub fn compare(a: &str, b: &str) -> Ordering {
    match (release_components(a), release_components(b)) {
        (Some(left), Some(right)) => left.cmp(&right),
        _ => a.as_bytes().cmp(b.as_bytes()),
    }
}

/// Returns true when `a` orders strictly after `b`.
///
/// This is the only question effective-version resolution ever asks:
/// should a newly seen requested version replace the running maximum?
/// Equal versions are not greater in either direction.
///
/// # Example
///
/// ```rust
/// use depscope::graph::version_gt;
///
/// assert!(version_gt("v1.10.0", "v1.9.0"));
/// assert!(!version_gt("v1.9.0", "v1.10.0"));
/// assert!(!version_gt("v1.9.0", "v1.9.0"));
/// ```
pub fn version_gt(a: &str, b: &str) -> bool {
    compare(a, b) == Ordering::Greater
}
