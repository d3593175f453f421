//! Closed-set response normalization.
//!
//! Generation output is unreliable free text. Exact-match-first with an
//! in-order substring fallback tolerates verbose or lightly decorated
//! responses without a second round-trip, while error-prefixed strings pass
//! through untouched so they stay distinguishable downstream.

/// Map `raw` onto a member of `allowed`.
///
/// 1. Exact equality with a member of `allowed` → returned unchanged.
/// 2. `raw` starts with one of `error_prefixes` → returned unchanged.
/// 3. First member of `allowed` (in its defined order) whose text appears
///    case-insensitively as a substring of `raw` → that member.
/// 4. Otherwise → `fallback`.
///
/// The in-order first-substring-wins tie-break is deliberate: when a raw
/// response could match two labels, the result is determined by the order of
/// `allowed`, not by any ranking heuristic.
pub fn normalize_label(
    raw: &str,
    allowed: &[&str],
    error_prefixes: &[&str],
    fallback: &str,
) -> String {
    if allowed.contains(&raw) {
        return raw.to_string();
    }

    if error_prefixes.iter().any(|p| raw.starts_with(p)) {
        return raw.to_string();
    }

    let lowered = raw.to_lowercase();
    for label in allowed {
        if lowered.contains(&label.to_lowercase()) {
            return (*label).to_string();
        }
    }

    fallback.to_string()
}
