//! Display string sanitization.
//!
//! Names, SSIDs and alert text end up embedded in markup by whatever
//! renders the report, so template and markup metacharacters are removed.

/// Fallback for absent or empty strings.
pub const UNKNOWN: &str = "Unknown";

/// Characters removed from every display string.
pub const STRIPPED_CHARS: [char; 11] = ['{', '}', '|', '[', ']', '"', '\'', '\\', '<', '>', '%'];

/// Strip [`STRIPPED_CHARS`] from `s`.
///
/// Absent or empty input gives `"Unknown"`. Input made only of stripped
/// characters also gives `"Unknown"`, so the result is never empty.
pub fn sanitize_string(s: Option<&str>) -> String {
    let Some(s) = s.filter(|s| !s.is_empty()) else {
        return UNKNOWN.to_string();
    };

    let cleaned: String = s.chars().filter(|c| !STRIPPED_CHARS.contains(c)).collect();
    if cleaned.is_empty() {
        UNKNOWN.to_string()
    } else {
        cleaned
    }
}
