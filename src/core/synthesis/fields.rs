//! Field derivation rules applied while synthesizing an occurrence row

/// Country recorded by annotators that means the configured default
const UNITED_STATES: &str = "United States";

/// Splits a raw collector string on its first `;`
///
/// Text before the separator is the primary collector. Everything after it
/// (unsplit, leading whitespace kept) becomes the associated collectors.
pub fn split_recorded_by(raw: &str) -> (String, String) {
    match raw.split_once(';') {
        Some((primary, rest)) => (primary.to_string(), rest.to_string()),
        None => (raw.to_string(), String::new()),
    }
}

/// Replaces an empty country, or the literal "United States", with the default
pub fn normalize_country(raw: &str, default_country: &str) -> String {
    let country = raw.trim();
    if country.is_empty() || country == UNITED_STATES {
        default_country.to_string()
    } else {
        country.to_string()
    }
}

/// `Some` for non-blank text
pub fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Identification remarks: type status followed by the bracketed code
pub fn identification_remarks(type_status: &str, nomenclatural_code: &str) -> String {
    if nomenclatural_code.is_empty() {
        type_status.to_string()
    } else {
        format!("{type_status}[{nomenclatural_code}]")
    }
}

/// Space-separated place line used on image records
pub fn locality_line(parts: &[&str]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
