//! Language tag normalization.
//!
//! ELRC metadata and TMX attributes mix two-letter codes, ISO-639-2/3
//! codes and region-qualified tags (`en-GB`). Everything is collapsed
//! to a canonical lowercase two-letter code before comparison.
use std::collections::HashMap;

use lazy_static::lazy_static;
use log::warn;

lazy_static! {
    /// ISO-639-2/3 codes seen in ELRC metadata and file names,
    /// mapped to their two-letter equivalents.
    pub static ref THREE_TO_TWO: HashMap<&'static str, &'static str> = [
        ("bul", "bg"),
        ("ces", "cs"),
        ("dan", "da"),
        ("deu", "de"),
        ("ell", "el"),
        ("eng", "en"),
        ("est", "et"),
        ("fin", "fi"),
        ("fra", "fr"),
        ("gle", "ga"),
        ("hrv", "hr"),
        ("hun", "hu"),
        ("ita", "it"),
        ("lav", "lv"),
        ("lit", "lt"),
        ("mlt", "mt"),
        ("nld", "nl"),
        ("nor", "no"),
        ("pol", "pl"),
        ("por", "pt"),
        ("ron", "ro"),
        ("slk", "sk"),
        ("slv", "sl"),
        ("spa", "es"),
        ("swe", "sv"),
    ]
    .iter()
    .copied()
    .collect();
}

/// Collapse a language tag to a canonical two-letter code.
///
/// Region qualifiers are stripped (`en-GB` becomes `en`), three-letter
/// codes go through [THREE_TO_TWO]. Returns [None] for tags that fit
/// neither shape.
pub fn normalize(tag: &str) -> Option<String> {
    let base = tag.trim().split(['-', '_']).next()?;
    let lower = base.to_ascii_lowercase();
    if lower.len() == 2 && lower.bytes().all(|b| b.is_ascii_lowercase()) {
        return Some(lower);
    }
    THREE_TO_TWO.get(lower.as_str()).map(|two| two.to_string())
}

/// [normalize], but keeps unknown tags as-is (lowercased) with a warning.
///
/// Declared metadata occasionally carries codes outside the mapping;
/// dropping them would silently shrink the language set.
pub fn normalize_lossy(tag: &str) -> String {
    match normalize(tag) {
        Some(two) => two,
        None => {
            warn!("unrecognized language tag {:?}, keeping as-is", tag);
            tag.trim().to_ascii_lowercase()
        }
    }
}
