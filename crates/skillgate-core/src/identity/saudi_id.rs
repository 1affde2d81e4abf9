//! Local resident-identifier format check.
//!
//! A Saudi national identifier is exactly ten ASCII digits; the leading
//! digit distinguishes citizens (`1`) from residents (`2`). This is a pure
//! syntactic check -- it never substitutes for provider verification and
//! mutates nothing.

use std::fmt;

/// The two resident-identifier categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaudiIdKind {
    Citizen,
    Resident,
}

impl fmt::Display for SaudiIdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaudiIdKind::Citizen => write!(f, "citizen"),
            SaudiIdKind::Resident => write!(f, "resident"),
        }
    }
}

/// Classify an id number, or `None` when the format is invalid.
pub fn validate(id_number: &str) -> Option<SaudiIdKind> {
    if id_number.len() != 10 || !id_number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match id_number.as_bytes()[0] {
        b'1' => Some(SaudiIdKind::Citizen),
        b'2' => Some(SaudiIdKind::Resident),
        _ => None,
    }
}

/// Mask an id number to its last four characters for responses and logs.
///
/// Counts characters, not bytes: the input is caller-supplied and may not
/// be ASCII even when it fails validation.
pub fn mask(id_number: &str) -> String {
    let total = id_number.chars().count();
    if total > 4 {
        let tail: String = id_number.chars().skip(total - 4).collect();
        format!("{}{}", "*".repeat(total - 4), tail)
    } else {
        "*".repeat(total)
    }
}
