//! Filename normalization into canonical keys.
//!
//! Raw filenames in the folder tree name the same logical item in wildly
//! different ways: `12_Song_Name_Alto.pdf`, `12 Song Name (rev 2).pdf`,
//! `12-SongName.mp3`. Normalization reduces all of them to one canonical
//! key, `"12 song name"`, so the matrix can match items across folders.
//!
//! The rules run in a fixed order; reordering them changes the output
//! (suffix stripping must run before the parenthetical/dash truncation).

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+").expect("valid leading number regex"));
static NUMBER_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\s*[-_\s]*").expect("valid number prefix regex"));
static OCLOCK_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:\d+\s+)?O'Clock\s+").expect("valid o'clock regex"));
static SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:alto\d*|flute|drums|bass|soprano|edit|orig|concert|new).*$")
        .expect("valid suffix regex")
});
static TRAILER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*[(\-].*$").expect("valid trailer regex"));
static PUNCT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"['‘’,.\d]").expect("valid punctuation regex"));
static CAMEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid camel-case regex"));
static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

/// Result of normalizing one filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    /// The filename maps to a matrix row
    Kept {
        /// Numeric prefix parsed from the filename
        number: u64,
        /// Canonical key, `"<number> <cleaned title>"`
        key: String,
    },

    /// The filename has no place in the matrix
    Discarded(DiscardReason),
}

impl Normalized {
    /// Consume into the canonical key, if kept
    pub fn into_key(self) -> Option<String> {
        match self {
            Normalized::Kept { key, .. } => Some(key),
            Normalized::Discarded(_) => None,
        }
    }
}

/// Why a filename was dropped from the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// No leading decimal digit sequence (or one too large to be a
    /// catalog number)
    NoLeadingNumber,

    /// Cleaning removed everything that was there
    EmptyAfterCleaning,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardReason::NoLeadingNumber => write!(f, "no leading number"),
            DiscardReason::EmptyAfterCleaning => write!(f, "empty after cleaning"),
        }
    }
}

/// Normalize a raw filename into its canonical key.
///
/// Pure and infallible: every input maps to either a key or a discard
/// reason. Files without a leading catalog number are discarded outright.
pub fn normalize(filename: &str) -> Normalized {
    let Some(number_match) = LEADING_NUMBER_RE.find(filename) else {
        return Normalized::Discarded(DiscardReason::NoLeadingNumber);
    };
    let Ok(number) = number_match.as_str().parse::<u64>() else {
        // Digit run too long to be a catalog number
        return Normalized::Discarded(DiscardReason::NoLeadingNumber);
    };

    // Strip the extension (everything from the last dot)
    let stem = match filename.rfind('.') {
        Some(idx) => &filename[..idx],
        None => filename,
    };

    let name = NUMBER_PREFIX_RE.replace(stem, "");
    // An "O'Clock" phrase left over after the prefix strip is part of the
    // numbering scheme, not the title
    let name = OCLOCK_PREFIX_RE.replace(&name, "");
    let name = name.replace('_', " ");
    // Instrument/version suffixes first, then parenthetical/dash trailers
    let name = SUFFIX_RE.replace(&name, "");
    let name = TRAILER_RE.replace(&name, "");
    let name = PUNCT_RE.replace_all(&name, "");
    let name = CAMEL_RE.replace_all(&name, "$1 $2");
    let name = WHITESPACE_RE.replace_all(&name, " ");
    let name = name.trim();
    let name = name.strip_suffix('-').unwrap_or(name).trim();
    let name = name.to_lowercase();

    if name.is_empty() {
        return Normalized::Discarded(DiscardReason::EmptyAfterCleaning);
    }

    Normalized::Kept {
        number,
        key: format!("{number} {name}"),
    }
}
