//! Text cleanup for catalog and description files.
//!
//! Normalizes the typographic spaces and apostrophes that word processors
//! insert, so that prefix matching and the selection dedup key see plain
//! characters.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Optional `sous-domaine:` label in front of a subdomain name.
static SUBDOMAIN_LABEL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^sous-domaine\s*:").unwrap());

/// Leading `Domaine` word in a description-file domain marker.
static DOMAIN_WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^domaine(\s+|$)").unwrap());

/// Runs of underscores produced while sanitizing file names.
static UNDERSCORE_RUN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_{2,}").unwrap());

/// Byte-order mark that may start a UTF-8 text file.
const BOM: char = '\u{feff}';

/// Characters replaced before prefix matching, with their plain equivalent.
const SUBSTITUTIONS: &[(char, char)] = &[
    ('\u{202f}', ' '),  // narrow no-break space
    ('\u{00a0}', ' '),  // no-break space
    ('\u{2019}', '\''), // right single quotation mark
];

/// Line cleaner for catalog-style text files.
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    /// Whether to compose characters to NFC after substitution.
    compose: bool,
}

impl TextNormalizer {
    /// Create a normalizer that also composes to NFC.
    pub fn new() -> Self {
        Self { compose: true }
    }

    /// Set whether to compose to NFC.
    pub fn with_compose(mut self, compose: bool) -> Self {
        self.compose = compose;
        self
    }

    /// Clean one line: drop a BOM, substitute typographic characters,
    /// optionally compose, and trim.
    pub fn clean_line(&self, raw: &str) -> String {
        let substituted: String = raw
            .trim_start_matches(BOM)
            .chars()
            .map(|c| {
                SUBSTITUTIONS
                    .iter()
                    .find(|(from, _)| *from == c)
                    .map(|(_, to)| *to)
                    .unwrap_or(c)
            })
            .collect();

        let composed = if self.compose {
            substituted.nfc().collect::<String>()
        } else {
            substituted
        };

        composed.trim().to_string()
    }
}

/// Remove an optional `sous-domaine:` label from a subdomain name.
pub fn strip_subdomain_label(name: &str) -> String {
    SUBDOMAIN_LABEL_REGEX.replace(name.trim(), "").trim().to_string()
}

/// Remove a leading `Domaine` word from a description-file domain name.
///
/// A bare `Domaine` with nothing after it is kept as is.
pub fn strip_domain_word(name: &str) -> String {
    let name = name.trim();
    let stripped = DOMAIN_WORD_REGEX.replace(name, "");
    if stripped.trim().is_empty() {
        name.to_string()
    } else {
        stripped.trim().to_string()
    }
}

/// Turn free text into a portable file stem.
///
/// Everything except letters, digits, `_` and `-` becomes `_`; runs of `_`
/// collapse and edges are trimmed. Falls back to `presentation`.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let collapsed = UNDERSCORE_RUN_REGEX.replace_all(&replaced, "_");
    let trimmed = collapsed.trim_matches('_');
    if trimmed.is_empty() {
        "presentation".to_string()
    } else {
        trimmed.to_string()
    }
}
