//! Comment content screening.
//!
//! New comments are scanned against a configurable list of banned terms and
//! enter the site flagged (hidden from visitors) until a moderator approves
//! them. The match is a case-insensitive substring test, not word-boundary
//! aware: a banned term embedded in a longer word still flags.

use std::collections::HashMap;
use std::path::Path;

use color_eyre::{eyre::WrapErr, Result};
use serde::Deserialize;

use crate::names;

/// Word lists as they appear in the config file: locale -> terms.
#[derive(Deserialize)]
struct WordLists(HashMap<String, Vec<String>>);

/// The compiled filter. Terms from all locales are scanned as one union, so
/// a Russian slur in a comment posted through the English UI still flags.
#[derive(Clone)]
pub struct ContentFilter {
    terms: Vec<String>,
}

impl ContentFilter {
    pub fn from_locale_lists(lists: HashMap<String, Vec<String>>) -> Self {
        let terms = lists
            .into_values()
            .flatten()
            .map(|term| term.to_lowercase())
            .filter(|term| !term.is_empty())
            .collect();
        Self { terms }
    }

    /// Load word lists from a JSON file shaped `{"ru": [...], "en": [...]}`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("could not read banned-words file {}", path.display()))?;
        let lists: WordLists = serde_json::from_str(&raw)
            .wrap_err_with(|| format!("could not parse banned-words file {}", path.display()))?;
        for locale in lists.0.keys() {
            if !names::SUPPORTED_LOCALES.contains(&locale.as_str()) {
                tracing::warn!("banned-words config carries unsupported locale {locale:?}");
            }
        }
        Ok(Self::from_locale_lists(lists.0))
    }

    /// True if the text contains any banned term and the comment should be
    /// created flagged, pending moderator approval.
    pub fn requires_review(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.terms.iter().any(|term| lowered.contains(term))
    }
}

impl Default for ContentFilter {
    fn default() -> Self {
        let mut lists = HashMap::new();
        lists.insert(
            "ru".to_owned(),
            ["тупой", "дурак", "идиот", "дебил", "урод", "мразь"]
                .map(str::to_owned)
                .to_vec(),
        );
        lists.insert(
            "en".to_owned(),
            ["stupid", "idiot", "moron", "scum", "loser"]
                .map(str::to_owned)
                .to_vec(),
        );
        Self::from_locale_lists(lists)
    }
}
