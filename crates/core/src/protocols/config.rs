//! Keyword lists and policy tables that drive the rule set.
//!
//! Nothing here is compiled into rule logic: the built-in defaults can be
//! replaced per deployment or per community by loading a JSON document.
//! Any key missing from the document keeps its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::workflow::EscalationTable;

// ---------------------------------------------------------------------------
// Built-in term lists
// ---------------------------------------------------------------------------

/// Terms that mark sacred or restricted material.
///
/// Gender-restricted business terms are deliberately absent: they are owned
/// by the gender-specific list so one phrase is not reported by two rules.
pub const DEFAULT_SACRED_TERMS: &[&str] = &[
    "sacred site",
    "sacred object",
    "ceremony",
    "initiation",
    "sorry business",
    "secret business",
    "dreaming",
    "songlines",
];

pub const DEFAULT_GENDER_TERMS: &[&str] = &[
    "men's business",
    "women's business",
    "gender-specific",
];

pub const DEFAULT_ELDER_TERMS: &[&str] = &[
    "traditional owner",
    "elder",
    "ancestor",
    "burial ground",
    "cultural site",
    "traditional knowledge",
    "healing practices",
];

pub const DEFAULT_IMAGERY_TERMS: &[&str] = &[
    "dot painting",
    "dreamtime",
    "rainbow serpent",
    "boomerang",
    "didgeridoo",
];

/// `(discouraged, preferred)` pairs.
pub const DEFAULT_DISCOURAGED_LANGUAGE: &[(&str, &str)] = &[
    ("aborigine", "Aboriginal person"),
    ("aborigines", "Aboriginal people"),
    ("native", "Aboriginal"),
    ("primitive", "traditional"),
    ("stone age", "traditional lifestyle"),
];

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// How a configured term is compared against extracted text.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Case-insensitive substring.
    #[default]
    Substring,
    /// Case-insensitive, bounded by non-word characters on both sides.
    Word,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TermList {
    pub terms: Vec<String>,
    #[serde(default)]
    pub match_mode: MatchMode,
}

impl TermList {
    fn from_static(terms: &[&str], match_mode: MatchMode) -> Self {
        Self {
            terms: terms.iter().map(|t| (*t).to_string()).collect(),
            match_mode,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageEntry {
    pub term: String,
    pub preferred: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageTable {
    pub entries: Vec<LanguageEntry>,
    #[serde(default)]
    pub match_mode: MatchMode,
}

/// When any trigger term was matched, prefer advisors holding one of
/// `specialties`. Preferences are tried in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdvisorPreference {
    pub triggers: Vec<String>,
    pub specialties: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProtocolConfig {
    pub sacred_terms: TermList,
    pub gender_terms: TermList,
    pub elder_terms: TermList,
    pub imagery_terms: TermList,
    pub discouraged_language: LanguageTable,
    pub advisor_preferences: Vec<AdvisorPreference>,
    pub escalation: EscalationTable,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            sacred_terms: TermList::from_static(DEFAULT_SACRED_TERMS, MatchMode::Substring),
            gender_terms: TermList::from_static(DEFAULT_GENDER_TERMS, MatchMode::Substring),
            elder_terms: TermList::from_static(DEFAULT_ELDER_TERMS, MatchMode::Substring),
            imagery_terms: TermList::from_static(DEFAULT_IMAGERY_TERMS, MatchMode::Substring),
            discouraged_language: LanguageTable {
                entries: DEFAULT_DISCOURAGED_LANGUAGE
                    .iter()
                    .map(|(term, preferred)| LanguageEntry {
                        term: (*term).to_string(),
                        preferred: (*preferred).to_string(),
                    })
                    .collect(),
                match_mode: MatchMode::Word,
            },
            advisor_preferences: default_advisor_preferences(),
            escalation: EscalationTable::default(),
        }
    }
}

fn default_advisor_preferences() -> Vec<AdvisorPreference> {
    let owned = |xs: &[&str]| xs.iter().map(|s| (*s).to_string()).collect::<Vec<_>>();
    vec![
        AdvisorPreference {
            triggers: owned(&[
                "men's business",
                "women's business",
                "gender-specific",
                "healing practices",
            ]),
            specialties: owned(&["Women's Business", "Traditional Healing"]),
        },
        AdvisorPreference {
            triggers: owned(&["dreaming", "dreamtime", "ancestor", "songlines"]),
            specialties: owned(&["Dreamtime Stories"]),
        },
    ]
}

impl ProtocolConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(s: &str) -> Result<Self, CoreError> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| CoreError::Validation(format!("Invalid protocol configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Validation(format!(
                "Cannot read protocol configuration '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&raw)
    }

    /// Reject blank terms and duplicate escalation tiers.
    pub fn validate(&self) -> Result<(), CoreError> {
        let lists = [
            ("sacred_terms", &self.sacred_terms),
            ("gender_terms", &self.gender_terms),
            ("elder_terms", &self.elder_terms),
            ("imagery_terms", &self.imagery_terms),
        ];
        for (name, list) in lists {
            validate_terms(name, list.terms.iter().map(String::as_str))?;
        }

        validate_terms(
            "discouraged_language",
            self.discouraged_language.entries.iter().map(|e| e.term.as_str()),
        )?;
        if let Some(entry) = self
            .discouraged_language
            .entries
            .iter()
            .find(|e| e.preferred.trim().is_empty())
        {
            return Err(CoreError::Validation(format!(
                "discouraged_language entry '{}' has no preferred alternative",
                entry.term
            )));
        }

        for (i, pref) in self.advisor_preferences.iter().enumerate() {
            if pref.triggers.is_empty() || pref.specialties.is_empty() {
                return Err(CoreError::Validation(format!(
                    "advisor_preferences[{i}] must list at least one trigger and one specialty"
                )));
            }
        }

        self.escalation.validate()
    }
}

fn validate_terms<'a>(list: &str, terms: impl Iterator<Item = &'a str>) -> Result<(), CoreError> {
    for (i, term) in terms.enumerate() {
        if term.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "{list}[{i}] must not be blank"
            )));
        }
    }
    Ok(())
}
