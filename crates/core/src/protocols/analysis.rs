//! Tier hints read out of free-text AI analysis.
//!
//! Generated analyses sometimes say things like "SENSITIVITY: HIGH" or
//! "contains SACRED material". That is a weaker signal than the rule engine,
//! so it is reported next to the rule-based tier and never replaces it.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::sensitivity::SensitivityTier;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    High,
}

/// A tier guessed from unstructured text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisSignal {
    pub tier: SensitivityTier,
    pub confidence: Confidence,
    /// The keyword that produced the guess.
    pub marker: Option<String>,
}

/// The authoritative tier next to the heuristic one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SensitivityAssessment {
    pub tier: SensitivityTier,
    pub analysis: Option<AnalysisSignal>,
    /// The heuristic suggests a higher tier than the rules did.
    pub needs_review: bool,
}

/// Markers checked in order; first hit wins.
const MARKERS: &[(&str, SensitivityTier)] = &[
    ("restricted", SensitivityTier::Restricted),
    ("sacred", SensitivityTier::Sacred),
    ("high", SensitivityTier::Sensitive),
    ("sensitive", SensitivityTier::Sensitive),
    ("medium", SensitivityTier::Community),
    ("community", SensitivityTier::Community),
];

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(RESTRICTED|SACRED|HIGH|SENSITIVE|MEDIUM|COMMUNITY)\b").expect("valid regex")
});

/// Guess a tier from upper-case markers in an AI analysis.
///
/// Only upper-case markers count: analyses use them as labels, and lower-case
/// prose ("a high mountain") is too noisy.
pub fn assess_analysis_text(text: &str) -> AnalysisSignal {
    let found: Vec<String> = MARKER_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect();

    MARKERS
        .iter()
        .find(|(marker, _)| found.iter().any(|f| f == marker))
        .map_or(
            AnalysisSignal {
                tier: SensitivityTier::Public,
                confidence: Confidence::Low,
                marker: None,
            },
            |(marker, tier)| AnalysisSignal {
                tier: *tier,
                confidence: Confidence::Low,
                marker: Some((*marker).to_string()),
            },
        )
}

/// Keep the rule tier; flag for review when the heuristic points higher.
pub fn reconcile(
    rule_tier: SensitivityTier,
    analysis: Option<AnalysisSignal>,
) -> SensitivityAssessment {
    let needs_review = analysis.as_ref().is_some_and(|a| a.tier > rule_tier);
    SensitivityAssessment {
        tier: rule_tier,
        analysis,
        needs_review,
    }
}
