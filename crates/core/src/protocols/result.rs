//! Per-rule and aggregate validation result types.

use serde::{Deserialize, Serialize};

/// How strongly a finding bears on publication.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// What kind of review a warning asks for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum WarningCategory {
    GenderSpecific,
    ElderApproval,
    CulturalImagery,
    Language,
    LocationSpecific,
    Authority,
    /// Emitted by the engine itself, e.g. when a rule fails to run.
    System,
}

/// A blocking or advisory finding attributed to one rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Violation {
    pub rule_id: String,
    pub message: String,
    pub severity: Severity,
    /// Where the match was found, e.g. `"text"` or `"media[2]"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
    /// The configured term that matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationWarning {
    pub message: String,
    pub category: WarningCategory,
    pub requires_review: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
}

/// Output of a single rule.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationResult {
    pub violations: Vec<Violation>,
    pub warnings: Vec<ValidationWarning>,
    pub suggestions: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        !has_error(&self.violations)
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty() && self.warnings.is_empty() && self.suggestions.is_empty()
    }
}

/// Merged output of every rule plus the engine's contextual checks.
///
/// `valid` is true iff no violation has [`Severity::Error`]; it is recomputed
/// by every mutating method so the two never disagree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregateValidationResult {
    pub valid: bool,
    pub violations: Vec<Violation>,
    pub warnings: Vec<ValidationWarning>,
    pub suggestions: Vec<String>,
}

impl Default for AggregateValidationResult {
    fn default() -> Self {
        Self {
            valid: true,
            violations: Vec::new(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
        }
    }
}

impl AggregateValidationResult {
    /// Append one rule's output, preserving order.
    pub fn absorb(&mut self, partial: ValidationResult) {
        self.violations.extend(partial.violations);
        self.warnings.extend(partial.warnings);
        self.suggestions.extend(partial.suggestions);
        self.valid = !has_error(&self.violations);
    }

    pub fn push_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    pub fn push_suggestion(&mut self, suggestion: impl Into<String>) {
        self.suggestions.push(suggestion.into());
    }

    /// Violations that block publication.
    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|v| v.severity == Severity::Error)
    }

    pub fn has_warning(&self, category: WarningCategory) -> bool {
        self.warnings.iter().any(|w| w.category == category)
    }
}

fn has_error(violations: &[Violation]) -> bool {
    violations.iter().any(|v| v.severity == Severity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(severity: Severity) -> Violation {
        Violation {
            rule_id: "r".into(),
            message: "m".into(),
            severity,
            location: None,
            suggested_fix: None,
            term: None,
        }
    }

    #[test]
    fn default_aggregate_is_valid() {
        assert!(AggregateValidationResult::default().valid);
    }

    #[test]
    fn absorbing_error_invalidates() {
        let mut agg = AggregateValidationResult::default();
        agg.absorb(ValidationResult {
            violations: vec![violation(Severity::Error)],
            ..Default::default()
        });
        assert!(!agg.valid);
        assert_eq!(agg.errors().count(), 1);
    }

    #[test]
    fn warning_severity_violation_keeps_valid() {
        let mut agg = AggregateValidationResult::default();
        agg.absorb(ValidationResult {
            violations: vec![violation(Severity::Warning), violation(Severity::Info)],
            ..Default::default()
        });
        assert!(agg.valid);
    }

    #[test]
    fn absorb_preserves_order() {
        let mut agg = AggregateValidationResult::default();
        agg.absorb(ValidationResult {
            suggestions: vec!["a".into()],
            ..Default::default()
        });
        agg.absorb(ValidationResult {
            suggestions: vec!["b".into(), "c".into()],
            ..Default::default()
        });
        assert_eq!(agg.suggestions, vec!["a", "b", "c"]);
    }

    #[test]
    fn warning_category_is_kebab_case() {
        let json = serde_json::to_string(&WarningCategory::ElderApproval).unwrap();
        assert_eq!(json, "\"elder-approval\"");
    }

    #[test]
    fn optional_fields_are_omitted() {
        let json = serde_json::to_value(violation(Severity::Error)).unwrap();
        assert!(json.get("location").is_none());
        assert!(json.get("suggested_fix").is_none());
        assert_eq!(json["severity"], "error");
    }
}
