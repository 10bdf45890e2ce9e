//! Sensitivity tiers and the precedence used to recommend one.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::context::ValidationContext;
use super::result::{AggregateValidationResult, WarningCategory};

/// Ordered classification: `Public < Community < Sensitive < Sacred < Restricted`.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum SensitivityTier {
    #[default]
    Public,
    Community,
    Sensitive,
    Sacred,
    Restricted,
}

impl SensitivityTier {
    pub fn as_str(self) -> &'static str {
        match self {
            SensitivityTier::Public => "public",
            SensitivityTier::Community => "community",
            SensitivityTier::Sensitive => "sensitive",
            SensitivityTier::Sacred => "sacred",
            SensitivityTier::Restricted => "restricted",
        }
    }
}

impl fmt::Display for SensitivityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a tier was chosen. A tier is never reported without one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TierReason {
    /// A violation from a rule that escalates to this tier.
    RuleViolation { rule_id: String },
    /// A review warning of this category.
    ReviewWarning { category: WarningCategory },
    /// The content is tied to a named place.
    Location,
    /// Nothing matched.
    NoSignals,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SensitivityRecommendation {
    pub tier: SensitivityTier,
    pub reason: TierReason,
}

/// Apply the tier precedence to an already computed validation result.
///
/// `escalation_for` maps a rule id to the tier its violations escalate to.
/// First match wins:
/// 1. violations from an escalating rule (highest escalation among them)
/// 2. gender-specific or elder-approval warnings -> `Sensitive`
/// 3. a location on the context, or a location-specific warning -> `Community`
/// 4. `Public`
pub fn recommend_tier<F>(
    result: &AggregateValidationResult,
    context: &ValidationContext,
    escalation_for: F,
) -> SensitivityRecommendation
where
    F: Fn(&str) -> Option<SensitivityTier>,
{
    let escalated = result
        .violations
        .iter()
        .filter_map(|v| escalation_for(&v.rule_id).map(|tier| (tier, &v.rule_id)))
        .filter(|(tier, _)| *tier >= SensitivityTier::Sacred)
        // max_by_key keeps the last maximum; reverse so the first rule wins ties.
        .rev()
        .max_by_key(|(tier, _)| *tier);
    if let Some((tier, rule_id)) = escalated {
        return SensitivityRecommendation {
            tier,
            reason: TierReason::RuleViolation {
                rule_id: rule_id.clone(),
            },
        };
    }

    if let Some(warning) = result.warnings.iter().find(|w| {
        matches!(
            w.category,
            WarningCategory::GenderSpecific | WarningCategory::ElderApproval
        )
    }) {
        return SensitivityRecommendation {
            tier: SensitivityTier::Sensitive,
            reason: TierReason::ReviewWarning {
                category: warning.category,
            },
        };
    }

    let location_warning = result
        .warnings
        .iter()
        .any(|w| w.category == WarningCategory::LocationSpecific);
    if context.location.is_some() || location_warning {
        return SensitivityRecommendation {
            tier: SensitivityTier::Community,
            reason: TierReason::Location,
        };
    }

    SensitivityRecommendation {
        tier: SensitivityTier::Public,
        reason: TierReason::NoSignals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::context::Location;
    use crate::protocols::result::{Severity, ValidationWarning, Violation};

    fn violation(rule_id: &str) -> Violation {
        Violation {
            rule_id: rule_id.to_string(),
            message: "m".to_string(),
            severity: Severity::Error,
            location: None,
            suggested_fix: None,
            term: None,
        }
    }

    fn warning(category: WarningCategory) -> ValidationWarning {
        ValidationWarning {
            message: "w".to_string(),
            category,
            requires_review: true,
            term: None,
        }
    }

    fn escalation(rule_id: &str) -> Option<SensitivityTier> {
        match rule_id {
            "sacred-content" => Some(SensitivityTier::Sacred),
            "restricted-custom" => Some(SensitivityTier::Restricted),
            "gender-specific" => Some(SensitivityTier::Sensitive),
            _ => None,
        }
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(SensitivityTier::Public < SensitivityTier::Community);
        assert!(SensitivityTier::Community < SensitivityTier::Sensitive);
        assert!(SensitivityTier::Sensitive < SensitivityTier::Sacred);
        assert!(SensitivityTier::Sacred < SensitivityTier::Restricted);
    }

    #[test]
    fn empty_result_is_public() {
        let rec = recommend_tier(
            &AggregateValidationResult::default(),
            &ValidationContext::default(),
            escalation,
        );
        assert_eq!(rec.tier, SensitivityTier::Public);
        assert_eq!(rec.reason, TierReason::NoSignals);
    }

    #[test]
    fn sacred_violation_dominates_warnings_and_location() {
        let mut result = AggregateValidationResult::default();
        result.warnings.push(warning(WarningCategory::ElderApproval));
        result.warnings.push(warning(WarningCategory::LocationSpecific));
        result.violations.push(violation("sacred-content"));
        let ctx = ValidationContext::default().with_location(Location {
            name: "Uluru".into(),
            coordinates: None,
        });

        let rec = recommend_tier(&result, &ctx, escalation);
        assert_eq!(rec.tier, SensitivityTier::Sacred);
        assert_eq!(
            rec.reason,
            TierReason::RuleViolation {
                rule_id: "sacred-content".into()
            }
        );
    }

    #[test]
    fn highest_escalation_wins() {
        let mut result = AggregateValidationResult::default();
        result.violations.push(violation("sacred-content"));
        result.violations.push(violation("restricted-custom"));
        let rec = recommend_tier(&result, &ValidationContext::default(), escalation);
        assert_eq!(rec.tier, SensitivityTier::Restricted);
    }

    #[test]
    fn violations_below_sacred_do_not_short_circuit() {
        let mut result = AggregateValidationResult::default();
        result.violations.push(violation("gender-specific"));
        let rec = recommend_tier(&result, &ValidationContext::default(), escalation);
        assert_eq!(rec.tier, SensitivityTier::Public);
    }

    #[test]
    fn review_warning_is_sensitive() {
        let mut result = AggregateValidationResult::default();
        result.warnings.push(warning(WarningCategory::Language));
        result.warnings.push(warning(WarningCategory::GenderSpecific));
        let rec = recommend_tier(&result, &ValidationContext::default(), escalation);
        assert_eq!(rec.tier, SensitivityTier::Sensitive);
        assert_eq!(
            rec.reason,
            TierReason::ReviewWarning {
                category: WarningCategory::GenderSpecific
            }
        );
    }

    #[test]
    fn location_is_community() {
        let ctx = ValidationContext::default().with_location(Location {
            name: "Alice Springs".into(),
            coordinates: None,
        });
        let rec = recommend_tier(&AggregateValidationResult::default(), &ctx, escalation);
        assert_eq!(rec.tier, SensitivityTier::Community);
    }

    #[test]
    fn tier_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SensitivityTier::Sacred).unwrap(),
            "\"sacred\""
        );
    }
}
