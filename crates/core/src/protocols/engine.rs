//! Validation engine: runs every rule, merges results, adds contextual
//! checks, and derives the sensitivity tier and consultation need.

use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;

use super::config::ProtocolConfig;
use super::content::{ContentItem, ExtractedContent};
use super::context::{Audience, ValidationContext};
use super::result::{AggregateValidationResult, ValidationWarning, WarningCategory};
use super::rules::{
    build_rules, RuleDescriptor, RuleExecutionError, ValidationRule, RULE_SACRED_CONTENT,
};
use super::sensitivity::{recommend_tier, SensitivityRecommendation, SensitivityTier};
use crate::consultation::ConsultationPriority;
use crate::error::CoreError;

/// Whether publication must wait for an Elder consultation, and why.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConsultationNeed {
    pub required: bool,
    pub priority: ConsultationPriority,
    /// Matched terms that triggered the need, first occurrence order.
    pub triggers: Vec<String>,
}

/// Everything the engine knows about one content item.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Assessment {
    pub result: AggregateValidationResult,
    pub sensitivity: SensitivityRecommendation,
    pub consultation: ConsultationNeed,
}

pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
    config: ProtocolConfig,
}

impl std::fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationEngine")
            .field(
                "rules",
                &self.rules.iter().map(|r| r.descriptor().id.as_str()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl ValidationEngine {
    /// Build the engine with the built-in rule table compiled from `config`.
    pub fn new(config: ProtocolConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let rules = build_rules(&config)?
            .into_iter()
            .map(|r| Box::new(r) as Box<dyn ValidationRule>)
            .collect();
        Ok(Self { rules, config })
    }

    /// Append a custom rule. It runs after every rule already registered.
    #[must_use]
    pub fn with_rule(mut self, rule: Box<dyn ValidationRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn rules(&self) -> impl Iterator<Item = &RuleDescriptor> {
        self.rules.iter().map(|r| r.descriptor())
    }

    /// Run every rule in declaration order and merge the results.
    ///
    /// A rule that errors or panics is reported as a `system` warning and
    /// does not stop the remaining rules.
    pub fn validate(
        &self,
        content: &ContentItem,
        context: &ValidationContext,
    ) -> AggregateValidationResult {
        let extracted = ExtractedContent::new(content);
        let mut merged = AggregateValidationResult::default();

        for rule in &self.rules {
            match run_guarded(rule.as_ref(), &extracted) {
                Ok(partial) => merged.absorb(partial),
                Err(err) => {
                    tracing::warn!(
                        rule_id = %err.rule_id,
                        error = %err.message,
                        content_type = %context.content_type,
                        content_id = %context.content_id,
                        "Validation rule failed; continuing with remaining rules"
                    );
                    merged.push_warning(ValidationWarning {
                        message: format!("Rule {} failed to execute", err.rule_id),
                        category: WarningCategory::System,
                        requires_review: true,
                        term: None,
                    });
                }
            }
        }

        self.apply_context_checks(&mut merged, context);
        merged
    }

    /// Checks that depend on the request context rather than a single rule.
    fn apply_context_checks(
        &self,
        merged: &mut AggregateValidationResult,
        context: &ValidationContext,
    ) {
        if let Some(location) = &context.location {
            if context.intended_audience == Audience::Public {
                merged.push_warning(ValidationWarning {
                    message: format!(
                        "Content is tied to '{}' and intended for a public audience; consult the community connected to this place",
                        location.name
                    ),
                    category: WarningCategory::LocationSpecific,
                    requires_review: true,
                    term: None,
                });
                merged.push_suggestion(
                    "Seek community consultation before publishing location-specific content",
                );
            }
        }

        let sacred_matched = merged
            .violations
            .iter()
            .any(|v| v.rule_id == RULE_SACRED_CONTENT);
        if sacred_matched && context.author_without_community() {
            merged.push_warning(ValidationWarning {
                message: "The author has no recorded community affiliation and may not hold authority to share sacred material".into(),
                category: WarningCategory::Authority,
                requires_review: true,
                term: None,
            });
        }
    }

    /// Tier implied by `result`, with the reason that selected it.
    pub fn explain_sensitivity(
        &self,
        result: &AggregateValidationResult,
        context: &ValidationContext,
    ) -> SensitivityRecommendation {
        recommend_tier(result, context, |rule_id| self.escalation_for(rule_id))
    }

    /// Validate and return only the recommended tier.
    pub fn sensitivity_recommendation(
        &self,
        content: &ContentItem,
        context: &ValidationContext,
    ) -> SensitivityTier {
        let result = self.validate(content, context);
        self.explain_sensitivity(&result, context).tier
    }

    /// Decide whether `result` needs an Elder consultation before publishing.
    ///
    /// Required when any violation blocks, or when a gender-specific or
    /// elder-approval warning is present. Priority is `High` when a rule
    /// escalating to sacred or above fired, `Medium` otherwise.
    pub fn consultation_need(&self, result: &AggregateValidationResult) -> ConsultationNeed {
        let review_warnings: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| {
                matches!(
                    w.category,
                    WarningCategory::GenderSpecific | WarningCategory::ElderApproval
                )
            })
            .collect();

        let required = !result.valid || !review_warnings.is_empty();
        let sacred = result.violations.iter().any(|v| {
            self.escalation_for(&v.rule_id)
                .is_some_and(|t| t >= SensitivityTier::Sacred)
        });
        let priority = if sacred {
            ConsultationPriority::High
        } else {
            ConsultationPriority::Medium
        };

        let mut triggers: Vec<String> = Vec::new();
        let terms = result
            .errors()
            .filter_map(|v| v.term.as_ref())
            .chain(review_warnings.iter().filter_map(|w| w.term.as_ref()));
        for term in terms {
            if !triggers.contains(term) {
                triggers.push(term.clone());
            }
        }

        ConsultationNeed {
            required,
            priority,
            triggers,
        }
    }

    /// Validate once and derive tier and consultation need from that result.
    pub fn assess(&self, content: &ContentItem, context: &ValidationContext) -> Assessment {
        let result = self.validate(content, context);
        let sensitivity = self.explain_sensitivity(&result, context);
        let consultation = self.consultation_need(&result);
        Assessment {
            result,
            sensitivity,
            consultation,
        }
    }

    fn escalation_for(&self, rule_id: &str) -> Option<SensitivityTier> {
        self.rules
            .iter()
            .map(|r| r.descriptor())
            .find(|d| d.id == rule_id)
            .and_then(|d| d.escalation)
    }
}

/// Evaluate a rule, converting a panic into a [`RuleExecutionError`].
fn run_guarded(
    rule: &dyn ValidationRule,
    content: &ExtractedContent<'_>,
) -> Result<super::result::ValidationResult, RuleExecutionError> {
    match panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(content))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "rule panicked".to_string());
            Err(RuleExecutionError {
                rule_id: rule.descriptor().id.clone(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::content::{MediaDescriptor, MediaKind};
    use crate::protocols::context::{Author, Location};
    use crate::protocols::result::{Severity, ValidationResult};
    use crate::protocols::rules::{RuleCategory, RULE_GENDER_SPECIFIC};
    use crate::protocols::sensitivity::TierReason;

    fn engine() -> ValidationEngine {
        ValidationEngine::new(ProtocolConfig::default()).unwrap()
    }

    fn item(title: &str, body: &str) -> ContentItem {
        ContentItem {
            title: Some(title.to_string()),
            body: Some(body.to_string()),
            ..Default::default()
        }
    }

    struct FailingRule {
        descriptor: RuleDescriptor,
        panic: bool,
    }

    impl FailingRule {
        fn new(panic: bool) -> Self {
            Self {
                descriptor: RuleDescriptor {
                    id: "broken".into(),
                    name: "Broken".into(),
                    description: "always fails".into(),
                    severity: Severity::Error,
                    category: RuleCategory::Textual,
                    escalation: None,
                },
                panic,
            }
        }
    }

    impl ValidationRule for FailingRule {
        fn descriptor(&self) -> &RuleDescriptor {
            &self.descriptor
        }

        fn evaluate(
            &self,
            _content: &ExtractedContent<'_>,
        ) -> Result<ValidationResult, RuleExecutionError> {
            if self.panic {
                panic!("index out of range");
            }
            Err(RuleExecutionError {
                rule_id: self.descriptor.id.clone(),
                message: "bad input".into(),
            })
        }
    }

    // -----------------------------------------------------------------------
    // Scenarios
    // -----------------------------------------------------------------------

    #[test]
    fn ceremony_story_is_blocked_and_sacred() {
        let engine = engine();
        let content = item(
            "Our Ceremony Story",
            "This describes a men's business ceremony.",
        );
        let ctx = ValidationContext::default().with_audience(Audience::Public);

        let result = engine.validate(&content, &ctx);
        assert!(!result.valid);
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].rule_id, RULE_SACRED_CONTENT);
        assert_eq!(result.violations[0].term.as_deref(), Some("ceremony"));
        assert_eq!(result.violations[0].severity, Severity::Error);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].category, WarningCategory::GenderSpecific);
        assert_eq!(
            engine.sensitivity_recommendation(&content, &ctx),
            SensitivityTier::Sacred
        );
    }

    #[test]
    fn visiting_elders_is_valid_and_sensitive() {
        let engine = engine();
        let content = item(
            "Visiting Elders",
            "We spoke with elder community members about traditional knowledge.",
        );
        let ctx = ValidationContext::default().with_author(Author {
            community: Some("Arrernte".into()),
            ..Default::default()
        });

        let result = engine.validate(&content, &ctx);
        assert!(result.valid);
        assert!(result.has_warning(WarningCategory::ElderApproval));
        assert_eq!(
            engine.sensitivity_recommendation(&content, &ctx),
            SensitivityTier::Sensitive
        );
    }

    #[test]
    fn plain_content_is_public() {
        let engine = engine();
        let content = item("Community Garden", "Volunteers planted tomatoes on Saturday.");
        let ctx = ValidationContext::default();

        let result = engine.validate(&content, &ctx);
        assert!(result.valid);
        assert!(result.violations.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(
            engine.sensitivity_recommendation(&content, &ctx),
            SensitivityTier::Public
        );
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    #[test]
    fn validation_is_idempotent() {
        let engine = engine();
        let content = item("A ceremony", "An elder spoke of the dreaming. Native title.");
        let ctx = ValidationContext::default().with_location(Location {
            name: "Yirrkala".into(),
            coordinates: None,
        });
        let first = serde_json::to_vec(&engine.validate(&content, &ctx)).unwrap();
        let second = serde_json::to_vec(&engine.validate(&content, &ctx)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn review_only_terms_keep_content_valid() {
        let engine = engine();
        let content = item("Business", "Notes on women's business and a burial ground.");
        let result = engine.validate(&content, &ValidationContext::default());
        assert!(result.valid);
        assert!(!result.warnings.is_empty());
        assert!(result.warnings.iter().all(|w| w.requires_review));
    }

    #[test]
    fn adding_sacred_term_always_yields_sacred() {
        let engine = engine();
        let ctx = ValidationContext::default().with_location(Location {
            name: "Darwin".into(),
            coordinates: None,
        });
        let mut content = item("Elders", "An elder and men's business.");
        assert_eq!(
            engine.sensitivity_recommendation(&content, &ctx),
            SensitivityTier::Sensitive
        );
        content.summary = Some("Songlines".into());
        assert_eq!(
            engine.sensitivity_recommendation(&content, &ctx),
            SensitivityTier::Sacred
        );
    }

    // -----------------------------------------------------------------------
    // Context checks
    // -----------------------------------------------------------------------

    #[test]
    fn location_with_public_audience_warns() {
        let engine = engine();
        let ctx = ValidationContext::default()
            .with_audience(Audience::Public)
            .with_location(Location {
                name: "Kakadu".into(),
                coordinates: None,
            });
        let result = engine.validate(&item("Trip", "A day out."), &ctx);
        assert!(result.has_warning(WarningCategory::LocationSpecific));
        let rec = engine.explain_sensitivity(&result, &ctx);
        assert_eq!(rec.tier, SensitivityTier::Community);
        assert_eq!(rec.reason, TierReason::Location);
    }

    #[test]
    fn location_with_community_audience_does_not_warn() {
        let engine = engine();
        let ctx = ValidationContext::default()
            .with_audience(Audience::Community)
            .with_location(Location {
                name: "Kakadu".into(),
                coordinates: None,
            });
        let result = engine.validate(&item("Trip", "A day out."), &ctx);
        assert!(!result.has_warning(WarningCategory::LocationSpecific));
        assert_eq!(
            engine.explain_sensitivity(&result, &ctx).tier,
            SensitivityTier::Community
        );
    }

    #[test]
    fn author_without_community_and_sacred_text_warns() {
        let engine = engine();
        let ctx = ValidationContext::default().with_author(Author {
            name: Some("Sam".into()),
            ..Default::default()
        });
        let result = engine.validate(&item("Initiation", "About initiation."), &ctx);
        assert!(result.has_warning(WarningCategory::Authority));

        let without_sacred = engine.validate(&item("Garden", "Tomatoes."), &ctx);
        assert!(!without_sacred.has_warning(WarningCategory::Authority));
    }

    #[test]
    fn public_image_with_sacred_caption_blocks() {
        let engine = engine();
        let content = ContentItem {
            title: Some("Gallery".into()),
            media: vec![MediaDescriptor {
                kind: MediaKind::Image,
                alt_text: None,
                caption: Some("Dancers at the sacred site".into()),
                declared_sensitivity: Some(SensitivityTier::Public),
            }],
            ..Default::default()
        };
        let ctx = ValidationContext::default();
        let result = engine.validate(&content, &ctx);
        assert!(!result.valid);
        assert_eq!(engine.explain_sensitivity(&result, &ctx).tier, SensitivityTier::Sacred);
        assert_eq!(engine.consultation_need(&result).priority, ConsultationPriority::High);
    }

    // -----------------------------------------------------------------------
    // Failure isolation
    // -----------------------------------------------------------------------

    #[test]
    fn failing_rule_becomes_system_warning() {
        let engine = engine().with_rule(Box::new(FailingRule::new(false)));
        let result = engine.validate(&item("Garden", "Tomatoes."), &ValidationContext::default());
        assert!(result.valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].category, WarningCategory::System);
        assert!(result.warnings[0].requires_review);
        assert!(result.warnings[0].message.contains("broken"));
    }

    #[test]
    fn panicking_rule_does_not_abort_validation() {
        let engine = ValidationEngine::new(ProtocolConfig::default())
            .unwrap()
            .with_rule(Box::new(FailingRule::new(true)));
        let result = engine.validate(&item("A ceremony", ""), &ValidationContext::default());
        assert!(!result.valid);
        assert_eq!(result.violations.len(), 1);
        assert!(result.has_warning(WarningCategory::System));
    }

    // -----------------------------------------------------------------------
    // Consultation need
    // -----------------------------------------------------------------------

    #[test]
    fn consultation_not_required_for_language_only() {
        let engine = engine();
        let result = engine.validate(
            &item("Old book", "It called them primitive."),
            &ValidationContext::default(),
        );
        let need = engine.consultation_need(&result);
        assert!(!need.required);
        assert!(need.triggers.is_empty());
    }

    #[test]
    fn consultation_medium_for_review_warnings() {
        let engine = engine();
        let result = engine.validate(
            &item("Healing", "Healing practices and men's business."),
            &ValidationContext::default(),
        );
        let need = engine.consultation_need(&result);
        assert!(need.required);
        assert_eq!(need.priority, ConsultationPriority::Medium);
        assert_eq!(need.triggers, vec!["men's business", "healing practices"]);
    }

    #[test]
    fn consultation_high_for_sacred() {
        let engine = engine();
        let assessment =
            engine.assess(&item("Ceremony", "A ceremony."), &ValidationContext::default());
        assert!(assessment.consultation.required);
        assert_eq!(assessment.consultation.priority, ConsultationPriority::High);
        assert_eq!(assessment.consultation.triggers, vec!["ceremony"]);
        assert_eq!(assessment.sensitivity.tier, SensitivityTier::Sacred);
    }

    #[test]
    fn gender_rule_escalation_is_not_sacred() {
        let engine = engine();
        assert_eq!(
            engine.escalation_for(RULE_GENDER_SPECIFIC),
            Some(SensitivityTier::Sensitive)
        );
        assert_eq!(engine.escalation_for("unknown"), None);
    }
}
