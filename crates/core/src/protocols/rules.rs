//! Rule contract and the declarative rule table.
//!
//! Built-in rules are rows of [`MatchRule`]: a term list plus what to emit
//! when a term matches. One generic matcher evaluates every row, so adding
//! a rule is a table change. Rules that need custom logic implement
//! [`ValidationRule`] directly and are handed to the engine alongside.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::config::{MatchMode, ProtocolConfig, TermList};
use super::content::ExtractedContent;
use super::result::{Severity, ValidationResult, ValidationWarning, Violation, WarningCategory};
use super::sensitivity::SensitivityTier;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Rule ids
// ---------------------------------------------------------------------------

pub const RULE_SACRED_CONTENT: &str = "sacred-content";
pub const RULE_GENDER_SPECIFIC: &str = "gender-specific";
pub const RULE_ELDER_APPROVAL: &str = "elder-approval";
pub const RULE_CULTURAL_IMAGERY: &str = "cultural-imagery";
pub const RULE_IMAGE_SENSITIVITY: &str = "image-sensitivity-consistency";
pub const RULE_RESPECTFUL_LANGUAGE: &str = "respectful-language";

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    Visual,
    Textual,
    Contextual,
    Ceremonial,
}

/// Identity and policy attributes of a rule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub category: RuleCategory,
    /// Tier that this rule's violations force on the content, if any.
    pub escalation: Option<SensitivityTier>,
}

/// A rule could not produce a result. The engine downgrades this to a
/// system warning and keeps going.
#[derive(Debug, Clone, thiserror::Error)]
#[error("rule {rule_id} failed to execute: {message}")]
pub struct RuleExecutionError {
    pub rule_id: String,
    pub message: String,
}

/// A pure check over extracted content.
///
/// Implementations must not mutate shared state and should return an empty
/// result rather than an error for content they do not understand.
pub trait ValidationRule: Send + Sync {
    fn descriptor(&self) -> &RuleDescriptor;

    fn evaluate(&self, content: &ExtractedContent<'_>)
        -> Result<ValidationResult, RuleExecutionError>;
}

// ---------------------------------------------------------------------------
// Declarative match rule
// ---------------------------------------------------------------------------

/// Which part of the content a match rule scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTarget {
    /// The extracted text (title, body, summary, blocks).
    Text,
    /// Alt text and caption of every image.
    Images,
    /// Alt text and caption of images declared `public`.
    PublicImages,
}

/// What a match produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    Violation {
        /// `{term}` / `{preferred}` template.
        suggested_fix: Option<String>,
    },
    Warning {
        category: WarningCategory,
        requires_review: bool,
    },
}

#[derive(Debug, Clone)]
struct CompiledTerm {
    term: String,
    preferred: Option<String>,
    pattern: Regex,
}

#[derive(Debug, Clone)]
pub struct MatchRule {
    descriptor: RuleDescriptor,
    target: MatchTarget,
    emission: Emission,
    terms: Vec<CompiledTerm>,
    message: String,
    suggestion: Option<String>,
}

impl MatchRule {
    /// Compile a rule row. Terms are `(term, preferred replacement)` pairs.
    pub fn new(
        descriptor: RuleDescriptor,
        target: MatchTarget,
        emission: Emission,
        terms: impl IntoIterator<Item = (String, Option<String>)>,
        match_mode: MatchMode,
        message: impl Into<String>,
        suggestion: Option<String>,
    ) -> Result<Self, CoreError> {
        let terms = terms
            .into_iter()
            .map(|(term, preferred)| {
                let pattern = compile_term(&term, match_mode).map_err(|e| {
                    CoreError::Validation(format!(
                        "Rule {} has an unusable term '{term}': {e}",
                        descriptor.id
                    ))
                })?;
                Ok(CompiledTerm {
                    term,
                    preferred,
                    pattern,
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        Ok(Self {
            descriptor,
            target,
            emission,
            terms,
            message: message.into(),
            suggestion,
        })
    }

    fn emit(&self, term: &CompiledTerm, location: Option<String>, out: &mut ValidationResult) {
        let render = |template: &str| render_template(template, term);
        let message = render(&self.message);

        match &self.emission {
            Emission::Violation { suggested_fix } => out.violations.push(Violation {
                rule_id: self.descriptor.id.clone(),
                message,
                severity: self.descriptor.severity,
                location,
                suggested_fix: suggested_fix.as_deref().map(render),
                term: Some(term.term.clone()),
            }),
            Emission::Warning {
                category,
                requires_review,
            } => out.warnings.push(ValidationWarning {
                message,
                category: *category,
                requires_review: *requires_review,
                term: Some(term.term.clone()),
            }),
        }

        if let Some(template) = &self.suggestion {
            let suggestion = render(template);
            if !out.suggestions.contains(&suggestion) {
                out.suggestions.push(suggestion);
            }
        }
    }

    fn scan_images(
        &self,
        content: &ExtractedContent<'_>,
        public_only: bool,
        out: &mut ValidationResult,
    ) {
        let images = content.media.iter().filter(|(_, media, _)| {
            media.is_image()
                && (!public_only || media.declared_sensitivity == Some(SensitivityTier::Public))
        });
        for (index, _, text) in images {
            for term in self.terms.iter().filter(|t| t.pattern.is_match(text)) {
                self.emit(term, Some(format!("media[{index}]")), out);
            }
        }
    }
}

impl ValidationRule for MatchRule {
    fn descriptor(&self) -> &RuleDescriptor {
        &self.descriptor
    }

    fn evaluate(
        &self,
        content: &ExtractedContent<'_>,
    ) -> Result<ValidationResult, RuleExecutionError> {
        let mut out = ValidationResult::default();
        match self.target {
            MatchTarget::Text => {
                // One finding per distinct term, in table order.
                for term in self.terms.iter().filter(|t| t.pattern.is_match(&content.text)) {
                    self.emit(term, None, &mut out);
                }
            }
            MatchTarget::Images => self.scan_images(content, false, &mut out),
            MatchTarget::PublicImages => self.scan_images(content, true, &mut out),
        }
        Ok(out)
    }
}

fn compile_term(term: &str, mode: MatchMode) -> Result<Regex, regex::Error> {
    let escaped = regex::escape(term.trim());
    let pattern = match mode {
        MatchMode::Substring => format!("(?i){escaped}"),
        MatchMode::Word => format!(r"(?i)\b{escaped}\b"),
    };
    Regex::new(&pattern)
}

fn render_template(template: &str, term: &CompiledTerm) -> String {
    let rendered = template.replace("{term}", &term.term);
    match &term.preferred {
        Some(preferred) => rendered.replace("{preferred}", preferred),
        None => rendered,
    }
}

// ---------------------------------------------------------------------------
// Built-in rule table
// ---------------------------------------------------------------------------

fn descriptor(
    id: &str,
    name: &str,
    description: &str,
    severity: Severity,
    category: RuleCategory,
    escalation: Option<SensitivityTier>,
) -> RuleDescriptor {
    RuleDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        severity,
        category,
        escalation,
    }
}

fn plain_terms(list: &TermList) -> impl Iterator<Item = (String, Option<String>)> + '_ {
    list.terms.iter().map(|t| (t.clone(), None))
}

/// Build the built-in rules from configuration, in evaluation order.
pub fn build_rules(config: &ProtocolConfig) -> Result<Vec<MatchRule>, CoreError> {
    Ok(vec![
        MatchRule::new(
            descriptor(
                RULE_SACRED_CONTENT,
                "Sacred content detection",
                "Blocks content that references ceremonies, sacred sites or restricted business",
                Severity::Error,
                RuleCategory::Ceremonial,
                Some(SensitivityTier::Sacred),
            ),
            MatchTarget::Text,
            Emission::Violation {
                suggested_fix: Some(
                    "Mark this content as sacred or restricted and add access controls".into(),
                ),
            },
            plain_terms(&config.sacred_terms),
            config.sacred_terms.match_mode,
            "Content references sacred material: '{term}'",
            None,
        )?,
        MatchRule::new(
            descriptor(
                RULE_GENDER_SPECIFIC,
                "Gender-specific content",
                "Flags men's and women's business for review by an appropriate advisor",
                Severity::Warning,
                RuleCategory::Ceremonial,
                Some(SensitivityTier::Sensitive),
            ),
            MatchTarget::Text,
            Emission::Warning {
                category: WarningCategory::GenderSpecific,
                requires_review: true,
            },
            plain_terms(&config.gender_terms),
            config.gender_terms.match_mode,
            "Content references gender-specific business: '{term}'",
            Some("Confirm with an appropriate cultural advisor that content about '{term}' may be shared with this audience".into()),
        )?,
        MatchRule::new(
            descriptor(
                RULE_ELDER_APPROVAL,
                "Elder approval trigger",
                "Recommends Elder review for content about Elders, ancestors, sites or knowledge",
                Severity::Warning,
                RuleCategory::Contextual,
                Some(SensitivityTier::Sensitive),
            ),
            MatchTarget::Text,
            Emission::Warning {
                category: WarningCategory::ElderApproval,
                requires_review: true,
            },
            plain_terms(&config.elder_terms),
            config.elder_terms.match_mode,
            "Content mentions '{term}' and should be reviewed by an Elder",
            Some("Request Elder review before publishing".into()),
        )?,
        MatchRule::new(
            descriptor(
                RULE_CULTURAL_IMAGERY,
                "Cultural imagery check",
                "Flags images whose description references cultural symbols",
                Severity::Warning,
                RuleCategory::Visual,
                None,
            ),
            MatchTarget::Images,
            Emission::Warning {
                category: WarningCategory::CulturalImagery,
                requires_review: true,
            },
            plain_terms(&config.imagery_terms),
            config.imagery_terms.match_mode,
            "Image description references cultural symbol '{term}'; confirm permission to use this imagery",
            Some("Record the artist and community permission for images showing '{term}'".into()),
        )?,
        MatchRule::new(
            descriptor(
                RULE_IMAGE_SENSITIVITY,
                "Image sensitivity consistency",
                "Blocks images declared public whose description references sacred material",
                Severity::Error,
                RuleCategory::Visual,
                Some(SensitivityTier::Sacred),
            ),
            MatchTarget::PublicImages,
            Emission::Violation {
                suggested_fix: Some(
                    "Raise the image's declared sensitivity to sacred or restricted, or remove it"
                        .into(),
                ),
            },
            plain_terms(&config.sacred_terms),
            config.sacred_terms.match_mode,
            "Image is declared public but its description references sacred material: '{term}'",
            None,
        )?,
        MatchRule::new(
            descriptor(
                RULE_RESPECTFUL_LANGUAGE,
                "Respectful language",
                "Suggests preferred terms in place of outdated or offensive ones",
                Severity::Warning,
                RuleCategory::Textual,
                None,
            ),
            MatchTarget::Text,
            Emission::Warning {
                category: WarningCategory::Language,
                requires_review: false,
            },
            config
                .discouraged_language
                .entries
                .iter()
                .map(|e| (e.term.clone(), Some(e.preferred.clone()))),
            config.discouraged_language.match_mode,
            "The term '{term}' is considered disrespectful",
            Some("Use '{preferred}' instead of '{term}'".into()),
        )?,
    ])
}
