//! Cultural advisors and recommending one for a consultation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::protocols::config::AdvisorPreference;
use crate::types::DbId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Advisor {
    pub id: DbId,
    pub name: String,
    pub community: Option<String>,
    /// Free-form specialty tags, e.g. "Women's Business", "Dreamtime Stories".
    pub specialties: Vec<String>,
    pub is_active: bool,
}

impl Advisor {
    pub fn has_specialty(&self, specialty: &str) -> bool {
        self.specialties
            .iter()
            .any(|s| s.trim().eq_ignore_ascii_case(specialty.trim()))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAdvisor {
    #[validate(length(min = 1, max = 200, message = "name is required"))]
    pub name: String,
    pub community: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
}

impl CreateAdvisor {
    pub fn validated(self) -> Result<Self, CoreError> {
        let trimmed = Self {
            name: self.name.trim().to_string(),
            community: self
                .community
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            specialties: self
                .specialties
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        };
        trimmed
            .validate()
            .map_err(|e| CoreError::Validation(format!("Invalid advisor: {e}")))?;
        Ok(trimmed)
    }
}

/// Pick the advisor to recommend for a consultation.
///
/// Preferences are tried in order. The first preference with a trigger among
/// `triggers` selects the first active advisor holding one of its
/// specialties (specialties are tried in the order listed). With no match,
/// the first active advisor is returned. Inactive advisors are never chosen.
pub fn select_advisor<'a>(
    advisors: &'a [Advisor],
    triggers: &[String],
    preferences: &[AdvisorPreference],
) -> Option<&'a Advisor> {
    let active = || advisors.iter().filter(|a| a.is_active);

    let triggered = preferences.iter().filter(|pref| {
        pref.triggers
            .iter()
            .any(|t| triggers.iter().any(|m| m.eq_ignore_ascii_case(t)))
    });
    for pref in triggered {
        for specialty in &pref.specialties {
            if let Some(advisor) = active().find(|a| a.has_specialty(specialty)) {
                return Some(advisor);
            }
        }
    }

    active().next()
}
