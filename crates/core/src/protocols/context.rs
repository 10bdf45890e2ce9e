//! Per-request metadata that accompanies a validation call.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Who the content is intended for once published.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    Internal,
    Community,
    #[default]
    Public,
    FundingBody,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Author {
    pub name: Option<String>,
    /// The community the author belongs to or speaks for.
    pub community: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
}

/// Constructed fresh for every validation call and never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ValidationContext {
    pub content_type: String,
    pub content_id: String,
    pub author: Option<Author>,
    pub location: Option<Location>,
    pub intended_audience: Audience,
    pub publication_date: Option<Timestamp>,
}

impl ValidationContext {
    pub fn new(content_type: impl Into<String>, content_id: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            content_id: content_id.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_audience(mut self, audience: Audience) -> Self {
        self.intended_audience = audience;
        self
    }

    #[must_use]
    pub fn with_author(mut self, author: Author) -> Self {
        self.author = Some(author);
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// The author is known but has not stated a community affiliation.
    pub fn author_without_community(&self) -> bool {
        self.author
            .as_ref()
            .is_some_and(|a| a.community.as_deref().is_none_or(|c| c.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audience_uses_snake_case() {
        let a: Audience = serde_json::from_str("\"funding_body\"").unwrap();
        assert_eq!(a, Audience::FundingBody);
    }

    #[test]
    fn missing_fields_default() {
        let ctx: ValidationContext = serde_json::from_str("{}").unwrap();
        assert_eq!(ctx.intended_audience, Audience::Public);
        assert!(ctx.author.is_none());
        assert!(ctx.location.is_none());
    }

    #[test]
    fn author_without_community_detection() {
        let none = ValidationContext::default();
        assert!(!none.author_without_community());

        let blank = ValidationContext::default().with_author(Author {
            name: Some("Kim".into()),
            community: Some(" ".into()),
            role: None,
        });
        assert!(blank.author_without_community());

        let known = ValidationContext::default().with_author(Author {
            community: Some("Arrernte".into()),
            ..Default::default()
        });
        assert!(!known.author_without_community());
    }
}
