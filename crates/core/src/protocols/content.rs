//! The content item under validation and the shared text extraction helper.

use serde::{Deserialize, Serialize};

use super::sensitivity::SensitivityTier;

/// A story, blog post, or other content row as read from the content store.
///
/// The validator only ever reads this value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ContentItem {
    pub title: Option<String>,
    /// Main body text.
    pub body: Option<String>,
    pub summary: Option<String>,
    /// Structured rich-text blocks, possibly nested.
    pub blocks: Vec<ContentBlock>,
    /// Attached media in display order.
    pub media: Vec<MediaDescriptor>,
    pub tags: Vec<String>,
}

/// A rich-text block. Blocks may contain child blocks (lists, quotes, columns).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ContentBlock {
    pub text: Option<String>,
    pub children: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Document,
}

/// An attached media file as described by its uploader.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaDescriptor {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    /// Sensitivity declared by the uploader, if any.
    #[serde(default)]
    pub declared_sensitivity: Option<SensitivityTier>,
}

impl MediaDescriptor {
    pub fn is_image(&self) -> bool {
        self.kind == MediaKind::Image
    }

    /// Alt text and caption joined and lowercased for matching.
    pub fn searchable_text(&self) -> String {
        join_lowercase([self.alt_text.as_deref(), self.caption.as_deref()])
    }
}

/// Lowercased text views of a [`ContentItem`], computed once per validation.
#[derive(Debug, Clone)]
pub struct ExtractedContent<'a> {
    pub item: &'a ContentItem,
    /// Title, body, summary and every nested block, lowercased.
    pub text: String,
    /// One entry per media item, in order: `(index, descriptor, lowercased alt/caption)`.
    pub media: Vec<(usize, &'a MediaDescriptor, String)>,
}

impl<'a> ExtractedContent<'a> {
    pub fn new(item: &'a ContentItem) -> Self {
        let media = item
            .media
            .iter()
            .enumerate()
            .map(|(i, m)| (i, m, m.searchable_text()))
            .collect();
        Self {
            item,
            text: extract_text(item),
            media,
        }
    }
}

/// Concatenate every text field of `item` into one lowercase string.
///
/// Order: title, body, summary, then blocks depth-first. Fields are separated
/// by a single space so that terms never match across a field boundary by
/// accident of adjacency.
pub fn extract_text(item: &ContentItem) -> String {
    let mut parts: Vec<&str> = Vec::new();
    parts.extend(item.title.as_deref());
    parts.extend(item.body.as_deref());
    parts.extend(item.summary.as_deref());
    for block in &item.blocks {
        collect_block_text(block, &mut parts);
    }
    join_lowercase(parts.into_iter().map(Some))
}

fn collect_block_text<'a>(block: &'a ContentBlock, out: &mut Vec<&'a str>) {
    out.extend(block.text.as_deref());
    for child in &block.children {
        collect_block_text(child, out);
    }
}

fn join_lowercase<'a>(parts: impl IntoIterator<Item = Option<&'a str>>) -> String {
    parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
