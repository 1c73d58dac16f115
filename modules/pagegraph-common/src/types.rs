use serde::{Deserialize, Serialize};

// --- Input Types ---

/// One page of extracted document text. Produced by the PDF extraction step;
/// read-only to the ingest pipeline. Missing metadata fields deserialize as
/// empty so that provenance references keep a fixed field layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub doc_id: String,
    #[serde(default)]
    pub page_id: String,
    #[serde(default)]
    pub page_number: Option<u32>,
    #[serde(default)]
    pub source_uri: String,
    pub text: String,
}

/// A raw span produced by entity recognition, scoped to one page's text.
///
/// `start`/`end` are byte offsets into the page text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// Category tag as emitted by the recognizer, e.g. `PERSON` or `LOC`.
    pub tag: String,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

// --- Enums ---

/// Semantic category of an entity node. Each category maps to exactly one
/// node label in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Person,
    Location,
    Organization,
}

impl EntityCategory {
    pub const ALL: [EntityCategory; 3] = [
        EntityCategory::Person,
        EntityCategory::Location,
        EntityCategory::Organization,
    ];

    /// Graph node label.
    pub fn label(&self) -> &'static str {
        match self {
            EntityCategory::Person => "Person",
            EntityCategory::Location => "Location",
            EntityCategory::Organization => "Organization",
        }
    }

    /// Lowercase key used as the `entity_id` prefix.
    pub fn key(&self) -> &'static str {
        match self {
            EntityCategory::Person => "person",
            EntityCategory::Location => "location",
            EntityCategory::Organization => "organization",
        }
    }

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "person" => Some(EntityCategory::Person),
            "location" => Some(EntityCategory::Location),
            "organization" | "organisation" => Some(EntityCategory::Organization),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

// --- Graph Contributions ---

/// One page's contribution to an entity node: the representative mention
/// for this identity on this page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityContribution {
    pub entity_id: String,
    pub category: EntityCategory,
    /// Whitespace-normalized surface text (case preserved).
    pub name: String,
    /// Encoded [`crate::MentionRef`] for the representative mention.
    pub reference: String,
}

/// An unordered co-occurrence pair stored in canonical orientation
/// (`a_id < b_id`), carrying the page-level reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CooccurrencePair {
    pub a_id: String,
    pub b_id: String,
    /// Encoded [`crate::PageRef`].
    pub reference: String,
}
