use std::collections::{BTreeSet, HashMap};

use crate::types::{EntityCategory, Mention};

/// Separates the category key from the normalized name in an `entity_id`.
pub const ID_DELIMITER: char = ':';

/// Trim and collapse internal whitespace runs to single spaces.
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Stable identity for a (category, surface text) pair: `"{category}:{normalized lowercase name}"`.
pub fn entity_id(category: EntityCategory, text: &str) -> String {
    format!(
        "{}{}{}",
        category.key(),
        ID_DELIMITER,
        normalize_text(text).to_lowercase()
    )
}

/// A mention that survived the category allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMention {
    pub entity_id: String,
    pub category: EntityCategory,
    pub name: String,
}

/// Maps recognizer tags onto entity categories. Tags not in the map are
/// dropped without error.
#[derive(Debug, Clone)]
pub struct Normalizer {
    tags: HashMap<String, EntityCategory>,
}

impl Normalizer {
    /// Default allow-list: `PERSON` and `LOC`/`LOCATION`.
    pub fn new() -> Self {
        Self {
            tags: HashMap::new(),
        }
        .with_tag("PERSON", EntityCategory::Person)
        .with_tag("LOC", EntityCategory::Location)
        .with_tag("LOCATION", EntityCategory::Location)
    }

    /// Extend the allow-list. Tags are matched case-insensitively.
    pub fn with_tag(mut self, tag: &str, category: EntityCategory) -> Self {
        self.tags.insert(tag.trim().to_uppercase(), category);
        self
    }

    pub fn category_for(&self, tag: &str) -> Option<EntityCategory> {
        self.tags.get(&tag.trim().to_uppercase()).copied()
    }

    /// Categories reachable through the allow-list, in stable order.
    pub fn categories(&self) -> BTreeSet<EntityCategory> {
        self.tags.values().copied().collect()
    }

    pub fn normalize(&self, mention: &Mention) -> Option<NormalizedMention> {
        let category = self.category_for(&mention.tag)?;
        Some(NormalizedMention {
            entity_id: entity_id(category, &mention.text),
            category,
            name: normalize_text(&mention.text),
        })
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}
