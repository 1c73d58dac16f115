use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::ops::Range;

use tracing::debug;

use pagegraph_common::{EntityCategory, EntityContribution, MentionRef, Normalizer, Page};

use crate::extractor::PageAnalysis;

/// Characters of context kept on each side of a mention when no sentence encloses it.
pub const SNIPPET_WINDOW_CHARS: usize = 80;

/// The deduplicated entities of one page, keyed (and ordered) by `entity_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageEntities {
    entities: BTreeMap<String, EntityContribution>,
}

impl PageEntities {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn get(&self, entity_id: &str) -> Option<&EntityContribution> {
        self.entities.get(entity_id)
    }

    /// Entity ids in lexicographic order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entities.keys().map(String::as_str)
    }

    /// Contributions grouped by node category, each group in id order.
    pub fn by_category(&self) -> BTreeMap<EntityCategory, Vec<EntityContribution>> {
        let mut groups: BTreeMap<EntityCategory, Vec<EntityContribution>> = BTreeMap::new();
        for e in self.entities.values() {
            groups.entry(e.category).or_default().push(e.clone());
        }
        groups
    }
}

/// Collapse a page's mentions to one contribution per identity.
///
/// Mentions are visited in text order; the first mention of an identity is
/// its representative and supplies the snippet. Later mentions of the same
/// identity on this page are dropped.
pub fn deduplicate(page: &Page, analysis: &PageAnalysis, normalizer: &Normalizer) -> PageEntities {
    let mut mentions: Vec<_> = analysis.mentions.iter().collect();
    mentions.sort_by_key(|m| (m.start, m.end));

    let mut entities = BTreeMap::new();
    let mut dropped = 0usize;

    for mention in mentions {
        let Some(normalized) = normalizer.normalize(mention) else {
            debug!(tag = mention.tag.as_str(), "Dropping mention with unlisted tag");
            dropped += 1;
            continue;
        };

        if let Entry::Vacant(slot) = entities.entry(normalized.entity_id.clone()) {
            let snippet = snippet_for(&page.text, &analysis.sentences, mention.start, mention.end);
            slot.insert(EntityContribution {
                entity_id: normalized.entity_id,
                category: normalized.category,
                name: normalized.name,
                reference: MentionRef::for_page(page, snippet).encode(),
            });
        }
    }

    debug!(
        page_id = page.page_id.as_str(),
        mentions = analysis.mentions.len(),
        dropped,
        entities = entities.len(),
        "Deduplicated page mentions"
    );

    PageEntities { entities }
}

/// The trimmed sentence containing `start`, or a window of
/// [`SNIPPET_WINDOW_CHARS`] characters either side of the span.
pub fn snippet_for(text: &str, sentences: &[Range<usize>], start: usize, end: usize) -> String {
    let enclosing = sentences
        .iter()
        .find(|s| s.start <= start && start < s.end)
        .and_then(|s| text.get(s.clone()));
    if let Some(sentence) = enclosing {
        return sentence.trim().to_string();
    }

    let start = floor_char_boundary(text, start);
    let end = floor_char_boundary(text, end.max(start));

    let window_start = text[..start]
        .char_indices()
        .rev()
        .nth(SNIPPET_WINDOW_CHARS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let window_end = text[end..]
        .char_indices()
        .nth(SNIPPET_WINDOW_CHARS)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    text[window_start..window_end].trim().to_string()
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut i = index.min(text.len());
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}
