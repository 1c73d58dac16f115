// Test doubles for the ingest pipeline.
//
// - MemoryGraphStore (GraphStore) — stateful in-memory graph with MERGE
//   semantics matching the Neo4j statements, a call log, and failure injection
// - FixedExtractor (MentionExtractor) — text→PageAnalysis map
//
// Plus helpers for building pages and mentions.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use pagegraph_common::{CooccurrencePair, EntityCategory, EntityContribution, Mention, Page};

use crate::extractor::{MentionExtractor, PageAnalysis};
use crate::traits::GraphStore;

// ---------------------------------------------------------------------------
// MemoryGraphStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredNode {
    pub category: EntityCategory,
    pub name: String,
    pub refs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEdge {
    pub count: u64,
    pub refs: Vec<String>,
}

/// One call made against the store, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Constraint(EntityCategory),
    Nodes(EntityCategory, usize),
    Edges(usize),
}

#[derive(Default)]
struct MemoryState {
    constraints: Vec<EntityCategory>,
    nodes: BTreeMap<String, StoredNode>,
    /// Keyed by stored orientation (from, to).
    edges: BTreeMap<(String, String), StoredEdge>,
    calls: Vec<StoreCall>,
    writes: usize,
    fail_on_write: Option<usize>,
}

/// In-memory graph with the same merge semantics as the Neo4j writer.
#[derive(Default)]
pub struct MemoryGraphStore {
    state: Mutex<MemoryState>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`th write call (1-based), as an unavailable store would.
    pub fn failing_on_write(self, n: usize) -> Self {
        self.state.lock().unwrap().fail_on_write = Some(n);
        self
    }

    pub fn node(&self, entity_id: &str) -> Option<StoredNode> {
        self.state.lock().unwrap().nodes.get(entity_id).cloned()
    }

    pub fn node_count(&self) -> usize {
        self.state.lock().unwrap().nodes.len()
    }

    /// All edges between two entities, in either orientation.
    pub fn edges_between(&self, a: &str, b: &str) -> Vec<StoredEdge> {
        let state = self.state.lock().unwrap();
        [(a, b), (b, a)]
            .iter()
            .filter_map(|(x, y)| state.edges.get(&(x.to_string(), y.to_string())).cloned())
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.state.lock().unwrap().edges.len()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn constraints(&self) -> Vec<EntityCategory> {
        self.state.lock().unwrap().constraints.clone()
    }

    fn begin_write(state: &mut MemoryState) -> Result<()> {
        state.writes += 1;
        if state.fail_on_write == Some(state.writes) {
            bail!("graph store unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn declare_unique_constraint(&self, category: EntityCategory) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall::Constraint(category));
        if !state.constraints.contains(&category) {
            state.constraints.push(category);
        }
        Ok(())
    }

    async fn upsert_nodes(
        &self,
        category: EntityCategory,
        entities: &[EntityContribution],
    ) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        Self::begin_write(&mut state)?;
        state.calls.push(StoreCall::Nodes(category, entities.len()));

        for e in entities {
            let node = state
                .nodes
                .entry(e.entity_id.clone())
                .or_insert_with(|| StoredNode {
                    category,
                    name: String::new(),
                    refs: Vec::new(),
                });
            node.name = e.name.clone();
            node.refs.push(e.reference.clone());
        }
        Ok(entities.len() as u64)
    }

    async fn upsert_edges(&self, pairs: &[CooccurrencePair]) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        Self::begin_write(&mut state)?;
        state.calls.push(StoreCall::Edges(pairs.len()));

        let mut merged = 0;
        for p in pairs {
            if !state.nodes.contains_key(&p.a_id) || !state.nodes.contains_key(&p.b_id) {
                continue;
            }
            let edge = state
                .edges
                .entry((p.a_id.clone(), p.b_id.clone()))
                .or_insert_with(|| StoredEdge {
                    count: 0,
                    refs: Vec::new(),
                });
            edge.count += 1;
            edge.refs.push(p.reference.clone());
            merged += 1;
        }
        Ok(merged)
    }
}

// ---------------------------------------------------------------------------
// FixedExtractor
// ---------------------------------------------------------------------------

/// Returns a preset analysis per page text. Unregistered text is an error.
#[derive(Default)]
pub struct FixedExtractor {
    analyses: HashMap<String, PageAnalysis>,
}

impl FixedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_text(mut self, text: &str, analysis: PageAnalysis) -> Self {
        self.analyses.insert(text.to_string(), analysis);
        self
    }
}

#[async_trait]
impl MentionExtractor for FixedExtractor {
    async fn extract(&self, text: &str) -> Result<PageAnalysis> {
        match self.analyses.get(text) {
            Some(analysis) => Ok(analysis.clone()),
            None => bail!("recognizer has no result for text {:?}", text.chars().take(40).collect::<String>()),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn page(doc_id: &str, number: u32, text: &str) -> Page {
    Page {
        doc_id: doc_id.to_string(),
        page_id: format!("{doc_id}#p{number:02}"),
        page_number: Some(number),
        source_uri: format!("file://{}.pdf", doc_id.to_lowercase()),
        text: text.to_string(),
    }
}

/// Mention of the `nth` occurrence of `surface` in `text`.
pub fn mention_at(text: &str, tag: &str, surface: &str, nth: usize) -> Mention {
    let start = text
        .match_indices(surface)
        .nth(nth)
        .map(|(i, _)| i)
        .unwrap_or_else(|| panic!("{surface:?} occurrence {nth} not in text"));
    Mention {
        tag: tag.to_string(),
        text: surface.to_string(),
        start,
        end: start + surface.len(),
    }
}
