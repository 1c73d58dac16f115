use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use pagegraph_common::{Normalizer, Page, PageGraphError, PageRef};

use crate::dedup::deduplicate;
use crate::extractor::MentionExtractor;
use crate::relations::derive_pairs;
use crate::traits::GraphStore;

/// What one page contributed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageOutcome {
    pub entities: usize,
    pub pairs: usize,
    pub node_batches: usize,
    pub edge_batches: usize,
}

impl PageOutcome {
    pub fn is_empty(&self) -> bool {
        self.entities == 0
    }
}

#[derive(Debug, Clone)]
pub struct RunStats {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub pages: usize,
    pub pages_without_entities: usize,
    pub entities_upserted: usize,
    pub edges_upserted: usize,
}

impl RunStats {
    fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            pages: 0,
            pages_without_entities: 0,
            entities_upserted: 0,
            edges_upserted: 0,
        }
    }

    fn record(&mut self, outcome: &PageOutcome) {
        self.pages += 1;
        if outcome.is_empty() {
            self.pages_without_entities += 1;
        }
        self.entities_upserted += outcome.entities;
        self.edges_upserted += outcome.pairs;
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let elapsed = self
            .finished_at
            .map(|end| (end - self.started_at).num_milliseconds())
            .unwrap_or(0);
        write!(
            f,
            "pages={} (no entities: {}), entity upserts={}, edge upserts={}, elapsed={}ms",
            self.pages,
            self.pages_without_entities,
            self.entities_upserted,
            self.edges_upserted,
            elapsed
        )
    }
}

/// Drives pages through normalize → dedup → pair derivation → upsert.
///
/// Owns its collaborators; they are released when the ingestor is dropped.
/// Pages are processed one at a time and the first failure ends the run.
pub struct Ingestor<S, E> {
    store: S,
    extractor: E,
    normalizer: Normalizer,
}

impl<S: GraphStore, E: MentionExtractor> Ingestor<S, E> {
    pub fn new(store: S, extractor: E, normalizer: Normalizer) -> Self {
        Self {
            store,
            extractor,
            normalizer,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Declare the uniqueness constraint for every category the normalizer admits.
    pub async fn prepare(&self) -> Result<(), PageGraphError> {
        for category in self.normalizer.categories() {
            self.store
                .declare_unique_constraint(category)
                .await
                .map_err(|e| PageGraphError::StoreWrite(format!("{e:#}")))?;
        }
        Ok(())
    }

    /// Process every page in order. Stops at the first failing page.
    pub async fn run(&self, pages: &[Page]) -> Result<RunStats, PageGraphError> {
        let mut stats = RunStats::new();
        info!(run_id = %stats.run_id, pages = pages.len(), "Ingest run starting");

        for page in pages {
            let outcome = self.ingest_page(page).await?;
            stats.record(&outcome);
        }

        stats.finished_at = Some(Utc::now());
        info!(run_id = %stats.run_id, "Ingest run complete. {stats}");
        Ok(stats)
    }

    /// Apply one page's contribution to the store. Any failure is reported
    /// against the page's `page_id`.
    pub async fn ingest_page(&self, page: &Page) -> Result<PageOutcome, PageGraphError> {
        self.apply_page(page)
            .await
            .map_err(|source| PageGraphError::Page {
                page_id: page.page_id.clone(),
                source: Box::new(source),
            })
    }

    async fn apply_page(&self, page: &Page) -> Result<PageOutcome, PageGraphError> {
        let analysis = self
            .extractor
            .extract(&page.text)
            .await
            .map_err(|e| PageGraphError::Extraction(format!("{e:#}")))?;

        let entities = deduplicate(page, &analysis, &self.normalizer);
        if entities.is_empty() {
            debug!(page_id = page.page_id.as_str(), "No entities on page, nothing to write");
            return Ok(PageOutcome::default());
        }

        let mut outcome = PageOutcome {
            entities: entities.len(),
            ..Default::default()
        };

        for (category, batch) in entities.by_category() {
            self.store
                .upsert_nodes(category, &batch)
                .await
                .map_err(|e| PageGraphError::StoreWrite(format!("{e:#}")))?;
            outcome.node_batches += 1;
        }

        let pairs = derive_pairs(entities.ids(), &PageRef::for_page(page));
        if !pairs.is_empty() {
            self.store
                .upsert_edges(&pairs)
                .await
                .map_err(|e| PageGraphError::StoreWrite(format!("{e:#}")))?;
            outcome.edge_batches += 1;
        }
        outcome.pairs = pairs.len();

        debug!(
            page_id = page.page_id.as_str(),
            entities = outcome.entities,
            pairs = outcome.pairs,
            "Applied page"
        );
        Ok(outcome)
    }
}

/// Read the JSON array of pages written by the PDF extraction step.
pub fn load_pages(path: &Path) -> Result<Vec<Page>, PageGraphError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| PageGraphError::Input(format!("reading {}: {e}", path.display())))?;
    let pages: Vec<Page> = serde_json::from_str(&raw)
        .map_err(|e| PageGraphError::Input(format!("parsing {}: {e}", path.display())))?;
    info!(pages = pages.len(), path = %path.display(), "Loaded pages");
    Ok(pages)
}
