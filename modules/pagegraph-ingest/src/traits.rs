// Store collaborator boundary.
//
// GraphStore is what the pipeline needs from the persistent graph. The
// production implementation is GraphWriter (Neo4j); tests use
// MemoryGraphStore from `testing`.
//
// Contract every implementation must honor:
// - upsert_nodes merges on entity_id: create if absent, set name, append the
//   ref to the node's refs. Refs accumulate; re-running a page re-appends.
// - upsert_edges merges on the (a_id, b_id) endpoint pair: create if absent,
//   count += 1, append the ref. Pairs whose endpoints don't exist are skipped.
//   Concurrent increments of one edge must not be lost.
// - declare_unique_constraint is idempotent.

use anyhow::Result;
use async_trait::async_trait;

use pagegraph_common::{CooccurrencePair, EntityCategory, EntityContribution};
use pagegraph_graph::GraphWriter;

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Declare `entity_id` unique for the category's node label.
    async fn declare_unique_constraint(&self, category: EntityCategory) -> Result<()>;

    /// Merge one batch of same-category entities. Returns nodes touched.
    async fn upsert_nodes(
        &self,
        category: EntityCategory,
        entities: &[EntityContribution],
    ) -> Result<u64>;

    /// Merge one batch of co-occurrence edges. Returns edges touched.
    async fn upsert_edges(&self, pairs: &[CooccurrencePair]) -> Result<u64>;
}

#[async_trait]
impl GraphStore for GraphWriter {
    async fn declare_unique_constraint(&self, category: EntityCategory) -> Result<()> {
        Ok(self.ensure_constraint(category).await?)
    }

    async fn upsert_nodes(
        &self,
        category: EntityCategory,
        entities: &[EntityContribution],
    ) -> Result<u64> {
        Ok(self.upsert_entities(category, entities).await?)
    }

    async fn upsert_edges(&self, pairs: &[CooccurrencePair]) -> Result<u64> {
        Ok(self.upsert_cooccurrences(pairs).await?)
    }
}
