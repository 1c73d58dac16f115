use neo4rs::{query, BoltMap, BoltString, BoltType};
use tracing::debug;

use pagegraph_common::{CooccurrencePair, EntityCategory, EntityContribution};

use crate::migrate::ensure_entity_constraint;
use crate::GraphClient;

// Entity upserts: merge on entity_id, refresh the display name, append the ref.
// Refs accumulate; they are never replaced or deduplicated here.

const UPSERT_PERSON: &str = "UNWIND $entities AS e
     MERGE (n:Person {entity_id: e.entity_id})
     SET n.name = e.name,
         n.refs = coalesce(n.refs, []) + e.ref
     RETURN count(n) AS merged";

const UPSERT_LOCATION: &str = "UNWIND $entities AS e
     MERGE (n:Location {entity_id: e.entity_id})
     SET n.name = e.name,
         n.refs = coalesce(n.refs, []) + e.ref
     RETURN count(n) AS merged";

const UPSERT_ORGANIZATION: &str = "UNWIND $entities AS e
     MERGE (n:Organization {entity_id: e.entity_id})
     SET n.name = e.name,
         n.refs = coalesce(n.refs, []) + e.ref
     RETURN count(n) AS merged";

// Pairs arrive canonicalized (a_id < b_id), so one directed MERGE per pair
// keeps a single edge per unordered pair.
const UPSERT_RELATES_TO: &str = "UNWIND $pairs AS p
     MATCH (a) WHERE a.entity_id = p.a_id AND (a:Person OR a:Location OR a:Organization)
     MATCH (b) WHERE b.entity_id = p.b_id AND (b:Person OR b:Location OR b:Organization)
     MERGE (a)-[r:RELATES_TO]->(b)
     SET r.count = coalesce(r.count, 0) + 1,
         r.refs = coalesce(r.refs, []) + p.ref
     RETURN count(r) AS merged";

pub(crate) fn upsert_statement(category: EntityCategory) -> &'static str {
    match category {
        EntityCategory::Person => UPSERT_PERSON,
        EntityCategory::Location => UPSERT_LOCATION,
        EntityCategory::Organization => UPSERT_ORGANIZATION,
    }
}

/// Write-side wrapper for the entity graph.
pub struct GraphWriter {
    client: GraphClient,
}

impl GraphWriter {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    pub async fn ensure_constraint(&self, category: EntityCategory) -> Result<(), neo4rs::Error> {
        ensure_entity_constraint(&self.client, category).await
    }

    /// Merge a batch of same-category entities in one statement.
    /// Returns the number of nodes touched.
    pub async fn upsert_entities(
        &self,
        category: EntityCategory,
        entities: &[EntityContribution],
    ) -> Result<u64, neo4rs::Error> {
        if entities.is_empty() {
            return Ok(0);
        }

        let rows: Vec<BoltType> = entities
            .iter()
            .map(|e| {
                bolt_map(&[
                    ("entity_id", e.entity_id.as_str()),
                    ("name", e.name.as_str()),
                    ("ref", e.reference.as_str()),
                ])
            })
            .collect();

        let q = query(upsert_statement(category)).param("entities", rows);
        let merged = self.execute_count(q).await?;
        debug!(label = category.label(), merged, "Upserted entity batch");
        Ok(merged)
    }

    /// Merge a batch of co-occurrence edges in one statement: count += 1, ref appended.
    /// Pairs whose endpoints are missing are skipped by the MATCH.
    pub async fn upsert_cooccurrences(
        &self,
        pairs: &[CooccurrencePair],
    ) -> Result<u64, neo4rs::Error> {
        if pairs.is_empty() {
            return Ok(0);
        }

        let rows: Vec<BoltType> = pairs
            .iter()
            .map(|p| {
                bolt_map(&[
                    ("a_id", p.a_id.as_str()),
                    ("b_id", p.b_id.as_str()),
                    ("ref", p.reference.as_str()),
                ])
            })
            .collect();

        let q = query(UPSERT_RELATES_TO).param("pairs", rows);
        let merged = self.execute_count(q).await?;
        debug!(merged, "Upserted RELATES_TO batch");
        Ok(merged)
    }

    async fn execute_count(&self, q: neo4rs::Query) -> Result<u64, neo4rs::Error> {
        let mut stream = self.client.graph.execute(q).await?;
        let mut merged = 0u64;
        while let Some(row) = stream.next().await? {
            let n: i64 = row.get("merged").unwrap_or(0);
            merged += n.max(0) as u64;
        }
        Ok(merged)
    }
}

fn bolt_map(fields: &[(&str, &str)]) -> BoltType {
    BoltType::Map(BoltMap::from_iter(fields.iter().map(|(k, v)| {
        (
            BoltString::from(*k),
            BoltType::String(BoltString::from(*v)),
        )
    })))
}
