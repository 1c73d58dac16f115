use neo4rs::query;

use crate::GraphClient;

/// An entity node as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord {
    pub entity_id: String,
    pub name: String,
    pub labels: Vec<String>,
    pub refs: Vec<String>,
}

/// A RELATES_TO edge as stored, in its stored orientation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRecord {
    pub from_id: String,
    pub to_id: String,
    pub count: i64,
    pub refs: Vec<String>,
}

/// An entity appearing on the same page(s) as the queried one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoMention {
    pub entity_id: String,
    pub name: String,
    pub count: i64,
    pub refs: Vec<String>,
}

/// Read-only queries over the entity graph.
pub struct GraphReader {
    client: GraphClient,
}

impl GraphReader {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    pub async fn entity(&self, entity_id: &str) -> Result<Option<EntityRecord>, neo4rs::Error> {
        let q = query(
            "MATCH (n {entity_id: $entity_id})
             RETURN n.entity_id AS entity_id, n.name AS name, labels(n) AS labels,
                    coalesce(n.refs, []) AS refs",
        )
        .param("entity_id", entity_id);

        let mut stream = self.client.graph.execute(q).await?;
        let Some(row) = stream.next().await? else {
            return Ok(None);
        };
        Ok(Some(EntityRecord {
            entity_id: row.get("entity_id").unwrap_or_default(),
            name: row.get("name").unwrap_or_default(),
            labels: row.get("labels").unwrap_or_default(),
            refs: row.get("refs").unwrap_or_default(),
        }))
    }

    /// All RELATES_TO edges between two entities, in either direction.
    pub async fn relations_between(
        &self,
        a_id: &str,
        b_id: &str,
    ) -> Result<Vec<RelationRecord>, neo4rs::Error> {
        let q = query(
            "MATCH (a {entity_id: $a_id})-[r:RELATES_TO]-(b {entity_id: $b_id})
             RETURN startNode(r).entity_id AS from_id, endNode(r).entity_id AS to_id,
                    r.count AS count, coalesce(r.refs, []) AS refs",
        )
        .param("a_id", a_id)
        .param("b_id", b_id);

        let mut stream = self.client.graph.execute(q).await?;
        let mut relations = Vec::new();
        while let Some(row) = stream.next().await? {
            relations.push(RelationRecord {
                from_id: row.get("from_id").unwrap_or_default(),
                to_id: row.get("to_id").unwrap_or_default(),
                count: row.get("count").unwrap_or(0),
                refs: row.get("refs").unwrap_or_default(),
            });
        }
        Ok(relations)
    }

    /// Entities co-mentioned with `entity_id`, strongest first.
    pub async fn co_mentions(
        &self,
        entity_id: &str,
        limit: i64,
    ) -> Result<Vec<CoMention>, neo4rs::Error> {
        let q = query(
            "MATCH (a {entity_id: $entity_id})-[r:RELATES_TO]-(b)
             RETURN b.entity_id AS entity_id, b.name AS name,
                    r.count AS count, coalesce(r.refs, []) AS refs
             ORDER BY count DESC, entity_id
             LIMIT $limit",
        )
        .param("entity_id", entity_id)
        .param("limit", limit);

        let mut stream = self.client.graph.execute(q).await?;
        let mut out = Vec::new();
        while let Some(row) = stream.next().await? {
            out.push(CoMention {
                entity_id: row.get("entity_id").unwrap_or_default(),
                name: row.get("name").unwrap_or_default(),
                count: row.get("count").unwrap_or(0),
                refs: row.get("refs").unwrap_or_default(),
            });
        }
        Ok(out)
    }

    /// Number of entity nodes with the given label-free id (0 or 1 under the constraint).
    pub async fn count_entities(&self, entity_id: &str) -> Result<i64, neo4rs::Error> {
        let q = query("MATCH (n {entity_id: $entity_id}) RETURN count(n) AS n")
            .param("entity_id", entity_id);
        let mut stream = self.client.graph.execute(q).await?;
        match stream.next().await? {
            Some(row) => Ok(row.get("n").unwrap_or(0)),
            None => Ok(0),
        }
    }
}
