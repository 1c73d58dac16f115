use neo4rs::query;
use tracing::{info, warn};

use pagegraph_common::EntityCategory;

use crate::GraphClient;

/// Uniqueness constraint on `entity_id` for one node category.
/// One fixed statement per category; labels never come from input.
pub(crate) fn unique_entity_id_constraint(category: EntityCategory) -> &'static str {
    match category {
        EntityCategory::Person => {
            "CREATE CONSTRAINT person_entity_id_unique IF NOT EXISTS FOR (n:Person) REQUIRE n.entity_id IS UNIQUE"
        }
        EntityCategory::Location => {
            "CREATE CONSTRAINT location_entity_id_unique IF NOT EXISTS FOR (n:Location) REQUIRE n.entity_id IS UNIQUE"
        }
        EntityCategory::Organization => {
            "CREATE CONSTRAINT organization_entity_id_unique IF NOT EXISTS FOR (n:Organization) REQUIRE n.entity_id IS UNIQUE"
        }
    }
}

/// Declare the `entity_id` uniqueness constraint for one category. Idempotent.
pub async fn ensure_entity_constraint(
    client: &GraphClient,
    category: EntityCategory,
) -> Result<(), neo4rs::Error> {
    run_ignoring_exists(&client.graph, unique_entity_id_constraint(category)).await?;
    info!(label = category.label(), "entity_id uniqueness constraint ensured");
    Ok(())
}

/// Run idempotent schema migrations for the given categories.
pub async fn migrate(
    client: &GraphClient,
    categories: impl IntoIterator<Item = EntityCategory>,
) -> Result<(), neo4rs::Error> {
    info!("Running schema migrations...");

    for category in categories {
        ensure_entity_constraint(client, category).await?;
    }

    info!("Schema migration complete");
    Ok(())
}

/// Run a Cypher statement, ignoring errors that indicate the constraint already exists.
/// `IF NOT EXISTS` covers this on Neo4j 5; older servers report an equivalent constraint instead.
async fn run_ignoring_exists(g: &neo4rs::Graph, cypher: &str) -> Result<(), neo4rs::Error> {
    match g.run(query(cypher)).await {
        Ok(_) => Ok(()),
        Err(e) => {
            let msg = e.to_string().to_lowercase();
            if msg.contains("already exists") || msg.contains("equivalent") {
                warn!("Already exists (skipped): {}", cypher.chars().take(80).collect::<String>());
                Ok(())
            } else {
                Err(e)
            }
        }
    }
}
