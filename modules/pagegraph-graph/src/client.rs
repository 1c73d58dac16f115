use neo4rs::{ConfigBuilder, Graph};
use tracing::info;

use pagegraph_common::Config;

const FETCH_SIZE: usize = 500;
const MAX_CONNECTIONS: usize = 4;

/// Connection pool to the graph holding Person/Location nodes and their
/// RELATES_TO edges. Cloning shares the pool.
///
/// Owned by the caller for the duration of a run; the pool is released when
/// the last clone is dropped.
#[derive(Clone)]
pub struct GraphClient {
    pub(crate) graph: Graph,
}

impl GraphClient {
    /// Connect using the `NEO4J_*` settings of a loaded [`Config`].
    pub async fn from_config(config: &Config) -> Result<Self, neo4rs::Error> {
        let client =
            Self::connect(&config.neo4j_uri, &config.neo4j_user, &config.neo4j_password).await?;
        info!(neo4j_uri = config.neo4j_uri.as_str(), "Connected to graph");
        Ok(client)
    }

    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self, neo4rs::Error> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .fetch_size(FETCH_SIZE)
            .max_connections(MAX_CONNECTIONS)
            .build()?;
        Ok(Self {
            graph: Graph::connect(config).await?,
        })
    }
}
