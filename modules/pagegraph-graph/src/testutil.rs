//! Disposable Neo4j for store contract tests.

use testcontainers::{
    core::{ContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

use pagegraph_common::EntityCategory;

use crate::migrate::migrate;
use crate::GraphClient;

const IMAGE_TAG: &str = "5.25.1-community";
const BOLT_PORT: u16 = 7687;
const USER: &str = "neo4j";
const PASSWORD: &str = "testpassword";

/// A running Neo4j with every category's `entity_id` constraint in place.
///
/// Stopping happens when this is dropped, so keep it bound for the whole test.
pub struct TestGraph {
    _container: ContainerAsync<GenericImage>,
    pub client: GraphClient,
}

pub async fn migrated_graph() -> TestGraph {
    let container = GenericImage::new("neo4j", IMAGE_TAG)
        .with_exposed_port(ContainerPort::Tcp(BOLT_PORT))
        .with_wait_for(WaitFor::message_on_stdout("Started."))
        .with_env_var("NEO4J_AUTH", format!("{USER}/{PASSWORD}"))
        .start()
        .await
        .expect("neo4j container should start");

    let port = container
        .get_host_port_ipv4(BOLT_PORT)
        .await
        .expect("bolt port should be mapped");

    let client = GraphClient::connect(&format!("bolt://127.0.0.1:{port}"), USER, PASSWORD)
        .await
        .expect("test graph should accept connections");

    migrate(&client, EntityCategory::ALL)
        .await
        .expect("constraints should apply to a fresh graph");

    TestGraph {
        _container: container,
        client,
    }
}
