#![cfg(feature = "test-utils")]

// Store contract tests: merge-by-key for entities, merge-by-endpoint-pair for
// RELATES_TO edges, against a real Neo4j.
//
// Requirements: Docker (for Neo4j via testcontainers)
//
// Run with: cargo test -p pagegraph-graph --features test-utils --test upsert_contract_test

use pagegraph_common::{
    entity_id, CooccurrencePair, EntityCategory, EntityContribution, MentionRef, Page, PageRef,
};
use pagegraph_graph::testutil::migrated_graph;
use pagegraph_graph::{migrate::migrate, GraphReader, GraphWriter};

fn page(n: u32) -> Page {
    Page {
        doc_id: "D1".into(),
        page_id: format!("D1#p{n:02}"),
        page_number: Some(n),
        source_uri: "file://d1.pdf".into(),
        text: String::new(),
    }
}

fn contribution(category: EntityCategory, name: &str, page: &Page) -> EntityContribution {
    EntityContribution {
        entity_id: entity_id(category, name),
        category,
        name: name.to_string(),
        reference: MentionRef::for_page(page, format!("{name} was here.")).encode(),
    }
}

fn pair(a: &str, b: &str, page: &Page) -> CooccurrencePair {
    CooccurrencePair {
        a_id: a.to_string(),
        b_id: b.to_string(),
        reference: PageRef::for_page(page).encode(),
    }
}

#[tokio::test]
async fn migrate_is_idempotent() {
    let graph = migrated_graph().await;
    let client = graph.client.clone();
    migrate(&client, EntityCategory::ALL)
        .await
        .expect("second migration should succeed");
}

#[tokio::test]
async fn entity_upsert_merges_on_entity_id() {
    let graph = migrated_graph().await;
    let client = graph.client.clone();
    let writer = GraphWriter::new(client.clone());
    let reader = GraphReader::new(client);
    let p1 = page(1);

    let batch = vec![
        contribution(EntityCategory::Person, "Alice", &p1),
        contribution(EntityCategory::Person, "Bob", &p1),
    ];
    assert_eq!(writer.upsert_entities(EntityCategory::Person, &batch).await.unwrap(), 2);
    writer.upsert_entities(EntityCategory::Person, &batch).await.unwrap();

    assert_eq!(reader.count_entities("person:alice").await.unwrap(), 1);
    let alice = reader.entity("person:alice").await.unwrap().expect("alice exists");
    assert_eq!(alice.name, "Alice");
    assert_eq!(alice.labels, vec!["Person".to_string()]);
    // Re-applying the same batch appends; refs are never deduplicated.
    assert_eq!(alice.refs.len(), 2);
    assert_eq!(alice.refs[0], batch[0].reference);
}

#[tokio::test]
async fn entity_upsert_refreshes_display_name() {
    let graph = migrated_graph().await;
    let client = graph.client.clone();
    let writer = GraphWriter::new(client.clone());
    let reader = GraphReader::new(client);

    writer
        .upsert_entities(EntityCategory::Location, &[contribution(EntityCategory::Location, "PARIS", &page(1))])
        .await
        .unwrap();
    writer
        .upsert_entities(EntityCategory::Location, &[contribution(EntityCategory::Location, "Paris", &page(2))])
        .await
        .unwrap();

    let paris = reader.entity("location:paris").await.unwrap().unwrap();
    assert_eq!(paris.name, "Paris");
    let pages: Vec<String> = paris
        .refs
        .iter()
        .map(|r| r.parse::<MentionRef>().unwrap().page_id)
        .collect();
    assert_eq!(pages, vec!["D1#p01".to_string(), "D1#p02".to_string()]);
}

#[tokio::test]
async fn edge_upsert_keeps_one_edge_and_counts_pages() {
    let graph = migrated_graph().await;
    let client = graph.client.clone();
    let writer = GraphWriter::new(client.clone());
    let reader = GraphReader::new(client);
    let (p1, p2) = (page(1), page(2));

    writer
        .upsert_entities(
            EntityCategory::Person,
            &[contribution(EntityCategory::Person, "Alice", &p1)],
        )
        .await
        .unwrap();
    writer
        .upsert_entities(
            EntityCategory::Location,
            &[contribution(EntityCategory::Location, "Paris", &p1)],
        )
        .await
        .unwrap();

    writer
        .upsert_cooccurrences(&[pair("location:paris", "person:alice", &p1)])
        .await
        .unwrap();
    writer
        .upsert_cooccurrences(&[pair("location:paris", "person:alice", &p2)])
        .await
        .unwrap();

    let edges = reader
        .relations_between("person:alice", "location:paris")
        .await
        .unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].from_id, "location:paris");
    assert_eq!(edges[0].to_id, "person:alice");
    assert_eq!(edges[0].count, 2);
    assert_eq!(
        edges[0].refs,
        vec![
            PageRef::for_page(&p1).encode(),
            PageRef::for_page(&p2).encode()
        ]
    );

    let co = reader.co_mentions("person:alice", 10).await.unwrap();
    assert_eq!(co.len(), 1);
    assert_eq!(co[0].entity_id, "location:paris");
}

#[tokio::test]
async fn edge_upsert_skips_missing_endpoints() {
    let graph = migrated_graph().await;
    let client = graph.client.clone();
    let writer = GraphWriter::new(client.clone());
    let reader = GraphReader::new(client);

    let merged = writer
        .upsert_cooccurrences(&[pair("person:ghost", "person:nobody", &page(1))])
        .await
        .unwrap();
    assert_eq!(merged, 0);
    assert!(reader
        .relations_between("person:ghost", "person:nobody")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn empty_batches_issue_no_writes() {
    let graph = migrated_graph().await;
    let client = graph.client.clone();
    let writer = GraphWriter::new(client);
    assert_eq!(writer.upsert_entities(EntityCategory::Person, &[]).await.unwrap(), 0);
    assert_eq!(writer.upsert_cooccurrences(&[]).await.unwrap(), 0);
}
