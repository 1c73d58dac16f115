// Pipeline tests against the in-memory store.
//
// MemoryGraphStore mirrors the Neo4j MERGE statements, so these cover the
// page-level contract: dedup, pair derivation, batching, accumulation and
// fail-fast error reporting. The Neo4j side of the contract is covered in
// pagegraph-graph's upsert_contract_test.

use pagegraph_common::{EntityCategory, MentionRef, Normalizer, Page, PageGraphError, PageRef};
use pagegraph_ingest::testing::{mention_at, page, FixedExtractor, MemoryGraphStore, StoreCall};
use pagegraph_ingest::{GazetteerExtractor, Ingestor, PageAnalysis};

const SCENARIO: &str = "Alice met Bob in Paris. Alice and Bob spoke.";

fn scenario_page() -> Page {
    // source_uri is file://d1.pdf
    page("D1", 1, SCENARIO)
}

fn scenario_analysis() -> PageAnalysis {
    PageAnalysis {
        mentions: vec![
            mention_at(SCENARIO, "PERSON", "Alice", 0),
            mention_at(SCENARIO, "PERSON", "Bob", 0),
            mention_at(SCENARIO, "LOC", "Paris", 0),
            mention_at(SCENARIO, "PERSON", "Alice", 1),
            mention_at(SCENARIO, "PERSON", "Bob", 1),
        ],
        sentences: vec![0..23, 24..SCENARIO.len()],
    }
}

fn ingestor(extractor: FixedExtractor) -> Ingestor<MemoryGraphStore, FixedExtractor> {
    Ingestor::new(MemoryGraphStore::new(), extractor, Normalizer::new())
}

#[tokio::test]
async fn scenario_page_yields_three_entities_and_three_pairs() {
    let ing = ingestor(FixedExtractor::new().on_text(SCENARIO, scenario_analysis()));

    let outcome = ing.ingest_page(&scenario_page()).await.unwrap();
    assert_eq!(outcome.entities, 3);
    assert_eq!(outcome.pairs, 3);

    let store = ing.store();
    assert_eq!(store.node_count(), 3);
    for id in ["person:alice", "person:bob", "location:paris"] {
        let node = store.node(id).unwrap_or_else(|| panic!("{id} missing"));
        assert_eq!(node.refs.len(), 1, "{id} should have exactly one ref");
    }

    let alice = store.node("person:alice").unwrap();
    assert_eq!(alice.name, "Alice");
    assert_eq!(alice.category, EntityCategory::Person);
    let r: MentionRef = alice.refs[0].parse().unwrap();
    assert_eq!(r.page_id, "D1#p01");
    assert_eq!(r.page_number, Some(1));
    assert_eq!(r.snippet, "Alice met Bob in Paris.");

    assert_eq!(store.edge_count(), 3);
    let edge = &store.edges_between("person:alice", "person:bob")[0];
    assert_eq!(edge.count, 1);
    assert_eq!(edge.refs, vec!["D1|D1#p01|file://d1.pdf".to_string()]);
}

#[tokio::test]
async fn scenario_through_gazetteer_matches_fixed_mentions() {
    let gazetteer =
        GazetteerExtractor::new([("PERSON", "Alice"), ("PERSON", "Bob"), ("LOC", "Paris")]).unwrap();
    let ing = Ingestor::new(MemoryGraphStore::new(), gazetteer, Normalizer::new());

    let outcome = ing.ingest_page(&scenario_page()).await.unwrap();
    assert_eq!(outcome.entities, 3);
    assert_eq!(outcome.pairs, 3);
    assert_eq!(
        ing.store().node("location:paris").unwrap().refs[0],
        "D1|D1#p01|1|file://d1.pdf|||Alice met Bob in Paris."
    );
}

#[tokio::test]
async fn batches_are_one_per_category_plus_one_for_edges() {
    let ing = ingestor(FixedExtractor::new().on_text(SCENARIO, scenario_analysis()));
    let outcome = ing.ingest_page(&scenario_page()).await.unwrap();
    assert_eq!(outcome.node_batches, 2);
    assert_eq!(outcome.edge_batches, 1);

    assert_eq!(
        ing.store().calls(),
        vec![
            StoreCall::Nodes(EntityCategory::Person, 2),
            StoreCall::Nodes(EntityCategory::Location, 1),
            StoreCall::Edges(3),
        ]
    );
}

#[tokio::test]
async fn rerunning_a_page_keeps_one_edge_and_counts_twice() {
    let ing = ingestor(FixedExtractor::new().on_text(SCENARIO, scenario_analysis()));
    let p = scenario_page();

    ing.ingest_page(&p).await.unwrap();
    ing.ingest_page(&p).await.unwrap();

    let store = ing.store();
    assert_eq!(store.node_count(), 3);
    assert_eq!(store.edge_count(), 3);

    let edges = store.edges_between("person:bob", "person:alice");
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].count, 2);

    // Name and existence are stable; refs accumulate on re-run.
    let alice = store.node("person:alice").unwrap();
    assert_eq!(alice.name, "Alice");
    assert_eq!(alice.refs.len(), 2);
    assert_eq!(alice.refs[0], alice.refs[1]);
}

#[tokio::test]
async fn identity_merges_across_pages() {
    let p1 = page("D1", 1, "Alice visited Paris.");
    let p2 = page("D1", 2, "Later,  ALICE   returned to paris.");

    let extractor = FixedExtractor::new()
        .on_text(
            &p1.text,
            PageAnalysis {
                mentions: vec![
                    mention_at(&p1.text, "PERSON", "Alice", 0),
                    mention_at(&p1.text, "LOC", "Paris", 0),
                ],
                sentences: vec![],
            },
        )
        .on_text(
            &p2.text,
            PageAnalysis {
                mentions: vec![
                    mention_at(&p2.text, "PERSON", "ALICE", 0),
                    mention_at(&p2.text, "LOC", "paris", 0),
                ],
                sentences: vec![],
            },
        );
    let ing = ingestor(extractor);

    let stats = ing.run(&[p1.clone(), p2.clone()]).await.unwrap();
    assert_eq!(stats.pages, 2);
    assert_eq!(stats.entities_upserted, 4);
    assert_eq!(stats.edges_upserted, 2);

    let store = ing.store();
    assert_eq!(store.node_count(), 2);
    let alice = store.node("person:alice").unwrap();
    assert_eq!(alice.name, "ALICE");
    let pages: Vec<String> = alice
        .refs
        .iter()
        .map(|r| r.parse::<MentionRef>().unwrap().page_id)
        .collect();
    assert_eq!(pages, vec!["D1#p01".to_string(), "D1#p02".to_string()]);

    let edge = &store.edges_between("person:alice", "location:paris")[0];
    assert_eq!(edge.count, 2);
    assert_eq!(
        edge.refs,
        vec![PageRef::for_page(&p1).encode(), PageRef::for_page(&p2).encode()]
    );
}

#[tokio::test]
async fn pages_without_entities_write_nothing() {
    let text = "Nothing to see on Monday.";
    let extractor = FixedExtractor::new().on_text(
        text,
        PageAnalysis {
            mentions: vec![mention_at(text, "DATE", "Monday", 0)],
            sentences: vec![],
        },
    );
    let ing = ingestor(extractor);

    let stats = ing.run(&[page("D1", 1, text)]).await.unwrap();
    assert_eq!(stats.pages, 1);
    assert_eq!(stats.pages_without_entities, 1);
    assert!(ing.store().calls().is_empty());
}

#[tokio::test]
async fn single_entity_page_writes_nodes_but_no_edges() {
    let text = "Only Alice here.";
    let extractor = FixedExtractor::new().on_text(
        text,
        PageAnalysis {
            mentions: vec![mention_at(text, "PERSON", "Alice", 0)],
            sentences: vec![],
        },
    );
    let ing = ingestor(extractor);

    let outcome = ing.ingest_page(&page("D1", 1, text)).await.unwrap();
    assert_eq!(outcome.pairs, 0);
    assert_eq!(
        ing.store().calls(),
        vec![StoreCall::Nodes(EntityCategory::Person, 1)]
    );
}

#[tokio::test]
async fn store_failure_stops_run_and_names_the_page() {
    let p1 = page("D1", 1, SCENARIO);
    let p2 = page("D1", 2, "Bob went to Rome.");
    let p3 = page("D1", 3, "Carol stayed.");

    let extractor = FixedExtractor::new()
        .on_text(SCENARIO, scenario_analysis())
        .on_text(
            &p2.text,
            PageAnalysis {
                mentions: vec![
                    mention_at(&p2.text, "PERSON", "Bob", 0),
                    mention_at(&p2.text, "LOC", "Rome", 0),
                ],
                sentences: vec![],
            },
        )
        .on_text(
            &p3.text,
            PageAnalysis {
                mentions: vec![mention_at(&p3.text, "PERSON", "Carol", 0)],
                sentences: vec![],
            },
        );

    // Page 1 makes three writes; the fifth write is page 2's Location batch.
    let store = MemoryGraphStore::new().failing_on_write(5);
    let ing = Ingestor::new(store, extractor, Normalizer::new());

    let err = ing.run(&[p1, p2, p3]).await.unwrap_err();
    assert_eq!(err.page_id(), Some("D1#p02"));
    let PageGraphError::Page { source, .. } = &err else {
        panic!("expected page error, got {err:?}");
    };
    assert!(matches!(**source, PageGraphError::StoreWrite(ref m) if m.contains("unavailable")));

    // Page 2's person batch landed before the failure; page 3 never ran.
    let store = ing.store();
    assert_eq!(store.node("person:bob").unwrap().refs.len(), 2);
    assert!(store.node("location:rome").is_none());
    assert!(store.node("person:carol").is_none());
}

#[tokio::test]
async fn extraction_failure_names_the_page() {
    let ing = ingestor(FixedExtractor::new());
    let err = ing
        .run(&[page("D9", 4, "unregistered text")])
        .await
        .unwrap_err();
    assert_eq!(err.page_id(), Some("D9#p04"));
    let PageGraphError::Page { source, .. } = err else {
        panic!("expected page error");
    };
    assert!(matches!(*source, PageGraphError::Extraction(_)));
}

#[tokio::test]
async fn prepare_declares_one_constraint_per_allowed_category() {
    let ing = Ingestor::new(
        MemoryGraphStore::new(),
        FixedExtractor::new(),
        Normalizer::new().with_tag("ORG", EntityCategory::Organization),
    );
    ing.prepare().await.unwrap();
    ing.prepare().await.unwrap();
    assert_eq!(
        ing.store().constraints(),
        vec![
            EntityCategory::Person,
            EntityCategory::Location,
            EntityCategory::Organization
        ]
    );
}

#[tokio::test]
async fn extended_allow_list_admits_new_category() {
    let text = "Alice joined Acme.";
    let extractor = FixedExtractor::new().on_text(
        text,
        PageAnalysis {
            mentions: vec![
                mention_at(text, "PERSON", "Alice", 0),
                mention_at(text, "ORG", "Acme", 0),
            ],
            sentences: vec![],
        },
    );

    let default_ing = ingestor(extractor);
    assert_eq!(default_ing.ingest_page(&page("D1", 1, text)).await.unwrap().entities, 1);

    let extractor = FixedExtractor::new().on_text(
        text,
        PageAnalysis {
            mentions: vec![
                mention_at(text, "PERSON", "Alice", 0),
                mention_at(text, "ORG", "Acme", 0),
            ],
            sentences: vec![],
        },
    );
    let extended = Ingestor::new(
        MemoryGraphStore::new(),
        extractor,
        Normalizer::new().with_tag("ORG", EntityCategory::Organization),
    );
    let outcome = extended.ingest_page(&page("D1", 1, text)).await.unwrap();
    assert_eq!(outcome.entities, 2);
    assert_eq!(outcome.pairs, 1);
    assert_eq!(
        extended.store().edges_between("organization:acme", "person:alice")[0].count,
        1
    );
}
