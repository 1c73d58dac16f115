pub mod dedup;
pub mod extractor;
pub mod gazetteer;
pub mod ner_service;
pub mod pipeline;
pub mod relations;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use dedup::{deduplicate, PageEntities};
pub use extractor::{MentionExtractor, PageAnalysis};
pub use gazetteer::GazetteerExtractor;
pub use ner_service::NerServiceExtractor;
pub use pipeline::{load_pages, Ingestor, PageOutcome, RunStats};
pub use relations::derive_pairs;
pub use traits::GraphStore;
