pub mod config;
pub mod error;
pub mod normalize;
pub mod provenance;
pub mod types;

pub use config::{Config, ExtractorSource};
pub use error::{PageGraphError, ProvenanceError};
pub use normalize::{entity_id, normalize_text, NormalizedMention, Normalizer};
pub use provenance::{MentionRef, PageRef, FIELD_SEPARATOR, SNIPPET_SEPARATOR};
pub use types::*;
