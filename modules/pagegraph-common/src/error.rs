use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageGraphError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Store write failed: {0}")]
    StoreWrite(String),

    /// Any failure while processing a page. Aborts the run.
    #[error("Failed while processing page {page_id}")]
    Page {
        page_id: String,
        #[source]
        source: Box<PageGraphError>,
    },
}

impl PageGraphError {
    /// The page being processed when the run stopped, if any.
    pub fn page_id(&self) -> Option<&str> {
        match self {
            PageGraphError::Page { page_id, .. } => Some(page_id.as_str()),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProvenanceError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("missing snippet separator")]
    MissingSnippetSeparator,

    #[error("invalid page number: {0:?}")]
    InvalidPageNumber(String),
}
