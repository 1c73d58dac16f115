//! Provenance reference strings attached to nodes and edges.
//!
//! Page-level (edges):    `doc_id|page_id|source_uri`
//! Mention-level (nodes): `doc_id|page_id|page_number|source_uri|||snippet`
//!
//! Missing fields render as empty strings so positions stay fixed. Metadata
//! fields must not contain `|`; values that do are garbled on decode. The
//! snippet is free text and may contain either separator, since only the
//! first `|||` after the fixed fields is structural.

use std::fmt;
use std::str::FromStr;

use crate::error::ProvenanceError;
use crate::types::Page;

pub const FIELD_SEPARATOR: char = '|';
pub const SNIPPET_SEPARATOR: &str = "|||";

/// Edge provenance: which page contributed the co-occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRef {
    pub doc_id: String,
    pub page_id: String,
    pub source_uri: String,
}

impl PageRef {
    pub fn for_page(page: &Page) -> Self {
        Self {
            doc_id: page.doc_id.clone(),
            page_id: page.page_id.clone(),
            source_uri: page.source_uri.clone(),
        }
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = FIELD_SEPARATOR;
        write!(f, "{}{sep}{}{sep}{}", self.doc_id, self.page_id, self.source_uri)
    }
}

impl FromStr for PageRef {
    type Err = ProvenanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.splitn(3, FIELD_SEPARATOR).collect();
        match fields.as_slice() {
            [doc_id, page_id, source_uri] => Ok(Self {
                doc_id: doc_id.to_string(),
                page_id: page_id.to_string(),
                source_uri: source_uri.to_string(),
            }),
            _ => Err(ProvenanceError::FieldCount {
                expected: 3,
                found: fields.len(),
            }),
        }
    }
}

/// Node provenance: the page a mention came from plus a context snippet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionRef {
    pub doc_id: String,
    pub page_id: String,
    pub page_number: Option<u32>,
    pub source_uri: String,
    pub snippet: String,
}

impl MentionRef {
    pub fn for_page(page: &Page, snippet: impl Into<String>) -> Self {
        Self {
            doc_id: page.doc_id.clone(),
            page_id: page.page_id.clone(),
            page_number: page.page_number,
            source_uri: page.source_uri.clone(),
            snippet: snippet.into(),
        }
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MentionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = FIELD_SEPARATOR;
        let page_number = self
            .page_number
            .map(|n| n.to_string())
            .unwrap_or_default();
        write!(
            f,
            "{}{sep}{}{sep}{}{sep}{}{SNIPPET_SEPARATOR}{}",
            self.doc_id, self.page_id, page_number, self.source_uri, self.snippet
        )
    }
}

impl FromStr for MentionRef {
    type Err = ProvenanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The first three fields cannot contain the separator, so the fourth
        // piece is `source_uri|||snippet` and the first `|||` in it is structural.
        let fields: Vec<&str> = s.splitn(4, FIELD_SEPARATOR).collect();
        let [doc_id, page_id, page_number, rest] = fields.as_slice() else {
            return Err(ProvenanceError::FieldCount {
                expected: 4,
                found: fields.len(),
            });
        };

        let (source_uri, snippet) = rest
            .split_once(SNIPPET_SEPARATOR)
            .ok_or(ProvenanceError::MissingSnippetSeparator)?;

        let page_number = if page_number.is_empty() {
            None
        } else {
            Some(
                page_number
                    .parse::<u32>()
                    .map_err(|_| ProvenanceError::InvalidPageNumber(page_number.to_string()))?,
            )
        };

        Ok(Self {
            doc_id: doc_id.to_string(),
            page_id: page_id.to_string(),
            page_number,
            source_uri: source_uri.to_string(),
            snippet: snippet.to_string(),
        })
    }
}
