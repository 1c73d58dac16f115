use std::ops::Range;
use std::sync::LazyLock;

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;

use pagegraph_common::Mention;

/// What entity recognition produced for one page of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageAnalysis {
    /// Mentions in any order; the deduplicator orders them by position.
    pub mentions: Vec<Mention>,
    /// Sentence spans (byte offsets). Empty when the recognizer gives no
    /// segmentation; snippets then fall back to a character window.
    pub sentences: Vec<Range<usize>>,
}

/// Entity recognition collaborator. Treated as a black box producing typed spans.
#[async_trait]
pub trait MentionExtractor: Send + Sync {
    async fn extract(&self, text: &str) -> Result<PageAnalysis>;
}

#[async_trait]
impl<T: MentionExtractor + ?Sized> MentionExtractor for Box<T> {
    async fn extract(&self, text: &str) -> Result<PageAnalysis> {
        (**self).extract(text).await
    }
}

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([.!?]+["'”’)\]]*)\s+"#).expect("valid sentence regex"));

/// Split text into sentence spans on terminal punctuation followed by whitespace.
/// Spans cover the punctuation but not the trailing whitespace.
pub fn segment_sentences(text: &str) -> Vec<Range<usize>> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for caps in SENTENCE_END.captures_iter(text) {
        let (Some(whole), Some(punct)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if punct.end() > start {
            sentences.push(start..punct.end());
        }
        start = whole.end();
    }

    if start < text.len() {
        sentences.push(start..text.len());
    }
    sentences
}

/// Byte offset of each char index, plus `text.len()` for the one-past-end index.
pub(crate) fn char_to_byte_offsets(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect()
}
