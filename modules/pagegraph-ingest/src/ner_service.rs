use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use pagegraph_common::Mention;

use crate::extractor::{char_to_byte_offsets, MentionExtractor, PageAnalysis};

/// Client for an HTTP named-entity recognition service.
///
/// `POST {base_url}/ner` with `{"text", "model"}`; the service answers with
/// entity and sentence spans in character offsets.
pub struct NerServiceExtractor {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct NerRequest<'a> {
    text: &'a str,
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct NerResponse {
    entities: Vec<NerEntity>,
    #[serde(default)]
    sentences: Vec<NerSpan>,
}

#[derive(Debug, Deserialize)]
struct NerEntity {
    label: String,
    text: String,
    start_char: usize,
    end_char: usize,
}

#[derive(Debug, Deserialize)]
struct NerSpan {
    start_char: usize,
    end_char: usize,
}

impl NerServiceExtractor {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl MentionExtractor for NerServiceExtractor {
    async fn extract(&self, text: &str) -> Result<PageAnalysis> {
        let url = format!("{}/ner", self.base_url);

        debug!(model = %self.model, chars = text.len(), "NER request");

        let response = self
            .http
            .post(&url)
            .json(&NerRequest {
                text,
                model: &self.model,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(anyhow!("NER service error ({}): {}", status, error_text));
        }

        let body: NerResponse = response.json().await?;
        Ok(to_analysis(text, body))
    }
}

/// Convert character-offset spans into byte-offset spans over `text`.
/// Offsets past the end clamp to the end of the text.
fn to_analysis(text: &str, body: NerResponse) -> PageAnalysis {
    let offsets = char_to_byte_offsets(text);
    let byte_at = |c: usize| offsets.get(c).copied().unwrap_or(text.len());

    PageAnalysis {
        mentions: body
            .entities
            .into_iter()
            .map(|e| Mention {
                tag: e.label,
                text: e.text,
                start: byte_at(e.start_char),
                end: byte_at(e.end_char),
            })
            .collect(),
        sentences: body
            .sentences
            .into_iter()
            .map(|s| byte_at(s.start_char)..byte_at(s.end_char))
            .collect(),
    }
}
