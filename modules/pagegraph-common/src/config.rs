use std::env;
use std::path::PathBuf;

use tracing::info;

use crate::error::PageGraphError;
use crate::types::EntityCategory;

const DEFAULT_DATA_PATH: &str = "normalized_data.json";
const DEFAULT_NER_MODEL: &str = "en_core_web_trf";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Neo4j
    pub neo4j_uri: String,
    pub neo4j_user: String,
    pub neo4j_password: String,

    // Input
    pub data_path: PathBuf,

    // Entity recognition
    pub ner_url: Option<String>,
    pub ner_model: String,
    pub gazetteer_path: Option<PathBuf>,
    /// Extra recognizer tags admitted on top of the default allow-list.
    pub extra_tags: Vec<(String, EntityCategory)>,
}

/// Where mentions come from for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractorSource {
    NerService { url: String, model: String },
    Gazetteer(PathBuf),
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, PageGraphError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, PageGraphError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| {
                PageGraphError::Config(format!("{key} environment variable is required"))
            })
        };

        Ok(Self {
            neo4j_uri: required("NEO4J_URI")?,
            neo4j_user: required("NEO4J_USER")?,
            neo4j_password: required("NEO4J_PASSWORD")?,
            data_path: get("DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH)),
            ner_url: get("NER_URL"),
            ner_model: get("NER_MODEL").unwrap_or_else(|| DEFAULT_NER_MODEL.to_string()),
            gazetteer_path: get("GAZETTEER_PATH").map(PathBuf::from),
            extra_tags: match get("NER_EXTRA_TAGS") {
                Some(raw) => parse_extra_tags(&raw)?,
                None => Vec::new(),
            },
        })
    }

    /// Resolve the mention source. The NER service wins when both are set.
    pub fn extractor_source(&self) -> Result<ExtractorSource, PageGraphError> {
        if let Some(url) = &self.ner_url {
            return Ok(ExtractorSource::NerService {
                url: url.clone(),
                model: self.ner_model.clone(),
            });
        }
        if let Some(path) = &self.gazetteer_path {
            return Ok(ExtractorSource::Gazetteer(path.clone()));
        }
        Err(PageGraphError::Config(
            "one of NER_URL or GAZETTEER_PATH is required".to_string(),
        ))
    }

    pub fn log_redacted(&self) {
        let gazetteer = self
            .gazetteer_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        info!(
            neo4j_uri = self.neo4j_uri.as_str(),
            neo4j_user = self.neo4j_user.as_str(),
            data_path = %self.data_path.display(),
            ner_url = self.ner_url.as_deref().unwrap_or("-"),
            ner_model = self.ner_model.as_str(),
            gazetteer_path = gazetteer.as_str(),
            extra_tags = self.extra_tags.len(),
            "Loaded config"
        );
    }
}

/// Parse `TAG=category` pairs, e.g. `ORG=organization,GPE=location`.
pub fn parse_extra_tags(raw: &str) -> Result<Vec<(String, EntityCategory)>, PageGraphError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|pair| {
            let (tag, category) = pair.split_once('=').ok_or_else(|| {
                PageGraphError::Config(format!("NER_EXTRA_TAGS entry {pair:?} is not TAG=category"))
            })?;
            let category = EntityCategory::from_str_loose(category).ok_or_else(|| {
                PageGraphError::Config(format!("unknown entity category {category:?}"))
            })?;
            Ok((tag.trim().to_uppercase(), category))
        })
        .collect()
}
