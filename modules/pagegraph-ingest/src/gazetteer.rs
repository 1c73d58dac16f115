use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use tracing::info;

use pagegraph_common::Mention;

use crate::extractor::{segment_sentences, MentionExtractor, PageAnalysis};

/// Dictionary-driven recognizer: whole-word, case-sensitive matches of known
/// names. Longer names win at the same position; matches never overlap.
///
/// File format is a JSON object of tag to names:
/// `{"PERSON": ["Alice", "Bob"], "LOC": ["Paris"]}`.
pub struct GazetteerExtractor {
    pattern: Option<Regex>,
    tags: HashMap<String, String>,
}

impl GazetteerExtractor {
    /// Build from `(tag, name)` entries. The first tag given for a name wins.
    pub fn new<I, T, N>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (T, N)>,
        T: Into<String>,
        N: Into<String>,
    {
        let mut tags: HashMap<String, String> = HashMap::new();
        for (tag, name) in entries {
            let name = name.into();
            if name.trim().is_empty() {
                continue;
            }
            tags.entry(name).or_insert_with(|| tag.into());
        }

        let mut names: Vec<&String> = tags.keys().collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let pattern = if names.is_empty() {
            None
        } else {
            let alternation = names
                .iter()
                .map(|n| bounded(n))
                .collect::<Vec<_>>()
                .join("|");
            Some(Regex::new(&alternation)?)
        };

        Ok(Self { pattern, tags })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading gazetteer {}", path.display()))?;
        let by_tag: BTreeMap<String, Vec<String>> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing gazetteer {}", path.display()))?;

        let extractor = Self::new(
            by_tag
                .into_iter()
                .flat_map(|(tag, names)| names.into_iter().map(move |n| (tag.clone(), n))),
        )?;
        info!(names = extractor.tags.len(), path = %path.display(), "Loaded gazetteer");
        Ok(extractor)
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Escaped name with a `\b` on each side that begins or ends in a word
/// character. `\b` next to punctuation would need a word character outside
/// the name, so "U.S." followed by a space would never match.
fn bounded(name: &str) -> String {
    let lead = if name.chars().next().is_some_and(is_word_char) { r"\b" } else { "" };
    let tail = if name.chars().last().is_some_and(is_word_char) { r"\b" } else { "" };
    format!("{lead}{}{tail}", regex::escape(name))
}

#[async_trait]
impl MentionExtractor for GazetteerExtractor {
    async fn extract(&self, text: &str) -> Result<PageAnalysis> {
        let mentions = match &self.pattern {
            Some(pattern) => pattern
                .find_iter(text)
                .filter_map(|m| {
                    self.tags.get(m.as_str()).map(|tag| Mention {
                        tag: tag.clone(),
                        text: m.as_str().to_string(),
                        start: m.start(),
                        end: m.end(),
                    })
                })
                .collect(),
            None => Vec::new(),
        };

        Ok(PageAnalysis {
            mentions,
            sentences: segment_sentences(text),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn tags_and_texts(analysis: &PageAnalysis) -> Vec<(&str, &str)> {
        analysis
            .mentions
            .iter()
            .map(|m| (m.tag.as_str(), m.text.as_str()))
            .collect()
    }

    #[tokio::test]
    async fn finds_every_occurrence_in_order() {
        let g = GazetteerExtractor::new([("PERSON", "Alice"), ("PERSON", "Bob"), ("LOC", "Paris")]).unwrap();
        let text = "Alice met Bob in Paris. Alice and Bob spoke.";
        let analysis = g.extract(text).await.unwrap();
        assert_eq!(
            tags_and_texts(&analysis),
            vec![
                ("PERSON", "Alice"),
                ("PERSON", "Bob"),
                ("LOC", "Paris"),
                ("PERSON", "Alice"),
                ("PERSON", "Bob"),
            ]
        );
        for m in &analysis.mentions {
            assert_eq!(&text[m.start..m.end], m.text);
        }
        assert_eq!(analysis.sentences.len(), 2);
    }

    #[tokio::test]
    async fn longest_name_wins_and_words_are_whole() {
        let g = GazetteerExtractor::new([("LOC", "New York"), ("LOC", "York"), ("PERSON", "Al")]).unwrap();
        let analysis = g.extract("Alan flew to New York, not York.").await.unwrap();
        assert_eq!(
            tags_and_texts(&analysis),
            vec![("LOC", "New York"), ("LOC", "York")]
        );
    }

    #[tokio::test]
    async fn names_with_edge_punctuation_match() {
        let g = GazetteerExtractor::new([
            ("LOC", "Washington, D.C."),
            ("LOC", "U.S."),
            ("PERSON", "Alice"),
        ])
        .unwrap();
        let text = "Alice flew to Washington, D.C. yesterday and left the U.S. today.";
        let analysis = g.extract(text).await.unwrap();
        assert_eq!(
            tags_and_texts(&analysis),
            vec![
                ("PERSON", "Alice"),
                ("LOC", "Washington, D.C."),
                ("LOC", "U.S."),
            ]
        );
        for m in &analysis.mentions {
            assert_eq!(&text[m.start..m.end], m.text);
        }
    }

    #[test]
    fn boundaries_only_sit_next_to_word_characters() {
        assert_eq!(bounded("Paris"), r"\bParis\b");
        assert_eq!(bounded("U.S."), r"\bU\.S\.");
        assert_eq!(bounded("(Acme)"), r"\(Acme\)");
    }

    #[tokio::test]
    async fn empty_gazetteer_finds_nothing() {
        let g = GazetteerExtractor::new(Vec::<(String, String)>::new()).unwrap();
        let analysis = g.extract("Anything at all.").await.unwrap();
        assert!(analysis.mentions.is_empty());
        assert_eq!(analysis.sentences, vec![0..16]);
    }

    #[test]
    fn loads_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"PERSON": ["Alice", " "], "LOC": ["Paris"]}}"#).unwrap();
        let g = GazetteerExtractor::from_path(file.path()).unwrap();
        assert_eq!(g.tags.len(), 2);
        assert_eq!(g.tags.get("Paris").map(String::as_str), Some("LOC"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2]").unwrap();
        assert!(GazetteerExtractor::from_path(file.path()).is_err());
    }
}
