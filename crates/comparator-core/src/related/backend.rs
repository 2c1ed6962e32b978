use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::slot::Dimensions;

/// A post as returned by any backend, reduced to the fields the comparator reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
    /// Content-similarity score in percent, only set by similarity queries.
    #[serde(default)]
    pub similarity: Option<f64>,
}

impl PostRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            file_url: None,
            dimensions: None,
            similarity: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_file_url(mut self, url: impl Into<String>) -> Self {
        self.file_url = Some(url.into());
        self
    }

    pub fn with_similarity(mut self, score: f64) -> Self {
        self.similarity = Some(score);
        self
    }

    /// Rounded similarity percentage, if the score is usable.
    pub fn similarity_percent(&self) -> Option<u32> {
        self.similarity
            .filter(|score| score.is_finite() && *score >= 0.0)
            .map(|score| score.round().min(100.0) as u32)
    }
}

/// Relation queries a backend can answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    /// Posts whose parent is the given id.
    Children,
    /// The given parent and all of its children.
    ParentFamily,
    /// Posts visually similar to the given id.
    Similar,
}

/// Query collaborator for one backend schema.
///
/// Failures are reported as `None` and never cross this boundary as errors.
#[async_trait]
pub trait PostBackend: Send + Sync {
    async fn fetch_by_id(&self, id: &str) -> Option<PostRecord>;

    async fn fetch_by_relation(&self, id: &str, relation: Relation) -> Option<Vec<PostRecord>>;
}
