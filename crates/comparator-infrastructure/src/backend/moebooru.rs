use async_trait::async_trait;
use comparator_core::error::Result;
use comparator_core::related::{PostBackend, PostRecord, Relation};
use comparator_core::slot::Dimensions;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{SEARCH_LIMIT, endpoint};
use crate::http::{best_effort, get_json};

/// Post as serialized by `/post.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoebooruPost {
    pub id: u64,
    #[serde(default)]
    pub parent_id: Option<u64>,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl MoebooruPost {
    pub fn into_record(self) -> PostRecord {
        let dimensions = match (self.width, self.height) {
            (Some(w), Some(h)) => Some(Dimensions::new(w, h)),
            _ => None,
        };
        PostRecord {
            id: self.id.to_string(),
            parent_id: self.parent_id.map(|id| id.to_string()),
            file_url: self.file_url.filter(|url| !url.is_empty()),
            dimensions,
            similarity: None,
        }
    }
}

/// Moebooru tag-search API (Yande.re, Konachan).
#[derive(Clone)]
pub struct MoebooruBackend {
    client: Client,
    base_url: String,
}

impl MoebooruBackend {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Runs a tag search, surfacing failures.
    pub async fn search(&self, tags: &str) -> Result<Vec<MoebooruPost>> {
        let url = endpoint(
            &self.base_url,
            "/post.json",
            &[("tags", tags), ("limit", SEARCH_LIMIT)],
        )?;
        get_json(&self.client, url.as_str()).await
    }

    /// Looks a post up by id. `Ok(None)` when the search came back empty.
    pub async fn post(&self, id: &str) -> Result<Option<MoebooruPost>> {
        let posts = self.search(&format!("id:{}", id)).await?;
        Ok(posts.into_iter().find(|post| post.id.to_string() == id))
    }
}

#[async_trait]
impl PostBackend for MoebooruBackend {
    async fn fetch_by_id(&self, id: &str) -> Option<PostRecord> {
        best_effort(&format!("Moebooru post #{}", id), self.post(id).await)
            .flatten()
            .map(MoebooruPost::into_record)
    }

    async fn fetch_by_relation(&self, id: &str, relation: Relation) -> Option<Vec<PostRecord>> {
        let what = format!("Moebooru {:?} of #{}", relation, id);
        match relation {
            Relation::Children => {
                let posts = best_effort(&what, self.search(&format!("parent:{}", id)).await)?;
                Some(posts.into_iter().map(MoebooruPost::into_record).collect())
            }
            Relation::ParentFamily => {
                let posts = best_effort(&what, self.search(&format!("parent:{}", id)).await)?;
                let mut family: Vec<PostRecord> =
                    posts.into_iter().map(MoebooruPost::into_record).collect();
                // Some Moebooru deployments leave the parent out of `parent:N`.
                if !family.iter().any(|post| post.id == id) {
                    if let Some(parent) = self.fetch_by_id(id).await {
                        family.insert(0, parent);
                    }
                }
                Some(family)
            }
            Relation::Similar => {
                tracing::debug!("[MoebooruBackend] No similarity API; similar posts come from the page");
                None
            }
        }
    }
}
