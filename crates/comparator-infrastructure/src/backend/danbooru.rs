use async_trait::async_trait;
use comparator_core::error::{ComparatorError, Result};
use comparator_core::related::{PostBackend, PostRecord, Relation};
use comparator_core::slot::Dimensions;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{SEARCH_LIMIT, endpoint};
use crate::http::{best_effort, get_json};

/// Post as serialized by `/posts/{id}.json` and `/posts.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DanbooruPost {
    pub id: u64,
    #[serde(default)]
    pub parent_id: Option<u64>,
    /// Absent for posts the anonymous user may not see in full.
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub large_file_url: Option<String>,
    #[serde(default)]
    pub image_width: Option<u32>,
    #[serde(default)]
    pub image_height: Option<u32>,
}

impl DanbooruPost {
    /// Original file, falling back to the large sample.
    pub fn image_url(&self) -> Option<&str> {
        self.file_url
            .as_deref()
            .or(self.large_file_url.as_deref())
            .filter(|url| !url.is_empty())
    }

    pub fn into_record(self) -> PostRecord {
        let dimensions = match (self.image_width, self.image_height) {
            (Some(w), Some(h)) => Some(Dimensions::new(w, h)),
            _ => None,
        };
        PostRecord {
            id: self.id.to_string(),
            parent_id: self.parent_id.map(|id| id.to_string()),
            file_url: self.image_url().map(str::to_string),
            dimensions,
            similarity: None,
        }
    }
}

/// One row of `/iqdb_queries.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DanbooruIqdbMatch {
    pub post_id: u64,
    pub score: f64,
    #[serde(default)]
    pub post: Option<DanbooruPost>,
}

impl DanbooruIqdbMatch {
    pub fn into_record(self) -> PostRecord {
        let record = match self.post {
            Some(post) => post.into_record(),
            None => PostRecord::new(self.post_id.to_string()),
        };
        record.with_similarity(self.score)
    }
}

/// Danbooru JSON API.
#[derive(Clone)]
pub struct DanbooruBackend {
    client: Client,
    base_url: String,
}

impl DanbooruBackend {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Looks a post up, surfacing failures.
    pub async fn post(&self, id: &str) -> Result<DanbooruPost> {
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(ComparatorError::invalid_input(format!("Invalid post id '{}'", id)));
        }
        let url = endpoint(&self.base_url, &format!("/posts/{}.json", id), &[])?;
        get_json(&self.client, url.as_str()).await
    }

    async fn search(&self, tags: &str) -> Result<Vec<DanbooruPost>> {
        let url = endpoint(
            &self.base_url,
            "/posts.json",
            &[("tags", tags), ("limit", SEARCH_LIMIT)],
        )?;
        get_json(&self.client, url.as_str()).await
    }

    async fn iqdb(&self, post_id: &str) -> Result<Vec<DanbooruIqdbMatch>> {
        let url = endpoint(&self.base_url, "/iqdb_queries.json", &[("post_id", post_id)])?;
        get_json(&self.client, url.as_str()).await
    }
}

#[async_trait]
impl PostBackend for DanbooruBackend {
    async fn fetch_by_id(&self, id: &str) -> Option<PostRecord> {
        best_effort(&format!("Danbooru post #{}", id), self.post(id).await)
            .map(DanbooruPost::into_record)
    }

    async fn fetch_by_relation(&self, id: &str, relation: Relation) -> Option<Vec<PostRecord>> {
        let what = format!("Danbooru {:?} of #{}", relation, id);
        match relation {
            // `parent:N` matches N itself and every post whose parent is N.
            Relation::Children | Relation::ParentFamily => {
                let posts = best_effort(&what, self.search(&format!("parent:{}", id)).await)?;
                Some(posts.into_iter().map(DanbooruPost::into_record).collect())
            }
            Relation::Similar => {
                let matches = best_effort(&what, self.iqdb(id).await)?;
                Some(
                    matches
                        .into_iter()
                        .map(DanbooruIqdbMatch::into_record)
                        .collect(),
                )
            }
        }
    }
}
