use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;

use super::{CandidateList, RelatedItem};
use crate::error::Result;

/// One independent provider of related candidates.
#[async_trait]
pub trait RelatedSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Candidates related to `post_id` (`None` when the page has no post id).
    async fn related(&self, post_id: Option<&str>) -> Result<Vec<RelatedItem>>;
}

/// Queries every source concurrently and merges the results.
///
/// A failing source contributes nothing; the others are unaffected.
#[derive(Clone, Default)]
pub struct RelatedItemResolver {
    sources: Vec<Arc<dyn RelatedSource>>,
}

impl RelatedItemResolver {
    pub fn new(sources: Vec<Arc<dyn RelatedSource>>) -> Self {
        Self { sources }
    }

    pub fn add_source(&mut self, source: Arc<dyn RelatedSource>) {
        self.sources.push(source);
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Raw contributions in source order, failures already replaced by empty sets.
    pub async fn collect(&self, post_id: Option<&str>) -> Vec<Vec<RelatedItem>> {
        let queries = self.sources.iter().map(|source| async move {
            match source.related(post_id).await {
                Ok(items) => {
                    tracing::debug!(
                        "[RelatedItemResolver] {} returned {} candidates",
                        source.name(),
                        items.len()
                    );
                    items
                }
                Err(e) => {
                    tracing::warn!(
                        "[RelatedItemResolver] Source {} failed, skipping: {}",
                        source.name(),
                        e
                    );
                    Vec::new()
                }
            }
        });
        join_all(queries).await
    }

    /// Resolves, deduplicates and ranks candidates for `post_id`.
    pub async fn resolve(&self, post_id: Option<&str>) -> CandidateList {
        let contributions = self.collect(post_id).await;
        let list = CandidateList::from_items(contributions.into_iter().flatten().collect(), post_id);
        tracing::info!(
            "[RelatedItemResolver] Resolved {} candidates from {} sources",
            list.len(),
            self.sources.len()
        );
        list
    }
}
