use async_trait::async_trait;
use std::sync::Arc;

use super::{PostBackend, Relation, RelatedItem, RelatedSource, RelationshipKind};
use crate::error::{ComparatorError, Result};
use crate::site::{PagePreviews, PreviewSection, Site};

/// Parent, siblings and children of a post, from any hierarchical backend.
///
/// The current post is looked up first to learn its parent; the parent's
/// family yields the parent itself and the siblings, a second query the
/// children. A failed family or children query only drops that part.
pub struct HierarchySource {
    site: Site,
    backend: Arc<dyn PostBackend>,
}

impl HierarchySource {
    pub fn new(site: Site, backend: Arc<dyn PostBackend>) -> Self {
        Self { site, backend }
    }
}

#[async_trait]
impl RelatedSource for HierarchySource {
    fn name(&self) -> &str {
        "hierarchy"
    }

    async fn related(&self, post_id: Option<&str>) -> Result<Vec<RelatedItem>> {
        let Some(post_id) = post_id else {
            return Ok(Vec::new());
        };
        let current = self
            .backend
            .fetch_by_id(post_id)
            .await
            .ok_or_else(|| ComparatorError::not_found("post", post_id))?;

        let mut items = Vec::new();

        if let Some(parent_id) = current.parent_id.as_deref() {
            match self
                .backend
                .fetch_by_relation(parent_id, Relation::ParentFamily)
                .await
            {
                Some(family) => {
                    for post in family.into_iter().filter(|p| p.id != post_id) {
                        let kind = if post.id == parent_id {
                            RelationshipKind::Parent
                        } else {
                            RelationshipKind::Sibling
                        };
                        items.push(RelatedItem::new(post.id, kind).from_site(self.site));
                    }
                }
                None => tracing::warn!(
                    "[HierarchySource] Family of parent {} unavailable on {}",
                    parent_id,
                    self.site
                ),
            }
        }

        match self
            .backend
            .fetch_by_relation(post_id, Relation::Children)
            .await
        {
            Some(children) => {
                for post in children.into_iter().filter(|p| p.id != post_id) {
                    items.push(RelatedItem::new(post.id, RelationshipKind::Child).from_site(self.site));
                }
            }
            None => tracing::warn!(
                "[HierarchySource] Children of {} unavailable on {}",
                post_id,
                self.site
            ),
        }

        Ok(items)
    }
}

/// Content-similarity matches with their score.
pub struct SimilaritySource {
    site: Site,
    backend: Arc<dyn PostBackend>,
}

impl SimilaritySource {
    pub fn new(site: Site, backend: Arc<dyn PostBackend>) -> Self {
        Self { site, backend }
    }
}

#[async_trait]
impl RelatedSource for SimilaritySource {
    fn name(&self) -> &str {
        "similarity"
    }

    async fn related(&self, post_id: Option<&str>) -> Result<Vec<RelatedItem>> {
        let Some(post_id) = post_id else {
            return Ok(Vec::new());
        };
        let matches = self
            .backend
            .fetch_by_relation(post_id, Relation::Similar)
            .await
            .ok_or_else(|| {
                ComparatorError::network(None, format!("similarity query for #{} failed", post_id))
            })?;

        Ok(matches
            .into_iter()
            .map(|post| {
                let score = post.similarity_percent();
                RelatedItem::new(post.id, RelationshipKind::Similar)
                    .with_similarity(score)
                    .from_site(self.site)
            })
            .collect())
    }
}

/// How preview anchors are turned into candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewMode {
    /// Post pages: relationship previews plus parent/child notices.
    Hierarchy,
    /// Search pages: every listed result is a similarity match.
    Similar,
}

/// Candidates the host page already lists.
pub struct PagePreviewSource {
    site: Site,
    mode: PreviewMode,
    previews: PagePreviews,
}

impl PagePreviewSource {
    pub fn new(site: Site, mode: PreviewMode, previews: PagePreviews) -> Self {
        Self {
            site,
            mode,
            previews,
        }
    }

    fn hierarchy(&self) -> Vec<RelatedItem> {
        let mut items = Vec::new();
        for anchor in &self.previews.anchors {
            if !anchor.has_preview_image {
                continue;
            }
            let kind = match anchor.section {
                PreviewSection::ParentPreview => {
                    if anchor.data_id.is_some() && anchor.data_id == self.previews.parent_id {
                        RelationshipKind::Parent
                    } else {
                        RelationshipKind::Sibling
                    }
                }
                PreviewSection::ChildrenPreview => RelationshipKind::Child,
                PreviewSection::SimilarList | PreviewSection::RelatedList => continue,
            };
            if let Some(id) = anchor.data_id.clone() {
                items.push(RelatedItem::new(id, kind).from_site(self.site));
            }
        }

        for notice in &self.previews.notices {
            if let Some(id) = notice.post_id() {
                let kind = if notice.is_parent() {
                    RelationshipKind::Parent
                } else {
                    RelationshipKind::Child
                };
                items.push(RelatedItem::new(id, kind).from_site(self.site));
            }
        }
        items
    }

    fn similar(&self) -> Vec<RelatedItem> {
        self.previews
            .anchors
            .iter()
            .filter(|anchor| anchor.section == PreviewSection::SimilarList)
            .filter_map(|anchor| {
                let id = anchor.post_id()?;
                Some(
                    RelatedItem::new(id, RelationshipKind::Similar)
                        .with_similarity(anchor.similarity())
                        .from_site(self.site),
                )
            })
            .collect()
    }
}

#[async_trait]
impl RelatedSource for PagePreviewSource {
    fn name(&self) -> &str {
        match self.mode {
            PreviewMode::Hierarchy => "page-hierarchy",
            PreviewMode::Similar => "page-similar",
        }
    }

    async fn related(&self, _post_id: Option<&str>) -> Result<Vec<RelatedItem>> {
        Ok(match self.mode {
            PreviewMode::Hierarchy => self.hierarchy(),
            PreviewMode::Similar => self.similar(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::related::{PostRecord, RelatedItemResolver};
    use crate::site::{NoticeLink, PreviewAnchor};
    use std::collections::HashMap;

    /// Backend answering from fixed tables; ids missing from a table fail.
    #[derive(Default)]
    struct TableBackend {
        posts: HashMap<String, PostRecord>,
        relations: HashMap<(String, Relation), Vec<PostRecord>>,
    }

    #[async_trait]
    impl PostBackend for TableBackend {
        async fn fetch_by_id(&self, id: &str) -> Option<PostRecord> {
            self.posts.get(id).cloned()
        }

        async fn fetch_by_relation(&self, id: &str, relation: Relation) -> Option<Vec<PostRecord>> {
            self.relations.get(&(id.to_string(), relation)).cloned()
        }
    }

    fn family_backend() -> TableBackend {
        let mut backend = TableBackend::default();
        backend
            .posts
            .insert("10".into(), PostRecord::new("10").with_parent("3"));
        backend.relations.insert(
            ("3".into(), Relation::ParentFamily),
            vec![
                PostRecord::new("3"),
                PostRecord::new("10").with_parent("3"),
                PostRecord::new("12").with_parent("3"),
                PostRecord::new("11").with_parent("3"),
            ],
        );
        backend.relations.insert(
            ("10".into(), Relation::Children),
            vec![PostRecord::new("20").with_parent("10")],
        );
        backend
    }

    #[tokio::test]
    async fn test_hierarchy_classification() {
        let source = HierarchySource::new(Site::Yandere, Arc::new(family_backend()));
        let resolver = RelatedItemResolver::new(vec![Arc::new(source)]);
        let list = resolver.resolve(Some("10")).await;

        let ranked: Vec<(&str, RelationshipKind)> =
            list.iter().map(|item| (item.id.as_str(), item.kind)).collect();
        assert_eq!(
            ranked,
            vec![
                ("3", RelationshipKind::Parent),
                ("11", RelationshipKind::Sibling),
                ("12", RelationshipKind::Sibling),
                ("20", RelationshipKind::Child),
            ]
        );
        assert!(list.iter().all(|item| item.source == Some(Site::Yandere)));
    }

    #[tokio::test]
    async fn test_hierarchy_missing_post_is_an_error() {
        let source = HierarchySource::new(Site::Konachan, Arc::new(TableBackend::default()));
        let err = source.related(Some("1")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_hierarchy_survives_failed_children_query() {
        let mut backend = family_backend();
        backend.relations.remove(&("10".to_string(), Relation::Children));
        let source = HierarchySource::new(Site::Yandere, Arc::new(backend));
        let items = source.related(Some("10")).await.unwrap();
        assert_eq!(items.len(), 3);
    }

    #[tokio::test]
    async fn test_similarity_scores() {
        let mut backend = TableBackend::default();
        backend.relations.insert(
            ("5".into(), Relation::Similar),
            vec![
                PostRecord::new("8").with_similarity(88.4),
                PostRecord::new("9").with_similarity(97.0),
            ],
        );
        let source = SimilaritySource::new(Site::Danbooru, Arc::new(backend));
        let items = source.related(Some("5")).await.unwrap();
        assert_eq!(items[0].option_label(), "#8 (88%)");
        assert_eq!(items[1].similarity, Some(97));
    }

    #[tokio::test]
    async fn test_failed_backend_does_not_hide_page_previews() {
        let previews = PagePreviews {
            anchors: vec![
                PreviewAnchor::new(PreviewSection::ChildrenPreview).with_data_id("31"),
            ],
            notices: Vec::new(),
            parent_id: None,
        };
        let resolver = RelatedItemResolver::new(vec![
            Arc::new(SimilaritySource::new(
                Site::Danbooru,
                Arc::new(TableBackend::default()),
            )),
            Arc::new(PagePreviewSource::new(
                Site::Danbooru,
                PreviewMode::Hierarchy,
                previews,
            )),
        ]);
        let list = resolver.resolve(Some("30")).await;
        assert_eq!(list.ids().collect::<Vec<_>>(), vec!["31"]);
    }

    #[tokio::test]
    async fn test_page_hierarchy_previews() {
        let mut no_image = PreviewAnchor::new(PreviewSection::ChildrenPreview).with_data_id("99");
        no_image.has_preview_image = false;
        let previews = PagePreviews {
            anchors: vec![
                PreviewAnchor::new(PreviewSection::ParentPreview).with_data_id("1"),
                PreviewAnchor::new(PreviewSection::ParentPreview).with_data_id("2"),
                PreviewAnchor::new(PreviewSection::ChildrenPreview).with_data_id("7"),
                no_image,
            ],
            notices: vec![
                NoticeLink::new("/posts?tags=parent:1"),
                NoticeLink::new("/posts?tags=child:8"),
            ],
            parent_id: Some("1".into()),
        };
        let source = PagePreviewSource::new(Site::Danbooru, PreviewMode::Hierarchy, previews);
        let items = source.related(Some("2")).await.unwrap();
        let list = crate::related::CandidateList::from_items(items, Some("2"));

        let ranked: Vec<(&str, RelationshipKind)> =
            list.iter().map(|item| (item.id.as_str(), item.kind)).collect();
        assert_eq!(
            ranked,
            vec![
                ("1", RelationshipKind::Parent),
                ("7", RelationshipKind::Child),
                ("8", RelationshipKind::Child),
            ]
        );
    }

    #[tokio::test]
    async fn test_page_similar_previews() {
        let previews = PagePreviews {
            anchors: vec![
                PreviewAnchor::new(PreviewSection::SimilarList)
                    .with_data_id("40")
                    .with_similarity_text("81% similar"),
                PreviewAnchor::new(PreviewSection::SimilarList).with_element_id("p41"),
                PreviewAnchor::new(PreviewSection::RelatedList).with_data_id("42"),
            ],
            ..PagePreviews::default()
        };
        let source = PagePreviewSource::new(Site::Konachan, PreviewMode::Similar, previews);
        let items = source.related(None).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].similarity, Some(81));
        assert_eq!(items[1].id, "41");
        assert_eq!(items[1].option_label(), "#41");
    }
}
