//! Related candidates: model, ranking and resolution.
//!
//! # Module Structure
//!
//! - `RelatedItem` / `RelationshipKind`: the normalized candidate record
//! - `CandidateList`: deduplicated, ranked, append-only list shown to the user
//! - `backend`: `PostBackend`, the schema-specific query collaborator
//! - `resolver`: `RelatedSource` and `RelatedItemResolver` (parallel, failure tolerant)
//! - `sources`: hierarchy, similarity and page-preview sources

mod backend;
mod resolver;
mod sources;

pub use backend::{PostBackend, PostRecord, Relation};
pub use resolver::{RelatedItemResolver, RelatedSource};
pub use sources::{HierarchySource, PagePreviewSource, PreviewMode, SimilaritySource};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strum::{Display, EnumString};

use crate::site::Site;

/// Classification of a candidate relative to the current image.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum RelationshipKind {
    Similar,
    Parent,
    Sibling,
    Child,
    /// A relation no rule classified. Sorts after everything else.
    Unclassified,
}

impl RelationshipKind {
    /// Sort priority; lower ranks first.
    pub fn priority(self) -> u8 {
        match self {
            RelationshipKind::Similar => 0,
            RelationshipKind::Parent => 1,
            RelationshipKind::Sibling => 2,
            RelationshipKind::Child => 3,
            RelationshipKind::Unclassified => 5,
        }
    }
}

/// A normalized candidate image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelatedItem {
    pub id: String,
    pub kind: RelationshipKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Site>,
}

impl RelatedItem {
    pub fn new(id: impl Into<String>, kind: RelationshipKind) -> Self {
        Self {
            id: id.into(),
            kind,
            similarity: None,
            source: None,
        }
    }

    pub fn with_similarity(mut self, similarity: Option<u32>) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn from_site(mut self, site: Site) -> Self {
        self.source = Some(site);
        self
    }

    /// Numeric sort key. Ids that are not numbers sort last within their kind.
    pub fn numeric_id(&self) -> u64 {
        self.id.parse().unwrap_or(u64::MAX)
    }

    /// Text of the candidate's entry in the selector.
    pub fn option_label(&self) -> String {
        match (self.similarity, self.kind) {
            (Some(score), _) if score > 0 => format!("#{} ({}%)", self.id, score),
            (_, RelationshipKind::Similar) => format!("#{}", self.id),
            (_, kind) => format!("#{} ({})", self.id, kind),
        }
    }
}

/// Stable sort by `(priority, numeric id)`.
pub fn rank(items: &mut [RelatedItem]) {
    items.sort_by_key(|item| (item.kind.priority(), item.numeric_id()));
}

/// Ranked, deduplicated candidates for one session.
///
/// The first occurrence of an id wins; the current image's own id is never
/// admitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateList {
    items: Vec<RelatedItem>,
    #[serde(skip)]
    exclude: Option<String>,
}

impl CandidateList {
    pub fn new(exclude: Option<String>) -> Self {
        Self {
            items: Vec::new(),
            exclude,
        }
    }

    pub fn from_items(items: Vec<RelatedItem>, exclude: Option<&str>) -> Self {
        let mut list = Self::new(exclude.map(str::to_string));
        list.append(items);
        list
    }

    /// Adds new candidates, skipping duplicates and the excluded id, then re-ranks.
    ///
    /// Returns how many items were admitted.
    pub fn append(&mut self, items: impl IntoIterator<Item = RelatedItem>) -> usize {
        let mut seen: HashSet<String> = self.items.iter().map(|item| item.id.clone()).collect();
        let before = self.items.len();
        for item in items {
            if item.id.is_empty() || self.exclude.as_deref() == Some(item.id.as_str()) {
                continue;
            }
            if seen.insert(item.id.clone()) {
                self.items.push(item);
            }
        }
        rank(&mut self.items);
        self.items.len() - before
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelatedItem> {
        self.items.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.id.as_str())
    }

    pub fn get(&self, id: &str) -> Option<&RelatedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[RelatedItem] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &CandidateList) -> Vec<&str> {
        list.ids().collect()
    }

    #[test]
    fn test_dedupe_and_rank() {
        let list = CandidateList::from_items(
            vec![
                RelatedItem::new("5", RelationshipKind::Sibling),
                RelatedItem::new("5", RelationshipKind::Sibling),
                RelatedItem::new("3", RelationshipKind::Parent),
                RelatedItem::new("9", RelationshipKind::Similar),
            ],
            None,
        );
        assert_eq!(ids(&list), vec!["9", "3", "5"]);
    }

    #[test]
    fn test_excludes_current_id() {
        let list = CandidateList::from_items(
            vec![
                RelatedItem::new("7", RelationshipKind::Child),
                RelatedItem::new("8", RelationshipKind::Child),
            ],
            Some("7"),
        );
        assert_eq!(ids(&list), vec!["8"]);
    }

    #[test]
    fn test_first_occurrence_wins() {
        let list = CandidateList::from_items(
            vec![
                RelatedItem::new("4", RelationshipKind::Child),
                RelatedItem::new("4", RelationshipKind::Parent),
            ],
            None,
        );
        assert_eq!(list.get("4").unwrap().kind, RelationshipKind::Child);
    }

    #[test]
    fn test_numeric_order_within_kind() {
        let list = CandidateList::from_items(
            vec![
                RelatedItem::new("100", RelationshipKind::Child),
                RelatedItem::new("abc", RelationshipKind::Child),
                RelatedItem::new("20", RelationshipKind::Child),
                RelatedItem::new("1", RelationshipKind::Unclassified),
            ],
            None,
        );
        assert_eq!(ids(&list), vec!["20", "100", "abc", "1"]);
    }

    #[test]
    fn test_append_keeps_ranking() {
        let mut list =
            CandidateList::from_items(vec![RelatedItem::new("5", RelationshipKind::Child)], Some("1"));
        let admitted = list.append(vec![
            RelatedItem::new("1", RelationshipKind::Parent),
            RelatedItem::new("2", RelationshipKind::Parent),
            RelatedItem::new("5", RelationshipKind::Similar),
        ]);
        assert_eq!(admitted, 1);
        assert_eq!(ids(&list), vec!["2", "5"]);
    }

    #[test]
    fn test_option_labels() {
        assert_eq!(
            RelatedItem::new("12", RelationshipKind::Similar)
                .with_similarity(Some(91))
                .option_label(),
            "#12 (91%)"
        );
        assert_eq!(
            RelatedItem::new("12", RelationshipKind::Similar).option_label(),
            "#12"
        );
        assert_eq!(
            RelatedItem::new("12", RelationshipKind::Parent).option_label(),
            "#12 (Parent)"
        );
    }
}
