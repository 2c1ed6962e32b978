//! Image slots.
//!
//! A comparison always has two slots: `Left` (the reference image from the
//! current page) and `Right` (the comparand chosen by the user).

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two image positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Left,
    Right,
}

impl Slot {
    pub const BOTH: [Slot; 2] = [Slot::Left, Slot::Right];

    pub fn other(self) -> Slot {
        match self {
            Slot::Left => Slot::Right,
            Slot::Right => Slot::Left,
        }
    }
}

/// Identity of the image shown in a slot.
///
/// Besides real post ids, the page context can supply a few well-known
/// placeholder ids that only affect labelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ImageId {
    /// A backend post id.
    Post(String),
    /// A direct URL typed by the user.
    Custom,
    /// The image being uploaded on an upload page.
    Upload,
    /// The query image of an IQDB search.
    Iqdb,
    /// The query image of a "similar posts" search.
    Similar,
    /// Nothing is known about the image.
    Unknown,
}

impl ImageId {
    pub fn post(id: impl Into<String>) -> Self {
        ImageId::Post(id.into())
    }

    /// Returns the post id when the slot holds a real post.
    pub fn post_id(&self) -> Option<&str> {
        match self {
            ImageId::Post(id) => Some(id),
            _ => None,
        }
    }

    /// The raw attribute value the original markup would carry.
    pub fn as_str(&self) -> &str {
        match self {
            ImageId::Post(id) => id,
            ImageId::Custom => "custom",
            ImageId::Upload => "upload",
            ImageId::Iqdb => "iqdb",
            ImageId::Similar => "similar",
            ImageId::Unknown => "unknown",
        }
    }

    /// Short label used in the "Compare: a vs b" info line.
    pub fn label(&self) -> String {
        match self {
            ImageId::Post(id) => format!("#{}", id),
            ImageId::Custom => "Custom".to_string(),
            ImageId::Upload => "Upload".to_string(),
            ImageId::Iqdb => "IQDB".to_string(),
            ImageId::Similar => "Similar".to_string(),
            ImageId::Unknown => "#unknown".to_string(),
        }
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intrinsic pixel size of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width / height, or `None` for degenerate sizes.
    pub fn aspect(&self) -> Option<f64> {
        if self.width == 0 || self.height == 0 {
            None
        } else {
            Some(self.width as f64 / self.height as f64)
        }
    }
}

/// Contents of one slot.
///
/// An empty slot has no URL; its id is then meaningless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSlot {
    pub id: ImageId,
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
}

impl ImageSlot {
    pub fn new(id: ImageId, url: impl Into<String>) -> Self {
        Self {
            id,
            url: Some(url.into()),
            dimensions: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            id: ImageId::Unknown,
            url: None,
            dimensions: None,
        }
    }

    pub fn with_dimensions(mut self, dimensions: Option<Dimensions>) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.url.as_deref().is_none_or(|url| url.trim().is_empty())
    }
}

impl Default for ImageSlot {
    fn default() -> Self {
        Self::empty()
    }
}

/// A value kept once per slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotPair<T> {
    pub left: T,
    pub right: T,
}

impl<T> SlotPair<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    pub fn get(&self, slot: Slot) -> &T {
        match slot {
            Slot::Left => &self.left,
            Slot::Right => &self.right,
        }
    }

    pub fn get_mut(&mut self, slot: Slot) -> &mut T {
        match slot {
            Slot::Left => &mut self.left,
            Slot::Right => &mut self.right,
        }
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.left, &mut self.right);
    }
}
