//! The page the comparator is embedded in.

use crate::site::{PageHints, PageLocation, PagePreviews};

/// Read-only view of the host page.
///
/// Dynamically added previews are pushed to the comparator by the embedder;
/// nothing here is polled.
pub trait HostPage: Send + Sync {
    fn location(&self) -> PageLocation;

    fn hints(&self) -> PageHints;

    /// URL of the image the page currently shows (original file preferred).
    fn current_image_url(&self) -> Option<String>;

    fn previews(&self) -> PagePreviews;
}
