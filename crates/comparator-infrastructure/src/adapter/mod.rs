//! `SiteAdapter` implementations and the registry that picks one per page.

mod danbooru;
mod moebooru;

pub use danbooru::DanbooruAdapter;
pub use moebooru::MoebooruAdapter;

use comparator_core::config::{ComparatorConfig, SiteEndpoints};
use comparator_core::error::{ComparatorError, Result};
use comparator_core::site::{PageContext, PageHints, PageLocation, Site, SiteAdapter};
use reqwest::Client;
use std::sync::Arc;

use crate::backend::{DanbooruBackend, MoebooruBackend};
use crate::http::build_client;

/// Every lookup failure of an explicit load reads "Post not found" to the user.
pub(crate) fn not_found(cause: &ComparatorError) -> ComparatorError {
    let status = match cause {
        ComparatorError::Network { status, .. } => *status,
        _ => None,
    };
    ComparatorError::network(status, "Post not found")
}

/// One adapter per supported origin.
#[derive(Clone)]
pub struct SiteRegistry {
    adapters: Vec<Arc<dyn SiteAdapter>>,
}

impl SiteRegistry {
    pub fn new(adapters: Vec<Arc<dyn SiteAdapter>>) -> Self {
        Self { adapters }
    }

    /// HTTP adapters for all three origins, sharing one client.
    pub fn from_config(config: &ComparatorConfig) -> Result<Self> {
        let client = build_client(&config.http)?;
        Ok(Self::with_client(client, &config.sites))
    }

    pub fn with_client(client: Client, sites: &SiteEndpoints) -> Self {
        let danbooru = Arc::new(DanbooruBackend::new(
            client.clone(),
            sites.base_url(Site::Danbooru),
        ));
        let yandere = Arc::new(MoebooruBackend::new(
            client.clone(),
            sites.base_url(Site::Yandere),
        ));
        let konachan = Arc::new(MoebooruBackend::new(client, sites.base_url(Site::Konachan)));

        Self::new(vec![
            Arc::new(DanbooruAdapter::new(danbooru)),
            Arc::new(MoebooruAdapter::yandere(yandere)),
            Arc::new(MoebooruAdapter::konachan(konachan)),
        ])
    }

    pub fn adapter(&self, site: Site) -> Option<Arc<dyn SiteAdapter>> {
        self.adapters
            .iter()
            .find(|adapter| adapter.site() == site)
            .cloned()
    }

    /// The adapter that recognizes the page, with the detected context.
    pub fn detect(
        &self,
        location: &PageLocation,
        hints: &PageHints,
    ) -> Option<(Arc<dyn SiteAdapter>, PageContext)> {
        self.adapters.iter().find_map(|adapter| {
            adapter
                .detect(location, hints)
                .map(|context| (adapter.clone(), context))
        })
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
