//! Comparator configuration model.
//!
//! Every field carries a serde default so that a partial (or empty)
//! `config.toml` is always usable.

use serde::{Deserialize, Serialize};

use crate::mode::OverlaySettings;
use crate::site::Site;
use crate::viewport::ZoomTransitionCalculator;

fn default_divider_width() -> f64 {
    crate::viewport::DEFAULT_DIVIDER_WIDTH
}

fn default_min_scale() -> f64 {
    crate::viewport::MIN_SCALE
}

fn default_opacity() -> u8 {
    50
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    format!("booru-comparator/{}", env!("CARGO_PKG_VERSION"))
}

fn default_danbooru() -> String {
    "https://danbooru.donmai.us".to_string()
}

fn default_yandere() -> String {
    "https://yande.re".to_string()
}

fn default_konachan() -> String {
    "https://konachan.com".to_string()
}

/// HTTP client settings shared by every backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Base URL of each origin's API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteEndpoints {
    #[serde(default = "default_danbooru")]
    pub danbooru: String,
    #[serde(default = "default_yandere")]
    pub yandere: String,
    #[serde(default = "default_konachan")]
    pub konachan: String,
}

impl SiteEndpoints {
    /// Base URL without a trailing slash.
    pub fn base_url(&self, site: Site) -> &str {
        let url = match site {
            Site::Danbooru => &self.danbooru,
            Site::Yandere => &self.yandere,
            Site::Konachan => &self.konachan,
        };
        url.trim_end_matches('/')
    }
}

impl Default for SiteEndpoints {
    fn default() -> Self {
        Self {
            danbooru: default_danbooru(),
            yandere: default_yandere(),
            konachan: default_konachan(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparatorConfig {
    /// Width of the side-by-side divider, in pixels.
    #[serde(default = "default_divider_width")]
    pub divider_width: f64,
    /// Lower bound applied when remapping zoom between topologies.
    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    /// Initial Fade opacity, in percent.
    #[serde(default = "default_opacity")]
    pub default_opacity: u8,
    /// Extra delay the host waits before delivering the next tick.
    #[serde(default)]
    pub restore_delay_ms: u64,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub sites: SiteEndpoints,
}

impl ComparatorConfig {
    pub fn calculator(&self) -> ZoomTransitionCalculator {
        let divider = if self.divider_width.is_finite() && self.divider_width >= 0.0 {
            self.divider_width
        } else {
            default_divider_width()
        };
        let min_scale = if self.min_scale.is_finite() && self.min_scale > 0.0 {
            self.min_scale
        } else {
            default_min_scale()
        };
        ZoomTransitionCalculator::new(divider, min_scale)
    }

    pub fn overlay_settings(&self) -> OverlaySettings {
        OverlaySettings::with_opacity(self.default_opacity)
    }
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self {
            divider_width: default_divider_width(),
            min_scale: default_min_scale(),
            default_opacity: default_opacity(),
            restore_delay_ms: 0,
            http: HttpConfig::default(),
            sites: SiteEndpoints::default(),
        }
    }
}
