//! Render and server settings.

use crate::viz::util::map_locale;
use num_format::Locale;
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_WIDTH: u32 = 1000;
pub const DEFAULT_HEIGHT: u32 = 600;
/// The correlation heatmap needs a taller canvas for its square cells.
pub const HEATMAP_HEIGHT: u32 = 800;
pub const DEFAULT_TITLE: &str = "Supermarket Sales Analysis";
pub const DEFAULT_DATA_PATH: &str = "supermarket_sales.csv";
pub const DEFAULT_ADDR: &str = "127.0.0.1:5000";

/// Canvas size and number formatting for rendered charts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    /// Locale tag for thousands/decimal separators, e.g. `en` or `de`.
    pub locale: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            locale: "en".into(),
        }
    }
}

impl RenderOptions {
    pub fn num_locale(&self) -> &'static Locale {
        map_locale(&self.locale).0
    }

    pub fn decimal_separator(&self) -> char {
        map_locale(&self.locale).1
    }
}

/// Everything the web server needs at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub data_path: PathBuf,
    pub addr: SocketAddr,
    pub title: String,
    pub render: RenderOptions,
}
