//! Editor configuration.

use crate::geometry::LatLng;
use crate::storage::STORAGE_KEY;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Map defaults and UI constants. Every field has a default, so a partial
/// JSON document is enough to override one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Initial map centre.
    pub map_center: LatLng,
    /// Initial zoom level.
    pub default_zoom: f64,
    /// Zoom used when focusing a selected point.
    pub focus_zoom: f64,
    /// Padding in pixels when fitting the view to a selected line or polygon.
    pub fit_padding: f64,
    /// Key the feature collection is persisted under.
    pub storage_key: String,
    /// Approximate size of the rename form, used to keep it on screen.
    pub rename_form_size: Size,
    /// Minimum distance in pixels between the rename form and the container edge.
    pub rename_form_margin: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            map_center: LatLng::new(20.5937, 78.9629),
            default_zoom: 6.0,
            focus_zoom: 12.0,
            fit_padding: 50.0,
            storage_key: STORAGE_KEY.to_string(),
            rename_form_size: Size::new(280.0, 150.0),
            rename_form_margin: 20.0,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
