//! Pointer events delivered by the map widget.

use crate::geometry::LatLng;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A pointer event on the map: geographic position plus container pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapEvent {
    /// Position under the pointer.
    pub lat_lng: LatLng,
    /// Position in map-container pixels.
    pub screen: Point,
    /// Click count reported by the browser (2 on the second click of a double-click).
    #[serde(default = "one")]
    pub click_count: u32,
}

fn one() -> u32 {
    1
}

impl MapEvent {
    pub fn new(lat: f64, lng: f64, screen_x: f64, screen_y: f64) -> Self {
        Self {
            lat_lng: LatLng::new(lat, lng),
            screen: Point::new(screen_x, screen_y),
            click_count: 1,
        }
    }

    pub fn with_click_count(mut self, click_count: u32) -> Self {
        self.click_count = click_count;
        self
    }

    /// Whether this click is the second half of a double-click.
    pub fn is_double_click(&self) -> bool {
        self.click_count == 2
    }
}
