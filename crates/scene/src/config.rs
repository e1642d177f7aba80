use serde::{Deserialize, Serialize};

use runtime::WHEEL_ZOOM_STEP;

use crate::picking::DEFAULT_PICK_TOLERANCE_PX;

/// Per-session view configuration.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub surface_width: f64,
    pub surface_height: f64,
    /// Multiplier applied to drag deltas before converting them to degrees.
    pub drag_sensitivity: f64,
    /// Zoom factor per wheel tick.
    pub zoom_step: f64,
    pub pick_tolerance_px: f64,
    pub show_graticule: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            surface_width: 800.0,
            surface_height: 600.0,
            drag_sensitivity: 1.2,
            zoom_step: WHEEL_ZOOM_STEP,
            pick_tolerance_px: DEFAULT_PICK_TOLERANCE_PX,
            show_graticule: false,
        }
    }
}

impl ViewConfig {
    pub fn with_surface(mut self, width: f64, height: f64) -> Self {
        self.surface_width = width;
        self.surface_height = height;
        self
    }

    /// Surface size with degenerate values raised to one pixel.
    pub fn surface(&self) -> (f64, f64) {
        (sanitize_extent(self.surface_width), sanitize_extent(self.surface_height))
    }
}

pub(crate) fn sanitize_extent(v: f64) -> f64 {
    if v.is_finite() { v.max(1.0) } else { 1.0 }
}
