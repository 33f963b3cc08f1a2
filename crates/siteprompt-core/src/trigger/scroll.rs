use serde::{Deserialize, Serialize};

/// Viewport metrics sampled on a scroll event, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub viewport_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, scroll_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_top,
            scroll_height,
            viewport_height,
        }
    }

    /// How far down the scrollable range the reader is, 0.0 ..= 100.0.
    ///
    /// Content that fits in the viewport has no scrollable range and reports 0.
    pub fn percent(&self) -> f64 {
        let scrollable = self.scroll_height - self.viewport_height;
        if !scrollable.is_finite() || scrollable <= 0.0 || !self.scroll_top.is_finite() {
            return 0.0;
        }
        (self.scroll_top / scrollable * 100.0).clamp(0.0, 100.0)
    }

    pub fn reaches(&self, threshold_percent: f64) -> bool {
        self.scroll_height > self.viewport_height && self.percent() >= threshold_percent
    }
}
