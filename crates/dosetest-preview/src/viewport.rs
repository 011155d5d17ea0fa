use dosetest_core::{BBox, Point};
use serde::{Deserialize, Serialize};

/// Maps layout coordinates (µm, y up) onto a fixed-size panel (px, y down).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Center X in layout coordinates.
    pub center_x: f64,
    /// Center Y in layout coordinates.
    pub center_y: f64,
    /// Pixels per layout unit, same on both axes.
    pub zoom: f64,
    /// Panel width in pixels.
    pub canvas_width: f64,
    /// Panel height in pixels.
    pub canvas_height: f64,
}

impl Viewport {
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            zoom: 1.0,
            canvas_width,
            canvas_height,
        }
    }

    /// Center on `bbox` and pick the largest uniform zoom that keeps it
    /// inside the panel, leaving `margin` (a fraction, e.g. 0.1) free.
    ///
    /// A box that is flat along one axis is fitted along the other; a
    /// single point keeps the current zoom.
    pub fn fit_bbox(&mut self, bbox: &BBox, margin: f64) {
        let center = bbox.center();
        self.center_x = center.x;
        self.center_y = center.y;

        let usable = (1.0 - margin).clamp(0.05, 1.0);
        let zoom_x = (bbox.width() > 0.0).then(|| self.canvas_width / bbox.width() * usable);
        let zoom_y = (bbox.height() > 0.0).then(|| self.canvas_height / bbox.height() * usable);
        self.zoom = match (zoom_x, zoom_y) {
            (Some(x), Some(y)) => x.min(y),
            (Some(z), None) | (None, Some(z)) => z,
            (None, None) => self.zoom,
        };
    }

    pub fn layout_to_screen_x(&self, layout_x: f64) -> f64 {
        (layout_x - self.center_x) * self.zoom + self.canvas_width / 2.0
    }

    /// Screen y grows downwards, layout y grows upwards.
    pub fn layout_to_screen_y(&self, layout_y: f64) -> f64 {
        self.canvas_height / 2.0 - (layout_y - self.center_y) * self.zoom
    }

    pub fn layout_to_screen(&self, p: &Point) -> (f64, f64) {
        (self.layout_to_screen_x(p.x), self.layout_to_screen_y(p.y))
    }

    /// Length in layout units to length in pixels.
    pub fn scale_length(&self, length: f64) -> f64 {
        length * self.zoom
    }
}
