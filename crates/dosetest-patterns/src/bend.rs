//! Bend-radius "L" paths.
//!
//! Every shape is one stroked path: a straight run along +x, a 90° left turn
//! of radius `r_i`, and a straight tail along +y. Shapes are stacked
//! vertically, one radius per shape.

use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use dosetest_core::{GeomPrimitive, LayerId, Path, Point, SpatialIndex};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BendConfig {
    /// Start of the first shape.
    pub start: Point,
    /// Straight run before the bend, in µm.
    pub segment_length: f64,
    /// Straight run after the bend, in µm.
    pub tail_length: f64,
    pub radius_start: f64,
    /// Radius increment between successive shapes.
    pub radius_step: f64,
    pub count: usize,
    /// Stroke width in µm.
    pub width: f64,
    /// Vertical distance between shapes. `None` picks the clearance from
    /// [`BendConfig::clear_stacking`].
    pub stacking: Option<f64>,
    pub layer: LayerId,
}

impl Default for BendConfig {
    fn default() -> Self {
        Self {
            start: Point::origin(),
            segment_length: 10.0,
            tail_length: 5.0,
            radius_start: 5.0,
            radius_step: 1.0,
            count: 6,
            width: 1.0,
            stacking: None,
            layer: 1,
        }
    }
}

impl BendConfig {
    /// `r_i = radius_start + i·radius_step`.
    pub fn radii(&self) -> Vec<f64> {
        (0..self.count)
            .map(|i| self.radius_start + i as f64 * self.radius_step)
            .collect()
    }

    /// `2·(max radius + width)`, enough to keep shapes apart as long as the
    /// tail is no longer than the smallest radius plus one width.
    pub fn clear_stacking(&self) -> f64 {
        let max_radius = self.radii().into_iter().fold(0.0, f64::max);
        2.0 * (max_radius + self.width)
    }

    pub fn effective_stacking(&self) -> f64 {
        self.stacking.unwrap_or_else(|| self.clear_stacking())
    }
}

/// One L shape starting at `start`, heading +x.
pub fn bend_path(
    start: Point,
    segment_length: f64,
    radius: f64,
    tail_length: f64,
    width: f64,
    layer: LayerId,
) -> Path {
    Path::new(layer, start, width)
        .segment_to(start.translate(segment_length, 0.0))
        .arc(radius, FRAC_PI_2)
        .forward(tail_length)
}

/// All shapes; shape `i` starts at `start + (0, i·stacking)`.
pub fn bend_paths(cfg: &BendConfig) -> Vec<Path> {
    let stacking = cfg.effective_stacking();
    let radii = cfg.radii();
    if radii.windows(2).any(|w| w[1] <= w[0]) {
        log::warn!(
            "Bend radii are not strictly increasing (step {})",
            cfg.radius_step
        );
    }

    radii
        .iter()
        .enumerate()
        .map(|(i, &radius)| {
            let start = cfg.start.translate(0.0, i as f64 * stacking);
            log::debug!("L shape {}: radius {} at y={}", i, radius, start.y);
            bend_path(
                start,
                cfg.segment_length,
                radius,
                cfg.tail_length,
                cfg.width,
                cfg.layer,
            )
        })
        .collect()
}

/// Index pairs of shapes whose outlines' bounding boxes overlap.
pub fn overlapping_shapes(paths: &[Path]) -> Vec<(usize, usize)> {
    let geoms: Vec<GeomPrimitive> = paths.iter().cloned().map(GeomPrimitive::Path).collect();
    SpatialIndex::from_geometries(&geoms).overlapping_pairs(1e-9)
}
