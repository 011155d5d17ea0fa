//! Angled rectangle pairs.
//!
//! Each sample is two rectangles of the same size. The first lies along +x;
//! the second is rotated about its own bottom-left corner `(0, -w/2)` and
//! attached so that corner lands on the first rectangle's bottom-right
//! corner. Successive samples are stepped diagonally so they do not collide.

use serde::{Deserialize, Serialize};

use dosetest_core::{LayerId, Point, Polygon};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnglePairConfig {
    /// Length of each rectangle in µm.
    pub length: f64,
    /// Width of each rectangle in µm.
    pub width: f64,
    /// Joint angles, one sample per entry.
    pub angles_deg: Vec<f64>,
    /// Diagonal step between samples, in multiples of `width`.
    pub stride: f64,
    pub layer: LayerId,
}

impl Default for AnglePairConfig {
    fn default() -> Self {
        Self {
            length: 30.0,
            width: 1.0,
            angles_deg: (0..=90).step_by(15).map(f64::from).collect(),
            stride: 4.0,
            layer: 0,
        }
    }
}

impl AnglePairConfig {
    /// Offset added after each sample: `(-stride·w, +stride·w)`.
    pub fn step(&self) -> Point {
        let d = self.stride * self.width;
        Point::new(-d, d)
    }
}

/// One generated sample.
#[derive(Debug, Clone, PartialEq)]
pub struct AnglePair {
    pub angle_deg: f64,
    /// Where the sample's local origin was placed.
    pub offset: Point,
    /// The straight rectangle.
    pub first: Polygon,
    /// The rotated rectangle.
    pub second: Polygon,
}

impl AnglePair {
    /// The shared corner both rectangles hinge on.
    pub fn pivot(&self) -> Point {
        self.first.vertices[1]
    }
}

/// Build both rectangles of one sample at `offset`.
pub fn angle_pair(
    length: f64,
    width: f64,
    angle: f64,
    offset: Point,
    layer: LayerId,
) -> (Polygon, Polygon) {
    let half = width / 2.0;
    let base = Polygon::rectangle(layer, Point::new(0.0, -half), Point::new(length, half));

    let first = base.clone().translate(offset.x, offset.y);
    let second = base
        .rotate(angle, Point::new(0.0, -half))
        .translate(length + offset.x, offset.y);
    (first, second)
}

/// All samples, with the running offset folded through the angle list.
pub fn angle_pairs(cfg: &AnglePairConfig) -> Vec<AnglePair> {
    let step = cfg.step();
    cfg.angles_deg
        .iter()
        .scan(Point::origin(), |offset, &angle_deg| {
            let here = *offset;
            let (first, second) =
                angle_pair(cfg.length, cfg.width, angle_deg.to_radians(), here, cfg.layer);
            *offset = here.translate(step.x, step.y);
            Some(AnglePair {
                angle_deg,
                offset: here,
                first,
                second,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_angles() {
        let cfg = AnglePairConfig::default();
        assert_eq!(cfg.angles_deg, vec![0.0, 15.0, 30.0, 45.0, 60.0, 75.0, 90.0]);
    }

    #[test]
    fn test_pivot_vertex_is_shared_for_every_angle() {
        let pairs = angle_pairs(&AnglePairConfig::default());
        assert_eq!(pairs.len(), 7);
        for pair in &pairs {
            let a_corner = pair.pivot();
            let b_corner = pair.second.vertices[0];
            assert!(
                a_corner.distance_to(&b_corner) < 1e-9,
                "joint drifted at {}°",
                pair.angle_deg
            );
            assert!((a_corner.x - (30.0 + pair.offset.x)).abs() < 1e-9);
            assert!((a_corner.y - (-0.5 + pair.offset.y)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_angle_pair_is_collinear_and_abutting() {
        let (a, b) = angle_pair(30.0, 1.0, 0.0, Point::origin(), 0);
        let ba = a.bbox().unwrap();
        let bb = b.bbox().unwrap();
        assert!((ba.max.x - 30.0).abs() < 1e-9);
        assert!((bb.min.x - 30.0).abs() < 1e-9);
        assert!((bb.max.x - 60.0).abs() < 1e-9);
        assert!((ba.min.y - bb.min.y).abs() < 1e-9);
        assert!((ba.max.y - bb.max.y).abs() < 1e-9);
        assert!(!ba.overlaps(&bb, 1e-9));
    }

    #[test]
    fn test_right_angle_turns_second_rectangle_upward() {
        let (_, b) = angle_pair(30.0, 1.0, 90f64.to_radians(), Point::origin(), 0);
        let bb = b.bbox().unwrap();
        assert!((bb.min.x - 29.0).abs() < 1e-9);
        assert!((bb.max.x - 30.0).abs() < 1e-9);
        assert!((bb.min.y + 0.5).abs() < 1e-9);
        assert!((bb.max.y - 29.5).abs() < 1e-9);
    }

    #[test]
    fn test_offsets_step_diagonally() {
        let pairs = angle_pairs(&AnglePairConfig::default());
        for (i, pair) in pairs.iter().enumerate() {
            assert!((pair.offset.x + 4.0 * i as f64).abs() < 1e-12);
            assert!((pair.offset.y - 4.0 * i as f64).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rotation_keeps_vertex_order() {
        for pair in angle_pairs(&AnglePairConfig::default()) {
            assert!((pair.second.signed_area() - 30.0).abs() < 1e-9);
        }
    }
}
