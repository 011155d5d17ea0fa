//! Rectilinear line arrays: N parallel lines of equal width and pitch.

use serde::{Deserialize, Serialize};

use dosetest_core::{LayerId, Rect};

/// Direction the lines run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Lines run along y and are spaced along x.
    Vertical,
    /// Lines run along x and are spaced along y.
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineArrayConfig {
    /// Line width in µm.
    pub width: f64,
    /// Space between neighbouring lines in µm.
    pub gap: f64,
    /// Line length in µm.
    pub length: f64,
    pub count: usize,
    pub layer: LayerId,
}

impl Default for LineArrayConfig {
    fn default() -> Self {
        Self {
            width: 1.0,
            gap: 1.0,
            length: 50.0,
            count: 10,
            layer: 0,
        }
    }
}

impl LineArrayConfig {
    pub fn pitch(&self) -> f64 {
        self.width + self.gap
    }
}

/// Line `i` covers `[i·(w+g), i·(w+g)+w]` along the spacing axis and
/// `[0, length]` along the other.
pub fn line_array(cfg: &LineArrayConfig, orientation: Orientation) -> Vec<Rect> {
    (0..cfg.count)
        .map(|i| {
            let near = i as f64 * cfg.pitch();
            let far = near + cfg.width;
            match orientation {
                Orientation::Vertical => Rect::new(cfg.layer, near, 0.0, far, cfg.length),
                Orientation::Horizontal => Rect::new(cfg.layer, 0.0, near, cfg.length, far),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertical_edges_follow_pitch() {
        let lines = line_array(&LineArrayConfig::default(), Orientation::Vertical);
        assert_eq!(lines.len(), 10);
        for (i, r) in lines.iter().enumerate() {
            let near = 2.0 * i as f64;
            assert!((r.lower_left.x - near).abs() < 1e-9);
            assert!((r.upper_right.x - (near + 1.0)).abs() < 1e-9);
            assert!((r.height() - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_horizontal_is_transposed() {
        let cfg = LineArrayConfig {
            width: 0.5,
            gap: 1.5,
            count: 3,
            ..Default::default()
        };
        let lines = line_array(&cfg, Orientation::Horizontal);
        assert_eq!(lines.len(), 3);
        assert!((lines[2].lower_left.y - 4.0).abs() < 1e-9);
        assert!((lines[2].upper_right.y - 4.5).abs() < 1e-9);
        assert!((lines[2].width() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_count_is_empty() {
        let cfg = LineArrayConfig {
            count: 0,
            ..Default::default()
        };
        assert!(line_array(&cfg, Orientation::Vertical).is_empty());
    }
}
