use serde::{Deserialize, Serialize};

use dosetest_core::{LayerId, Rect};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerboardConfig {
    /// Edge length of one square in µm.
    pub square_size: f64,
    pub rows: usize,
    pub cols: usize,
    pub layer: LayerId,
}

impl Default for CheckerboardConfig {
    fn default() -> Self {
        Self {
            square_size: 5.0,
            rows: 6,
            cols: 6,
            layer: 0,
        }
    }
}

/// Whether grid cell (row, col) carries a square.
pub fn is_filled(row: usize, col: usize) -> bool {
    (row + col) % 2 == 0
}

/// Squares of a checkerboard, row-major. Row `i` sits at `y = i·s`,
/// column `j` at `x = j·s`.
pub fn checkerboard(cfg: &CheckerboardConfig) -> Vec<Rect> {
    let s = cfg.square_size;
    (0..cfg.rows)
        .flat_map(|i| (0..cfg.cols).map(move |j| (i, j)))
        .filter(|&(i, j)| is_filled(i, j))
        .map(|(i, j)| {
            let x0 = j as f64 * s;
            let y0 = i as f64 * s;
            Rect::new(cfg.layer, x0, y0, x0 + s, y0 + s)
        })
        .collect()
}
