//! Layout assembly: turns generator output into cells and places them.

use serde::{Deserialize, Serialize};

use dosetest_core::{Cell, GeomPrimitive, Layer, Library, LibraryError, Point};

use crate::angled::{angle_pairs, AnglePairConfig};
use crate::bend::{bend_paths, overlapping_shapes, BendConfig};
use crate::checkerboard::{checkerboard, CheckerboardConfig};
use crate::lines::{line_array, LineArrayConfig, Orientation};

pub const VERTICAL_LINES: &str = "VERTICAL_LINES";
pub const HORIZONTAL_LINES: &str = "HORIZONTAL_LINES";
pub const ANGLE_LINES: &str = "ANGLE_LINES";
pub const CHECKERBOARD: &str = "CHECKERBOARD";
pub const L_SHAPES: &str = "L_SHAPES";
pub const TOP: &str = "TOP";

/// The four-group dose-test layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternSetConfig {
    pub library_name: String,
    /// Vertical distance between group origins in the top cell, in µm.
    pub cell_pitch: f64,
    pub vertical_lines: LineArrayConfig,
    pub horizontal_lines: LineArrayConfig,
    pub angle_pairs: AnglePairConfig,
    pub checkerboard: CheckerboardConfig,
}

impl Default for PatternSetConfig {
    fn default() -> Self {
        Self {
            library_name: "library".to_string(),
            cell_pitch: 80.0,
            vertical_lines: LineArrayConfig::default(),
            horizontal_lines: LineArrayConfig::default(),
            angle_pairs: AnglePairConfig::default(),
            checkerboard: CheckerboardConfig::default(),
        }
    }
}

/// The bend-radius layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BendSetConfig {
    pub library_name: String,
    pub bends: BendConfig,
}

impl Default for BendSetConfig {
    fn default() -> Self {
        Self {
            library_name: "library".to_string(),
            bends: BendConfig::default(),
        }
    }
}

fn rects_cell(name: &str, rects: Vec<dosetest_core::Rect>) -> Cell {
    Cell::with_geometries(name, rects.into_iter().map(GeomPrimitive::Rect).collect())
}

/// Groups stacked top to bottom: vertical lines, horizontal lines, angle
/// pairs, checkerboard. `TOP` references each at `(0, k·cell_pitch)`.
pub fn pattern_library(cfg: &PatternSetConfig) -> Result<Library, LibraryError> {
    let mut lib = Library::new(&cfg.library_name);
    lib.layer_stack.add_layer(Layer::new(cfg.vertical_lines.layer, "pattern"));

    let vertical = lib.add_cell(rects_cell(
        VERTICAL_LINES,
        line_array(&cfg.vertical_lines, Orientation::Vertical),
    ));
    let horizontal = lib.add_cell(rects_cell(
        HORIZONTAL_LINES,
        line_array(&cfg.horizontal_lines, Orientation::Horizontal),
    ));

    let mut angles = Cell::new(ANGLE_LINES);
    for pair in angle_pairs(&cfg.angle_pairs) {
        log::debug!("Angle pair {}° at ({}, {})", pair.angle_deg, pair.offset.x, pair.offset.y);
        angles.add_geometry(GeomPrimitive::Polygon(pair.first));
        angles.add_geometry(GeomPrimitive::Polygon(pair.second));
    }
    let angles = lib.add_cell(angles);

    let board = lib.add_cell(rects_cell(CHECKERBOARD, checkerboard(&cfg.checkerboard)));

    let top = lib.add_cell(Cell::new(TOP));
    lib.set_top_cell(top)?;
    for (k, group) in [vertical, horizontal, angles, board].into_iter().enumerate() {
        let row = (3 - k) as f64;
        lib.place(top, group, Point::new(0.0, row * cfg.cell_pitch))?;
    }

    log::info!(
        "Assembled library '{}' with {} cells",
        lib.name,
        lib.cell_count()
    );
    Ok(lib)
}

/// A single `L_SHAPES` cell holding one path per bend radius.
pub fn bend_library(cfg: &BendSetConfig) -> Library {
    let mut lib = Library::new(&cfg.library_name);
    lib.layer_stack
        .add_layer(Layer::new(cfg.bends.layer, "bend").with_color(0, 0, 255));

    let paths = bend_paths(&cfg.bends);
    for (a, b) in overlapping_shapes(&paths) {
        log::warn!(
            "L shapes {} and {} overlap at stacking {} (clear stacking is {})",
            a,
            b,
            cfg.bends.effective_stacking(),
            cfg.bends.clear_stacking()
        );
    }

    lib.add_cell(Cell::with_geometries(
        L_SHAPES,
        paths.into_iter().map(GeomPrimitive::Path).collect(),
    ));
    log::info!("Assembled library '{}' with {} L shapes", lib.name, cfg.bends.count);
    lib
}
