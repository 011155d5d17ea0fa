use dosetest_core::{BBox, Cell, GeomPrimitive, Library, Point, DEFAULT_TOLERANCE};
use serde::{Deserialize, Serialize};

use crate::viewport::Viewport;
use crate::PreviewError;

/// Panel geometry and tessellation settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewStyle {
    pub panel_width: f64,
    pub panel_height: f64,
    /// Fraction of the panel kept free around the drawing.
    pub margin: f64,
    /// Height reserved above each panel for its title.
    pub title_height: f64,
    /// Chord tolerance for path arcs, in layout units.
    pub arc_tolerance: f64,
}

impl Default for PreviewStyle {
    fn default() -> Self {
        Self {
            panel_width: 640.0,
            panel_height: 320.0,
            margin: 0.1,
            title_height: 24.0,
            arc_tolerance: DEFAULT_TOLERANCE * 10.0,
        }
    }
}

/// A shape already mapped to panel pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PreviewShape {
    /// Closed, filled outline (rectangles and polygons).
    Fill {
        points: Vec<(f64, f64)>,
        color: String,
        opacity: f32,
    },
    /// Open centerline drawn with the path width.
    Stroke {
        points: Vec<(f64, f64)>,
        width: f64,
        color: String,
    },
}

/// One pattern group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewPanel {
    pub title: String,
    /// Layout extent of the group.
    pub bbox: BBox,
    pub viewport: Viewport,
    pub shapes: Vec<PreviewShape>,
}

/// Every panel of a library, top to bottom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewFrame {
    pub style: PreviewStyle,
    pub panels: Vec<PreviewPanel>,
}

impl PreviewFrame {
    /// Total pixel height with panels stacked vertically.
    pub fn height(&self) -> f64 {
        self.panels.len() as f64 * (self.style.panel_height + self.style.title_height)
    }

    pub fn width(&self) -> f64 {
        self.style.panel_width
    }

    /// Vertical pixel offset of panel `index`.
    pub fn panel_top(&self, index: usize) -> f64 {
        index as f64 * (self.style.panel_height + self.style.title_height)
    }
}

/// Build one panel for every cell that draws something, in library order.
/// Cells holding only references (the assembly cell) are skipped.
pub fn build_frame(lib: &Library, style: &PreviewStyle) -> Result<PreviewFrame, PreviewError> {
    let panels: Vec<PreviewPanel> = lib
        .all_cells()
        .filter_map(|cell| build_panel(lib, cell, style))
        .collect();

    if panels.is_empty() {
        return Err(PreviewError::EmptyLayout(lib.name.clone()));
    }
    log::debug!("Preview of {}: {} panel(s)", lib.name, panels.len());

    Ok(PreviewFrame {
        style: *style,
        panels,
    })
}

fn build_panel(lib: &Library, cell: &Cell, style: &PreviewStyle) -> Option<PreviewPanel> {
    let bbox = cell.local_bbox()?;
    let mut viewport = Viewport::new(style.panel_width, style.panel_height);
    viewport.fit_bbox(&bbox, style.margin);

    let shapes = cell
        .geometries
        .iter()
        .map(|geom| {
            let layer = lib.layer_stack.get_layer(geom.layer_id());
            let color = lib.layer_stack.color_for(geom.layer_id()).to_hex();
            let opacity = layer.map(|l| l.opacity).unwrap_or(1.0);
            let to_screen = |pts: &[Point]| -> Vec<(f64, f64)> {
                pts.iter().map(|p| viewport.layout_to_screen(p)).collect()
            };
            match geom {
                GeomPrimitive::Rect(r) => PreviewShape::Fill {
                    points: to_screen(&r.corners()),
                    color,
                    opacity,
                },
                GeomPrimitive::Polygon(p) => PreviewShape::Fill {
                    points: to_screen(&p.vertices),
                    color,
                    opacity,
                },
                GeomPrimitive::Path(p) => PreviewShape::Stroke {
                    points: to_screen(&p.centerline(style.arc_tolerance)),
                    width: viewport.scale_length(p.width),
                    color,
                },
            }
        })
        .collect();

    Some(PreviewPanel {
        title: format!("{} ({} shapes)", cell.name, cell.geometry_count()),
        bbox,
        viewport,
        shapes,
    })
}
