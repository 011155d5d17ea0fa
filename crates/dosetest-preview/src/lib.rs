//! # Dose-Test Preview
//!
//! Renders each pattern group of a library into its own panel of an SVG
//! file, stacked vertically with equal axis scaling. SVG output needs the
//! `svg` feature; without it [`render_svg`] reports
//! [`PreviewError::Unavailable`] and callers carry on without a preview.

pub mod viewport;
pub mod render_data;
#[cfg(feature = "svg")]
pub mod document;

use std::path::Path;

use dosetest_core::Library;
use thiserror::Error;

pub use render_data::{build_frame, PreviewFrame, PreviewPanel, PreviewShape, PreviewStyle};
pub use viewport::Viewport;

#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("Preview rendering is not available in this build")]
    Unavailable,

    #[error("Library '{0}' has no geometry to preview")]
    EmptyLayout(String),

    #[error("Failed to write preview: {0}")]
    Io(#[from] std::io::Error),
}

/// Render `lib` to an SVG file at `path`.
#[cfg(feature = "svg")]
pub fn render_svg(lib: &Library, path: &Path, style: &PreviewStyle) -> Result<(), PreviewError> {
    let frame = build_frame(lib, style)?;
    document::save(&frame, path)?;
    log::info!("Wrote preview {} ({} panels)", path.display(), frame.panels.len());
    Ok(())
}

/// Render `lib` to an SVG file at `path`.
#[cfg(not(feature = "svg"))]
pub fn render_svg(lib: &Library, path: &Path, _style: &PreviewStyle) -> Result<(), PreviewError> {
    log::debug!("Skipping preview of {} at {}", lib.name, path.display());
    Err(PreviewError::Unavailable)
}

#[cfg(all(test, feature = "svg"))]
mod tests {
    use super::*;
    use dosetest_core::{Cell, GeomPrimitive, Rect};

    #[test]
    fn test_render_writes_file() {
        let mut lib = Library::new("file");
        lib.add_cell(Cell::with_geometries(
            "LINES",
            vec![GeomPrimitive::Rect(Rect::new(0, 0.0, 0.0, 1.0, 50.0))],
        ));
        let path = std::env::temp_dir().join(format!("dosetest-preview-{}.svg", std::process::id()));
        render_svg(&lib, &path, &PreviewStyle::default()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(text.starts_with("<svg"));
        assert!(text.contains("LINES (1 shapes)"));
    }
}
