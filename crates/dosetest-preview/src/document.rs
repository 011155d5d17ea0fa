use std::path::Path;

use svg::node::element::{Group, Polygon, Polyline, Rectangle, Text};
use svg::Document;

use crate::render_data::{PreviewFrame, PreviewPanel, PreviewShape};

fn points_attr(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{x:.3},{y:.3}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn panel_group(frame: &PreviewFrame, index: usize, panel: &PreviewPanel) -> Group {
    let style = &frame.style;

    let title = Text::new(panel.title.clone())
        .set("x", 8.0)
        .set("y", style.title_height - 8.0)
        .set("font-family", "sans-serif")
        .set("font-size", 14.0);

    let border = Rectangle::new()
        .set("x", 0.0)
        .set("y", 0.0)
        .set("width", style.panel_width)
        .set("height", style.panel_height)
        .set("fill", "none")
        .set("stroke", "#cccccc")
        .set("stroke-width", 1.0);

    let body = panel
        .shapes
        .iter()
        .fold(Group::new().add(border), |group, shape| match shape {
            PreviewShape::Fill {
                points,
                color,
                opacity,
            } => group.add(
                Polygon::new()
                    .set("points", points_attr(points))
                    .set("fill", color.as_str())
                    .set("fill-opacity", *opacity)
                    .set("stroke", "none"),
            ),
            PreviewShape::Stroke {
                points,
                width,
                color,
            } => group.add(
                Polyline::new()
                    .set("points", points_attr(points))
                    .set("fill", "none")
                    .set("stroke", color.as_str())
                    .set("stroke-width", *width)
                    .set("stroke-linejoin", "round"),
            ),
        })
        .set("transform", format!("translate(0,{})", style.title_height));

    Group::new()
        .set("transform", format!("translate(0,{})", frame.panel_top(index)))
        .add(title)
        .add(body)
}

/// Lay the panels out top to bottom in one document.
pub fn to_document(frame: &PreviewFrame) -> Document {
    let (width, height) = (frame.width(), frame.height());
    let background = Rectangle::new()
        .set("width", width)
        .set("height", height)
        .set("fill", "white");

    frame.panels.iter().enumerate().fold(
        Document::new()
            .set("viewBox", (0.0, 0.0, width, height))
            .set("width", width)
            .set("height", height)
            .add(background),
        |doc, (index, panel)| doc.add(panel_group(frame, index, panel)),
    )
}

pub fn save(frame: &PreviewFrame, path: &Path) -> std::io::Result<()> {
    svg::save(path, &to_document(frame))
}
