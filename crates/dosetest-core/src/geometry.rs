use serde::{Deserialize, Serialize};

use crate::cell::Transform;
use crate::LayerId;

/// A 2D point in layout coordinates (micrometers).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Rotate counter-clockwise by `angle` radians about `pivot`.
    ///
    /// The pivot is moved to the origin, the rotation matrix applied, and the
    /// pivot moved back, so `pivot` itself is a fixed point.
    pub fn rotate_about(&self, pivot: &Point, angle: f64) -> Self {
        let (sin_a, cos_a) = angle.sin_cos();
        let dx = self.x - pivot.x;
        let dy = self.y - pivot.y;
        Self {
            x: pivot.x + dx * cos_a - dy * sin_a,
            y: pivot.y + dx * sin_a + dy * cos_a,
        }
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn from_points(points: &[Point]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            min: Point::new(min_x, min_y),
            max: Point::new(max_x, max_y),
        })
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// True when the interiors overlap by more than `eps` on both axes.
    /// Boxes that only share an edge or a corner do not overlap.
    pub fn overlaps(&self, other: &BBox, eps: f64) -> bool {
        let dx = self.max.x.min(other.max.x) - self.min.x.max(other.min.x);
        let dy = self.max.y.min(other.max.y) - self.min.y.max(other.min.y);
        dx > eps && dy > eps
    }

    pub fn union(&self, other: &BBox) -> Self {
        Self {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn expand(&self, margin: f64) -> Self {
        Self {
            min: self.min.translate(-margin, -margin),
            max: self.max.translate(margin, margin),
        }
    }
}

/// Bounding box of a sequence of boxes, `None` when empty.
pub fn union_all(boxes: impl IntoIterator<Item = BBox>) -> Option<BBox> {
    boxes.into_iter().reduce(|acc, bb| acc.union(&bb))
}

/// A rectangle defined by lower-left and upper-right corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub layer_id: LayerId,
    pub lower_left: Point,
    pub upper_right: Point,
}

impl Rect {
    pub fn new(layer_id: LayerId, x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            layer_id,
            lower_left: Point::new(x1.min(x2), y1.min(y2)),
            upper_right: Point::new(x1.max(x2), y1.max(y2)),
        }
    }

    pub fn bbox(&self) -> BBox {
        BBox::new(self.lower_left, self.upper_right)
    }

    pub fn width(&self) -> f64 {
        self.upper_right.x - self.lower_left.x
    }

    pub fn height(&self) -> f64 {
        self.upper_right.y - self.lower_left.y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn contains_point(&self, p: &Point) -> bool {
        self.bbox().contains_point(p)
    }

    /// Corners in counter-clockwise order starting at the lower-left corner.
    pub fn corners(&self) -> [Point; 4] {
        let ll = self.lower_left;
        let ur = self.upper_right;
        [ll, Point::new(ur.x, ll.y), ur, Point::new(ll.x, ur.y)]
    }

    pub fn to_polygon(&self) -> Polygon {
        Polygon::new(self.layer_id, self.corners().to_vec())
    }
}

/// A polygon defined by a list of vertices. Vertex order is the boundary
/// traversal order and is kept as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub layer_id: LayerId,
    pub vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(layer_id: LayerId, vertices: Vec<Point>) -> Self {
        Self { layer_id, vertices }
    }

    /// Rectangle spanning the two corners, as a polygon.
    pub fn rectangle(layer_id: LayerId, corner1: Point, corner2: Point) -> Self {
        Rect::new(layer_id, corner1.x, corner1.y, corner2.x, corner2.y).to_polygon()
    }

    pub fn bbox(&self) -> Option<BBox> {
        BBox::from_points(&self.vertices)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Signed shoelace area; positive for counter-clockwise vertex order.
    pub fn signed_area(&self) -> f64 {
        let n = self.vertices.len();
        if n < 3 {
            return 0.0;
        }
        let mut acc = 0.0;
        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];
            acc += a.x * b.y - b.x * a.y;
        }
        acc / 2.0
    }

    pub fn translate(mut self, dx: f64, dy: f64) -> Self {
        for v in &mut self.vertices {
            *v = v.translate(dx, dy);
        }
        self
    }

    pub fn rotate(mut self, angle: f64, pivot: Point) -> Self {
        for v in &mut self.vertices {
            *v = v.rotate_about(&pivot, angle);
        }
        self
    }
}

/// One drawing instruction of a [`Path`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    /// Straight segment to an absolute point.
    Segment { to: Point },
    /// Circular arc tangent to the current heading. A positive sweep turns
    /// left (counter-clockwise).
    Arc { radius: f64, sweep: f64 },
}

/// A stroked path: a start point, a heading and a list of instructions.
///
/// The instruction list is kept as given; [`Path::centerline`] expands it to
/// points for export and rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub layer_id: LayerId,
    pub start: Point,
    /// Initial direction of travel in radians.
    pub initial_heading: f64,
    pub width: f64,
    pub commands: Vec<PathCommand>,
}

/// Chord tolerance used when a caller has no better value (1 nm).
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

impl Path {
    pub fn new(layer_id: LayerId, start: Point, width: f64) -> Self {
        Self {
            layer_id,
            start,
            initial_heading: 0.0,
            width,
            commands: Vec::new(),
        }
    }

    /// Path through the given points with straight segments only.
    pub fn polyline(layer_id: LayerId, points: &[Point], width: f64) -> Self {
        let start = points.first().copied().unwrap_or_else(Point::origin);
        let mut path = Self::new(layer_id, start, width);
        for p in points.iter().skip(1) {
            path = path.segment_to(*p);
        }
        path
    }

    pub fn segment_to(mut self, to: Point) -> Self {
        self.commands.push(PathCommand::Segment { to });
        self
    }

    /// Straight segment of `distance` along the current heading.
    pub fn forward(self, distance: f64) -> Self {
        let (pos, heading) = self.end_state();
        let to = Point::new(
            pos.x + distance * heading.cos(),
            pos.y + distance * heading.sin(),
        );
        self.segment_to(to)
    }

    pub fn arc(mut self, radius: f64, sweep: f64) -> Self {
        self.commands.push(PathCommand::Arc { radius, sweep });
        self
    }

    /// Position and heading after the last instruction.
    pub fn end_state(&self) -> (Point, f64) {
        let mut cursor = Cursor::new(self.start, self.initial_heading);
        for cmd in &self.commands {
            cursor.step(cmd, None);
        }
        (cursor.pos, cursor.heading)
    }

    pub fn end_point(&self) -> Point {
        self.end_state().0
    }

    /// Expand the instructions into centerline points. Arcs are split so the
    /// chord deviates from the true arc by at most `tolerance`.
    pub fn centerline(&self, tolerance: f64) -> Vec<Point> {
        let mut points = vec![self.start];
        let mut cursor = Cursor::new(self.start, self.initial_heading);
        for cmd in &self.commands {
            cursor.step(cmd, Some((tolerance, &mut points)));
        }
        points
    }

    pub fn bbox(&self) -> Option<BBox> {
        let half_w = self.width / 2.0;
        BBox::from_points(&self.centerline(DEFAULT_TOLERANCE)).map(|bb| bb.expand(half_w))
    }

    pub fn translate(mut self, dx: f64, dy: f64) -> Self {
        self.start = self.start.translate(dx, dy);
        for cmd in &mut self.commands {
            if let PathCommand::Segment { to } = cmd {
                *to = to.translate(dx, dy);
            }
        }
        self
    }

    pub fn rotate(mut self, angle: f64, pivot: Point) -> Self {
        self.start = self.start.rotate_about(&pivot, angle);
        self.initial_heading += angle;
        for cmd in &mut self.commands {
            if let PathCommand::Segment { to } = cmd {
                *to = to.rotate_about(&pivot, angle);
            }
        }
        self
    }
}

/// Walks a path's instructions, tracking position and heading.
struct Cursor {
    pos: Point,
    heading: f64,
}

impl Cursor {
    fn new(pos: Point, heading: f64) -> Self {
        Self { pos, heading }
    }

    fn step(&mut self, cmd: &PathCommand, mut out: Option<(f64, &mut Vec<Point>)>) {
        match *cmd {
            PathCommand::Segment { to } => {
                let dx = to.x - self.pos.x;
                let dy = to.y - self.pos.y;
                if dx != 0.0 || dy != 0.0 {
                    self.heading = dy.atan2(dx);
                }
                self.pos = to;
                if let Some((_, points)) = out.as_mut() {
                    points.push(to);
                }
            }
            PathCommand::Arc { radius, sweep } => {
                let side = if sweep >= 0.0 { 1.0 } else { -1.0 };
                let center = Point::new(
                    self.pos.x - side * radius * self.heading.sin(),
                    self.pos.y + side * radius * self.heading.cos(),
                );
                if let Some((tolerance, points)) = out.as_mut() {
                    let steps = arc_steps(radius, sweep, *tolerance);
                    for k in 1..=steps {
                        let a = sweep * k as f64 / steps as f64;
                        points.push(self.pos.rotate_about(&center, a));
                    }
                }
                self.pos = self.pos.rotate_about(&center, sweep);
                self.heading += sweep;
            }
        }
    }
}

/// Upper bound on the chords one arc is split into. Tolerances at or below
/// zero (or too small to reach) end up here.
pub const MAX_ARC_STEPS: usize = 4096;

fn arc_steps(radius: f64, sweep: f64, tolerance: f64) -> usize {
    let radius = radius.abs();
    if radius <= 0.0 || sweep == 0.0 {
        return 1;
    }
    let max_step = if tolerance >= radius {
        std::f64::consts::FRAC_PI_2
    } else {
        2.0 * (1.0 - tolerance / radius).acos()
    };
    let steps = (sweep.abs() / max_step).ceil();
    if steps.is_finite() {
        (steps as usize).clamp(1, MAX_ARC_STEPS)
    } else {
        MAX_ARC_STEPS
    }
}

/// A geometric primitive in the layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GeomPrimitive {
    Rect(Rect),
    Polygon(Polygon),
    Path(Path),
}

impl GeomPrimitive {
    pub fn bbox(&self) -> Option<BBox> {
        match self {
            GeomPrimitive::Rect(r) => Some(r.bbox()),
            GeomPrimitive::Polygon(p) => p.bbox(),
            GeomPrimitive::Path(p) => p.bbox(),
        }
    }

    pub fn layer_id(&self) -> LayerId {
        match self {
            GeomPrimitive::Rect(r) => r.layer_id,
            GeomPrimitive::Polygon(p) => p.layer_id,
            GeomPrimitive::Path(p) => p.layer_id,
        }
    }

    /// Map this primitive through a placement transform. Rectangles stay
    /// rectangles only under pure translation.
    pub fn transformed(&self, t: &Transform) -> GeomPrimitive {
        if t.is_translation() {
            let (dx, dy) = (t.offset.x, t.offset.y);
            return match self {
                GeomPrimitive::Rect(r) => GeomPrimitive::Rect(Rect::new(
                    r.layer_id,
                    r.lower_left.x + dx,
                    r.lower_left.y + dy,
                    r.upper_right.x + dx,
                    r.upper_right.y + dy,
                )),
                GeomPrimitive::Polygon(p) => GeomPrimitive::Polygon(p.clone().translate(dx, dy)),
                GeomPrimitive::Path(p) => GeomPrimitive::Path(p.clone().translate(dx, dy)),
            };
        }

        match self {
            GeomPrimitive::Rect(r) => GeomPrimitive::Polygon(Polygon::new(
                r.layer_id,
                r.corners().iter().map(|p| t.apply(p)).collect(),
            )),
            GeomPrimitive::Polygon(p) => GeomPrimitive::Polygon(Polygon::new(
                p.layer_id,
                p.vertices.iter().map(|v| t.apply(v)).collect(),
            )),
            GeomPrimitive::Path(p) => {
                let flip = if t.mirror_x { -1.0 } else { 1.0 };
                let rotation = t.rotation.to_radians();
                GeomPrimitive::Path(Path {
                    layer_id: p.layer_id,
                    start: t.apply(&p.start),
                    initial_heading: flip * p.initial_heading + rotation,
                    width: p.width * t.scale,
                    commands: p
                        .commands
                        .iter()
                        .map(|cmd| match *cmd {
                            PathCommand::Segment { to } => PathCommand::Segment { to: t.apply(&to) },
                            PathCommand::Arc { radius, sweep } => PathCommand::Arc {
                                radius: radius * t.scale,
                                sweep: flip * sweep,
                            },
                        })
                        .collect(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn close(a: &Point, b: &Point) -> bool {
        a.distance_to(b) < 1e-9
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_rotate_about_keeps_pivot_fixed() {
        let pivot = Point::new(2.0, -0.5);
        for deg in [0.0_f64, 15.0, 45.0, 90.0, 180.0] {
            assert!(close(&pivot.rotate_about(&pivot, deg.to_radians()), &pivot));
        }
        let p = Point::new(3.0, -0.5).rotate_about(&pivot, FRAC_PI_2);
        assert!(close(&p, &Point::new(2.0, 0.5)));
    }

    #[test]
    fn test_rect_area() {
        let r = Rect::new(0, 0.0, 0.0, 10.0, 5.0);
        assert!((r.area() - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_rect_polygon_is_counter_clockwise() {
        let poly = Polygon::rectangle(0, Point::new(0.0, -0.5), Point::new(30.0, 0.5));
        assert_eq!(poly.vertices[0], Point::new(0.0, -0.5));
        assert_eq!(poly.vertices[2], Point::new(30.0, 0.5));
        assert!((poly.signed_area() - 30.0).abs() < 1e-10);
    }

    #[test]
    fn test_bbox_overlap() {
        let a = BBox::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        let b = BBox::new(Point::new(5.0, 5.0), Point::new(15.0, 15.0));
        let c = BBox::new(Point::new(20.0, 20.0), Point::new(30.0, 30.0));
        assert!(a.overlaps(&b, 1e-9));
        assert!(!a.overlaps(&c, 1e-9));
    }

    #[test]
    fn test_bbox_overlap_ignores_shared_corner() {
        let a = BBox::new(Point::new(0.0, 0.0), Point::new(5.0, 5.0));
        let b = BBox::new(Point::new(5.0, 5.0), Point::new(10.0, 10.0));
        let c = BBox::new(Point::new(5.0, 0.0), Point::new(10.0, 5.0));
        assert!(!a.overlaps(&b, 1e-9));
        assert!(!a.overlaps(&c, 1e-9));
    }

    #[test]
    fn test_arc_steps_are_bounded() {
        assert_eq!(arc_steps(5.0, FRAC_PI_2, 0.0), MAX_ARC_STEPS);
        assert_eq!(arc_steps(5.0, FRAC_PI_2, -1.0), MAX_ARC_STEPS);
        assert_eq!(arc_steps(5.0, FRAC_PI_2, f64::NAN), MAX_ARC_STEPS);
        assert_eq!(arc_steps(5.0, FRAC_PI_2, 1e-15), MAX_ARC_STEPS);
        assert_eq!(arc_steps(5.0, FRAC_PI_2, 10.0), 1);
        let normal = arc_steps(5.0, FRAC_PI_2, 1e-3);
        assert!(normal > 1 && normal < MAX_ARC_STEPS);
    }

    #[test]
    fn test_zero_tolerance_centerline_is_finite() {
        let path = Path::new(1, Point::origin(), 1.0).forward(10.0).arc(5.0, FRAC_PI_2);
        let line = path.centerline(0.0);
        assert_eq!(line.len(), 2 + MAX_ARC_STEPS);
        assert!(close(line.last().unwrap(), &Point::new(15.0, 5.0)));
    }

    #[test]
    fn test_path_rotate_about_pivot() {
        let pivot = Point::new(10.0, 0.0);
        let path = Path::new(1, Point::origin(), 1.0)
            .segment_to(Point::new(10.0, 0.0))
            .arc(5.0, FRAC_PI_2)
            .forward(5.0)
            .rotate(FRAC_PI_2, pivot);
        assert!(close(&path.start, &Point::new(10.0, -10.0)));
        let (end, heading) = path.end_state();
        // unrotated end (15, 10) turns a quarter about (10, 0)
        assert!(close(&end, &Point::new(0.0, 5.0)));
        assert!((heading - std::f64::consts::PI).abs() < 1e-12);
        let line = path.centerline(1e-3);
        assert!(close(&line[1], &pivot));
    }

    #[test]
    fn test_mirrored_rotated_path_transform() {
        let path = Path::new(1, Point::origin(), 1.0)
            .segment_to(Point::new(10.0, 0.0))
            .arc(5.0, FRAC_PI_2)
            .forward(5.0);
        let t = Transform {
            rotation: 90.0,
            mirror_x: true,
            scale: 2.0,
            offset: Point::new(1.0, 1.0),
        };
        let moved = match GeomPrimitive::Path(path.clone()).transformed(&t) {
            GeomPrimitive::Path(p) => p,
            other => panic!("expected path, got {:?}", other),
        };
        assert!((moved.width - 2.0).abs() < 1e-12);
        // the instruction list maps onto the transformed end point
        assert!(close(&moved.end_point(), &t.apply(&path.end_point())));
        // twice the tolerance at twice the radius gives the same chords
        let (mapped, original) = (moved.centerline(2e-3), path.centerline(1e-3));
        assert_eq!(mapped.len(), original.len());
        for (a, b) in mapped.iter().zip(&original) {
            assert!(a.distance_to(&t.apply(b)) < 1e-6);
        }
    }

    #[test]
    fn test_path_quarter_arc_left_turn() {
        let path = Path::new(1, Point::new(0.0, 0.0), 1.0)
            .segment_to(Point::new(10.0, 0.0))
            .arc(5.0, FRAC_PI_2)
            .forward(10.0);
        let (end, heading) = path.end_state();
        assert!(close(&end, &Point::new(15.0, 15.0)));
        assert!((heading - FRAC_PI_2).abs() < 1e-12);

        let line = path.centerline(1e-3);
        assert!(close(&line[1], &Point::new(10.0, 0.0)));
        assert!(line.len() > 4);
        // every arc point sits on the circle centred at (10, 5)
        let center = Point::new(10.0, 5.0);
        for p in &line[1..line.len() - 1] {
            assert!((p.distance_to(&center) - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_path_bbox_includes_half_width() {
        let path = Path::polyline(0, &[Point::new(0.0, 0.0), Point::new(10.0, 0.0)], 2.0);
        let bb = path.bbox().unwrap();
        assert!((bb.min.y + 1.0).abs() < 1e-12);
        assert!((bb.max.x - 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotated_transform_turns_rect_into_polygon() {
        let t = Transform {
            rotation: 90.0,
            ..Transform::translate(1.0, 0.0)
        };
        let moved = GeomPrimitive::Rect(Rect::new(0, 0.0, 0.0, 2.0, 1.0)).transformed(&t);
        match moved {
            GeomPrimitive::Polygon(p) => {
                assert!(close(&p.vertices[1], &Point::new(1.0, 2.0)));
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }
}
