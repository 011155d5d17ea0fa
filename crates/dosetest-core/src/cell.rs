use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{union_all, BBox, GeomPrimitive, Point};
use crate::LayerId;

/// Unique cell identifier.
pub type CellId = Uuid;

/// A transformation for placing cell references.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Translation offset.
    pub offset: Point,
    /// Counter-clockwise rotation in degrees.
    pub rotation: f64,
    /// Mirror about X axis, applied before rotation.
    pub mirror_x: bool,
    /// Uniform magnification (typically 1.0).
    pub scale: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            offset: Point::new(0.0, 0.0),
            rotation: 0.0,
            mirror_x: false,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            offset: Point::new(x, y),
            ..Default::default()
        }
    }

    pub fn is_translation(&self) -> bool {
        self.rotation == 0.0 && !self.mirror_x && self.scale == 1.0
    }

    pub fn apply(&self, point: &Point) -> Point {
        let mut p = *point;

        p.x *= self.scale;
        p.y *= self.scale;

        if self.mirror_x {
            p.y = -p.y;
        }

        let p = p.rotate_about(&Point::origin(), self.rotation.to_radians());
        p.translate(self.offset.x, self.offset.y)
    }

    /// The transform equivalent to applying `inner` first, then `self`.
    pub fn compose(&self, inner: &Transform) -> Transform {
        let flip = if self.mirror_x { -1.0 } else { 1.0 };
        Transform {
            offset: self.apply(&inner.offset),
            rotation: self.rotation + flip * inner.rotation,
            mirror_x: self.mirror_x != inner.mirror_x,
            scale: self.scale * inner.scale,
        }
    }
}

/// A reference to another cell placed within a parent cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellInstance {
    pub id: Uuid,
    pub cell_id: CellId,
    /// Name of the referenced cell; this is what GDS-II stores.
    pub cell_name: String,
    pub transform: Transform,
}

impl CellInstance {
    pub fn new(cell_id: CellId, cell_name: &str, transform: Transform) -> Self {
        Self {
            id: Uuid::new_v4(),
            cell_id,
            cell_name: cell_name.to_string(),
            transform,
        }
    }
}

/// A layout cell: one pattern group and any references to other cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub id: CellId,
    pub name: String,
    pub geometries: Vec<GeomPrimitive>,
    pub instances: Vec<CellInstance>,
}

impl Cell {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            geometries: Vec::new(),
            instances: Vec::new(),
        }
    }

    /// Build a cell holding the given primitives, in order.
    pub fn with_geometries(name: &str, geometries: Vec<GeomPrimitive>) -> Self {
        let mut cell = Self::new(name);
        cell.geometries = geometries;
        cell
    }

    pub fn add_geometry(&mut self, geom: GeomPrimitive) {
        self.geometries.push(geom);
    }

    pub fn add_instance(&mut self, instance: CellInstance) {
        self.instances.push(instance);
    }

    /// Compute the bounding box of all geometry in this cell (not including subcells).
    pub fn local_bbox(&self) -> Option<BBox> {
        union_all(self.geometries.iter().filter_map(|g| g.bbox()))
    }

    /// Get all geometries on a specific layer.
    pub fn geometries_on_layer(&self, layer_id: LayerId) -> Vec<&GeomPrimitive> {
        self.geometries
            .iter()
            .filter(|g| g.layer_id() == layer_id)
            .collect()
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    #[test]
    fn test_cell_add_geometry() {
        let mut cell = Cell::new("test_cell");
        let rect = GeomPrimitive::Rect(Rect::new(0, 0.0, 0.0, 100.0, 50.0));
        cell.add_geometry(rect);
        assert_eq!(cell.geometry_count(), 1);
        assert_eq!(cell.geometries_on_layer(0).len(), 1);
        assert!(cell.geometries_on_layer(1).is_empty());
    }

    #[test]
    fn test_cell_bbox() {
        let mut cell = Cell::new("test_cell");
        cell.add_geometry(GeomPrimitive::Rect(Rect::new(0, 0.0, 0.0, 100.0, 50.0)));
        cell.add_geometry(GeomPrimitive::Rect(Rect::new(1, 50.0, 25.0, 200.0, 75.0)));
        let bb = cell.local_bbox().unwrap();
        assert!((bb.min.x - 0.0).abs() < 1e-10);
        assert!((bb.min.y - 0.0).abs() < 1e-10);
        assert!((bb.max.x - 200.0).abs() < 1e-10);
        assert!((bb.max.y - 75.0).abs() < 1e-10);
    }

    #[test]
    fn test_transform_translate() {
        let t = Transform::translate(10.0, 20.0);
        let p = Point::new(5.0, 5.0);
        let result = t.apply(&p);
        assert!((result.x - 15.0).abs() < 1e-10);
        assert!((result.y - 25.0).abs() < 1e-10);
    }

    #[test]
    fn test_transform_compose_matches_sequential_apply() {
        let outer = Transform {
            rotation: 90.0,
            ..Transform::translate(0.0, 160.0)
        };
        let inner = Transform {
            mirror_x: true,
            ..Transform::translate(3.0, 1.0)
        };
        let p = Point::new(2.0, 5.0);
        let expected = outer.apply(&inner.apply(&p));
        let got = outer.compose(&inner).apply(&p);
        assert!(expected.distance_to(&got) < 1e-9);
    }
}
