use rstar::{RTree, RTreeObject, AABB};

use crate::geometry::{BBox, GeomPrimitive};

/// An entry in the R-tree spatial index, referencing a geometry by its index.
#[derive(Debug, Clone)]
pub struct SpatialEntry {
    /// Index into the cell's geometry vector.
    pub geometry_index: usize,
    /// Bounding box of the geometry.
    pub bbox: BBox,
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bbox.min.x, self.bbox.min.y],
            [self.bbox.max.x, self.bbox.max.y],
        )
    }
}

/// Spatial index over primitive bounding boxes.
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
}

impl SpatialIndex {
    /// Build the index from a list of geometry bounding boxes.
    pub fn build(entries: Vec<SpatialEntry>) -> Self {
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Index every primitive that has a bounding box.
    pub fn from_geometries(geometries: &[GeomPrimitive]) -> Self {
        let entries = geometries
            .iter()
            .enumerate()
            .filter_map(|(geometry_index, g)| {
                g.bbox().map(|bbox| SpatialEntry {
                    geometry_index,
                    bbox,
                })
            })
            .collect();
        Self::build(entries)
    }

    /// Find all entries that touch or intersect the given box.
    pub fn query_region(&self, region: &BBox) -> Vec<&SpatialEntry> {
        let envelope = AABB::from_corners(
            [region.min.x, region.min.y],
            [region.max.x, region.max.y],
        );
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .collect()
    }

    /// Index pairs `(a, b)`, `a < b`, whose boxes overlap by more than `eps`.
    /// Shared edges and corners are not reported.
    pub fn overlapping_pairs(&self, eps: f64) -> Vec<(usize, usize)> {
        let mut pairs: Vec<(usize, usize)> = self
            .tree
            .iter()
            .flat_map(|entry| {
                self.query_region(&entry.bbox)
                    .into_iter()
                    .filter(move |other| {
                        entry.geometry_index < other.geometry_index
                            && entry.bbox.overlaps(&other.bbox, eps)
                    })
                    .map(move |other| (entry.geometry_index, other.geometry_index))
            })
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Number of entries in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
