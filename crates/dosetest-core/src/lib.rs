//! # Dose-Test Core
//!
//! Layout model shared by the dose-test tools: points and primitives with
//! pivot rotation, paths built from segment/arc instructions, cells with
//! placed references, and the ordered library written to GDS-II.

pub mod geometry;
pub mod cell;
pub mod library;
pub mod layer;
pub mod spatial;

pub use library::{Library, LibraryError};
pub use cell::{Cell, CellId, CellInstance, Transform};
pub use layer::{Layer, LayerColor, LayerId, LayerStack};
pub use geometry::{BBox, GeomPrimitive, Path, PathCommand, Point, Polygon, Rect, DEFAULT_TOLERANCE};
pub use spatial::SpatialIndex;
