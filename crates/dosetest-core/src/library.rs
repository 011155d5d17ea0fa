use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::cell::{Cell, CellId, CellInstance, Transform};
use crate::geometry::{union_all, BBox, GeomPrimitive, Point};
use crate::layer::LayerStack;

#[derive(Error, Debug, PartialEq)]
pub enum LibraryError {
    #[error("Cell '{0}' not found in library")]
    CellNotFound(String),

    #[error("Cell '{0}' references itself through its instances")]
    RecursiveReference(String),
}

/// A layout library: the ordered set of cells written to one GDS-II file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    /// Library identifier.
    pub id: Uuid,
    /// Library name (GDS-II LIBNAME).
    pub name: String,
    /// Mask layers used by the cells.
    pub layer_stack: LayerStack,
    /// Cells in insertion order.
    cells: Vec<Cell>,
    /// Top-level cell (entry point for hierarchy).
    pub top_cell: Option<CellId>,
}

impl Library {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            layer_stack: LayerStack::new(),
            cells: Vec::new(),
            top_cell: None,
        }
    }

    // ── Cell management ──────────────────────────────────────────────

    pub fn add_cell(&mut self, cell: Cell) -> CellId {
        let id = cell.id;
        log::debug!(
            "Adding cell '{}' ({} elements, {} references)",
            cell.name,
            cell.geometry_count(),
            cell.instance_count()
        );
        self.cells.push(cell);
        if self.top_cell.is_none() {
            self.top_cell = Some(id);
        }
        id
    }

    pub fn set_top_cell(&mut self, id: CellId) -> Result<(), LibraryError> {
        if self.get_cell(&id).is_none() {
            return Err(LibraryError::CellNotFound(id.to_string()));
        }
        self.top_cell = Some(id);
        Ok(())
    }

    pub fn top(&self) -> Option<&Cell> {
        self.top_cell.and_then(|id| self.get_cell(&id))
    }

    pub fn get_cell(&self, id: &CellId) -> Option<&Cell> {
        self.cells.iter().find(|c| c.id == *id)
    }

    pub fn get_cell_mut(&mut self, id: &CellId) -> Option<&mut Cell> {
        self.cells.iter_mut().find(|c| c.id == *id)
    }

    pub fn find_cell_by_name(&self, name: &str) -> Option<&Cell> {
        self.cells.iter().find(|c| c.name == name)
    }

    pub fn cell_names(&self) -> Vec<&str> {
        self.cells.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn all_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Place `child` inside `parent` with its origin at `offset`.
    pub fn place(
        &mut self,
        parent: CellId,
        child: CellId,
        offset: Point,
    ) -> Result<(), LibraryError> {
        let child_name = self
            .get_cell(&child)
            .map(|c| c.name.clone())
            .ok_or_else(|| LibraryError::CellNotFound(child.to_string()))?;
        let parent_cell = self
            .get_cell_mut(&parent)
            .ok_or_else(|| LibraryError::CellNotFound(parent.to_string()))?;
        parent_cell.add_instance(CellInstance::new(
            child,
            &child_name,
            Transform::translate(offset.x, offset.y),
        ));
        Ok(())
    }

    // ── Hierarchy ────────────────────────────────────────────────────

    /// All primitives of `id` and its referenced cells, in the frame of `id`.
    /// Own geometry comes first, then each instance in order.
    pub fn flatten(&self, id: &CellId) -> Result<Vec<GeomPrimitive>, LibraryError> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        self.flatten_into(id, &Transform::default(), &mut stack, &mut out)?;
        Ok(out)
    }

    fn flatten_into(
        &self,
        id: &CellId,
        transform: &Transform,
        stack: &mut Vec<CellId>,
        out: &mut Vec<GeomPrimitive>,
    ) -> Result<(), LibraryError> {
        let cell = self
            .get_cell(id)
            .ok_or_else(|| LibraryError::CellNotFound(id.to_string()))?;
        if stack.contains(id) {
            return Err(LibraryError::RecursiveReference(cell.name.clone()));
        }
        stack.push(*id);

        out.extend(cell.geometries.iter().map(|g| g.transformed(transform)));
        for inst in &cell.instances {
            let target = self
                .get_cell(&inst.cell_id)
                .or_else(|| self.find_cell_by_name(&inst.cell_name))
                .ok_or_else(|| LibraryError::CellNotFound(inst.cell_name.clone()))?;
            let child_transform = transform.compose(&inst.transform);
            self.flatten_into(&target.id, &child_transform, stack, out)?;
        }

        stack.pop();
        Ok(())
    }

    /// Bounding box of a cell including its references.
    pub fn bbox(&self, id: &CellId) -> Result<Option<BBox>, LibraryError> {
        let flat = self.flatten(id)?;
        Ok(union_all(flat.iter().filter_map(|g| g.bbox())))
    }

    // ── Serialization ────────────────────────────────────────────────

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
