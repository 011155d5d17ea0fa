use serde::{Deserialize, Serialize};

/// A unique layer identifier (the GDS layer number).
pub type LayerId = u32;

/// A mask layer and how it is written and previewed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub gds_datatype: u16,
    pub color: LayerColor,
    pub opacity: f32,
}

impl Layer {
    pub fn new(id: LayerId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            gds_datatype: 0,
            color: LayerColor::default(),
            opacity: 1.0,
        }
    }

    pub fn with_color(mut self, r: u8, g: u8, b: u8) -> Self {
        self.color = LayerColor { r, g, b };
        self
    }

    pub fn with_datatype(mut self, datatype: u16) -> Self {
        self.gds_datatype = datatype;
        self
    }
}

/// RGB color for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for LayerColor {
    fn default() -> Self {
        Self { r: 0, g: 0, b: 0 }
    }
}

impl LayerColor {
    /// `#rrggbb` form, as used by SVG fill/stroke attributes.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The layers known to a library. Unknown layers fall back to datatype 0
/// and the default color.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerStack {
    layers: Vec<Layer>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self { layers: Vec::new() }
    }

    pub fn add_layer(&mut self, layer: Layer) {
        match self.get_layer_mut(layer.id) {
            Some(existing) => *existing = layer,
            None => self.layers.push(layer),
        }
    }

    pub fn get_layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn get_layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn datatype_for(&self, id: LayerId) -> u16 {
        self.get_layer(id).map(|l| l.gds_datatype).unwrap_or(0)
    }

    pub fn color_for(&self, id: LayerId) -> LayerColor {
        self.get_layer(id).map(|l| l.color).unwrap_or_default()
    }

    pub fn all_layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new()
    }
}
