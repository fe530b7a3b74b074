//! In-memory description of one SCMI tile file.
//!
//! The orchestrator fills a [`TileFile`] with already quantized values; the
//! writer only has to lay it out on disk.

use std::fmt;

/// Name of the row dimension and Y coordinate variable.
pub const ROW_DIM: &str = "y";
/// Name of the column dimension and X coordinate variable.
pub const COL_DIM: &str = "x";
/// Name of the image variable.
pub const IMAGE_VAR: &str = "data";

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    F32(f32),
    F64(f64),
    I32(i32),
    I16(i16),
    U16(u16),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Str(v) => write!(f, "{}", v),
            AttrValue::F32(v) => write!(f, "{}", v),
            AttrValue::F64(v) => write!(f, "{}", v),
            AttrValue::I32(v) => write!(f, "{}", v),
            AttrValue::I16(v) => write!(f, "{}", v),
            AttrValue::U16(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}

impl From<f32> for AttrValue {
    fn from(v: f32) -> Self {
        AttrValue::F32(v)
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::F64(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::I32(v)
    }
}

impl From<u16> for AttrValue {
    fn from(v: u16) -> Self {
        AttrValue::U16(v)
    }
}

/// Ordered attribute list with unique names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    entries: Vec<(String, AttrValue)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing an existing value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Set an attribute only if it is not present yet.
    ///
    /// Returns `true` if the value was stored.
    pub fn set_if_absent(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.entries.push((name, value.into()));
        true
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Quantized image variable.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageVariable {
    /// Row-major codes, `rows * cols` long
    pub values: Vec<u16>,
    pub fill_value: u16,
    pub scale_factor: f32,
    pub add_offset: f32,
    pub valid_min: u16,
    pub valid_max: u16,
    pub units: String,
    pub standard_name: String,
}

/// Quantized 1-D coordinate variable.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateVariable {
    /// Global coordinate indices of the tile's pixels
    pub values: Vec<i16>,
    pub scale_factor: f64,
    pub add_offset: f64,
    pub units: String,
    pub standard_name: String,
}

/// Dimensionless variable describing the projection.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMappingVariable {
    pub name: String,
    pub attributes: Attributes,
}

/// Everything written to one tile file.
#[derive(Debug, Clone, PartialEq)]
pub struct TileFile {
    pub rows: usize,
    pub cols: usize,
    pub image: ImageVariable,
    pub x: CoordinateVariable,
    pub y: CoordinateVariable,
    pub grid_mapping: GridMappingVariable,
    pub global_attributes: Attributes,
}

impl TileFile {
    /// Check that array lengths match the tile dimensions.
    pub fn validate(&self) -> Result<(), String> {
        if self.image.values.len() != self.rows * self.cols {
            return Err(format!(
                "image has {} values, expected {}x{}",
                self.image.values.len(),
                self.rows,
                self.cols
            ));
        }
        if self.x.values.len() != self.cols {
            return Err(format!(
                "x has {} values, expected {}",
                self.x.values.len(),
                self.cols
            ));
        }
        if self.y.values.len() != self.rows {
            return Err(format!(
                "y has {} values, expected {}",
                self.y.values.len(),
                self.rows
            ));
        }
        if self.grid_mapping.name.is_empty() {
            return Err("grid mapping variable has no name".to_string());
        }
        Ok(())
    }
}
