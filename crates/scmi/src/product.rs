//! Gridded products and scenes handed to the backend.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tile_geometry::{GridDefinition, MaskedGrid};
use tracing::debug;

use crate::error::{ScmiError, ScmiResult};
use crate::naming::TemplateFields;

/// Metadata of one remapped product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub product_name: String,
    /// e.g. `brightness_temperature`, `reflectance`
    pub data_kind: String,
    pub satellite: String,
    pub instrument: String,
    pub begin_time: DateTime<Utc>,
    /// Defaults to `begin_time`
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub units: Option<String>,
    #[serde(default)]
    pub reader: Option<String>,
    #[serde(default)]
    pub standard_name: Option<String>,
    #[serde(default)]
    pub valid_min: Option<f64>,
    #[serde(default)]
    pub valid_max: Option<f64>,
    /// Significant bits of the data, 16 when unset
    #[serde(default)]
    pub bit_depth: Option<u32>,
    /// Present for category products
    #[serde(default)]
    pub flag_meanings: Option<String>,
    pub grid_definition: GridDefinition,
}

impl ProductMetadata {
    pub fn grid_name(&self) -> &str {
        &self.grid_definition.grid_name
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time.unwrap_or(self.begin_time)
    }

    /// Look up one of the product-matching id fields.
    pub fn id_field(&self, name: &str) -> Option<&str> {
        match name {
            "product_name" => Some(&self.product_name),
            "data_kind" => Some(&self.data_kind),
            "satellite" => Some(&self.satellite),
            "instrument" => Some(&self.instrument),
            "grid_name" => Some(self.grid_name()),
            "units" => self.units.as_deref(),
            "reader" => self.reader.as_deref(),
            _ => None,
        }
    }

    /// Template fields describing this product.
    pub fn template_fields(&self) -> TemplateFields {
        let mut fields = TemplateFields::new();
        fields.insert("product_name", self.product_name.as_str());
        fields.insert("data_kind", self.data_kind.as_str());
        fields.insert("satellite", self.satellite.as_str());
        fields.insert("instrument", self.instrument.as_str());
        fields.insert("grid_name", self.grid_name());
        fields.insert("rows", self.grid_definition.height);
        fields.insert("columns", self.grid_definition.width);
        fields.insert("begin_time", self.begin_time);
        fields.insert("end_time", self.end_time());
        if let Some(units) = &self.units {
            fields.insert("units", units.as_str());
        }
        if let Some(reader) = &self.reader {
            fields.insert("reader", reader.as_str());
        }
        fields
    }
}

/// A product's metadata plus its gridded data.
#[derive(Debug, Clone)]
pub struct GriddedProduct {
    pub metadata: ProductMetadata,
    pub data: MaskedGrid,
}

impl GriddedProduct {
    /// Pair metadata with data, checking the data matches the grid.
    pub fn new(metadata: ProductMetadata, data: MaskedGrid) -> ScmiResult<Self> {
        let expected = metadata.grid_definition.shape();
        if data.shape() != expected {
            return Err(ScmiError::scene(format!(
                "product '{}' has data shape {:?} but grid '{}' is {:?}",
                metadata.product_name,
                data.shape(),
                metadata.grid_name(),
                expected
            )));
        }
        Ok(Self { metadata, data })
    }

    pub fn name(&self) -> &str {
        &self.metadata.product_name
    }
}

/// Ordered collection of gridded products.
#[derive(Debug, Clone, Default)]
pub struct GriddedScene {
    products: Vec<GriddedProduct>,
}

impl GriddedScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, product: GriddedProduct) {
        self.products.push(product);
    }

    pub fn products(&self) -> &[GriddedProduct] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Keep only the named products.
    pub fn retain_products(&mut self, names: &[String]) {
        self.products
            .retain(|p| names.iter().any(|n| n == p.name()));
    }

    /// Load a scene described by a JSON manifest.
    ///
    /// Data files hold row-major little-endian `f32` values, NaN marking
    /// invalid pixels. Optional mask files hold one byte per pixel, non-zero
    /// marking invalid pixels. Relative paths resolve against the manifest's
    /// directory.
    pub fn load_json(path: &Path) -> ScmiResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ScmiError::scene(format!("failed to read {}: {}", path.display(), e)))?;
        let manifest: SceneManifest = serde_json::from_str(&content)
            .map_err(|e| ScmiError::scene(format!("failed to parse {}: {}", path.display(), e)))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let mut scene = GriddedScene::new();
        for entry in manifest.products {
            let (rows, cols) = entry.metadata.grid_definition.shape();
            let data_path = base.join(&entry.data_file);
            let data = read_f32_le(&data_path, rows * cols)?;
            let mask = match &entry.mask_file {
                Some(mask_file) => Some(read_mask(&base.join(mask_file), rows * cols)?),
                None => None,
            };
            debug!(
                product = %entry.metadata.product_name,
                path = %data_path.display(),
                "Loaded product data"
            );
            let grid = MaskedGrid::new(rows, cols, data, mask)?;
            scene.push(GriddedProduct::new(entry.metadata, grid)?);
        }
        Ok(scene)
    }
}

#[derive(Debug, Deserialize)]
struct SceneManifest {
    products: Vec<ProductEntry>,
}

#[derive(Debug, Deserialize)]
struct ProductEntry {
    #[serde(flatten)]
    metadata: ProductMetadata,
    data_file: PathBuf,
    #[serde(default)]
    mask_file: Option<PathBuf>,
}

fn read_f32_le(path: &Path, expected: usize) -> ScmiResult<Vec<f32>> {
    let bytes = fs::read(path)
        .map_err(|e| ScmiError::scene(format!("failed to read {}: {}", path.display(), e)))?;
    if bytes.len() != expected * 4 {
        return Err(ScmiError::scene(format!(
            "{} holds {} bytes, expected {} f32 values",
            path.display(),
            bytes.len(),
            expected
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn read_mask(path: &Path, expected: usize) -> ScmiResult<Vec<bool>> {
    let bytes = fs::read(path)
        .map_err(|e| ScmiError::scene(format!("failed to read {}: {}", path.display(), e)))?;
    if bytes.len() != expected {
        return Err(ScmiError::scene(format!(
            "{} holds {} mask bytes, expected {}",
            path.display(),
            bytes.len(),
            expected
        )));
    }
    Ok(bytes.into_iter().map(|b| b != 0).collect())
}
