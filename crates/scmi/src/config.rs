//! SCMI backend configuration.
//!
//! Loaded from a YAML file with two sections:
//! - `products`: rules matching products to AWIPS names
//! - `sectors`: static sector definitions used by lettered tiling
//!
//! Supports environment variable substitution using ${VAR} syntax.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use projection::Proj4Params;
use serde::{Deserialize, Serialize};
use tile_geometry::LetteredSector;
use tracing::debug;

use crate::error::{ScmiError, ScmiResult};
use crate::product::ProductMetadata;

/// Product fields a rule can match on.
pub const ID_FIELDS: [&str; 7] = [
    "product_name",
    "data_kind",
    "satellite",
    "instrument",
    "grid_name",
    "units",
    "reader",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScmiConfig {
    #[serde(default)]
    pub products: Vec<ProductRule>,
    #[serde(default)]
    pub sectors: BTreeMap<String, SectorConfig>,
}

/// One product-matching rule. Unset id fields match anything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductRule {
    pub product_name: Option<String>,
    pub data_kind: Option<String>,
    pub satellite: Option<String>,
    pub instrument: Option<String>,
    pub grid_name: Option<String>,
    pub units: Option<String>,
    pub reader: Option<String>,

    /// Name shown in the AWIPS product browser; may hold `{field}` placeholders
    pub physical_element: Option<String>,
    pub awips_id: Option<String>,
    pub creating_entity: Option<String>,
}

impl ProductRule {
    fn id_field(&self, name: &str) -> Option<&str> {
        match name {
            "product_name" => self.product_name.as_deref(),
            "data_kind" => self.data_kind.as_deref(),
            "satellite" => self.satellite.as_deref(),
            "instrument" => self.instrument.as_deref(),
            "grid_name" => self.grid_name.as_deref(),
            "units" => self.units.as_deref(),
            "reader" => self.reader.as_deref(),
            _ => None,
        }
    }

    /// Number of id fields this rule pins down.
    pub fn specificity(&self) -> usize {
        ID_FIELDS
            .iter()
            .filter(|f| self.id_field(f).is_some())
            .count()
    }

    pub fn matches(&self, product: &ProductMetadata) -> bool {
        ID_FIELDS.iter().all(|field| match self.id_field(field) {
            Some(wanted) => product.id_field(field) == Some(wanted),
            None => true,
        })
    }
}

/// Sector cell size: one value for square cells or `[row_height, col_width]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellSize {
    Uniform(f64),
    Pair([f64; 2]),
}

impl CellSize {
    /// (row height, column width)
    pub fn as_pair(&self) -> (f64, f64) {
        match *self {
            CellSize::Uniform(v) => (v, v),
            CellSize::Pair([h, w]) => (h, w),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorConfig {
    /// Lower-left corner as [lon, lat]
    pub ll_extent: [f64; 2],
    /// Upper-right corner as [lon, lat]
    pub ur_extent: [f64; 2],
    pub cell_size: CellSize,
    pub proj: String,
}

impl SectorConfig {
    pub fn to_lettered_sector(&self) -> LetteredSector {
        LetteredSector {
            lower_left: (self.ll_extent[0], self.ll_extent[1]),
            upper_right: (self.ur_extent[0], self.ur_extent[1]),
            cell_size: self.cell_size.as_pair(),
        }
    }
}

/// AWIPS naming resolved for one product.
#[derive(Debug, Clone, PartialEq)]
pub struct AwipsInfo {
    pub physical_element: String,
    pub awips_id: String,
    pub creating_entity: String,
}

impl ScmiConfig {
    /// Parse YAML content after environment expansion.
    pub fn from_yaml_str(content: &str) -> ScmiResult<Self> {
        let expanded = expand_env_vars(content)?;
        let config: ScmiConfig = serde_yaml::from_str(&expanded)
            .map_err(|e| ScmiError::config(format!("failed to parse SCMI config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn sector(&self, sector_id: &str) -> ScmiResult<&SectorConfig> {
        self.sectors
            .get(sector_id)
            .ok_or_else(|| ScmiError::config(format!("Unknown sector '{}'", sector_id)))
    }

    /// Most specific rule matching the product; file order breaks ties.
    pub fn match_product(&self, product: &ProductMetadata) -> Option<&ProductRule> {
        let mut best: Option<&ProductRule> = None;
        for rule in self.products.iter().filter(|r| r.matches(product)) {
            if best.map_or(true, |b| rule.specificity() > b.specificity()) {
                best = Some(rule);
            }
        }
        best
    }

    /// Resolve the AWIPS names for a product.
    pub fn awips_info(&self, product: &ProductMetadata) -> ScmiResult<AwipsInfo> {
        let rule = self.match_product(product).ok_or_else(|| {
            ScmiError::config(format!(
                "no product configuration matches '{}' ({} {} on grid '{}')",
                product.product_name,
                product.satellite,
                product.instrument,
                product.grid_name()
            ))
        })?;

        let mut physical_element = rule
            .physical_element
            .clone()
            .unwrap_or_else(|| product.product_name.clone());
        if physical_element.contains('{') {
            physical_element = product.template_fields().render(&physical_element)?;
        }

        let awips_id = rule
            .awips_id
            .clone()
            .unwrap_or_else(|| format!("AWIPS_{}", product.product_name));
        let creating_entity = rule.creating_entity.clone().unwrap_or_else(|| {
            format!(
                "{}-{}",
                product.satellite.to_uppercase(),
                product.instrument.to_uppercase()
            )
        });

        debug!(
            product = %product.product_name,
            physical_element = %physical_element,
            awips_id = %awips_id,
            "Resolved AWIPS product information"
        );

        Ok(AwipsInfo {
            physical_element,
            awips_id,
            creating_entity,
        })
    }

    fn validate(&self) -> ScmiResult<()> {
        for (id, sector) in &self.sectors {
            let (h, w) = sector.cell_size.as_pair();
            if !(h > 0.0 && w > 0.0) {
                return Err(ScmiError::config(format!(
                    "sector '{}' cell size must be positive, got {}x{}",
                    id, h, w
                )));
            }
            Proj4Params::parse(&sector.proj).map_err(|e| {
                ScmiError::config(format!("sector '{}' has invalid proj: {}", id, e))
            })?;
        }
        for (i, rule) in self.products.iter().enumerate() {
            if rule.specificity() == 0 {
                debug!(rule = i, "Product rule matches every product");
            }
        }
        Ok(())
    }
}

/// Load and parse a configuration file with environment variable substitution.
pub fn load_config<P: AsRef<Path>>(path: P) -> ScmiResult<ScmiConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        ScmiError::config(format!("failed to read SCMI config from {:?}: {}", path, e))
    })?;
    ScmiConfig::from_yaml_str(&content)
}

/// Replace `${VAR}` and `${VAR:-default}` references in raw config text.
fn expand_env_vars(content: &str) -> ScmiResult<String> {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let body = &rest[start + 2..];
        let end = body.find('}').ok_or_else(|| {
            ScmiError::config(format!(
                "unterminated variable reference '${{{}'",
                body.lines().next().unwrap_or_default()
            ))
        })?;
        out.push_str(&env_value(&body[..end])?);
        rest = &body[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// A set, non-empty variable wins over the default; without a default the
/// variable must exist.
fn env_value(expr: &str) -> ScmiResult<String> {
    let (name, default) = match expr.split_once(":-") {
        Some((name, default)) => (name.trim(), Some(default)),
        None => (expr.trim(), None),
    };
    match (std::env::var(name), default) {
        (Ok(value), Some(_)) if !value.is_empty() => Ok(value),
        (_, Some(default)) => Ok(default.to_string()),
        (Ok(value), None) => Ok(value),
        (Err(_), None) => Err(ScmiError::config(format!(
            "environment variable {} is not set",
            name
        ))),
    }
}
