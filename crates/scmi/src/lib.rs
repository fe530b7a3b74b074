//! AWIPS SCMI tiled output.
//!
//! [`Backend`] takes a [`GriddedScene`], builds one tile scheme per grid and
//! writes one NetCDF4 file per tile holding valid data. Product naming comes
//! from [`ScmiConfig`]; output behavior from [`OutputOptions`].

pub mod attributes;
pub mod backend;
pub mod config;
pub mod error;
pub mod grid_mapping;
pub mod naming;
pub mod options;
pub mod product;
pub mod quantize;

pub use attributes::{
    apply_derived, awips_units, global_attributes, image_standard_name, AttributeContext,
    Derivation, ATTR_TIME_FORMAT, DERIVED_GLOBAL_ATTRIBUTES,
};
pub use backend::{Backend, RunSummary};
pub use config::{
    load_config, AwipsInfo, CellSize, ProductRule, ScmiConfig, SectorConfig, ID_FIELDS,
};
pub use error::{ScmiError, ScmiResult};
pub use grid_mapping::grid_mapping;
pub use naming::{FieldValue, TemplateFields, DEFAULT_OUTPUT_PATTERN};
pub use options::{
    OutputOptions, TilingMode, TilingOptions, DEFAULT_CREATOR, DEFAULT_SOURCE_NAME,
};
pub use product::{GriddedProduct, GriddedScene, ProductMetadata};
pub use quantize::{Quantization, FILE_BIT_DEPTH, FILL_CODE};
