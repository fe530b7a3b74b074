//! Image variable and global attribute derivation.

use chrono::{DateTime, Utc};
use scmi_netcdf::{AttrValue, Attributes};
use tile_geometry::{TileDescriptor, TileScheme};
use tracing::debug;

use crate::config::AwipsInfo;
use crate::options::OutputOptions;
use crate::product::ProductMetadata;

/// Timestamp format of `creation_time` and `start_date_time`.
pub const ATTR_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Unit spellings AWIPS understands.
const UNIT_CONV: [(&str, &str); 7] = [
    ("micron", "microm"),
    ("mm h-1", "mm/h"),
    ("1", "*1"),
    ("none", "*1"),
    ("percent", "%"),
    ("Kelvin", "kelvin"),
    ("K", "kelvin"),
];

/// Translate product units to AWIPS units; unitless when unset.
pub fn awips_units(units: Option<&str>) -> String {
    let units = units.unwrap_or("1");
    UNIT_CONV
        .iter()
        .find(|(from, _)| *from == units)
        .map(|(_, to)| to.to_string())
        .unwrap_or_else(|| units.to_string())
}

/// CF standard name of the image variable.
pub fn image_standard_name(product: &ProductMetadata) -> String {
    if let Some(name) = &product.standard_name {
        return name.clone();
    }
    match product.data_kind.as_str() {
        "reflectance" | "albedo" => "toa_bidirectional_reflectance".to_string(),
        kind => kind.to_string(),
    }
}

/// Inputs available to derived attributes.
#[derive(Debug, Clone, Copy)]
pub struct AttributeContext<'a> {
    pub product: &'a ProductMetadata,
    pub options: &'a OutputOptions,
}

/// Derives one attribute value; `None` leaves the attribute unset.
pub type Derivation = fn(&AttributeContext<'_>) -> Option<AttrValue>;

/// Global attributes computed from the product and run options.
pub const DERIVED_GLOBAL_ATTRIBUTES: [(&str, Derivation); 5] = [
    ("pixel_x_size", pixel_x_size),
    ("pixel_y_size", pixel_y_size),
    ("product_name", product_name),
    ("production_location", production_location),
    ("start_date_time", start_date_time),
];

fn pixel_x_size(ctx: &AttributeContext<'_>) -> Option<AttrValue> {
    Some(AttrValue::F64(
        ctx.product.grid_definition.cell_width.abs() / 1000.0,
    ))
}

fn pixel_y_size(ctx: &AttributeContext<'_>) -> Option<AttrValue> {
    Some(AttrValue::F64(
        ctx.product.grid_definition.cell_height.abs() / 1000.0,
    ))
}

fn product_name(ctx: &AttributeContext<'_>) -> Option<AttrValue> {
    Some(ctx.product.product_name.as_str().into())
}

fn production_location(ctx: &AttributeContext<'_>) -> Option<AttrValue> {
    ctx.options
        .production_location
        .as_deref()
        .map(AttrValue::from)
}

fn start_date_time(ctx: &AttributeContext<'_>) -> Option<AttrValue> {
    let when = ctx.product.begin_time + ctx.options.time_shift();
    Some(when.format(ATTR_TIME_FORMAT).to_string().into())
}

/// Apply the derivation table without overwriting existing attributes.
pub fn apply_derived(attrs: &mut Attributes, ctx: &AttributeContext<'_>) {
    for (name, derive) in DERIVED_GLOBAL_ATTRIBUTES.iter() {
        if attrs.contains(name) {
            debug!("already have a value for {}", name);
            continue;
        }
        if let Some(value) = derive(ctx) {
            attrs.set(*name, value);
        }
    }
}

/// Global attributes of one tile file.
pub fn global_attributes(
    info: &AwipsInfo,
    sector_id: &str,
    scheme: &TileScheme,
    descriptor: &TileDescriptor,
    ctx: &AttributeContext<'_>,
    creation_time: DateTime<Utc>,
) -> Attributes {
    let (tile_height, tile_width) = descriptor.shape;
    let (rows, cols) = scheme.image_shape();

    let mut attrs = Attributes::new();
    attrs.set("Conventions", "CF-1.7");
    attrs.set("creator", ctx.options.creator.as_str());
    attrs.set(
        "creation_time",
        creation_time.format(ATTR_TIME_FORMAT).to_string(),
    );
    // name shown in the AWIPS product browser
    attrs.set("physical_element", info.physical_element.as_str());
    attrs.set("satellite_id", info.creating_entity.as_str());
    attrs.set("awips_id", info.awips_id.as_str());
    attrs.set("sector_id", sector_id);
    attrs.set("tile_row_offset", descriptor.row_offset as i32);
    attrs.set("tile_column_offset", descriptor.col_offset as i32);
    attrs.set("product_tile_height", tile_height as i32);
    attrs.set("product_tile_width", tile_width as i32);
    attrs.set("number_product_tiles", scheme.total_tiles() as i32);
    attrs.set("product_rows", rows as i32);
    attrs.set("product_columns", cols as i32);

    apply_derived(&mut attrs, ctx);
    attrs
}
