//! NetCDF4 tile file writer.

use std::path::Path;

use tracing::debug;

use crate::content::{AttrValue, Attributes, TileFile, COL_DIM, IMAGE_VAR, ROW_DIM};
use crate::error::{WriteError, WriteResult};
use crate::hdf5::{silence_hdf5_errors, strip_nc_properties};

/// Deflate level used when compression is enabled.
const DEFLATE_LEVEL: i32 = 4;

/// Writes one tile to one file.
///
/// Implementations create `path` (truncating anything there) and leave it
/// complete on success. On failure the file may be partially written; the
/// caller owns cleanup.
pub trait TileWriter {
    fn write_tile(&self, path: &Path, tile: &TileFile) -> WriteResult<()>;
}

/// Writes SCMI tiles with the `netcdf` library.
#[derive(Debug, Clone, Default)]
pub struct NetCdfTileWriter {
    /// zlib-compress the image and coordinate variables
    pub compress: bool,
    /// Strip `_NCProperties` after closing so AWIPS can read the file
    pub fix_awips: bool,
}

impl NetCdfTileWriter {
    pub fn new(compress: bool, fix_awips: bool) -> Self {
        Self {
            compress,
            fix_awips,
        }
    }

    fn write_contents(&self, path: &Path, tile: &TileFile) -> WriteResult<()> {
        let mut file = netcdf::create(path)?;

        debug!("Creating dimensions...");
        file.add_dimension(ROW_DIM, tile.rows)?;
        file.add_dimension(COL_DIM, tile.cols)?;

        debug!("Creating image variable...");
        {
            let image = &tile.image;
            let mut var = file.add_variable::<u16>(IMAGE_VAR, &[ROW_DIM, COL_DIM])?;
            if self.compress {
                var.set_compression(DEFLATE_LEVEL, true)?;
            }
            var.set_fill_value(image.fill_value)?;
            var.put_attribute("coordinates", format!("{} {}", ROW_DIM, COL_DIM).as_str())?;
            var.put_attribute("grid_mapping", tile.grid_mapping.name.as_str())?;
            var.put_attribute("scale_factor", image.scale_factor)?;
            var.put_attribute("add_offset", image.add_offset)?;
            var.put_attribute("units", image.units.as_str())?;
            var.put_attribute("valid_min", image.valid_min)?;
            var.put_attribute("valid_max", image.valid_max)?;
            var.put_attribute("standard_name", image.standard_name.as_str())?;
            var.put_values(&image.values, ..)?;
        }

        debug!("Writing X/Y navigation data...");
        for (name, coord) in [(ROW_DIM, &tile.y), (COL_DIM, &tile.x)] {
            let mut var = file.add_variable::<i16>(name, &[name])?;
            if self.compress {
                var.set_compression(DEFLATE_LEVEL, true)?;
            }
            var.put_attribute("scale_factor", coord.scale_factor)?;
            var.put_attribute("add_offset", coord.add_offset)?;
            var.put_attribute("units", coord.units.as_str())?;
            var.put_attribute("standard_name", coord.standard_name.as_str())?;
            var.put_values(&coord.values, ..)?;
        }

        debug!("Creating projection attributes...");
        {
            let mut var = file.add_variable::<i32>(&tile.grid_mapping.name, &[])?;
            for (name, value) in tile.grid_mapping.attributes.iter() {
                put_variable_attribute(&mut var, name, value)?;
            }
        }

        debug!("Creating global attributes...");
        put_global_attributes(&mut file, &tile.global_attributes)?;

        // dropping the handle syncs and closes the file
        drop(file);
        Ok(())
    }
}

impl TileWriter for NetCdfTileWriter {
    fn write_tile(&self, path: &Path, tile: &TileFile) -> WriteResult<()> {
        tile.validate().map_err(WriteError::Content)?;
        silence_hdf5_errors();

        self.write_contents(path, tile)?;

        if self.fix_awips {
            strip_nc_properties(path)?;
        }
        Ok(())
    }
}

fn put_variable_attribute(
    var: &mut netcdf::VariableMut<'_>,
    name: &str,
    value: &AttrValue,
) -> WriteResult<()> {
    match value {
        AttrValue::Str(v) => var.put_attribute(name, v.as_str())?,
        AttrValue::F32(v) => var.put_attribute(name, *v)?,
        AttrValue::F64(v) => var.put_attribute(name, *v)?,
        AttrValue::I32(v) => var.put_attribute(name, *v)?,
        AttrValue::I16(v) => var.put_attribute(name, *v)?,
        AttrValue::U16(v) => var.put_attribute(name, *v)?,
    };
    Ok(())
}

fn put_global_attributes(file: &mut netcdf::FileMut, attributes: &Attributes) -> WriteResult<()> {
    for (name, value) in attributes.iter() {
        match value {
            AttrValue::Str(v) => file.add_attribute(name, v.as_str())?,
            AttrValue::F32(v) => file.add_attribute(name, *v)?,
            AttrValue::F64(v) => file.add_attribute(name, *v)?,
            AttrValue::I32(v) => file.add_attribute(name, *v)?,
            AttrValue::I16(v) => file.add_attribute(name, *v)?,
            AttrValue::U16(v) => file.add_attribute(name, *v)?,
        };
    }
    Ok(())
}
