//! Scene to SCMI tile files.
//!
//! Products are grouped by grid name; each grid gets one tile scheme and one
//! grid mapping variable, shared by every product on it. Each product gets
//! its own AWIPS naming and quantization, then one file per tile holding
//! valid data.

use std::fs;
use std::path::PathBuf;

use chrono::Utc;
use projection::{Proj4Params, Proj4Projector};
use scmi_netcdf::{
    CoordinateVariable, GridMappingVariable, ImageVariable, NetCdfTileWriter, TileFile,
    TileWriter, WriteError,
};
use tile_geometry::{
    GridDefinition, LetteredTileScheme, NumberedTileScheme, ScalingParameters, Tile, TileError,
    TileId, TileScheme,
};
use tracing::{debug, error, info, warn};

use crate::attributes::{awips_units, global_attributes, image_standard_name, AttributeContext};
use crate::config::{AwipsInfo, ScmiConfig};
use crate::error::{ScmiError, ScmiResult};
use crate::grid_mapping::grid_mapping;
use crate::options::{OutputOptions, TilingMode, TilingOptions};
use crate::product::{GriddedProduct, GriddedScene, ProductMetadata};
use crate::quantize::{Quantization, FILL_CODE};

/// Outcome of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Files written, in creation order
    pub created_files: Vec<PathBuf>,
    pub failed_tiles: usize,
    /// Products that failed before any tile was attempted
    pub failed_products: Vec<String>,
    /// Products whose data intersected no tile
    pub empty_products: Vec<String>,
}

impl RunSummary {
    /// True when nothing failed. Empty products are not failures.
    pub fn is_success(&self) -> bool {
        self.failed_tiles == 0 && self.failed_products.is_empty()
    }
}

/// Per-product values shared by all of its tiles.
struct ProductPlan {
    info: AwipsInfo,
    quantization: Quantization,
    units: String,
    standard_name: String,
}

/// Per-grid values shared by all of its products.
struct GridPlan<'a> {
    grid: &'a GridDefinition,
    scheme: TileScheme,
    grid_mapping: GridMappingVariable,
}

/// Writes SCMI tiles for gridded scenes.
pub struct Backend<W: TileWriter = NetCdfTileWriter> {
    config: ScmiConfig,
    options: OutputOptions,
    writer: W,
}

impl Backend<NetCdfTileWriter> {
    /// Backend writing NetCDF4 files as configured by `options`.
    pub fn with_netcdf(config: ScmiConfig, options: OutputOptions) -> Self {
        let writer = NetCdfTileWriter::new(options.compress, options.fix_awips);
        Self::new(config, options, writer)
    }
}

impl<W: TileWriter> Backend<W> {
    pub fn new(config: ScmiConfig, options: OutputOptions, writer: W) -> Self {
        Self {
            config,
            options,
            writer,
        }
    }

    pub fn options(&self) -> &OutputOptions {
        &self.options
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Write a single product.
    pub fn create_output_from_product(
        &self,
        product: &GriddedProduct,
        tiling: &TilingOptions,
    ) -> ScmiResult<RunSummary> {
        let mut scene = GriddedScene::new();
        scene.push(product.clone());
        self.create_output_from_scene(&scene, tiling)
    }

    /// Write every product of a scene.
    ///
    /// Scheme construction and grid mapping errors abort the run. Product and
    /// tile failures abort only with `exit_on_error`; otherwise they are
    /// logged and counted in the summary.
    pub fn create_output_from_scene(
        &self,
        scene: &GriddedScene,
        tiling: &TilingOptions,
    ) -> ScmiResult<RunSummary> {
        fs::create_dir_all(&self.options.output_dir).map_err(WriteError::from)?;

        let mut summary = RunSummary::default();
        for (grid, products) in group_by_grid(scene) {
            info!(
                grid = %grid.grid_name,
                products = products.len(),
                "Creating tile scheme"
            );
            let plan = GridPlan {
                grid,
                scheme: self.tile_scheme(grid, &tiling.mode, &tiling.sector_id)?,
                grid_mapping: grid_mapping(grid)?,
            };

            for product in products {
                let name = product.name().to_string();
                match self.create_product_output(product, &plan, tiling, &mut summary) {
                    Ok(0) => {
                        if plan.scheme.is_lettered() {
                            warn!(product = %name, "Data did not fit in to any lettered tile");
                        }
                        error!(product = %name, "No SCMI tiles were created");
                        if self.options.exit_on_error {
                            return Err(ScmiError::NoTiles { product: name });
                        }
                        summary.empty_products.push(name);
                    }
                    Ok(count) => {
                        debug!(product = %name, tiles = count, "Finished product");
                    }
                    Err(e) => {
                        error!(product = %name, error = %e, "Could not create output");
                        if self.options.exit_on_error {
                            return Err(e);
                        }
                        summary.failed_products.push(name);
                    }
                }
            }
        }

        info!(
            files = summary.created_files.len(),
            failed_tiles = summary.failed_tiles,
            "SCMI output complete"
        );
        Ok(summary)
    }

    fn tile_scheme(
        &self,
        grid: &GridDefinition,
        mode: &TilingMode,
        sector_id: &str,
    ) -> ScmiResult<TileScheme> {
        let scheme: TileScheme = match mode {
            TilingMode::Numbered {
                tile_shape,
                tile_count,
            } => NumberedTileScheme::new(grid, *tile_shape, *tile_count)?.into(),
            TilingMode::Lettered { subtiles } => {
                let sector = self.config.sector(sector_id)?;
                check_sector_projection(sector_id, &sector.proj, grid);
                let projector =
                    Proj4Projector::new(&grid.proj4_definition).map_err(TileError::from)?;
                LetteredTileScheme::new(grid, &sector.to_lettered_sector(), *subtiles, &projector)?
                    .into()
            }
        };

        debug!(
            grid = %grid.grid_name,
            tile_shape = ?scheme.tile_shape(),
            tile_count = ?scheme.tile_count(),
            image_shape = ?scheme.image_shape(),
            "Tile scheme ready"
        );
        Ok(scheme)
    }

    /// Returns the number of tiles attempted.
    fn create_product_output(
        &self,
        product: &GriddedProduct,
        plan: &GridPlan<'_>,
        tiling: &TilingOptions,
        summary: &mut RunSummary,
    ) -> ScmiResult<usize> {
        let meta = &product.metadata;
        if &meta.grid_definition != plan.grid {
            return Err(ScmiError::scene(format!(
                "product '{}' uses a different definition for grid '{}'",
                meta.product_name, plan.grid.grid_name
            )));
        }

        let product_plan = self.product_plan(product)?;
        let mut attempted = 0;

        for tile in plan.scheme.tiles(&product.data, plan.grid.shape())? {
            attempted += 1;
            match self.create_tile_output(meta, &product_plan, plan, &tile, tiling) {
                Ok(path) => summary.created_files.push(path),
                Err(e) => {
                    error!(
                        product = %meta.product_name,
                        tile = %tile.id(),
                        error = %e,
                        "Could not create tile"
                    );
                    if self.options.exit_on_error {
                        return Err(e);
                    }
                    summary.failed_tiles += 1;
                }
            }
        }

        Ok(attempted)
    }

    fn product_plan(&self, product: &GriddedProduct) -> ScmiResult<ProductPlan> {
        let meta = &product.metadata;
        let info = self.config.awips_info(meta)?;

        debug!(product = %meta.product_name, "Scaling data to fit in netcdf file...");
        let (data_min, data_max) = product
            .data
            .valid_range()
            .map(|(lo, hi)| (lo as f64, hi as f64))
            .unwrap_or((0.0, 0.0));
        let valid_min = meta.valid_min.unwrap_or(data_min);
        let valid_max = meta.valid_max.unwrap_or(data_max);
        debug!(
            product = %meta.product_name,
            valid_min,
            valid_max,
            "Using product valid range"
        );

        let quantization = Quantization::new(
            valid_min,
            valid_max,
            meta.bit_depth,
            meta.flag_meanings.is_some(),
        )?;

        Ok(ProductPlan {
            info,
            quantization,
            units: awips_units(meta.units.as_deref()),
            standard_name: image_standard_name(meta),
        })
    }

    fn create_tile_output(
        &self,
        meta: &ProductMetadata,
        product_plan: &ProductPlan,
        plan: &GridPlan<'_>,
        tile: &Tile<'_>,
        tiling: &TilingOptions,
    ) -> ScmiResult<PathBuf> {
        let path = self.output_path(meta, &tiling.sector_id, tile.id())?;

        if path.exists() {
            if !self.options.overwrite_existing {
                error!(path = %path.display(), "AWIPS file already exists");
                return Err(WriteError::AlreadyExists(path).into());
            }
            warn!(path = %path.display(), "AWIPS file already exists, will overwrite");
        }

        info!(tile = %tile.id(), path = %path.display(), "Writing tile");

        let result = self
            .tile_file(meta, product_plan, plan, tile, &tiling.sector_id)
            .and_then(|file| {
                self.writer
                    .write_tile(&path, &file)
                    .map_err(ScmiError::from)
            });

        if let Err(e) = result {
            error!(path = %path.display(), "Error while filling in NC file with data");
            if !self.options.keep_intermediate && path.exists() {
                if let Err(rm) = fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %rm, "Could not remove partial file");
                }
            }
            return Err(e);
        }

        Ok(path)
    }

    fn tile_file(
        &self,
        meta: &ProductMetadata,
        product_plan: &ProductPlan,
        plan: &GridPlan<'_>,
        tile: &Tile<'_>,
        sector_id: &str,
    ) -> ScmiResult<TileFile> {
        let descriptor = tile.descriptor;
        let (rows, cols) = descriptor.shape;
        let q = &product_plan.quantization;
        let scaling: ScalingParameters = plan.scheme.scaling();

        let ctx = AttributeContext {
            product: meta,
            options: &self.options,
        };
        let global_attributes = global_attributes(
            &product_plan.info,
            sector_id,
            &plan.scheme,
            descriptor,
            &ctx,
            Utc::now(),
        );

        Ok(TileFile {
            rows,
            cols,
            image: ImageVariable {
                values: q.encode_grid(&tile.data),
                fill_value: FILL_CODE,
                scale_factor: q.scale as f32,
                add_offset: q.offset as f32,
                valid_min: 0,
                valid_max: q.max_code(),
                units: product_plan.units.clone(),
                standard_name: product_plan.standard_name.clone(),
            },
            x: CoordinateVariable {
                values: coordinate_indices(descriptor.x_indices(), "x")?,
                scale_factor: scaling.mx,
                add_offset: scaling.bx,
                units: "meters".to_string(),
                standard_name: "projection_x_coordinate".to_string(),
            },
            y: CoordinateVariable {
                values: coordinate_indices(descriptor.y_indices(), "y")?,
                scale_factor: scaling.my,
                add_offset: scaling.by,
                units: "meters".to_string(),
                standard_name: "projection_y_coordinate".to_string(),
            },
            grid_mapping: plan.grid_mapping.clone(),
            global_attributes,
        })
    }

    fn output_path(
        &self,
        meta: &ProductMetadata,
        sector_id: &str,
        tile_id: TileId,
    ) -> ScmiResult<PathBuf> {
        let pattern = &self.options.output_pattern;
        let file_name = if pattern.contains('{') {
            let shift = self.options.time_shift();
            let mut fields = meta.template_fields();
            fields.insert("source_name", self.options.source_name.as_str());
            fields.insert("sector_id", sector_id);
            fields.insert("tile_id", tile_id.to_string());
            fields.insert("begin_time", meta.begin_time + shift);
            fields.insert("end_time", meta.end_time() + shift);
            fields.render(pattern)?
        } else {
            pattern.clone()
        };
        Ok(self.options.output_dir.join(file_name))
    }
}

/// Products grouped by grid name, in order of first appearance.
fn group_by_grid(scene: &GriddedScene) -> Vec<(&GridDefinition, Vec<&GriddedProduct>)> {
    let mut groups: Vec<(&GridDefinition, Vec<&GriddedProduct>)> = Vec::new();
    for product in scene.products() {
        let grid = &product.metadata.grid_definition;
        match groups
            .iter_mut()
            .find(|(g, _)| g.grid_name == grid.grid_name)
        {
            Some((_, products)) => products.push(product),
            None => groups.push((grid, vec![product])),
        }
    }
    groups
}

fn check_sector_projection(sector_id: &str, sector_proj: &str, grid: &GridDefinition) {
    let sector_family = Proj4Params::parse(sector_proj).map(|p| p.family());
    let grid_family = Proj4Params::parse(&grid.proj4_definition).map(|p| p.family());
    if let (Ok(sector_family), Ok(grid_family)) = (sector_family, grid_family) {
        if sector_family != grid_family {
            warn!(
                sector = sector_id,
                sector_proj = %sector_family,
                grid_proj = %grid_family,
                "Sector projection differs from grid projection"
            );
        }
    }
}

fn coordinate_indices(
    indices: impl Iterator<Item = usize>,
    axis: &'static str,
) -> ScmiResult<Vec<i16>> {
    indices
        .map(|i| {
            i16::try_from(i).map_err(|_| {
                ScmiError::Tile(TileError::Size {
                    axis,
                    count: i + 1,
                    limit: i16::MAX as usize + 1,
                })
            })
        })
        .collect()
}
