//! Backend runs against an in-memory writer.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use scmi::{
    Backend, GriddedProduct, GriddedScene, OutputOptions, ProductMetadata, ScmiConfig, ScmiError,
    TilingMode, TilingOptions, FILL_CODE,
};
use scmi_netcdf::{AttrValue, TileFile, TileWriter, WriteError, WriteResult};
use test_utils::fixtures::{grid, product, proj, GridFixture};
use test_utils::generators::{create_block_valid_mask, create_brightness_temperature_grid};
use tile_geometry::{GridDefinition, MaskedGrid, TileError};

const CONFIG: &str = r#"
products:
  - instrument: viirs
    physical_element: "{instrument} {product_name}"
sectors:
  LCC:
    ll_extent: [-135.0, 20.0]
    ur_extent: [-60.0, 60.0]
    cell_size: 2000000
    proj: "+proj=lcc +lat_0=25 +lat_1=25 +lon_0=-95 +ellps=WGS84 +units=m"
  LCC_TINY:
    ll_extent: [-135.0, 20.0]
    ur_extent: [-60.0, 60.0]
    cell_size: 200000
    proj: "+proj=lcc +lat_0=25 +lat_1=25 +lon_0=-95 +ellps=WGS84 +units=m"
"#;

/// Records tiles and leaves a placeholder file behind, like a real writer
/// that fails midway would.
#[derive(Default)]
struct RecordingWriter {
    written: RefCell<Vec<(PathBuf, TileFile)>>,
    fail_on: Option<&'static str>,
}

impl RecordingWriter {
    fn failing_on(tile_id: &'static str) -> Self {
        Self {
            fail_on: Some(tile_id),
            ..Self::default()
        }
    }
}

impl TileWriter for RecordingWriter {
    fn write_tile(&self, path: &Path, tile: &TileFile) -> WriteResult<()> {
        fs::write(path, b"partial")?;
        if let Some(id) = self.fail_on {
            if path.to_string_lossy().contains(id) {
                return Err(WriteError::Content(format!("refusing {}", id)));
            }
        }
        self.written
            .borrow_mut()
            .push((path.to_path_buf(), tile.clone()));
        Ok(())
    }
}

fn definition(f: &GridFixture) -> GridDefinition {
    GridDefinition {
        grid_name: f.name.to_string(),
        proj4_definition: f.proj4.to_string(),
        width: f.width,
        height: f.height,
        cell_width: f.cell_width,
        cell_height: f.cell_height,
        origin_x: f.origin_x,
        origin_y: f.origin_y,
    }
}

fn metadata(name: &str, grid: GridDefinition) -> ProductMetadata {
    ProductMetadata {
        product_name: name.to_string(),
        data_kind: "brightness_temperature".to_string(),
        satellite: product::SATELLITE.to_string(),
        instrument: product::INSTRUMENT.to_string(),
        begin_time: product::BEGIN_TIME.parse::<DateTime<Utc>>().unwrap(),
        end_time: None,
        units: Some("K".to_string()),
        reader: None,
        standard_name: None,
        valid_min: None,
        valid_max: None,
        bit_depth: None,
        flag_meanings: None,
        grid_definition: grid,
    }
}

fn bt_product(name: &str, f: &GridFixture, mask: Option<Vec<bool>>) -> GriddedProduct {
    let data = create_brightness_temperature_grid(f.width, f.height);
    let grid = MaskedGrid::new(f.height, f.width, data, mask).unwrap();
    GriddedProduct::new(metadata(name, definition(f)), grid).unwrap()
}

fn scene(products: Vec<GriddedProduct>) -> GriddedScene {
    let mut scene = GriddedScene::new();
    for p in products {
        scene.push(p);
    }
    scene
}

fn options(dir: &Path) -> OutputOptions {
    OutputOptions {
        output_dir: dir.to_path_buf(),
        ..OutputOptions::default()
    }
}

fn backend(options: OutputOptions, writer: RecordingWriter) -> Backend<RecordingWriter> {
    Backend::new(ScmiConfig::from_yaml_str(CONFIG).unwrap(), options, writer)
}

fn numbered(count: (usize, usize)) -> TilingOptions {
    TilingOptions::new("LCC", TilingMode::numbered(None, count))
}

fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_numbered_2x2_writes_four_tiles_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend(options(dir.path()), RecordingWriter::default());
    let scene = scene(vec![bt_product(product::BT_BAND, &grid::SYNTHETIC_1000, None)]);

    let summary = backend
        .create_output_from_scene(&scene, &numbered((2, 2)))
        .unwrap();

    assert!(summary.is_success());
    assert_eq!(
        file_names(&summary.created_files),
        vec![
            "SSEC_AII_npp_viirs_viirs_i05_LCC_T001_20240115_1200.nc",
            "SSEC_AII_npp_viirs_viirs_i05_LCC_T002_20240115_1200.nc",
            "SSEC_AII_npp_viirs_viirs_i05_LCC_T003_20240115_1200.nc",
            "SSEC_AII_npp_viirs_viirs_i05_LCC_T004_20240115_1200.nc",
        ]
    );

    let written = backend.writer().written.borrow();
    let offsets: Vec<(i32, i32)> = written
        .iter()
        .map(|(_, t)| {
            let row = match t.global_attributes.get("tile_row_offset") {
                Some(AttrValue::I32(v)) => *v,
                other => panic!("unexpected {:?}", other),
            };
            let col = match t.global_attributes.get("tile_column_offset") {
                Some(AttrValue::I32(v)) => *v,
                other => panic!("unexpected {:?}", other),
            };
            (row, col)
        })
        .collect();
    assert_eq!(offsets, vec![(0, 0), (0, 500), (500, 0), (500, 500)]);

    for (_, tile) in written.iter() {
        assert_eq!((tile.rows, tile.cols), (500, 500));
        assert_eq!(tile.image.values.len(), 500 * 500);
        assert_eq!(tile.grid_mapping.name, "mercator_projection");
        assert_eq!(tile.x.scale_factor, 1000.0);
        assert_eq!(tile.x.add_offset, 500.0);
        assert_eq!(tile.y.scale_factor, -1000.0);
        assert_eq!(tile.y.add_offset, 999_500.0);

        let g = &tile.global_attributes;
        assert_eq!(g.get("number_product_tiles"), Some(&AttrValue::I32(4)));
        assert_eq!(g.get("product_rows"), Some(&AttrValue::I32(1000)));
        assert_eq!(g.get("product_columns"), Some(&AttrValue::I32(1000)));
        assert_eq!(g.get("awips_id"), Some(&AttrValue::Str("AWIPS_viirs_i05".into())));
        assert_eq!(
            g.get("physical_element"),
            Some(&AttrValue::Str("viirs viirs_i05".into()))
        );
        assert_eq!(g.get("satellite_id"), Some(&AttrValue::Str("NPP-VIIRS".into())));
        assert_eq!(g.get("Conventions"), Some(&AttrValue::Str("CF-1.7".into())));
        assert_eq!(g.get("pixel_x_size"), Some(&AttrValue::F64(1.0)));
        assert_eq!(tile.image.units, "kelvin");
    }

    // second tile's coordinates continue from the first
    let t2 = &written[1].1;
    assert_eq!(t2.x.values[0], 500);
    assert_eq!(t2.y.values[0], 0);
}

#[test]
fn test_numbered_3x3_skips_fully_masked_tiles() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend(options(dir.path()), RecordingWriter::default());
    let f = grid::SYNTHETIC_1000;
    let mask = create_block_valid_mask(f.width, f.height, 400..600, 400..600);
    let scene = scene(vec![bt_product(product::BT_BAND, &f, Some(mask))]);

    let summary = backend
        .create_output_from_scene(&scene, &numbered((3, 3)))
        .unwrap();

    let names = file_names(&summary.created_files);
    assert_eq!(names.len(), 1);
    assert!(names[0].contains("_T005_"));

    let written = backend.writer().written.borrow();
    let tile = &written[0].1;
    assert_eq!((tile.rows, tile.cols), (334, 334));
    let valid = tile
        .image
        .values
        .iter()
        .filter(|v| **v != FILL_CODE)
        .count();
    assert_eq!(valid, 200 * 200);
}

#[test]
fn test_image_values_decode_within_one_step() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend(options(dir.path()), RecordingWriter::default());
    let f = grid::SIMPLE_10X10;
    let p = bt_product(product::BT_BAND, &f, None);
    let (lo, hi) = p.data.valid_range().unwrap();

    backend
        .create_output_from_product(&p, &numbered((1, 1)))
        .unwrap();

    let written = backend.writer().written.borrow();
    let image = &written[0].1.image;
    assert_eq!(image.add_offset, lo);
    assert_eq!(image.valid_max, 65534);
    let step = (hi - lo) as f64 / 65534.0;
    for (code, value) in image.values.iter().zip(p.data.data()) {
        let decoded = *code as f64 * image.scale_factor as f64 + image.add_offset as f64;
        assert!((decoded - *value as f64).abs() <= step + 1e-3);
    }
}

#[test]
fn test_time_shift_applies_to_names_and_attributes() {
    let dir = tempfile::tempdir().unwrap();
    let opts = OutputOptions {
        time_shift_minutes: 90,
        source_name: "TEST".to_string(),
        ..options(dir.path())
    };
    let backend = backend(opts, RecordingWriter::default());
    let p = bt_product(product::BT_BAND, &grid::SIMPLE_10X10, None);

    let summary = backend
        .create_output_from_product(&p, &numbered((1, 1)))
        .unwrap();

    assert_eq!(
        file_names(&summary.created_files),
        vec!["TEST_AII_npp_viirs_viirs_i05_LCC_T001_20240115_1330.nc"]
    );
    let written = backend.writer().written.borrow();
    assert_eq!(
        written[0].1.global_attributes.get("start_date_time"),
        Some(&AttrValue::Str("2024-01-15T13:30:00".into()))
    );
}

#[test]
fn test_existing_file_is_kept_without_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let existing = dir
        .path()
        .join("SSEC_AII_npp_viirs_viirs_i05_LCC_T001_20240115_1200.nc");
    fs::write(&existing, b"keep me").unwrap();

    let backend = backend(options(dir.path()), RecordingWriter::default());
    let p = bt_product(product::BT_BAND, &grid::SIMPLE_10X10, None);
    let summary = backend
        .create_output_from_product(&p, &numbered((1, 1)))
        .unwrap();

    assert_eq!(summary.failed_tiles, 1);
    assert!(summary.created_files.is_empty());
    assert_eq!(fs::read(&existing).unwrap(), b"keep me");
}

#[test]
fn test_existing_file_with_exit_on_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path()
            .join("SSEC_AII_npp_viirs_viirs_i05_LCC_T001_20240115_1200.nc"),
        b"keep me",
    )
    .unwrap();

    let opts = OutputOptions {
        exit_on_error: true,
        ..options(dir.path())
    };
    let backend = backend(opts, RecordingWriter::default());
    let p = bt_product(product::BT_BAND, &grid::SIMPLE_10X10, None);
    let err = backend
        .create_output_from_product(&p, &numbered((1, 1)))
        .unwrap_err();
    assert!(matches!(err, ScmiError::Write(WriteError::AlreadyExists(_))));
}

#[test]
fn test_overwrite_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let existing = dir
        .path()
        .join("SSEC_AII_npp_viirs_viirs_i05_LCC_T001_20240115_1200.nc");
    fs::write(&existing, b"old").unwrap();

    let opts = OutputOptions {
        overwrite_existing: true,
        ..options(dir.path())
    };
    let backend = backend(opts, RecordingWriter::default());
    let p = bt_product(product::BT_BAND, &grid::SIMPLE_10X10, None);
    let summary = backend
        .create_output_from_product(&p, &numbered((1, 1)))
        .unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.created_files, vec![existing]);
}

#[test]
fn test_failed_tile_is_removed_and_run_continues() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend(options(dir.path()), RecordingWriter::failing_on("_T002_"));
    let p = bt_product(product::BT_BAND, &grid::SYNTHETIC_1000, None);

    let summary = backend
        .create_output_from_product(&p, &numbered((2, 2)))
        .unwrap();

    assert_eq!(summary.failed_tiles, 1);
    assert!(!summary.is_success());
    assert_eq!(summary.created_files.len(), 3);
    let leftover = dir
        .path()
        .join("SSEC_AII_npp_viirs_viirs_i05_LCC_T002_20240115_1200.nc");
    assert!(!leftover.exists());
}

#[test]
fn test_keep_intermediate_leaves_failed_file() {
    let dir = tempfile::tempdir().unwrap();
    let opts = OutputOptions {
        keep_intermediate: true,
        ..options(dir.path())
    };
    let backend = backend(opts, RecordingWriter::failing_on("_T002_"));
    let p = bt_product(product::BT_BAND, &grid::SYNTHETIC_1000, None);

    backend
        .create_output_from_product(&p, &numbered((2, 2)))
        .unwrap();

    let leftover = dir
        .path()
        .join("SSEC_AII_npp_viirs_viirs_i05_LCC_T002_20240115_1200.nc");
    assert!(leftover.exists());
}

#[test]
fn test_exit_on_error_stops_at_failed_tile() {
    let dir = tempfile::tempdir().unwrap();
    let opts = OutputOptions {
        exit_on_error: true,
        ..options(dir.path())
    };
    let backend = backend(opts, RecordingWriter::failing_on("_T002_"));
    let p = bt_product(product::BT_BAND, &grid::SYNTHETIC_1000, None);

    let err = backend
        .create_output_from_product(&p, &numbered((2, 2)))
        .unwrap_err();
    assert!(matches!(err, ScmiError::Write(WriteError::Content(_))));
    // T003 and T004 were never attempted
    assert_eq!(backend.writer().written.borrow().len(), 1);
}

#[test]
fn test_fully_masked_product_reports_no_tiles() {
    let dir = tempfile::tempdir().unwrap();
    let f = grid::SIMPLE_10X10;
    let mask = vec![true; f.size()];

    let backend1 = backend(options(dir.path()), RecordingWriter::default());
    let summary = backend1
        .create_output_from_product(&bt_product("empty", &f, Some(mask.clone())), &numbered((2, 2)))
        .unwrap();
    assert_eq!(summary.empty_products, vec!["empty".to_string()]);
    assert!(summary.created_files.is_empty());
    assert!(summary.is_success());

    let opts = OutputOptions {
        exit_on_error: true,
        ..options(dir.path())
    };
    let backend2 = backend(opts, RecordingWriter::default());
    let err = backend2
        .create_output_from_product(&bt_product("empty", &f, Some(mask)), &numbered((2, 2)))
        .unwrap_err();
    assert!(matches!(err, ScmiError::NoTiles { ref product } if product == "empty"));
}

#[test]
fn test_products_share_grid_and_unmatched_product_fails() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend(options(dir.path()), RecordingWriter::default());
    let f = grid::SIMPLE_10X10;

    let mut other = bt_product("modis_31", &f, None);
    other.metadata.instrument = "modis".to_string();

    let scene = scene(vec![
        bt_product("viirs_i04", &f, None),
        other,
        bt_product("viirs_i05", &f, None),
    ]);
    let summary = backend
        .create_output_from_scene(&scene, &numbered((1, 1)))
        .unwrap();

    assert_eq!(summary.failed_products, vec!["modis_31".to_string()]);
    let names = file_names(&summary.created_files);
    assert_eq!(names.len(), 2);
    assert!(names[0].contains("viirs_i04"));
    assert!(names[1].contains("viirs_i05"));
}

#[test]
fn test_lettered_run_writes_lettered_tiles() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend(options(dir.path()), RecordingWriter::default());
    let p = bt_product(product::BT_BAND, &grid::LCC_CONUS_5KM, None);

    let summary = backend
        .create_output_from_product(&p, &TilingOptions::new("LCC", TilingMode::lettered(None)))
        .unwrap();

    assert!(summary.is_success());
    assert!(!summary.created_files.is_empty());

    let written = backend.writer().written.borrow();
    for (path, tile) in written.iter() {
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        let id = name.split('_').nth(7).unwrap();
        let mut chars = id.chars();
        assert_eq!(chars.next(), Some('T'));
        assert!(chars.next().unwrap().is_ascii_uppercase());
        assert_eq!(id.len(), 4);

        assert_eq!((tile.rows, tile.cols), (200, 200));
        assert_eq!(tile.grid_mapping.name, "lambert_projection");
        assert_eq!(tile.x.scale_factor, 5000.0);
        assert_eq!(tile.y.scale_factor, -5000.0);
    }
}

#[test]
fn test_lettered_configuration_errors_abort() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend(options(dir.path()), RecordingWriter::default());
    let p = bt_product(product::BT_BAND, &grid::LCC_CONUS_5KM, None);

    let err = backend
        .create_output_from_product(&p, &TilingOptions::new("NOPE", TilingMode::lettered(None)))
        .unwrap_err();
    assert!(matches!(err, ScmiError::Config(_)));

    let err = backend
        .create_output_from_product(
            &p,
            &TilingOptions::new("LCC_TINY", TilingMode::lettered(None)),
        )
        .unwrap_err();
    assert!(matches!(err, ScmiError::Tile(TileError::Config(_))));
    assert!(backend.writer().written.borrow().is_empty());
}

#[test]
fn test_unsupported_projection_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend(options(dir.path()), RecordingWriter::default());
    let f = GridFixture {
        name: "albers",
        proj4: proj::ALBERS,
        ..grid::SIMPLE_10X10
    };

    let err = backend
        .create_output_from_product(&bt_product(product::BT_BAND, &f, None), &numbered((1, 1)))
        .unwrap_err();
    assert!(matches!(err, ScmiError::Config(_)));
}

#[test]
fn test_missing_tiling_parameters_abort() {
    let dir = tempfile::tempdir().unwrap();
    let backend = backend(options(dir.path()), RecordingWriter::default());
    let tiling = TilingOptions::new(
        "LCC",
        TilingMode::Numbered {
            tile_shape: None,
            tile_count: None,
        },
    );
    let err = backend
        .create_output_from_product(&bt_product(product::BT_BAND, &grid::SIMPLE_10X10, None), &tiling)
        .unwrap_err();
    assert!(matches!(err, ScmiError::Tile(TileError::Geometry(_))));
}
