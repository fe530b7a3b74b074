//! Common test fixtures for SCMI tiling tests.
//!
//! Grid and sector fixtures are plain constants so crates can convert them
//! into their own types without depending on each other.

/// PROJ.4 definitions for the projection families SCMI supports.
pub mod proj {
    /// Lambert conformal conic centered on CONUS
    pub const LCC_CONUS: &str =
        "+proj=lcc +lat_0=25 +lat_1=25 +lon_0=-95 +x_0=0 +y_0=0 +ellps=WGS84 +units=m +no_defs";

    /// GOES-East fixed grid
    pub const GEOS_EAST: &str =
        "+proj=geos +lon_0=-75 +h=35786023 +a=6378137 +b=6356752.31414 +sweep=x +units=m +no_defs";

    /// Mercator for Pacific/Puerto Rico style sectors
    pub const MERCATOR: &str = "+proj=merc +lon_0=0 +lat_ts=20 +ellps=WGS84 +units=m +no_defs";

    /// North polar stereographic
    pub const POLAR_NORTH: &str =
        "+proj=stere +lat_0=90 +lat_ts=60 +lon_0=-150 +ellps=WGS84 +units=m +no_defs";

    /// Not representable in an SCMI grid mapping
    pub const ALBERS: &str = "+proj=aea +lat_1=29.5 +lat_2=45.5 +lon_0=-96 +ellps=GRS80";
}

/// Projected grid definition fixture.
#[derive(Debug, Clone, Copy)]
pub struct GridFixture {
    pub name: &'static str,
    pub proj4: &'static str,
    pub width: usize,
    pub height: usize,
    pub cell_width: f64,
    pub cell_height: f64,
    /// Upper-left pixel center
    pub origin_x: f64,
    pub origin_y: f64,
}

impl GridFixture {
    pub fn size(&self) -> usize {
        self.width * self.height
    }

    /// Same grid with a different shape and upper-left pixel center.
    pub fn with_extent(&self, width: usize, height: usize, origin_x: f64, origin_y: f64) -> Self {
        Self {
            width,
            height,
            origin_x,
            origin_y,
            ..*self
        }
    }
}

/// Common grid definitions.
pub mod grid {
    use super::{proj, GridFixture};

    /// 1000 x 1000 pixels of 1 km, pixel edges on whole kilometers
    pub const SYNTHETIC_1000: GridFixture = GridFixture {
        name: "synthetic_1000",
        proj4: proj::MERCATOR,
        width: 1000,
        height: 1000,
        cell_width: 1000.0,
        cell_height: -1000.0,
        origin_x: 500.0,
        origin_y: 999_500.0,
    };

    /// Small 10 x 10 grid for quick checks
    pub const SIMPLE_10X10: GridFixture = GridFixture {
        name: "simple_10x10",
        proj4: proj::MERCATOR,
        width: 10,
        height: 10,
        cell_width: 1000.0,
        cell_height: -1000.0,
        origin_x: 500.0,
        origin_y: 9_500.0,
    };

    /// 5 km LCC grid over CONUS, upper-left edge at (-2,500 km, 2,000 km)
    pub const LCC_CONUS_5KM: GridFixture = GridFixture {
        name: "lcc_conus_5km",
        proj4: proj::LCC_CONUS,
        width: 1000,
        height: 600,
        cell_width: 5000.0,
        cell_height: -5000.0,
        origin_x: -2_497_500.0,
        origin_y: 1_997_500.0,
    };
}

/// Lettered sector fixture: corners in (lon, lat) degrees.
#[derive(Debug, Clone, Copy)]
pub struct SectorFixture {
    pub id: &'static str,
    pub lower_left: (f64, f64),
    pub upper_right: (f64, f64),
    /// (row height, column width) in projection units
    pub cell_size: (f64, f64),
    pub proj4: &'static str,
}

/// Common sectors.
pub mod sector {
    use super::{proj, SectorFixture};

    /// CONUS lettered sector
    pub const LCC: SectorFixture = SectorFixture {
        id: "LCC",
        lower_left: (-135.0, 20.0),
        upper_right: (-60.0, 60.0),
        cell_size: (2_000_000.0, 2_000_000.0),
        proj4: proj::LCC_CONUS,
    };

    /// Same corners with cells too small for 26 letters
    pub const LCC_TINY_CELLS: SectorFixture = SectorFixture {
        id: "LCC_TINY",
        lower_left: (-135.0, 20.0),
        upper_right: (-60.0, 60.0),
        cell_size: (200_000.0, 200_000.0),
        proj4: proj::LCC_CONUS,
    };
}

/// Product metadata used across tests.
pub mod product {
    /// Reference begin time (RFC 3339)
    pub const BEGIN_TIME: &str = "2024-01-15T12:00:00Z";
    pub const END_TIME: &str = "2024-01-15T12:05:00Z";

    pub const SATELLITE: &str = "npp";
    pub const INSTRUMENT: &str = "viirs";

    /// Infrared brightness temperature band
    pub const BT_BAND: &str = "viirs_i05";
    /// Visible reflectance band
    pub const REFL_BAND: &str = "viirs_i01";
}

/// Create a temporary output directory that is removed when dropped.
pub fn temp_output_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("scmi-test-")
        .tempdir()
        .expect("failed to create temporary directory")
}
