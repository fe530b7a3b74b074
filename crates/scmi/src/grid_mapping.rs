//! CF grid mapping variable for a grid's projection.

use projection::{Proj4Params, ProjectionError, ProjectionFamily};
use scmi_netcdf::{Attributes, GridMappingVariable};
use tile_geometry::GridDefinition;

use crate::error::{ScmiError, ScmiResult};

/// Build the grid mapping variable for `grid`.
///
/// Only geostationary, Lambert conformal, polar stereographic and Mercator
/// grids can be described; anything else is a configuration error.
pub fn grid_mapping(grid: &GridDefinition) -> ScmiResult<GridMappingVariable> {
    let params = Proj4Params::parse(&grid.proj4_definition).map_err(proj_error)?;
    let p = &params;

    let mut attrs = Attributes::new();
    attrs.set("short_name", grid.grid_name.as_str());

    let name = match params.family() {
        ProjectionFamily::Geostationary => {
            attrs.set("grid_mapping_name", "geostationary");
            attrs.set("sweep_angle_axis", p.get("sweep").unwrap_or("x"));
            attrs.set("perspective_point_height", required(p, "h")?);
            attrs.set("latitude_of_projection_origin", 0.0f32);
            attrs.set(
                "longitude_of_projection_origin",
                p.f64_or("lon_0", 0.0).map_err(proj_error)? as f32,
            );
            "fixedgrid_projection"
        }
        ProjectionFamily::LambertConformal => {
            let lat_0 = required(p, "lat_0")?;
            attrs.set("grid_mapping_name", "lambert_conformal_conic");
            attrs.set("standard_parallel", lat_0);
            attrs.set("longitude_of_central_meridian", required(p, "lon_0")?);
            attrs.set(
                "latitude_of_projection_origin",
                p.f64_or("lat_1", lat_0).map_err(proj_error)?,
            );
            "lambert_projection"
        }
        ProjectionFamily::PolarStereographic => {
            attrs.set("grid_mapping_name", "polar_stereographic");
            attrs.set("standard_parallel", required(p, "lat_ts")?);
            attrs.set(
                "straight_vertical_longitude_from_pole",
                p.f64_or("lon_0", 0.0).map_err(proj_error)?,
            );
            attrs.set("latitude_of_projection_origin", required(p, "lat_0")?);
            "polar_projection"
        }
        ProjectionFamily::Mercator => {
            let lat_0 = p.f64_or("lat_0", 0.0).map_err(proj_error)?;
            attrs.set("grid_mapping_name", "mercator");
            attrs.set(
                "standard_parallel",
                p.f64_or("lat_ts", lat_0).map_err(proj_error)?,
            );
            attrs.set(
                "longitude_of_projection_origin",
                p.f64_or("lon_0", 0.0).map_err(proj_error)?,
            );
            "mercator_projection"
        }
        other => {
            return Err(ScmiError::config(format!(
                "SCMI can not handle projection '{}'",
                other
            )))
        }
    };

    let ellipsoid = params.ellipsoid().map_err(proj_error)?;
    attrs.set("semi_major_axis", ellipsoid.semi_major);
    attrs.set("semi_minor_axis", ellipsoid.semi_minor);
    attrs.set("false_easting", p.f64_or("x_0", 0.0).map_err(proj_error)? as f32);
    attrs.set("false_northing", p.f64_or("y_0", 0.0).map_err(proj_error)? as f32);

    Ok(GridMappingVariable {
        name: name.to_string(),
        attributes: attrs,
    })
}

fn required(params: &Proj4Params, key: &str) -> ScmiResult<f64> {
    params.f64_param(key).map_err(proj_error)?.ok_or_else(|| {
        ScmiError::config(format!(
            "projection '{}' is missing +{}",
            params.definition(),
            key
        ))
    })
}

fn proj_error(e: ProjectionError) -> ScmiError {
    ScmiError::config(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scmi_netcdf::AttrValue;

    fn grid(proj4: &str) -> GridDefinition {
        GridDefinition {
            grid_name: "g".to_string(),
            proj4_definition: proj4.to_string(),
            width: 10,
            height: 10,
            cell_width: 1000.0,
            cell_height: -1000.0,
            origin_x: 500.0,
            origin_y: 9500.0,
        }
    }

    #[test]
    fn test_lcc() {
        let gm = grid_mapping(&grid(
            "+proj=lcc +datum=NAD83 +ellps=GRS80 +lat_0=25 +lat_1=30 +lon_0=-95 +units=m",
        ))
        .unwrap();
        assert_eq!(gm.name, "lambert_projection");
        let a = &gm.attributes;
        assert_eq!(a.get("standard_parallel"), Some(&AttrValue::F64(25.0)));
        assert_eq!(a.get("latitude_of_projection_origin"), Some(&AttrValue::F64(30.0)));
        assert_eq!(a.get("longitude_of_central_meridian"), Some(&AttrValue::F64(-95.0)));
        assert_eq!(a.get("semi_major_axis"), Some(&AttrValue::F64(6378137.0)));
        assert_eq!(a.get("false_easting"), Some(&AttrValue::F32(0.0)));
        assert_eq!(a.get("short_name"), Some(&AttrValue::Str("g".into())));
    }

    #[test]
    fn test_geos() {
        let gm = grid_mapping(&grid(
            "+proj=geos +h=35786023 +lon_0=-75 +sweep=x +a=6378137 +b=6356752.31414",
        ))
        .unwrap();
        assert_eq!(gm.name, "fixedgrid_projection");
        let a = &gm.attributes;
        assert_eq!(a.get("perspective_point_height"), Some(&AttrValue::F64(35786023.0)));
        assert_eq!(a.get("longitude_of_projection_origin"), Some(&AttrValue::F32(-75.0)));
        assert_eq!(a.get("semi_minor_axis"), Some(&AttrValue::F64(6356752.31414)));
    }

    #[test]
    fn test_stere_and_merc() {
        let gm = grid_mapping(&grid("+proj=stere +lat_0=90 +lat_ts=60 +lon_0=-150 +R=6371000"))
            .unwrap();
        assert_eq!(gm.name, "polar_projection");
        assert_eq!(
            gm.attributes.get("semi_major_axis"),
            Some(&AttrValue::F64(6371000.0))
        );

        let gm = grid_mapping(&grid("+proj=merc +lat_ts=20 +datum=WGS84 +x_0=100")).unwrap();
        assert_eq!(gm.name, "mercator_projection");
        assert_eq!(gm.attributes.get("standard_parallel"), Some(&AttrValue::F64(20.0)));
        assert_eq!(gm.attributes.get("false_easting"), Some(&AttrValue::F32(100.0)));
    }

    #[test]
    fn test_unsupported_and_incomplete() {
        let err = grid_mapping(&grid("+proj=aea +lat_1=29.5 +lat_2=45.5")).unwrap_err();
        assert!(matches!(err, ScmiError::Config(_)));

        let err = grid_mapping(&grid("+proj=geos +lon_0=-75")).unwrap_err();
        assert!(matches!(err, ScmiError::Config(_)));
    }
}
