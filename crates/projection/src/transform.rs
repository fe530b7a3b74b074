//! Forward projection from geographic coordinates into map units.

use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use tracing::debug;

use crate::error::{ProjectionError, ProjectionResult};
use crate::proj4::Proj4Params;

/// Projects longitude/latitude in degrees into projection coordinates.
///
/// Implemented by [`Proj4Projector`] in production; tests plug in simple
/// linear projectors so tile geometry can be checked with exact numbers.
pub trait Projector: Send + Sync {
    fn project(&self, lon: f64, lat: f64) -> ProjectionResult<(f64, f64)>;
}

/// A [`Projector`] backed by `proj4rs`.
pub struct Proj4Projector {
    params: Proj4Params,
    source: Proj,
    target: Proj,
}

impl Proj4Projector {
    /// Build a projector for a PROJ.4 definition.
    ///
    /// The geographic source uses the same earth model as the target so no
    /// datum shift happens between the two.
    pub fn new(definition: &str) -> ProjectionResult<Self> {
        let params = Proj4Params::parse(definition)?;

        let target = Proj::from_proj_string(params.definition()).map_err(|e| {
            ProjectionError::InvalidDefinition {
                definition: definition.to_string(),
                message: format!("{e:?}"),
            }
        })?;

        let source_definition = format!("+proj=longlat {}", params.earth_tokens());
        let source = Proj::from_proj_string(source_definition.trim()).map_err(|e| {
            ProjectionError::InvalidDefinition {
                definition: source_definition.clone(),
                message: format!("{e:?}"),
            }
        })?;

        debug!(definition = %params.definition(), family = %params.family(), "Created projector");

        Ok(Self {
            params,
            source,
            target,
        })
    }

    pub fn params(&self) -> &Proj4Params {
        &self.params
    }
}

impl Projector for Proj4Projector {
    fn project(&self, lon: f64, lat: f64) -> ProjectionResult<(f64, f64)> {
        // proj4rs uses radians for geographic coordinates
        let mut point = (lon.to_radians(), lat.to_radians(), 0.0);

        transform(&self.source, &self.target, &mut point).map_err(|e| {
            ProjectionError::TransformFailed {
                lon,
                lat,
                message: format!("{e:?}"),
            }
        })?;

        if !point.0.is_finite() || !point.1.is_finite() {
            return Err(ProjectionError::TransformFailed {
                lon,
                lat,
                message: "projection produced a non-finite coordinate".to_string(),
            });
        }

        Ok((point.0, point.1))
    }
}

impl std::fmt::Debug for Proj4Projector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proj4Projector")
            .field("definition", &self.params.definition())
            .finish()
    }
}
