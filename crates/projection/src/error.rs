//! Error types for projection handling.

use thiserror::Error;

/// Result type for projection operations.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Errors raised while parsing or applying a projection.
#[derive(Error, Debug)]
pub enum ProjectionError {
    /// The PROJ.4 string could not be parsed
    #[error("invalid PROJ.4 string '{definition}': {message}")]
    InvalidDefinition { definition: String, message: String },

    /// A parameter exists but is not numeric
    #[error("parameter '+{key}' has non-numeric value '{value}'")]
    InvalidParameter { key: String, value: String },

    /// Named ellipsoid or datum is not known
    #[error("unknown ellipsoid or datum: {0}")]
    UnknownEllipsoid(String),

    /// The projection library rejected a point
    #[error("failed to project ({lon}, {lat}): {message}")]
    TransformFailed { lon: f64, lat: f64, message: String },
}
