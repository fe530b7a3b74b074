//! PROJ.4 string parsing.
//!
//! Only the subset needed by SCMI is interpreted: the projection family,
//! numeric parameters and the ellipsoid. Everything else is kept verbatim
//! so it can be handed to the projection library untouched.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ProjectionError, ProjectionResult};

/// Projection families recognised by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionFamily {
    /// `+proj=lcc`
    LambertConformal,
    /// `+proj=geos`
    Geostationary,
    /// `+proj=merc`
    Mercator,
    /// `+proj=stere`
    PolarStereographic,
    /// `+proj=longlat` / `latlong`
    Geographic,
    /// Anything else, by PROJ name
    Other(String),
}

impl ProjectionFamily {
    /// Map a PROJ `+proj=` name to a family.
    pub fn from_proj_name(name: &str) -> Self {
        match name {
            "lcc" => Self::LambertConformal,
            "geos" => Self::Geostationary,
            "merc" => Self::Mercator,
            "stere" => Self::PolarStereographic,
            "longlat" | "latlong" | "lonlat" | "latlon" => Self::Geographic,
            other => Self::Other(other.to_string()),
        }
    }

    /// The PROJ name for this family.
    pub fn proj_name(&self) -> &str {
        match self {
            Self::LambertConformal => "lcc",
            Self::Geostationary => "geos",
            Self::Mercator => "merc",
            Self::PolarStereographic => "stere",
            Self::Geographic => "longlat",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for ProjectionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.proj_name())
    }
}

/// Semi-axes of a reference ellipsoid, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    pub semi_major: f64,
    pub semi_minor: f64,
}

impl Ellipsoid {
    pub const WGS84: Ellipsoid = Ellipsoid {
        semi_major: 6378137.0,
        semi_minor: 6356752.314245179,
    };

    pub const GRS80: Ellipsoid = Ellipsoid {
        semi_major: 6378137.0,
        semi_minor: 6356752.314140356,
    };

    /// Look up a named PROJ ellipsoid (`+ellps=`).
    pub fn named(name: &str) -> Option<Self> {
        let (a, b) = match name {
            "WGS84" => return Some(Self::WGS84),
            "GRS80" => return Some(Self::GRS80),
            "clrk66" => (6378206.4, 6356583.8),
            "intl" => (6378388.0, 6356911.946127947),
            "bessel" => (6377397.155, 6356078.962818189),
            "sphere" => (6370997.0, 6370997.0),
            "WGS72" => (6378135.0, 6356750.520016094),
            _ => return None,
        };
        Some(Self {
            semi_major: a,
            semi_minor: b,
        })
    }

    /// Look up the ellipsoid implied by a named datum (`+datum=`).
    pub fn for_datum(datum: &str) -> Option<Self> {
        match datum {
            "WGS84" => Some(Self::WGS84),
            "NAD83" => Some(Self::GRS80),
            "NAD27" => Self::named("clrk66"),
            _ => None,
        }
    }
}

/// Parsed `+key=value` parameters of a PROJ.4 definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Proj4Params {
    definition: String,
    params: BTreeMap<String, Option<String>>,
}

impl Proj4Params {
    /// Parse a PROJ.4 definition such as
    /// `+proj=lcc +lat_0=25 +lon_0=-95 +lat_1=25 +datum=WGS84 +units=m`.
    pub fn parse(definition: &str) -> ProjectionResult<Self> {
        let mut params = BTreeMap::new();

        for token in definition.split_whitespace() {
            let token = token.strip_prefix('+').ok_or_else(|| ProjectionError::InvalidDefinition {
                definition: definition.to_string(),
                message: format!("token '{}' does not start with '+'", token),
            })?;
            match token.split_once('=') {
                Some((key, value)) => params.insert(key.to_string(), Some(value.to_string())),
                None => params.insert(token.to_string(), None),
            };
        }

        if !params.contains_key("proj") {
            return Err(ProjectionError::InvalidDefinition {
                definition: definition.to_string(),
                message: "missing '+proj=' parameter".to_string(),
            });
        }

        Ok(Self {
            definition: definition.trim().to_string(),
            params,
        })
    }

    /// The original definition string.
    pub fn definition(&self) -> &str {
        &self.definition
    }

    /// Projection family named by `+proj=`.
    pub fn family(&self) -> ProjectionFamily {
        ProjectionFamily::from_proj_name(self.get("proj").unwrap_or_default())
    }

    /// Raw string value of a parameter.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|v| v.as_deref())
    }

    /// Whether a parameter (valued or flag) is present.
    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Numeric value of a parameter, if present.
    pub fn f64_param(&self, key: &str) -> ProjectionResult<Option<f64>> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ProjectionError::InvalidParameter {
                    key: key.to_string(),
                    value: raw.to_string(),
                }),
        }
    }

    /// Numeric value of a parameter or a default when absent.
    pub fn f64_or(&self, key: &str, default: f64) -> ProjectionResult<f64> {
        Ok(self.f64_param(key)?.unwrap_or(default))
    }

    /// Resolve the reference ellipsoid.
    ///
    /// Precedence follows PROJ: explicit `+a` (with `+b` or `+rf`), then
    /// `+R`, then `+ellps`, then `+datum`, falling back to WGS84.
    pub fn ellipsoid(&self) -> ProjectionResult<Ellipsoid> {
        if let Some(a) = self.f64_param("a")? {
            let semi_minor = if let Some(b) = self.f64_param("b")? {
                b
            } else if let Some(rf) = self.f64_param("rf")? {
                a * (1.0 - 1.0 / rf)
            } else {
                a
            };
            return Ok(Ellipsoid {
                semi_major: a,
                semi_minor,
            });
        }

        if let Some(r) = self.f64_param("R")? {
            return Ok(Ellipsoid {
                semi_major: r,
                semi_minor: r,
            });
        }

        if let Some(name) = self.get("ellps") {
            return Ellipsoid::named(name)
                .ok_or_else(|| ProjectionError::UnknownEllipsoid(name.to_string()));
        }

        if let Some(datum) = self.get("datum") {
            return Ellipsoid::for_datum(datum)
                .ok_or_else(|| ProjectionError::UnknownEllipsoid(datum.to_string()));
        }

        Ok(Ellipsoid::WGS84)
    }

    /// The tokens that define the earth model, reusable in another definition.
    pub fn earth_tokens(&self) -> String {
        ["a", "b", "rf", "R", "ellps", "datum", "towgs84"]
            .iter()
            .filter_map(|key| self.get(key).map(|value| format!("+{}={}", key, value)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
