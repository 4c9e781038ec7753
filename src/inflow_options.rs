use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read boundary options {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("boundary options {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("boundary '{boundary}': 'mass_flow_rate_series' and 'mass_flux_series' are mutually exclusive")]
    ConflictingSeries { boundary: String },
    #[error("boundary '{boundary}': a series option cannot be combined with constant-value option '{constant}'")]
    ConstantWithSeries {
        boundary: String,
        constant: &'static str,
    },
    #[error("boundary '{boundary}': cannot open inflow series file {path}: {source}")]
    UnreadableFile {
        boundary: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// Which physical quantity the mass column of a series file carries. The file
// format does not encode this; it is fixed by the option key that named the
// file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MassQuantityKind {
    FlowRate, // Total mass per unit time [kg/s]
    Flux,     // Mass per unit time and boundary area [kg/(m^2 s)]
}

// Outcome of certifying a boundary's option set. A boundary with neither
// series option is not an error here; its constant-value options are
// certified elsewhere.
#[derive(Clone, Debug, PartialEq)]
pub enum Certification {
    NotApplicable,
    Series { kind: MassQuantityKind, path: PathBuf },
}

// Inflow option set for one boundary face group
#[derive(Clone, Debug, Deserialize)]
pub struct InflowOptions {
    pub boundary: String,                         // Boundary face group tag
    pub mass_flow_rate_series: Option<PathBuf>,   // Series file, mass column = flow rate
    pub mass_flux_series: Option<PathBuf>,        // Series file, mass column = flux
    pub mass_flow_rate: Option<f64>,              // Constant [kg/s]
    pub mass_flux: Option<f64>,                   // Constant [kg/(m^2 s)]
    pub stagnation_temperature: Option<f64>,      // Constant T0 [K]
    pub mass_fractions: Option<Vec<f64>>,         // Constant composition [-]
}

impl InflowOptions {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    // Certifies the option set before the run starts. At most one series
    // option may be present, it excludes every constant-value option, and the
    // file it names must be openable. Openability is checked again when the
    // file is actually ingested.
    pub fn certify(&self) -> Result<Certification, ConfigError> {
        let series = match (&self.mass_flow_rate_series, &self.mass_flux_series) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::ConflictingSeries {
                    boundary: self.boundary.clone(),
                });
            }
            (Some(path), None) => Some((MassQuantityKind::FlowRate, path)),
            (None, Some(path)) => Some((MassQuantityKind::Flux, path)),
            (None, None) => None,
        };

        let Some((kind, path)) = series else {
            return Ok(Certification::NotApplicable);
        };

        if let Some(constant) = self.constant_key() {
            return Err(ConfigError::ConstantWithSeries {
                boundary: self.boundary.clone(),
                constant,
            });
        }

        fs::File::open(path).map_err(|source| ConfigError::UnreadableFile {
            boundary: self.boundary.clone(),
            path: path.clone(),
            source,
        })?;

        Ok(Certification::Series {
            kind,
            path: path.clone(),
        })
    }

    fn constant_key(&self) -> Option<&'static str> {
        if self.mass_flow_rate.is_some() {
            Some("mass_flow_rate")
        } else if self.mass_flux.is_some() {
            Some("mass_flux")
        } else if self.stagnation_temperature.is_some() {
            Some("stagnation_temperature")
        } else if self.mass_fractions.is_some() {
            Some("mass_fractions")
        } else {
            None
        }
    }
}
