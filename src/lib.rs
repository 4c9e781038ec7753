mod boundary_cond;
mod inflow_options;
mod inflow_series;
mod interp;
mod species_map;

pub use boundary_cond::{InflowError, InflowState, TransientInflow};
pub use inflow_options::{Certification, ConfigError, InflowOptions, MassQuantityKind};
pub use inflow_series::{DEFAULT_MAX_SPECIES, IngestError, TimeSeriesRecord, TimeSeriesStore};
pub use interp::interpolate;
pub use species_map::{MappingError, SpeciesIndexMap};
