use crate::inflow_options::{Certification, ConfigError, InflowOptions, MassQuantityKind};
use crate::inflow_series::{DEFAULT_MAX_SPECIES, IngestError, TimeSeriesStore};
use crate::interp;
use crate::species_map::{MappingError, SpeciesIndexMap};
use log::{error, warn};
use nalgebra::DVector;
use thiserror::Error;

// Setup-time failure of a transient inflow boundary. The host decides whether
// to abort the run; this layer only reports.
#[derive(Debug, Error)]
pub enum InflowError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    Mapping(#[from] MappingError),
}

// Interpolated inflow state handed to the solver once per time step
#[derive(Clone, Debug)]
pub struct InflowState {
    pub mass_quantity: f64,           // Flow rate [kg/s] or flux [kg/(m^2 s)], per `kind`
    pub kind: MassQuantityKind,       // Which quantity the mass column carries
    pub stagnation_temperature: f64,  // T0 [K]
    pub mass_fractions: DVector<f64>, // Sized to the simulation's species count [-]
}

// Transient inflow boundary condition driven by a time-series file. Built
// once at problem setup, immutable afterwards; evaluation is a pure lookup.
pub struct TransientInflow {
    boundary: String,
    kind: MassQuantityKind,
    store: TimeSeriesStore,
    map: SpeciesIndexMap,
}

impl TransientInflow {
    // Wires options -> series file -> species map for one boundary. Returns
    // Ok(None) when the boundary carries no series option, leaving it to the
    // constant-value machinery. `lookup` resolves a species name to the
    // simulation's species index.
    pub fn from_options<F>(
        options: &InflowOptions,
        sim_species: usize,
        lookup: F,
    ) -> Result<Option<Self>, InflowError>
    where
        F: Fn(&str) -> Option<usize>,
    {
        Self::with_species_cap(options, sim_species, lookup, DEFAULT_MAX_SPECIES)
    }

    pub fn with_species_cap<F>(
        options: &InflowOptions,
        sim_species: usize,
        lookup: F,
        max_species: usize,
    ) -> Result<Option<Self>, InflowError>
    where
        F: Fn(&str) -> Option<usize>,
    {
        let certification = options
            .certify()
            .inspect_err(|e| error!("boundary '{}': {e}", options.boundary))?;
        let (kind, path) = match certification {
            Certification::NotApplicable => return Ok(None),
            Certification::Series { kind, path } => (kind, path),
        };

        let store = TimeSeriesStore::load(&path, max_species)
            .inspect_err(|e| error!("boundary '{}': {e}", options.boundary))?;
        if let Some(record) = store.check_monotonic() {
            warn!(
                "inflow series {}: record {} steps backwards in time, interpolation assumes ascending order",
                path.display(),
                record
            );
        }

        let map = SpeciesIndexMap::resolve(store.species(), sim_species, &path, lookup)
            .inspect_err(|e| error!("boundary '{}': {e}", options.boundary))?;

        Ok(Some(TransientInflow {
            boundary: options.boundary.clone(),
            kind,
            store,
            map,
        }))
    }

    // Inflow state at the given simulation time [s]
    pub fn evaluate(&self, time: f64) -> InflowState {
        let record = interp::interpolate(&self.store, time);
        InflowState {
            mass_quantity: record.mass_quantity,
            kind: self.kind,
            stagnation_temperature: record.stagnation_temperature,
            mass_fractions: self.map.scatter(&record.fractions),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn kind(&self) -> MassQuantityKind {
        self.kind
    }

    pub fn store(&self) -> &TimeSeriesStore {
        &self.store
    }
}
