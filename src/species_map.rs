use nalgebra::DVector;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("species '{species}' from inflow series file {path} is not defined in the simulation")]
    UnknownSpecies { species: String, path: PathBuf },
}

// Mapping from file-local species slots to simulation-global species indices,
// resolved once at ingestion time.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeciesIndexMap {
    active: usize,       // File species carrying composition; 0 under the single-species bypass
    indices: Vec<usize>, // Global index for each file slot
    sim_species: usize,  // Species count of the simulation
}

impl SpeciesIndexMap {
    // A simulation tracking a single species ignores file composition
    // entirely; every other case resolves each file name through the
    // simulation's lookup, and any miss is fatal to the ingestion.
    pub fn resolve<F>(
        names: &[String],
        sim_species: usize,
        path: &Path,
        lookup: F,
    ) -> Result<Self, MappingError>
    where
        F: Fn(&str) -> Option<usize>,
    {
        if sim_species == 1 {
            return Ok(SpeciesIndexMap {
                active: 0,
                indices: vec![0; names.len()],
                sim_species,
            });
        }

        let mut indices = Vec::with_capacity(names.len());
        for name in names {
            match lookup(name) {
                Some(index) => indices.push(index),
                None => {
                    return Err(MappingError::UnknownSpecies {
                        species: name.clone(),
                        path: path.to_path_buf(),
                    });
                }
            }
        }
        Ok(SpeciesIndexMap {
            active: indices.len(),
            indices,
            sim_species,
        })
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    // Places file-local fractions into a simulation-sized composition vector.
    // Slots the file never mentions stay zero; under the single-species bypass
    // the sole species takes the full mixture.
    pub fn scatter(&self, local: &DVector<f64>) -> DVector<f64> {
        let mut global = DVector::zeros(self.sim_species);
        if self.active == 0 {
            global[0] = 1.0;
            return global;
        }
        for (slot, &index) in self.indices.iter().enumerate() {
            global[index] += local[slot];
        }
        global
    }
}
