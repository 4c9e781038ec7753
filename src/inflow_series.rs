use log::debug;
use nalgebra::DVector;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Default cap on the number of species an inflow series file may declare
pub const DEFAULT_MAX_SPECIES: usize = 20;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot open inflow series file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("inflow series file {path}: ran out of tokens while reading {expected}")]
    ShortFile { path: PathBuf, expected: &'static str },
    #[error("inflow series file {path}: expected {expected}, got '{token}'")]
    BadToken {
        path: PathBuf,
        expected: &'static str,
        token: String,
    },
    #[error("inflow series file {path}: {declared} species declared, cap is {cap}")]
    TooManySpecies {
        path: PathBuf,
        declared: usize,
        cap: usize,
    },
    #[error("inflow series file {path}: record {record} mass fractions sum to zero")]
    DegenerateFractions { path: PathBuf, record: usize },
    #[error("inflow series file {path}: no records declared")]
    Empty { path: PathBuf },
}

// One row of an inflow series file
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSeriesRecord {
    pub time: f64,                   // Elapsed simulation time [s]
    pub mass_quantity: f64,          // Mass flow rate [kg/s] or mass flux [kg/(m^2 s)]
    pub stagnation_temperature: f64, // T0 [K]
    pub fractions: DVector<f64>,     // Species mass fractions, normalized to sum 1 [-]
}

// Time-stamped inflow data parsed from a file, immutable once built.
// Records are kept in file order; interpolation assumes ascending time.
#[derive(Clone, Debug)]
pub struct TimeSeriesStore {
    species: Vec<String>,
    records: Vec<TimeSeriesRecord>,
}

impl TimeSeriesStore {
    pub fn load(path: impl AsRef<Path>, max_species: usize) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| IngestError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_str(&text, path, max_species)
    }

    // File grammar: numSpecies, species names, numRecords, then per record
    // time massQuantity T0 and numSpecies mass fractions. Whitespace-delimited,
    // line breaks carry no meaning.
    pub(crate) fn parse_str(
        text: &str,
        path: &Path,
        max_species: usize,
    ) -> Result<Self, IngestError> {
        let mut tokens = text.split_whitespace();

        let n_species = next_count(&mut tokens, path, "species count")?;
        if n_species > max_species {
            return Err(IngestError::TooManySpecies {
                path: path.to_path_buf(),
                declared: n_species,
                cap: max_species,
            });
        }

        let mut species = Vec::with_capacity(n_species);
        for _ in 0..n_species {
            species.push(next_token(&mut tokens, path, "species name")?.to_string());
        }

        let n_records = next_count(&mut tokens, path, "record count")?;
        if n_records == 0 {
            return Err(IngestError::Empty {
                path: path.to_path_buf(),
            });
        }

        let mut records = Vec::with_capacity(n_records);
        for r in 0..n_records {
            let time = next_real(&mut tokens, path, "time")?;
            let mass_quantity = next_real(&mut tokens, path, "mass quantity")?;
            let stagnation_temperature = next_real(&mut tokens, path, "stagnation temperature")?;

            // Slot 0 is seeded to 1.0 so a file with zero species still yields
            // a single fully-mixed fraction.
            let mut fractions = DVector::zeros(n_species.max(1));
            fractions[0] = 1.0;
            for s in 0..n_species {
                fractions[s] = next_real(&mut tokens, path, "mass fraction")?;
            }

            let sum = fractions.sum();
            if sum.abs() < f64::EPSILON {
                return Err(IngestError::DegenerateFractions {
                    path: path.to_path_buf(),
                    record: r,
                });
            }
            fractions /= sum;

            records.push(TimeSeriesRecord {
                time,
                mass_quantity,
                stagnation_temperature,
                fractions,
            });
        }

        debug!(
            "loaded inflow series {}: {} records, {} species",
            path.display(),
            records.len(),
            species.len()
        );
        Ok(TimeSeriesStore { species, records })
    }

    // Index of the first record whose time steps backwards, if any. The parser
    // keeps file order, so a file violating the ascending-time precondition
    // surfaces here rather than during interpolation.
    pub fn check_monotonic(&self) -> Option<usize> {
        self.records
            .windows(2)
            .position(|w| w[1].time < w[0].time)
            .map(|i| i + 1)
    }

    pub fn species(&self) -> &[String] {
        &self.species
    }

    pub fn records(&self) -> &[TimeSeriesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    // First and last timestamps of the series [s]
    pub fn time_span(&self) -> (f64, f64) {
        (
            self.records[0].time,
            self.records[self.records.len() - 1].time,
        )
    }
}

fn next_token<'a, I>(tokens: &mut I, path: &Path, expected: &'static str) -> Result<&'a str, IngestError>
where
    I: Iterator<Item = &'a str>,
{
    tokens.next().ok_or_else(|| IngestError::ShortFile {
        path: path.to_path_buf(),
        expected,
    })
}

fn next_count<'a, I>(tokens: &mut I, path: &Path, expected: &'static str) -> Result<usize, IngestError>
where
    I: Iterator<Item = &'a str>,
{
    let token = next_token(tokens, path, expected)?;
    token.parse().map_err(|_| IngestError::BadToken {
        path: path.to_path_buf(),
        expected,
        token: token.to_string(),
    })
}

fn next_real<'a, I>(tokens: &mut I, path: &Path, expected: &'static str) -> Result<f64, IngestError>
where
    I: Iterator<Item = &'a str>,
{
    let token = next_token(tokens, path, expected)?;
    token.parse().map_err(|_| IngestError::BadToken {
        path: path.to_path_buf(),
        expected,
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(text: &str) -> Result<TimeSeriesStore, IngestError> {
        TimeSeriesStore::parse_str(text, Path::new("test.dat"), DEFAULT_MAX_SPECIES)
    }

    #[test]
    fn parses_two_species_file() {
        let store = parse(
            "2\nH2 O2\n2\n0.0 1.0 300.0 0.5 0.5\n10.0 2.0 350.0 0.2 0.8\n",
        )
        .unwrap();
        assert_eq!(store.species(), ["H2", "O2"]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.time_span(), (0.0, 10.0));
        assert_relative_eq!(store.records()[1].mass_quantity, 2.0);
        assert_relative_eq!(store.records()[1].fractions[1], 0.8);
    }

    #[test]
    fn normalizes_unnormalized_fractions() {
        let store = parse("2\nCH4 N2\n1\n0.0 1.0 300.0 3.0 1.0\n").unwrap();
        let f = &store.records()[0].fractions;
        assert_relative_eq!(f[0], 0.75);
        assert_relative_eq!(f[1], 0.25);
        assert_relative_eq!(f.sum(), 1.0);
    }

    #[test]
    fn zero_species_collapses_to_single_fraction() {
        let store = parse("0\n1\n0.0 1.5 400.0\n").unwrap();
        assert!(store.species().is_empty());
        let f = &store.records()[0].fractions;
        assert_eq!(f.len(), 1);
        assert_relative_eq!(f[0], 1.0);
    }

    #[test]
    fn rejects_species_over_cap() {
        let err = TimeSeriesStore::parse_str("3\nA B C\n1\n0.0 1.0 300.0 1.0 0.0 0.0\n", Path::new("test.dat"), 2);
        assert!(matches!(
            err,
            Err(IngestError::TooManySpecies { declared: 3, cap: 2, .. })
        ));
    }

    #[test]
    fn rejects_short_file() {
        let err = parse("2\nH2 O2\n2\n0.0 1.0 300.0 0.5\n");
        assert!(matches!(err, Err(IngestError::ShortFile { .. })));
    }

    #[test]
    fn rejects_bad_numeric_token() {
        let err = parse("1\nH2\n1\n0.0 fast 300.0 1.0\n");
        assert!(matches!(
            err,
            Err(IngestError::BadToken { expected: "mass quantity", .. })
        ));
    }

    #[test]
    fn rejects_zero_fraction_sum() {
        let err = parse("2\nH2 O2\n1\n0.0 1.0 300.0 0.0 0.0\n");
        assert!(matches!(
            err,
            Err(IngestError::DegenerateFractions { record: 0, .. })
        ));
    }

    #[test]
    fn rejects_empty_record_list() {
        let err = parse("1\nH2\n0\n");
        assert!(matches!(err, Err(IngestError::Empty { .. })));
    }

    #[test]
    fn open_error_names_path() {
        let err = TimeSeriesStore::load("/no/such/inflow.dat", DEFAULT_MAX_SPECIES);
        assert!(matches!(err, Err(IngestError::Open { .. })));
    }

    #[test]
    fn monotonic_check_flags_backwards_step() {
        let good = parse("1\nH2\n3\n0.0 1.0 300.0 1.0\n5.0 1.0 300.0 1.0\n9.0 1.0 300.0 1.0\n").unwrap();
        assert_eq!(good.check_monotonic(), None);

        let bad = parse("1\nH2\n3\n0.0 1.0 300.0 1.0\n5.0 1.0 300.0 1.0\n2.0 1.0 300.0 1.0\n").unwrap();
        assert_eq!(bad.check_monotonic(), Some(2));
    }
}
