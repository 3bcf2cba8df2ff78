use std::{io::Write, path::{Path, PathBuf}};

use anyhow::Result;
use demography::{DemographyModel, SamplingConfig};

use crate::DriverError;

#[cfg(test)]
use mockall::automock;

/// Numeric parameters of a single simulation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    pub sequence_length   : f64,
    pub recombination_rate: f64,
    pub mutation_rate     : f64,
    pub seed              : Option<u32>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self{sequence_length: 2.5e8, recombination_rate: 1.25e-8, mutation_rate: 1e-8, seed: None}
    }
}

impl SimulationParams {
    /// Ensure the sequence length is strictly positive, and rates are finite and non-negative.
    ///
    /// # Errors
    /// - `DriverError::InvalidParameter` for the first offending value.
    pub fn validate(&self) -> Result<(), DriverError> {
        use DriverError::InvalidParameter;
        if !(self.sequence_length.is_finite() && self.sequence_length > 0.0) {
            return Err(InvalidParameter{name: "sequence_length", value: self.sequence_length, expected: "Expected a finite, strictly positive value"})
        }
        for (name, value) in [("recombination_rate", self.recombination_rate), ("mutation_rate", self.mutation_rate)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(InvalidParameter{name, value, expected: "Expected a finite, non-negative value"})
            }
        }
        Ok(())
    }
}

/// Handle to a simulated (tree-sequence) genealogy, stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genealogy {
    path: PathBuf,
    seed: Option<u32>,
}

impl Genealogy {
    pub fn new(path: impl Into<PathBuf>, seed: Option<u32>) -> Self {
        Self{path: path.into(), seed}
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Seed used to simulate this genealogy, if any.
    pub fn seed(&self) -> Option<u32> {
        self.seed
    }
}

/// Handle to a genealogy carrying mutations, stored on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutatedGenealogy {
    path: PathBuf,
}

impl MutatedGenealogy {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self{path: path.into()}
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg_attr(test, automock)]
pub trait AncestryEngine {
    /// Simulate the genealogy of `sampling` under `model`.
    fn simulate_ancestry(&self, model: &DemographyModel, sampling: &SamplingConfig, params: &SimulationParams) -> Result<Genealogy>;
}

#[cfg_attr(test, automock)]
pub trait MutationEngine {
    /// Overlay mutations on `genealogy`, at a per-base, per-generation `mutation_rate`.
    fn simulate_mutations(&self, genealogy: &Genealogy, mutation_rate: f64) -> Result<MutatedGenealogy>;
}

pub trait VariantWriter {
    /// Stream `mutated` into `output`, as a VCF.
    fn write(&self, mutated: &MutatedGenealogy, output: &mut dyn Write) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_are_valid() {
        assert!(SimulationParams::default().validate().is_ok());
        let zero_rates = SimulationParams{recombination_rate: 0.0, mutation_rate: 0.0, ..Default::default()};
        assert!(zero_rates.validate().is_ok());
    }

    #[test]
    fn invalid_params() {
        let cases = [
            SimulationParams{sequence_length: 0.0, ..Default::default()},
            SimulationParams{sequence_length: f64::INFINITY, ..Default::default()},
            SimulationParams{recombination_rate: -1e-8, ..Default::default()},
            SimulationParams{mutation_rate: f64::NAN, ..Default::default()},
        ];
        let names: Vec<&str> = cases.iter()
            .map(|params| match params.validate() {
                Err(DriverError::InvalidParameter{name, ..}) => name,
                other => panic!("Expected InvalidParameter. Got {other:?}"),
            })
            .collect();
        assert_eq!(names, ["sequence_length", "sequence_length", "recombination_rate", "mutation_rate"]);
    }
}
