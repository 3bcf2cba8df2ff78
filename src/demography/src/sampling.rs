use indexmap::IndexMap;
use serde::{Serialize, Deserialize};

use crate::{DemographyError, DemographyModel};

/// Number of (diploid) individuals to sample at present, for each population.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SamplingConfig(IndexMap<String, u64>);

impl SamplingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sample(&mut self, population: &str, individuals: u64) -> &mut Self {
        self.0.insert(population.to_string(), individuals);
        self
    }

    /// Iterate over `(population, individuals)` pairs, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(name, n)| (name.as_str(), *n))
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    /// Ensure every sampled population exists within `model`, and is active at present.
    ///
    /// # Errors
    /// - `UnknownPopulation` if a population is missing from the model.
    /// - `SampleInactive` if a population does not exist at time 0.
    /// - `EmptySampling` if not a single individual is requested.
    pub fn validate(&self, model: &DemographyModel) -> Result<(), DemographyError> {
        for (name, _) in self.iter() {
            if !model.registry().lookup(name)?.active_at_present {
                return Err(DemographyError::SampleInactive(name.to_string()))
            }
        }
        if self.total() == 0 {
            return Err(DemographyError::EmptySampling)
        }
        Ok(())
    }
}

impl<'a> FromIterator<(&'a str, u64)> for SamplingConfig {
    fn from_iter<T: IntoIterator<Item = (&'a str, u64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(name, n)| (name.to_string(), n)).collect())
    }
}
