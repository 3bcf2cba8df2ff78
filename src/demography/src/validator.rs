use std::fmt::{self, Display, Formatter};

use log::{debug, trace};

use crate::{
    DemographyError,
    event::{Event, EventKind},
    registry::{PopulationId, PopulationRegistry},
};

/// Default tolerance applied when checking that admixture proportions sum to one.
pub const DEFAULT_PROPORTION_TOLERANCE: f64 = 1e-6;

/// Tunable parameters of the `Validator`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatorConfig {
    pub proportion_tolerance: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self{proportion_tolerance: DEFAULT_PROPORTION_TOLERANCE}
    }
}

/// State of a population's lineage while walking backward in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineageState {
    Alive,
    MergedAt(f64),
}

impl Display for LineageState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alive          => write!(f, "extant to root"),
            Self::MergedAt(time) => write!(f, "merged at {time}"),
        }
    }
}

/// Final lineage state of every registered population, indexed by `PopulationId`.
#[derive(Debug, Clone, PartialEq)]
pub struct LineageStates(Vec<LineageState>);

impl LineageStates {
    fn new(n: usize) -> Self {
        Self(vec![LineageState::Alive; n])
    }

    pub fn get(&self, id: PopulationId) -> LineageState {
        self.0[id.index()]
    }

    fn merge(&mut self, id: PopulationId, time: f64) {
        self.0[id.index()] = LineageState::MergedAt(time);
    }
}

/// Checks referential and temporal consistency of a set of time-sorted events.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self{config}
    }

    /// Walk through `events` once, from the present to the past, while tracking whether
    /// each population is still alive or has merged away.
    ///
    /// Populations merge at most once (as the derived side of a split or admixture), and
    /// a merged population cannot be referenced anymore by any older event. Validation
    /// stops at the first violation.
    ///
    /// # Arguments
    /// - `registry`: the populations referenced by `events`.
    /// - `events`  : events sorted by ascending time (see `EventCatalog::finalize()`)
    ///
    /// # Errors
    /// - `DoubleMerge` if a population merges away twice.
    /// - `ReferencedAfterMerge` if a merged population is referenced again as a live lineage.
    /// - `InvalidSize` if a parameter change sets a population size to 0.
    /// - `ProportionSum` | `ProportionRange` upon invalid admixture proportions.
    pub fn validate(&self, registry: &PopulationRegistry, events: &[Event]) -> Result<LineageStates, DemographyError> {
        let mut states = LineageStates::new(registry.len());
        for event in events {
            trace!("Validating {}", event.display(registry));
            match event {
                Event::Split{time, derived, ancestral} => {
                    for id in derived {
                        Self::merge(&mut states, registry, EventKind::Split, *time, *id)?;
                    }
                    Self::require_alive(&states, registry, EventKind::Split, *time, *ancestral)?;
                },
                Event::ParameterChange{time, population, new_size} => {
                    Self::require_alive(&states, registry, EventKind::ParameterChange, *time, *population)?;
                    if *new_size == 0 {
                        return Err(DemographyError::InvalidSize{population: registry.name(*population).to_string(), size: *new_size})
                    }
                },
                Event::Admixture{time, derived, ancestral, proportions} => {
                    Self::merge(&mut states, registry, EventKind::Admixture, *time, *derived)?;
                    self.check_proportions(registry, *time, *derived, ancestral, proportions)?;
                    for id in ancestral {
                        Self::require_alive(&states, registry, EventKind::Admixture, *time, *id)?;
                    }
                },
            }
        }
        debug!("Validated {} events across {} populations", events.len(), registry.len());
        Ok(states)
    }

    fn merge(states: &mut LineageStates, registry: &PopulationRegistry, kind: EventKind, time: f64, id: PopulationId) -> Result<(), DemographyError> {
        if let LineageState::MergedAt(merged_at) = states.get(id) {
            return Err(DemographyError::DoubleMerge{kind, time, population: registry.name(id).to_string(), merged_at})
        }
        states.merge(id, time);
        Ok(())
    }

    fn require_alive(states: &LineageStates, registry: &PopulationRegistry, kind: EventKind, time: f64, id: PopulationId) -> Result<(), DemographyError> {
        match states.get(id) {
            LineageState::Alive             => Ok(()),
            LineageState::MergedAt(merged_at) => {
                Err(DemographyError::ReferencedAfterMerge{kind, time, population: registry.name(id).to_string(), merged_at})
            },
        }
    }

    fn check_proportions(&self, registry: &PopulationRegistry, time: f64, derived: PopulationId, ancestral: &[PopulationId], proportions: &[f64]) -> Result<(), DemographyError> {
        let derived_name = || registry.name(derived).to_string();
        for (id, proportion) in ancestral.iter().zip(proportions) {
            if !(0.0..=1.0).contains(proportion) {
                return Err(DemographyError::ProportionRange{
                    derived   : derived_name(),
                    time,
                    ancestral : registry.name(*id).to_string(),
                    proportion: *proportion,
                })
            }
        }

        let sum: f64 = proportions.iter().sum();
        let tolerance = self.config.proportion_tolerance;
        if (sum - 1.0).abs() > tolerance {
            return Err(DemographyError::ProportionSum{derived: derived_name(), time, sum, tolerance})
        }
        Ok(())
    }
}
