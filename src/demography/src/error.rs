use thiserror::Error;

use crate::event::EventKind;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DemographyError {
    // ---- Registration errors.
    #[error("Population '{0}' is already registered")]
    DuplicateName(String),

    #[error("Unknown population '{0}': it was never registered")]
    UnknownPopulation(String),

    #[error("Invalid size for population '{population}': sizes must be greater than 0 (got {size})")]
    InvalidSize{population: String, size: u64},

    #[error("Invalid time for {kind} event: times must be finite and >= 0 (got {time})")]
    InvalidTime{kind: EventKind, time: f64},

    #[error("Admixture of '{derived}' at time {time}: got {ancestral} ancestral populations but {proportions} proportions")]
    ProportionCount{derived: String, time: f64, ancestral: usize, proportions: usize},

    #[error("Population split into '{ancestral}' at time {time} does not define any derived population")]
    EmptyDerived{ancestral: String, time: f64},

    // ---- Validation errors.
    #[error("{kind} at time {time}: '{population}' was already merged away at time {merged_at}, and cannot merge twice")]
    DoubleMerge{kind: EventKind, time: f64, population: String, merged_at: f64},

    #[error("{kind} at time {time}: '{population}' is referenced after it merged away at time {merged_at}")]
    ReferencedAfterMerge{kind: EventKind, time: f64, population: String, merged_at: f64},

    #[error("Admixture of '{derived}' at time {time}: proportions sum to {sum}, which is not within {tolerance} of 1.0")]
    ProportionSum{derived: String, time: f64, sum: f64, tolerance: f64},

    #[error("Admixture of '{derived}' at time {time}: proportion {proportion} for '{ancestral}' does not lie within [0, 1]")]
    ProportionRange{derived: String, time: f64, ancestral: String, proportion: f64},

    // ---- Export errors.
    #[error("'{population}' would only exist between times {end_time} and {start_time}: lineages need a lifespan of positive length")]
    EmptyLifespan{population: String, start_time: f64, end_time: f64},

    // ---- Sampling errors.
    #[error("Cannot sample individuals from '{0}': population is not active at present")]
    SampleInactive(String),

    #[error("Sampling configuration does not request any individual")]
    EmptySampling,
}
