//! Construction and validation of population histories made of splits, size changes
//! (bottlenecks) and admixture events.
//!
//! Populations are registered within a `PopulationRegistry`, events are declared in any
//! order within an `EventCatalog`, and a `Validator` walks through the time-sorted events
//! once, from the present to the past, to ensure that each lineage merges away at most
//! once, and is never referenced again afterwards. The `Assembler` chains these steps
//! from a flat `DemographyConfig`.

mod error;
pub use error::DemographyError;

pub mod registry;
pub use registry::{Population, PopulationId, PopulationRegistry};

pub mod event;
pub use event::{Event, EventKind};

pub mod catalog;
pub use catalog::EventCatalog;

pub mod validator;
pub use validator::{LineageState, Validator, ValidatorConfig, DEFAULT_PROPORTION_TOLERANCE};

pub mod config;
pub use config::{DemographyConfig, PopulationConfig, SplitConfig, BottleneckConfig, AdmixtureConfig};

mod assembler;
pub use assembler::{Assembler, DemographyBuilder, DemographyModel};

pub mod report;
pub use report::debug_report;

pub mod sampling;
pub use sampling::SamplingConfig;

pub mod demes;
