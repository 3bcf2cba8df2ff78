//! Coalescent simulation of a validated `DemographyModel`.
//!
//! The `SimulationDriver` checks the sampling scheme and numeric parameters, then hands the
//! model to an `AncestryEngine`, a `MutationEngine` and a `VariantWriter`. `ProcessEngine` and
//! `TskitVcfWriter` implement these collaborators by spawning msprime-compatible and
//! tskit-compatible command line programs.

mod error;
pub use error::{DriverError, EngineError};

pub mod engine;
pub use engine::{AncestryEngine, MutationEngine, VariantWriter, Genealogy, MutatedGenealogy, SimulationParams};

pub mod process;
pub use process::{ProcessEngine, TskitVcfWriter};

mod driver;
pub use driver::SimulationDriver;
