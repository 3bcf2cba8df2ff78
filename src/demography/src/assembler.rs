use log::{debug, info};

use crate::{
    DemographyError,
    config::DemographyConfig,
    catalog::EventCatalog,
    event::Event,
    registry::{Population, PopulationId, PopulationRegistry},
    validator::{LineageState, LineageStates, Validator, ValidatorConfig},
};

/// A finalized, validated population history.
///
/// Events are sorted by ascending time, and every population's final lineage state
/// (merged away, or extant to the root) is known. The model is immutable: collaborators
/// only ever receive a shared reference to it.
#[derive(Debug, Clone, PartialEq)]
pub struct DemographyModel {
    registry: PopulationRegistry,
    events  : Vec<Event>,
    states  : LineageStates,
}

impl DemographyModel {
    pub fn registry(&self) -> &PopulationRegistry {
        &self.registry
    }

    /// Events, sorted by ascending time.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn populations(&self) -> impl Iterator<Item = (PopulationId, &Population)> {
        self.registry.iter()
    }

    pub fn lineage_state(&self, id: PopulationId) -> LineageState {
        self.states.get(id)
    }

    /// Final state of a population, by name.
    ///
    /// # Errors
    /// - `UnknownPopulation` if `name` is not registered within this model.
    pub fn state_of(&self, name: &str) -> Result<LineageState, DemographyError> {
        Ok(self.states.get(self.registry.id_of(name)?))
    }
}

/// Two-phase construction of a `DemographyModel`: declare populations and events in any
/// order, then `finalize()` to sort and validate them.
#[derive(Debug, Clone, Default)]
pub struct DemographyBuilder {
    registry: PopulationRegistry,
    catalog : EventCatalog,
}

impl DemographyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, initial_size: u64, active_at_present: bool) -> Result<PopulationId, DemographyError> {
        self.registry.register(name, initial_size, active_at_present)
    }

    pub fn add_split(&mut self, time: f64, derived: &[&str], ancestral: &str) -> Result<&mut Self, DemographyError> {
        self.catalog.add_split(&mut self.registry, time, derived, ancestral)?;
        Ok(self)
    }

    pub fn add_parameter_change(&mut self, time: f64, population: &str, new_size: u64) -> Result<&mut Self, DemographyError> {
        self.catalog.add_parameter_change(&mut self.registry, time, population, new_size)?;
        Ok(self)
    }

    pub fn add_admixture(&mut self, time: f64, derived: &str, ancestral: &[&str], proportions: &[f64]) -> Result<&mut Self, DemographyError> {
        self.catalog.add_admixture(&mut self.registry, time, derived, ancestral, proportions)?;
        Ok(self)
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    /// Sort the declared events and validate them.
    ///
    /// # Errors
    /// - any validation error raised by `Validator::validate()`
    pub fn finalize(&self, config: ValidatorConfig) -> Result<DemographyModel, DemographyError> {
        let events = self.catalog.finalize();
        let states = Validator::new(config).validate(&self.registry, &events)?;
        Ok(DemographyModel{registry: self.registry.clone(), events, states})
    }
}

fn as_strs(names: &[String]) -> Vec<&str> {
    names.iter().map(String::as_str).collect()
}

/// Turns a flat `DemographyConfig` into a validated `DemographyModel`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Assembler {
    validator: ValidatorConfig,
}

impl Assembler {
    pub fn new(validator: ValidatorConfig) -> Self {
        Self{validator}
    }

    /// Register every population, declare splits, then bottlenecks, then admixtures, and
    /// finalize the model.
    ///
    /// # Errors
    /// - the first registration error (`DuplicateName`, `InvalidSize`, `UnknownPopulation`, ...)
    /// - the first validation error, in ascending time order.
    pub fn build(&self, config: &DemographyConfig) -> Result<DemographyModel, DemographyError> {
        let mut builder = DemographyBuilder::new();
        for population in &config.populations {
            builder.register(&population.name, population.initial_size, population.active_at_present)?;
        }

        for split in &config.splits {
            builder.add_split(split.time, &as_strs(&split.derived), &split.ancestral)?;
        }

        for bottleneck in &config.bottlenecks {
            builder.add_parameter_change(bottleneck.time, &bottleneck.population, bottleneck.new_size)?;
        }

        for admixture in &config.admixtures {
            builder.add_admixture(admixture.time, &admixture.derived, &as_strs(&admixture.ancestral), &admixture.proportions)?;
        }

        debug!("Declared {} populations and {} events", config.populations.len(), builder.catalog().len());
        let model = builder.finalize(self.validator)?;
        info!("Demography successfully validated ({} populations, {} events)", model.registry().len(), model.events().len());
        Ok(model)
    }
}
