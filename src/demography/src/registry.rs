use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;
use log::trace;

use crate::DemographyError;

/// Space padding lengths used for `std::fmt::Display` of Population
const NAME_DISPLAY_LEN: usize = 8;
const SIZE_DISPLAY_LEN: usize = 8;

/// Index of a population within its `PopulationRegistry`. Ids are handed out in
/// registration order and never invalidated, since populations cannot be removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PopulationId(pub(crate) usize);

impl PopulationId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A named group of lineages.
/// # Fields:
/// - `name`                : unique label of the population (e.g. "ANC", "A")
/// - `initial_size`        : effective size at time 0, in individuals.
/// - `active_at_present`   : whether the population exists at time 0. Purely ancestral
///                           populations are registered as inactive.
/// - `first_reference_time`: most recent time at which any event mentions this population.
///                           `None` if the population was never referenced.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    pub name                : String,
    pub initial_size        : u64,
    pub active_at_present   : bool,
    pub first_reference_time: Option<f64>,
}

impl Population {
    fn new(name: &str, initial_size: u64, active_at_present: bool) -> Self {
        Self{name: name.to_string(), initial_size, active_at_present, first_reference_time: None}
    }
}

impl Display for Population {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let status = if self.active_at_present {"active"} else {"inactive"};
        let first_ref = match self.first_reference_time {
            Some(time) => time.to_string(),
            None       => "None".to_string(),
        };
        write!(f, "{: <NAME_DISPLAY_LEN$} - size: {: <SIZE_DISPLAY_LEN$} - {status: <8} - first referenced: {first_ref}",
            self.name, self.initial_size
        )
    }
}

/// Set of named populations, kept in registration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationRegistry {
    populations: IndexMap<String, Population>,
}

impl PopulationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new population.
    ///
    /// # Errors
    /// - `DuplicateName` if `name` is already registered.
    /// - `InvalidSize` if `initial_size` is 0.
    pub fn register(&mut self, name: &str, initial_size: u64, active_at_present: bool) -> Result<PopulationId, DemographyError> {
        if self.populations.contains_key(name) {
            return Err(DemographyError::DuplicateName(name.to_string()))
        }
        if initial_size == 0 {
            return Err(DemographyError::InvalidSize{population: name.to_string(), size: initial_size})
        }
        trace!("Registering population {name} (size: {initial_size}, active: {active_at_present})");
        let (index, _) = self.populations.insert_full(name.to_string(), Population::new(name, initial_size, active_at_present));
        Ok(PopulationId(index))
    }

    /// Resolve a population name into its id.
    ///
    /// # Errors
    /// - `UnknownPopulation` if `name` was never registered.
    pub fn id_of(&self, name: &str) -> Result<PopulationId, DemographyError> {
        self.populations.get_index_of(name)
            .map(PopulationId)
            .ok_or_else(|| DemographyError::UnknownPopulation(name.to_string()))
    }

    /// Retrieve a population by name.
    ///
    /// # Errors
    /// - `UnknownPopulation` if `name` was never registered.
    pub fn lookup(&self, name: &str) -> Result<&Population, DemographyError> {
        self.populations.get(name).ok_or_else(|| DemographyError::UnknownPopulation(name.to_string()))
    }

    /// Retrieve a population using its id.
    ///
    /// # Panics
    /// - if `id` was not handed out by this registry.
    pub fn get(&self, id: PopulationId) -> &Population {
        &self.populations[id.0]
    }

    pub fn name(&self, id: PopulationId) -> &str {
        &self.get(id).name
    }

    /// Keep track of the most recent time at which a population gets referenced.
    pub(crate) fn touch(&mut self, id: PopulationId, time: f64) {
        let population = &mut self.populations[id.0];
        population.first_reference_time = Some(match population.first_reference_time {
            Some(previous) => previous.min(time),
            None           => time,
        });
    }

    pub fn len(&self) -> usize {
        self.populations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.populations.is_empty()
    }

    /// Iterate over all populations, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (PopulationId, &Population)> {
        self.populations.values().enumerate().map(|(i, pop)| (PopulationId(i), pop))
    }
}
