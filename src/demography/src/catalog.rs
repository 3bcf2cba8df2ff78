use log::trace;

use crate::{
    DemographyError,
    event::{Event, EventKind},
    registry::{PopulationId, PopulationRegistry},
};

/// Time-stamped demographic events, kept in declaration order.
///
/// The catalog only checks what can be checked locally (name resolution, time
/// sign, argument shapes). Cross-event consistency is the job of the `Validator`,
/// which requires the time-sorted sequence returned by `finalize()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventCatalog {
    events: Vec<Event>,
}

fn check_time(kind: EventKind, time: f64) -> Result<(), DemographyError> {
    if !time.is_finite() || time < 0.0 {
        return Err(DemographyError::InvalidTime{kind, time})
    }
    Ok(())
}

fn resolve_all(registry: &PopulationRegistry, names: &[&str]) -> Result<Vec<PopulationId>, DemographyError> {
    names.iter().map(|name| registry.id_of(name)).collect()
}

impl EventCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a population split: going backward in time, `derived` merge into `ancestral`.
    ///
    /// # Errors
    /// - `InvalidTime` if `time` is negative or not finite.
    /// - `EmptyDerived` if no derived population is given.
    /// - `UnknownPopulation` if any of the names is not registered.
    pub fn add_split(&mut self, registry: &mut PopulationRegistry, time: f64, derived: &[&str], ancestral: &str) -> Result<(), DemographyError> {
        check_time(EventKind::Split, time)?;
        if derived.is_empty() {
            return Err(DemographyError::EmptyDerived{ancestral: ancestral.to_string(), time})
        }
        let derived   = resolve_all(registry, derived)?;
        let ancestral = registry.id_of(ancestral)?;
        self.push(registry, Event::Split{time, derived, ancestral});
        Ok(())
    }

    /// Declare a bottleneck, or any other size change: `population` has size `new_size`
    /// for times older than `time`.
    ///
    /// # Errors
    /// - `InvalidTime` if `time` is negative or not finite.
    /// - `UnknownPopulation` if `population` is not registered.
    pub fn add_parameter_change(&mut self, registry: &mut PopulationRegistry, time: f64, population: &str, new_size: u64) -> Result<(), DemographyError> {
        check_time(EventKind::ParameterChange, time)?;
        let population = registry.id_of(population)?;
        self.push(registry, Event::ParameterChange{time, population, new_size});
        Ok(())
    }

    /// Declare an admixture: going backward in time, the lineages of `derived` are
    /// distributed among `ancestral` according to `proportions`.
    ///
    /// # Errors
    /// - `InvalidTime` if `time` is negative or not finite.
    /// - `UnknownPopulation` if any of the names is not registered.
    /// - `ProportionCount` if `ancestral` and `proportions` differ in length.
    pub fn add_admixture(&mut self, registry: &mut PopulationRegistry, time: f64, derived: &str, ancestral: &[&str], proportions: &[f64]) -> Result<(), DemographyError> {
        check_time(EventKind::Admixture, time)?;
        let derived_id = registry.id_of(derived)?;
        let ancestral  = resolve_all(registry, ancestral)?;
        if ancestral.len() != proportions.len() {
            return Err(DemographyError::ProportionCount{
                derived    : derived.to_string(),
                time,
                ancestral  : ancestral.len(),
                proportions: proportions.len()
            })
        }
        self.push(registry, Event::Admixture{time, derived: derived_id, ancestral, proportions: proportions.to_vec()});
        Ok(())
    }

    fn push(&mut self, registry: &mut PopulationRegistry, event: Event) {
        let time = event.time();
        for id in event.merged().iter().chain(event.sources()) {
            registry.touch(*id, time);
        }
        trace!("Adding event #{}: {}", self.events.len(), event.display(registry));
        self.events.push(event);
    }

    /// Return the events sorted by ascending time (present to past). Events sharing
    /// the same time keep their declaration order. Internal storage is left untouched,
    /// so this may be called any number of times.
    pub fn finalize(&self) -> Vec<Event> {
        let mut events = self.events.clone();
        events.sort_by(|a, b| a.time().total_cmp(&b.time()));
        events
    }

    /// Events, in declaration order.
    pub fn declared(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
