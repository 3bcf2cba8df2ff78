use std::fmt::{self, Display, Formatter};

use itertools::Itertools;

use crate::registry::{PopulationId, PopulationRegistry};

/// Discriminant of an `Event`, used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Split,
    ParameterChange,
    Admixture,
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Split           => write!(f, "Population split"),
            Self::ParameterChange => write!(f, "Parameter change"),
            Self::Admixture       => write!(f, "Admixture"),
        }
    }
}

/// A time-stamped demographic event. Times are measured backward from the present
/// (0 = present, larger = older).
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Going backward in time, every `derived` population merges into `ancestral`.
    Split {time: f64, derived: Vec<PopulationId>, ancestral: PopulationId},

    /// `population`'s effective size becomes `new_size` for times older than `time`.
    ParameterChange {time: f64, population: PopulationId, new_size: u64},

    /// Going backward in time, the lineages of `derived` are distributed among
    /// `ancestral` according to `proportions`.
    Admixture {time: f64, derived: PopulationId, ancestral: Vec<PopulationId>, proportions: Vec<f64>},
}

impl Event {
    pub fn time(&self) -> f64 {
        match self {
            Self::Split{time, ..} | Self::ParameterChange{time, ..} | Self::Admixture{time, ..} => *time
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::Split{..}           => EventKind::Split,
            Self::ParameterChange{..} => EventKind::ParameterChange,
            Self::Admixture{..}       => EventKind::Admixture,
        }
    }

    /// Populations which stop existing as independent lineages at this event.
    pub fn merged(&self) -> &[PopulationId] {
        match self {
            Self::Split{derived, ..}          => derived,
            Self::Admixture{derived, ..}      => std::slice::from_ref(derived),
            Self::ParameterChange{..}         => &[],
        }
    }

    /// Populations which must still be alive once this event has been applied.
    pub fn sources(&self) -> &[PopulationId] {
        match self {
            Self::Split{ancestral, ..}          => std::slice::from_ref(ancestral),
            Self::Admixture{ancestral, ..}      => ancestral,
            Self::ParameterChange{population, ..} => std::slice::from_ref(population),
        }
    }

    /// Borrow a displayable version of this event, resolving population ids into names.
    pub fn display<'a>(&'a self, registry: &'a PopulationRegistry) -> EventDisplay<'a> {
        EventDisplay{event: self, registry}
    }
}

/// `Display` adapter for an `Event`, tied to the registry it was declared against.
pub struct EventDisplay<'a> {
    event   : &'a Event,
    registry: &'a PopulationRegistry,
}

impl Display for EventDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = |id: &PopulationId| self.registry.name(*id);
        let kind = self.event.kind().to_string();
        write!(f, "{: <10} - {: <16} - ", self.event.time(), kind)?;
        match self.event {
            Event::Split{derived, ancestral, ..} => {
                write!(f, "[{}] -> {}", derived.iter().map(name).join(", "), name(ancestral))
            },
            Event::ParameterChange{population, new_size, ..} => {
                write!(f, "{} -> size: {new_size}", name(population))
            },
            Event::Admixture{derived, ancestral, proportions, ..} => {
                let sources = ancestral.iter().zip(proportions)
                    .map(|(id, prop)| format!("{}: {prop}", name(id)))
                    .join(", ");
                write!(f, "{} -> [{sources}]", name(derived))
            },
        }
    }
}
