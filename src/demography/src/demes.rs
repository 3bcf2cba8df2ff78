//! Export of a `DemographyModel` into the demes interchange format.
//!
//! See: <https://popsim-consortium.github.io/demes-spec-docs>
//!
//! Demes describe populations forward in time: each deme starts at `start_time`
//! (backward time at which it appears, i.e. where our model merges it away) and
//! lists its size epochs from the oldest to the most recent one.

use std::{io::Write, path::Path, fs::File};

use located_error::prelude::*;
use serde::Serialize;

use crate::{
    DemographyError,
    DemographyModel,
    event::Event,
    registry::PopulationId,
    validator::LineageState,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemesGraph {
    pub description: String,
    pub time_units : String,
    pub demes      : Vec<Deme>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deme {
    pub name       : String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time : Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ancestors  : Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub proportions: Vec<f64>,
    pub epochs     : Vec<Epoch>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Epoch {
    pub end_time  : f64,
    pub start_size: u64,
}

impl DemographyModel {
    /// Convert this model into a demes graph.
    ///
    /// - a population merged away at time `t` starts at `t`, with the ancestors (and
    ///   proportions) of the event that merged it. Others are roots, with an infinite start time.
    /// - a population that is inactive at present ends at the most recent time it is used as
    ///   an ancestral source. Others extend to the present.
    /// - size changes falling within that lifespan become epochs. The size in effect when the
    ///   population ends is the one of its most recent epoch.
    /// - demes are listed ancestors first: roots, then by decreasing start time. Ties keep
    ///   the registration order.
    ///
    /// # Errors
    /// - `EmptyLifespan` if a population merges away at the time it ends, or at the time it is
    ///   used as an ancestral source.
    pub fn to_demes(&self) -> Result<DemesGraph, DemographyError> {
        let mut demes = self.populations()
            .map(|(id, _)| self.deme(id))
            .collect::<Result<Vec<Deme>, _>>()?;
        demes.sort_by(|a, b| {
            let start = |deme: &Deme| deme.start_time.unwrap_or(f64::INFINITY);
            start(b).total_cmp(&start(a))
        });

        Ok(DemesGraph{
            description: String::from("admixsim-rs demographic model"),
            time_units : String::from("generations"),
            demes
        })
    }

    fn deme(&self, id: PopulationId) -> Result<Deme, DemographyError> {
        let population = self.registry().get(id);
        let names = |ids: &[PopulationId]| -> Vec<String> {
            ids.iter().map(|id| self.registry().name(*id).to_string()).collect()
        };

        // ---- Where does this population come from, forward in time ?
        let (start_time, ancestors, proportions) = match self.lineage_state(id) {
            LineageState::Alive => (None, Vec::new(), Vec::new()),
            LineageState::MergedAt(time) => {
                let origin = self.events().iter().find(|event| event.merged().contains(&id));
                match origin {
                    Some(Event::Admixture{ancestral, proportions, ..}) => (Some(time), names(ancestral), proportions.clone()),
                    Some(event) => (Some(time), names(event.sources()), Vec::new()),
                    None        => (Some(time), Vec::new(), Vec::new()),
                }
            },
        };

        // ---- When does it end ?
        let last_use = self.events().iter()
            .filter(|event| !matches!(event, Event::ParameterChange{..}) && event.sources().contains(&id))
            .map(Event::time)
            .next();
        let end_time = match population.active_at_present {
            true  => 0.0,
            false => last_use.unwrap_or(0.0),
        };

        if let Some(start_time) = start_time {
            let end_time = last_use.map_or(end_time, |time| time.max(end_time));
            if start_time <= end_time {
                return Err(DemographyError::EmptyLifespan{population: population.name.clone(), start_time, end_time})
            }
        }

        // ---- Size epochs, from oldest to most recent.
        let upper = start_time.unwrap_or(f64::INFINITY);
        let mut size_at_end = population.initial_size;
        let mut changes: Vec<(f64, u64)> = Vec::new();
        for event in self.events() {
            let Event::ParameterChange{time, population: target, new_size} = event else { continue };
            if *target != id || *time >= upper {
                continue
            }
            if *time <= end_time {
                size_at_end = *new_size;
            } else if let Some(last) = changes.last_mut().filter(|(last, _)| last == time) {
                last.1 = *new_size;
            } else {
                changes.push((*time, *new_size));
            }
        }

        let mut epochs: Vec<Epoch> = changes.iter().rev()
            .map(|(time, size)| Epoch{end_time: *time, start_size: *size})
            .collect();
        epochs.push(Epoch{end_time, start_size: size_at_end});

        Ok(Deme{name: population.name.clone(), start_time, ancestors, proportions, epochs})
    }

    /// Serialize this model as a demes YAML document.
    pub fn write_demes<W: Write>(&self, writer: W) -> Result<()> {
        let graph = self.to_demes().loc("While converting demography into demes format")?;
        serde_yaml::to_writer(writer, &graph).loc("While serializing demography into demes format")
    }

    /// Serialize this model as a demes YAML file. Nothing is written if the model cannot be
    /// expressed as a demes graph.
    pub fn write_demes_file(&self, path: &Path) -> Result<()> {
        let graph = self.to_demes().loc("While converting demography into demes format")?;
        let file  = File::create(path).with_loc(|| format!("Failed to create demes file {}", path.display()))?;
        serde_yaml::to_writer(file, &graph).loc("While serializing demography into demes format")
    }
}
