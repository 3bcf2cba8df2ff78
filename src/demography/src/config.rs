use serde::{Serialize, Deserialize};

fn active_by_default() -> bool {
    true
}

/// A population declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    pub name: String,
    pub initial_size: u64,
    #[serde(default = "active_by_default")]
    pub active_at_present: bool,
}

/// Going backward in time, `derived` merge into `ancestral` at `time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    pub time: f64,
    pub derived: Vec<String>,
    pub ancestral: String,
}

/// `population` has size `new_size` for times older than `time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckConfig {
    pub time: f64,
    pub population: String,
    pub new_size: u64,
}

/// Going backward in time, `derived` is distributed among `ancestral`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmixtureConfig {
    pub time: f64,
    pub derived: String,
    pub ancestral: Vec<String>,
    pub proportions: Vec<f64>,
}

/// Flat description of a population history, as handed to `Assembler::build()`.
///
/// Declaration order within each section is preserved, but does not need to follow
/// time: events are sorted once every declaration has been registered.
///
/// # Example (YAML)
/// ```yaml
/// populations:
///   - {name: A, initial_size: 10000}
///   - {name: B, initial_size: 10000}
///   - {name: ANC, initial_size: 10000, active_at_present: false}
/// splits:
///   - {time: 1000, derived: [A, B], ancestral: ANC}
/// bottlenecks:
///   - {time: 65, population: A, new_size: 1000}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemographyConfig {
    pub populations: Vec<PopulationConfig>,
    #[serde(default)]
    pub splits: Vec<SplitConfig>,
    #[serde(default)]
    pub bottlenecks: Vec<BottleneckConfig>,
    #[serde(default)]
    pub admixtures: Vec<AdmixtureConfig>,
}

impl DemographyConfig {
    pub fn population(&mut self, name: &str, initial_size: u64, active_at_present: bool) -> &mut Self {
        self.populations.push(PopulationConfig{name: name.to_string(), initial_size, active_at_present});
        self
    }

    pub fn split(&mut self, time: f64, derived: &[&str], ancestral: &str) -> &mut Self {
        let derived = derived.iter().map(ToString::to_string).collect();
        self.splits.push(SplitConfig{time, derived, ancestral: ancestral.to_string()});
        self
    }

    pub fn bottleneck(&mut self, time: f64, population: &str, new_size: u64) -> &mut Self {
        self.bottlenecks.push(BottleneckConfig{time, population: population.to_string(), new_size});
        self
    }

    pub fn admixture(&mut self, time: f64, derived: &str, ancestral: &[&str], proportions: &[f64]) -> &mut Self {
        let ancestral = ancestral.iter().map(ToString::to_string).collect();
        self.admixtures.push(AdmixtureConfig{time, derived: derived.to_string(), ancestral, proportions: proportions.to_vec()});
        self
    }
}
