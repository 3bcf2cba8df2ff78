use std::{fs::File, path::Path};

use anyhow::Result;
use serde::{Serialize, Deserialize};

use demography::{DemographyConfig, SamplingConfig};
use located_error::LocatedError;
use parser::{ModelT1, MigrantsToSources};

/// A demographic model, along with the individuals to sample at present.
///
/// # Example (YAML)
/// ```yaml
/// populations:
///   - {name: A, initial_size: 10000}
///   - {name: ANC, initial_size: 10000, active_at_present: false}
/// splits:
///   - {time: 1000, derived: [A], ancestral: ANC}
/// samples:
///   A: 50
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(flatten)]
    pub demography: DemographyConfig,
    #[serde(default)]
    pub samples: SamplingConfig,
}

impl Scenario {
    /// Load a scenario from a `.yaml` file.
    ///
    /// # Errors
    /// - if `path` cannot be opened, or does not describe a valid `Scenario`.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        let file = File::open(path).with_loc(|| format!("Failed to open model definition {}", path.display()))?;
        serde_yaml::from_reader(file).with_loc(|| format!("Failed to parse model definition {}", path.display()))
    }
}

/// Three-population model: A and B split from ANC, C receives ancestry from both.
pub fn model_t1(args: &ModelT1) -> Scenario {
    let mut demography = DemographyConfig::default();
    demography.population("A", args.pop_size_a, true)
        .population("B", args.pop_size_b, true)
        .population("C", args.pop_size_c, true)
        .population("ANC", args.pop_size_anc, false)
        .split(args.anc_split, &["A", "B"], "ANC")
        .bottleneck(args.btln_time_a, "A", args.post_btln_size_a)
        .bottleneck(args.btln_time_b, "B", args.post_btln_size_b)
        .admixture(args.admg_c, "C", &["A", "B"], &[args.prop_a, args.prop_b])
        .bottleneck(args.btln_time_c, "C", args.post_btln_size_c);

    let mut samples = SamplingConfig::new();
    samples.sample("A", args.ind_sampled_a)
        .sample("B", args.ind_sampled_b)
        .sample("C", args.ind_sampled_c);
    Scenario{demography, samples}
}

/// Eight-population model: ANC splits into X and Y, Y into K and J. A and B receive
/// migrants from X, and C receives ancestry from A and B.
pub fn migrants_to_sources(args: &MigrantsToSources) -> Scenario {
    let mut demography = DemographyConfig::default();
    demography.population("ANC", args.pop_size_anc, false)
        .population("X", args.pop_size_x, true)
        .population("Y", args.pop_size_y, false)
        .population("K", args.pop_size_k, true)
        .population("J", args.pop_size_j, true)
        .population("A", args.pop_size_a, true)
        .population("B", args.pop_size_b, true)
        .population("C", args.pop_size_c, true)
        .split(args.anc_split, &["X", "Y"], "ANC")
        .split(args.split_y, &["K", "J"], "Y")
        .bottleneck(args.btln_time_a, "A", args.post_btln_size_a)
        .bottleneck(args.btln_time_b, "B", args.post_btln_size_b)
        .bottleneck(args.btln_time_c, "C", args.post_btln_size_c)
        .bottleneck(args.btln_time_x, "X", args.post_btln_size_x)
        .admixture(args.admg_a, "A", &["X", "K"], &[args.prop_x_a, args.prop_k_a])
        .admixture(args.admg_b, "B", &["X", "J"], &[args.prop_x_b, args.prop_j_b])
        .admixture(args.admg_c, "C", &["A", "B"], &[args.prop_a, args.prop_b]);

    let mut samples = SamplingConfig::new();
    samples.sample("A", args.ind_sampled_a)
        .sample("B", args.ind_sampled_b)
        .sample("C", args.ind_sampled_c);
    Scenario{demography, samples}
}
