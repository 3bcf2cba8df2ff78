use std::{
    fs::File,
    path::{Path, PathBuf},
    ffi::OsStr,
};

use located_error::*;

use clap::{Parser, Subcommand};
use serde::{Serialize, Deserialize};
use log::debug;
use anyhow::Result;

mod error;
pub use error::ParserError;

#[derive(Parser, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[clap(name="admixsim", author, version, about, long_about = None)]
#[clap(propagate_version = true)]
/// admixsim-rs: validated demographic models for admixture coalescent simulations
pub struct Cli {
    ///Set the verbosity level (-v -vv -vvv)
    ///
    /// Set the verbosity level of this program. Multiple levels allowed {n}
    ///
    /// -v: Info  |  -vv: Debug  | -vvv: Trace {n}
    ///
    /// Note that the program will still output warnings by default, even when this flag is off.
    /// Use The --quiet/-q to disable them
    #[clap(short='v', long, parse(from_occurrences), global=true)]
    pub verbose: u8,

    /// Disable warnings.
    ///
    /// By default, warnings are emmited and redirected to the console, even when verbose mode is off.
    /// Use this argument to disable this. Only errors will be displayed.
    #[clap(short='q', long, global=true)]
    pub quiet: bool,

    #[clap(subcommand)]
    pub commands: Commands,
}

impl Cli{
    /// Serialize command line arguments within a `.yaml` file.
    ///
    /// # Behavior
    /// - File naming follows the convention '{current time}-{subcommand}.yaml'. current time follows the format
    ///   `YYYY`-`MM`-`DD`T`hhmmss`
    /// - File is written within the directory of the user-provided `--output` file.
    /// - `from-yaml` runs are not serialized again.
    ///
    /// # Errors
    /// - if `serde_yaml` fails to parse `Self` to a string.
    /// - if the serialized arguments cannot be written.
    pub fn serialize(&self) -> Result<Option<PathBuf>> {
        let Some(common) = self.commands.common() else {
            return Ok(None)
        };

        let serialized = serde_yaml::to_string(&self)
            .map_err(ParserError::Serialize)
            .loc("While serializing command line arguments")?;
        debug!("\n---- Command line args ----\n{}\n---", serialized);

        let current_time = chrono::offset::Local::now().format("%Y-%m-%dT%H%M%S").to_string();
        let output_file  = common.output_dir().join(format!("{current_time}-{}.yaml", self.commands.name()));

        std::fs::write(&output_file, serialized)
            .with_loc(|| format!("Unable to serialize arguments into {}", output_file.display()))?;
        Ok(Some(output_file))
    }

    /// Deserialize a `.yaml` file into Command line arguments.
    ///
    /// # Errors
    ///
    /// - Returns `FileNotFound` or `PermissionDenied` if the provided `.yaml` is invalid,
    ///   or does not carry read permissions
    /// - Returns `ParserError::Deserialize` if `serde_yaml` fails to parse the provided file to `Self`.
    pub fn deserialize(yaml: &Path) -> Result<Self> {
        let file = File::open(yaml).with_loc(|| format!("Failed to open {}", yaml.display()))?;
        serde_yaml::from_reader(file)
            .map_err(|err| ParserError::Deserialize(yaml.display().to_string(), err))
            .loc("While parsing a previously serialized command line")
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Commands {
    /// Three-population model: A and B split from ANC, C is an admixture of A and B.
    ModelT1 {
        #[clap(flatten)]
        common: Common,
        #[clap(flatten)]
        model: ModelT1,
    },

    /// Eight-population model, with same-population migrants to the sources of the admixture.
    ///
    /// ANC splits into X and Y, Y splits into K and J. A is an admixture of X and K, B an admixture
    /// of X and J, and C an admixture of A and B.
    MigrantsToSources {
        #[clap(flatten)]
        common: Common,
        #[clap(flatten)]
        model: Box<MigrantsToSources>, // Box<T> to mitigate the large size difference between variants.
    },

    /// Simulate an arbitrary demographic model, described within a .yaml file.
    Custom {
        #[clap(flatten)]
        common: Common,
        #[clap(flatten)]
        custom: Custom,
    },

    /// Run admixsim-rs using a previously generated .yaml configuration file.
    ///
    /// This allows users to easily re-apply an admixsim-rs command using the exact same parameters
    /// and arguments (including the random seed).
    FromYaml {
        yaml: PathBuf,
    },
}

impl Commands {
    /// kebab-case name of this subcommand.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ModelT1{..}           => "model-t1",
            Self::MigrantsToSources{..} => "migrants-to-sources",
            Self::Custom{..}            => "custom",
            Self::FromYaml{..}          => "from-yaml",
        }
    }

    /// Shared simulation arguments of this subcommand. `None` for `from-yaml`.
    pub fn common(&self) -> Option<&Common> {
        match self {
            Self::ModelT1{common, ..} | Self::MigrantsToSources{common, ..} | Self::Custom{common, ..} => Some(common),
            Self::FromYaml{..} => None,
        }
    }
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Parser, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Common {
    /// Output VCF file.
    ///
    /// Serialized command line arguments are written within the same directory.
    #[clap(short, long, default_value("default_output.vcf"))]
    pub output: PathBuf,

    /// Length of the simulated sequence, in base pairs.
    #[clap(short='L', long, default_value_t=2.5e8)]
    pub sequence_length: f64,

    /// Per-base, per-generation recombination rate.
    #[clap(short='r', long, default_value_t=1.25e-8)]
    pub recombination_rate: f64,

    /// Per-base, per-generation mutation rate.
    #[clap(short='u', long, default_value_t=1e-8)]
    pub mutation_rate: f64,

    /// Maximal tolerated deviation from 1.0 of the sum of admixture proportions.
    #[clap(long, default_value_t=1e-6)]
    pub proportion_tolerance: f64,

    /// Provide the simulation engine with a set seed.
    #[clap(long, required(false), default_value_t=fastrand::u32(1..u32::MAX))]
    pub seed: u32,

    /// Build, validate and report the demographic model, without running any simulation.
    #[clap(long)]
    pub dry_run: bool,

    /// Write a human-readable report of the demographic model in this file.
    ///
    /// A tab-separated table of the events is written alongside, with the '.events.tsv' extension.
    #[clap(long)]
    pub report: Option<PathBuf>,

    /// Overwrite existing output files.
    ///
    /// By default, admixsim-rs does not allow itself from overwriting existing results files. Use this flag
    /// to force this behaviour.
    #[clap(short='w', long)]
    pub overwrite: bool,

    /// Path to an msprime-compatible command line program (providing 'ancestry' and 'mutations').
    #[clap(long, default_value("msp"))]
    pub msp_bin: PathBuf,

    /// Path to a tskit-compatible command line program (providing 'vcf').
    #[clap(long, default_value("tskit"))]
    pub tskit_bin: PathBuf,
}

impl Common {
    /// Directory where the output file, and serialized arguments are written.
    pub fn output_dir(&self) -> PathBuf {
        match self.output.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Path of the events table written alongside `--report`.
    pub fn events_table(&self) -> Option<PathBuf> {
        self.report.as_ref().map(|report| report.with_extension("events.tsv"))
    }

    /// Check if a given file already exists ; raise an error if such is the case, and the user did not explicitly
    /// allow file overwriting.
    ///
    /// # Errors
    /// - If the provided `pathbuf` already exists and the user did not specifically allow for file
    ///   overwrite using the `--overwrite` argument
    pub fn can_write_file(&self, pathbuf: &Path) -> Result<bool> {
        if ! self.overwrite && pathbuf.exists() {
            return Err(ParserError::CannotOverwrite(pathbuf.display().to_string()))
                .loc( "While parsing command line arguments" )
        }
        Ok(true)
    }
}

/// Three-population model.
#[derive(Parser, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelT1 {
    /// Size of the ancestral population ANC.
    #[clap(long, default_value_t=10_000)]
    pub pop_size_anc: u64,
    /// Time of the split of ANC into A and B (generations ago).
    #[clap(long, default_value_t=1000.0)]
    pub anc_split: f64,

    /// Size of population A.
    #[clap(long, default_value_t=10_000)]
    pub pop_size_a: u64,
    /// Post-bottleneck size of population A.
    #[clap(long, default_value_t=1000)]
    pub post_btln_size_a: u64,
    /// Bottleneck time of population A.
    #[clap(long, default_value_t=65.0)]
    pub btln_time_a: f64,
    /// Number of individuals sampled in population A.
    #[clap(long, default_value_t=50)]
    pub ind_sampled_a: u64,

    /// Size of population B.
    #[clap(long, default_value_t=10_000)]
    pub pop_size_b: u64,
    /// Post-bottleneck size of population B.
    #[clap(long, default_value_t=1000)]
    pub post_btln_size_b: u64,
    /// Bottleneck time of population B.
    #[clap(long, default_value_t=65.0)]
    pub btln_time_b: f64,
    /// Number of individuals sampled in population B.
    #[clap(long, default_value_t=50)]
    pub ind_sampled_b: u64,

    /// Size of the admixed population C.
    #[clap(long, default_value_t=10_000)]
    pub pop_size_c: u64,
    /// Proportion of C's ancestry coming from A.
    #[clap(long, default_value_t=0.7)]
    pub prop_a: f64,
    /// Proportion of C's ancestry coming from B.
    #[clap(long, default_value_t=0.3)]
    pub prop_b: f64,
    /// Admixture time of C.
    #[clap(long, default_value_t=25.0)]
    pub admg_c: f64,
    /// Post-bottleneck size of population C.
    #[clap(long, default_value_t=3500)]
    pub post_btln_size_c: u64,
    /// Bottleneck time of population C.
    #[clap(long, default_value_t=20.0)]
    pub btln_time_c: f64,
    /// Number of individuals sampled in population C.
    #[clap(long, default_value_t=350)]
    pub ind_sampled_c: u64,
}

/// Eight-population model.
#[derive(Parser, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrantsToSources {
    /// Size of the ancestral population ANC.
    #[clap(long, default_value_t=10_000)]
    pub pop_size_anc: u64,
    /// Time of the split of ANC into X and Y.
    #[clap(long, default_value_t=80.0)]
    pub anc_split: f64,

    /// Size of population X.
    #[clap(long, default_value_t=10_000)]
    pub pop_size_x: u64,
    /// Bottleneck time of population X.
    #[clap(long, default_value_t=75.0)]
    pub btln_time_x: f64,
    /// Post-bottleneck size of population X.
    #[clap(long, default_value_t=1000)]
    pub post_btln_size_x: u64,

    /// Size of population Y.
    #[clap(long, default_value_t=10_000)]
    pub pop_size_y: u64,
    /// Time of the split of Y into K and J.
    #[clap(long, alias("split-x"), default_value_t=70.0)]
    pub split_y: f64,
    /// Size of population K.
    #[clap(long, default_value_t=10_000)]
    pub pop_size_k: u64,
    /// Size of population J.
    #[clap(long, default_value_t=10_000)]
    pub pop_size_j: u64,

    /// Size of population A.
    #[clap(long, default_value_t=10_000)]
    pub pop_size_a: u64,
    /// Post-bottleneck size of population A.
    #[clap(long, default_value_t=1000)]
    pub post_btln_size_a: u64,
    /// Bottleneck time of population A.
    #[clap(long, default_value_t=50.0)]
    pub btln_time_a: f64,
    /// Number of individuals sampled in population A.
    #[clap(long, default_value_t=50)]
    pub ind_sampled_a: u64,
    /// Proportion of A's ancestry coming from X.
    #[clap(long, default_value_t=0.1)]
    pub prop_x_a: f64,
    /// Proportion of A's ancestry coming from K.
    #[clap(long, default_value_t=0.9)]
    pub prop_k_a: f64,
    /// Admixture time of A.
    #[clap(long, default_value_t=60.0)]
    pub admg_a: f64,

    /// Size of population B.
    #[clap(long, default_value_t=10_000)]
    pub pop_size_b: u64,
    /// Post-bottleneck size of population B.
    #[clap(long, default_value_t=1000)]
    pub post_btln_size_b: u64,
    /// Bottleneck time of population B.
    #[clap(long, default_value_t=50.0)]
    pub btln_time_b: f64,
    /// Number of individuals sampled in population B.
    #[clap(long, default_value_t=50)]
    pub ind_sampled_b: u64,
    /// Proportion of B's ancestry coming from X.
    #[clap(long, default_value_t=0.1)]
    pub prop_x_b: f64,
    /// Proportion of B's ancestry coming from J.
    #[clap(long, default_value_t=0.9)]
    pub prop_j_b: f64,
    /// Admixture time of B.
    #[clap(long, default_value_t=60.0)]
    pub admg_b: f64,

    /// Size of the admixed population C.
    #[clap(long, default_value_t=10_000)]
    pub pop_size_c: u64,
    /// Proportion of C's ancestry coming from A.
    #[clap(long, default_value_t=0.7)]
    pub prop_a: f64,
    /// Proportion of C's ancestry coming from B.
    #[clap(long, default_value_t=0.3)]
    pub prop_b: f64,
    /// Admixture time of C.
    #[clap(long, default_value_t=25.0)]
    pub admg_c: f64,
    /// Post-bottleneck size of population C.
    #[clap(long, default_value_t=3500)]
    pub post_btln_size_c: u64,
    /// Bottleneck time of population C.
    #[clap(long, default_value_t=20.0)]
    pub btln_time_c: f64,
    /// Number of individuals sampled in population C.
    #[clap(long, default_value_t=350)]
    pub ind_sampled_c: u64,
}

/// Arbitrary model
#[derive(Parser, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Custom {
    /// Input .yaml model definition, listing 'populations', 'splits', 'bottlenecks', 'admixtures'
    /// and 'samples'.
    #[clap(short, long, parse(try_from_os_str=valid_input_file))]
    pub config: PathBuf,
}

fn valid_input_file(s: &OsStr) -> Result<PathBuf> {
    let path = PathBuf::from(s);
    if ! path.exists() {
        return Err(ParserError::MissingFile(path.display().to_string()))
            .loc("While checking for file validity")
    }
    if ! path.is_file() {
        return Err(ParserError::NotAFile(path.display().to_string()))
            .loc("While checking for file validity")
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("Failed to parse command line")
    }

    #[test]
    fn model_t1_defaults() {
        let cli = parse(&["admixsim", "model-t1"]);
        let Commands::ModelT1{common, model} = cli.commands else {
            panic!("Expected model-t1")
        };
        assert_eq!(common.output, PathBuf::from("default_output.vcf"));
        assert_eq!(common.sequence_length, 2.5e8);
        assert_eq!(common.recombination_rate, 1.25e-8);
        assert_eq!(common.mutation_rate, 1e-8);
        assert_eq!(common.proportion_tolerance, 1e-6);
        assert!(common.seed >= 1);
        assert!(!common.dry_run);
        assert_eq!(common.msp_bin, PathBuf::from("msp"));

        assert_eq!((model.pop_size_anc, model.anc_split), (10_000, 1000.0));
        assert_eq!((model.post_btln_size_a, model.btln_time_a, model.ind_sampled_a), (1000, 65.0, 50));
        assert_eq!((model.prop_a, model.prop_b, model.admg_c), (0.7, 0.3, 25.0));
        assert_eq!((model.post_btln_size_c, model.btln_time_c, model.ind_sampled_c), (3500, 20.0, 350));
    }

    #[test]
    fn migrants_to_sources_defaults() {
        let cli = parse(&["admixsim", "migrants-to-sources", "--split-x", "72", "--prop-k-a", "0.8"]);
        let Commands::MigrantsToSources{model, ..} = cli.commands else {
            panic!("Expected migrants-to-sources")
        };
        assert_eq!((model.anc_split, model.split_y, model.btln_time_x), (80.0, 72.0, 75.0));
        assert_eq!((model.prop_x_a, model.prop_k_a, model.admg_a), (0.1, 0.8, 60.0));
        assert_eq!((model.prop_x_b, model.prop_j_b, model.admg_b), (0.1, 0.9, 60.0));
        assert_eq!((model.btln_time_a, model.btln_time_b), (50.0, 50.0));
    }

    #[test]
    fn verbosity_is_global() {
        let cli = parse(&["admixsim", "model-t1", "-vvv", "--dry-run"]);
        assert_eq!(cli.verbose, 3);
        assert!(!cli.quiet);
        assert!(cli.commands.common().map_or(false, |common| common.dry_run));
    }

    #[test]
    fn custom_requires_existing_file() {
        let tmpdir = tempfile::tempdir().expect("Failed to create tmpdir");
        let missing = tmpdir.path().join("missing.yaml").display().to_string();
        let dir     = tmpdir.path().display().to_string();
        assert!(Cli::try_parse_from(["admixsim", "custom", "--config", missing.as_str()]).is_err());
        assert!(Cli::try_parse_from(["admixsim", "custom", "--config", dir.as_str()]).is_err());

        let valid = tmpdir.path().join("model.yaml");
        std::fs::write(&valid, "populations: []").expect("Failed to write model");
        let valid = valid.display().to_string();
        assert!(Cli::try_parse_from(["admixsim", "custom", "--config", valid.as_str()]).is_ok());
    }

    #[test]
    fn input_file_errors() {
        let tmpdir  = tempfile::tempdir().expect("Failed to create tmpdir");
        let missing = valid_input_file(tmpdir.path().join("missing.yaml").as_os_str()).unwrap_err();
        assert!(matches!(missing.root_cause().downcast_ref::<ParserError>(), Some(ParserError::MissingFile(_))));

        let dir = valid_input_file(tmpdir.path().as_os_str()).unwrap_err();
        assert!(matches!(dir.root_cause().downcast_ref::<ParserError>(), Some(ParserError::NotAFile(_))));
    }

    #[test]
    fn serialize_then_replay() -> Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let output = tmpdir.path().join("out.vcf").display().to_string();
        let cli    = parse(&["admixsim", "model-t1", "--output", output.as_str(), "--seed", "42", "--prop-a", "0.6"]);

        let yaml = cli.serialize()?.expect("model-t1 should get serialized");
        assert_eq!(yaml.parent(), Some(tmpdir.path()));
        assert!(yaml.display().to_string().ends_with("-model-t1.yaml"));
        assert_eq!(Cli::deserialize(&yaml)?, cli);

        let yaml   = yaml.display().to_string();
        let replay = parse(&["admixsim", "from-yaml", yaml.as_str()]);
        assert_eq!(replay.serialize()?, None);
        Ok(())
    }

    #[test]
    fn output_dir() {
        let cli = parse(&["admixsim", "model-t1"]);
        let common = cli.commands.common().expect("Missing common arguments");
        assert_eq!(common.output_dir(), PathBuf::from("."));
        assert_eq!(common.events_table(), None);

        let cli = parse(&["admixsim", "model-t1", "-o", "results/run.vcf", "--report", "results/run.report"]);
        let common = cli.commands.common().expect("Missing common arguments");
        assert_eq!(common.output_dir(), PathBuf::from("results"));
        assert_eq!(common.events_table(), Some(PathBuf::from("results/run.events.tsv")));
    }

    #[test]
    fn cannot_overwrite() -> Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let output = tmpdir.path().join("out.vcf");
        std::fs::write(&output, "")?;
        let path = output.display().to_string();

        let cli = parse(&["admixsim", "model-t1", "-o", path.as_str()]);
        let common = cli.commands.common().expect("Missing common arguments");
        let err = common.can_write_file(&output).unwrap_err();
        assert!(matches!(err.root_cause().downcast_ref::<ParserError>(), Some(ParserError::CannotOverwrite(_))));

        let cli = parse(&["admixsim", "model-t1", "-o", path.as_str(), "--overwrite"]);
        assert!(cli.commands.common().expect("Missing common arguments").can_write_file(&output)?);
        Ok(())
    }
}
