//! Simulation collaborators backed by external command line programs.
//!
//! # Command lines
//! - ancestry : `<msp> ancestry <POP:N>... --demography <demes.yaml> --length <L> --recombination-rate <r> [--random-seed <s>] --output <ancestry.trees>`
//! - mutations: `<msp> mutations <ancestry.trees> <u> [--random-seed <s>] --output <mutated.trees>`
//! - vcf      : `<tskit> vcf <mutated.trees>`, streamed from stdout.
//!
//! Intermediate files live within a temporary working directory, owned by the `ProcessEngine`.

use std::{
    ffi::OsString,
    fs::File,
    io::{self, Read, Seek, Write},
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

use anyhow::Result;
use itertools::Itertools;
use located_error::LocatedError;
use log::{debug, info, trace};
use tempfile::TempDir;

use demography::{DemographyModel, SamplingConfig};

use crate::{
    AncestryEngine, MutationEngine, VariantWriter,
    Genealogy, MutatedGenealogy, SimulationParams,
    EngineError,
};

const DEMES_FILE    : &str = "demography.yaml";
const ANCESTRY_FILE : &str = "ancestry.trees";
const MUTATED_FILE  : &str = "mutated.trees";

fn program_name(program: &Path) -> String {
    program.display().to_string()
}

fn exit_error(program: &Path, status: ExitStatus, stderr: &[u8]) -> EngineError {
    EngineError::ExitStatus{
        program: program_name(program),
        status : status.to_string(),
        stderr : String::from_utf8_lossy(stderr).into_owned(),
    }
}

/// Run `program` to completion, and return an error carrying its stderr on a non-zero exit status.
fn execute(program: &Path, args: &[OsString]) -> Result<(), EngineError> {
    debug!("Running {} {}", program.display(), args.iter().map(|arg| arg.to_string_lossy()).join(" "));
    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| EngineError::Spawn{program: program_name(program), source})?;

    trace!("{} stdout:\n{}", program.display(), String::from_utf8_lossy(&output.stdout));
    if !output.status.success() {
        return Err(exit_error(program, output.status, &output.stderr))
    }
    Ok(())
}

/// msprime-compatible ancestry and mutation engine.
#[derive(Debug)]
pub struct ProcessEngine {
    program: PathBuf,
    workdir: TempDir,
}

impl ProcessEngine {
    /// # Errors
    /// - `EngineError::Workdir` if the temporary working directory cannot be created.
    pub fn new(program: impl Into<PathBuf>) -> Result<Self> {
        let workdir = tempfile::Builder::new()
            .prefix("admixsim-")
            .tempdir()
            .map_err(EngineError::Workdir)
            .loc("While initializing the simulation engine")?;
        Ok(Self{program: program.into(), workdir})
    }

    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    fn expect_output(&self, path: PathBuf) -> Result<PathBuf, EngineError> {
        match path.is_file() {
            true  => Ok(path),
            false => Err(EngineError::MissingOutput{program: program_name(&self.program), path})
        }
    }

    fn ancestry_args(&self, sampling: &SamplingConfig, params: &SimulationParams, demes: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["ancestry".into()];
        args.extend(sampling.iter()
            .filter(|(_, individuals)| *individuals > 0)
            .map(|(name, individuals)| OsString::from(format!("{name}:{individuals}")))
        );
        args.extend(["--demography".into(), demes.as_os_str().to_owned()]);
        args.extend(["--length".into(), params.sequence_length.to_string().into()]);
        args.extend(["--recombination-rate".into(), params.recombination_rate.to_string().into()]);
        if let Some(seed) = params.seed {
            args.extend(["--random-seed".into(), seed.to_string().into()]);
        }
        args.extend(["--output".into(), output.as_os_str().to_owned()]);
        args
    }

    fn mutation_args(genealogy: &Genealogy, mutation_rate: f64, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "mutations".into(),
            genealogy.path().as_os_str().to_owned(),
            mutation_rate.to_string().into(),
        ];
        if let Some(seed) = genealogy.seed() {
            args.extend(["--random-seed".into(), seed.to_string().into()]);
        }
        args.extend(["--output".into(), output.as_os_str().to_owned()]);
        args
    }
}

impl AncestryEngine for ProcessEngine {
    fn simulate_ancestry(&self, model: &DemographyModel, sampling: &SamplingConfig, params: &SimulationParams) -> Result<Genealogy> {
        let demes = self.workdir().join(DEMES_FILE);
        model.write_demes_file(&demes).loc("While preparing ancestry simulation")?;

        let output = self.workdir().join(ANCESTRY_FILE);
        info!("Simulating ancestry of {} individuals over {} bp", sampling.total(), params.sequence_length);
        execute(&self.program, &self.ancestry_args(sampling, params, &demes, &output))?;
        let output = self.expect_output(output)?;
        Ok(Genealogy::new(output, params.seed))
    }
}

impl MutationEngine for ProcessEngine {
    fn simulate_mutations(&self, genealogy: &Genealogy, mutation_rate: f64) -> Result<MutatedGenealogy> {
        let output = self.workdir().join(MUTATED_FILE);
        info!("Simulating mutations with rate {mutation_rate}");
        execute(&self.program, &Self::mutation_args(genealogy, mutation_rate, &output))?;
        let output = self.expect_output(output)?;
        Ok(MutatedGenealogy::new(output))
    }
}

/// tskit-compatible VCF writer. The VCF is streamed from the program's stdout.
#[derive(Debug, Clone)]
pub struct TskitVcfWriter {
    program: PathBuf,
}

impl TskitVcfWriter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self{program: program.into()}
    }
}

impl VariantWriter for TskitVcfWriter {
    fn write(&self, mutated: &MutatedGenealogy, output: &mut dyn Write) -> Result<()> {
        let spawn_error = |source: io::Error| EngineError::Spawn{program: program_name(&self.program), source};

        // stderr goes to an anonymous file, so that a chatty program never blocks on a full pipe.
        let mut stderr = tempfile::tempfile().map_err(EngineError::Workdir)?;
        debug!("Running {} vcf {}", self.program.display(), mutated.path().display());
        let mut child = Command::new(&self.program)
            .arg("vcf")
            .arg(mutated.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(stderr.try_clone().map_err(spawn_error)?)
            .spawn()
            .map_err(spawn_error)?;

        let copied = match child.stdout.take() {
            Some(mut stdout) => io::copy(&mut stdout, output),
            None             => Ok(0),
        };
        let status = child.wait().map_err(spawn_error)?;

        // A failed copy closes the pipe early: the program's own failure is then a consequence.
        let copied = copied.loc("While streaming VCF records")?;
        if !status.success() {
            let mut message = Vec::new();
            stderr.rewind().and_then(|()| stderr.read_to_end(&mut message)).map_err(spawn_error)?;
            return Err(exit_error(&self.program, status, &message).into())
        }
        debug!("Streamed {copied} bytes of VCF records");
        Ok(())
    }
}
