use std::path::PathBuf;

use clap::Parser;
use anyhow::Result;

use super::Fixture;

/// Runs `admixsim_rs::run()` in-process, with its outputs redirected into a temporary directory.
pub struct AdmixsimRunner {
    cli    : parser::Cli,
    output : Fixture,
    _config: Option<Fixture>,
}

impl AdmixsimRunner {
    pub fn run(&self) -> Result<()> {
        admixsim_rs::run(self.cli.clone())
    }

    pub fn cli(&self) -> &parser::Cli {
        &self.cli
    }

    pub fn output_vcf(&self) -> PathBuf {
        self.output.to_path_buf()
    }

    pub fn output_report(&self) -> PathBuf {
        self.output.sibling("model.report")
    }

    pub fn output_events(&self) -> PathBuf {
        self.output.sibling("model.events.tsv")
    }
}

#[derive(Default)]
pub struct AdmixsimRunnerBuilder {
    module   : Option<String>,
    args     : Vec<String>,
    dry_run  : bool,
    report   : bool,
    config   : Option<Fixture>,
}

impl AdmixsimRunnerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(mut self, module: &str) -> Self {
        self.module = Some(module.to_string());
        self
    }

    /// Use `tests/test-data/<config>` as the `--config` of the `custom` subcommand.
    pub fn set_config(mut self, config: &str) -> Self {
        self.config = Some(Fixture::copy(config));
        self
    }

    pub fn arg(mut self, flag: &str, value: &str) -> Self {
        self.args.extend([flag.to_string(), value.to_string()]);
        self
    }

    pub fn flag(mut self, flag: &str) -> Self {
        self.args.push(flag.to_string());
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn report(mut self) -> Self {
        self.report = true;
        self
    }

    pub fn build(self) -> Result<AdmixsimRunner> {
        let module = self.module.unwrap_or_else(|| String::from("model-t1"));
        let output = Fixture::blank("output.vcf");

        let mut args = vec![String::from("admixsim"), module, String::from("--output"), output.to_string()];
        if let Some(config) = &self.config {
            args.extend([String::from("--config"), config.to_string()]);
        }
        if self.dry_run {
            args.push(String::from("--dry-run"));
        }
        if self.report {
            args.extend([String::from("--report"), output.sibling("model.report").display().to_string()]);
        }
        args.extend(self.args);

        let cli = parser::Cli::try_parse_from(args)?;
        Ok(AdmixsimRunner{cli, output, _config: self.config})
    }
}
