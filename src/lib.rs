extern crate parser;
extern crate logger;

use std::path::Path;

use parser::{Cli, Commands::*, Common};
use logger::Logger;
use admixsim_io::GenericWriter;
use demography::{Assembler, DemographyModel, ValidatorConfig};
use simulation::{ProcessEngine, TskitVcfWriter, SimulationDriver, SimulationParams};
use located_error::LocatedError;

#[macro_use]
extern crate log;

use anyhow::Result;

pub mod scenarios;
pub use scenarios::Scenario;

/// Unpack the command line and run the requested model.
///
/// # Errors
/// - any error raised while building, validating or simulating the model.
pub fn run(cli: Cli) -> Result<()> {
    match cli.commands {
        ModelT1 {common, model} => {
            simulate(&common, &scenarios::model_t1(&model))?;
        },

        MigrantsToSources {common, model} => {
            simulate(&common, &scenarios::migrants_to_sources(&model))?;
        },

        Custom {common, custom} => {
            let scenario = Scenario::from_yaml(&custom.config)?;
            simulate(&common, &scenario)?;
        },

        FromYaml {yaml} => {
            let cli = Cli::deserialize(&yaml)?;
            self::run(cli)?;
        },
    };
    Ok(())
}

/// Build and validate the demographic model of `scenario`, then simulate it unless `--dry-run` was requested.
///
/// # Errors
/// - if the model is invalid (see `demography::DemographyError`).
/// - if the report, or the output VCF cannot be written.
/// - if the simulation engine fails.
pub fn simulate(common: &Common, scenario: &Scenario) -> Result<()> {
    // ----------------------------- Build and validate the demographic model.
    let validator = ValidatorConfig{proportion_tolerance: common.proportion_tolerance};
    let model = Assembler::new(validator).build(&scenario.demography)
        .loc("While building the demographic model")?;
    debug!("\n{}", model.debug_report());

    if let Some(report) = &common.report {
        write_report(common, &model, report)?;
    }

    if common.dry_run {
        scenario.samples.validate(&model).loc("While checking samples")?;
        model.to_demes().loc("While converting the model into demes format")?;
        info!("Dry run: model is valid. Skipping simulation.");
        return GenericWriter::new(None::<&Path>)?.write_iter(model.events_table())
    }

    // ----------------------------- Simulate.
    common.can_write_file(&common.output)?;
    let engine = ProcessEngine::new(&common.msp_bin)?;
    let writer = TskitVcfWriter::new(&common.tskit_bin);
    let driver = SimulationDriver::new(&engine, &engine, &writer);
    let params = SimulationParams{
        sequence_length   : common.sequence_length,
        recombination_rate: common.recombination_rate,
        mutation_rate     : common.mutation_rate,
        seed              : Some(common.seed),
    };

    let spinner = Logger::spinner("Running coalescent simulation...");
    let mutated = driver.simulate(&model, &scenario.samples, &params);
    spinner.finish_and_clear();

    driver.write_output(&mutated?, &common.output)?;
    info!("Simulation complete. VCF written to: {}", common.output.display());
    Ok(())
}

/// Write the debug report of `model` into `report`, and its events into a tab-separated table alongside.
fn write_report(common: &Common, model: &DemographyModel, report: &Path) -> Result<()> {
    info!("Writing model report into {}", report.display());
    GenericWriter::create(report, common.overwrite)?
        .write_str(&model.debug_report())
        .with_loc(|| format!("While writing report {}", report.display()))?;

    if let Some(table) = common.events_table() {
        let mut writer = GenericWriter::create(&table, common.overwrite)?;
        writer.write_iter(["Time - Kind - Populations"])?;
        writer.write_iter(model.events_table())
            .with_loc(|| format!("While writing events table {}", table.display()))?;
    }
    Ok(())
}
