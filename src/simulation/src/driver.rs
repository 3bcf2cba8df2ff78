use std::{io::Write, path::Path};

use anyhow::Result;
use log::info;

use admixsim_io::GenericWriter;
use demography::{DemographyModel, SamplingConfig};
use located_error::LocatedError;

use crate::{
    AncestryEngine, MutationEngine, VariantWriter,
    MutatedGenealogy, SimulationParams,
    DriverError,
};

/// Chains ancestry simulation, mutation overlay and variant writing.
pub struct SimulationDriver<'a, A, M, W> {
    ancestry : &'a A,
    mutations: &'a M,
    writer   : &'a W,
}

impl<'a, A, M, W> SimulationDriver<'a, A, M, W>
where   A: AncestryEngine,
        M: MutationEngine,
        W: VariantWriter,
{
    pub fn new(ancestry: &'a A, mutations: &'a M, writer: &'a W) -> Self {
        Self{ancestry, mutations, writer}
    }

    /// Simulate the genealogy of `sampling` under `model`, and overlay mutations.
    ///
    /// Sampling and parameters are checked before any engine gets called. Engine errors are
    /// propagated as is.
    ///
    /// # Errors
    /// - `DriverError::Sampling` if a sampled population is unknown, inactive at present, or if
    ///   no individual gets sampled.
    /// - `DriverError::InvalidParameter` if `params` are out of range.
    pub fn simulate(&self, model: &DemographyModel, sampling: &SamplingConfig, params: &SimulationParams) -> Result<MutatedGenealogy> {
        sampling.validate(model)
            .map_err(DriverError::Sampling)
            .loc("While checking samples before simulation")?;
        params.validate().loc("While checking simulation parameters")?;

        info!("Simulating {} individuals from {} populations", sampling.total(), sampling.iter().count());
        let genealogy = self.ancestry.simulate_ancestry(model, sampling, params)?;
        self.mutations.simulate_mutations(&genealogy, params.mutation_rate)
    }

    /// Write `mutated` into `path`. The file is flushed and closed before returning.
    ///
    /// # Errors
    /// - `DriverError::IOError` if `path` cannot be created, or written into.
    /// - any error of the underlying `VariantWriter`.
    pub fn write_output(&self, mutated: &MutatedGenealogy, path: &Path) -> Result<()> {
        let io_error = |source| DriverError::IOError{path: path.to_path_buf(), source};
        info!("Writing variants into {}", path.display());
        let mut writer = GenericWriter::new(Some(path)).loc("While opening simulation output")?;
        self.writer.write(mutated, &mut writer)?;
        writer.flush().map_err(io_error).loc("While flushing simulation output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use demography::{Assembler, DemographyConfig, DemographyError};
    use mockall::predicate::eq;

    use crate::{
        engine::{MockAncestryEngine, MockMutationEngine},
        EngineError, Genealogy,
    };

    /// Writes the path of the genealogy, and records every call.
    #[derive(Default)]
    struct FakeWriter {
        calls: RefCell<usize>,
    }

    impl VariantWriter for FakeWriter {
        fn write(&self, mutated: &MutatedGenealogy, output: &mut dyn Write) -> Result<()> {
            *self.calls.borrow_mut() += 1;
            writeln!(output, "##source={}", mutated.path().display())?;
            Ok(())
        }
    }

    fn model_t1(proportions: &[f64]) -> Result<DemographyModel, DemographyError> {
        let mut config = DemographyConfig::default();
        config.population("A", 10_000, true)
            .population("B", 10_000, true)
            .population("C", 10_000, true)
            .population("ANC", 10_000, false)
            .split(1000.0, &["A", "B"], "ANC")
            .admixture(25.0, "C", &["A", "B"], proportions);
        Assembler::default().build(&config)
    }

    fn samples() -> SamplingConfig {
        [("A", 50), ("B", 50), ("C", 350)].into_iter().collect()
    }

    #[test]
    fn simulate_calls_engines_in_order() -> Result<()> {
        let model = model_t1(&[0.7, 0.3])?;
        let mut ancestry  = MockAncestryEngine::new();
        let mut mutations = MockMutationEngine::new();

        ancestry.expect_simulate_ancestry()
            .withf(|_, sampling, params| sampling.total() == 450 && params.seed == Some(42))
            .times(1)
            .returning(|_, _, _| Ok(Genealogy::new("ancestry.trees", Some(42))));
        mutations.expect_simulate_mutations()
            .with(eq(Genealogy::new("ancestry.trees", Some(42))), eq(1e-8))
            .times(1)
            .returning(|_, _| Ok(MutatedGenealogy::new("mutated.trees")));

        let writer = FakeWriter::default();
        let driver = SimulationDriver::new(&ancestry, &mutations, &writer);
        let params = SimulationParams{seed: Some(42), ..Default::default()};
        assert_eq!(driver.simulate(&model, &samples(), &params)?, MutatedGenealogy::new("mutated.trees"));
        Ok(())
    }

    #[test]
    fn invalid_model_never_reaches_engine() {
        let mut ancestry  = MockAncestryEngine::new();
        let mut mutations = MockMutationEngine::new();
        ancestry.expect_simulate_ancestry().times(0);
        mutations.expect_simulate_mutations().times(0);

        // Proportions sum to 0.9: the model never gets built.
        let err = model_t1(&[0.7, 0.2]).unwrap_err();
        assert!(matches!(err, DemographyError::ProportionSum{..}));

        // ...and a valid model with an invalid sampling never gets simulated.
        let model  = model_t1(&[0.7, 0.3]).expect("Valid model");
        let writer = FakeWriter::default();
        let driver = SimulationDriver::new(&ancestry, &mutations, &writer);
        let inactive: SamplingConfig = [("ANC", 10)].into_iter().collect();
        let err = driver.simulate(&model, &inactive, &SimulationParams::default()).unwrap_err();
        assert!(matches!(
            err.root_cause().downcast_ref::<DemographyError>(),
            Some(DemographyError::SampleInactive(name)) if name == "ANC"
        ));
    }

    #[test]
    fn invalid_params_never_reach_engine() -> Result<()> {
        let model = model_t1(&[0.7, 0.3])?;
        let mut ancestry  = MockAncestryEngine::new();
        let mut mutations = MockMutationEngine::new();
        ancestry.expect_simulate_ancestry().times(0);
        mutations.expect_simulate_mutations().times(0);

        let writer = FakeWriter::default();
        let driver = SimulationDriver::new(&ancestry, &mutations, &writer);
        let params = SimulationParams{sequence_length: -1.0, ..Default::default()};
        let err = driver.simulate(&model, &samples(), &params).unwrap_err();
        assert!(matches!(err.root_cause().downcast_ref::<DriverError>(), Some(DriverError::InvalidParameter{name: "sequence_length", ..})));
        Ok(())
    }

    #[test]
    fn engine_errors_are_propagated() -> Result<()> {
        let model = model_t1(&[0.7, 0.3])?;
        let mut ancestry  = MockAncestryEngine::new();
        let mut mutations = MockMutationEngine::new();
        ancestry.expect_simulate_ancestry()
            .times(1)
            .returning(|_, _, _| Err(EngineError::ExitStatus{program: "msp".into(), status: "exit status: 1".into(), stderr: "boom".into()}.into()));
        mutations.expect_simulate_mutations().times(0);

        let writer = FakeWriter::default();
        let driver = SimulationDriver::new(&ancestry, &mutations, &writer);
        let err = driver.simulate(&model, &samples(), &SimulationParams::default()).unwrap_err();
        match err.downcast_ref::<EngineError>() {
            Some(EngineError::ExitStatus{stderr, ..}) => assert_eq!(stderr, "boom"),
            other => panic!("Expected ExitStatus. Got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn write_output() -> Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let path   = tmpdir.path().join("out.vcf");
        let (ancestry, mutations) = (MockAncestryEngine::new(), MockMutationEngine::new());
        let writer = FakeWriter::default();
        let driver = SimulationDriver::new(&ancestry, &mutations, &writer);

        driver.write_output(&MutatedGenealogy::new("mutated.trees"), &path)?;
        assert_eq!(std::fs::read_to_string(&path)?, "##source=mutated.trees\n");
        assert_eq!(*writer.calls.borrow(), 1);
        Ok(())
    }

    #[test]
    fn unwritable_output() -> Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let path   = tmpdir.path().join("missing-dir").join("out.vcf");
        let (ancestry, mutations) = (MockAncestryEngine::new(), MockMutationEngine::new());
        let writer = FakeWriter::default();
        let driver = SimulationDriver::new(&ancestry, &mutations, &writer);

        let err = driver.write_output(&MutatedGenealogy::new("mutated.trees"), &path).unwrap_err();
        assert!(err.root_cause().downcast_ref::<std::io::Error>().is_some());
        assert_eq!(*writer.calls.borrow(), 0);
        Ok(())
    }
}
