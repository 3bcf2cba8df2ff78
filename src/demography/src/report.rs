use std::fmt::{self, Display, Formatter};

use crate::{
    assembler::DemographyModel,
    event::Event,
};

/// Space padding of population names within the report.
const NAME_DISPLAY_LEN: usize = 8;

/// Human-readable, deterministic audit trail of a `DemographyModel`:
/// every population, every event in chronological order (present to past), and the final
/// lineage state of each population.
pub fn debug_report(model: &DemographyModel) -> String {
    ModelReport(model).to_string()
}

/// `Display` adapter behind `debug_report()`.
struct ModelReport<'a>(&'a DemographyModel);

impl Display for ModelReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let model    = self.0;
        let registry = model.registry();

        writeln!(f, "---- Populations ({})", registry.len())?;
        for (_, population) in registry.iter() {
            writeln!(f, "{population}")?;
        }

        writeln!(f, "---- Events ({}), from present to past", model.events().len())?;
        writeln!(f, "{: <4} - {: <10} - {: <16} - Populations", "#", "Time", "Kind")?;
        for (i, event) in model.events().iter().enumerate() {
            writeln!(f, "{i: <4} - {}", event.display(registry))?;
        }

        writeln!(f, "---- Final lineage states")?;
        for (id, population) in registry.iter() {
            writeln!(f, "{: <NAME_DISPLAY_LEN$} - {}", population.name, model.lineage_state(id))?;
        }
        Ok(())
    }
}

/// One row of the tab-separated events table (see `DemographyModel::events_table()`)
pub struct EventRow<'a> {
    model: &'a DemographyModel,
    event: &'a Event,
}

impl Display for EventRow<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.event.display(self.model.registry()))
    }
}

impl DemographyModel {
    pub fn debug_report(&self) -> String {
        debug_report(self)
    }

    /// Chronological events, in a form that `GenericWriter::write_iter()` turns into
    /// tab-separated lines.
    pub fn events_table(&self) -> impl Iterator<Item = EventRow<'_>> {
        self.events().iter().map(move |event| EventRow{model: self, event})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Assembler, DemographyConfig};

    fn model() -> DemographyModel {
        let mut config = DemographyConfig::default();
        config.population("A", 10_000, true)
            .population("B", 10_000, true)
            .population("C", 10_000, true)
            .population("ANC", 10_000, false)
            .split(1000.0, &["A", "B"], "ANC")
            .bottleneck(65.0, "A", 1000)
            .admixture(25.0, "C", &["A", "B"], &[0.7, 0.3]);
        Assembler::default().build(&config).expect("Valid model")
    }

    #[test]
    fn report_lists_events_chronologically() {
        let report = model().debug_report();
        let admix = report.find("C -> [A: 0.7, B: 0.3]").expect("Missing admixture");
        let bottl = report.find("A -> size: 1000").expect("Missing bottleneck");
        let split = report.find("[A, B] -> ANC").expect("Missing split");
        assert!(admix < bottl && bottl < split);
    }

    #[test]
    fn report_lists_final_states() {
        let report = model().debug_report();
        let states = report.split("---- Final lineage states").nth(1).expect("Missing final states section");
        let lines: Vec<&str> = states.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines, [
            "A        - merged at 1000",
            "B        - merged at 1000",
            "C        - merged at 25",
            "ANC      - extant to root",
        ]);
    }

    /// Formatter sink refusing any input.
    struct Full;

    impl fmt::Write for Full {
        fn write_str(&mut self, _: &str) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    #[test]
    fn report_propagates_formatter_errors() {
        use std::fmt::Write;
        let model = model();
        let mut sink = Full;
        assert_eq!(write!(sink, "{}", ModelReport(&model)), Err(fmt::Error));
        assert_eq!(ModelReport(&model).to_string(), model.debug_report());
    }

    #[test]
    fn report_is_deterministic() {
        assert_eq!(model().debug_report(), model().debug_report());
    }

    #[test]
    fn events_table() {
        let model = model();
        let rows: Vec<String> = model.events_table().map(|row| row.to_string()).collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("25"));
        assert!(rows[2].ends_with("[A, B] -> ANC"));
    }
}
