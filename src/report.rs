use std::fmt::{Display, Formatter};
use std::io::Write;

use anyhow::Result as Result;

use crate::registry::{Registry, StateAccumulator};

impl Display for StateAccumulator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let max = self.max_temperature();
        let min = self.min_temperature();

        writeln!(f, "-- State: {} --", self.code())?;
        writeln!(f, "Number of Records: {}", self.record_count())?;
        writeln!(f, "Average Humidity: {:.1}%", self.average_humidity())?;
        writeln!(f, "Average Temperature: {:.1}F", self.average_temperature())?;
        writeln!(f, "Max Temperature: {:.1}F", max.value)?;
        writeln!(f, "Max Temperature on: {}", max.time)?;
        writeln!(f, "Min Temperature: {:.1}F", min.value)?;
        writeln!(f, "Min Temperature on: {}", min.time)?;
        writeln!(f, "Lightning Strikes: {}", self.lightning_count())?;
        writeln!(f, "Records with Snow Cover: {}", self.snow_count())?;
        writeln!(f, "Average Cloud Cover: {:.1}%", self.average_cloud_cover())
    }
}

/// The full summary: the list of codes, then one block per state in first-seen order.
pub struct Report<'a>(pub &'a Registry);

impl Display for Report<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "States found: ")?;
        for code in self.0.codes() {
            write!(f, "{code} ")?;
        }
        writeln!(f)?;

        for state in self.0 {
            write!(f, "{state}")?;
        }
        Ok(())
    }
}

pub fn render(registry: &Registry) -> String {
    Report(registry).to_string()
}

pub fn write_report<W: Write>(registry: &Registry, mut out: W) -> Result<()> {
    write!(out, "{}", Report(registry))?;
    out.flush()?;
    Ok(())
}
