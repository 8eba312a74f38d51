use ahash::RandomState;
use bstr::ByteSlice;
use hashbrown::HashMap;
use log::{debug, trace};

use crate::convert::{format_instant, kelvin_to_fahrenheit, DisplayZone};
use crate::record::{Malformed, Observation};

type CodeIndex = HashMap<Box<str>, usize, RandomState>;

/// A temperature extreme and the formatted time of the record that set it.
#[derive(Debug, Clone, PartialEq)]
pub struct Extremum {
    pub value: f64,
    pub time: String,
}

#[derive(Debug, Clone)]
pub struct StateAccumulator {
    code: Box<str>,
    record_count: u64,
    humidity_sum: u64,
    cloud_sum: u64,
    snow_count: u64,
    lightning_count: u64,
    temperature_sum: f64,
    max_temperature: Extremum,
    min_temperature: Extremum,
}

impl StateAccumulator {
    fn new(observation: &Observation<'_>, zone: DisplayZone) -> Self {
        let temperature = kelvin_to_fahrenheit(observation.surface_temp_kelvin);
        let extremum = Extremum {
            value: temperature,
            time: format_instant(observation.observed_at, zone),
        };

        Self {
            code: observation.code.into(),
            record_count: 1,
            humidity_sum: observation.humidity,
            cloud_sum: observation.cloud_cover,
            snow_count: u64::from(observation.snow),
            lightning_count: u64::from(observation.lightning),
            temperature_sum: temperature,
            max_temperature: extremum.clone(),
            min_temperature: extremum,
        }
    }

    fn update(&mut self, observation: &Observation<'_>, zone: DisplayZone) {
        let temperature = kelvin_to_fahrenheit(observation.surface_temp_kelvin);

        self.record_count += 1;
        self.humidity_sum = self.humidity_sum.saturating_add(observation.humidity);
        self.cloud_sum = self.cloud_sum.saturating_add(observation.cloud_cover);
        self.snow_count += u64::from(observation.snow);
        self.lightning_count += u64::from(observation.lightning);
        self.temperature_sum += temperature;

        // Strict comparisons: on a tie the earlier record keeps its timestamp.
        if temperature > self.max_temperature.value {
            self.max_temperature = Extremum {
                value: temperature,
                time: format_instant(observation.observed_at, zone),
            };
        }
        if temperature < self.min_temperature.value {
            self.min_temperature = Extremum {
                value: temperature,
                time: format_instant(observation.observed_at, zone),
            };
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    pub fn humidity_sum(&self) -> u64 {
        self.humidity_sum
    }

    pub fn cloud_sum(&self) -> u64 {
        self.cloud_sum
    }

    pub fn snow_count(&self) -> u64 {
        self.snow_count
    }

    pub fn lightning_count(&self) -> u64 {
        self.lightning_count
    }

    pub fn temperature_sum(&self) -> f64 {
        self.temperature_sum
    }

    pub fn max_temperature(&self) -> &Extremum {
        &self.max_temperature
    }

    pub fn min_temperature(&self) -> &Extremum {
        &self.min_temperature
    }

    pub fn average_humidity(&self) -> f64 {
        self.humidity_sum as f64 / self.record_count as f64
    }

    pub fn average_temperature(&self) -> f64 {
        self.temperature_sum / self.record_count as f64
    }

    pub fn average_cloud_cover(&self) -> f64 {
        self.cloud_sum as f64 / self.record_count as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ingested,
    Blank,
    Skipped(Malformed),
}

/// Per-state accumulators, enumerated in the order their codes were first seen.
#[derive(Debug, Default)]
pub struct Registry {
    index: CodeIndex,
    states: Vec<StateAccumulator>,
    zone: DisplayZone,
    skipped: u64,
}

impl Registry {
    pub fn new(zone: DisplayZone) -> Self {
        Self { zone, ..Self::default() }
    }

    /// Parses one raw line and folds it into its state's accumulator.
    ///
    /// Malformed lines leave every accumulator untouched and only bump the skip counter.
    pub fn ingest(&mut self, line: &[u8]) -> Outcome {
        if line.trim().is_empty() {
            return Outcome::Blank;
        }

        match Observation::parse(line) {
            Ok(observation) => {
                self.observe(&observation);
                Outcome::Ingested
            },
            Err(reason) => {
                trace!("skipping line: {reason}");
                self.skipped += 1;
                Outcome::Skipped(reason)
            }
        }
    }

    pub fn observe(&mut self, observation: &Observation<'_>) {
        match self.index.get(observation.code) {
            Some(&position) => self.states[position].update(observation, self.zone),
            None => {
                debug!("first record for state {}", observation.code);
                self.index.insert(observation.code.into(), self.states.len());
                self.states.push(StateAccumulator::new(observation, self.zone));
            }
        }
    }

    pub fn get(&self, code: &str) -> Option<&StateAccumulator> {
        self.index.get(code).map(|&position| &self.states[position])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StateAccumulator> {
        self.states.iter()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(StateAccumulator::code)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Malformed lines seen since the registry was created.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn zone(&self) -> DisplayZone {
        self.zone
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a StateAccumulator;
    type IntoIter = std::slice::Iter<'a, StateAccumulator>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(code: &str, millis: i64, humidity: f64, snow: u8, cloud: f64, lightning: u8, kelvin: f64) -> Vec<u8> {
        format!("{code}\t{millis}\tgeohash\t{humidity}\t{snow}\t{cloud}\t{lightning}\t101325.0\t{kelvin}\n").into_bytes()
    }

    #[test]
    fn first_record_seeds_both_extrema() {
        let mut registry = Registry::new(DisplayZone::Utc);
        let outcome = registry.ingest(b"CA\t1428300000000\t9prcjqk3yc80\t93.0\t0.0\t100.0\t0.0\t95644.0\t277.58716\n");
        assert_eq!(outcome, Outcome::Ingested);

        let state = registry.get("CA").unwrap();
        assert_eq!(state.record_count(), 1);
        assert_eq!(state.humidity_sum(), 93);
        assert_eq!(state.cloud_sum(), 100);
        assert_eq!(state.snow_count(), 0);
        assert_eq!(state.lightning_count(), 0);
        assert!((state.temperature_sum() - 39.986888).abs() < 1e-6);
        assert_eq!(state.max_temperature(), state.min_temperature());
        assert_eq!(state.max_temperature().time, "Mon Apr  6 06:00:00 2015");
    }

    #[test]
    fn extrema_track_the_record_that_set_them() {
        let mut registry = Registry::new(DisplayZone::Utc);
        registry.ingest(&line("WA", 1_428_300_000_000, 50.0, 0, 10.0, 0, 280.0));
        registry.ingest(&line("WA", 1_438_599_600_000, 40.0, 0, 10.0, 1, 310.0));
        registry.ingest(&line("WA", 1_430_308_800_000, 60.0, 1, 10.0, 0, 250.0));
        registry.ingest(&line("WA", 1_428_300_000_000, 70.0, 0, 10.0, 0, 290.0));

        let state = registry.get("WA").unwrap();
        assert_eq!(state.record_count(), 4);
        assert_eq!(state.snow_count(), 1);
        assert_eq!(state.lightning_count(), 1);
        assert_eq!(state.max_temperature().time, "Mon Aug  3 11:00:00 2015");
        assert_eq!(state.min_temperature().time, "Wed Apr 29 12:00:00 2015");
        assert!((state.max_temperature().value - kelvin_to_fahrenheit(310.0)).abs() < 1e-9);
        assert!((state.min_temperature().value - kelvin_to_fahrenheit(250.0)).abs() < 1e-9);
        assert!((state.average_humidity() - 55.0).abs() < 1e-9);
    }

    #[test]
    fn ties_keep_the_first_timestamp() {
        let mut registry = Registry::new(DisplayZone::Utc);
        registry.ingest(&line("TN", 1_428_300_000_000, 1.0, 0, 1.0, 0, 280.0));
        registry.ingest(&line("TN", 1_438_599_600_000, 1.0, 0, 1.0, 0, 280.0));

        let state = registry.get("TN").unwrap();
        assert_eq!(state.max_temperature().time, "Mon Apr  6 06:00:00 2015");
        assert_eq!(state.min_temperature().time, "Mon Apr  6 06:00:00 2015");
    }

    #[test]
    fn extrema_bound_every_observation() {
        let kelvins = [281.3, 265.0, 299.9, 265.0, 270.1, 305.5, 240.25];
        let mut registry = Registry::new(DisplayZone::Utc);
        for (offset, &kelvin) in kelvins.iter().enumerate() {
            registry.ingest(&line("NV", 1_428_300_000_000 + offset as i64 * 3_600_000, 10.0, 0, 0.0, 0, kelvin));
        }

        let state = registry.get("NV").unwrap();
        for &kelvin in &kelvins {
            let fahrenheit = kelvin_to_fahrenheit(kelvin);
            assert!(state.min_temperature().value <= fahrenheit);
            assert!(fahrenheit <= state.max_temperature().value);
        }
        assert_eq!(state.record_count(), kelvins.len() as u64);
    }

    #[test]
    fn nan_temperature_is_skipped_before_seeding_extrema() {
        let mut registry = Registry::new(DisplayZone::Utc);
        let outcome = registry.ingest(b"CA\t1428300000000\tg\t1\t0\t2\t0\t3\tnan");
        assert_eq!(outcome, Outcome::Skipped(Malformed::InvalidNumber("surface temperature")));
        registry.ingest(&line("CA", 1_438_599_600_000, 1.0, 0, 1.0, 0, 300.0));
        registry.ingest(&line("CA", 1_430_308_800_000, 1.0, 0, 1.0, 0, 250.0));

        let state = registry.get("CA").unwrap();
        assert_eq!(registry.skipped(), 1);
        assert_eq!(state.record_count(), 2);
        assert!((state.max_temperature().value - kelvin_to_fahrenheit(300.0)).abs() < 1e-9);
        assert!((state.min_temperature().value - kelvin_to_fahrenheit(250.0)).abs() < 1e-9);
        assert_eq!(state.max_temperature().time, "Mon Aug  3 11:00:00 2015");
        assert_eq!(state.min_temperature().time, "Wed Apr 29 12:00:00 2015");
    }

    #[test]
    fn huge_percentages_do_not_wrap_sums() {
        let mut registry = Registry::new(DisplayZone::Utc);
        registry.ingest(&line("CA", 1_428_300_000_000, 1e19, 0, 1e19, 0, 280.0));
        registry.ingest(&line("CA", 1_428_300_000_000, 1e19, 0, 1e19, 0, 280.0));

        let state = registry.get("CA").unwrap();
        assert_eq!(state.humidity_sum(), 200);
        assert_eq!(state.cloud_sum(), 200);
        assert!((state.average_humidity() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn sums_saturate_at_the_top_of_the_range() {
        let mut registry = Registry::new(DisplayZone::Utc);
        registry.ingest(&line("CA", 1_428_300_000_000, 100.0, 0, 100.0, 0, 280.0));
        registry.states[0].humidity_sum = u64::MAX - 10;
        registry.ingest(&line("CA", 1_428_300_000_000, 100.0, 0, 100.0, 0, 280.0));

        assert_eq!(registry.get("CA").unwrap().humidity_sum(), u64::MAX);
    }

    #[test]
    fn codes_enumerate_in_first_seen_order() {
        let mut registry = Registry::new(DisplayZone::Utc);
        for code in ["TN", "WA", "CA", "WA", "TN", "AZ"] {
            registry.ingest(&line(code, 1_428_300_000_000, 1.0, 0, 1.0, 0, 280.0));
        }

        assert_eq!(registry.codes().collect::<Vec<_>>(), ["TN", "WA", "CA", "AZ"]);
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get("WA").unwrap().record_count(), 2);
    }

    #[test]
    fn codes_are_case_sensitive() {
        let mut registry = Registry::new(DisplayZone::Utc);
        registry.ingest(&line("CA", 1_428_300_000_000, 1.0, 0, 1.0, 0, 280.0));
        registry.ingest(&line("ca", 1_428_300_000_000, 1.0, 0, 1.0, 0, 280.0));

        assert_eq!(registry.len(), 2);
        assert!(registry.get("Ca").is_none());
    }

    #[test]
    fn malformed_lines_are_counted_not_ingested() {
        let mut registry = Registry::new(DisplayZone::Utc);
        let outcome = registry.ingest(b"CA\t1428300000000\t9prcjqk3yc80");
        assert_eq!(outcome, Outcome::Skipped(Malformed::MissingFields(3)));
        assert_eq!(registry.ingest(b"  \t\n"), Outcome::Blank);

        assert!(registry.is_empty());
        assert_eq!(registry.skipped(), 1);
    }

    #[test]
    fn no_cap_on_distinct_codes() {
        let mut registry = Registry::new(DisplayZone::Utc);
        for number in 0..75 {
            registry.ingest(&line(&format!("S{number}"), 1_428_300_000_000, 1.0, 0, 1.0, 0, 280.0));
        }
        assert_eq!(registry.len(), 75);
    }
}
