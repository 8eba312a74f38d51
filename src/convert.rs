use chrono::{DateTime, Local, Utc};

/// `ctime` layout without the trailing newline, e.g. `Mon Aug  3 11:00:00 2015`.
const DISPLAY_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

pub fn kelvin_to_fahrenheit(kelvin: f64) -> f64 {
    kelvin * 1.8 - 459.67
}

/// Calendar used when rendering observation times.
///
/// `Local` follows the process timezone (`TZ` on Unix), the way `ctime` does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisplayZone {
    #[default]
    Local,
    Utc,
}

pub fn format_instant(instant: DateTime<Utc>, zone: DisplayZone) -> String {
    match zone {
        DisplayZone::Local => instant.with_timezone(&Local).format(DISPLAY_FORMAT).to_string(),
        DisplayZone::Utc => instant.format(DISPLAY_FORMAT).to_string(),
    }
}

/// Sub-second precision is dropped. `None` when the instant cannot be represented.
pub fn instant_from_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(millis / 1000, 0)
}

pub fn epoch_millis_to_display(millis: i64, zone: DisplayZone) -> Option<String> {
    instant_from_millis(millis).map(|instant| format_instant(instant, zone))
}
