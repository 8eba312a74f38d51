use std::fmt::{Display, Formatter};

use bstr::ByteSlice;
use chrono::{DateTime, Utc};

use crate::convert::instant_from_millis;

/// Lines longer than this are rejected instead of being tokenized.
pub const MAX_LINE_LEN: usize = 4096;
const FIELD_COUNT: usize = 9;

const TAB: char = '\t';
const SPACE: char = ' ';
const NEWLINE: char = '\n';
const CARRIAGE_RETURN: char = '\r';

/// One well-formed line of a TDV file.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation<'a> {
    pub code: &'a str,
    pub observed_at: DateTime<Utc>,
    pub humidity: u64,
    pub snow: bool,
    pub cloud_cover: u64,
    pub lightning: bool,
    pub surface_temp_kelvin: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Malformed {
    TooLong(usize),
    MissingFields(usize),
    InvalidCode,
    InvalidNumber(&'static str),
    TimestampOutOfRange,
}

impl Display for Malformed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Malformed::TooLong(length) => write!(f, "line of {length} bytes exceeds {MAX_LINE_LEN}"),
            Malformed::MissingFields(found) => write!(f, "expected {FIELD_COUNT} fields, found {found}"),
            Malformed::InvalidCode => write!(f, "state code is not valid UTF-8"),
            Malformed::InvalidNumber(field) => write!(f, "{field} is not a number"),
            Malformed::TimestampOutOfRange => write!(f, "timestamp is out of range"),
        }
    }
}

#[inline]
fn is_delimiter(character: char) -> bool {
    matches!(character, TAB | SPACE | NEWLINE | CARRIAGE_RETURN)
}

/// Splits a line into its non-empty fields, in order.
pub fn tokenize(line: &[u8]) -> impl Iterator<Item = &[u8]> {
    line.fields_with(is_delimiter)
}

impl<'a> Observation<'a> {
    pub fn parse(line: &'a [u8]) -> Result<Self, Malformed> {
        if line.len() > MAX_LINE_LEN {
            return Err(Malformed::TooLong(line.len()));
        }

        let mut slots: [&[u8]; FIELD_COUNT] = [b"".as_slice(); FIELD_COUNT];
        let mut found = 0;
        for (slot, field) in slots.iter_mut().zip(tokenize(line)) {
            *slot = field;
            found += 1;
        }
        if found < FIELD_COUNT {
            return Err(Malformed::MissingFields(found));
        }

        let [code, timestamp, _geohash, humidity, snow, cloud_cover, lightning, _pressure, kelvin] = slots;

        let code = code.to_str().map_err(|_| Malformed::InvalidCode)?;
        let millis: i64 = parse_number(timestamp, "timestamp")?;
        let observed_at = instant_from_millis(millis).ok_or(Malformed::TimestampOutOfRange)?;

        Ok(Self {
            code,
            observed_at,
            humidity: parse_percentage(humidity, "humidity")?,
            snow: parse_flag(snow, "snow")?,
            cloud_cover: parse_percentage(cloud_cover, "cloud cover")?,
            lightning: parse_flag(lightning, "lightning")?,
            surface_temp_kelvin: parse_finite(kelvin, "surface temperature")?,
        })
    }
}

fn parse_number<T: std::str::FromStr>(field: &[u8], name: &'static str) -> Result<T, Malformed> {
    field
        .to_str()
        .ok()
        .and_then(|text| text.parse().ok())
        .ok_or(Malformed::InvalidNumber(name))
}

/// `nan` and `inf` parse as `f64` but are rejected here.
fn parse_finite(field: &[u8], name: &'static str) -> Result<f64, Malformed> {
    parse_number::<f64>(field, name)
        .and_then(|value| if value.is_finite() { Ok(value) } else { Err(Malformed::InvalidNumber(name)) })
}

/// Integer part, clamped to 0..=100.
fn parse_percentage(field: &[u8], name: &'static str) -> Result<u64, Malformed> {
    parse_finite(field, name).map(|value| value.trunc().clamp(0.0, 100.0) as u64)
}

fn parse_flag(field: &[u8], name: &'static str) -> Result<bool, Malformed> {
    parse_finite(field, name).map(|value| value.trunc() != 0.0)
}
