//! CSV boundary for groundwater depth readings
//!
//! Source datasets disagree on almost everything: column names
//! (`depth_to_water_feet`, `wl(m)`, `GSWS`), date formats (`%Y-%m-%d`,
//! `%m/%d/%Y`, `%m-%d-%Y`) and units. The caller declares the shape once
//! via [`CsvColumns`] and everything past this module works with typed
//! [`Measurement`] records.

use std::collections::BTreeMap;
use std::io::Read;

use chrono::{Datelike, NaiveDate};
use csv::ReaderBuilder;

use crate::{physics, Result, SonificationError};

/// Unit of a raw depth reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceUnit {
    Feet,
    Meters,
}

impl DistanceUnit {
    /// Convert a raw reading in this unit to meters
    pub fn to_meters(self, raw: f64) -> f64 {
        match self {
            DistanceUnit::Feet => physics::feet_to_meters(raw),
            DistanceUnit::Meters => raw,
        }
    }
}

/// A single depth reading as it appears in the source data
///
/// Immutable once read; unit conversion happens on access.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub date: NaiveDate,
    pub raw_depth: f64,
    pub unit: DistanceUnit,
}

impl Measurement {
    /// Depth below ground in meters
    pub fn distance_meters(&self) -> f64 {
        self.unit.to_meters(self.raw_depth)
    }
}

/// Where to find the date and depth in a CSV row
#[derive(Debug, Clone)]
pub struct CsvColumns {
    /// Header name of the date column
    pub date_column: String,
    /// strftime format the date column parses against
    pub date_format: String,
    /// Header name of the depth column
    pub distance_column: String,
    /// Unit of the depth column
    pub unit: DistanceUnit,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            date_column: "date".to_string(),
            date_format: "%Y-%m-%d".to_string(),
            distance_column: "depth_to_water_feet".to_string(),
            unit: DistanceUnit::Feet,
        }
    }
}

/// How to reduce the raw readings before mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Keep every reading in input order
    None,
    /// One median reading per calendar year
    Yearly,
    /// One median reading per decade
    Decade,
}

/// Parse CSV rows into measurements
///
/// Rows with an empty depth cell are skipped. A non-numeric depth or a
/// date that does not parse against the declared format is fatal; the
/// run aborts rather than guessing.
pub fn read_measurements<R: Read>(reader: R, columns: &CsvColumns) -> Result<Vec<Measurement>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let date_index = column_index(&headers, &columns.date_column)?;
    let distance_index = column_index(&headers, &columns.distance_column)?;

    let mut measurements = Vec::new();

    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        // Empty depth cells are gaps in the record, not errors
        let raw = match record.get(distance_index) {
            Some(value) if !value.is_empty() => value,
            _ => continue,
        };

        let raw_depth: f64 = raw.parse().map_err(|_| SonificationError::InvalidDistance {
            line,
            value: raw.to_string(),
        })?;

        let date_value = record.get(date_index).unwrap_or("");
        let date =
            NaiveDate::parse_from_str(date_value, &columns.date_format).map_err(|_| {
                SonificationError::InvalidDate {
                    line,
                    value: date_value.to_string(),
                }
            })?;

        measurements.push(Measurement {
            date,
            raw_depth,
            unit: columns.unit,
        });
    }

    Ok(measurements)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or_else(|| SonificationError::MissingColumn(name.to_string()))
}

/// Reduce readings to one median value per bucket
///
/// Unit conversion runs before bucketing, so medians are taken in meters
/// regardless of the source unit. Output carries one measurement per
/// bucket, dated January 1 of the bucket year, ascending by bucket key.
pub fn aggregate(measurements: Vec<Measurement>, aggregation: Aggregation) -> Vec<Measurement> {
    let bucket_year: fn(i32) -> i32 = match aggregation {
        Aggregation::None => return measurements,
        Aggregation::Yearly => |year| year,
        Aggregation::Decade => |year| year / 10 * 10,
    };

    let mut buckets: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for measurement in &measurements {
        buckets
            .entry(bucket_year(measurement.date.year()))
            .or_default()
            .push(measurement.distance_meters());
    }

    buckets
        .into_iter()
        .map(|(year, mut values)| Measurement {
            date: year_start(year),
            raw_depth: median(&mut values),
            unit: DistanceUnit::Meters,
        })
        .collect()
}

fn year_start(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Median of a non-empty slice; even-length input averages the middle pair
fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) / 2.0
    }
}
