//! Groundwater depth to MIDI conversion library
//!
//! This crate turns a time-series of well depth readings into a MIDI file.
//! Each reading becomes a pebble dropped down the well: a fixed "falling"
//! note sounds for the duration of the free fall, and an energy-mapped
//! "splashing" note sounds the moment the fall ends. Calendar time is
//! compressed onto the beat axis so decades of readings play in seconds.

use std::io::Read;

use chrono::NaiveDate;
use thiserror::Error;

pub mod events;
pub mod loader;
pub mod midi;
pub mod physics;
pub mod scale;

pub use events::*;
pub use loader::*;
pub use midi::*;
pub use physics::*;
pub use scale::*;

/// Errors that can occur during a sonification run
#[derive(Error, Debug)]
pub enum SonificationError {
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("column {0:?} not found in CSV header")]
    MissingColumn(String),

    #[error("line {line}: invalid date {value:?}")]
    InvalidDate { line: u64, value: String },

    #[error("line {line}: invalid distance {value:?}")]
    InvalidDistance { line: u64, value: String },

    #[error("no usable readings in input")]
    EmptyDataset,

    #[error("MIDI write error: {0}")]
    MidiWriteError(String),
}

/// Result type for sonification operations
pub type Result<T> = std::result::Result<T, SonificationError>;

/// Configuration for a sonification run
///
/// Built once per run and passed by reference through the pipeline; the
/// mapping functions hold no state of their own.
#[derive(Debug, Clone)]
pub struct SonificationConfig {
    /// Gravitational acceleration in m/s² (default: 9.8)
    pub gravity: f64,
    /// Mass of the dropped pebble in grams (default: 141, a baseball)
    pub pebble_mass_grams: f64,
    /// Tempo in beats per minute (default: 120)
    pub tempo: f64,
    /// Seconds of music per year of data (default: 5)
    pub seconds_per_year: f64,
    /// Date that maps to beat zero (default: 1970-01-01)
    pub epoch: NaiveDate,
    /// MIDI ticks per quarter note (default: 480)
    pub ticks_per_quarter: u16,
    /// Scale used to quantize splash pitches (default: C major)
    pub scale: Scale,
    /// Lowest octave of the splash pitch range (default: 3)
    pub base_octave: u8,
    /// Number of octaves spanned by the splash pitch range (default: 3)
    pub octave_range: u8,
    /// Softest splash velocity (default: 30)
    pub min_attack: u8,
    /// Loudest splash velocity (default: 127)
    pub max_attack: u8,
    /// Shortest splash length in beats (default: 0.5)
    pub min_impact_duration: f64,
    /// Longest splash length in beats (default: 4.0)
    pub max_impact_duration: f64,
    /// Pitch of every falling note (default: 72, C5)
    pub falling_pitch: u8,
    /// Velocity of every falling note (default: 60)
    pub falling_velocity: u8,
    /// Channel carrying the falling notes (default: 0)
    pub falling_channel: u8,
    /// Channel carrying the splash notes (default: 1)
    pub splash_channel: u8,
}

impl Default for SonificationConfig {
    fn default() -> Self {
        Self {
            gravity: physics::GRAVITY,
            pebble_mass_grams: physics::PEBBLE_MASS_GRAMS,
            tempo: 120.0,
            seconds_per_year: 5.0,
            // NaiveDate::default() is 1970-01-01
            epoch: NaiveDate::default(),
            ticks_per_quarter: 480,
            scale: scale::C_MAJOR,
            base_octave: 3,
            octave_range: 3,
            min_attack: 30,
            max_attack: 127,
            min_impact_duration: 0.5,
            max_impact_duration: 4.0,
            falling_pitch: 72,
            falling_velocity: 60,
            falling_channel: 0,
            splash_channel: 1,
        }
    }
}

/// Main conversion function
///
/// Runs the whole pipeline over one CSV source: read, optionally bucket,
/// resolve physics, normalize against the dataset's energy extremes, build
/// the falling and splashing tracks and serialize them.
///
/// # Arguments
/// * `reader` - A reader containing CSV data
/// * `columns` - Where to find the date and depth in each row
/// * `aggregation` - Optional median bucketing applied before mapping
/// * `config` - Configuration for the run
///
/// # Returns
/// * A Vec<u8> containing the MIDI file data
pub fn sonify_readings<R: Read>(
    reader: R,
    columns: &CsvColumns,
    aggregation: Aggregation,
    config: &SonificationConfig,
) -> Result<Vec<u8>> {
    let measurements = read_measurements(reader, columns)?;
    let measurements = aggregate(measurements, aggregation);

    let timeline = MidiTimeline::new(config);
    let samples = derive_samples(&measurements, &timeline, config);

    // Bounds come from the complete dataset; every per-sample mapping is
    // relative to these extremes, not to the sample's own value.
    let bounds = EnergyBounds::from_samples(&samples)?;

    let falling = build_falling_events(&samples, config)?;
    let splashing = build_splashing_events(&samples, &bounds, config)?;

    timeline.write_tracks(&[falling, splashing])
}

/// Convenience function for sonifying a CSV string
pub fn sonify_readings_from_str(
    csv_data: &str,
    columns: &CsvColumns,
    aggregation: Aggregation,
    config: &SonificationConfig,
) -> Result<Vec<u8>> {
    sonify_readings(csv_data.as_bytes(), columns, aggregation, config)
}
