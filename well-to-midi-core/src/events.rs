//! Note event construction for the falling and splashing tracks
//!
//! Every sample yields exactly two notes: a fixed-pitch "falling" note at
//! the reading's beat position lasting as long as the free fall, and a
//! "splashing" note whose onset, pitch, velocity and length all follow
//! from the impact — the splash sounds exactly when the fall ends.

use crate::loader::Measurement;
use crate::midi::MidiTimeline;
use crate::{physics, scale, Result, SonificationConfig, SonificationError};

/// A measurement resolved into musical time and impact physics
///
/// Computed once per measurement, never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedSample {
    pub days_since_epoch: i64,
    pub beat: f64,
    pub distance_meters: f64,
    pub fall_duration_secs: f64,
    pub impact_energy: f64,
}

impl TimedSample {
    /// Resolve one measurement against the timeline and the pebble physics
    pub fn from_measurement(
        measurement: &Measurement,
        timeline: &MidiTimeline,
        config: &SonificationConfig,
    ) -> TimedSample {
        let distance_meters = measurement.distance_meters();
        let days_since_epoch = timeline.days_since_epoch(measurement.date);
        let velocity = physics::impact_velocity(distance_meters, config.gravity);

        TimedSample {
            days_since_epoch,
            beat: timeline.beat(days_since_epoch),
            distance_meters,
            fall_duration_secs: physics::fall_duration(distance_meters, config.gravity),
            impact_energy: physics::impact_energy(config.pebble_mass_grams, velocity),
        }
    }
}

/// Resolve every measurement, preserving input order
pub fn derive_samples(
    measurements: &[Measurement],
    timeline: &MidiTimeline,
    config: &SonificationConfig,
) -> Vec<TimedSample> {
    measurements
        .iter()
        .map(|m| TimedSample::from_measurement(m, timeline, config))
        .collect()
}

/// Impact-energy extremes of a full dataset
///
/// Every per-sample mapping normalizes against these, so they must be
/// computed over the complete dataset before any event is built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyBounds {
    pub min_energy: f64,
    pub max_energy: f64,
}

impl EnergyBounds {
    pub fn from_samples(samples: &[TimedSample]) -> Result<EnergyBounds> {
        if samples.is_empty() {
            return Err(SonificationError::EmptyDataset);
        }

        let mut min_energy = f64::INFINITY;
        let mut max_energy = f64::NEG_INFINITY;
        for sample in samples {
            min_energy = min_energy.min(sample.impact_energy);
            max_energy = max_energy.max(sample.impact_energy);
        }

        Ok(EnergyBounds {
            min_energy,
            max_energy,
        })
    }
}

/// One note, ready for serialization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteEvent {
    pub onset_beat: f64,
    pub pitch: u8,
    pub velocity: u8,
    pub duration_beats: f64,
    pub channel: u8,
}

/// Build the falling track: one fixed-pitch note per sample
///
/// Onsets are rebased so the first sample lands on beat zero; each note
/// sounds for the length of its free fall.
pub fn build_falling_events(
    samples: &[TimedSample],
    config: &SonificationConfig,
) -> Result<Vec<NoteEvent>> {
    let first = samples.first().ok_or(SonificationError::EmptyDataset)?;

    Ok(samples
        .iter()
        .map(|sample| NoteEvent {
            onset_beat: sample.beat - first.beat,
            pitch: config.falling_pitch,
            velocity: config.falling_velocity,
            duration_beats: sample.fall_duration_secs * config.tempo / 60.0,
            channel: config.falling_channel,
        })
        .collect())
}

/// Build the splashing track: one energy-mapped note per sample
///
/// Each splash starts where its falling note ends. Heavier impacts land
/// lower on the scale, louder, and longer.
pub fn build_splashing_events(
    samples: &[TimedSample],
    bounds: &EnergyBounds,
    config: &SonificationConfig,
) -> Result<Vec<NoteEvent>> {
    let first = samples.first().ok_or(SonificationError::EmptyDataset)?;

    Ok(samples
        .iter()
        .map(|sample| {
            let fall_beats = sample.fall_duration_secs * config.tempo / 60.0;

            let pct = scale::linear_scale_pct(
                bounds.min_energy,
                bounds.max_energy,
                sample.impact_energy,
                false,
            );
            let reversed = scale::linear_scale_pct(
                bounds.min_energy,
                bounds.max_energy,
                sample.impact_energy,
                true,
            );

            let (name, octave) =
                scale::scale_to_note(reversed, &config.scale, config.base_octave, config.octave_range);

            NoteEvent {
                onset_beat: sample.beat - first.beat + fall_beats,
                pitch: scale::note_to_midi_pitch(name, octave),
                velocity: scale::scale_attack(pct, config.min_attack, config.max_attack),
                duration_beats: scale::scale_duration(
                    pct,
                    config.min_impact_duration,
                    config.max_impact_duration,
                ),
                channel: config.splash_channel,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{read_measurements, CsvColumns};

    fn two_row_samples(config: &SonificationConfig) -> Vec<TimedSample> {
        let csv_data = "date,depth_to_water_feet\n2001-01-01,10\n2002-01-01,20";
        let measurements =
            read_measurements(csv_data.as_bytes(), &CsvColumns::default()).unwrap();
        let timeline = MidiTimeline::new(config);
        derive_samples(&measurements, &timeline, config)
    }

    #[test]
    fn test_timed_sample_physics() {
        let config = SonificationConfig::default();
        let samples = two_row_samples(&config);

        assert_eq!(samples.len(), 2);
        assert!((samples[0].distance_meters - 3.048).abs() < 1e-9);
        assert!((samples[0].fall_duration_secs - (2.0 * 3.048 / 9.8_f64).sqrt()).abs() < 1e-9);
        assert!(samples[1].impact_energy > samples[0].impact_energy);
    }

    #[test]
    fn test_energy_bounds() {
        let config = SonificationConfig::default();
        let samples = two_row_samples(&config);

        let bounds = EnergyBounds::from_samples(&samples).unwrap();
        assert_eq!(bounds.min_energy, samples[0].impact_energy);
        assert_eq!(bounds.max_energy, samples[1].impact_energy);
    }

    #[test]
    fn test_energy_bounds_empty_is_fatal() {
        assert!(matches!(
            EnergyBounds::from_samples(&[]),
            Err(SonificationError::EmptyDataset)
        ));
    }

    #[test]
    fn test_falling_events() {
        let config = SonificationConfig::default();
        let samples = two_row_samples(&config);
        let timeline = MidiTimeline::new(&config);

        let falling = build_falling_events(&samples, &config).unwrap();

        assert_eq!(falling.len(), 2);

        // the sequence always starts at beat zero
        assert_eq!(falling[0].onset_beat, 0.0);

        // the second onset is the beat-converted day difference
        assert_eq!(samples[1].days_since_epoch - samples[0].days_since_epoch, 365);
        let day_gap_beats =
            timeline.beat(samples[1].days_since_epoch) - timeline.beat(samples[0].days_since_epoch);
        assert_eq!(falling[1].onset_beat, day_gap_beats);

        // fixed pitch and velocity, data-independent
        assert_eq!(falling[0].pitch, config.falling_pitch);
        assert_eq!(falling[1].pitch, config.falling_pitch);
        assert_eq!(falling[0].velocity, config.falling_velocity);

        // duration is the fall time in beats
        let expected_beats = samples[0].fall_duration_secs * config.tempo / 60.0;
        assert!((falling[0].duration_beats - expected_beats).abs() < 1e-12);
        assert_eq!(falling[0].channel, config.falling_channel);
    }

    #[test]
    fn test_splashing_events() {
        let config = SonificationConfig::default();
        let samples = two_row_samples(&config);
        let bounds = EnergyBounds::from_samples(&samples).unwrap();

        let falling = build_falling_events(&samples, &config).unwrap();
        let splashing = build_splashing_events(&samples, &bounds, &config).unwrap();

        assert_eq!(splashing.len(), 2);

        // each splash sounds exactly when its falling note ends
        for (fall, splash) in falling.iter().zip(&splashing) {
            assert!(
                (splash.onset_beat - (fall.onset_beat + fall.duration_beats)).abs() < 1e-12
            );
        }

        // the deeper reading maps to the loud end of the attack range
        assert_eq!(splashing[1].velocity, config.max_attack);
        assert_eq!(splashing[0].velocity, config.min_attack);
        assert!(splashing[1].velocity > splashing[0].velocity);

        // and to a longer, lower-register note
        assert!(splashing[1].duration_beats > splashing[0].duration_beats);
        assert!(splashing[1].pitch < splashing[0].pitch);

        assert_eq!(splashing[0].channel, config.splash_channel);
    }

    #[test]
    fn test_empty_input_is_fatal() {
        let config = SonificationConfig::default();
        let bounds = EnergyBounds {
            min_energy: 0.0,
            max_energy: 1.0,
        };

        assert!(matches!(
            build_falling_events(&[], &config),
            Err(SonificationError::EmptyDataset)
        ));
        assert!(matches!(
            build_splashing_events(&[], &bounds, &config),
            Err(SonificationError::EmptyDataset)
        ));
    }
}
