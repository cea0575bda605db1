//! MIDI timeline and file serialization
//!
//! This module owns musical time: calendar dates compress onto the beat
//! axis through the seconds-per-year factor, and finished note events
//! serialize into a standard MIDI file. Byte-level encoding is `midly`'s
//! job; this module only assembles headers, tracks and delta times.

use chrono::NaiveDate;
use midly::{Format, Header, MetaMessage, MidiMessage, Timing, Track, TrackEvent, TrackEventKind};

use crate::events::NoteEvent;
use crate::{Result, SonificationConfig, SonificationError};

/// Days per year on the beat axis, accounting for leap years
const DAYS_PER_YEAR: f64 = 365.25;

/// Maps calendar time to beats and writes the output file
///
/// Carries the four timing parameters of a run: tempo, the time
/// compression factor, the epoch and the tick resolution.
#[derive(Debug, Clone)]
pub struct MidiTimeline {
    pub tempo: f64,
    pub seconds_per_year: f64,
    pub epoch: NaiveDate,
    pub ticks_per_quarter: u16,
}

impl MidiTimeline {
    pub fn new(config: &SonificationConfig) -> MidiTimeline {
        MidiTimeline {
            tempo: config.tempo,
            seconds_per_year: config.seconds_per_year,
            epoch: config.epoch,
            ticks_per_quarter: config.ticks_per_quarter,
        }
    }

    /// Signed day offset of `date` from the epoch
    pub fn days_since_epoch(&self, date: NaiveDate) -> i64 {
        date.signed_duration_since(self.epoch).num_days()
    }

    /// Beat position of a day offset
    ///
    /// A data year lasts `seconds_per_year` wall seconds, i.e.
    /// `seconds_per_year / 60 * tempo` beats. Results are rounded to two
    /// decimals, the grid the mapping curves were tuned on.
    pub fn beat(&self, days: i64) -> f64 {
        let beats_per_year = self.seconds_per_year / 60.0 * self.tempo;
        let beats_per_day = beats_per_year / DAYS_PER_YEAR;
        round2(days as f64 * beats_per_day)
    }

    /// Beats spanned by a wall-clock duration
    pub fn seconds_to_beats(&self, seconds: f64) -> f64 {
        seconds * self.tempo / 60.0
    }

    /// Tick position of a beat offset
    pub fn beats_to_ticks(&self, beats: f64) -> u32 {
        (beats * self.ticks_per_quarter as f64).round().max(0.0) as u32
    }

    /// Serialize event lists into a format-1 MIDI file
    ///
    /// One note track per event list, preceded by a meta track carrying
    /// the tempo.
    pub fn write_tracks(&self, event_lists: &[Vec<NoteEvent>]) -> Result<Vec<u8>> {
        let timing = Timing::Metrical(self.ticks_per_quarter.try_into().unwrap_or(480.into()));
        let header = Header::new(Format::Parallel, timing);

        let mut tracks = Vec::new();
        tracks.push(self.tempo_track());
        for events in event_lists {
            tracks.push(self.note_track(events));
        }

        let smf = midly::Smf { header, tracks };

        let mut buffer = Vec::new();
        smf.write(&mut buffer)
            .map_err(|e| SonificationError::MidiWriteError(e.to_string()))?;

        Ok(buffer)
    }

    fn tempo_track(&self) -> Track<'static> {
        let micros_per_beat = (60_000_000.0 / self.tempo).round() as u32;

        Track::from(vec![
            TrackEvent {
                delta: 0.into(),
                kind: TrackEventKind::Meta(MetaMessage::Tempo(
                    micros_per_beat.try_into().unwrap_or(500_000.into()),
                )),
            },
            TrackEvent {
                delta: 0.into(),
                kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
            },
        ])
    }

    fn note_track(&self, events: &[NoteEvent]) -> Track<'static> {
        // Flatten to absolute-tick on/off pairs first; falling notes can
        // overlap their neighbors, so deltas are only computed after the
        // whole track is ordered.
        let mut moments: Vec<(u32, TrackEventKind<'static>)> = Vec::new();

        for event in events {
            let on_tick = self.beats_to_ticks(event.onset_beat);
            let off_tick = self
                .beats_to_ticks(event.onset_beat + event.duration_beats)
                .max(on_tick);

            moments.push((
                on_tick,
                TrackEventKind::Midi {
                    channel: event.channel.into(),
                    message: MidiMessage::NoteOn {
                        key: event.pitch.into(),
                        vel: event.velocity.into(),
                    },
                },
            ));
            moments.push((
                off_tick,
                TrackEventKind::Midi {
                    channel: event.channel.into(),
                    message: MidiMessage::NoteOff {
                        key: event.pitch.into(),
                        vel: 0.into(),
                    },
                },
            ));
        }

        moments.sort_by_key(|(tick, _)| *tick);

        let mut track = Track::new();
        let mut current_tick = 0u32;
        for (tick, kind) in moments {
            let delta = tick.saturating_sub(current_tick);
            track.push(TrackEvent {
                delta: delta.try_into().unwrap_or(0.into()),
                kind,
            });
            current_tick = tick;
        }

        track.push(TrackEvent {
            delta: 0.into(),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });

        track
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline() -> MidiTimeline {
        MidiTimeline::new(&SonificationConfig::default())
    }

    #[test]
    fn test_days_since_epoch() {
        let timeline = timeline();

        assert_eq!(
            timeline.days_since_epoch(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()),
            0
        );
        assert_eq!(
            timeline.days_since_epoch(NaiveDate::from_ymd_opt(1970, 1, 31).unwrap()),
            30
        );
        // dates before the epoch go negative
        assert_eq!(
            timeline.days_since_epoch(NaiveDate::from_ymd_opt(1969, 12, 31).unwrap()),
            -1
        );
    }

    #[test]
    fn test_beat_conversion() {
        // 5 seconds per year at 120 BPM = 10 beats per data year
        let timeline = timeline();

        assert_eq!(timeline.beat(0), 0.0);

        let one_year = timeline.beat(365);
        assert!((one_year - 9.99).abs() < 1e-9, "got {one_year}");

        // rounded to two decimals
        let beat = timeline.beat(100);
        assert_eq!(beat, (beat * 100.0).round() / 100.0);
    }

    #[test]
    fn test_seconds_to_beats() {
        let timeline = timeline();

        // at 120 BPM one second is two beats
        assert_eq!(timeline.seconds_to_beats(1.0), 2.0);
        assert_eq!(timeline.seconds_to_beats(0.0), 0.0);
    }

    #[test]
    fn test_beats_to_ticks() {
        let timeline = timeline();

        assert_eq!(timeline.beats_to_ticks(0.0), 0);
        assert_eq!(timeline.beats_to_ticks(1.0), 480);
        assert_eq!(timeline.beats_to_ticks(2.5), 1200);
        // negative beats clamp at zero rather than wrap
        assert_eq!(timeline.beats_to_ticks(-1.0), 0);
    }

    #[test]
    fn test_write_tracks() {
        let timeline = timeline();
        let events = vec![
            NoteEvent {
                onset_beat: 0.0,
                pitch: 60,
                velocity: 80,
                duration_beats: 1.0,
                channel: 0,
            },
            NoteEvent {
                onset_beat: 0.5,
                pitch: 64,
                velocity: 90,
                duration_beats: 2.0,
                channel: 0,
            },
        ];

        let bytes = timeline.write_tracks(&[events]).unwrap();

        assert!(!bytes.is_empty());
        assert_eq!(&bytes[..4], b"MThd");
    }

    #[test]
    fn test_write_tracks_is_deterministic() {
        let timeline = timeline();
        let events = vec![NoteEvent {
            onset_beat: 0.0,
            pitch: 72,
            velocity: 60,
            duration_beats: 0.5,
            channel: 1,
        }];

        let first = timeline.write_tracks(&[events.clone()]).unwrap();
        let second = timeline.write_tracks(&[events]).unwrap();

        assert_eq!(first, second);
    }
}
