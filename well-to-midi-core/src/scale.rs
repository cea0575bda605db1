//! Linear rescaling and musical pitch quantization
//!
//! Impact energies are normalized against the dataset's extremes and then
//! mapped into musical parameter ranges: a quantized pitch on a fixed
//! scale, a velocity between the configured attack bounds, and a note
//! length between the configured duration bounds.

/// An ordered set of pitch-class names reachable by the quantizer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale {
    pub name: &'static str,
    pub pitch_classes: &'static [&'static str],
}

/// C major
pub const C_MAJOR: Scale = Scale {
    name: "C major",
    pitch_classes: &["C", "D", "E", "F", "G", "A", "B"],
};

/// C natural minor
pub const C_MINOR: Scale = Scale {
    name: "C minor",
    pitch_classes: &["C", "D", "Eb", "F", "G", "Ab", "Bb"],
};

/// C major pentatonic
pub const C_PENTATONIC: Scale = Scale {
    name: "C pentatonic",
    pitch_classes: &["C", "D", "E", "G", "A"],
};

impl Scale {
    /// Number of scale degrees per octave
    pub fn len(&self) -> usize {
        self.pitch_classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitch_classes.is_empty()
    }
}

/// Position of `value` in `[min, max]` as a 0..1 fraction
///
/// `reverse` flips the direction so `min` maps to 1 and `max` to 0.
/// Values outside the domain extrapolate past 0 or 1 rather than clamp;
/// bounds are expected to come from the same dataset as `value`.
pub fn linear_scale_pct(min: f64, max: f64, value: f64, reverse: bool) -> f64 {
    if reverse {
        (max - value) / (max - min)
    } else {
        (value - min) / (max - min)
    }
}

/// Quantize a 0..1 position into a named note on `scale`
///
/// The reachable window spans `octave_range` octaves upward from
/// `base_octave`. Positions at or past 1.0 land on the top degree.
pub fn scale_to_note(
    pct: f64,
    scale: &Scale,
    base_octave: u8,
    octave_range: u8,
) -> (&'static str, u8) {
    let degrees = scale.len() * octave_range as usize;
    let index = ((pct * degrees as f64) as usize).min(degrees.saturating_sub(1));

    let name = scale.pitch_classes[index % scale.len()];
    let octave = base_octave + (index / scale.len()) as u8;
    (name, octave)
}

/// MIDI pitch number for a pitch-class name and octave
///
/// Standard 12-tone numbering with C4 = 60. Sharps (`#`) raise and flats
/// (`b`) lower by a semitone each.
pub fn note_to_midi_pitch(name: &str, octave: u8) -> u8 {
    let mut chars = name.chars();
    let letter = chars.next().unwrap_or('C').to_ascii_uppercase();

    let mut semitone = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => 0,
    };
    for accidental in chars {
        match accidental {
            '#' => semitone += 1,
            'b' => semitone -= 1,
            _ => {}
        }
    }

    ((octave as i32 + 1) * 12 + semitone).clamp(0, 127) as u8
}

/// Linear interpolation of a 0..1 position into a velocity range
///
/// The position itself is not clamped; only the final value is forced
/// into the valid MIDI range.
pub fn scale_attack(pct: f64, min_attack: u8, max_attack: u8) -> u8 {
    let attack = min_attack as f64 + pct * (max_attack as f64 - min_attack as f64);
    attack.round().clamp(0.0, 127.0) as u8
}

/// Linear interpolation of a 0..1 position into a beat duration range
pub fn scale_duration(pct: f64, min_duration: f64, max_duration: f64) -> f64 {
    min_duration + pct * (max_duration - min_duration)
}
