//! Free-fall kinematics for the dropped-pebble model
//!
//! Pure functions over SI units. Gravity and mass arrive as arguments so a
//! run's configuration is the single source of every constant.

/// Gravitational acceleration in m/s²
pub const GRAVITY: f64 = 9.8;

/// Mass of the reference pebble in grams (5 oz, a baseball)
pub const PEBBLE_MASS_GRAMS: f64 = 141.0;

/// Meters per foot
pub const METERS_PER_FOOT: f64 = 0.3048;

/// Seconds for an object to free-fall `height_m` meters
pub fn fall_duration(height_m: f64, gravity: f64) -> f64 {
    (2.0 * height_m / gravity).sqrt()
}

/// Speed in m/s at the end of a free fall from `height_m` meters
pub fn impact_velocity(height_m: f64, gravity: f64) -> f64 {
    (2.0 * gravity * height_m).sqrt()
}

/// Impact energy scalar driving the sound mappings.
///
/// Not the textbook ½mv²: every pitch, attack and duration curve
/// downstream is tuned against `mass * velocity / 2`. Changing the form
/// changes the music.
pub fn impact_energy(mass_grams: f64, velocity: f64) -> f64 {
    mass_grams * velocity / 2.0
}

/// Convert feet to meters
pub fn feet_to_meters(feet: f64) -> f64 {
    feet * METERS_PER_FOOT
}
