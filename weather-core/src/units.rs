//! Unit conversions used when normalizing station observations.

/// Miles per hour in one metre per second.
pub const MPH_PER_MPS: f64 = 2.237;

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

pub fn mps_to_mph(mps: f64) -> f64 {
    mps * MPH_PER_MPS
}

pub fn kmh_to_mps(kmh: f64) -> f64 {
    kmh / 3.6
}

/// Whole-degree Fahrenheit, as shown to users and stored in history.
pub fn rounded_fahrenheit(celsius: f64) -> i32 {
    celsius_to_fahrenheit(celsius).round() as i32
}

/// Relative humidity rounded to a whole percent and clamped into 0..=100.
pub fn rounded_humidity(pct: f64) -> u8 {
    pct.round().clamp(0.0, 100.0) as u8
}

/// Wind speed in mph with exactly one fractional digit, e.g. `"6.7"`.
pub fn format_mph(mps: f64) -> String {
    format!("{:.1}", mps_to_mph(mps))
}
