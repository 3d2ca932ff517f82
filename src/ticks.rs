//! Axis tick values. Positions are data values (depth or along-line distance);
//! mapping them into drawing units is up to the caller.

use serde::Serialize;

use crate::model::DepthRange;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

impl Tick {
    fn at(value: f64) -> Self {
        Self {
            value,
            label: format!("{value}"),
        }
    }
}

/// Distance tick interval for a profile line of `total_length` metres.
pub fn distance_tick_interval(total_length: f64) -> f64 {
    if total_length <= 500.0 {
        100.0
    } else if total_length <= 1000.0 {
        200.0
    } else if total_length <= 3000.0 {
        500.0
    } else if total_length <= 5000.0 {
        1000.0
    } else {
        2000.0
    }
}

/// Ticks from 0 to `total_length` inclusive.
pub fn distance_ticks(total_length: f64) -> Vec<Tick> {
    if !(total_length.is_finite() && total_length >= 0.0) {
        return Vec::new();
    }
    let interval = distance_tick_interval(total_length);
    (0..)
        .map(|k| k as f64 * interval)
        .take_while(|&value| value <= total_length)
        .map(Tick::at)
        .collect()
}

/// Multiples of `interval` inside `range`, counted from 0 in both directions,
/// ascending.
pub fn depth_ticks(range: DepthRange, interval: f64) -> Vec<Tick> {
    if !(interval.is_finite() && interval > 0.0) || !range.lower.is_finite() || !range.upper.is_finite() {
        return Vec::new();
    }

    let mut ticks: Vec<Tick> = (0..)
        .map(|k| 0.0 - k as f64 * interval)
        .take_while(|&value| value >= range.lower)
        .filter(|&value| value <= range.upper)
        .map(Tick::at)
        .collect();
    ticks.reverse();

    ticks.extend(
        (1..)
            .map(|k| k as f64 * interval)
            .take_while(|&value| value <= range.upper)
            .filter(|&value| value >= range.lower)
            .map(Tick::at),
    );
    ticks
}
