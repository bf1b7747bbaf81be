use crate::constants::{SWEEP_HALF_PERIOD, SWEEP_PERIOD};

pub(crate) fn degree_to_radian(degree: f64) -> f64 {
    degree * std::f64::consts::PI / 180.
}

/// Folds a free-running counter into a back-and-forth sweep over `[0, 180]`.
pub(crate) fn triangular_fold(counter: u32) -> u16 {
    let v = counter % SWEEP_PERIOD;
    let angle = if v > SWEEP_HALF_PERIOD {
        SWEEP_PERIOD - v
    } else {
        v
    };
    angle as u16
}

/// Parses decimal text and rounds it to the nearest integer (half away from zero).
/// Non-finite values are not readings.
pub(crate) fn parse_rounded(text: &str) -> Option<i64> {
    let value: f64 = text.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(value.round() as i64)
}
