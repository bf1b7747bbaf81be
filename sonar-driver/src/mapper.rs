use crate::numeric::degree_to_radian;

/// Maps a sweep angle and range to display coordinates,
/// with 0° pointing up and angles increasing clockwise.
pub fn polar_to_cartesian(angle_deg: f64, distance: f64) -> (f64, f64) {
    let theta = degree_to_radian(90. - angle_deg);
    (distance * f64::cos(theta), distance * f64::sin(theta))
}
