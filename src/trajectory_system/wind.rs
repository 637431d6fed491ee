use crate::constants::{WIND_MULTIPLIER_CAP, WIND_REFERENCE_HEIGHT};
use crate::control::environment::WindProfile;

// Wind speed at `height` metres under a power-law boundary layer.
// `base_speed` is the speed measured at the 1.5 m reference height. The growth
// multiplier is capped at 3x so the profile stays plausible at altitude.
pub fn wind_speed_at_height(base_speed: f64, height: f64, profile: WindProfile) -> f64 {
    let exponent = profile.exponent();
    if height <= 0.0 || exponent == 0.0 {
        return base_speed;
    }
    let multiplier = (height / WIND_REFERENCE_HEIGHT)
        .powf(exponent)
        .min(WIND_MULTIPLIER_CAP);
    base_speed * multiplier
}
