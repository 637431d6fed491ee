use std::f64::consts::{PI, TAU};

pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped == -PI {
        PI
    } else {
        wrapped
    }
}

pub fn normalize_degrees(angle: f64) -> f64 {
    normalize_angle(angle.to_radians()).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normalize_angle() {
        assert_relative_eq!(normalize_angle(0.5), 0.5);
        assert_relative_eq!(normalize_angle(TAU + 0.5), 0.5, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(-TAU - 0.5), -0.5, epsilon = 1e-12);
        assert_relative_eq!(normalize_angle(PI), PI);
        assert_relative_eq!(normalize_angle(-PI), PI);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_relative_eq!(normalize_degrees(270.0), -90.0, epsilon = 1e-9);
        assert_relative_eq!(normalize_degrees(-200.0), 160.0, epsilon = 1e-9);
    }
}
