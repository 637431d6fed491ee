use std::ops::{Add, AddAssign, Div, Mul};

use serde::Serialize;

// Launch frame: x downrange, y up
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub const ZERO: Vector2D = Vector2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    pub fn from_attitude(angle: f64, magnitude: f64) -> Self {
        Vector2D::new(magnitude * angle.sin(), magnitude * angle.cos())
    }

    pub fn magnitude(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn dot(&self, other: &Vector2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    // Clockwise from vertical, same convention as attitude
    pub fn angle_from_vertical(&self) -> f64 {
        self.x.atan2(self.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn clamp_magnitude(self, limit: f64) -> Self {
        let magnitude = self.magnitude();
        if magnitude > limit && magnitude > 0.0 {
            self * (limit / magnitude)
        } else {
            self
        }
    }
}

impl Add for Vector2D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for Vector2D {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Mul<f64> for Vector2D {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Vector2D::new(self.x * scalar, self.y * scalar)
    }
}

impl Div<f64> for Vector2D {
    type Output = Self;

    fn div(self, scalar: f64) -> Self {
        Vector2D::new(self.x / scalar, self.y / scalar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn test_attitude_round_trip() {
        let v = Vector2D::from_attitude(FRAC_PI_4, 2.0);
        assert_relative_eq!(v.magnitude(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(v.angle_from_vertical(), FRAC_PI_4, epsilon = 1e-12);
    }

    #[test]
    fn test_vertical_has_zero_angle() {
        assert_eq!(Vector2D::new(0.0, 5.0).angle_from_vertical(), 0.0);
        assert!(Vector2D::new(1.0, 0.0).angle_from_vertical() > 0.0);
    }

    #[test]
    fn test_dot_product() {
        let along = Vector2D::from_attitude(FRAC_PI_4, 1.0);
        let projected = Vector2D::new(3.0, 3.0).dot(&along);
        assert_relative_eq!(projected, 3.0 * 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(Vector2D::new(1.0, 0.0).dot(&Vector2D::new(0.0, 2.0)), 0.0);
    }

    #[test]
    fn test_clamp_magnitude() {
        let v = Vector2D::new(60.0, 80.0).clamp_magnitude(50.0);
        assert_relative_eq!(v.magnitude(), 50.0, epsilon = 1e-12);
        assert_relative_eq!(v.x, 30.0, epsilon = 1e-12);

        let short = Vector2D::new(3.0, 4.0);
        assert_eq!(short.clamp_magnitude(50.0), short);
    }
}
