//! Three-component vectors in a map's local coordinate frame

use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

/// A point or displacement in game units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean length
    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(self, other: Vec3) -> f64 {
        (self - other).length()
    }

    /// Distance in the horizontal X/Y plane, ignoring elevation
    pub fn planar_distance(self, other: Vec3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_zero(self) -> bool {
        self == Vec3::ZERO
    }

    /// Every component truncated toward zero
    ///
    /// `-0.5` becomes `0`, not `-0`.
    pub fn trunc(self) -> Self {
        Self::new(
            self.x.trunc() + 0.0,
            self.y.trunc() + 0.0,
            self.z.trunc() + 0.0,
        )
    }

    pub fn approx_eq(self, other: Vec3, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.z - other.z).abs() <= epsilon
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        self + (-rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Space-separated components, the form console position commands accept
impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // -0.0 + 0.0 == +0.0, never print "-0"
        write!(f, "{} {} {}", self.x + 0.0, self.y + 0.0, self.z + 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(-4.0, 0.5, 10.0);
        assert_eq!(a + b, Vec3::new(-3.0, 2.5, 13.0));
        assert_eq!(a - b, Vec3::new(5.0, 1.5, -7.0));
        assert_eq!(-a, Vec3::new(-1.0, -2.0, -3.0));

        let mut c = a;
        c += b;
        assert_eq!(c, a + b);
    }

    #[test]
    fn test_distances() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(3.0, 4.0, 12.0);
        assert_eq!(b.length(), 13.0);
        assert_eq!(a.distance(b), 13.0);
        assert_eq!(a.planar_distance(b), 5.0);
    }

    #[test]
    fn test_display_integral_components() {
        assert_eq!(Vec3::new(12.0, -3.0, 0.0).to_string(), "12 -3 0");
        assert_eq!(Vec3::new(1.5, 0.25, -2.0).to_string(), "1.5 0.25 -2");
    }

    #[test]
    fn test_trunc() {
        assert_eq!(
            Vec3::new(1.9, -1.9, 0.2).trunc(),
            Vec3::new(1.0, -1.0, 0.0)
        );
    }

    #[test]
    fn test_negative_zero_prints_as_zero() {
        let truncated = Vec3::new(-0.5, 3.0, 4.0).trunc();
        assert!(truncated.x.is_sign_positive());
        assert_eq!(truncated.to_string(), "0 3 4");
        assert_eq!(Vec3::new(-0.0, 0.0, -0.0).to_string(), "0 0 0");
        assert_eq!(Vec3::new(-1.5, 0.0, 2.25).to_string(), "-1.5 0 2.25");
    }
}
