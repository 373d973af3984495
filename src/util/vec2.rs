use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub};

/// 2D point/vector on the normalized court (0-100 on both axes)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing along `degrees` (0 = +x, 90 = +y)
    #[inline]
    pub fn from_angle_degrees(degrees: f32) -> Self {
        let rad = degrees.to_radians();
        Self {
            x: rad.cos(),
            y: rad.sin(),
        }
    }

    #[inline]
    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline]
    pub fn length_sq(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub fn dot(&self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    #[inline]
    pub fn distance_to(&self, other: Vec2) -> f32 {
        (*self - other).length()
    }

    pub fn lerp(&self, other: Vec2, t: f32) -> Self {
        *self + (other - *self) * t
    }

    /// Direction angle in degrees, atan2 convention
    pub fn angle_degrees(&self) -> f32 {
        self.y.atan2(self.x).to_degrees()
    }

    /// Component-wise clamp into `[min, max]` on both axes
    pub fn clamp_axes(&self, min: f32, max: f32) -> Self {
        Self {
            x: self.x.clamp(min, max),
            y: self.y.clamp(min, max),
        }
    }

    /// Closest point to `self` on the segment `a..b` (clamped projection).
    /// A degenerate segment collapses to `a`.
    pub fn closest_point_on_segment(&self, a: Vec2, b: Vec2) -> Vec2 {
        let ab = b - a;
        let len_sq = ab.length_sq();
        if len_sq == 0.0 {
            return a;
        }
        let t = ((*self - a).dot(ab) / len_sq).clamp(0.0, 1.0);
        a + ab * t
    }

    /// Distance from `self` to the segment `a..b`
    pub fn distance_to_segment(&self, a: Vec2, b: Vec2) -> f32 {
        self.distance_to(self.closest_point_on_segment(a, b))
    }

    /// Check if vector is approximately equal to another
    pub fn approx_eq(&self, other: Vec2, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_length() {
        let v = Vec2::new(3.0, 4.0);
        assert!(approx_eq(v.length(), 5.0));
        assert!(approx_eq(v.length_sq(), 25.0));
    }

    #[test]
    fn test_from_angle_degrees() {
        let v = Vec2::from_angle_degrees(90.0);
        assert!(approx_eq(v.x, 0.0));
        assert!(approx_eq(v.y, 1.0));

        let v = Vec2::from_angle_degrees(360.0 + 180.0);
        assert!(approx_eq(v.x, -1.0));
    }

    #[test]
    fn test_angle_degrees() {
        assert!(approx_eq(Vec2::new(0.0, 1.0).angle_degrees(), 90.0));
        assert!(approx_eq(Vec2::new(-1.0, 0.0).angle_degrees(), 180.0));
    }

    #[test]
    fn test_clamp_axes() {
        let v = Vec2::new(-3.0, 120.0).clamp_axes(5.0, 95.0);
        assert_eq!(v, Vec2::new(5.0, 95.0));
    }

    #[test]
    fn test_closest_point_inside_segment() {
        let p = Vec2::new(50.0, 10.0);
        let closest = p.closest_point_on_segment(Vec2::new(0.0, 50.0), Vec2::new(100.0, 50.0));
        assert!(closest.approx_eq(Vec2::new(50.0, 50.0), EPSILON));
    }

    #[test]
    fn test_closest_point_clamps_to_endpoints() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert_eq!(Vec2::new(-5.0, 3.0).closest_point_on_segment(a, b), a);
        assert_eq!(Vec2::new(25.0, -1.0).closest_point_on_segment(a, b), b);
    }

    #[test]
    fn test_distance_to_degenerate_segment() {
        let a = Vec2::new(1.0, 1.0);
        assert!(approx_eq(Vec2::new(4.0, 5.0).distance_to_segment(a, a), 5.0));
    }

    #[test]
    fn test_lerp() {
        let mid = Vec2::ZERO.lerp(Vec2::new(10.0, 10.0), 0.5);
        assert!(mid.approx_eq(Vec2::new(5.0, 5.0), EPSILON));
    }

    #[test]
    fn test_operators() {
        let mut a = Vec2::new(1.0, 2.0);
        a += Vec2::new(3.0, 4.0);
        assert_eq!(a, Vec2::new(4.0, 6.0));
        assert_eq!(a - Vec2::new(1.0, 1.0), Vec2::new(3.0, 5.0));
        assert_eq!(a * 0.5, Vec2::new(2.0, 3.0));
    }

    #[test]
    fn test_serde() {
        let v = Vec2::new(1.5, 2.5);
        let encoded = serde_json::to_string(&v).unwrap();
        let decoded: Vec2 = serde_json::from_str(&encoded).unwrap();
        assert_eq!(v, decoded);
    }
}
