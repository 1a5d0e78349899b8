//! Rigid pose (position + orientation quaternion) and its text codec.
//!
//! The host exchanges poses with its mechanical states as whitespace
//! separated text: `"x y z qx qy qz qw"`.

use serde::{Deserialize, Serialize};

use crate::interp::{lerp_vec3, lerp_vec4};

/// Rigid transform: `center` in scene units, `orientation` as quaternion (x, y, z, w).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub center: [f64; 3],
    pub orientation: [f64; 4],
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    pub const IDENTITY_ORIENTATION: [f64; 4] = [0.0, 0.0, 0.0, 1.0];

    #[inline]
    pub fn new(center: [f64; 3], orientation: [f64; 4]) -> Self {
        Self {
            center,
            orientation,
        }
    }

    #[inline]
    pub fn identity() -> Self {
        Self::new([0.0; 3], Self::IDENTITY_ORIENTATION)
    }

    #[inline]
    pub fn from_center(center: [f64; 3]) -> Self {
        Self::new(center, Self::IDENTITY_ORIENTATION)
    }

    /// Build a pose from roll/pitch/yaw angles in radians.
    pub fn from_euler(center: [f64; 3], rpy: [f64; 3]) -> Self {
        let (sr, cr) = (rpy[0] * 0.5).sin_cos();
        let (sp, cp) = (rpy[1] * 0.5).sin_cos();
        let (sy, cy) = (rpy[2] * 0.5).sin_cos();
        let orientation = [
            sr * cp * cy - cr * sp * sy,
            cr * sp * cy + sr * cp * sy,
            cr * cp * sy - sr * sp * cy,
            cr * cp * cy + sr * sp * sy,
        ];
        Self::new(center, orientation)
    }

    /// Roll/pitch/yaw of the orientation, in radians.
    pub fn to_euler(&self) -> [f64; 3] {
        let [x, y, z, w] = self.orientation;
        let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));
        let sin_pitch = (2.0 * (w * y - z * x)).clamp(-1.0, 1.0);
        let pitch = sin_pitch.asin();
        let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));
        [roll, pitch, yaw]
    }

    /// Raw component-wise blend of center and orientation by `coef`.
    /// `coef` is not clamped and the orientation is not renormalized.
    pub fn lerp(&self, other: &Pose, coef: f64) -> Pose {
        Pose {
            center: lerp_vec3(self.center, other.center, coef),
            orientation: lerp_vec4(self.orientation, other.orientation, coef),
        }
    }

    /// Encode as the host's whitespace separated position text.
    pub fn to_stream_string(&self) -> String {
        let [x, y, z] = self.center;
        let [qx, qy, qz, qw] = self.orientation;
        format!("{x} {y} {z} {qx} {qy} {qz} {qw}")
    }

    /// Decode the host's position text. Extra trailing tokens are ignored.
    pub fn parse_stream(text: &str) -> Option<Pose> {
        let mut values = [0.0f64; 7];
        let mut tokens = text.split_whitespace();
        for slot in values.iter_mut() {
            *slot = tokens.next()?.parse().ok()?;
        }
        Some(Pose::new(
            [values[0], values[1], values[2]],
            [values[3], values[4], values[5], values[6]],
        ))
    }

    pub fn approx_eq(&self, other: &Pose, eps: f64) -> bool {
        self.center
            .iter()
            .zip(other.center.iter())
            .chain(self.orientation.iter().zip(other.orientation.iter()))
            .all(|(a, b)| (a - b).abs() <= eps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_roundtrip() {
        let p = Pose::new([1.5, -2.0, 30.0], [0.0, 0.7071, 0.0, 0.7071]);
        let s = p.to_stream_string();
        assert_eq!(s, "1.5 -2 30 0 0.7071 0 0.7071");
        assert_eq!(Pose::parse_stream(&s), Some(p));
    }

    #[test]
    fn stream_rejects_short_or_garbage_input() {
        assert_eq!(Pose::parse_stream("1 2 3"), None);
        assert_eq!(Pose::parse_stream("1 2 3 a 0 0 1"), None);
        assert!(Pose::parse_stream("1 2 3 0 0 0 1 99").is_some());
    }

    #[test]
    fn euler_roundtrip() {
        let rpy = [0.3, -0.2, 1.1];
        let p = Pose::from_euler([0.0; 3], rpy);
        let back = p.to_euler();
        for i in 0..3 {
            assert!((back[i] - rpy[i]).abs() < 1e-9, "axis {i}: {back:?}");
        }
    }

    #[test]
    fn zero_euler_is_identity() {
        let p = Pose::from_euler([1.0, 2.0, 3.0], [0.0; 3]);
        assert!(p.approx_eq(&Pose::from_center([1.0, 2.0, 3.0]), 1e-12));
    }
}
