//! Interpolation helpers:
//! - lerp_f64 (scalars, used for gripper distances)
//! - lerp_vec3 (pose centers)
//! - lerp_vec4 (raw component-wise quaternion blend, no renormalization)

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f64(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

#[inline]
pub fn lerp_vec3(a: [f64; 3], b: [f64; 3], t: f64) -> [f64; 3] {
    [
        lerp_f64(a[0], b[0], t),
        lerp_f64(a[1], b[1], t),
        lerp_f64(a[2], b[2], t),
    ]
}

/// Component-wise blend of two 4-vectors.
/// For quaternions the result is not renormalized and is not length-preserving.
#[inline]
pub fn lerp_vec4(a: [f64; 4], b: [f64; 4], t: f64) -> [f64; 4] {
    [
        lerp_f64(a[0], b[0], t),
        lerp_f64(a[1], b[1], t),
        lerp_f64(a[2], b[2], t),
        lerp_f64(a[3], b[3], t),
    ]
}

#[inline]
pub fn distance3(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let dz = b[2] - a[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}
