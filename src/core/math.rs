// Math utilities and helper functions

use glam::{Mat3, Quat, Vec2, Vec3};

/// Clamp a value to the [0, 1] range
pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Linear interpolation
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Check if two f32 values are approximately equal
pub fn approx_equal(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() < epsilon
}

/// Move a scalar towards a target without overshooting.
pub fn move_towards_f32(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Move a vector towards a target without overshooting.
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let to_target = target - current;
    let dist = to_target.length();
    if dist <= max_delta || dist < f32::EPSILON {
        target
    } else {
        current + to_target / dist * max_delta
    }
}

/// Angle between two vectors in degrees. Zero-length inputs give 0 so callers
/// can treat the comparison as simply not passing.
pub fn angle_between_deg(a: Vec3, b: Vec3) -> f32 {
    if a.length_squared() < f32::EPSILON || b.length_squared() < f32::EPSILON {
        return 0.0;
    }
    a.angle_between(b).to_degrees()
}

/// Remove from `vector` the component along `normal` (assumed normalized).
pub fn project_on_plane(vector: Vec3, normal: Vec3) -> Vec3 {
    vector - normal * vector.dot(normal)
}

/// Map an analog stick value onto the horizontal plane: x stays x, y becomes z.
pub fn horizontal(stick: Vec2) -> Vec3 {
    Vec3::new(stick.x, 0.0, stick.y)
}

/// Yaw in degrees of a horizontal direction, measured from +Z towards +X.
/// Directions with no horizontal part give 0.
pub fn yaw_of_direction(dir: Vec3) -> f32 {
    if dir.x * dir.x + dir.z * dir.z < f32::EPSILON {
        return 0.0;
    }
    dir.x.atan2(dir.z).to_degrees()
}

/// Orientation looking down `forward` with `up` as the up hint.
/// Degenerate inputs (zero length, forward parallel to up) give identity.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let z = forward.normalize_or_zero();
    if z == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let x = up.cross(z).normalize_or_zero();
    if x == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let y = z.cross(x);
    Quat::from_mat3(&Mat3::from_cols(x, y, z))
}

/// Rotate `from` towards `to` by at most `max_degrees`.
pub fn rotate_towards(from: Quat, to: Quat, max_degrees: f32) -> Quat {
    let angle = from.angle_between(to).to_degrees();
    if angle <= max_degrees || angle < f32::EPSILON {
        to
    } else {
        from.slerp(to, max_degrees / angle)
    }
}
