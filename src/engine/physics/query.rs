// Physics query interface
//
// The character never owns a physics solver. It asks the host scene questions
// (raycasts, capsule overlaps, collider transforms) through this trait and the
// host answers from whatever collision backend it runs.

use glam::{Affine3A, Vec3};

/// Bitmask selecting which collision layers a query may hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub fn contains(self, layer: u32) -> bool {
        self.0 & (1 << layer) != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        LayerMask::ALL
    }
}

/// Opaque identity of a collider owned by the host scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderId(pub u32);

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Direction is normalized; a zero direction produces a ray that can
    /// never hit anything.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
    pub collider: ColliderId,
}

/// The host scene's answer surface.
pub trait PhysicsScene {
    /// Closest hit along the ray within `max_distance`, or None.
    fn raycast(&self, ray: Ray, max_distance: f32, mask: LayerMask) -> Option<RayHit>;

    /// Whether a vertical capsule at `center` overlaps any collider in the mask.
    fn overlap_capsule(&self, center: Vec3, radius: f32, half_height: f32, mask: LayerMask) -> bool;

    /// Current world transform of a collider, for tracking moving platforms.
    /// None once the collider is gone.
    fn collider_transform(&self, collider: ColliderId) -> Option<Affine3A>;

    /// Whether the collider never moves. Static geometry skips the moving
    /// platform bookkeeping.
    fn is_static(&self, collider: ColliderId) -> bool {
        let _ = collider;
        true
    }
}

/// A scene with nothing in it. Every query misses.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyScene;

impl PhysicsScene for EmptyScene {
    fn raycast(&self, _ray: Ray, _max_distance: f32, _mask: LayerMask) -> Option<RayHit> {
        None
    }

    fn overlap_capsule(&self, _center: Vec3, _radius: f32, _half_height: f32, _mask: LayerMask) -> bool {
        false
    }

    fn collider_transform(&self, _collider: ColliderId) -> Option<Affine3A> {
        None
    }
}
