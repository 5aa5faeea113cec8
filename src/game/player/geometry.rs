// Detection geometry for wall jumps and ledge grabs
//
// Everything here is pure query logic: build rays from the capsule, ask the
// scene, decide whether a mechanic is allowed. The states own what happens
// with the answers.

use glam::Vec3;

use crate::core::math::angle_between_deg;
use crate::engine::physics::{PhysicsScene, Ray, RayHit};

use super::player::Player;
use super::state::PerformCondition;

/// Extra reach past the capsule radius for the wall probe rays.
pub const WALL_RAY_RADIUS_OFFSET: f32 = 0.15;
/// Confirmation raycasts reach this much further than the probe distance.
pub const WALL_RAY_REACH: f32 = 1.25;
/// Confirmation hits whose normal is more than this many degrees from up are
/// rejected (slightly past vertical to allow overhanging walls).
pub const WALL_UP_ANGLE_LIMIT: f32 = 100.0;

/// A grabbable surface's normal must be within ~5 degrees of up.
pub const LEDGE_SURFACE_MIN_COS: f32 = 0.9962;
/// A grabbable wall's normal must be more than ~70 degrees from up.
pub const LEDGE_WALL_MAX_COS: f32 = 0.342;
/// Clearance above the ledge surface for the climb destination test.
pub const LEDGE_CLEARANCE_OFFSET: f32 = 0.1;

fn wall_ray(user: &Player, origin: Vec3, backwards: bool) -> (Ray, f32) {
    let dir = user.gravity_forward() * if backwards { -1.0 } else { 1.0 };
    (Ray::new(origin, dir), user.capsule.radius + WALL_RAY_RADIUS_OFFSET)
}

/// Wall probe from the top hemisphere center.
pub fn wall_check_ray_top(user: &Player, backwards: bool) -> (Ray, f32) {
    wall_ray(user, user.capsule_top(), backwards)
}

/// Wall probe from the capsule center.
pub fn wall_check_ray_mid(user: &Player, backwards: bool) -> (Ray, f32) {
    wall_ray(user, user.capsule_center(), backwards)
}

/// Wall probe from the bottom hemisphere center.
pub fn wall_check_ray_bottom(user: &Player, backwards: bool) -> (Ray, f32) {
    wall_ray(user, user.capsule_bottom(), backwards)
}

/// Whether the character faces the wall closely enough to jump off it.
pub fn is_in_wall_jump_range(user: &Player, wall_normal: Vec3) -> bool {
    angle_between_deg(user.gravity_forward(), -wall_normal) < user.mechanics.wall_jump_horizontal_arc
}

/// Downward ray looking for the walkable surface above a ledge. Starts above
/// the very top of the capsule so the check still passes while hanging a full
/// capsule height below the surface.
pub fn ledge_surface_check(user: &Player, condition: PerformCondition) -> (Ray, f32) {
    let mut fwd_offset = user.gravity_forward() * (user.capsule.radius + 0.2);
    if condition == PerformCondition::Behind {
        fwd_offset = -fwd_offset;
    }
    let up = user.gravity_up();
    let start = user.position + up * (user.capsule.height + 0.3) + fwd_offset;
    (Ray::new(start, -up), user.capsule.height * 0.6666667)
}

/// Forward ray looking for the wall under a ledge.
pub fn ledge_wall_check(user: &Player, condition: PerformCondition) -> (Ray, f32) {
    let mut dir = user.gravity_forward();
    if condition == PerformCondition::Behind {
        dir = -dir;
    }
    const EXTRA_OFFSET: f32 = 0.25;
    (Ray::new(user.capsule_top(), dir), user.capsule.radius + EXTRA_OFFSET)
}

#[derive(Debug, Clone, Copy)]
pub struct LedgeHit {
    pub wall: RayHit,
    pub surface: RayHit,
}

/// Full ledge grab test: both rays must hit, the surface must be near flat,
/// the wall near vertical, and the climb destination free of collision.
pub fn can_ledge_grab(
    user: &Player,
    scene: &dyn PhysicsScene,
    condition: PerformCondition,
) -> Option<LedgeHit> {
    let check = |cond: PerformCondition| -> Option<LedgeHit> {
        let mask = user.mechanics.collision_mask;
        let (surface_ray, surface_dist) = ledge_surface_check(user, cond);
        let (wall_ray, wall_dist) = ledge_wall_check(user, cond);

        let surface = scene.raycast(surface_ray, surface_dist, mask)?;
        let wall = scene.raycast(wall_ray, wall_dist, mask)?;

        let up = user.gravity_up();
        if up.dot(surface.normal) < LEDGE_SURFACE_MIN_COS {
            return None;
        }
        if up.dot(wall.normal) >= LEDGE_WALL_MAX_COS {
            return None;
        }

        // Is there room to stand where we would climb up to?
        let foot = surface.point + up * LEDGE_CLEARANCE_OFFSET;
        let center = foot + up * (user.capsule.height * 0.5);
        if scene.overlap_capsule(center, user.capsule.radius, user.capsule.height * 0.5, mask) {
            return None;
        }

        Some(LedgeHit { wall, surface })
    };

    match condition {
        PerformCondition::Cannot => None,
        PerformCondition::InFront => check(PerformCondition::InFront),
        PerformCondition::Behind => check(PerformCondition::Behind),
        PerformCondition::InFrontAndBehind => {
            check(PerformCondition::Behind).or_else(|| check(PerformCondition::InFront))
        }
    }
}

/// World position the character hangs at for a given pair of ledge hits:
/// pushed off the wall by the capsule radius, one capsule height below the
/// surface point.
pub fn ledge_grab_position(user: &Player, wall: &RayHit, surface: &RayHit) -> Vec3 {
    let wall_point = user.inverse_transform_point(wall.point);
    let wall_normal = user.inverse_transform_vector(wall.normal);
    let surface_point = user.inverse_transform_point(surface.point);

    let mut local = Vec3::new(wall_point.x, 0.0, wall_point.z) + wall_normal * user.capsule.radius;
    local.y = surface_point.y - user.capsule.height;

    user.transform_point(local)
}
