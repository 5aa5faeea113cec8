// Ledge hanging and climbing up

use glam::{Affine3A, Mat3, Quat, Vec3};

use crate::core::math::yaw_of_direction;

use super::super::airborne::AirborneHooks;
use super::super::animation::Clip;
use super::super::geometry::{can_ledge_grab, ledge_grab_position};
use super::super::grounded::{default_grounded_dash, default_grounded_jump, GroundedHooks};
use super::super::player::Player;
use super::super::state::{
    control_stick_dot, Env, GetupKind, IdleEnter, PerformCondition, PlayerMachine, PlayerStateId,
    StateArgs,
};
use super::super::states;

/// Stick deflection (squared) that counts as a deliberate pull.
const HANG_STICK_THRESHOLD: f32 = 0.2;

/// Keep hanging on to the ledge, tracking it if the platform moves. Returns
/// false when the ledge is gone or the player pulls away from it.
pub fn ledge_hang_on(user: &mut Player, env: &mut Env<'_>) -> bool {
    let stick_sq = user.input.left().length_squared();
    let pulling_away = user.state_time() >= user.mechanics.ledge_grab_inactionable_time
        && stick_sq >= HANG_STICK_THRESHOLD
        && control_stick_dot(user) < 0.0;
    if pulling_away {
        return false;
    }

    let Some(ledge) = can_ledge_grab(user, env.scene, PerformCondition::InFront) else {
        return false;
    };

    if Some(ledge.surface.collider) != user.scratch.ledge_grab_platform {
        user.scratch.ledge_grab_platform = Some(ledge.surface.collider);
        if let Some(matrix) = env.scene.collider_transform(ledge.surface.collider) {
            user.scratch.ledge_grab_platform_matrix = matrix;
        }
    }

    let Some(platform) = user.scratch.ledge_grab_platform else {
        return true;
    };
    if !env.scene.is_static(platform) {
        // Ride the platform: apply its transform delta to ourselves.
        if let Some(new_matrix) = env.scene.collider_transform(platform) {
            let delta = new_matrix * user.scratch.ledge_grab_platform_matrix.inverse();
            user.position = delta.transform_point3(user.position);
            let rotation = Quat::from_mat3(&Mat3::from(delta.matrix3));
            user.add_yaw_degrees(yaw_of_direction(rotation * Vec3::Z));
            user.scratch.ledge_grab_platform_matrix = new_matrix;
        }
    }
    true
}

pub struct LedgeGrab;

impl AirborneHooks for LedgeGrab {
    fn id(&self) -> PlayerStateId {
        PlayerStateId::LedgeGrab
    }

    fn inherit_y_speed_on_leave_ground(&self) -> bool {
        false
    }

    fn turning_lerp(&self, _user: &Player) -> f32 {
        0.0
    }

    fn air_accel_multiplier(&self, _user: &Player) -> f32 {
        0.0
    }

    fn air_decel_multiplier(&self, _user: &Player) -> f32 {
        0.0
    }

    fn gravity_multiplier(&self, _user: &Player) -> f32 {
        0.0
    }

    fn on_enter(
        &self,
        user: &mut Player,
        env: &mut Env<'_>,
        machine: &mut PlayerMachine,
        _previous: Option<PlayerStateId>,
        args: StateArgs,
    ) {
        let StateArgs::Ledge { wall, surface } = args else {
            machine.change_state(user, env, states::fall(), StateArgs::None);
            return;
        };
        user.anim.play(Clip::LedgeGrab);
        user.position = ledge_grab_position(user, &wall, &surface);
        // Face into the wall.
        let local = user.gravity_frame().inverse() * -wall.normal;
        user.set_yaw_degrees(yaw_of_direction(local));
        user.velocity = Vec3::ZERO;
        user.scratch.ledge_grab_platform = Some(surface.collider);
        user.scratch.ledge_grab_platform_matrix = env
            .scene
            .collider_transform(surface.collider)
            .unwrap_or(Affine3A::IDENTITY);
        user.scratch.airborne_has_wall_jumped = false;
    }

    fn on_update(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, _dt: f32) {
        if !ledge_hang_on(user, env) {
            machine.change_state(user, env, states::fall(), StateArgs::None);
            return;
        }
        if user.state_time() > user.mechanics.ledge_grab_inactionable_time
            && user.input.left().length_squared() > HANG_STICK_THRESHOLD
            && control_stick_dot(user) > 0.0
            && !machine.is_pending_state_change()
        {
            machine.change_state(user, env, states::ledge_getup(), StateArgs::Getup(GetupKind::Normal));
        }
    }

    fn on_jump_pressed(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
        machine.change_state(user, env, states::ledge_getup(), StateArgs::Getup(GetupKind::Fast));
        true
    }

    fn on_dash_pressed(&self, _user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine) -> bool {
        false
    }

    fn on_exit(&self, user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine, _next: PlayerStateId) {
        // Wind-down before the same ledge can be grabbed again.
        user.scratch.ledge_grab_regrab_time = user.time + user.mechanics.ledge_grab_wind_down_time;
    }
}

pub struct LedgeGetup;

impl GroundedHooks for LedgeGetup {
    fn id(&self) -> PlayerStateId {
        PlayerStateId::LedgeGetup
    }

    fn on_enter(
        &self,
        user: &mut Player,
        _env: &mut Env<'_>,
        _machine: &mut PlayerMachine,
        _previous: Option<PlayerStateId>,
        args: StateArgs,
    ) {
        let kind = match args {
            StateArgs::Getup(kind) => kind,
            _ => GetupKind::Normal,
        };
        user.anim.play(match kind {
            GetupKind::Normal => Clip::LedgeGetupNormal,
            GetupKind::Fast => Clip::LedgeGetupFast,
        });
    }

    fn on_update(&self, user: &mut Player, env: &mut Env<'_>, _machine: &mut PlayerMachine, _dt: f32) {
        // Keep riding the platform while climbing; losing the ledge here is
        // fine, the animation-end handler sorts out where we end up.
        let _ = ledge_hang_on(user, env);

        let clip = user.anim.current();
        if matches!(clip, Clip::LedgeGetupNormal | Clip::LedgeGetupFast) && user.anim.normalized_time() > 0.6 {
            // Press down late in the climb so the ground contact registers.
            user.set_speed_y(-0.1);
        }
    }

    // The getup starts hanging in the air; losing the ground is the normal
    // case, not a reason to fall.
    fn on_ground_exit(&self, _user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine) {}

    fn on_jump_pressed(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
        if !user.on_ground {
            return false;
        }
        default_grounded_jump(user, env, machine)
    }

    fn on_dash_pressed(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
        if !user.on_ground {
            return false;
        }
        default_grounded_dash(user, env, machine)
    }

    fn on_anim_transition(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, clip: Clip) {
        if matches!(clip, Clip::LedgeGetupNormal | Clip::LedgeGetupFast) {
            if user.on_ground {
                machine.change_state(user, env, states::idle_move(), StateArgs::Idle(IdleEnter::Neutral));
            } else {
                machine.change_state(user, env, states::fall(), StateArgs::None);
            }
        }
    }
}
