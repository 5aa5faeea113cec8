// Ground locomotion: the idle/move blend and the skidding stop

use glam::Vec3;

use crate::core::math::{clamp01, lerp, move_towards, move_towards_f32};

use super::super::animation::{BlendParam, Clip};
use super::super::grounded::{default_grounded_dash, GroundedHooks};
use super::super::player::Player;
use super::super::state::{
    control_stick_dot, face_control_stick, stick_in_3d, Env, IdleEnter, JumpType, PlayerMachine,
    PlayerStateId, StateArgs,
};
use super::super::states;

/// Running at or above this speed upgrades a jump press to a super jump.
pub const SUPER_JUMP_MIN_SPEED: f32 = 2.0;

/// Base slerp rate towards the stick while on the ground. Scales down with
/// speed so turning is snappy when standing and wide when running.
const GROUND_TURN_RATE: f32 = 45.0;
const GROUND_TURN_SPEED_FALLOFF: f32 = 0.875;

/// Below this stick deflection (squared) a running stop may trigger.
const STOP_RUN_STICK_THRESHOLD: f32 = 0.25;
/// The stop only plays when the move blend is still mostly at a run.
const STOP_RUN_MOVE_SCALE_THRESHOLD: f32 = 0.7;

pub struct IdleMove;

impl GroundedHooks for IdleMove {
    fn id(&self) -> PlayerStateId {
        PlayerStateId::IdleMove
    }

    fn on_enter(
        &self,
        user: &mut Player,
        _env: &mut Env<'_>,
        _machine: &mut PlayerMachine,
        previous: Option<PlayerStateId>,
        args: StateArgs,
    ) {
        // Coming out of a dash the blend starts from the actual speed, so the
        // run cycle does not pop back to a standstill.
        let move_scale = if previous == Some(PlayerStateId::DashGround) {
            user.settings
                .map_or(0.0, |cfg| cfg.top_speed_ratio(user.speed_xz().length()))
        } else {
            user.input.left().length_squared()
        };
        user.anim.set_param(BlendParam::MoveScale, move_scale);

        match args {
            StateArgs::Idle(IdleEnter::Landing) => user.anim.play(Clip::Landing),
            _ => {
                let clip = if move_scale <= 0.0 { Clip::Idle } else { Clip::Move };
                user.anim.cross_fade(clip, 0.15);
            }
        }

        let mut fwd_right = user.inverse_transform_vector(user.speed_xz());
        if user.input.left().length_squared() <= 0.0 {
            user.scratch.idle_move_stop_on_neutral = false;
            fwd_right *= 0.66;
        }
        user.scratch.idle_move_fwd_right_speed = fwd_right;

        user.anim.set_param(BlendParam::TiltScale, 0.0);
        user.anim.set_tilt_layer_weight(1.0);
        user.scratch.idle_move_tilt_prev_yaw = user.yaw_degrees();
    }

    fn on_update(&self, user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine, dt: f32) {
        let Some(cfg) = user.settings else {
            return;
        };
        let ratio = cfg.top_speed_ratio(user.speed_xz().length());
        let turn_speed =
            (GROUND_TURN_RATE - GROUND_TURN_RATE * GROUND_TURN_SPEED_FALLOFF * ratio.clamp(0.02, 1.0)) * dt;

        let input_sq = user.input.left().length_squared();
        // Hold the blend at the speed ratio while coasting above full run.
        let move_scale_dest = if input_sq <= ratio && ratio > 1.0 { ratio } else { input_sq };
        user.anim.set_param_smoothed(BlendParam::MoveScale, move_scale_dest, 0.15, dt);

        if input_sq > 0.0 {
            let rotation = user.gravity_rotation().slerp(face_control_stick(user), clamp01(turn_speed));
            user.set_gravity_rotation(rotation);
        }

        handle_tilt(user, dt);
    }

    fn on_fixed_update(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, dt: f32) {
        let Some(cfg) = user.settings else {
            return;
        };
        let input_sq = user.input.left().length_squared();
        let top_speed = cfg.top_speed * input_sq * input_sq;

        let mut fwd_right = user.scratch.idle_move_fwd_right_speed;
        let accel = if fwd_right.length() < top_speed {
            cfg.acceleration
        } else {
            cfg.deceleration
        };
        fwd_right.z = move_towards_f32(fwd_right.z, top_speed, accel * dt);
        user.scratch.idle_move_fwd_right_speed = fwd_right;

        let target = user.gravity_forward() * fwd_right.z;
        if user.friction_modifier == 1.0 {
            user.velocity = target;
        } else {
            user.velocity = user.velocity.lerp(target, user.friction_modifier);
        }

        // The skidding stop only plays when the stick snaps back while the
        // blend is still running.
        let move_scale = user.anim.param(BlendParam::MoveScale);
        if user.scratch.idle_move_stop_on_neutral
            && (input_sq < STOP_RUN_STICK_THRESHOLD || control_stick_dot(user) < 0.0)
            && move_scale > STOP_RUN_MOVE_SCALE_THRESHOLD
        {
            user.scratch.idle_move_stop_on_neutral = false;
            machine.change_state(user, env, states::stop_run(), StateArgs::None);
        } else if !user.scratch.idle_move_stop_on_neutral
            && (move_scale < input_sq || input_sq > STOP_RUN_MOVE_SCALE_THRESHOLD)
        {
            user.scratch.idle_move_stop_on_neutral = true;
        }
    }

    fn on_exit(&self, user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine, _next: PlayerStateId) {
        user.scratch.idle_move_stop_on_neutral = false;
        user.anim.set_param(BlendParam::TiltScale, 0.0);
        user.anim.set_tilt_layer_weight(0.0);
    }

    fn on_jump_pressed(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
        let jump_type = if user.speed_xz().length() >= SUPER_JUMP_MIN_SPEED {
            JumpType::Super
        } else {
            JumpType::Regular
        };
        machine.change_state(user, env, states::jump(), StateArgs::Jump(jump_type));
        true
    }

    fn on_dash_pressed(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
        // No re-dash while still carrying more speed than a dash would give.
        let over_dash_speed = user
            .settings
            .is_some_and(|cfg| user.speed_xz().length() > cfg.top_speed + 1.0);
        if over_dash_speed && machine.previous_id() == Some(PlayerStateId::DashGround) {
            return false;
        }
        default_grounded_dash(user, env, machine)
    }
}

/// Lean the upper body into turns while running.
fn handle_tilt(user: &mut Player, dt: f32) {
    let move_scale = user.anim.param(BlendParam::MoveScale);
    let target_weight = if move_scale < 0.75 { 0.0 } else { 1.0 };
    let weight = lerp(user.anim.tilt_layer_weight(), target_weight, clamp01(10.0 * dt));
    user.anim.set_tilt_layer_weight(weight);

    let yaw = user.yaw_degrees();
    let tilt = ((yaw - user.scratch.idle_move_tilt_prev_yaw) / 20.0 * 10.0).clamp(-1.0, 1.0);
    user.anim.set_param_smoothed(BlendParam::TiltScale, tilt, 0.1, dt);
    user.scratch.idle_move_tilt_prev_yaw = yaw;
}

pub struct StopRun;

impl GroundedHooks for StopRun {
    fn id(&self) -> PlayerStateId {
        PlayerStateId::StopRun
    }

    fn on_enter(
        &self,
        user: &mut Player,
        _env: &mut Env<'_>,
        _machine: &mut PlayerMachine,
        _previous: Option<PlayerStateId>,
        _args: StateArgs,
    ) {
        user.anim.cross_fade(Clip::StopRun, 0.08);
    }

    fn on_fixed_update(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, dt: f32) {
        let Some(cfg) = user.settings else {
            return;
        };
        let decel = cfg.deceleration * 0.6 * user.friction_modifier;
        let xz = move_towards(user.speed_xz(), Vec3::ZERO, decel * dt);
        user.set_speed_xz(xz);

        let dot = control_stick_dot(user);
        if xz.length_squared() < 4.0 {
            // Slow enough to pivot. A stick held hard backwards turns the
            // skid into a quick reversal.
            if dot < -0.85 {
                user.add_yaw_degrees(120.0);
                user.velocity = face_control_stick(user) * Vec3::Z * cfg.top_air_speed;
            }
            machine.change_state(user, env, states::idle_move(), StateArgs::Idle(IdleEnter::Neutral));
            return;
        }

        // Pushing forward again faster than we are skidding cancels the stop.
        let stick_speed = stick_in_3d(user) * cfg.top_speed;
        if stick_speed.length_squared() > xz.length_squared() && dot > 0.0 {
            machine.change_state(user, env, states::idle_move(), StateArgs::Idle(IdleEnter::Neutral));
        }
    }

    fn on_jump_pressed(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
        let jump_type = if control_stick_dot(user) < 0.0 {
            JumpType::Back
        } else if user.speed_xz().length() >= SUPER_JUMP_MIN_SPEED {
            JumpType::Super
        } else {
            JumpType::Regular
        };
        machine.change_state(user, env, states::jump(), StateArgs::Jump(jump_type));
        true
    }

    fn on_dash_pressed(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
        let over_dash_speed = user
            .settings
            .is_some_and(|cfg| user.speed_xz().length() > cfg.top_speed * 2.0);
        if over_dash_speed && machine.previous_id() == Some(PlayerStateId::DashGround) {
            return false;
        }
        default_grounded_dash(user, env, machine)
    }

    fn on_anim_transition(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, clip: Clip) {
        if clip == Clip::StopRun {
            machine.change_state(user, env, states::idle_move(), StateArgs::Idle(IdleEnter::Neutral));
        }
    }
}
