// Ground and air dashes

use glam::Vec3;

use crate::core::math::move_towards;
use crate::engine::input::Button;
use crate::engine::physics::Contact;

use super::super::airborne::{default_ground_landed, shared_overspeed_damp, AirborneHooks};
use super::super::animation::Clip;
use super::super::grounded::{default_ground_exit, GroundedHooks};
use super::super::player::Player;
use super::super::state::{
    control_stick_dot, face_control_stick, Env, IdleEnter, JumpType, PerformCondition,
    PlayerMachine, PlayerStateId, StateArgs,
};
use super::super::states;

/// Past this normalized time the ground dash can be cancelled into movement.
pub const DASH_CANCEL_POINT: f32 = 0.25;
/// Jump presses are ignored before this much of the dash has played.
const DASH_JUMP_GATE: f32 = 0.15;
/// The air dash keeps full speed and ignores gravity inside this window.
const AIR_DASH_WINDOW: f32 = 0.125;
/// Landing this early in an air dash converts it into a ground burst.
const AIR_DASH_LANDING_BURST_WINDOW: f32 = 0.1;
const AIR_DASH_LANDING_BURST_SPEED: f32 = 20.0;

pub struct DashGround;

impl GroundedHooks for DashGround {
    fn id(&self) -> PlayerStateId {
        PlayerStateId::DashGround
    }

    fn on_enter(
        &self,
        user: &mut Player,
        _env: &mut Env<'_>,
        _machine: &mut PlayerMachine,
        _previous: Option<PlayerStateId>,
        _args: StateArgs,
    ) {
        user.anim.play(Clip::Dash);
        user.set_gravity_rotation(face_control_stick(user));
    }

    fn on_fixed_update(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, dt: f32) {
        let Some(cfg) = user.settings else {
            return;
        };
        let step = cfg.deceleration * user.friction_modifier * dt;
        user.velocity = move_towards(user.velocity, Vec3::ZERO, step);

        if user.anim.playing_past(Clip::Dash, DASH_CANCEL_POINT) {
            machine.change_state(user, env, states::idle_move(), StateArgs::Idle(IdleEnter::Neutral));
        }
    }

    fn on_jump_pressed(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
        if !(user.anim.current() == Clip::Dash && user.anim.normalized_time() >= DASH_JUMP_GATE) {
            return false;
        }
        let jump_type = if control_stick_dot(user) >= 0.0 {
            JumpType::Super
        } else {
            JumpType::Back
        };
        machine.change_state(user, env, states::jump(), StateArgs::Jump(jump_type));
        true
    }

    fn on_dash_pressed(&self, _user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine) -> bool {
        false
    }

    fn on_ground_exit(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) {
        // Dashing off an edge with jump held converts straight into a jump;
        // early in the dash it becomes an air dash instead.
        if user.input.held(Button::Jump) {
            let jump_type = if control_stick_dot(user) >= 0.0 {
                JumpType::Super
            } else {
                JumpType::Back
            };
            machine.change_state(user, env, states::jump(), StateArgs::Jump(jump_type));
        } else if user.anim.current() == Clip::Dash && user.anim.normalized_time() <= DASH_CANCEL_POINT {
            machine.change_state(user, env, states::dash_airborne(), StateArgs::None);
        } else {
            default_ground_exit(user, env, machine);
        }
    }

    fn on_anim_transition(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, clip: Clip) {
        if clip == Clip::Dash {
            machine.change_state(user, env, states::idle_move(), StateArgs::Idle(IdleEnter::Neutral));
        }
    }
}

fn in_air_dash_window(user: &Player) -> bool {
    user.anim.current() == Clip::DashAir && user.anim.normalized_time() <= AIR_DASH_WINDOW
}

pub struct DashAirborne;

impl AirborneHooks for DashAirborne {
    fn id(&self) -> PlayerStateId {
        PlayerStateId::DashAirborne
    }

    fn turning_lerp(&self, _user: &Player) -> f32 {
        0.05
    }

    fn overspeed_damp(&self, user: &Player) -> f32 {
        if in_air_dash_window(user) {
            1.0
        } else {
            shared_overspeed_damp(user)
        }
    }

    fn air_accel_multiplier(&self, _user: &Player) -> f32 {
        0.075
    }

    fn gravity_multiplier(&self, user: &Player) -> f32 {
        if in_air_dash_window(user) {
            0.0
        } else {
            1.0
        }
    }

    fn can_wall_jump(&self, _user: &Player) -> PerformCondition {
        PerformCondition::InFront
    }

    fn can_grab_ledge(&self, _user: &Player) -> PerformCondition {
        PerformCondition::InFront
    }

    fn on_enter(
        &self,
        user: &mut Player,
        _env: &mut Env<'_>,
        _machine: &mut PlayerMachine,
        previous: Option<PlayerStateId>,
        _args: StateArgs,
    ) {
        // A dash carried off an edge keeps its playback position; a fresh air
        // dash restarts from a standstill towards the stick.
        let normalized_time = if previous == Some(PlayerStateId::DashGround) && user.anim.current() == Clip::Dash
        {
            user.anim.normalized_time()
        } else {
            user.set_speed_xz(Vec3::ZERO);
            user.set_gravity_rotation(face_control_stick(user));
            0.0
        };
        user.set_speed_y(0.0);
        user.anim.play_at(Clip::DashAir, normalized_time);
    }

    fn on_fixed_update(
        &self,
        user: &mut Player,
        _env: &mut Env<'_>,
        _machine: &mut PlayerMachine,
        speed: &mut Vec3,
        _dt: f32,
    ) {
        // Holding the trigger past the cancel point brakes the dash hard.
        if user.anim.playing_past(Clip::DashAir, AIR_DASH_WINDOW)
            && user.input.held(Button::RightTrigger)
            && user.anim.normalized_time() >= DASH_CANCEL_POINT
        {
            let up = user.gravity_up();
            let vertical = up * speed.dot(up);
            *speed = (*speed - vertical) * 0.9 + vertical;
        }
    }

    fn on_dash_pressed(&self, _user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine) -> bool {
        false
    }

    fn on_ground_landed(
        &self,
        user: &mut Player,
        env: &mut Env<'_>,
        machine: &mut PlayerMachine,
        _contact: &Contact,
    ) {
        if user.anim.current() == Clip::DashAir && user.anim.normalized_time() <= AIR_DASH_LANDING_BURST_WINDOW {
            let burst = user.gravity_forward() * AIR_DASH_LANDING_BURST_SPEED;
            user.set_speed_xz(burst);
        }
        default_ground_landed(user, env, machine);
    }
}
