// The three ground jumps: regular, super and back

use crate::core::math::project_on_plane;
use crate::engine::input::Button;
use crate::engine::physics::Contact;

use super::super::airborne::{default_ground_landed, AirborneHooks};
use super::super::animation::Clip;
use super::super::player::{Player, CONTACT_OFFSET};
use super::super::state::{
    control_stick_dot, Env, JumpType, PerformCondition, PlayerMachine, PlayerStateId, StateArgs,
};

/// Holding the jump button keeps reapplying jump speed for this long.
pub const JUMP_HOLD_DURATION: f32 = 0.2;

/// Shared variable-height rule: while the button stays held inside the hold
/// window, vertical speed is pinned at the jump speed.
pub fn hold_button_to_jump(user: &mut Player, multiplier: f32) {
    if !user.scratch.jump_is_holding_button {
        return;
    }
    user.scratch.jump_is_holding_button = user.input.held(Button::Jump);
    if user.scratch.jump_is_holding_button && user.state_time() < JUMP_HOLD_DURATION {
        if let Some(cfg) = user.settings {
            user.set_speed_y(cfg.base_jump_speed * multiplier);
        }
    }
}

pub struct Jump;

impl AirborneHooks for Jump {
    fn id(&self) -> PlayerStateId {
        PlayerStateId::Jump
    }

    fn turning_lerp(&self, user: &Player) -> f32 {
        if user.scratch.jump_lock_turning {
            0.0
        } else {
            0.35
        }
    }

    fn can_wall_jump(&self, user: &Player) -> PerformCondition {
        if user.speed_y() < 9.0 {
            PerformCondition::InFrontAndBehind
        } else {
            PerformCondition::Cannot
        }
    }

    fn can_grab_ledge(&self, user: &Player) -> PerformCondition {
        if user.speed_y() <= 0.0 {
            PerformCondition::InFront
        } else {
            PerformCondition::Cannot
        }
    }

    fn on_enter(
        &self,
        user: &mut Player,
        _env: &mut Env<'_>,
        _machine: &mut PlayerMachine,
        _previous: Option<PlayerStateId>,
        args: StateArgs,
    ) {
        let Some(cfg) = user.settings else {
            return;
        };
        let jump_type = match args {
            StateArgs::Jump(jump_type) => jump_type,
            _ => JumpType::Regular,
        };
        user.scratch.jump_type = jump_type;
        user.anim.play(match jump_type {
            JumpType::Regular => Clip::Jump,
            JumpType::Super => Clip::JumpSuper,
            JumpType::Back => Clip::JumpBack,
        });

        user.set_speed_y(cfg.base_jump_speed);
        match jump_type {
            JumpType::Back => {
                // Launch away from the facing direction, faster than the run
                // that led into it.
                user.scratch.jump_lock_turning = true;
                let reversed = user.speed_xz() * -1.5;
                user.set_speed_xz(reversed);
            }
            _ => user.scratch.jump_lock_turning = false,
        }
        user.scratch.jump_is_holding_button = true;
        user.position += user.gravity_up() * CONTACT_OFFSET;
    }

    fn on_update(&self, user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine, _dt: f32) {
        hold_button_to_jump(user, 1.0);
    }

    fn on_wall_contact(
        &self,
        user: &mut Player,
        _env: &mut Env<'_>,
        _machine: &mut PlayerMachine,
        contact: &Contact,
    ) {
        // Slide along the wall instead of sticking to it.
        let slid = project_on_plane(user.speed_xz(), contact.normal);
        user.set_speed_xz(slid);
    }

    fn on_ground_landed(
        &self,
        user: &mut Player,
        env: &mut Env<'_>,
        machine: &mut PlayerMachine,
        _contact: &Contact,
    ) {
        default_ground_landed(user, env, machine);
        // A back jump landed while still pulling backwards turns around.
        if user.scratch.jump_type == JumpType::Back && control_stick_dot(user) < 0.0 {
            user.scratch.idle_move_fwd_right_speed = -user.inverse_transform_vector(user.speed_xz());
            user.add_yaw_degrees(180.0);
        }
    }
}
