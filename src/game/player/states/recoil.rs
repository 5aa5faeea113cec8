// Recoil moves: the weapon kickback jump and the downward pound

use glam::Vec3;

use crate::core::math::project_on_plane;
use crate::engine::physics::Contact;

use super::super::airborne::{default_airborne_dash, AirborneHooks};
use super::super::animation::Clip;
use super::super::grounded::{default_grounded_dash, GroundedHooks};
use super::super::player::{Feedback, Player, CONTACT_OFFSET};
use super::super::state::{
    control_stick_dot, stick_in_3d, Env, IdleEnter, PerformCondition, PlayerMachine, PlayerStateId,
    StateArgs,
};
use super::super::states;

/// The recoil jump is locked down until this much of the clip has played.
const RECOIL_JUMP_ACTIONABLE: f32 = 0.35;
/// The pound brakes horizontal drift until this much of the clip has played.
const RECOIL_POUND_BRAKE_POINT: f32 = 0.55;
/// Bounce jump window after a pound landing, seconds from state entry.
const POUND_LANDING_JUMP_TIME: f32 = 0.1;

pub struct RecoilJump;

impl AirborneHooks for RecoilJump {
    fn id(&self) -> PlayerStateId {
        PlayerStateId::RecoilJump
    }

    fn inherit_y_speed_on_leave_ground(&self) -> bool {
        false
    }

    fn turning_lerp(&self, user: &Player) -> f32 {
        if user.anim.current() == Clip::RecoilJump
            && user.anim.normalized_time() < RECOIL_JUMP_ACTIONABLE
        {
            0.0
        } else {
            1.0
        }
    }

    fn air_accel_multiplier(&self, user: &Player) -> f32 {
        if user.anim.current() == Clip::RecoilJump
            && user.anim.normalized_time() < RECOIL_JUMP_ACTIONABLE
        {
            0.3
        } else {
            1.0
        }
    }

    fn can_wall_jump(&self, user: &Player) -> PerformCondition {
        if user.anim.current() == Clip::RecoilJump && user.anim.normalized_time() < 0.45 {
            PerformCondition::Cannot
        } else {
            PerformCondition::InFront
        }
    }

    fn can_grab_ledge(&self, user: &Player) -> PerformCondition {
        if user.speed_y() <= 0.0 {
            PerformCondition::InFrontAndBehind
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
        _args: StateArgs,
    ) {
        user.anim.play(Clip::RecoilJump);
    }

    fn on_fixed_update(
        &self,
        user: &mut Player,
        _env: &mut Env<'_>,
        _machine: &mut PlayerMachine,
        speed: &mut Vec3,
        _dt: f32,
    ) {
        // Falling is slowed during the kickback so the arc stays floaty.
        if user.anim.current() == Clip::RecoilJump && user.anim.normalized_time() < RECOIL_JUMP_ACTIONABLE {
            let up = user.gravity_up();
            let vertical = speed.dot(up);
            if vertical < 0.0 {
                *speed -= up * (vertical * 0.15);
            }
        }
    }

    fn on_dash_pressed(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
        if user.anim.playing_past(Clip::RecoilJump, RECOIL_JUMP_ACTIONABLE) && user.speed_y() <= 7.5 {
            default_airborne_dash(user, env, machine)
        } else {
            false
        }
    }

    fn on_anim_transition(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, clip: Clip) {
        if clip == Clip::RecoilJump {
            machine.change_state(user, env, states::fall(), StateArgs::None);
        }
    }
}

pub struct RecoilPound;

impl AirborneHooks for RecoilPound {
    fn id(&self) -> PlayerStateId {
        PlayerStateId::RecoilPound
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

    fn on_enter(
        &self,
        user: &mut Player,
        _env: &mut Env<'_>,
        _machine: &mut PlayerMachine,
        _previous: Option<PlayerStateId>,
        _args: StateArgs,
    ) {
        user.anim.play(Clip::RecoilPound);
    }

    fn on_fixed_update(
        &self,
        user: &mut Player,
        _env: &mut Env<'_>,
        _machine: &mut PlayerMachine,
        speed: &mut Vec3,
        _dt: f32,
    ) {
        if user.anim.current() != Clip::RecoilPound
            || user.anim.normalized_time() >= RECOIL_POUND_BRAKE_POINT
        {
            return;
        }
        // Kill drift harder when the stick pulls backwards.
        let horizontal_mult = if control_stick_dot(user) > 0.0 || user.input.left().length_squared() == 0.0 {
            0.91
        } else {
            0.65
        };
        let up = user.gravity_up();
        let vertical = speed.dot(up);
        let planar = (*speed - up * vertical) * horizontal_mult;
        let vertical = vertical * if vertical > 0.0 { 0.85 } else { 0.65 };
        *speed = planar + up * vertical;
    }

    fn on_ground_landed(
        &self,
        user: &mut Player,
        env: &mut Env<'_>,
        machine: &mut PlayerMachine,
        _contact: &Contact,
    ) {
        user.set_speed_y(0.0);
        user.scratch.airborne_has_wall_jumped = false;
        machine.change_state(user, env, states::recoil_pound_landing(), StateArgs::None);
    }

    fn on_dash_pressed(&self, _user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine) -> bool {
        false
    }
}

pub struct RecoilPoundLanding;

impl GroundedHooks for RecoilPoundLanding {
    fn id(&self) -> PlayerStateId {
        PlayerStateId::RecoilPoundLanding
    }

    fn on_enter(
        &self,
        user: &mut Player,
        _env: &mut Env<'_>,
        _machine: &mut PlayerMachine,
        _previous: Option<PlayerStateId>,
        _args: StateArgs,
    ) {
        user.anim.play(Clip::RecoilPoundLanding);
        user.velocity = Vec3::ZERO;
        user.feedback.push(Feedback::CameraShake);
    }

    fn on_jump_pressed(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
        let t = user.state_time();
        if t > POUND_LANDING_JUMP_TIME && t < POUND_LANDING_JUMP_TIME + 0.1 {
            machine.change_state(user, env, states::recoil_pound_bounce_jump(), StateArgs::None);
            true
        } else {
            false
        }
    }

    fn on_dash_pressed(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
        if user.state_time() > POUND_LANDING_JUMP_TIME + 0.05 {
            default_grounded_dash(user, env, machine)
        } else {
            false
        }
    }

    fn on_anim_transition(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, clip: Clip) {
        if clip == Clip::RecoilPoundLanding {
            machine.change_state(user, env, states::idle_move(), StateArgs::Idle(IdleEnter::Neutral));
        }
    }
}

pub struct RecoilPoundBounceJump;

impl AirborneHooks for RecoilPoundBounceJump {
    fn id(&self) -> PlayerStateId {
        PlayerStateId::RecoilPoundBounceJump
    }

    fn inherit_y_speed_on_leave_ground(&self) -> bool {
        false
    }

    fn turning_lerp(&self, _user: &Player) -> f32 {
        0.0
    }

    fn can_wall_jump(&self, user: &Player) -> PerformCondition {
        if user.speed_y() < 0.0 {
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
        _args: StateArgs,
    ) {
        let Some(cfg) = user.settings else {
            return;
        };
        user.anim.play(Clip::RecoilPoundBounceJump);
        user.anim.set_speed(1.5);
        user.position += user.gravity_up() * CONTACT_OFFSET;

        let mut boost = stick_in_3d(user);
        if control_stick_dot(user) < 0.0 {
            boost *= 0.5;
        }
        user.set_speed_y(cfg.base_jump_speed * 1.3);
        user.scratch.jump_is_holding_button = true;
        user.add_speed_xz(boost * cfg.top_air_speed * 3.0);
        user.position += user.gravity_up() * 0.1;
    }

    fn on_update(&self, user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine, _dt: f32) {
        states::hold_button_to_jump(user, 1.3);
    }

    fn on_exit(&self, user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine, _next: PlayerStateId) {
        user.anim.set_speed(1.0);
    }

    fn on_ground_enter(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, contact: &Contact) {
        if user.speed_y() > 4.0 || user.state_time() < 0.1 {
            return;
        }
        self.on_ground_landed(user, env, machine, contact);
    }

    fn on_ground_stay(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, contact: &Contact) {
        if user.speed_y() > 4.0 || user.state_time() < 0.1 {
            return;
        }
        self.on_ground_landed(user, env, machine, contact);
    }

    fn on_wall_contact(
        &self,
        user: &mut Player,
        _env: &mut Env<'_>,
        _machine: &mut PlayerMachine,
        contact: &Contact,
    ) {
        let slid = project_on_plane(user.speed_xz(), contact.normal);
        user.set_speed_xz(slid);
    }
}
