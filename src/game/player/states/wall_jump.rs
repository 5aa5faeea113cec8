// Wall jumping: the attach slide and the jump off the wall

use glam::Vec3;

use crate::core::math::{angle_between_deg, clamp01, move_towards, project_on_plane, yaw_of_direction};
use crate::engine::input::Button;
use crate::engine::physics::Contact;

use super::super::airborne::{default_ground_landed, AirborneHooks};
use super::super::animation::Clip;
use super::super::geometry::{wall_check_ray_bottom, wall_check_ray_mid};
use super::super::player::{Player, CONTACT_OFFSET};
use super::super::state::{
    control_stick_dot, stick_in_3d, Env, PerformCondition, PlayerMachine, PlayerStateId, StateArgs,
};
use super::super::states;
use super::jump::hold_button_to_jump;

/// How fast the character can crawl along the wall while attached, per fixed
/// step.
const WALL_SLIDE_MOVE_SPEED: f32 = 0.2;
/// Extra reach past the capsule radius for the wall snap probes.
const SNAP_RAY_OFFSET: f32 = 0.05;
/// A jump buffered into the attach keeps this much launch speed when it came
/// out of an air dash.
const DASH_CARRY_TOUCH_SPEED: f32 = 20.0;

/// Stick input flattened against the wall, fading out as it points into it.
fn analog_stick_on_wall(user: &Player) -> Vec3 {
    let stick = stick_in_3d(user);
    stick * (1.0 - stick.dot(user.scratch.wall_attach_wall_normal))
}

/// Keep the capsule pressed against the wall behind us. Losing the wall drops
/// into a fall.
fn snap_to_wall(user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) {
    let mask = user.mechanics.collision_mask;
    let distance = user.capsule.radius + SNAP_RAY_OFFSET;
    let (bottom, _) = wall_check_ray_bottom(user, true);
    let (mid, _) = wall_check_ray_mid(user, true);
    let hit = env
        .scene
        .raycast(bottom, distance, mask)
        .or_else(|| env.scene.raycast(mid, distance, mask));
    match hit {
        Some(hit) => {
            let local = user.inverse_transform_point(hit.point);
            user.position = user.transform_point(Vec3::new(local.x, 0.0, local.z))
                + user.gravity_forward() * user.capsule.radius;
        }
        None => machine.change_state(user, env, states::fall(), StateArgs::None),
    }
}

pub struct WallJumpAttach;

impl AirborneHooks for WallJumpAttach {
    fn id(&self) -> PlayerStateId {
        PlayerStateId::WallJumpAttach
    }

    fn inherit_y_speed_on_leave_ground(&self) -> bool {
        false
    }

    fn turning_lerp(&self, _user: &Player) -> f32 {
        0.0
    }

    fn terminal_velocity_multiplier(&self, _user: &Player) -> f32 {
        0.1
    }

    fn can_grab_ledge(&self, user: &Player) -> PerformCondition {
        if user.speed_y() <= 0.0 {
            PerformCondition::Behind
        } else {
            PerformCondition::Cannot
        }
    }

    fn on_enter(
        &self,
        user: &mut Player,
        env: &mut Env<'_>,
        machine: &mut PlayerMachine,
        previous: Option<PlayerStateId>,
        args: StateArgs,
    ) {
        let Some(cfg) = user.settings else {
            return;
        };
        user.anim.play(Clip::WallJumpAttach);
        if let StateArgs::WallNormal(normal) = args {
            user.scratch.wall_attach_wall_normal = normal;
        }
        let normal = user.scratch.wall_attach_wall_normal;

        // Back to the wall, facing along its normal.
        let local_normal = user.gravity_frame().inverse() * normal;
        user.set_yaw_degrees(yaw_of_direction(local_normal));
        let slid = project_on_plane(user.speed_xz(), normal);
        user.set_speed_xz(slid);
        snap_to_wall(user, env, machine);

        // A jump press already waiting in the buffer means we launch the
        // moment the attach commits, and carry extra speed.
        user.scratch.wall_attach_touch_speed = if user.input.buffered(Button::Jump) {
            if previous == Some(PlayerStateId::DashAirborne) {
                DASH_CARRY_TOUCH_SPEED
            } else {
                cfg.top_air_speed * 2.0
            }
        } else {
            cfg.top_air_speed
        };
    }

    fn on_update(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, _dt: f32) {
        snap_to_wall(user, env, machine);
    }

    fn on_fixed_update(
        &self,
        user: &mut Player,
        _env: &mut Env<'_>,
        _machine: &mut PlayerMachine,
        speed: &mut Vec3,
        _dt: f32,
    ) {
        let up = user.gravity_up();
        let vertical = up * speed.dot(up);
        let planar = move_towards(*speed - vertical, analog_stick_on_wall(user), WALL_SLIDE_MOVE_SPEED);
        *speed = planar + vertical;
    }

    fn on_jump_pressed(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
        if machine.is_pending_state_change() {
            return false;
        }
        user.scratch.airborne_has_wall_jumped = true;
        machine.change_state(user, env, states::wall_jump_jump(), StateArgs::None);
        true
    }

    fn on_dash_pressed(&self, _user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine) -> bool {
        false
    }

    fn on_exit(&self, user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine, next: PlayerStateId) {
        if next != PlayerStateId::WallJumpJump {
            // Nudge off the wall so the capsule does not re-trigger it.
            user.add_speed_xz(user.scratch.wall_attach_wall_normal);
            return;
        }

        // Steer the launch towards the stick, within the bounce-off arc.
        let stick = stick_in_3d(user);
        let stick_local = user.gravity_rotation().inverse() * stick;
        let dot = control_stick_dot(user);
        let mut launch_angle = angle_between_deg(Vec3::Z, stick_local) * stick_local.x.signum();
        if launch_angle > 90.0 {
            launch_angle = 180.0 - launch_angle;
        } else if launch_angle < -90.0 {
            launch_angle = -180.0 + launch_angle;
        }
        if stick.length_squared() != 0.0 && dot > -0.7071 {
            let arc = user.mechanics.wall_jump_bounce_off_arc;
            user.add_yaw_degrees(launch_angle.clamp(-arc, arc));
        }
        if dot < -0.707 {
            // Pulling back into the wall trades distance for control.
            user.scratch.wall_attach_touch_speed *= 0.87;
        }
        let launch = user.gravity_forward() * user.scratch.wall_attach_touch_speed;
        user.set_speed_xz(launch);
    }

    fn on_ground_landed(
        &self,
        user: &mut Player,
        env: &mut Env<'_>,
        machine: &mut PlayerMachine,
        contact: &Contact,
    ) {
        let _ = contact;
        default_ground_landed(user, env, machine);
        user.set_speed_xz(Vec3::ZERO);
    }
}

pub struct WallJumpJump;

impl AirborneHooks for WallJumpJump {
    fn id(&self) -> PlayerStateId {
        PlayerStateId::WallJumpJump
    }

    fn inherit_y_speed_on_leave_ground(&self) -> bool {
        false
    }

    /// Turning authority ramps back in over the first second.
    fn turning_lerp(&self, user: &Player) -> f32 {
        clamp01(user.state_time())
    }

    fn can_wall_jump(&self, user: &Player) -> PerformCondition {
        if user.speed_y() < 9.5 {
            PerformCondition::InFront
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

    fn air_accel_multiplier(&self, user: &Player) -> f32 {
        if user.state_time() <= 0.2 {
            0.5
        } else {
            1.0
        }
    }

    fn air_decel_multiplier(&self, user: &Player) -> f32 {
        if user.state_time() <= 0.2 {
            0.5
        } else {
            1.0
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
        user.set_speed_y(cfg.base_jump_speed);
        user.anim.play(Clip::WallJumpJump);
        user.position += user.gravity_up() * CONTACT_OFFSET;
        user.scratch.wall_attach_jump_position = user.position;
        user.scratch.jump_is_holding_button = true;
    }

    fn on_update(&self, user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine, _dt: f32) {
        hold_button_to_jump(user, 1.0);
    }

    fn on_ground_stay(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, contact: &Contact) {
        if user.speed_y() > 0.0 {
            return;
        }
        self.on_ground_landed(user, env, machine, contact);
    }
}
