// Base behavior shared by every in-air state
//
// The adapter owns the whole airborne contract: stick-driven turning, the
// shared horizontal accelerate/decelerate rule, gravity and terminal
// velocity, ceiling ricochets, and the wall jump / ledge grab detection that
// runs off wall contacts. Concrete states tune it through `AirborneHooks`.

use glam::Vec3;

use log::trace;

use crate::core::math::{angle_between_deg, clamp01, horizontal, move_towards, rotate_towards};
use crate::engine::input::Button;
use crate::engine::physics::{Contact, ContactPhase, Surface};
use crate::engine::state_machine::{FixedUpdateState, State, UpdateState};

use super::animation::Clip;
use super::geometry::{
    can_ledge_grab, is_in_wall_jump_range, wall_check_ray_bottom, wall_check_ray_mid,
    WALL_RAY_REACH, WALL_UP_ANGLE_LIMIT,
};
use super::grounded::enter_idle_landing;
use super::player::Player;
use super::state::{
    face_control_stick, stick_in_3d, Env, PerformCondition, PlayerEvent, PlayerMachine,
    PlayerStateId, StateArgs,
};
use super::states;

/// Turn rate towards the stick at full turning lerp, degrees per second.
pub const BASE_TURN_RATE: f32 = 300.0;

/// Below this much height loss since the last wall jump, similar walls
/// refuse to chain.
const WALL_JUMP_HEIGHT_LOSS_OFFSET: f32 = 0.75;

/// Vertical speed is cut to this fraction the moment a wall is attached.
const WALL_TOUCH_SPEED_DAMP: f32 = 0.3;

/// Extra horizontal deceleration applied when moving faster than the air top
/// speed. 1 while under the cap or holding the stick straight into the
/// motion; grows towards 2 the further the stick points away.
pub fn shared_overspeed_damp(user: &Player) -> f32 {
    let Some(cfg) = user.settings else {
        return 1.0;
    };
    if user.speed_xz().length_squared() < cfg.top_air_speed * cfg.top_air_speed {
        return 1.0;
    }
    if user.input.left() == glam::Vec2::ZERO {
        return 1.0;
    }
    let dot = clamp01(super::state::control_stick_dot(user));
    1.0 + (1.0 - dot)
}

/// Default landing: kill vertical speed, reset the wall jump chain, land into
/// idle/move.
pub fn default_ground_landed(user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) {
    user.set_speed_y(0.0);
    user.scratch.airborne_has_wall_jumped = false;
    enter_idle_landing(user, env, machine);
}

/// Default dash press response: an air dash.
pub fn default_airborne_dash(user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
    machine.change_state(user, env, states::dash_airborne(), StateArgs::None);
    true
}

pub trait AirborneHooks: Sync + 'static {
    fn id(&self) -> PlayerStateId;

    /// Whether entering this state off a slope converts run speed into lift.
    fn inherit_y_speed_on_leave_ground(&self) -> bool {
        true
    }

    /// Scales the base turn rate towards the stick direction.
    fn turning_lerp(&self, _user: &Player) -> f32 {
        1.0
    }

    fn overspeed_damp(&self, user: &Player) -> f32 {
        shared_overspeed_damp(user)
    }

    /// Multiplies upward speed when hitting a ceiling.
    fn ceiling_ricochet_multiplier(&self, _user: &Player) -> f32 {
        -0.5
    }

    fn air_top_speed_multiplier(&self, _user: &Player) -> f32 {
        1.0
    }

    fn air_accel_multiplier(&self, _user: &Player) -> f32 {
        1.0
    }

    fn air_decel_multiplier(&self, _user: &Player) -> f32 {
        1.0
    }

    fn gravity_multiplier(&self, _user: &Player) -> f32 {
        1.0
    }

    fn terminal_velocity_multiplier(&self, _user: &Player) -> f32 {
        1.0
    }

    fn can_wall_jump(&self, _user: &Player) -> PerformCondition {
        PerformCondition::Cannot
    }

    fn can_grab_ledge(&self, _user: &Player) -> PerformCondition {
        PerformCondition::Cannot
    }

    fn on_enter(
        &self,
        _user: &mut Player,
        _env: &mut Env<'_>,
        _machine: &mut PlayerMachine,
        _previous: Option<PlayerStateId>,
        _args: StateArgs,
    ) {
    }

    fn on_update(&self, _user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine, _dt: f32) {}

    /// Runs after the shared horizontal/gravity step, before the speed is
    /// written back. Mutate `speed` to adjust it.
    fn on_fixed_update(
        &self,
        _user: &mut Player,
        _env: &mut Env<'_>,
        _machine: &mut PlayerMachine,
        _speed: &mut Vec3,
        _dt: f32,
    ) {
    }

    fn on_exit(&self, _user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine, _next: PlayerStateId) {}

    /// Airborne states do not respond to jump presses unless they opt in.
    fn on_jump_pressed(&self, _user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine) -> bool {
        false
    }

    fn on_dash_pressed(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
        default_airborne_dash(user, env, machine)
    }

    fn on_ground_enter(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, contact: &Contact) {
        if user.speed_y() > 0.0 {
            return;
        }
        self.on_ground_landed(user, env, machine, contact);
    }

    fn on_ground_stay(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, contact: &Contact) {
        if user.speed_y() > 4.0 {
            return;
        }
        self.on_ground_landed(user, env, machine, contact);
    }

    fn on_ground_landed(
        &self,
        user: &mut Player,
        env: &mut Env<'_>,
        machine: &mut PlayerMachine,
        _contact: &Contact,
    ) {
        default_ground_landed(user, env, machine);
    }

    /// Extra per-state wall contact handling, after the shared detection.
    fn on_wall_contact(&self, _user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine, _contact: &Contact) {}

    fn on_anim_transition(
        &self,
        _user: &mut Player,
        _env: &mut Env<'_>,
        _machine: &mut PlayerMachine,
        _clip: Clip,
    ) {
    }
}

/// Adapter turning an `AirborneHooks` implementation into a machine state.
pub struct Airborne<S>(pub S);

impl<S: AirborneHooks> Airborne<S> {
    fn test_wall_jump(
        &self,
        user: &mut Player,
        env: &mut Env<'_>,
        machine: &mut PlayerMachine,
        contact: &Contact,
    ) {
        // Refuse the same wall (or similarly angled walls) until enough
        // height has been lost since the last wall jump.
        let chain_clear = has_wall_jump_chain_clearance(user) && !machine.is_pending_state_change();
        let new_wall = angle_between_deg(contact.normal, user.scratch.wall_attach_wall_normal)
            > user.mechanics.wall_jump_horizontal_arc;
        if !chain_clear && !new_wall {
            return;
        }

        let condition = self.0.can_wall_jump(user);
        if condition == PerformCondition::Cannot {
            return;
        }
        let up = user.gravity_up();
        if angle_between_deg(contact.normal, up) < user.mechanics.wall_jump_steepness_limit {
            return;
        }

        // Confirm with rays that the wall is actually beside the capsule.
        let mask = user.mechanics.collision_mask;
        let cast_mid = |backwards: bool| {
            let (ray, dist) = wall_check_ray_mid(user, backwards);
            env.scene.raycast(ray, dist * WALL_RAY_REACH, mask)
        };
        let cast_bottom = |backwards: bool| {
            let (ray, dist) = wall_check_ray_bottom(user, backwards);
            env.scene.raycast(ray, dist * WALL_RAY_REACH, mask)
        };
        let hit = match condition {
            PerformCondition::InFrontAndBehind => cast_mid(true)
                .or_else(|| cast_mid(false))
                .or_else(|| cast_bottom(true))
                .or_else(|| cast_bottom(false)),
            PerformCondition::InFront => cast_mid(false).or_else(|| cast_bottom(false)),
            _ => cast_mid(true).or_else(|| cast_bottom(true)),
        };
        let Some(hit) = hit else {
            return;
        };
        if angle_between_deg(up, hit.normal) > WALL_UP_ANGLE_LIMIT {
            return;
        }

        let stick = stick_in_3d(user);
        let in_range = (is_in_wall_jump_range(user, contact.normal)
            || (condition.allows_behind() && is_in_wall_jump_range(user, -contact.normal)))
            && stick.length_squared() > 0.0;
        if !in_range {
            return;
        }

        if user.speed_y() > 0.0 {
            user.set_speed_y(user.speed_y() * WALL_TOUCH_SPEED_DAMP);
        }

        trace!("wall jump detected, normal {:?}", contact.normal);
        machine.change_state(user, env, states::wall_jump_attach(), StateArgs::WallNormal(contact.normal));
    }

    fn test_ledge_grab(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) {
        let condition = self.0.can_grab_ledge(user);
        let Some(ledge) = can_ledge_grab(user, env.scene, condition) else {
            return;
        };
        if user.time <= user.scratch.ledge_grab_regrab_time {
            return;
        }
        trace!("ledge grab detected at {:?}", ledge.surface.point);
        machine.change_state(
            user,
            env,
            states::ledge_grab(),
            StateArgs::Ledge {
                wall: ledge.wall,
                surface: ledge.surface,
            },
        );
    }

    fn on_ceiling(&self, user: &mut Player) {
        if user.speed_y() > 0.0 {
            user.scratch.jump_is_holding_button = false;
            let mult = self.0.ceiling_ricochet_multiplier(user);
            user.set_speed_y(user.speed_y() * mult);
        }
    }
}

fn has_wall_jump_chain_clearance(user: &Player) -> bool {
    if !user.scratch.airborne_has_wall_jumped {
        return true;
    }
    // The previous jump-off point must be well above us again.
    let local = user.inverse_transform_point(user.scratch.wall_attach_jump_position);
    local.y > WALL_JUMP_HEIGHT_LOSS_OFFSET
}

impl<S: AirborneHooks> State<Player> for Airborne<S> {
    fn id(&self) -> PlayerStateId {
        self.0.id()
    }

    fn on_enter(
        &self,
        user: &mut Player,
        env: &mut Env<'_>,
        machine: &mut PlayerMachine,
        previous: Option<PlayerStateId>,
        args: StateArgs,
    ) {
        user.state_entered_at = user.time;
        if user.settings.is_none() {
            return;
        }

        user.on_ground = false;

        if self.0.inherit_y_speed_on_leave_ground() {
            // Running off rising ground converts some run speed into lift.
            let lift = user.ground_normal_delta * user.velocity.length();
            user.set_speed_y(lift.dot(user.gravity_up()));
        }

        self.0.on_enter(user, env, machine, previous, args);
    }

    fn on_exit(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, next: PlayerStateId) {
        self.0.on_exit(user, env, machine, next);
    }

    fn as_update(&self) -> Option<&dyn UpdateState<Player>> {
        Some(self)
    }

    fn as_fixed_update(&self) -> Option<&dyn FixedUpdateState<Player>> {
        Some(self)
    }

    fn on_event(
        &self,
        user: &mut Player,
        env: &mut Env<'_>,
        machine: &mut PlayerMachine,
        event: &PlayerEvent,
    ) -> bool {
        match event {
            PlayerEvent::Press(Button::Jump) => self.0.on_jump_pressed(user, env, machine),
            PlayerEvent::Press(Button::Dash) => self.0.on_dash_pressed(user, env, machine),
            PlayerEvent::Contact(contact) => match (contact.surface, contact.phase) {
                (Surface::Ground, ContactPhase::Enter) => {
                    self.0.on_ground_enter(user, env, machine, contact);
                    true
                }
                (Surface::Ground, ContactPhase::Stay) => {
                    self.0.on_ground_stay(user, env, machine, contact);
                    true
                }
                (Surface::Wall, ContactPhase::Enter | ContactPhase::Stay) => {
                    self.test_wall_jump(user, env, machine, contact);
                    self.test_ledge_grab(user, env, machine);
                    self.0.on_wall_contact(user, env, machine, contact);
                    true
                }
                (Surface::Ceiling, ContactPhase::Enter | ContactPhase::Stay) => {
                    self.on_ceiling(user);
                    true
                }
                _ => false,
            },
            PlayerEvent::AnimTransition(clip) => {
                self.0.on_anim_transition(user, env, machine, *clip);
                true
            }
            _ => false,
        }
    }
}

impl<S: AirborneHooks> UpdateState<Player> for Airborne<S> {
    fn on_update(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, dt: f32) {
        if user.settings.is_none() {
            return;
        }

        // Turn towards the stick.
        let target = face_control_stick(user);
        let turn_rate = BASE_TURN_RATE * self.0.turning_lerp(user);
        let rotation = rotate_towards(user.gravity_rotation(), target, turn_rate * dt);
        user.set_gravity_rotation(rotation);

        self.0.on_update(user, env, machine, dt);
    }
}

impl<S: AirborneHooks> FixedUpdateState<Player> for Airborne<S> {
    fn on_fixed_update(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, dt: f32) {
        let Some(cfg) = user.settings else {
            return;
        };

        let mut speed = user.velocity;
        let up = user.gravity_up();

        let target_xz =
            user.gravity_frame() * horizontal(user.input.left()) * cfg.top_air_speed * self.0.air_top_speed_multiplier(user);
        let current_xz = user.speed_xz();

        // Decelerate when there is no input or we already outrun the target
        // in its own direction, accelerate otherwise.
        let accel = if target_xz.length_squared() == 0.0
            || (current_xz.length_squared() > target_xz.length_squared() && current_xz.dot(target_xz) > 0.0)
        {
            cfg.air_deceleration * self.0.air_decel_multiplier(user)
        } else {
            cfg.air_acceleration * self.0.air_accel_multiplier(user)
        };
        let accel = accel * self.0.overspeed_damp(user);

        let vertical = up * speed.dot(up);
        speed = move_towards(speed, target_xz + vertical, accel * dt);
        speed -= up * cfg.gravity * self.0.gravity_multiplier(user) * dt;

        self.0.on_fixed_update(user, env, machine, &mut speed, dt);

        // Terminal velocity clamp.
        let terminal = cfg.terminal_velocity * self.0.terminal_velocity_multiplier(user);
        let fall_speed = speed.dot(up);
        if fall_speed < -terminal {
            speed -= up * (fall_speed + terminal);
        }

        user.velocity = speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::player::settings::{MechanicSettings, SpeedSettings};
    use glam::Vec2;

    fn player() -> Player {
        Player::new(SpeedSettings::default(), MechanicSettings::default(), Vec3::ZERO)
    }

    #[test]
    fn test_overspeed_damp_neutral_stick_is_one() {
        let mut p = player();
        p.velocity = Vec3::new(25.0, 0.0, 0.0);
        assert_eq!(shared_overspeed_damp(&p), 1.0);
    }

    #[test]
    fn test_overspeed_damp_under_cap_is_one() {
        let mut p = player();
        p.velocity = Vec3::new(5.0, -30.0, 0.0);
        p.input.set_stick(crate::engine::input::Stick::Left, Vec2::new(0.0, -1.0));
        assert_eq!(shared_overspeed_damp(&p), 1.0);
    }

    #[test]
    fn test_overspeed_damp_grows_against_stick() {
        let mut p = player();
        // Moving fast along +Z while facing +Z, stick pulled straight back.
        p.velocity = Vec3::new(0.0, 0.0, 25.0);
        p.input.set_stick(crate::engine::input::Stick::Left, Vec2::new(0.0, -1.0));
        assert_eq!(shared_overspeed_damp(&p), 2.0);

        // Stick straight into the motion keeps the damp at 1.
        p.input.set_stick(crate::engine::input::Stick::Left, Vec2::new(0.0, 1.0));
        assert_eq!(shared_overspeed_damp(&p), 1.0);
    }

    #[test]
    fn test_wall_jump_chain_clearance() {
        let mut p = player();
        assert!(has_wall_jump_chain_clearance(&p));

        p.scratch.airborne_has_wall_jumped = true;
        p.scratch.wall_attach_jump_position = Vec3::new(0.0, 0.5, 0.0);
        p.position = Vec3::ZERO;
        // Jump-off point barely above us, no clearance yet.
        assert!(!has_wall_jump_chain_clearance(&p));

        // Fallen well below the jump-off point.
        p.position = Vec3::new(0.0, -1.0, 0.0);
        assert!(has_wall_jump_chain_clearance(&p));
    }
}
