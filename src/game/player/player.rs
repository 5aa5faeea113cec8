// The player character's data
//
// `Player` is plain data plus accessors; behavior lives in the states. The
// gravity frame splits orientation into the frame itself (which way is down)
// and a yaw within that frame, so everything the states do with speed and
// facing keeps working when gravity is redirected.

use glam::{Affine3A, Quat, Vec2, Vec3};

use crate::engine::input::{Button, ButtonSet, InputBufferSystem, Stick, StickState};
use crate::engine::physics::ColliderId;

use super::animation::AnimationPlayer;
use super::settings::{MechanicSettings, SpeedSettings};
use super::state::JumpType;

/// Gap the solver keeps between the capsule and geometry. Jumps nudge the
/// capsule up by this much so the first integration step clears the floor.
pub const CONTACT_OFFSET: f32 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub radius: f32,
    pub height: f32,
}

impl Default for Capsule {
    fn default() -> Self {
        Self {
            radius: 0.4,
            height: 1.8,
        }
    }
}

/// Input as the states see it: latest stick values plus held/buffered button
/// snapshots refreshed once per frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    sticks: StickState,
    held: ButtonSet,
    buffered: ButtonSet,
}

impl InputSnapshot {
    pub fn left(&self) -> Vec2 {
        self.sticks.left
    }

    pub fn right(&self) -> Vec2 {
        self.sticks.right
    }

    pub fn set_stick(&mut self, stick: Stick, value: Vec2) {
        self.sticks.set(stick, value);
    }

    /// Whether the button is physically held right now.
    pub fn held(&self, button: Button) -> bool {
        self.held.contains(button)
    }

    /// Whether an unclaimed press is waiting in the buffer window.
    pub fn buffered(&self, button: Button) -> bool {
        self.buffered.contains(button)
    }

    pub fn refresh(&mut self, buffer: &InputBufferSystem) {
        self.held.clear();
        self.buffered.clear();
        for button in Button::ALL {
            if buffer.pressed(button) {
                self.held.insert(button);
            }
            if buffer.buffered(button) {
                self.buffered.insert(button);
            }
        }
    }
}

/// Per-state working data. Every state the player can be in parks its
/// between-frame values here, prefixed by the state that owns them. Cheap to
/// keep around and saves the states from needing storage of their own.
#[derive(Debug, Clone, Copy)]
pub struct Scratch {
    pub idle_move_stop_on_neutral: bool,
    pub idle_move_fwd_right_speed: Vec3,
    pub idle_move_tilt_prev_yaw: f32,

    pub airborne_has_wall_jumped: bool,

    pub jump_is_holding_button: bool,
    pub jump_lock_turning: bool,
    pub jump_type: JumpType,

    pub wall_attach_touch_speed: f32,
    pub wall_attach_wall_normal: Vec3,
    /// Where the last wall jump left the wall, for chain suppression.
    pub wall_attach_jump_position: Vec3,

    pub ledge_grab_platform: Option<ColliderId>,
    pub ledge_grab_platform_matrix: Affine3A,
    /// Game time before which re-grabbing is refused.
    pub ledge_grab_regrab_time: f32,
}

impl Default for Scratch {
    fn default() -> Self {
        Self {
            idle_move_stop_on_neutral: false,
            idle_move_fwd_right_speed: Vec3::ZERO,
            idle_move_tilt_prev_yaw: 0.0,
            airborne_has_wall_jumped: false,
            jump_is_holding_button: false,
            jump_lock_turning: false,
            jump_type: JumpType::Regular,
            wall_attach_touch_speed: 0.0,
            wall_attach_wall_normal: Vec3::Z,
            wall_attach_jump_position: Vec3::ZERO,
            ledge_grab_platform: None,
            ledge_grab_platform_matrix: Affine3A::IDENTITY,
            ledge_grab_regrab_time: 0.0,
        }
    }
}

/// One-shot presentation requests for the host (camera, rumble).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    CameraShake,
}

#[derive(Debug)]
pub struct Player {
    pub position: Vec3,
    /// World-space velocity, integrated by the controller each fixed step.
    pub velocity: Vec3,

    gravity_frame: Quat,
    gravity_rotation: Quat,

    /// Scales how strongly ground states drive velocity. Reset to 1 on every
    /// state change.
    pub friction_modifier: f32,
    /// Game clock in seconds, advanced by the controller.
    pub time: f32,
    /// Set when the current state was entered, so tunables can ask how long
    /// they have been running without machine access.
    pub state_entered_at: f32,

    pub on_ground: bool,
    pub ground_normal: Vec3,
    /// Frame-to-frame change of the ground normal, used to convert run speed
    /// into lift when leaving a slope.
    pub ground_normal_delta: Vec3,

    pub capsule: Capsule,
    pub settings: Option<SpeedSettings>,
    pub mechanics: MechanicSettings,
    pub input: InputSnapshot,
    pub anim: AnimationPlayer,
    pub scratch: Scratch,
    pub feedback: Vec<Feedback>,
}

impl Player {
    pub fn new(settings: SpeedSettings, mechanics: MechanicSettings, spawn: Vec3) -> Self {
        Self {
            position: spawn,
            velocity: Vec3::ZERO,
            gravity_frame: Quat::IDENTITY,
            gravity_rotation: Quat::IDENTITY,
            friction_modifier: 1.0,
            time: 0.0,
            state_entered_at: 0.0,
            on_ground: false,
            ground_normal: Vec3::Y,
            ground_normal_delta: Vec3::ZERO,
            capsule: Capsule::default(),
            settings: Some(settings),
            mechanics,
            input: InputSnapshot::default(),
            anim: AnimationPlayer::with_player_clips(),
            scratch: Scratch::default(),
            feedback: Vec::new(),
        }
    }

    /// Seconds since the current state was entered.
    pub fn state_time(&self) -> f32 {
        self.time - self.state_entered_at
    }

    // --- gravity frame ---

    /// The frame that decides which way is down. Identity means regular
    /// world-up gravity.
    pub fn gravity_frame(&self) -> Quat {
        self.gravity_frame
    }

    pub fn set_gravity_frame(&mut self, frame: Quat) {
        // Preserve the yaw within the new frame.
        let yaw = self.yaw_degrees();
        self.gravity_frame = frame.normalize();
        self.set_yaw_degrees(yaw);
    }

    /// Full facing orientation: gravity frame plus yaw.
    pub fn gravity_rotation(&self) -> Quat {
        self.gravity_rotation
    }

    pub fn set_gravity_rotation(&mut self, rotation: Quat) {
        self.gravity_rotation = rotation.normalize();
    }

    pub fn gravity_up(&self) -> Vec3 {
        self.gravity_frame * Vec3::Y
    }

    pub fn gravity_forward(&self) -> Vec3 {
        self.gravity_rotation * Vec3::Z
    }

    /// Yaw within the gravity frame, degrees.
    pub fn yaw_degrees(&self) -> f32 {
        let local = self.gravity_frame.inverse() * self.gravity_rotation;
        let fwd = local * Vec3::Z;
        if fwd.x * fwd.x + fwd.z * fwd.z < f32::EPSILON {
            0.0
        } else {
            fwd.x.atan2(fwd.z).to_degrees()
        }
    }

    pub fn set_yaw_degrees(&mut self, degrees: f32) {
        self.gravity_rotation = self.gravity_frame * Quat::from_rotation_y(degrees.to_radians());
    }

    pub fn add_yaw_degrees(&mut self, degrees: f32) {
        self.set_yaw_degrees(self.yaw_degrees() + degrees);
    }

    // --- speed decomposition ---

    /// Horizontal part of velocity, relative to the gravity frame.
    pub fn speed_xz(&self) -> Vec3 {
        let up = self.gravity_up();
        self.velocity - up * self.velocity.dot(up)
    }

    /// Vertical speed along the gravity up axis. Positive is rising.
    pub fn speed_y(&self) -> f32 {
        self.velocity.dot(self.gravity_up())
    }

    pub fn set_speed_y(&mut self, speed: f32) {
        let up = self.gravity_up();
        self.velocity = self.speed_xz() + up * speed;
    }

    pub fn set_speed_xz(&mut self, horizontal: Vec3) {
        let up = self.gravity_up();
        let horizontal = horizontal - up * horizontal.dot(up);
        self.velocity = horizontal + up * self.speed_y();
    }

    pub fn add_speed_xz(&mut self, delta: Vec3) {
        self.set_speed_xz(self.speed_xz() + delta);
    }

    // --- local frame transforms ---

    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.gravity_rotation * local
    }

    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.gravity_rotation.inverse() * (world - self.position)
    }

    pub fn transform_vector(&self, local: Vec3) -> Vec3 {
        self.gravity_rotation * local
    }

    pub fn inverse_transform_vector(&self, world: Vec3) -> Vec3 {
        self.gravity_rotation.inverse() * world
    }

    // --- capsule reference points, position is the foot of the capsule ---

    pub fn capsule_center(&self) -> Vec3 {
        self.position + self.gravity_up() * (self.capsule.height * 0.5)
    }

    /// Center of the top hemisphere.
    pub fn capsule_top(&self) -> Vec3 {
        self.position + self.gravity_up() * (self.capsule.height - self.capsule.radius)
    }

    /// Center of the bottom hemisphere.
    pub fn capsule_bottom(&self) -> Vec3 {
        self.position + self.gravity_up() * self.capsule.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn player() -> Player {
        Player::new(SpeedSettings::default(), MechanicSettings::default(), Vec3::ZERO)
    }

    #[test]
    fn test_yaw_round_trip() {
        let mut p = player();
        p.set_yaw_degrees(90.0);
        assert_relative_eq!(p.yaw_degrees(), 90.0, epsilon = 1e-3);
        let fwd = p.gravity_forward();
        assert_relative_eq!(fwd.x, 1.0, epsilon = 1e-4);
        assert_relative_eq!(fwd.z, 0.0, epsilon = 1e-4);
        p.add_yaw_degrees(-90.0);
        assert_relative_eq!(p.yaw_degrees(), 0.0, epsilon = 1e-3);
    }

    #[test]
    fn test_speed_decomposition() {
        let mut p = player();
        p.velocity = Vec3::new(3.0, -7.0, 4.0);
        assert_relative_eq!(p.speed_y(), -7.0);
        assert_relative_eq!(p.speed_xz().length(), 5.0);
        p.set_speed_y(2.0);
        assert_relative_eq!(p.velocity.y, 2.0);
        assert_relative_eq!(p.velocity.x, 3.0);
        p.set_speed_xz(Vec3::new(1.0, 99.0, 0.0));
        assert_relative_eq!(p.velocity.x, 1.0);
        assert_relative_eq!(p.velocity.y, 2.0);
        assert_relative_eq!(p.velocity.z, 0.0);
    }

    #[test]
    fn test_speed_decomposition_in_rotated_frame() {
        let mut p = player();
        // Gravity pointing along -X, up is +X.
        p.set_gravity_frame(Quat::from_rotation_z(-90f32.to_radians()));
        p.velocity = Vec3::new(5.0, 1.0, 0.0);
        assert_relative_eq!(p.speed_y(), 5.0, epsilon = 1e-4);
        assert_relative_eq!(p.speed_xz().length(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_local_point_round_trip() {
        let mut p = player();
        p.position = Vec3::new(10.0, 2.0, -3.0);
        p.set_yaw_degrees(37.0);
        let world = Vec3::new(11.0, 3.0, -1.0);
        let local = p.inverse_transform_point(world);
        let back = p.transform_point(local);
        assert_relative_eq!(back.x, world.x, epsilon = 1e-4);
        assert_relative_eq!(back.y, world.y, epsilon = 1e-4);
        assert_relative_eq!(back.z, world.z, epsilon = 1e-4);
    }

    #[test]
    fn test_capsule_points() {
        let p = player();
        assert_relative_eq!(p.capsule_center().y, 0.9);
        assert_relative_eq!(p.capsule_top().y, 1.4);
        assert_relative_eq!(p.capsule_bottom().y, 0.4);
    }
}
