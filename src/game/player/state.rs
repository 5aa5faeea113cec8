// State identities, transition arguments and shared stick helpers

use glam::{Quat, Vec3};

use crate::core::math::{horizontal, look_rotation};
use crate::engine::input::Button;
use crate::engine::physics::{Contact, PhysicsScene, RayHit};
use crate::engine::state_machine::{MachineUser, StateMachine, StateRef};

use super::animation::Clip;
use super::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerStateId {
    IdleMove,
    StopRun,
    Fall,
    Jump,
    DashGround,
    DashAirborne,
    WallJumpAttach,
    WallJumpJump,
    LedgeGrab,
    LedgeGetup,
    RecoilJump,
    RecoilPound,
    RecoilPoundLanding,
    RecoilPoundBounceJump,
}

/// How the idle/move state is being entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdleEnter {
    #[default]
    Neutral,
    Landing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JumpType {
    #[default]
    Regular,
    /// Full-speed jump, done while already running.
    Super,
    /// Jump away from the facing direction; turning stays locked.
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GetupKind {
    #[default]
    Normal,
    Fast,
}

/// Arguments carried by a state transition.
#[derive(Debug, Clone, Copy, Default)]
pub enum StateArgs {
    #[default]
    None,
    Idle(IdleEnter),
    Jump(JumpType),
    /// Normal of the wall being attached to.
    WallNormal(Vec3),
    /// Detection hits for a ledge grab.
    Ledge { wall: RayHit, surface: RayHit },
    Getup(GetupKind),
}

/// Per-call environment: access to the host physics scene.
pub struct Env<'e> {
    pub scene: &'e dyn PhysicsScene,
}

/// Everything the state machine can forward to the current state.
#[derive(Debug, Clone, Copy)]
pub enum PlayerEvent {
    /// A buffered press looking for a claimant.
    Press(Button),
    Hold(Button),
    Release(Button),
    Contact(Contact),
    /// An animation clip crossed its transition point.
    AnimTransition(Clip),
}

impl MachineUser for Player {
    type Id = PlayerStateId;
    type Args = StateArgs;
    type Event = PlayerEvent;
    type Env<'e> = Env<'e>;

    fn now(&self) -> f32 {
        self.time
    }
}

pub type PlayerMachine = StateMachine<Player>;
pub type PlayerStateRef = StateRef<Player>;

/// Where a detection-driven move may be performed relative to facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformCondition {
    Cannot,
    InFront,
    Behind,
    InFrontAndBehind,
}

impl PerformCondition {
    pub fn allows_front(self) -> bool {
        matches!(self, PerformCondition::InFront | PerformCondition::InFrontAndBehind)
    }

    pub fn allows_behind(self) -> bool {
        matches!(self, PerformCondition::Behind | PerformCondition::InFrontAndBehind)
    }
}

/// Left stick mapped into the character's gravity frame.
pub fn stick_in_3d(user: &Player) -> Vec3 {
    user.gravity_frame() * horizontal(user.input.left())
}

/// How much the stick points along the facing direction, -1 to 1.
pub fn control_stick_dot(user: &Player) -> f32 {
    stick_in_3d(user).normalize_or_zero().dot(user.gravity_forward())
}

/// Orientation that faces the stick direction, or the current facing when the
/// stick is neutral.
pub fn face_control_stick(user: &Player) -> Quat {
    let stick = stick_in_3d(user);
    if stick.length_squared() < f32::EPSILON {
        user.gravity_rotation()
    } else {
        let frame = user.gravity_frame();
        let local = frame.inverse() * stick;
        frame * look_rotation(local, Vec3::Y)
    }
}
