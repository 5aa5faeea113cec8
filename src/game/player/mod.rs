// The player character: data, settings, base state behavior and the
// fourteen concrete states, tied together by the controller.

pub mod airborne;
pub mod animation;
pub mod controller;
pub mod geometry;
pub mod grounded;
pub mod player;
pub mod settings;
pub mod state;
pub mod states;
pub mod weapon;

pub use animation::{AnimationPlayer, BlendParam, Clip};
pub use controller::PlayerController;
pub use player::{Capsule, Feedback, Player, Scratch, CONTACT_OFFSET};
pub use settings::{MechanicSettings, SettingsError, SpeedSettings};
pub use state::{
    Env, GetupKind, IdleEnter, JumpType, PerformCondition, PlayerEvent, PlayerMachine,
    PlayerStateId, PlayerStateRef, StateArgs,
};
pub use weapon::{dual_gun_actions, WeaponAction};
