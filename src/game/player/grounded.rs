// Base behavior shared by every on-ground state
//
// Concrete states implement `GroundedHooks`; the `Grounded` adapter wraps the
// hooks into a machine state and supplies the shared contract: vertical speed
// is zeroed on entry, jump and dash presses are claimable, and losing the
// ground sends the character to the fall state.

use crate::engine::input::Button;
use crate::engine::physics::{ContactPhase, Surface};
use crate::engine::state_machine::{FixedUpdateState, State, UpdateState};

use super::animation::Clip;
use super::player::Player;
use super::state::{Env, IdleEnter, JumpType, PlayerEvent, PlayerMachine, PlayerStateId, StateArgs};
use super::states;

/// Default jump press response: a regular jump.
pub fn default_grounded_jump(user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
    machine.change_state(user, env, states::jump(), StateArgs::Jump(JumpType::Regular));
    true
}

/// Default dash press response: a ground dash.
pub fn default_grounded_dash(user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
    machine.change_state(user, env, states::dash_ground(), StateArgs::None);
    true
}

/// Default response to the ground disappearing: fall.
pub fn default_ground_exit(user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) {
    machine.change_state(user, env, states::fall(), StateArgs::None);
}

pub trait GroundedHooks: Sync + 'static {
    fn id(&self) -> PlayerStateId;

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

    fn on_fixed_update(&self, _user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine, _dt: f32) {}

    fn on_exit(&self, _user: &mut Player, _env: &mut Env<'_>, _machine: &mut PlayerMachine, _next: PlayerStateId) {}

    fn on_jump_pressed(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
        default_grounded_jump(user, env, machine)
    }

    fn on_dash_pressed(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
        default_grounded_dash(user, env, machine)
    }

    fn on_ground_exit(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) {
        default_ground_exit(user, env, machine);
    }

    fn on_anim_transition(
        &self,
        _user: &mut Player,
        _env: &mut Env<'_>,
        _machine: &mut PlayerMachine,
        _clip: Clip,
    ) {
    }
}

/// Adapter turning a `GroundedHooks` implementation into a machine state.
pub struct Grounded<S>(pub S);

impl<S: GroundedHooks> State<Player> for Grounded<S> {
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
        user.set_speed_y(0.0);

        self.0.on_enter(user, env, machine, previous, args);

        // Safety measure in case the ground was already gone when we arrived.
        if !user.on_ground {
            self.0.on_ground_exit(user, env, machine);
        }
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
            PlayerEvent::Contact(contact) if contact.is(Surface::Ground, ContactPhase::Exit) => {
                self.0.on_ground_exit(user, env, machine);
                true
            }
            PlayerEvent::AnimTransition(clip) => {
                self.0.on_anim_transition(user, env, machine, *clip);
                true
            }
            _ => false,
        }
    }
}

impl<S: GroundedHooks> UpdateState<Player> for Grounded<S> {
    fn on_update(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, dt: f32) {
        if user.settings.is_none() {
            return;
        }
        self.0.on_update(user, env, machine, dt);
    }
}

impl<S: GroundedHooks> FixedUpdateState<Player> for Grounded<S> {
    fn on_fixed_update(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, dt: f32) {
        if user.settings.is_none() {
            return;
        }
        self.0.on_fixed_update(user, env, machine, dt);
    }
}

/// Default landing target shared with the airborne base: idle/move with the
/// landing animation.
pub fn enter_idle_landing(user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) {
    machine.change_state(user, env, states::idle_move(), StateArgs::Idle(IdleEnter::Landing));
}
