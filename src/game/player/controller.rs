// The character controller: machine, buffer and integration glue
//
// One controller per character. The embedding game forwards raw input and
// physics contacts, ticks `update` once per frame and `fixed_update` at the
// physics rate; everything else happens in the states.

use glam::{Vec2, Vec3};

use log::{info, warn};

use crate::engine::input::{Button, InputBufferSystem, InputSink, Stick};
use crate::engine::physics::{Contact, ContactPhase, PhysicsScene, Surface};
use crate::engine::state_machine::ChangeMode;

use super::player::{Feedback, Player};
use super::settings::{MechanicSettings, SpeedSettings};
use super::state::{Env, IdleEnter, PlayerEvent, PlayerMachine, PlayerStateId, PlayerStateRef, StateArgs};
use super::states;
use super::weapon::WeaponAction;

pub struct PlayerController {
    player: Player,
    machine: PlayerMachine,
    buffer: InputBufferSystem,
    weapon_actions: Vec<WeaponAction>,
}

impl PlayerController {
    pub fn new(
        settings: SpeedSettings,
        mechanics: MechanicSettings,
        spawn: Vec3,
        scene: &dyn PhysicsScene,
    ) -> Self {
        let mut player = Player::new(settings, mechanics, spawn);
        if let Err(err) = settings.validate() {
            // Run without speed settings; states skip their physics.
            warn!("speed settings rejected: {err}");
            player.settings = None;
        }

        let mut env = Env { scene };
        let mut machine = PlayerMachine::with_initial(
            &mut player,
            &mut env,
            ChangeMode::AtEndOfUpdate,
            states::idle_move(),
            StateArgs::Idle(IdleEnter::Neutral),
        );
        machine.set_state_changed_hook(|user, _new, _previous| {
            user.friction_modifier = 1.0;
        });

        info!("player controller ready at {spawn:?}");
        Self {
            player,
            machine,
            buffer: InputBufferSystem::new(),
            weapon_actions: Vec::new(),
        }
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn current_state(&self) -> Option<PlayerStateId> {
        self.machine.current_id()
    }

    pub fn previous_state(&self) -> Option<PlayerStateId> {
        self.machine.previous_id()
    }

    pub fn is_pending_state_change(&self) -> bool {
        self.machine.is_pending_state_change()
    }

    /// Force a state right now, discarding any pending transition.
    pub fn set_state(&mut self, scene: &dyn PhysicsScene, state: PlayerStateRef, args: StateArgs) {
        let mut env = Env { scene };
        self.machine.change_state_immediately(&mut self.player, &mut env, state, args);
    }

    pub fn wield(&mut self, actions: Vec<WeaponAction>) {
        self.weapon_actions = actions;
    }

    pub fn unwield(&mut self) {
        self.weapon_actions.clear();
    }

    /// Raw button edge from the platform layer.
    pub fn on_button(&mut self, button: Button, pressed: bool) {
        self.buffer.on_input(button, pressed);
    }

    pub fn on_stick(&mut self, stick: Stick, value: Vec2) {
        self.player.input.set_stick(stick, value);
    }

    /// Physics contact callback, expected between fixed updates. Ground
    /// contacts update the grounding bookkeeping before the state sees them.
    pub fn on_contact(&mut self, scene: &dyn PhysicsScene, contact: Contact) {
        if contact.surface == Surface::Ground {
            match contact.phase {
                ContactPhase::Enter | ContactPhase::Stay => {
                    self.player.on_ground = true;
                    self.player.ground_normal_delta = contact.normal - self.player.ground_normal;
                    self.player.ground_normal = contact.normal;
                }
                ContactPhase::Exit => {
                    self.player.on_ground = false;
                    self.player.ground_normal_delta = Vec3::ZERO;
                }
            }
        }
        let mut env = Env { scene };
        self.machine
            .dispatch_event(&mut self.player, &mut env, &PlayerEvent::Contact(contact));
    }

    /// Per-frame tick: clock, input snapshot, state update, buffered input
    /// offers, then animation playback and its transition events.
    pub fn update(&mut self, scene: &dyn PhysicsScene, dt: f32) {
        self.player.time += dt;
        self.player.input.refresh(&self.buffer);

        let mut env = Env { scene };
        self.machine.update(&mut self.player, &mut env, dt);

        let mut sink = StateSink {
            player: &mut self.player,
            machine: &mut self.machine,
            env: &mut env,
            actions: &self.weapon_actions,
        };
        self.buffer.update(dt, &mut sink);

        self.player.anim.update(dt);
        for clip in self.player.anim.take_events() {
            self.machine
                .dispatch_event(&mut self.player, &mut env, &PlayerEvent::AnimTransition(clip));
        }
    }

    /// Fixed-timestep tick: state physics, then integration.
    pub fn fixed_update(&mut self, scene: &dyn PhysicsScene, dt: f32) {
        let mut env = Env { scene };
        self.machine.fixed_update(&mut self.player, &mut env, dt);
        self.player.position += self.player.velocity * dt;
    }

    /// Drain the one-shot presentation cues queued since the last call.
    pub fn take_feedback(&mut self) -> Vec<Feedback> {
        std::mem::take(&mut self.player.feedback)
    }
}

/// Adapter feeding buffered input into the machine. Wielded weapon actions
/// get first refusal on every press.
struct StateSink<'a, 'e> {
    player: &'a mut Player,
    machine: &'a mut PlayerMachine,
    env: &'a mut Env<'e>,
    actions: &'a [WeaponAction],
}

impl StateSink<'_, '_> {
    fn accepted_actions(&self, button: Button) -> impl Iterator<Item = usize> + '_ {
        let current = self.machine.current_id();
        self.actions.iter().enumerate().filter_map(move |(i, action)| {
            let current = current?;
            (action.button == button && (action.accepts)(current)).then_some(i)
        })
    }
}

impl InputSink for StateSink<'_, '_> {
    fn on_press(&mut self, button: Button) -> bool {
        let candidates: Vec<usize> = self.accepted_actions(button).collect();
        for index in candidates {
            if (self.actions[index].on_press)(self.player, self.env, self.machine) {
                return true;
            }
        }
        self.machine
            .dispatch_event(self.player, self.env, &PlayerEvent::Press(button))
    }

    fn on_hold(&mut self, button: Button) {
        let candidates: Vec<usize> = self.accepted_actions(button).collect();
        for index in candidates {
            if let Some(hold) = self.actions[index].on_hold {
                hold(self.player, self.env, self.machine);
            }
        }
        self.machine
            .dispatch_event(self.player, self.env, &PlayerEvent::Hold(button));
    }

    fn on_release(&mut self, button: Button) {
        let candidates: Vec<usize> = self.accepted_actions(button).collect();
        for index in candidates {
            if let Some(release) = self.actions[index].on_release {
                release(self.player, self.env, self.machine);
            }
        }
        self.machine
            .dispatch_event(self.player, self.env, &PlayerEvent::Release(button));
    }
}
