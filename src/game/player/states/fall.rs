// Plain falling

use crate::engine::physics::Contact;

use super::super::airborne::AirborneHooks;
use super::super::animation::Clip;
use super::super::player::Player;
use super::super::state::{Env, PerformCondition, PlayerMachine, PlayerStateId, StateArgs};

pub struct Fall;

impl AirborneHooks for Fall {
    fn id(&self) -> PlayerStateId {
        PlayerStateId::Fall
    }

    fn can_wall_jump(&self, _user: &Player) -> PerformCondition {
        PerformCondition::InFront
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
        user.anim.cross_fade(Clip::Fall, 0.2);
    }

    // Falling lands from a stay contact as readily as from an enter, so a
    // walked-off edge does not wait for a fresh contact.
    fn on_ground_stay(&self, user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine, contact: &Contact) {
        if user.speed_y() > 0.0 {
            return;
        }
        self.on_ground_landed(user, env, machine, contact);
    }
}
