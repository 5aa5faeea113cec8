// Weapon special actions
//
// Weapons extend the character with extra button responses. An action names
// its button, the states it may fire from and plain function pointers for the
// buffer phases; the controller offers every buffered press to the wielded
// actions before the current state sees it.

use crate::engine::input::Button;

use super::player::{Player, CONTACT_OFFSET};
use super::state::{Env, PlayerMachine, PlayerStateId, StateArgs};
use super::states;

/// Press handler. Returning true claims the buffered press.
pub type WeaponPressAction = fn(&mut Player, &mut Env<'_>, &mut PlayerMachine) -> bool;
pub type WeaponPhaseAction = fn(&mut Player, &mut Env<'_>, &mut PlayerMachine);

pub struct WeaponAction {
    pub button: Button,
    /// Which states the action may fire from, evaluated on every offer.
    pub accepts: fn(PlayerStateId) -> bool,
    pub on_press: WeaponPressAction,
    pub on_hold: Option<WeaponPhaseAction>,
    pub on_release: Option<WeaponPhaseAction>,
}

fn on_ground_states(id: PlayerStateId) -> bool {
    matches!(
        id,
        PlayerStateId::IdleMove | PlayerStateId::StopRun | PlayerStateId::DashGround
    )
}

fn in_air_states(id: PlayerStateId) -> bool {
    matches!(
        id,
        PlayerStateId::Fall
            | PlayerStateId::Jump
            | PlayerStateId::DashAirborne
            | PlayerStateId::WallJumpJump
            | PlayerStateId::RecoilJump
            | PlayerStateId::RecoilPoundBounceJump
    )
}

/// Firing the guns straight down while on the ground kicks the character into
/// the air.
fn recoil_jump_press(user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
    let Some(cfg) = user.settings else {
        return false;
    };
    user.set_speed_y(cfg.base_jump_speed);
    user.position += user.gravity_up() * CONTACT_OFFSET;
    machine.change_state(user, env, states::recoil_jump(), StateArgs::None);
    true
}

/// Firing downwards mid-air slams the character towards the ground.
fn recoil_pound_press(user: &mut Player, env: &mut Env<'_>, machine: &mut PlayerMachine) -> bool {
    machine.change_state(user, env, states::recoil_pound(), StateArgs::None);
    true
}

/// The dual guns' special action set.
pub fn dual_gun_actions() -> Vec<WeaponAction> {
    vec![
        WeaponAction {
            button: Button::Attack,
            accepts: on_ground_states,
            on_press: recoil_jump_press,
            on_hold: None,
            on_release: None,
        },
        WeaponAction {
            button: Button::Attack,
            accepts: in_air_states,
            on_press: recoil_pound_press,
            on_hold: None,
            on_release: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dual_gun_actions_cover_disjoint_states() {
        let actions = dual_gun_actions();
        assert_eq!(actions.len(), 2);
        for action in &actions {
            assert_eq!(action.button, Button::Attack);
        }
        // No state is claimed by both actions.
        let all = [
            PlayerStateId::IdleMove,
            PlayerStateId::StopRun,
            PlayerStateId::Fall,
            PlayerStateId::Jump,
            PlayerStateId::DashGround,
            PlayerStateId::DashAirborne,
            PlayerStateId::WallJumpAttach,
            PlayerStateId::WallJumpJump,
            PlayerStateId::LedgeGrab,
            PlayerStateId::LedgeGetup,
            PlayerStateId::RecoilJump,
            PlayerStateId::RecoilPound,
            PlayerStateId::RecoilPoundLanding,
            PlayerStateId::RecoilPoundBounceJump,
        ];
        for id in all {
            let claims = actions.iter().filter(|a| (a.accepts)(id)).count();
            assert!(claims <= 1, "{id:?} accepted by both actions");
        }
    }
}
