// The player's concrete states
//
// States are stateless singletons; everything mutable lives in the player's
// scratch data. The accessor functions below are how the rest of the crate
// refers to them.

mod dash;
mod fall;
mod idle_move;
mod jump;
mod ledge;
mod recoil;
mod wall_jump;

pub use jump::hold_button_to_jump;
pub use ledge::ledge_hang_on;

use super::airborne::Airborne;
use super::grounded::Grounded;
use super::state::PlayerStateRef;

use dash::{DashAirborne, DashGround};
use fall::Fall;
use idle_move::{IdleMove, StopRun};
use jump::Jump;
use ledge::{LedgeGetup, LedgeGrab};
use recoil::{RecoilJump, RecoilPound, RecoilPoundBounceJump, RecoilPoundLanding};
use wall_jump::{WallJumpAttach, WallJumpJump};

static IDLE_MOVE: Grounded<IdleMove> = Grounded(IdleMove);
static STOP_RUN: Grounded<StopRun> = Grounded(StopRun);
static FALL: Airborne<Fall> = Airborne(Fall);
static JUMP: Airborne<Jump> = Airborne(Jump);
static DASH_GROUND: Grounded<DashGround> = Grounded(DashGround);
static DASH_AIRBORNE: Airborne<DashAirborne> = Airborne(DashAirborne);
static WALL_JUMP_ATTACH: Airborne<WallJumpAttach> = Airborne(WallJumpAttach);
static WALL_JUMP_JUMP: Airborne<WallJumpJump> = Airborne(WallJumpJump);
static LEDGE_GRAB: Airborne<LedgeGrab> = Airborne(LedgeGrab);
static LEDGE_GETUP: Grounded<LedgeGetup> = Grounded(LedgeGetup);
static RECOIL_JUMP: Airborne<RecoilJump> = Airborne(RecoilJump);
static RECOIL_POUND: Airborne<RecoilPound> = Airborne(RecoilPound);
static RECOIL_POUND_LANDING: Grounded<RecoilPoundLanding> = Grounded(RecoilPoundLanding);
static RECOIL_POUND_BOUNCE_JUMP: Airborne<RecoilPoundBounceJump> = Airborne(RecoilPoundBounceJump);

pub fn idle_move() -> PlayerStateRef {
    &IDLE_MOVE
}

pub fn stop_run() -> PlayerStateRef {
    &STOP_RUN
}

pub fn fall() -> PlayerStateRef {
    &FALL
}

pub fn jump() -> PlayerStateRef {
    &JUMP
}

pub fn dash_ground() -> PlayerStateRef {
    &DASH_GROUND
}

pub fn dash_airborne() -> PlayerStateRef {
    &DASH_AIRBORNE
}

pub fn wall_jump_attach() -> PlayerStateRef {
    &WALL_JUMP_ATTACH
}

pub fn wall_jump_jump() -> PlayerStateRef {
    &WALL_JUMP_JUMP
}

pub fn ledge_grab() -> PlayerStateRef {
    &LEDGE_GRAB
}

pub fn ledge_getup() -> PlayerStateRef {
    &LEDGE_GETUP
}

pub fn recoil_jump() -> PlayerStateRef {
    &RECOIL_JUMP
}

pub fn recoil_pound() -> PlayerStateRef {
    &RECOIL_POUND
}

pub fn recoil_pound_landing() -> PlayerStateRef {
    &RECOIL_POUND_LANDING
}

pub fn recoil_pound_bounce_jump() -> PlayerStateRef {
    &RECOIL_POUND_BOUNCE_JUMP
}
