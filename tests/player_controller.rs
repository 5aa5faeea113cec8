// End to end controller scenarios against a scripted physics scene.

use approx::assert_relative_eq;
use glam::{Affine3A, Vec2, Vec3};

use skystrider::engine::input::{Button, Stick};
use skystrider::engine::physics::{
    ColliderId, Contact, ContactPhase, LayerMask, PhysicsScene, Ray, RayHit, Surface,
};
use skystrider::game::player::states;
use skystrider::game::player::{
    dual_gun_actions, IdleEnter, MechanicSettings, PlayerController, PlayerStateId, SpeedSettings,
    StateArgs,
};

const DT: f32 = 1.0 / 60.0;

/// A scene with optionally a wall plane facing -Z at `wall_z`, cut off at
/// `wall_top` with a flat ledge surface on top. `f32::INFINITY` for the top
/// makes it a plain infinite wall.
struct MockScene {
    wall_z: Option<f32>,
    wall_top: f32,
}

impl MockScene {
    fn empty() -> Self {
        Self {
            wall_z: None,
            wall_top: f32::INFINITY,
        }
    }

    fn wall(wall_z: f32) -> Self {
        Self {
            wall_z: Some(wall_z),
            wall_top: f32::INFINITY,
        }
    }

    fn ledge(wall_z: f32, wall_top: f32) -> Self {
        Self {
            wall_z: Some(wall_z),
            wall_top,
        }
    }
}

impl PhysicsScene for MockScene {
    fn raycast(&self, ray: Ray, max_distance: f32, _mask: LayerMask) -> Option<RayHit> {
        let wall_z = self.wall_z?;
        // Wall face, hit by rays travelling towards +Z below the top edge.
        if ray.direction.z > 0.9 && ray.origin.y < self.wall_top {
            let distance = wall_z - ray.origin.z;
            if distance >= 0.0 && distance <= max_distance {
                return Some(RayHit {
                    point: Vec3::new(ray.origin.x, ray.origin.y, wall_z),
                    normal: -Vec3::Z,
                    distance,
                    collider: ColliderId(2),
                });
            }
        }
        // Ledge surface, hit by downward rays past the wall.
        if self.wall_top.is_finite() && ray.direction.y < -0.9 && ray.origin.z >= wall_z {
            let distance = ray.origin.y - self.wall_top;
            if distance >= 0.0 && distance <= max_distance {
                return Some(RayHit {
                    point: Vec3::new(ray.origin.x, self.wall_top, ray.origin.z),
                    normal: Vec3::Y,
                    distance,
                    collider: ColliderId(1),
                });
            }
        }
        None
    }

    fn overlap_capsule(&self, _center: Vec3, _radius: f32, _half_height: f32, _mask: LayerMask) -> bool {
        false
    }

    fn collider_transform(&self, _collider: ColliderId) -> Option<Affine3A> {
        Some(Affine3A::IDENTITY)
    }
}

fn ground_contact(phase: ContactPhase) -> Contact {
    Contact::new(Surface::Ground, phase, Vec3::Y, ColliderId(0))
}

fn wall_contact() -> Contact {
    Contact::new(Surface::Wall, ContactPhase::Enter, -Vec3::Z, ColliderId(2))
}

fn ceiling_contact() -> Contact {
    Contact::new(Surface::Ceiling, ContactPhase::Enter, -Vec3::Y, ColliderId(3))
}

fn grounded_controller(scene: &dyn PhysicsScene, spawn: Vec3) -> PlayerController {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut controller =
        PlayerController::new(SpeedSettings::default(), MechanicSettings::default(), spawn, scene);
    controller.on_contact(scene, ground_contact(ContactPhase::Enter));
    // The controller spawns airborne and schedules a fall; re-enter the ground
    // state now that the ground is known.
    controller.set_state(scene, states::idle_move(), StateArgs::Idle(IdleEnter::Neutral));
    controller
}

#[test]
fn test_jump_press_from_idle_is_regular_jump() {
    let scene = MockScene::empty();
    let mut controller = grounded_controller(&scene, Vec3::ZERO);
    assert_eq!(controller.current_state(), Some(PlayerStateId::IdleMove));

    controller.on_button(Button::Jump, true);
    controller.update(&scene, DT); // press claimed, transition pending
    assert!(controller.is_pending_state_change());
    controller.update(&scene, DT); // committed

    assert_eq!(controller.current_state(), Some(PlayerStateId::Jump));
    assert_relative_eq!(controller.player().speed_y(), 13.5, epsilon = 1e-4);
    assert!(controller.player().scratch.jump_is_holding_button);
}

#[test]
fn test_jump_buffered_before_landing_fires_on_the_ground() {
    let scene = MockScene::empty();
    let mut controller = grounded_controller(&scene, Vec3::new(0.0, 5.0, 0.0));
    controller.set_state(&scene, states::fall(), StateArgs::None);
    controller.player_mut().velocity = Vec3::new(0.0, -8.0, 0.0);
    controller.player_mut().on_ground = false;

    // Press in the air; falling does not claim jumps, so it stays buffered.
    controller.on_button(Button::Jump, true);
    for _ in 0..3 {
        controller.update(&scene, DT);
    }
    assert_eq!(controller.current_state(), Some(PlayerStateId::Fall));

    controller.on_contact(&scene, ground_contact(ContactPhase::Enter));
    controller.update(&scene, DT); // lands into idle/move
    assert_eq!(controller.current_state(), Some(PlayerStateId::IdleMove));

    controller.update(&scene, DT); // buffered press claimed by the ground state
    controller.update(&scene, DT); // committed
    assert_eq!(controller.current_state(), Some(PlayerStateId::Jump));
}

#[test]
fn test_dash_past_cancel_point_ends_in_idle_not_air_dash() {
    let scene = MockScene::empty();
    let mut controller = grounded_controller(&scene, Vec3::ZERO);
    controller.set_state(&scene, states::dash_ground(), StateArgs::None);

    // Advance the dash animation past the 0.25 cancel threshold.
    for _ in 0..4 {
        controller.update(&scene, 0.05);
    }
    assert_eq!(controller.current_state(), Some(PlayerStateId::DashGround));
    assert!(controller.player().anim.normalized_time() > 0.25);

    // The fixed-step cancel request lands first; the ground-exit request for
    // the same frame finds the slot occupied and is dropped.
    controller.fixed_update(&scene, DT);
    controller.on_contact(&scene, ground_contact(ContactPhase::Exit));
    controller.update(&scene, DT);

    assert_eq!(controller.current_state(), Some(PlayerStateId::IdleMove));
}

#[test]
fn test_dash_off_edge_inside_cancel_window_becomes_air_dash() {
    let scene = MockScene::empty();
    let mut controller = grounded_controller(&scene, Vec3::ZERO);
    controller.set_state(&scene, states::dash_ground(), StateArgs::None);

    controller.on_contact(&scene, ground_contact(ContactPhase::Exit));
    controller.update(&scene, DT);

    assert_eq!(controller.current_state(), Some(PlayerStateId::DashAirborne));
}

#[test]
fn test_wall_contact_attaches_then_chain_is_suppressed() {
    let scene = MockScene::wall(0.0);
    let mut controller = grounded_controller(&scene, Vec3::new(0.0, 5.0, -0.4));
    controller.set_state(&scene, states::fall(), StateArgs::None);
    controller.player_mut().on_ground = false;
    controller.player_mut().velocity = Vec3::new(0.0, -5.0, 3.0);
    controller.on_stick(Stick::Left, Vec2::new(0.0, 1.0));
    controller.update(&scene, DT);

    controller.on_contact(&scene, wall_contact());
    controller.update(&scene, DT);
    assert_eq!(controller.current_state(), Some(PlayerStateId::WallJumpAttach));

    controller.on_button(Button::Jump, true);
    controller.update(&scene, DT);
    controller.update(&scene, DT);
    assert_eq!(controller.current_state(), Some(PlayerStateId::WallJumpJump));
    assert!(controller.player().scratch.airborne_has_wall_jumped);

    // Same wall, same height: even with everything else in order the chain
    // memory refuses a second attach.
    controller.on_button(Button::Jump, false);
    controller.player_mut().set_yaw_degrees(0.0);
    controller.player_mut().velocity = Vec3::new(0.0, -5.0, 0.0);
    controller.on_contact(&scene, wall_contact());
    assert!(!controller.is_pending_state_change());
    assert_eq!(controller.current_state(), Some(PlayerStateId::WallJumpJump));

    // After losing enough height the same wall is fair game again.
    controller.player_mut().position.y -= 2.0;
    controller.on_contact(&scene, wall_contact());
    controller.update(&scene, DT);
    assert_eq!(controller.current_state(), Some(PlayerStateId::WallJumpAttach));
}

#[test]
fn test_ledge_grab_snaps_to_hang_position_then_climbs() {
    let scene = MockScene::ledge(0.0, 1.5);
    let mut controller = grounded_controller(&scene, Vec3::new(0.0, 0.0, -0.5));
    controller.set_state(&scene, states::fall(), StateArgs::None);
    controller.player_mut().on_ground = false;
    controller.player_mut().velocity = Vec3::new(0.0, -3.0, 0.0);

    controller.update(&scene, DT);

    // Neutral stick: the wall contact cannot become a wall jump, so the
    // ledge test gets its turn.
    controller.on_contact(&scene, wall_contact());
    controller.update(&scene, DT);

    assert_eq!(controller.current_state(), Some(PlayerStateId::LedgeGrab));
    let player = controller.player();
    assert_relative_eq!(player.position.y, 1.5 - player.capsule.height, epsilon = 1e-4);
    assert_relative_eq!(player.position.z, -player.capsule.radius, epsilon = 1e-4);
    assert_eq!(player.velocity, Vec3::ZERO);

    // Push towards the ledge once the grab becomes actionable.
    controller.on_stick(Stick::Left, Vec2::new(0.0, 1.0));
    for _ in 0..25 {
        controller.update(&scene, DT);
        if controller.current_state() == Some(PlayerStateId::LedgeGetup) {
            break;
        }
    }
    assert_eq!(controller.current_state(), Some(PlayerStateId::LedgeGetup));
}

#[test]
fn test_ceiling_hit_while_rising_bounces_down_and_ends_the_jump_hold() {
    let scene = MockScene::empty();
    let mut controller = grounded_controller(&scene, Vec3::ZERO);
    controller.on_button(Button::Jump, true);
    controller.update(&scene, DT);
    controller.update(&scene, DT);
    assert_eq!(controller.current_state(), Some(PlayerStateId::Jump));
    let rising = controller.player().speed_y();
    assert!(rising > 0.0);
    assert!(controller.player().scratch.jump_is_holding_button);

    controller.on_contact(&scene, ceiling_contact());

    assert_relative_eq!(controller.player().speed_y(), rising * -0.5, epsilon = 1e-4);
    assert!(!controller.player().scratch.jump_is_holding_button);

    // Already heading down: a second hit leaves the speed alone.
    let falling = controller.player().speed_y();
    controller.on_contact(&scene, ceiling_contact());
    assert_relative_eq!(controller.player().speed_y(), falling, epsilon = 1e-4);
}

#[test]
fn test_state_round_trip_preserves_facing_and_horizontal_speed() {
    let scene = MockScene::empty();
    let mut controller = grounded_controller(&scene, Vec3::ZERO);
    controller.player_mut().velocity = Vec3::new(3.0, 0.0, 1.0);
    controller.player_mut().set_yaw_degrees(37.0);
    let speed_before = controller.player().speed_xz();
    let rotation_before = controller.player().gravity_rotation();

    controller.set_state(&scene, states::fall(), StateArgs::None);
    controller.set_state(&scene, states::idle_move(), StateArgs::Idle(IdleEnter::Neutral));

    let player = controller.player();
    assert_relative_eq!(player.speed_xz().x, speed_before.x, epsilon = 1e-4);
    assert_relative_eq!(player.speed_xz().z, speed_before.z, epsilon = 1e-4);
    assert!(player.gravity_rotation().abs_diff_eq(rotation_before, 1e-4));
    // Vertical speed is the one documented mutation: zeroed on both enters.
    assert_relative_eq!(player.speed_y(), 0.0, epsilon = 1e-4);
}

#[test]
fn test_attack_press_recoils_by_situation() {
    let scene = MockScene::empty();

    // On the ground the guns kick the character upwards.
    let mut controller = grounded_controller(&scene, Vec3::ZERO);
    controller.wield(dual_gun_actions());
    controller.on_button(Button::Attack, true);
    controller.update(&scene, DT);
    controller.update(&scene, DT);
    assert_eq!(controller.current_state(), Some(PlayerStateId::RecoilJump));
    assert_relative_eq!(controller.player().speed_y(), 13.5, epsilon = 1e-4);

    // In the air the same press becomes a pound.
    let mut controller = grounded_controller(&scene, Vec3::new(0.0, 5.0, 0.0));
    controller.wield(dual_gun_actions());
    controller.set_state(&scene, states::fall(), StateArgs::None);
    controller.player_mut().on_ground = false;
    controller.on_button(Button::Attack, true);
    controller.update(&scene, DT);
    controller.update(&scene, DT);
    assert_eq!(controller.current_state(), Some(PlayerStateId::RecoilPound));
}

#[test]
fn test_unwielded_attack_press_is_ignored() {
    let scene = MockScene::empty();
    let mut controller = grounded_controller(&scene, Vec3::ZERO);
    controller.on_button(Button::Attack, true);
    controller.update(&scene, DT);
    controller.update(&scene, DT);
    assert_eq!(controller.current_state(), Some(PlayerStateId::IdleMove));
}

#[test]
fn test_pound_landing_opens_bounce_window() {
    let scene = MockScene::empty();
    let mut controller = grounded_controller(&scene, Vec3::new(0.0, 3.0, 0.0));
    controller.wield(dual_gun_actions());
    controller.set_state(&scene, states::recoil_pound(), StateArgs::None);
    controller.player_mut().velocity = Vec3::new(0.0, -20.0, 0.0);

    controller.on_contact(&scene, ground_contact(ContactPhase::Enter));
    controller.update(&scene, DT);
    assert_eq!(controller.current_state(), Some(PlayerStateId::RecoilPoundLanding));
    assert_eq!(controller.player().velocity, Vec3::ZERO);
    assert!(!controller.take_feedback().is_empty());

    // Too early: the press is refused and keeps sitting in the buffer, so it
    // fires the moment the window opens.
    controller.on_button(Button::Jump, true);
    for _ in 0..12 {
        controller.update(&scene, DT);
        if controller.current_state() == Some(PlayerStateId::RecoilPoundBounceJump) {
            break;
        }
    }
    assert_eq!(
        controller.current_state(),
        Some(PlayerStateId::RecoilPoundBounceJump)
    );
    assert!(controller.player().speed_y() > 13.5);
}
