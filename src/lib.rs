// Skystrider - the movement and action core of a 3D platforming character
//
// The crate is split the same way the rest of our games are:
// - `core`: math helpers shared by everything
// - `engine`: reusable systems (state machine, input buffering, physics interface)
// - `game`: the player character itself (states, settings, geometry queries)
//
// Rendering, audio, cameras and the actual physics solver live outside this
// crate; they talk to it through the interfaces in `engine::physics` and the
// `PlayerController` surface in `game::player`.

pub mod core;
pub mod engine;
pub mod game;
