// Engine modules: state machine, input, physics interface

pub mod input;
pub mod physics;
pub mod state_machine;
