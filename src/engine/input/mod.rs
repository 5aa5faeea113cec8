// Input handling
//
// - `action`: button and analog stick definitions
// - `buffer`: the input buffering system that turns raw edges into
//   press/hold/release phases with a claim window

pub mod action;
pub mod buffer;

pub use action::{Button, ButtonSet, Stick, StickState};
pub use buffer::{InputBufferSystem, InputSink, BUFFER_TIME};
