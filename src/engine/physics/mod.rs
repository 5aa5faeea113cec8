// Physics interface: queries against the host scene and classified contacts

pub mod contact;
pub mod query;

pub use contact::{Contact, ContactPhase, Surface};
pub use query::{ColliderId, EmptyScene, LayerMask, PhysicsScene, Ray, RayHit};
