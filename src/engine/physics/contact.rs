// Contact events reported by the host scene
//
// The solver classifies each touching collider against the character's up
// vector and reports it as ground, wall or ceiling with an enter/stay/exit
// phase. The character only ever sees this classified form.

use glam::Vec3;

use super::query::ColliderId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Ground,
    Wall,
    Ceiling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactPhase {
    Enter,
    Stay,
    Exit,
}

#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub surface: Surface,
    pub phase: ContactPhase,
    /// Surface normal at the contact, pointing away from the collider.
    pub normal: Vec3,
    pub collider: ColliderId,
}

impl Contact {
    pub fn new(surface: Surface, phase: ContactPhase, normal: Vec3, collider: ColliderId) -> Self {
        Self {
            surface,
            phase,
            normal,
            collider,
        }
    }

    pub fn is(&self, surface: Surface, phase: ContactPhase) -> bool {
        self.surface == surface && self.phase == phase
    }
}
