//! Characters and NPC crews

pub mod character;
pub mod quality;

pub use character::{
    Attribute, Attributes, BridgePosition, Character, Discipline, Disciplines, Stress, Talent,
};
pub use quality::CrewQuality;

/// Who is rolling a task
#[derive(Debug, Clone, Copy)]
pub enum Actor<'a> {
    Character(&'a Character),
    Crew(CrewQuality),
}

impl Actor<'_> {
    pub fn target_number(&self, attribute: Attribute, discipline: Discipline) -> u8 {
        match self {
            Actor::Character(c) => c.target_number(attribute, discipline),
            Actor::Crew(q) => q.target_number(),
        }
    }

    pub fn discipline(&self, discipline: Discipline) -> u8 {
        match self {
            Actor::Character(c) => c.disciplines.get(discipline),
            Actor::Crew(q) => q.department(),
        }
    }

    /// NPC crews have no focuses
    pub fn has_focus(&self, focus: &str) -> bool {
        match self {
            Actor::Character(c) => c.has_focus(focus),
            Actor::Crew(_) => false,
        }
    }
}
