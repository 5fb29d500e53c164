//! Bridge officers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::core::types::EntityId;

/// Character attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Control,
    Daring,
    Fitness,
    Insight,
    Presence,
    Reason,
}

/// Disciplines for characters; the same six name ship departments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    Command,
    Conn,
    Engineering,
    Medicine,
    Science,
    Security,
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Discipline::Command => "Command",
            Discipline::Conn => "Conn",
            Discipline::Engineering => "Engineering",
            Discipline::Medicine => "Medicine",
            Discipline::Science => "Science",
            Discipline::Security => "Security",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub control: u8,
    pub daring: u8,
    pub fitness: u8,
    pub insight: u8,
    pub presence: u8,
    pub reason: u8,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            control: 9,
            daring: 9,
            fitness: 9,
            insight: 9,
            presence: 9,
            reason: 9,
        }
    }
}

impl Attributes {
    pub fn get(&self, attribute: Attribute) -> u8 {
        match attribute {
            Attribute::Control => self.control,
            Attribute::Daring => self.daring,
            Attribute::Fitness => self.fitness,
            Attribute::Insight => self.insight,
            Attribute::Presence => self.presence,
            Attribute::Reason => self.reason,
        }
    }
}

/// Discipline ratings (characters) or department ratings (ships)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Disciplines {
    pub command: u8,
    pub conn: u8,
    pub engineering: u8,
    pub medicine: u8,
    pub science: u8,
    pub security: u8,
}

impl Disciplines {
    pub fn get(&self, discipline: Discipline) -> u8 {
        match discipline {
            Discipline::Command => self.command,
            Discipline::Conn => self.conn,
            Discipline::Engineering => self.engineering,
            Discipline::Medicine => self.medicine,
            Discipline::Science => self.science,
            Discipline::Security => self.security,
        }
    }
}

/// Bridge station a character crews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgePosition {
    Captain,
    Helm,
    Tactical,
    #[default]
    Operations,
    Engineering,
    Science,
    Medical,
}

/// A talent, optionally parametrised: "Dedicated Personnel (Security)"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Talent {
    pub name: String,
    pub parameter: Option<String>,
}

impl Talent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter: None,
        }
    }

    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let (Some(open), true) = (text.find('('), text.ends_with(')')) {
            let name = text[..open].trim();
            let param = text[open + 1..text.len() - 1].trim();
            if !name.is_empty() && !param.is_empty() {
                return Self {
                    name: name.to_string(),
                    parameter: Some(param.to_string()),
                };
            }
        }
        Self::new(text)
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

impl FromStr for Talent {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Talent::parse(s))
    }
}

impl fmt::Display for Talent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parameter {
            Some(param) => write!(f, "{} ({})", self.name, param),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stress {
    pub current: u8,
    pub max: u8,
}

/// A player character or named NPC
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: EntityId,
    pub name: String,
    pub attributes: Attributes,
    pub disciplines: Disciplines,
    pub focuses: Vec<String>,
    pub stress: Stress,
    pub talents: Vec<Talent>,
    pub position: BridgePosition,
}

impl Character {
    pub fn new(name: impl Into<String>, attributes: Attributes, disciplines: Disciplines) -> Self {
        Self {
            id: EntityId::new(),
            name: name.into(),
            attributes,
            disciplines,
            focuses: Vec::new(),
            stress: Stress {
                current: 0,
                max: attributes.fitness,
            },
            talents: Vec::new(),
            position: BridgePosition::default(),
        }
    }

    pub fn with_focus(mut self, focus: impl Into<String>) -> Self {
        self.focuses.push(focus.into());
        self
    }

    pub fn with_talent(mut self, talent: &str) -> Self {
        self.talents.push(Talent::parse(talent));
        self
    }

    pub fn at_position(mut self, position: BridgePosition) -> Self {
        self.position = position;
        self
    }

    /// Attribute + Discipline
    pub fn target_number(&self, attribute: Attribute, discipline: Discipline) -> u8 {
        self.attributes.get(attribute) + self.disciplines.get(discipline)
    }

    /// Case-insensitive: true when `focus` appears inside any focus
    pub fn has_focus(&self, focus: &str) -> bool {
        let needle = focus.to_lowercase();
        self.focuses.iter().any(|f| f.to_lowercase().contains(&needle))
    }

    pub fn has_talent(&self, name: &str) -> bool {
        self.talents.iter().any(|t| t.is(name))
    }

    pub fn is_defeated(&self) -> bool {
        self.stress.current >= self.stress.max
    }

    /// Add Stress, capped at max. Returns true when this made the character Defeated.
    pub fn add_stress(&mut self, amount: u8) -> bool {
        let was_defeated = self.is_defeated();
        self.stress.current = self.stress.current.saturating_add(amount).min(self.stress.max);
        let defeated = !was_defeated && self.is_defeated();
        if defeated {
            info!(character = %self.name, "Character defeated");
        }
        defeated
    }

    pub fn recover_stress(&mut self, amount: u8) {
        self.stress.current = self.stress.current.saturating_sub(amount);
    }
}
