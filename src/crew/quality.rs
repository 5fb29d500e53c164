//! NPC crew quality: a flat stand-in for attribute and department

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrewQuality {
    Basic,
    #[default]
    Proficient,
    Talented,
    Exceptional,
}

impl CrewQuality {
    /// Used wherever an attribute would be read
    pub fn attribute(&self) -> u8 {
        match self {
            CrewQuality::Basic => 8,
            CrewQuality::Proficient => 9,
            CrewQuality::Talented => 10,
            CrewQuality::Exceptional => 11,
        }
    }

    /// Used wherever a discipline or department would be read
    pub fn department(&self) -> u8 {
        match self {
            CrewQuality::Basic => 1,
            CrewQuality::Proficient => 2,
            CrewQuality::Talented => 3,
            CrewQuality::Exceptional => 4,
        }
    }

    pub fn target_number(&self) -> u8 {
        self.attribute() + self.department()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_table() {
        assert_eq!(CrewQuality::Basic.target_number(), 9);
        assert_eq!(CrewQuality::Proficient.target_number(), 11);
        assert_eq!(CrewQuality::Talented.target_number(), 13);
        assert_eq!(CrewQuality::Exceptional.target_number(), 15);
    }
}
