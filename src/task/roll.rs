//! 2d20 task resolution
//!
//! Each die is scored on its own: a 1 (or a die inside the focus range) is a
//! critical worth two successes, anything at or under the target number is
//! one success, and anything inside the complication range at the top of the
//! die adds a complication. Successes and complications are independent, so a
//! single die can contribute both.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::config;
use crate::core::error::{CombatError, Result};
use crate::dice::DiceSource;

/// Largest allowed complication range (complications on 16-20)
pub const MAX_COMPLICATION_RANGE: u8 = 5;

/// An extra die rolled by an assisting ship or character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistRoll {
    /// System + Department for a ship assist
    pub target_number: u8,
}

/// Everything needed to roll a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRoll {
    pub target_number: u8,
    pub difficulty: u8,
    pub focus: bool,
    /// Discipline rating; with a focus, dice at or under this are criticals
    pub discipline: u8,
    /// Base dice plus purchased bonus dice, capped when rolled
    pub dice_count: u8,
    pub complication_range: u8,
    /// Roll even at Difficulty 0 so Momentum can be generated
    pub optional_roll: bool,
    pub assist: Option<AssistRoll>,
}

impl TaskRoll {
    pub fn new(target_number: u8, difficulty: u8) -> Self {
        Self {
            target_number,
            difficulty,
            focus: false,
            discipline: 0,
            dice_count: config().base_dice,
            complication_range: 1,
            optional_roll: false,
            assist: None,
        }
    }

    pub fn with_discipline(mut self, discipline: u8) -> Self {
        self.discipline = discipline;
        self
    }

    pub fn with_focus(mut self, focus: bool) -> Self {
        self.focus = focus;
        self
    }

    pub fn with_bonus_dice(mut self, bonus: u8) -> Self {
        self.dice_count = self.dice_count.saturating_add(bonus);
        self
    }

    pub fn with_complication_range(mut self, range: u8) -> Self {
        self.complication_range = range;
        self
    }

    pub fn with_optional_roll(mut self) -> Self {
        self.optional_roll = true;
        self
    }

    pub fn with_assist(mut self, target_number: u8) -> Self {
        self.assist = Some(AssistRoll { target_number });
        self
    }

    fn validate(&self) -> Result<()> {
        if self.complication_range == 0 || self.complication_range > MAX_COMPLICATION_RANGE {
            return Err(CombatError::InvalidRoll(format!(
                "complication range {} outside 1..={}",
                self.complication_range, MAX_COMPLICATION_RANGE
            )));
        }
        if self.dice_count == 0 {
            return Err(CombatError::InvalidRoll("a task rolls at least one die".into()));
        }
        Ok(())
    }

    /// Dice actually rolled for the acting character
    pub fn effective_dice(&self) -> u8 {
        self.dice_count.min(config().max_dice)
    }

    fn focus_range(&self) -> u8 {
        if self.focus {
            self.discipline
        } else {
            0
        }
    }
}

/// Contribution of a single die
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DieScore {
    pub successes: u32,
    pub complication: bool,
}

pub fn score_die(die: u8, target_number: u8, focus_range: u8, complication_range: u8) -> DieScore {
    let successes = if die == 1 || die <= focus_range {
        2
    } else if die <= target_number {
        1
    } else {
        0
    };
    let complication = complication_range > 0 && die >= 21 - complication_range.min(20);
    DieScore {
        successes,
        complication,
    }
}

/// The outcome of a task. Never mutated in place; follow-ups such as
/// succeed-at-cost or a re-roll produce a new result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub rolls: Vec<u8>,
    pub assist_roll: Option<u8>,
    pub target_number: u8,
    pub difficulty: u8,
    pub successes: u32,
    pub complications: u32,
    pub momentum_generated: u32,
    pub succeeded: bool,
    pub succeeded_at_cost: bool,
    /// Focus critical range used (0 when no focus applied)
    pub focus_range: u8,
    pub complication_range: u8,
    pub assist_target: Option<u8>,
    /// Dice re-rolled already; a result re-rolls at most once
    #[serde(default)]
    pub rerolled: bool,
}

impl TaskResult {
    /// Automatic success for a Difficulty 0 task nobody chose to roll
    pub fn automatic(target_number: u8) -> Self {
        Self {
            rolls: Vec::new(),
            assist_roll: None,
            target_number,
            difficulty: 0,
            successes: 0,
            complications: 0,
            momentum_generated: 0,
            succeeded: true,
            succeeded_at_cost: false,
            focus_range: 0,
            complication_range: 1,
            assist_target: None,
            rerolled: false,
        }
    }

    /// Automatic failure, used when the task's system is destroyed
    pub fn automatic_failure(target_number: u8, difficulty: u8) -> Self {
        Self {
            difficulty,
            succeeded: false,
            ..Self::automatic(target_number)
        }
    }

    pub fn was_rolled(&self) -> bool {
        !self.rolls.is_empty()
    }

    fn tally(&mut self) {
        let mut successes = 0;
        let mut complications = 0;
        for &die in &self.rolls {
            let score = score_die(
                die,
                self.target_number,
                self.focus_range,
                self.complication_range,
            );
            successes += score.successes;
            complications += score.complication as u32;
        }
        if let (Some(die), Some(tn)) = (self.assist_roll, self.assist_target) {
            let score = score_die(die, tn, 0, self.complication_range);
            successes += score.successes;
            complications += score.complication as u32;
        }

        self.successes = successes;
        self.complications = complications;
        self.succeeded = successes >= self.difficulty as u32;
        self.momentum_generated = if self.succeeded {
            successes.saturating_sub(self.difficulty as u32)
        } else {
            0
        };
    }

    /// Turn a failure into a success with one extra complication.
    /// The result generates no Momentum and may not be improved by spends.
    pub fn succeed_at_cost(&self) -> Result<TaskResult> {
        if self.succeeded {
            return Err(CombatError::Precondition(
                "only a failed task can succeed at cost".into(),
            ));
        }
        Ok(TaskResult {
            succeeded: true,
            succeeded_at_cost: true,
            complications: self.complications + 1,
            momentum_generated: 0,
            ..self.clone()
        })
    }

    /// Re-roll the chosen dice once. New faces replace the old ones even
    /// when worse. The assist die is never re-rolled.
    pub fn reroll(&self, dice: &mut impl DiceSource, indices: &[usize]) -> Result<TaskResult> {
        if self.rerolled {
            return Err(CombatError::Precondition("dice were already re-rolled".into()));
        }
        if self.succeeded_at_cost {
            return Err(CombatError::Precondition(
                "a result that succeeded at cost cannot be re-rolled".into(),
            ));
        }
        if !self.was_rolled() {
            return Err(CombatError::InvalidRoll("no dice were rolled".into()));
        }
        validate_reroll(indices, self.rolls.len())?;

        let mut next = self.clone();
        for &index in indices {
            next.rolls[index] = dice.d20();
        }
        next.rerolled = true;
        next.tally();
        debug!(rolls = ?next.rolls, successes = next.successes, "Task re-rolled");
        Ok(next)
    }
}

/// Re-roll choices must name distinct dice among the `dice_count` rolled
pub fn validate_reroll(indices: &[usize], dice_count: usize) -> Result<()> {
    for (pos, &index) in indices.iter().enumerate() {
        if index >= dice_count {
            return Err(CombatError::InvalidRoll(format!(
                "die index {} out of range ({} dice)",
                index, dice_count
            )));
        }
        if indices[..pos].contains(&index) {
            return Err(CombatError::InvalidRoll(format!("die {} chosen twice", index)));
        }
    }
    Ok(())
}

/// Roll a task
pub fn resolve_task(dice: &mut impl DiceSource, roll: &TaskRoll) -> Result<TaskResult> {
    roll.validate()?;

    if roll.difficulty == 0 && !roll.optional_roll {
        return Ok(TaskResult::automatic(roll.target_number));
    }

    let rolls = dice.roll(roll.effective_dice() as usize);
    let assist_roll = roll.assist.map(|_| dice.d20());

    let mut result = TaskResult {
        rolls,
        assist_roll,
        target_number: roll.target_number,
        difficulty: roll.difficulty,
        successes: 0,
        complications: 0,
        momentum_generated: 0,
        succeeded: false,
        succeeded_at_cost: false,
        focus_range: roll.focus_range(),
        complication_range: roll.complication_range,
        assist_target: roll.assist.map(|a| a.target_number),
        rerolled: false,
    };
    result.tally();

    debug!(
        rolls = ?result.rolls,
        target = result.target_number,
        difficulty = result.difficulty,
        successes = result.successes,
        complications = result.complications,
        "Task resolved"
    );

    Ok(result)
}
