//! Task resolution: target numbers, difficulty, bonus dice, re-rolls

pub mod bonus;
pub mod roll;

pub use bonus::{BonusDicePayment, BonusDicePurchase};
pub use roll::{
    resolve_task, score_die, validate_reroll, AssistRoll, DieScore, TaskResult, TaskRoll,
    MAX_COMPLICATION_RANGE,
};
