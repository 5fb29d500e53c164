//! Declarative bridge actions and the engine that executes them

pub mod config;
pub mod engine;
pub mod registry;

pub use config::{
    ActionConfig, ActionEntry, ActionKind, ActionSlot, OnSuccess, Requirements, RollSpec,
    ShipAssist,
};
pub use engine::{execute_action, ActionContext, ActionOutcome, ActionRequest, SideEffect};
pub use registry::{load_action_registry, parse_action_table, ActionRegistry};
