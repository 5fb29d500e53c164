//! Action registry: loaded once, read-only afterwards

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::actions::config::{ActionConfig, ActionEntry};
use crate::core::error::{CombatError, Result};

const BUILTIN_ACTIONS: &str = include_str!("../../data/actions.toml");

#[derive(Debug, Deserialize)]
struct ActionTable {
    #[serde(default)]
    action: Vec<ActionEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    actions: BTreeMap<String, ActionConfig>,
}

impl ActionRegistry {
    /// The bundled bridge actions
    pub fn builtin() -> Result<Self> {
        parse_action_table(BUILTIN_ACTIONS)
    }

    pub fn get(&self, name: &str) -> Result<&ActionConfig> {
        self.actions
            .get(name)
            .ok_or_else(|| CombatError::UnknownAction(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionConfig> {
        self.actions.values()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Parse an action table from TOML text
pub fn parse_action_table(content: &str) -> Result<ActionRegistry> {
    let table: ActionTable = toml::from_str(content)?;
    let mut actions = BTreeMap::new();
    for entry in table.action {
        let config = ActionConfig::try_from(entry)?;
        if actions.contains_key(&config.name) {
            return Err(CombatError::Config(format!(
                "duplicate action {}",
                config.name
            )));
        }
        actions.insert(config.name.clone(), config);
    }
    Ok(ActionRegistry { actions })
}

/// Load an action table from a TOML file
pub fn load_action_registry(path: &Path) -> Result<ActionRegistry> {
    let content = fs::read_to_string(path)?;
    let registry = parse_action_table(&content)?;
    info!(path = %path.display(), actions = registry.len(), "Loaded action table");
    Ok(registry)
}
