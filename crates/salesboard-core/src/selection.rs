use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// Owners still on the team; the preset the owner report applies when asked
/// for active members and no roster file is given.
pub const DEFAULT_ACTIVE_MEMBERS: [&str; 6] =
    ["안광열", "이서호", "조민채", "문서인", "변승민", "이채정"];

/// Externally-owned checkbox state, keyed by entity name. The aggregators
/// never mutate it; callers pass it in on every refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    selected: BTreeSet<String>,
}

impl SelectionSet {
    /// A selection with every given entity checked, the state a fresh report
    /// starts from.
    pub fn all_of(entities: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            selected: entities.into_iter().map(Into::into).collect(),
        }
    }

    pub fn select_all(&mut self, entities: impl IntoIterator<Item = impl Into<String>>) {
        self.selected.extend(entities.into_iter().map(Into::into));
    }

    pub fn select_none(&mut self) {
        self.selected.clear();
    }

    /// Replace the selection with exactly the given names.
    pub fn select_only(&mut self, names: impl IntoIterator<Item = impl Into<String>>) {
        self.selected = names.into_iter().map(Into::into).collect();
    }

    pub fn toggle(&mut self, name: &str) {
        if !self.selected.remove(name) {
            self.selected.insert(name.to_string());
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.selected.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }
}

/// Roster file: `active_members = ["...", ...]` in TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Roster {
    pub active_members: Vec<String>,
}

impl Default for Roster {
    fn default() -> Self {
        Self {
            active_members: DEFAULT_ACTIVE_MEMBERS
                .iter()
                .map(|name| name.to_string())
                .collect(),
        }
    }
}

impl Roster {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Roster> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|err| {
            ReportError::Validation(format!(
                "failed to read roster file '{}': {err}",
                path.display()
            ))
        })?;
        toml::from_str(&content).map_err(|err| {
            ReportError::Validation(format!(
                "failed to parse roster file '{}': {err}",
                path.display()
            ))
        })
    }
}
