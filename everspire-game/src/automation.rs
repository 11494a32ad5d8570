//! Player-configured automation: per-zone priority lists and the
//! selection rule that picks the next task when none is active.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::state::GameState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AutomationMode {
    #[default]
    Off,
    /// Lists live only as long as the current zone visit.
    Zone,
    /// Lists persist per zone across visits and resets.
    All,
}

impl AutomationMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Zone => "zone",
            Self::All => "all",
        }
    }
}

impl std::fmt::Display for AutomationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AutomationState {
    #[serde(default)]
    pub mode: AutomationMode,
    /// Priority lists keyed by zone index, in toggle order.
    #[serde(default)]
    pub priorities: BTreeMap<u32, Vec<String>>,
}

impl AutomationState {
    /// Add the task to the zone's list, or drop it if already present.
    /// Returns whether the task is in the list afterwards.
    pub fn toggle(&mut self, zone: u32, id: &str) -> bool {
        let list = self.priorities.entry(zone).or_default();
        if let Some(pos) = list.iter().position(|entry| entry == id) {
            list.remove(pos);
            if list.is_empty() {
                self.priorities.remove(&zone);
            }
            false
        } else {
            list.push(id.to_string());
            true
        }
    }

    #[must_use]
    pub fn priority_list(&self, zone: u32) -> &[String] {
        self.priorities.get(&zone).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, zone: u32, id: &str) -> bool {
        self.priority_list(zone).iter().any(|entry| entry == id)
    }
}

/// First enabled task in the current zone's priority order, or `None`
/// when automation is off, locked, or out of work. Entries that no
/// longer resolve are skipped.
#[must_use]
pub fn select_next(state: &GameState) -> Option<String> {
    if state.automation.mode == AutomationMode::Off || !state.automation_unlocked() {
        return None;
    }
    state
        .automation
        .priority_list(state.current_zone)
        .iter()
        .find(|id| state.task_state(id).is_some_and(|t| t.enabled))
        .cloned()
}
