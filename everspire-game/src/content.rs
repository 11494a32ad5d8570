//! Zone and task content: embedded definitions validated on load.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::item::ItemType;
use crate::perk::PerkType;
use crate::skill::SkillType;

const DEFAULT_ZONE_DATA: &str = include_str!("../assets/data/zones.json");

/// Task categories driving gating, automation, and drain rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    #[default]
    Normal,
    Travel,
    Mandatory,
    Prestige,
    Boss,
}

impl TaskKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Travel => "travel",
            Self::Mandatory => "mandatory",
            Self::Prestige => "prestige",
            Self::Boss => "boss",
        }
    }

    /// Tasks that gate the zone's travel task.
    #[must_use]
    pub const fn gates_travel(self) -> bool {
        matches!(self, Self::Mandatory | Self::Prestige)
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable definition for one task within a zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: TaskKind,
    pub skills: SmallVec<[SkillType; 3]>,
    pub base_cost: f64,
    #[serde(default = "TaskDefinition::default_max_reps")]
    pub max_reps: u32,
    #[serde(default = "TaskDefinition::default_mult")]
    pub xp_mult: f64,
    #[serde(default = "TaskDefinition::default_mult")]
    pub energy_mult: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perk: Option<PerkType>,
    #[serde(default)]
    pub power_gain: u32,
    #[serde(default)]
    pub attunement_gain: u32,
}

impl TaskDefinition {
    #[must_use]
    pub const fn default_max_reps() -> u32 {
        1
    }

    #[must_use]
    pub const fn default_mult() -> f64 {
        1.0
    }
}

/// One zone: an ordered list of tasks, travel last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    pub tasks: Vec<TaskDefinition>,
}

impl Zone {
    #[must_use]
    pub fn travel_task(&self) -> Option<&TaskDefinition> {
        self.tasks.iter().find(|t| t.kind == TaskKind::Travel)
    }
}

/// Errors raised when zone content violates its invariants.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("zone data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no zones defined")]
    NoZones,
    #[error("zone {zone} has no tasks")]
    EmptyZone { zone: usize },
    #[error("zone {zone} needs exactly one travel task, found {found}")]
    TravelCount { zone: usize, found: usize },
    #[error("travel task {id} must have a single rep")]
    TravelReps { id: String },
    #[error("task {id} has nonpositive base cost {cost}")]
    NonpositiveCost { id: String, cost: f64 },
    #[error("task {id} has zero max reps")]
    ZeroReps { id: String },
    #[error("task {id} names no skills")]
    NoSkills { id: String },
    #[error("task {id} grants the retired perk slot")]
    RetiredPerk { id: String },
    #[error("duplicate task id {id}")]
    DuplicateId { id: String },
}

/// The full ordered zone progression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneCatalog {
    pub zones: Vec<Zone>,
}

impl ZoneCatalog {
    /// Parse and validate catalog JSON.
    ///
    /// # Errors
    ///
    /// Returns `ContentError` when the JSON is malformed or any zone or
    /// task violates the documented invariants.
    pub fn from_json(data: &str) -> Result<Self, ContentError> {
        let catalog: Self = serde_json::from_str(data)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Validate catalog invariants.
    ///
    /// # Errors
    ///
    /// Returns the first `ContentError` found scanning zones in order.
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.zones.is_empty() {
            return Err(ContentError::NoZones);
        }
        let mut seen = std::collections::HashSet::new();
        for (zone_idx, zone) in self.zones.iter().enumerate() {
            if zone.tasks.is_empty() {
                return Err(ContentError::EmptyZone { zone: zone_idx });
            }
            let travel = zone
                .tasks
                .iter()
                .filter(|t| t.kind == TaskKind::Travel)
                .count();
            if travel != 1 {
                return Err(ContentError::TravelCount {
                    zone: zone_idx,
                    found: travel,
                });
            }
            for task in &zone.tasks {
                if !seen.insert(task.id.clone()) {
                    return Err(ContentError::DuplicateId {
                        id: task.id.clone(),
                    });
                }
                if task.base_cost <= 0.0 {
                    return Err(ContentError::NonpositiveCost {
                        id: task.id.clone(),
                        cost: task.base_cost,
                    });
                }
                if task.max_reps == 0 {
                    return Err(ContentError::ZeroReps {
                        id: task.id.clone(),
                    });
                }
                if task.skills.is_empty() {
                    return Err(ContentError::NoSkills {
                        id: task.id.clone(),
                    });
                }
                if task.kind == TaskKind::Travel && task.max_reps != 1 {
                    return Err(ContentError::TravelReps {
                        id: task.id.clone(),
                    });
                }
                if task.perk == Some(PerkType::Deleted) {
                    return Err(ContentError::RetiredPerk {
                        id: task.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn zone(&self, index: usize) -> Option<&Zone> {
        self.zones.get(index)
    }

    #[must_use]
    pub fn find_task(&self, id: &str) -> Option<&TaskDefinition> {
        self.zones
            .iter()
            .flat_map(|z| z.tasks.iter())
            .find(|t| t.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// The zone that holds a designated prestige task, if any.
    #[must_use]
    pub fn prestige_zone(&self) -> Option<usize> {
        self.zones
            .iter()
            .position(|z| z.tasks.iter().any(|t| t.kind == TaskKind::Prestige))
    }
}

/// The embedded default zone progression.
pub fn zone_catalog() -> &'static ZoneCatalog {
    static CATALOG: OnceLock<ZoneCatalog> = OnceLock::new();
    CATALOG.get_or_init(|| {
        ZoneCatalog::from_json(DEFAULT_ZONE_DATA).expect("valid embedded zone data")
    })
}
