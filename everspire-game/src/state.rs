//! Runtime progression state: the single aggregate every system mutates.
//!
//! Content tables (zones, items, perks) stay immutable; everything here is
//! per-save data plus the serde envelope that persists it.

use std::collections::{BTreeMap, BTreeSet};

use hmac::{Hmac, Mac};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::automation::AutomationState;
#[cfg(debug_assertions)]
use crate::constants::DEBUG_ENV_VAR;
use crate::constants::ENERGETIC_SPELL_BONUS;
use crate::content::{TaskDefinition, TaskKind, Zone, zone_catalog};
use crate::event::{EventKind, EventQueue};
use crate::harrow::HarrowCard;
use crate::item::ItemType;
use crate::perk::PerkType;
use crate::prestige::{PrestigeRepeatable, PrestigeUnlock};
use crate::skill::{SKILL_ORDER, Skill, SkillType};

/// Current save format version. Bump when the serialized shape changes.
pub const SAVE_VERSION: u32 = 1;

const RNG_DOMAIN_TAG: &[u8] = b"everspire.state.rng";

/// Per-task runtime record for the current zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskState {
    pub id: String,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub enabled: bool,
    /// One-shot marks for the rep currently in progress.
    #[serde(default)]
    pub hasted: bool,
    #[serde(default)]
    pub lightning: bool,
    #[serde(default)]
    pub ringed: bool,
}

impl TaskState {
    #[must_use]
    pub fn new(definition: &TaskDefinition) -> Self {
        Self {
            id: definition.id.clone(),
            reps: 0,
            progress: 0.0,
            enabled: definition.kind != TaskKind::Travel,
            hasted: false,
            lightning: false,
            ringed: false,
        }
    }

    #[must_use]
    pub const fn fully_completed(&self, definition: &TaskDefinition) -> bool {
        self.reps >= definition.max_reps
    }

    pub const fn clear_charges(&mut self) {
        self.hasted = false;
        self.lightning = false;
        self.ringed = false;
    }
}

/// Current and maximum energy for the run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyPool {
    pub current: f64,
    pub max: f64,
}

impl Default for EnergyPool {
    fn default() -> Self {
        Self {
            current: default_max_energy(),
            max: default_max_energy(),
        }
    }
}

/// The layer that survives both reset kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PrestigeProgress {
    #[serde(default)]
    pub divine_spark: f64,
    #[serde(default)]
    pub prestige_count: u32,
    #[serde(default)]
    pub owned_unlocks: BTreeSet<PrestigeUnlock>,
    #[serde(default)]
    pub repeatable_levels: BTreeMap<PrestigeRepeatable, u32>,
    /// Highest zone index ever entered (0-based).
    #[serde(default)]
    pub highest_zone: u32,
    /// Highest zone index whose non-travel tasks were all fully completed.
    #[serde(default)]
    pub highest_zone_fully_completed: u32,
}

impl PrestigeProgress {
    #[must_use]
    pub fn owns(&self, unlock: PrestigeUnlock) -> bool {
        self.owned_unlocks.contains(&unlock)
    }

    #[must_use]
    pub fn repeatable_level(&self, repeatable: PrestigeRepeatable) -> u32 {
        self.repeatable_levels
            .get(&repeatable)
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn total_repeatable_levels(&self) -> u32 {
        self.repeatable_levels.values().sum()
    }
}

/// Harrow card ownership and the per-run active/forfeited lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HarrowState {
    #[serde(default)]
    pub owned: BTreeSet<HarrowCard>,
    #[serde(default)]
    pub active: BTreeSet<HarrowCard>,
    #[serde(default)]
    pub forfeited: BTreeSet<HarrowCard>,
    /// Card The Fool replicates for the current run.
    #[serde(default)]
    pub fool_selection: Option<HarrowCard>,
    /// Set on the first tick after a prestige; locks activation toggles.
    #[serde(default)]
    pub run_started: bool,
}

impl HarrowState {
    /// Whether a card's penalty applies right now, directly or via The Fool.
    #[must_use]
    pub fn penalty_active(&self, card: HarrowCard) -> bool {
        if self.active.contains(&card) {
            return true;
        }
        card != HarrowCard::Fool
            && self.fool_selection == Some(card)
            && self.active.contains(&HarrowCard::Fool)
    }

    /// Cards still earning the prestige spark bonus.
    #[must_use]
    pub fn bonus_card_count(&self) -> u32 {
        let count = self
            .active
            .iter()
            .filter(|card| !self.forfeited.contains(card))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// Levels and resources at the start of the current run, for the reset
/// summary diff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RunBaseline {
    #[serde(default)]
    pub power: u32,
    #[serde(default)]
    pub attunement: u32,
    /// Indexed by `SkillType::index()`.
    #[serde(default)]
    pub skill_levels: Vec<u32>,
}

/// Snapshot taken when energy hits zero, shown as the reset summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EnergyResetInfo {
    #[serde(default)]
    pub skill_gains: BTreeMap<SkillType, u32>,
    #[serde(default)]
    pub power_at_start: u32,
    #[serde(default)]
    pub power_at_end: u32,
    #[serde(default)]
    pub attunement_at_start: u32,
    #[serde(default)]
    pub attunement_at_end: u32,
    #[serde(default)]
    pub energetic_memory_gain: f64,
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub seed: u64,
    #[serde(default)]
    pub tick: u64,
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub unlocked_skills: BTreeSet<SkillType>,
    /// Runtime records for the current zone's tasks, in definition order.
    #[serde(default)]
    pub tasks: Vec<TaskState>,
    #[serde(default)]
    pub active_task: Option<String>,
    #[serde(default)]
    pub current_zone: u32,
    #[serde(default)]
    pub energy: EnergyPool,
    #[serde(default)]
    pub items: BTreeMap<ItemType, u32>,
    /// Insertion-ordered types gained since the last energy reset.
    #[serde(default)]
    pub items_found_this_energy_reset: Vec<ItemType>,
    #[serde(default)]
    pub perks_owned: BTreeSet<PerkType>,
    /// Perks ever seen; never cleared, not even by prestige.
    #[serde(default)]
    pub perks_known: BTreeSet<PerkType>,
    #[serde(default)]
    pub power: u32,
    #[serde(default)]
    pub has_unlocked_power: bool,
    #[serde(default)]
    pub attunement: u32,
    #[serde(default)]
    pub prestige: PrestigeProgress,
    #[serde(default)]
    pub prestige_available: bool,
    #[serde(default)]
    pub harrow: HarrowState,
    #[serde(default)]
    pub queued_scrolls_of_haste: u32,
    #[serde(default)]
    pub queued_magic_rings: u32,
    #[serde(default)]
    pub queued_lightning: u32,
    #[serde(default = "default_repeat_tasks")]
    pub repeat_tasks: bool,
    #[serde(default)]
    pub auto_use_items: bool,
    #[serde(default)]
    pub automation: AutomationState,
    /// Energy reached zero; ticks are no-ops until the player resets.
    #[serde(default)]
    pub is_in_energy_reset: bool,
    #[serde(default)]
    pub energy_reset_info: Option<EnergyResetInfo>,
    #[serde(default)]
    pub energy_reset_count: u32,
    #[serde(default)]
    pub run_baseline: RunBaseline,
    #[serde(default)]
    pub is_at_end_of_content: bool,
    #[serde(default)]
    pub events: EventQueue,
    pub logs: Vec<String>,
    #[serde(skip)]
    pub rng: Option<ChaCha20Rng>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            seed: 0,
            tick: 0,
            skills: SKILL_ORDER.iter().map(|s| Skill::new(*s)).collect(),
            unlocked_skills: BTreeSet::new(),
            tasks: Vec::new(),
            active_task: None,
            current_zone: 0,
            energy: EnergyPool::default(),
            items: BTreeMap::new(),
            items_found_this_energy_reset: Vec::new(),
            perks_owned: BTreeSet::new(),
            perks_known: BTreeSet::new(),
            power: 0,
            has_unlocked_power: false,
            attunement: 0,
            prestige: PrestigeProgress::default(),
            prestige_available: false,
            harrow: HarrowState::default(),
            queued_scrolls_of_haste: 0,
            queued_magic_rings: 0,
            queued_lightning: 0,
            repeat_tasks: default_repeat_tasks(),
            auto_use_items: false,
            automation: AutomationState::default(),
            is_in_energy_reset: false,
            energy_reset_info: None,
            energy_reset_count: 0,
            run_baseline: RunBaseline::default(),
            is_at_end_of_content: false,
            events: EventQueue::default(),
            logs: vec![String::from("log.new-run")],
            rng: None,
        }
    }
}

impl GameState {
    /// Fresh state seeded for a new playthrough, zone 1 ready to play.
    #[must_use]
    pub fn new_game(seed: u64) -> Self {
        let mut state = Self::default().with_seed(seed);
        state.enter_zone(false);
        state.capture_run_baseline();
        state
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = Some(ChaCha20Rng::from_seed(Self::seed_bytes(seed)));
        self
    }

    /// Rebuild the skip-serialized parts after deserialization.
    #[must_use]
    pub fn rehydrate(mut self) -> Self {
        self.rng = Some(ChaCha20Rng::from_seed(Self::seed_bytes(self.seed)));
        self.ensure_skill_table();
        if self
            .active_task
            .as_ref()
            .is_some_and(|id| self.task_state(id).is_none())
        {
            self.active_task = None;
        }
        self.refresh_travel_gate();
        self
    }

    fn seed_bytes(seed: u64) -> [u8; 32] {
        let mut mac = Hmac::<Sha256>::new_from_slice(&seed.to_le_bytes())
            .expect("64-bit seed is valid key");
        mac.update(RNG_DOMAIN_TAG);
        mac.finalize().into_bytes().into()
    }

    /// Pad or reorder the skill table so indexing by `SkillType::index()`
    /// never misses, whatever the save contained.
    fn ensure_skill_table(&mut self) {
        let mut table: Vec<Skill> = SKILL_ORDER.iter().map(|s| Skill::new(*s)).collect();
        for skill in self.skills.drain(..) {
            let idx = skill.skill.index();
            table[idx] = skill;
        }
        self.skills = table;
    }

    #[must_use]
    pub fn skill(&self, skill: SkillType) -> &Skill {
        &self.skills[skill.index()]
    }

    pub fn skill_mut(&mut self, skill: SkillType) -> &mut Skill {
        &mut self.skills[skill.index()]
    }

    /// 1-based zone number as shown to the player.
    #[must_use]
    pub const fn zone_display_number(&self) -> u32 {
        self.current_zone + 1
    }

    #[must_use]
    pub fn zone_def(&self) -> Option<&'static Zone> {
        zone_catalog().zone(self.current_zone as usize)
    }

    #[must_use]
    pub fn task_state(&self, id: &str) -> Option<&TaskState> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn task_state_mut(&mut self, id: &str) -> Option<&mut TaskState> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    #[must_use]
    pub fn active_task_state(&self) -> Option<&TaskState> {
        self.active_task
            .as_deref()
            .and_then(|id| self.task_state(id))
    }

    /// Seed runtime records for the current zone and surface its content.
    /// Skill unlock events fire only when `announce` is set; the first zone
    /// of a run starts quiet.
    pub fn enter_zone(&mut self, announce: bool) {
        self.active_task = None;
        self.tasks.clear();
        // Zone-mode priority lists last one visit; All-mode lists persist.
        if self.automation.mode == crate::automation::AutomationMode::Zone {
            self.automation.priorities.remove(&self.current_zone);
        }
        let Some(zone) = self.zone_def() else {
            return;
        };
        for def in &zone.tasks {
            self.tasks.push(TaskState::new(def));
            for skill in &def.skills {
                if self.unlocked_skills.insert(*skill) && announce {
                    self.events
                        .push(self.tick, EventKind::UnlockedSkill { skill: *skill });
                }
            }
            if let Some(perk) = def.perk {
                self.perks_known.insert(perk);
            }
            if announce {
                self.events.push(
                    self.tick,
                    EventKind::UnlockedTask {
                        task: def.id.clone(),
                    },
                );
            }
        }
        self.refresh_travel_gate();
    }

    /// Every gating task (mandatory, and prestige where present) of the
    /// current zone fully completed.
    #[must_use]
    pub fn zone_gates_met(&self) -> bool {
        let Some(zone) = self.zone_def() else {
            return false;
        };
        zone.tasks
            .iter()
            .filter(|def| def.kind.gates_travel())
            .all(|def| {
                self.task_state(&def.id)
                    .is_some_and(|t| t.fully_completed(def))
            })
    }

    /// Every non-travel task of the current zone fully completed.
    #[must_use]
    pub fn zone_fully_completed(&self) -> bool {
        let Some(zone) = self.zone_def() else {
            return false;
        };
        zone.tasks
            .iter()
            .filter(|def| def.kind != TaskKind::Travel)
            .all(|def| {
                self.task_state(&def.id)
                    .is_some_and(|t| t.fully_completed(def))
            })
    }

    /// Recompute the `enabled` flag of every task record. Travel waits for
    /// the zone gates; everything else only needs remaining reps.
    pub fn refresh_travel_gate(&mut self) {
        let Some(zone) = self.zone_def() else {
            return;
        };
        let gates_met = self.zone_gates_met();
        for def in &zone.tasks {
            let Some(task) = self.tasks.iter_mut().find(|t| t.id == def.id) else {
                continue;
            };
            let has_reps = task.reps < def.max_reps;
            task.enabled = if def.kind == TaskKind::Travel {
                has_reps && gates_met
            } else {
                has_reps
            };
        }
    }

    #[must_use]
    pub fn item_count(&self, item: ItemType) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    /// Add to stock, remember the find for this reset, and emit the event.
    pub fn add_item(&mut self, item: ItemType, count: u32) {
        if count == 0 {
            return;
        }
        let stock = self.items.entry(item).or_insert(0);
        *stock = stock.saturating_add(count);
        if !self.items_found_this_energy_reset.contains(&item) {
            self.items_found_this_energy_reset.push(item);
        }
        let stock = *stock;
        self.events
            .push(self.tick, EventKind::GainedItem { item, count });
        if debug_log_enabled() {
            println!("📦 Found {count} x {item:?} (stock {stock})");
        }
    }

    /// Remove up to `count` from stock; returns how many actually came out.
    pub fn take_items(&mut self, item: ItemType, count: u32) -> u32 {
        let Some(stock) = self.items.get_mut(&item) else {
            return 0;
        };
        let taken = count.min(*stock);
        *stock -= taken;
        if *stock == 0 {
            self.items.remove(&item);
        }
        taken
    }

    /// Grant a perk if not yet owned. Returns whether it was new.
    pub fn own_perk(&mut self, perk: PerkType) -> bool {
        if !self.perks_owned.insert(perk) {
            return false;
        }
        self.perks_known.insert(perk);
        if perk == PerkType::EnergySpell {
            self.energy.max += ENERGETIC_SPELL_BONUS;
            self.energy.current += ENERGETIC_SPELL_BONUS;
        }
        self.events.push(self.tick, EventKind::GainedPerk { perk });
        true
    }

    #[must_use]
    pub fn has_perk(&self, perk: PerkType) -> bool {
        self.perks_owned.contains(&perk)
    }

    #[must_use]
    pub fn automation_unlocked(&self) -> bool {
        self.has_perk(PerkType::Amulet) || self.prestige.owns(PrestigeUnlock::PermanentAutomation)
    }

    #[must_use]
    pub fn auto_use_unlocked(&self) -> bool {
        self.automation_unlocked()
    }

    /// Flat task-speed bonus from accumulated power, once unlocked.
    #[must_use]
    pub fn power_speed_bonus(&self) -> f64 {
        if self.has_unlocked_power {
            f64::from(self.power) / crate::constants::POWER_SPEED_DIVISOR
        } else {
            0.0
        }
    }

    /// Flat task-speed bonus from attunement, once the perk is owned.
    #[must_use]
    pub fn attunement_speed_bonus(&self) -> f64 {
        if self.has_perk(PerkType::Attunement) {
            f64::from(self.attunement) / crate::constants::ATTUNEMENT_SPEED_DIVISOR
        } else {
            0.0
        }
    }

    pub fn capture_run_baseline(&mut self) {
        self.run_baseline = RunBaseline {
            power: self.power,
            attunement: self.attunement,
            skill_levels: self.skills.iter().map(|s| s.level).collect(),
        };
    }

    /// Per-skill level gains since the run baseline, zero-gain skills
    /// omitted.
    #[must_use]
    pub fn skill_gains_since_baseline(&self) -> BTreeMap<SkillType, u32> {
        let mut gains = BTreeMap::new();
        for skill in &self.skills {
            let start = self
                .run_baseline
                .skill_levels
                .get(skill.skill.index())
                .copied()
                .unwrap_or(0);
            let gained = skill.level.saturating_sub(start);
            if gained > 0 {
                gains.insert(skill.skill, gained);
            }
        }
        gains
    }
}

/// Versioned persistence envelope around [`GameState`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveGame {
    pub save_version: u32,
    pub state: GameState,
}

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("unsupported save version {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },
    #[error("malformed save payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl SaveGame {
    /// Serialize a state snapshot under the current save version.
    pub fn encode(state: &GameState) -> Result<String, SaveError> {
        let envelope = Self {
            save_version: SAVE_VERSION,
            state: state.clone(),
        };
        Ok(serde_json::to_string(&envelope)?)
    }

    /// Parse and rehydrate a saved state, rejecting unknown versions.
    pub fn decode(payload: &str) -> Result<GameState, SaveError> {
        let envelope: Self = serde_json::from_str(payload)?;
        if envelope.save_version != SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                found: envelope.save_version,
                expected: SAVE_VERSION,
            });
        }
        Ok(envelope.state.rehydrate())
    }
}

#[cfg(debug_assertions)]
fn debug_log_enabled() -> bool {
    matches!(std::env::var(DEBUG_ENV_VAR), Ok(val) if val != "0")
}

#[cfg(not(debug_assertions))]
const fn debug_log_enabled() -> bool {
    false
}

fn default_max_energy() -> f64 {
    100.0
}

fn default_repeat_tasks() -> bool {
    true
}
