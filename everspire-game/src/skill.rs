//! Skill definitions and the runtime skill records they parameterize.

use serde::{Deserialize, Serialize};

use crate::constants::{SHACKLED_CAP_FACTOR, SKILL_SPEED_PER_LEVEL, XP_NEEDED_GROWTH};
use crate::numbers::floor_f64_to_u32;

/// All trainable skills, in save-stable order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum SkillType {
    #[default]
    Charisma,
    Study,
    Combat,
    Search,
    Subterfuge,
    Crafting,
    Survival,
    Travel,
    Magic,
    Fortitude,
    Druid,
    Ascension,
}

pub const SKILL_ORDER: [SkillType; 12] = [
    SkillType::Charisma,
    SkillType::Study,
    SkillType::Combat,
    SkillType::Search,
    SkillType::Subterfuge,
    SkillType::Crafting,
    SkillType::Survival,
    SkillType::Travel,
    SkillType::Magic,
    SkillType::Fortitude,
    SkillType::Druid,
    SkillType::Ascension,
];

impl SkillType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Charisma => "Charisma",
            Self::Study => "Study",
            Self::Combat => "Combat",
            Self::Search => "Search",
            Self::Subterfuge => "Subterfuge",
            Self::Crafting => "Crafting",
            Self::Survival => "Survival",
            Self::Travel => "Travel",
            Self::Magic => "Magic",
            Self::Fortitude => "Fortitude",
            Self::Druid => "Druid",
            Self::Ascension => "Ascension",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Charisma => "🎭",
            Self::Study => "🧠",
            Self::Combat => "⚔️",
            Self::Search => "🔎",
            Self::Subterfuge => "🗡️",
            Self::Crafting => "🔨",
            Self::Survival => "⛺",
            Self::Travel => "🗺️",
            Self::Magic => "🔮",
            Self::Fortitude => "🛡️",
            Self::Druid => "🐻",
            Self::Ascension => "🙏",
        }
    }

    /// Late-game skills need disproportionately more XP per level.
    #[must_use]
    pub const fn xp_needed_mult(self) -> f64 {
        match self {
            Self::Magic => 3.0,
            Self::Fortitude => 10.0,
            Self::Druid => 20.0,
            Self::Ascension => 1000.0,
            _ => 1.0,
        }
    }

    /// Skills whose task speed scales with accumulated attunement.
    #[must_use]
    pub const fn is_attunement(self) -> bool {
        matches!(self, Self::Magic | Self::Druid | Self::Ascension)
    }

    /// Skills whose task speed scales with accumulated power.
    #[must_use]
    pub const fn is_empowered(self) -> bool {
        matches!(self, Self::Combat | Self::Fortitude)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for SkillType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime record for one skill. Invariant: `progress < xp_needed(level)`
/// after any XP grant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub skill: SkillType,
    pub level: u32,
    pub progress: f64,
    /// Additive speed bonus accumulated from consumed items. Cleared on
    /// every Energy Reset and on Prestige.
    #[serde(default)]
    pub speed_modifier: f64,
}

impl Skill {
    #[must_use]
    pub const fn new(skill: SkillType) -> Self {
        Self {
            skill,
            level: 0,
            progress: 0.0,
            speed_modifier: 0.0,
        }
    }
}

/// XP required to advance `skill` from `level` to the next level.
#[must_use]
pub fn xp_needed(base_cost: f64, skill: SkillType, level: u32) -> f64 {
    base_cost * XP_NEEDED_GROWTH.powf(f64::from(level)) * skill.xp_needed_mult()
}

/// Compounding task-speed factor contributed by a skill's level.
#[must_use]
pub fn level_factor(level: u32) -> f64 {
    SKILL_SPEED_PER_LEVEL.powf(f64::from(level))
}

/// Grant XP and normalize, returning levels gained. A `cap` (from The
/// Shackled) refuses level-ups past it; the refused requirement is still
/// consumed so `progress < xp_needed` holds unconditionally.
pub fn grant_xp(skill: &mut Skill, amount: f64, base_cost: f64, cap: Option<u32>) -> u32 {
    if amount <= 0.0 || !amount.is_finite() {
        return 0;
    }
    skill.progress += amount;
    let mut gained = 0;
    loop {
        let needed = xp_needed(base_cost, skill.skill, skill.level);
        if skill.progress < needed {
            break;
        }
        skill.progress -= needed;
        if cap.is_none_or(|cap| skill.level < cap) {
            skill.level += 1;
            gained += 1;
        }
    }
    gained
}

/// The Shackled level cap for one skill: 110% of the highest *other*
/// skill's level, never below one ahead of it (so fresh runs can still
/// leapfrog their way up).
#[must_use]
pub fn shackled_cap(skills: &[Skill], skill: SkillType) -> u32 {
    let highest_other = skills
        .iter()
        .filter(|s| s.skill != skill)
        .map(|s| s.level)
        .max()
        .unwrap_or(0);
    let scaled = floor_f64_to_u32(f64::from(highest_other) * SHACKLED_CAP_FACTOR);
    scaled.max(highest_other.saturating_add(1))
}
