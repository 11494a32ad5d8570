//! Perk definitions: permanent-for-the-run bonuses granted by tasks.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::modifier::SkillModifierList;
use crate::skill::SkillType;

/// All perks, in save-stable order. `Deleted` holds a retired perk's slot
/// so older saves keep their ordinals.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum PerkType {
    #[default]
    Reading,
    Writing,
    VillagerGratitude,
    Amulet,
    EnergySpell,
    ExperiencedTraveler,
    UndergroundConnection,
    MinorTimeCompression,
    HighAltitudeClimbing,
    Deleted,
    VillageHero,
    Attunement,
    GoblinScourge,
    SunkenTreasure,
    LostTemple,
    WalkWithoutRhythm,
    ReflectionsOnTheJourney,
    PurgedBureaucracy,
    DeepSeaDiving,
    EnergeticMemory,
    TheWorm,
    TowerOfBabel,
    Awakening,
    MajorTimeCompression,
    HideInPlainSight,
    DreamPrism,
    DragonKillingPlan,
    UnifiedTheoryOfMagic,
    Headmaster,
    DragonSlayer,
    CompulsiveNotetaking,
    OvercameFearOfSkydiving,
    DestroyedTheRing,
    GazedBeyondTheVeil,
    UndergroundForge,
    UnderstandingLeviathan,
    PurgedDemonicInfluences,
    DefiedTheGods,
    SurvivedTheVoid,
}

impl PerkType {
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerkDefinition {
    pub perk: PerkType,
    pub name: &'static str,
    pub icon: &'static str,
    /// Multiplicative speed effects. Empty for pure-mechanics perks.
    pub modifiers: SkillModifierList,
    /// Fixed summary for mechanics perks whose effect is not a modifier.
    pub summary: Option<&'static str>,
}

impl PerkDefinition {
    /// Tooltip-grade effect summary for rendering collaborators.
    #[must_use]
    pub fn description(&self) -> String {
        match (self.summary, self.modifiers.is_empty()) {
            (Some(text), true) => text.to_string(),
            (Some(text), false) => format!("{text}\n{}", self.modifiers.description()),
            (None, _) => self.modifiers.description(),
        }
    }
}

/// Multiplicative speed factor from the owned perks that touch any of the
/// task's skills. Two +100% perks yield 4x, not 3x.
pub fn speed_product(owned: impl Iterator<Item = PerkType>, skills: &[SkillType]) -> f64 {
    let mut product = 1.0;
    for perk in owned {
        for modifier in &definition(perk).modifiers.modifiers {
            if skills.contains(&modifier.skill) {
                product *= 1.0 + modifier.effect;
            }
        }
    }
    product
}

fn modifiers(entries: &[(SkillType, f64)]) -> SkillModifierList {
    SkillModifierList::new(entries)
}

#[allow(clippy::too_many_lines)]
fn build_definitions() -> Vec<PerkDefinition> {
    use PerkType as P;
    use SkillType as S;
    let skills = |perk, name, icon, entries: &[(SkillType, f64)]| PerkDefinition {
        perk,
        name,
        icon,
        modifiers: modifiers(entries),
        summary: None,
    };
    let mechanic = |perk, name, icon, summary| PerkDefinition {
        perk,
        name,
        icon,
        modifiers: SkillModifierList::default(),
        summary: Some(summary),
    };
    vec![
        skills(P::Reading, "How to Read", "📖", &[(S::Study, 0.5)]),
        mechanic(P::Writing, "How to Write", "📝", "Improves XP gain by 50%"),
        skills(P::VillagerGratitude, "Villager Gratitude", "❤️", &[(S::Charisma, 0.5)]),
        PerkDefinition {
            perk: P::Amulet,
            name: "Mysterious Amulet",
            icon: "📿",
            modifiers: modifiers(&[(S::Magic, 0.5)]),
            summary: Some("Unlocks Automation and automatic Item use"),
        },
        mechanic(P::EnergySpell, "Energetic Spell", "⚡️", "Increases starting Energy by 50"),
        skills(P::ExperiencedTraveler, "Experienced Traveler", "🦶", &[(S::Travel, 0.5)]),
        skills(
            P::UndergroundConnection,
            "Underground Connection",
            "🎲",
            &[(S::Subterfuge, 0.4), (S::Charisma, 0.2)],
        ),
        mechanic(
            P::MinorTimeCompression,
            "Minor Time Compression",
            "⌚",
            "Task reps completed in a single Tick cost 80% less Energy; \
             Zones where every Task is instant complete for free on an Energy Reset",
        ),
        mechanic(
            P::HighAltitudeClimbing,
            "High Altitude Climbing",
            "🗻",
            "Reduces all Energy consumption 20%",
        ),
        mechanic(P::Deleted, "Retired Perk", "❓", "This perk no longer exists"),
        skills(
            P::VillageHero,
            "Village Hero",
            "🎖️",
            &[(S::Charisma, 0.4), (S::Combat, 0.2)],
        ),
        mechanic(P::Attunement, "Attunement", "🌀", "Unlocks the Attunement mechanic"),
        skills(
            P::GoblinScourge,
            "Goblin Scourge",
            "💀",
            &[(S::Combat, 0.3), (S::Fortitude, 0.3)],
        ),
        skills(
            P::SunkenTreasure,
            "Sunken Treasure",
            "⚓",
            &[(S::Search, 0.3), (S::Fortitude, 0.3)],
        ),
        skills(P::LostTemple, "Found Lost Temple", "🏯", &[(S::Magic, 0.5)]),
        skills(
            P::WalkWithoutRhythm,
            "Walk Without Rhythm",
            "👣",
            &[(S::Subterfuge, 0.4), (S::Travel, 0.2)],
        ),
        mechanic(
            P::ReflectionsOnTheJourney,
            "Reflections on the Journey",
            "🕰️",
            "Reduces Energy drain in each Zone, compounding for every Zone \
             you've reached past it",
        ),
        skills(
            P::PurgedBureaucracy,
            "Purged Bureaucracy",
            "⚖️",
            &[(S::Charisma, 0.3), (S::Crafting, 0.3)],
        ),
        skills(
            P::DeepSeaDiving,
            "Deep Sea Diving",
            "🤿",
            &[(S::Search, 0.3), (S::Magic, 0.3)],
        ),
        mechanic(
            P::EnergeticMemory,
            "Energetic Memory",
            "💭",
            "On each Energy Reset, increases max Energy by the current Zone / 10",
        ),
        skills(P::TheWorm, "The Worm", "💃", &[(S::Charisma, 0.5)]),
        skills(
            P::TowerOfBabel,
            "Tower of Babel",
            "🧱",
            &[(S::Charisma, 0.3), (S::Ascension, 0.3)],
        ),
        mechanic(P::Awakening, "Awakening", "💤", "Improves Divine Spark gain by 50%"),
        mechanic(
            P::MajorTimeCompression,
            "Major Time Compression",
            "⏰",
            "Tasks with instant reps complete whole in a single Tick; \
             non-instant Tasks run 1.5x faster without extra Energy",
        ),
        skills(P::HideInPlainSight, "Hide in Plain Sight", "👥", &[(S::Subterfuge, 0.5)]),
        skills(
            P::DreamPrism,
            "Dream Prism",
            "🔷",
            &[(S::Magic, 0.3), (S::Travel, 0.3)],
        ),
        skills(P::DragonKillingPlan, "Dragon Killing Plan", "🏔️", &[(S::Combat, 0.5)]),
        mechanic(
            P::UnifiedTheoryOfMagic,
            "Unified Theory of Magic",
            "📜",
            "Each Zone fully completed this Prestige increases Task speed 5%",
        ),
        skills(
            P::Headmaster,
            "Headmaster",
            "🧙‍♂️",
            &[(S::Magic, 0.3), (S::Study, 0.3)],
        ),
        skills(
            P::DragonSlayer,
            "Dragon Slayer",
            "🐉",
            &[(S::Combat, 0.3), (S::Charisma, 0.3)],
        ),
        mechanic(
            P::CompulsiveNotetaking,
            "Compulsive Notetaking",
            "🔁",
            "On an Energy Reset, keep at least 1 of every Item type found that run",
        ),
        skills(
            P::OvercameFearOfSkydiving,
            "Overcame Fear of Skydiving",
            "🪂",
            &[(S::Combat, 0.3), (S::Fortitude, 0.3)],
        ),
        skills(
            P::DestroyedTheRing,
            "Destroyed the Ring",
            "💍",
            &[(S::Ascension, 1.0), (S::Charisma, 0.5)],
        ),
        mechanic(
            P::GazedBeyondTheVeil,
            "Gazed Beyond the Veil",
            "👀",
            "Improves XP gain by 100%",
        ),
        skills(P::UndergroundForge, "Studied Underground Forge", "⛏️", &[(S::Crafting, 0.5)]),
        skills(
            P::UnderstandingLeviathan,
            "Understanding Leviathan",
            "🐋",
            &[(S::Study, 0.3), (S::Combat, 0.3)],
        ),
        skills(
            P::PurgedDemonicInfluences,
            "Purged Demonic Influences",
            "👹",
            &[(S::Charisma, 0.3), (S::Fortitude, 0.3)],
        ),
        PerkDefinition {
            perk: P::DefiedTheGods,
            name: "Defied the Gods",
            icon: "🚫",
            modifiers: modifiers(&[(S::Ascension, 1.0)]),
            summary: Some("Improves Divine Spark gain by 100%"),
        },
        skills(
            P::SurvivedTheVoid,
            "Survived the Void",
            "⚫",
            &[(S::Ascension, 0.3), (S::Fortitude, 0.3)],
        ),
    ]
}

/// Immutable definition for one perk.
#[must_use]
pub fn definition(perk: PerkType) -> &'static PerkDefinition {
    static DEFINITIONS: OnceLock<Vec<PerkDefinition>> = OnceLock::new();
    &DEFINITIONS.get_or_init(build_definitions)[perk.index()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FLOAT_EPSILON;

    #[test]
    fn definitions_align_with_enum_order() {
        let all = build_definitions();
        assert_eq!(all.len(), PerkType::SurvivedTheVoid.index() + 1);
        for (idx, def) in all.iter().enumerate() {
            assert_eq!(def.perk.index(), idx, "misplaced entry for {}", def.name);
        }
    }

    #[test]
    fn retired_slot_keeps_ordinals_stable() {
        assert_eq!(PerkType::Deleted.index(), 9);
        assert_eq!(PerkType::Attunement.index(), 11);
        assert_eq!(PerkType::SurvivedTheVoid.index(), 38);
    }

    #[test]
    fn perks_stack_multiplicatively() {
        let owned = [PerkType::Reading, PerkType::Headmaster];
        let product = speed_product(owned.into_iter(), &[SkillType::Study]);
        assert!((product - 1.5 * 1.3).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn speed_product_ignores_unrelated_skills() {
        let owned = [PerkType::DragonKillingPlan];
        let product = speed_product(owned.into_iter(), &[SkillType::Charisma]);
        assert!((product - 1.0).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn mechanics_perks_describe_themselves() {
        let desc = definition(PerkType::DefiedTheGods).description();
        assert!(desc.contains("Divine Spark"));
        assert!(desc.contains("Ascension"));
    }
}
