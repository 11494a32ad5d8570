//! Item definitions: modifier bundles, food, and one-shot artifacts.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::modifier::SkillModifierList;
use crate::skill::SkillType;

/// All obtainable items, in save-stable order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub enum ItemType {
    #[default]
    Food,
    Arrow,
    Coin,
    Mushroom,
    GoblinSupplies,
    TravelEquipment,
    Book,
    ScrollOfHaste,
    GoblinWaraxe,
    CampingEquipment,
    Reagents,
    MagicalRoots,
    GoblinTreasure,
    Fish,
    BanditWeapons,
    Cactus,
    CityChain,
    WerewolfFur,
    OasisWater,
    Calamari,
    MysticIncense,
    OracleBones,
    WormHideCoat,
    DjinnLamp,
    Dreamcatcher,
    MagicEssence,
    CraftingRecipe,
    KnightlyBoots,
    DragonScale,
    CaveInsects,
    MagicalVessel,
    MagicRing,
    BottledLightning,
    HeatEssence,
    DivineNotes,
    GriffinQuill,
    WingsOfShadow,
    RitualSymbol,
    Glasses,
}

/// Items excluded from auto-use: their value lies in manual timing.
pub const ARTIFACTS: [ItemType; 4] = [
    ItemType::ScrollOfHaste,
    ItemType::Dreamcatcher,
    ItemType::MagicRing,
    ItemType::BottledLightning,
];

impl ItemType {
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn is_artifact(self) -> bool {
        ARTIFACTS.contains(&self)
    }
}

/// What consuming one unit of an item does.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemEffect {
    /// Fold the bundle into skill accumulators, once per unit.
    Modifiers(SkillModifierList),
    /// Restore energy per unit (base value, scaled by Gourmet). May take
    /// the pool above its maximum.
    Energy(f64),
    /// Queue a Scroll of Haste charge (next rep x5 progress).
    QueueHaste,
    /// Queue a Magic Ring charge (next rep x5 XP).
    QueueMagicRing,
    /// Queue a Bottled Lightning charge (next Boss rep x2 progress).
    QueueLightning,
    /// Copy every item type found this Energy Reset, except this one.
    DuplicateFound,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemDefinition {
    pub item: ItemType,
    pub name: &'static str,
    pub name_plural: &'static str,
    pub icon: &'static str,
    pub effect: ItemEffect,
}

impl ItemDefinition {
    #[must_use]
    pub fn name_for(&self, count: u32) -> &'static str {
        if count == 1 { self.name } else { self.name_plural }
    }

    /// Tooltip-grade effect summary for rendering collaborators.
    #[must_use]
    pub fn description(&self) -> String {
        match &self.effect {
            ItemEffect::Modifiers(list) => list.description(),
            ItemEffect::Energy(gain) => format!("Gives {gain:.0} Energy each"),
            ItemEffect::QueueHaste => "The next Task rep you start is 5x as fast".to_string(),
            ItemEffect::QueueMagicRing => {
                "The next Task rep you start gives 5x as much XP".to_string()
            }
            ItemEffect::QueueLightning => {
                "The next Boss Task you start is 2x as fast".to_string()
            }
            ItemEffect::DuplicateFound => {
                "Creates a copy of every Item type you've obtained this Energy Reset".to_string()
            }
        }
    }
}

fn modifiers(entries: &[(SkillType, f64)]) -> ItemEffect {
    ItemEffect::Modifiers(SkillModifierList::new(entries))
}

fn build_definitions() -> Vec<ItemDefinition> {
    use ItemType as I;
    use SkillType as S;
    let def = |item, name, name_plural, icon, effect| ItemDefinition {
        item,
        name,
        name_plural,
        icon,
        effect,
    };
    vec![
        def(I::Food, "Food", "Food", "🍲", ItemEffect::Energy(5.0)),
        def(I::Arrow, "Arrow", "Arrows", "🏹", modifiers(&[(S::Combat, 0.15)])),
        def(I::Coin, "Coin", "Coins", "💰", modifiers(&[(S::Charisma, 0.2)])),
        def(
            I::Mushroom,
            "Mushroom",
            "Mushrooms",
            "🍄",
            modifiers(&[(S::Magic, 0.2), (S::Search, 0.2)]),
        ),
        def(
            I::GoblinSupplies,
            "Goblin Supplies",
            "Goblin Supplies",
            "📦",
            modifiers(&[(S::Subterfuge, 0.15), (S::Combat, 0.1), (S::Fortitude, 0.1)]),
        ),
        def(
            I::TravelEquipment,
            "Travel Equipment",
            "Travel Equipment",
            "🎒",
            modifiers(&[(S::Travel, 0.1), (S::Fortitude, 0.1)]),
        ),
        def(
            I::Book,
            "Book",
            "Books",
            "📚",
            modifiers(&[(S::Study, 0.1), (S::Magic, 0.1)]),
        ),
        def(
            I::ScrollOfHaste,
            "Scroll of Haste",
            "Scrolls of Haste",
            "💨",
            ItemEffect::QueueHaste,
        ),
        def(
            I::GoblinWaraxe,
            "Goblin Waraxe",
            "Goblin Waraxes",
            "🪓",
            modifiers(&[(S::Combat, 1.0)]),
        ),
        def(
            I::CampingEquipment,
            "Camping Equipment",
            "Camping Equipment",
            "⛺",
            modifiers(&[(S::Fortitude, 0.15)]),
        ),
        def(
            I::Reagents,
            "Reagent",
            "Reagents",
            "🌿",
            modifiers(&[(S::Magic, 0.2), (S::Crafting, 0.1)]),
        ),
        def(
            I::MagicalRoots,
            "Magical Root",
            "Magical Roots",
            "🌲",
            modifiers(&[(S::Fortitude, 0.2), (S::Magic, 0.1)]),
        ),
        def(
            I::GoblinTreasure,
            "Goblin Treasure",
            "Goblin Treasures",
            "💎",
            modifiers(&[(S::Subterfuge, 0.5), (S::Magic, 0.5)]),
        ),
        def(I::Fish, "Fish", "Fish", "🐟", ItemEffect::Energy(10.0)),
        def(
            I::BanditWeapons,
            "Bandit Weapon",
            "Bandit Weapons",
            "🔪",
            modifiers(&[(S::Subterfuge, 0.1), (S::Combat, 0.2)]),
        ),
        def(I::Cactus, "Cactus", "Cactuses", "🌵", modifiers(&[(S::Fortitude, 0.15)])),
        def(
            I::CityChain,
            "City Chain",
            "City Chains",
            "🔗",
            modifiers(&[(S::Charisma, 0.5), (S::Subterfuge, 0.5)]),
        ),
        def(
            I::WerewolfFur,
            "Werewolf Fur",
            "Werewolf Furs",
            "🐺",
            modifiers(&[(S::Charisma, 0.2), (S::Fortitude, 0.2)]),
        ),
        def(
            I::OasisWater,
            "Oasis Water",
            "Oasis Water",
            "💧",
            modifiers(&[(S::Magic, 0.2), (S::Fortitude, 0.1)]),
        ),
        def(I::Calamari, "Calamari", "Calamari", "🦑", ItemEffect::Energy(50.0)),
        def(
            I::MysticIncense,
            "Mystic Incense",
            "Mystic Incense",
            "🕯️",
            modifiers(&[(S::Ascension, 0.1)]),
        ),
        def(
            I::OracleBones,
            "Oracle Bone",
            "Oracle Bones",
            "🦴",
            modifiers(&[
                (S::Search, 0.2),
                (S::Magic, 0.2),
                (S::Ascension, 0.1),
                (S::Travel, 0.1),
            ]),
        ),
        def(
            I::WormHideCoat,
            "Worm Hide Coat",
            "Worm Hide Coats",
            "🧥",
            modifiers(&[(S::Fortitude, 1.0)]),
        ),
        def(
            I::DjinnLamp,
            "Djinn Lamp",
            "Djinn Lamps",
            "🧞",
            modifiers(&[(S::Ascension, 0.3), (S::Magic, 0.3)]),
        ),
        def(
            I::Dreamcatcher,
            "Dreamcatcher",
            "Dreamcatchers",
            "🕸️",
            ItemEffect::DuplicateFound,
        ),
        def(
            I::MagicEssence,
            "Magical Essence",
            "Magical Essences",
            "🌠",
            modifiers(&[(S::Magic, 4.0)]),
        ),
        def(
            I::CraftingRecipe,
            "Crafting Recipe",
            "Crafting Recipes",
            "🛠️",
            modifiers(&[(S::Crafting, 0.3)]),
        ),
        def(
            I::KnightlyBoots,
            "Knightly Boots",
            "Knightly Boots",
            "👢",
            modifiers(&[(S::Combat, 0.2), (S::Fortitude, 0.2)]),
        ),
        def(
            I::DragonScale,
            "Dragon Scale",
            "Dragon Scales",
            "🐲",
            modifiers(&[(S::Combat, 0.5), (S::Fortitude, 0.5)]),
        ),
        def(I::CaveInsects, "Cave Insect", "Cave Insects", "🦟", ItemEffect::Energy(5.0)),
        def(
            I::MagicalVessel,
            "Magical Vessel",
            "Magical Vessels",
            "🏺",
            modifiers(&[(S::Ascension, 0.3)]),
        ),
        def(I::MagicRing, "Magic Ring", "Magic Rings", "💍", ItemEffect::QueueMagicRing),
        def(
            I::BottledLightning,
            "Bottled Lightning",
            "Bottled Lightning",
            "⚡",
            ItemEffect::QueueLightning,
        ),
        def(I::HeatEssence, "Heat Essence", "Heat Essence", "🔥", modifiers(&[(S::Charisma, 1.0)])),
        def(
            I::DivineNotes,
            "Divine Note",
            "Divine Notes",
            "📜",
            modifiers(&[(S::Study, 0.3), (S::Search, 0.3), (S::Travel, 0.1)]),
        ),
        def(
            I::GriffinQuill,
            "Griffin Quill",
            "Griffin Quills",
            "🕊️",
            modifiers(&[(S::Study, 1.0)]),
        ),
        def(
            I::WingsOfShadow,
            "Wings of Shadow",
            "Wings of Shadow",
            "🦇",
            modifiers(&[(S::Ascension, 5.0), (S::Travel, 1.0)]),
        ),
        def(
            I::RitualSymbol,
            "Ritual Symbol",
            "Ritual Symbols",
            "☯️",
            modifiers(&[(S::Ascension, 1.0)]),
        ),
        def(I::Glasses, "Glasses", "Glasses", "👓", modifiers(&[(S::Search, 1.0)])),
    ]
}

/// Immutable definition for one item type.
#[must_use]
pub fn definition(item: ItemType) -> &'static ItemDefinition {
    static DEFINITIONS: OnceLock<Vec<ItemDefinition>> = OnceLock::new();
    &DEFINITIONS.get_or_init(build_definitions)[item.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn definitions_align_with_enum_order() {
        let all = build_definitions();
        assert_eq!(all.len(), ItemType::Glasses.index() + 1);
        for (idx, def) in all.iter().enumerate() {
            assert_eq!(def.item.index(), idx, "misplaced entry for {}", def.name);
        }
    }

    #[test]
    fn artifacts_are_flagged() {
        assert!(ItemType::ScrollOfHaste.is_artifact());
        assert!(ItemType::Dreamcatcher.is_artifact());
        assert!(!ItemType::Food.is_artifact());
    }

    #[test]
    fn food_items_restore_energy() {
        for (item, gain) in [
            (ItemType::Food, 5.0),
            (ItemType::Fish, 10.0),
            (ItemType::Calamari, 50.0),
            (ItemType::CaveInsects, 5.0),
        ] {
            match definition(item).effect {
                ItemEffect::Energy(base) => assert!((base - gain).abs() < f64::EPSILON),
                _ => panic!("{item:?} should be food"),
            }
        }
    }

    #[test]
    fn modifier_items_describe_their_skills() {
        let desc = definition(ItemType::Mushroom).description();
        assert_eq!(desc, "Improves Magic and Search Task speed by 20% each");
    }
}
