//! Player-facing actions. Invalid actions are no-ops returning `false`;
//! nothing here panics on bad input.

use crate::automation::AutomationMode;
use crate::energy;
use crate::engine::EngineConfig;
use crate::event::EventKind;
use crate::harrow::{self, HarrowCard};
use crate::item::{ItemEffect, ItemType, definition};
use crate::prestige::{self, PrestigeRepeatable, PrestigeUnlock};
use crate::reset;
use crate::state::GameState;

/// Select a task to work, or deselect it when already active. Refused
/// while a reset is pending or while the task is unavailable.
pub fn click_task(state: &mut GameState, id: &str) -> bool {
    if state.is_in_energy_reset {
        return false;
    }
    if state.active_task.as_deref() == Some(id) {
        state.active_task = None;
        return true;
    }
    if !state.task_state(id).is_some_and(|task| task.enabled) {
        return false;
    }
    state.active_task = Some(String::from(id));
    true
}

/// Consume one unit of an item, or the whole stack with `use_all`.
pub fn click_item(state: &mut GameState, item: ItemType, use_all: bool) -> bool {
    if state.is_in_energy_reset {
        return false;
    }
    let available = state.item_count(item);
    if available == 0 {
        return false;
    }
    let count = if use_all { available } else { 1 };
    consume(state, item, count);
    true
}

fn consume(state: &mut GameState, item: ItemType, count: u32) {
    let taken = state.take_items(item, count);
    if taken == 0 {
        return;
    }
    match &definition(item).effect {
        ItemEffect::Modifiers(list) => list.stacked(taken).apply(&mut state.skills),
        ItemEffect::Energy(base) => {
            let gain = energy::food_energy_value(state, *base) * f64::from(taken);
            state.energy.current += gain;
        }
        ItemEffect::QueueHaste => state.queued_scrolls_of_haste += taken,
        ItemEffect::QueueMagicRing => state.queued_magic_rings += taken,
        ItemEffect::QueueLightning => state.queued_lightning += taken,
        ItemEffect::DuplicateFound => duplicate_found(state, item, taken),
    }
    state.events.push(
        state.tick,
        EventKind::UsedItem {
            item,
            count: taken,
        },
    );
}

/// Grant one copy per use of every item type found this run, except the
/// duplicating item itself.
fn duplicate_found(state: &mut GameState, source: ItemType, copies: u32) {
    let found: Vec<ItemType> = state
        .items_found_this_energy_reset
        .iter()
        .copied()
        .filter(|&item| item != source)
        .collect();
    for item in found {
        state.add_item(item, copies);
    }
}

/// Consume every held consumable, in stable item order. Artifacts are
/// skipped; their value lies in manual timing. Energy items are eaten one
/// per tick and only below max energy, so none of their value spills past
/// the cap.
pub(crate) fn auto_use_all(state: &mut GameState) {
    let held: Vec<(ItemType, u32)> = state
        .items
        .iter()
        .map(|(&item, &count)| (item, count))
        .filter(|&(item, _)| !item.is_artifact())
        .collect();
    for (item, count) in held {
        if matches!(definition(item).effect, ItemEffect::Energy(_)) {
            if state.energy.current < state.energy.max {
                consume(state, item, 1);
            }
        } else {
            consume(state, item, count);
        }
    }
}

/// Add or remove a task from the current zone's automation priority list.
pub fn toggle_automation(state: &mut GameState, id: &str) -> bool {
    if !state.automation_unlocked() || state.task_state(id).is_none() {
        return false;
    }
    let zone = state.current_zone;
    state.automation.toggle(zone, id);
    true
}

/// Switch the automation mode. Selection only runs once automation is
/// unlocked; the preference itself can be set at any time.
pub fn set_automation_mode(state: &mut GameState, mode: AutomationMode) {
    state.automation.mode = mode;
}

/// Flip whether completed reps restart automatically. Returns the new value.
pub fn toggle_repeat_tasks(state: &mut GameState) -> bool {
    state.repeat_tasks = !state.repeat_tasks;
    state.repeat_tasks
}

/// Flip item auto-use. The engine honors it once auto-use is unlocked.
/// Returns the new value.
pub fn toggle_auto_use_items(state: &mut GameState) -> bool {
    state.auto_use_items = !state.auto_use_items;
    state.auto_use_items
}

/// Apply the pending energy reset.
pub fn do_energy_reset(state: &mut GameState, cfg: &EngineConfig) -> bool {
    reset::do_energy_reset(state, cfg)
}

/// Bank divine spark and start a fresh prestige run.
pub fn do_prestige(state: &mut GameState, cfg: &EngineConfig) -> bool {
    prestige::do_prestige(state, cfg)
}

/// Buy a one-time prestige unlock.
pub fn add_prestige_unlock(state: &mut GameState, unlock: PrestigeUnlock) -> bool {
    prestige::add_unlock(state, unlock)
}

/// Buy the next level of a prestige repeatable.
pub fn increase_prestige_repeatable_level(
    state: &mut GameState,
    repeatable: PrestigeRepeatable,
) -> bool {
    prestige::raise_repeatable(state, repeatable)
}

/// Buy a Harrow card with divine spark.
pub fn purchase_harrow_card(state: &mut GameState, card: HarrowCard) -> bool {
    harrow::purchase(state, card)
}

/// Toggle a Harrow card's active slot, honoring the run lifecycle.
pub fn toggle_harrow_card(state: &mut GameState, card: HarrowCard) -> bool {
    harrow::toggle(state, card)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FLOAT_EPSILON;
    use crate::perk::PerkType;
    use crate::skill::SkillType;

    #[test]
    fn click_task_selects_then_deselects() {
        let mut state = GameState::new_game(1);
        assert!(click_task(&mut state, "hearthvale.chores"));
        assert_eq!(state.active_task.as_deref(), Some("hearthvale.chores"));
        assert!(click_task(&mut state, "hearthvale.chores"));
        assert!(state.active_task.is_none());
    }

    #[test]
    fn click_task_refuses_gated_travel() {
        let mut state = GameState::new_game(1);
        assert!(!click_task(&mut state, "hearthvale.travel"));
        assert!(state.active_task.is_none());
    }

    #[test]
    fn clicks_are_frozen_while_a_reset_is_pending() {
        let mut state = GameState::new_game(1);
        state.items.insert(ItemType::Food, 3);
        state.is_in_energy_reset = true;
        assert!(!click_task(&mut state, "hearthvale.chores"));
        assert!(!click_item(&mut state, ItemType::Food, false));
    }

    #[test]
    fn food_can_overfill_the_energy_pool() {
        let mut state = GameState::new_game(1);
        state.items.insert(ItemType::Food, 2);
        state.energy.current = 95.0;
        assert!(click_item(&mut state, ItemType::Food, true));
        assert!((state.energy.current - 105.0).abs() < FLOAT_EPSILON);
        assert_eq!(state.item_count(ItemType::Food), 0);
    }

    #[test]
    fn scrolls_queue_one_charge_per_unit() {
        let mut state = GameState::new_game(1);
        state.items.insert(ItemType::ScrollOfHaste, 2);
        assert!(click_item(&mut state, ItemType::ScrollOfHaste, true));
        assert_eq!(state.queued_scrolls_of_haste, 2);
        assert!(
            state.events.iter().any(|event| {
                event.kind
                    == EventKind::UsedItem {
                        item: ItemType::ScrollOfHaste,
                        count: 2,
                    }
            })
        );
        assert!(!click_item(&mut state, ItemType::ScrollOfHaste, false));
    }

    #[test]
    fn modifier_items_stack_into_skill_accumulators() {
        let mut state = GameState::new_game(1);
        state.items.insert(ItemType::Arrow, 3);
        assert!(click_item(&mut state, ItemType::Arrow, true));
        assert!(
            (state.skill(SkillType::Combat).speed_modifier - 0.45).abs() < FLOAT_EPSILON
        );
    }

    #[test]
    fn dreamcatcher_copies_everything_found_but_itself() {
        let mut state = GameState::new_game(1);
        state.add_item(ItemType::Food, 1);
        state.add_item(ItemType::Coin, 2);
        state.add_item(ItemType::Dreamcatcher, 1);
        assert!(click_item(&mut state, ItemType::Dreamcatcher, false));
        assert_eq!(state.item_count(ItemType::Food), 2);
        assert_eq!(state.item_count(ItemType::Coin), 3);
        assert_eq!(state.item_count(ItemType::Dreamcatcher), 0);
    }

    #[test]
    fn auto_use_consumes_everything_but_artifacts() {
        let mut state = GameState::new_game(1);
        state.items.insert(ItemType::Coin, 2);
        state.items.insert(ItemType::ScrollOfHaste, 3);
        auto_use_all(&mut state);
        assert_eq!(state.item_count(ItemType::Coin), 0);
        assert_eq!(state.item_count(ItemType::ScrollOfHaste), 3);
        assert!((state.skill(SkillType::Charisma).speed_modifier - 0.4).abs() < FLOAT_EPSILON);
        assert_eq!(state.queued_scrolls_of_haste, 0);
    }

    #[test]
    fn auto_use_drip_feeds_food_below_max() {
        let mut state = GameState::new_game(1);
        state.items.insert(ItemType::Food, 3);

        // Full pool: food is left alone.
        auto_use_all(&mut state);
        assert_eq!(state.item_count(ItemType::Food), 3);

        // Below max: exactly one unit per pass.
        state.energy.current = 80.0;
        auto_use_all(&mut state);
        assert_eq!(state.item_count(ItemType::Food), 2);
        assert!((state.energy.current - 85.0).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn automation_edits_need_the_unlock() {
        let mut state = GameState::new_game(1);
        assert!(!toggle_automation(&mut state, "hearthvale.chores"));
        state.perks_owned.insert(PerkType::Amulet);
        assert!(toggle_automation(&mut state, "hearthvale.chores"));
        assert!(!toggle_automation(&mut state, "nowhere.nothing"));
        assert!(
            state
                .automation
                .priority_list(0)
                .contains(&String::from("hearthvale.chores"))
        );
    }

    #[test]
    fn preference_toggles_report_the_new_value() {
        let mut state = GameState::new_game(1);
        assert!(!toggle_repeat_tasks(&mut state));
        assert!(toggle_repeat_tasks(&mut state));
        assert!(toggle_auto_use_items(&mut state));
        set_automation_mode(&mut state, AutomationMode::All);
        assert_eq!(state.automation.mode, AutomationMode::All);
    }
}
