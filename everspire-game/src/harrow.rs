//! Harrow cards: late-meta purchases that trade run penalties for a
//! compounding prestige spark bonus.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::HARROW_UNLOCK_PRESTIGE_COUNT;
use crate::state::{GameState, HarrowState};

/// The ten cards of the Harrow deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HarrowCard {
    Grave,
    Eclipse,
    Serpent,
    Hourglass,
    Brittle,
    Tempest,
    Reaper,
    Frost,
    Shackled,
    Fool,
}

impl HarrowCard {
    pub const ALL: [Self; 10] = [
        Self::Grave,
        Self::Eclipse,
        Self::Serpent,
        Self::Hourglass,
        Self::Brittle,
        Self::Tempest,
        Self::Reaper,
        Self::Frost,
        Self::Shackled,
        Self::Fool,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Grave => "The Grave",
            Self::Eclipse => "The Eclipse",
            Self::Serpent => "The Serpent",
            Self::Hourglass => "The Hourglass",
            Self::Brittle => "The Brittle",
            Self::Tempest => "The Tempest",
            Self::Reaper => "The Reaper",
            Self::Frost => "The Frost",
            Self::Shackled => "The Shackled",
            Self::Fool => "The Fool",
        }
    }

    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Grave => "🪦",
            Self::Eclipse => "🌒",
            Self::Serpent => "🐍",
            Self::Hourglass => "⌛",
            Self::Brittle => "🦴",
            Self::Tempest => "⚡",
            Self::Reaper => "💀",
            Self::Frost => "❄️",
            Self::Shackled => "🔗",
            Self::Fool => "🃏",
        }
    }

    #[must_use]
    pub const fn penalty(self) -> &'static str {
        match self {
            Self::Grave => "Items retained on Energy Reset are quartered instead of halved",
            Self::Eclipse => "Lose 10% of current energy when advancing to a new zone",
            Self::Serpent => "Boss tasks cost 2x energy",
            Self::Hourglass => "Energy drain is tripled",
            Self::Brittle => "Energy gained from items is halved",
            Self::Tempest => "Minimum energy drain per task tick is 10",
            Self::Reaper => "Energy drain is doubled when above max energy",
            Self::Frost => "XP gain is reduced by 80%",
            Self::Shackled => "No skill can exceed 110% of the second-highest skill level",
            Self::Fool => "Randomly applies the penalty of another card in addition to its own",
        }
    }

    #[must_use]
    pub const fn cost(self) -> f64 {
        match self {
            Self::Grave => 125_000.0,
            Self::Eclipse => 150_000.0,
            Self::Serpent => 175_000.0,
            Self::Hourglass => 200_000.0,
            Self::Brittle => 225_000.0,
            Self::Tempest => 250_000.0,
            Self::Reaper => 275_000.0,
            Self::Frost => 300_000.0,
            Self::Shackled => 400_000.0,
            Self::Fool => 500_000.0,
        }
    }
}

impl std::fmt::Display for HarrowCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The deck opens up after enough prestiges.
#[must_use]
pub fn is_unlocked(state: &GameState) -> bool {
    state.prestige.prestige_count >= HARROW_UNLOCK_PRESTIGE_COUNT
}

/// Buy a card with divine spark. Refused before the deck unlocks, when
/// already owned, or when unaffordable.
pub fn purchase(state: &mut GameState, card: HarrowCard) -> bool {
    if !is_unlocked(state)
        || state.harrow.owned.contains(&card)
        || state.prestige.divine_spark < card.cost()
    {
        return false;
    }
    state.prestige.divine_spark -= card.cost();
    state.harrow.owned.insert(card);
    true
}

/// Toggle a card's active slot. Toggling is free until the run's first
/// worked tick locks the lineup; after that an active card can only be
/// forfeited, which gives up its spark bonus while the penalty stays on
/// for the rest of the run.
pub fn toggle(state: &mut GameState, card: HarrowCard) -> bool {
    if !state.harrow.owned.contains(&card) {
        return false;
    }
    if state.harrow.active.contains(&card) {
        if state.harrow.run_started {
            return state.harrow.forfeited.insert(card);
        }
        state.harrow.active.remove(&card);
        if card == HarrowCard::Fool {
            state.harrow.fool_selection = None;
        }
        return true;
    }
    if state.harrow.run_started {
        return false;
    }
    state.harrow.active.insert(card);
    true
}

/// Pick the card The Fool replicates for this run. Called when the first
/// worked tick locks the lineup.
pub fn roll_fool(state: &mut GameState) {
    if !state.harrow.active.contains(&HarrowCard::Fool) {
        state.harrow.fool_selection = None;
        return;
    }
    // The Fool sits last in ALL, so the prefix is the nine real penalties.
    let candidates = &HarrowCard::ALL[..9];
    if let Some(rng) = state.rng.as_mut() {
        let pick = candidates[rng.random_range(0..candidates.len())];
        state.harrow.fool_selection = Some(pick);
    }
}

/// Cards whose penalties currently apply, including The Fool's replica.
#[must_use]
pub fn effective_cards(harrow: &HarrowState) -> Vec<HarrowCard> {
    let mut cards: Vec<HarrowCard> = harrow.active.iter().copied().collect();
    if harrow.active.contains(&HarrowCard::Fool)
        && let Some(replica) = harrow.fool_selection
        && !cards.contains(&replica)
    {
        cards.push(replica);
    }
    cards
}

#[cfg(test)]
mod tests {
    use super::*;

    fn harrow_ready() -> GameState {
        let mut state = GameState::new_game(21);
        state.prestige.prestige_count = HARROW_UNLOCK_PRESTIGE_COUNT;
        state.prestige.divine_spark = 1_000_000.0;
        state
    }

    #[test]
    fn purchase_needs_the_unlock_and_the_spark() {
        let mut state = GameState::new_game(21);
        state.prestige.divine_spark = 1_000_000.0;
        assert!(!purchase(&mut state, HarrowCard::Grave));

        let mut state = harrow_ready();
        assert!(purchase(&mut state, HarrowCard::Grave));
        assert!((state.prestige.divine_spark - 875_000.0).abs() < 1e-6);
        assert!(!purchase(&mut state, HarrowCard::Grave));
    }

    #[test]
    fn toggling_locks_once_the_run_starts() {
        let mut state = harrow_ready();
        assert!(purchase(&mut state, HarrowCard::Grave));

        assert!(toggle(&mut state, HarrowCard::Grave));
        assert!(state.harrow.active.contains(&HarrowCard::Grave));
        assert!(toggle(&mut state, HarrowCard::Grave));
        assert!(state.harrow.forfeited.is_empty());

        assert!(toggle(&mut state, HarrowCard::Grave));
        state.harrow.run_started = true;
        assert!(toggle(&mut state, HarrowCard::Grave));
        assert!(state.harrow.forfeited.contains(&HarrowCard::Grave));
        // The penalty stays for the rest of the run; only the bonus is gone.
        assert!(state.harrow.penalty_active(HarrowCard::Grave));
        assert_eq!(state.harrow.bonus_card_count(), 0);
        assert!(!toggle(&mut state, HarrowCard::Grave), "forfeiting is one-shot");
    }

    #[test]
    fn unowned_cards_cannot_be_toggled() {
        let mut state = harrow_ready();
        assert!(!toggle(&mut state, HarrowCard::Fool));
    }

    #[test]
    fn fool_roll_is_seeded_and_never_picks_itself() {
        let mut first = harrow_ready();
        assert!(purchase(&mut first, HarrowCard::Fool));
        assert!(toggle(&mut first, HarrowCard::Fool));
        roll_fool(&mut first);
        let picked = first.harrow.fool_selection.unwrap();
        assert_ne!(picked, HarrowCard::Fool);

        let mut second = harrow_ready();
        assert!(purchase(&mut second, HarrowCard::Fool));
        assert!(toggle(&mut second, HarrowCard::Fool));
        roll_fool(&mut second);
        assert_eq!(second.harrow.fool_selection, Some(picked));
    }

    #[test]
    fn fool_roll_clears_when_the_fool_sits_out() {
        let mut state = harrow_ready();
        state.harrow.fool_selection = Some(HarrowCard::Frost);
        roll_fool(&mut state);
        assert_eq!(state.harrow.fool_selection, None);
    }

    #[test]
    fn effective_cards_include_the_replica_once() {
        let mut harrow = HarrowState::default();
        harrow.active.insert(HarrowCard::Fool);
        harrow.active.insert(HarrowCard::Grave);
        harrow.fool_selection = Some(HarrowCard::Frost);
        let cards = effective_cards(&harrow);
        assert_eq!(cards.len(), 3);
        assert!(cards.contains(&HarrowCard::Frost));

        harrow.fool_selection = Some(HarrowCard::Grave);
        assert_eq!(effective_cards(&harrow).len(), 2);
    }
}
