//! Automated player strategies.
//!
//! A policy looks at the live [`GameState`] and decides which task to click
//! next. Strategies intentionally play with different tempers so playability
//! sweeps cover grinders, rushers, and chaos monkeys alike.

use std::fmt;

use everspire_game::{GameState, TaskDefinition, TaskKind, Zone};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::Serialize;

/// A policy's answer for the current tick.
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    /// Task to activate, or `None` to stay idle this tick.
    pub task_id: Option<String>,
    /// Short human-readable justification for reports.
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub fn pick(task_id: impl Into<String>, rationale: impl Into<String>) -> Self {
        Self {
            task_id: Some(task_id.into()),
            rationale: Some(rationale.into()),
        }
    }

    #[must_use]
    pub fn idle(reason: impl Into<String>) -> Self {
        Self {
            task_id: None,
            rationale: Some(reason.into()),
        }
    }
}

/// Strategy for automated gameplay decisions.
pub trait PlayerPolicy {
    /// Stable name used in decision logs and reports.
    fn name(&self) -> &'static str;

    /// Choose the next task from the player's current zone.
    fn pick_task(&mut self, state: &GameState, zone: &Zone) -> PolicyDecision;
}

/// The named strategies the tester can field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GameplayStrategy {
    /// Grind the cheapest work available, travel last.
    Steady,
    /// Clear travel gates and move zones as fast as possible.
    Rusher,
    /// Weigh XP, items, and perks against energy cost.
    Balanced,
    /// Stockpile item-granting tasks before anything else.
    Quartermaster,
    /// Seeded uniform-random clicks, for engine robustness.
    Wildcard,
}

impl GameplayStrategy {
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::Steady,
            Self::Rusher,
            Self::Balanced,
            Self::Quartermaster,
            Self::Wildcard,
        ]
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Steady => "Steady",
            Self::Rusher => "Rusher",
            Self::Balanced => "Balanced",
            Self::Quartermaster => "Quartermaster",
            Self::Wildcard => "Wildcard",
        }
    }

    /// Build the live policy for this strategy. `seed` only matters for
    /// strategies that roll dice; the rest are fully deterministic.
    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Steady => Box::new(SteadyPolicy),
            Self::Rusher => Box::new(RusherPolicy),
            Self::Balanced => Box::new(BalancedPolicy),
            Self::Quartermaster => Box::new(QuartermasterPolicy),
            Self::Wildcard => Box::new(WildcardPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tasks the player could activate right now: enabled and not fully repped.
fn workable<'a>(state: &GameState, zone: &'a Zone) -> Vec<&'a TaskDefinition> {
    zone.tasks
        .iter()
        .filter(|def| {
            state
                .task_state(&def.id)
                .is_some_and(|task| task.enabled && task.reps < def.max_reps)
        })
        .collect()
}

fn cheapest<'a>(candidates: &[&'a TaskDefinition]) -> Option<&'a TaskDefinition> {
    candidates
        .iter()
        .copied()
        .min_by(|a, b| a.base_cost.total_cmp(&b.base_cost))
}

pub struct SteadyPolicy;

impl PlayerPolicy for SteadyPolicy {
    fn name(&self) -> &'static str {
        "steady"
    }

    fn pick_task(&mut self, state: &GameState, zone: &Zone) -> PolicyDecision {
        let candidates = workable(state, zone);
        let grind: Vec<&TaskDefinition> = candidates
            .iter()
            .copied()
            .filter(|def| def.kind != TaskKind::Travel)
            .collect();
        let pick = cheapest(&grind).or_else(|| candidates.first().copied());
        match pick {
            Some(def) => PolicyDecision::pick(&def.id, format!("cheapest at {:.0}", def.base_cost)),
            None => PolicyDecision::idle("zone exhausted"),
        }
    }
}

pub struct RusherPolicy;

impl PlayerPolicy for RusherPolicy {
    fn name(&self) -> &'static str {
        "rusher"
    }

    fn pick_task(&mut self, state: &GameState, zone: &Zone) -> PolicyDecision {
        let candidates = workable(state, zone);
        let gates: Vec<&TaskDefinition> = candidates
            .iter()
            .copied()
            .filter(|def| def.kind.gates_travel())
            .collect();
        let pick = cheapest(&gates)
            .or_else(|| {
                candidates
                    .iter()
                    .copied()
                    .find(|def| def.kind == TaskKind::Travel)
            })
            .or_else(|| candidates.first().copied());
        match pick {
            Some(def) => PolicyDecision::pick(&def.id, format!("{} first", def.kind.as_str())),
            None => PolicyDecision::idle("zone exhausted"),
        }
    }
}

pub struct BalancedPolicy;

/// Expected payout of one rep divided by its energy price.
fn balanced_value(def: &TaskDefinition) -> f64 {
    let mut payout = def.base_cost * def.xp_mult;
    if def.item.is_some() {
        payout += 15.0;
    }
    if def.perk.is_some() {
        payout += 40.0;
    }
    payout += f64::from(def.power_gain) * 2.0;
    payout += f64::from(def.attunement_gain) * 2.0;
    payout / (def.base_cost * def.energy_mult)
}

impl PlayerPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "balanced"
    }

    fn pick_task(&mut self, state: &GameState, zone: &Zone) -> PolicyDecision {
        let candidates = workable(state, zone);
        let pick = candidates
            .iter()
            .copied()
            .max_by(|a, b| balanced_value(a).total_cmp(&balanced_value(b)));
        match pick {
            Some(def) => PolicyDecision::pick(&def.id, format!("value {:.2}", balanced_value(def))),
            None => PolicyDecision::idle("zone exhausted"),
        }
    }
}

pub struct QuartermasterPolicy;

impl PlayerPolicy for QuartermasterPolicy {
    fn name(&self) -> &'static str {
        "quartermaster"
    }

    fn pick_task(&mut self, state: &GameState, zone: &Zone) -> PolicyDecision {
        let candidates = workable(state, zone);
        let stocked: Vec<&TaskDefinition> = candidates
            .iter()
            .copied()
            .filter(|def| def.item.is_some())
            .collect();
        let grind: Vec<&TaskDefinition> = candidates
            .iter()
            .copied()
            .filter(|def| def.kind != TaskKind::Travel)
            .collect();
        let pick = cheapest(&stocked)
            .or_else(|| cheapest(&grind))
            .or_else(|| candidates.first().copied());
        match pick {
            Some(def) if def.item.is_some() => PolicyDecision::pick(&def.id, "restocking"),
            Some(def) => PolicyDecision::pick(&def.id, format!("cheapest at {:.0}", def.base_cost)),
            None => PolicyDecision::idle("zone exhausted"),
        }
    }
}

pub struct WildcardPolicy {
    rng: ChaCha20Rng,
}

impl WildcardPolicy {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }
}

impl PlayerPolicy for WildcardPolicy {
    fn name(&self) -> &'static str {
        "wildcard"
    }

    fn pick_task(&mut self, state: &GameState, zone: &Zone) -> PolicyDecision {
        let candidates = workable(state, zone);
        if candidates.is_empty() {
            return PolicyDecision::idle("zone exhausted");
        }
        let index = self.rng.random_range(0..candidates.len());
        PolicyDecision::pick(&candidates[index].id, format!("roll {index}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_zone() -> (GameState, &'static Zone) {
        let state = GameState::new_game(11);
        let zone = state.zone_def().unwrap();
        (state, zone)
    }

    #[test]
    fn steady_grinds_the_cheapest_chore() {
        let (state, zone) = fresh_zone();
        let decision = SteadyPolicy.pick_task(&state, zone);
        assert_eq!(decision.task_id.as_deref(), Some("hearthvale.chores"));
    }

    #[test]
    fn rusher_clears_the_travel_gate_first() {
        let (state, zone) = fresh_zone();
        let decision = RusherPolicy.pick_task(&state, zone);
        assert_eq!(decision.task_id.as_deref(), Some("hearthvale.letters"));
    }

    #[test]
    fn balanced_chases_the_perk_payout() {
        let (state, zone) = fresh_zone();
        let decision = BalancedPolicy.pick_task(&state, zone);
        assert_eq!(decision.task_id.as_deref(), Some("hearthvale.tales"));
    }

    #[test]
    fn quartermaster_restocks_before_grinding() {
        let (state, zone) = fresh_zone();
        let decision = QuartermasterPolicy.pick_task(&state, zone);
        assert_eq!(decision.task_id.as_deref(), Some("hearthvale.chores"));
        assert_eq!(decision.rationale.as_deref(), Some("restocking"));
    }

    #[test]
    fn wildcard_always_picks_a_live_candidate() {
        let (state, zone) = fresh_zone();
        let mut policy = WildcardPolicy::new(99);
        for _ in 0..40 {
            let decision = policy.pick_task(&state, zone);
            let id = decision.task_id.expect("fresh zone has workable tasks");
            let task = state.task_state(&id).unwrap();
            assert!(task.enabled);
        }
    }

    #[test]
    fn wildcard_rolls_reproduce_for_a_seed() {
        let (state, zone) = fresh_zone();
        let mut lhs = WildcardPolicy::new(7);
        let mut rhs = WildcardPolicy::new(7);
        for _ in 0..20 {
            assert_eq!(
                lhs.pick_task(&state, zone).task_id,
                rhs.pick_task(&state, zone).task_id
            );
        }
    }
}
