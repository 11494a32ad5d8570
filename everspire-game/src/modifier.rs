//! Additive skill-speed modifier bundles carried by consumable items.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::skill::{Skill, SkillType};

/// One additive speed effect targeting a single skill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillModifier {
    pub skill: SkillType,
    pub effect: f64,
}

/// An ordered bundle of skill modifiers. Items stack additively: consuming
/// two +100% items yields a +200% accumulator, i.e. 3x speed at level 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SkillModifierList {
    pub modifiers: SmallVec<[SkillModifier; 4]>,
}

impl SkillModifierList {
    #[must_use]
    pub fn new(entries: &[(SkillType, f64)]) -> Self {
        Self {
            modifiers: entries
                .iter()
                .map(|&(skill, effect)| SkillModifier { skill, effect })
                .collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// The same bundle scaled for consuming `stacks` units at once.
    #[must_use]
    pub fn stacked(&self, stacks: u32) -> Self {
        Self {
            modifiers: self
                .modifiers
                .iter()
                .map(|m| SkillModifier {
                    skill: m.skill,
                    effect: m.effect * f64::from(stacks),
                })
                .collect(),
        }
    }

    /// Fold every effect into the matching skill's accumulator. Callers
    /// invoke this at most once per consumed stack.
    pub fn apply(&self, skills: &mut [Skill]) {
        for modifier in &self.modifiers {
            if let Some(skill) = skills.get_mut(modifier.skill.index()) {
                skill.speed_modifier += modifier.effect;
            }
        }
    }

    /// Human-readable summary, grouping skills that share a magnitude.
    #[must_use]
    pub fn description(&self) -> String {
        let mut clauses: Vec<(f64, Vec<&'static str>)> = Vec::new();
        for modifier in &self.modifiers {
            if let Some((_, names)) = clauses
                .iter_mut()
                .find(|(effect, _)| (*effect - modifier.effect).abs() < f64::EPSILON)
            {
                names.push(modifier.skill.as_str());
            } else {
                clauses.push((modifier.effect, vec![modifier.skill.as_str()]));
            }
        }
        clauses
            .iter()
            .map(|(effect, names)| {
                format!(
                    "Improves {} Task speed by {:.0}% each",
                    join_names(names),
                    effect * 100.0
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => (*only).to_string(),
        [head @ .., last] => format!("{} and {last}", head.join(", ")),
    }
}
