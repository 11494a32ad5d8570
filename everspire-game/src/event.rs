//! Structured render events emitted by the tick engine.
//!
//! The engine never draws anything itself. It pushes typed events into a
//! queue that the rendering collaborator drains once per frame; milestone
//! moments additionally land in `state.logs` as stable log keys.

use serde::{Deserialize, Serialize};

use crate::item::ItemType;
use crate::perk::PerkType;
use crate::skill::SkillType;

/// Stable, deterministic identifier for a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    /// Tick counter when the event occurred.
    pub tick: u64,
    /// Per-tick sequence number (0-based) within the emitted stream.
    pub seq: u16,
}

impl EventId {
    #[must_use]
    pub const fn new(tick: u64, seq: u16) -> Self {
        Self { tick, seq }
    }
}

/// Mechanical event kind emitted by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TaskCompleted {
        task: String,
        reps_done: u32,
    },
    GainedItem {
        item: ItemType,
        count: u32,
    },
    UsedItem {
        item: ItemType,
        count: u32,
    },
    SkillUp {
        skill: SkillType,
        levels_gained: u32,
        new_level: u32,
    },
    GainedPerk {
        perk: PerkType,
    },
    UnlockedTask {
        task: String,
    },
    UnlockedSkill {
        skill: SkillType,
    },
    UnlockedPower,
    PrestigeAvailable,
    EnergyDepleted,
    EnergyResetApplied,
    PrestigeApplied,
    ZoneAdvanced {
        zone: u32,
    },
    EndOfContent,
    HarrowUnlocked,
}

/// Severity tier for a simulation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    Info,
    Warning,
    Critical,
}

/// Hint for how the UI should surface an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiSurfaceHint {
    Log,
    Toast,
    Modal,
}

/// Structured event emitted by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub kind: EventKind,
    pub severity: EventSeverity,
    /// Optional UI guidance for surfacing the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_surface_hint: Option<UiSurfaceHint>,
}

impl Event {
    #[must_use]
    pub fn new(id: EventId, kind: EventKind) -> Self {
        let severity = severity_for(&kind);
        let ui_surface_hint = Some(surface_for(&kind));
        Self {
            id,
            kind,
            severity,
            ui_surface_hint,
        }
    }
}

const fn severity_for(kind: &EventKind) -> EventSeverity {
    match kind {
        EventKind::EnergyDepleted => EventSeverity::Critical,
        EventKind::PrestigeAvailable | EventKind::EndOfContent | EventKind::HarrowUnlocked => {
            EventSeverity::Warning
        }
        _ => EventSeverity::Info,
    }
}

const fn surface_for(kind: &EventKind) -> UiSurfaceHint {
    match kind {
        EventKind::EnergyDepleted | EventKind::EnergyResetApplied | EventKind::PrestigeApplied => {
            UiSurfaceHint::Modal
        }
        EventKind::TaskCompleted { .. }
        | EventKind::GainedItem { .. }
        | EventKind::UsedItem { .. }
        | EventKind::UnlockedTask { .. } => UiSurfaceHint::Log,
        _ => UiSurfaceHint::Toast,
    }
}

/// Engine-owned accumulation queue, drained by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EventQueue {
    events: Vec<Event>,
    #[serde(default)]
    next_seq: u16,
}

impl EventQueue {
    /// Push an event stamped with the given tick. Sequence numbers restart
    /// whenever the tick advances.
    pub fn push(&mut self, tick: u64, kind: EventKind) {
        if self.events.last().is_some_and(|last| last.id.tick != tick) {
            self.next_seq = 0;
        }
        let id = EventId::new(tick, self.next_seq);
        self.next_seq = self.next_seq.saturating_add(1);
        self.events.push(Event::new(id, kind));
    }

    /// Take every accumulated event, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Event> {
        self.next_seq = 0;
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }
}

impl<'a> IntoIterator for &'a EventQueue {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_up_roundtrips_with_stable_id() {
        let id = EventId::new(42, 1);
        let event = Event::new(
            id,
            EventKind::SkillUp {
                skill: SkillType::Magic,
                levels_gained: 2,
                new_level: 7,
            },
        );

        assert_eq!(event.id, id);
        assert_eq!(event.severity, EventSeverity::Info);
        assert_eq!(event.ui_surface_hint, Some(UiSurfaceHint::Toast));

        let json = serde_json::to_string(&event).expect("serialize");
        let restored: Event = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, event);
    }

    #[test]
    fn queue_drains_to_empty_and_restarts_sequences() {
        let mut queue = EventQueue::default();
        queue.push(1, EventKind::UnlockedPower);
        queue.push(1, EventKind::PrestigeAvailable);
        queue.push(2, EventKind::EndOfContent);

        let drained = queue.drain();
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[0].id, EventId::new(1, 0));
        assert_eq!(drained[1].id, EventId::new(1, 1));
        assert_eq!(drained[2].id, EventId::new(2, 0));
        assert!(queue.is_empty());

        queue.push(3, EventKind::UnlockedPower);
        assert_eq!(queue.iter().next().map(|e| e.id), Some(EventId::new(3, 0)));
    }

    #[test]
    fn depleted_energy_is_critical_and_modal() {
        let event = Event::new(EventId::new(9, 0), EventKind::EnergyDepleted);
        assert_eq!(event.severity, EventSeverity::Critical);
        assert_eq!(event.ui_surface_hint, Some(UiSurfaceHint::Modal));
    }
}
