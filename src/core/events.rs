//! Combat notifications and the event log
//!
//! Subsystems report what happened through an `EventSink`; they never decide
//! how the host reacts. `EventLog` is the bundled collecting sink, useful
//! for tests and post-mortem dumps.

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{ActorId, AttackId};
use crate::stun::StunType;

/// Feedback intensity for a landed hit, in fixed precedence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackTier {
    Kill,
    Critical,
    Power,
    Heavy,
    Light,
}

/// A combat notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A stun effect ran its duration out and was cleared
    StunEnded { actor: ActorId, stun_type: StunType },
    /// A running combo went too long without a hit
    ComboDropped { actor: ActorId, hits: u32 },
    /// A buffered input resolved into a follow-up attack during a cancel window
    AttackChained { actor: ActorId, attack: AttackId },
    /// A hit was fully resolved against a defender
    HitFeedback {
        attacker: ActorId,
        defender: ActorId,
        damage: f32,
        tier: FeedbackTier,
        combo_hits: u32,
    },
    /// The defender's stagger meter reached its cap
    StaggerBroken { actor: ActorId },
    /// Health reached zero
    ActorDied { actor: ActorId, killer: ActorId },
}

/// Fire-and-forget notification sink
///
/// Emission is infallible by contract. A sink that panics is a programmer
/// error in an observer; the panic propagates.
pub trait EventSink {
    fn emit(&mut self, event: CombatEvent);
}

/// Collecting sink that keeps every event in order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    pub events: Vec<CombatEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CombatEvent> {
        self.events.iter()
    }

    /// Take everything collected so far, leaving the log empty
    pub fn drain(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// JSON dump for post-mortem debugging
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.events)?)
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: CombatEvent) {
        self.events.push(event);
    }
}
