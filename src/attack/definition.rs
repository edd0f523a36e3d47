//! Attack definitions and the attack lookup table
//!
//! Attack data is immutable and supplied by game content. The combat core
//! only reads timing windows, cancel permissions, and class tags from it.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::attack::chains::ChainFamily;
use crate::core::types::{AttackId, TimeMs};

/// Attack class tag
///
/// Closed on purpose: every dispatch site matches exhaustively, so adding a
/// class is a compile-time-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackType {
    Light,
    Heavy,
    Power,
    Special,
}

/// Timing phase of an attack in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttackPhase {
    /// Windup before the hitbox goes live
    Startup,
    /// Hitbox live
    Active,
    /// Winding down, cancellable
    Recovery,
    /// Total duration elapsed
    Done,
}

/// Immutable attack data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackDefinition {
    pub id: AttackId,
    pub name: String,
    pub attack_type: AttackType,
    pub startup_ms: TimeMs,
    pub active_ms: TimeMs,
    pub recovery_ms: TimeMs,
    /// Replaces the class-default hitstun when present
    pub hitstun_override_ms: Option<TimeMs>,
    /// Replaces the class-default blockstun when present
    pub blockstun_override_ms: Option<TimeMs>,
    /// Attack ids this attack may cancel into
    pub cancels_into: AHashSet<AttackId>,
    /// Chain family this attack belongs to, if any
    pub chain_family: Option<ChainFamily>,
}

impl AttackDefinition {
    pub fn new(
        id: AttackId,
        name: impl Into<String>,
        attack_type: AttackType,
        startup_ms: TimeMs,
        active_ms: TimeMs,
        recovery_ms: TimeMs,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            attack_type,
            startup_ms,
            active_ms,
            recovery_ms,
            hitstun_override_ms: None,
            blockstun_override_ms: None,
            cancels_into: AHashSet::new(),
            chain_family: None,
        }
    }

    pub fn with_cancels(mut self, ids: impl IntoIterator<Item = AttackId>) -> Self {
        self.cancels_into = ids.into_iter().collect();
        self
    }

    pub fn with_chain(mut self, family: ChainFamily) -> Self {
        self.chain_family = Some(family);
        self
    }

    pub fn with_hitstun_override(mut self, ms: TimeMs) -> Self {
        self.hitstun_override_ms = Some(ms);
        self
    }

    pub fn with_blockstun_override(mut self, ms: TimeMs) -> Self {
        self.blockstun_override_ms = Some(ms);
        self
    }

    pub fn total_ms(&self) -> TimeMs {
        self.startup_ms + self.active_ms + self.recovery_ms
    }

    /// Phase at a given elapsed time since the attack started
    pub fn phase_at(&self, elapsed_ms: TimeMs) -> AttackPhase {
        if elapsed_ms < self.startup_ms {
            AttackPhase::Startup
        } else if elapsed_ms < self.startup_ms + self.active_ms {
            AttackPhase::Active
        } else if elapsed_ms < self.total_ms() {
            AttackPhase::Recovery
        } else {
            AttackPhase::Done
        }
    }

    pub fn can_cancel_into(&self, id: AttackId) -> bool {
        self.cancels_into.contains(&id)
    }

    /// A terminal attack ends its string: it names nothing to cancel into
    pub fn is_terminal(&self) -> bool {
        self.cancels_into.is_empty()
    }
}

/// Attack lookup table: id -> definition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttackLibrary {
    attacks: AHashMap<AttackId, AttackDefinition>,
}

impl AttackLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, replacing any previous one with the same id
    pub fn insert(&mut self, attack: AttackDefinition) {
        self.attacks.insert(attack.id, attack);
    }

    pub fn get(&self, id: AttackId) -> Option<&AttackDefinition> {
        self.attacks.get(&id)
    }

    pub fn contains(&self, id: AttackId) -> bool {
        self.attacks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.attacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attacks.is_empty()
    }
}
