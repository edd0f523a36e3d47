//! Chain families and ordered chain tables
//!
//! A chain is an ordered attack-id sequence reachable by repeating one input
//! type. Tables are game content; the combo subsystem only walks them.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::AttackId;

/// Chain family keyed by the input type that drives it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainFamily {
    Light,
    Heavy,
}

impl ChainFamily {
    pub fn all() -> &'static [ChainFamily] {
        &[ChainFamily::Light, ChainFamily::Heavy]
    }
}

/// Ordered attack-id sequences per chain family
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChainTable {
    chains: AHashMap<ChainFamily, Vec<AttackId>>,
}

impl ChainTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_chain(&mut self, family: ChainFamily, sequence: Vec<AttackId>) {
        self.chains.insert(family, sequence);
    }

    pub fn sequence(&self, family: ChainFamily) -> Option<&[AttackId]> {
        self.chains.get(&family).map(Vec::as_slice)
    }

    /// Opening link of a chain
    pub fn first(&self, family: ChainFamily) -> Option<AttackId> {
        self.sequence(family).and_then(|seq| seq.first().copied())
    }

    /// Index of an attack within a chain, if it is a link
    pub fn position_of(&self, family: ChainFamily, id: AttackId) -> Option<usize> {
        self.sequence(family)
            .and_then(|seq| seq.iter().position(|&link| link == id))
    }
}

/// Fixed attack ids the initiation table maps non-chain inputs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MoveSet {
    /// Resolved from an upward heavy input
    pub rising: AttackId,
    /// Resolved from a force input with any direction but Back
    pub force_push: AttackId,
    /// Resolved from a force input held Back
    pub force_pull: AttackId,
    /// Resolved from a special input
    pub special: AttackId,
}
