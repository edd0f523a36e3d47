//! Per-actor combo bookkeeping
//!
//! One record per registered actor, alive for the actor's lifetime. Dropping
//! a combo clears the counters and chain positions atomically with the state
//! change to Dropped.

use std::collections::VecDeque;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::attack::chains::ChainFamily;
use crate::attack::input::BufferedInput;
use crate::core::types::{AttackId, TimeMs};

/// Combo lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ComboState {
    #[default]
    Idle,
    /// An attack is running its startup/active window
    Attacking,
    /// Post-active window where a buffered input may chain
    CancelWindow,
    /// Combo timed out; returns to Idle after a short cooldown
    Dropped,
}

/// Combo state for one actor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComboRecord {
    pub state: ComboState,
    pub hit_count: u32,
    pub current_attack: Option<AttackId>,
    pub attack_started_at: TimeMs,
    pub last_hit_at: TimeMs,
    pub dropped_at: TimeMs,
    pub cancel_available: bool,
    pub(crate) chain_positions: AHashMap<ChainFamily, usize>,
    pub(crate) buffer: VecDeque<BufferedInput>,
}

impl ComboRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position reached in a chain family, if any link has been used
    pub fn chain_position(&self, family: ChainFamily) -> Option<usize> {
        self.chain_positions.get(&family).copied()
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Combo timed out: counters and chain positions go together with the
    /// state change
    pub(crate) fn drop_combo(&mut self, now: TimeMs) {
        self.state = ComboState::Dropped;
        self.hit_count = 0;
        self.current_attack = None;
        self.cancel_available = false;
        self.dropped_at = now;
        self.chain_positions.clear();
    }

    /// Full reset back to Idle
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
