//! Per-actor stun bookkeeping
//!
//! One record per registered actor, mutated in place for the actor's whole
//! lifetime. At most one stun is active at a time; which one wins is decided
//! by the fixed priority ranking on `StunType`.

use serde::{Deserialize, Serialize};

use crate::core::types::{ActorId, TimeMs};

/// Stun effect class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StunType {
    /// Incapacitation from taking a clean hit
    Hitstun,
    /// Short lockout from guarding a hit
    Blockstun,
    /// Guard shattered, long punish window
    GuardBreak,
    /// Posture broken, the longest vulnerability window
    Stagger,
    /// Scripted freeze; the actor is also invulnerable while frozen
    ForceFreeze,
}

impl StunType {
    /// Fixed arbitration rank: Stagger > GuardBreak > ForceFreeze > Hitstun > Blockstun
    pub fn priority(&self) -> u8 {
        match self {
            StunType::Stagger => 5,
            StunType::GuardBreak => 4,
            StunType::ForceFreeze => 3,
            StunType::Hitstun => 2,
            StunType::Blockstun => 1,
        }
    }

    pub fn all() -> &'static [StunType] {
        &[
            StunType::Hitstun,
            StunType::Blockstun,
            StunType::GuardBreak,
            StunType::Stagger,
            StunType::ForceFreeze,
        ]
    }
}

/// Stun state for one actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StunRecord {
    /// Is a stun logically active? Cleared on expiry, override, or cancel
    pub active: bool,
    /// Meaningful only while `active`
    pub stun_type: StunType,
    pub started_at: TimeMs,
    pub end_at: TimeMs,
    pub duration_ms: TimeMs,
    /// Set by force freeze, cleared with the stun
    pub invulnerable: bool,
    /// Who inflicted the active stun
    pub source: Option<ActorId>,
    /// Consecutive hits taken without leaving hitstun; drives duration scaling
    pub consecutive_hits: u32,
    /// Faction resistance multiplier captured at registration
    pub resistance: f32,
}

impl StunRecord {
    pub fn new(resistance: f32) -> Self {
        Self {
            active: false,
            stun_type: StunType::Hitstun,
            started_at: 0,
            end_at: 0,
            duration_ms: 0,
            invulnerable: false,
            source: None,
            consecutive_hits: 0,
            resistance,
        }
    }

    /// Replace the active stun outright
    pub(crate) fn activate(
        &mut self,
        stun_type: StunType,
        now: TimeMs,
        duration_ms: TimeMs,
        source: ActorId,
        invulnerable: bool,
    ) {
        self.active = true;
        self.stun_type = stun_type;
        self.started_at = now;
        self.end_at = now + duration_ms;
        self.duration_ms = duration_ms;
        self.invulnerable = invulnerable;
        self.source = Some(source);
        // Leaving hitstun for any other stun type ends the consecutive run
        if stun_type != StunType::Hitstun {
            self.consecutive_hits = 0;
        }
    }

    pub(crate) fn clear(&mut self) {
        self.active = false;
        self.invulnerable = false;
        self.source = None;
        self.consecutive_hits = 0;
    }

    /// Is the stun still running at `now`? Expired-but-unswept records count
    /// as over.
    pub fn is_live_at(&self, now: TimeMs) -> bool {
        self.active && now < self.end_at
    }

    pub fn remaining_at(&self, now: TimeMs) -> TimeMs {
        if self.is_live_at(now) {
            self.end_at - now
        } else {
            0
        }
    }

    /// Fraction of the stun already served, in [0, 1]
    pub fn progress_at(&self, now: TimeMs) -> f32 {
        if !self.is_live_at(now) || self.duration_ms == 0 {
            return if self.active { 1.0 } else { 0.0 };
        }
        let elapsed = now.saturating_sub(self.started_at) as f32;
        (elapsed / self.duration_ms as f32).clamp(0.0, 1.0)
    }
}
