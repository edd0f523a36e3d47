//! Stun application, arbitration, and expiry sweeping
//!
//! Every `apply_*` computes a duration for its stun class and hands the
//! result to one arbitration routine; the priority ranking on `StunType`
//! decides whether the incoming stun replaces, soft-extends, or loses.

use std::sync::Arc;

use ahash::AHashMap;

use crate::attack::{AttackDefinition, AttackType};
use crate::core::clock::Clock;
use crate::core::config::StunTuning;
use crate::core::events::{CombatEvent, EventSink};
use crate::core::types::{ActorId, TimeMs};
use crate::stun::record::{StunRecord, StunType};

/// Half-weighting of faction resistance for blockstun; blocking is
/// skill-gated, so resistance counts for less
const BLOCK_RESISTANCE_WEIGHT: f32 = 0.5;

/// Per-actor stun state and arbitration
pub struct StunSystem {
    clock: Arc<dyn Clock>,
    tuning: StunTuning,
    records: AHashMap<ActorId, StunRecord>,
    /// Registration order; sweeps follow it so event order is stable
    roster: Vec<ActorId>,
}

impl StunSystem {
    pub fn new(clock: Arc<dyn Clock>, tuning: StunTuning) -> Self {
        Self {
            clock,
            tuning,
            records: AHashMap::new(),
            roster: Vec::new(),
        }
    }

    /// Create the actor's record; re-registration resets it
    pub fn register_actor(&mut self, actor: ActorId, resistance: f32) {
        if self.records.insert(actor, StunRecord::new(resistance)).is_none() {
            self.roster.push(actor);
        }
    }

    pub fn unregister_actor(&mut self, actor: ActorId) {
        if self.records.remove(&actor).is_some() {
            self.roster.retain(|id| *id != actor);
        }
    }

    pub fn is_registered(&self, actor: ActorId) -> bool {
        self.records.contains_key(&actor)
    }

    /// Hitstun from a clean hit. Returns the applied duration in ms, where
    /// "applied" on a losing arbitration means the surviving remaining time.
    pub fn apply_hitstun(
        &mut self,
        actor: ActorId,
        attack: &AttackDefinition,
        source: ActorId,
    ) -> TimeMs {
        let now = self.clock.now();
        let Some(record) = self.records.get_mut(&actor) else {
            return 0;
        };

        if record.is_live_at(now) {
            if record.stun_type == StunType::Hitstun {
                record.consecutive_hits += 1;
            }
        } else {
            record.consecutive_hits = 0;
        }

        let base = attack
            .hitstun_override_ms
            .unwrap_or_else(|| self.tuning.default_hitstun_ms(attack.attack_type));
        let scaling = (1.0 - record.consecutive_hits as f32 * self.tuning.combo_scaling_rate)
            .max(self.tuning.combo_scaling_floor);
        let duration = ((base as f32 * record.resistance * scaling) as TimeMs)
            .max(self.tuning.minimum_ms(StunType::Hitstun));

        Self::arbitrate(record, actor, StunType::Hitstun, duration, source, false, now)
    }

    /// Blockstun from a guarded hit
    pub fn apply_blockstun(
        &mut self,
        actor: ActorId,
        attack: &AttackDefinition,
        source: ActorId,
    ) -> TimeMs {
        let now = self.clock.now();
        let Some(record) = self.records.get_mut(&actor) else {
            return 0;
        };

        let base = match attack.blockstun_override_ms {
            Some(override_ms) => override_ms,
            None => {
                let class_default = self.tuning.blockstun_base_ms as f32;
                match attack.attack_type {
                    AttackType::Heavy => {
                        (class_default * (1.0 + self.tuning.blockstun_heavy_bonus)) as TimeMs
                    }
                    AttackType::Light | AttackType::Power | AttackType::Special => {
                        class_default as TimeMs
                    }
                }
            }
        };
        let dampened = 1.0 + (record.resistance - 1.0) * BLOCK_RESISTANCE_WEIGHT;
        let duration = ((base as f32 * dampened) as TimeMs)
            .max(self.tuning.minimum_ms(StunType::Blockstun));

        Self::arbitrate(record, actor, StunType::Blockstun, duration, source, false, now)
    }

    /// Guard break: fixed duration
    pub fn apply_guard_break(&mut self, actor: ActorId, source: ActorId) -> TimeMs {
        self.apply_fixed(actor, source, StunType::GuardBreak, self.tuning.guard_break_ms, false)
    }

    /// Stagger (posture break): fixed duration
    pub fn apply_stagger(&mut self, actor: ActorId, source: ActorId) -> TimeMs {
        self.apply_fixed(actor, source, StunType::Stagger, self.tuning.stagger_ms, false)
    }

    /// Force freeze: fixed duration, actor is invulnerable while frozen
    pub fn apply_force_freeze(&mut self, actor: ActorId, source: ActorId) -> TimeMs {
        self.apply_fixed(actor, source, StunType::ForceFreeze, self.tuning.force_freeze_ms, true)
    }

    fn apply_fixed(
        &mut self,
        actor: ActorId,
        source: ActorId,
        stun_type: StunType,
        configured_ms: TimeMs,
        invulnerable: bool,
    ) -> TimeMs {
        let now = self.clock.now();
        let duration = configured_ms.max(self.tuning.minimum_ms(stun_type));
        let Some(record) = self.records.get_mut(&actor) else {
            return 0;
        };

        Self::arbitrate(record, actor, stun_type, duration, source, invulnerable, now)
    }

    /// Single arbitration routine shared by every apply path.
    ///
    /// Higher-or-equal priority replaces outright. Lower priority never
    /// changes the type or flags; it may only push the end time out. The
    /// returned duration on that path is a timing hint, not a statement of
    /// what is active - query the record for that.
    fn arbitrate(
        record: &mut StunRecord,
        actor: ActorId,
        incoming: StunType,
        duration_ms: TimeMs,
        source: ActorId,
        invulnerable: bool,
        now: TimeMs,
    ) -> TimeMs {
        if !record.is_live_at(now) || incoming.priority() >= record.stun_type.priority() {
            record.activate(incoming, now, duration_ms, source, invulnerable);
            tracing::debug!(?actor, ?incoming, duration_ms, "stun applied");
            return duration_ms;
        }

        let remaining = record.remaining_at(now);
        if duration_ms > remaining {
            record.end_at = now + duration_ms;
            record.duration_ms = record.end_at - record.started_at;
            tracing::debug!(?actor, current = ?record.stun_type, ?incoming, duration_ms, "stun extended");
            duration_ms
        } else {
            remaining
        }
    }

    /// Cancel the active stun if its type allows it and enough of it has
    /// been served. No-op false otherwise.
    pub fn try_cancel_stun(&mut self, actor: ActorId) -> bool {
        let now = self.clock.now();
        let Some(record) = self.records.get_mut(&actor) else {
            return false;
        };
        if !record.is_live_at(now) {
            return false;
        }
        let Some(threshold) = self.tuning.cancel_threshold(record.stun_type) else {
            return false;
        };
        let elapsed = now.saturating_sub(record.started_at) as f32;
        if elapsed >= record.duration_ms as f32 * threshold {
            record.clear();
            true
        } else {
            false
        }
    }

    /// Clear without cancel gating; for teardown and scripted resets
    pub fn clear_stun(&mut self, actor: ActorId) {
        if let Some(record) = self.records.get_mut(&actor) {
            record.clear();
        }
    }

    /// Sweep expired stuns, emitting one `StunEnded` per expiry
    pub fn update(&mut self, sink: &mut dyn EventSink) {
        let now = self.clock.now();
        for actor in &self.roster {
            if let Some(record) = self.records.get_mut(actor) {
                if record.active && now >= record.end_at {
                    let ended = record.stun_type;
                    record.clear();
                    tracing::trace!(actor = ?actor, stun_type = ?ended, "stun expired");
                    sink.emit(CombatEvent::StunEnded {
                        actor: *actor,
                        stun_type: ended,
                    });
                }
            }
        }
    }

    pub fn is_stunned(&self, actor: ActorId) -> bool {
        let now = self.clock.now();
        self.records
            .get(&actor)
            .is_some_and(|record| record.is_live_at(now))
    }

    pub fn stun_type(&self, actor: ActorId) -> Option<StunType> {
        let now = self.clock.now();
        self.records
            .get(&actor)
            .filter(|record| record.is_live_at(now))
            .map(|record| record.stun_type)
    }

    pub fn stun_remaining(&self, actor: ActorId) -> TimeMs {
        let now = self.clock.now();
        self.records
            .get(&actor)
            .map(|record| record.remaining_at(now))
            .unwrap_or(0)
    }

    /// Fraction of the active stun already served, in [0, 1]; 0 when unstunned
    pub fn stun_progress(&self, actor: ActorId) -> f32 {
        let now = self.clock.now();
        self.records
            .get(&actor)
            .filter(|record| record.is_live_at(now))
            .map(|record| record.progress_at(now))
            .unwrap_or(0.0)
    }

    pub fn is_invulnerable(&self, actor: ActorId) -> bool {
        let now = self.clock.now();
        self.records
            .get(&actor)
            .is_some_and(|record| record.is_live_at(now) && record.invulnerable)
    }

    /// Raw record access for debugging overlays
    pub fn record(&self, actor: ActorId) -> Option<&StunRecord> {
        self.records.get(&actor)
    }
}
