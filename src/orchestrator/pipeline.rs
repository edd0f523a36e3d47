//! Per-frame combat pipeline
//!
//! The orchestrator consumes the frame's hit-detection results in list
//! order, asks the external damage/stagger calculators what each hit is
//! worth, applies the results to the stats table and the stun/combo
//! subsystems, and emits exactly one feedback notification per processed
//! hit. Subsystem updates run first so cancellation state is settled before
//! new hits land.

use std::sync::Arc;

use ahash::AHashMap;

use crate::attack::{AttackDefinition, AttackLibrary, AttackType, ChainTable, MoveSet};
use crate::combo::ComboSystem;
use crate::core::clock::Clock;
use crate::core::config::CombatConfig;
use crate::core::events::{CombatEvent, EventSink, FeedbackTier};
use crate::core::types::{ActorId, AttackId};
use crate::orchestrator::stats::ActorStats;
use crate::stun::StunSystem;

/// One hit-detection result, delivered by the external overlap tester
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitReport {
    pub attacker: ActorId,
    pub defender: ActorId,
    pub attack: AttackId,
}

/// What the external damage calculator decided a hit is worth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    pub damage: f32,
    pub knockback: f32,
    pub critical: bool,
    pub damage_type: AttackType,
    pub blocked: bool,
}

/// External damage calculator; pure, only the result shape is contractual
pub trait DamageModel {
    fn assess(
        &self,
        attack: &AttackDefinition,
        attacker: &ActorStats,
        defender: &ActorStats,
        combo_hits: u32,
    ) -> DamageOutcome;
}

/// External stagger calculator; returns the posture delta for a hit
pub trait StaggerModel {
    fn assess(
        &self,
        attack: &AttackDefinition,
        attacker: &ActorStats,
        defender: &ActorStats,
    ) -> f32;
}

/// Drives the per-frame pipeline over the stun and combo subsystems
pub struct CombatOrchestrator {
    library: Arc<AttackLibrary>,
    stun: StunSystem,
    combo: ComboSystem,
    damage_model: Box<dyn DamageModel>,
    stagger_model: Box<dyn StaggerModel>,
    stats: AHashMap<ActorId, ActorStats>,
    roster: Vec<ActorId>,
}

impl CombatOrchestrator {
    pub fn new(
        clock: Arc<dyn Clock>,
        library: Arc<AttackLibrary>,
        config: CombatConfig,
        chains: ChainTable,
        moves: MoveSet,
        damage_model: Box<dyn DamageModel>,
        stagger_model: Box<dyn StaggerModel>,
    ) -> Self {
        let stun = StunSystem::new(Arc::clone(&clock), config.stun);
        let combo = ComboSystem::new(
            Arc::clone(&clock),
            config.combo,
            Arc::clone(&library),
            chains,
            moves,
        );
        Self {
            library,
            stun,
            combo,
            damage_model,
            stagger_model,
            stats: AHashMap::new(),
            roster: Vec::new(),
        }
    }

    /// Register an actor everywhere; re-registration resets its state
    pub fn register_actor(&mut self, actor: ActorId, stats: ActorStats) {
        self.stun.register_actor(actor, stats.stun_resistance);
        self.combo.register_actor(actor);
        if self.stats.insert(actor, stats).is_none() {
            self.roster.push(actor);
        }
    }

    pub fn unregister_actor(&mut self, actor: ActorId) {
        self.stun.unregister_actor(actor);
        self.combo.unregister_actor(actor);
        if self.stats.remove(&actor).is_some() {
            self.roster.retain(|id| *id != actor);
        }
    }

    /// One frame: stun sweep, combo advancement, then this frame's hits in
    /// list order
    pub fn frame(&mut self, hits: &[HitReport], sink: &mut dyn EventSink) {
        self.stun.update(sink);
        self.combo.update(sink);
        self.process_hits(hits, sink);
    }

    /// Process hit-detection results strictly in list order
    pub fn process_hits(&mut self, hits: &[HitReport], sink: &mut dyn EventSink) {
        for hit in hits {
            self.process_hit(*hit, sink);
        }
    }

    fn process_hit(&mut self, hit: HitReport, sink: &mut dyn EventSink) {
        let Some(attack) = self.library.get(hit.attack) else {
            tracing::warn!(attack = ?hit.attack, "hit references unknown attack");
            return;
        };
        let Some(attacker_stats) = self.stats.get(&hit.attacker).cloned() else {
            tracing::warn!(actor = ?hit.attacker, "hit from unregistered attacker");
            return;
        };
        let Some(defender_stats) = self.stats.get(&hit.defender).cloned() else {
            tracing::warn!(actor = ?hit.defender, "hit on unregistered defender");
            return;
        };
        // Hits on a dead defender are inert
        if !defender_stats.alive {
            return;
        }

        // (1) and (2): ask the external calculators
        let combo_hits = self.combo.hit_count(hit.attacker);
        let outcome = self
            .damage_model
            .assess(attack, &attacker_stats, &defender_stats, combo_hits);
        let stagger_delta = self
            .stagger_model
            .assess(attack, &attacker_stats, &defender_stats);

        // (3) apply health and capped stagger
        let (killed, stagger_broken);
        {
            let Some(defender) = self.stats.get_mut(&hit.defender) else {
                return;
            };
            defender.health = (defender.health - outcome.damage).max(0.0);
            defender.stagger = (defender.stagger + stagger_delta).min(defender.stagger_cap);
            stagger_broken = defender.stagger_cap > 0.0 && defender.stagger >= defender.stagger_cap;
            killed = defender.health <= 0.0;
            if killed {
                defender.alive = false;
            }
            if stagger_broken {
                defender.stagger = 0.0;
            }
        }

        // (4) stun: blockstun for a guarded hit, hitstun otherwise
        if outcome.blocked {
            self.stun.apply_blockstun(hit.defender, attack, hit.attacker);
        } else {
            self.stun.apply_hitstun(hit.defender, attack, hit.attacker);
        }

        // (5) the attacker's combo keeps running
        self.combo.register_hit(hit.attacker);
        let resulting_combo = self.combo.hit_count(hit.attacker);

        // (6) one feedback notification per processed hit
        let tier = Self::classify(killed, &outcome);
        sink.emit(CombatEvent::HitFeedback {
            attacker: hit.attacker,
            defender: hit.defender,
            damage: outcome.damage,
            tier,
            combo_hits: resulting_combo,
        });

        // (7) posture break: notify, zero the meter, force the stagger stun
        if stagger_broken {
            sink.emit(CombatEvent::StaggerBroken { actor: hit.defender });
            self.stun.apply_stagger(hit.defender, hit.attacker);
        }

        // (8) exactly one death notification
        if killed {
            tracing::debug!(actor = ?hit.defender, killer = ?hit.attacker, "actor died");
            sink.emit(CombatEvent::ActorDied {
                actor: hit.defender,
                killer: hit.attacker,
            });
        }
    }

    /// Fixed precedence: kill > critical > power > heavy > light
    fn classify(killed: bool, outcome: &DamageOutcome) -> FeedbackTier {
        if killed {
            FeedbackTier::Kill
        } else if outcome.critical {
            FeedbackTier::Critical
        } else {
            match outcome.damage_type {
                AttackType::Power | AttackType::Special => FeedbackTier::Power,
                AttackType::Heavy => FeedbackTier::Heavy,
                AttackType::Light => FeedbackTier::Light,
            }
        }
    }

    pub fn stun(&self) -> &StunSystem {
        &self.stun
    }

    pub fn stun_mut(&mut self) -> &mut StunSystem {
        &mut self.stun
    }

    pub fn combo(&self) -> &ComboSystem {
        &self.combo
    }

    pub fn combo_mut(&mut self) -> &mut ComboSystem {
        &mut self.combo
    }

    pub fn stats(&self, actor: ActorId) -> Option<&ActorStats> {
        self.stats.get(&actor)
    }
}
