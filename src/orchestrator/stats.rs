//! Actor combat stats owned by the orchestrator
//!
//! The orchestrator only tracks what hit processing needs: health, the
//! stagger meter, the faction resistance it forwards to the stun subsystem,
//! and the alive flag that makes hits on a dead defender inert.

use serde::{Deserialize, Serialize};

/// Combat stats for one actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorStats {
    pub health: f32,
    pub max_health: f32,
    /// Accumulated posture damage, capped at `stagger_cap`
    pub stagger: f32,
    pub stagger_cap: f32,
    /// Faction resistance multiplier applied to stun durations
    pub stun_resistance: f32,
    pub alive: bool,
}

impl ActorStats {
    pub fn new(max_health: f32, stagger_cap: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            stagger: 0.0,
            stagger_cap,
            stun_resistance: 1.0,
            alive: true,
        }
    }

    pub fn with_resistance(mut self, resistance: f32) -> Self {
        self.stun_resistance = resistance;
        self
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }
}
