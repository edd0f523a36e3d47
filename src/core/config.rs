//! Combat tuning configuration with documented constants
//!
//! All timing and scaling knobs are collected here with explanations of
//! their purpose. Values can be overridden from TOML for tuning sessions.

use serde::{Deserialize, Serialize};

use crate::attack::AttackType;
use crate::core::error::{CombatError, Result};
use crate::core::types::TimeMs;
use crate::stun::StunType;

/// Tunables for the stun resolution subsystem
///
/// Durations are per stun class; minimums keep heavily resisted or scaled
/// hits from producing imperceptible sub-frame stuns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StunTuning {
    /// Class-default hitstun for light attacks (ms)
    pub hitstun_light_ms: TimeMs,
    /// Class-default hitstun for heavy attacks (ms)
    pub hitstun_heavy_ms: TimeMs,
    /// Class-default hitstun for power attacks (ms)
    pub hitstun_power_ms: TimeMs,
    /// Class-default hitstun for special attacks (ms)
    pub hitstun_special_ms: TimeMs,
    /// Hitstun never drops below this after resistance and combo scaling
    pub hitstun_min_ms: TimeMs,

    /// Class-default blockstun (ms); blocking trades damage for a short lockout
    pub blockstun_base_ms: TimeMs,
    /// Extra blockstun fraction for heavy attacks (0.2 = +20%)
    pub blockstun_heavy_bonus: f32,
    /// Blockstun floor (ms)
    pub blockstun_min_ms: TimeMs,

    /// Guard break duration (ms) - punishes a broken guard
    pub guard_break_ms: TimeMs,
    /// Guard break floor (ms)
    pub guard_break_min_ms: TimeMs,

    /// Stagger (posture break) duration (ms) - the long vulnerability window
    pub stagger_ms: TimeMs,
    /// Stagger floor (ms)
    pub stagger_min_ms: TimeMs,

    /// Force freeze duration (ms); the frozen actor is invulnerable
    pub force_freeze_ms: TimeMs,
    /// Force freeze floor (ms)
    pub force_freeze_min_ms: TimeMs,

    /// Per-consecutive-hit reduction of hitstun duration
    ///
    /// At 0.1, the fifth consecutive hit lands at 60% duration. The
    /// multiplier is floored by `combo_scaling_floor` so long combos still
    /// register.
    pub combo_scaling_rate: f32,
    /// Lower bound of the combo scaling multiplier
    pub combo_scaling_floor: f32,

    /// Fraction of hitstun that must elapse before it can be canceled
    pub hitstun_cancel_threshold: f32,
    /// Fraction of blockstun that must elapse before it can be canceled
    pub blockstun_cancel_threshold: f32,
}

impl Default for StunTuning {
    fn default() -> Self {
        Self {
            hitstun_light_ms: 150,
            hitstun_heavy_ms: 250,
            hitstun_power_ms: 300,
            hitstun_special_ms: 200,
            hitstun_min_ms: 50,
            blockstun_base_ms: 100,
            blockstun_heavy_bonus: 0.2,
            blockstun_min_ms: 30,
            guard_break_ms: 600,
            guard_break_min_ms: 400,
            stagger_ms: 1200,
            stagger_min_ms: 800,
            force_freeze_ms: 450,
            force_freeze_min_ms: 200,
            combo_scaling_rate: 0.1,
            combo_scaling_floor: 0.3,
            hitstun_cancel_threshold: 0.75,
            blockstun_cancel_threshold: 0.5,
        }
    }
}

impl StunTuning {
    /// Class-default hitstun for an attack type
    pub fn default_hitstun_ms(&self, attack_type: AttackType) -> TimeMs {
        match attack_type {
            AttackType::Light => self.hitstun_light_ms,
            AttackType::Heavy => self.hitstun_heavy_ms,
            AttackType::Power => self.hitstun_power_ms,
            AttackType::Special => self.hitstun_special_ms,
        }
    }

    /// Duration floor for a stun type
    pub fn minimum_ms(&self, stun_type: StunType) -> TimeMs {
        match stun_type {
            StunType::Hitstun => self.hitstun_min_ms,
            StunType::Blockstun => self.blockstun_min_ms,
            StunType::GuardBreak => self.guard_break_min_ms,
            StunType::Stagger => self.stagger_min_ms,
            StunType::ForceFreeze => self.force_freeze_min_ms,
        }
    }

    /// Cancel threshold for a stun type; `None` means not cancellable
    pub fn cancel_threshold(&self, stun_type: StunType) -> Option<f32> {
        match stun_type {
            StunType::Hitstun => Some(self.hitstun_cancel_threshold),
            StunType::Blockstun => Some(self.blockstun_cancel_threshold),
            StunType::GuardBreak => None,
            StunType::Stagger => None,
            StunType::ForceFreeze => None,
        }
    }
}

/// Tunables for the combo resolution subsystem
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboTuning {
    /// Buffered inputs older than this are discarded, never consumed (ms)
    pub buffer_window_ms: TimeMs,
    /// Hard cap on buffered inputs; the oldest is evicted first
    pub buffer_capacity: usize,
    /// A combo with no hit for this long is dropped (ms)
    pub drop_timeout_ms: TimeMs,
    /// Time spent in Dropped before the next update returns the actor to Idle (ms)
    pub dropped_cooldown_ms: TimeMs,
}

impl Default for ComboTuning {
    fn default() -> Self {
        Self {
            buffer_window_ms: 400,
            buffer_capacity: 8,
            drop_timeout_ms: 1500,
            dropped_cooldown_ms: 250,
        }
    }
}

/// Complete tuning for the combat core
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub stun: StunTuning,
    pub combo: ComboTuning,
}

impl CombatConfig {
    /// Parse a config from TOML; missing fields keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject tuning values the subsystems cannot work with
    pub fn validate(&self) -> Result<()> {
        let stun = &self.stun;
        if !(0.0..=1.0).contains(&stun.combo_scaling_floor) || stun.combo_scaling_floor == 0.0 {
            return Err(CombatError::InvalidConfig(
                "combo_scaling_floor must be in (0, 1]".to_string(),
            ));
        }
        if stun.combo_scaling_rate < 0.0 {
            return Err(CombatError::InvalidConfig(
                "combo_scaling_rate must be non-negative".to_string(),
            ));
        }
        for threshold in [stun.hitstun_cancel_threshold, stun.blockstun_cancel_threshold] {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(CombatError::InvalidConfig(
                    "cancel thresholds must be in [0, 1]".to_string(),
                ));
            }
        }
        let combo = &self.combo;
        if combo.buffer_window_ms == 0 {
            return Err(CombatError::InvalidConfig(
                "buffer_window_ms must be positive".to_string(),
            ));
        }
        if combo.buffer_capacity == 0 {
            return Err(CombatError::InvalidConfig(
                "buffer_capacity must be positive".to_string(),
            ));
        }
        if combo.drop_timeout_ms == 0 {
            return Err(CombatError::InvalidConfig(
                "drop_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
