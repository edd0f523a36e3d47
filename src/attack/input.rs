//! Player input vocabulary consumed by the combo subsystem

use serde::{Deserialize, Serialize};

use crate::attack::chains::ChainFamily;
use crate::core::types::TimeMs;

/// Input button class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    Light,
    Heavy,
    Force,
    Special,
}

impl InputKind {
    /// Chain family this input continues, if any
    pub fn chain_family(&self) -> Option<ChainFamily> {
        match self {
            InputKind::Light => Some(ChainFamily::Light),
            InputKind::Heavy => Some(ChainFamily::Heavy),
            InputKind::Force => None,
            InputKind::Special => None,
        }
    }
}

/// Directional modifier held with the input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum InputDirection {
    #[default]
    Neutral,
    Up,
    Down,
    Back,
    Forward,
}

/// A timestamped input waiting in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferedInput {
    pub kind: InputKind,
    pub direction: InputDirection,
    pub at: TimeMs,
}
