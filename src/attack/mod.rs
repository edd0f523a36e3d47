pub mod chains;
pub mod definition;
pub mod demo;
pub mod input;

pub use chains::{ChainFamily, ChainTable, MoveSet};
pub use definition::{AttackDefinition, AttackLibrary, AttackPhase, AttackType};
pub use input::{BufferedInput, InputDirection, InputKind};

pub use crate::core::types::AttackId;
