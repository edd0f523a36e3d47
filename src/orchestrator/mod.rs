pub mod pipeline;
pub mod stats;

pub use pipeline::{CombatOrchestrator, DamageModel, DamageOutcome, HitReport, StaggerModel};
pub use stats::ActorStats;
