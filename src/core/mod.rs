pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use clock::{Clock, ManualClock, SteadyClock};
pub use events::{CombatEvent, EventLog, EventSink, FeedbackTier};
