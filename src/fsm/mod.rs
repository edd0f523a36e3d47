pub mod machine;

pub use machine::{StateDef, StateMachine};
