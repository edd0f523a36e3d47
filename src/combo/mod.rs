pub mod record;
pub mod system;

pub use record::{ComboRecord, ComboState};
pub use system::ComboSystem;
