pub mod error;
pub mod event;
pub mod state;

pub use error::{PowerBarError, Result};
pub use event::PowerEvent;
pub use state::{BatteryState, FormattedSummary, StateTag};
