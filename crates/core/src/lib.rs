pub mod clock;
pub mod utils;

pub use crate::clock::{AppClock, AppTime, Clock, ManualClock};
