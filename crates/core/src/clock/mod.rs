mod clock;
mod manual;
mod time;


pub use self::clock::{AppClock, Clock};
pub use self::manual::ManualClock;
pub use self::time::AppTime;
