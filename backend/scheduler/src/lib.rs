pub mod clock;
pub mod tick;

pub use clock::{Clock, SystemClock, Timer, VirtualClock};
pub use tick::TickSchedule;
