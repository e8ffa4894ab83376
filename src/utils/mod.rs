pub mod clock;
pub mod sql;
pub mod validate;

pub use clock::{Clock, FixedClock, SystemClock};
pub use sql::escape_like_pattern;
