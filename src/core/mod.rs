//! Core types - concurrency primitives shared across the codebase.

mod cancel;
mod clock;
mod group;
mod shutdown;

pub use cancel::{CancelToken, Cancelled};
pub use clock::{Clock, FixedClock, SystemClock};
pub use group::TaskGroup;
pub use shutdown::setup_shutdown_handler;
