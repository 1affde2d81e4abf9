//! DashMap-backed keyed stores.
//!
//! In-process stand-ins for the external keyed store; they honor the same
//! atomicity contracts (an entry operation is equivalent to a scripted
//! INCR) so the core logic ports to an external backend unchanged.

pub mod session;
pub mod usage;

pub use session::MemorySessionStore;
pub use usage::MemoryUsageStore;
