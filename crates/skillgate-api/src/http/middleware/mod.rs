//! Request middleware: trace capture (outermost) and the auth/rate-limit
//! gate chain.

pub mod gate;
pub mod trace;
