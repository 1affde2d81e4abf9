//! REST application layer for the Skillgate gateway.
//!
//! Exposed as a library so integration tests can build the full router
//! and drive it in-process; the `skillgate` binary wires the same pieces
//! in `main.rs`.

pub mod http;
pub mod state;
