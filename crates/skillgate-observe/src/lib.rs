//! Observability wiring for the Skillgate gateway.

pub mod http_attrs;
pub mod tracing_setup;
