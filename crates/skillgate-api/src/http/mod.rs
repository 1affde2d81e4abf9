//! HTTP/REST API layer for the Skillgate gateway.
//!
//! Axum-based REST API with bearer-key authentication, per-request trace
//! capture, tier quota enforcement, envelope response format, and CORS
//! support.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
