//! Request extractors reading what the middleware chain bound into
//! extensions.

pub mod auth;
pub mod trace;
