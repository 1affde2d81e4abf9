//! Infrastructure implementations for the Skillgate gateway.
//!
//! Concrete ends of the core trait seams: the reqwest KYC provider
//! client, webhook signature verification, DashMap-backed keyed stores,
//! the analytics sink, and the configuration loader.

pub mod analytics;
pub mod config;
pub mod provider;
pub mod store;
pub mod webhook;
