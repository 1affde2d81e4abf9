//! Shared domain types for the Skillgate gateway.
//!
//! This crate contains the core domain types used across the gateway:
//! Principal, Tier, VerificationSession, WebhookEvent, catalog data, and
//! the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod catalog;
pub mod config;
pub mod error;
pub mod identity;
pub mod principal;
