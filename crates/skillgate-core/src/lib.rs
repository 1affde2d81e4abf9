//! Business logic for the Skillgate gateway.
//!
//! Components live behind trait seams ([`trace::AnalyticsSink`],
//! [`ratelimit::UsageStore`], [`identity::provider::VerificationProvider`],
//! [`identity::store::SessionStore`]); concrete implementations are wired
//! in by skillgate-infra.

pub mod catalog;
pub mod identity;
pub mod ratelimit;
pub mod trace;
