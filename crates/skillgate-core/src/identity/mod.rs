//! Identity-verification service, webhook dispatch, and the provider seam.

pub mod dispatcher;
pub mod provider;
pub mod saudi_id;
pub mod service;
pub mod store;

pub use service::{IdentityVerificationService, NewSessionInput};
