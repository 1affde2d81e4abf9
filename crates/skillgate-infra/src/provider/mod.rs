//! KYC provider backends.

pub mod stripe;

pub use stripe::StripeIdentityProvider;
