//! Route handlers.

pub mod catalog;
pub mod identity;
pub mod meta;
pub mod webhook;
