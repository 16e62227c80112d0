//! Common types, traits, and utilities shared across modules

pub mod errors;
pub mod locks;
pub mod traits;
pub mod types;
