//! Data models for the Creative Vault backend.
//!
//! Serialized in camelCase to match the web client.

mod document;
mod profile;
mod user;

pub use document::*;
pub use profile::*;
pub use user::*;
