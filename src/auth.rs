//! Identifiers and secret wrappers shared by the token store, the provider client, and flows.

pub mod id;
pub mod secret;

pub use id::*;
pub use secret::*;
