//! Provider-facing configuration (data) and retry policy (behavior).
//!
//! `environment` selects which provider host the client talks to and `credentials` holds the
//! key pair sent with every call. `retry` decides which upstream failures are worth another
//! attempt and how long to wait before it.

pub mod credentials;
pub mod environment;
pub mod retry;

pub use credentials::*;
pub use environment::*;
pub use retry::*;
