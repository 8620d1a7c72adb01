//! API credentials attached to every provider call.

// self
use crate::{_prelude::*, auth::TokenSecret, error::ConfigError};

/// Client identifier + secret pair issued by the provider dashboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
	/// Public client identifier.
	pub client_id: String,
	/// Client secret; redacted in logs.
	pub secret: TokenSecret,
}
impl Credentials {
	/// Builds credentials, rejecting blank values.
	pub fn new(
		client_id: impl Into<String>,
		secret: impl Into<String>,
	) -> Result<Self, ConfigError> {
		let client_id = client_id.into();
		let secret = TokenSecret::new(secret);

		if client_id.trim().is_empty() {
			return Err(ConfigError::MissingCredential { name: "PLAID_CLIENT_ID" });
		}
		if secret.expose().trim().is_empty() {
			return Err(ConfigError::MissingCredential { name: "PLAID_SECRET" });
		}

		Ok(Self { client_id, secret })
	}
}
