//! Shared flow parameters and constants.

// self
use crate::{
	_prelude::*,
	auth::ClientUserId,
	client::{LinkTokenRequest, Product},
};

/// Days of history covered by the transaction roll-up, ending today.
pub const TRANSACTION_WINDOW_DAYS: u16 = 30;
/// Confirmation returned after a successful public-token exchange.
pub const LINK_COMPLETED_MESSAGE: &str = "Successfully connected bank account";
/// Application name shown inside the linking UI by default.
pub const DEFAULT_CLIENT_NAME: &str = "Plaid Rust Frontend";

/// Fixed parameters declared on every link-token request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkSettings {
	/// End user the link token is minted for.
	pub user_id: ClientUserId,
	/// Application name shown inside the linking UI.
	pub client_name: String,
	/// Products requested for new items.
	pub products: Vec<Product>,
	/// Countries whose institutions are offered.
	pub country_codes: Vec<String>,
	/// Display language of the linking UI.
	pub language: String,
}
impl LinkSettings {
	/// Overrides the client display name.
	pub fn with_client_name(mut self, client_name: impl Into<String>) -> Self {
		self.client_name = client_name.into();

		self
	}

	/// Builds the provider request these settings describe.
	pub fn link_token_request(&self) -> LinkTokenRequest {
		LinkTokenRequest {
			user_id: self.user_id.clone(),
			client_name: self.client_name.clone(),
			products: self.products.clone(),
			country_codes: self.country_codes.clone(),
			language: self.language.clone(),
		}
	}
}
impl Default for LinkSettings {
	fn default() -> Self {
		Self {
			user_id: ClientUserId::demo(),
			client_name: DEFAULT_CLIENT_NAME.into(),
			products: vec![Product::Transactions],
			country_codes: vec!["US".into()],
			language: "en".into(),
		}
	}
}
