//! JSON request and response bodies exchanged with the provider API.

// self
use crate::{
	_prelude::*,
	client::{Product, RawTransaction},
};

/// Any request body plus the credentials every provider endpoint expects inline.
#[derive(Serialize)]
pub(crate) struct Authenticated<'a, B>
where
	B: Serialize,
{
	pub client_id: &'a str,
	pub secret: &'a str,
	#[serde(flatten)]
	pub body: &'a B,
}

#[derive(Debug, Serialize)]
pub(crate) struct LinkTokenCreateBody<'a> {
	pub client_name: &'a str,
	pub user: LinkTokenUser<'a>,
	pub products: &'a [Product],
	pub country_codes: &'a [String],
	pub language: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct LinkTokenUser<'a> {
	pub client_user_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LinkTokenCreateResponse {
	pub link_token: String,
	#[serde(default)]
	pub expiration: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PublicTokenExchangeBody<'a> {
	pub public_token: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PublicTokenExchangeResponse {
	pub access_token: String,
	pub item_id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TransactionsGetBody<'a> {
	pub access_token: &'a str,
	#[serde(with = "super::plaid_date")]
	pub start_date: Date,
	#[serde(with = "super::plaid_date")]
	pub end_date: Date,
	pub options: TransactionsGetOptions,
}

#[derive(Debug, Serialize)]
pub(crate) struct TransactionsGetOptions {
	pub count: usize,
	pub offset: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransactionsGetResponse {
	pub transactions: Vec<RawTransaction>,
	pub total_transactions: usize,
}

/// Error envelope the provider returns with every non-2xx status.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
	pub error_type: String,
	pub error_code: String,
	pub error_message: String,
	#[serde(default)]
	pub request_id: Option<String>,
}
