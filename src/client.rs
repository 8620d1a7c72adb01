//! Remote aggregation client contract.
//!
//! [`AggregationClient`] is the broker's only dependency on the provider. Flows hold it behind
//! an `Arc` and never see HTTP details; [`PlaidClient`] is the production implementation and
//! tests substitute scripted clients.

pub mod plaid;

mod wire;

pub use plaid::*;

// self
use crate::{
	_prelude::*,
	auth::{ClientUserId, ItemId, TokenSecret},
	error::UpstreamError,
};

time::serde::format_description!(pub(crate) plaid_date, Date, "[year]-[month]-[day]");

/// Boxed future returned by [`AggregationClient`] operations.
pub type ClientFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, UpstreamError>> + 'a + Send>>;

/// The three provider operations the broker consumes.
///
/// Implementations must be `Send + Sync + 'static` so a single client can be shared by every
/// in-flight request, and their futures must be `Send` so handlers can hop executors.
pub trait AggregationClient
where
	Self: 'static + Send + Sync,
{
	/// Creates a short-lived link token used to initialize the hosted linking UI.
	fn create_link_token<'a>(&'a self, request: &'a LinkTokenRequest)
	-> ClientFuture<'a, LinkToken>;

	/// Exchanges a one-time public token for a durable access token and its item identifier.
	fn exchange_public_token<'a>(
		&'a self,
		public_token: &'a TokenSecret,
	) -> ClientFuture<'a, TokenExchange>;

	/// Fetches every transaction inside `window` for the item behind `access_token`, in
	/// provider order.
	fn get_transactions<'a>(
		&'a self,
		access_token: &'a TokenSecret,
		window: TransactionWindow,
	) -> ClientFuture<'a, Vec<RawTransaction>>;
}

/// Products a link token can request access to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
	/// Transaction history.
	Transactions,
}

/// Parameters for [`AggregationClient::create_link_token`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkTokenRequest {
	/// End user driving the linking UI.
	pub user_id: ClientUserId,
	/// Application name shown inside the linking UI.
	pub client_name: String,
	/// Products requested for the new item.
	pub products: Vec<Product>,
	/// ISO-3166 country codes whose institutions are offered.
	pub country_codes: Vec<String>,
	/// Display language of the linking UI.
	pub language: String,
}

/// Link token issued by the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkToken {
	/// Opaque token handed to the linking UI.
	pub link_token: String,
	/// Provider-reported expiry timestamp, when supplied.
	pub expiration: Option<String>,
}

/// Outcome of a successful public-token exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenExchange {
	/// Durable credential for the new item.
	pub access_token: TokenSecret,
	/// Identifier of the new item.
	pub item_id: ItemId,
}

/// Inclusive calendar-date range used for transaction fetches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransactionWindow {
	/// First day included.
	pub start: Date,
	/// Last day included.
	pub end: Date,
}
impl TransactionWindow {
	/// Builds the window spanning `days` days and ending on `end`.
	pub fn trailing(end: Date, days: u16) -> Self {
		let start = end.checked_sub(Duration::days(i64::from(days))).unwrap_or(Date::MIN);

		Self { start, end }
	}

	/// Number of days between `start` and `end`.
	pub fn span_days(&self) -> i64 {
		(self.end - self.start).whole_days()
	}
}

/// Transaction record as returned by the provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawTransaction {
	/// Provider-issued transaction identifier.
	pub transaction_id: String,
	/// Account the transaction belongs to.
	#[serde(default)]
	pub account_id: Option<String>,
	/// Merchant or description text.
	pub name: String,
	/// Signed amount; positive values are outflows.
	pub amount: f64,
	/// Posting (or authorization) date.
	#[serde(with = "plaid_date")]
	pub date: Date,
	/// Category hierarchy, most general first. `null` and absent are both accepted.
	#[serde(default)]
	pub category: Option<Vec<String>>,
	/// Whether the transaction is still pending.
	#[serde(default)]
	pub pending: bool,
	/// ISO-4217 currency code, when known.
	#[serde(default)]
	pub iso_currency_code: Option<String>,
	/// Cleaned merchant name, when known.
	#[serde(default)]
	pub merchant_name: Option<String>,
}
