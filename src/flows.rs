//! Flow orchestration: begin-link, complete-link, and the transaction roll-up.

pub mod common;

mod link;
mod transactions;

pub use common::*;
pub use link::*;
pub use transactions::*;

// self
use crate::{_prelude::*, client::AggregationClient, store::TokenStore};

/// Broker specialized for the crate's default Plaid transport.
pub type PlaidLinkBroker = LinkBroker<crate::client::PlaidClient>;

/// Sequences provider calls and owns the token store.
///
/// The broker holds the aggregation client and the token store behind `Arc`s so a single
/// instance can be shared by every request handler. The store is injected rather than global,
/// so the lock discipline lives entirely inside the [`TokenStore`] implementation.
#[derive(Clone)]
pub struct LinkBroker<C>
where
	C: ?Sized + AggregationClient,
{
	/// Remote aggregation client used for every provider call.
	pub client: Arc<C>,
	/// Store mapping item identifiers to access tokens.
	pub store: Arc<dyn TokenStore>,
	/// Fixed parameters for link-token creation.
	pub settings: LinkSettings,
	/// Maximum number of per-item transaction fetches in flight at once.
	pub fetch_concurrency: usize,
	/// Offset used to decide which calendar day "today" is for the transaction window.
	pub utc_offset: UtcOffset,
}
impl<C> LinkBroker<C>
where
	C: ?Sized + AggregationClient,
{
	/// Default bound on concurrent per-item fetches.
	pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

	/// Creates a broker with the default link settings.
	pub fn new(client: impl Into<Arc<C>>, store: Arc<dyn TokenStore>) -> Self {
		Self {
			client: client.into(),
			store,
			settings: LinkSettings::default(),
			fetch_concurrency: Self::DEFAULT_FETCH_CONCURRENCY,
			utc_offset: UtcOffset::UTC,
		}
	}

	/// Replaces the link settings.
	pub fn with_settings(mut self, settings: LinkSettings) -> Self {
		self.settings = settings;

		self
	}

	/// Sets the per-item fetch concurrency; values below one are raised to one.
	pub fn with_fetch_concurrency(mut self, limit: usize) -> Self {
		self.fetch_concurrency = limit.max(1);

		self
	}

	/// Sets the offset of the server's local clock.
	pub fn with_utc_offset(mut self, offset: UtcOffset) -> Self {
		self.utc_offset = offset;

		self
	}

	/// The current calendar date at [`utc_offset`](Self::utc_offset).
	pub fn today(&self) -> Date {
		OffsetDateTime::now_utc().to_offset(self.utc_offset).date()
	}
}
impl<C> Debug for LinkBroker<C>
where
	C: ?Sized + AggregationClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LinkBroker")
			.field("settings", &self.settings)
			.field("fetch_concurrency", &self.fetch_concurrency)
			.field("utc_offset", &self.utc_offset)
			.finish()
	}
}
