//! Trailing-window transaction roll-up across every linked item.

// crates.io
use futures::{StreamExt, TryStreamExt, stream};
// self
use crate::{
	_prelude::*,
	auth::ItemId,
	client::{AggregationClient, RawTransaction, TransactionWindow},
	flows::{LinkBroker, TRANSACTION_WINDOW_DAYS},
	obs::{self, FlowKind},
	store::Connection,
};

/// Client-facing projection of one provider transaction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transaction {
	/// Provider-issued transaction identifier.
	pub transaction_id: String,
	/// Merchant or description text.
	pub name: String,
	/// Signed amount as reported by the provider.
	pub amount: f64,
	/// Posting date, rendered as `YYYY-MM-DD`.
	#[serde(with = "crate::client::plaid_date")]
	pub date: Date,
	/// Category hierarchy; empty when the provider supplied none.
	pub category: Vec<String>,
}
impl From<RawTransaction> for Transaction {
	fn from(raw: RawTransaction) -> Self {
		Self {
			transaction_id: raw.transaction_id,
			name: raw.name,
			amount: raw.amount,
			date: raw.date,
			category: raw.category.unwrap_or_default(),
		}
	}
}

/// Transactions fetched for one linked item.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AccountTransactions {
	/// Item the transactions belong to.
	pub item_id: ItemId,
	/// Records in provider order.
	pub transactions: Vec<Transaction>,
}

/// Result of [`LinkBroker::list_transactions`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransactionsReport {
	/// One group per linked item, ordered by item identifier.
	pub accounts: Vec<AccountTransactions>,
	/// Sum of the group sizes.
	pub total_transactions: usize,
}
impl TransactionsReport {
	fn from_groups(accounts: Vec<AccountTransactions>) -> Self {
		let total_transactions = accounts.iter().map(|group| group.transactions.len()).sum();

		Self { accounts, total_transactions }
	}
}

impl<C> LinkBroker<C>
where
	C: ?Sized + AggregationClient,
{
	/// Fetches the last 30 days of transactions for every linked item, ending on the local
	/// date given by [`LinkBroker::today`].
	pub async fn list_transactions(&self) -> Result<TransactionsReport> {
		self.list_transactions_as_of(self.today()).await
	}

	/// Same as [`list_transactions`](Self::list_transactions) with an explicit end date.
	///
	/// Every item is queried with the same window. Fetches run with at most
	/// `fetch_concurrency` requests in flight; the first failure aborts the whole roll-up and no
	/// partial result is returned.
	pub async fn list_transactions_as_of(&self, today: Date) -> Result<TransactionsReport> {
		obs::observe(FlowKind::ListTransactions, "list_transactions", async move {
			if self.store.is_empty().await? {
				return Err(Error::NoConnections);
			}

			let connections = self.store.all().await?;
			let window = TransactionWindow::trailing(today, TRANSACTION_WINDOW_DAYS);
			let accounts = stream::iter(connections)
				.map(|connection| self.fetch_account(connection, window))
				.buffered(self.fetch_concurrency)
				.try_collect::<Vec<_>>()
				.await?;
			let report = TransactionsReport::from_groups(accounts);

			tracing::info!(
				items = report.accounts.len(),
				total = report.total_transactions,
				start = %window.start,
				end = %window.end,
				"Aggregated transactions."
			);

			Ok(report)
		})
		.await
	}

	async fn fetch_account(
		&self,
		connection: Connection,
		window: TransactionWindow,
	) -> Result<AccountTransactions> {
		let records = self.client.get_transactions(&connection.access_token, window).await?;

		tracing::debug!(
			item_id = %connection.item_id,
			count = records.len(),
			"Fetched item transactions."
		);

		Ok(AccountTransactions {
			item_id: connection.item_id,
			transactions: records.into_iter().map(Transaction::from).collect(),
		})
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros::date;
	// self
	use super::*;
	use crate::{
		_preludet::*,
		auth::TokenSecret,
		store::{MemoryStore, TokenStore},
	};

	async fn link(store: &MemoryStore, item: &str, access: &str) {
		let item = ItemId::new(item).expect("Item fixture should be valid.");

		store
			.put(item, TokenSecret::new(access))
			.await
			.expect("Saving into the memory store should succeed.");
	}

	#[tokio::test]
	async fn empty_store_fails_without_remote_calls() {
		let (broker, client, _store) = build_stub_broker(StubClient::default());
		let err = broker
			.list_transactions_as_of(date!(2026 - 10 - 19))
			.await
			.expect_err("An empty store must be rejected.");

		assert!(matches!(err, Error::NoConnections));
		assert_eq!(err.to_string(), "No bank accounts connected");
		assert_eq!(client.fetch_count(), 0);
	}

	#[tokio::test]
	async fn every_fetch_uses_the_same_trailing_window() {
		let (broker, client, store) = build_stub_broker(StubClient::default());

		link(&store, "item-a", "access-a").await;
		link(&store, "item-b", "access-b").await;
		link(&store, "item-c", "access-c").await;
		broker
			.list_transactions_as_of(date!(2026 - 10 - 19))
			.await
			.expect("Roll-up should succeed.");

		let fetches = client.fetches.lock();

		assert_eq!(fetches.len(), 3);

		for (_, window) in fetches.iter() {
			assert_eq!(window.end, date!(2026 - 10 - 19));
			assert_eq!(window.start, date!(2026 - 09 - 19));
			assert_eq!(window.span_days(), 30);
		}
	}

	#[tokio::test]
	async fn window_ends_on_the_local_date() {
		for offset in [
			UtcOffset::from_hms(-11, 0, 0).expect("Offset fixture should be valid."),
			UtcOffset::from_hms(14, 0, 0).expect("Offset fixture should be valid."),
		] {
			let (broker, client, store) = build_stub_broker(StubClient::default());
			let broker = broker.with_utc_offset(offset);

			link(&store, "item-a", "access-a").await;

			let before = OffsetDateTime::now_utc().to_offset(offset).date();

			broker.list_transactions().await.expect("Roll-up should succeed.");

			let after = OffsetDateTime::now_utc().to_offset(offset).date();
			let window = client.fetches.lock()[0].1;

			assert!(window.end == before || window.end == after, "{offset:?}: {}", window.end);
			assert_eq!(window.span_days(), 30);
		}
	}

	#[test]
	fn today_follows_the_configured_offset() {
		let at = |offset: UtcOffset| {
			let (broker, _client, _store) = build_stub_broker(StubClient::default());

			broker.with_utc_offset(offset).today()
		};
		let utc = at(UtcOffset::UTC);
		let east = at(UtcOffset::from_hms(14, 0, 0).expect("Offset fixture should be valid."));
		let west = at(UtcOffset::from_hms(-11, 0, 0).expect("Offset fixture should be valid."));

		assert!(east >= utc && utc >= west);
		assert!(east > west, "A 25 hour spread always crosses a date line.");
	}

	#[tokio::test]
	async fn total_matches_group_sizes() {
		let (broker, _client, store) = build_stub_broker(
			StubClient::default()
				.with_transactions(
					"access-a",
					vec![
						raw_transaction("tx-1", "Coffee", 4.5, "2026-10-01"),
						raw_transaction("tx-2", "Rent", 1200.0, "2026-10-02"),
					],
				)
				.with_transactions(
					"access-c",
					vec![raw_transaction("tx-3", "Refund", -20.0, "2026-10-03")],
				),
		);

		link(&store, "item-c", "access-c").await;
		link(&store, "item-a", "access-a").await;
		link(&store, "item-b", "access-b").await;

		let report = broker
			.list_transactions_as_of(date!(2026 - 10 - 19))
			.await
			.expect("Roll-up should succeed.");

		assert_eq!(
			report.accounts.iter().map(|group| group.item_id.as_ref()).collect::<Vec<_>>(),
			["item-a", "item-b", "item-c"]
		);
		assert_eq!(
			report.accounts.iter().map(|group| group.transactions.len()).collect::<Vec<_>>(),
			[2, 0, 1]
		);
		assert_eq!(report.total_transactions, 3);
		assert_eq!(report.accounts[0].transactions[1].name, "Rent");
	}

	#[tokio::test]
	async fn one_failing_item_fails_the_roll_up() {
		let (broker, _client, store) = build_stub_broker(
			StubClient::default()
				.with_transactions(
					"access-a",
					vec![raw_transaction("tx-1", "Coffee", 4.5, "2026-10-01")],
				)
				.with_failing_transactions(
					"access-b",
					"the login details of this item have changed",
				),
		);

		link(&store, "item-a", "access-a").await;
		link(&store, "item-b", "access-b").await;

		let err = broker
			.list_transactions_as_of(date!(2026 - 10 - 19))
			.await
			.expect_err("A failing item must fail the whole roll-up.");

		assert!(matches!(err, Error::Upstream(_)));
		assert_eq!(err.to_string(), "the login details of this item have changed");
	}

	#[tokio::test]
	async fn single_item_projection_matches_wire_shape() {
		let mut record = raw_transaction("tx-9", "Uber", 6.33, "2026-10-05");

		record.category = None;

		let (broker, _client, store) =
			build_stub_broker(StubClient::default().with_transactions("access-1", vec![record]));

		link(&store, "item-1", "access-1").await;

		let report = broker
			.list_transactions_as_of(date!(2026 - 10 - 19))
			.await
			.expect("Roll-up should succeed.");
		let value = serde_json::to_value(&report).expect("Report should serialize.");

		assert_eq!(
			value,
			serde_json::json!({
				"accounts": [{
					"item_id": "item-1",
					"transactions": [{
						"transaction_id": "tx-9",
						"name": "Uber",
						"amount": 6.33,
						"date": "2026-10-05",
						"category": [],
					}],
				}],
				"total_transactions": 1,
			})
		);
	}

	#[tokio::test]
	async fn concurrency_bound_of_one_still_visits_every_item() {
		let (broker, client, store) = build_stub_broker(StubClient::default());
		let broker = broker.with_fetch_concurrency(0);

		assert_eq!(broker.fetch_concurrency, 1);

		link(&store, "item-a", "access-a").await;
		link(&store, "item-b", "access-b").await;

		let report = broker
			.list_transactions_as_of(date!(2026 - 10 - 19))
			.await
			.expect("Roll-up should succeed.");

		assert_eq!(report.accounts.len(), 2);
		assert_eq!(report.total_transactions, 0);
		assert_eq!(client.fetch_count(), 2);
	}
}
