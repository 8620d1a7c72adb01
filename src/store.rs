//! Token store contract and the built-in in-process implementation.
//!
//! The store maps each linked [`ItemId`] to its access credential. It is the only mutable state
//! in the broker and is handed to [`LinkBroker`](crate::flows::LinkBroker) explicitly, so a
//! durable backend can replace [`MemoryStore`] without touching the flows.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{ItemId, TokenSecret},
};

/// Boxed future returned by [`TokenStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by token stores.
pub trait TokenStore
where
	Self: Send + Sync,
{
	/// Inserts or replaces the credential for `item_id`, returning the replaced credential.
	fn put(&self, item_id: ItemId, access_token: TokenSecret)
	-> StoreFuture<'_, Option<TokenSecret>>;

	/// Returns a snapshot of every stored connection, ordered by item identifier.
	fn all(&self) -> StoreFuture<'_, Vec<Connection>>;

	/// Returns `true` when no connection has been stored yet.
	fn is_empty(&self) -> StoreFuture<'_, bool>;

	/// Returns the stored item identifiers without exposing credentials.
	fn item_ids(&self) -> StoreFuture<'_, Vec<ItemId>> {
		Box::pin(async move {
			Ok(self.all().await?.into_iter().map(|connection| connection.item_id).collect())
		})
	}
}

/// One linked institution connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
	/// Provider-issued connection identifier.
	pub item_id: ItemId,
	/// Long-lived credential authorizing transaction retrieval.
	pub access_token: TokenSecret,
}

/// Error type produced by [`TokenStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
