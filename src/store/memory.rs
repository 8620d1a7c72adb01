//! Thread-safe in-memory [`TokenStore`] implementation.
//!
//! Credentials live for the lifetime of the process; there is no eviction or expiry.

// self
use crate::{
	_prelude::*,
	auth::{ItemId, TokenSecret},
	store::{Connection, StoreError, StoreFuture, TokenStore},
};

type StoreMap = Arc<RwLock<HashMap<ItemId, TokenSecret>>>;

/// Storage backend that keeps credentials in-process behind a read-write lock.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Number of stored connections.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing has been stored yet.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}

	/// Looks up the credential stored for `item_id`.
	pub fn get(&self, item_id: &str) -> Option<TokenSecret> {
		self.0.read().get(item_id).cloned()
	}

	fn put_now(map: StoreMap, item_id: ItemId, access_token: TokenSecret) -> Option<TokenSecret> {
		map.write().insert(item_id, access_token)
	}

	fn all_now(map: StoreMap) -> Vec<Connection> {
		let mut connections = map
			.read()
			.iter()
			.map(|(item_id, access_token)| Connection {
				item_id: item_id.clone(),
				access_token: access_token.clone(),
			})
			.collect::<Vec<_>>();

		connections.sort_by(|a, b| a.item_id.cmp(&b.item_id));

		connections
	}
}
impl TokenStore for MemoryStore {
	fn put(
		&self,
		item_id: ItemId,
		access_token: TokenSecret,
	) -> StoreFuture<'_, Option<TokenSecret>> {
		let map = self.0.clone();

		Box::pin(async move {
			if access_token.is_empty() {
				return Err(StoreError::Backend {
					message: format!("refusing to store an empty credential for {item_id}"),
				});
			}

			Ok(Self::put_now(map, item_id, access_token))
		})
	}

	fn all(&self) -> StoreFuture<'_, Vec<Connection>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::all_now(map)) })
	}

	fn is_empty(&self) -> StoreFuture<'_, bool> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().is_empty()) })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn item(id: &str) -> ItemId {
		ItemId::new(id).expect("Item fixture should be valid.")
	}

	#[tokio::test]
	async fn put_then_all_round_trip() {
		let store = MemoryStore::default();

		assert!(TokenStore::is_empty(&store).await.expect("Emptiness check should succeed."));
		assert!(store.is_empty());

		let replaced = store
			.put(item("item-1"), TokenSecret::new("access-123"))
			.await
			.expect("Saving into the memory store should succeed.");

		assert!(replaced.is_none());
		assert!(!TokenStore::is_empty(&store).await.expect("Emptiness check should succeed."));

		let all = store.all().await.expect("Snapshot should succeed.");

		assert_eq!(all.len(), 1);
		assert_eq!(all[0].item_id.as_ref(), "item-1");
		assert_eq!(all[0].access_token.expose(), "access-123");
	}

	#[tokio::test]
	async fn duplicate_item_replaces_credential() {
		let store = MemoryStore::default();

		store
			.put(item("item-1"), TokenSecret::new("access-old"))
			.await
			.expect("First save should succeed.");

		let replaced = store
			.put(item("item-1"), TokenSecret::new("access-new"))
			.await
			.expect("Second save should succeed.");

		assert_eq!(replaced.as_ref().map(TokenSecret::expose), Some("access-old"));
		assert_eq!(store.len(), 1);
		assert_eq!(store.get("item-1").as_ref().map(TokenSecret::expose), Some("access-new"));
	}

	#[tokio::test]
	async fn empty_credentials_are_rejected() {
		let store = MemoryStore::default();
		let err = store
			.put(item("item-1"), TokenSecret::new(""))
			.await
			.expect_err("Empty credentials must not be stored.");

		assert!(matches!(err, StoreError::Backend { .. }));
		assert_eq!(store.len(), 0);
	}

	#[tokio::test]
	async fn concurrent_puts_are_not_lost() {
		let store = MemoryStore::default();
		let writes = (0..32).map(|idx| {
			let store = store.clone();

			tokio::spawn(async move {
				store
					.put(item(&format!("item-{idx}")), TokenSecret::new(format!("access-{idx}")))
					.await
			})
		});

		for handle in writes.collect::<Vec<_>>() {
			handle
				.await
				.expect("Writer task should not panic.")
				.expect("Concurrent save should succeed.");
		}

		assert_eq!(store.len(), 32);
	}
}
