//! Begin-link and complete-link flows.
//!
//! [`LinkBroker::begin_link`] mints a link token for the fixed demo user; the caller drives the
//! hosted linking UI with it and comes back with a public token, which
//! [`LinkBroker::complete_link`] exchanges for a durable access token. The resulting item is
//! written to the token store, silently replacing any earlier credential for the same item.

// self
use crate::{
	_prelude::*,
	auth::{ItemId, TokenSecret},
	client::{AggregationClient, LinkToken},
	flows::{LINK_COMPLETED_MESSAGE, LinkBroker},
	obs::{self, FlowKind},
};

/// Result of a successful [`LinkBroker::complete_link`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkCompletion {
	/// Durable credential for the new item.
	pub access_token: TokenSecret,
	/// Identifier of the new item.
	pub item_id: ItemId,
	/// Human-readable confirmation.
	pub message: &'static str,
}

impl<C> LinkBroker<C>
where
	C: ?Sized + AggregationClient,
{
	/// Creates a link token declaring the configured products, countries, and language.
	pub async fn begin_link(&self) -> Result<LinkToken> {
		obs::observe(FlowKind::BeginLink, "begin_link", async move {
			let request = self.settings.link_token_request();
			let token = self.client.create_link_token(&request).await?;

			tracing::info!(user = %request.user_id, "Created link token.");

			Ok(token)
		})
		.await
	}

	/// Exchanges `public_token` and stores the resulting item.
	///
	/// An empty token is rejected with [`Error::InvalidInput`] before any provider call.
	pub async fn complete_link(&self, public_token: &str) -> Result<LinkCompletion> {
		obs::observe(FlowKind::CompleteLink, "complete_link", async move {
			if public_token.trim().is_empty() {
				return Err(Error::InvalidInput { field: "public_token" });
			}

			let public_token = TokenSecret::new(public_token);
			let exchange = self.client.exchange_public_token(&public_token).await?;
			let replaced = self
				.store
				.put(exchange.item_id.clone(), exchange.access_token.clone())
				.await?;

			if replaced.is_some() {
				tracing::info!(
					item_id = %exchange.item_id,
					"Replaced credential for relinked item."
				);
			} else {
				tracing::info!(item_id = %exchange.item_id, "Stored credential for new item.");
			}

			Ok(LinkCompletion {
				access_token: exchange.access_token,
				item_id: exchange.item_id,
				message: LINK_COMPLETED_MESSAGE,
			})
		})
		.await
	}

	/// Lists the identifiers of every linked item.
	pub async fn connected_items(&self) -> Result<Vec<ItemId>> {
		Ok(self.store.item_ids().await?)
	}
}
