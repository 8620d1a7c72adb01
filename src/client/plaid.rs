//! HTTPS/JSON implementation of [`AggregationClient`] against the Plaid API.
//!
//! Every call carries the client credentials inline, runs under the transport's timeout, and
//! is retried according to the configured [`RetryPolicy`] when the failure is transient and the
//! endpoint is safe to repeat. Public-token exchange is never repeated because a second attempt
//! would present an already-consumed token.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{ItemId, TokenSecret},
	client::{
		AggregationClient, ClientFuture, LinkToken, LinkTokenRequest, RawTransaction,
		TokenExchange, TransactionWindow,
		wire::{
			ApiErrorBody, Authenticated, LinkTokenCreateBody, LinkTokenCreateResponse,
			LinkTokenUser, PublicTokenExchangeBody, PublicTokenExchangeResponse,
			TransactionsGetBody, TransactionsGetOptions, TransactionsGetResponse,
		},
	},
	error::{ConfigError, UpstreamError},
	http::{RawResponse, ReqwestHttpClient},
	provider::{Credentials, Environment, RetryPolicy},
};

/// Provider endpoints used by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
	/// `POST /link/token/create`.
	LinkTokenCreate,
	/// `POST /item/public_token/exchange`.
	PublicTokenExchange,
	/// `POST /transactions/get`.
	TransactionsGet,
}
impl Endpoint {
	/// Returns the request path.
	pub const fn path(self) -> &'static str {
		match self {
			Self::LinkTokenCreate => "/link/token/create",
			Self::PublicTokenExchange => "/item/public_token/exchange",
			Self::TransactionsGet => "/transactions/get",
		}
	}

	/// Whether repeating the call after an ambiguous failure is harmless.
	pub const fn is_idempotent(self) -> bool {
		!matches!(self, Self::PublicTokenExchange)
	}
}

/// Provider client bound to one environment and one credential pair.
#[derive(Clone, Debug)]
pub struct PlaidClient {
	http: ReqwestHttpClient,
	base_url: Url,
	credentials: Credentials,
	retry: RetryPolicy,
}
impl PlaidClient {
	/// Maximum page size accepted by `/transactions/get`.
	pub const TRANSACTIONS_PAGE_SIZE: usize = 500;

	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates a client for `environment` whose calls time out after `timeout`.
	pub fn new(
		environment: Environment,
		credentials: Credentials,
		timeout: StdDuration,
	) -> Result<Self, ConfigError> {
		let http = ReqwestHttpClient::new(timeout)?;

		Ok(Self::with_http_client(environment.base_url()?, credentials, http))
	}

	/// Creates a client that talks to `base_url` through a caller-provided transport.
	pub fn with_http_client(
		base_url: Url,
		credentials: Credentials,
		http: ReqwestHttpClient,
	) -> Self {
		Self { http, base_url, credentials, retry: RetryPolicy::default() }
	}

	/// Replaces the retry policy.
	pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
		self.retry = retry;

		self
	}

	/// Base URL every endpoint path is resolved against.
	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	/// Retry policy applied to idempotent endpoints.
	pub fn retry_policy(&self) -> RetryPolicy {
		self.retry
	}

	async fn call<B, R>(&self, endpoint: Endpoint, body: &B) -> Result<R, UpstreamError>
	where
		B: Serialize + Sync,
		R: DeserializeOwned,
	{
		let mut url = self.base_url.clone();

		url.set_path(endpoint.path());

		let payload = Authenticated {
			client_id: &self.credentials.client_id,
			secret: self.credentials.secret.expose(),
			body,
		};
		let mut attempt = 0;

		loop {
			match self.call_once(endpoint, url.clone(), &payload).await {
				Err(err) if endpoint.is_idempotent() && self.retry.should_retry(attempt, &err) => {
					let delay = self.retry.delay_for(attempt, err.retry_after());

					tracing::warn!(
						endpoint = endpoint.path(),
						attempt,
						delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
						error = %err,
						"Retrying transient provider failure."
					);
					tokio::time::sleep(delay).await;

					attempt += 1;
				},
				outcome => return outcome,
			}
		}
	}

	async fn call_once<B, R>(
		&self,
		endpoint: Endpoint,
		url: Url,
		payload: &Authenticated<'_, B>,
	) -> Result<R, UpstreamError>
	where
		B: Serialize + Sync,
		R: DeserializeOwned,
	{
		let path = endpoint.path();
		let response =
			self.http.post_json(url, payload).await.map_err(|err| map_reqwest_error(path, err))?;

		if !response.meta.is_success() {
			return Err(map_error_response(path, response));
		}

		let mut de = serde_json::Deserializer::from_slice(&response.body);

		serde_path_to_error::deserialize(&mut de).map_err(|source| UpstreamError::ResponseParse {
			endpoint: path,
			source,
			status: Some(response.meta.status),
		})
	}
}
impl AggregationClient for PlaidClient {
	fn create_link_token<'a>(
		&'a self,
		request: &'a LinkTokenRequest,
	) -> ClientFuture<'a, LinkToken> {
		Box::pin(async move {
			let body = LinkTokenCreateBody {
				client_name: &request.client_name,
				user: LinkTokenUser { client_user_id: &request.user_id },
				products: &request.products,
				country_codes: &request.country_codes,
				language: &request.language,
			};
			let response: LinkTokenCreateResponse =
				self.call(Endpoint::LinkTokenCreate, &body).await?;

			if response.link_token.is_empty() {
				return Err(UpstreamError::MalformedResponse {
					endpoint: Endpoint::LinkTokenCreate.path(),
					reason: "link_token is empty".into(),
				});
			}

			Ok(LinkToken { link_token: response.link_token, expiration: response.expiration })
		})
	}

	fn exchange_public_token<'a>(
		&'a self,
		public_token: &'a TokenSecret,
	) -> ClientFuture<'a, TokenExchange> {
		Box::pin(async move {
			let endpoint = Endpoint::PublicTokenExchange;
			let body = PublicTokenExchangeBody { public_token: public_token.expose() };
			let response: PublicTokenExchangeResponse = self.call(endpoint, &body).await?;
			let item_id = ItemId::new(&response.item_id).map_err(|err| {
				UpstreamError::MalformedResponse {
					endpoint: endpoint.path(),
					reason: err.to_string(),
				}
			})?;

			if response.access_token.is_empty() {
				return Err(UpstreamError::MalformedResponse {
					endpoint: endpoint.path(),
					reason: "access_token is empty".into(),
				});
			}

			Ok(TokenExchange { access_token: TokenSecret::new(response.access_token), item_id })
		})
	}

	fn get_transactions<'a>(
		&'a self,
		access_token: &'a TokenSecret,
		window: TransactionWindow,
	) -> ClientFuture<'a, Vec<RawTransaction>> {
		Box::pin(async move {
			let mut collected = Vec::new();

			loop {
				let body = TransactionsGetBody {
					access_token: access_token.expose(),
					start_date: window.start,
					end_date: window.end,
					options: TransactionsGetOptions {
						count: Self::TRANSACTIONS_PAGE_SIZE,
						offset: collected.len(),
					},
				};
				let page: TransactionsGetResponse =
					self.call(Endpoint::TransactionsGet, &body).await?;
				let received = page.transactions.len();

				collected.extend(page.transactions);

				if received == 0 || collected.len() >= page.total_transactions {
					break;
				}

				tracing::debug!(
					collected = collected.len(),
					total = page.total_transactions,
					"Fetching next transactions page."
				);
			}

			Ok(collected)
		})
	}
}

fn map_reqwest_error(endpoint: &'static str, err: ReqwestError) -> UpstreamError {
	if err.is_timeout() {
		UpstreamError::Timeout { endpoint }
	} else {
		UpstreamError::transport(endpoint, err)
	}
}

fn map_error_response(endpoint: &'static str, response: RawResponse) -> UpstreamError {
	let RawResponse { meta, body } = response;

	match serde_json::from_slice::<ApiErrorBody>(&body) {
		Ok(api) => UpstreamError::Api {
			status: meta.status,
			error_type: api.error_type,
			error_code: api.error_code,
			message: api.error_message,
			request_id: api.request_id,
			retry_after: meta.retry_after,
		},
		Err(_) => UpstreamError::UnexpectedStatus {
			endpoint,
			status: meta.status,
			body_preview: truncate_preview(&String::from_utf8_lossy(&body)),
			retry_after: meta.retry_after,
		},
	}
}

fn truncate_preview(body: &str) -> String {
	if body.chars().count() <= PlaidClient::BODY_PREVIEW_LIMIT {
		return body.to_owned();
	}

	let mut buf = body.chars().take(PlaidClient::BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}
