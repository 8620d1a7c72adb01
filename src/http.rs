//! Transport primitives for provider calls.
//!
//! [`ReqwestHttpClient`] owns the shared reqwest client (with its per-request timeout) and
//! posts JSON bodies, returning the raw bytes together with the [`ResponseMetadata`] the
//! client layer needs to classify failures.

// std
use std::ops::Deref;
// crates.io
use reqwest::{
	header::{HeaderMap, RETRY_AFTER},
	redirect::Policy,
};
use time::format_description::well_known::Rfc2822;
// self
use crate::{_prelude::*, error::ConfigError};

/// Captures metadata from the most recent HTTP response for downstream error mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseMetadata {
	/// HTTP status code returned by the provider.
	pub status: u16,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<StdDuration>,
}
impl ResponseMetadata {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Raw provider response: metadata plus the undecoded body.
#[derive(Clone, Debug)]
pub struct RawResponse {
	/// Status and retry hints.
	pub meta: ResponseMetadata,
	/// Response body bytes.
	pub body: Vec<u8>,
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Provider endpoints answer directly, so redirects are never followed.
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(pub ReqwestClient);
impl ReqwestHttpClient {
	/// Default timeout applied to every provider call.
	pub const DEFAULT_TIMEOUT: StdDuration = StdDuration::from_secs(30);

	/// Builds a client whose requests fail after `timeout`.
	pub fn new(timeout: StdDuration) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder()
			.timeout(timeout)
			.redirect(Policy::none())
			.user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
			.build()?;

		Ok(Self(client))
	}

	/// POSTs `body` as JSON to `url` and collects the full response.
	pub async fn post_json<B>(&self, url: Url, body: &B) -> Result<RawResponse, ReqwestError>
	where
		B: ?Sized + Serialize,
	{
		let response = self.0.post(url).json(body).send().await?;
		let status = response.status().as_u16();
		let retry_after = parse_retry_after(response.headers());
		let body = response.bytes().await?.to_vec();

		Ok(RawResponse { meta: ResponseMetadata { status, retry_after }, body })
	}
}
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

fn parse_retry_after(headers: &HeaderMap) -> Option<StdDuration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(StdDuration::from_secs(secs));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return StdDuration::try_from(delta).ok();
		}
	}

	None
}
