//! Process configuration assembled from command-line flags and environment variables.
//!
//! Only [`Cli`] touches the environment (through clap's `env` fallbacks); everything below it
//! receives a fully-resolved [`Settings`].

// std
use std::net::SocketAddr;
// crates.io
use clap::Parser;
// self
use crate::{
	_prelude::*,
	client::PlaidClient,
	error::ConfigError,
	flows::{DEFAULT_CLIENT_NAME, LinkBroker, LinkSettings, PlaidLinkBroker},
	http::ReqwestHttpClient,
	provider::{Credentials, Environment, RetryPolicy},
	store::{MemoryStore, TokenStore},
};

/// Command-line interface of the broker binary.
#[derive(Clone, Parser)]
#[command(version, about = "Link bank accounts through Plaid and serve their recent transactions.")]
pub struct Cli {
	/// Plaid client identifier.
	#[arg(long, env = "PLAID_CLIENT_ID")]
	pub client_id: String,
	/// Plaid secret for the selected environment.
	#[arg(long, env = "PLAID_SECRET", hide_env_values = true)]
	pub secret: String,
	/// Plaid environment: sandbox, development, or production.
	#[arg(long, env = "PLAID_ENV", default_value = "sandbox")]
	pub env: String,
	/// Address the HTTP server listens on.
	#[arg(long, env = "BIND_ADDR", default_value = "127.0.0.1:5000")]
	pub bind: SocketAddr,
	/// Per-call timeout for provider requests, in seconds.
	#[arg(
		long,
		env = "PLAID_TIMEOUT_SECS",
		default_value_t = ReqwestHttpClient::DEFAULT_TIMEOUT.as_secs()
	)]
	pub timeout_secs: u64,
	/// Retries allowed for transient provider failures.
	#[arg(long, env = "PLAID_MAX_RETRIES", default_value_t = 2)]
	pub max_retries: u32,
	/// Maximum number of per-item transaction fetches in flight.
	#[arg(long, env = "FETCH_CONCURRENCY", default_value_t = 4)]
	pub fetch_concurrency: usize,
	/// Application name shown inside the linking UI.
	#[arg(long, env = "PLAID_CLIENT_NAME", default_value = DEFAULT_CLIENT_NAME)]
	pub client_name: String,
}
impl Cli {
	/// Validates the parsed arguments and resolves them into [`Settings`].
	///
	/// An unrecognized environment label falls back to sandbox with a warning. The local UTC
	/// offset is read here, so call this before starting a multi-threaded runtime.
	pub fn into_settings(self) -> Result<Settings, ConfigError> {
		if let Err(e) = self.env.parse::<Environment>() {
			tracing::warn!(error = %e, "Falling back to the sandbox environment.");
		}

		Ok(Settings {
			credentials: Credentials::new(self.client_id, self.secret)?,
			environment: Environment::from_label_or_default(&self.env),
			bind: self.bind,
			timeout: StdDuration::from_secs(self.timeout_secs.max(1)),
			retry: RetryPolicy::new(self.max_retries),
			fetch_concurrency: self.fetch_concurrency.max(1),
			link: LinkSettings::default().with_client_name(self.client_name),
			utc_offset: local_utc_offset(),
		})
	}
}

/// Reads the offset of the local clock, falling back to UTC when it cannot be determined.
///
/// The platform lookup refuses to run once other threads exist, so the result depends on when
/// this is called.
pub fn local_utc_offset() -> UtcOffset {
	UtcOffset::current_local_offset().unwrap_or_else(|e| {
		tracing::warn!(error = %e, "Local UTC offset is unavailable; dating windows in UTC.");

		UtcOffset::UTC
	})
}

/// Resolved broker configuration.
#[derive(Clone, Debug)]
pub struct Settings {
	/// Provider credentials.
	pub credentials: Credentials,
	/// Provider environment.
	pub environment: Environment,
	/// Listen address of the HTTP server.
	pub bind: SocketAddr,
	/// Per-call provider timeout.
	pub timeout: StdDuration,
	/// Retry policy for idempotent provider calls.
	pub retry: RetryPolicy,
	/// Bound on concurrent per-item fetches.
	pub fetch_concurrency: usize,
	/// Link-token parameters.
	pub link: LinkSettings,
	/// Offset of the local clock; decides which day the transaction window ends on.
	pub utc_offset: UtcOffset,
}
impl Settings {
	/// Builds the provider client these settings describe.
	pub fn build_client(&self) -> Result<PlaidClient, ConfigError> {
		Ok(PlaidClient::new(self.environment, self.credentials.clone(), self.timeout)?
			.with_retry_policy(self.retry))
	}

	/// Builds a broker backed by a fresh in-memory token store.
	pub fn build_broker(&self) -> Result<PlaidLinkBroker, ConfigError> {
		let store: Arc<dyn TokenStore> = Arc::new(MemoryStore::default());

		Ok(LinkBroker::new(self.build_client()?, store)
			.with_settings(self.link.clone())
			.with_fetch_concurrency(self.fetch_concurrency)
			.with_utc_offset(self.utc_offset))
	}
}
