//! Broker-level error types shared across flows, the provider client, and the HTTP surface.

// self
use crate::_prelude::*;

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// A required request field was missing or empty.
	#[error("{field} is required")]
	InvalidInput {
		/// Name of the missing field as it appears on the wire.
		field: &'static str,
	},
	/// Transactions were requested before any item was linked.
	#[error("No bank accounts connected")]
	NoConnections,
	/// The remote aggregation service rejected or failed a call.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl Error {
	/// Returns `true` when the failure was caused by the caller or the provider rather than by
	/// this process.
	pub fn is_client_facing(&self) -> bool {
		matches!(self, Self::InvalidInput { .. } | Self::NoConnections | Self::Upstream(_))
	}
}

/// Configuration and validation failures raised while assembling the broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Provider base URL cannot be parsed.
	#[error("Provider base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A required credential was empty.
	#[error("The {name} credential must not be empty.")]
	MissingCredential {
		/// Environment variable or flag naming the credential.
		name: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures surfaced by the remote aggregation service or the path to it.
#[derive(Debug, ThisError)]
pub enum UpstreamError {
	/// Provider answered with a structured API error; `message` is carried verbatim.
	#[error("{message}")]
	Api {
		/// HTTP status code returned by the provider.
		status: u16,
		/// Provider error category (e.g. `ITEM_ERROR`, `RATE_LIMIT_EXCEEDED`).
		error_type: String,
		/// Provider error code (e.g. `INVALID_PUBLIC_TOKEN`).
		error_code: String,
		/// Provider-supplied human-readable message.
		message: String,
		/// Provider request identifier, when supplied.
		request_id: Option<String>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<StdDuration>,
	},
	/// Provider answered with an error status but no parseable error body.
	#[error("{endpoint} returned HTTP {status}: {body_preview}")]
	UnexpectedStatus {
		/// Provider endpoint path.
		endpoint: &'static str,
		/// HTTP status code returned by the provider.
		status: u16,
		/// Truncated response body.
		body_preview: String,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<StdDuration>,
	},
	/// Provider responded with JSON that does not match the expected shape.
	#[error("{endpoint} returned malformed JSON.")]
	ResponseParse {
		/// Provider endpoint path.
		endpoint: &'static str,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Provider responded with well-formed JSON carrying unusable values.
	#[error("{endpoint} returned an unusable response: {reason}.")]
	MalformedResponse {
		/// Provider endpoint path.
		endpoint: &'static str,
		/// What was wrong with the payload.
		reason: String,
	},
	/// The call did not finish within the configured timeout.
	#[error("Request to {endpoint} timed out.")]
	Timeout {
		/// Provider endpoint path.
		endpoint: &'static str,
	},
	/// Network failure (DNS, TCP, TLS) while calling the provider.
	#[error("Network error occurred while calling {endpoint}.")]
	Transport {
		/// Provider endpoint path.
		endpoint: &'static str,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
}
impl UpstreamError {
	/// Wraps a transport-specific network error.
	pub fn transport(
		endpoint: &'static str,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Transport { endpoint, source: Box::new(src) }
	}

	/// HTTP status attached to the failure, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Api { status, .. } | Self::UnexpectedStatus { status, .. } => Some(*status),
			Self::ResponseParse { status, .. } => *status,
			_ => None,
		}
	}

	/// Retry-After hint attached to the failure, when the provider sent one.
	pub fn retry_after(&self) -> Option<StdDuration> {
		match self {
			Self::Api { retry_after, .. } | Self::UnexpectedStatus { retry_after, .. } =>
				*retry_after,
			_ => None,
		}
	}
}
