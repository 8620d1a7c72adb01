//! Retry policy for provider calls.
//!
//! Failures are classified the way the provider documents them: rate limits, internal API
//! errors, institution outages, timeouts, and network failures are transient; everything else
//! (bad credentials, invalid tokens, login-required items) is returned to the caller at once.

// crates.io
use rand::Rng;
// self
use crate::{_prelude::*, error::UpstreamError};

/// Provider `error_type` values that signal a temporary condition.
const TRANSIENT_ERROR_TYPES: [&str; 3] = ["RATE_LIMIT_EXCEEDED", "API_ERROR", "INSTITUTION_ERROR"];

/// Bounded exponential backoff applied to idempotent provider calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Extra attempts allowed after the first one.
	pub max_retries: u32,
	/// Delay before the first retry; doubled on each subsequent retry.
	pub base_backoff: StdDuration,
	/// Upper bound for any single delay, including Retry-After hints.
	pub max_backoff: StdDuration,
}
impl RetryPolicy {
	const DEFAULT_BASE_BACKOFF: StdDuration = StdDuration::from_millis(250);
	const DEFAULT_MAX_BACKOFF: StdDuration = StdDuration::from_secs(5);

	/// Creates a policy allowing `max_retries` retries with the default backoff curve.
	pub const fn new(max_retries: u32) -> Self {
		Self {
			max_retries,
			base_backoff: Self::DEFAULT_BASE_BACKOFF,
			max_backoff: Self::DEFAULT_MAX_BACKOFF,
		}
	}

	/// A policy that never retries.
	pub const fn disabled() -> Self {
		Self::new(0)
	}

	/// Overrides the backoff curve.
	pub fn with_backoff(mut self, base: StdDuration, max: StdDuration) -> Self {
		self.base_backoff = base;
		self.max_backoff = max.max(base);

		self
	}

	/// Decides whether `err`, observed on zero-based `attempt`, deserves another try.
	pub fn should_retry(&self, attempt: u32, err: &UpstreamError) -> bool {
		attempt < self.max_retries && is_transient(err)
	}

	/// Deterministic part of the delay before retry number `attempt + 1`.
	///
	/// A provider Retry-After hint wins over the exponential curve; both are capped at
	/// [`max_backoff`](Self::max_backoff).
	pub fn backoff_for(&self, attempt: u32, hint: Option<StdDuration>) -> StdDuration {
		let computed = hint.unwrap_or_else(|| {
			self.base_backoff.checked_mul(2_u32.saturating_pow(attempt)).unwrap_or(self.max_backoff)
		});

		computed.min(self.max_backoff)
	}

	/// [`backoff_for`](Self::backoff_for) plus up to 20% random jitter, still capped.
	pub fn delay_for(&self, attempt: u32, hint: Option<StdDuration>) -> StdDuration {
		let backoff = self.backoff_for(attempt, hint);
		let spread = u64::try_from(backoff.as_millis() / 5).unwrap_or(u64::MAX);

		if spread == 0 {
			return backoff;
		}

		let jitter = StdDuration::from_millis(rand::rng().random_range(0..=spread));

		(backoff + jitter).min(self.max_backoff)
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self::new(2)
	}
}

/// Returns `true` when `err` describes a temporary upstream condition.
pub fn is_transient(err: &UpstreamError) -> bool {
	match err {
		UpstreamError::Timeout { .. } | UpstreamError::Transport { .. } => true,
		UpstreamError::Api { status, error_type, .. } =>
			TRANSIENT_ERROR_TYPES.iter().any(|kind| error_type.eq_ignore_ascii_case(kind))
				|| is_transient_status(*status),
		UpstreamError::UnexpectedStatus { status, .. } => is_transient_status(*status),
		UpstreamError::ResponseParse { .. } | UpstreamError::MalformedResponse { .. } => false,
	}
}

fn is_transient_status(status: u16) -> bool {
	matches!(status, 429 | 500..=599)
}
