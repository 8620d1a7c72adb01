//! Observability helpers for broker flows.
//!
//! Every flow runs inside a span named `plaid_link_broker.flow` carrying `flow` and `stage`
//! fields. With the `metrics` feature enabled, the `plaid_link_broker_flow_total` counter is
//! incremented for every attempt/success/failure, labeled by `flow` + `outcome`.

mod metrics;
mod tracing;

pub use self::metrics::*;
pub use self::tracing::*;

// self
use crate::_prelude::*;

/// Flow kinds observed by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Link-token creation.
	BeginLink,
	/// Public-token exchange.
	CompleteLink,
	/// Transaction roll-up across every stored item.
	ListTransactions,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::BeginLink => "begin_link",
			FlowKind::CompleteLink => "complete_link",
			FlowKind::ListTransactions => "list_transactions",
		}
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a broker flow.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside the flow span and records attempt + outcome around it.
pub(crate) async fn observe<T, Fut>(kind: FlowKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = FlowSpan::new(kind, stage);

	record_flow_outcome(kind, FlowOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_flow_outcome(kind, FlowOutcome::Success),
		Err(err) => {
			record_flow_outcome(kind, FlowOutcome::Failure);

			::tracing::warn!(flow = kind.as_str(), stage, error = %err, "Flow failed.");
		},
	}

	result
}
