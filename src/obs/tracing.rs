// crates.io
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
// self
use crate::{_prelude::*, obs::FlowKind};

/// Instrumented future produced by [`FlowSpan::instrument`].
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;

/// A span builder used by broker flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		let span = tracing::info_span!("plaid_link_broker.flow", flow = kind.as_str(), stage);

		Self { span }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
	where
		Fut: Future,
	{
		use tracing::Instrument;

		fut.instrument(self.span.clone())
	}
}

/// Installs the process-wide subscriber: human-readable output filtered by `RUST_LOG`,
/// defaulting to `info`.
///
/// Calling it twice is harmless; the second installation is ignored.
pub fn install_subscriber() {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

	let _ = tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().with_target(false))
		.try_init();
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[tokio::test]
	async fn instrument_wraps_future() {
		let span = FlowSpan::new(FlowKind::BeginLink, "instrument_wraps_future");
		let value = span.instrument(async { 42 }).await;

		assert_eq!(value, 42);
	}

	#[tokio::test]
	async fn instrumented_future_runs_inside_the_flow_span() {
		let span = FlowSpan::new(FlowKind::ListTransactions, "inside_span");
		let expected = span.span.id();
		let observed = span.instrument(async { tracing::Span::current().id() }).await;

		assert_eq!(observed, expected);
	}

	#[test]
	fn subscriber_installation_is_idempotent() {
		install_subscriber();
		install_subscriber();
	}
}
