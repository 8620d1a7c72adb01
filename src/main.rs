//! Serves the Plaid link broker over HTTP.

// std
use std::sync::Arc;
// crates.io
use clap::Parser;
use color_eyre::Result;
use tokio::{net::TcpListener, runtime::Builder};
// self
use plaid_link_broker::{
	config::{Cli, Settings},
	obs, server,
};

fn main() -> Result<()> {
	color_eyre::install()?;
	obs::install_subscriber();

	// Settings read the local UTC offset, which only works while the process is single-threaded.
	let settings = Cli::parse().into_settings()?;

	Builder::new_multi_thread().enable_all().build()?.block_on(serve(settings))
}

async fn serve(settings: Settings) -> Result<()> {
	let broker = Arc::new(settings.build_broker()?);
	let router = server::with_trace_layer(server::router(broker));
	let listener = TcpListener::bind(settings.bind).await?;

	tracing::info!(
		addr = %listener.local_addr()?,
		environment = %settings.environment,
		utc_offset = %settings.utc_offset,
		"HTTP server listening."
	);

	axum::serve(listener, router).with_graceful_shutdown(server::shutdown_signal()).await?;

	Ok(())
}
