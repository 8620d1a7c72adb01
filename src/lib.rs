//! Link bank accounts through Plaid and aggregate their recent transactions behind a small JSON
//! API: link-token creation, public-token exchange, and a trailing 30-day transaction roll-up
//! across every linked item.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod obs;
pub mod provider;
pub mod server;
pub mod store;

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
		time::Duration as StdDuration,
	};

	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Date, Duration, OffsetDateTime, UtcOffset};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
use color_eyre as _;
#[cfg(test)] use {http_body_util as _, httpmock as _, tower as _};
