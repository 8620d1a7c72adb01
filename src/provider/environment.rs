//! Provider environments and the hosts they resolve to.

// self
use crate::{_prelude::*, error::ConfigError};

/// Deployment environment exposed by the provider; each maps to its own API host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
	#[default]
	/// Test institutions and fake credentials.
	Sandbox,
	/// Real institutions with a limited item budget.
	Development,
	/// Live traffic.
	Production,
}
impl Environment {
	/// Every environment, in ascending order of blast radius.
	pub const ALL: [Self; 3] = [Self::Sandbox, Self::Development, Self::Production];

	/// Returns the label accepted by `PLAID_ENV`.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Sandbox => "sandbox",
			Self::Development => "development",
			Self::Production => "production",
		}
	}

	/// Returns the API host for this environment.
	pub const fn host(self) -> &'static str {
		match self {
			Self::Sandbox => "https://sandbox.plaid.com",
			Self::Development => "https://development.plaid.com",
			Self::Production => "https://production.plaid.com",
		}
	}

	/// Parses [`host`](Self::host) into a base URL.
	pub fn base_url(self) -> Result<Url, ConfigError> {
		Url::parse(self.host()).map_err(|source| ConfigError::InvalidBaseUrl { source })
	}

	/// Resolves a label, falling back to [`Environment::Sandbox`] for unknown values.
	pub fn from_label_or_default(label: &str) -> Self {
		label.parse().unwrap_or_default()
	}
}
impl Display for Environment {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Environment {
	type Err = UnknownEnvironment;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let label = s.trim();

		Self::ALL
			.into_iter()
			.find(|env| env.as_str().eq_ignore_ascii_case(label))
			.ok_or_else(|| UnknownEnvironment(label.to_owned()))
	}
}

/// Error returned when an environment label is not recognized.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown provider environment `{0}`; expected sandbox, development, or production.")]
pub struct UnknownEnvironment(pub String);
