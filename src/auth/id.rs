//! Identifiers for linked items and for the end user driving the link UI.

// std
use std::{
	borrow::{Borrow, Cow},
	ops::Deref,
};
// self
use crate::_prelude::*;

/// Longest item identifier accepted from the provider, in bytes.
pub const MAX_ID_BYTES: usize = 256;
/// Client user identifier used until callers supply their own.
pub const DEMO_CLIENT_USER_ID: &str = "user-id";

/// Reason a string was refused as an identifier.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum InvalidId {
	/// Empty, or nothing but whitespace.
	#[error("{what} is blank")]
	Blank {
		/// Which identifier was being checked.
		what: &'static str,
	},
	/// A whitespace character appears inside the value.
	#[error("{what} has whitespace at byte {at}")]
	Whitespace {
		/// Which identifier was being checked.
		what: &'static str,
		/// Byte offset of the first whitespace character.
		at: usize,
	},
	/// Longer than [`MAX_ID_BYTES`].
	#[error("{what} is {len} bytes long; the limit is 256")]
	Oversized {
		/// Which identifier was being checked.
		what: &'static str,
		/// Actual length in bytes.
		len: usize,
	},
}

fn check(what: &'static str, raw: &str) -> Result<(), InvalidId> {
	if raw.trim().is_empty() {
		return Err(InvalidId::Blank { what });
	}
	if let Some((at, _)) = raw.char_indices().find(|(_, c)| c.is_whitespace()) {
		return Err(InvalidId::Whitespace { what, at });
	}
	if raw.len() > MAX_ID_BYTES {
		return Err(InvalidId::Oversized { what, len: raw.len() });
	}

	Ok(())
}

/// Provider-issued identifier of one linked institution connection.
///
/// Keys the token store; lookups borrow it as `&str`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);
impl ItemId {
	/// Checks `raw` and wraps it.
	pub fn new(raw: impl Into<String>) -> Result<Self, InvalidId> {
		let raw = raw.into();

		check("item id", &raw)?;

		Ok(Self(raw))
	}
}
impl TryFrom<String> for ItemId {
	type Error = InvalidId;

	fn try_from(raw: String) -> Result<Self, Self::Error> {
		Self::new(raw)
	}
}
impl From<ItemId> for String {
	fn from(id: ItemId) -> Self {
		id.0
	}
}
impl Deref for ItemId {
	type Target = str;

	fn deref(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for ItemId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for ItemId {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl Debug for ItemId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ItemId").field(&self.0).finish()
	}
}
impl Display for ItemId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// End user a link token is minted for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientUserId(Cow<'static, str>);
impl ClientUserId {
	/// Checks `raw` and wraps it.
	pub fn new(raw: impl Into<String>) -> Result<Self, InvalidId> {
		let raw = raw.into();

		check("client user id", &raw)?;

		Ok(Self(Cow::Owned(raw)))
	}

	/// The fixed end user of the demo link flow.
	pub const fn demo() -> Self {
		Self(Cow::Borrowed(DEMO_CLIENT_USER_ID))
	}
}
impl Deref for ClientUserId {
	type Target = str;

	fn deref(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for ClientUserId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Display for ClientUserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}
