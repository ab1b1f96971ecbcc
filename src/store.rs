//! Persistence contracts and built-in credential stores.

pub mod file;
pub mod memory;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

// self
use crate::{
	_prelude::*,
	auth::{AccountId, CredentialRecord},
};

/// Boxed future returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence surface for per-account OAuth credentials.
///
/// Stores are passive: the token manager owns every lifecycle decision and
/// calls these operations to persist the outcome.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the credential for an account.
	fn save(&self, account: AccountId, record: CredentialRecord) -> StoreFuture<'_, ()>;

	/// Fetches the credential stored for an account, if present.
	fn fetch<'a>(&'a self, account: &'a AccountId) -> StoreFuture<'a, Option<CredentialRecord>>;

	/// Removes the credential stored for an account; returns whether one existed.
	fn remove<'a>(&'a self, account: &'a AccountId) -> StoreFuture<'a, bool>;

	/// Lists every stored account with its credential.
	fn list(&self) -> StoreFuture<'_, Vec<(AccountId, CredentialRecord)>>;
}

/// Error type produced by [`CredentialStore`] and quota-store implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// Serde adapter persisting [`OffsetDateTime`] as unix milliseconds, the format the credential
/// and quota files use on disk.
pub(crate) mod timestamp_ms {
	// crates.io
	use serde::{Deserialize, Deserializer, Serialize, Serializer};
	use time::OffsetDateTime;

	pub fn serialize<S>(value: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let millis = (value.unix_timestamp_nanos() / 1_000_000) as i64;

		millis.serialize(serializer)
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
	where
		D: Deserializer<'de>,
	{
		let millis = i64::deserialize(deserializer)?;

		OffsetDateTime::from_unix_timestamp_nanos(millis as i128 * 1_000_000)
			.map_err(serde::de::Error::custom)
	}
}
