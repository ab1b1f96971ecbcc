//! Durable backends for quota counters.

// std
use std::path::PathBuf;
// self
use crate::{
	_prelude::*,
	auth::AccountId,
	quota::QuotaWindow,
	store::{
		StoreError,
		file::{ensure_parent_exists, read_snapshot, write_snapshot},
	},
};

/// Persistence surface for quota counters.
///
/// The gate keeps the authoritative state in memory; stores only load it once
/// at construction and flush full snapshots after each mutation.
pub trait QuotaStore
where
	Self: Send + Sync,
{
	/// Loads the persisted counters, or an empty map when nothing was stored yet.
	fn load(&self) -> Result<HashMap<AccountId, QuotaWindow>, StoreError>;

	/// Replaces the persisted counters with the provided snapshot.
	fn persist(&self, counters: &HashMap<AccountId, QuotaWindow>) -> Result<(), StoreError>;
}

/// Persists counters to a JSON file after each mutation, using the same atomic snapshot writes
/// as the credential store.
#[derive(Clone, Debug)]
pub struct FileQuotaStore {
	path: PathBuf,
}
impl FileQuotaStore {
	/// Opens a store at the provided path, creating parent directories eagerly.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		ensure_parent_exists(&path)?;

		Ok(Self { path })
	}
}
impl QuotaStore for FileQuotaStore {
	fn load(&self) -> Result<HashMap<AccountId, QuotaWindow>, StoreError> {
		read_snapshot(&self.path)
	}

	fn persist(&self, counters: &HashMap<AccountId, QuotaWindow>) -> Result<(), StoreError> {
		write_snapshot(&self.path, counters)
	}
}

/// In-memory counter store for tests and ephemeral deployments.
#[derive(Clone, Debug, Default)]
pub struct MemoryQuotaStore {
	inner: Arc<RwLock<HashMap<AccountId, QuotaWindow>>>,
}
impl QuotaStore for MemoryQuotaStore {
	fn load(&self) -> Result<HashMap<AccountId, QuotaWindow>, StoreError> {
		Ok(self.inner.read().clone())
	}

	fn persist(&self, counters: &HashMap<AccountId, QuotaWindow>) -> Result<(), StoreError> {
		*self.inner.write() = counters.clone();

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, fs, process};
	// self
	use super::*;

	#[test]
	fn file_store_round_trips_counters() {
		let path = env::temp_dir().join(format!(
			"ynab_mcp_quota_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		));
		let store = FileQuotaStore::open(&path).expect("Failed to open quota store.");
		let account = AccountId::new("a@x.com").expect("Account fixture should be valid.");
		let reset_time = OffsetDateTime::from_unix_timestamp(1_700_000_000)
			.expect("Fixture timestamp should be valid.");
		let counters =
			HashMap::from_iter([(account.clone(), QuotaWindow { count: 42, reset_time })]);

		store.persist(&counters).expect("Persisting counters should succeed.");

		let raw = fs::read_to_string(&path).expect("Snapshot file should exist.");

		assert!(raw.contains("\"resetTime\": 1700000000000"), "Reset instants persist as unix milliseconds.");

		let reopened = FileQuotaStore::open(&path).expect("Failed to reopen quota store.");
		let loaded = reopened.load().expect("Loading counters should succeed.");

		assert_eq!(loaded.get(&account), Some(&QuotaWindow { count: 42, reset_time }));

		let _ = fs::remove_file(&path);
	}

	#[test]
	fn missing_file_loads_empty() {
		let path = env::temp_dir().join(format!(
			"ynab_mcp_quota_store_missing_{}.json",
			process::id(),
		));
		let store = FileQuotaStore::open(&path).expect("Failed to open quota store.");

		assert!(store.load().expect("Loading an absent snapshot should succeed.").is_empty());
	}
}
