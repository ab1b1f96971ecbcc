//! File-backed [`CredentialStore`] plus the shared atomic JSON snapshot helpers the quota store
//! reuses.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{AccountId, CredentialRecord},
	store::{CredentialStore, StoreError, StoreFuture},
};

/// Reads a JSON object keyed by account identifier from disk; missing or empty files yield an
/// empty map.
pub(crate) fn read_snapshot<T>(path: &Path) -> Result<HashMap<AccountId, T>, StoreError>
where
	T: DeserializeOwned,
{
	if !path.exists() {
		return Ok(HashMap::new());
	}

	let metadata = path.metadata().map_err(|e| StoreError::Backend {
		message: format!("Failed to inspect {}: {e}", path.display()),
	})?;

	if metadata.len() == 0 {
		return Ok(HashMap::new());
	}

	let bytes = fs::read(path).map_err(|e| StoreError::Backend {
		message: format!("Failed to read {}: {e}", path.display()),
	})?;

	serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
		message: format!("Failed to parse {}: {e}", path.display()),
	})
}

/// Atomically replaces the snapshot file: write to a sibling temp file, fsync, then rename.
pub(crate) fn write_snapshot<T>(
	path: &Path,
	contents: &HashMap<AccountId, T>,
) -> Result<(), StoreError>
where
	T: Serialize,
{
	ensure_parent_exists(path)?;

	let serialized =
		serde_json::to_vec_pretty(contents).map_err(|e| StoreError::Serialization {
			message: format!("Failed to serialize store snapshot: {e}"),
		})?;
	let mut tmp_path = path.to_path_buf();

	tmp_path.set_extension("tmp");

	{
		let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
			message: format!("Failed to create {}: {e}", tmp_path.display()),
		})?;

		file.write_all(&serialized).map_err(|e| StoreError::Backend {
			message: format!("Failed to write {}: {e}", tmp_path.display()),
		})?;
		file.sync_all().map_err(|e| StoreError::Backend {
			message: format!("Failed to sync {}: {e}", tmp_path.display()),
		})?;
	}

	fs::rename(&tmp_path, path).map_err(|e| StoreError::Backend {
		message: format!("Failed to replace {}: {e}", path.display()),
	})
}

pub(crate) fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
	if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
		fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
			message: format!("Failed to create store directory {}: {e}", parent.display()),
		})?;
	}

	Ok(())
}

/// Persists credentials to a JSON file after each mutation.
///
/// The on-disk format is a flat object mapping account identifier to
/// credential record, so the file stays hand-inspectable.
#[derive(Clone, Debug)]
pub struct FileCredentialStore {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<AccountId, CredentialRecord>>>,
}
impl FileCredentialStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		ensure_parent_exists(&path)?;

		let snapshot = read_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn persist_locked(
		&self,
		contents: &HashMap<AccountId, CredentialRecord>,
	) -> Result<(), StoreError> {
		write_snapshot(&self.path, contents)
	}
}
impl CredentialStore for FileCredentialStore {
	fn save(&self, account: AccountId, record: CredentialRecord) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			guard.insert(account, record);
			self.persist_locked(&guard)?;

			Ok(())
		})
	}

	fn fetch<'a>(&'a self, account: &'a AccountId) -> StoreFuture<'a, Option<CredentialRecord>> {
		Box::pin(async move { Ok(self.inner.read().get(account).cloned()) })
	}

	fn remove<'a>(&'a self, account: &'a AccountId) -> StoreFuture<'a, bool> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let removed = guard.remove(account).is_some();

			if removed {
				self.persist_locked(&guard)?;
			}

			Ok(removed)
		})
	}

	fn list(&self) -> StoreFuture<'_, Vec<(AccountId, CredentialRecord)>> {
		Box::pin(async move {
			Ok(self.inner.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect())
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, process};
	// crates.io
	use tokio::runtime::Runtime;
	// self
	use super::*;
	use crate::auth::TokenGrant;

	fn temp_path() -> PathBuf {
		let unique = format!(
			"ynab_mcp_credential_store_{}_{}.json",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		);

		env::temp_dir().join(unique)
	}

	fn build_record() -> (AccountId, CredentialRecord) {
		let account = AccountId::new("a@x.com").expect("Failed to build account fixture.");
		let grant = TokenGrant {
			access_token: "access-token".into(),
			refresh_token: Some("refresh-token".into()),
			token_type: "bearer".into(),
			expires_in: Some(3_600),
		};

		(account, CredentialRecord::from_grant(&grant, OffsetDateTime::now_utc()))
	}

	#[test]
	fn save_and_reload_round_trip() {
		let path = temp_path();
		let store = FileCredentialStore::open(&path).expect("Failed to open credential store.");
		let (account, record) = build_record();
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.save(account.clone(), record.clone()))
			.expect("Failed to save fixture record to file store.");
		drop(store);

		let reopened =
			FileCredentialStore::open(&path).expect("Failed to reopen credential store.");
		let fetched = rt
			.block_on(reopened.fetch(&account))
			.expect("Failed to fetch fixture record from file store.")
			.expect("File store lost record after reopen.");

		assert_eq!(fetched.access_token.expose(), record.access_token.expose());
		assert_eq!(fetched.expires_at, record.expires_at);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary credential store {}: {e}", path.display())
		});
	}

	#[test]
	fn remove_is_idempotent() {
		let path = temp_path();
		let store = FileCredentialStore::open(&path).expect("Failed to open credential store.");
		let (account, record) = build_record();
		let rt = Runtime::new().expect("Failed to build Tokio runtime for file store test.");

		rt.block_on(store.save(account.clone(), record)).expect("Failed to save fixture record.");

		assert!(rt.block_on(store.remove(&account)).expect("First removal should succeed."));
		assert!(!rt.block_on(store.remove(&account)).expect("Second removal should succeed."));

		let _ = fs::remove_file(&path);
	}
}
