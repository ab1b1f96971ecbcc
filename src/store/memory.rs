//! In-memory [`CredentialStore`] used by tests and ephemeral deployments.

// self
use crate::{
	_prelude::*,
	auth::{AccountId, CredentialRecord},
	store::{CredentialStore, StoreFuture},
};

/// Thread-safe map-backed credential store with no persistence.
#[derive(Clone, Debug, Default)]
pub struct MemoryCredentialStore {
	inner: Arc<RwLock<HashMap<AccountId, CredentialRecord>>>,
}
impl CredentialStore for MemoryCredentialStore {
	fn save(&self, account: AccountId, record: CredentialRecord) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			self.inner.write().insert(account, record);

			Ok(())
		})
	}

	fn fetch<'a>(&'a self, account: &'a AccountId) -> StoreFuture<'a, Option<CredentialRecord>> {
		Box::pin(async move { Ok(self.inner.read().get(account).cloned()) })
	}

	fn remove<'a>(&'a self, account: &'a AccountId) -> StoreFuture<'a, bool> {
		Box::pin(async move { Ok(self.inner.write().remove(account).is_some()) })
	}

	fn list(&self) -> StoreFuture<'_, Vec<(AccountId, CredentialRecord)>> {
		Box::pin(async move {
			Ok(self.inner.read().iter().map(|(k, v)| (k.clone(), v.clone())).collect())
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::TokenGrant;

	#[tokio::test]
	async fn save_fetch_remove_cycle() {
		let store = MemoryCredentialStore::default();
		let account = AccountId::new("a@x.com").expect("Failed to build account fixture.");
		let grant = TokenGrant {
			access_token: "access".into(),
			refresh_token: None,
			token_type: "bearer".into(),
			expires_in: Some(60),
		};
		let record = CredentialRecord::from_grant(&grant, OffsetDateTime::now_utc());

		assert!(store.fetch(&account).await.expect("Fetch should succeed.").is_none());

		store.save(account.clone(), record).await.expect("Save should succeed.");

		assert!(store.fetch(&account).await.expect("Fetch should succeed.").is_some());
		assert_eq!(store.list().await.expect("List should succeed.").len(), 1);
		assert!(store.remove(&account).await.expect("Remove should succeed."));
		assert!(!store.remove(&account).await.expect("Repeat remove should succeed."));
	}
}
