//! Token lifecycle management: acquisition, silent refresh, and revocation.

// self
use crate::{
	_prelude::*,
	auth::{AccountId, AccountStatus, CredentialRecord, TokenGrant},
	oauth::{AuthorizationServer, OAuthError},
	store::CredentialStore,
};

/// Look-ahead window before expiry that triggers a silent refresh.
pub const REFRESH_LOOKAHEAD: Duration = Duration::minutes(5);

/// Manages the stored credential of each account.
///
/// Callers only ever ask for a usable access token; refreshes happen
/// transparently and are serialized per account, so concurrent requests for
/// the same near-expiry credential result in a single network exchange.
pub struct TokenManager {
	store: Arc<dyn CredentialStore>,
	server: Arc<AuthorizationServer>,
	lookahead: Duration,
	refresh_guards: Mutex<HashMap<AccountId, Arc<AsyncMutex<()>>>>,
}
impl TokenManager {
	/// Creates a manager over the provided store and authorization server.
	pub fn new(store: Arc<dyn CredentialStore>, server: Arc<AuthorizationServer>) -> Self {
		Self {
			store,
			server,
			lookahead: REFRESH_LOOKAHEAD,
			refresh_guards: Mutex::new(HashMap::new()),
		}
	}

	/// Overrides the refresh look-ahead window.
	pub fn with_lookahead(mut self, window: Duration) -> Self {
		self.lookahead = window;

		self
	}

	/// Returns a ready-to-use access token, refreshing first when the stored one expires within
	/// the look-ahead window.
	pub async fn fresh_access_token(&self, account: &AccountId) -> Result<String> {
		let record = self
			.store
			.fetch(account)
			.await?
			.ok_or_else(|| Error::token(format!("No token found for account: {account}"), true))?;

		if !record.needs_refresh_at(OffsetDateTime::now_utc(), self.lookahead) {
			return Ok(record.access_token.expose().to_owned());
		}

		tracing::info!(%account, "access token expires soon, refreshing");

		let refreshed = self.refresh(account).await?;

		Ok(refreshed.access_token.expose().to_owned())
	}

	/// Refreshes the stored credential, serializing concurrent refreshes per account.
	///
	/// A grant rejection (HTTP 400/401 from the authorization server) deletes the stored
	/// credential and demands re-authentication; any other failure keeps it for a later retry.
	pub async fn refresh(&self, account: &AccountId) -> Result<CredentialRecord> {
		let guard = self.refresh_guard(account);
		let _serialized = guard.lock().await;
		// Re-read under the guard: a caller that queued behind the winning refresh
		// finds a fresh record here and skips the exchange entirely.
		let record = self
			.store
			.fetch(account)
			.await?
			.ok_or_else(|| Error::token(format!("No token found for account: {account}"), true))?;

		if !record.needs_refresh_at(OffsetDateTime::now_utc(), self.lookahead) {
			return Ok(record);
		}

		let Some(refresh_token) = record.refresh_token.clone() else {
			self.store.remove(account).await?;

			return Err(Error::token(
				"Stored credential has no refresh token, authentication required".to_owned(),
				true,
			));
		};

		match self.server.refresh(refresh_token.expose()).await {
			Ok(grant) => {
				let mut updated = CredentialRecord::from_grant(&grant, OffsetDateTime::now_utc());

				if updated.refresh_token.is_none() {
					// The server may omit rotation; the previous refresh token stays valid.
					updated.refresh_token = record.refresh_token.clone();
				}

				self.store.save(account.clone(), updated.clone()).await?;

				tracing::info!(%account, "access token refreshed");

				Ok(updated)
			},
			Err(OAuthError::Rejected { reason, status }) => {
				tracing::warn!(%account, %reason, ?status, "refresh grant rejected, removing credential");

				self.store.remove(account).await?;

				Err(Error::token("Failed to refresh token, authentication required".to_owned(), true))
			},
			Err(err) => {
				tracing::warn!(%account, %err, "token refresh failed, credential retained");

				Err(Error::token(format!("Failed to refresh token: {err}"), false))
			},
		}
	}

	/// Stores a freshly exchanged grant for an account, replacing any previous credential.
	pub async fn set_token(
		&self,
		account: AccountId,
		grant: TokenGrant,
	) -> Result<CredentialRecord> {
		let record = CredentialRecord::from_grant(&grant, OffsetDateTime::now_utc());

		self.store.save(account.clone(), record.clone()).await?;

		tracing::info!(%account, "credential stored");

		Ok(record)
	}

	/// Removes the stored credential for an account; returns whether one existed.
	pub async fn remove_token(&self, account: &AccountId) -> Result<bool> {
		let removed = self.store.remove(account).await?;

		if removed {
			tracing::info!(%account, "credential removed");
		}

		Ok(removed)
	}

	/// Summarizes every stored account, computing expiry state at call time.
	pub async fn list_accounts(&self) -> Result<Vec<AccountStatus>> {
		let now = OffsetDateTime::now_utc();
		let mut statuses: Vec<_> = self
			.store
			.list()
			.await?
			.into_iter()
			.map(|(account, record)| AccountStatus::of(account, &record, now))
			.collect();

		statuses.sort_by(|a, b| a.email.cmp(&b.email));

		Ok(statuses)
	}

	fn refresh_guard(&self, account: &AccountId) -> Arc<AsyncMutex<()>> {
		let mut guards = self.refresh_guards.lock();

		guards.entry(account.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{config::OAuthConfig, store::MemoryCredentialStore};

	fn manager() -> (TokenManager, Arc<MemoryCredentialStore>) {
		let store = Arc::new(MemoryCredentialStore::default());
		let server = Arc::new(
			AuthorizationServer::new(&OAuthConfig {
				client_id: "client-test".into(),
				client_secret: "secret-test".into(),
				..OAuthConfig::default()
			})
			.expect("OAuth fixture configuration should be valid."),
		);

		(TokenManager::new(store.clone(), server), store)
	}

	fn grant(expires_in: i64) -> TokenGrant {
		TokenGrant {
			access_token: "access-fixture".into(),
			refresh_token: Some("refresh-fixture".into()),
			token_type: "bearer".into(),
			expires_in: Some(expires_in),
		}
	}

	#[tokio::test]
	async fn missing_credential_demands_authentication() {
		let (manager, _) = manager();
		let account = AccountId::new("a@x.com").expect("Account fixture should be valid.");
		let err = manager
			.fresh_access_token(&account)
			.await
			.expect_err("Unknown accounts must not produce tokens.");

		match err {
			Error::Token { message, authentication_required } => {
				assert!(authentication_required);
				assert_eq!(message, "No token found for account: a@x.com");
			},
			other => panic!("Expected a token error, got {other:?}."),
		}
	}

	#[tokio::test]
	async fn fresh_credential_is_returned_without_refresh() {
		let (manager, _) = manager();
		let account = AccountId::new("a@x.com").expect("Account fixture should be valid.");

		manager
			.set_token(account.clone(), grant(3_600))
			.await
			.expect("Storing a grant should succeed.");

		// No mock endpoint exists: a refresh attempt would fail loudly here.
		let token = manager
			.fresh_access_token(&account)
			.await
			.expect("Fresh credentials should be served from the store.");

		assert_eq!(token, "access-fixture");
	}

	#[tokio::test]
	async fn near_expiry_without_refresh_token_evicts() {
		let (manager, store) = manager();
		let account = AccountId::new("a@x.com").expect("Account fixture should be valid.");
		let mut record =
			CredentialRecord::from_grant(&grant(60), OffsetDateTime::now_utc());

		record.refresh_token = None;
		store
			.save(account.clone(), record)
			.await
			.expect("Seeding the store should succeed.");

		let err = manager
			.fresh_access_token(&account)
			.await
			.expect_err("A near-expiry credential without a refresh token is unusable.");

		assert!(matches!(err, Error::Token { authentication_required: true, .. }));
		assert!(
			store.fetch(&account).await.expect("Fetch should succeed.").is_none(),
			"Unrenewable credential must be evicted."
		);
	}

	#[tokio::test]
	async fn list_accounts_reports_expiry_state() {
		let (manager, store) = manager();
		let live = AccountId::new("live@x.com").expect("Account fixture should be valid.");
		let stale = AccountId::new("stale@x.com").expect("Account fixture should be valid.");
		let mut expired =
			CredentialRecord::from_grant(&grant(3_600), OffsetDateTime::now_utc());

		expired.expires_at = OffsetDateTime::now_utc() - Duration::hours(1);

		manager
			.set_token(live.clone(), grant(3_600))
			.await
			.expect("Storing a grant should succeed.");
		store.save(stale.clone(), expired).await.expect("Seeding the store should succeed.");

		let statuses =
			manager.list_accounts().await.expect("Listing accounts should succeed.");

		assert_eq!(statuses.len(), 2);

		let live_status = statuses
			.iter()
			.find(|status| status.email == live)
			.expect("Live account should be listed.");
		let stale_status = statuses
			.iter()
			.find(|status| status.email == stale)
			.expect("Stale account should be listed.");

		assert!(!live_status.is_expired);
		assert!(live_status.has_refresh_token);
		assert!(stale_status.is_expired);
	}

	#[tokio::test]
	async fn remove_token_is_idempotent() {
		let (manager, _) = manager();
		let account = AccountId::new("a@x.com").expect("Account fixture should be valid.");

		manager
			.set_token(account.clone(), grant(3_600))
			.await
			.expect("Storing a grant should succeed.");

		assert!(manager.remove_token(&account).await.expect("First removal should succeed."));
		assert!(!manager.remove_token(&account).await.expect("Second removal should succeed."));
	}
}
