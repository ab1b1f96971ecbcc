//! Resource operations behind the tool surface.
//!
//! Every operation follows the same shape: validate parameters before any
//! I/O, obtain a fresh access token, run the remote call through the quota
//! gate, then reshape the response for an assistant. Operations hold no state
//! of their own; everything they need lives in [`Services`].

pub mod accounts;
pub mod allocation;
pub mod auth;
pub mod budgets;
pub mod categories;
pub mod months;
pub mod payees;
pub mod scheduled;
pub mod transactions;

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::AccountId,
	config::{Config, RecommendationRules},
	error::RateLimitExceeded,
	oauth::AuthorizationServer,
	quota::{FileQuotaStore, Priority, QuotaGate, QuotaStore},
	store::{CredentialStore, FileCredentialStore},
	tokens::TokenManager,
	ynab::{ApiError, YnabClient},
};

/// Explicitly constructed service set injected into every operation.
///
/// Built once at process start and shared behind the dispatcher; tests build
/// fresh instances over in-memory stores.
pub struct Services {
	/// Token lifecycle manager.
	pub tokens: TokenManager,
	/// Outbound-call quota gate.
	pub quota: Arc<QuotaGate>,
	/// Remote budgeting API client.
	pub ynab: YnabClient,
	/// Authorization-server client, used directly by the auth operations.
	pub oauth: Arc<AuthorizationServer>,
	/// Allocation-recommendation heuristics.
	pub rules: RecommendationRules,
}
impl Services {
	/// Builds the service set over the configured file-backed stores.
	pub fn from_config(config: &Config) -> Result<Self> {
		let credentials = Arc::new(FileCredentialStore::open(&config.storage.tokens_path)?);
		let quota_store = Arc::new(FileQuotaStore::open(&config.storage.quota_path)?);

		Self::with_stores(config, credentials, quota_store)
	}

	/// Builds the service set over caller-provided stores.
	pub fn with_stores(
		config: &Config,
		credentials: Arc<dyn CredentialStore>,
		quota_store: Arc<dyn QuotaStore>,
	) -> Result<Self> {
		let oauth = Arc::new(AuthorizationServer::new(&config.oauth)?);

		Ok(Self {
			tokens: TokenManager::new(credentials, oauth.clone()),
			quota: Arc::new(QuotaGate::new(config.quota.into(), quota_store)?),
			ynab: YnabClient::new(&config.api)?,
			oauth,
			rules: config.recommendations.clone(),
		})
	}

	/// Runs one remote API call through the quota gate and maps its failure.
	///
	/// Upstream 429s and 401s are handled here for every operation: a 429
	/// becomes an upstream-flagged rate-limit error (which the gate uses to
	/// exhaust the local window), a 401 evicts the stored credential and
	/// demands re-authentication. Everything else goes through `on_error`.
	pub(crate) async fn call_api<T, F, M>(
		&self,
		account: &AccountId,
		op: F,
		on_error: M,
	) -> Result<T>
	where
		F: Future<Output = Result<T, ApiError>>,
		M: FnOnce(ApiError) -> Error,
	{
		self.quota
			.execute(account, Priority::Normal, async {
				match op.await {
					Ok(value) => Ok(value),
					Err(ApiError::Unauthorized) => {
						self.tokens.remove_token(account).await?;

						Err(Error::token(
							"YNAB API rejected the access token, authentication required"
								.to_owned(),
							true,
						))
					},
					Err(ApiError::RateLimited { retry_after }) =>
						Err(Error::RateLimit(RateLimitExceeded {
							message: format!(
								"YNAB API rate limit exceeded. Retry after {} seconds.",
								retry_after.whole_seconds().max(0)
							),
							retry_after,
							upstream: true,
						})),
					Err(err) => Err(on_error(err)),
				}
			})
			.await
	}
}

/// Deserializes the caller's parameter object into a typed struct.
pub(crate) fn parse_params<T>(params: Value) -> Result<T>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(params)
		.map_err(|err| Error::validation(format!("Invalid parameters: {err}")))
}

/// Validates an account-identifier parameter.
pub(crate) fn account_id(email: &str) -> Result<AccountId> {
	AccountId::new(email).map_err(|err| Error::validation(format!("Invalid email parameter: {err}")))
}

/// Validates a `YYYY-MM` month parameter and expands it to the first-of-month
/// date the remote API expects.
pub(crate) fn month_start(month: &str) -> Result<String> {
	let bytes = month.as_bytes();
	let well_formed = bytes.len() == 7
		&& bytes[4] == b'-'
		&& bytes[..4].iter().all(u8::is_ascii_digit)
		&& bytes[5..].iter().all(u8::is_ascii_digit);

	if !well_formed {
		return Err(Error::validation("Month must be in format YYYY-MM (e.g., 2025-04)"));
	}

	Ok(format!("{month}-01"))
}

/// Default upstream-failure mapper: 404 becomes a resource-specific not-found
/// error, 400 surfaces the upstream detail as a validation failure.
pub(crate) fn missing_resource(message: String) -> impl FnOnce(ApiError) -> Error {
	move |err| match err {
		ApiError::NotFound { .. } => Error::not_found(message),
		ApiError::BadRequest { detail } => Error::validation(format!("Invalid request: {detail}")),
		other => Error::Api(other),
	}
}
