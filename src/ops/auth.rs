//! Authentication operations: start and complete the OAuth flow, list and
//! remove stored accounts.

// self
use crate::{
	_prelude::*,
	auth::AccountId,
	oauth::OAuthError,
	ops::{Services, account_id, parse_params},
};

#[derive(Debug, Deserialize)]
struct AuthenticateParams {
	email: String,
	auth_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmailParams {
	email: String,
}

/// Starts or completes the authorization flow for one account.
///
/// Without `auth_code` this returns the authorization URL the user must visit;
/// with it, the code is exchanged and the grant stored.
pub async fn authenticate(services: &Services, params: Value) -> Result<Value> {
	let params: AuthenticateParams = parse_params(params)?;
	let account = account_id(&params.email)?;

	match params.auth_code {
		Some(code) => complete(services, account, &code).await,
		None => Ok(start(services, &account)),
	}
}

/// Removes the stored credential for one account.
pub async fn remove(services: &Services, params: Value) -> Result<Value> {
	let params: EmailParams = parse_params(params)?;
	let account = account_id(&params.email)?;

	if services.tokens.remove_token(&account).await? {
		Ok(json!({
			"status": "success",
			"message": format!("Authentication removed for {account}"),
		}))
	} else {
		Ok(json!({
			"status": "not_found",
			"message": format!("No authentication found for {account}"),
		}))
	}
}

/// Lists every stored account with its authentication state.
pub async fn list(services: &Services, _params: Value) -> Result<Value> {
	let statuses = services.tokens.list_accounts().await?;

	Ok(json!(statuses))
}

fn start(services: &Services, account: &AccountId) -> Value {
	let auth_url = services.oauth.authorization_url();

	tracing::info!(%account, "authorization flow started");

	json!({
		"status": "auth_required",
		"message": "Authentication required",
		"auth_url": auth_url.as_str(),
		"email": account,
	})
}

async fn complete(services: &Services, account: AccountId, code: &str) -> Result<Value> {
	let grant = services.oauth.exchange_code(code).await.map_err(exchange_failure)?;

	services.tokens.set_token(account.clone(), grant).await?;

	Ok(json!({
		"status": "success",
		"message": "Authentication completed successfully",
		"email": account,
		"authenticated": true,
	}))
}

fn exchange_failure(err: OAuthError) -> Error {
	match err {
		OAuthError::Rejected { reason, .. } =>
			Error::token(format!("Invalid authorization code: {reason}"), true),
		err => Error::token(format!("Failed to complete authentication: {err}"), true),
	}
}
