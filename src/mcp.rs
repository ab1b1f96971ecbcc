//! Tool-call dispatch and response envelopes.

pub mod schema;

// self
use crate::{_prelude::*, error::RateLimitExceeded, ops, ops::Services};

/// Routes inbound tool calls to their operations and shapes every outcome
/// into a protocol envelope.
///
/// Errors never escape [`Self::handle`]; each one becomes a structured error
/// envelope so a single bad request cannot take the process down.
pub struct Dispatcher {
	services: Arc<Services>,
}
impl Dispatcher {
	/// Creates a dispatcher over the shared service set.
	pub fn new(services: Arc<Services>) -> Self {
		Self { services }
	}

	/// Handles one tool call, returning either a success or an error envelope.
	pub async fn handle(&self, function: &str, params: Value) -> Value {
		match self.dispatch(function, params).await {
			Ok(result) => json!({ "status": "success", "result": result }),
			Err(err) => {
				tracing::warn!(%function, %err, "tool call failed");

				error_envelope(&err)
			},
		}
	}

	async fn dispatch(&self, function: &str, params: Value) -> Result<Value> {
		let services = &*self.services;

		match function {
			"list_ynab_accounts" => ops::auth::list(services, params).await,
			"authenticate_ynab_account" => ops::auth::authenticate(services, params).await,
			"remove_ynab_account" => ops::auth::remove(services, params).await,
			"list_budgets" => ops::budgets::list(services, params).await,
			"get_budget" => ops::budgets::get(services, params).await,
			"get_budget_settings" => ops::budgets::settings(services, params).await,
			"list_accounts" => ops::accounts::list(services, params).await,
			"get_account" => ops::accounts::get(services, params).await,
			"list_categories" => ops::categories::list(services, params).await,
			"get_category" => ops::categories::get(services, params).await,
			"update_category" => ops::categories::update(services, params).await,
			"list_months" => ops::months::list(services, params).await,
			"get_month" => ops::months::get(services, params).await,
			"list_payees" => ops::payees::list(services, params).await,
			"get_payee" => ops::payees::get(services, params).await,
			"get_payee_transactions" => ops::payees::transactions(services, params).await,
			"list_transactions" => ops::transactions::list(services, params).await,
			"get_transaction" => ops::transactions::get(services, params).await,
			"create_transaction" => ops::transactions::create(services, params).await,
			"update_transaction" => ops::transactions::update(services, params).await,
			"bulk_create_transactions" => ops::transactions::bulk_create(services, params).await,
			"list_scheduled_transactions" => ops::scheduled::list(services, params).await,
			"get_scheduled_transaction" => ops::scheduled::get(services, params).await,
			"create_scheduled_transaction" => ops::scheduled::create(services, params).await,
			"update_scheduled_transaction" => ops::scheduled::update(services, params).await,
			"delete_scheduled_transaction" => ops::scheduled::delete(services, params).await,
			"assign_to_categories" => ops::allocation::assign(services, params).await,
			"get_recommended_allocations" => ops::allocation::recommend(services, params).await,
			other => Err(Error::validation(format!("Unsupported function: {other}"))),
		}
	}
}

/// Maps an error onto its protocol envelope.
///
/// `authenticationRequired` and `retryAfter` sit at the top level of the
/// envelope, next to the `error` object.
pub fn error_envelope(err: &Error) -> Value {
	let mut envelope = json!({
		"error": {
			"message": err.to_string(),
			"code": error_code(err),
		}
	});

	match err {
		Error::Token { authentication_required: true, .. } => {
			envelope["authenticationRequired"] = json!(true);
		},
		Error::RateLimit(RateLimitExceeded { retry_after, .. }) => {
			envelope["retryAfter"] = json!(retry_after.whole_seconds().max(0));
		},
		_ => {},
	}

	envelope
}

fn error_code(err: &Error) -> &'static str {
	match err {
		Error::Validation { .. } => "VALIDATION_ERROR",
		Error::Token { .. } => "TOKEN_ERROR",
		Error::RateLimit(info) =>
			if info.upstream {
				"YNAB_RATE_LIMIT_EXCEEDED"
			} else {
				"RATE_LIMIT_EXCEEDED"
			},
		Error::NotFound { .. } => "NOT_FOUND_ERROR",
		Error::Api(_) => "UPSTREAM_ERROR",
		Error::Storage(_) => "STORAGE_ERROR",
		Error::Config(_) => "INTERNAL_ERROR",
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::RateLimitExceeded;

	#[test]
	fn validation_errors_map_to_plain_envelopes() {
		let envelope = error_envelope(&Error::validation("Email parameter is required"));

		assert_eq!(envelope["error"]["message"], "Email parameter is required");
		assert_eq!(envelope["error"]["code"], "VALIDATION_ERROR");
		assert!(envelope.get("authenticationRequired").is_none());
		assert!(envelope.get("retryAfter").is_none());
	}

	#[test]
	fn token_errors_flag_authentication_at_the_top_level() {
		let envelope = error_envelope(&Error::token(
			"No token found for account: a@x.com".to_owned(),
			true,
		));

		assert_eq!(envelope["error"]["code"], "TOKEN_ERROR");
		assert_eq!(envelope["authenticationRequired"], true);

		let retained =
			error_envelope(&Error::token("Failed to refresh token: timeout".to_owned(), false));

		assert!(retained.get("authenticationRequired").is_none());
	}

	#[test]
	fn rate_limit_errors_carry_retry_after_seconds() {
		let local = error_envelope(&Error::RateLimit(RateLimitExceeded {
			message: "Rate limit exceeded for a@x.com. Resets in 12 minutes.".into(),
			retry_after: Duration::seconds(720),
			upstream: false,
		}));

		assert_eq!(local["error"]["code"], "RATE_LIMIT_EXCEEDED");
		assert_eq!(local["retryAfter"], 720);

		let upstream = error_envelope(&Error::RateLimit(RateLimitExceeded {
			message: "YNAB API rate limit exceeded. Retry after 900 seconds.".into(),
			retry_after: Duration::seconds(900),
			upstream: true,
		}));

		assert_eq!(upstream["error"]["code"], "YNAB_RATE_LIMIT_EXCEEDED");
		assert_eq!(upstream["retryAfter"], 900);
	}

	#[test]
	fn not_found_errors_keep_their_resource_message() {
		let envelope = error_envelope(&Error::not_found("Budget with ID b-1 not found"));

		assert_eq!(envelope["error"]["code"], "NOT_FOUND_ERROR");
		assert_eq!(envelope["error"]["message"], "Budget with ID b-1 not found");
	}
}
