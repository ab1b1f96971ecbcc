//! Scheduled transaction operations: listing, detail, creation, updates, and
//! deletion.

// self
use crate::{
	_prelude::*,
	money::{self, AmountUnit, format_milliunits},
	ops::{Services, account_id, missing_resource, parse_params},
	ynab::{ApiError, ScheduledTransaction},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
	email: String,
	budget_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetParams {
	email: String,
	budget_id: String,
	scheduled_transaction_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateParams {
	email: String,
	budget_id: String,
	scheduled_transaction: Value,
	unit: Option<AmountUnit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateParams {
	email: String,
	budget_id: String,
	scheduled_transaction_id: String,
	scheduled_transaction: Value,
	unit: Option<AmountUnit>,
}

/// Lists the scheduled transactions of a budget, excluding soft-deleted ones.
pub async fn list(services: &Services, params: Value) -> Result<Value> {
	let params: ListParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, "listing scheduled transactions");

	let page = services
		.call_api(
			&account,
			services.ynab.scheduled_transactions(&token, &params.budget_id),
			missing_resource(format!("Budget not found with ID {}", params.budget_id)),
		)
		.await?;
	let scheduled: Vec<_> =
		page.scheduled_transactions.iter().filter(|entry| !entry.deleted).map(scheduled_json).collect();

	Ok(json!({
		"scheduled_transactions": scheduled,
		"server_knowledge": page.server_knowledge,
	}))
}

/// Fetches one scheduled transaction.
pub async fn get(services: &Services, params: Value) -> Result<Value> {
	let params: GetParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, id = %params.scheduled_transaction_id, "fetching scheduled transaction");

	let scheduled = services
		.call_api(
			&account,
			services.ynab.scheduled_transaction(
				&token,
				&params.budget_id,
				&params.scheduled_transaction_id,
			),
			missing_resource(format!(
				"Scheduled transaction with ID {} not found in budget {}",
				params.scheduled_transaction_id, params.budget_id
			)),
		)
		.await?;

	Ok(scheduled_json(&scheduled))
}

/// Creates a scheduled transaction from the caller-supplied template.
pub async fn create(services: &Services, params: Value) -> Result<Value> {
	let params: CreateParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let mut template = params.scheduled_transaction;

	require_field(&template, "account_id", "Scheduled transaction must include account_id")?;
	require_field(
		&template,
		"date_first",
		"Scheduled transaction must include date_first (format: YYYY-MM-DD)",
	)?;
	require_field(&template, "amount", "Scheduled transaction must include amount")?;
	require_field(&template, "frequency", "Scheduled transaction must include frequency")?;
	normalize_amount(&mut template, params.unit)?;

	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, "creating scheduled transaction");

	let created = services
		.call_api(
			&account,
			services.ynab.create_scheduled_transaction(&token, &params.budget_id, &template),
			invalid_data(format!("Budget not found with ID {}", params.budget_id)),
		)
		.await?;

	Ok(scheduled_json(&created))
}

/// Replaces the mutable fields of one scheduled transaction.
pub async fn update(services: &Services, params: Value) -> Result<Value> {
	let params: UpdateParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let mut template = params.scheduled_transaction;

	if template.get("amount").is_some() {
		normalize_amount(&mut template, params.unit)?;
	}

	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, id = %params.scheduled_transaction_id, "updating scheduled transaction");

	let updated = services
		.call_api(
			&account,
			services.ynab.update_scheduled_transaction(
				&token,
				&params.budget_id,
				&params.scheduled_transaction_id,
				&template,
			),
			invalid_data(format!(
				"Scheduled transaction with ID {} not found in budget {}",
				params.scheduled_transaction_id, params.budget_id
			)),
		)
		.await?;

	Ok(scheduled_json(&updated))
}

/// Deletes one scheduled transaction.
pub async fn delete(services: &Services, params: Value) -> Result<Value> {
	let params: GetParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, id = %params.scheduled_transaction_id, "deleting scheduled transaction");

	services
		.call_api(
			&account,
			services.ynab.delete_scheduled_transaction(
				&token,
				&params.budget_id,
				&params.scheduled_transaction_id,
			),
			missing_resource(format!(
				"Scheduled transaction with ID {} not found in budget {}",
				params.scheduled_transaction_id, params.budget_id
			)),
		)
		.await?;

	Ok(json!({
		"success": true,
		"message": format!(
			"Scheduled transaction {} deleted successfully",
			params.scheduled_transaction_id
		),
	}))
}

fn require_field(template: &Value, field: &str, message: &'static str) -> Result<()> {
	if template.get(field).is_none_or(Value::is_null) {
		return Err(Error::validation(message));
	}

	Ok(())
}

/// Converts the template's `amount` to milliunits according to the declared
/// unit, rewriting it in place.
fn normalize_amount(template: &mut Value, unit: Option<AmountUnit>) -> Result<()> {
	let Some(amount) = template.get("amount").and_then(Value::as_f64) else {
		return Err(Error::validation("Scheduled transaction amount must be a number"));
	};
	let milliunits = money::to_milliunits(amount, unit)?;

	template["amount"] = json!(milliunits);

	Ok(())
}

fn invalid_data(not_found: String) -> impl FnOnce(ApiError) -> Error {
	move |err| match err {
		ApiError::NotFound { .. } => Error::not_found(not_found),
		ApiError::BadRequest { detail } =>
			Error::validation(format!("Invalid scheduled transaction data: {detail}")),
		other => Error::Api(other),
	}
}

fn scheduled_json(scheduled: &ScheduledTransaction) -> Value {
	json!({
		"id": scheduled.id,
		"date_first": scheduled.date_first,
		"date_next": scheduled.date_next,
		"frequency": scheduled.frequency,
		"amount": scheduled.amount,
		"amount_formatted": format_milliunits(scheduled.amount),
		"memo": scheduled.memo,
		"flag_color": scheduled.flag_color,
		"account_id": scheduled.account_id,
		"account_name": scheduled.account_name,
		"payee_id": scheduled.payee_id,
		"payee_name": scheduled.payee_name,
		"category_id": scheduled.category_id,
		"category_name": scheduled.category_name,
		"transfer_account_id": scheduled.transfer_account_id,
		"deleted": scheduled.deleted,
	})
}
