//! Payee operations: listing, detail, and per-payee transaction history.

// self
use crate::{
	_prelude::*,
	ops::{Services, account_id, missing_resource, parse_params, transactions::transaction_json},
	ynab::{Payee, TransactionScope},
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
	payee_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionsParams {
	email: String,
	budget_id: String,
	payee_id: String,
	since_date: Option<String>,
}

/// Lists the payees of a budget, excluding soft-deleted ones.
pub async fn list(services: &Services, params: Value) -> Result<Value> {
	let params: ListParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, "listing payees");

	let page = services
		.call_api(
			&account,
			services.ynab.payees(&token, &params.budget_id),
			missing_resource(format!("Budget with ID {} not found", params.budget_id)),
		)
		.await?;
	let payees: Vec<_> =
		page.payees.iter().filter(|payee| !payee.deleted).map(payee_json).collect();

	Ok(json!({
		"payees": payees,
		"server_knowledge": page.server_knowledge,
	}))
}

/// Fetches one payee.
pub async fn get(services: &Services, params: Value) -> Result<Value> {
	let params: GetParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, id = %params.payee_id, "fetching payee");

	let payee = services
		.call_api(
			&account,
			services.ynab.payee(&token, &params.budget_id, &params.payee_id),
			missing_resource(format!(
				"Payee with ID {} not found in budget {}",
				params.payee_id, params.budget_id
			)),
		)
		.await?;

	Ok(payee_json(&payee))
}

/// Lists the transactions of one payee, optionally since a date.
pub async fn transactions(services: &Services, params: Value) -> Result<Value> {
	let params: TransactionsParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, payee = %params.payee_id, "listing payee transactions");

	let page = services
		.call_api(
			&account,
			services.ynab.transactions(
				&token,
				&params.budget_id,
				TransactionScope::Payee(&params.payee_id),
				params.since_date.as_deref(),
				None,
			),
			missing_resource(format!(
				"Payee with ID {} not found in budget {}",
				params.payee_id, params.budget_id
			)),
		)
		.await?;
	let transactions: Vec<_> = page
		.transactions
		.iter()
		.filter(|transaction| !transaction.deleted)
		.map(transaction_json)
		.collect();

	Ok(json!({
		"transactions": transactions,
		"server_knowledge": page.server_knowledge,
	}))
}

fn payee_json(payee: &Payee) -> Value {
	json!({
		"id": payee.id,
		"name": payee.name,
		"transfer_account_id": payee.transfer_account_id,
		"deleted": payee.deleted,
	})
}
