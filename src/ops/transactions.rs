//! Transaction operations: filtered listing, detail, creation (single and
//! bulk), and updates.

// self
use crate::{
	_prelude::*,
	money::format_milliunits,
	ops::{Services, account_id, missing_resource, parse_params},
	ynab::{TransactionDetail, TransactionScope},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
	email: String,
	budget_id: String,
	account_id: Option<String>,
	category_id: Option<String>,
	payee_id: Option<String>,
	since_date: Option<String>,
	#[serde(rename = "type")]
	kind: Option<String>,
	limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetParams {
	email: String,
	budget_id: String,
	transaction_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateParams {
	email: String,
	budget_id: String,
	transaction: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateParams {
	email: String,
	budget_id: String,
	transaction_id: String,
	transaction: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkCreateParams {
	email: String,
	budget_id: String,
	transactions: Vec<Value>,
}

/// Lists transactions, scoped to an account, category, or payee when one is
/// given, with optional since-date, kind, and count filters.
pub async fn list(services: &Services, params: Value) -> Result<Value> {
	let params: ListParams = parse_params(params)?;
	let account = account_id(&params.email)?;

	if let Some(kind) = params.kind.as_deref()
		&& !matches!(kind, "uncategorized" | "unapproved")
	{
		return Err(Error::validation(
			"Transaction type filter must be \"uncategorized\" or \"unapproved\"",
		));
	}

	let scope = if let Some(id) = params.account_id.as_deref() {
		TransactionScope::Account(id)
	} else if let Some(id) = params.category_id.as_deref() {
		TransactionScope::Category(id)
	} else if let Some(id) = params.payee_id.as_deref() {
		TransactionScope::Payee(id)
	} else {
		TransactionScope::Budget
	};
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, "listing transactions");

	let page = services
		.call_api(
			&account,
			services.ynab.transactions(
				&token,
				&params.budget_id,
				scope,
				params.since_date.as_deref(),
				params.kind.as_deref(),
			),
			missing_resource(format!("Budget with ID {} not found", params.budget_id)),
		)
		.await?;
	let mut transactions: Vec<_> = page
		.transactions
		.iter()
		.filter(|transaction| !transaction.deleted)
		.map(transaction_json)
		.collect();

	if let Some(limit) = params.limit {
		transactions.truncate(limit);
	}

	Ok(json!({
		"transactions": transactions,
		"server_knowledge": page.server_knowledge,
	}))
}

/// Fetches one transaction.
pub async fn get(services: &Services, params: Value) -> Result<Value> {
	let params: GetParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, id = %params.transaction_id, "fetching transaction");

	let transaction = services
		.call_api(
			&account,
			services.ynab.transaction(&token, &params.budget_id, &params.transaction_id),
			missing_resource(format!(
				"Transaction with ID {} not found in budget {}",
				params.transaction_id, params.budget_id
			)),
		)
		.await?;

	Ok(transaction_json(&transaction))
}

/// Creates one transaction from the caller-supplied object.
pub async fn create(services: &Services, params: Value) -> Result<Value> {
	let params: CreateParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, "creating transaction");

	let body = json!({ "transaction": params.transaction });
	let saved = services
		.call_api(
			&account,
			services.ynab.create_transactions(&token, &params.budget_id, &body),
			missing_resource(format!("Budget with ID {} not found", params.budget_id)),
		)
		.await?;

	Ok(json!({
		"transaction": saved.transaction.as_ref().map(transaction_json),
		"transaction_ids": saved.transaction_ids,
		"duplicate_import_ids": saved.duplicate_import_ids,
	}))
}

/// Replaces the mutable fields of one transaction.
pub async fn update(services: &Services, params: Value) -> Result<Value> {
	let params: UpdateParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, id = %params.transaction_id, "updating transaction");

	let updated = services
		.call_api(
			&account,
			services.ynab.update_transaction(
				&token,
				&params.budget_id,
				&params.transaction_id,
				&params.transaction,
			),
			missing_resource(format!(
				"Transaction with ID {} not found in budget {}",
				params.transaction_id, params.budget_id
			)),
		)
		.await?;

	Ok(transaction_json(&updated))
}

/// Creates several transactions in one request.
pub async fn bulk_create(services: &Services, params: Value) -> Result<Value> {
	let params: BulkCreateParams = parse_params(params)?;
	let account = account_id(&params.email)?;

	if params.transactions.is_empty() {
		return Err(Error::validation("Transactions array must not be empty"));
	}

	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(
		%account,
		budget = %params.budget_id,
		count = params.transactions.len(),
		"bulk creating transactions",
	);

	let body = json!({ "transactions": params.transactions });
	let saved = services
		.call_api(
			&account,
			services.ynab.create_transactions(&token, &params.budget_id, &body),
			missing_resource(format!("Budget with ID {} not found", params.budget_id)),
		)
		.await?;

	Ok(json!({
		"transaction_ids": saved.transaction_ids,
		"transactions": saved.transactions.iter().map(transaction_json).collect::<Vec<_>>(),
		"duplicate_import_ids": saved.duplicate_import_ids,
	}))
}

/// Reshapes a transaction with formatted amounts and flattened split lines.
pub(crate) fn transaction_json(transaction: &TransactionDetail) -> Value {
	let mut shaped = json!({
		"id": transaction.id,
		"date": transaction.date,
		"amount": transaction.amount,
		"amount_formatted": format_milliunits(transaction.amount),
		"memo": transaction.memo,
		"cleared": transaction.cleared,
		"approved": transaction.approved,
		"flag_color": transaction.flag_color,
		"account_id": transaction.account_id,
		"account_name": transaction.account_name,
		"payee_id": transaction.payee_id,
		"payee_name": transaction.payee_name,
		"category_id": transaction.category_id,
		"category_name": transaction.category_name,
		"transfer_account_id": transaction.transfer_account_id,
		"import_id": transaction.import_id,
		"deleted": transaction.deleted,
	});

	if !transaction.subtransactions.is_empty() {
		shaped["subtransactions"] = transaction
			.subtransactions
			.iter()
			.filter(|split| !split.deleted)
			.map(|split| {
				json!({
					"id": split.id,
					"amount": split.amount,
					"amount_formatted": format_milliunits(split.amount),
					"memo": split.memo,
					"payee_id": split.payee_id,
					"payee_name": split.payee_name,
					"category_id": split.category_id,
					"category_name": split.category_name,
				})
			})
			.collect();
	}

	shaped
}
