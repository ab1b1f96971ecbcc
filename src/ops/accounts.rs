//! Account operations: listing and detail with formatted balances.

// self
use crate::{
	_prelude::*,
	money::format_milliunits,
	ops::{Services, account_id, missing_resource, parse_params},
	ynab::Account,
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
	account_id: String,
}

/// Lists the open-or-closed accounts of a budget, excluding soft-deleted ones.
pub async fn list(services: &Services, params: Value) -> Result<Value> {
	let params: ListParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, "listing accounts");

	let page = services
		.call_api(
			&account,
			services.ynab.accounts(&token, &params.budget_id),
			missing_resource(format!("Budget with ID {} not found", params.budget_id)),
		)
		.await?;
	let accounts: Vec<_> =
		page.accounts.iter().filter(|entry| !entry.deleted).map(account_json).collect();

	Ok(json!({
		"accounts": accounts,
		"server_knowledge": page.server_knowledge,
	}))
}

/// Fetches one account with its note and formatted balances.
pub async fn get(services: &Services, params: Value) -> Result<Value> {
	let params: GetParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, id = %params.account_id, "fetching account");

	let fetched = services
		.call_api(
			&account,
			services.ynab.account(&token, &params.budget_id, &params.account_id),
			missing_resource(format!(
				"Account with ID {} not found in budget {}",
				params.account_id, params.budget_id
			)),
		)
		.await?;
	let mut shaped = account_json(&fetched);

	shaped["note"] = json!(fetched.note);

	Ok(shaped)
}

fn account_json(account: &Account) -> Value {
	json!({
		"id": account.id,
		"name": account.name,
		"type": account.kind,
		"on_budget": account.on_budget,
		"closed": account.closed,
		"balance": account.balance,
		"balance_formatted": format_milliunits(account.balance),
		"cleared_balance": account.cleared_balance,
		"cleared_balance_formatted": format_milliunits(account.cleared_balance),
		"uncleared_balance": account.uncleared_balance,
		"uncleared_balance_formatted": format_milliunits(account.uncleared_balance),
		"transfer_payee_id": account.transfer_payee_id,
		"deleted": account.deleted,
	})
}
