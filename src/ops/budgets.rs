//! Budget operations: listing, detail, and display settings.

// self
use crate::{
	_prelude::*,
	ops::{Services, account_id, missing_resource, parse_params},
	ynab::{BudgetDetail, BudgetSummary},
};

#[derive(Debug, Deserialize)]
struct ListParams {
	email: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BudgetParams {
	email: String,
	budget_id: String,
}

/// Lists every budget visible to the account's token.
pub async fn list(services: &Services, params: Value) -> Result<Value> {
	let params: ListParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, "listing budgets");

	let page = services
		.call_api(
			&account,
			services.ynab.budgets(&token),
			missing_resource("No budgets found for this account".to_owned()),
		)
		.await?;

	Ok(json!({
		"budgets": page.budgets.iter().map(summary_json).collect::<Vec<_>>(),
		"default_budget": page.default_budget.as_ref().map(summary_json),
	}))
}

/// Fetches one budget, reporting the sizes of its embedded collections.
pub async fn get(services: &Services, params: Value) -> Result<Value> {
	let params: BudgetParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, "fetching budget");

	let budget = services
		.call_api(
			&account,
			services.ynab.budget(&token, &params.budget_id),
			missing_resource(format!("Budget with ID {} not found", params.budget_id)),
		)
		.await?;

	Ok(detail_json(&budget))
}

/// Fetches the display settings of one budget.
pub async fn settings(services: &Services, params: Value) -> Result<Value> {
	let params: BudgetParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, "fetching budget settings");

	let settings = services
		.call_api(
			&account,
			services.ynab.budget_settings(&token, &params.budget_id),
			missing_resource(format!("Budget with ID {} not found", params.budget_id)),
		)
		.await?;

	Ok(json!({
		"settings": {
			"date_format": settings.date_format,
			"currency_format": settings.currency_format,
		}
	}))
}

fn summary_json(budget: &BudgetSummary) -> Value {
	json!({
		"id": budget.id,
		"name": budget.name,
		"last_modified_on": budget.last_modified_on,
		"currency_format": budget.currency_format,
		"date_format": budget.date_format,
	})
}

fn detail_json(budget: &BudgetDetail) -> Value {
	let count = |collection: &Option<Vec<Value>>| collection.as_ref().map_or(0, Vec::len);

	json!({
		"id": budget.id,
		"name": budget.name,
		"last_modified_on": budget.last_modified_on,
		"date_format": budget.date_format,
		"currency_format": budget.currency_format,
		"accounts_count": count(&budget.accounts),
		"categories_count": count(&budget.categories),
		"payees_count": count(&budget.payees),
		"months_count": count(&budget.months),
		"server_knowledge": budget.server_knowledge,
	})
}
