//! Category operations: grouped listing, detail, and month-scoped budget
//! updates.

// self
use crate::{
	_prelude::*,
	money::format_milliunits,
	ops::{Services, account_id, missing_resource, month_start, parse_params},
	ynab::Category,
};

/// Bookkeeping group the API injects into every budget; never shown to callers.
const INTERNAL_MASTER_GROUP: &str = "Internal Master Category";

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
	category_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateParams {
	email: String,
	budget_id: String,
	category_id: String,
	month: String,
	budgeted: i64,
}

/// Lists the category groups of a budget, dropping soft-deleted entries and
/// the internal bookkeeping group.
pub async fn list(services: &Services, params: Value) -> Result<Value> {
	let params: ListParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, "listing categories");

	let page = services
		.call_api(
			&account,
			services.ynab.categories(&token, &params.budget_id),
			missing_resource(format!("Budget with ID {} not found", params.budget_id)),
		)
		.await?;
	let groups: Vec<_> = page
		.category_groups
		.iter()
		.filter(|group| !group.deleted && group.name != INTERNAL_MASTER_GROUP)
		.map(|group| {
			json!({
				"id": group.id,
				"name": group.name,
				"hidden": group.hidden,
				"categories": group
					.categories
					.iter()
					.filter(|category| !category.deleted)
					.map(category_json)
					.collect::<Vec<_>>(),
			})
		})
		.collect();

	Ok(json!({
		"category_groups": groups,
		"server_knowledge": page.server_knowledge,
	}))
}

/// Fetches one category with its current-month amounts.
pub async fn get(services: &Services, params: Value) -> Result<Value> {
	let params: GetParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, id = %params.category_id, "fetching category");

	let category = services
		.call_api(
			&account,
			services.ynab.category(&token, &params.budget_id, &params.category_id),
			missing_resource(format!(
				"Category with ID {} not found in budget {}",
				params.category_id, params.budget_id
			)),
		)
		.await?;

	Ok(category_json(&category))
}

/// Sets a category's budgeted amount (milliunits) for one `YYYY-MM` month.
pub async fn update(services: &Services, params: Value) -> Result<Value> {
	let params: UpdateParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let month = month_start(&params.month)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(
		%account,
		budget = %params.budget_id,
		id = %params.category_id,
		month = %params.month,
		budgeted = params.budgeted,
		"updating category budget",
	);

	let updated = services
		.call_api(
			&account,
			services.ynab.update_month_category(
				&token,
				&params.budget_id,
				&month,
				&params.category_id,
				params.budgeted,
			),
			missing_resource(format!(
				"Category with ID {} not found in budget {}",
				params.category_id, params.budget_id
			)),
		)
		.await?;

	Ok(json!({
		"month": params.month,
		"category": category_json(&updated),
	}))
}

/// Reshapes a category with formatted amounts; shared with the month and
/// allocation operations.
pub(crate) fn category_json(category: &Category) -> Value {
	json!({
		"id": category.id,
		"name": category.name,
		"hidden": category.hidden,
		"category_group_id": category.category_group_id,
		"budgeted": category.budgeted,
		"budgeted_formatted": format_milliunits(category.budgeted),
		"activity": category.activity,
		"activity_formatted": format_milliunits(category.activity),
		"balance": category.balance,
		"balance_formatted": format_milliunits(category.balance),
		"goal_type": category.goal_type,
		"goal_target": category.goal_target,
		"goal_target_month": category.goal_target_month,
		"goal_percentage_complete": category.goal_percentage_complete,
	})
}
