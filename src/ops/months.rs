//! Budget month operations: listing with totals and month detail with
//! categories.

// self
use crate::{
	_prelude::*,
	money::format_milliunits,
	ops::{Services, account_id, categories::category_json, missing_resource, month_start, parse_params},
	ynab::Month,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
	email: String,
	budget_id: String,
	since_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetParams {
	email: String,
	budget_id: String,
	month: String,
}

/// Lists the months of a budget with formatted totals, optionally only those
/// on or after `sinceDate`.
pub async fn list(services: &Services, params: Value) -> Result<Value> {
	let params: ListParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, "listing months");

	let page = services
		.call_api(
			&account,
			services.ynab.months(&token, &params.budget_id),
			missing_resource(format!("Budget with ID {} not found", params.budget_id)),
		)
		.await?;
	let months: Vec<_> = page
		.months
		.iter()
		.filter(|month| {
			// Month dates are `YYYY-MM-DD`, so lexicographic comparison is chronological.
			params.since_date.as_deref().is_none_or(|since| month.month.as_str() >= since)
		})
		.map(totals_json)
		.collect();

	Ok(json!({
		"months": months,
		"server_knowledge": page.server_knowledge,
	}))
}

/// Fetches one `YYYY-MM` month with its categories.
pub async fn get(services: &Services, params: Value) -> Result<Value> {
	let params: GetParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let month = month_start(&params.month)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, month = %params.month, "fetching month");

	let fetched = services
		.call_api(
			&account,
			services.ynab.month(&token, &params.budget_id, &month),
			missing_resource(format!(
				"Month {} not found in budget {}",
				params.month, params.budget_id
			)),
		)
		.await?;
	let mut shaped = totals_json(&fetched);

	shaped["categories"] = fetched
		.categories
		.iter()
		.filter(|category| !category.deleted)
		.map(category_json)
		.collect();

	Ok(shaped)
}

fn totals_json(month: &Month) -> Value {
	json!({
		"month": month.month,
		"note": month.note,
		"income": month.income,
		"income_formatted": format_milliunits(month.income),
		"budgeted": month.budgeted,
		"budgeted_formatted": format_milliunits(month.budgeted),
		"activity": month.activity,
		"activity_formatted": format_milliunits(month.activity),
		"to_be_budgeted": month.to_be_budgeted,
		"to_be_budgeted_formatted": format_milliunits(month.to_be_budgeted),
		"age_of_money": month.age_of_money,
	})
}
