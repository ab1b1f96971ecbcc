//! Derived budgeting operations: batch category allocation and allocation
//! recommendations.

// self
use crate::{
	_prelude::*,
	config::RecommendationRules,
	money::{self, AmountUnit, format_milliunits},
	ops::{Services, account_id, missing_resource, month_start, parse_params},
	ynab::{ApiError, CategoriesPage, Month},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignParams {
	email: String,
	budget_id: String,
	month: String,
	category_allocations: Vec<AllocationRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllocationRequest {
	category_id: String,
	amount: f64,
	unit: Option<AmountUnit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecommendParams {
	email: String,
	budget_id: String,
	month: String,
	available_amount: Option<f64>,
	unit: Option<AmountUnit>,
}

/// Assigns amounts to several categories in one batch.
///
/// The whole batch is rejected up front when the requested total exceeds the
/// month's available-to-assign balance; nothing is mutated in that case.
/// Otherwise allocations apply sequentially (read current budgeted, add,
/// write back) and the response reports each category's before/after.
pub async fn assign(services: &Services, params: Value) -> Result<Value> {
	let params: AssignParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let month = month_start(&params.month)?;

	if params.category_allocations.is_empty() {
		return Err(Error::validation("Category allocations must not be empty"));
	}

	// Resolve every amount before any I/O so an ambiguous entry rejects the
	// whole batch.
	let mut requested = Vec::with_capacity(params.category_allocations.len());

	for allocation in &params.category_allocations {
		requested
			.push((allocation.category_id.clone(), money::to_milliunits(allocation.amount, allocation.unit)?));
	}

	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, month = %params.month, "assigning to categories");

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
	let available = fetched.to_be_budgeted;
	let total: i64 = requested.iter().map(|(_, amount)| amount).sum();

	if total > available {
		return Ok(json!({
			"success": false,
			"message": "Requested allocation exceeds available funds",
			"available": available,
			"available_formatted": format_milliunits(available),
			"requested": total,
			"requested_formatted": format_milliunits(total),
		}));
	}

	let mut applied = Vec::with_capacity(requested.len());

	for (category_id, amount) in requested {
		let current = services
			.call_api(
				&account,
				services.ynab.month_category(&token, &params.budget_id, &month, &category_id),
				missing_resource(format!(
					"Category with ID {category_id} not found in budget {}",
					params.budget_id
				)),
			)
			.await?;
		let new_budgeted = current.budgeted + amount;
		let updated = services
			.call_api(
				&account,
				services.ynab.update_month_category(
					&token,
					&params.budget_id,
					&month,
					&category_id,
					new_budgeted,
				),
				missing_resource(format!(
					"Category with ID {category_id} not found in budget {}",
					params.budget_id
				)),
			)
			.await?;

		applied.push(json!({
			"category_id": updated.id,
			"name": updated.name,
			"previous_budgeted": current.budgeted,
			"previous_budgeted_formatted": format_milliunits(current.budgeted),
			"allocated": amount,
			"allocated_formatted": format_milliunits(amount),
			"new_budgeted": updated.budgeted,
			"new_budgeted_formatted": format_milliunits(updated.budgeted),
		}));
	}

	let remaining = available - total;

	Ok(json!({
		"success": true,
		"month": params.month,
		"allocations": applied,
		"total_allocated": total,
		"total_allocated_formatted": format_milliunits(total),
		"remaining": remaining,
		"remaining_formatted": format_milliunits(remaining),
	}))
}

/// Recommends how to allocate the month's available balance across four
/// priority tiers.
pub async fn recommend(services: &Services, params: Value) -> Result<Value> {
	let params: RecommendParams = parse_params(params)?;
	let account = account_id(&params.email)?;
	let month = month_start(&params.month)?;
	let token = services.tokens.fresh_access_token(&account).await?;

	tracing::info!(%account, budget = %params.budget_id, month = %params.month, "computing allocation recommendations");

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
	let available = match params.available_amount {
		Some(amount) => money::to_milliunits(amount, params.unit)?,
		None => fetched.to_be_budgeted,
	};
	let page = services
		.call_api(
			&account,
			services.ynab.categories(&token, &params.budget_id),
			missing_resource(format!("Budget with ID {} not found", params.budget_id)),
		)
		.await?;
	// A budget's first month has no predecessor; treat that as "no history".
	let prior_start = format!("{}-01", previous_month(&params.month));
	let prior = services
		.call_api(
			&account,
			async {
				match services.ynab.month(&token, &params.budget_id, &prior_start).await {
					Ok(month) => Ok(Some(month)),
					Err(ApiError::NotFound { .. }) => Ok(None),
					Err(err) => Err(err),
				}
			},
			missing_resource(format!("Budget with ID {} not found", params.budget_id)),
		)
		.await?;
	let facts = collect_facts(&page, prior.as_ref());
	let recommendations = rank(&services.rules, &facts, available);
	let total: i64 = recommendations.iter().map(|rec| rec.amount).sum();

	Ok(json!({
		"month": params.month,
		"available_to_assign": available,
		"available_to_assign_formatted": format_milliunits(available),
		"recommendations": recommendations,
		"total_recommended": total,
		"total_recommended_formatted": format_milliunits(total),
		"unallocated": available - total,
		"unallocated_formatted": format_milliunits(available - total),
	}))
}

/// One category's inputs to the ranking, denormalized from the category
/// listing and the prior month.
#[derive(Clone, Debug, Default)]
struct CategoryFacts {
	id: String,
	name: String,
	group: String,
	budgeted: i64,
	balance: i64,
	goal_target: Option<i64>,
	goal_under_funded: Option<i64>,
	has_goal: bool,
	/// Prior-month outflow as a positive number of milliunits.
	prior_spend: i64,
}

/// A single ranked allocation suggestion.
#[derive(Clone, Debug, Serialize)]
struct Recommendation {
	category_id: String,
	name: String,
	amount: i64,
	amount_formatted: String,
	priority: u8,
	reason: String,
}

fn collect_facts(page: &CategoriesPage, prior: Option<&Month>) -> Vec<CategoryFacts> {
	let prior_spend: HashMap<&str, i64> = prior
		.map(|month| {
			month
				.categories
				.iter()
				// Activity is negative for outflows; keep spend positive.
				.map(|category| (category.id.as_str(), -category.activity))
				.collect()
		})
		.unwrap_or_default();

	page.category_groups
		.iter()
		.filter(|group| !group.deleted && !group.hidden)
		.flat_map(|group| {
			group.categories.iter().filter(|category| !category.deleted && !category.hidden).map(
				|category| CategoryFacts {
					id: category.id.clone(),
					name: category.name.clone(),
					group: group.name.clone(),
					budgeted: category.budgeted,
					balance: category.balance,
					goal_target: category.goal_target,
					goal_under_funded: category.goal_under_funded,
					has_goal: category.goal_type.is_some(),
					prior_spend: prior_spend.get(category.id.as_str()).copied().unwrap_or(0).max(0),
				},
			)
		})
		.collect()
}

/// Greedy ranking state: categories claimed by an earlier tier never reappear
/// in a later one.
#[derive(Debug, Default)]
struct Ranking {
	remaining: i64,
	recommendations: Vec<Recommendation>,
}
impl Ranking {
	fn claimed(&self, fact: &CategoryFacts) -> bool {
		self.recommendations.iter().any(|rec| rec.category_id == fact.id)
	}

	fn suggest(&mut self, fact: &CategoryFacts, needed: i64, priority: u8, reason: String) {
		let amount = needed.min(self.remaining);

		if amount <= 0 {
			return;
		}

		self.remaining -= amount;
		self.recommendations.push(Recommendation {
			category_id: fact.id.clone(),
			name: fact.name.clone(),
			amount,
			amount_formatted: format_milliunits(amount),
			priority,
			reason,
		});
	}
}

/// Greedily assigns the available balance across the four tiers in order.
fn rank(rules: &RecommendationRules, facts: &[CategoryFacts], available: i64) -> Vec<Recommendation> {
	let mut ranking = Ranking { remaining: available.max(0), ..Ranking::default() };

	// Tier 1: underfunded goals.
	for fact in facts.iter().filter(|fact| fact.has_goal) {
		let needed = fact
			.goal_under_funded
			.unwrap_or_else(|| fact.goal_target.unwrap_or(0) - fact.budgeted);

		if needed > 0 {
			ranking.suggest(
				fact,
				needed,
				1,
				format!("Underfunded goal: needs {} more", format_milliunits(needed)),
			);
		}
	}

	// Tier 2: overspent essential categories.
	for fact in facts {
		if ranking.claimed(fact) || !group_matches(&rules.essential_groups, &fact.group) {
			continue;
		}
		if fact.balance < 0 {
			ranking.suggest(
				fact,
				-fact.balance,
				2,
				format!("Essential category overspent by {}", format_milliunits(-fact.balance)),
			);
		}
	}

	// Tier 3: material prior-month spend not yet covered.
	for fact in facts {
		if ranking.claimed(fact) || fact.prior_spend < rules.material_spend_floor {
			continue;
		}
		if fact.balance < fact.prior_spend {
			ranking.suggest(
				fact,
				fact.prior_spend - fact.balance,
				3,
				format!(
					"Spent {} last month but only {} is available",
					format_milliunits(fact.prior_spend),
					format_milliunits(fact.balance)
				),
			);
		}
	}

	// Tier 4: split whatever is left evenly across savings groups.
	let savings: Vec<_> = facts
		.iter()
		.filter(|fact| !ranking.claimed(fact) && group_matches(&rules.savings_groups, &fact.group))
		.collect();

	if ranking.remaining > 0 && !savings.is_empty() {
		let share = ranking.remaining / savings.len() as i64;

		for fact in savings {
			ranking.suggest(fact, share, 4, "Savings allocation from remaining funds".to_owned());
		}
	}

	ranking.recommendations
}

fn group_matches(allowlist: &[String], group: &str) -> bool {
	allowlist.iter().any(|name| name.eq_ignore_ascii_case(group))
}

fn previous_month(month: &str) -> String {
	let year: i32 = month[..4].parse().unwrap_or(0);
	let ordinal: u8 = month[5..7].parse().unwrap_or(1);

	if ordinal <= 1 {
		format!("{:04}-12", year - 1)
	} else {
		format!("{year:04}-{:02}", ordinal - 1)
	}
}
