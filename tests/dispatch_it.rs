// crates.io
use httpmock::prelude::*;
// self
use ynab_mcp::{_preludet::*, mcp::Dispatcher, ops::Services};

async fn authed_dispatcher(server: &MockServer) -> Dispatcher {
	let services: Services = build_test_services(&server.base_url(), &server.base_url());

	services
		.tokens
		.set_token(account("a@x.com"), grant("access-1", None, 3_600))
		.await
		.expect("Seeding the credential should succeed.");

	Dispatcher::new(Arc::new(services))
}

#[tokio::test]
async fn unknown_functions_return_a_validation_envelope() {
	let server = MockServer::start_async().await;
	let dispatcher = authed_dispatcher(&server).await;
	let envelope = dispatcher.handle("frobnicate", json!({})).await;

	assert_eq!(envelope["error"]["code"], "VALIDATION_ERROR");
	assert_eq!(envelope["error"]["message"], "Unsupported function: frobnicate");
}

#[tokio::test]
async fn missing_parameters_are_rejected_up_front() {
	let server = MockServer::start_async().await;
	let dispatcher = authed_dispatcher(&server).await;
	let envelope = dispatcher.handle("list_budgets", json!({})).await;

	assert_eq!(envelope["error"]["code"], "VALIDATION_ERROR");
	assert!(
		envelope["error"]["message"]
			.as_str()
			.expect("Error message should be a string.")
			.starts_with("Invalid parameters:")
	);
}

#[tokio::test]
async fn unauthenticated_accounts_are_flagged_at_the_top_level() {
	let server = MockServer::start_async().await;
	let dispatcher = authed_dispatcher(&server).await;
	let envelope = dispatcher.handle("list_budgets", json!({ "email": "ghost@x.com" })).await;

	assert_eq!(envelope["error"]["code"], "TOKEN_ERROR");
	assert_eq!(envelope["error"]["message"], "No token found for account: ghost@x.com");
	assert_eq!(envelope["authenticationRequired"], true);
}

#[tokio::test]
async fn account_listing_filters_soft_deleted_and_formats_balances() {
	let server = MockServer::start_async().await;
	let dispatcher = authed_dispatcher(&server).await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/budgets/b-1/accounts");
			then.status(200).json_body(json!({
				"data": {
					"accounts": [
						{
							"id": "a-1",
							"name": "Checking",
							"type": "checking",
							"on_budget": true,
							"closed": false,
							"balance": 1_234_560,
							"cleared_balance": 1_000_000,
							"uncleared_balance": 234_560,
							"transfer_payee_id": "p-1",
							"deleted": false
						},
						{
							"id": "a-2",
							"name": "Old Savings",
							"type": "savings",
							"on_budget": true,
							"closed": true,
							"balance": 0,
							"cleared_balance": 0,
							"uncleared_balance": 0,
							"transfer_payee_id": null,
							"deleted": true
						}
					],
					"server_knowledge": 7
				}
			}));
		})
		.await;

	let response =
		dispatcher.handle("list_accounts", json!({ "email": "a@x.com", "budgetId": "b-1" })).await;
	let accounts = response["result"]["accounts"]
		.as_array()
		.expect("Account listing should be an array.");

	assert_eq!(response["status"], "success");
	assert_eq!(accounts.len(), 1, "Soft-deleted accounts must be filtered out.");
	assert_eq!(accounts[0]["id"], "a-1");
	assert_eq!(accounts[0]["balance"], 1_234_560);
	assert_eq!(accounts[0]["balance_formatted"], "$1,234.56");
	assert_eq!(response["result"]["server_knowledge"], 7);
}

#[tokio::test]
async fn month_detail_shapes_totals_and_categories() {
	let server = MockServer::start_async().await;
	let dispatcher = authed_dispatcher(&server).await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/budgets/b-1/months/2025-04-01");
			then.status(200).json_body(json!({
				"data": {
					"month": {
						"month": "2025-04-01",
						"note": null,
						"income": 5_000_000,
						"budgeted": 4_200_000,
						"activity": -3_100_000,
						"to_be_budgeted": 800_000,
						"age_of_money": 24,
						"categories": [
							{
								"id": "c-1",
								"category_group_id": "g-1",
								"name": "Groceries",
								"hidden": false,
								"budgeted": 400_000,
								"activity": -350_000,
								"balance": 50_000,
								"deleted": false
							},
							{
								"id": "c-2",
								"category_group_id": "g-1",
								"name": "Gone",
								"hidden": false,
								"budgeted": 0,
								"activity": 0,
								"balance": 0,
								"deleted": true
							}
						]
					}
				}
			}));
		})
		.await;

	let response = dispatcher
		.handle("get_month", json!({ "email": "a@x.com", "budgetId": "b-1", "month": "2025-04" }))
		.await;
	let result = &response["result"];

	assert_eq!(response["status"], "success");
	assert_eq!(result["to_be_budgeted"], 800_000);
	assert_eq!(result["to_be_budgeted_formatted"], "$800.00");
	assert_eq!(result["age_of_money"], 24);

	let categories = result["categories"].as_array().expect("Categories should be an array.");

	assert_eq!(categories.len(), 1, "Soft-deleted categories must be filtered out.");
	assert_eq!(categories[0]["id"], "c-1");
	assert_eq!(categories[0]["budgeted_formatted"], "$400.00");
}

#[tokio::test]
async fn malformed_months_are_rejected_before_any_network_call() {
	let server = MockServer::start_async().await;
	let dispatcher = authed_dispatcher(&server).await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/budgets/b-1/months/2025-04-01");
			then.status(200).json_body(json!({ "data": { "month": { "month": "2025-04-01" } } }));
		})
		.await;
	let envelope = dispatcher
		.handle(
			"get_month",
			json!({ "email": "a@x.com", "budgetId": "b-1", "month": "April 2025" }),
		)
		.await;

	assert_eq!(envelope["error"]["code"], "VALIDATION_ERROR");
	assert_eq!(envelope["error"]["message"], "Month must be in format YYYY-MM (e.g., 2025-04)");

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn overcommitted_assignment_mutates_nothing() {
	let server = MockServer::start_async().await;
	let dispatcher = authed_dispatcher(&server).await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/budgets/b-1/months/2025-04-01");
			then.status(200).json_body(json!({
				"data": { "month": { "month": "2025-04-01", "to_be_budgeted": 50_000 } }
			}));
		})
		.await;

	let patch = server
		.mock_async(|when, then| {
			when.method(PATCH).path("/budgets/b-1/months/2025-04-01/categories/c-1");
			then.status(200).json_body(json!({ "data": { "category": { "id": "c-1", "name": "Rent" } } }));
		})
		.await;
	let response = dispatcher
		.handle(
			"assign_to_categories",
			json!({
				"email": "a@x.com",
				"budgetId": "b-1",
				"month": "2025-04",
				"categoryAllocations": [
					{ "categoryId": "c-1", "amount": 100_000, "unit": "milliunits" }
				]
			}),
		)
		.await;
	let result = &response["result"];

	assert_eq!(response["status"], "success");
	assert_eq!(result["success"], false);
	assert_eq!(result["message"], "Requested allocation exceeds available funds");
	assert_eq!(result["available"], 50_000);
	assert_eq!(result["requested"], 100_000);
	assert_eq!(result["requested_formatted"], "$100.00");

	patch.assert_calls_async(0).await;
}

#[tokio::test]
async fn assignment_reports_each_category_before_and_after() {
	let server = MockServer::start_async().await;
	let dispatcher = authed_dispatcher(&server).await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/budgets/b-1/months/2025-04-01");
			then.status(200).json_body(json!({
				"data": { "month": { "month": "2025-04-01", "to_be_budgeted": 100_000 } }
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/budgets/b-1/months/2025-04-01/categories/c-1");
			then.status(200).json_body(json!({
				"data": { "category": { "id": "c-1", "name": "Groceries", "budgeted": 10_000 } }
			}));
		})
		.await;

	let patch = server
		.mock_async(|when, then| {
			when.method(PATCH)
				.path("/budgets/b-1/months/2025-04-01/categories/c-1")
				.json_body(json!({ "category": { "budgeted": 35_000 } }));
			then.status(200).json_body(json!({
				"data": { "category": { "id": "c-1", "name": "Groceries", "budgeted": 35_000 } }
			}));
		})
		.await;
	let response = dispatcher
		.handle(
			"assign_to_categories",
			json!({
				"email": "a@x.com",
				"budgetId": "b-1",
				"month": "2025-04",
				"categoryAllocations": [
					{ "categoryId": "c-1", "amount": 25_000, "unit": "milliunits" }
				]
			}),
		)
		.await;
	let result = &response["result"];

	patch.assert_async().await;

	assert_eq!(result["success"], true);
	assert_eq!(result["month"], "2025-04");
	assert_eq!(result["total_allocated"], 25_000);
	assert_eq!(result["remaining"], 75_000);
	assert_eq!(result["remaining_formatted"], "$75.00");

	let allocations =
		result["allocations"].as_array().expect("Allocations should be an array.");

	assert_eq!(allocations.len(), 1);
	assert_eq!(allocations[0]["previous_budgeted"], 10_000);
	assert_eq!(allocations[0]["allocated"], 25_000);
	assert_eq!(allocations[0]["new_budgeted"], 35_000);
	assert_eq!(allocations[0]["new_budgeted_formatted"], "$35.00");
}

#[tokio::test]
async fn recommendations_treat_a_missing_prior_month_as_no_history() {
	let server = MockServer::start_async().await;
	let dispatcher = authed_dispatcher(&server).await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/budgets/b-1/months/2025-04-01");
			then.status(200).json_body(json!({
				"data": { "month": { "month": "2025-04-01", "to_be_budgeted": 0 } }
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/budgets/b-1/categories");
			then.status(200).json_body(json!({
				"data": {
					"category_groups": [
						{
							"id": "g-1",
							"name": "Immediate Obligations",
							"categories": [
								{
									"id": "c-1",
									"name": "Rent",
									"budgeted": 20_000,
									"balance": 0,
									"goal_type": "TB",
									"goal_target": 50_000,
									"goal_under_funded": 30_000
								}
							]
						}
					]
				}
			}));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/budgets/b-1/months/2025-03-01");
			then.status(404).json_body(json!({
				"error": { "id": "404", "name": "not_found", "detail": "Month not found" }
			}));
		})
		.await;

	let response = dispatcher
		.handle(
			"get_recommended_allocations",
			json!({
				"email": "a@x.com",
				"budgetId": "b-1",
				"month": "2025-04",
				"availableAmount": 50_000,
				"unit": "milliunits"
			}),
		)
		.await;
	let result = &response["result"];

	assert_eq!(response["status"], "success");
	assert_eq!(result["available_to_assign"], 50_000);

	let recommendations =
		result["recommendations"].as_array().expect("Recommendations should be an array.");

	assert_eq!(recommendations.len(), 1);
	assert_eq!(recommendations[0]["category_id"], "c-1");
	assert_eq!(recommendations[0]["priority"], 1);
	assert_eq!(recommendations[0]["amount"], 30_000);
	assert_eq!(result["total_recommended"], 30_000);
	assert_eq!(result["unallocated"], 20_000);
}

#[tokio::test]
async fn scheduled_creation_validates_required_fields_first() {
	let server = MockServer::start_async().await;
	let dispatcher = authed_dispatcher(&server).await;
	let envelope = dispatcher
		.handle(
			"create_scheduled_transaction",
			json!({
				"email": "a@x.com",
				"budgetId": "b-1",
				"scheduledTransaction": {
					"account_id": "a-1",
					"date_first": "2025-05-01",
					"amount": -45_000
				}
			}),
		)
		.await;

	assert_eq!(envelope["error"]["code"], "VALIDATION_ERROR");
	assert_eq!(envelope["error"]["message"], "Scheduled transaction must include frequency");
}

#[tokio::test]
async fn upstream_not_found_maps_to_the_resource_message() {
	let server = MockServer::start_async().await;
	let dispatcher = authed_dispatcher(&server).await;

	server
		.mock_async(|when, then| {
			when.method(GET).path("/budgets/nope");
			then.status(404).json_body(json!({
				"error": { "id": "404", "name": "not_found", "detail": "Budget not found" }
			}));
		})
		.await;

	let envelope =
		dispatcher.handle("get_budget", json!({ "email": "a@x.com", "budgetId": "nope" })).await;

	assert_eq!(envelope["error"]["code"], "NOT_FOUND_ERROR");
	assert_eq!(envelope["error"]["message"], "Budget with ID nope not found");
}

#[tokio::test]
async fn upstream_token_rejection_evicts_and_re_flags() {
	let server = MockServer::start_async().await;
	let services = Arc::new(build_test_services(&server.base_url(), &server.base_url()));

	services
		.tokens
		.set_token(account("a@x.com"), grant("stale-token", None, 3_600))
		.await
		.expect("Seeding the credential should succeed.");
	server
		.mock_async(|when, then| {
			when.method(GET).path("/budgets");
			then.status(401).json_body(json!({
				"error": { "id": "401", "name": "unauthorized", "detail": "Unauthorized" }
			}));
		})
		.await;

	let dispatcher = Dispatcher::new(services.clone());
	let envelope = dispatcher.handle("list_budgets", json!({ "email": "a@x.com" })).await;

	assert_eq!(envelope["error"]["code"], "TOKEN_ERROR");
	assert_eq!(envelope["authenticationRequired"], true);

	let statuses =
		services.tokens.list_accounts().await.expect("Listing accounts should succeed.");

	assert!(statuses.is_empty(), "A rejected token must be evicted from the store.");
}
