// std
use std::{env, fs, process};
// crates.io
use httpmock::prelude::*;
// self
use ynab_mcp::{
	_preludet::*,
	mcp::Dispatcher,
	quota::{FileQuotaStore, Priority, QuotaGate, QuotaLimits},
};

#[tokio::test]
async fn upstream_rejection_exhausts_the_local_window() {
	let server = MockServer::start_async().await;
	let services = Arc::new(build_test_services(&server.base_url(), &server.base_url()));
	let account = account("a@x.com");

	services
		.tokens
		.set_token(account.clone(), grant("access-1", None, 3_600))
		.await
		.expect("Seeding the credential should succeed.");
	server
		.mock_async(|when, then| {
			when.method(GET).path("/budgets");
			then.status(429).header("retry-after", "900");
		})
		.await;

	let dispatcher = Dispatcher::new(services.clone());
	let envelope = dispatcher.handle("list_budgets", json!({ "email": "a@x.com" })).await;

	assert_eq!(envelope["error"]["code"], "YNAB_RATE_LIMIT_EXCEEDED");
	assert_eq!(
		envelope["error"]["message"],
		"YNAB API rate limit exceeded. Retry after 900 seconds."
	);
	assert_eq!(envelope["retryAfter"], 900);
	assert_eq!(
		services.quota.remaining(&account, Priority::High),
		0,
		"The local window must match the server's exhausted view."
	);

	// Subsequent calls fail locally, without touching the network.
	let envelope = dispatcher.handle("list_budgets", json!({ "email": "a@x.com" })).await;

	assert_eq!(envelope["error"]["code"], "RATE_LIMIT_EXCEEDED");
	assert!(
		envelope["error"]["message"]
			.as_str()
			.expect("Error message should be a string.")
			.starts_with("Rate limit exceeded for a@x.com. Resets in")
	);
}

#[tokio::test]
async fn exhausted_window_rejects_before_any_network_call() {
	let server = MockServer::start_async().await;
	let services = Arc::new(build_test_services(&server.base_url(), &server.base_url()));
	let account = account("a@x.com");

	services
		.tokens
		.set_token(account.clone(), grant("access-1", None, 3_600))
		.await
		.expect("Seeding the credential should succeed.");

	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/budgets");
			then.status(200).json_body(json!({ "data": { "budgets": [] } }));
		})
		.await;
	let now = OffsetDateTime::now_utc();
	let effective = services.quota.limits().effective_limit();

	for _ in 0..effective {
		services
			.quota
			.try_admit(&account, Priority::Normal, now)
			.expect("Calls within the buffered limit should be admitted.");
	}

	let dispatcher = Dispatcher::new(services.clone());
	let envelope = dispatcher.handle("list_budgets", json!({ "email": "a@x.com" })).await;

	assert_eq!(envelope["error"]["code"], "RATE_LIMIT_EXCEEDED");
	assert!(envelope["retryAfter"].as_i64().expect("retryAfter should be a number.") >= 0);

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn consumed_quota_survives_a_restart() {
	let path = env::temp_dir().join(format!(
		"ynab_mcp_quota_it_{}_{}.json",
		process::id(),
		OffsetDateTime::now_utc().unix_timestamp_nanos(),
	));
	let account = account("a@x.com");
	let now = OffsetDateTime::now_utc();

	{
		let store = Arc::new(FileQuotaStore::open(&path).expect("Failed to open quota store."));
		let gate = QuotaGate::new(QuotaLimits::default(), store)
			.expect("Default limits should be valid.");

		for _ in 0..3 {
			gate.try_admit(&account, Priority::Normal, now)
				.expect("Admission should succeed.");
		}
	}

	let store = Arc::new(FileQuotaStore::open(&path).expect("Failed to reopen quota store."));
	let gate =
		QuotaGate::new(QuotaLimits::default(), store).expect("Default limits should be valid.");

	assert_eq!(
		gate.remaining(&account, Priority::Normal),
		177,
		"A restart must not forget consumed quota."
	);

	let _ = fs::remove_file(&path);
}

#[tokio::test]
async fn each_underlying_api_call_consumes_one_slot() {
	let server = MockServer::start_async().await;
	let services = Arc::new(build_test_services(&server.base_url(), &server.base_url()));
	let account = account("a@x.com");

	services
		.tokens
		.set_token(account.clone(), grant("access-1", None, 3_600))
		.await
		.expect("Seeding the credential should succeed.");
	server
		.mock_async(|when, then| {
			when.method(GET).path("/budgets/b-1/payees");
			then.status(200).json_body(json!({ "data": { "payees": [] } }));
		})
		.await;

	let dispatcher = Dispatcher::new(services.clone());
	let before = services.quota.remaining(&account, Priority::Normal);
	let response =
		dispatcher.handle("list_payees", json!({ "email": "a@x.com", "budgetId": "b-1" })).await;

	assert_eq!(response["status"], "success");
	assert_eq!(services.quota.remaining(&account, Priority::Normal), before - 1);
}
