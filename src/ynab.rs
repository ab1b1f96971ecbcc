//! Typed client for the YNAB v1 REST API.
//!
//! Every endpoint wraps its payload in a `{ "data": ... }` envelope and every
//! error in `{ "error": { "id", "name", "detail" } }`; this module unwraps
//! both and surfaces a closed [`ApiError`] so callers can match on the exact
//! upstream condition instead of inspecting status codes.

pub mod models;
pub use models::*;

// crates.io
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
// self
use crate::{_prelude::*, config::ApiConfig, error::ConfigError, http::parse_retry_after};

/// Retry hint used when the API rate-limits without a `Retry-After` header.
const DEFAULT_RETRY_AFTER: Duration = Duration::seconds(3_600);

/// Upstream API failure.
#[derive(Debug, ThisError)]
pub enum ApiError {
	/// The addressed resource does not exist (HTTP 404).
	#[error("{detail}")]
	NotFound {
		/// Upstream detail message.
		detail: String,
	},
	/// The request was malformed or semantically invalid (HTTP 400).
	#[error("{detail}")]
	BadRequest {
		/// Upstream detail message.
		detail: String,
	},
	/// The access token was rejected (HTTP 401).
	#[error("access token rejected by the API")]
	Unauthorized,
	/// The per-token request quota is exhausted upstream (HTTP 429).
	#[error("rate limited upstream, retry after {retry_after}")]
	RateLimited {
		/// Wait suggested by the API before retrying.
		retry_after: Duration,
	},
	/// Any other non-success status.
	#[error("unexpected status {status}: {detail}")]
	Unexpected {
		/// HTTP status code.
		status: u16,
		/// Upstream detail message, or the raw body when no envelope was sent.
		detail: String,
	},
	/// A success response did not match the expected payload shape.
	#[error("failed to decode response at `{}`", .source.path())]
	Decode {
		/// Decode failure with the offending JSON path.
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// The request never produced a response.
	#[error(transparent)]
	Transport(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
	data: T,
}

/// Which collection a transaction listing is scoped to.
#[derive(Clone, Copy, Debug)]
pub enum TransactionScope<'a> {
	/// All transactions of the budget.
	Budget,
	/// Transactions of one account.
	Account(&'a str),
	/// Transactions of one category.
	Category(&'a str),
	/// Transactions of one payee.
	Payee(&'a str),
}
impl TransactionScope<'_> {
	fn path(&self, budget_id: &str) -> String {
		match self {
			Self::Budget => format!("budgets/{budget_id}/transactions"),
			Self::Account(id) => format!("budgets/{budget_id}/accounts/{id}/transactions"),
			Self::Category(id) => format!("budgets/{budget_id}/categories/{id}/transactions"),
			Self::Payee(id) => format!("budgets/{budget_id}/payees/{id}/transactions"),
		}
	}
}

/// HTTP client bound to one API base URL.
///
/// Stateless and cheap to clone; authentication is per call because tokens
/// belong to accounts, not to the client.
#[derive(Clone, Debug)]
pub struct YnabClient {
	http: ReqwestClient,
	base: String,
}
impl YnabClient {
	/// Creates a client for the configured API base URL.
	pub fn new(config: &ApiConfig) -> Result<Self, ConfigError> {
		let base = Url::parse(&config.base_url)
			.map_err(|source| ConfigError::InvalidUrl { field: "api.base_url", source })?;

		Ok(Self {
			http: ReqwestClient::default(),
			base: base.as_str().trim_end_matches('/').to_owned(),
		})
	}

	/// Lists the budgets visible to the token, including the default budget when one is set.
	pub async fn budgets(&self, token: &str) -> Result<BudgetSummaryPage, ApiError> {
		self.request(Method::GET, token, "budgets?include_accounts=false".into(), None).await
	}

	/// Fetches one budget.
	pub async fn budget(&self, token: &str, budget_id: &str) -> Result<BudgetDetail, ApiError> {
		self.request::<BudgetData>(Method::GET, token, format!("budgets/{budget_id}"), None)
			.await
			.map(|data| data.budget)
	}

	/// Fetches the display settings of one budget.
	pub async fn budget_settings(
		&self,
		token: &str,
		budget_id: &str,
	) -> Result<BudgetSettings, ApiError> {
		self.request::<SettingsData>(
			Method::GET,
			token,
			format!("budgets/{budget_id}/settings"),
			None,
		)
		.await
		.map(|data| data.settings)
	}

	/// Lists the accounts of a budget.
	pub async fn accounts(&self, token: &str, budget_id: &str) -> Result<AccountsPage, ApiError> {
		self.request(Method::GET, token, format!("budgets/{budget_id}/accounts"), None).await
	}

	/// Fetches one account.
	pub async fn account(
		&self,
		token: &str,
		budget_id: &str,
		account_id: &str,
	) -> Result<Account, ApiError> {
		self.request::<AccountData>(
			Method::GET,
			token,
			format!("budgets/{budget_id}/accounts/{account_id}"),
			None,
		)
		.await
		.map(|data| data.account)
	}

	/// Lists the category groups of a budget with their member categories.
	pub async fn categories(
		&self,
		token: &str,
		budget_id: &str,
	) -> Result<CategoriesPage, ApiError> {
		self.request(Method::GET, token, format!("budgets/{budget_id}/categories"), None).await
	}

	/// Fetches one category with its current-month amounts.
	pub async fn category(
		&self,
		token: &str,
		budget_id: &str,
		category_id: &str,
	) -> Result<Category, ApiError> {
		self.request::<CategoryData>(
			Method::GET,
			token,
			format!("budgets/{budget_id}/categories/{category_id}"),
			None,
		)
		.await
		.map(|data| data.category)
	}

	/// Fetches one category scoped to a month.
	pub async fn month_category(
		&self,
		token: &str,
		budget_id: &str,
		month: &str,
		category_id: &str,
	) -> Result<Category, ApiError> {
		self.request::<CategoryData>(
			Method::GET,
			token,
			format!("budgets/{budget_id}/months/{month}/categories/{category_id}"),
			None,
		)
		.await
		.map(|data| data.category)
	}

	/// Sets the budgeted amount of a category for a month.
	pub async fn update_month_category(
		&self,
		token: &str,
		budget_id: &str,
		month: &str,
		category_id: &str,
		budgeted: i64,
	) -> Result<Category, ApiError> {
		self.request::<CategoryData>(
			Method::PATCH,
			token,
			format!("budgets/{budget_id}/months/{month}/categories/{category_id}"),
			Some(&json!({ "category": { "budgeted": budgeted } })),
		)
		.await
		.map(|data| data.category)
	}

	/// Lists the months of a budget.
	pub async fn months(&self, token: &str, budget_id: &str) -> Result<MonthsPage, ApiError> {
		self.request(Method::GET, token, format!("budgets/{budget_id}/months"), None).await
	}

	/// Fetches one month with its categories; `month` is a `YYYY-MM-DD` first-of-month date.
	pub async fn month(
		&self,
		token: &str,
		budget_id: &str,
		month: &str,
	) -> Result<Month, ApiError> {
		self.request::<MonthData>(
			Method::GET,
			token,
			format!("budgets/{budget_id}/months/{month}"),
			None,
		)
		.await
		.map(|data| data.month)
	}

	/// Lists the payees of a budget.
	pub async fn payees(&self, token: &str, budget_id: &str) -> Result<PayeesPage, ApiError> {
		self.request(Method::GET, token, format!("budgets/{budget_id}/payees"), None).await
	}

	/// Fetches one payee.
	pub async fn payee(
		&self,
		token: &str,
		budget_id: &str,
		payee_id: &str,
	) -> Result<Payee, ApiError> {
		self.request::<PayeeData>(
			Method::GET,
			token,
			format!("budgets/{budget_id}/payees/{payee_id}"),
			None,
		)
		.await
		.map(|data| data.payee)
	}

	/// Lists transactions within a scope, optionally filtered by start date and kind
	/// (`uncategorized` or `unapproved`).
	pub async fn transactions(
		&self,
		token: &str,
		budget_id: &str,
		scope: TransactionScope<'_>,
		since_date: Option<&str>,
		kind: Option<&str>,
	) -> Result<TransactionsPage, ApiError> {
		let mut path = scope.path(budget_id);
		let mut query = url::form_urlencoded::Serializer::new(String::new());

		if let Some(since_date) = since_date {
			query.append_pair("since_date", since_date);
		}
		if let Some(kind) = kind {
			query.append_pair("type", kind);
		}

		let query = query.finish();

		if !query.is_empty() {
			path = format!("{path}?{query}");
		}

		self.request(Method::GET, token, path, None).await
	}

	/// Fetches one transaction.
	pub async fn transaction(
		&self,
		token: &str,
		budget_id: &str,
		transaction_id: &str,
	) -> Result<TransactionDetail, ApiError> {
		self.request::<TransactionData>(
			Method::GET,
			token,
			format!("budgets/{budget_id}/transactions/{transaction_id}"),
			None,
		)
		.await
		.map(|data| data.transaction)
	}

	/// Creates one or more transactions; `body` is the ready-made request payload holding either
	/// a `transaction` object or a `transactions` array.
	pub async fn create_transactions(
		&self,
		token: &str,
		budget_id: &str,
		body: &Value,
	) -> Result<SaveTransactionsResponse, ApiError> {
		self.request(Method::POST, token, format!("budgets/{budget_id}/transactions"), Some(body))
			.await
	}

	/// Replaces the mutable fields of one transaction.
	pub async fn update_transaction(
		&self,
		token: &str,
		budget_id: &str,
		transaction_id: &str,
		transaction: &Value,
	) -> Result<TransactionDetail, ApiError> {
		self.request::<TransactionData>(
			Method::PUT,
			token,
			format!("budgets/{budget_id}/transactions/{transaction_id}"),
			Some(&json!({ "transaction": transaction })),
		)
		.await
		.map(|data| data.transaction)
	}

	/// Lists the scheduled transactions of a budget.
	pub async fn scheduled_transactions(
		&self,
		token: &str,
		budget_id: &str,
	) -> Result<ScheduledTransactionsPage, ApiError> {
		self.request(Method::GET, token, format!("budgets/{budget_id}/scheduled_transactions"), None)
			.await
	}

	/// Fetches one scheduled transaction.
	pub async fn scheduled_transaction(
		&self,
		token: &str,
		budget_id: &str,
		scheduled_id: &str,
	) -> Result<ScheduledTransaction, ApiError> {
		self.request::<ScheduledTransactionData>(
			Method::GET,
			token,
			format!("budgets/{budget_id}/scheduled_transactions/{scheduled_id}"),
			None,
		)
		.await
		.map(|data| data.scheduled_transaction)
	}

	/// Creates a scheduled transaction.
	pub async fn create_scheduled_transaction(
		&self,
		token: &str,
		budget_id: &str,
		scheduled_transaction: &Value,
	) -> Result<ScheduledTransaction, ApiError> {
		self.request::<ScheduledTransactionData>(
			Method::POST,
			token,
			format!("budgets/{budget_id}/scheduled_transactions"),
			Some(&json!({ "scheduled_transaction": scheduled_transaction })),
		)
		.await
		.map(|data| data.scheduled_transaction)
	}

	/// Replaces the mutable fields of one scheduled transaction.
	pub async fn update_scheduled_transaction(
		&self,
		token: &str,
		budget_id: &str,
		scheduled_id: &str,
		scheduled_transaction: &Value,
	) -> Result<ScheduledTransaction, ApiError> {
		self.request::<ScheduledTransactionData>(
			Method::PUT,
			token,
			format!("budgets/{budget_id}/scheduled_transactions/{scheduled_id}"),
			Some(&json!({ "scheduled_transaction": scheduled_transaction })),
		)
		.await
		.map(|data| data.scheduled_transaction)
	}

	/// Deletes one scheduled transaction, returning its final state.
	pub async fn delete_scheduled_transaction(
		&self,
		token: &str,
		budget_id: &str,
		scheduled_id: &str,
	) -> Result<ScheduledTransaction, ApiError> {
		self.request::<ScheduledTransactionData>(
			Method::DELETE,
			token,
			format!("budgets/{budget_id}/scheduled_transactions/{scheduled_id}"),
			None,
		)
		.await
		.map(|data| data.scheduled_transaction)
	}

	async fn request<T>(
		&self,
		method: Method,
		token: &str,
		path: String,
		body: Option<&Value>,
	) -> Result<T, ApiError>
	where
		T: DeserializeOwned,
	{
		let mut request = self.http.request(method, format!("{}/{path}", self.base)).bearer_auth(token);

		if let Some(body) = body {
			request = request.json(body);
		}

		let response = request.send().await?;
		let status = response.status();

		if status == StatusCode::TOO_MANY_REQUESTS {
			let retry_after =
				parse_retry_after(response.headers()).unwrap_or(DEFAULT_RETRY_AFTER);

			return Err(ApiError::RateLimited { retry_after });
		}

		let bytes = response.bytes().await?;

		if !status.is_success() {
			return Err(error_from_body(status, &bytes));
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&bytes);

		serde_path_to_error::deserialize::<_, Envelope<T>>(&mut deserializer)
			.map(|envelope| envelope.data)
			.map_err(|source| ApiError::Decode { source })
	}
}

fn error_from_body(status: StatusCode, bytes: &[u8]) -> ApiError {
	let detail = serde_json::from_slice::<Value>(bytes)
		.ok()
		.and_then(|value| {
			value
				.get("error")
				.and_then(|error| error.get("detail"))
				.and_then(Value::as_str)
				.map(ToOwned::to_owned)
		})
		.unwrap_or_else(|| String::from_utf8_lossy(bytes).into_owned());

	match status {
		StatusCode::NOT_FOUND => ApiError::NotFound { detail },
		StatusCode::BAD_REQUEST => ApiError::BadRequest { detail },
		StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
		status => ApiError::Unexpected { status: status.as_u16(), detail },
	}
}
