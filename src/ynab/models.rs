//! Serde models for the budgeting API's response payloads.
//!
//! Fields the service never reads are left out; unknown fields are ignored so
//! upstream additions never break decoding.

// self
use crate::_prelude::*;

/// Currency display settings attached to a budget.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CurrencyFormat {
	/// ISO 4217 currency code.
	pub iso_code: String,
	/// Sample rendering of an amount in this currency.
	#[serde(default)]
	pub example_format: Option<String>,
}

/// Date display settings attached to a budget.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DateFormat {
	/// Format string, e.g. `MM/DD/YYYY`.
	pub format: String,
}

/// Budget summary returned by the budget listing.
#[derive(Clone, Debug, Deserialize)]
pub struct BudgetSummary {
	/// Budget identifier.
	pub id: String,
	/// Budget display name.
	pub name: String,
	/// Last modification instant, RFC 3339.
	#[serde(default)]
	pub last_modified_on: Option<String>,
	/// Currency settings, when present.
	#[serde(default)]
	pub currency_format: Option<CurrencyFormat>,
	/// Date settings, when present.
	#[serde(default)]
	pub date_format: Option<DateFormat>,
}

/// Payload of the budget listing.
#[derive(Clone, Debug, Deserialize)]
pub struct BudgetSummaryPage {
	/// All budgets visible to the token.
	pub budgets: Vec<BudgetSummary>,
	/// Default budget, when the user designated one.
	#[serde(default)]
	pub default_budget: Option<BudgetSummary>,
}

/// Full budget payload; nested lists are kept opaque because only their sizes are reported.
#[derive(Clone, Debug, Deserialize)]
pub struct BudgetDetail {
	/// Budget identifier.
	pub id: String,
	/// Budget display name.
	pub name: String,
	/// Last modification instant, RFC 3339.
	#[serde(default)]
	pub last_modified_on: Option<String>,
	/// Date settings, when present.
	#[serde(default)]
	pub date_format: Option<DateFormat>,
	/// Currency settings, when present.
	#[serde(default)]
	pub currency_format: Option<CurrencyFormat>,
	/// Accounts embedded in the payload.
	#[serde(default)]
	pub accounts: Option<Vec<Value>>,
	/// Categories embedded in the payload.
	#[serde(default)]
	pub categories: Option<Vec<Value>>,
	/// Payees embedded in the payload.
	#[serde(default)]
	pub payees: Option<Vec<Value>>,
	/// Months embedded in the payload.
	#[serde(default)]
	pub months: Option<Vec<Value>>,
	/// Server knowledge cursor for delta requests.
	#[serde(default)]
	pub server_knowledge: Option<i64>,
}

/// Budget settings payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BudgetSettings {
	/// Date settings.
	#[serde(default)]
	pub date_format: Option<DateFormat>,
	/// Currency settings.
	#[serde(default)]
	pub currency_format: Option<CurrencyFormat>,
}

/// Bank or tracking account.
#[derive(Clone, Debug, Deserialize)]
pub struct Account {
	/// Account identifier.
	pub id: String,
	/// Account display name.
	pub name: String,
	/// Account type label, e.g. `checking`.
	#[serde(rename = "type")]
	pub kind: String,
	/// Whether the account participates in the budget.
	pub on_budget: bool,
	/// Whether the account is closed.
	pub closed: bool,
	/// Free-form note.
	#[serde(default)]
	pub note: Option<String>,
	/// Current balance in milliunits.
	pub balance: i64,
	/// Cleared balance in milliunits.
	pub cleared_balance: i64,
	/// Uncleared balance in milliunits.
	pub uncleared_balance: i64,
	/// Payee used for transfers into this account.
	#[serde(default)]
	pub transfer_payee_id: Option<String>,
	/// Whether the account was soft-deleted.
	pub deleted: bool,
}

/// Budget category with its month-scoped amounts and goal data.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Category {
	/// Category identifier.
	pub id: String,
	/// Owning group identifier.
	#[serde(default)]
	pub category_group_id: Option<String>,
	/// Owning group name, present on month payloads.
	#[serde(default)]
	pub category_group_name: Option<String>,
	/// Category display name.
	pub name: String,
	/// Whether the category is hidden.
	#[serde(default)]
	pub hidden: bool,
	/// Free-form note.
	#[serde(default)]
	pub note: Option<String>,
	/// Budgeted amount in milliunits.
	#[serde(default)]
	pub budgeted: i64,
	/// Activity (spend) in milliunits; outflows are negative.
	#[serde(default)]
	pub activity: i64,
	/// Available balance in milliunits.
	#[serde(default)]
	pub balance: i64,
	/// Goal type label, when a goal exists.
	#[serde(default)]
	pub goal_type: Option<String>,
	/// Goal target amount in milliunits.
	#[serde(default)]
	pub goal_target: Option<i64>,
	/// Month the goal targets, `YYYY-MM-DD`.
	#[serde(default)]
	pub goal_target_month: Option<String>,
	/// Goal completion percentage.
	#[serde(default)]
	pub goal_percentage_complete: Option<i64>,
	/// Amount still needed this month to stay on track for the goal.
	#[serde(default)]
	pub goal_under_funded: Option<i64>,
	/// Whether the category was soft-deleted.
	#[serde(default)]
	pub deleted: bool,
}

/// Category group with its member categories.
#[derive(Clone, Debug, Deserialize)]
pub struct CategoryGroup {
	/// Group identifier.
	pub id: String,
	/// Group display name.
	pub name: String,
	/// Whether the group is hidden.
	#[serde(default)]
	pub hidden: bool,
	/// Whether the group was soft-deleted.
	#[serde(default)]
	pub deleted: bool,
	/// Member categories.
	#[serde(default)]
	pub categories: Vec<Category>,
}

/// Budget month with its totals and, on detail payloads, categories.
#[derive(Clone, Debug, Deserialize)]
pub struct Month {
	/// First day of the month, `YYYY-MM-DD`.
	pub month: String,
	/// Free-form note.
	#[serde(default)]
	pub note: Option<String>,
	/// Income in milliunits.
	#[serde(default)]
	pub income: i64,
	/// Budgeted total in milliunits.
	#[serde(default)]
	pub budgeted: i64,
	/// Activity total in milliunits.
	#[serde(default)]
	pub activity: i64,
	/// Available to assign in milliunits.
	#[serde(default)]
	pub to_be_budgeted: i64,
	/// Age of money in days.
	#[serde(default)]
	pub age_of_money: Option<i64>,
	/// Categories, populated on month-detail payloads.
	#[serde(default)]
	pub categories: Vec<Category>,
}

/// Payee.
#[derive(Clone, Debug, Deserialize)]
pub struct Payee {
	/// Payee identifier.
	pub id: String,
	/// Payee display name.
	pub name: String,
	/// Account this payee transfers into, for transfer payees.
	#[serde(default)]
	pub transfer_account_id: Option<String>,
	/// Whether the payee was soft-deleted.
	#[serde(default)]
	pub deleted: bool,
}

/// Split line within a transaction.
#[derive(Clone, Debug, Deserialize)]
pub struct Subtransaction {
	/// Subtransaction identifier.
	pub id: String,
	/// Owning transaction identifier.
	#[serde(default)]
	pub transaction_id: Option<String>,
	/// Amount in milliunits.
	pub amount: i64,
	/// Free-form memo.
	#[serde(default)]
	pub memo: Option<String>,
	/// Payee identifier.
	#[serde(default)]
	pub payee_id: Option<String>,
	/// Payee display name.
	#[serde(default)]
	pub payee_name: Option<String>,
	/// Category identifier.
	#[serde(default)]
	pub category_id: Option<String>,
	/// Category display name.
	#[serde(default)]
	pub category_name: Option<String>,
	/// Whether the subtransaction was soft-deleted.
	#[serde(default)]
	pub deleted: bool,
}

/// Transaction with account, payee, and category denormalizations.
#[derive(Clone, Debug, Deserialize)]
pub struct TransactionDetail {
	/// Transaction identifier.
	pub id: String,
	/// Transaction date, `YYYY-MM-DD`.
	pub date: String,
	/// Amount in milliunits; outflows are negative.
	pub amount: i64,
	/// Free-form memo.
	#[serde(default)]
	pub memo: Option<String>,
	/// Cleared status label.
	#[serde(default)]
	pub cleared: Option<String>,
	/// Whether the transaction was approved.
	#[serde(default)]
	pub approved: bool,
	/// Flag color label.
	#[serde(default)]
	pub flag_color: Option<String>,
	/// Owning account identifier.
	pub account_id: String,
	/// Owning account name.
	#[serde(default)]
	pub account_name: Option<String>,
	/// Payee identifier.
	#[serde(default)]
	pub payee_id: Option<String>,
	/// Payee display name.
	#[serde(default)]
	pub payee_name: Option<String>,
	/// Category identifier.
	#[serde(default)]
	pub category_id: Option<String>,
	/// Category display name.
	#[serde(default)]
	pub category_name: Option<String>,
	/// Transfer counterpart account, for transfers.
	#[serde(default)]
	pub transfer_account_id: Option<String>,
	/// Import identifier, for imported transactions.
	#[serde(default)]
	pub import_id: Option<String>,
	/// Whether the transaction was soft-deleted.
	#[serde(default)]
	pub deleted: bool,
	/// Split lines, for split transactions.
	#[serde(default)]
	pub subtransactions: Vec<Subtransaction>,
}

/// Recurring transaction template.
#[derive(Clone, Debug, Deserialize)]
pub struct ScheduledTransaction {
	/// Scheduled transaction identifier.
	pub id: String,
	/// First occurrence date, `YYYY-MM-DD`.
	pub date_first: String,
	/// Next occurrence date, `YYYY-MM-DD`.
	pub date_next: String,
	/// Recurrence frequency label.
	pub frequency: String,
	/// Amount in milliunits.
	pub amount: i64,
	/// Free-form memo.
	#[serde(default)]
	pub memo: Option<String>,
	/// Flag color label.
	#[serde(default)]
	pub flag_color: Option<String>,
	/// Owning account identifier.
	pub account_id: String,
	/// Owning account name.
	#[serde(default)]
	pub account_name: Option<String>,
	/// Payee identifier.
	#[serde(default)]
	pub payee_id: Option<String>,
	/// Payee display name.
	#[serde(default)]
	pub payee_name: Option<String>,
	/// Category identifier.
	#[serde(default)]
	pub category_id: Option<String>,
	/// Category display name.
	#[serde(default)]
	pub category_name: Option<String>,
	/// Transfer counterpart account, for transfers.
	#[serde(default)]
	pub transfer_account_id: Option<String>,
	/// Whether the scheduled transaction was soft-deleted.
	#[serde(default)]
	pub deleted: bool,
}

/// Result of transaction creation, covering both single and bulk requests.
#[derive(Clone, Debug, Deserialize)]
pub struct SaveTransactionsResponse {
	/// Identifiers of the created transactions.
	#[serde(default)]
	pub transaction_ids: Vec<String>,
	/// The created transaction, for single creations.
	#[serde(default)]
	pub transaction: Option<TransactionDetail>,
	/// The created transactions, for bulk creations.
	#[serde(default)]
	pub transactions: Vec<TransactionDetail>,
	/// Import identifiers that were already present.
	#[serde(default)]
	pub duplicate_import_ids: Vec<String>,
	/// Server knowledge cursor for delta requests.
	#[serde(default)]
	pub server_knowledge: Option<i64>,
}

// Per-endpoint `data` payloads.

/// Payload wrapper for account listings.
#[derive(Clone, Debug, Deserialize)]
pub struct AccountsPage {
	/// Accounts in the budget.
	pub accounts: Vec<Account>,
	/// Server knowledge cursor for delta requests.
	#[serde(default)]
	pub server_knowledge: Option<i64>,
}

/// Payload wrapper for category listings.
#[derive(Clone, Debug, Deserialize)]
pub struct CategoriesPage {
	/// Category groups with their members.
	pub category_groups: Vec<CategoryGroup>,
	/// Server knowledge cursor for delta requests.
	#[serde(default)]
	pub server_knowledge: Option<i64>,
}

/// Payload wrapper for month listings.
#[derive(Clone, Debug, Deserialize)]
pub struct MonthsPage {
	/// Months of the budget, most recent first.
	pub months: Vec<Month>,
	/// Server knowledge cursor for delta requests.
	#[serde(default)]
	pub server_knowledge: Option<i64>,
}

/// Payload wrapper for payee listings.
#[derive(Clone, Debug, Deserialize)]
pub struct PayeesPage {
	/// Payees of the budget.
	pub payees: Vec<Payee>,
	/// Server knowledge cursor for delta requests.
	#[serde(default)]
	pub server_knowledge: Option<i64>,
}

/// Payload wrapper for transaction listings.
#[derive(Clone, Debug, Deserialize)]
pub struct TransactionsPage {
	/// Transactions matching the request.
	pub transactions: Vec<TransactionDetail>,
	/// Server knowledge cursor for delta requests.
	#[serde(default)]
	pub server_knowledge: Option<i64>,
}

/// Payload wrapper for scheduled transaction listings.
#[derive(Clone, Debug, Deserialize)]
pub struct ScheduledTransactionsPage {
	/// Scheduled transactions of the budget.
	pub scheduled_transactions: Vec<ScheduledTransaction>,
	/// Server knowledge cursor for delta requests.
	#[serde(default)]
	pub server_knowledge: Option<i64>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct BudgetData {
	pub budget: BudgetDetail,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SettingsData {
	pub settings: BudgetSettings,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct AccountData {
	pub account: Account,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct CategoryData {
	pub category: Category,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct MonthData {
	pub month: Month,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct PayeeData {
	pub payee: Payee,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct TransactionData {
	pub transaction: TransactionDetail,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ScheduledTransactionData {
	pub scheduled_transaction: ScheduledTransaction,
}
