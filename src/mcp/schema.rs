//! Tool catalog exposed to clients.

// self
use crate::_prelude::*;

fn email_property() -> Value {
	json!({
		"type": "string",
		"description": "Email address of the authenticated YNAB account"
	})
}

fn budget_id_property(description: &str) -> Value {
	json!({ "type": "string", "description": description })
}

fn transaction_properties() -> Value {
	json!({
		"account_id": {
			"type": "string",
			"description": "ID of the account for the transaction"
		},
		"date": {
			"type": "string",
			"description": "Transaction date in ISO format (YYYY-MM-DD)"
		},
		"amount": {
			"type": "number",
			"description": "Transaction amount in milliunits (negative for outflow, positive for inflow)"
		},
		"payee_id": { "type": "string", "description": "ID of the payee (optional)" },
		"payee_name": {
			"type": "string",
			"description": "Name of the payee if payee_id not provided (optional)"
		},
		"category_id": { "type": "string", "description": "ID of the category (optional)" },
		"memo": { "type": "string", "description": "Memo/note for the transaction (optional)" },
		"cleared": {
			"type": "string",
			"enum": ["cleared", "uncleared", "reconciled"],
			"description": "Cleared status (optional)"
		},
		"approved": {
			"type": "boolean",
			"description": "Whether the transaction is approved (optional)"
		},
		"flag_color": {
			"type": "string",
			"enum": ["red", "orange", "yellow", "green", "blue", "purple"],
			"description": "Flag color (optional)"
		}
	})
}

fn scheduled_transaction_properties() -> Value {
	json!({
		"account_id": {
			"type": "string",
			"description": "ID of the account for the scheduled transaction"
		},
		"date_first": {
			"type": "string",
			"description": "First occurrence date in ISO format (YYYY-MM-DD)"
		},
		"amount": {
			"type": "number",
			"description": "Amount, interpreted according to the unit parameter"
		},
		"frequency": {
			"type": "string",
			"enum": [
				"never",
				"daily",
				"weekly",
				"everyOtherWeek",
				"twiceAMonth",
				"every4Weeks",
				"monthly",
				"everyOtherMonth",
				"every3Months",
				"every4Months",
				"twiceAYear",
				"yearly",
				"everyOtherYear"
			],
			"description": "Recurrence frequency"
		},
		"payee_id": { "type": "string", "description": "ID of the payee (optional)" },
		"payee_name": {
			"type": "string",
			"description": "Name of the payee if payee_id not provided (optional)"
		},
		"category_id": { "type": "string", "description": "ID of the category (optional)" },
		"memo": { "type": "string", "description": "Memo/note (optional)" },
		"flag_color": {
			"type": "string",
			"enum": ["red", "orange", "yellow", "green", "blue", "purple"],
			"description": "Flag color (optional)"
		}
	})
}

fn unit_property() -> Value {
	json!({
		"type": "string",
		"enum": ["milliunits", "major"],
		"description": "Unit of the amount: \"milliunits\" or \"major\" currency units. Required when the amount would otherwise be ambiguous."
	})
}

/// Returns the full tool catalog as the protocol expects it: an array of
/// `{name, category, description, inputSchema}` objects.
pub fn tool_definitions() -> Value {
	json!([
		{
			"name": "list_ynab_accounts",
			"category": "Authentication",
			"description": "List all authenticated YNAB accounts. Call this first to check for existing accounts and token validity before any other operation.",
			"inputSchema": { "type": "object", "properties": {} }
		},
		{
			"name": "authenticate_ynab_account",
			"category": "Authentication",
			"description": "Add and authenticate a YNAB account for API access. Call with only an email to receive an auth_url; after the user completes the OAuth flow, call again with the auth_code they provide.",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": {
						"type": "string",
						"description": "Email address for the YNAB account (used as account identifier)"
					},
					"auth_code": {
						"type": "string",
						"description": "Authorization code from YNAB OAuth (for completing authentication)"
					}
				},
				"required": ["email"]
			}
		},
		{
			"name": "remove_ynab_account",
			"category": "Authentication",
			"description": "Remove a YNAB account and delete its associated authentication tokens",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": {
						"type": "string",
						"description": "Email address of the YNAB account to remove"
					}
				},
				"required": ["email"]
			}
		},
		{
			"name": "list_budgets",
			"category": "Budgets",
			"description": "List all budgets for the authenticated YNAB account",
			"inputSchema": {
				"type": "object",
				"properties": { "email": email_property() },
				"required": ["email"]
			}
		},
		{
			"name": "get_budget",
			"category": "Budgets",
			"description": "Get details of a specific budget",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget to retrieve")
				},
				"required": ["email", "budgetId"]
			}
		},
		{
			"name": "get_budget_settings",
			"category": "Budgets",
			"description": "Get settings for a specific budget",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget to retrieve settings for")
				},
				"required": ["email", "budgetId"]
			}
		},
		{
			"name": "list_accounts",
			"category": "Accounts",
			"description": "List all accounts in a specific budget",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget containing the accounts")
				},
				"required": ["email", "budgetId"]
			}
		},
		{
			"name": "get_account",
			"category": "Accounts",
			"description": "Get details of a specific account in a budget",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget containing the account"),
					"accountId": {
						"type": "string",
						"description": "ID of the account to retrieve"
					}
				},
				"required": ["email", "budgetId", "accountId"]
			}
		},
		{
			"name": "list_categories",
			"category": "Categories",
			"description": "List all categories in a specific budget",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget containing the categories")
				},
				"required": ["email", "budgetId"]
			}
		},
		{
			"name": "get_category",
			"category": "Categories",
			"description": "Get details of a specific category in a budget",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget containing the category"),
					"categoryId": {
						"type": "string",
						"description": "ID of the category to retrieve"
					}
				},
				"required": ["email", "budgetId", "categoryId"]
			}
		},
		{
			"name": "update_category",
			"category": "Categories",
			"description": "Update the budgeted amount of a category for a specific month",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget containing the category"),
					"categoryId": {
						"type": "string",
						"description": "ID of the category to update"
					},
					"month": {
						"type": "string",
						"description": "Month to update in YYYY-MM format"
					},
					"budgeted": {
						"type": "number",
						"description": "The new budgeted amount in milliunits"
					}
				},
				"required": ["email", "budgetId", "categoryId", "month", "budgeted"]
			}
		},
		{
			"name": "list_months",
			"category": "Months",
			"description": "List budget months",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget to list months for"),
					"sinceDate": {
						"type": "string",
						"description": "Return months on or after this date (optional)"
					}
				},
				"required": ["email", "budgetId"]
			}
		},
		{
			"name": "get_month",
			"category": "Months",
			"description": "Get a specific budget month with its category balances",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget containing the month"),
					"month": {
						"type": "string",
						"description": "The month to retrieve in YYYY-MM format (e.g., 2025-04)"
					}
				},
				"required": ["email", "budgetId", "month"]
			}
		},
		{
			"name": "list_payees",
			"category": "Payees",
			"description": "List all payees in a budget",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget containing the payees")
				},
				"required": ["email", "budgetId"]
			}
		},
		{
			"name": "get_payee",
			"category": "Payees",
			"description": "Get details of a specific payee",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget containing the payee"),
					"payeeId": { "type": "string", "description": "ID of the payee to retrieve" }
				},
				"required": ["email", "budgetId", "payeeId"]
			}
		},
		{
			"name": "get_payee_transactions",
			"category": "Payees",
			"description": "Get transactions for a specific payee",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget containing the payee"),
					"payeeId": {
						"type": "string",
						"description": "ID of the payee to retrieve transactions for"
					},
					"sinceDate": {
						"type": "string",
						"description": "Filter transactions since this date (YYYY-MM-DD format, optional)"
					}
				},
				"required": ["email", "budgetId", "payeeId"]
			}
		},
		{
			"name": "list_transactions",
			"category": "Transactions",
			"description": "List transactions with optional filtering by account, category, payee, date, or type",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget containing the transactions"),
					"accountId": {
						"type": "string",
						"description": "Filter transactions by account ID (optional)"
					},
					"categoryId": {
						"type": "string",
						"description": "Filter transactions by category ID (optional)"
					},
					"payeeId": {
						"type": "string",
						"description": "Filter transactions by payee ID (optional)"
					},
					"sinceDate": {
						"type": "string",
						"description": "Filter transactions since this date (YYYY-MM-DD format, optional)"
					},
					"type": {
						"type": "string",
						"enum": ["uncategorized", "unapproved"],
						"description": "Filter by transaction type (optional)"
					},
					"limit": {
						"type": "number",
						"description": "Maximum number of transactions to return (optional)"
					}
				},
				"required": ["email", "budgetId"]
			}
		},
		{
			"name": "get_transaction",
			"category": "Transactions",
			"description": "Get details of a specific transaction",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget containing the transaction"),
					"transactionId": {
						"type": "string",
						"description": "ID of the transaction to retrieve"
					}
				},
				"required": ["email", "budgetId", "transactionId"]
			}
		},
		{
			"name": "create_transaction",
			"category": "Transactions",
			"description": "Create a new transaction in a budget",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget for the transaction"),
					"transaction": {
						"type": "object",
						"properties": transaction_properties(),
						"required": ["account_id", "date", "amount"]
					}
				},
				"required": ["email", "budgetId", "transaction"]
			}
		},
		{
			"name": "update_transaction",
			"category": "Transactions",
			"description": "Update an existing transaction",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget containing the transaction"),
					"transactionId": {
						"type": "string",
						"description": "ID of the transaction to update"
					},
					"transaction": {
						"type": "object",
						"properties": transaction_properties()
					}
				},
				"required": ["email", "budgetId", "transactionId", "transaction"]
			}
		},
		{
			"name": "bulk_create_transactions",
			"category": "Transactions",
			"description": "Create multiple transactions at once",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget for the transactions"),
					"transactions": {
						"type": "array",
						"items": {
							"type": "object",
							"properties": transaction_properties(),
							"required": ["account_id", "date", "amount"]
						}
					}
				},
				"required": ["email", "budgetId", "transactions"]
			}
		},
		{
			"name": "list_scheduled_transactions",
			"category": "Scheduled Transactions",
			"description": "List all scheduled transactions in a budget",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget containing the scheduled transactions")
				},
				"required": ["email", "budgetId"]
			}
		},
		{
			"name": "get_scheduled_transaction",
			"category": "Scheduled Transactions",
			"description": "Get details of a specific scheduled transaction",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget containing the scheduled transaction"),
					"scheduledTransactionId": {
						"type": "string",
						"description": "ID of the scheduled transaction to retrieve"
					}
				},
				"required": ["email", "budgetId", "scheduledTransactionId"]
			}
		},
		{
			"name": "create_scheduled_transaction",
			"category": "Scheduled Transactions",
			"description": "Create a new scheduled transaction in a budget",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget for the scheduled transaction"),
					"scheduledTransaction": {
						"type": "object",
						"properties": scheduled_transaction_properties(),
						"required": ["account_id", "date_first", "amount", "frequency"]
					},
					"unit": unit_property()
				},
				"required": ["email", "budgetId", "scheduledTransaction"]
			}
		},
		{
			"name": "update_scheduled_transaction",
			"category": "Scheduled Transactions",
			"description": "Update an existing scheduled transaction",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget containing the scheduled transaction"),
					"scheduledTransactionId": {
						"type": "string",
						"description": "ID of the scheduled transaction to update"
					},
					"scheduledTransaction": {
						"type": "object",
						"properties": scheduled_transaction_properties()
					},
					"unit": unit_property()
				},
				"required": ["email", "budgetId", "scheduledTransactionId", "scheduledTransaction"]
			}
		},
		{
			"name": "delete_scheduled_transaction",
			"category": "Scheduled Transactions",
			"description": "Delete a scheduled transaction from a budget",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget containing the scheduled transaction"),
					"scheduledTransactionId": {
						"type": "string",
						"description": "ID of the scheduled transaction to delete"
					}
				},
				"required": ["email", "budgetId", "scheduledTransactionId"]
			}
		},
		{
			"name": "assign_to_categories",
			"category": "Categories",
			"description": "Assign amounts from Ready to Assign to one or more categories in a month. Fails without changing anything if the total exceeds the available funds.",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget to assign funds in"),
					"month": {
						"type": "string",
						"description": "Month to assign funds in, YYYY-MM format"
					},
					"categoryAllocations": {
						"type": "array",
						"items": {
							"type": "object",
							"properties": {
								"categoryId": {
									"type": "string",
									"description": "ID of the category to fund"
								},
								"amount": {
									"type": "number",
									"description": "Amount to add, interpreted according to the unit field"
								},
								"unit": unit_property()
							},
							"required": ["categoryId", "amount"]
						}
					}
				},
				"required": ["email", "budgetId", "month", "categoryAllocations"]
			}
		},
		{
			"name": "get_recommended_allocations",
			"category": "Categories",
			"description": "Recommend how to allocate Ready to Assign funds across categories, prioritizing underfunded goals, overspent essentials, historical spending, then savings",
			"inputSchema": {
				"type": "object",
				"properties": {
					"email": email_property(),
					"budgetId": budget_id_property("ID of the budget to analyze"),
					"month": {
						"type": "string",
						"description": "Month to analyze, YYYY-MM format"
					},
					"availableAmount": {
						"type": "number",
						"description": "Override the amount available to assign (optional)"
					},
					"unit": unit_property()
				},
				"required": ["email", "budgetId", "month"]
			}
		}
	])
}
