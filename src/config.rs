//! JSON configuration with defaults for every section.

// std
use std::{
	fs,
	path::{Path, PathBuf},
};
// self
use crate::{_prelude::*, error::ConfigError};

/// Top-level service configuration.
///
/// Every section (and every field) falls back to its default when absent, so
/// an empty file or no file at all yields a runnable configuration apart from
/// the OAuth client credentials.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
	/// OAuth client credentials and endpoints.
	pub oauth: OAuthConfig,
	/// On-disk locations for credentials and quota counters.
	pub storage: StorageConfig,
	/// Outbound request quota limits.
	pub quota: QuotaConfig,
	/// Remote budgeting API endpoint.
	pub api: ApiConfig,
	/// Tier data for allocation recommendations.
	pub recommendations: RecommendationRules,
}
impl Config {
	/// Loads configuration from a JSON file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
			path: path.display().to_string(),
			source,
		})?;
		let deserializer = &mut serde_json::Deserializer::from_str(&raw);

		serde_path_to_error::deserialize(deserializer).map_err(|source| ConfigError::Parse {
			path: path.display().to_string(),
			source,
		})
	}
}

/// OAuth client credentials and endpoints.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: String,
	/// Redirect URI registered with the provider.
	pub redirect_uri: String,
	/// Interactive authorization endpoint.
	pub authorize_url: String,
	/// Token endpoint for code and refresh exchanges.
	pub token_url: String,
}
impl Default for OAuthConfig {
	fn default() -> Self {
		Self {
			client_id: String::new(),
			client_secret: String::new(),
			redirect_uri: "urn:ietf:wg:oauth:2.0:oob".into(),
			authorize_url: "https://app.ynab.com/oauth/authorize".into(),
			token_url: "https://app.ynab.com/oauth/token".into(),
		}
	}
}

/// On-disk locations for persisted state.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
	/// Credential file path, a JSON object keyed by account identifier.
	pub tokens_path: PathBuf,
	/// Quota counter file path, a JSON object keyed by account identifier.
	pub quota_path: PathBuf,
}
impl Default for StorageConfig {
	fn default() -> Self {
		Self { tokens_path: "config/tokens.json".into(), quota_path: "data/rate-limits.json".into() }
	}
}

/// Outbound request quota limits.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
	/// Hard per-account request limit per window.
	pub limit: u32,
	/// Percentage of the limit reserved for high-priority calls.
	pub buffer_percent: u32,
	/// Window length in seconds.
	pub window_secs: u64,
	/// Background sweep interval in seconds.
	pub sweep_secs: u64,
}
impl Default for QuotaConfig {
	fn default() -> Self {
		Self { limit: 200, buffer_percent: 10, window_secs: 3_600, sweep_secs: 60 }
	}
}

/// Remote budgeting API endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
	/// Base URL of the budgeting API, without a trailing slash.
	pub base_url: String,
}
impl Default for ApiConfig {
	fn default() -> Self {
		Self { base_url: "https://api.ynab.com/v1".into() }
	}
}

/// Tier data driving allocation recommendations.
///
/// Group names are compared case-insensitively against the category group a
/// category belongs to.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RecommendationRules {
	/// Category groups treated as essential spending; overspent members rank in tier 2.
	pub essential_groups: Vec<String>,
	/// Category groups treated as long-term savings; they split whatever remains in tier 4.
	pub savings_groups: Vec<String>,
	/// Prior-month spend (milliunits) below which a category is ignored by tier 3.
	pub material_spend_floor: i64,
}
impl Default for RecommendationRules {
	fn default() -> Self {
		Self {
			essential_groups: vec![
				"Immediate Obligations".into(),
				"True Expenses".into(),
				"Bills".into(),
				"Essentials".into(),
			],
			savings_groups: vec![
				"Savings".into(),
				"Savings Goals".into(),
				"Quality of Life Goals".into(),
				"Long Term".into(),
			],
			material_spend_floor: 10_000,
		}
	}
}
