//! YNAB budgeting tools for AI assistants—per-account OAuth token lifecycle, quota-gated API
//! access, and assistant-friendly response shaping over a stdio tool protocol.

#![deny(clippy::all, missing_docs)]

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod mcp;
pub mod money;
pub mod oauth;
pub mod ops;
pub mod quota;
pub mod store;
pub mod tokens;
pub mod ynab;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{AccountId, TokenGrant},
		config::Config,
		ops::Services,
		quota::MemoryQuotaStore,
		store::MemoryCredentialStore,
	};

	/// Builds a service set backed by in-memory stores, pointing the token endpoint and the
	/// budgeting API at the provided mock base URLs.
	pub fn build_test_services(oauth_base: &str, api_base: &str) -> Services {
		let mut config = Config::default();

		config.oauth.client_id = "client-test".into();
		config.oauth.client_secret = "secret-test".into();
		config.oauth.authorize_url = format!("{oauth_base}/oauth/authorize");
		config.oauth.token_url = format!("{oauth_base}/oauth/token");
		config.api.base_url = api_base.into();

		Services::with_stores(
			&config,
			Arc::new(MemoryCredentialStore::default()),
			Arc::new(MemoryQuotaStore::default()),
		)
		.expect("Failed to build in-memory test services.")
	}

	/// Builds a validated account identifier fixture.
	pub fn account(id: &str) -> AccountId {
		AccountId::new(id).expect("Account identifier fixture should be valid.")
	}

	/// Builds a token grant fixture with the provided lifetime.
	pub fn grant(access: &str, refresh: Option<&str>, expires_in: i64) -> TokenGrant {
		TokenGrant {
			access_token: access.into(),
			refresh_token: refresh.map(Into::into),
			token_type: "bearer".into(),
			expires_in: Some(expires_in),
		}
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	pub use reqwest::Client as ReqwestClient;
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Value, json};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use url;
