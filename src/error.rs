//! Service-wide error taxonomy shared by the token manager, quota gate, and tool dispatcher.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical service error exposed to the dispatcher.
///
/// Every variant maps to a stable machine-readable envelope code in
/// [`crate::mcp`], so the set is closed on purpose.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Caller input failed validation before any I/O happened.
	#[error("{message}")]
	Validation {
		/// Human-readable description of the rejected input.
		message: String,
	},
	/// Missing credential or failed token operation.
	#[error("{message}")]
	Token {
		/// Human-readable description of the failure.
		message: String,
		/// Whether the caller must run the interactive authentication flow again.
		authentication_required: bool,
	},
	/// Local or upstream quota exhaustion.
	#[error("{0}")]
	RateLimit(RateLimitExceeded),
	/// Requested resource does not exist upstream.
	#[error("{message}")]
	NotFound {
		/// Message naming the missing resource and its identifier.
		message: String,
	},
	/// Upstream API failure that has no more specific mapping.
	#[error(transparent)]
	Api(#[from] crate::ynab::ApiError),
}
impl Error {
	/// Builds a validation failure from a display message.
	pub fn validation(message: impl Into<String>) -> Self {
		Self::Validation { message: message.into() }
	}

	/// Builds a token failure, flagging whether re-authentication is required.
	pub fn token(message: impl Into<String>, authentication_required: bool) -> Self {
		Self::Token { message: message.into(), authentication_required }
	}

	/// Builds a not-found failure naming the missing resource.
	pub fn not_found(message: impl Into<String>) -> Self {
		Self::NotFound { message: message.into() }
	}
}

/// Details carried by [`Error::RateLimit`].
#[derive(Clone, Debug)]
pub struct RateLimitExceeded {
	/// Human-readable description including the reset horizon.
	pub message: String,
	/// Time remaining until the caller may retry.
	pub retry_after: Duration,
	/// Whether the remote API signalled the exhaustion (HTTP 429) rather than
	/// the local gate.
	pub upstream: bool,
}
impl Display for RateLimitExceeded {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.message)
	}
}

/// Configuration and startup failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Configuration file could not be read.
	#[error("Failed to read configuration {path}.")]
	Read {
		/// Path that was attempted.
		path: String,
		/// Underlying I/O failure.
		#[source]
		source: std::io::Error,
	},
	/// Configuration file contained malformed JSON.
	#[error("Failed to parse configuration {path}.")]
	Parse {
		/// Path that was attempted.
		path: String,
		/// Structured parsing failure with the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A configured endpoint URL cannot be parsed.
	#[error("Configuration field `{field}` is not a valid URL.")]
	InvalidUrl {
		/// Name of the offending configuration field.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// The quota buffer percentage must leave room below the hard limit.
	#[error("The rate limit buffer percentage must be below 100.")]
	BufferOutOfRange,
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::store::StoreError;

	#[test]
	fn store_error_converts_with_source() {
		let store_error = StoreError::Backend { message: "disk full".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("disk full"));

		let source = StdError::source(&error)
			.expect("Service error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn rate_limit_display_uses_message() {
		let error = Error::RateLimit(RateLimitExceeded {
			message: "Rate limit exceeded for a@x.com. Resets in 12 minutes.".into(),
			retry_after: Duration::minutes(12),
			upstream: false,
		});

		assert_eq!(error.to_string(), "Rate limit exceeded for a@x.com. Resets in 12 minutes.");
	}
}
