//! Credential records persisted per account, plus the grant payload that produces them.

// crates.io
use time::format_description::well_known::Rfc3339;
// self
use crate::_prelude::*;

/// Lifetime assumed when the authorization server omits `expires_in`.
pub const DEFAULT_EXPIRES_IN: Duration = Duration::seconds(7_200);

/// Token payload produced by a successful token-endpoint exchange.
#[derive(Clone, Debug)]
pub struct TokenGrant {
	/// Bearer access token.
	pub access_token: String,
	/// Rotated refresh token, when the server issued one.
	pub refresh_token: Option<String>,
	/// Token type reported by the server, normally `bearer`.
	pub token_type: String,
	/// Lifetime in seconds, when the server reported one.
	pub expires_in: Option<i64>,
}

/// Stored OAuth credentials for one account.
///
/// `expires_at` is persisted as unix milliseconds to keep the credential file
/// format stable across deployments.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CredentialRecord {
	/// Bearer access token.
	pub access_token: crate::auth::TokenSecret,
	/// Refresh token, absent when the server never issued one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<crate::auth::TokenSecret>,
	/// Token type reported by the server.
	pub token_type: String,
	/// Absolute expiry instant of the access token.
	#[serde(with = "crate::store::timestamp_ms")]
	pub expires_at: OffsetDateTime,
}
impl CredentialRecord {
	/// Builds a record from a grant issued at the provided instant, falling back to
	/// [`DEFAULT_EXPIRES_IN`] when the server omitted the lifetime.
	pub fn from_grant(grant: &TokenGrant, issued_at: OffsetDateTime) -> Self {
		let lifetime = grant.expires_in.map(Duration::seconds).unwrap_or(DEFAULT_EXPIRES_IN);

		Self {
			access_token: crate::auth::TokenSecret::new(grant.access_token.clone()),
			refresh_token: grant
				.refresh_token
				.clone()
				.map(crate::auth::TokenSecret::new),
			token_type: grant.token_type.clone(),
			expires_at: issued_at + lifetime,
		}
	}

	/// Whether the access token has already expired at the provided instant.
	pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
		self.expires_at < now
	}

	/// Whether the access token expires within the look-ahead window, counting tokens that are
	/// already past expiry.
	pub fn needs_refresh_at(&self, now: OffsetDateTime, window: Duration) -> bool {
		self.expires_at - now < window
	}
}

/// Authentication status summary reported for one account.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatus {
	/// Account identifier the credential is stored under.
	pub email: crate::auth::AccountId,
	/// Always `true` for listed accounts; a stored credential exists.
	pub authenticated: bool,
	/// Whether the credential can be silently renewed.
	pub has_refresh_token: bool,
	/// Whether the access token is already past expiry.
	pub is_expired: bool,
	/// Expiry instant rendered as RFC 3339, or the raw timestamp on formatting failure.
	pub expires_at: String,
}
impl AccountStatus {
	/// Summarizes a stored credential at the provided instant.
	pub fn of(
		email: crate::auth::AccountId,
		record: &CredentialRecord,
		now: OffsetDateTime,
	) -> Self {
		let expires_at = record
			.expires_at
			.format(&Rfc3339)
			.unwrap_or_else(|_| record.expires_at.unix_timestamp().to_string());

		Self {
			email,
			authenticated: true,
			has_refresh_token: record.refresh_token.is_some(),
			is_expired: record.is_expired_at(now),
			expires_at,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::AccountId;

	fn grant(expires_in: Option<i64>) -> TokenGrant {
		TokenGrant {
			access_token: "access-1".into(),
			refresh_token: Some("refresh-1".into()),
			token_type: "bearer".into(),
			expires_in,
		}
	}

	#[test]
	fn from_grant_computes_expiry() {
		let now = OffsetDateTime::now_utc();
		let record = CredentialRecord::from_grant(&grant(Some(3_600)), now);

		assert_eq!(record.expires_at, now + Duration::hours(1));
		assert_eq!(record.access_token.expose(), "access-1");
	}

	#[test]
	fn from_grant_falls_back_when_lifetime_missing() {
		let now = OffsetDateTime::now_utc();
		let record = CredentialRecord::from_grant(&grant(None), now);

		assert_eq!(record.expires_at, now + DEFAULT_EXPIRES_IN);
	}

	#[test]
	fn refresh_window_counts_expired_tokens() {
		let now = OffsetDateTime::now_utc();
		let mut record = CredentialRecord::from_grant(&grant(Some(3_600)), now);
		let window = Duration::minutes(5);

		assert!(!record.needs_refresh_at(now, window));

		record.expires_at = now + Duration::minutes(4);

		assert!(record.needs_refresh_at(now, window));

		record.expires_at = now - Duration::minutes(1);

		assert!(record.needs_refresh_at(now, window));
		assert!(record.is_expired_at(now));
	}

	#[test]
	fn record_round_trips_with_millisecond_timestamps() {
		let issued = OffsetDateTime::from_unix_timestamp(1_700_000_000)
			.expect("Fixture timestamp should be valid.");
		let record = CredentialRecord::from_grant(&grant(Some(100)), issued);
		let payload =
			serde_json::to_value(&record).expect("Credential record should serialize to JSON.");

		assert_eq!(payload["expires_at"], json!(1_700_000_100_000_i64));

		let round_trip: CredentialRecord = serde_json::from_value(payload)
			.expect("Serialized record should deserialize from JSON.");

		assert_eq!(round_trip.expires_at, record.expires_at);
	}

	#[test]
	fn status_reflects_expiry() {
		let now = OffsetDateTime::now_utc();
		let mut record = CredentialRecord::from_grant(&grant(Some(3_600)), now);
		let email = AccountId::new("a@x.com").expect("Account fixture should be valid.");
		let status = AccountStatus::of(email.clone(), &record, now);

		assert!(status.authenticated);
		assert!(status.has_refresh_token);
		assert!(!status.is_expired);

		record.expires_at = now - Duration::seconds(1);

		assert!(AccountStatus::of(email, &record, now).is_expired);
	}
}
