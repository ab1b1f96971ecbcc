//! Client for the budgeting provider's OAuth authorization server.
//!
//! The provider is fixed (one authorize endpoint, one token endpoint, one confidential client),
//! so this is a thin facade over the `oauth2` crate: it builds the interactive authorize URL and
//! performs authorization-code and refresh-token exchanges, classifying failures into grant
//! rejections (credential must be evicted) and everything else (credential stays usable).

// crates.io
use oauth2::{
	AuthType, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet, RedirectUrl,
	RefreshToken, RequestTokenError, TokenResponse, TokenUrl,
	basic::{
		BasicClient, BasicErrorResponseType, BasicRequestTokenError, BasicTokenResponse,
		BasicTokenType,
	},
};
// self
use crate::{
	_prelude::*,
	auth::TokenGrant,
	config::OAuthConfig,
	error::ConfigError,
	http::{ExchangeMeta, ExchangeMetaSlot, MeteredHttpClient},
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;
type ConfiguredClient =
	BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type ExchangeError = BasicRequestTokenError<oauth2::HttpClientError<reqwest::Error>>;

/// Errors emitted by token-endpoint exchanges.
#[derive(Debug, ThisError)]
pub enum OAuthError {
	/// The server rejected the grant itself (HTTP 400/401 or an OAuth error such as
	/// `invalid_grant`); the credential that produced it is dead.
	#[error("Authorization server rejected the grant: {reason}.")]
	Rejected {
		/// Server-supplied reason string.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// The endpoint misbehaved in a way that does not condemn the credential.
	#[error("Token endpoint returned an unexpected response: {message}.")]
	Endpoint {
		/// Summary of the unexpected behavior.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Transport failure before any response arrived (DNS, TCP, TLS).
	#[error("Network error occurred while calling the token endpoint.")]
	Transport {
		/// Underlying transport failure.
		#[source]
		source: BoxError,
	},
}

/// Authorization-server facade for a single fixed provider.
pub struct AuthorizationServer {
	client: ConfiguredClient,
	http: ReqwestClient,
	authorize_url: Url,
	client_id: String,
	redirect_uri: String,
}
impl AuthorizationServer {
	/// Builds the facade from the OAuth configuration section.
	pub fn new(config: &OAuthConfig) -> Result<Self, ConfigError> {
		let authorize_url = Url::parse(&config.authorize_url)
			.map_err(|source| ConfigError::InvalidUrl { field: "oauth.authorize_url", source })?;
		let token_url = TokenUrl::new(config.token_url.clone())
			.map_err(|source| ConfigError::InvalidUrl { field: "oauth.token_url", source })?;
		let redirect_uri = RedirectUrl::new(config.redirect_uri.clone())
			.map_err(|source| ConfigError::InvalidUrl { field: "oauth.redirect_uri", source })?;
		let client = BasicClient::new(ClientId::new(config.client_id.clone()))
			.set_client_secret(ClientSecret::new(config.client_secret.clone()))
			.set_token_uri(token_url)
			// The provider expects client credentials in the form body, not basic auth.
			.set_auth_type(AuthType::RequestBody)
			.set_redirect_uri(redirect_uri);

		Ok(Self {
			client,
			http: ReqwestClient::default(),
			authorize_url,
			client_id: config.client_id.clone(),
			redirect_uri: config.redirect_uri.clone(),
		})
	}

	/// Returns the URL the user must visit to authorize the client.
	pub fn authorization_url(&self) -> Url {
		let mut url = self.authorize_url.clone();

		url.query_pairs_mut()
			.append_pair("client_id", &self.client_id)
			.append_pair("redirect_uri", &self.redirect_uri)
			.append_pair("response_type", "code");

		url
	}

	/// Exchanges an authorization code for a token grant.
	pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant, OAuthError> {
		let slot = ExchangeMetaSlot::default();
		let http = MeteredHttpClient::new(self.http.clone(), slot.clone());
		let result = self
			.client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.request_async(&http)
			.await;

		match result {
			Ok(response) => Ok(grant_from(&response)),
			Err(err) => Err(map_exchange_error(err, slot.take())),
		}
	}

	/// Exchanges a refresh token for a fresh grant.
	pub async fn refresh(&self, refresh_token: &str) -> Result<TokenGrant, OAuthError> {
		let slot = ExchangeMetaSlot::default();
		let http = MeteredHttpClient::new(self.http.clone(), slot.clone());
		let result = self
			.client
			.exchange_refresh_token(&RefreshToken::new(refresh_token.to_owned()))
			.request_async(&http)
			.await;

		match result {
			Ok(response) => Ok(grant_from(&response)),
			Err(err) => Err(map_exchange_error(err, slot.take())),
		}
	}
}

fn grant_from(response: &BasicTokenResponse) -> TokenGrant {
	TokenGrant {
		access_token: response.access_token().secret().clone(),
		refresh_token: response.refresh_token().map(|token| token.secret().clone()),
		token_type: token_type_label(response.token_type()),
		expires_in: response.expires_in().map(|lifetime| lifetime.as_secs() as i64),
	}
}

fn token_type_label(token_type: &BasicTokenType) -> String {
	match token_type {
		BasicTokenType::Bearer => "bearer".into(),
		BasicTokenType::Mac => "mac".into(),
		BasicTokenType::Extension(other) => other.clone(),
	}
}

fn map_exchange_error(err: ExchangeError, meta: Option<ExchangeMeta>) -> OAuthError {
	let status = meta.as_ref().and_then(|m| m.status);

	match err {
		RequestTokenError::ServerResponse(response) => {
			let code = response.error().as_ref().to_owned();
			let reason =
				response.error_description().cloned().unwrap_or_else(|| code.clone());
			let grant_rejected = matches!(status, Some(400 | 401))
				|| matches!(
					response.error(),
					BasicErrorResponseType::InvalidGrant
						| BasicErrorResponseType::InvalidClient
						| BasicErrorResponseType::InvalidRequest
						| BasicErrorResponseType::UnauthorizedClient
				);

			if grant_rejected {
				OAuthError::Rejected { reason, status }
			} else {
				OAuthError::Endpoint { message: reason, status }
			}
		},
		RequestTokenError::Request(error) => OAuthError::Transport { source: Box::new(error) },
		RequestTokenError::Parse(source, _body) =>
			if matches!(status, Some(400 | 401)) {
				// The status already condemns the grant even though the body is unreadable.
				OAuthError::Rejected { reason: "unparseable error response".into(), status }
			} else {
				OAuthError::Endpoint { message: format!("malformed token response: {source}"), status }
			},
		RequestTokenError::Other(message) => OAuthError::Endpoint { message, status },
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::config::OAuthConfig;

	fn server() -> AuthorizationServer {
		let config = OAuthConfig {
			client_id: "client-abc".into(),
			client_secret: "secret-abc".into(),
			redirect_uri: "urn:ietf:wg:oauth:2.0:oob".into(),
			authorize_url: "https://auth.example.com/oauth/authorize".into(),
			token_url: "https://auth.example.com/oauth/token".into(),
		};

		AuthorizationServer::new(&config).expect("OAuth fixture configuration should be valid.")
	}

	#[test]
	fn authorization_url_carries_client_parameters() {
		let url = server().authorization_url();

		assert_eq!(url.host_str(), Some("auth.example.com"));
		assert_eq!(url.path(), "/oauth/authorize");

		let query: HashMap<_, _> = url.query_pairs().into_owned().collect();

		assert_eq!(query.get("client_id").map(String::as_str), Some("client-abc"));
		assert_eq!(
			query.get("redirect_uri").map(String::as_str),
			Some("urn:ietf:wg:oauth:2.0:oob")
		);
		assert_eq!(query.get("response_type").map(String::as_str), Some("code"));
	}

	#[test]
	fn invalid_token_url_is_rejected_at_construction() {
		let config = OAuthConfig {
			client_id: "client-abc".into(),
			client_secret: "secret-abc".into(),
			redirect_uri: "urn:ietf:wg:oauth:2.0:oob".into(),
			authorize_url: "https://auth.example.com/oauth/authorize".into(),
			token_url: "not a url".into(),
		};

		assert!(matches!(
			AuthorizationServer::new(&config),
			Err(ConfigError::InvalidUrl { field: "oauth.token_url", .. })
		));
	}
}
