//! Instrumented HTTP transport for token-endpoint exchanges.
//!
//! The `oauth2` crate surfaces server failures without the raw HTTP status, so the transport
//! records the status and any `Retry-After` hint of the most recent response into an
//! [`ExchangeMetaSlot`] for the error mapping in [`crate::oauth`] to consume.

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use time::format_description::well_known::Rfc2822;
// self
use crate::_prelude::*;

/// Status and retry hint captured from the most recent token-endpoint response.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExchangeMeta {
	/// HTTP status code returned by the token endpoint, if a response arrived.
	pub status: Option<u16>,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
}

/// Thread-safe slot sharing [`ExchangeMeta`] between the transport and the error mapping layer.
///
/// A fresh slot is created per exchange; the transport clears it before dispatch so stale data
/// never leaks across attempts.
#[derive(Clone, Debug, Default)]
pub struct ExchangeMetaSlot(Arc<Mutex<Option<ExchangeMeta>>>);
impl ExchangeMetaSlot {
	/// Stores metadata for the current request.
	pub fn store(&self, meta: ExchangeMeta) {
		*self.0.lock() = Some(meta);
	}

	/// Returns the captured metadata, if any, consuming it from the slot.
	pub fn take(&self) -> Option<ExchangeMeta> {
		self.0.lock().take()
	}
}

/// reqwest-backed [`AsyncHttpClient`] that records [`ExchangeMeta`] for every call.
pub(crate) struct MeteredHttpClient {
	client: ReqwestClient,
	slot: ExchangeMetaSlot,
}
impl MeteredHttpClient {
	pub(crate) fn new(client: ReqwestClient, slot: ExchangeMetaSlot) -> Self {
		Self { client, slot }
	}
}
impl<'c> AsyncHttpClient<'c> for MeteredHttpClient {
	type Error = HttpClientError<reqwest::Error>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.slot.take();

			let response = self
				.client
				.execute(request.try_into().map_err(Box::new)?)
				.await
				.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let retry_after = parse_retry_after(&headers);

			self.slot.store(ExchangeMeta { status: Some(status.as_u16()), retry_after });

			let mut response_new =
				HttpResponse::new(response.bytes().await.map_err(Box::new)?.to_vec());

			*response_new.status_mut() = status;
			*response_new.headers_mut() = headers;

			Ok(response_new)
		})
	}
}

/// Parses a `Retry-After` header as delta seconds or an RFC 2822 date.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return Some(Duration::seconds(secs as i64));
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
