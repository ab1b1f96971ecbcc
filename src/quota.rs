//! Hourly request-quota gate with a reserved buffer and durable counters.

pub mod store;

pub use store::{FileQuotaStore, MemoryQuotaStore, QuotaStore};

// self
use crate::{
	_prelude::*,
	auth::AccountId,
	error::{ConfigError, RateLimitExceeded},
};

/// Caller-declared priority for an outbound call.
///
/// `Normal` traffic stops at the buffered limit; `High` may dip into the
/// reserved headroom up to the hard limit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Priority {
	/// Routine traffic, throttled at the buffered limit.
	#[default]
	Normal,
	/// Urgent traffic, allowed up to the hard limit.
	High,
}

/// Static limits governing a [`QuotaGate`].
#[derive(Clone, Copy, Debug)]
pub struct QuotaLimits {
	/// Hard per-account request limit per window.
	pub limit: u32,
	/// Percentage of the limit reserved for high-priority calls.
	pub buffer_percent: u32,
	/// Rolling window length.
	pub window: Duration,
	/// Background sweep interval.
	pub sweep_interval: Duration,
}
impl QuotaLimits {
	/// Limit applied to normal-priority traffic: `floor(limit * (100 - buffer) / 100)`.
	pub fn effective_limit(&self) -> u32 {
		self.limit * (100 - self.buffer_percent) / 100
	}

	/// Limit applied to the provided priority.
	pub fn limit_for(&self, priority: Priority) -> u32 {
		match priority {
			Priority::Normal => self.effective_limit(),
			Priority::High => self.limit,
		}
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.buffer_percent >= 100 {
			return Err(ConfigError::BufferOutOfRange);
		}

		Ok(())
	}
}
impl Default for QuotaLimits {
	fn default() -> Self {
		Self {
			limit: 200,
			buffer_percent: 10,
			window: Duration::hours(1),
			sweep_interval: Duration::seconds(60),
		}
	}
}
impl From<crate::config::QuotaConfig> for QuotaLimits {
	fn from(config: crate::config::QuotaConfig) -> Self {
		Self {
			limit: config.limit,
			buffer_percent: config.buffer_percent,
			window: Duration::seconds(config.window_secs as i64),
			sweep_interval: Duration::seconds(config.sweep_secs as i64),
		}
	}
}

/// One account's rolling request window, persisted as `{count, resetTime}` with `resetTime` in
/// unix milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaWindow {
	/// Requests admitted in the current window.
	pub count: u32,
	/// Instant at which the window rolls over.
	#[serde(rename = "resetTime", with = "crate::store::timestamp_ms")]
	pub reset_time: OffsetDateTime,
}

/// Per-account outbound-call gate enforcing the remote API's hourly quota minus a safety buffer.
///
/// Counters load once at construction and every mutation is flushed through
/// the [`QuotaStore`] before the admitted call proceeds, so restarts cannot
/// forget consumed quota.
pub struct QuotaGate {
	limits: QuotaLimits,
	counters: Mutex<HashMap<AccountId, QuotaWindow>>,
	store: Arc<dyn QuotaStore>,
}
impl QuotaGate {
	/// Builds a gate over the provided store, loading any persisted counters.
	pub fn new(limits: QuotaLimits, store: Arc<dyn QuotaStore>) -> Result<Self> {
		limits.validate()?;

		let counters = store.load()?;

		Ok(Self { limits, counters: Mutex::new(counters), store })
	}

	/// Returns the limits this gate enforces.
	pub fn limits(&self) -> QuotaLimits {
		self.limits
	}

	/// Whether a request could be admitted right now, without consuming quota.
	pub fn can_admit(&self, account: &AccountId, priority: Priority) -> bool {
		self.can_admit_at(account, priority, OffsetDateTime::now_utc())
	}

	/// Clock-injected variant of [`Self::can_admit`].
	pub fn can_admit_at(
		&self,
		account: &AccountId,
		priority: Priority,
		now: OffsetDateTime,
	) -> bool {
		let mut counters = self.counters.lock();
		let window = Self::window_entry(&mut counters, account, now, self.limits.window);

		window.count < self.limits.limit_for(priority)
	}

	/// Admits and runs one outbound operation.
	///
	/// The slot is consumed (and persisted) before the operation is awaited; check and increment
	/// happen under one lock. When the operation reports an upstream quota rejection, the local
	/// count is forced to the hard limit so both sides agree on the window, and the rejection is
	/// re-signalled to the caller.
	pub async fn execute<T, F>(&self, account: &AccountId, priority: Priority, op: F) -> Result<T>
	where
		F: Future<Output = Result<T>>,
	{
		self.try_admit(account, priority, OffsetDateTime::now_utc())?;

		match op.await {
			Err(Error::RateLimit(info)) if info.upstream => {
				self.force_exhaust(account)?;

				Err(Error::RateLimit(info))
			},
			other => other,
		}
	}

	/// Releases one previously admitted slot; compensation for abandoned work.
	pub fn decrement(&self, account: &AccountId) -> Result<()> {
		let mut counters = self.counters.lock();

		if let Some(window) = counters.get_mut(account) {
			window.count = window.count.saturating_sub(1);

			let snapshot = counters.clone();

			drop(counters);

			self.store.persist(&snapshot)?;
		}

		Ok(())
	}

	/// Requests remaining for the provided priority.
	pub fn remaining(&self, account: &AccountId, priority: Priority) -> u32 {
		let now = OffsetDateTime::now_utc();
		let mut counters = self.counters.lock();
		let window = Self::window_entry(&mut counters, account, now, self.limits.window);

		self.limits.limit_for(priority).saturating_sub(window.count)
	}

	/// Instant at which the account's window resets.
	pub fn reset_time(&self, account: &AccountId) -> OffsetDateTime {
		let counters = self.counters.lock();

		counters
			.get(account)
			.map(|window| window.reset_time)
			.unwrap_or_else(|| OffsetDateTime::now_utc() + self.limits.window)
	}

	/// Rolls over every window whose reset instant has passed; returns whether anything changed.
	pub fn sweep_expired(&self) -> Result<bool> {
		self.sweep_expired_at(OffsetDateTime::now_utc())
	}

	/// Clock-injected variant of [`Self::sweep_expired`].
	pub fn sweep_expired_at(&self, now: OffsetDateTime) -> Result<bool> {
		let mut counters = self.counters.lock();
		let mut changed = false;

		for window in counters.values_mut() {
			if now > window.reset_time {
				window.count = 0;
				window.reset_time = now + self.limits.window;
				changed = true;
			}
		}

		if changed {
			let snapshot = counters.clone();

			drop(counters);

			self.store.persist(&snapshot)?;
		}

		Ok(changed)
	}

	/// Spawns the periodic rollover sweep on the current tokio runtime.
	pub fn spawn_sweeper(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
		let gate = Arc::clone(self);
		let period = std::time::Duration::from_secs(
			gate.limits.sweep_interval.whole_seconds().max(1) as u64,
		);

		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(period);

			// The first tick completes immediately.
			ticker.tick().await;

			loop {
				ticker.tick().await;

				if let Err(err) = gate.sweep_expired() {
					tracing::warn!(%err, "quota sweep failed");
				}
			}
		})
	}

	/// Clock-injected admission used by [`Self::execute`] and the tests.
	pub fn try_admit(
		&self,
		account: &AccountId,
		priority: Priority,
		now: OffsetDateTime,
	) -> Result<()> {
		let mut counters = self.counters.lock();
		let window = Self::window_entry(&mut counters, account, now, self.limits.window);

		if window.count >= self.limits.limit_for(priority) {
			let reset_in = window.reset_time - now;
			let minutes = (reset_in.whole_seconds().max(0) + 59) / 60;

			return Err(Error::RateLimit(RateLimitExceeded {
				message: format!("Rate limit exceeded for {account}. Resets in {minutes} minutes."),
				retry_after: reset_in,
				upstream: false,
			}));
		}

		window.count += 1;

		let snapshot = counters.clone();

		drop(counters);

		self.store.persist(&snapshot)?;

		Ok(())
	}

	fn force_exhaust(&self, account: &AccountId) -> Result<()> {
		let mut counters = self.counters.lock();

		if let Some(window) = counters.get_mut(account) {
			window.count = self.limits.limit;
		}

		let snapshot = counters.clone();

		drop(counters);

		self.store.persist(&snapshot)?;

		Ok(())
	}

	fn window_entry<'a>(
		counters: &'a mut HashMap<AccountId, QuotaWindow>,
		account: &AccountId,
		now: OffsetDateTime,
		window_len: Duration,
	) -> &'a mut QuotaWindow {
		let window = counters
			.entry(account.clone())
			.or_insert_with(|| QuotaWindow { count: 0, reset_time: now + window_len });

		if now > window.reset_time {
			window.count = 0;
			window.reset_time = now + window_len;
		}

		window
	}
}
