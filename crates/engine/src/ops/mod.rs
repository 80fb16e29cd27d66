use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::{Clock, Currency, EngineError, ResultEngine, Storage, SystemClock};

mod categories;
mod expenses;
mod profiles;
mod reports;

pub use expenses::MAX_EXPENSE;

/// Default zone for day/week/month windows.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Moscow;

/// Domain operations.
///
/// Each operation validates its input, calls the storage backend and renders
/// the reply for the user. `Engine` holds no mutable state, so a single
/// instance can be shared by any number of workers.
pub struct Engine {
    storage: Arc<dyn Storage>,
    timezone: Tz,
    currency: Currency,
    clock: Arc<dyn Clock>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    fn now(&self) -> DateTime<Tz> {
        self.clock.now().with_timezone(&self.timezone)
    }

    fn local(&self, instant: DateTime<Utc>) -> DateTime<Tz> {
        instant.with_timezone(&self.timezone)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("timezone", &self.timezone)
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

fn normalize_required(value: &str, message: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    storage: Option<Arc<dyn Storage>>,
    timezone: Option<Tz>,
    currency: Currency,
    clock: Option<Arc<dyn Clock>>,
}

impl EngineBuilder {
    /// Pass the required storage backend
    pub fn storage(mut self, storage: Arc<dyn Storage>) -> EngineBuilder {
        self.storage = Some(storage);
        self
    }

    pub fn timezone(mut self, timezone: Tz) -> EngineBuilder {
        self.timezone = Some(timezone);
        self
    }

    pub fn currency(mut self, currency: Currency) -> EngineBuilder {
        self.currency = currency;
        self
    }

    /// Override the wall clock, mostly useful in tests.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> EngineBuilder {
        self.clock = Some(clock);
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> ResultEngine<Engine> {
        let storage = self
            .storage
            .ok_or_else(|| EngineError::Storage("missing storage backend".to_string()))?;
        Ok(Engine {
            storage,
            timezone: self.timezone.unwrap_or(DEFAULT_TIMEZONE),
            currency: self.currency,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
        })
    }
}
