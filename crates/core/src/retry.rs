use std::{fmt, sync::Arc, thread, time::Duration};

use tracing::warn;

use crate::{ConnectionParams, DatabaseAdapter, Dialect, EngineOptions, Result};

pub const MAX_CONNECT_ATTEMPTS: u32 = 15;
pub const BASE_RETRY_DELAY: Duration = Duration::from_millis(100);

// Keeps `2^attempt` well inside `Duration`'s range for oversized policies.
const MAX_BACKOFF_EXPONENT: u32 = 32;

pub type Sleeper = Arc<dyn Fn(Duration) + Send + Sync>;

/// Exponential backoff for the initial connection attempt.
///
/// After failed attempt `n` the connector waits `base_delay * (2^n - 1)`.
#[derive(Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    sleeper: Sleeper,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_CONNECT_ATTEMPTS,
            base_delay: BASE_RETRY_DELAY,
            sleeper: Arc::new(thread::sleep),
        }
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("base_delay", &self.base_delay)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    #[must_use]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    #[must_use]
    pub fn with_sleeper<F>(mut self, sleeper: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.sleeper = Arc::new(sleeper);
        self
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(MAX_BACKOFF_EXPONENT);
        let factor = (1_u64 << exponent) - 1;
        self.base_delay.saturating_mul(u32::try_from(factor).unwrap_or(u32::MAX))
    }
}

/// Connects through `dialect` and validates the connection with a metadata
/// probe, retrying failures until the policy's attempt budget is spent.
///
/// The error of the last attempt is returned as is.
pub fn connect_with_retry(
    dialect: &dyn Dialect,
    params: &ConnectionParams,
    options: &EngineOptions,
    policy: &RetryPolicy,
) -> Result<Box<dyn DatabaseAdapter>> {
    let mut attempt = 0;

    loop {
        attempt += 1;

        let outcome = dialect.connect(params, options).and_then(|adapter| {
            adapter.probe()?;
            Ok(adapter)
        });

        match outcome {
            Ok(adapter) => return Ok(adapter),
            Err(error) if attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    backend = dialect.name(),
                    attempt,
                    "connection could not be established: {error}; retrying in {:.1} seconds",
                    delay.as_secs_f64(),
                );
                (policy.sleeper)(delay);
            }
            Err(error) => return Err(error),
        }
    }
}
