//! Prime search configuration.

use serde::{Deserialize, Serialize};

use crate::primitives::primality::DEFAULT_ROUNDS;
use crate::primitives::sieve::SmallPrimes;
use crate::{Error, Result};

/// Default width of a prime search window.
pub const DEFAULT_WINDOW: u64 = 1 << 15;

/// Default number of consecutive windows tried before a safe prime search gives up.
pub const DEFAULT_MAX_WINDOWS: usize = 64;

/// Prime search settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Strike candidates with a small factor before running Miller-Rabin.
    pub presieve: bool,
    /// Number of consecutive integers examined per search window.
    pub window: u64,
    /// Miller-Rabin rounds per candidate.
    pub rounds: usize,
    /// Windows tried by [`PrimeSearch::safe_prime_near`](crate::PrimeSearch::safe_prime_near).
    pub max_windows: usize,
    /// Exclusive bound of the small-prime sieve table.
    pub small_prime_bound: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            presieve: true,
            window: DEFAULT_WINDOW,
            rounds: DEFAULT_ROUNDS,
            max_windows: DEFAULT_MAX_WINDOWS,
            small_prime_bound: SmallPrimes::DEFAULT_BOUND,
        }
    }
}

impl SearchConfig {
    /// Loads configuration from a TOML file and environment variables.
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables with `EVOTE_` prefix (e.g., `EVOTE_ROUNDS=40`)
    /// 2. TOML configuration file (if exists)
    /// 3. Built-in defaults
    ///
    /// The TOML file path can be set via `EVOTE_CONFIG_PATH`. If not set, defaults
    /// to `./config/evote.toml`. A missing file is silently skipped.
    ///
    /// # Environment Variable Examples
    /// ```bash
    /// EVOTE_PRESIEVE=false
    /// EVOTE_WINDOW=65536
    /// EVOTE_ROUNDS=40
    /// EVOTE_MAX_WINDOWS=128
    /// EVOTE_SMALL_PRIME_BOUND=10000
    /// ```
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> figment::error::Result<Self> {
        use figment::providers::{Env, Format, Serialized, Toml};
        use figment::Figment;

        let config_path =
            std::env::var("EVOTE_CONFIG_PATH").unwrap_or_else(|_| "config/evote.toml".to_string());

        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("EVOTE_").ignore(&["config_path"]))
            .extract()
    }

    /// Rejects settings under which a search cannot make progress.
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(Error::InvalidParams("window cannot be zero".to_string()));
        }
        if self.rounds == 0 {
            return Err(Error::InvalidParams("rounds cannot be zero".to_string()));
        }
        if self.max_windows == 0 {
            return Err(Error::InvalidParams("max_windows cannot be zero".to_string()));
        }
        if self.small_prime_bound < 3 {
            return Err(Error::InvalidParams(format!(
                "small_prime_bound must be at least 3, got {}",
                self.small_prime_bound
            )));
        }
        Ok(())
    }
}
