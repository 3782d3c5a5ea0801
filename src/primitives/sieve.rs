//! Small-prime sieve and windowed prime search.
//!
//! Most random candidates are composite, and Miller-Rabin on multi-hundred-bit
//! numbers is comparatively costly. The search therefore strikes every multiple
//! of a prime below the table bound from a window of candidates first, and only
//! runs Miller-Rabin on the survivors, in ascending order.
//!
//! The sieve only promises no false inclusion of composites that have a factor
//! in the table. It keeps a table prime itself when it falls inside the window.

use std::sync::{Arc, OnceLock};

use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use rand_core::CryptoRngCore;
use tracing::{debug, trace, warn};

use super::primality::{is_prime, miller_rabin, Prime};
use super::rng::uniform_inclusive;
use crate::config::SearchConfig;
use crate::{Error, Result};

/// Smallest `q` a safe prime search considers, so that `q` is odd.
const MIN_SUBGROUP_ORDER: u32 = 3;

/// Largest window the sieve will allocate a marker array for.
const MAX_SIEVE_WIDTH: usize = 1 << 26;

static SHARED_TABLE: OnceLock<Arc<SmallPrimes>> = OnceLock::new();

/// All primes below a fixed bound, computed once by trial division.
///
/// Read-only after construction, so one table can be shared by any number of
/// searches and threads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmallPrimes {
    bound: u32,
    primes: Vec<u32>,
}

impl SmallPrimes {
    /// Bound of the process-wide table.
    pub const DEFAULT_BOUND: u32 = 65_000;

    /// Builds the table of all primes strictly below `bound`.
    pub fn new(bound: u32) -> Self {
        let primes = (2..bound).filter(|&n| is_prime(u64::from(n))).collect();
        Self { bound, primes }
    }

    /// Builds a table from an explicit list, for synthetic test tables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] if any entry is not prime or not below `bound`.
    pub fn from_primes(bound: u32, mut primes: Vec<u32>) -> Result<Self> {
        primes.sort_unstable();
        primes.dedup();
        if let Some(&bad) = primes
            .iter()
            .find(|&&p| p >= bound || !is_prime(u64::from(p)))
        {
            return Err(Error::InvalidParams(format!(
                "{bad} is not a prime below {bound}"
            )));
        }
        Ok(Self { bound, primes })
    }

    /// Returns the process-wide table of primes below [`Self::DEFAULT_BOUND`].
    ///
    /// Computed on first use.
    pub fn shared() -> Arc<SmallPrimes> {
        Arc::clone(SHARED_TABLE.get_or_init(|| {
            debug!(bound = Self::DEFAULT_BOUND, "building shared small-prime table");
            Arc::new(Self::new(Self::DEFAULT_BOUND))
        }))
    }

    /// Exclusive upper bound of the table.
    pub fn bound(&self) -> u32 {
        self.bound
    }

    /// The primes, ascending.
    pub fn primes(&self) -> &[u32] {
        &self.primes
    }

    /// Number of primes in the table.
    pub fn len(&self) -> usize {
        self.primes.len()
    }

    /// Returns true if the table holds no primes.
    pub fn is_empty(&self) -> bool {
        self.primes.is_empty()
    }
}

/// A safe prime `p = 2q + 1` together with its Sophie Germain prime `q`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SafePrime {
    p: Prime,
    q: Prime,
}

impl SafePrime {
    /// The safe prime `p`.
    pub fn p(&self) -> &Prime {
        &self.p
    }

    /// The subgroup order `q = (p - 1) / 2`.
    pub fn q(&self) -> &Prime {
        &self.q
    }

    /// Splits into `(p, q)`.
    pub fn into_parts(self) -> (Prime, Prime) {
        (self.p, self.q)
    }
}

/// Windowed prime search backed by a [`SmallPrimes`] table.
#[derive(Clone, Debug)]
pub struct PrimeSearch {
    table: Arc<SmallPrimes>,
    config: SearchConfig,
}

impl PrimeSearch {
    /// Creates a search from a configuration.
    ///
    /// Uses the shared table when `config.small_prime_bound` is the default bound,
    /// and builds a private table otherwise.
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate()?;
        let table = if config.small_prime_bound == SmallPrimes::DEFAULT_BOUND {
            SmallPrimes::shared()
        } else {
            Arc::new(SmallPrimes::new(config.small_prime_bound))
        };
        Ok(Self { table, config })
    }

    /// Creates a search over an explicitly supplied table.
    pub fn with_table(table: Arc<SmallPrimes>, config: SearchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { table, config })
    }

    /// Returns the search configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Returns the small-prime table.
    pub fn table(&self) -> &SmallPrimes {
        &self.table
    }

    /// Returns the integers in `[lo, hi)` with no factor in the small-prime table.
    ///
    /// Table primes inside the window are kept. Values below 2 are never returned.
    pub fn sieve(&self, lo: &BigUint, hi: &BigUint) -> Result<Vec<BigUint>> {
        let width = window_width(lo, hi)?;
        let mut remaining = vec![true; width];
        // Set only when the whole window fits in u64; table primes and values
        // below 2 can only appear in such a window.
        let small_window = lo
            .to_u64()
            .and_then(|l| l.checked_add(width as u64).map(|end| (l, end)));

        if let Some((l, end)) = small_window {
            for value in l..2u64.min(end) {
                remaining[(value - l) as usize] = false;
            }
        }

        for &p in self.table.primes() {
            let rem = (lo % p).to_u32().ok_or_else(|| {
                Error::InvalidParams(format!("remainder of {lo} modulo {p} exceeds u32"))
            })?;
            let start = ((p - rem) % p) as usize;
            for i in (start..width).step_by(p as usize) {
                remaining[i] = false;
            }
        }

        if let Some((l, end)) = small_window {
            for &p in self.table.primes() {
                let p = u64::from(p);
                if p >= l && p < end {
                    remaining[(p - l) as usize] = true;
                }
            }
        }

        Ok(remaining
            .iter()
            .enumerate()
            .filter(|&(_, &keep)| keep)
            .map(|(i, _)| lo + i)
            .collect())
    }

    /// Finds a prime near `n`.
    ///
    /// Picks a random offset `r` in `[0, n]` and returns the smallest prime in
    /// the window `[n + r, n + r + window)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SearchExhausted`] if no candidate in the window passes.
    pub fn find_prime<R: CryptoRngCore + ?Sized>(&self, n: &BigUint, rng: &mut R) -> Result<Prime> {
        let offset = uniform_inclusive(rng, &BigUint::zero(), n)?;
        let lo = n + offset;
        self.find_prime_in_window(&lo, rng)
    }

    /// Returns the smallest prime in `[lo, lo + window)`.
    pub fn find_prime_in_window<R: CryptoRngCore + ?Sized>(
        &self,
        lo: &BigUint,
        rng: &mut R,
    ) -> Result<Prime> {
        let hi = lo + self.config.window;
        for candidate in self.candidates(lo, &hi)? {
            if miller_rabin(&candidate, self.config.rounds, rng) {
                trace!(prime = %candidate, "confirmed prime");
                return Ok(Prime::new_unchecked(candidate));
            }
        }

        warn!(%lo, %hi, "no prime found in search window");
        Err(Error::SearchExhausted { lo: lo.clone(), hi })
    }

    /// Finds a safe prime `p = 2q + 1` with `q` in `[n/2, n/2 + window)`.
    ///
    /// `q` is never below 3, so the smallest result is `p = 7`.
    ///
    /// Candidates for `q` are sieved and confirmed with Miller-Rabin; `2q + 1`
    /// is then tested with Miller-Rabin alone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SearchExhausted`] if no safe prime exists in the window.
    pub fn find_safe_prime<R: CryptoRngCore + ?Sized>(
        &self,
        n: &BigUint,
        rng: &mut R,
    ) -> Result<SafePrime> {
        let lo = (n >> 1u32).max(BigUint::from(MIN_SUBGROUP_ORDER));
        let hi = &lo + self.config.window;
        let rounds = self.config.rounds;

        for q in self.candidates(&lo, &hi)? {
            if !miller_rabin(&q, rounds, rng) {
                continue;
            }
            let p = (&q << 1u32) + 1u32;
            if miller_rabin(&p, rounds, rng) {
                debug!(bits = p.bits(), "found safe prime");
                return Ok(SafePrime {
                    p: Prime::new_unchecked(p),
                    q: Prime::new_unchecked(q),
                });
            }
            trace!(%q, "2q + 1 is composite");
        }

        warn!(%lo, %hi, "no safe prime found in search window");
        Err(Error::SearchExhausted { lo, hi })
    }

    /// Finds a safe prime at or above `n`, retrying over consecutive windows.
    ///
    /// Tries at most `max_windows` windows before giving up.
    pub fn safe_prime_near<R: CryptoRngCore + ?Sized>(
        &self,
        n: &BigUint,
        rng: &mut R,
    ) -> Result<SafePrime> {
        let stride = BigUint::from(self.config.window) << 1u32;
        let mut start = n.clone();

        for attempt in 0..self.config.max_windows {
            match self.find_safe_prime(&start, rng) {
                Err(Error::SearchExhausted { .. }) => {
                    debug!(attempt, "retrying safe prime search in next window");
                    start += &stride;
                }
                result => return result,
            }
        }

        Err(Error::SearchExhausted {
            lo: n >> 1u32,
            hi: start >> 1u32,
        })
    }

    fn candidates(&self, lo: &BigUint, hi: &BigUint) -> Result<Vec<BigUint>> {
        if self.config.presieve {
            let survivors = self.sieve(lo, hi)?;
            debug!(%lo, survivors = survivors.len(), "sieved search window");
            Ok(survivors)
        } else {
            let width = window_width(lo, hi)?;
            Ok((0..width).map(|i| lo + i).collect())
        }
    }
}

fn window_width(lo: &BigUint, hi: &BigUint) -> Result<usize> {
    if hi < lo {
        return Err(Error::InvalidParams(format!(
            "search window [{lo}, {hi}) is inverted"
        )));
    }
    (hi - lo)
        .to_usize()
        .filter(|&w| w <= MAX_SIEVE_WIDTH)
        .ok_or_else(|| Error::InvalidParams(format!("search window [{lo}, {hi}) is too wide")))
}
