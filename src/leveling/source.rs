//! Time and randomness collaborators of the engine.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

/// Smallest experience amount granted for one message.
pub const XP_MIN: i64 = 1;
/// Largest experience amount granted for one message.
pub const XP_MAX: i64 = 20;

pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now(&self) -> f64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

pub trait XpSource: Send + Sync {
    /// An amount in `XP_MIN..=XP_MAX`.
    fn roll(&self) -> i64;
}

pub struct RandomXp {
    rng: Mutex<StdRng>,
}

impl RandomXp {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomXp {
    fn default() -> Self {
        Self::new()
    }
}

impl XpSource for RandomXp {
    fn roll(&self) -> i64 {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(XP_MIN..=XP_MAX)
    }
}
