//! Time and randomness sources.
//!
//! Services never call `Utc::now()` or `rand::thread_rng()` directly; they go through a
//! [`Clock`] and a [`LotteryDraw`] so tests can pin both.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Draws lottery numbers uniformly from `1..=max`.
pub struct LotteryDraw {
    rng: Mutex<StdRng>,
    max: u32,
}

impl LotteryDraw {
    pub fn from_entropy(max: u32) -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            max: max.max(1),
        }
    }

    /// Same seed, same sequence of numbers.
    pub fn seeded(seed: u64, max: u32) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            max: max.max(1),
        }
    }

    pub fn draw(&self) -> u32 {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(1..=self.max)
    }
}

impl std::fmt::Debug for LotteryDraw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LotteryDraw").field("max", &self.max).finish()
    }
}
