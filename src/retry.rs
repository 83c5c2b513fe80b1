// Retry policy used by folder creation, file upload and mapping saves.
// The delay between attempts is constant; there is no backoff growth.

use crate::error::{Error, Result};
use std::thread;
use std::time::Duration;

pub const DEFAULT_ATTEMPTS: u32 = 5;
pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

/// Attempt budget plus the pause taken between two consecutive attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: DEFAULT_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        RetryPolicy {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Run `op` until it returns `Ok` or the budget is spent.
    ///
    /// `op` receives the 1-based attempt number. Every failed attempt is
    /// logged; after the last one the final error is wrapped in
    /// [`Error::Exhausted`]. The thread sleeps only between attempts, never
    /// after the last.
    pub fn run<T, F>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Result<T>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    log::warn!("{operation}: attempt {attempt}/{attempts} failed: {err}");
                    if attempt >= attempts {
                        return Err(Error::Exhausted {
                            operation: operation.to_string(),
                            attempts,
                            last: Box::new(err),
                        });
                    }
                }
            }
            attempt += 1;
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
        }
    }
}
