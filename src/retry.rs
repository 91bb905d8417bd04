//! Bounded exponential-backoff retry for remote calls
//!
//! Wraps a single remote operation. Conflict handling never goes through here:
//! a conflict is a data problem, not a transient fault.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::logging::*;

/// Retry policy for a single remote operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryConfig {
	/// Retries after the first attempt (total attempts = max_retries + 1)
	pub max_retries: u32,

	/// Delay before the first retry in milliseconds
	pub initial_delay_ms: u64,

	/// Upper bound for any single delay in milliseconds
	pub max_delay_ms: u64,

	/// Multiplier applied to the delay after every failed attempt
	pub backoff_factor: f64,
}

impl Default for RetryConfig {
	fn default() -> Self {
		RetryConfig { max_retries: 3, initial_delay_ms: 1000, max_delay_ms: 10_000, backoff_factor: 2.0 }
	}
}

impl RetryConfig {
	/// A policy that makes exactly one attempt
	pub fn no_retry() -> Self {
		RetryConfig { max_retries: 0, initial_delay_ms: 0, max_delay_ms: 0, backoff_factor: 1.0 }
	}

	/// Delay to wait after the given failed attempt (0-indexed)
	pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
		let base = self.initial_delay_ms as f64 * self.backoff_factor.powi(attempt as i32);
		let capped = base.min(self.max_delay_ms as f64).max(0.0);
		Duration::from_millis(capped as u64)
	}
}

/// Run `operation` until it succeeds or the retry budget is spent.
///
/// The error from the last attempt is returned unchanged.
pub async fn retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: std::fmt::Display,
{
	let mut attempt = 0;
	loop {
		match operation().await {
			Ok(value) => {
				if attempt > 0 {
					debug!("Operation succeeded after {} retries", attempt);
				}
				return Ok(value);
			}
			Err(e) if attempt < config.max_retries => {
				let delay = config.delay_for_attempt(attempt);
				debug!(
					"Attempt {}/{} failed: {} (retrying in {:?})",
					attempt + 1,
					config.max_retries + 1,
					e,
					delay
				);
				tokio::time::sleep(delay).await;
				attempt += 1;
			}
			Err(e) => return Err(e),
		}
	}
}


// vim: ts=4
