//! Bounded-concurrency batch processing
//!
//! Splits work into batches, runs at most `concurrency` futures of a batch at
//! once, reports progress after each batch and pauses between batches so the
//! wiki API is not hit in bursts. Results come back in input order.
//!
//! The processor returns a plain value: per-item failures are the processor's
//! business (typically it returns a `Result` or an outcome enum), so one item
//! can never abort its batch. Nothing here retries.

use futures::stream::{self, StreamExt};
use std::future::Future;
use std::time::Duration;

/// Batching parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
	/// Items per batch
	pub batch_size: usize,

	/// Futures in flight within one batch
	pub concurrency: usize,

	/// Pause between consecutive batches
	pub delay: Duration,
}

impl Default for BatchOptions {
	fn default() -> Self {
		BatchOptions { batch_size: 10, concurrency: 3, delay: Duration::from_millis(100) }
	}
}

/// Run `processor` over all items and return the results in input order.
///
/// `on_progress(processed, total)` is called once per completed batch.
pub async fn batch_process<I, R, F, Fut, P>(
	items: Vec<I>,
	processor: F,
	options: &BatchOptions,
	mut on_progress: P,
) -> Vec<R>
where
	F: Fn(I) -> Fut,
	Fut: Future<Output = R>,
	P: FnMut(usize, usize),
{
	let total = items.len();
	let batch_size = options.batch_size.max(1);
	let concurrency = options.concurrency.max(1);

	let mut results = Vec::with_capacity(total);
	let mut remaining = items.into_iter().peekable();
	let mut processed = 0;

	while remaining.peek().is_some() {
		let batch: Vec<I> = remaining.by_ref().take(batch_size).collect();
		let len = batch.len();

		// `buffered` keeps output order equal to input order
		let mut batch_results: Vec<R> =
			stream::iter(batch).map(&processor).buffered(concurrency).collect().await;
		results.append(&mut batch_results);

		processed += len;
		on_progress(processed, total);

		if remaining.peek().is_some() && !options.delay.is_zero() {
			tokio::time::sleep(options.delay).await;
		}
	}

	results
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::{Arc, Mutex};

	fn options(batch_size: usize, concurrency: usize) -> BatchOptions {
		BatchOptions { batch_size, concurrency, delay: Duration::from_millis(1) }
	}

	#[tokio::test]
	async fn test_results_keep_input_order() {
		let items = vec!["a", "b", "c", "d", "e"];
		// Later items finish first inside each batch
		let delays = [30u64, 5, 20, 1, 10];

		let results = batch_process(
			items.into_iter().enumerate().collect(),
			|(i, item): (usize, &str)| async move {
				tokio::time::sleep(Duration::from_millis(delays[i])).await;
				item.to_uppercase()
			},
			&options(2, 2),
			|_, _| {},
		)
		.await;

		assert_eq!(results, vec!["A", "B", "C", "D", "E"]);
	}

	#[tokio::test]
	async fn test_progress_reported_per_batch() {
		let progress = Arc::new(Mutex::new(Vec::new()));
		let sink = progress.clone();

		let results = batch_process(
			(0..7).collect(),
			|n: u32| async move { n * 2 },
			&options(3, 2),
			move |done, total| sink.lock().unwrap().push((done, total)),
		)
		.await;

		assert_eq!(results, vec![0, 2, 4, 6, 8, 10, 12]);
		assert_eq!(*progress.lock().unwrap(), vec![(3, 7), (6, 7), (7, 7)]);
	}

	#[tokio::test]
	async fn test_concurrency_is_bounded() {
		let active = Arc::new(AtomicUsize::new(0));
		let peak = Arc::new(AtomicUsize::new(0));

		batch_process(
			(0..12).collect::<Vec<u32>>(),
			|_| {
				let active = active.clone();
				let peak = peak.clone();
				async move {
					let now = active.fetch_add(1, Ordering::SeqCst) + 1;
					peak.fetch_max(now, Ordering::SeqCst);
					tokio::time::sleep(Duration::from_millis(5)).await;
					active.fetch_sub(1, Ordering::SeqCst);
				}
			},
			&options(6, 2),
			|_, _| {},
		)
		.await;

		assert_eq!(peak.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn test_failed_items_do_not_abort_batch() {
		let results = batch_process(
			vec![1, 2, 3, 4],
			|n: i32| async move {
				if n == 2 {
					Err(format!("item {} failed", n))
				} else {
					Ok(n)
				}
			},
			&options(2, 2),
			|_, _| {},
		)
		.await;

		assert_eq!(results.len(), 4);
		assert!(results[1].is_err());
		assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 3);
	}

	#[tokio::test]
	async fn test_empty_input() {
		let mut calls = 0;
		let results: Vec<u32> =
			batch_process(Vec::<u32>::new(), |n| async move { n }, &options(2, 2), |_, _| calls += 1)
				.await;
		assert!(results.is_empty());
		assert_eq!(calls, 0);
	}
}

// vim: ts=4
