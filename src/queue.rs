//! Single-flight background task queue
//!
//! Tasks run strictly one at a time in FIFO order on a tokio task that exists
//! only while the queue has work. A failing or panicking task is logged and
//! the queue moves on to the next one.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::VecDeque;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use tokio::sync::{oneshot, Notify};

use crate::error::SyncError;
use crate::logging::*;

type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Receives the outcome of a queued task; may be dropped freely
pub type TaskHandle<T> = oneshot::Receiver<Result<T, SyncError>>;

struct QueueState {
	pending: VecDeque<Job>,
	running: bool,
}

struct QueueInner {
	state: Mutex<QueueState>,
	idle: Notify,
}

/// FIFO queue that runs one task at a time
#[derive(Clone)]
pub struct TaskQueue {
	inner: Arc<QueueInner>,
}

impl TaskQueue {
	pub fn new() -> Self {
		TaskQueue {
			inner: Arc::new(QueueInner {
				state: Mutex::new(QueueState { pending: VecDeque::new(), running: false }),
				idle: Notify::new(),
			}),
		}
	}

	/// Enqueue a task. Must be called from within a tokio runtime.
	pub fn add<F, Fut, T>(&self, task: F) -> TaskHandle<T>
	where
		F: FnOnce() -> Fut + Send + 'static,
		Fut: Future<Output = Result<T, SyncError>> + Send + 'static,
		T: Send + 'static,
	{
		let (tx, rx) = oneshot::channel();
		let job: Job = Box::new(move || {
			async move {
				let result = match AssertUnwindSafe(task()).catch_unwind().await {
					Ok(result) => result,
					Err(_) => Err(SyncError::Other { message: "queued task panicked".to_string() }),
				};
				if let Err(ref e) = result {
					warn!("Queued task failed: {}", e);
				}
				let _ = tx.send(result);
			}
			.boxed()
		});

		{
			let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
			state.pending.push_back(job);
			if state.running {
				return rx;
			}
			state.running = true;
		}

		let inner = self.inner.clone();
		tokio::spawn(async move { inner.drain().await });
		rx
	}

	/// Number of tasks waiting to run (excluding the one running now)
	pub fn size(&self) -> usize {
		self.inner.state.lock().unwrap_or_else(|e| e.into_inner()).pending.len()
	}

	/// Drop all waiting tasks; a task already running finishes normally
	pub fn clear(&self) {
		let dropped = {
			let mut state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
			std::mem::take(&mut state.pending)
		};
		if !dropped.is_empty() {
			debug!("Cleared {} queued tasks", dropped.len());
		}
	}

	/// True when nothing is running and nothing is waiting
	pub fn is_idle(&self) -> bool {
		let state = self.inner.state.lock().unwrap_or_else(|e| e.into_inner());
		!state.running && state.pending.is_empty()
	}

	/// Wait until the queue has drained
	pub async fn wait_idle(&self) {
		loop {
			let notified = self.inner.idle.notified();
			if self.is_idle() {
				return;
			}
			notified.await;
		}
	}
}

impl Default for TaskQueue {
	fn default() -> Self {
		Self::new()
	}
}

impl QueueInner {
	async fn drain(&self) {
		loop {
			let job = {
				let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
				match state.pending.pop_front() {
					Some(job) => job,
					None => {
						state.running = false;
						self.idle.notify_waiters();
						return;
					}
				}
			};
			job().await;
		}
	}
}


// vim: ts=4
