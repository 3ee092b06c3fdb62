use crate::error::PoolError;
use crate::handle::TaskHandle;
use crate::notifier::{CompletionNotifier, TaskCompletionInfo, TaskCompletionStatus};
use crate::queue::TaskQueue;
use crate::task::{panic_message, ErasedJob, TaskCell};
use crate::worker::{run_worker_loop, WorkerContext};

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel;
use parking_lot::Mutex;
use tracing::{debug, error, info, trace, warn};

lazy_static::lazy_static! {
  static ref NEXT_POOL_TASK_ID_COUNTER: AtomicU64 = AtomicU64::new(0);
}

/// A fixed-size pool of OS threads executing submitted closures.
///
/// All worker threads are spawned up front by [`ThreadPoolManager::new`] and
/// live until teardown. Submission hands back a [`TaskHandle`] for the task's
/// eventual outcome and never blocks the submitter. Teardown, explicit via
/// [`ThreadPoolManager::shutdown`] or implicit via `Drop`, stops dequeuing,
/// joins every worker, and abandons whatever never ran.
pub struct ThreadPoolManager {
  pool_name: Arc<String>,
  thread_count: usize,
  queue: Arc<TaskQueue>,
  active_count: Arc<AtomicUsize>,
  notifier: Arc<CompletionNotifier>,
  worker_join_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ThreadPoolManager {
  /// Creates a pool with `thread_count` worker threads, clamped to at least
  /// one. Every worker is spawned and ready before this returns.
  pub fn new(thread_count: usize, pool_name: &str) -> Self {
    let pool_name = Arc::new(pool_name.to_string());
    let thread_count = thread_count.max(1);
    let queue = Arc::new(TaskQueue::new());
    let active_count = Arc::new(AtomicUsize::new(0));
    let notifier = Arc::new(CompletionNotifier::new(pool_name.clone()));

    let mut worker_join_handles = Vec::with_capacity(thread_count);
    for worker_id in 0..thread_count {
      let worker_ctx = WorkerContext {
        worker_id,
        pool_name: pool_name.clone(),
        queue: queue.clone(),
        active_count: active_count.clone(),
        notifier: notifier.clone(),
      };
      let join_handle = thread::Builder::new()
        .name(format!("{}-worker-{}", pool_name, worker_id))
        .spawn(move || run_worker_loop(worker_ctx))
        .expect("failed to spawn pool worker thread");
      worker_join_handles.push(join_handle);
    }

    info!(pool_name = %pool_name, thread_count, "Pool started, all workers spawned.");

    Self {
      pool_name,
      thread_count,
      queue,
      active_count,
      notifier,
      worker_join_handles: Mutex::new(worker_join_handles),
    }
  }

  pub fn name(&self) -> &str {
    &self.pool_name
  }

  /// Returns the number of worker threads the pool was created with.
  pub fn thread_count(&self) -> usize {
    self.thread_count
  }

  /// Returns the number of tasks currently executing on worker threads.
  /// Never exceeds [`ThreadPoolManager::thread_count`].
  pub fn active_task_count(&self) -> usize {
    self.active_count.load(AtomicOrdering::SeqCst)
  }

  /// Returns the current number of tasks in the pending queue.
  pub fn queued_task_count(&self) -> usize {
    self.queue.len()
  }

  /// Registers a handler invoked once per task outcome, on the thread that
  /// produced it. See [`TaskCompletionInfo`] for the event payload.
  pub fn add_completion_handler(&self, handler: impl Fn(TaskCompletionInfo) + Send + Sync + 'static) {
    self.notifier.add_handler(handler);
  }

  /// Submits a closure for execution and returns a handle to its outcome.
  ///
  /// The queue is unbounded, so this never blocks the submitter: the job is
  /// appended in FIFO order and picked up by the next idle worker. `job` runs
  /// behind a panic fence; a panicking job surfaces as
  /// `PoolError::TaskPanicked` on the handle, never as a dead worker.
  ///
  /// # Errors
  /// Returns `PoolError::PoolShuttingDown` if teardown has already begun.
  pub fn submit<F, R>(&self, job: F) -> Result<TaskHandle<R>, PoolError>
  where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
  {
    let task_id = NEXT_POOL_TASK_ID_COUNTER.fetch_add(1, AtomicOrdering::Relaxed);
    let (result_tx, result_rx) = channel::bounded::<Result<R, PoolError>>(1);

    // Erase the job's result type here so the queue and workers stay
    // monomorphic: the closure runs the job, then delivers the typed outcome
    // through its captured sender.
    let erased_job: ErasedJob = Box::new(move || {
      let execution_outcome = match panic::catch_unwind(AssertUnwindSafe(job)) {
        Ok(value) => Ok(value),
        Err(panic_payload) => Err(PoolError::TaskPanicked(panic_message(&*panic_payload))),
      };
      let status = TaskCompletionStatus::from(&execution_outcome);
      if result_tx.send(execution_outcome).is_err() {
        warn!(%task_id, "Result receiver for task was dropped. Task outcome may have been lost.");
      }
      status
    });

    match self.queue.push(TaskCell::new(task_id, erased_job)) {
      Ok(()) => {
        debug!(pool_name = %self.pool_name, %task_id, "Submitted task to queue.");
        Ok(TaskHandle {
          task_id,
          result_receiver: Some(result_rx),
        })
      }
      Err(_rejected_cell) => {
        // Dropping the rejected cell drops the sender, so the (never handed
        // out) receiver would report a broken channel. The caller gets the
        // refusal directly instead.
        warn!(pool_name = %self.pool_name, %task_id, "Submit: Attempted to submit task to a pool that is shutting down.");
        Err(PoolError::PoolShuttingDown)
      }
    }
  }

  /// Tears the pool down: stops dequeuing, joins every worker thread, then
  /// abandons all tasks still in the queue.
  ///
  /// Tasks already running on a worker finish normally and deliver their
  /// outcome. Queued tasks that never started are dropped, which resolves
  /// their handles to `PoolError::ResultChannelBroken` before this call
  /// returns. Idempotent: later calls (and `Drop`) find nothing left to do.
  pub fn shutdown(&self) {
    if self.queue.signal_shutdown() {
      info!(pool_name = %self.pool_name, "Initiating explicit pool shutdown.");
    } else {
      trace!(pool_name = %self.pool_name, "Shutdown already in progress or completed.");
    }

    // Extract the handles while holding the lock, then join with it released
    // so a concurrent shutdown call is never blocked behind the joins.
    let handles_to_join: Vec<JoinHandle<()>> = {
      let mut guard = self.worker_join_handles.lock();
      guard.drain(..).collect()
    };

    if handles_to_join.is_empty() {
      trace!(pool_name = %self.pool_name, "Worker join handles already taken (e.g., by a concurrent shutdown call or Drop).");
      return;
    }

    info!(pool_name = %self.pool_name, "Waiting for {} workers to join.", handles_to_join.len());
    for join_handle in handles_to_join {
      let worker_name = join_handle.thread().name().unwrap_or("<unnamed>").to_string();
      if join_handle.join().is_err() {
        // Job panics are fenced inside the worker loop, so this only fires
        // for a panic in the loop machinery itself.
        error!(pool_name = %self.pool_name, worker_name = %worker_name, "Worker thread panicked outside any task. Teardown continues.");
      }
    }
    debug!(pool_name = %self.pool_name, "All workers joined.");

    let abandoned_cells = self.queue.drain_pending();
    if !abandoned_cells.is_empty() {
      warn!(
        pool_name = %self.pool_name,
        abandoned = abandoned_cells.len(),
        "Abandoning queued tasks that never ran; their handles resolve to a broken result channel."
      );
    }
    for cell in abandoned_cells {
      let task_id = cell.task_id;
      // Dropping the cell drops the job and with it the result sender.
      drop(cell);
      self.notifier.notify(task_id, TaskCompletionStatus::Abandoned);
    }

    info!(pool_name = %self.pool_name, "Pool shutdown process completed by this call.");
  }
}

impl Drop for ThreadPoolManager {
  fn drop(&mut self) {
    if self.worker_join_handles.lock().is_empty() {
      trace!(pool_name = %self.pool_name, "Drop: Shutdown already in progress or completed. No new signals sent.");
      return;
    }

    info!(
      pool_name = %self.pool_name,
      "ThreadPoolManager instance dropped without explicit shutdown. Initiating implicit shutdown."
    );
    self.shutdown();
  }
}
