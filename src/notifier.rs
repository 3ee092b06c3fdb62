use crate::error::PoolError;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;
use tracing::{debug, error, info, trace};

// --- Public Event Structs for Handlers ---

/// How a task left the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskCompletionStatus {
  /// The job ran to completion and its value was delivered to the handle.
  Success,
  /// The job panicked; the captured cause was delivered instead of a value.
  Panicked,
  /// The pool was torn down before the job ever ran.
  Abandoned,
  /// The converted outcome carried a pool error that says nothing about the
  /// job itself, such as a timed-out wait. Never dispatched by the pool.
  PoolErrorOccurred,
}

/// Maps a delivered outcome to its status. A broken result channel means the
/// job was abandoned before running; errors that only describe the wait fall
/// through to [`TaskCompletionStatus::PoolErrorOccurred`].
impl<R> From<&Result<R, PoolError>> for TaskCompletionStatus {
  fn from(result: &Result<R, PoolError>) -> Self {
    match result {
      Ok(_) => TaskCompletionStatus::Success,
      Err(PoolError::TaskPanicked(_)) => TaskCompletionStatus::Panicked,
      Err(PoolError::ResultChannelBroken) => TaskCompletionStatus::Abandoned,
      Err(_) => TaskCompletionStatus::PoolErrorOccurred,
    }
  }
}

/// Event payload handed to completion handlers, one per finished or
/// abandoned task.
#[derive(Debug, Clone)]
pub struct TaskCompletionInfo {
  pub task_id: u64,
  pub pool_name: Arc<String>,
  pub status: TaskCompletionStatus,
  pub completion_time: SystemTime,
}

// --- CompletionNotifier Struct ---

type CompletionHandler = Arc<dyn Fn(TaskCompletionInfo) + Send + Sync + 'static>;

/// Registry of completion handlers, dispatched inline by whichever thread
/// finishes a task (a worker) or abandons it (the teardown caller).
pub(crate) struct CompletionNotifier {
  pool_name: Arc<String>,
  handlers: RwLock<Vec<CompletionHandler>>,
}

impl fmt::Debug for CompletionNotifier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let handler_count = self.handlers.try_read().map_or(0, |guard| guard.len());

    f.debug_struct("CompletionNotifier")
      .field("pool_name", &self.pool_name)
      .field("handler_count", &handler_count)
      .finish()
  }
}

impl CompletionNotifier {
  pub(crate) fn new(pool_name: Arc<String>) -> Self {
    Self {
      pool_name,
      handlers: RwLock::new(Vec::new()),
    }
  }

  pub(crate) fn add_handler(&self, handler: impl Fn(TaskCompletionInfo) + Send + Sync + 'static) {
    let mut handlers_guard = self.handlers.write();
    handlers_guard.push(Arc::new(handler));
    info!(pool_name = %*self.pool_name, "Notifier: Added new completion handler. Total handlers: {}", handlers_guard.len());
  }

  /// Dispatches one completion event to every registered handler, in
  /// registration order, on the calling thread.
  ///
  /// A panicking handler is contained and logged; it never unwinds into the
  /// worker loop or teardown, and later handlers still run.
  pub(crate) fn notify(&self, task_id: u64, status: TaskCompletionStatus) {
    // Snapshot the registry so a handler may itself register further
    // handlers without deadlocking on the write lock.
    let handlers: Vec<CompletionHandler> = self.handlers.read().iter().cloned().collect();
    if handlers.is_empty() {
      trace!(%task_id, "No completion handlers registered, dropping notification.");
      return;
    }

    let public_info = TaskCompletionInfo {
      task_id,
      pool_name: self.pool_name.clone(),
      status,
      completion_time: SystemTime::now(),
    };

    debug!(
      task_id = %public_info.task_id,
      "Dispatching notification to {} handlers.",
      handlers.len()
    );

    for handler in handlers.iter() {
      let result = panic::catch_unwind(AssertUnwindSafe(|| {
        handler(public_info.clone());
      }));
      if result.is_err() {
        error!(
          "A completion handler panicked during execution. Pool: {}, Task ID: {}",
          public_info.pool_name, public_info.task_id
        );
      }
    }
  }
}
