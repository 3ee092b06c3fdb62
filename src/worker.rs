use crate::notifier::CompletionNotifier;
use crate::queue::TaskQueue;

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{debug, error, info_span, trace};

/// Everything one worker thread needs from the pool that spawned it.
pub(crate) struct WorkerContext {
  pub(crate) worker_id: usize,
  pub(crate) pool_name: Arc<String>,
  pub(crate) queue: Arc<TaskQueue>,
  pub(crate) active_count: Arc<AtomicUsize>,
  pub(crate) notifier: Arc<CompletionNotifier>,
}

/// The cycle run by each pool thread: block until a task or the shutdown
/// signal arrives, execute strictly outside the queue lock, dispatch the
/// completion notification, repeat.
pub(crate) fn run_worker_loop(ctx: WorkerContext) {
  let _loop_span =
    info_span!("pool_worker", pool_name = %*ctx.pool_name, worker_id = ctx.worker_id).entered();
  debug!("Worker started.");

  while let Some(cell) = ctx.queue.next_task() {
    let task_id = cell.task_id;
    let task_span = info_span!("pooled_task", %task_id);
    let _task_guard = task_span.enter();
    debug!("Dequeued task. Executing.");

    ctx.active_count.fetch_add(1, Ordering::SeqCst);
    let execution = panic::catch_unwind(AssertUnwindSafe(|| cell.execute()));
    ctx.active_count.fetch_sub(1, Ordering::SeqCst);

    match execution {
      Ok(status) => {
        trace!(?status, "Task finished processing.");
        ctx.notifier.notify(task_id, status);
      }
      Err(_) => {
        // The cell carries its own panic fence for the job itself; reaching
        // this arm means outcome delivery blew up, not the job.
        error!("Task executor panicked outside the job fence; outcome may be lost.");
      }
    }
  }

  debug!("Shutdown observed. Worker terminating.");
}
