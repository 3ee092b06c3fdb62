use crate::task::TaskCell;

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};
use tracing::trace;

/// Queue contents and the shutdown flag. Always read and mutated together,
/// under the one mutex in `TaskQueue`.
struct QueueState {
  pending: VecDeque<TaskCell>,
  shutting_down: bool,
}

/// The FIFO that hands task cells from submitters to worker threads.
///
/// A single mutex guards both the deque and the shutdown flag, and a single
/// condvar wakes workers. Submission never blocks: the deque is unbounded and
/// `push` only ever holds the lock long enough to append.
pub(crate) struct TaskQueue {
  state: Mutex<QueueState>,
  task_available: Condvar,
}

impl TaskQueue {
  pub(crate) fn new() -> Self {
    Self {
      state: Mutex::new(QueueState {
        pending: VecDeque::new(),
        shutting_down: false,
      }),
      task_available: Condvar::new(),
    }
  }

  /// Appends a cell to the tail of the queue and wakes one waiting worker.
  ///
  /// Once shutdown has been signaled the cell is handed back untouched so the
  /// caller can refuse the submission.
  pub(crate) fn push(&self, cell: TaskCell) -> Result<(), TaskCell> {
    {
      let mut state = self.state.lock();
      if state.shutting_down {
        return Err(cell);
      }
      state.pending.push_back(cell);
    }
    // Notify after releasing the lock so the woken worker can take it at once.
    self.task_available.notify_one();
    Ok(())
  }

  /// Blocks until a task is available or shutdown is signaled, whichever the
  /// worker observes first.
  ///
  /// Returns `None` once the shutdown flag is set, even if cells are still
  /// pending: leftover cells are for the teardown drain, not for workers. The
  /// wait loops on the predicate, so spurious condvar wakeups are harmless.
  pub(crate) fn next_task(&self) -> Option<TaskCell> {
    let mut state = self.state.lock();
    loop {
      if state.shutting_down {
        return None;
      }
      if let Some(cell) = state.pending.pop_front() {
        return Some(cell);
      }
      self.task_available.wait(&mut state);
    }
  }

  /// Sets the shutdown flag and wakes every waiting worker.
  ///
  /// Broadcast, not single-notify: all blocked workers must observe
  /// termination. Returns `true` if this call was the one that set the flag.
  pub(crate) fn signal_shutdown(&self) -> bool {
    let newly_signaled = {
      let mut state = self.state.lock();
      let newly_signaled = !state.shutting_down;
      state.shutting_down = true;
      newly_signaled
    };
    self.task_available.notify_all();
    newly_signaled
  }

  /// Removes and returns every still-pending cell.
  ///
  /// Called by teardown after the workers have been joined. Dropping the
  /// returned cells is what breaks their result channels.
  pub(crate) fn drain_pending(&self) -> Vec<TaskCell> {
    let mut state = self.state.lock();
    let drained: Vec<TaskCell> = state.pending.drain(..).collect();
    if !drained.is_empty() {
      trace!("Drained {} pending task cells from the queue.", drained.len());
    }
    drained
  }

  /// Returns the number of cells currently waiting in the queue.
  pub(crate) fn len(&self) -> usize {
    self.state.lock().pending.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::notifier::TaskCompletionStatus;

  use std::sync::Arc;
  use std::thread;
  use std::time::Duration;

  // Helper to create a dummy TaskCell for testing the queue.
  fn dummy_cell(id: u64) -> TaskCell {
    TaskCell::new(id, Box::new(|| TaskCompletionStatus::Success))
  }

  #[test]
  fn test_queue_preserves_fifo_order() {
    let queue = TaskQueue::new();
    queue.push(dummy_cell(1)).unwrap();
    queue.push(dummy_cell(2)).unwrap();
    queue.push(dummy_cell(3)).unwrap();
    assert_eq!(queue.len(), 3);

    assert_eq!(queue.next_task().unwrap().task_id, 1);
    assert_eq!(queue.next_task().unwrap().task_id, 2);
    assert_eq!(queue.next_task().unwrap().task_id, 3);
    assert_eq!(queue.len(), 0);
  }

  #[test]
  fn test_push_after_shutdown_is_rejected() {
    let queue = TaskQueue::new();
    assert!(queue.signal_shutdown());

    let rejected = queue.push(dummy_cell(7));
    match rejected {
      Err(cell) => assert_eq!(cell.task_id, 7),
      Ok(()) => panic!("Push should be refused once shutdown is signaled."),
    }
    assert_eq!(queue.len(), 0);
  }

  #[test]
  fn test_shutdown_flag_wins_over_pending_cells() {
    let queue = TaskQueue::new();
    queue.push(dummy_cell(1)).unwrap();
    queue.push(dummy_cell(2)).unwrap();
    queue.signal_shutdown();

    // Workers stop dequeuing as soon as the flag is set; the leftovers go to
    // the teardown drain instead.
    assert!(queue.next_task().is_none());
    assert_eq!(queue.drain_pending().len(), 2);
    assert_eq!(queue.len(), 0);
  }

  #[test]
  fn test_signal_shutdown_reports_first_call_only() {
    let queue = TaskQueue::new();
    assert!(queue.signal_shutdown());
    assert!(!queue.signal_shutdown());
  }

  #[test]
  fn test_next_task_blocks_until_push() {
    let queue = Arc::new(TaskQueue::new());

    let waiter = {
      let queue = queue.clone();
      thread::spawn(move || queue.next_task())
    };

    thread::sleep(Duration::from_millis(50));
    queue.push(dummy_cell(42)).unwrap();

    let dequeued = waiter.join().unwrap();
    assert_eq!(dequeued.unwrap().task_id, 42);
  }

  #[test]
  fn test_shutdown_broadcast_wakes_all_blocked_waiters() {
    let queue = Arc::new(TaskQueue::new());

    let waiters: Vec<_> = (0..3)
      .map(|_| {
        let queue = queue.clone();
        thread::spawn(move || queue.next_task())
      })
      .collect();

    // Give the waiters time to block on the condvar before signaling.
    thread::sleep(Duration::from_millis(50));
    queue.signal_shutdown();

    for waiter in waiters {
      assert!(waiter.join().unwrap().is_none());
    }
  }
}
