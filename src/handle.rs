use crate::error::PoolError;

use std::time::Duration;

use crossbeam::channel::{Receiver, RecvTimeoutError};
use tracing;

/// A handle to a task submitted to the `ThreadPoolManager`.
///
/// Allows waiting for the task's outcome, with or without a deadline. The
/// outcome is delivered exactly once: `wait_result` consumes the handle, and
/// once a `wait_result_timeout` call has returned it, later calls report
/// `PoolError::ResultUnavailable`.
#[derive(Debug)]
pub struct TaskHandle<R: Send + 'static> {
  pub(crate) task_id: u64,
  pub(crate) result_receiver: Option<Receiver<Result<R, PoolError>>>,
}

impl<R: Send + 'static> TaskHandle<R> {
  /// Returns the unique ID of this task.
  pub fn id(&self) -> u64 {
    self.task_id
  }

  /// Blocks the calling thread until the task's outcome is available, then
  /// returns it.
  ///
  /// # Errors
  /// Returns `PoolError::TaskPanicked` if the task panicked during execution.
  /// Returns `PoolError::ResultChannelBroken` if the pool was torn down before
  /// the task ever ran.
  /// Returns `PoolError::ResultUnavailable` if the outcome was already taken
  /// by an earlier `wait_result_timeout` call.
  pub fn wait_result(mut self) -> Result<R, PoolError> {
    match self.result_receiver.take() {
      Some(rx) => {
        match rx.recv() {
          Ok(task_outcome_result) => task_outcome_result, // This is already Result<R, PoolError>
          Err(recv_error) => {
            // The producer side was dropped without sending a value: the pool
            // was torn down while this task still sat in the queue.
            tracing::warn!(task_id = %self.task_id, "Result channel receive error: {}", recv_error);
            Err(PoolError::ResultChannelBroken)
          }
        }
      }
      None => Err(PoolError::ResultUnavailable),
    }
  }

  /// Waits for the task's outcome for at most `timeout`.
  ///
  /// On `PoolError::WaitTimeout` the handle remains usable and the call may
  /// simply be retried. Any other return, success or failure, consumes the
  /// handle's single outcome.
  pub fn wait_result_timeout(&mut self, timeout: Duration) -> Result<R, PoolError> {
    let rx = match self.result_receiver.as_ref() {
      Some(rx) => rx,
      None => return Err(PoolError::ResultUnavailable),
    };

    match rx.recv_timeout(timeout) {
      Ok(task_outcome_result) => {
        self.result_receiver = None;
        task_outcome_result
      }
      Err(RecvTimeoutError::Timeout) => Err(PoolError::WaitTimeout),
      Err(RecvTimeoutError::Disconnected) => {
        self.result_receiver = None;
        tracing::warn!(task_id = %self.task_id, "Result channel broken while waiting with a deadline.");
        Err(PoolError::ResultChannelBroken)
      }
    }
  }
}
