use thiserror::Error;

/// Errors that can occur within the `threads_orchestra` pool.
#[derive(Error, Debug, PartialEq)]
pub enum PoolError {
  #[error("Submitted task panicked during execution: {0}")]
  TaskPanicked(String),

  #[error("Task result channel broken: the pool was torn down before the task produced an outcome")]
  ResultChannelBroken,

  #[error("Task result already taken or channel was not available")]
  ResultUnavailable,

  #[error("Timed out waiting for the task result")]
  WaitTimeout,

  #[error("Pool is shutting down or already shut down, cannot accept new tasks")]
  PoolShuttingDown,
}
