use crate::notifier::TaskCompletionStatus;

use std::any::Any;
use std::fmt;

/// The type of job the pool's workers execute: a closure already wired to
/// the task's one-shot outcome channel, reporting how the task ended.
pub(crate) type ErasedJob = Box<dyn FnOnce() -> TaskCompletionStatus + Send + 'static>;

/// Internal representation of a task queued in the pool.
///
/// The erased job owns the producer side of the task's result channel, so a
/// cell dropped before running is exactly what makes the paired handle
/// observe a broken channel.
pub(crate) struct TaskCell {
  pub(crate) task_id: u64,
  job: ErasedJob,
}

impl TaskCell {
  pub(crate) fn new(task_id: u64, job: ErasedJob) -> Self {
    Self { task_id, job }
  }

  /// Runs the wrapped job to completion. Outcome delivery happens inside the
  /// erased closure; this only reports how the task ended.
  pub(crate) fn execute(self) -> TaskCompletionStatus {
    (self.job)()
  }
}

impl fmt::Debug for TaskCell {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TaskCell")
      .field("task_id", &self.task_id)
      .finish_non_exhaustive()
  }
}

/// Renders a panic payload into the displayable cause carried by
/// `PoolError::TaskPanicked`.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
  if let Some(message) = payload.downcast_ref::<&str>() {
    (*message).to_string()
  } else if let Some(message) = payload.downcast_ref::<String>() {
    message.clone()
  } else {
    "opaque panic payload".to_string()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn panic_message_extracts_str_and_string_payloads() {
    let static_payload: Box<dyn Any + Send> = Box::new("boom");
    assert_eq!(panic_message(&*static_payload), "boom");

    let owned_payload: Box<dyn Any + Send> = Box::new(String::from("formatted cause 42"));
    assert_eq!(panic_message(&*owned_payload), "formatted cause 42");

    let opaque_payload: Box<dyn Any + Send> = Box::new(42_u32);
    assert_eq!(panic_message(&*opaque_payload), "opaque panic payload");
  }
}
