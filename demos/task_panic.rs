use threads_orchestra::{PoolError, ThreadPoolManager};

use std::thread;
use std::time::Duration;

use tracing::info;

fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::DEBUG)
    .with_target(false)
    .init();
  info!("--- Task Panic Example ---");

  let manager = ThreadPoolManager::new(
    1, // Worker threads
    "panic_pool",
  );

  let handle = manager
    .submit(|| -> String {
      info!("Panicking Task: Starting...");
      thread::sleep(Duration::from_millis(100));
      info!("Panicking Task: About to panic!");
      panic!("This task is designed to panic!");
    })
    .expect("Failed to submit panicking task");

  let task_id = handle.id(); // Get the ID before handle is consumed
  info!("Panicking task {} submitted. Waiting for result...", task_id);

  match handle.wait_result() {
    // handle is consumed here
    Ok(result) => info!("Task {} completed with UNEXPECTED result: {}", task_id, result),
    Err(PoolError::TaskPanicked(cause)) => {
      info!("Task {} correctly resulted in PoolError::TaskPanicked: {}", task_id, cause);
    }
    Err(e) => info!("Task {} resulted in unexpected error: {:?}", task_id, e),
  }

  // The worker that ran the panicking task is still alive and usable.
  let followup = manager.submit(|| "still alive".to_string()).expect("Failed to submit follow-up task");
  info!("Follow-up task result: {:?}", followup.wait_result());

  info!("Shutting down pool.");
  manager.shutdown();
  info!("Pool shutdown complete.");
  info!("--- Task Panic Example End ---");
}
