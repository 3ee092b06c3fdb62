use threads_orchestra::{TaskHandle, ThreadPoolManager};

use std::thread;
use std::time::Duration;

use tracing::info;

fn work_task_fn(id: usize, duration_s: u64) -> String {
  info!("Task {} starting (will run for {}s)", id, duration_s);
  thread::sleep(Duration::from_secs(duration_s));
  let result = format!("Task {} finished after {}s", id, duration_s);
  info!("{}", result);
  result
}

fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::DEBUG)
    .with_target(false)
    .init();
  info!("--- Graceful Shutdown Example ---");

  let manager = ThreadPoolManager::new(
    2, // Worker threads
    "graceful_shutdown_pool",
  );

  let mut handles: Vec<TaskHandle<String>> = Vec::new();

  // Submit 5 tasks, each takes 2 seconds.
  // With 2 workers:
  // Tasks 0, 1 start.
  // Tasks 2, 3, 4 are queued.
  for i in 0..5 {
    match manager.submit(move || work_task_fn(i, 2)) {
      Ok(handle) => {
        info!("Submitted task {} (handle id {})", i, handle.id());
        handles.push(handle);
      }
      Err(e) => tracing::error!("Failed to submit task {}: {:?}", i, e),
    }
  }

  info!(
    "All 5 tasks submitted. Queue size: {}, Active: {}",
    manager.queued_task_count(),
    manager.active_task_count()
  );
  info!("Initiating shutdown shortly...");
  thread::sleep(Duration::from_millis(100)); // Let the first two tasks start

  info!("Calling pool.shutdown()...");
  manager.shutdown();
  info!("Pool shutdown call completed.");

  // Try submitting another task after shutdown (should fail)
  info!("Attempting to submit task after shutdown...");
  match manager.submit(|| work_task_fn(99, 1)) {
    Ok(_) => tracing::error!("LATE SUBMISSION SUCCEEDED (UNEXPECTED!)"),
    Err(e) => info!("Late submission correctly failed: {:?}", e),
  }

  info!("Collecting results for initially submitted tasks...");
  // Expected: Tasks 0, 1 complete. Tasks 2, 3, 4 (queued) were abandoned and
  // their handles report a broken result channel.
  for handle in handles {
    let task_id = handle.id();
    match handle.wait_result() {
      Ok(result) => info!("Task {} result: {}", task_id, result),
      Err(e) => info!("Task {} error (expected for queued tasks): {:?}", task_id, e),
    }
  }

  info!("--- Graceful Shutdown Example End ---");
}
