use threads_orchestra::{TaskHandle, ThreadPoolManager};

use std::thread;
use std::time::Duration;

use tracing::info;

fn my_task_fn(id: usize, delay_ms: u64) -> String {
  info!("Task {} starting, will sleep for {}ms", id, delay_ms);
  thread::sleep(Duration::from_millis(delay_ms));
  let result = format!("Task {} finished successfully after {}ms", id, delay_ms);
  info!("{}", result);
  result
}

fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::DEBUG)
    .with_target(false) // Disable module paths for cleaner example output
    .init();

  info!("--- Basic Usage Example ---");

  let pool_name = "basic_pool";
  let manager = ThreadPoolManager::new(
    2, // Worker threads
    pool_name,
  );

  let mut handles: Vec<TaskHandle<String>> = Vec::new();

  for i in 0..5 {
    let task_id: usize = i;
    // Alternate sleep times for variety
    let sleep_duration: u64 = 500 + (i as u64 % 3 * 250);
    match manager.submit(move || my_task_fn(task_id, sleep_duration)) {
      Ok(handle) => {
        info!("Submitted task {} with handle id {}", task_id, handle.id());
        handles.push(handle);
      }
      Err(e) => {
        tracing::error!("Failed to submit task {}: {:?}", task_id, e);
      }
    }
  }

  info!("All tasks submitted. Waiting for results...");

  for handle in handles {
    let task_id = handle.id();
    match handle.wait_result() {
      Ok(result) => info!("Result for task {}: {}", task_id, result),
      Err(e) => info!("Error for task {}: {:?}", task_id, e),
    }
  }

  info!("All task results processed. Shutting down pool.");
  manager.shutdown();
  info!("Pool shutdown complete.");
  info!("--- Basic Usage Example End ---");
}
