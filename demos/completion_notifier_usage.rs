use threads_orchestra::{TaskCompletionInfo, TaskCompletionStatus, TaskHandle, ThreadPoolManager};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::info;

// Dummy task function
fn my_notified_task(id: usize, delay_ms: u64, should_panic: bool) -> String {
  info!(
    "NotifiedTask {}: Starting, will sleep for {}ms. Panic: {}",
    id, delay_ms, should_panic
  );
  thread::sleep(Duration::from_millis(delay_ms));
  if should_panic {
    info!("NotifiedTask {}: Panicking as requested!", id);
    panic!("NotifiedTask {} panicked!", id);
  }
  let result = format!("NotifiedTask {} finished successfully after {}ms", id, delay_ms);
  info!("{}", result);
  result
}

fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::INFO) // INFO or DEBUG for example
    .with_target(false)
    .init();

  info!("--- Completion Notifier Example ---");

  let pool_name = "notifier_example_pool";
  let manager = ThreadPoolManager::new(
    2, // Worker threads
    pool_name,
  );

  // --- Setup Completion Handlers ---
  let successful_tasks_count = Arc::new(AtomicUsize::new(0));
  let failed_tasks_count = Arc::new(AtomicUsize::new(0)); // Panicked or Abandoned

  // Handler 1: Simple logger
  manager.add_completion_handler({
    let pool_name_clone = manager.name().to_string();
    move |info: TaskCompletionInfo| {
      assert_eq!(*info.pool_name, pool_name_clone);
      info!(
        "[Handler 1 - Logger] Task {} (Pool: {}) completed. Status: {:?}, Time: {:?}",
        info.task_id, info.pool_name, info.status, info.completion_time
      );
    }
  });

  // Handler 2: Counter
  let s_clone = successful_tasks_count.clone();
  let f_clone = failed_tasks_count.clone();
  manager.add_completion_handler(move |info: TaskCompletionInfo| match info.status {
    TaskCompletionStatus::Success => {
      s_clone.fetch_add(1, Ordering::Relaxed);
      info!("[Handler 2 - Counter] Task {} succeeded.", info.task_id);
    }
    _ => {
      f_clone.fetch_add(1, Ordering::Relaxed);
      info!(
        "[Handler 2 - Counter] Task {} did not succeed (Status: {:?}).",
        info.task_id, info.status
      );
    }
  });

  // --- Submit Tasks ---
  let mut handles: Vec<TaskHandle<String>> = Vec::new();

  // Task 1: Success
  if let Ok(h) = manager.submit(|| my_notified_task(1, 300, false)) {
    handles.push(h);
  }

  // Task 2: Panic
  if let Ok(h) = manager.submit(|| my_notified_task(2, 100, true)) {
    handles.push(h);
  }

  // Task 3: Success (longer)
  if let Ok(h) = manager.submit(|| my_notified_task(3, 600, false)) {
    handles.push(h);
  }

  // Task 4: Will sit in the queue behind the others and be abandoned when
  // the pool shuts down before the workers get to it.
  if let Ok(h) = manager.submit(|| my_notified_task(4, 2000, false)) {
    handles.push(h);
  }

  info!("All tasks submitted. Some will run, the last one will be abandoned.");
  thread::sleep(Duration::from_millis(150)); // Let some tasks start/progress

  info!("Shutting down pool with a task still queued...");
  manager.shutdown();
  info!("Pool shutdown complete.");

  // --- Collect Task Results ---
  info!("Collecting all task results from handles...");
  for handle in handles {
    // This loop consumes each handle
    let task_id = handle.id();
    match handle.wait_result() {
      Ok(result) => info!("Main: Result for task {}: {}", task_id, result),
      Err(e) => info!("Main: Error for task {}: {:?}", task_id, e),
    }
  }

  // --- Summary ---
  info!("--- Summary from Completion Notifier ---");
  info!(
    "Successful tasks (counted by handler): {}",
    successful_tasks_count.load(Ordering::Relaxed)
  );
  info!(
    "Non-successful tasks (counted by handler): {}",
    failed_tasks_count.load(Ordering::Relaxed)
  );
  info!("--- Completion Notifier Example End ---");
}
