use threads_orchestra::{TaskHandle, ThreadPoolManager};

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::info;

fn main() {
  tracing_subscriber::fmt()
    .with_max_level(tracing::Level::INFO)
    .with_target(false)
    .init();

  info!("--- Parallel Sum Example ---");

  const NUM_TASKS: u64 = 60_000;

  let manager = ThreadPoolManager::new(
    4, // Worker threads
    "parallel_sum_pool",
  );

  let counter = Arc::new(AtomicU64::new(0));
  let started = Instant::now();

  let mut handles: Vec<TaskHandle<u64>> = Vec::with_capacity(NUM_TASKS as usize);
  for i in 0..NUM_TASKS {
    let counter = counter.clone();
    let handle = manager
      .submit(move || {
        counter.fetch_add(i, Ordering::SeqCst);
        i
      })
      .expect("Failed to submit task");
    handles.push(handle);
  }

  info!("Submitted {} tasks in {:?}. Waiting for results...", NUM_TASKS, started.elapsed());

  // Every handle carries its own task's value.
  let mut returned_sum: u64 = 0;
  for handle in handles {
    returned_sum += handle.wait_result().expect("Task failed");
  }

  let expected_sum: u64 = (0..NUM_TASKS).sum();
  let counted_sum = counter.load(Ordering::SeqCst);

  info!("All tasks finished in {:?}.", started.elapsed());
  info!("Shared counter: {} (expected {})", counted_sum, expected_sum);
  info!("Sum of returned values: {} (expected {})", returned_sum, expected_sum);
  assert_eq!(counted_sum, expected_sum);
  assert_eq!(returned_sum, expected_sum);

  manager.shutdown();
  info!("--- Parallel Sum Example End ---");
}
