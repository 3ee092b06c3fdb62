//! A thread-backed pool for executing blocking closures with FIFO queuing,
//! per-task result handles, completion notifications, and graceful shutdown.

mod error;
mod handle;
mod manager;
mod notifier;
mod queue;
mod task;
mod worker;

pub use error::PoolError;
pub use handle::TaskHandle;
pub use manager::ThreadPoolManager;
pub use notifier::{TaskCompletionInfo, TaskCompletionStatus};
