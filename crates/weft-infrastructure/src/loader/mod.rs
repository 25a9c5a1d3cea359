//! Entry loading: chunk planning, retry, and concurrent reconstruction.

mod concurrent;
pub mod planner;
pub mod retry;

pub use concurrent::ConcurrentLoader;
pub use planner::{DEFAULT_CHUNK_THRESHOLD, LARGE_CHUNK_SIZE, SMALL_CHUNK_SIZE, plan};
pub use retry::{Backoff, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY, RetryExhausted, RetryPolicy};
