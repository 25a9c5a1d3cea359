//! Partitioning of archive entries into load chunks.
//!
//! Small archives fan out completely (one entry per chunk); large ones are
//! batched three entries at a time to bound the number of scheduled tasks.

/// Entry count at which chunks switch from single entries to batches.
pub const DEFAULT_CHUNK_THRESHOLD: usize = 100;

/// Chunk size used below the threshold.
pub const SMALL_CHUNK_SIZE: usize = 1;

/// Chunk size used at or above the threshold.
pub const LARGE_CHUNK_SIZE: usize = 3;

pub fn chunk_size_for(len: usize, threshold: usize) -> usize {
    if len < threshold {
        SMALL_CHUNK_SIZE
    } else {
        LARGE_CHUNK_SIZE
    }
}

/// Splits `entries` into contiguous, order-preserving chunks that cover the
/// input exactly once.
pub fn plan<T>(entries: Vec<T>, threshold: usize) -> Vec<Vec<T>> {
    let size = chunk_size_for(entries.len(), threshold);
    let mut chunks = Vec::with_capacity(entries.len().div_ceil(size));
    let mut current = Vec::with_capacity(size);

    for entry in entries {
        current.push(entry);
        if current.len() == size {
            chunks.push(std::mem::replace(&mut current, Vec::with_capacity(size)));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
