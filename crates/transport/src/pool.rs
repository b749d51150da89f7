//! Thread-safe pool of fixed-size I/O buffers.
//!
//! Probe reads borrow a buffer from the pool. A probe that captured bytes
//! [detaches](PooledBuffer::detach) its buffer so the bytes can move into the
//! push-back adapter without copying; empty probes simply drop the guard and
//! the buffer returns to the pool. The same pool is handed to the modern
//! protocol connection once negotiation succeeds.

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, PoisonError};

use logging::trace_pool;

/// Number of buffers retained by [`BufferPool::default`].
pub const DEFAULT_POOL_BUFFERS: usize = 1024;
/// Size in bytes of each buffer handed out by [`BufferPool::default`].
pub const DEFAULT_POOL_BUFFER_SIZE: usize = 1024;

/// Stack of reusable buffers.
///
/// The pool retains at most `max_buffers` idle buffers; returning a buffer to
/// a full pool drops it, and acquiring from an empty pool allocates.
#[derive(Debug)]
pub struct BufferPool {
    buffers: Mutex<Vec<Vec<u8>>>,
    max_buffers: usize,
    buffer_size: usize,
}

impl BufferPool {
    /// Creates a pool retaining up to `max_buffers` buffers of `buffer_size` bytes.
    #[must_use]
    pub fn new(max_buffers: usize, buffer_size: usize) -> Self {
        Self {
            buffers: Mutex::new(Vec::new()),
            max_buffers,
            buffer_size,
        }
    }

    /// Acquires a zeroed buffer, reusing an idle one when available.
    #[must_use]
    pub fn acquire(pool: &Arc<Self>) -> PooledBuffer {
        let reused = pool.lock().pop();
        let buffer = reused.unwrap_or_else(|| {
            trace_pool!("allocating a fresh {} byte buffer", pool.buffer_size);
            vec![0u8; pool.buffer_size]
        });

        PooledBuffer {
            buffer,
            pool: Arc::clone(pool),
        }
    }

    /// Number of idle buffers currently held.
    #[must_use]
    pub fn available(&self) -> usize {
        self.lock().len()
    }

    /// Maximum number of idle buffers retained.
    #[must_use]
    pub const fn max_buffers(&self) -> usize {
        self.max_buffers
    }

    /// Size of each buffer in bytes.
    #[must_use]
    pub const fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn release(&self, mut buffer: Vec<u8>) {
        buffer.clear();
        buffer.resize(self.buffer_size, 0);

        let mut idle = self.lock();
        if idle.len() < self.max_buffers {
            idle.push(buffer);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Vec<u8>>> {
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_BUFFERS, DEFAULT_POOL_BUFFER_SIZE)
    }
}

/// RAII guard that returns its buffer to the pool on drop.
#[derive(Debug)]
pub struct PooledBuffer {
    buffer: Vec<u8>,
    pool: Arc<BufferPool>,
}

impl PooledBuffer {
    /// Takes ownership of the first `len` bytes, keeping the allocation out
    /// of the pool.
    #[must_use]
    pub fn detach(mut self, len: usize) -> Vec<u8> {
        let mut buffer = std::mem::take(&mut self.buffer);
        buffer.truncate(len);
        trace_pool!("detached {} byte buffer from pool", buffer.len());
        buffer
    }
}

impl Deref for PooledBuffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.buffer
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        // A detached guard holds an unallocated placeholder.
        if self.buffer.capacity() > 0 {
            self.pool.release(std::mem::take(&mut self.buffer));
        }
    }
}
