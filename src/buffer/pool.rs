//! Thread-local pool of read buffers.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};

/// Size of every read buffer.
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Maximum number of buffers kept per thread.
pub const MAX_POOL_SIZE: usize = 4;

/// A fixed-size scratch buffer for `Read::read` calls.
///
/// Derefs to a `READ_BUFFER_SIZE` byte slice. The contents are whatever the
/// last reader left behind; callers only look at the bytes a read reported.
pub(crate) struct ReadBuffer {
    data: Vec<u8>,
}

impl ReadBuffer {
    /// Takes a buffer from the thread-local pool or allocates a new one.
    pub(crate) fn take() -> Self {
        let data = THREAD_BUFFER_POOL
            .with(|pool| pool.borrow_mut().pop())
            .unwrap_or_else(|| vec![0u8; READ_BUFFER_SIZE]);
        Self { data }
    }
}

impl Deref for ReadBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl DerefMut for ReadBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Drop for ReadBuffer {
    fn drop(&mut self) {
        let data = std::mem::take(&mut self.data);
        if data.len() != READ_BUFFER_SIZE {
            return;
        }
        // try_with: the pool may already be gone during thread teardown
        let _ = THREAD_BUFFER_POOL.try_with(|pool| {
            let mut pool = pool.borrow_mut();
            if pool.len() < MAX_POOL_SIZE {
                pool.push(data);
            }
        });
    }
}

thread_local! {
    static THREAD_BUFFER_POOL: RefCell<Vec<Vec<u8>>> = const { RefCell::new(Vec::new()) };
}
