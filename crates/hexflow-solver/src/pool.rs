//! Scratch buffer pool.
//!
//! Corner-force and gradient scratch arrays are sized by the mesh and
//! needed every cycle. The pool hands them out zeroed and takes them
//! back when the guard drops, so a run allocates them once.

use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

/// Thread-safe pool of reusable `Vec<T>` buffers.
///
/// # Example
///
/// ```
/// use hexflow_solver::pool::BufferPool;
///
/// let pool: BufferPool<f64> = BufferPool::new(4);
/// {
///     let mut buffer = pool.acquire(100);
///     buffer[0] = 1.0;
/// }
/// assert_eq!(pool.available(), 1);
/// assert_eq!(pool.acquire(100)[0], 0.0);
/// ```
#[derive(Debug)]
pub struct BufferPool<T: Clone + Default + Send> {
    buffers: Mutex<Vec<Vec<T>>>,
    max_pool_size: usize,
}

impl<T: Clone + Default + Send> BufferPool<T> {
    /// Creates a pool that keeps at most `max_pool_size` idle buffers.
    pub fn new(max_pool_size: usize) -> Self {
        Self {
            buffers: Mutex::new(Vec::with_capacity(max_pool_size.min(8))),
            max_pool_size,
        }
    }

    /// Takes a buffer of `len` default values, reusing an idle one if any.
    pub fn acquire(&self, len: usize) -> PooledBuffer<'_, T> {
        let mut buffer = self.buffers.lock().pop().unwrap_or_default();
        buffer.clear();
        buffer.resize(len, T::default());
        PooledBuffer { buffer, pool: self }
    }

    fn release(&self, buffer: Vec<T>) {
        let mut pool = self.buffers.lock();
        if pool.len() < self.max_pool_size {
            pool.push(buffer);
        }
    }

    /// Number of idle buffers.
    pub fn available(&self) -> usize {
        self.buffers.lock().len()
    }
}

impl<T: Clone + Default + Send> Default for BufferPool<T> {
    fn default() -> Self {
        Self::new(4)
    }
}

/// Buffer on loan from a [`BufferPool`]; returned on drop.
pub struct PooledBuffer<'a, T: Clone + Default + Send> {
    buffer: Vec<T>,
    pool: &'a BufferPool<T>,
}

impl<T: Clone + Default + Send> Deref for PooledBuffer<'_, T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.buffer
    }
}

impl<T: Clone + Default + Send> DerefMut for PooledBuffer<'_, T> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.buffer
    }
}

impl<T: Clone + Default + Send> Drop for PooledBuffer<'_, T> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buffer));
    }
}
