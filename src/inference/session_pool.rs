//! Session pool for concurrent model inference.
//!
//! Provides [`SessionPool`] for holding several model instances that can serve
//! inference requests concurrently. A pool of size one serialises inference.

use parking_lot::{Mutex, MutexGuard};

use crate::inference::InferenceError;

/// Acquires a lock from the pool using try_lock round-robin,
/// falling back to blocking on slot 0 if all are contended.
fn acquire<T>(pool: &[Mutex<T>]) -> MutexGuard<'_, T> {
    for m in pool.iter() {
        if let Some(guard) = m.try_lock() {
            return guard;
        }
    }
    pool[0].lock()
}

/// A pool of N identical model instances.
///
/// Each instance is behind its own [`Mutex`], allowing up to N concurrent
/// inference calls. The pool distributes access via try_lock round-robin.
pub struct SessionPool<T> {
    instances: Vec<Mutex<T>>,
}

impl<T> SessionPool<T> {
    /// Creates a pool of `pool_size` instances (at least one).
    pub fn new<F>(pool_size: usize, init: F) -> Result<Self, InferenceError>
    where
        F: Fn() -> Result<T, InferenceError>,
    {
        let pool_size = pool_size.max(1);
        let mut instances = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            instances.push(Mutex::new(init()?));
        }
        Ok(Self { instances })
    }

    /// Wraps a single existing instance.
    pub fn single(instance: T) -> Self {
        Self {
            instances: vec![Mutex::new(instance)],
        }
    }

    /// Number of pooled instances.
    pub fn size(&self) -> usize {
        self.instances.len()
    }

    /// Executes a closure with exclusive access to one pooled instance.
    pub fn with<F, R>(&self, f: F) -> Result<R, InferenceError>
    where
        F: FnOnce(&mut T) -> Result<R, InferenceError>,
    {
        let mut guard = acquire(&self.instances);
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_pool_creates_requested_instances() {
        let created = AtomicUsize::new(0);
        let pool = SessionPool::new(3, || Ok(created.fetch_add(1, Ordering::SeqCst))).unwrap();
        assert_eq!(pool.size(), 3);
        assert_eq!(created.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_pool_size_zero_still_has_one_instance() {
        let pool = SessionPool::new(0, || Ok(0u32)).unwrap();
        assert_eq!(pool.size(), 1);
    }

    #[test]
    fn test_pool_propagates_init_error() {
        let result = SessionPool::<u32>::new(2, || {
            Err(InferenceError::ProcessingError {
                message: "no model".to_string(),
            })
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_with_gives_mutable_access() {
        let pool = SessionPool::new(1, || Ok(Vec::<u32>::new())).unwrap();
        pool.with(|v| {
            v.push(7);
            Ok(())
        })
        .unwrap();
        let len = pool.with(|v| Ok(v.len())).unwrap();
        assert_eq!(len, 1);
    }
}
