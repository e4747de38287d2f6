//! Version-tracked value cells for derived state.
//!
//! The navigation layer owns a handful of live values (the current query
//! parameters, the account and currency lists) that this crate derives from:
//! color scales keyed by a domain, link builders bound to the active filters.
//! A `Store` pairs a value with a monotonically increasing version; a
//! `Derived` caches its last result together with the source version it was
//! computed from and recomputes only when the source has moved on. Readers
//! always see a fully computed result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// A readable cell: a current value plus a version that increases on every
/// change. Implemented by [`Store`], [`Derived`] and [`Zip`] so derived
/// values can chain.
pub trait Readable {
    type Value: Clone;

    fn get(&self) -> Self::Value;
    fn version(&self) -> u64;
}

struct StoreInner<T> {
    version: AtomicU64,
    value: RwLock<T>,
}

/// A shared writable cell. Cloning a `Store` shares the underlying value.
pub struct Store<T> {
    inner: Arc<StoreInner<T>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> Store<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                version: AtomicU64::new(0),
                value: RwLock::new(value),
            }),
        }
    }

    /// Replace the value and bump the version so dependents recompute.
    pub fn set(&self, value: T) {
        match self.inner.value.write() {
            Ok(mut guard) => *guard = value,
            Err(poisoned) => *poisoned.into_inner() = value,
        }
        self.inner.version.fetch_add(1, Ordering::SeqCst);
    }
}

impl<T: Clone> Readable for Store<T> {
    type Value = T;

    fn get(&self) -> T {
        match self.inner.value.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn version(&self) -> u64 {
        self.inner.version.load(Ordering::SeqCst)
    }
}

/// A value computed from a source cell, cached per source version.
pub struct Derived<S: Readable, U> {
    source: S,
    compute: Box<dyn Fn(&S::Value) -> U + Send + Sync>,
    slot: RwLock<Option<(u64, U)>>,
}

impl<S: Readable, U: Clone> Derived<S, U> {
    pub fn new<F>(source: S, compute: F) -> Self
    where
        F: Fn(&S::Value) -> U + Send + Sync + 'static,
    {
        Self {
            source,
            compute: Box::new(compute),
            slot: RwLock::new(None),
        }
    }
}

impl<S: Readable, U: Clone> Readable for Derived<S, U> {
    type Value = U;

    /// The current result, recomputed only when the source version changed
    /// since the last read.
    fn get(&self) -> U {
        let version = self.source.version();
        if let Ok(slot) = self.slot.read() {
            if let Some((cached_version, cached)) = slot.as_ref() {
                if *cached_version == version {
                    return cached.clone();
                }
            }
        }
        let value = (self.compute)(&self.source.get());
        tracing::debug!(version, "recomputed derived value");
        match self.slot.write() {
            Ok(mut slot) => *slot = Some((version, value.clone())),
            Err(poisoned) => *poisoned.into_inner() = Some((version, value.clone())),
        }
        value
    }

    fn version(&self) -> u64 {
        self.source.version()
    }
}

/// Two readable cells viewed as one. The combined version is the sum of the
/// two inputs; both are monotonic, so it changes whenever either one does.
pub struct Zip<A, B> {
    a: A,
    b: B,
}

impl<A: Readable, B: Readable> Zip<A, B> {
    pub fn new(a: A, b: B) -> Self {
        Self { a, b }
    }
}

impl<A: Readable, B: Readable> Readable for Zip<A, B> {
    type Value = (A::Value, B::Value);

    fn get(&self) -> Self::Value {
        (self.a.get(), self.b.get())
    }

    fn version(&self) -> u64 {
        self.a.version() + self.b.version()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_store_set_bumps_version() {
        let store = Store::new(1);
        assert_eq!(store.version(), 0);
        store.set(2);
        assert_eq!(store.version(), 1);
        assert_eq!(store.get(), 2);
    }

    #[test]
    fn test_store_clones_share_value() {
        let store = Store::new("a".to_string());
        let other = store.clone();
        store.set("b".to_string());
        assert_eq!(other.get(), "b");
        assert_eq!(other.version(), 1);
    }

    #[test]
    fn test_derived_recomputes_only_on_change() {
        let computes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&computes);
        let store = Store::new(3);
        let doubled = Derived::new(store.clone(), move |n| {
            counter.fetch_add(1, Ordering::SeqCst);
            n * 2
        });

        assert_eq!(doubled.get(), 6);
        assert_eq!(doubled.get(), 6);
        assert_eq!(computes.load(Ordering::SeqCst), 1);

        store.set(5);
        assert_eq!(doubled.get(), 10);
        assert_eq!(doubled.get(), 10);
        assert_eq!(computes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_derived_chains() {
        let store = Store::new(2);
        let doubled = Derived::new(store.clone(), |n| n * 2);
        let formatted = Derived::new(doubled, |n| format!("value: {}", n));

        assert_eq!(formatted.get(), "value: 4");
        store.set(10);
        assert_eq!(formatted.get(), "value: 20");
    }

    #[test]
    fn test_zip_tracks_both_inputs() {
        let a = Store::new(1);
        let b = Store::new(10);
        let zipped = Zip::new(a.clone(), b.clone());
        assert_eq!(zipped.get(), (1, 10));
        assert_eq!(zipped.version(), 0);

        a.set(2);
        assert_eq!(zipped.version(), 1);
        b.set(20);
        assert_eq!(zipped.version(), 2);
        assert_eq!(zipped.get(), (2, 20));
    }
}
