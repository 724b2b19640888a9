// Copyright 2024 Google LLC
// SPDX-License-Identifier: MIT

//! Mapper service.
//!
//! This module defines `Mapper`, the byte stream interface of the mapper service, and `Locator`,
//! which acquires a mapper once and shares it afterwards.

use super::types::{BufferHandle, Error, MetadataType, Result};
use log::{info, warn};
use std::sync::{Arc, OnceLock};

/// The byte stream metadata interface of a mapper service.
///
/// Calls may block for the duration of a round trip to the service.
pub trait Mapper: Send + Sync {
    /// Returns the byte stream of a metadata type of a buffer.
    fn get(&self, buffer: BufferHandle, ty: &MetadataType) -> Result<Vec<u8>>;

    /// Replaces the byte stream of a metadata type of a buffer.
    fn set(&self, buffer: BufferHandle, ty: &MetadataType, bytes: &[u8]) -> Result<()>;
}

/// A function that acquires a mapper service.
pub type Acquire = fn() -> Option<Arc<dyn Mapper>>;

/// A mapper locator.
///
/// The acquire function is called at most once, on the first call to `Locator::instance`.  The
/// outcome is kept for the lifetime of the locator, including a failure.
pub struct Locator {
    acquire: Acquire,
    mapper: OnceLock<Option<Arc<dyn Mapper>>>,
}

impl Locator {
    /// Creates a locator that acquires the mapper with `acquire` on first use.
    pub const fn new(acquire: Acquire) -> Self {
        Self {
            acquire,
            mapper: OnceLock::new(),
        }
    }

    /// Creates a locator for an already acquired mapper.
    pub fn with_mapper(mapper: Arc<dyn Mapper>) -> Self {
        let locator = Self::new(|| None);
        let _ = locator.mapper.set(Some(mapper));
        locator
    }

    /// Returns the mapper, acquiring it first if needed.
    pub fn instance(&self) -> Result<&Arc<dyn Mapper>> {
        let mapper = self.mapper.get_or_init(|| {
            let mapper = (self.acquire)();
            match mapper {
                Some(_) => info!("mapper service acquired"),
                None => warn!("failed to acquire mapper service"),
            }
            mapper
        });

        mapper.as_ref().ok_or(Error::NoService)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    struct NullMapper;

    impl Mapper for NullMapper {
        fn get(&self, _buffer: BufferHandle, _ty: &MetadataType) -> Result<Vec<u8>> {
            Err(Error::Unsupported)
        }

        fn set(&self, _buffer: BufferHandle, _ty: &MetadataType, _bytes: &[u8]) -> Result<()> {
            Err(Error::Unsupported)
        }
    }

    static ACQUIRED: AtomicUsize = AtomicUsize::new(0);

    fn acquire_null() -> Option<Arc<dyn Mapper>> {
        ACQUIRED.fetch_add(1, Ordering::SeqCst);
        Some(Arc::new(NullMapper))
    }

    static FAILED: AtomicUsize = AtomicUsize::new(0);

    fn acquire_none() -> Option<Arc<dyn Mapper>> {
        FAILED.fetch_add(1, Ordering::SeqCst);
        None
    }

    #[test]
    fn acquire_once() {
        static LOCATOR: Locator = Locator::new(acquire_null);

        let mappers: Vec<Arc<dyn Mapper>> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| LOCATOR.instance().map(Arc::clone)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect()
        });

        assert_eq!(ACQUIRED.load(Ordering::SeqCst), 1);
        for mapper in &mappers {
            assert!(Arc::ptr_eq(mapper, &mappers[0]));
        }

        assert!(Arc::ptr_eq(LOCATOR.instance().unwrap(), &mappers[0]));
        assert_eq!(ACQUIRED.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn acquire_failure() {
        let locator = Locator::new(acquire_none);

        assert_eq!(locator.instance().err(), Some(Error::NoService));
        assert_eq!(locator.instance().err(), Some(Error::NoService));
        assert_eq!(FAILED.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn with_mapper() {
        let mapper: Arc<dyn Mapper> = Arc::new(NullMapper);
        let locator = Locator::with_mapper(mapper.clone());

        assert!(Arc::ptr_eq(locator.instance().unwrap(), &mapper));
    }
}
