// Copyright 2024 Google LLC
// SPDX-License-Identifier: MIT

//! Metadata bridge.
//!
//! This module defines `MetadataBridge`, which gets and sets vendor metadata through the byte
//! stream interface of a mapper.

use super::codec::Metadata;
use super::keys::Key;
use super::mapper::Locator;
use super::types::{BufferHandle, Error, Result};
use log::{debug, warn};

/// A metadata bridge.
///
/// Every call is independent.  The only state is the mapper held by the locator.
pub struct MetadataBridge {
    locator: Locator,
}

impl MetadataBridge {
    /// Creates a metadata bridge.
    pub const fn new(locator: Locator) -> Self {
        Self { locator }
    }

    /// Returns the locator of the bridge.
    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    fn classify(raw: u32) -> Result<Key> {
        Key::classify(raw).ok_or_else(|| {
            debug!("unsupported metadata key {}", raw);
            Error::Unsupported
        })
    }

    /// Gets the metadata of a buffer for a vendor key.
    ///
    /// Errors from the mapper are returned unchanged.  A malformed byte stream is `BadValue`.
    pub fn get(&self, buffer: BufferHandle, raw: u32) -> Result<Metadata> {
        let key = Self::classify(raw)?;
        let mapper = self.locator.instance()?;

        let bytes = mapper.get(buffer, &key.metadata_type()).map_err(|err| {
            warn!("failed to get {}: {}", key, err);
            err
        })?;

        Metadata::decode(key, &bytes).map_err(|err| {
            warn!("failed to decode {} of {} bytes: {}", key, bytes.len(), err);
            err
        })
    }

    /// Sets the metadata of a buffer for a vendor key.
    ///
    /// `val` must be a value for the key.  Nothing is sent to the mapper unless the value is
    /// encoded successfully.
    pub fn set(&self, buffer: BufferHandle, raw: u32, val: &Metadata) -> Result<()> {
        let key = Self::classify(raw)?;
        if !key.is_writable() {
            debug!("metadata key {} is read-only", key);
            return Error::unsupported();
        }

        if val.key() != key {
            debug!("value for {} cannot be set as {}", val.key(), key);
            return Error::bad_value();
        }

        let mut bytes = Vec::new();
        val.encode(&mut bytes)?;

        let mapper = self.locator.instance()?;
        mapper
            .set(buffer, &key.metadata_type(), &bytes)
            .map_err(|err| {
                warn!("failed to set {}: {}", key, err);
                err
            })
    }
}
