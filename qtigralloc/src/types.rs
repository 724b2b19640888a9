// Copyright 2024 Google LLC
// SPDX-License-Identifier: MIT

//! Simple types.
//!
//! This module defines the error type and the handles exchanged with the mapper.

use std::{ffi, fmt, result};

/// The error type for metadata operations.
///
/// Except for `NoService`, the variants mirror the mapper 4.0 error codes so that a status from
/// the mapper can be handed back to callers unchanged.
#[derive(thiserror::Error, Clone, Copy, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The mapper rejected a buffer descriptor.
    #[error("bad descriptor")]
    BadDescriptor,
    /// The mapper rejected a buffer handle.
    #[error("bad buffer")]
    BadBuffer,
    /// A validation error indicating a bad user input or a malformed byte stream.
    #[error("bad value")]
    BadValue,
    /// The mapper ran out of resources.
    #[error("no resources")]
    NoResources,
    /// Indicates an unsupported metadata key or operation.
    #[error("unsupported")]
    Unsupported,
    /// The mapper service could not be acquired.
    #[error("mapper service unavailable")]
    NoService,
    /// A mapper error code with no dedicated variant.
    #[error("error code {0}")]
    Code(i32),
}

const CODE_BAD_DESCRIPTOR: i32 = 1;
const CODE_BAD_BUFFER: i32 = 2;
const CODE_BAD_VALUE: i32 = 3;
const CODE_NO_RESOURCES: i32 = 5;
const CODE_UNSUPPORTED: i32 = 7;

impl Error {
    /// Converts a mapper error code to an error.
    ///
    /// Returns `None` for `0`, which is the success code.
    pub fn from_code(code: i32) -> Option<Self> {
        let err = match code {
            0 => return None,
            CODE_BAD_DESCRIPTOR => Self::BadDescriptor,
            CODE_BAD_BUFFER => Self::BadBuffer,
            CODE_BAD_VALUE => Self::BadValue,
            CODE_NO_RESOURCES => Self::NoResources,
            CODE_UNSUPPORTED => Self::Unsupported,
            code => Self::Code(code),
        };

        Some(err)
    }

    /// Returns the mapper error code of an error.
    pub fn code(&self) -> i32 {
        match self {
            Self::BadDescriptor => CODE_BAD_DESCRIPTOR,
            Self::BadBuffer => CODE_BAD_BUFFER,
            Self::BadValue => CODE_BAD_VALUE,
            Self::NoResources | Self::NoService => CODE_NO_RESOURCES,
            Self::Unsupported => CODE_UNSUPPORTED,
            Self::Code(code) => *code,
        }
    }

    pub(crate) fn bad_value<T>() -> Result<T> {
        Err(Error::BadValue)
    }

    pub(crate) fn unsupported<T>() -> Result<T> {
        Err(Error::Unsupported)
    }
}

/// A specialized `Result` type for metadata operations.
pub type Result<T> = result::Result<T, Error>;

/// A metadata type as understood by the mapper.
///
/// A metadata type is namespaced by `name`.  Vendor metadata types live in the `"QTI"` namespace.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct MetadataType {
    /// Namespace of the metadata type.
    pub name: &'static str,
    /// Value of the metadata type within the namespace.
    pub value: i64,
}

impl fmt::Display for MetadataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.value)
    }
}

/// An opaque buffer handle.
///
/// The handle is passed through to the mapper and never dereferenced.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct BufferHandle(pub *const ffi::c_void);

impl BufferHandle {
    /// Returns the raw pointer of the handle.
    pub fn as_ptr(&self) -> *const ffi::c_void {
        self.0
    }
}
