// Copyright 2024 Google LLC
// SPDX-License-Identifier: MIT

//! The gralloc4 scalar metadata encoding.
//!
//! A scalar byte stream starts with the metadata type, which is the name as a `u64` length and
//! the name bytes, followed by the value as an `i64`.  The payload follows.  Everything is in
//! native byte order.

use super::types::{Error, MetadataType, Result};
use log::debug;
use std::mem;
use zerocopy::{FromBytes, Immutable, IntoBytes};

struct Reader<'a> {
    buf: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.buf.len() < len {
            return Error::bad_value();
        }

        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;

        Ok(head)
    }

    fn read<T: FromBytes>(&mut self) -> Result<T> {
        let bytes = self.take(mem::size_of::<T>())?;
        T::read_from_bytes(bytes).map_err(|_| Error::BadValue)
    }

    fn has_remaining(&self) -> bool {
        !self.buf.is_empty()
    }
}

fn encode_metadata_type(ty: &MetadataType, out: &mut Vec<u8>) {
    let name = ty.name.as_bytes();
    out.extend_from_slice(&(name.len() as u64).to_ne_bytes());
    out.extend_from_slice(name);
    out.extend_from_slice(&ty.value.to_ne_bytes());
}

fn validate_metadata_type(reader: &mut Reader, ty: &MetadataType) -> Result<()> {
    let len: u64 = reader.read()?;
    let name = reader.take(usize::try_from(len).map_err(|_| Error::BadValue)?)?;
    let value: i64 = reader.read()?;

    if name != ty.name.as_bytes() || value != ty.value {
        debug!(
            "byte stream is for {}:{}, not {}",
            String::from_utf8_lossy(name),
            value,
            ty
        );
        return Error::bad_value();
    }

    Ok(())
}

/// Returns the size of an encoded scalar of type `T`.
pub fn encoded_size<T>(ty: &MetadataType) -> usize {
    mem::size_of::<u64>() + ty.name.len() + mem::size_of::<i64>() + mem::size_of::<T>()
}

/// Encodes a scalar into `out`, replacing its contents.
pub fn encode_scalar<T>(ty: &MetadataType, val: &T, out: &mut Vec<u8>)
where
    T: IntoBytes + Immutable,
{
    out.clear();
    out.reserve(encoded_size::<T>(ty));
    encode_metadata_type(ty, out);
    out.extend_from_slice(val.as_bytes());
}

/// Decodes a scalar.
///
/// The byte stream must be for `ty` and must hold exactly one `T`.
pub fn decode_scalar<T>(ty: &MetadataType, bytes: &[u8]) -> Result<T>
where
    T: FromBytes,
{
    if bytes.is_empty() {
        return Error::bad_value();
    }

    let mut reader = Reader::new(bytes);
    validate_metadata_type(&mut reader, ty)?;
    let val = reader.read()?;

    if reader.has_remaining() {
        return Error::bad_value();
    }

    Ok(val)
}
