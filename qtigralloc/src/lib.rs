// Copyright 2024 Google LLC
// SPDX-License-Identifier: MIT

#![warn(missing_docs)]

//! Vendor buffer metadata over the gralloc4 mapper.
//!
//! This crate gets and sets vendor metadata of graphics buffers through the generic byte stream
//! metadata interface of a mapper service.
//!
//! A call is divided into 3 steps.  The classification step maps the vendor integer key to a
//! `Key` and rejects unknown keys.  The codec step converts between the typed `Metadata` and the
//! byte stream.  The mapper step exchanges the byte stream with the mapper service, which is
//! acquired once by a `Locator`.

mod bridge;
mod codec;
mod gralloc4;
mod keys;
mod layouts;
mod mapper;
mod types;

pub use bridge::*;
pub use codec::*;
pub use gralloc4::{decode_scalar, encode_scalar, encoded_size};
pub use keys::*;
pub use layouts::*;
pub use mapper::*;
pub use types::*;
