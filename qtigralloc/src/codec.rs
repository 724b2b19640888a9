// Copyright 2024 Google LLC
// SPDX-License-Identifier: MIT

//! Metadata codecs.
//!
//! Records are encoded as their raw bytes.  Scalars use the gralloc4 encoding.  `Metadata` ties
//! each key to the codec of its value.

use super::gralloc4;
use super::keys::Key;
use super::layouts::{
    ColorMetaData, CvpMetadata, GraphicsMetadata, UbwcStats, VideoHistogramMetadata,
    UBWC_STATS_ARRAY_SIZE,
};
use super::types::{Error, Result};
use std::mem;
use zerocopy::{FromBytes, Immutable, IntoBytes};

/// The value of `Key::UbwcCrStatsInfo`.
pub type UbwcStatsArray = [UbwcStats; UBWC_STATS_ARRAY_SIZE];

/// Decodes a record from the raw bytes.
///
/// Bytes past the size of the record are ignored.
pub fn decode_struct<T>(bytes: &[u8]) -> Result<T>
where
    T: FromBytes,
{
    if bytes.is_empty() {
        return Error::bad_value();
    }

    T::read_from_prefix(bytes)
        .map(|(val, _)| val)
        .map_err(|_| Error::BadValue)
}

/// Encodes a record into `out`, replacing its contents.
pub fn encode_struct<T>(val: &T, out: &mut Vec<u8>)
where
    T: IntoBytes + Immutable,
{
    out.clear();
    out.extend_from_slice(val.as_bytes());
    debug_assert_eq!(out.len(), mem::size_of::<T>());
}

/// A typed metadata value.
#[derive(Clone, Debug, PartialEq)]
pub enum Metadata {
    /// See `Key::VtTimestamp`.
    VtTimestamp(u64),
    /// See `Key::ColorMetadata`.
    ColorMetadata(Box<ColorMetaData>),
    /// See `Key::PpParamInterlaced`.
    PpParamInterlaced(i32),
    /// See `Key::VideoPerfMode`.
    VideoPerfMode(u32),
    /// See `Key::GraphicsMetadata`.
    GraphicsMetadata(Box<GraphicsMetadata>),
    /// See `Key::UbwcCrStatsInfo`.
    UbwcCrStatsInfo(Box<UbwcStatsArray>),
    /// See `Key::RefreshRate`.
    RefreshRate(f32),
    /// See `Key::MapSecureBuffer`.
    MapSecureBuffer(i32),
    /// See `Key::LinearFormat`.
    LinearFormat(u32),
    /// See `Key::SingleBufferMode`.
    SingleBufferMode(u32),
    /// See `Key::CvpMetadata`.
    CvpMetadata(Box<CvpMetadata>),
    /// See `Key::VideoHistogramStats`.
    VideoHistogramStats(Box<VideoHistogramMetadata>),
    /// See `Key::Fd`.
    Fd(i32),
    /// See `Key::PrivateFlags`.
    PrivateFlags(i32),
}

impl Metadata {
    /// Returns the key of the value.
    pub fn key(&self) -> Key {
        match self {
            Metadata::VtTimestamp(_) => Key::VtTimestamp,
            Metadata::ColorMetadata(_) => Key::ColorMetadata,
            Metadata::PpParamInterlaced(_) => Key::PpParamInterlaced,
            Metadata::VideoPerfMode(_) => Key::VideoPerfMode,
            Metadata::GraphicsMetadata(_) => Key::GraphicsMetadata,
            Metadata::UbwcCrStatsInfo(_) => Key::UbwcCrStatsInfo,
            Metadata::RefreshRate(_) => Key::RefreshRate,
            Metadata::MapSecureBuffer(_) => Key::MapSecureBuffer,
            Metadata::LinearFormat(_) => Key::LinearFormat,
            Metadata::SingleBufferMode(_) => Key::SingleBufferMode,
            Metadata::CvpMetadata(_) => Key::CvpMetadata,
            Metadata::VideoHistogramStats(_) => Key::VideoHistogramStats,
            Metadata::Fd(_) => Key::Fd,
            Metadata::PrivateFlags(_) => Key::PrivateFlags,
        }
    }

    /// Decodes a byte stream from the mapper.
    pub fn decode(key: Key, bytes: &[u8]) -> Result<Self> {
        let ty = &key.metadata_type();

        let md = match key {
            Key::VtTimestamp => Metadata::VtTimestamp(gralloc4::decode_scalar(ty, bytes)?),
            Key::ColorMetadata => Metadata::ColorMetadata(Box::new(decode_struct(bytes)?)),
            Key::PpParamInterlaced => {
                Metadata::PpParamInterlaced(gralloc4::decode_scalar(ty, bytes)?)
            }
            Key::VideoPerfMode => Metadata::VideoPerfMode(gralloc4::decode_scalar(ty, bytes)?),
            Key::GraphicsMetadata => Metadata::GraphicsMetadata(Box::new(decode_struct(bytes)?)),
            Key::UbwcCrStatsInfo => Metadata::UbwcCrStatsInfo(Box::new(decode_struct(bytes)?)),
            Key::RefreshRate => Metadata::RefreshRate(gralloc4::decode_scalar(ty, bytes)?),
            Key::MapSecureBuffer => Metadata::MapSecureBuffer(gralloc4::decode_scalar(ty, bytes)?),
            Key::LinearFormat => Metadata::LinearFormat(gralloc4::decode_scalar(ty, bytes)?),
            Key::SingleBufferMode => {
                Metadata::SingleBufferMode(gralloc4::decode_scalar(ty, bytes)?)
            }
            Key::CvpMetadata => Metadata::CvpMetadata(Box::new(decode_struct(bytes)?)),
            Key::VideoHistogramStats => {
                Metadata::VideoHistogramStats(Box::new(decode_struct(bytes)?))
            }
            Key::Fd => Metadata::Fd(gralloc4::decode_scalar(ty, bytes)?),
            Key::PrivateFlags => Metadata::PrivateFlags(gralloc4::decode_scalar(ty, bytes)?),
        };

        Ok(md)
    }

    /// Encodes the value into a byte stream for the mapper, replacing the contents of `out`.
    ///
    /// `PrivateFlags` is read-only and cannot be encoded.
    pub fn encode(&self, out: &mut Vec<u8>) -> Result<()> {
        let ty = self.key().metadata_type();

        match self {
            Metadata::VtTimestamp(v) => gralloc4::encode_scalar(&ty, v, out),
            Metadata::ColorMetadata(v) => encode_struct(&**v, out),
            Metadata::PpParamInterlaced(v) => gralloc4::encode_scalar(&ty, v, out),
            Metadata::VideoPerfMode(v) => gralloc4::encode_scalar(&ty, v, out),
            Metadata::GraphicsMetadata(v) => encode_struct(&**v, out),
            Metadata::UbwcCrStatsInfo(v) => encode_struct(&**v, out),
            Metadata::RefreshRate(v) => gralloc4::encode_scalar(&ty, v, out),
            Metadata::MapSecureBuffer(v) => gralloc4::encode_scalar(&ty, v, out),
            Metadata::LinearFormat(v) => gralloc4::encode_scalar(&ty, v, out),
            Metadata::SingleBufferMode(v) => gralloc4::encode_scalar(&ty, v, out),
            Metadata::CvpMetadata(v) => encode_struct(&**v, out),
            Metadata::VideoHistogramStats(v) => encode_struct(&**v, out),
            Metadata::Fd(v) => gralloc4::encode_scalar(&ty, v, out),
            Metadata::PrivateFlags(_) => return Error::unsupported(),
        }

        Ok(())
    }

    /// Reads a value from its in-memory representation.
    ///
    /// `bytes` must hold exactly `key.native_size()` bytes.
    pub fn from_native(key: Key, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != key.native_size() {
            return Error::bad_value();
        }

        let md = match key {
            Key::VtTimestamp => Metadata::VtTimestamp(read_native(bytes)?),
            Key::ColorMetadata => Metadata::ColorMetadata(Box::new(read_native(bytes)?)),
            Key::PpParamInterlaced => Metadata::PpParamInterlaced(read_native(bytes)?),
            Key::VideoPerfMode => Metadata::VideoPerfMode(read_native(bytes)?),
            Key::GraphicsMetadata => Metadata::GraphicsMetadata(Box::new(read_native(bytes)?)),
            Key::UbwcCrStatsInfo => Metadata::UbwcCrStatsInfo(Box::new(read_native(bytes)?)),
            Key::RefreshRate => Metadata::RefreshRate(read_native(bytes)?),
            Key::MapSecureBuffer => Metadata::MapSecureBuffer(read_native(bytes)?),
            Key::LinearFormat => Metadata::LinearFormat(read_native(bytes)?),
            Key::SingleBufferMode => Metadata::SingleBufferMode(read_native(bytes)?),
            Key::CvpMetadata => Metadata::CvpMetadata(Box::new(read_native(bytes)?)),
            Key::VideoHistogramStats => {
                Metadata::VideoHistogramStats(Box::new(read_native(bytes)?))
            }
            Key::Fd => Metadata::Fd(read_native(bytes)?),
            Key::PrivateFlags => Metadata::PrivateFlags(read_native(bytes)?),
        };

        Ok(md)
    }

    /// Returns the in-memory representation of the value.
    pub fn as_native_bytes(&self) -> &[u8] {
        match self {
            Metadata::VtTimestamp(v) => v.as_bytes(),
            Metadata::ColorMetadata(v) => v.as_bytes(),
            Metadata::PpParamInterlaced(v)
            | Metadata::MapSecureBuffer(v)
            | Metadata::Fd(v)
            | Metadata::PrivateFlags(v) => v.as_bytes(),
            Metadata::VideoPerfMode(v)
            | Metadata::LinearFormat(v)
            | Metadata::SingleBufferMode(v) => v.as_bytes(),
            Metadata::GraphicsMetadata(v) => v.as_bytes(),
            Metadata::UbwcCrStatsInfo(v) => v.as_bytes(),
            Metadata::RefreshRate(v) => v.as_bytes(),
            Metadata::CvpMetadata(v) => v.as_bytes(),
            Metadata::VideoHistogramStats(v) => v.as_bytes(),
        }
    }
}

fn read_native<T: FromBytes>(bytes: &[u8]) -> Result<T> {
    T::read_from_bytes(bytes).map_err(|_| Error::BadValue)
}
