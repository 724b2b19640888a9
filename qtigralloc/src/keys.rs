// Copyright 2024 Google LLC
// SPDX-License-Identifier: MIT

//! Vendor metadata keys.
//!
//! This module maps the vendor integer keys to `Key` and to the mapper metadata types.

use super::layouts::{
    ColorMetaData, CvpMetadata, GraphicsMetadata, UbwcStats, VideoHistogramMetadata,
    UBWC_STATS_ARRAY_SIZE,
};
use super::types::MetadataType;
use std::{fmt, mem};

/// Namespace of the vendor metadata types.
pub const VENDOR_QTI: &str = "QTI";

/// Vendor key `VT_TIMESTAMP`.
pub const QTI_VT_TIMESTAMP: u32 = 10000;
/// Vendor key `COLOR_METADATA`.
pub const QTI_COLOR_METADATA: u32 = 10001;
/// Vendor key `PP_PARAM_INTERLACED`.
pub const QTI_PP_PARAM_INTERLACED: u32 = 10002;
/// Vendor key `VIDEO_PERF_MODE`.
pub const QTI_VIDEO_PERF_MODE: u32 = 10003;
/// Vendor key `GRAPHICS_METADATA`.
pub const QTI_GRAPHICS_METADATA: u32 = 10004;
/// Vendor key `UBWC_CR_STATS_INFO`.
pub const QTI_UBWC_CR_STATS_INFO: u32 = 10005;
/// Vendor key `REFRESH_RATE`.
pub const QTI_REFRESH_RATE: u32 = 10006;
/// Vendor key `MAP_SECURE_BUFFER`.
pub const QTI_MAP_SECURE_BUFFER: u32 = 10007;
/// Vendor key `LINEAR_FORMAT`.
pub const QTI_LINEAR_FORMAT: u32 = 10008;
/// Vendor key `SINGLE_BUFFER_MODE`.
pub const QTI_SINGLE_BUFFER_MODE: u32 = 10009;
/// Vendor key `CVP_METADATA`.
pub const QTI_CVP_METADATA: u32 = 10010;
/// Vendor key `VIDEO_HISTOGRAM_STATS`.
pub const QTI_VIDEO_HISTOGRAM_STATS: u32 = 10011;
/// Vendor key `FD`.
pub const QTI_FD: u32 = 10012;
/// Vendor key `PRIVATE_FLAGS`.
pub const QTI_PRIVATE_FLAGS: u32 = 10013;

/// A recognized vendor metadata key.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u32)]
pub enum Key {
    /// `u64` timestamp.
    VtTimestamp = QTI_VT_TIMESTAMP,
    /// `ColorMetaData`.
    ColorMetadata = QTI_COLOR_METADATA,
    /// `i32` interlaced flag.
    PpParamInterlaced = QTI_PP_PARAM_INTERLACED,
    /// `u32` performance mode.
    VideoPerfMode = QTI_VIDEO_PERF_MODE,
    /// `GraphicsMetadata`.
    GraphicsMetadata = QTI_GRAPHICS_METADATA,
    /// `[UbwcStats; UBWC_STATS_ARRAY_SIZE]`.
    UbwcCrStatsInfo = QTI_UBWC_CR_STATS_INFO,
    /// `f32` refresh rate.
    RefreshRate = QTI_REFRESH_RATE,
    /// `i32` secure buffer mapping flag.
    MapSecureBuffer = QTI_MAP_SECURE_BUFFER,
    /// `u32` linear format.
    LinearFormat = QTI_LINEAR_FORMAT,
    /// `u32` single buffer mode.
    SingleBufferMode = QTI_SINGLE_BUFFER_MODE,
    /// `CvpMetadata`.
    CvpMetadata = QTI_CVP_METADATA,
    /// `VideoHistogramMetadata`.
    VideoHistogramStats = QTI_VIDEO_HISTOGRAM_STATS,
    /// `i32` file descriptor.
    Fd = QTI_FD,
    /// `i32` private flags.  Read-only.
    PrivateFlags = QTI_PRIVATE_FLAGS,
}

impl Key {
    /// All recognized keys.
    pub const ALL: [Key; 14] = [
        Key::VtTimestamp,
        Key::ColorMetadata,
        Key::PpParamInterlaced,
        Key::VideoPerfMode,
        Key::GraphicsMetadata,
        Key::UbwcCrStatsInfo,
        Key::RefreshRate,
        Key::MapSecureBuffer,
        Key::LinearFormat,
        Key::SingleBufferMode,
        Key::CvpMetadata,
        Key::VideoHistogramStats,
        Key::Fd,
        Key::PrivateFlags,
    ];

    /// Classifies a vendor integer key.
    ///
    /// Returns `None` when the key is not recognized.
    pub fn classify(raw: u32) -> Option<Key> {
        let key = match raw {
            QTI_VT_TIMESTAMP => Key::VtTimestamp,
            QTI_COLOR_METADATA => Key::ColorMetadata,
            QTI_PP_PARAM_INTERLACED => Key::PpParamInterlaced,
            QTI_VIDEO_PERF_MODE => Key::VideoPerfMode,
            QTI_GRAPHICS_METADATA => Key::GraphicsMetadata,
            QTI_UBWC_CR_STATS_INFO => Key::UbwcCrStatsInfo,
            QTI_REFRESH_RATE => Key::RefreshRate,
            QTI_MAP_SECURE_BUFFER => Key::MapSecureBuffer,
            QTI_LINEAR_FORMAT => Key::LinearFormat,
            QTI_SINGLE_BUFFER_MODE => Key::SingleBufferMode,
            QTI_CVP_METADATA => Key::CvpMetadata,
            QTI_VIDEO_HISTOGRAM_STATS => Key::VideoHistogramStats,
            QTI_FD => Key::Fd,
            QTI_PRIVATE_FLAGS => Key::PrivateFlags,
            _ => return None,
        };

        Some(key)
    }

    /// Returns the vendor integer key.
    pub fn raw(self) -> u32 {
        self as u32
    }

    /// Returns the mapper metadata type of the key.
    pub fn metadata_type(self) -> MetadataType {
        MetadataType {
            name: VENDOR_QTI,
            value: i64::from(self.raw()),
        }
    }

    /// Returns whether the key can be set.
    ///
    /// `PrivateFlags` is read-only.
    pub fn is_writable(self) -> bool {
        self != Key::PrivateFlags
    }

    /// Returns the size of the value of the key in the caller's memory.
    pub fn native_size(self) -> usize {
        match self {
            Key::VtTimestamp => mem::size_of::<u64>(),
            Key::VideoPerfMode | Key::LinearFormat | Key::SingleBufferMode => mem::size_of::<u32>(),
            Key::PpParamInterlaced | Key::MapSecureBuffer | Key::Fd | Key::PrivateFlags => {
                mem::size_of::<i32>()
            }
            Key::RefreshRate => mem::size_of::<f32>(),
            Key::ColorMetadata => mem::size_of::<ColorMetaData>(),
            Key::GraphicsMetadata => mem::size_of::<GraphicsMetadata>(),
            Key::UbwcCrStatsInfo => mem::size_of::<[UbwcStats; UBWC_STATS_ARRAY_SIZE]>(),
            Key::CvpMetadata => mem::size_of::<CvpMetadata>(),
            Key::VideoHistogramStats => mem::size_of::<VideoHistogramMetadata>(),
        }
    }

    /// Returns the name of the key.
    pub fn name(self) -> &'static str {
        match self {
            Key::VtTimestamp => "VT_TIMESTAMP",
            Key::ColorMetadata => "COLOR_METADATA",
            Key::PpParamInterlaced => "PP_PARAM_INTERLACED",
            Key::VideoPerfMode => "VIDEO_PERF_MODE",
            Key::GraphicsMetadata => "GRAPHICS_METADATA",
            Key::UbwcCrStatsInfo => "UBWC_CR_STATS_INFO",
            Key::RefreshRate => "REFRESH_RATE",
            Key::MapSecureBuffer => "MAP_SECURE_BUFFER",
            Key::LinearFormat => "LINEAR_FORMAT",
            Key::SingleBufferMode => "SINGLE_BUFFER_MODE",
            Key::CvpMetadata => "CVP_METADATA",
            Key::VideoHistogramStats => "VIDEO_HISTOGRAM_STATS",
            Key::Fd => "FD",
            Key::PrivateFlags => "PRIVATE_FLAGS",
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
