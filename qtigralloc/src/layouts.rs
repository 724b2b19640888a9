// Copyright 2024 Google LLC
// SPDX-License-Identifier: MIT

//! Vendor metadata records.
//!
//! These records are exchanged with the mapper as raw bytes and must match the C definitions bit
//! for bit.  C `bool` members are carried as `u8` and implicit C padding is spelled out, so that
//! every record is valid for any bit pattern.

use bitflags::bitflags;
use std::mem;
use zerocopy::{FromBytes, FromZeros, Immutable, IntoBytes, KnownLayout};

/// Size of the HDR dynamic metadata payload.
pub const HDR_DYNAMIC_META_DATA_SZ: usize = 1024;
/// Number of entries in a color remapping LUT of a channel.
pub const COLOR_REMAPPING_LUT_SIZE: usize = 33;
/// Number of words in `GraphicsMetadata::data`.
pub const GRAPHICS_METADATA_SIZE: usize = 4096;
/// Number of words in the UBWC stats union.
pub const MAX_UBWC_STATS_LENGTH: usize = 32;
/// Number of `UbwcStats` exchanged for `Key::UbwcCrStatsInfo`.
pub const UBWC_STATS_ARRAY_SIZE: usize = 2;
/// Size of the CVP metadata payload.
pub const CVP_METADATA_SIZE: usize = 1024;
/// Size of the video histogram stats payload in bytes.
pub const VIDEO_HISTOGRAM_STATS_SIZE: usize = 4 * 1024;

macro_rules! c_enum {
    ($(#[$attr:meta])* $name:ident { $($(#[$vattr:meta])* $variant:ident = $val:expr,)* }) => {
        $(#[$attr])*
        #[derive(
            Clone, Copy, Debug, Default, Eq, Hash, PartialEq, FromBytes, Immutable, IntoBytes,
            KnownLayout,
        )]
        #[repr(transparent)]
        pub struct $name(pub u32);

        #[allow(missing_docs)]
        impl $name {
            $($(#[$vattr])* pub const $variant: Self = Self($val);)*
        }
    };
}

c_enum!(
    /// Color primaries, as in ISO/IEC 23001-8.
    ColorPrimaries {
        RESERVED = 0,
        BT709_5 = 1,
        UNSPECIFIED = 2,
        BT470_6M = 4,
        BT601_6_625 = 5,
        BT601_6_525 = 6,
        SMPTE_240M = 7,
        GENERIC_FILM = 8,
        BT2020 = 9,
        SMPTE_ST428 = 10,
        ADOBE_RGB = 11,
        DCI_P3 = 12,
        EBU3213 = 22,
        MAX = 0xff,
    }
);

c_enum!(
    /// Color range.
    ColorRange {
        LIMITED = 0,
        FULL = 1,
        EXTENDED = 2,
        MAX = 0xff,
    }
);

c_enum!(
    /// Transfer characteristics, as in ISO/IEC 23001-8.
    GammaTransfer {
        RESERVED = 0,
        BT709_5 = 1,
        UNSPECIFIED = 2,
        BT470_6M = 4,
        BT470_6BG = 5,
        BT601_6 = 6,
        SMPTE_240M = 7,
        LINEAR = 8,
        LOG = 9,
        LOG_SQRT = 10,
        XVYCC = 11,
        BT1361 = 12,
        SRGB = 13,
        BT2020_10 = 14,
        BT2020_12 = 15,
        SMPTE_ST2084 = 16,
        SMPTE_ST428 = 17,
        HLG = 18,
        MAX = 0xff,
    }
);

c_enum!(
    /// Matrix coefficients, as in ISO/IEC 23001-8.
    MatrixCoEfficients {
        IDENTITY = 0,
        BT709_5 = 1,
        UNSPECIFIED = 2,
        FCC_47 = 4,
        BT601_6_625 = 5,
        BT601_6_525 = 6,
        SMPTE_240M = 7,
        YCGCO = 8,
        BT2020 = 9,
        BT2020_CONSTANT = 10,
        BT601_6_FULL = 11,
        MAX = 0xff,
    }
);

c_enum!(
    /// UBWC version, which selects the view of the `UbwcStats` union.
    UbwcVersion {
        UNUSED = 0,
        V1_0 = 1,
        V2_0 = 2,
        V3_0 = 3,
        V4_0 = 4,
        MAX = 0xff,
    }
);

/// Chromaticity coordinates of the display primaries.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, FromBytes, Immutable, IntoBytes, KnownLayout)]
#[repr(C)]
pub struct Primaries {
    /// `[x, y]` of the red, green and blue primaries.
    pub rgb_primaries: [[u32; 2]; 3],
    /// `[x, y]` of the white point.
    pub white_point: [u32; 2],
}

/// Mastering display color volume.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, FromBytes, Immutable, IntoBytes, KnownLayout)]
#[repr(C)]
pub struct MasteringDisplay {
    /// C `bool`.
    pub color_volume_sei_enabled: u8,
    #[doc(hidden)]
    pub _pad: [u8; 3],
    pub primaries: Primaries,
    pub max_display_luminance: u32,
    pub min_display_luminance: u32,
}

/// Content light level.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, FromBytes, Immutable, IntoBytes, KnownLayout)]
#[repr(C)]
pub struct ContentLightLevel {
    /// C `bool`.
    pub light_level_sei_enabled: u8,
    #[doc(hidden)]
    pub _pad: [u8; 3],
    pub max_content_light_level: u32,
    pub min_pic_average_light_level: u32,
}

const LUT_LEN: usize = 3 * COLOR_REMAPPING_LUT_SIZE;

/// Color remapping info SEI.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromBytes, Immutable, IntoBytes, KnownLayout)]
#[repr(C)]
pub struct ColorRemappingInfo {
    /// C `bool`.
    pub cri_enabled: u8,
    #[doc(hidden)]
    pub _pad: [u8; 3],
    pub cr_id: u32,
    pub cr_cancel_flag: u32,
    pub cr_persistence_flag: u32,
    pub cr_video_signal_info_present_flag: u32,
    pub cr_range: u32,
    pub cr_primaries: ColorPrimaries,
    pub cr_transfer_function: GammaTransfer,
    pub cr_matrix_coefficients: MatrixCoEfficients,
    pub cr_input_bit_depth: u32,
    pub cr_output_bit_depth: u32,
    pub cr_pre_lut_num_val_minus1: [u32; 3],
    pub cr_pre_lut_coded_value: [u32; LUT_LEN],
    pub cr_pre_lut_target_value: [u32; LUT_LEN],
    pub cr_matrix_present_flag: u32,
    pub cr_log2_matrix_denom: u32,
    pub cr_coefficients: [i32; 3 * 3],
    pub cr_post_lut_num_val_minus1: [u32; 3],
    pub cr_post_lut_coded_value: [u32; LUT_LEN],
    pub cr_post_lut_target_value: [u32; LUT_LEN],
}

/// Color metadata of a buffer.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromBytes, Immutable, IntoBytes, KnownLayout)]
#[repr(C)]
pub struct ColorMetaData {
    pub color_primaries: ColorPrimaries,
    pub range: ColorRange,
    pub transfer: GammaTransfer,
    pub matrix_coefficients: MatrixCoEfficients,
    pub mastering_display_info: MasteringDisplay,
    pub content_light_level: ContentLightLevel,
    pub cri: ColorRemappingInfo,
    /// C `bool`.
    pub dynamic_meta_data_valid: u8,
    #[doc(hidden)]
    pub _pad: [u8; 3],
    /// Valid bytes in `dynamic_meta_data_payload`.
    pub dynamic_meta_data_len: u32,
    pub dynamic_meta_data_payload: [u8; HDR_DYNAMIC_META_DATA_SZ],
}

/// Opaque graphics metadata.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromBytes, Immutable, IntoBytes, KnownLayout)]
#[repr(C)]
pub struct GraphicsMetadata {
    /// Valid words in `data`.
    pub size: u32,
    pub data: [u32; GRAPHICS_METADATA_SIZE],
}

/// Compression ratio stats for UBWC 2.0.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Ubwc20Stats {
    pub n_cr_stats_tile32: u32,
    pub n_cr_stats_tile64: u32,
    pub n_cr_stats_tile96: u32,
    pub n_cr_stats_tile128: u32,
    pub n_cr_stats_tile160: u32,
    pub n_cr_stats_tile192: u32,
    pub n_cr_stats_tile256: u32,
}

/// UBWC compression ratio stats.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, FromBytes, Immutable, IntoBytes, KnownLayout)]
#[repr(C)]
pub struct UbwcStats {
    /// Selects the view of `stats`.
    pub version: UbwcVersion,
    /// Non-zero when `stats` is valid.
    pub data_valid: u8,
    #[doc(hidden)]
    pub _pad: [u8; 3],
    /// The raw words of the stats union.
    pub stats: [u32; MAX_UBWC_STATS_LENGTH],
}

impl UbwcStats {
    /// Returns the UBWC 2.0 view of the stats.
    pub fn ubwc_2_0(&self) -> Ubwc20Stats {
        let s = &self.stats;
        Ubwc20Stats {
            n_cr_stats_tile32: s[0],
            n_cr_stats_tile64: s[1],
            n_cr_stats_tile96: s[2],
            n_cr_stats_tile128: s[3],
            n_cr_stats_tile160: s[4],
            n_cr_stats_tile192: s[5],
            n_cr_stats_tile256: s[6],
        }
    }

    /// Replaces the stats with a UBWC 2.0 view.
    pub fn set_ubwc_2_0(&mut self, stats: Ubwc20Stats) {
        self.stats = [0; MAX_UBWC_STATS_LENGTH];
        self.stats[..7].copy_from_slice(&[
            stats.n_cr_stats_tile32,
            stats.n_cr_stats_tile64,
            stats.n_cr_stats_tile96,
            stats.n_cr_stats_tile128,
            stats.n_cr_stats_tile160,
            stats.n_cr_stats_tile192,
            stats.n_cr_stats_tile256,
        ]);
    }
}

bitflags! {
    /// Flags of `CvpMetadata`.
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct CvpFlags: u32 {
        /// The metadata repeats that of the previous frame.
        const REPEAT = 1 << 0;
    }
}

/// Computer vision processor metadata.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromBytes, Immutable, IntoBytes, KnownLayout)]
#[repr(C)]
pub struct CvpMetadata {
    /// Valid bytes in `payload`.
    pub size: u32,
    pub payload: [u8; CVP_METADATA_SIZE],
    pub capture_frame_rate: u32,
    pub cvp_frame_rate: u32,
    /// Raw `CvpFlags`.
    pub flags: u32,
    pub reserved: [u32; 8],
}

impl CvpMetadata {
    /// Returns the flags, keeping unknown bits.
    pub fn flags(&self) -> CvpFlags {
        CvpFlags::from_bits_retain(self.flags)
    }
}

/// Video histogram stats.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromBytes, Immutable, IntoBytes, KnownLayout)]
#[repr(C)]
pub struct VideoHistogramMetadata {
    pub stats_info: [u32; VIDEO_HISTOGRAM_STATS_SIZE / 4],
    /// Valid bytes in `stats_info`.
    pub stat_len: u32,
    /// Frame type bit mask.
    pub frame_type: u32,
    pub display_width: u32,
    pub display_height: u32,
    pub decode_width: u32,
    pub decode_height: u32,
    pub reserved: [u32; 12],
}

macro_rules! zeroed_default {
    ($($name:ident),*) => {
        $(impl Default for $name {
            fn default() -> Self {
                Self::new_zeroed()
            }
        })*
    };
}

zeroed_default!(
    ColorRemappingInfo,
    ColorMetaData,
    GraphicsMetadata,
    CvpMetadata,
    VideoHistogramMetadata
);

const _: () = assert!(mem::size_of::<ColorRemappingInfo>() == 1696);
const _: () = assert!(mem::size_of::<ColorMetaData>() == 2800);
const _: () = assert!(mem::size_of::<GraphicsMetadata>() == 4 + 4 * GRAPHICS_METADATA_SIZE);
const _: () = assert!(mem::size_of::<UbwcStats>() == 136);
const _: () = assert!(mem::size_of::<CvpMetadata>() == 1072);
const _: () = assert!(mem::size_of::<VideoHistogramMetadata>() == 4168);
