// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use lyra_core::errors::{decode_error, Error, Result};

/// Returns `$err` as a decode error if the condition does not hold.
macro_rules! validate {
    ($a:expr, $err:expr) => {
        if !$a {
            log::error!("check failed at {}:{}", file!(), line!());
            return lyra_core::errors::decode_error($err);
        }
    };
}

pub(crate) use validate;

pub const MAX_WINDOWS: usize = 8;
/// The largest number of scale factor bands in any window.
pub const MAX_SFBS: usize = 51;

pub const MAX_CHANNELS: usize = 64;
pub const MAX_SYNTAX_ELEMENTS: usize = 48;

pub const ONLY_LONG_SEQUENCE: u8 = 0;
pub const LONG_START_SEQUENCE: u8 = 1;
pub const EIGHT_SHORT_SEQUENCE: u8 = 2;
pub const LONG_STOP_SEQUENCE: u8 = 3;

pub const SWB_OFFSET_48K_LONG: [usize; 49 + 1] = [
    0, 4, 8, 12, 16, 20, 24, 28, 32, 36, 40, 48, 56, 64, 72, 80, 88, 96, 108, 120, 132, 144, 160,
    176, 196, 216, 240, 264, 292, 320, 352, 384, 416, 448, 480, 512, 544, 576, 608, 640, 672, 704,
    736, 768, 800, 832, 864, 896, 928, 1024,
];

pub const SWB_OFFSET_48K_SHORT: [usize; 14 + 1] =
    [0, 4, 8, 12, 16, 20, 28, 36, 44, 56, 68, 80, 96, 112, 128];

pub const SWB_OFFSET_32K_LONG: [usize; 51 + 1] = [
    0, 4, 8, 12, 16, 20, 24, 28, 32, 36, 40, 48, 56, 64, 72, 80, 88, 96, 108, 120, 132, 144, 160,
    176, 196, 216, 240, 264, 292, 320, 352, 384, 416, 448, 480, 512, 544, 576, 608, 640, 672, 704,
    736, 768, 800, 832, 864, 896, 928, 960, 992, 1024,
];

pub const SWB_OFFSET_8K_LONG: [usize; 40 + 1] = [
    0, 12, 24, 36, 48, 60, 72, 84, 96, 108, 120, 132, 144, 156, 172, 188, 204, 220, 236, 252, 268,
    288, 308, 328, 348, 372, 396, 420, 448, 476, 508, 544, 580, 620, 664, 712, 764, 820, 880, 944,
    1024,
];

pub const SWB_OFFSET_8K_SHORT: [usize; 15 + 1] =
    [0, 4, 8, 12, 16, 20, 24, 28, 36, 44, 52, 60, 72, 88, 108, 128];

pub const SWB_OFFSET_16K_LONG: [usize; 43 + 1] = [
    0, 8, 16, 24, 32, 40, 48, 56, 64, 72, 80, 88, 100, 112, 124, 136, 148, 160, 172, 184, 196, 212,
    228, 244, 260, 280, 300, 320, 344, 368, 396, 424, 456, 492, 532, 572, 616, 664, 716, 772, 832,
    896, 960, 1024,
];

pub const SWB_OFFSET_16K_SHORT: [usize; 15 + 1] =
    [0, 4, 8, 12, 16, 20, 24, 28, 32, 40, 48, 60, 72, 88, 108, 128];

pub const SWB_OFFSET_24K_LONG: [usize; 47 + 1] = [
    0, 4, 8, 12, 16, 20, 24, 28, 32, 36, 40, 44, 52, 60, 68, 76, 84, 92, 100, 108, 116, 124, 136,
    148, 160, 172, 188, 204, 220, 240, 260, 284, 308, 336, 364, 396, 432, 468, 508, 552, 600, 652,
    704, 768, 832, 896, 960, 1024,
];

pub const SWB_OFFSET_24K_SHORT: [usize; 15 + 1] =
    [0, 4, 8, 12, 16, 20, 24, 28, 36, 44, 52, 64, 76, 92, 108, 128];

pub const SWB_OFFSET_64K_LONG: [usize; 47 + 1] = [
    0, 4, 8, 12, 16, 20, 24, 28, 32, 36, 40, 44, 48, 52, 56, 64, 72, 80, 88, 100, 112, 124, 140,
    156, 172, 192, 216, 240, 268, 304, 344, 384, 424, 464, 504, 544, 584, 624, 664, 704, 744, 784,
    824, 864, 904, 944, 984, 1024,
];

pub const SWB_OFFSET_64K_SHORT: [usize; 12 + 1] =
    [0, 4, 8, 12, 16, 20, 24, 32, 40, 48, 64, 92, 128];

pub const SWB_OFFSET_96K_LONG: [usize; 41 + 1] = [
    0, 4, 8, 12, 16, 20, 24, 28, 32, 36, 40, 44, 48, 52, 56, 64, 72, 80, 88, 96, 108, 120, 132,
    144, 156, 172, 188, 212, 240, 276, 320, 384, 448, 512, 576, 640, 704, 768, 832, 896, 960, 1024,
];

pub const SWB_OFFSET_48K_512: [usize; 36 + 1] = [
    0, 4, 8, 12, 16, 20, 24, 28, 32, 36, 40, 44, 48, 52, 56, 60, 68, 76, 84, 92, 100, 112, 124, 136,
    148, 164, 184, 208, 236, 268, 300, 332, 364, 396, 428, 460, 512,
];

pub const SWB_OFFSET_32K_512: [usize; 37 + 1] = [
    0, 4, 8, 12, 16, 20, 24, 28, 32, 36, 40, 44, 48, 52, 56, 64, 72, 80, 88, 96, 108, 120, 132, 144,
    160, 176, 192, 212, 236, 260, 288, 320, 352, 384, 416, 448, 480, 512,
];

pub const SWB_OFFSET_24K_512: [usize; 31 + 1] = [
    0, 4, 8, 12, 16, 20, 24, 28, 32, 36, 40, 44, 52, 60, 68, 80, 92, 104, 120, 140, 164, 192, 224,
    256, 288, 320, 352, 384, 416, 448, 480, 512,
];

pub const SWB_OFFSET_48K_480: [usize; 35 + 1] = [
    0, 4, 8, 12, 16, 20, 24, 28, 32, 36, 40, 44, 48, 52, 56, 64, 72, 80, 88, 96, 108, 120, 132, 144,
    156, 172, 188, 212, 240, 272, 304, 336, 368, 400, 432, 480,
];

pub const SWB_OFFSET_32K_480: [usize; 37 + 1] = [
    0, 4, 8, 12, 16, 20, 24, 28, 32, 36, 40, 44, 48, 52, 56, 60, 64, 72, 80, 88, 96, 104, 112, 124,
    136, 148, 164, 180, 200, 224, 256, 288, 320, 352, 384, 416, 448, 480,
];

pub const SWB_OFFSET_24K_480: [usize; 30 + 1] = [
    0, 4, 8, 12, 16, 20, 24, 28, 32, 36, 40, 44, 52, 60, 68, 80, 92, 104, 120, 140, 164, 192, 224,
    256, 288, 320, 352, 384, 416, 448, 480,
];

/// Long window band offsets of the 1024 sample frame, by sample rate index.
const LONG_BANDS_1024: [&[usize]; 12] = [
    &SWB_OFFSET_96K_LONG,
    &SWB_OFFSET_96K_LONG,
    &SWB_OFFSET_64K_LONG,
    &SWB_OFFSET_48K_LONG,
    &SWB_OFFSET_48K_LONG,
    &SWB_OFFSET_32K_LONG,
    &SWB_OFFSET_24K_LONG,
    &SWB_OFFSET_24K_LONG,
    &SWB_OFFSET_16K_LONG,
    &SWB_OFFSET_16K_LONG,
    &SWB_OFFSET_16K_LONG,
    &SWB_OFFSET_8K_LONG,
];

const SHORT_BANDS_128: [&[usize]; 12] = [
    &SWB_OFFSET_64K_SHORT,
    &SWB_OFFSET_64K_SHORT,
    &SWB_OFFSET_64K_SHORT,
    &SWB_OFFSET_48K_SHORT,
    &SWB_OFFSET_48K_SHORT,
    &SWB_OFFSET_48K_SHORT,
    &SWB_OFFSET_24K_SHORT,
    &SWB_OFFSET_24K_SHORT,
    &SWB_OFFSET_16K_SHORT,
    &SWB_OFFSET_16K_SHORT,
    &SWB_OFFSET_16K_SHORT,
    &SWB_OFFSET_8K_SHORT,
];

/// The number of long window bands of the 960 sample frame. The band edges are those of the 1024
/// sample frame.
const NUM_SWB_960: [usize; 12] = [40, 40, 45, 49, 49, 49, 46, 46, 42, 42, 42, 40];

/// The number of short window bands of the 120 sample window.
const NUM_SWB_120: [usize; 12] = [12, 12, 12, 14, 14, 14, 15, 15, 15, 15, 15, 15];

/// The last scale factor band that may use Main prediction, by sample rate index.
pub const PRED_SFB_MAX: [usize; 12] = [33, 33, 38, 40, 40, 40, 41, 41, 37, 37, 37, 34];

/// The scale factor band layout of the long and short windows of one frame length.
///
/// Both offset tables start at 0 and end with the window length.
#[derive(Clone, Debug)]
pub struct SubbandInfo {
    pub long_bands: Box<[usize]>,
    /// Empty for low delay frames, which have no short windows.
    pub short_bands: Box<[usize]>,
    pub frame_len: usize,
}

impl SubbandInfo {
    pub fn new(rate_idx: usize, frame_len: usize) -> Result<Self> {
        validate!(rate_idx < LONG_BANDS_1024.len(), Error::ValueNotAllowed);

        let (long, num_long): (&[usize], usize) = match frame_len {
            1024 => (LONG_BANDS_1024[rate_idx], LONG_BANDS_1024[rate_idx].len() - 1),
            960 => (LONG_BANDS_1024[rate_idx], NUM_SWB_960[rate_idx]),
            512 | 480 => {
                let long: &[usize] = match (frame_len, rate_idx) {
                    (512, 3 | 4) => &SWB_OFFSET_48K_512,
                    (512, 5) => &SWB_OFFSET_32K_512,
                    (512, 6 | 7) => &SWB_OFFSET_24K_512,
                    (480, 3 | 4) => &SWB_OFFSET_48K_480,
                    (480, 5) => &SWB_OFFSET_32K_480,
                    (480, 6 | 7) => &SWB_OFFSET_24K_480,
                    _ => {
                        log::error!("no low delay bands for sample rate index {}", rate_idx);
                        return decode_error(Error::ValueNotAllowed);
                    }
                };
                (long, long.len() - 1)
            }
            _ => return decode_error(Error::ValueNotAllowed),
        };

        let long_bands = band_edges(&long[..num_long], frame_len);

        let short = SHORT_BANDS_128[rate_idx];

        let short_bands = match frame_len {
            1024 => band_edges(&short[..short.len() - 1], 128),
            960 => band_edges(&short[..NUM_SWB_120[rate_idx]], 120),
            _ => Box::default(),
        };

        Ok(SubbandInfo { long_bands, short_bands, frame_len })
    }

    /// The number of spectral lines in a short window.
    #[inline(always)]
    pub fn short_len(&self) -> usize {
        self.frame_len / 8
    }

    #[inline(always)]
    pub fn num_long_bands(&self) -> usize {
        self.long_bands.len() - 1
    }

    #[inline(always)]
    pub fn num_short_bands(&self) -> usize {
        self.short_bands.len().saturating_sub(1)
    }
}

fn band_edges(starts: &[usize], len: usize) -> Box<[usize]> {
    starts.iter().copied().chain(std::iter::once(len)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_layout(info: &SubbandInfo) {
        assert_eq!(info.long_bands.first(), Some(&0));
        assert_eq!(info.long_bands.last(), Some(&info.frame_len));
        assert!(info.long_bands.windows(2).all(|w| w[0] < w[1]));
        assert!(info.num_long_bands() <= MAX_SFBS);

        if !info.short_bands.is_empty() {
            assert_eq!(info.short_bands.first(), Some(&0));
            assert_eq!(info.short_bands.last(), Some(&info.short_len()));
            assert!(info.short_bands.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn verify_band_layouts() {
        for rate_idx in 0..12 {
            for frame_len in [1024, 960] {
                let info = SubbandInfo::new(rate_idx, frame_len).unwrap();
                check_layout(&info);
                assert!(info.num_short_bands() > 0);
            }
        }

        for rate_idx in 3..8 {
            for frame_len in [512, 480] {
                let info = SubbandInfo::new(rate_idx, frame_len).unwrap();
                check_layout(&info);
                assert_eq!(info.num_short_bands(), 0);
            }
        }
    }

    #[test]
    fn verify_band_counts() {
        let info = SubbandInfo::new(4, 1024).unwrap();
        assert_eq!(info.num_long_bands(), 49);
        assert_eq!(info.num_short_bands(), 14);

        let info = SubbandInfo::new(5, 960).unwrap();
        assert_eq!(info.num_long_bands(), 49);
        assert_eq!(info.long_bands[48], 928);
        assert_eq!(info.num_short_bands(), 14);

        let info = SubbandInfo::new(3, 512).unwrap();
        assert_eq!(info.num_long_bands(), 36);

        let info = SubbandInfo::new(6, 480).unwrap();
        assert_eq!(info.num_long_bands(), 30);
    }

    #[test]
    fn verify_invalid_layouts() {
        assert_eq!(SubbandInfo::new(12, 1024).err(), Some(Error::ValueNotAllowed));
        assert_eq!(SubbandInfo::new(0, 512).err(), Some(Error::ValueNotAllowed));
        assert_eq!(SubbandInfo::new(4, 256).err(), Some(Error::ValueNotAllowed));
    }
}
