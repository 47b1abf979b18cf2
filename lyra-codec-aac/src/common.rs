// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::fmt;

use lyra_core::errors::{decode_error, unsupported_error, Error, Result};

/// The MPEG-4 audio object types known to the decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectType {
    Main,
    Lc,
    Ssr,
    Ltp,
    ErLc,
    ErLtp,
    Ld,
    /// Error resilient LC as carried by Digital Radio Mondiale.
    DrmErLc,
}

impl ObjectType {
    /// Gets the object type for an audio object type index.
    pub fn from_index(idx: u8) -> Option<ObjectType> {
        let object_type = match idx {
            1 => ObjectType::Main,
            2 => ObjectType::Lc,
            3 => ObjectType::Ssr,
            4 => ObjectType::Ltp,
            17 => ObjectType::ErLc,
            19 => ObjectType::ErLtp,
            23 => ObjectType::Ld,
            27 => ObjectType::DrmErLc,
            _ => return None,
        };
        Some(object_type)
    }

    pub fn index(&self) -> u8 {
        match *self {
            ObjectType::Main => 1,
            ObjectType::Lc => 2,
            ObjectType::Ssr => 3,
            ObjectType::Ltp => 4,
            ObjectType::ErLc => 17,
            ObjectType::ErLtp => 19,
            ObjectType::Ld => 23,
            ObjectType::DrmErLc => 27,
        }
    }

    /// Returns true for the error resilient object types.
    pub fn is_error_resilient(&self) -> bool {
        self.index() >= 17
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            ObjectType::Main => "AAC Main",
            ObjectType::Lc => "AAC LC",
            ObjectType::Ssr => "AAC SSR",
            ObjectType::Ltp => "AAC LTP",
            ObjectType::ErLc => "ER AAC LC",
            ObjectType::ErLtp => "ER AAC LTP",
            ObjectType::Ld => "ER AAC LD",
            ObjectType::DrmErLc => "DRM ER AAC LC",
        };
        f.write_str(name)
    }
}

/// Sample rates indexed by the sampling frequency index.
pub const AAC_SAMPLE_RATES: [u32; 12] =
    [96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000];

/// The stream parameters the decoder is configured with.
///
/// These are normally taken from an audio specific configuration or a transport header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderConfig {
    pub object_type: ObjectType,
    pub sample_rate_index: u8,
    /// The channel configuration, or 0 if the channels are described by the elements in the
    /// stream.
    pub channel_configuration: u8,
    /// Selects the shorter frame length, 960 instead of 1024, or 480 instead of 512 for LD.
    pub frame_length_flag: bool,
    pub section_data_resilience: bool,
    pub scalefactor_data_resilience: bool,
    pub spectral_data_resilience: bool,
}

impl DecoderConfig {
    pub fn new(object_type: ObjectType, sample_rate_index: u8, channel_configuration: u8) -> Self {
        DecoderConfig {
            object_type,
            sample_rate_index,
            channel_configuration,
            frame_length_flag: false,
            section_data_resilience: false,
            scalefactor_data_resilience: false,
            spectral_data_resilience: false,
        }
    }

    pub fn with_frame_length_flag(mut self, flag: bool) -> Self {
        self.frame_length_flag = flag;
        self
    }

    /// Sets the section, scale factor, and spectral data resilience flags.
    pub fn with_resilience(mut self, section: bool, scalefactor: bool, spectral: bool) -> Self {
        self.section_data_resilience = section;
        self.scalefactor_data_resilience = scalefactor;
        self.spectral_data_resilience = spectral;
        self
    }

    /// Gets the number of samples per channel in one frame.
    pub fn frame_length(&self) -> usize {
        match self.object_type {
            ObjectType::Ld if self.frame_length_flag => 480,
            ObjectType::Ld => 512,
            ObjectType::DrmErLc => 960,
            _ if self.frame_length_flag => 960,
            _ => 1024,
        }
    }

    /// Gets the sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        AAC_SAMPLE_RATES.get(usize::from(self.sample_rate_index)).copied().unwrap_or(0)
    }

    // DRM streams always use every resilience tool.

    pub(crate) fn has_section_resilience(&self) -> bool {
        self.object_type == ObjectType::DrmErLc
            || (self.object_type.is_error_resilient() && self.section_data_resilience)
    }

    pub(crate) fn has_scalefactor_resilience(&self) -> bool {
        self.object_type == ObjectType::DrmErLc
            || (self.object_type.is_error_resilient() && self.scalefactor_data_resilience)
    }

    pub(crate) fn has_spectral_resilience(&self) -> bool {
        self.object_type == ObjectType::DrmErLc
            || (self.object_type.is_error_resilient() && self.spectral_data_resilience)
    }

    /// Checks that the decoder supports the configuration.
    pub fn validate(&self) -> Result<()> {
        match self.object_type {
            ObjectType::Ltp | ObjectType::ErLtp => {
                return unsupported_error(Error::LtpUnavailable);
            }
            ObjectType::Ssr => return unsupported_error(Error::GainControlUnsupported),
            _ => (),
        }

        if usize::from(self.sample_rate_index) >= AAC_SAMPLE_RATES.len() {
            return decode_error(Error::ValueNotAllowed);
        }

        if self.channel_configuration > 7 {
            return decode_error(Error::InvalidChannelCount);
        }

        if self.object_type.is_error_resilient() && self.channel_configuration == 0 {
            return decode_error(Error::ErChannelConfig);
        }

        Ok(())
    }
}
