// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The individual channel stream: side information and quantized spectral data of one channel.

use lyra_core::errors::{unsupported_error, Error, Result};
use lyra_core::io::{BitCursor, ReadBits};

use crate::aac::codebooks::Codebook;
use crate::aac::common::*;
use crate::aac::hcr;
use crate::aac::huffman::decode_spectral;
use crate::aac::rvlc::RvlcInfo;
use crate::common::{DecoderConfig, ObjectType};

use lazy_static::lazy_static;
use log::debug;

pub mod pred;
pub mod pulse;
pub mod scalefactor;
pub mod section;
pub mod tns;

use pred::PredictorSideInfo;
use pulse::Pulse;
use scalefactor::{read_scale_factors, ScaleFactors};
use section::Sections;
use tns::Tns;

/// The largest quantized magnitude that may be dequantized.
const MAX_QUANT: usize = 8192;

lazy_static! {
    /// Pre-computed table of y = x^(4/3).
    static ref POW43_TABLE: Box<[f32]> = {
        (0..MAX_QUANT).map(|i| f32::powf(i as f32, 4.0 / 3.0)).collect()
    };
}

/// The gain of a scale factor, including the normalization of the output to [-1, 1].
#[inline(always)]
pub fn get_scale(scale_factor: i16) -> f32 {
    2.0f32.powf(0.25 * f32::from(scale_factor - 56))
}

/// Stream parameters shared by every channel stream of a decoder.
#[derive(Clone, Debug)]
pub struct StreamParams {
    pub object_type: ObjectType,
    pub rate_idx: usize,
    pub channel_configuration: u8,
    pub sbinfo: SubbandInfo,
    pub section_resilience: bool,
    pub scalefactor_resilience: bool,
    pub spectral_resilience: bool,
}

impl StreamParams {
    pub fn new(config: &DecoderConfig) -> Result<Self> {
        let rate_idx = usize::from(config.sample_rate_index);

        Ok(StreamParams {
            object_type: config.object_type,
            rate_idx,
            channel_configuration: config.channel_configuration,
            sbinfo: SubbandInfo::new(rate_idx, config.frame_length())?,
            section_resilience: config.has_section_resilience(),
            scalefactor_resilience: config.has_scalefactor_resilience(),
            spectral_resilience: config.has_spectral_resilience(),
        })
    }
}

/// The window layout of a channel stream.
#[derive(Clone, Debug)]
pub struct IcsInfo {
    pub window_sequence: u8,
    pub window_shape: bool,
    pub long_win: bool,
    pub num_windows: usize,
    pub num_window_groups: usize,
    pub window_group_len: [usize; MAX_WINDOWS],
    pub max_sfb: usize,
    /// The number of scale factor bands of the window size.
    pub num_swb: usize,
    /// Main profile predictor side information, if predictor data is present.
    pub pred: Option<PredictorSideInfo>,
}

impl Default for IcsInfo {
    fn default() -> Self {
        let mut window_group_len = [0; MAX_WINDOWS];
        window_group_len[0] = 1;

        IcsInfo {
            window_sequence: ONLY_LONG_SEQUENCE,
            window_shape: false,
            long_win: true,
            num_windows: 1,
            num_window_groups: 1,
            window_group_len,
            max_sfb: 0,
            num_swb: 0,
            pred: None,
        }
    }
}

impl IcsInfo {
    pub fn read<B: ReadBits>(bs: &mut B, params: &StreamParams) -> Result<Self> {
        let mut info = IcsInfo::read_window(bs, params)?;

        if info.long_win {
            info.read_prediction(bs, params)?;
        }

        Ok(info)
    }

    /// Reads the window sequence, shape, grouping, and the number of transmitted bands.
    pub fn read_window<B: ReadBits>(bs: &mut B, params: &StreamParams) -> Result<Self> {
        validate!(!bs.read_bool(), Error::ValueNotAllowed);

        let mut info = IcsInfo::default();

        info.window_sequence = bs.read_bits_leq32(2) as u8;
        info.window_shape = bs.read_bool();

        if params.object_type == ObjectType::Ld {
            validate!(info.window_sequence == ONLY_LONG_SEQUENCE, Error::ValueNotAllowed);
        }

        if info.window_sequence == EIGHT_SHORT_SEQUENCE {
            info.long_win = false;
            info.num_windows = 8;
            info.num_swb = params.sbinfo.num_short_bands();
            info.max_sfb = bs.read_bits_leq32(4) as usize;

            let grouping = bs.read_bits_leq32(7);

            for i in 0..MAX_WINDOWS - 1 {
                if grouping & (1 << (6 - i)) != 0 {
                    info.window_group_len[info.num_window_groups - 1] += 1;
                }
                else {
                    info.window_group_len[info.num_window_groups] = 1;
                    info.num_window_groups += 1;
                }
            }
        }
        else {
            info.num_swb = params.sbinfo.num_long_bands();
            info.max_sfb = bs.read_bits_leq32(6) as usize;
        }

        validate!(info.max_sfb <= info.num_swb, Error::MaxSfbExceeded);

        Ok(info)
    }

    /// Reads the predictor data of a long window.
    pub fn read_prediction<B: ReadBits>(
        &mut self,
        bs: &mut B,
        params: &StreamParams,
    ) -> Result<()> {
        if !bs.read_bool() {
            self.pred = None;
            return Ok(());
        }

        if params.object_type != ObjectType::Main {
            // Long term prediction.
            log::error!("long term prediction is not supported");
            return unsupported_error(Error::LtpUnavailable);
        }

        let limit = self.max_sfb.min(PRED_SFB_MAX[params.rate_idx]);

        self.pred = Some(PredictorSideInfo::read(bs, limit));

        Ok(())
    }

    /// Gets the band offsets of the window size.
    pub fn bands<'a>(&self, params: &'a StreamParams) -> &'a [usize] {
        if self.long_win {
            &params.sbinfo.long_bands
        }
        else {
            &params.sbinfo.short_bands
        }
    }

    /// Logs window sequences that may not follow the previous one.
    pub fn check_transition(&self, prev_window_sequence: u8) {
        let valid = match prev_window_sequence {
            ONLY_LONG_SEQUENCE | LONG_STOP_SEQUENCE => {
                matches!(self.window_sequence, ONLY_LONG_SEQUENCE | LONG_START_SEQUENCE)
            }
            _ => matches!(self.window_sequence, EIGHT_SHORT_SEQUENCE | LONG_STOP_SEQUENCE),
        };

        if !valid {
            debug!(
                "window sequence {} after {} is invalid",
                self.window_sequence, prev_window_sequence
            );
        }
    }
}

/// A decoded individual channel stream.
#[derive(Clone)]
pub struct Ics {
    pub global_gain: u8,
    pub info: IcsInfo,
    pub sections: Sections,
    pub scale_factors: ScaleFactors,
    pulse: Option<Pulse>,
    pub tns_data_present: bool,
    tns: Option<Tns>,
    rvlc: Option<RvlcInfo>,
    pub reordered_spectral_data_len: u32,
    pub longest_codeword_len: u32,
}

impl Default for Ics {
    fn default() -> Self {
        Ics {
            global_gain: 0,
            info: Default::default(),
            sections: Default::default(),
            scale_factors: [[0; MAX_SFBS]; MAX_WINDOWS],
            pulse: None,
            tns_data_present: false,
            tns: None,
            rvlc: None,
            reordered_spectral_data_len: 0,
            longest_codeword_len: 0,
        }
    }
}

impl Ics {
    /// Instantiate a channel stream that shares the window layout of a common window.
    pub fn with_info(info: &IcsInfo) -> Self {
        Ics { info: info.clone(), ..Default::default() }
    }

    /// Reads an individual channel stream, leaving the quantized spectrum in `quant`. If the
    /// channel uses a common window, `self.info` must already hold it.
    pub fn read(
        &mut self,
        bs: &mut BitCursor<'_>,
        params: &StreamParams,
        common_window: bool,
        quant: &mut [i32],
    ) -> Result<()> {
        self.read_side_info(bs, params, common_window, false)?;

        if params.object_type.is_error_resilient() && self.tns_data_present {
            self.read_tns_data(bs, params);
        }

        self.read_spectral_data(bs, params, quant)
    }

    /// Reads the side information of the channel stream. Scalable (DRM) streams carry no window
    /// layout, pulse, TNS, or gain control fields here.
    pub fn read_side_info(
        &mut self,
        bs: &mut BitCursor<'_>,
        params: &StreamParams,
        common_window: bool,
        scalable: bool,
    ) -> Result<()> {
        self.global_gain = bs.read_bits_leq32(8) as u8;

        if !common_window && !scalable {
            self.info = IcsInfo::read(bs, params)?;
        }

        self.sections = Sections::read(bs, &self.info, params)?;

        if params.scalefactor_resilience {
            self.rvlc = Some(RvlcInfo::read(bs, &self.info, self.sections.noise_used)?);
        }
        else {
            self.scale_factors =
                read_scale_factors(bs, &self.info, &self.sections, self.global_gain)?;
        }

        if !scalable {
            self.pulse = Pulse::read(bs, self.info.num_swb)?;

            validate!(self.pulse.is_none() || self.info.long_win, Error::PulseInShortBlock);

            self.tns_data_present = bs.read_bool();

            if self.tns_data_present && !params.object_type.is_error_resilient() {
                self.read_tns_data(bs, params);
            }

            // Gain control.
            if bs.read_bool() {
                log::error!("gain control is not supported");
                return unsupported_error(Error::GainControlUnsupported);
            }
        }

        if params.spectral_resilience {
            let max_len = if params.channel_configuration == 2 { 6144 } else { 12288 };

            self.reordered_spectral_data_len = bs.read_bits_leq32(14).min(max_len);
            self.longest_codeword_len = bs.read_bits_leq32(6).min(49);
        }

        if let Some(rvlc) = &self.rvlc {
            self.scale_factors =
                rvlc.decode(bs, &self.info, &self.sections, self.global_gain)?;
        }

        Ok(())
    }

    pub fn read_tns_data<B: ReadBits>(&mut self, bs: &mut B, params: &StreamParams) {
        self.tns = Some(Tns::read(bs, &self.info, params.object_type));
    }

    /// Reads the quantized spectrum into `quant` and applies the pulse data.
    pub fn read_spectral_data(
        &mut self,
        bs: &mut BitCursor<'_>,
        params: &StreamParams,
        quant: &mut [i32],
    ) -> Result<()> {
        quant.fill(0);

        if params.spectral_resilience {
            hcr::reordered_spectral_data(bs, self, params, quant)?;
        }
        else {
            self.read_plain_spectral_data(bs, params, quant)?;
        }

        if let Some(pulse) = &self.pulse {
            pulse.apply(self.info.bands(params), quant)?;
        }

        Ok(())
    }

    fn read_plain_spectral_data(
        &self,
        bs: &mut BitCursor<'_>,
        params: &StreamParams,
        quant: &mut [i32],
    ) -> Result<()> {
        let bands = self.info.bands(params);
        let nshort = params.sbinfo.short_len();

        let mut win = 0;

        for g in 0..self.info.num_window_groups {
            let glen = self.info.window_group_len[g];

            // The bands of a group are interleaved, each band holds its lines of every window.
            let base = win * nshort;

            for i in 0..self.sections.num_sec[g] {
                let cb = self.sections.sect_cb[g][i];

                if !cb.is_spectral() {
                    continue;
                }

                let inc = if cb.is_quad() { 4 } else { 2 };

                let start = base + glen * bands[self.sections.sect_start[g][i]];
                let end = base + glen * bands[self.sections.sect_end[g][i]];

                for k in (start..end).step_by(inc) {
                    let complete = decode_spectral(cb, bs, &mut quant[k..k + inc])?;
                    validate!(complete, Error::SpectralHuffman);
                }
            }

            win += glen;
        }

        validate!(!bs.has_error(), Error::InputTooSmall);

        Ok(())
    }

    /// Reorders and dequantizes the quantized spectrum into the spectral lines of each window.
    pub fn dequantize(&self, params: &StreamParams, quant: &[i32], spec: &mut [f32]) -> Result<()> {
        let bands = self.info.bands(params);
        let nshort = params.sbinfo.short_len();

        let mut k = 0;
        let mut gindex = 0;
        let mut overflow = false;

        for g in 0..self.info.num_window_groups {
            let glen = self.info.window_group_len[g];

            for sfb in 0..self.info.num_swb {
                let width = bands[sfb + 1] - bands[sfb];
                let scale = get_scale(self.scale_factors[g][sfb] - 100);

                for win in 0..glen {
                    let base = gindex + win * nshort + bands[sfb];

                    for (x, &q) in spec[base..base + width].iter_mut().zip(&quant[k..k + width]) {
                        let mag = q.unsigned_abs() as usize;

                        *x = if mag < MAX_QUANT {
                            let val = POW43_TABLE[mag] * scale;
                            if q < 0 {
                                -val
                            }
                            else {
                                val
                            }
                        }
                        else {
                            overflow = true;
                            0.0
                        };
                    }

                    k += width;
                }
            }

            gindex += glen * nshort;
        }

        validate!(!overflow, Error::QuantizedValueRange);

        Ok(())
    }

    pub fn tns_synth(&self, params: &StreamParams, spec: &mut [f32]) {
        if let Some(tns) = &self.tns {
            tns.synth(&self.info, self.info.bands(params), params.rate_idx, spec);
        }
    }

    #[inline(always)]
    pub fn codebook(&self, g: usize, sfb: usize) -> Codebook {
        self.sections.sfb_cb[g][sfb]
    }

    /// Turns off the predictor of a band for this frame.
    pub fn disable_prediction(&mut self, sfb: usize) {
        if let Some(pred) = &mut self.info.pred {
            pred.used[sfb] = false;
        }
    }
}
