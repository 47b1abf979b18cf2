// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Single channel, channel pair, and low frequency effects elements.

use lyra_core::checksum::check_crc8;
use lyra_core::errors::{unsupported_error, Error, Result};
use lyra_core::io::{BitCursor, ReadBits};

use crate::aac::common::*;
use crate::aac::filterbank::Filterbank;
use crate::aac::ics::pred::{ic_prediction, pns_reset_pred_state, reset_all_predictors, PredState};
use crate::aac::ics::{Ics, IcsInfo, StreamParams};
use crate::aac::pns::{pns_decode, pns_decode_pair, NoiseGeneratorState};
use crate::aac::stereo::{is_decode, ms_decode, MsMask};
use crate::common::ObjectType;

/// The state of an output channel carried from one frame to the next.
pub struct ChannelState {
    overlap: Box<[f32]>,
    window_shape: bool,
    window_sequence: u8,
    pred: Box<[PredState]>,
}

impl ChannelState {
    pub fn new(frame_len: usize) -> Self {
        ChannelState {
            overlap: vec![0.0; frame_len].into_boxed_slice(),
            window_shape: false,
            window_sequence: ONLY_LONG_SEQUENCE,
            pred: vec![PredState::default(); frame_len].into_boxed_slice(),
        }
    }

    /// Clears the overlap, window history, and predictors.
    pub fn reset(&mut self) {
        self.overlap.fill(0.0);
        self.window_shape = false;
        self.window_sequence = ONLY_LONG_SEQUENCE;
        reset_all_predictors(&mut self.pred);
    }

    /// Clears the overlap and predictors after a decode error. The window history is kept.
    pub fn conceal(&mut self) {
        self.overlap.fill(0.0);
        reset_all_predictors(&mut self.pred);
    }
}

/// Decodes the channel streams of one element at a time.
///
/// Reading leaves the quantized spectra of the element's channels in the decoder. Synthesis then
/// reconstructs, joint stereo decodes, and filters them into output samples.
pub struct ElementDecoder {
    ics: Box<[Ics; 2]>,
    ms: MsMask,
    quant: [Box<[i32]>; 2],
    spec: [Box<[f32]>; 2],
}

impl ElementDecoder {
    pub fn new(frame_len: usize) -> Self {
        ElementDecoder {
            ics: Box::default(),
            ms: MsMask::default(),
            quant: [
                vec![0; frame_len].into_boxed_slice(),
                vec![0; frame_len].into_boxed_slice(),
            ],
            spec: [
                vec![0.0; frame_len].into_boxed_slice(),
                vec![0.0; frame_len].into_boxed_slice(),
            ],
        }
    }

    /// Reads a single channel or low frequency effects element.
    pub fn read_single(&mut self, bs: &mut BitCursor<'_>, params: &StreamParams) -> Result<()> {
        self.ics[0] = Ics::default();
        self.ics[0].read(bs, params, false, &mut self.quant[0])?;

        // Intensity stereo needs a channel pair.
        validate!(!self.ics[0].sections.is_used, Error::ValueNotAllowed);

        Ok(())
    }

    /// Reads a channel pair element.
    pub fn read_pair(&mut self, bs: &mut BitCursor<'_>, params: &StreamParams) -> Result<()> {
        let common_window = bs.read_bool();

        if common_window {
            let info = IcsInfo::read(bs, params)?;

            self.ms = MsMask::read(bs, &info)?;

            self.ics[0] = Ics::with_info(&info);
            self.ics[1] = Ics::with_info(&info);
        }
        else {
            self.ms = MsMask::default();

            self.ics[0] = Ics::default();
            self.ics[1] = Ics::default();
        }

        let [ics0, ics1] = &mut *self.ics;
        let [quant0, quant1] = &mut self.quant;

        ics0.read(bs, params, common_window, quant0)?;
        ics1.read(bs, params, common_window, quant1)?;

        Ok(())
    }

    /// Reads the single element of a DRM frame. A stereo frame carries a channel pair.
    ///
    /// The frame starts with a CRC over the window layout and side information of all channels.
    /// The spectral data of all channels follows the CRC protected part.
    pub fn read_drm(
        &mut self,
        bs: &mut BitCursor<'_>,
        params: &StreamParams,
        stereo: bool,
    ) -> Result<()> {
        // The CRC is checked once the protected part is read.
        bs.ignore_bits(8);

        let info = IcsInfo::read_window(bs, params)?;

        self.ms = if stereo { MsMask::read(bs, &info)? } else { MsMask::default() };

        let num_channels = if stereo { 2 } else { 1 };

        for ics in self.ics[..num_channels].iter_mut() {
            *ics = Ics::with_info(&info);

            ics.tns_data_present = bs.read_bool();

            if bs.read_bool() {
                log::error!("long term prediction is not supported");
                return unsupported_error(Error::LtpUnavailable);
            }

            ics.read_side_info(bs, params, true, true)?;
        }

        for ics in self.ics[..num_channels].iter_mut() {
            if ics.tns_data_present {
                ics.read_tns_data(bs, params);
            }
        }

        validate!(!bs.has_error(), Error::InputTooSmall);

        let protected_len = bs.processed_bits() - 8;
        check_crc8(bs, protected_len)?;

        for (ics, quant) in self.ics[..num_channels].iter_mut().zip(self.quant.iter_mut()) {
            ics.read_spectral_data(bs, params, quant)?;
        }

        if !stereo {
            validate!(!self.ics[0].sections.is_used, Error::ValueNotAllowed);
        }

        Ok(())
    }

    /// Reconstructs the channel read by [`ElementDecoder::read_single`] into `out`.
    pub fn synth_single(
        &mut self,
        params: &StreamParams,
        filterbank: &mut Filterbank,
        rng: &mut NoiseGeneratorState,
        state: &mut ChannelState,
        out: &mut [f32],
    ) -> Result<()> {
        let ics = &mut self.ics[0];
        let spec = &mut self.spec[0];

        ics.dequantize(params, &self.quant[0], spec)?;

        pns_decode(ics, params, spec, rng);

        reconstruct(ics, params, filterbank, state, spec, out);

        Ok(())
    }

    /// Reconstructs the channel pair read by [`ElementDecoder::read_pair`] into `out_left` and
    /// `out_right`.
    #[allow(clippy::too_many_arguments)]
    pub fn synth_pair(
        &mut self,
        params: &StreamParams,
        filterbank: &mut Filterbank,
        rng: &mut NoiseGeneratorState,
        state_left: &mut ChannelState,
        state_right: &mut ChannelState,
        out_left: &mut [f32],
        out_right: &mut [f32],
    ) -> Result<()> {
        let [ics0, ics1] = &mut *self.ics;
        let [spec0, spec1] = &mut self.spec;

        ics0.dequantize(params, &self.quant[0], spec0)?;
        ics1.dequantize(params, &self.quant[1], spec1)?;

        // Correlated noise is only signalled with a mid/side mask.
        if self.ms.present != 0 {
            pns_decode_pair(ics0, ics1, &self.ms, params, spec0, spec1, rng);
        }
        else {
            pns_decode(ics0, params, spec0, rng);
            pns_decode(ics1, params, spec1, rng);
        }

        ms_decode(ics0, ics1, &self.ms, params, spec0, spec1);
        is_decode(ics0, ics1, &self.ms, params, spec0, spec1);

        reconstruct(ics0, params, filterbank, state_left, spec0, out_left);
        reconstruct(ics1, params, filterbank, state_right, spec1, out_right);

        Ok(())
    }
}

/// Runs prediction, TNS, and the filterbank over the spectrum of one channel.
fn reconstruct(
    ics: &Ics,
    params: &StreamParams,
    filterbank: &mut Filterbank,
    state: &mut ChannelState,
    spec: &mut [f32],
    out: &mut [f32],
) {
    let info = &ics.info;

    info.check_transition(state.window_sequence);

    if params.object_type == ObjectType::Main {
        let bands = info.bands(params);

        ic_prediction(info, bands, params.rate_idx, spec, &mut state.pred);
        pns_reset_pred_state(info, &ics.sections, bands, &mut state.pred);
    }

    ics.tns_synth(params, spec);

    filterbank.synth(
        spec,
        &mut state.overlap,
        info.window_sequence,
        info.window_shape,
        state.window_shape,
        out,
    );

    state.window_shape = info.window_shape;
    state.window_sequence = info.window_sequence;
}
