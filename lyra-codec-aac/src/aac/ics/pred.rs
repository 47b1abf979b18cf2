// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Backward adaptive prediction of the Main profile.
//!
//! Every spectral line of a long window has a second order lattice predictor. The predictor
//! state is kept at 16 bit precision: the upper half of the IEEE-754 single precision value.

use lyra_core::io::ReadBits;

use crate::aac::codebooks::Codebook;
use crate::aac::common::*;
use crate::aac::ics::section::Sections;
use crate::aac::ics::IcsInfo;

const ALPHA: f32 = 0.90625;
const A: f32 = 0.953125;
const B: f32 = 0.953125;

/// The distance between the lines reset by one predictor reset group.
const RESET_GROUP_STRIDE: usize = 30;

/// Predictor side information of a long window.
#[derive(Clone, Debug)]
pub struct PredictorSideInfo {
    /// The reset group, or 0 if no reset was signalled.
    pub reset_group: u8,
    pub used: [bool; MAX_SFBS],
}

impl PredictorSideInfo {
    pub fn read<B: ReadBits>(bs: &mut B, limit: usize) -> Self {
        let reset_group = if bs.read_bool() { bs.read_bits_leq32(5) as u8 } else { 0 };

        let mut used = [false; MAX_SFBS];

        for u in used[..limit].iter_mut() {
            *u = bs.read_bool();
        }

        PredictorSideInfo { reset_group, used }
    }
}

/// The state of the predictor of one spectral line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PredState {
    r: [u16; 2],
    cor: [u16; 2],
    var: [u16; 2],
}

impl Default for PredState {
    fn default() -> Self {
        // The variance resets to 1.0.
        PredState { r: [0; 2], cor: [0; 2], var: [0x3f80; 2] }
    }
}

impl PredState {
    pub fn reset(&mut self) {
        *self = Default::default();
    }
}

#[inline(always)]
fn quant_pred(x: f32) -> u16 {
    (x.to_bits() >> 16) as u16
}

#[inline(always)]
fn inv_quant_pred(q: u16) -> f32 {
    f32::from_bits(u32::from(q) << 16)
}

/// Rounds to the 16 bit precision of the predictor state, half a unit in the last place away from
/// zero.
fn flt_round(x: f32) -> f32 {
    let bits = x.to_bits();

    let truncated = bits & 0xffff_0000;

    if bits & 0x0000_8000 != 0 {
        let exp = bits & 0xff80_0000;
        f32::from_bits(truncated) + f32::from_bits(exp | 0x0001_0000) - f32::from_bits(exp)
    }
    else {
        f32::from_bits(truncated)
    }
}

/// The lattice coefficient for a correlation and variance pair, or 0 if the variance is too small.
#[inline(always)]
fn lattice_coef(cor: u16, var: u16) -> f32 {
    if (var >> 7) >= 128 {
        inv_quant_pred(cor) * B / inv_quant_pred(var)
    }
    else {
        0.0
    }
}

/// Runs the predictor of one line. If `used`, the prediction is added to the line.
fn ic_predict(state: &mut PredState, x: &mut f32, used: bool) {
    let r = [inv_quant_pred(state.r[0]), inv_quant_pred(state.r[1])];
    let mut cor = [inv_quant_pred(state.cor[0]), inv_quant_pred(state.cor[1])];
    let mut var = [inv_quant_pred(state.var[0]), inv_quant_pred(state.var[1])];

    let k1 = lattice_coef(state.cor[0], state.var[0]);

    if used {
        let k2 = lattice_coef(state.cor[1], state.var[1]);

        *x += flt_round(k1 * r[0] + k2 * r[1]);
    }

    let e0 = *x;
    let e1 = e0 - k1 * r[0];
    let dr1 = k1 * e0;

    var[0] = ALPHA * var[0] + 0.5 * (r[0] * r[0] + e0 * e0);
    cor[0] = ALPHA * cor[0] + r[0] * e0;
    var[1] = ALPHA * var[1] + 0.5 * (r[1] * r[1] + e1 * e1);
    cor[1] = ALPHA * cor[1] + r[1] * e1;

    let r1 = A * (r[0] - dr1);
    let r0 = A * e0;

    state.r = [quant_pred(r0), quant_pred(r1)];
    state.cor = [quant_pred(cor[0]), quant_pred(cor[1])];
    state.var = [quant_pred(var[0]), quant_pred(var[1])];
}

pub fn reset_all_predictors(states: &mut [PredState]) {
    states.iter_mut().for_each(PredState::reset);
}

/// Applies prediction to the spectrum of one channel and updates the predictor states.
pub fn ic_prediction(
    info: &IcsInfo,
    bands: &[usize],
    rate_idx: usize,
    spec: &mut [f32],
    states: &mut [PredState],
) {
    if !info.long_win {
        reset_all_predictors(states);
        return;
    }

    let swb_offset_max = bands[bands.len() - 1];

    for sfb in 0..PRED_SFB_MAX[rate_idx].min(info.num_swb) {
        let low = bands[sfb];
        let high = bands[sfb + 1].min(swb_offset_max);

        let used = info.pred.as_ref().map_or(false, |pred| pred.used[sfb]);

        for (state, x) in states[low..high].iter_mut().zip(&mut spec[low..high]) {
            ic_predict(state, x, used);
        }
    }

    if let Some(pred) = &info.pred {
        if pred.reset_group > 0 {
            let first = usize::from(pred.reset_group) - 1;

            for state in states.iter_mut().skip(first).step_by(RESET_GROUP_STRIDE) {
                state.reset();
            }
        }
    }
}

/// Resets the predictors of the lines in noise substituted bands.
pub fn pns_reset_pred_state(
    info: &IcsInfo,
    sections: &Sections,
    bands: &[usize],
    states: &mut [PredState],
) {
    if !info.long_win {
        return;
    }

    let swb_offset_max = bands[bands.len() - 1];

    for sfb in 0..info.max_sfb {
        if sections.sfb_cb[0][sfb] == Codebook::Noise {
            let low = bands[sfb];
            let high = bands[sfb + 1].min(swb_offset_max);

            states[low..high].iter_mut().for_each(PredState::reset);
        }
    }
}
