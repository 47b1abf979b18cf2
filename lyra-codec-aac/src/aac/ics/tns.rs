// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Temporal noise shaping.

use lyra_core::io::ReadBits;

use std::f32::consts;

use crate::aac::common::*;
use crate::aac::ics::IcsInfo;
use crate::common::ObjectType;

const TNS_MAX_ORDER: usize = 20;
const TNS_MAX_LONG_BANDS: [usize; 12] = [31, 31, 34, 40, 42, 51, 46, 46, 42, 42, 42, 39];
const TNS_MAX_SHORT_BANDS: [usize; 12] = [9, 9, 10, 14, 14, 14, 14, 14, 14, 14, 14, 14];

#[derive(Copy, Clone, Debug)]
struct TnsFilter {
    length: usize,
    /// The transmitted order. Only the first `order.min(max_order)` coefficients are applied.
    order: usize,
    direction: bool,
    coef: [f32; TNS_MAX_ORDER],
}

impl TnsFilter {
    fn new() -> Self {
        Self { length: 0, order: 0, direction: false, coef: [0.0; TNS_MAX_ORDER] }
    }

    fn read<B: ReadBits>(&mut self, bs: &mut B, long_win: bool, coef_res: bool) {
        self.length = bs.read_bits_leq32(if long_win { 6 } else { 4 }) as usize;
        self.order = bs.read_bits_leq32(if long_win { 5 } else { 3 }) as usize;

        if self.order > 0 {
            self.direction = bs.read_bool();

            let coef_compress = bs.read_bool();

            // If coef_res is true, then the transmitted resolution of the filter coefficients
            // is 4 bits, otherwise it's 3.
            let mut coef_res_bits = if coef_res { 4 } else { 3 };

            // If true, the most significant bit of the filter coefficient is not transmitted.
            if coef_compress {
                coef_res_bits -= 1;
            }

            let sign_mask = 1 << (coef_res_bits - 1);
            let neg_mask = !((1 << coef_res_bits) - 1);

            // Derived from `1 << (coef_res_bits - 1)` before compression.
            let fac_base = if coef_res { 8.0 } else { 4.0 };

            let iqfac = (fac_base - 0.5) / consts::FRAC_PI_2;
            let iqfac_m = (fac_base + 0.5) / consts::FRAC_PI_2;

            let mut tmp: [f32; TNS_MAX_ORDER] = [0.0; TNS_MAX_ORDER];

            for i in 0..self.order {
                let val = bs.read_bits_leq32(coef_res_bits) as u8;

                if i >= TNS_MAX_ORDER {
                    continue;
                }

                // Convert to signed integer.
                let c = f32::from(if (val & sign_mask) != 0 {
                    (val | neg_mask) as i8
                }
                else {
                    val as i8
                });

                tmp[i] = (if c >= 0.0 { c / iqfac } else { c / iqfac_m }).sin();
            }

            // Generate LPC coefficients
            let mut b: [f32; TNS_MAX_ORDER + 1] = [0.0; TNS_MAX_ORDER + 1];

            for m in 1..=self.order.min(TNS_MAX_ORDER) {
                for i in 1..m {
                    b[i] = self.coef[i - 1] + tmp[m - 1] * self.coef[m - i - 1];
                }

                self.coef[..(m - 1)].copy_from_slice(&b[1..m]);
                self.coef[m - 1] = tmp[m - 1];
            }
        }
    }
}

/// All-pole filtering of `size` lines starting at `start`, moving down the spectrum if
/// `reverse` is set. The filter state is a doubled ring buffer so that the taps are always a
/// contiguous slice.
fn ar_filter(spec: &mut [f32], start: usize, size: usize, reverse: bool, lpc: &[f32]) {
    let order = lpc.len();

    let mut state = [0f32; 2 * TNS_MAX_ORDER];
    let mut idx = 0;

    for n in 0..size {
        let i = if reverse { start - n } else { start + n };

        let mut y = spec[i];

        for (s, a) in state[idx..idx + order].iter().zip(lpc) {
            y -= s * a;
        }

        idx = if idx == 0 { order - 1 } else { idx - 1 };

        state[idx] = y;
        state[idx + order] = y;

        spec[i] = y;
    }
}

#[derive(Clone, Debug)]
pub struct Tns {
    n_filt: [usize; MAX_WINDOWS],
    filters: [[TnsFilter; 4]; MAX_WINDOWS],
    max_order: usize,
}

impl Tns {
    /// Reads the filters of every window. Orders above the maximum for the window size and object
    /// type are read in full but only applied up-to the maximum.
    pub fn read<B: ReadBits>(bs: &mut B, info: &IcsInfo, object_type: ObjectType) -> Self {
        let max_order = if !info.long_win {
            7
        }
        else if object_type == ObjectType::Main {
            TNS_MAX_ORDER
        }
        else {
            12
        };

        let mut n_filt: [usize; MAX_WINDOWS] = [0; MAX_WINDOWS];
        let mut filters: [[TnsFilter; 4]; MAX_WINDOWS] = [[TnsFilter::new(); 4]; MAX_WINDOWS];

        for w in 0..info.num_windows {
            n_filt[w] = bs.read_bits_leq32(if info.long_win { 2 } else { 1 }) as usize;

            let coef_res = if n_filt[w] != 0 { bs.read_bool() } else { false };

            for filt in 0..n_filt[w] {
                filters[w][filt].read(bs, info.long_win, coef_res);

                if filters[w][filt].order > max_order {
                    log::debug!(
                        "tns order {} above maximum {}",
                        filters[w][filt].order,
                        max_order
                    );
                }
            }
        }

        Tns { n_filt, filters, max_order }
    }

    pub fn synth(&self, info: &IcsInfo, bands: &[usize], rate_idx: usize, coeffs: &mut [f32]) {
        let tns_max_bands = (if info.long_win {
            TNS_MAX_LONG_BANDS[rate_idx]
        }
        else {
            TNS_MAX_SHORT_BANDS[rate_idx]
        })
        .min(info.max_sfb);

        // The length of a window.
        let win_len = bands[bands.len() - 1];

        for w in 0..info.num_windows {
            let mut bottom = bands.len() - 1;

            for f in 0..self.n_filt[w] {
                let filter = &self.filters[w][f];

                let top = bottom;

                bottom = top.saturating_sub(filter.length);

                let order = filter.order.min(self.max_order);

                if order == 0 {
                    continue;
                }

                let start = bands[bottom.min(tns_max_bands)];
                let end = bands[top.min(tns_max_bands)];

                if end <= start {
                    continue;
                }

                let spec = &mut coeffs[w * win_len..(w + 1) * win_len];
                let lpc = &filter.coef[..order];

                if !filter.direction {
                    ar_filter(spec, start, end - start, false, lpc);
                }
                else {
                    ar_filter(spec, end - 1, end - start, true, lpc);
                }
            }
        }
    }
}
