// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Joint stereo decoding of channel pairs: mid/side (M/S) and intensity stereo.

use lyra_core::errors::{decode_error, Error, Result};
use lyra_core::io::ReadBits;

use crate::aac::common::*;
use crate::aac::ics::{Ics, IcsInfo, StreamParams};

/// The mid/side stereo mask of a channel pair.
#[derive(Clone)]
pub struct MsMask {
    /// 0 if M/S is never used, 1 if signalled per band, 2 if used for every band.
    pub present: u8,
    pub used: [[bool; MAX_SFBS]; MAX_WINDOWS],
}

impl Default for MsMask {
    fn default() -> Self {
        MsMask { present: 0, used: [[false; MAX_SFBS]; MAX_WINDOWS] }
    }
}

impl MsMask {
    pub fn read<B: ReadBits>(bs: &mut B, info: &IcsInfo) -> Result<Self> {
        let mut mask = MsMask { present: bs.read_bits_leq32(2) as u8, ..Default::default() };

        match mask.present {
            0 | 2 => (),
            1 => {
                for g in 0..info.num_window_groups {
                    for sfb in 0..info.max_sfb {
                        mask.used[g][sfb] = bs.read_bool();
                    }
                }
            }
            _ => {
                log::debug!("reserved mid/side mask");
                return decode_error(Error::ValueNotAllowed);
            }
        }

        Ok(mask)
    }

    /// Checks if M/S is signalled for a band.
    #[inline(always)]
    pub fn is_set(&self, g: usize, sfb: usize) -> bool {
        self.present == 2 || (self.present == 1 && self.used[g][sfb])
    }

    /// Gets the sign intensity stereo is inverted by in a band.
    #[inline(always)]
    fn intensity_invert(&self, g: usize, sfb: usize) -> f32 {
        if self.present == 1 && self.used[g][sfb] {
            -1.0
        }
        else {
            1.0
        }
    }
}

/// Calls `f` with the group, band, and spectral line range of every coded band of every window.
fn for_each_band<F>(info: &IcsInfo, params: &StreamParams, mut f: F)
where
    F: FnMut(usize, usize, usize, usize),
{
    let bands = info.bands(params);
    let nshort = params.sbinfo.short_len();
    let swb_offset_max = bands[bands.len() - 1];

    let mut win = 0;

    for g in 0..info.num_window_groups {
        for _ in 0..info.window_group_len[g] {
            let base = win * nshort;

            for sfb in 0..info.max_sfb {
                let begin = base + bands[sfb].min(swb_offset_max);
                let end = base + bands[sfb + 1].min(swb_offset_max);

                f(g, sfb, begin, end);
            }

            win += 1;
        }
    }
}

/// Reconstructs left and right from mid and side in the bands with M/S stereo.
pub fn ms_decode(
    left: &Ics,
    right: &Ics,
    ms: &MsMask,
    params: &StreamParams,
    spec_left: &mut [f32],
    spec_right: &mut [f32],
) {
    if ms.present == 0 {
        return;
    }

    for_each_band(&left.info, params, |g, sfb, begin, end| {
        let is_joint = ms.is_set(g, sfb)
            && !right.codebook(g, sfb).is_intensity()
            && !left.codebook(g, sfb).is_noise()
            && !right.codebook(g, sfb).is_noise();

        if is_joint {
            for (l, r) in spec_left[begin..end].iter_mut().zip(&mut spec_right[begin..end]) {
                let tmp = *l - *r;
                *l += *r;
                *r = tmp;
            }
        }
    });
}

/// Reconstructs the right channel from the left in the bands with intensity stereo, and turns off
/// prediction for those bands.
pub fn is_decode(
    left: &mut Ics,
    right: &mut Ics,
    ms: &MsMask,
    params: &StreamParams,
    spec_left: &[f32],
    spec_right: &mut [f32],
) {
    let info = right.info.clone();

    for_each_band(&info, params, |g, sfb, begin, end| {
        let cb = right.codebook(g, sfb);

        if !cb.is_intensity() {
            return;
        }

        left.disable_prediction(sfb);
        right.disable_prediction(sfb);

        let scale = 0.5f32.powf(0.25 * f32::from(right.scale_factors[g][sfb]))
            * cb.intensity_direction() as f32
            * ms.intensity_invert(g, sfb);

        for (r, &l) in spec_right[begin..end].iter_mut().zip(&spec_left[begin..end]) {
            *r = scale * l;
        }
    });
}
