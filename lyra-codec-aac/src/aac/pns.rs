// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Perceptual noise substitution (PNS).
//!
//! Bands coded with the noise codebook carry no spectral lines, only an energy. The decoder fills
//! them with pseudo-random noise of that energy.

use crate::aac::codebooks::Codebook;
use crate::aac::ics::{get_scale, Ics, StreamParams};
use crate::aac::stereo::MsMask;

/// The state of the noise generator: two linear feedback shift registers combined by XOR.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NoiseGeneratorState {
    word_a: u32,
    word_b: u32,
}

impl Default for NoiseGeneratorState {
    fn default() -> Self {
        NoiseGeneratorState { word_a: 1, word_b: 1 }
    }
}

#[inline(always)]
fn parity(x: u32) -> u32 {
    x.count_ones() & 1
}

impl NoiseGeneratorState {
    /// Advances both registers and returns the next random word.
    pub fn next_word(&mut self) -> u32 {
        let feedback_a = parity(self.word_a & 0xf5);
        let feedback_b = parity((self.word_b >> 25) & 0x63);

        self.word_a = (self.word_a >> 1) | (feedback_a << 31);
        self.word_b = self.word_b.wrapping_add(self.word_b) | feedback_b;

        self.word_a ^ self.word_b
    }

    /// Fills `spec` with noise of unit energy scaled by the noise energy `scale_factor`.
    pub fn gen_rand_vector(&mut self, spec: &mut [f32], scale_factor: i16) {
        if spec.is_empty() {
            return;
        }

        let scale = 1.0 / spec.len() as f32;

        let mut energy = 0.0;

        for x in spec.iter_mut() {
            *x = scale * self.next_word() as i32 as f32;
            energy += *x * *x;
        }

        if energy > 0.0 {
            let gain = get_scale(scale_factor) / energy.sqrt();

            for x in spec.iter_mut() {
                *x *= gain;
            }
        }
    }
}

/// Substitutes the noise bands of a channel.
pub fn pns_decode(
    ics: &mut Ics,
    params: &StreamParams,
    spec: &mut [f32],
    rng: &mut NoiseGeneratorState,
) {
    decode_bands(ics, None, params, spec, rng);
}

/// Substitutes the noise bands of a channel pair with a common window. Noise bands that are
/// signalled as correlated by the M/S mask share their noise between both channels.
pub fn pns_decode_pair(
    left: &mut Ics,
    right: &mut Ics,
    ms: &MsMask,
    params: &StreamParams,
    spec_left: &mut [f32],
    spec_right: &mut [f32],
    rng: &mut NoiseGeneratorState,
) {
    decode_bands(left, Some((right, ms, spec_right)), params, spec_left, rng);
}

fn decode_bands(
    left: &mut Ics,
    mut right: Option<(&mut Ics, &MsMask, &mut [f32])>,
    params: &StreamParams,
    spec_left: &mut [f32],
    rng: &mut NoiseGeneratorState,
) {
    let info = left.info.clone();
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

                let left_noise = left.codebook(g, sfb) == Codebook::Noise;

                // The generator state before the left channel's noise, for correlated noise.
                let mut dep = *rng;

                if left_noise {
                    left.disable_prediction(sfb);
                    rng.gen_rand_vector(&mut spec_left[begin..end], left.scale_factors[g][sfb]);
                }

                if let Some((right, ms, spec_right)) = right.as_mut() {
                    if right.codebook(g, sfb) == Codebook::Noise {
                        right.disable_prediction(sfb);

                        let sf = right.scale_factors[g][sfb];

                        if left_noise && ms.is_set(g, sfb) {
                            dep.gen_rand_vector(&mut spec_right[begin..end], sf);
                        }
                        else {
                            rng.gen_rand_vector(&mut spec_right[begin..end], sf);
                        }
                    }
                }
            }

            win += 1;
        }
    }
}
