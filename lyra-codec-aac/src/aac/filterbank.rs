// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The synthesis filterbank: inverse MDCT, windowing, and overlap-add.

use lyra_core::dsp::mdct::Imdct;

use crate::aac::common::*;
use crate::aac::window::{generate_window, WindowType};

pub struct Filterbank {
    frame_len: usize,
    /// Rising long window halves, indexed by window shape.
    long_win: [Box<[f32]>; 2],
    /// Rising short window halves, indexed by window shape.
    short_win: [Box<[f32]>; 2],
    imdct_long: Imdct,
    imdct_short: Imdct,
    pcm_long: Box<[f32]>,
    pcm_short: Box<[f32]>,
}

impl Filterbank {
    /// Instantiate the filterbank of a frame length. Low delay frames replace the long KBD window
    /// with the low overlap window.
    pub fn new(frame_len: usize, low_delay: bool) -> Self {
        let short_len = frame_len / 8;

        let long_shape1 =
            if low_delay { WindowType::LowOverlap } else { WindowType::KaiserBessel(4.0) };

        Filterbank {
            frame_len,
            long_win: [
                generate_window(WindowType::Sine, frame_len),
                generate_window(long_shape1, frame_len),
            ],
            short_win: [
                generate_window(WindowType::Sine, short_len),
                generate_window(WindowType::KaiserBessel(6.0), short_len),
            ],
            imdct_long: Imdct::new(frame_len, 1.0 / (2 * frame_len) as f64),
            imdct_short: Imdct::new(short_len, 1.0 / (2 * short_len) as f64),
            pcm_long: vec![0.0; 2 * frame_len].into_boxed_slice(),
            pcm_short: vec![0.0; frame_len + short_len].into_boxed_slice(),
        }
    }

    /// Synthesizes one frame of `frame_len` samples into `dst` from the spectral coefficients of
    /// the frame, and updates the overlap buffer `delay`.
    pub fn synth(
        &mut self,
        coeffs: &[f32],
        delay: &mut [f32],
        seq: u8,
        window_shape: bool,
        prev_window_shape: bool,
        dst: &mut [f32],
    ) {
        let n = self.frame_len;
        let ns = n / 8;

        // The short windows of an eight short sequence are centred within the long window.
        let point0 = (n - ns) / 2;
        let point1 = point0 + ns;

        let long_win = &self.long_win[usize::from(window_shape)];
        let short_win = &self.short_win[usize::from(window_shape)];
        let prev_long_win = &self.long_win[usize::from(prev_window_shape)];
        let prev_short_win = &self.short_win[usize::from(prev_window_shape)];

        // Inverse MDCT
        if seq != EIGHT_SHORT_SEQUENCE {
            self.imdct_long.imdct(&coeffs[..n], &mut self.pcm_long);
        }
        else {
            let outs = self.pcm_long.chunks_exact_mut(2 * ns);

            for (ain, aout) in coeffs[..n].chunks_exact(ns).zip(outs) {
                self.imdct_short.imdct(ain, aout);
            }

            // Zero the eight short sequence buffer.
            self.pcm_short.fill(0.0);

            for (w, src) in self.pcm_long.chunks_exact(2 * ns).enumerate() {
                let rise = if w > 0 { short_win } else { prev_short_win };

                for i in 0..ns {
                    self.pcm_short[w * ns + i] += src[i] * rise[i];
                    self.pcm_short[w * ns + i + ns] += src[i + ns] * short_win[ns - 1 - i];
                }
            }
        }

        // Output new audio samples.
        match seq {
            ONLY_LONG_SEQUENCE | LONG_START_SEQUENCE => {
                for i in 0..n {
                    dst[i] = delay[i] + (self.pcm_long[i] * prev_long_win[i]);
                }
            }
            EIGHT_SHORT_SEQUENCE => {
                dst[..point0].copy_from_slice(&delay[..point0]);

                for i in point0..n {
                    dst[i] = delay[i] + self.pcm_short[i - point0];
                }
            }
            _ => {
                dst[..point0].copy_from_slice(&delay[..point0]);

                for i in point0..point1 {
                    dst[i] = delay[i] + self.pcm_long[i] * prev_short_win[i - point0];
                }
                for i in point1..n {
                    dst[i] = delay[i] + self.pcm_long[i];
                }
            }
        };

        // Save delay for overlap.
        match seq {
            ONLY_LONG_SEQUENCE | LONG_STOP_SEQUENCE => {
                for i in 0..n {
                    delay[i] = self.pcm_long[i + n] * long_win[n - 1 - i];
                }
            }
            EIGHT_SHORT_SEQUENCE => {
                // Last part is already windowed.
                delay[..point1].copy_from_slice(&self.pcm_short[n - point0..]);
                delay[point1..n].fill(0.0);
            }
            _ => {
                delay[..point0].copy_from_slice(&self.pcm_long[n..n + point0]);

                for i in point0..point1 {
                    delay[i] = self.pcm_long[i + n] * short_win[ns - 1 - (i - point0)];
                }

                delay[point1..n].fill(0.0);
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_silence() {
        for (frame_len, low_delay) in [(1024, false), (960, false), (512, true), (480, true)] {
            let mut fb = Filterbank::new(frame_len, low_delay);

            let coeffs = vec![0.0; frame_len];
            let mut delay = vec![0.0; frame_len];
            let mut dst = vec![1.0; frame_len];

            let seqs =
                [ONLY_LONG_SEQUENCE, LONG_START_SEQUENCE, EIGHT_SHORT_SEQUENCE, LONG_STOP_SEQUENCE];

            for seq in seqs {
                fb.synth(&coeffs, &mut delay, seq, true, false, &mut dst);
                assert!(dst.iter().all(|&s| s == 0.0));
                assert!(delay.iter().all(|&s| s == 0.0));
            }
        }
    }

    #[test]
    fn verify_overlap_add() {
        let n = 960;
        let mut fb = Filterbank::new(n, false);

        let mut coeffs = vec![0.0; n];
        coeffs[37] = 1.0;

        let mut delay = vec![0.0; n];
        let mut first = vec![0.0; n];
        let mut second = vec![0.0; n];

        fb.synth(&coeffs, &mut delay, ONLY_LONG_SEQUENCE, false, false, &mut first);
        fb.synth(&coeffs, &mut delay, ONLY_LONG_SEQUENCE, false, false, &mut second);

        // The steady state output of a repeated frame has bounded, non-trivial energy.
        let energy: f32 = second.iter().map(|s| s * s).sum();
        assert!(energy > 0.0);
        assert!(second.iter().all(|s| s.abs() <= 1.0));

        // The first frame is only the rising half, so it differs from the steady state.
        assert!(first.iter().zip(&second).any(|(a, b)| (a - b).abs() > 1e-6));
    }

    #[test]
    fn verify_short_sequence_delay_tail() {
        let n = 1024;
        let mut fb = Filterbank::new(n, false);

        let coeffs = vec![0.25; n];
        let mut delay = vec![0.0; n];
        let mut dst = vec![0.0; n];

        fb.synth(&coeffs, &mut delay, EIGHT_SHORT_SEQUENCE, false, false, &mut dst);

        // Nothing overlaps past the end of the last short window.
        assert!(delay[576..].iter().all(|&s| s == 0.0));
        assert!(dst[..448].iter().all(|&s| s == 0.0));
    }
}
