// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The inverse Modified Discrete Cosine Transform (IMDCT).
//!
//! An N-point IMDCT is computed with a forward complex FFT of N/2 points framed by a pre-twiddle
//! and a post-twiddle. The FFT is mixed-radix, so N may be any multiple of 4 whose half factors
//! into 2, 3, and 5. This covers the 1024, 960, 512, 480, 128, and 120 point transforms of AAC.

use crate::dsp::complex::Complex;
use crate::dsp::fft::Fft;

/// A scaled N-point IMDCT producing 2N output samples.
pub struct Imdct {
    fft: Fft,
    fft_in: Box<[Complex]>,
    fft_out: Box<[Complex]>,
    /// `sqrt(scale) * exp(i * pi * (k + 1/8) / N)` for `k` in `0..N/2`.
    twiddle: Box<[Complex]>,
}

impl Imdct {
    /// Creates an IMDCT of `n` spectral coefficients, with every output sample multiplied by the
    /// positive factor `scale`. `n` must be a multiple of 4.
    pub fn new(n: usize, scale: f64) -> Self {
        assert!(n > 0 && n % 4 == 0, "n must be a multiple of 4");
        assert!(scale > 0.0, "scale must be positive");

        let half = n / 2;
        let gain = scale.sqrt();
        let step = std::f64::consts::PI / n as f64;

        let twiddle: Box<[Complex]> = (0..half)
            .map(|k| {
                let theta = step * (k as f64 + 0.125);
                Complex::new((gain * theta.cos()) as f32, (gain * theta.sin()) as f32)
            })
            .collect();

        Imdct {
            fft: Fft::new(half),
            fft_in: vec![Complex::default(); half].into_boxed_slice(),
            fft_out: vec![Complex::default(); half].into_boxed_slice(),
            twiddle,
        }
    }

    /// The number of spectral coefficients, N.
    pub fn size(&self) -> usize {
        2 * self.twiddle.len()
    }

    /// Transforms the N coefficients of `coeffs` into the 2N samples of `out`.
    ///
    /// Panics if the slice lengths do not match the transform size.
    pub fn imdct(&mut self, coeffs: &[f32], out: &mut [f32]) {
        let n = self.size();
        let half = n / 2;
        let quarter = n / 4;

        assert_eq!(coeffs.len(), n);
        assert_eq!(out.len(), 2 * n);

        // Fold the real coefficients into N/2 complex values, interleaving the even coefficients
        // from the front with the odd coefficients from the back.
        for (k, (z, &w)) in self.fft_in.iter_mut().zip(self.twiddle.iter()).enumerate() {
            let even = coeffs[2 * k];
            let odd = -coeffs[n - 1 - 2 * k];

            *z = Complex::new(odd * w.im - even * w.re, odd * w.re + even * w.im);
        }

        self.fft.fft(&self.fft_in, &mut self.fft_out);

        // The output is made of four quarters of N/2 samples. Every step unfolds one value from
        // each half of the FFT output into two samples of every quarter, one counted from the
        // front of the quarter and one from its back.
        for k in 0..quarter {
            let lo = self.twiddle[k] * self.fft_out[k].conj();
            let hi = self.twiddle[quarter + k] * self.fft_out[quarter + k].conj();

            let fwd = 2 * k;
            let rev = half - 1 - 2 * k;

            out[rev] = -lo.im;
            out[fwd] = -hi.re;

            out[half + fwd] = lo.im;
            out[half + rev] = hi.re;

            out[n + rev] = lo.re;
            out[n + fwd] = hi.im;

            out[n + half + fwd] = lo.re;
            out[n + half + rev] = hi.im;
        }
    }
}
