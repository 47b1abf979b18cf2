// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `fft` module implements the Fast Fourier Transform (FFT).
//!
//! The FFT is a mixed-radix decimation-in-time transform. Sizes whose prime factors are 2, 3, and
//! 5 use dedicated butterflies. Any other prime factor falls back to a direct DFT of that radix.

use crate::dsp::complex::Complex;

/// Split `n` into radices. Radix-4 stages are preferred, followed by 2, 3, 5, and then any
/// remaining primes.
fn factorize(mut n: usize) -> Vec<usize> {
    let mut factors = Vec::new();

    for radix in [4, 2, 3, 5] {
        while n % radix == 0 && n > 1 {
            factors.push(radix);
            n /= radix;
        }
    }

    let mut p = 7;
    while n > 1 {
        while n % p == 0 {
            factors.push(p);
            n /= p;
        }
        p += 2;
    }

    factors
}

/// The complex Fast Fourier Transform (FFT).
pub struct Fft {
    factors: Box<[usize]>,
    /// `e^(-j * 2 * pi * k / n)` for `k` in `0..n`.
    twiddle: Box<[Complex]>,
    scratch: Box<[Complex]>,
}

impl Fft {
    /// Instantiate a forward FFT of size `n`.
    pub fn new(n: usize) -> Self {
        assert!(n > 0, "fft size must be > 0");

        let theta = -2.0 * std::f64::consts::PI / n as f64;

        let twiddle = (0..n).map(|k| Complex::from_angle(theta * k as f64)).collect();

        Fft {
            factors: factorize(n).into_boxed_slice(),
            twiddle,
            scratch: vec![Default::default(); n].into_boxed_slice(),
        }
    }

    /// Get the size of the FFT.
    pub fn size(&self) -> usize {
        self.twiddle.len()
    }

    /// Calculate the FFT.
    pub fn fft(&mut self, x: &[Complex], y: &mut [Complex]) {
        let n = x.len();
        assert_eq!(n, y.len());
        assert_eq!(n, self.size());

        transform(x, 0, 1, y, &self.factors, &self.twiddle, 1);
    }

    /// Calculate the FFT in-place.
    pub fn fft_inplace(&mut self, x: &mut [Complex]) {
        assert_eq!(x.len(), self.size());

        self.scratch.copy_from_slice(x);

        transform(&self.scratch, 0, 1, x, &self.factors, &self.twiddle, 1);
    }

    /// Calculate the inverse FFT, scaled by `1 / n`.
    pub fn ifft(&mut self, x: &[Complex], y: &mut [Complex]) {
        let n = x.len();
        assert_eq!(n, y.len());
        assert_eq!(n, self.size());

        // IFFT(x) = conj(FFT(conj(x))) / n
        for (s, x) in self.scratch.iter_mut().zip(x) {
            *s = x.conj();
        }

        transform(&self.scratch, 0, 1, y, &self.factors, &self.twiddle, 1);

        let c = 1.0 / n as f32;

        for y in y.iter_mut() {
            *y = y.conj().scale(c);
        }
    }
}

/// Recursively transform the `y.len()` inputs `x[offset + i * stride]` into `y`.
///
/// `twiddle` holds the twiddle factors of the top-level transform. A transform of size `n` uses
/// every `tw_stride`-th factor.
fn transform(
    x: &[Complex],
    offset: usize,
    stride: usize,
    y: &mut [Complex],
    factors: &[usize],
    twiddle: &[Complex],
    tw_stride: usize,
) {
    let n = y.len();

    let (radix, rest) = match factors.split_first() {
        Some((&radix, rest)) => (radix, rest),
        None => {
            y[0] = x[offset];
            return;
        }
    };

    let m = n / radix;

    // Transform each decimated sub-sequence into its own contiguous part of the output.
    for (r, sub) in y.chunks_exact_mut(m).enumerate() {
        transform(x, offset + r * stride, stride * radix, sub, rest, twiddle, tw_stride * radix);
    }

    match radix {
        2 => butterfly2(y, m, twiddle, tw_stride),
        3 => butterfly3(y, m, twiddle, tw_stride),
        4 => butterfly4(y, m, twiddle, tw_stride),
        5 => butterfly5(y, m, twiddle, tw_stride),
        _ => butterfly_generic(y, m, radix, twiddle, tw_stride),
    }
}

#[inline(always)]
fn twiddled(
    y: &[Complex],
    k: usize,
    m: usize,
    r: usize,
    twiddle: &[Complex],
    tw: usize,
) -> Complex {
    if k == 0 {
        y[r * m]
    }
    else {
        y[r * m + k] * twiddle[r * k * tw]
    }
}

fn butterfly2(y: &mut [Complex], m: usize, twiddle: &[Complex], tw: usize) {
    for k in 0..m {
        let a0 = y[k];
        let a1 = twiddled(y, k, m, 1, twiddle, tw);

        y[k] = a0 + a1;
        y[k + m] = a0 - a1;
    }
}

fn butterfly3(y: &mut [Complex], m: usize, twiddle: &[Complex], tw: usize) {
    // sin(2 * pi / 3)
    const S: f32 = 0.866_025_403_784_438_6;

    for k in 0..m {
        let a0 = y[k];
        let a1 = twiddled(y, k, m, 1, twiddle, tw);
        let a2 = twiddled(y, k, m, 2, twiddle, tw);

        let t = a1 + a2;
        let d = (a1 - a2).mul_neg_j().scale(S);
        let mid = a0 - t.scale(0.5);

        y[k] = a0 + t;
        y[k + m] = mid + d;
        y[k + 2 * m] = mid - d;
    }
}

fn butterfly4(y: &mut [Complex], m: usize, twiddle: &[Complex], tw: usize) {
    for k in 0..m {
        let a0 = y[k];
        let a1 = twiddled(y, k, m, 1, twiddle, tw);
        let a2 = twiddled(y, k, m, 2, twiddle, tw);
        let a3 = twiddled(y, k, m, 3, twiddle, tw);

        let t0 = a0 + a2;
        let t1 = a0 - a2;
        let t2 = a1 + a3;
        let t3 = (a1 - a3).mul_neg_j();

        y[k] = t0 + t2;
        y[k + m] = t1 + t3;
        y[k + 2 * m] = t0 - t2;
        y[k + 3 * m] = t1 - t3;
    }
}

fn butterfly5(y: &mut [Complex], m: usize, twiddle: &[Complex], tw: usize) {
    // cos(2 * pi / 5), cos(4 * pi / 5), sin(2 * pi / 5), sin(4 * pi / 5)
    const C1: f32 = 0.309_016_994_374_947_4;
    const C2: f32 = -0.809_016_994_374_947_4;
    const S1: f32 = 0.951_056_516_295_153_5;
    const S2: f32 = 0.587_785_252_292_473_1;

    for k in 0..m {
        let a0 = y[k];
        let a1 = twiddled(y, k, m, 1, twiddle, tw);
        let a2 = twiddled(y, k, m, 2, twiddle, tw);
        let a3 = twiddled(y, k, m, 3, twiddle, tw);
        let a4 = twiddled(y, k, m, 4, twiddle, tw);

        let t1 = a1 + a4;
        let t2 = a2 + a3;
        let d1 = (a1 - a4).mul_neg_j();
        let d2 = (a2 - a3).mul_neg_j();

        let r1 = a0 + t1.scale(C1) + t2.scale(C2);
        let r2 = a0 + t1.scale(C2) + t2.scale(C1);
        let i1 = d1.scale(S1) + d2.scale(S2);
        let i2 = d1.scale(S2) - d2.scale(S1);

        y[k] = a0 + t1 + t2;
        y[k + m] = r1 + i1;
        y[k + 2 * m] = r2 + i2;
        y[k + 3 * m] = r2 - i2;
        y[k + 4 * m] = r1 - i1;
    }
}

fn butterfly_generic(y: &mut [Complex], m: usize, radix: usize, twiddle: &[Complex], tw: usize) {
    let mut a = vec![Complex::default(); radix];

    for k in 0..m {
        for (r, a) in a.iter_mut().enumerate() {
            *a = twiddled(y, k, m, r, twiddle, tw);
        }

        for q in 0..radix {
            // The twiddle for the radix-point DFT is W_n^(m * (r * q mod radix)).
            y[k + q * m] = a
                .iter()
                .enumerate()
                .map(|(r, &a)| a * twiddle[((r * q) % radix) * m * tw])
                .fold(Complex::default(), |acc, v| acc + v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    /// Compute a naive DFT.
    fn dft_naive(x: &[Complex], y: &mut [Complex]) {
        assert_eq!(x.len(), y.len());

        let n = x.len() as u64;

        let theta = 2.0 * std::f64::consts::PI / (x.len() as f64);

        for (i, y) in y.iter_mut().enumerate() {
            let mut re = 0f64;
            let mut im = 0f64;

            for (j, &x) in x.iter().enumerate() {
                let xre = f64::from(x.re);
                let xim = f64::from(x.im);

                let ij = ((i as u64) * (j as u64)) % n;

                let wre = (theta * ij as f64).cos();
                let wim = -(theta * ij as f64).sin();

                re += (xre * wre) - (xim * wim);
                im += (xre * wim) + (xim * wre);
            }

            *y = Complex { re: re as f32, im: im as f32 };
        }
    }

    fn random_signal(rng: &mut SmallRng, n: usize) -> Vec<Complex> {
        (0..n)
            .map(|_| Complex::new(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)))
            .collect()
    }

    #[test]
    fn verify_factorize() {
        assert_eq!(factorize(1), Vec::<usize>::new());
        assert_eq!(factorize(64), vec![4, 4, 4]);
        assert_eq!(factorize(480), vec![4, 4, 2, 3, 5]);
        assert_eq!(factorize(60), vec![4, 3, 5]);
        assert_eq!(factorize(7 * 11 * 2), vec![2, 7, 11]);
    }

    #[test]
    fn verify_fft() {
        let mut rng = SmallRng::seed_from_u64(0x1234_5678);

        for n in [1, 2, 3, 4, 5, 6, 8, 15, 30, 60, 64, 120, 128, 240, 256, 480, 512, 14, 77] {
            let x = random_signal(&mut rng, n);

            let mut actual = vec![Complex::default(); n];
            let mut expected = vec![Complex::default(); n];

            Fft::new(n).fft(&x, &mut actual);
            dft_naive(&x, &mut expected);

            let tolerance = 1e-5 * n as f32;

            for (a, e) in actual.iter().zip(&expected) {
                assert!((a.re - e.re).abs() < tolerance, "n = {}", n);
                assert!((a.im - e.im).abs() < tolerance, "n = {}", n);
            }
        }
    }

    #[test]
    fn verify_fft_inplace() {
        let mut rng = SmallRng::seed_from_u64(0xabcd);

        let x = random_signal(&mut rng, 240);

        let mut fft = Fft::new(240);

        let mut expected = vec![Complex::default(); 240];
        fft.fft(&x, &mut expected);

        let mut actual = x.clone();
        fft.fft_inplace(&mut actual);

        assert_eq!(actual, expected);
    }

    #[test]
    fn verify_ifft() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);

        for n in [60, 64, 480, 512] {
            let x = random_signal(&mut rng, n);

            let mut fft = Fft::new(n);

            let mut freq = vec![Complex::default(); n];
            let mut actual = vec![Complex::default(); n];

            fft.fft(&x, &mut freq);
            fft.ifft(&freq, &mut actual);

            for (a, e) in actual.iter().zip(&x) {
                assert!((a.re - e.re).abs() < 1e-5);
                assert!((a.im - e.im).abs() < 1e-5);
            }
        }
    }
}
