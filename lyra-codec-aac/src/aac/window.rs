// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::f64::consts;

/// Window types.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowType {
    /// Simple sine window.
    Sine,
    /// Kaiser-Bessel derived window.
    KaiserBessel(f64),
    /// The low overlap window of low delay frames.
    LowOverlap,
}

/// Calculates the rising half of a window of `2 * size` coefficients.
pub fn generate_window(mode: WindowType, size: usize) -> Box<[f32]> {
    match mode {
        WindowType::Sine => sine(size, 0..size),
        WindowType::KaiserBessel(alpha) => {
            let alpha2 = (alpha * consts::PI / size as f64).powi(2);

            let mut kb = Vec::with_capacity(size);
            let mut sum = 0.0;

            for n in 0..size {
                sum += bessel_i0(((n * (size - n)) as f64) * alpha2);
                kb.push(sum);
            }

            sum += 1.0;

            kb.iter().map(|&k| (k / sum).sqrt() as f32).collect()
        }
        WindowType::LowOverlap => {
            // Zeros, a short sine slope over a quarter of the half window, then ones.
            let zeros = 3 * size / 8;
            let slope = size / 4;

            let mut win = vec![0.0; size];
            win[zeros..zeros + slope].copy_from_slice(&sine(slope, 0..slope));
            win[zeros + slope..].fill(1.0);
            win.into_boxed_slice()
        }
    }
}

fn sine(size: usize, range: std::ops::Range<usize>) -> Box<[f32]> {
    let param = consts::PI / (2 * size) as f64;
    range.map(|n| (((n as f64) + 0.5) * param).sin() as f32).collect()
}

fn bessel_i0(inval: f64) -> f64 {
    let mut val: f64 = 1.0;
    for n in (1..64).rev() {
        val *= inval / f64::from(n * n);
        val += 1.0;
    }
    val
}
