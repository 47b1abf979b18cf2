// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `complex` module implements a 32-bit floating point complex number.

/// A complex number.
#[derive(Copy, Clone, Default, Debug, PartialEq)]
pub struct Complex {
    /// The real component.
    pub re: f32,
    /// The imaginary component.
    pub im: f32,
}

impl Complex {
    /// Create a new complex number.
    #[inline(always)]
    pub fn new(re: f32, im: f32) -> Self {
        Self { re, im }
    }

    /// Create the unit complex number `e^(j * theta)`, computed in double precision.
    #[inline(always)]
    pub fn from_angle(theta: f64) -> Self {
        Self { re: theta.cos() as f32, im: theta.sin() as f32 }
    }

    /// Scale the complex number.
    #[inline(always)]
    pub fn scale(&self, scale: f32) -> Self {
        Self { re: self.re * scale, im: self.im * scale }
    }

    /// Take the complex conjugate of `self`.
    ///
    /// For a complex number defined as `a + jb` the complex conjugate is defined to be `a - jb`.
    #[inline(always)]
    pub fn conj(&self) -> Self {
        Self { re: self.re, im: -self.im }
    }

    /// Multiply by `-j`, a clockwise rotation by a quarter turn.
    #[inline(always)]
    pub fn mul_neg_j(&self) -> Self {
        Self { re: self.im, im: -self.re }
    }
}

impl core::ops::Add for Complex {
    type Output = Complex;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self::Output {
        Self::Output { re: self.re + rhs.re, im: self.im + rhs.im }
    }
}

impl core::ops::AddAssign for Complex {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl core::ops::Sub for Complex {
    type Output = Complex;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self::Output {
        Self::Output { re: self.re - rhs.re, im: self.im - rhs.im }
    }
}

impl core::ops::Neg for Complex {
    type Output = Complex;

    #[inline(always)]
    fn neg(self) -> Self::Output {
        Self::Output { re: -self.re, im: -self.im }
    }
}

impl core::ops::Mul for Complex {
    type Output = Complex;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self::Output {
        Self::Output {
            re: (self.re * rhs.re) - (self.im * rhs.im),
            im: (self.re * rhs.im) + (self.im * rhs.re),
        }
    }
}

impl core::ops::Mul<f32> for Complex {
    type Output = Complex;

    #[inline(always)]
    fn mul(self, rhs: f32) -> Self::Output {
        Self::Output { re: self.re * rhs, im: self.im * rhs }
    }
}
