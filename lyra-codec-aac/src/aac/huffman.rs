// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Huffman decoding of scale factors and spectral codewords.
//!
//! Decoding works over any [`BitSource`]. The bitstream cursor never runs out of bits (it zero
//! fills and flags an error instead), whereas a detached [`BitWindow`] used by the reordered
//! spectral data decoder does, in which case decoding reports that more bits are needed.

use lyra_core::errors::{decode_error, Error, Result};
use lyra_core::io::{BitCursor, ReadBits};

use crate::aac::codebooks::{decode_scale_factor_index, Codebook};

/// A source of bits for Huffman decoding.
pub trait BitSource {
    /// Returns the next `n` bits (up-to 32) without consuming them. Missing bits read as 0.
    fn peek_bits(&self, n: u32) -> u32;

    /// Reads `n` bits (up-to 32). Returns `None` if fewer than `n` bits are available.
    fn read_bits(&mut self, n: u32) -> Option<u32>;
}

impl BitSource for BitCursor<'_> {
    #[inline(always)]
    fn peek_bits(&self, n: u32) -> u32 {
        self.peek_bits_leq32(n)
    }

    #[inline(always)]
    fn read_bits(&mut self, n: u32) -> Option<u32> {
        Some(self.read_bits_leq32(n))
    }
}

/// A detached window of up-to 128 bits. Bits are read from the most-significant end.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct BitWindow {
    bits: u128,
    len: u32,
}

impl BitWindow {
    pub const MAX_LEN: u32 = u128::BITS;

    /// Reads a window of `len` bits (up-to 64) from a cursor.
    pub fn read_from(bs: &mut BitCursor<'_>, len: u32) -> Self {
        debug_assert!(len <= 64);

        let bits = if len > 32 {
            let hi = u128::from(bs.read_bits_leq32(len - 32));
            (hi << 32) | u128::from(bs.read_bits_leq32(32))
        }
        else {
            u128::from(bs.read_bits_leq32(len))
        };

        BitWindow::new(bits, len)
    }

    pub fn new(bits: u128, len: u32) -> Self {
        BitWindow { bits: bits & mask(len), len }
    }

    /// Gets the number of unread bits.
    #[inline(always)]
    pub fn len(&self) -> u32 {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reverses the order of the unread bits.
    pub fn reverse(&mut self) {
        if self.len > 0 {
            self.bits = self.bits.reverse_bits() >> (u128::BITS - self.len);
        }
    }

    /// Places the bits of `head` in front of the unread bits of this window.
    pub fn prepend(&mut self, head: &BitWindow) -> Result<()> {
        if self.len + head.len > Self::MAX_LEN {
            return decode_error(Error::SpectralHuffman);
        }

        if head.len > 0 {
            self.bits |= head.bits << self.len;
            self.len += head.len;
        }

        Ok(())
    }
}

#[inline(always)]
fn mask(len: u32) -> u128 {
    if len >= u128::BITS {
        !0
    }
    else {
        (1 << len) - 1
    }
}

impl BitSource for BitWindow {
    fn peek_bits(&self, n: u32) -> u32 {
        if n == 0 {
            0
        }
        else if n <= self.len {
            ((self.bits >> (self.len - n)) & mask(n)) as u32
        }
        else {
            ((self.bits << (n - self.len)) & mask(n)) as u32
        }
    }

    fn read_bits(&mut self, n: u32) -> Option<u32> {
        if n > self.len {
            // A failed read exhausts the window.
            self.bits = 0;
            self.len = 0;
            return None;
        }

        let value = self.peek_bits(n);

        self.len -= n;
        self.bits &= mask(self.len);

        Some(value)
    }
}

/// Decodes a scale factor codeword and returns the DPCM difference in `-60..=60`.
pub fn decode_scale_factor(bs: &mut BitCursor<'_>) -> Result<i16> {
    match decode_scale_factor_index(bs)? {
        Some(idx) => Ok(idx as i16 - 60),
        None => decode_error(Error::ScaleFactorHuffman),
    }
}

/// Reads the sign bit of a non-zero unsigned value.
#[inline(always)]
fn read_sign<S: BitSource>(src: &mut S, val: &mut i32) -> Option<()> {
    if *val != 0 && src.read_bits(1)? == 1 {
        *val = -*val;
    }
    Some(())
}

/// Reads the escape sequence that follows a magnitude of 16.
fn read_escape<S: BitSource>(src: &mut S, val: &mut i32) -> Result<Option<()>> {
    if val.abs() != 16 {
        return Ok(Some(()));
    }

    // The number of leading ones, plus 4, is the length of the escape word.
    let mut n = 4;

    loop {
        match src.read_bits(1) {
            Some(0) => break,
            Some(_) => n += 1,
            None => return Ok(None),
        }

        if n == 16 {
            return decode_error(Error::SpectralHuffman);
        }
    }

    let word = match src.read_bits(n) {
        Some(word) => word as i32,
        None => return Ok(None),
    };

    let magnitude = (1 << n) | word;

    *val = if *val < 0 { -magnitude } else { magnitude };

    Ok(Some(()))
}

/// Decodes one spectral codeword of `cb` into `out`, which holds 4 values for quadruple codebooks
/// and 2 values for pair codebooks.
///
/// Returns `Ok(false)` if the source ran out of bits before the codeword, its sign bits, and its
/// escape sequences were complete.
pub fn decode_spectral<S: BitSource>(cb: Codebook, src: &mut S, out: &mut [i32]) -> Result<bool> {
    let info = match cb.info() {
        Some(info) => info,
        None => return decode_error(Error::InvalidCodebook),
    };

    let idx = match info.decoder().decode(src)? {
        Some(idx) => u32::from(idx),
        None => return Ok(false),
    };

    if info.dim == 4 {
        // Quadruples are the base-3 digits of the codeword index.
        let mut quad = [idx / 27, idx / 9 % 3, idx / 3 % 3, idx % 3].map(|q| q as i32);

        if info.signed {
            for (out, q) in out.iter_mut().zip(quad) {
                *out = q - 1;
            }
        }
        else {
            for q in quad.iter_mut() {
                if read_sign(src, q).is_none() {
                    return Ok(false);
                }
            }
            out[..4].copy_from_slice(&quad);
        }

        return Ok(true);
    }

    let mut x = (idx / info.modulo) as i32;
    let mut y = (idx % info.modulo) as i32;

    if info.signed {
        x -= (info.modulo >> 1) as i32;
        y -= (info.modulo >> 1) as i32;
    }
    else if read_sign(src, &mut x).is_none() || read_sign(src, &mut y).is_none() {
        return Ok(false);
    }

    if info.escape {
        if read_escape(src, &mut x)?.is_none() || read_escape(src, &mut y)?.is_none() {
            return Ok(false);
        }

        // Virtual codebooks limit the largest absolute value. A violation means the escape
        // sequence was corrupt, so both values are discarded.
        if let Some(lav) = info.lav {
            if x.abs() > lav || y.abs() > lav {
                x = 0;
                y = 0;
            }
        }
    }

    out[0] = x;
    out[1] = y;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_bit_window_read() {
        let mut win = BitWindow::new(0b1011_0110, 8);

        assert_eq!(win.peek_bits(3), 0b101);
        assert_eq!(win.read_bits(3), Some(0b101));
        assert_eq!(win.len(), 5);

        // Peeking past the end zero fills.
        assert_eq!(win.peek_bits(7), 0b10110_00);

        assert_eq!(win.read_bits(6), None);
        assert!(win.is_empty());
    }

    #[test]
    fn verify_bit_window_reverse_and_prepend() {
        let mut win = BitWindow::new(0b1100_1, 5);
        win.reverse();
        assert_eq!(win, BitWindow::new(0b1001_1, 5));

        let head = BitWindow::new(0b01, 2);
        win.prepend(&head).unwrap();
        assert_eq!(win, BitWindow::new(0b01_1001_1, 7));

        let mut big = BitWindow::new(0, 100);
        assert_eq!(big.prepend(&BitWindow::new(0, 29)), Err(Error::SpectralHuffman));
    }

    #[test]
    fn verify_decode_unsigned_quad() {
        // Codebook 3, index 1 is the quadruple (0, 0, 0, 1). Its codeword is 1001, followed by a
        // single sign bit.
        let mut out = [0; 4];

        let mut win = BitWindow::new(0b1001_1, 5);
        assert_eq!(decode_spectral(Codebook::Spectral(3), &mut win, &mut out), Ok(true));
        assert_eq!(out, [0, 0, 0, -1]);

        // Without the sign bit more bits are needed.
        let mut win = BitWindow::new(0b1001, 4);
        assert_eq!(decode_spectral(Codebook::Spectral(3), &mut win, &mut out), Ok(false));
        assert!(win.is_empty());
    }

    #[test]
    fn verify_decode_signed_pair() {
        // Codebook 5, index 40 is the pair (0, 0) with the 1-bit codeword 0.
        let mut out = [9; 2];
        let mut win = BitWindow::new(0, 1);
        assert_eq!(decode_spectral(Codebook::Spectral(5), &mut win, &mut out), Ok(true));
        assert_eq!(out, [0, 0]);
    }

    #[test]
    fn verify_decode_escape() {
        // Codebook 11, index 16 * 17 + 0 is (16, 0) with the 9-bit codeword 111000010. It is
        // followed by the sign of x, the escape prefix 1110 (n = 7), and a 7-bit escape word.
        let bits = (0b111000010u128 << 12) | (0b0_1110 << 7) | 0b0000101;
        let mut win = BitWindow::new(bits, 21);

        let mut out = [0; 2];
        assert_eq!(decode_spectral(Codebook::ESCAPE, &mut win, &mut out), Ok(true));
        assert_eq!(out, [(1 << 7) | 5, 0]);
        assert!(win.is_empty());

        // Codebook 16 limits values to 16, so the escape value is discarded.
        let mut win = BitWindow::new(bits, 21);
        assert_eq!(decode_spectral(Codebook::Vcb11(16), &mut win, &mut out), Ok(true));
        assert_eq!(out, [0, 0]);
    }

    #[test]
    fn verify_decode_invalid_codebook() {
        let mut win = BitWindow::new(0, 8);
        let mut out = [0; 4];
        assert_eq!(
            decode_spectral(Codebook::Noise, &mut win, &mut out),
            Err(Error::InvalidCodebook)
        );
    }
}
