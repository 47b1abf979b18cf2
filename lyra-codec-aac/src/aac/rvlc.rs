// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reversible variable length coding of scale factors.
//!
//! The scale factor differences use a symmetric code, so the scale factor window can be decoded
//! from both ends. Large differences are completed by an escape value from a separate window. If
//! forward decoding hits an invalid codeword, the remaining bands are recovered by decoding
//! backwards from the end of the window.

use lyra_core::errors::{Error, Result};
use lyra_core::io::{BitCursor, ReadBits, RevBitCursor};

use crate::aac::codebooks::Codebook;
use crate::aac::common::*;
use crate::aac::ics::scalefactor::ScaleFactors;
use crate::aac::ics::section::Sections;
use crate::aac::ics::IcsInfo;

/// The difference that is completed by an escape value.
const ESC_VAL: i16 = 7;

/// The index of invalid codewords.
const INVALID: i16 = 99;

/// Codewords of the scale factor differences as (difference, length, code), sorted by length.
#[rustfmt::skip]
const RVLC_BOOK: [(i16, u32, u32); 24] = [
    (0, 1, 0),
    (-1, 3, 5), (1, 3, 7),
    (-2, 4, 9),
    (-3, 5, 17), (2, 5, 27),
    (-4, 6, 33), (99, 6, 50), (3, 6, 51), (99, 6, 52),
    (-7, 7, 65), (99, 7, 96), (99, 7, 98), (7, 7, 99), (4, 7, 107),
    (-5, 8, 129), (99, 8, 194), (5, 8, 195), (99, 8, 212),
    (99, 9, 256), (-6, 9, 257), (99, 9, 426), (6, 9, 427),
    (99, 10, 0),
];

/// Codewords of the escape values as (value, length, code), sorted by length.
#[rustfmt::skip]
const ESCAPE_BOOK: [(i16, u32, u32); 55] = [
    (1, 2, 0), (0, 2, 2),
    (3, 3, 2), (2, 3, 6),
    (4, 4, 14),
    (7, 5, 13), (6, 5, 15), (5, 5, 31),
    (11, 6, 24), (10, 6, 25), (9, 6, 29), (8, 6, 61),
    (13, 7, 56), (12, 7, 120),
    (15, 8, 114), (14, 8, 242),
    (17, 9, 230), (16, 9, 486),
    (19, 10, 463), (18, 10, 974),
    (22, 11, 925), (20, 11, 1950), (21, 11, 1951),
    (23, 12, 1848),
    (25, 13, 3698),
    (24, 14, 7399),
    (26, 15, 14797),
    (49, 19, 236736), (50, 19, 236737), (51, 19, 236738), (52, 19, 236739), (53, 19, 236740),
    (27, 20, 473482), (28, 20, 473483), (29, 20, 473484), (30, 20, 473485), (31, 20, 473486),
    (32, 20, 473487), (33, 20, 473488), (34, 20, 473489), (35, 20, 473490), (36, 20, 473491),
    (37, 20, 473492), (38, 20, 473493), (39, 20, 473494), (40, 20, 473495), (41, 20, 473496),
    (42, 20, 473497), (43, 20, 473498), (44, 20, 473499), (45, 20, 473500), (46, 20, 473501),
    (47, 20, 473502), (48, 20, 473503),
    (99, 21, 0),
];

/// Reads one codeword by extending the code one table entry at a time. Returns `INVALID` if no
/// codeword matches.
fn read_codeword<B: ReadBits>(bs: &mut B, book: &[(i16, u32, u32)]) -> i16 {
    let (mut index, mut len, mut code) = book[0];

    let max_len = book[book.len() - 1].1;

    let mut cw = bs.read_bits_leq32(len);
    let mut i = 0;

    while cw != code && len < max_len {
        i += 1;

        let extra = book[i].1 - len;

        cw = (cw << extra) | bs.read_bits_leq32(extra);

        (index, len, code) = book[i];
    }

    if cw != code || bs.has_error() {
        INVALID
    }
    else {
        index
    }
}

/// Reads a scale factor difference, completing escaped differences with `escape`.
fn read_difference<B, E>(bs: &mut B, mut escape: E) -> Option<i16>
where
    B: ReadBits,
    E: FnMut() -> Option<i16>,
{
    match read_codeword(bs, &RVLC_BOOK) {
        INVALID => None,
        ESC_VAL => Some(ESC_VAL + escape()?),
        diff if diff == -ESC_VAL => Some(-ESC_VAL - escape()?),
        diff => Some(diff),
    }
}

/// Decodes every escape value of the escape window.
fn read_escapes(buf: &[u8], len: u32) -> Vec<i16> {
    let mut bs = BitCursor::new_with_len(buf, u64::from(len));

    let mut escapes = Vec::new();

    while bs.bits_left() > 0 {
        match read_codeword(&mut bs, &ESCAPE_BOOK) {
            INVALID => break,
            esc => escapes.push(esc),
        }
    }

    escapes
}

/// Reversible scale factor side information.
#[derive(Clone, Debug)]
pub struct RvlcInfo {
    sf_concealment: bool,
    rev_global_gain: u8,
    length_of_rvlc_sf: u32,
    dpcm_noise_nrg: i16,
    sf_escapes_present: bool,
    length_of_rvlc_escapes: u32,
    dpcm_noise_last_position: i16,
}

impl RvlcInfo {
    pub fn read<B: ReadBits>(bs: &mut B, info: &IcsInfo, noise_used: bool) -> Result<Self> {
        let sf_concealment = bs.read_bool();
        let rev_global_gain = bs.read_bits_leq32(8) as u8;

        let mut length_of_rvlc_sf = bs.read_bits_leq32(if info.long_win { 9 } else { 11 });

        let mut dpcm_noise_nrg = 0;

        if noise_used {
            dpcm_noise_nrg = bs.read_bits_leq32(9) as i16;

            // The noise energy is counted in the length of the scale factor data.
            validate!(length_of_rvlc_sf >= 9, Error::ErScaleFactorBitError);
            length_of_rvlc_sf -= 9;
        }

        let sf_escapes_present = bs.read_bool();

        let length_of_rvlc_escapes =
            if sf_escapes_present { bs.read_bits_leq32(8) } else { 0 };

        let dpcm_noise_last_position =
            if noise_used { bs.read_bits_leq32(9) as i16 } else { 0 };

        Ok(RvlcInfo {
            sf_concealment,
            rev_global_gain,
            length_of_rvlc_sf,
            dpcm_noise_nrg,
            sf_escapes_present,
            length_of_rvlc_escapes,
            dpcm_noise_last_position,
        })
    }

    /// Reads the scale factor and escape windows from the stream and decodes the scale factors.
    pub fn decode(
        &self,
        bs: &mut BitCursor<'_>,
        info: &IcsInfo,
        sections: &Sections,
        global_gain: u8,
    ) -> Result<ScaleFactors> {
        let sf_buf = bs.read_bit_buffer(self.length_of_rvlc_sf);

        let escapes = if self.sf_escapes_present {
            let esc_buf = bs.read_bit_buffer(self.length_of_rvlc_escapes);
            read_escapes(&esc_buf, self.length_of_rvlc_escapes)
        }
        else {
            Vec::new()
        };

        validate!(!bs.has_error(), Error::InputTooSmall);

        let (mut scale_factors, failed) =
            self.decode_forward(&sf_buf, &escapes, info, sections, global_gain)?;

        let failed = match failed {
            Some(failed) => failed,
            None => return Ok(scale_factors),
        };

        log::warn!(
            "rvlc: invalid codeword at band {}, decoding backwards (concealment={})",
            failed,
            self.sf_concealment
        );

        let (backward, first_valid) =
            self.decode_backward(&sf_buf, &escapes, info, sections, global_gain);

        // The two directions must meet.
        validate!(first_valid <= failed, Error::ErScaleFactorBitError);

        for g in 0..info.num_window_groups {
            for sfb in 0..info.max_sfb {
                if g * info.max_sfb + sfb >= failed {
                    scale_factors[g][sfb] = backward[g][sfb];
                }
            }
        }

        Ok(scale_factors)
    }

    /// Decodes the scale factors from the start of the window. Returns the scale factors and the
    /// band, in decoding order, of the first invalid codeword.
    fn decode_forward(
        &self,
        sf_buf: &[u8],
        escapes: &[i16],
        info: &IcsInfo,
        sections: &Sections,
        global_gain: u8,
    ) -> Result<(ScaleFactors, Option<usize>)> {
        let mut bs = BitCursor::new_with_len(sf_buf, u64::from(self.length_of_rvlc_sf));
        let mut escapes = escapes.iter().copied();

        let mut scale_factors = [[0; MAX_SFBS]; MAX_WINDOWS];

        let mut scale_factor = i16::from(global_gain);
        let mut is_position = 0;
        let mut noise_energy = i16::from(global_gain) - 90 - 256;
        let mut noise_pcm_flag = true;

        for g in 0..info.num_window_groups {
            for sfb in 0..info.max_sfb {
                let band = g * info.max_sfb + sfb;

                let cb = sections.sfb_cb[g][sfb];

                if cb == Codebook::Zero {
                    continue;
                }

                if cb == Codebook::Noise && noise_pcm_flag {
                    noise_pcm_flag = false;
                    noise_energy += self.dpcm_noise_nrg;
                    scale_factors[g][sfb] = noise_energy;
                    continue;
                }

                let diff = match read_difference(&mut bs, || escapes.next()) {
                    Some(diff) => diff,
                    None => return Ok((scale_factors, Some(band))),
                };

                scale_factors[g][sfb] = if cb.is_intensity() {
                    is_position += diff;
                    is_position
                }
                else if cb.is_noise() {
                    noise_energy += diff;
                    noise_energy
                }
                else {
                    scale_factor += diff;
                    validate!((0..256).contains(&scale_factor), Error::ScaleFactorRange);
                    scale_factor
                };
            }
        }

        Ok((scale_factors, None))
    }

    /// Decodes the scale factors from the end of the window. Returns the scale factors and the
    /// first band, in decoding order, from which on they are valid.
    fn decode_backward(
        &self,
        sf_buf: &[u8],
        escapes: &[i16],
        info: &IcsInfo,
        sections: &Sections,
        global_gain: u8,
    ) -> (ScaleFactors, usize) {
        let mut bs = RevBitCursor::new(sf_buf, u64::from(self.length_of_rvlc_sf));
        let mut escapes = escapes.iter().rev().copied();

        let mut scale_factors = [[0; MAX_SFBS]; MAX_WINDOWS];

        let num_bands = info.num_window_groups * info.max_sfb;

        let band_cb = |band: usize| sections.sfb_cb[band / info.max_sfb][band % info.max_sfb];

        // The first noise band carries its energy in the side information instead.
        let first_noise = (0..num_bands).find(|&band| band_cb(band).is_noise());

        let mut scale_factor = i16::from(self.rev_global_gain);
        let mut noise_energy =
            i16::from(global_gain) - 90 - 256 + self.dpcm_noise_last_position;

        // The last intensity position follows the last scale factor difference.
        let mut is_position = 0;

        if sections.is_used {
            match read_difference(&mut bs, || escapes.next()) {
                Some(pos) => is_position = pos,
                None => return (scale_factors, num_bands),
            }
        }

        for band in (0..num_bands).rev() {
            let (g, sfb) = (band / info.max_sfb, band % info.max_sfb);

            let cb = band_cb(band);

            let current = if cb == Codebook::Zero {
                scale_factors[g][sfb] = 0;
                continue;
            }
            else if cb.is_intensity() {
                &mut is_position
            }
            else if cb.is_noise() {
                &mut noise_energy
            }
            else {
                if !(0..256).contains(&scale_factor) {
                    return (scale_factors, band + 1);
                }
                &mut scale_factor
            };

            scale_factors[g][sfb] = *current;

            if Some(band) == first_noise {
                continue;
            }

            match read_difference(&mut bs, || escapes.next()) {
                Some(diff) => *current -= diff,
                None => return (scale_factors, band),
            }
        }

        (scale_factors, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Packs (code, length) pairs into a buffer, most-significant bit first.
    fn pack(words: &[(u32, u32)]) -> Vec<u8> {
        let mut bits = Vec::new();
        for &(code, len) in words {
            for i in (0..len).rev() {
                bits.push((code >> i) & 1 == 1);
            }
        }
        let mut buf = vec![0u8; (bits.len() + 7) / 8];
        for (i, &bit) in bits.iter().enumerate() {
            if bit {
                buf[i / 8] |= 0x80 >> (i % 8);
            }
        }
        buf
    }

    fn codeword(diff: i16) -> (u32, u32) {
        let &(_, len, code) = RVLC_BOOK.iter().find(|e| e.0 == diff).unwrap();
        (code, len)
    }

    fn sections(cbs: &[Codebook]) -> Sections {
        let mut sections = Sections::default();
        for (sfb, &cb) in cbs.iter().enumerate() {
            sections.sfb_cb[0][sfb] = cb;
            sections.noise_used |= cb.is_noise();
            sections.is_used |= cb.is_intensity();
        }
        sections
    }

    fn rvlc(length_of_rvlc_sf: u32) -> RvlcInfo {
        RvlcInfo {
            sf_concealment: false,
            rev_global_gain: 0,
            length_of_rvlc_sf,
            dpcm_noise_nrg: 0,
            sf_escapes_present: false,
            length_of_rvlc_escapes: 0,
            dpcm_noise_last_position: 0,
        }
    }

    #[test]
    fn verify_codebooks() {
        // Valid scale factor codewords read the same in both directions.
        for &(diff, len, code) in RVLC_BOOK.iter().filter(|e| e.0 != INVALID) {
            let rev = code.reverse_bits() >> (32 - len);
            assert_eq!(rev, code, "difference {}", diff);
        }

        // Every escape value decodes back to itself.
        for &(esc, len, code) in ESCAPE_BOOK.iter().filter(|e| e.0 != INVALID) {
            let buf = pack(&[(code, len)]);
            let mut bs = BitCursor::new_with_len(&buf, u64::from(len));
            assert_eq!(read_codeword(&mut bs, &ESCAPE_BOOK), esc);
        }
    }

    #[test]
    fn verify_forward_decode() {
        let cbs = [
            Codebook::Spectral(1),
            Codebook::Noise,
            Codebook::Noise,
            Codebook::IntensityInPhase,
            Codebook::Zero,
            Codebook::Spectral(3),
        ];
        let info = IcsInfo { max_sfb: cbs.len(), num_swb: 49, ..IcsInfo::default() };

        let words = [codeword(1), codeword(-1), codeword(2), codeword(7)];
        let sf_len = words.iter().map(|w| w.1).sum::<u32>();

        // The escape value 3 completes the last difference.
        let mut all = words.to_vec();
        all.push((2, 3));
        let buf = pack(&all);

        let info_rvlc = RvlcInfo {
            dpcm_noise_nrg: 256,
            sf_escapes_present: true,
            length_of_rvlc_escapes: 3,
            ..rvlc(sf_len)
        };

        let mut bs = BitCursor::new(&buf);
        let sf = info_rvlc.decode(&mut bs, &info, &sections(&cbs), 100).unwrap();

        assert_eq!(&sf[0][..6], &[101, 10, 9, 2, 0, 111]);
        assert_eq!(bs.processed_bits(), u64::from(sf_len + 3));
    }

    #[test]
    fn verify_backward_recovery() {
        let cbs = [Codebook::Spectral(1); 3];
        let info = IcsInfo { max_sfb: 3, num_swb: 49, ..IcsInfo::default() };

        // An invalid first codeword, then the differences +2 and -1. The last scale factor is
        // 102.
        let words = [(50, 6), codeword(2), codeword(-1)];
        let buf = pack(&words);

        let info_rvlc = RvlcInfo { rev_global_gain: 102, ..rvlc(14) };

        let mut bs = BitCursor::new(&buf);
        let sf = info_rvlc.decode(&mut bs, &info, &sections(&cbs), 100).unwrap();

        assert_eq!(&sf[0][..3], &[101, 103, 102]);
    }

    #[test]
    fn verify_decode_idempotence() {
        let cbs = [Codebook::Spectral(1), Codebook::Noise, Codebook::Spectral(1)];
        let info = IcsInfo { max_sfb: 3, num_swb: 49, ..IcsInfo::default() };

        // A clean window, and one with an invalid first codeword that needs the backward pass.
        let clean = [codeword(1), codeword(-2)];
        let broken = [(50, 6), codeword(-2), codeword(3)];

        let cases = [(&clean[..], [101, 10, 99]), (&broken[..], [101, -246, 104])];

        for (words, expected) in cases {
            let sf_len = words.iter().map(|w| w.1).sum::<u32>();

            // Five unrelated bits ahead of the window.
            let mut all = vec![(0b10110, 5)];
            all.extend_from_slice(words);
            let buf = pack(&all);

            let info_rvlc = RvlcInfo { rev_global_gain: 104, dpcm_noise_nrg: 256, ..rvlc(sf_len) };

            let mut bs = BitCursor::new(&buf);
            bs.ignore_bits(5);
            let start = bs.processed_bits();

            let first = info_rvlc.decode(&mut bs, &info, &sections(&cbs), 100).unwrap();
            let end = bs.processed_bits();

            bs.reset_to(start);
            let second = info_rvlc.decode(&mut bs, &info, &sections(&cbs), 100).unwrap();

            assert_eq!(first[0][..3], expected);
            assert_eq!(first, second);
            assert_eq!(end, start + u64::from(sf_len));
            assert_eq!(bs.processed_bits(), end);
        }
    }

    #[test]
    fn verify_unrecoverable() {
        let cbs = [Codebook::Spectral(1); 3];
        let info = IcsInfo { max_sfb: 3, num_swb: 49, ..IcsInfo::default() };

        // Two bits can not hold three scale factors in either direction.
        let buf = [0b1100_0000];

        let mut bs = BitCursor::new(&buf);
        let res = rvlc(2).decode(&mut bs, &info, &sections(&cbs), 100);

        assert_eq!(res.err(), Some(Error::ErScaleFactorBitError));
    }

    #[test]
    fn verify_side_info() {
        let info = IcsInfo::default();

        // Concealment, rev_global_gain 0x80, sf length 20, noise energy 300, escapes present
        // with length 5, noise last position 7.
        let buf = pack(&[(1, 1), (0x80, 8), (20, 9), (300, 9), (1, 1), (5, 8), (7, 9)]);
        let mut bs = BitCursor::new(&buf);

        let rvlc = RvlcInfo::read(&mut bs, &info, true).unwrap();

        assert!(rvlc.sf_concealment);
        assert_eq!(rvlc.rev_global_gain, 0x80);
        assert_eq!(rvlc.length_of_rvlc_sf, 11);
        assert_eq!(rvlc.dpcm_noise_nrg, 300);
        assert_eq!(rvlc.length_of_rvlc_escapes, 5);
        assert_eq!(rvlc.dpcm_noise_last_position, 7);

        // The length must cover the noise energy.
        let buf = pack(&[(0, 1), (0, 8), (8, 9), (0, 9), (0, 1), (0, 9)]);
        let mut bs = BitCursor::new(&buf);
        assert_eq!(RvlcInfo::read(&mut bs, &info, true).err(), Some(Error::ErScaleFactorBitError));
    }
}
