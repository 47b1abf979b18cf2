// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use lyra_core::errors::{Error, Result};
use lyra_core::io::{BitCursor, ReadBits};

use crate::aac::codebooks::Codebook;
use crate::aac::common::*;
use crate::aac::huffman::decode_scale_factor;
use crate::aac::ics::section::Sections;
use crate::aac::ics::IcsInfo;

/// The scale factor of every band. Spectral bands hold the gain, noise bands the noise energy,
/// and intensity bands the intensity position.
pub type ScaleFactors = [[i16; MAX_SFBS]; MAX_WINDOWS];

/// Decodes the differentially coded scale factors.
///
/// Only the spectral gains are range checked. Intensity positions and noise energies are
/// accumulated without bounds, the way the reversible (RVLC) coding of the same values is.
pub fn read_scale_factors(
    bs: &mut BitCursor<'_>,
    info: &IcsInfo,
    sections: &Sections,
    global_gain: u8,
) -> Result<ScaleFactors> {
    let mut scale_factors = [[0; MAX_SFBS]; MAX_WINDOWS];

    let mut noise_pcm_flag = true;
    let mut scale_factor = i16::from(global_gain);
    let mut is_position = 0i16;
    let mut noise_energy = i16::from(global_gain) - 90;

    for g in 0..info.num_window_groups {
        for sfb in 0..info.max_sfb {
            scale_factors[g][sfb] = match sections.sfb_cb[g][sfb] {
                Codebook::Zero => 0,
                Codebook::IntensityInPhase | Codebook::IntensityOutOfPhase => {
                    is_position += decode_scale_factor(bs)?;
                    is_position
                }
                Codebook::Noise => {
                    if noise_pcm_flag {
                        noise_pcm_flag = false;
                        noise_energy += bs.read_bits_leq32(9) as i16 - 256;
                    }
                    else {
                        noise_energy += decode_scale_factor(bs)?;
                    }

                    noise_energy
                }
                _ => {
                    scale_factor += decode_scale_factor(bs)?;

                    validate!((0..256).contains(&scale_factor), Error::ScaleFactorRange);

                    scale_factor
                }
            };
        }
    }

    Ok(scale_factors)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::aac::ics::StreamParams;
    use crate::common::{DecoderConfig, ObjectType};

    // Scale factor codewords for the differences 0, +1, -1, and -60.
    const CW_ZERO: (u32, u32) = (0b0, 1);
    const CW_PLUS_ONE: (u32, u32) = (0b1010, 4);
    const CW_MINUS_ONE: (u32, u32) = (0b100, 3);
    const CW_MINUS_SIXTY: (u32, u32) = (0x3ffe8, 18);

    fn pack(words: &[(u32, u32)]) -> Vec<u8> {
        let mut bits = Vec::new();
        for &(code, len) in words {
            for i in (0..len).rev() {
                bits.push((code >> i) & 1 == 1);
            }
        }
        let mut buf = vec![0u8; (bits.len() + 7) / 8 + 1];
        for (i, &bit) in bits.iter().enumerate() {
            if bit {
                buf[i / 8] |= 0x80 >> (i % 8);
            }
        }
        buf
    }

    fn sections(cbs: &[Codebook]) -> Sections {
        let mut sections = Sections::default();
        for (sfb, &cb) in cbs.iter().enumerate() {
            sections.sfb_cb[0][sfb] = cb;
        }
        sections
    }

    #[test]
    fn verify_scale_factors() {
        let cbs = [
            Codebook::Spectral(1),
            Codebook::Zero,
            Codebook::Spectral(5),
            Codebook::Noise,
            Codebook::Noise,
            Codebook::IntensityInPhase,
        ];

        let info = IcsInfo { max_sfb: cbs.len(), num_swb: 49, ..IcsInfo::default() };

        // Spectral +1, spectral -1, noise PCM 256 + 3, noise -1, intensity +1.
        let buf = pack(&[CW_PLUS_ONE, CW_MINUS_ONE, (259, 9), CW_MINUS_ONE, CW_PLUS_ONE]);
        let mut bs = BitCursor::new(&buf);

        let sf = read_scale_factors(&mut bs, &info, &sections(&cbs), 100).unwrap();

        assert_eq!(&sf[0][..6], &[101, 0, 100, 13, 12, 1]);
    }

    #[test]
    fn verify_scale_factor_range() {
        let cbs = [Codebook::Spectral(1)];
        let info = IcsInfo { max_sfb: 1, num_swb: 49, ..IcsInfo::default() };

        let buf = pack(&[CW_PLUS_ONE]);
        let mut bs = BitCursor::new(&buf);
        let res = read_scale_factors(&mut bs, &info, &sections(&cbs), 255);
        assert_eq!(res.err(), Some(Error::ScaleFactorRange));

        let buf = pack(&[CW_ZERO]);
        let mut bs = BitCursor::new(&buf);
        let sf = read_scale_factors(&mut bs, &info, &sections(&cbs), 255).unwrap();
        assert_eq!(sf[0][0], 255);
    }

    #[test]
    fn verify_unbounded_intensity_positions() {
        let cbs = [Codebook::IntensityOutOfPhase; 4];
        let info = IcsInfo { max_sfb: 4, num_swb: 49, ..IcsInfo::default() };

        let buf = pack(&[CW_MINUS_SIXTY; 4]);
        let mut bs = BitCursor::new(&buf);

        let sf = read_scale_factors(&mut bs, &info, &sections(&cbs), 100).unwrap();

        assert_eq!(&sf[0][..4], &[-60, -120, -180, -240]);
    }

    #[test]
    fn verify_scale_factor_idempotence() {
        let params = StreamParams::new(&DecoderConfig::new(ObjectType::Lc, 4, 2)).unwrap();
        let info = IcsInfo { max_sfb: 5, num_swb: 49, ..IcsInfo::default() };

        // Three unrelated bits, then the sections: codebook 1 for 1 band, noise for 2 bands,
        // intensity for 1 band, and codebook 5 for 1 band.
        let mut words = vec![(0b101, 3), (1, 4), (1, 5), (13, 4), (2, 5), (15, 4), (1, 5), (5, 4)];
        words.push((1, 5));
        // Spectral +1, noise PCM 256 + 3, noise -1, intensity +1, spectral -1.
        words.extend_from_slice(&[CW_PLUS_ONE, (259, 9), CW_MINUS_ONE, CW_PLUS_ONE, CW_MINUS_ONE]);

        let buf = pack(&words);
        let mut bs = BitCursor::new(&buf);
        bs.ignore_bits(3);

        let start = bs.processed_bits();

        let decode = |bs: &mut BitCursor<'_>| {
            let sections = Sections::read(bs, &info, &params).unwrap();
            let sf = read_scale_factors(bs, &info, &sections, 100).unwrap();
            (sections.sfb_cb, sf, bs.processed_bits())
        };

        let first = decode(&mut bs);

        bs.reset_to(start);
        let second = decode(&mut bs);

        assert_eq!(&first.1[0][..5], &[101, 13, 12, 1, 100]);
        assert_eq!(first.2, start + 36 + 4 + 9 + 3 + 4 + 3);
        assert_eq!(first, second);
    }
}
