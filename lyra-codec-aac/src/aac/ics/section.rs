// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use lyra_core::errors::{decode_error, Error, Result};
use lyra_core::io::ReadBits;

use crate::aac::codebooks::Codebook;
use crate::aac::common::*;
use crate::aac::ics::{IcsInfo, StreamParams};
use crate::common::ObjectType;

/// The most sections a window group may have. Short windows may have one per band in every
/// window of the group.
pub const MAX_SECTIONS: usize = 120;

/// The codebook assignment of every scale factor band.
#[derive(Clone)]
pub struct Sections {
    pub num_sec: [usize; MAX_WINDOWS],
    pub sect_cb: [[Codebook; MAX_SECTIONS]; MAX_WINDOWS],
    pub sect_start: [[usize; MAX_SECTIONS]; MAX_WINDOWS],
    pub sect_end: [[usize; MAX_SECTIONS]; MAX_WINDOWS],
    pub sfb_cb: [[Codebook; MAX_SFBS]; MAX_WINDOWS],
    /// A band of some group uses perceptual noise substitution.
    pub noise_used: bool,
    /// A band of some group uses intensity stereo.
    pub is_used: bool,
}

impl Default for Sections {
    fn default() -> Self {
        Sections {
            num_sec: [0; MAX_WINDOWS],
            sect_cb: [[Codebook::Zero; MAX_SECTIONS]; MAX_WINDOWS],
            sect_start: [[0; MAX_SECTIONS]; MAX_WINDOWS],
            sect_end: [[0; MAX_SECTIONS]; MAX_WINDOWS],
            sfb_cb: [[Codebook::Zero; MAX_SFBS]; MAX_WINDOWS],
            noise_used: false,
            is_used: false,
        }
    }
}

impl Sections {
    pub fn read<B: ReadBits>(bs: &mut B, info: &IcsInfo, params: &StreamParams) -> Result<Self> {
        let mut sections = Sections::default();

        let resilient = params.section_resilience;

        let (sect_bits, sect_lim) = if info.long_win { (5, MAX_SFBS) } else { (3, MAX_SECTIONS) };
        let sect_esc_val = (1 << sect_bits) - 1;

        let cb_bits = if resilient { 5 } else { 4 };

        for g in 0..info.num_window_groups {
            let mut k = 0;
            let mut i = 0;

            while k < info.max_sfb {
                validate!(!bs.has_error(), Error::InputTooSmall);
                validate!(i < sect_lim, Error::IndexOutOfRange);

                let cb_idx = bs.read_bits_leq32(cb_bits) as u8;

                let cb = match Codebook::from_index(cb_idx) {
                    Some(Codebook::Reserved) | None => {
                        log::debug!("reserved section codebook {}", cb_idx);
                        return decode_error(Error::ValueNotAllowed);
                    }
                    Some(cb) => cb,
                };

                if cb.is_noise() {
                    validate!(params.object_type != ObjectType::DrmErLc, Error::PnsNotAllowed);
                    sections.noise_used = true;
                }
                else if cb.is_intensity() {
                    sections.is_used = true;
                }

                let mut sect_len = 0;

                // With section data resilience, sections of the escape codebooks span one band.
                if resilient && (cb_idx == 11 || cb_idx >= 16) {
                    sect_len = 1;
                }
                else {
                    loop {
                        let sect_len_incr = bs.read_bits_leq32(sect_bits) as usize;

                        sect_len += sect_len_incr;

                        validate!(sect_len <= sect_lim, Error::IndexOutOfRange);

                        if sect_len_incr != sect_esc_val || bs.has_error() {
                            break;
                        }
                    }
                }

                validate!(k + sect_len <= info.max_sfb, Error::ValueNotAllowed);

                sections.sect_cb[g][i] = cb;
                sections.sect_start[g][i] = k;
                sections.sect_end[g][i] = k + sect_len;

                for sfb in k..k + sect_len {
                    sections.sfb_cb[g][sfb] = cb;
                }

                k += sect_len;
                i += 1;
            }

            validate!(k == info.max_sfb, Error::ValueNotAllowed);

            sections.num_sec[g] = i;
        }

        Ok(sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lyra_core::io::BitCursor;

    use crate::common::DecoderConfig;

    fn long_info(max_sfb: usize) -> IcsInfo {
        IcsInfo { max_sfb, num_swb: 49, ..IcsInfo::default() }
    }

    fn params(config: DecoderConfig) -> StreamParams {
        StreamParams::new(&config).unwrap()
    }

    #[test]
    fn verify_section_runs() {
        let params = params(DecoderConfig::new(ObjectType::Lc, 4, 2));

        // Codebook 1 for 3 bands, then codebook 13 for 31 + 2 bands (one escape).
        let buf = [0b0001_0001, 0b1_1101_111, 0b11_00010_0];
        let mut bs = BitCursor::new(&buf);

        let sections = Sections::read(&mut bs, &long_info(36), &params).unwrap();

        assert_eq!(sections.num_sec[0], 2);
        assert_eq!(sections.sect_cb[0][0], Codebook::Spectral(1));
        assert_eq!((sections.sect_start[0][1], sections.sect_end[0][1]), (3, 36));
        assert_eq!(sections.sfb_cb[0][35], Codebook::Noise);
        assert!(sections.noise_used);
        assert!(!sections.is_used);
        assert_eq!(bs.processed_bits(), 23);
    }

    #[test]
    fn verify_section_errors() {
        let params = params(DecoderConfig::new(ObjectType::Lc, 4, 2));

        // Reserved codebook.
        let buf = [0b1100_0000, 0];
        let mut bs = BitCursor::new(&buf);
        let res = Sections::read(&mut bs, &long_info(4), &params);
        assert_eq!(res.err(), Some(Error::ValueNotAllowed));

        // Runs past max_sfb.
        let buf = [0b0001_0010, 0b1_0000000];
        let mut bs = BitCursor::new(&buf);
        let res = Sections::read(&mut bs, &long_info(4), &params);
        assert_eq!(res.err(), Some(Error::ValueNotAllowed));

        // Noise in DRM.
        let drm = params_drm();
        let buf = [0b01101_000, 0];
        let mut bs = BitCursor::new(&buf);
        let res = Sections::read(&mut bs, &long_info(4), &drm);
        assert_eq!(res.err(), Some(Error::PnsNotAllowed));
    }

    fn params_drm() -> StreamParams {
        params(DecoderConfig::new(ObjectType::DrmErLc, 6, 1))
    }

    #[test]
    fn verify_resilient_sections() {
        let params = params_drm();

        // Codebook 11 and 20 span one band each without a run length, then codebook 0 for 2.
        let buf = [0b01011_101, 0b00_00000_0, 0b0010_0000];
        let mut bs = BitCursor::new(&buf);

        let sections = Sections::read(&mut bs, &long_info(4), &params).unwrap();

        assert_eq!(sections.num_sec[0], 3);
        assert_eq!(sections.sfb_cb[0][0], Codebook::ESCAPE);
        assert_eq!(sections.sfb_cb[0][1], Codebook::Vcb11(20));
        assert_eq!(sections.sfb_cb[0][3], Codebook::Zero);
        assert_eq!(bs.processed_bits(), 20);
    }
}
