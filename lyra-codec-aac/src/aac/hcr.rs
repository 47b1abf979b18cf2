// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Huffman codeword reordering (HCR) of error resilient spectral data.
//!
//! The spectral data is split into segments of the longest codeword length. Priority codewords
//! (PCWs) start at the beginning of each segment, in an order that places the codewords of the
//! most important codebooks first. The remaining codewords are then spread over the unused ends
//! of the segments, which are read backwards, in a fixed number of sets and trials.

use lyra_core::errors::{decode_error, Error, Result};
use lyra_core::io::{BitCursor, ReadBits};

use crate::aac::codebooks::Codebook;
use crate::aac::common::*;
use crate::aac::huffman::{decode_spectral, BitWindow};
use crate::aac::ics::{Ics, StreamParams};

/// Codebook priority order.
const PRESORT_STD: [u8; 6] = [11, 9, 7, 5, 3, 1];

/// Codebook priority order with virtual codebooks.
#[rustfmt::skip]
const PRESORT_ER: [u8; 22] = [
    11, 31, 30, 29, 28, 27, 26, 25, 24, 23, 22, 21, 20, 19, 18, 17, 16, 9, 7, 5, 3, 1,
];

/// A non-priority codeword awaiting its bits.
#[derive(Copy, Clone)]
struct Codeword {
    cb: Codebook,
    /// The offset of the codeword's first value in the quantized spectrum.
    sp: usize,
    /// The bits of the codeword collected from previous sets.
    bits: BitWindow,
    decoded: bool,
}

/// Checks if a section codebook is sorted into the priority class of `sort_cb`. An unsigned
/// codebook and its signed sibling share a class.
fn is_good_cb(sort_cb: u8, cb: Codebook) -> bool {
    let idx = cb.index();

    if !matches!(idx, 1..=11 | 16..=31) {
        return false;
    }

    idx == sort_cb || (sort_cb < 11 && idx == sort_cb + 1)
}

/// Decodes the reordered spectral data of a channel stream into `quant`.
pub fn reordered_spectral_data(
    bs: &mut BitCursor<'_>,
    ics: &Ics,
    params: &StreamParams,
    quant: &mut [i32],
) -> Result<()> {
    let len = ics.reordered_spectral_data_len;
    let longest = ics.longest_codeword_len;

    if len == 0 {
        return Ok(());
    }

    validate!(longest > 0 && len >= longest, Error::SpectralHuffman);

    let info = &ics.info;
    let sections = &ics.sections;
    let bands = info.bands(params);
    let nshort = params.sbinfo.short_len();
    let swb_offset_max = bands[bands.len() - 1];

    // The offset of each window group in the quantized spectrum.
    let mut sp_offset = [0; MAX_WINDOWS];

    for g in 1..info.num_window_groups {
        sp_offset[g] = sp_offset[g - 1] + nshort * info.window_group_len[g - 1];
    }

    let presort: &[u8] = if params.section_resilience { &PRESORT_ER } else { &PRESORT_STD };

    let mut segments: Vec<BitWindow> = Vec::new();
    let mut codewords: Vec<Codeword> = Vec::new();

    let mut pcws_done = false;
    let mut bits_read = 0;

    // Step 1: decode the priority codewords and sort the others.
    for &sort_cb in presort {
        for sfb in 0..info.max_sfb {
            let width = bands[sfb + 1].min(swb_offset_max) - bands[sfb];

            for w_idx in 0..(width + 3) / 4 {
                for g in 0..info.num_window_groups {
                    let glen = info.window_group_len[g];

                    for i in 0..sections.num_sec[g] {
                        let cb = sections.sect_cb[g][i];

                        if sfb < sections.sect_start[g][i]
                            || sfb >= sections.sect_end[g][i]
                            || !is_good_cb(sort_cb, cb)
                        {
                            continue;
                        }

                        let inc = if cb.is_quad() { 4 } else { 2 };
                        let group_cws_count = 4 * glen / inc;
                        let sect_sfb_size = glen * (bands[sfb + 1] - bands[sfb]);
                        let seg_width = cb.max_codeword_len().min(longest);

                        let mut cws = 0;

                        while cws < group_cws_count && cws + w_idx * group_cws_count < sect_sfb_size
                        {
                            let sp = sp_offset[g]
                                + glen * bands[sfb]
                                + inc * (cws + w_idx * group_cws_count);

                            validate!(sp + inc <= quant.len(), Error::IndexOutOfRange);

                            if !pcws_done && bits_read + seg_width <= len {
                                let mut segment = BitWindow::read_from(bs, seg_width);
                                bits_read += seg_width;

                                decode_spectral(cb, &mut segment, &mut quant[sp..sp + inc])?;

                                segment.reverse();
                                segments.push(segment);
                            }
                            else {
                                if !pcws_done {
                                    // The bits that do not fill a whole segment extend the last.
                                    if bits_read < len {
                                        let mut extra = BitWindow::read_from(bs, len - bits_read);
                                        bits_read = len;

                                        extra.reverse();

                                        match segments.last_mut() {
                                            Some(last) => last.prepend(&extra)?,
                                            None => return decode_error(Error::SpectralHuffman),
                                        }
                                    }

                                    pcws_done = true;
                                }

                                codewords.push(Codeword {
                                    cb,
                                    sp,
                                    bits: BitWindow::default(),
                                    decoded: false,
                                });
                            }

                            cws += 1;
                        }
                    }
                }
            }
        }
    }

    if bits_read < len {
        bs.ignore_bits(len - bits_read);
    }

    validate!(!bs.has_error(), Error::InputTooSmall);

    let num_segments = segments.len();

    validate!(num_segments > 0, Error::SpectralHuffman);

    // Step 2: decode the non-priority codewords from the segment ends.
    let num_sets = (num_segments + codewords.len()) / num_segments;

    for set in 1..=num_sets {
        for trial in 0..num_segments {
            for base in 0..num_segments {
                let cw_idx = base + (set - 1) * num_segments;

                if cw_idx >= codewords.len() {
                    break;
                }

                let segment = &mut segments[(trial + base) % num_segments];
                let cw = &mut codewords[cw_idx];

                if cw.decoded || segment.is_empty() {
                    continue;
                }

                segment.prepend(&cw.bits)?;

                let saved = *segment;

                let inc = if cw.cb.is_quad() { 4 } else { 2 };

                if decode_spectral(cw.cb, segment, &mut quant[cw.sp..cw.sp + inc])? {
                    cw.decoded = true;
                }
                else {
                    // Incomplete, keep the bits for the next segment.
                    cw.bits = saved;
                    *segment = BitWindow::default();
                }
            }
        }

        for segment in segments.iter_mut() {
            segment.reverse();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::aac::ics::IcsInfo;
    use crate::common::{DecoderConfig, ObjectType};

    fn params() -> StreamParams {
        let config = DecoderConfig::new(ObjectType::ErLc, 4, 1).with_resilience(false, false, true);
        StreamParams::new(&config).unwrap()
    }

    /// A long window with a single band coded with codebook 5.
    fn ics(len: u32, longest: u32) -> Ics {
        ics_bands(1, len, longest)
    }

    /// A long window with one section of codebook 5 over `max_sfb` bands.
    fn ics_bands(max_sfb: usize, len: u32, longest: u32) -> Ics {
        let mut ics = Ics::with_info(&IcsInfo { max_sfb, num_swb: 49, ..IcsInfo::default() });

        ics.sections.num_sec[0] = 1;
        ics.sections.sect_cb[0][0] = Codebook::Spectral(5);
        ics.sections.sect_end[0][0] = max_sfb;
        ics.sections.sfb_cb[0][..max_sfb].fill(Codebook::Spectral(5));
        ics.reordered_spectral_data_len = len;
        ics.longest_codeword_len = longest;
        ics
    }

    #[test]
    fn verify_empty_and_invalid_lengths() {
        let params = params();
        let mut quant = vec![0; 1024];

        let mut bs = BitCursor::new(&[0xff]);
        assert_eq!(reordered_spectral_data(&mut bs, &ics(0, 0), &params, &mut quant), Ok(()));
        assert_eq!(bs.processed_bits(), 0);

        let res = reordered_spectral_data(&mut bs, &ics(8, 0), &params, &mut quant);
        assert_eq!(res, Err(Error::SpectralHuffman));

        let res = reordered_spectral_data(&mut bs, &ics(3, 4), &params, &mut quant);
        assert_eq!(res, Err(Error::SpectralHuffman));
    }

    #[test]
    fn verify_priority_codewords() {
        let params = params();
        let mut quant = vec![0; 1024];

        // Two segments of 4 bits: (0, 1) and (1, 0).
        let buf = [0b1010_1001];
        let mut bs = BitCursor::new(&buf);

        reordered_spectral_data(&mut bs, &ics(8, 4), &params, &mut quant).unwrap();

        assert_eq!(&quant[..4], &[0, 1, 1, 0]);
        assert_eq!(bs.processed_bits(), 8);
    }

    #[test]
    fn verify_non_priority_codeword() {
        let params = params();
        let mut quant = vec![0; 1024];

        // A segment of 4 bits holds the priority codeword (0, 0) as a single 0 bit. The second
        // codeword (1, 0), 1001, does not fit another segment. It is read backwards from the end
        // of the 2 remaining bits, then backwards from the end of the first segment.
        let buf = [0b0010_0100];
        let mut bs = BitCursor::new(&buf);

        reordered_spectral_data(&mut bs, &ics(6, 4), &params, &mut quant).unwrap();

        assert_eq!(&quant[..4], &[0, 0, 1, 0]);
        assert_eq!(bs.processed_bits(), 6);
    }

    #[test]
    fn verify_unused_bits_are_skipped() {
        let params = params();
        let mut quant = vec![0; 1024];

        // Two 1 bit priority codewords with 8 bits of padding.
        let buf = [0b0011_1111, 0b1100_0000];
        let mut bs = BitCursor::new(&buf);

        reordered_spectral_data(&mut bs, &ics(10, 1), &params, &mut quant).unwrap();

        assert!(quant.iter().all(|&q| q == 0));
        assert_eq!(bs.processed_bits(), 10);
    }

    #[test]
    fn verify_segment_passes_terminate() {
        let params = params();
        let ics = ics_bands(4, 14, 4);

        // Four bands of codebook 5 hold 8 codewords. The 14 bits make 3 segments of 4 bits, the
        // last extended by the 2 remaining bits, so 5 codewords are spread over the segment ends
        // in 2 sets. Two of them only complete after moving on to another segment.
        let good = [0b0101_0110, 0b0011_0000];
        // Codewords that never complete within their sets are left untouched.
        let garbage = [0b1011_1011, 0b1011_1000];

        #[rustfmt::skip]
        let cases: [(&[u8], [i32; 16]); 2] = [
            (&good, [0, 0, 0, 0, 0, 0, 0, -1, 0, 0, 0, 0, 0, 0, 0, -1]),
            (&garbage, [0, -1, 0, -1, 0, -1, 99, 99, 99, 99, 0, 0, 99, 99, 99, 99]),
        ];

        for (buf, expected) in cases {
            // Decoding the same data again gives the same result.
            for _ in 0..2 {
                let mut quant = vec![99; 1024];
                let mut bs = BitCursor::new(buf);

                reordered_spectral_data(&mut bs, &ics, &params, &mut quant).unwrap();

                assert_eq!(quant[..16], expected);
                assert!(quant[16..].iter().all(|&q| q == 99));
                assert_eq!(bs.processed_bits(), 14);
            }
        }

        // Truncated data fails the same way every time.
        for _ in 0..2 {
            let mut quant = vec![99; 1024];
            let mut bs = BitCursor::new(&good[..1]);

            let res = reordered_spectral_data(&mut bs, &ics, &params, &mut quant);
            assert_eq!(res, Err(Error::InputTooSmall));
        }
    }
}
