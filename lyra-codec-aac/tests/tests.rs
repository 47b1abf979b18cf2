// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use lyra_codec_aac::{AacDecoder, DecoderConfig, ObjectType};
use lyra_core::errors::Error;

/// Writes bits most-significant bit first.
#[derive(Default)]
struct BitWriter {
    buf: Vec<u8>,
    len: usize,
}

impl BitWriter {
    fn write(&mut self, value: u32, n_bits: u32) -> &mut Self {
        for i in (0..n_bits).rev() {
            if self.len % 8 == 0 {
                self.buf.push(0);
            }

            if (value >> i) & 1 == 1 {
                *self.buf.last_mut().unwrap() |= 0x80 >> (self.len % 8);
            }

            self.len += 1;
        }
        self
    }

    fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

const ID_SCE: u32 = 0;
const ID_CPE: u32 = 1;
const ID_CCE: u32 = 2;
const ID_PCE: u32 = 5;
const ID_FIL: u32 = 6;
const ID_END: u32 = 7;

/// A long window info without prediction.
fn write_ics_info(bw: &mut BitWriter, max_sfb: u32) {
    bw.write(0, 1).write(0, 2).write(0, 1).write(max_sfb, 6).write(0, 1);
}

/// No pulse, TNS, or gain control data.
fn write_no_tools(bw: &mut BitWriter) {
    bw.write(0, 1).write(0, 1).write(0, 1);
}

/// A silent channel stream.
fn write_silent_ics(bw: &mut BitWriter, common_window: bool) {
    bw.write(100, 8);

    if !common_window {
        write_ics_info(bw, 0);
    }

    write_no_tools(bw);
}

/// A channel stream with a single band coded with codebook 1 holding the quadruple (0, 0, 0, 1).
fn write_tone_ics(bw: &mut BitWriter) {
    bw.write(100, 8);
    write_ics_info(bw, 1);
    // Section: codebook 1 over 1 band.
    bw.write(1, 4).write(1, 5);
    // Scale factor delta 0.
    bw.write(0, 1);
    write_no_tools(bw);
    // Spectral data.
    bw.write(0b10100, 5);
}

fn silent_stereo_frame() -> Vec<u8> {
    let mut bw = BitWriter::default();

    bw.write(ID_CPE, 3).write(0, 4);
    // Common window and no M/S.
    bw.write(1, 1);
    write_ics_info(&mut bw, 0);
    bw.write(0, 2);

    write_silent_ics(&mut bw, true);
    write_silent_ics(&mut bw, true);

    bw.write(ID_END, 3);
    bw.finish()
}

fn decoder(object_type: ObjectType, channel_configuration: u8) -> AacDecoder {
    AacDecoder::try_new(&DecoderConfig::new(object_type, 4, channel_configuration)).unwrap()
}

fn error_code<T>(res: Result<T, Error>) -> u8 {
    match res {
        Ok(_) => 0,
        Err(err) => err.code(),
    }
}

#[test]
fn verify_silent_stereo_frame() {
    let mut decoder = decoder(ObjectType::Lc, 2);

    let mut buf = silent_stereo_frame();
    // Bytes after the end of the frame are not consumed.
    buf.extend_from_slice(&[0xff; 4]);

    let frame = decoder.decode(&buf).unwrap();

    assert_eq!(frame.channels, 2);
    assert_eq!(frame.frame_length, 1024);
    assert_eq!(frame.samples.len(), 2048);
    assert!(frame.samples.iter().all(|&s| s == 0.0));
    // 3 + 4 + 1 + 11 + 2 + 2 * 11 + 3 bits.
    assert_eq!(frame.bytes_consumed, 6);
    assert_eq!(frame.object_type, ObjectType::Lc);
    assert_eq!(decoder.frame_number(), 1);
}

#[test]
fn verify_tag_skip() {
    let mut decoder = decoder(ObjectType::Lc, 2);

    let mut buf = b"TAG".to_vec();
    buf.resize(128, 0x20);

    let frame = decoder.decode(&buf).unwrap();

    assert_eq!(frame.channels, 0);
    assert!(frame.samples.is_empty());
    assert_eq!(frame.bytes_consumed, 128);

    // Too short for a tag, decoded as a frame starting with a coupling channel element.
    assert_eq!(error_code(decoder.decode(b"TAG")), 6);
}

#[test]
fn verify_frame_errors() {
    let mut decoder = decoder(ObjectType::Lc, 2);

    assert_eq!(error_code(decoder.decode(&[])), 14);

    let mut bw = BitWriter::default();
    bw.write(ID_CCE, 3).write(0, 5);
    assert_eq!(error_code(decoder.decode(&bw.finish())), 6);

    // A program config element after a fill element.
    let mut bw = BitWriter::default();
    bw.write(ID_FIL, 3).write(0, 4).write(ID_PCE, 3).write(0, 6);
    assert_eq!(error_code(decoder.decode(&bw.finish())), 31);

    // Truncated channel pair.
    let mut bw = BitWriter::default();
    bw.write(ID_CPE, 3).write(0, 4).write(1, 1);
    assert_eq!(error_code(decoder.decode(&bw.finish())), 14);

    // The decoder recovers on the next frame.
    assert!(decoder.decode(&silent_stereo_frame()).is_ok());
}

#[test]
fn verify_fill_only_frame() {
    let mut decoder = decoder(ObjectType::Lc, 2);

    let mut bw = BitWriter::default();
    bw.write(ID_FIL, 3).write(2, 4).write(0xa5a5, 16).write(ID_END, 3);

    let frame = decoder.decode(&bw.finish()).unwrap();

    assert_eq!(frame.channels, 0);
    assert!(frame.samples.is_empty());
    assert_eq!(frame.bytes_consumed, 4);
}

#[test]
fn verify_channel_config_change() {
    let mut decoder = decoder(ObjectType::Lc, 0);

    let mut bw = BitWriter::default();
    bw.write(ID_SCE, 3).write(0, 4);
    write_silent_ics(&mut bw, false);
    bw.write(ID_END, 3);

    let frame = decoder.decode(&bw.finish()).unwrap();
    assert_eq!(frame.channels, 1);
    assert_eq!(frame.bytes_consumed, 4);

    // The first element changes from a single channel to a pair.
    assert_eq!(error_code(decoder.decode(&silent_stereo_frame())), 21);

    // Forgetting the layout accepts the new one.
    decoder.reset();
    assert_eq!(decoder.decode(&silent_stereo_frame()).unwrap().channels, 2);
}

#[test]
fn verify_overlap_and_seek_reset() {
    let mut decoder = decoder(ObjectType::Lc, 1);

    let mut bw = BitWriter::default();
    bw.write(ID_SCE, 3).write(0, 4);
    write_tone_ics(&mut bw);
    bw.write(ID_END, 3);
    let tone = bw.finish();

    let mut bw = BitWriter::default();
    bw.write(ID_SCE, 3).write(0, 4);
    write_silent_ics(&mut bw, false);
    bw.write(ID_END, 3);
    let silence = bw.finish();

    let frame = decoder.decode(&tone).unwrap();
    assert!(frame.samples.iter().all(|s| s.is_finite() && s.abs() < 1.0));
    assert!(frame.samples.iter().any(|&s| s != 0.0));

    // The second half of the tone's window overlaps the next frame.
    let frame = decoder.decode(&silence).unwrap();
    assert!(frame.channel(0).iter().any(|&s| s != 0.0));

    decoder.decode(&tone).unwrap();
    decoder.post_seek_reset(Some(100));
    assert_eq!(decoder.frame_number(), 100);

    let frame = decoder.decode(&silence).unwrap();
    assert!(frame.samples.iter().all(|&s| s == 0.0));
    assert_eq!(decoder.frame_number(), 101);
}

#[test]
fn verify_error_resilient_frame() {
    let mut decoder = decoder(ObjectType::ErLc, 1);

    // No element ids and no end marker.
    let mut bw = BitWriter::default();
    write_silent_ics(&mut bw, false);

    let frame = decoder.decode(&bw.finish()).unwrap();

    assert_eq!(frame.channels, 1);
    assert_eq!(frame.bytes_consumed, 3);
    assert!(frame.samples.iter().all(|&s| s == 0.0));
}

#[test]
fn verify_low_delay_frame() {
    let mut decoder = decoder(ObjectType::Ld, 2);

    let mut bw = BitWriter::default();
    // Common window and no M/S.
    bw.write(1, 1);
    write_ics_info(&mut bw, 0);
    bw.write(0, 2);
    write_silent_ics(&mut bw, true);
    write_silent_ics(&mut bw, true);

    let frame = decoder.decode(&bw.finish()).unwrap();

    assert_eq!(frame.channels, 2);
    assert_eq!(frame.frame_length, 512);
    assert_eq!(frame.samples.len(), 1024);

    // Low delay frames only use long windows.
    let mut bw = BitWriter::default();
    bw.write(0, 1).write(100, 8).write(0, 1).write(2, 2).write(0, 1).write(0, 4).write(0, 7);
    assert_eq!(error_code(decoder.decode(&bw.finish())), 32);
}

#[test]
fn verify_unsupported_configs() {
    let res = AacDecoder::try_new(&DecoderConfig::new(ObjectType::Ltp, 4, 2));
    assert_eq!(error_code(res), 26);

    let res = AacDecoder::try_new(&DecoderConfig::new(ObjectType::Ssr, 4, 2));
    assert_eq!(error_code(res), 1);

    let res = AacDecoder::try_new(&DecoderConfig::new(ObjectType::ErLc, 4, 0));
    assert_eq!(error_code(res), 7);

    let res = AacDecoder::try_new(&DecoderConfig::new(ObjectType::Lc, 12, 2));
    assert_eq!(error_code(res), 32);
}
