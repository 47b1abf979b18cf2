// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use lyra_core::errors::{decode_error, unsupported_error, Error, Result};
use lyra_core::io::{BitCursor, ReadBits};

use log::{trace, warn};

mod codebooks;
mod common;
mod element;
mod filterbank;
mod hcr;
mod huffman;
mod ics;
mod pns;
mod rvlc;
mod stereo;
mod window;

use crate::common::{DecoderConfig, ObjectType};
use common::*;
use element::{ChannelState, ElementDecoder};
use filterbank::Filterbank;
use ics::StreamParams;
use pns::NoiseGeneratorState;

const ID_SCE: u32 = 0;
const ID_CPE: u32 = 1;
const ID_CCE: u32 = 2;
const ID_LFE: u32 = 3;
const ID_DSE: u32 = 4;
const ID_PCE: u32 = 5;
const ID_FIL: u32 = 6;
const ID_END: u32 = 7;

/// The size of an ID3v1 tag.
const ID3V1_TAG_LEN: usize = 128;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ElementType {
    Single,
    Pair,
    LowFrequency,
}

/// The elements of error resilient frames, in channel configuration order.
fn er_element_layout(channel_configuration: u8) -> Result<&'static [ElementType]> {
    use ElementType::*;

    let layout: &'static [ElementType] = match channel_configuration {
        1 => &[Single],
        2 => &[Pair],
        3 => &[Single, Pair],
        4 => &[Single, Pair, Single],
        5 => &[Single, Pair, Pair],
        6 => &[Single, Pair, Pair, LowFrequency],
        7 => &[Single, Pair, Pair, Pair, LowFrequency],
        _ => return decode_error(Error::ErChannelConfig),
    };

    Ok(layout)
}

/// The channels assigned to an audio element on the first frame that carried it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct ElementSlot {
    channel: usize,
    is_pair: bool,
}

/// Reads a program config element and returns the number of channels it describes.
fn read_program_config<B: ReadBits>(bs: &mut B) -> usize {
    // Element instance tag, object type, and sample rate index.
    bs.ignore_bits(4 + 2 + 4);

    let num_front = bs.read_bits_leq32(4);
    let num_side = bs.read_bits_leq32(4);
    let num_back = bs.read_bits_leq32(4);
    let num_lfe = bs.read_bits_leq32(2);
    let num_assoc_data = bs.read_bits_leq32(3);
    let num_valid_cc = bs.read_bits_leq32(4);

    // Mono and stereo mixdown element numbers.
    for _ in 0..2 {
        if bs.read_bool() {
            bs.ignore_bits(4);
        }
    }

    // Matrix mixdown index and pseudo surround flag.
    if bs.read_bool() {
        bs.ignore_bits(3);
    }

    let mut channels = 0;

    for _ in 0..num_front + num_side + num_back {
        channels += if bs.read_bool() { 2 } else { 1 };
        bs.ignore_bits(4);
    }

    channels += num_lfe as usize;

    bs.ignore_bits(4 * (num_lfe + num_assoc_data) + 5 * num_valid_cc);

    bs.realign();

    let comment_len = bs.read_bits_leq32(8);
    bs.ignore_bits(8 * comment_len);

    channels
}

/// One frame of decoded audio.
#[derive(Debug)]
pub struct DecodedFrame<'a> {
    /// The planar samples of every channel, `frame_length` samples per channel.
    pub samples: &'a [f32],
    pub channels: usize,
    pub frame_length: usize,
    /// The number of bytes of the access unit the frame was decoded from.
    pub bytes_consumed: usize,
    pub object_type: ObjectType,
    pub sample_rate_index: u8,
}

impl DecodedFrame<'_> {
    /// Gets the samples of a channel.
    pub fn channel(&self, ch: usize) -> &[f32] {
        &self.samples[ch * self.frame_length..(ch + 1) * self.frame_length]
    }
}

/// Advanced Audio Coding (AAC) decoder.
///
/// Decodes raw access units of the AAC Main, LC, and error resilient LC, LD, and DRM object
/// types as defined in ISO/IEC 13818-7 and ISO/IEC 14496-3.
pub struct AacDecoder {
    config: DecoderConfig,
    params: StreamParams,
    frame_len: usize,
    element: ElementDecoder,
    filterbank: Filterbank,
    slots: Vec<ElementSlot>,
    channels: Vec<ChannelState>,
    rng: NoiseGeneratorState,
    samples: Vec<f32>,
    frame: u64,
}

impl AacDecoder {
    pub fn try_new(config: &DecoderConfig) -> Result<Self> {
        config.validate()?;

        let params = StreamParams::new(config)?;
        let frame_len = config.frame_length();

        Ok(AacDecoder {
            config: *config,
            params,
            frame_len,
            element: ElementDecoder::new(frame_len),
            filterbank: Filterbank::new(frame_len, config.object_type == ObjectType::Ld),
            slots: Vec::new(),
            channels: Vec::new(),
            rng: Default::default(),
            samples: Vec::new(),
            frame: 0,
        })
    }

    /// Gets the configuration the decoder was instantiated with.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Gets the number of frames decoded since instantiation or the last seek.
    pub fn frame_number(&self) -> u64 {
        self.frame
    }

    /// Decodes one access unit.
    ///
    /// On error, the overlap and predictor state of every channel is cleared so that decoding may
    /// resume with the next access unit.
    pub fn decode(&mut self, buf: &[u8]) -> Result<DecodedFrame<'_>> {
        // An ID3v1 tag at the end of a raw stream.
        if buf.len() >= ID3V1_TAG_LEN && buf.starts_with(b"TAG") {
            return Ok(self.frame_of(0, ID3V1_TAG_LEN));
        }

        validate!(!buf.is_empty(), Error::InputTooSmall);

        match self.decode_inner(buf) {
            Ok((channels, bytes_consumed)) => {
                self.frame += 1;
                Ok(self.frame_of(channels, bytes_consumed))
            }
            Err(err) => {
                warn!("frame {} failed to decode: {}", self.frame, err);

                for channel in self.channels.iter_mut() {
                    channel.conceal();
                }

                Err(err)
            }
        }
    }

    /// Prepares the decoder to decode from a new position in the stream.
    pub fn post_seek_reset(&mut self, frame: Option<u64>) {
        for channel in self.channels.iter_mut() {
            channel.reset();
        }

        self.rng = Default::default();

        if let Some(frame) = frame {
            self.frame = frame;
        }
    }

    /// Returns the decoder to its initial state, forgetting the channel layout of the stream.
    pub fn reset(&mut self) {
        self.post_seek_reset(Some(0));
        self.slots.clear();
        self.channels.clear();
    }

    fn frame_of(&self, channels: usize, bytes_consumed: usize) -> DecodedFrame<'_> {
        DecodedFrame {
            samples: &self.samples[..channels * self.frame_len],
            channels,
            frame_length: self.frame_len,
            bytes_consumed,
            object_type: self.config.object_type,
            sample_rate_index: self.config.sample_rate_index,
        }
    }

    /// Decodes a frame and returns the number of channels and bytes consumed.
    fn decode_inner(&mut self, buf: &[u8]) -> Result<(usize, usize)> {
        let mut bs = BitCursor::new(buf);

        let channels = match self.config.object_type {
            ObjectType::DrmErLc => self.decode_drm(&mut bs)?,
            ot if ot.is_error_resilient() => self.decode_er(&mut bs)?,
            _ => self.decode_ga(&mut bs)?,
        };

        validate!(!bs.has_error(), Error::InputTooSmall);

        let bytes_consumed = ((bs.processed_bits() + 7) >> 3) as usize;

        Ok((channels, bytes_consumed))
    }

    /// Assigns channels to the audio element `slot`. The assignment must not change between
    /// frames.
    fn assign(&mut self, slot: usize, channel: usize, is_pair: bool) -> Result<()> {
        let num_channels = if is_pair { 2 } else { 1 };

        validate!(channel + num_channels <= MAX_CHANNELS, Error::InvalidChannelCount);

        let assigned = ElementSlot { channel, is_pair };

        match self.slots.get(slot) {
            Some(prev) => validate!(*prev == assigned, Error::UnexpectedChannelConfigChange),
            None => self.slots.push(assigned),
        }

        while self.channels.len() < channel + num_channels {
            self.channels.push(ChannelState::new(self.frame_len));
        }

        self.samples.resize(self.channels.len() * self.frame_len, 0.0);

        Ok(())
    }

    fn single_element(&mut self, bs: &mut BitCursor<'_>, slot: usize, ch: usize) -> Result<()> {
        self.assign(slot, ch, false)?;

        self.element.read_single(bs, &self.params)?;
        self.synth_single(ch)
    }

    fn pair_element(&mut self, bs: &mut BitCursor<'_>, slot: usize, ch: usize) -> Result<()> {
        self.assign(slot, ch, true)?;

        self.element.read_pair(bs, &self.params)?;
        self.synth_pair(ch)
    }

    fn synth_single(&mut self, ch: usize) -> Result<()> {
        let n = self.frame_len;

        self.element.synth_single(
            &self.params,
            &mut self.filterbank,
            &mut self.rng,
            &mut self.channels[ch],
            &mut self.samples[ch * n..(ch + 1) * n],
        )
    }

    fn synth_pair(&mut self, ch: usize) -> Result<()> {
        let n = self.frame_len;

        let (left, right) = self.channels[ch..ch + 2].split_at_mut(1);
        let (out_left, out_right) = self.samples[ch * n..(ch + 2) * n].split_at_mut(n);

        self.element.synth_pair(
            &self.params,
            &mut self.filterbank,
            &mut self.rng,
            &mut left[0],
            &mut right[0],
            out_left,
            out_right,
        )
    }

    fn decode_ga(&mut self, bs: &mut BitCursor<'_>) -> Result<usize> {
        let mut num_elements = 0;
        let mut slot = 0;
        let mut ch = 0;

        loop {
            let id = bs.read_bits_leq32(3);

            validate!(!bs.has_error(), Error::InputTooSmall);

            if id == ID_END {
                break;
            }

            num_elements += 1;

            validate!(num_elements <= MAX_SYNTAX_ELEMENTS, Error::MaxElementsExceeded);

            trace!("element id={} at bit {}", id, bs.processed_bits() - 3);

            match id {
                ID_SCE | ID_LFE => {
                    let _tag = bs.read_bits_leq32(4);
                    self.single_element(bs, slot, ch)?;
                    slot += 1;
                    ch += 1;
                }
                ID_CPE => {
                    let _tag = bs.read_bits_leq32(4);
                    self.pair_element(bs, slot, ch)?;
                    slot += 1;
                    ch += 2;
                }
                ID_CCE => {
                    log::error!("coupling channel elements are not supported");
                    return unsupported_error(Error::CouplingUnsupported);
                }
                ID_DSE => {
                    let _tag = bs.read_bits_leq32(4);
                    let align = bs.read_bool();

                    let mut count = bs.read_bits_leq32(8);
                    if count == 255 {
                        count += bs.read_bits_leq32(8);
                    }

                    if align {
                        bs.realign();
                    }

                    bs.ignore_bits(8 * count);
                }
                ID_PCE => {
                    // Program config elements are only allowed before all other elements.
                    validate!(num_elements == 1, Error::PceNotFirst);

                    let pce_channels = read_program_config(bs);

                    validate!(pce_channels <= MAX_CHANNELS, Error::ProgramConfigError);
                }
                ID_FIL => {
                    let mut count = bs.read_bits_leq32(4);
                    if count == 15 {
                        count += bs.read_bits_leq32(8);
                        count -= 1;
                    }

                    // Extension payloads are skipped.
                    bs.ignore_bits(8 * count);
                }
                _ => unreachable!(),
            }

            validate!(!bs.has_error(), Error::InputTooSmall);
        }

        bs.realign();

        Ok(ch)
    }

    fn decode_er(&mut self, bs: &mut BitCursor<'_>) -> Result<usize> {
        let layout = er_element_layout(self.config.channel_configuration)?;

        let mut ch = 0;

        for (slot, &element) in layout.iter().enumerate() {
            trace!("element {:?} at bit {}", element, bs.processed_bits());

            match element {
                ElementType::Single | ElementType::LowFrequency => {
                    self.single_element(bs, slot, ch)?;
                    ch += 1;
                }
                ElementType::Pair => {
                    self.pair_element(bs, slot, ch)?;
                    ch += 2;
                }
            }

            validate!(!bs.has_error(), Error::InputTooSmall);
        }

        Ok(ch)
    }

    fn decode_drm(&mut self, bs: &mut BitCursor<'_>) -> Result<usize> {
        let stereo = match self.config.channel_configuration {
            1 => false,
            2 => true,
            _ => return decode_error(Error::ErChannelConfig),
        };

        self.assign(0, 0, stereo)?;

        self.element.read_drm(bs, &self.params, stereo)?;

        if stereo {
            self.synth_pair(0)?;
            Ok(2)
        }
        else {
            self.synth_single(0)?;
            Ok(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_er_layouts() {
        let channels = |chcfg| {
            er_element_layout(chcfg)
                .unwrap()
                .iter()
                .map(|&e| if e == ElementType::Pair { 2 } else { 1 })
                .sum::<usize>()
        };

        assert_eq!(channels(1), 1);
        assert_eq!(channels(2), 2);
        assert_eq!(channels(6), 6);
        assert_eq!(channels(7), 8);
        assert_eq!(er_element_layout(0).err(), Some(Error::ErChannelConfig));
    }

    #[test]
    fn verify_program_config() {
        // Tag, object type, and rate. 2 front elements, 1 side, 0 back, 1 LFE, no data or
        // coupling elements, no mixdowns. Front CPE and SCE, side CPE, then the LFE tag. After
        // byte alignment, a comment of 1 byte.
        let buf = [
            0b0000_0101,
            0b0000_1000,
            0b0100_0001,
            0b0000_0000,
            0b0010_0000,
            0b0000_1000,
            0b0000_0000,
            0b0000_0001,
            b'x',
        ];

        let mut bs = BitCursor::new(&buf);
        assert_eq!(read_program_config(&mut bs), 6);
        assert_eq!(bs.processed_bits(), 72);
        assert!(!bs.has_error());
    }

    #[test]
    fn verify_channel_assignment() {
        let config = DecoderConfig::new(ObjectType::Lc, 4, 0);
        let mut decoder = AacDecoder::try_new(&config).unwrap();

        decoder.assign(0, 0, true).unwrap();
        decoder.assign(1, 2, false).unwrap();
        assert_eq!(decoder.channels.len(), 3);

        // The same layout on the next frame.
        decoder.assign(0, 0, true).unwrap();
        assert_eq!(decoder.assign(1, 2, true).err(), Some(Error::UnexpectedChannelConfigChange));

        assert_eq!(decoder.assign(2, 63, true).err(), Some(Error::InvalidChannelCount));

        decoder.reset();
        assert!(decoder.slots.is_empty());
        decoder.assign(0, 0, false).unwrap();
    }
}
