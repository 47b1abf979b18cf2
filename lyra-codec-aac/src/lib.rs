// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! An Advanced Audio Coding (AAC) decoding core for the Main, LC, and error resilient LC/LD object
//! types.
//!
//! The decoder consumes raw access units. Transport framing (ADTS, LATM, etc.) and the audio
//! specific configuration are parsed elsewhere and delivered as a [`DecoderConfig`].

mod aac;
mod common;

pub use aac::{AacDecoder, DecodedFrame};
pub use common::{DecoderConfig, ObjectType, AAC_SAMPLE_RATES};
