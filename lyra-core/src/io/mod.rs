// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `io` module implements bit-level readers over in-memory buffers.
//!
//! The readers in this module never fail. Instead, reading past the end of a buffer produces zero
//! bits and raises a sticky error flag which callers check at convenient points.

mod bit;

pub use bit::{BitCursor, ReadBits, RevBitCursor};

/// A `Monitor` provides a common interface to examine the bytes and bits observed by a checksum or
/// hash.
pub trait Monitor {
    fn process_byte(&mut self, byte: u8);

    #[inline(always)]
    fn process_buf_bytes(&mut self, buf: &[u8]) {
        for &byte in buf {
            self.process_byte(byte);
        }
    }
}
