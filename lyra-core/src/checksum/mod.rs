// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `checksum` module provides implementations of common error-detecting codes.

mod crc8;

pub use crc8::Crc8Sae;

use crate::errors::{decode_error, Error, Result};
use crate::io::{BitCursor, Monitor, ReadBits};

/// Verifies a CRC-8 stored, bit-inverted, in the first byte of the stream that covers the `len`
/// bits following it.
///
/// The cursor is rewound to the start of the stream. On return it is positioned after the last
/// protected bit.
pub fn check_crc8(bs: &mut BitCursor<'_>, len: u64) -> Result<()> {
    bs.rewind();

    let expected = !(bs.read_bits_leq32(8) as u8);

    let mut crc = Crc8Sae::new(0xff);

    for _ in 0..len >> 3 {
        crc.process_byte(bs.read_bits_leq32(8) as u8);
    }

    let rem = (len & 0x7) as u32;
    crc.process_bits(bs.read_bits_leq32(rem), rem);

    if crc.crc() != expected {
        log::warn!("crc mismatch: expected={:#04x}, computed={:#04x}", expected, crc.crc());
        return decode_error(Error::CrcMismatch);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_check_crc8() {
        // Protect 13 bits following the CRC byte.
        let payload = [0b1010_0110, 0b1101_1000];

        let mut crc = Crc8Sae::new(0xff);
        crc.process_byte(payload[0]);
        crc.process_bits(u32::from(payload[1] >> 3), 5);

        let buf = [!crc.crc(), payload[0], payload[1]];

        let mut bs = BitCursor::new(&buf);
        bs.ignore_bits(21);
        assert_eq!(check_crc8(&mut bs, 13), Ok(()));
        assert_eq!(bs.processed_bits(), 21);

        let bad = [crc.crc(), payload[0], payload[1]];
        let mut bs = BitCursor::new(&bad);
        assert_eq!(check_crc8(&mut bs, 13), Err(Error::CrcMismatch));
    }
}
