// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::io::Monitor;

/// The generator polynomial, x^8 + x^4 + x^3 + x^2 + 1, without the x^8 term.
const CRC8_SAE_POLY: u8 = 0x1d;

const fn generate_crc8_table() -> [u8; 256] {
    let mut table = [0u8; 256];

    let mut i = 0;
    while i < 256 {
        let mut crc = i as u8;

        let mut j = 0;
        while j < 8 {
            crc = if crc & 0x80 != 0 { (crc << 1) ^ CRC8_SAE_POLY } else { crc << 1 };
            j += 1;
        }

        table[i] = crc;
        i += 1;
    }

    table
}

const CRC8_SAE_TABLE: [u8; 256] = generate_crc8_table();

/// `Crc8Sae` implements the CRC-8 algorithm using the SAE J1850 polynomial. Bits are processed
/// most-significant first, and the register is not reflected.
pub struct Crc8Sae {
    state: u8,
}

impl Crc8Sae {
    /// Instantiate a `Crc8Sae` instance with an initial state.
    pub fn new(state: u8) -> Self {
        Crc8Sae { state }
    }

    /// Process the `n_bits` least-significant bits of `bits`, most-significant bit first.
    pub fn process_bits(&mut self, bits: u32, n_bits: u32) {
        debug_assert!(n_bits <= 32);

        for i in (0..n_bits).rev() {
            let bit = ((bits >> i) & 1) as u8;
            let feedback = bit ^ (self.state >> 7);
            self.state = (self.state << 1) ^ (feedback * CRC8_SAE_POLY);
        }
    }

    /// Returns the computed CRC.
    pub fn crc(&self) -> u8 {
        self.state
    }
}

impl Monitor for Crc8Sae {
    #[inline(always)]
    fn process_byte(&mut self, byte: u8) {
        self.state = CRC8_SAE_TABLE[usize::from(self.state ^ byte)];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crc8_bitwise(state: u8, buf: &[u8]) -> u8 {
        let mut crc = Crc8Sae::new(state);
        for &byte in buf {
            crc.process_bits(u32::from(byte), 8);
        }
        crc.crc()
    }

    #[test]
    fn verify_crc8() {
        // The check value of CRC-8/SAE-J1850 is 0x4b after the final inversion.
        let mut crc = Crc8Sae::new(0xff);
        crc.process_buf_bytes(b"123456789");
        assert_eq!(crc.crc() ^ 0xff, 0x4b);

        // The table driven and bitwise paths agree.
        const TEST_BUF: [u8; 12] =
            [0x00, 0xff, 0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0, 0x1d, 0x80];

        for init in [0x00, 0x5a, 0xff] {
            let mut crc = Crc8Sae::new(init);
            crc.process_buf_bytes(&TEST_BUF);
            assert_eq!(crc.crc(), crc8_bitwise(init, &TEST_BUF));
        }

        // Splitting a byte into bit runs does not change the result.
        let mut a = Crc8Sae::new(0xff);
        a.process_byte(0b1011_0110);

        let mut b = Crc8Sae::new(0xff);
        b.process_bits(0b101, 3);
        b.process_bits(0b1_0110, 5);

        assert_eq!(a.crc(), b.crc());
    }
}
