// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::cmp::min;

mod private {
    pub trait FetchBits {
        /// Discard any remaining bits in the source and fetch new bits. Bits past the end of the
        /// source are zero.
        fn fetch_bits(&mut self);

        /// Get all the bits in the source.
        fn get_bits(&self) -> u64;

        /// Get the number of bits left in the source.
        fn num_bits_left(&self) -> u32;

        /// Consume `num` bits from the source. `num` must be < 64.
        fn consume_bits(&mut self, num: u32);

        /// Get the number of bits consumed since the start of the stream.
        fn consumed(&self) -> u64;

        /// Get the length of the stream in bits.
        fn total_bits(&self) -> u64;

        /// Returns true if a read ever went past the end of the stream.
        fn overrun(&self) -> bool;
    }
}

/// `ReadBits` reads bits from most-significant to least-significant.
///
/// Reads never fail. Reading past the end of the stream yields zero bits and raises a sticky
/// error flag that may be queried with [`ReadBits::has_error`].
pub trait ReadBits: private::FetchBits {
    /// Discards bits up-to the next byte boundary and returns the number of bits skipped.
    #[inline(always)]
    fn realign(&mut self) -> u32 {
        let skip = ((8 - (self.consumed() & 0x7)) & 0x7) as u32;
        self.ignore_bits(skip);
        skip
    }

    /// Ignores the specified number of bits from the stream.
    #[inline(always)]
    fn ignore_bits(&mut self, mut num_bits: u32) {
        while num_bits > self.num_bits_left() {
            num_bits -= self.num_bits_left();
            // Shift out in two parts to prevent panicing when 64 bits are left.
            let left = self.num_bits_left();
            if left > 0 {
                self.consume_bits(left - 1);
                self.consume_bits(1);
            }
            self.fetch_bits();
        }

        if num_bits > 0 {
            self.consume_bits(num_bits - 1);
            self.consume_bits(1);
        }
    }

    /// Read a single bit as a boolean value.
    #[inline(always)]
    fn read_bool(&mut self) -> bool {
        if self.num_bits_left() < 1 {
            self.fetch_bits();
        }

        let bit = self.get_bits() & (1 << 63) != 0;

        self.consume_bits(1);
        bit
    }

    /// Read a single bit.
    #[inline(always)]
    fn read_bit(&mut self) -> u32 {
        u32::from(self.read_bool())
    }

    /// Reads up-to 32-bits. Reading 0 bits returns 0 and has no side-effects.
    #[inline(always)]
    fn read_bits_leq32(&mut self, mut bit_width: u32) -> u32 {
        debug_assert!(bit_width <= u32::BITS);

        // Shift in two 32-bit operations instead of a single 64-bit operation to avoid panicing
        // when bit_width == 0.
        let mut bits = (self.get_bits() >> u32::BITS) >> (u32::BITS - bit_width);

        while bit_width > self.num_bits_left() {
            bit_width -= self.num_bits_left();

            let left = self.num_bits_left();
            if left > 0 {
                self.consume_bits(left - 1);
                self.consume_bits(1);
            }
            self.fetch_bits();

            // bit_width is always > 0 here, so this shift is never > 63 bits.
            bits |= self.get_bits() >> (u64::BITS - bit_width);
        }

        self.consume_bits(bit_width);

        bits as u32
    }

    /// Returns the next `bit_width` bits (up-to 32) without consuming them.
    #[inline(always)]
    fn peek_bits_leq32(&self, bit_width: u32) -> u32
    where
        Self: Clone,
    {
        if bit_width <= self.num_bits_left() {
            ((self.get_bits() >> u32::BITS) >> (u32::BITS - bit_width)) as u32
        }
        else {
            self.clone().read_bits_leq32(bit_width)
        }
    }

    /// Reads and returns a unary ones encoded integer, reading at most `max` ones. The
    /// terminating zero bit is consumed only if it was reached before `max` ones were read.
    #[inline(always)]
    fn read_unary_ones_leq(&mut self, max: u32) -> u32 {
        let mut num = 0;

        while num < max {
            if !self.read_bool() {
                break;
            }
            num += 1;
        }

        num
    }

    /// Copies the next `num_bits` bits into a new byte buffer. The first bit read is the
    /// most-significant bit of the first byte. Unused trailing bits of the last byte are 0.
    fn read_bit_buffer(&mut self, num_bits: u32) -> Vec<u8> {
        let mut buf = vec![0u8; ((num_bits + 7) >> 3) as usize];

        let mut left = num_bits;

        for byte in buf.iter_mut() {
            let len = min(left, 8);
            *byte = (self.read_bits_leq32(len) << (8 - len)) as u8;
            left -= len;
        }

        buf
    }

    /// Gets the number of bits consumed since the start of the stream.
    #[inline(always)]
    fn processed_bits(&self) -> u64 {
        self.consumed()
    }

    /// Gets the number of bits left unread.
    #[inline(always)]
    fn bits_left(&self) -> u64 {
        self.total_bits().saturating_sub(self.consumed())
    }

    /// Returns true if a read went past the end of the stream.
    #[inline(always)]
    fn has_error(&self) -> bool {
        self.overrun()
    }
}

/// `BitCursor` reads bits from most-significant to least-significant from a `&[u8]`.
///
/// The cursor may be rewound to any bit offset within its buffer.
#[derive(Clone)]
pub struct BitCursor<'a> {
    data: &'a [u8],
    buf: &'a [u8],
    bits: u64,
    n_bits_left: u32,
    consumed: u64,
    total_bits: u64,
    error: bool,
}

impl<'a> BitCursor<'a> {
    /// Instantiate a new `BitCursor` over all the bits of the given buffer.
    pub fn new(buf: &'a [u8]) -> Self {
        BitCursor::new_with_len(buf, 8 * buf.len() as u64)
    }

    /// Instantiate a new `BitCursor` over the first `n_bits` bits of the given buffer.
    pub fn new_with_len(buf: &'a [u8], n_bits: u64) -> Self {
        let n_bits = min(n_bits, 8 * buf.len() as u64);
        let data = &buf[..((n_bits + 7) >> 3) as usize];

        BitCursor {
            data,
            buf: data,
            bits: 0,
            n_bits_left: 0,
            consumed: 0,
            total_bits: n_bits,
            error: false,
        }
    }

    /// Rewinds the cursor to the first bit of the buffer. The error flag is not cleared.
    pub fn rewind(&mut self) {
        self.reset_to(0);
    }

    /// Moves the cursor to an absolute bit offset. Offsets past the end of the stream are clamped
    /// to the end of the stream and raise the error flag.
    pub fn reset_to(&mut self, bit_offset: u64) {
        let bit_offset = if bit_offset > self.total_bits {
            self.error = true;
            self.total_bits
        }
        else {
            bit_offset
        };

        let byte = (bit_offset >> 3) as usize;

        self.buf = &self.data[min(byte, self.data.len())..];
        self.bits = 0;
        self.n_bits_left = 0;
        self.fetch_bits_inner();

        let skip = (bit_offset & 0x7) as u32;
        self.n_bits_left -= skip;
        self.bits <<= skip;
        self.consumed = bit_offset;
    }

    /// Gets the underlying buffer.
    pub fn buf(&self) -> &'a [u8] {
        self.data
    }

    #[inline(always)]
    fn fetch_bits_inner(&mut self) {
        let mut buf = [0u8; std::mem::size_of::<u64>()];

        let read_len = min(self.buf.len(), std::mem::size_of::<u64>());

        buf[..read_len].copy_from_slice(&self.buf[..read_len]);

        // Bit offset of the first bit of the refilled word.
        let start = 8 * (self.data.len() - self.buf.len()) as u64;

        self.buf = &self.buf[read_len..];

        self.bits = u64::from_be_bytes(buf);
        self.n_bits_left = u64::BITS;

        // Bits past the end of the stream read as zero, even if the buffer has them.
        let valid = self.total_bits.saturating_sub(start);

        if valid == 0 {
            self.bits = 0;
        }
        else if valid < u64::from(u64::BITS) {
            self.bits &= !(u64::MAX >> valid);
        }
    }
}

impl private::FetchBits for BitCursor<'_> {
    #[inline(always)]
    fn fetch_bits(&mut self) {
        self.fetch_bits_inner();
    }

    #[inline(always)]
    fn get_bits(&self) -> u64 {
        self.bits
    }

    #[inline(always)]
    fn num_bits_left(&self) -> u32 {
        self.n_bits_left
    }

    #[inline(always)]
    fn consume_bits(&mut self, num: u32) {
        self.n_bits_left -= num;
        self.bits <<= num;
        self.consumed += u64::from(num);

        if self.consumed > self.total_bits {
            self.error = true;
        }
    }

    #[inline(always)]
    fn consumed(&self) -> u64 {
        self.consumed
    }

    #[inline(always)]
    fn total_bits(&self) -> u64 {
        self.total_bits
    }

    #[inline(always)]
    fn overrun(&self) -> bool {
        self.error
    }
}

impl ReadBits for BitCursor<'_> {}

/// `RevBitCursor` reads the bits of a window in reverse order, starting from the last bit of the
/// window and ending at the first.
///
/// The window is the first `n_bits` bits of a buffer, with the first bit being the
/// most-significant bit of the first byte.
#[derive(Clone)]
pub struct RevBitCursor<'a> {
    data: &'a [u8],
    /// The number of window bits that have not been loaded into the register yet.
    pos: u64,
    bits: u64,
    n_bits_left: u32,
    consumed: u64,
    total_bits: u64,
    error: bool,
}

impl<'a> RevBitCursor<'a> {
    /// Instantiate a new `RevBitCursor` over the first `n_bits` bits of the given buffer.
    pub fn new(buf: &'a [u8], n_bits: u64) -> Self {
        let n_bits = min(n_bits, 8 * buf.len() as u64);

        RevBitCursor {
            data: buf,
            pos: n_bits,
            bits: 0,
            n_bits_left: 0,
            consumed: 0,
            total_bits: n_bits,
            error: false,
        }
    }
}

impl private::FetchBits for RevBitCursor<'_> {
    fn fetch_bits(&mut self) {
        let mut filled = 0;

        self.bits = 0;

        // Load whole or partial bytes, walking backwards, until the register cannot hold another
        // byte. Each chunk is bit-reversed so the last window bit lands in the most-significant
        // position.
        while self.pos > 0 && filled + 8 <= u64::BITS {
            let byte_idx = ((self.pos - 1) >> 3) as usize;
            let len = (self.pos - ((byte_idx as u64) << 3)) as u32;

            let chunk = self.data[byte_idx] >> (8 - len);
            let rev = chunk.reverse_bits() >> (8 - len);

            self.bits |= u64::from(rev) << (u64::BITS - filled - len);

            filled += len;
            self.pos -= u64::from(len);
        }

        self.n_bits_left = if self.pos == 0 { u64::BITS } else { filled };
    }

    #[inline(always)]
    fn get_bits(&self) -> u64 {
        self.bits
    }

    #[inline(always)]
    fn num_bits_left(&self) -> u32 {
        self.n_bits_left
    }

    #[inline(always)]
    fn consume_bits(&mut self, num: u32) {
        self.n_bits_left -= num;
        self.bits <<= num;
        self.consumed += u64::from(num);

        if self.consumed > self.total_bits {
            self.error = true;
        }
    }

    #[inline(always)]
    fn consumed(&self) -> u64 {
        self.consumed
    }

    #[inline(always)]
    fn total_bits(&self) -> u64 {
        self.total_bits
    }

    #[inline(always)]
    fn overrun(&self) -> bool {
        self.error
    }
}

impl ReadBits for RevBitCursor<'_> {}

#[cfg(test)]
mod tests {
    use super::{BitCursor, ReadBits, RevBitCursor};

    #[test]
    fn verify_bitcursor_ignore_bits() {
        let mut bs = BitCursor::new(&[
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, //
            0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, //
            0xc0, 0x10, 0x00, 0x01, 0x00, 0x00, 0x00, 0x0a, //
        ]);

        assert!(bs.read_bool());

        bs.ignore_bits(128);

        assert!(bs.read_bool());
        assert!(!bs.read_bool());
        assert!(!bs.read_bool());

        bs.ignore_bits(7);

        assert!(bs.read_bool());

        bs.ignore_bits(19);

        assert!(bs.read_bool());

        assert!(!bs.read_bool());
        assert!(!bs.read_bool());
        assert!(!bs.read_bool());
        assert!(!bs.read_bool());

        bs.ignore_bits(24);

        assert!(bs.read_bool());
        assert!(!bs.read_bool());
        assert!(bs.read_bool());
        assert!(!bs.read_bool());

        assert!(!bs.has_error());
        assert_eq!(bs.bits_left(), 0);

        // Past the end.
        bs.ignore_bits(1);
        assert!(bs.has_error());
    }

    #[test]
    fn verify_bitcursor_read_bits_leq32() {
        let mut bs = BitCursor::new(&[0b1010_0101, 0b0111_1110, 0b1101_0011]);

        assert_eq!(bs.read_bits_leq32(4), 0b0000_0000_0000_1010);
        assert_eq!(bs.read_bits_leq32(4), 0b0000_0000_0000_0101);
        assert_eq!(bs.read_bits_leq32(13), 0b0000_1111_1101_1010);
        assert_eq!(bs.read_bits_leq32(3), 0b0000_0000_0000_0011);
        assert!(!bs.has_error());

        // Lower limit test.
        let mut bs = BitCursor::new(&[0xff, 0xff, 0xff, 0xff]);

        assert_eq!(bs.read_bits_leq32(0), 0);
        assert_eq!(bs.processed_bits(), 0);

        // Upper limit test.
        let mut bs = BitCursor::new(&[0xff, 0xff, 0xff, 0xff, 0x01]);

        assert_eq!(bs.read_bits_leq32(32), u32::MAX);
        assert_eq!(bs.read_bits_leq32(8), 0x01);

        // Cache fetch test.
        let mut bs = BitCursor::new(&[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]);

        assert_eq!(bs.read_bits_leq32(32), u32::MAX);
        assert_eq!(bs.read_bits_leq32(20), 0xfffff);
        assert_eq!(bs.read_bits_leq32(19), 0x7ff80);
        assert_eq!(bs.read_bits_leq32(1), 1);
        assert!(!bs.has_error());
        assert_eq!(bs.bits_left(), 0);
    }

    #[test]
    fn verify_bitcursor_overrun() {
        let mut bs = BitCursor::new(&[0xff]);

        assert_eq!(bs.read_bits_leq32(9), 0x1fe);
        assert!(bs.has_error());

        // The error flag is sticky.
        bs.rewind();
        assert!(bs.has_error());
        assert_eq!(bs.read_bits_leq32(8), 0xff);

        // Length limited cursors stop short of the buffer end.
        let mut bs = BitCursor::new_with_len(&[0xff, 0xff], 4);
        assert_eq!(bs.read_bits_leq32(4), 0xf);
        assert!(!bs.has_error());
        bs.read_bool();
        assert!(bs.has_error());

        // An empty buffer reads as zeros.
        let mut bs = BitCursor::new(&[]);
        assert_eq!(bs.read_bits_leq32(32), 0);
        assert!(bs.has_error());
    }

    #[test]
    fn verify_bitcursor_zero_fill_past_len() {
        // Only the first 5 bits belong to the stream; the rest of the buffer must read as zeros.
        let data = [0b1010_1111, 0xff, 0xff];

        let mut bs = BitCursor::new_with_len(&data, 5);
        assert_eq!(bs.read_bits_leq32(3), 0b101);
        assert_eq!(bs.read_bits_leq32(8), 0b0100_0000);
        assert!(bs.has_error());

        // Rewinding into the window masks the refill the same way.
        bs.reset_to(4);
        assert_eq!(bs.read_bits_leq32(4), 0b1000);
        assert_eq!(bs.read_bits_leq32(16), 0);

        // A window ending on a byte boundary zero fills the following bytes.
        let mut bs = BitCursor::new_with_len(&data, 8);
        assert_eq!(bs.read_bits_leq32(8), 0b1010_1111);
        assert!(!bs.has_error());
        assert_eq!(bs.read_bits_leq32(16), 0);
        assert!(bs.has_error());

        // Windows spanning more than one refill are masked in the last word only.
        let data = [0xffu8; 12];

        let mut bs = BitCursor::new_with_len(&data, 70);
        assert_eq!(bs.read_bits_leq32(32), u32::MAX);
        assert_eq!(bs.read_bits_leq32(32), u32::MAX);
        assert!(!bs.has_error());
        assert_eq!(bs.read_bits_leq32(8), 0b1111_1100);
        assert!(bs.has_error());
    }

    #[test]
    fn verify_bitcursor_peek_and_reset() {
        let mut bs = BitCursor::new(&[
            0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc, 0xde, 0xf0, //
            0x0f, 0xed, 0xcb, 0xa9,
        ]);

        assert_eq!(bs.peek_bits_leq32(8), 0x12);
        assert_eq!(bs.processed_bits(), 0);

        bs.ignore_bits(56);

        // Peek across a register refill.
        assert_eq!(bs.peek_bits_leq32(16), 0xf00f);
        assert_eq!(bs.read_bits_leq32(16), 0xf00f);

        bs.reset_to(12);
        assert_eq!(bs.processed_bits(), 12);
        assert_eq!(bs.read_bits_leq32(12), 0x456);

        bs.reset_to(96);
        assert!(!bs.has_error());
        assert_eq!(bs.bits_left(), 0);

        bs.reset_to(97);
        assert!(bs.has_error());
        assert_eq!(bs.processed_bits(), 96);
    }

    #[test]
    fn verify_bitcursor_realign() {
        let mut bs = BitCursor::new(&[0xff, 0x81]);

        assert_eq!(bs.realign(), 0);
        bs.ignore_bits(3);
        assert_eq!(bs.realign(), 5);
        assert_eq!(bs.processed_bits(), 8);
        assert_eq!(bs.read_bits_leq32(8), 0x81);
    }

    #[test]
    fn verify_bitcursor_unary_ones() {
        let mut bs = BitCursor::new(&[0b1110_1111, 0b1111_1111]);

        assert_eq!(bs.read_unary_ones_leq(16), 3);
        assert_eq!(bs.processed_bits(), 4);

        // The cap stops the read without consuming a terminator.
        assert_eq!(bs.read_unary_ones_leq(5), 5);
        assert_eq!(bs.processed_bits(), 9);
    }

    #[test]
    fn verify_bitcursor_read_bit_buffer() {
        let mut bs = BitCursor::new(&[0b1011_0011, 0b1100_0101, 0xff]);

        bs.ignore_bits(2);

        let buf = bs.read_bit_buffer(11);

        assert_eq!(buf, vec![0b1100_1111, 0b0000_0000]);
        assert_eq!(bs.processed_bits(), 13);
        assert_eq!(bs.read_bits_leq32(3), 0b101);
    }

    #[test]
    fn verify_revbitcursor() {
        // Window: 1011_0011 1100_0 (13 bits).
        let data = [0b1011_0011, 0b1100_0111];

        let mut bs = RevBitCursor::new(&data, 13);

        assert_eq!(bs.read_bits_leq32(5), 0b0_0011);
        assert_eq!(bs.read_bits_leq32(8), 0b1100_1101);
        assert!(!bs.has_error());
        assert_eq!(bs.bits_left(), 0);

        assert_eq!(bs.read_bits_leq32(4), 0);
        assert!(bs.has_error());

        // Reading a long window in reverse yields the bit-reversed window.
        let data: Vec<u8> = (0u8..20).map(|i| i.wrapping_mul(37).wrapping_add(11)).collect();

        let mut fwd = BitCursor::new(&data);
        let mut fwd_bits: Vec<bool> = (0..155).map(|_| fwd.read_bool()).collect();
        fwd_bits.reverse();

        let mut bs = RevBitCursor::new(&data, 155);
        let rev_bits: Vec<bool> = (0..155).map(|_| bs.read_bool()).collect();

        assert_eq!(fwd_bits, rev_bits);

        let mut bs = RevBitCursor::new(&data, 155);
        let mut fwd = BitCursor::new(&data);
        fwd.ignore_bits(155 - 32);
        let word = fwd.read_bits_leq32(32);
        assert_eq!(bs.read_bits_leq32(32), word.reverse_bits());
    }
}
