// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Huffman codebooks for scale factors and spectral data.
//!
//! Spectral codebooks are decoded with one of two strategies. Codebooks with short codes use a
//! two-step lookup table, the others walk a binary tree one bit at a time. Both are built once from
//! the code tables at the end of this module.

use lyra_core::errors::{decode_error, Error, Result};

use lazy_static::lazy_static;

use crate::aac::huffman::BitSource;

/// A codebook number as signalled in section data.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Codebook {
    /// All coefficients of the band are zero.
    Zero,
    /// One of the spectral codebooks 1 to 11.
    Spectral(u8),
    /// Codebook 12.
    Reserved,
    /// Perceptual noise substitution.
    Noise,
    /// Intensity stereo, out of phase (codebook 14).
    IntensityOutOfPhase,
    /// Intensity stereo, in phase (codebook 15).
    IntensityInPhase,
    /// A virtual codebook 11 with a limited largest absolute value (codebooks 16 to 31).
    Vcb11(u8),
}

impl Codebook {
    pub const ESCAPE: Codebook = Codebook::Spectral(11);

    pub fn from_index(idx: u8) -> Option<Codebook> {
        let cb = match idx {
            0 => Codebook::Zero,
            1..=11 => Codebook::Spectral(idx),
            12 => Codebook::Reserved,
            13 => Codebook::Noise,
            14 => Codebook::IntensityOutOfPhase,
            15 => Codebook::IntensityInPhase,
            16..=31 => Codebook::Vcb11(idx),
            _ => return None,
        };
        Some(cb)
    }

    pub fn index(&self) -> u8 {
        match *self {
            Codebook::Zero => 0,
            Codebook::Spectral(idx) | Codebook::Vcb11(idx) => idx,
            Codebook::Reserved => 12,
            Codebook::Noise => 13,
            Codebook::IntensityOutOfPhase => 14,
            Codebook::IntensityInPhase => 15,
        }
    }

    /// Returns true if the band carries Huffman coded spectral data.
    #[inline(always)]
    pub fn is_spectral(&self) -> bool {
        matches!(*self, Codebook::Spectral(_) | Codebook::Vcb11(_))
    }

    #[inline(always)]
    pub fn is_noise(&self) -> bool {
        *self == Codebook::Noise
    }

    #[inline(always)]
    pub fn is_intensity(&self) -> bool {
        matches!(*self, Codebook::IntensityOutOfPhase | Codebook::IntensityInPhase)
    }

    /// The intensity direction, 1 for in phase, -1 for out of phase, and 0 if the band is not an
    /// intensity band.
    #[inline(always)]
    pub fn intensity_direction(&self) -> i32 {
        match *self {
            Codebook::IntensityInPhase => 1,
            Codebook::IntensityOutOfPhase => -1,
            _ => 0,
        }
    }

    /// Returns true if the codebook codes quadruples (codebooks 1 to 4).
    #[inline(always)]
    pub fn is_quad(&self) -> bool {
        matches!(*self, Codebook::Spectral(idx) if idx < 5)
    }

    /// Gets the descriptor of a spectral codebook.
    pub fn info(&self) -> Option<&'static CodebookInfo> {
        match *self {
            Codebook::Spectral(idx) => Some(&SPECTRAL_CODEBOOK_INFO[usize::from(idx) - 1]),
            Codebook::Vcb11(idx) => Some(&VCB11_CODEBOOK_INFO[usize::from(idx) - 16]),
            _ => None,
        }
    }

    /// The maximum length, in bits, of one codeword including sign and escape bits.
    pub fn max_codeword_len(&self) -> u32 {
        self.info().map_or(0, |info| info.max_cw_len)
    }
}

/// How the codewords of a spectral codebook are looked up.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// A two-step table with the given number of root bits.
    TwoStep(u32),
    /// A binary tree.
    Tree,
}

/// Describes how a spectral codebook is decoded.
#[derive(Debug)]
pub struct CodebookInfo {
    /// The number of spectral lines coded by one codeword, 4 or 2.
    pub dim: usize,
    /// True if the values carry their sign in the codeword. Otherwise a sign bit follows for each
    /// non-zero value.
    pub signed: bool,
    /// True if a magnitude of 16 is followed by an escape sequence.
    pub escape: bool,
    /// For pairs, the codeword index is `x * modulo + y`.
    pub modulo: u32,
    /// The maximum codeword length including sign and escape bits.
    pub max_cw_len: u32,
    /// The largest absolute value allowed after escape decoding.
    pub lav: Option<i32>,
    pub strategy: Strategy,
    /// The index of the code tables backing this codebook.
    book: usize,
}

impl CodebookInfo {
    /// Gets the decoder of this codebook.
    pub fn decoder(&self) -> &'static SpectralDecoder {
        &SPECTRAL_DECODERS[self.book]
    }
}

const fn spectral(
    book: usize,
    dim: usize,
    signed: bool,
    modulo: u32,
    max_cw_len: u32,
    strategy: Strategy,
) -> CodebookInfo {
    CodebookInfo {
        dim,
        signed,
        escape: book == 10,
        modulo,
        max_cw_len,
        lav: None,
        strategy,
        book,
    }
}

const fn vcb11(max_cw_len: u32, lav: i32) -> CodebookInfo {
    CodebookInfo {
        dim: 2,
        signed: false,
        escape: true,
        modulo: 17,
        max_cw_len,
        lav: Some(lav),
        strategy: Strategy::TwoStep(5),
        book: 10,
    }
}

static SPECTRAL_CODEBOOK_INFO: [CodebookInfo; 11] = [
    spectral(0, 4, true, 3, 11, Strategy::TwoStep(5)),
    spectral(1, 4, true, 3, 9, Strategy::TwoStep(5)),
    spectral(2, 4, false, 3, 20, Strategy::Tree),
    spectral(3, 4, false, 3, 16, Strategy::TwoStep(5)),
    spectral(4, 2, true, 9, 13, Strategy::Tree),
    spectral(5, 2, true, 9, 11, Strategy::TwoStep(5)),
    spectral(6, 2, false, 8, 14, Strategy::Tree),
    spectral(7, 2, false, 8, 12, Strategy::TwoStep(5)),
    spectral(8, 2, false, 13, 17, Strategy::Tree),
    spectral(9, 2, false, 13, 14, Strategy::TwoStep(6)),
    spectral(10, 2, false, 17, 49, Strategy::TwoStep(5)),
];

static VCB11_CODEBOOK_INFO: [CodebookInfo; 16] = [
    vcb11(14, 16),
    vcb11(17, 31),
    vcb11(21, 47),
    vcb11(21, 63),
    vcb11(25, 95),
    vcb11(25, 127),
    vcb11(29, 159),
    vcb11(29, 191),
    vcb11(29, 223),
    vcb11(29, 255),
    vcb11(33, 319),
    vcb11(33, 383),
    vcb11(33, 511),
    vcb11(37, 767),
    vcb11(37, 1023),
    vcb11(41, 2047),
];

#[derive(Copy, Clone, Debug)]
enum LookupEntry {
    Invalid,
    /// A complete codeword. `len` counts the bits consumed at this level.
    Leaf { symbol: u16, len: u8 },
    /// A sub-table indexed by the next `bits` bits.
    Sub { offset: u32, bits: u8 },
}

/// A two-level lookup table.
pub struct LookupTable {
    root_bits: u32,
    entries: Vec<LookupEntry>,
}

impl LookupTable {
    fn build(lens: &[u8], codes: &[u16], root_bits: u32) -> Self {
        let mut entries = vec![LookupEntry::Invalid; 1 << root_bits];
        let mut sub_bits = vec![0u32; 1 << root_bits];

        for (symbol, (&len, &code)) in lens.iter().zip(codes).enumerate() {
            let len = u32::from(len);
            let code = u32::from(code);

            if len > root_bits {
                let prefix = (code >> (len - root_bits)) as usize;
                sub_bits[prefix] = sub_bits[prefix].max(len - root_bits);
            }
            else {
                let shift = root_bits - len;
                let base = (code << shift) as usize;

                for entry in entries[base..base + (1 << shift)].iter_mut() {
                    *entry = LookupEntry::Leaf { symbol: symbol as u16, len: len as u8 };
                }
            }
        }

        // Append the sub-tables.
        for (prefix, &bits) in sub_bits.iter().enumerate() {
            if bits > 0 {
                let offset = entries.len() as u32;
                entries[prefix] = LookupEntry::Sub { offset, bits: bits as u8 };
                entries.resize(entries.len() + (1 << bits), LookupEntry::Invalid);
            }
        }

        for (symbol, (&len, &code)) in lens.iter().zip(codes).enumerate() {
            let len = u32::from(len);
            let code = u32::from(code);

            if len <= root_bits {
                continue;
            }

            let rest_len = len - root_bits;
            let prefix = (code >> rest_len) as usize;
            let rest = code & ((1 << rest_len) - 1);

            if let LookupEntry::Sub { offset, bits } = entries[prefix] {
                let shift = u32::from(bits) - rest_len;
                let base = offset as usize + (rest << shift) as usize;

                for entry in entries[base..base + (1 << shift)].iter_mut() {
                    *entry = LookupEntry::Leaf { symbol: symbol as u16, len: rest_len as u8 };
                }
            }
        }

        LookupTable { root_bits, entries }
    }

    /// Decodes one symbol. Returns `None` if the source ran out of bits.
    fn decode<S: BitSource>(&self, src: &mut S) -> Result<Option<u16>> {
        match self.entries[src.peek_bits(self.root_bits) as usize] {
            LookupEntry::Leaf { symbol, len } => Ok(src.read_bits(u32::from(len)).map(|_| symbol)),
            LookupEntry::Sub { offset, bits } => {
                if src.read_bits(self.root_bits).is_none() {
                    return Ok(None);
                }

                let idx = offset as usize + src.peek_bits(u32::from(bits)) as usize;

                match self.entries[idx] {
                    LookupEntry::Leaf { symbol, len } => {
                        Ok(src.read_bits(u32::from(len)).map(|_| symbol))
                    }
                    _ => decode_error(Error::SpectralHuffman),
                }
            }
            LookupEntry::Invalid => decode_error(Error::SpectralHuffman),
        }
    }
}

const TREE_LEAF: u32 = 1 << 31;

/// A binary decoding tree. Each node holds two children. A child is either the index of another
/// node, a leaf symbol tagged with `TREE_LEAF`, or 0 if no codeword takes that branch.
pub struct BinaryTree {
    nodes: Vec<[u32; 2]>,
}

impl BinaryTree {
    fn build<C: Copy + Into<u32>>(lens: &[u8], codes: &[C]) -> Self {
        let mut nodes = vec![[0u32; 2]];

        for (symbol, (&len, &code)) in lens.iter().zip(codes).enumerate() {
            let code: u32 = code.into();
            let mut node = 0;

            for i in (0..u32::from(len)).rev() {
                let bit = ((code >> i) & 1) as usize;

                if i == 0 {
                    nodes[node][bit] = TREE_LEAF | symbol as u32;
                }
                else {
                    if nodes[node][bit] == 0 {
                        nodes.push([0; 2]);
                        nodes[node][bit] = (nodes.len() - 1) as u32;
                    }
                    node = nodes[node][bit] as usize;
                }
            }
        }

        BinaryTree { nodes }
    }

    /// Decodes one symbol. Returns `None` if the source ran out of bits.
    fn decode<S: BitSource>(&self, src: &mut S, err: Error) -> Result<Option<u16>> {
        let mut node = 0;

        loop {
            let bit = match src.read_bits(1) {
                Some(bit) => bit as usize,
                None => return Ok(None),
            };

            let child = self.nodes[node][bit];

            if child & TREE_LEAF != 0 {
                return Ok(Some((child & !TREE_LEAF) as u16));
            }
            else if child == 0 {
                return decode_error(err);
            }

            node = child as usize;
        }
    }
}

/// The symbol decoder of a spectral codebook.
pub enum SpectralDecoder {
    TwoStep(LookupTable),
    Tree(BinaryTree),
}

impl SpectralDecoder {
    /// Decodes the codeword index. Returns `None` if the source ran out of bits.
    pub fn decode<S: BitSource>(&self, src: &mut S) -> Result<Option<u16>> {
        match self {
            SpectralDecoder::TwoStep(table) => table.decode(src),
            SpectralDecoder::Tree(tree) => tree.decode(src, Error::SpectralHuffman),
        }
    }
}

/// Decodes a scale factor codeword and returns its index in `0..=120`.
pub fn decode_scale_factor_index<S: BitSource>(src: &mut S) -> Result<Option<u16>> {
    SCALE_FACTOR_TREE.decode(src, Error::ScaleFactorHuffman)
}

lazy_static! {
    static ref SCALE_FACTOR_TREE: BinaryTree = BinaryTree::build(&SCF_LENS, &SCF_CODES);

    static ref SPECTRAL_DECODERS: Vec<SpectralDecoder> = {
        SPECTRAL_CODEBOOK_INFO
            .iter()
            .map(|info| {
                let (lens, codes) = SPECTRAL_TABLES[info.book];

                match info.strategy {
                    Strategy::TwoStep(root_bits) => {
                        SpectralDecoder::TwoStep(LookupTable::build(lens, codes, root_bits))
                    }
                    Strategy::Tree => SpectralDecoder::Tree(BinaryTree::build(lens, codes)),
                }
            })
            .collect()
    };
}

const SPECTRAL_TABLES: [(&[u8], &[u16]); 11] = [
    (&CB1_LENS, &CB1_CODES),
    (&CB2_LENS, &CB2_CODES),
    (&CB3_LENS, &CB3_CODES),
    (&CB4_LENS, &CB4_CODES),
    (&CB5_LENS, &CB5_CODES),
    (&CB6_LENS, &CB6_CODES),
    (&CB7_LENS, &CB7_CODES),
    (&CB8_LENS, &CB8_CODES),
    (&CB9_LENS, &CB9_CODES),
    (&CB10_LENS, &CB10_CODES),
    (&CB11_LENS, &CB11_CODES),
];

#[rustfmt::skip]
const SCF_LENS: [u8; 121] = [
    18, 18, 18, 18, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19,
    19, 19, 19, 18, 19, 18, 17, 17, 16, 17, 16, 16, 16, 16, 15, 15,
    14, 14, 14, 14, 14, 14, 13, 13, 12, 12, 12, 11, 12, 11, 10, 10,
    10,  9,  9,  8,  8,  8,  7,  6,  6,  5,  4,  3,  1,  4,  4,  5,
     6,  6,  7,  7,  8,  8,  9,  9, 10, 10, 10, 11, 11, 11, 11, 12,
    12, 13, 13, 13, 14, 14, 16, 15, 16, 15, 18, 19, 19, 19, 19, 19,
    19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19, 19,
    19, 19, 19, 19, 19, 19, 19, 19, 19,
];

#[rustfmt::skip]
const SCF_CODES: [u32; 121] = [
    0x3ffe8, 0x3ffe6, 0x3ffe7, 0x3ffe5, 0x7fff5, 0x7fff1, 0x7ffed, 0x7fff6,
    0x7ffee, 0x7ffef, 0x7fff0, 0x7fffc, 0x7fffd, 0x7ffff, 0x7fffe, 0x7fff7,
    0x7fff8, 0x7fffb, 0x7fff9, 0x3ffe4, 0x7fffa, 0x3ffe3, 0x1ffef, 0x1fff0,
    0x0fff5, 0x1ffee, 0x0fff2, 0x0fff3, 0x0fff4, 0x0fff1, 0x07ff6, 0x07ff7,
    0x03ff9, 0x03ff5, 0x03ff7, 0x03ff3, 0x03ff6, 0x03ff2, 0x01ff7, 0x01ff5,
    0x00ff9, 0x00ff7, 0x00ff6, 0x007f9, 0x00ff4, 0x007f8, 0x003f9, 0x003f7,
    0x003f5, 0x001f8, 0x001f7, 0x000fa, 0x000f8, 0x000f6, 0x00079, 0x0003a,
    0x00038, 0x0001a, 0x0000b, 0x00004, 0x00000, 0x0000a, 0x0000c, 0x0001b,
    0x00039, 0x0003b, 0x00078, 0x0007a, 0x000f7, 0x000f9, 0x001f6, 0x001f9,
    0x003f4, 0x003f6, 0x003f8, 0x007f5, 0x007f4, 0x007f6, 0x007f7, 0x00ff5,
    0x00ff8, 0x01ff4, 0x01ff6, 0x01ff8, 0x03ff8, 0x03ff4, 0x0fff0, 0x07ff4,
    0x0fff6, 0x07ff5, 0x3ffe2, 0x7ffd9, 0x7ffda, 0x7ffdb, 0x7ffdc, 0x7ffdd,
    0x7ffde, 0x7ffd8, 0x7ffd2, 0x7ffd3, 0x7ffd4, 0x7ffd5, 0x7ffd6, 0x7fff2,
    0x7ffdf, 0x7ffe7, 0x7ffe8, 0x7ffe9, 0x7ffea, 0x7ffeb, 0x7ffe6, 0x7ffe0,
    0x7ffe1, 0x7ffe2, 0x7ffe3, 0x7ffe4, 0x7ffe5, 0x7ffd7, 0x7ffec, 0x7fff4,
    0x7fff3,
];

#[rustfmt::skip]
const CB1_LENS: [u8; 81] = [
    11,  9, 11, 10,  7, 10, 11,  9, 11, 10,  7, 10,  7,  5,  7,  9,
     7, 10, 11,  9, 11,  9,  7,  9, 11,  9, 11,  9,  7,  9,  7,  5,
     7,  9,  7,  9,  7,  5,  7,  5,  1,  5,  7,  5,  7,  9,  7,  9,
     7,  5,  7,  9,  7,  9, 11,  9, 11,  9,  7,  9, 11,  9, 11, 10,
     7,  9,  7,  5,  7,  9,  7, 10, 11,  9, 11, 10,  7,  9, 11,  9,
    11,
];

#[rustfmt::skip]
const CB1_CODES: [u16; 81] = [
    0x7f8, 0x1f1, 0x7fd, 0x3f5, 0x068, 0x3f0, 0x7f7, 0x1ec, 0x7f5, 0x3f1,
    0x072, 0x3f4, 0x074, 0x011, 0x076, 0x1eb, 0x06c, 0x3f6, 0x7fc, 0x1e1,
    0x7f1, 0x1f0, 0x061, 0x1f6, 0x7f2, 0x1ea, 0x7fb, 0x1f2, 0x069, 0x1ed,
    0x077, 0x017, 0x06f, 0x1e6, 0x064, 0x1e5, 0x067, 0x015, 0x062, 0x012,
    0x000, 0x014, 0x065, 0x016, 0x06d, 0x1e9, 0x063, 0x1e4, 0x06b, 0x013,
    0x071, 0x1e3, 0x070, 0x1f3, 0x7fe, 0x1e7, 0x7f3, 0x1ef, 0x060, 0x1ee,
    0x7f0, 0x1e2, 0x7fa, 0x3f3, 0x06a, 0x1e8, 0x075, 0x010, 0x073, 0x1f4,
    0x06e, 0x3f7, 0x7f6, 0x1e0, 0x7f9, 0x3f2, 0x066, 0x1f5, 0x7ff, 0x1f7,
    0x7f4,
];

#[rustfmt::skip]
const CB2_LENS: [u8; 81] = [
     9,  7,  9,  8,  6,  8,  9,  8,  9,  8,  6,  7,  6,  5,  6,  7,
     6,  8,  9,  7,  8,  8,  6,  8,  9,  7,  9,  8,  6,  7,  6,  5,
     6,  7,  6,  8,  6,  5,  6,  5,  3,  5,  6,  5,  6,  8,  6,  7,
     6,  5,  6,  8,  6,  8,  9,  7,  9,  8,  6,  8,  8,  7,  9,  8,
     6,  7,  6,  4,  6,  8,  6,  7,  9,  7,  9,  7,  6,  8,  9,  7,
     9,
];

#[rustfmt::skip]
const CB2_CODES: [u16; 81] = [
    0x1f3, 0x06f, 0x1fd, 0x0eb, 0x023, 0x0ea, 0x1f7, 0x0e8, 0x1fa, 0x0f2,
    0x02d, 0x070, 0x020, 0x006, 0x02b, 0x06e, 0x028, 0x0e9, 0x1f9, 0x066,
    0x0f8, 0x0e7, 0x01b, 0x0f1, 0x1f4, 0x06b, 0x1f5, 0x0ec, 0x02a, 0x06c,
    0x02c, 0x00a, 0x027, 0x067, 0x01a, 0x0f5, 0x024, 0x008, 0x01f, 0x009,
    0x000, 0x007, 0x01d, 0x00b, 0x030, 0x0ef, 0x01c, 0x064, 0x01e, 0x00c,
    0x029, 0x0f3, 0x02f, 0x0f0, 0x1fc, 0x071, 0x1f2, 0x0f4, 0x021, 0x0e6,
    0x0f7, 0x068, 0x1f8, 0x0ee, 0x022, 0x065, 0x031, 0x002, 0x026, 0x0ed,
    0x025, 0x06a, 0x1fb, 0x072, 0x1fe, 0x069, 0x02e, 0x0f6, 0x1ff, 0x06d,
    0x1f6,
];

#[rustfmt::skip]
const CB3_LENS: [u8; 81] = [
     1,  4,  8,  4,  5,  8,  9,  9, 10,  4,  6,  9,  6,  6,  9,  9,
     9, 10,  9, 10, 13,  9,  9, 11, 11, 10, 12,  4,  6, 10,  6,  7,
    10, 10, 10, 12,  5,  7, 11,  6,  7, 10,  9,  9, 11,  9, 10, 13,
     8,  9, 12, 10, 11, 12,  8, 10, 15,  9, 11, 15, 13, 14, 16,  8,
    10, 14,  9, 10, 14, 12, 12, 15, 11, 12, 16, 10, 11, 15, 12, 12,
    15,
];

#[rustfmt::skip]
const CB3_CODES: [u16; 81] = [
    0x0000, 0x0009, 0x00ef, 0x000b, 0x0019, 0x00f0, 0x01eb, 0x01e6, 0x03f2, 0x000a,
    0x0035, 0x01ef, 0x0034, 0x0037, 0x01e9, 0x01ed, 0x01e7, 0x03f3, 0x01ee, 0x03ed,
    0x1ffa, 0x01ec, 0x01f2, 0x07f9, 0x07f8, 0x03f8, 0x0ff8, 0x0008, 0x0038, 0x03f6,
    0x0036, 0x0075, 0x03f1, 0x03eb, 0x03ec, 0x0ff4, 0x0018, 0x0076, 0x07f4, 0x0039,
    0x0074, 0x03ef, 0x01f3, 0x01f4, 0x07f6, 0x01e8, 0x03ea, 0x1ffc, 0x00f2, 0x01f1,
    0x0ffb, 0x03f5, 0x07f3, 0x0ffc, 0x00ee, 0x03f7, 0x7ffe, 0x01f0, 0x07f5, 0x7ffd,
    0x1ffb, 0x3ffa, 0xffff, 0x00f1, 0x03f0, 0x3ffc, 0x01ea, 0x03ee, 0x3ffb, 0x0ff6,
    0x0ffa, 0x7ffc, 0x07f2, 0x0ff5, 0xfffe, 0x03f4, 0x07f7, 0x7ffb, 0x0ff7, 0x0ff9,
    0x7ffa,
];

#[rustfmt::skip]
const CB4_LENS: [u8; 81] = [
     4,  5,  8,  5,  4,  8,  9,  8, 11,  5,  5,  8,  5,  4,  8,  8,
     7, 10,  9,  8, 11,  8,  8, 10, 11, 10, 11,  4,  5,  8,  4,  4,
     8,  8,  8, 10,  4,  4,  8,  4,  4,  7,  8,  7,  9,  8,  8, 10,
     7,  7,  9, 10,  9, 10,  8,  8, 11,  8,  7, 10, 11, 10, 12,  8,
     7, 10,  7,  7,  9, 10,  9, 11, 11, 10, 12, 10,  9, 11, 11, 10,
    11,
];

#[rustfmt::skip]
const CB4_CODES: [u16; 81] = [
    0x007, 0x016, 0x0f6, 0x018, 0x008, 0x0ef, 0x1ef, 0x0f3, 0x7f8, 0x019,
    0x017, 0x0ed, 0x015, 0x001, 0x0e2, 0x0f0, 0x070, 0x3f0, 0x1ee, 0x0f1,
    0x7fa, 0x0ee, 0x0e4, 0x3f2, 0x7f6, 0x3ef, 0x7fd, 0x005, 0x014, 0x0f2,
    0x009, 0x004, 0x0e5, 0x0f4, 0x0e8, 0x3f4, 0x006, 0x002, 0x0e7, 0x003,
    0x000, 0x06b, 0x0e3, 0x069, 0x1f3, 0x0eb, 0x0e6, 0x3f6, 0x06e, 0x06a,
    0x1f4, 0x3ec, 0x1f0, 0x3f9, 0x0f5, 0x0ec, 0x7fb, 0x0ea, 0x06f, 0x3f7,
    0x7f9, 0x3f3, 0xfff, 0x0e9, 0x06d, 0x3f8, 0x06c, 0x068, 0x1f5, 0x3ee,
    0x1f2, 0x7f4, 0x7f7, 0x3f1, 0xffe, 0x3ed, 0x1f1, 0x7f5, 0x7fe, 0x3f5,
    0x7fc,
];

#[rustfmt::skip]
const CB5_LENS: [u8; 81] = [
    13, 12, 11, 11, 10, 11, 11, 12, 13, 12, 11, 10,  9,  8,  9, 10,
    11, 12, 12, 10,  9,  8,  7,  8,  9, 10, 11, 11,  9,  8,  5,  4,
     5,  8,  9, 11, 10,  8,  7,  4,  1,  4,  7,  8, 11, 11,  9,  8,
     5,  4,  5,  8,  9, 11, 11, 10,  9,  8,  7,  8,  9, 10, 11, 12,
    11, 10,  9,  8,  9, 10, 11, 12, 13, 12, 12, 11, 10, 10, 11, 12,
    13,
];

#[rustfmt::skip]
const CB5_CODES: [u16; 81] = [
    0x1fff, 0x0ff7, 0x07f4, 0x07e8, 0x03f1, 0x07ee, 0x07f9, 0x0ff8, 0x1ffd, 0x0ffd,
    0x07f1, 0x03e8, 0x01e8, 0x00f0, 0x01ec, 0x03ee, 0x07f2, 0x0ffa, 0x0ff4, 0x03ef,
    0x01f2, 0x00e8, 0x0070, 0x00ec, 0x01f0, 0x03ea, 0x07f3, 0x07eb, 0x01eb, 0x00ea,
    0x001a, 0x0008, 0x0019, 0x00ee, 0x01ef, 0x07ed, 0x03f0, 0x00f2, 0x0073, 0x000b,
    0x0000, 0x000a, 0x0071, 0x00f3, 0x07e9, 0x07ef, 0x01ee, 0x00ef, 0x0018, 0x0009,
    0x001b, 0x00eb, 0x01e9, 0x07ec, 0x07f6, 0x03eb, 0x01f3, 0x00ed, 0x0072, 0x00e9,
    0x01f1, 0x03ed, 0x07f7, 0x0ff6, 0x07f0, 0x03e9, 0x01ed, 0x00f1, 0x01ea, 0x03ec,
    0x07f8, 0x0ff9, 0x1ffc, 0x0ffc, 0x0ff5, 0x07ea, 0x03f3, 0x03f2, 0x07f5, 0x0ffb,
    0x1ffe,
];

#[rustfmt::skip]
const CB6_LENS: [u8; 81] = [
    11, 10,  9,  9,  9,  9,  9, 10, 11, 10,  9,  8,  7,  7,  7,  8,
     9, 10,  9,  8,  6,  6,  6,  6,  6,  8,  9,  9,  7,  6,  4,  4,
     4,  6,  7,  9,  9,  7,  6,  4,  4,  4,  6,  7,  9,  9,  7,  6,
     4,  4,  4,  6,  7,  9,  9,  8,  6,  6,  6,  6,  6,  8,  9, 10,
     9,  8,  7,  7,  7,  7,  8, 10, 11, 10,  9,  9,  9,  9,  9, 10,
    11,
];

#[rustfmt::skip]
const CB6_CODES: [u16; 81] = [
    0x7fe, 0x3fd, 0x1f1, 0x1eb, 0x1f4, 0x1ea, 0x1f0, 0x3fc, 0x7fd, 0x3f6,
    0x1e5, 0x0ea, 0x06c, 0x071, 0x068, 0x0f0, 0x1e6, 0x3f7, 0x1f3, 0x0ef,
    0x032, 0x027, 0x028, 0x026, 0x031, 0x0eb, 0x1f7, 0x1e8, 0x06f, 0x02e,
    0x008, 0x004, 0x006, 0x029, 0x06b, 0x1ee, 0x1ef, 0x072, 0x02d, 0x002,
    0x000, 0x003, 0x02f, 0x073, 0x1fa, 0x1e7, 0x06e, 0x02b, 0x007, 0x001,
    0x005, 0x02c, 0x06d, 0x1ec, 0x1f9, 0x0ee, 0x030, 0x024, 0x02a, 0x025,
    0x033, 0x0ec, 0x1f2, 0x3f8, 0x1e4, 0x0ed, 0x06a, 0x070, 0x069, 0x074,
    0x0f1, 0x3fa, 0x7ff, 0x3f9, 0x1f6, 0x1ed, 0x1f8, 0x1e9, 0x1f5, 0x3fb,
    0x7fc,
];

#[rustfmt::skip]
const CB7_LENS: [u8; 64] = [
     1,  3,  6,  7,  8,  9, 10, 11,  3,  4,  6,  7,  8,  8,  9,  9,
     6,  6,  7,  8,  8,  9,  9, 10,  7,  7,  8,  8,  9,  9, 10, 10,
     8,  8,  9,  9, 10, 10, 10, 11,  9,  8,  9,  9, 10, 10, 11, 11,
    10,  9,  9, 10, 10, 11, 12, 12, 11, 10, 10, 10, 11, 11, 12, 12,
];

#[rustfmt::skip]
const CB7_CODES: [u16; 64] = [
    0x000, 0x005, 0x037, 0x074, 0x0f2, 0x1eb, 0x3ed, 0x7f7, 0x004, 0x00c,
    0x035, 0x071, 0x0ec, 0x0ee, 0x1ee, 0x1f5, 0x036, 0x034, 0x072, 0x0ea,
    0x0f1, 0x1e9, 0x1f3, 0x3f5, 0x073, 0x070, 0x0eb, 0x0f0, 0x1f1, 0x1f0,
    0x3ec, 0x3fa, 0x0f3, 0x0ed, 0x1e8, 0x1ef, 0x3ef, 0x3f1, 0x3f9, 0x7fb,
    0x1ed, 0x0ef, 0x1ea, 0x1f2, 0x3f3, 0x3f8, 0x7f9, 0x7fc, 0x3ee, 0x1ec,
    0x1f4, 0x3f4, 0x3f7, 0x7f8, 0xffd, 0xffe, 0x7f6, 0x3f0, 0x3f2, 0x3f6,
    0x7fa, 0x7fd, 0xffc, 0xfff,
];

#[rustfmt::skip]
const CB8_LENS: [u8; 64] = [
     5,  4,  5,  6,  7,  8,  9, 10,  4,  3,  4,  5,  6,  7,  7,  8,
     5,  4,  4,  5,  6,  7,  7,  8,  6,  5,  5,  6,  6,  7,  8,  8,
     7,  6,  6,  6,  7,  7,  8,  9,  8,  7,  6,  7,  7,  8,  8, 10,
     9,  7,  7,  8,  8,  8,  9,  9, 10,  8,  8,  8,  9,  9,  9, 10,
];

#[rustfmt::skip]
const CB8_CODES: [u16; 64] = [
    0x00e, 0x005, 0x010, 0x030, 0x06f, 0x0f1, 0x1fa, 0x3fe, 0x003, 0x000,
    0x004, 0x012, 0x02c, 0x06a, 0x075, 0x0f8, 0x00f, 0x002, 0x006, 0x014,
    0x02e, 0x069, 0x072, 0x0f5, 0x02f, 0x011, 0x013, 0x02a, 0x032, 0x06c,
    0x0ec, 0x0fa, 0x071, 0x02b, 0x02d, 0x031, 0x06d, 0x070, 0x0f2, 0x1f9,
    0x0ef, 0x068, 0x033, 0x06b, 0x06e, 0x0ee, 0x0f9, 0x3fc, 0x1f8, 0x074,
    0x073, 0x0ed, 0x0f0, 0x0f6, 0x1f6, 0x1fd, 0x3fd, 0x0f3, 0x0f4, 0x0f7,
    0x1f7, 0x1fb, 0x1fc, 0x3ff,
];

#[rustfmt::skip]
const CB9_LENS: [u8; 169] = [
     1,  3,  6,  8,  9, 10, 10, 11, 11, 12, 12, 13, 13,  3,  4,  6,
     7,  8,  8,  9, 10, 10, 10, 11, 12, 12,  6,  6,  7,  8,  8,  9,
    10, 10, 10, 11, 12, 12, 12,  8,  7,  8,  9,  9, 10, 10, 11, 11,
    11, 12, 12, 13,  9,  8,  9,  9, 10, 10, 11, 11, 11, 12, 12, 12,
    13, 10,  9,  9, 10, 11, 11, 11, 12, 11, 12, 12, 13, 13, 11,  9,
    10, 11, 11, 11, 12, 12, 12, 12, 13, 13, 13, 11, 10, 10, 11, 11,
    12, 12, 13, 13, 13, 13, 13, 13, 11, 10, 10, 11, 11, 11, 12, 12,
    13, 13, 14, 13, 14, 11, 10, 11, 11, 12, 12, 12, 12, 13, 13, 14,
    14, 14, 12, 11, 11, 12, 12, 12, 13, 13, 13, 14, 14, 14, 15, 12,
    11, 12, 12, 12, 13, 13, 13, 13, 14, 14, 15, 15, 13, 12, 12, 12,
    13, 13, 13, 13, 14, 14, 14, 14, 15,
];

#[rustfmt::skip]
const CB9_CODES: [u16; 169] = [
    0x0000, 0x0005, 0x0037, 0x00e7, 0x01de, 0x03ce, 0x03d9, 0x07c8, 0x07cd, 0x0fc8,
    0x0fdd, 0x1fe4, 0x1fec, 0x0004, 0x000c, 0x0035, 0x0072, 0x00ea, 0x00ed, 0x01e2,
    0x03d1, 0x03d3, 0x03e0, 0x07d8, 0x0fcf, 0x0fd5, 0x0036, 0x0034, 0x0071, 0x00e8,
    0x00ec, 0x01e1, 0x03cf, 0x03dd, 0x03db, 0x07d0, 0x0fc7, 0x0fd4, 0x0fe4, 0x00e6,
    0x0070, 0x00e9, 0x01dd, 0x01e3, 0x03d2, 0x03dc, 0x07cc, 0x07ca, 0x07de, 0x0fd8,
    0x0fea, 0x1fdb, 0x01df, 0x00eb, 0x01dc, 0x01e6, 0x03d5, 0x03de, 0x07cb, 0x07dd,
    0x07dc, 0x0fcd, 0x0fe2, 0x0fe7, 0x1fe1, 0x03d0, 0x01e0, 0x01e4, 0x03d6, 0x07c5,
    0x07d1, 0x07db, 0x0fd2, 0x07e0, 0x0fd9, 0x0feb, 0x1fe3, 0x1fe9, 0x07c4, 0x01e5,
    0x03d7, 0x07c6, 0x07cf, 0x07da, 0x0fcb, 0x0fda, 0x0fe3, 0x0fe9, 0x1fe6, 0x1ff3,
    0x1ff7, 0x07d3, 0x03d8, 0x03e1, 0x07d4, 0x07d9, 0x0fd3, 0x0fde, 0x1fdd, 0x1fd9,
    0x1fe2, 0x1fea, 0x1ff1, 0x1ff6, 0x07d2, 0x03d4, 0x03da, 0x07c7, 0x07d7, 0x07e2,
    0x0fce, 0x0fdb, 0x1fd8, 0x1fee, 0x3ff0, 0x1ff4, 0x3ff2, 0x07e1, 0x03df, 0x07c9,
    0x07d6, 0x0fca, 0x0fd0, 0x0fe5, 0x0fe6, 0x1feb, 0x1fef, 0x3ff3, 0x3ff4, 0x3ff5,
    0x0fe0, 0x07ce, 0x07d5, 0x0fc6, 0x0fd1, 0x0fe1, 0x1fe0, 0x1fe8, 0x1ff0, 0x3ff1,
    0x3ff8, 0x3ff6, 0x7ffc, 0x0fe8, 0x07df, 0x0fc9, 0x0fd7, 0x0fdc, 0x1fdc, 0x1fdf,
    0x1fed, 0x1ff5, 0x3ff9, 0x3ffb, 0x7ffd, 0x7ffe, 0x1fe7, 0x0fcc, 0x0fd6, 0x0fdf,
    0x1fde, 0x1fda, 0x1fe5, 0x1ff2, 0x3ffa, 0x3ff7, 0x3ffc, 0x3ffd, 0x7fff,
];

#[rustfmt::skip]
const CB10_LENS: [u8; 169] = [
     6,  5,  6,  6,  7,  8,  9, 10, 10, 10, 11, 11, 12,  5,  4,  4,
     5,  6,  7,  7,  8,  8,  9, 10, 10, 11,  6,  4,  5,  5,  6,  6,
     7,  8,  8,  9,  9, 10, 10,  6,  5,  5,  5,  6,  7,  7,  8,  8,
     9,  9, 10, 10,  7,  6,  6,  6,  6,  7,  7,  8,  8,  9,  9, 10,
    10,  8,  7,  6,  7,  7,  7,  8,  8,  8,  9, 10, 10, 11,  9,  7,
     7,  7,  7,  8,  8,  9,  9,  9, 10, 10, 11,  9,  8,  8,  8,  8,
     8,  9,  9,  9, 10, 10, 11, 11,  9,  8,  8,  8,  8,  8,  9,  9,
    10, 10, 10, 11, 11, 10,  9,  9,  9,  9,  9,  9, 10, 10, 10, 11,
    11, 12, 10,  9,  9,  9,  9, 10, 10, 10, 10, 11, 11, 11, 12, 11,
    10,  9, 10, 10, 10, 10, 10, 11, 11, 11, 11, 12, 11, 10, 10, 10,
    10, 10, 10, 11, 11, 12, 12, 12, 12,
];

#[rustfmt::skip]
const CB10_CODES: [u16; 169] = [
    0x022, 0x008, 0x01d, 0x026, 0x05f, 0x0d3, 0x1cf, 0x3d0, 0x3d7, 0x3ed,
    0x7f0, 0x7f6, 0xffd, 0x007, 0x000, 0x001, 0x009, 0x020, 0x054, 0x060,
    0x0d5, 0x0dc, 0x1d4, 0x3cd, 0x3de, 0x7e7, 0x01c, 0x002, 0x006, 0x00c,
    0x01e, 0x028, 0x05b, 0x0cd, 0x0d9, 0x1ce, 0x1dc, 0x3d9, 0x3f1, 0x025,
    0x00b, 0x00a, 0x00d, 0x024, 0x057, 0x061, 0x0cc, 0x0dd, 0x1cc, 0x1de,
    0x3d3, 0x3e7, 0x05d, 0x021, 0x01f, 0x023, 0x027, 0x059, 0x064, 0x0d8,
    0x0df, 0x1d2, 0x1e2, 0x3dd, 0x3ee, 0x0d1, 0x055, 0x029, 0x056, 0x058,
    0x062, 0x0ce, 0x0e0, 0x0e2, 0x1da, 0x3d4, 0x3e3, 0x7eb, 0x1c9, 0x05e,
    0x05a, 0x05c, 0x063, 0x0ca, 0x0da, 0x1c7, 0x1ca, 0x1e0, 0x3db, 0x3e8,
    0x7ec, 0x1e3, 0x0d2, 0x0cb, 0x0d0, 0x0d7, 0x0db, 0x1c6, 0x1d5, 0x1d8,
    0x3ca, 0x3da, 0x7ea, 0x7f1, 0x1e1, 0x0d4, 0x0cf, 0x0d6, 0x0de, 0x0e1,
    0x1d0, 0x1d6, 0x3d1, 0x3d5, 0x3f2, 0x7ee, 0x7fb, 0x3e9, 0x1cd, 0x1c8,
    0x1cb, 0x1d1, 0x1d7, 0x1df, 0x3cf, 0x3e0, 0x3ef, 0x7e6, 0x7f8, 0xffa,
    0x3eb, 0x1dd, 0x1d3, 0x1d9, 0x1db, 0x3d2, 0x3cc, 0x3dc, 0x3ea, 0x7ed,
    0x7f3, 0x7f9, 0xff9, 0x7f2, 0x3ce, 0x1e4, 0x3cb, 0x3d8, 0x3d6, 0x3e2,
    0x3e5, 0x7e8, 0x7f4, 0x7f5, 0x7f7, 0xffb, 0x7fa, 0x3ec, 0x3df, 0x3e1,
    0x3e4, 0x3e6, 0x3f0, 0x7e9, 0x7ef, 0xff8, 0xffe, 0xffc, 0xfff,
];

#[rustfmt::skip]
const CB11_LENS: [u8; 289] = [
     4,  5,  6,  7,  8,  8,  9, 10, 10, 10, 11, 11, 12, 11, 12, 12,
    10,  5,  4,  5,  6,  7,  7,  8,  8,  9,  9,  9, 10, 10, 10, 10,
    11,  8,  6,  5,  5,  6,  7,  7,  8,  8,  8,  9,  9,  9, 10, 10,
    10, 10,  8,  7,  6,  6,  6,  7,  7,  8,  8,  8,  9,  9,  9, 10,
    10, 10, 10,  8,  8,  7,  7,  7,  7,  8,  8,  8,  8,  9,  9,  9,
    10, 10, 10, 10,  8,  8,  7,  7,  7,  7,  8,  8,  8,  9,  9,  9,
     9, 10, 10, 10, 10,  8,  9,  8,  8,  8,  8,  8,  8,  8,  9,  9,
     9, 10, 10, 10, 10, 10,  8,  9,  8,  8,  8,  8,  8,  8,  9,  9,
     9, 10, 10, 10, 10, 10, 10,  8, 10,  9,  8,  8,  9,  9,  9,  9,
     9, 10, 10, 10, 10, 10, 10, 11,  8, 10,  9,  9,  9,  9,  9,  9,
     9, 10, 10, 10, 10, 10, 10, 11, 11,  8, 11,  9,  9,  9,  9,  9,
     9, 10, 10, 10, 10, 10, 11, 10, 11, 11,  8, 11, 10,  9,  9, 10,
     9, 10, 10, 10, 10, 10, 11, 11, 11, 11, 11,  8, 11, 10, 10, 10,
    10, 10, 10, 10, 10, 10, 10, 11, 11, 11, 11, 11,  9, 11, 10,  9,
     9, 10, 10, 10, 10, 10, 10, 11, 11, 11, 11, 11, 11,  9, 11, 10,
    10, 10, 10, 10, 10, 10, 10, 10, 11, 11, 11, 11, 11, 11,  9, 12,
    10, 10, 10, 10, 10, 10, 10, 11, 11, 11, 11, 11, 11, 12, 12,  9,
     9,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  8,  9,
     5,
];

#[rustfmt::skip]
const CB11_CODES: [u16; 289] = [
    0x000, 0x006, 0x019, 0x03d, 0x09c, 0x0c6, 0x1a7, 0x390, 0x3c2, 0x3df,
    0x7e6, 0x7f3, 0xffb, 0x7ec, 0xffa, 0xffe, 0x38e, 0x005, 0x001, 0x008,
    0x014, 0x037, 0x042, 0x092, 0x0af, 0x191, 0x1a5, 0x1b5, 0x39e, 0x3c0,
    0x3a2, 0x3cd, 0x7d6, 0x0ae, 0x017, 0x007, 0x009, 0x018, 0x039, 0x040,
    0x08e, 0x0a3, 0x0b8, 0x199, 0x1ac, 0x1c1, 0x3b1, 0x396, 0x3be, 0x3ca,
    0x09d, 0x03c, 0x015, 0x016, 0x01a, 0x03b, 0x044, 0x091, 0x0a5, 0x0be,
    0x196, 0x1ae, 0x1b9, 0x3a1, 0x391, 0x3a5, 0x3d5, 0x094, 0x09a, 0x036,
    0x038, 0x03a, 0x041, 0x08c, 0x09b, 0x0b0, 0x0c3, 0x19e, 0x1ab, 0x1bc,
    0x39f, 0x38f, 0x3a9, 0x3cf, 0x093, 0x0bf, 0x03e, 0x03f, 0x043, 0x045,
    0x09e, 0x0a7, 0x0b9, 0x194, 0x1a2, 0x1ba, 0x1c3, 0x3a6, 0x3a7, 0x3bb,
    0x3d4, 0x09f, 0x1a0, 0x08f, 0x08d, 0x090, 0x098, 0x0a6, 0x0b6, 0x0c4,
    0x19f, 0x1af, 0x1bf, 0x399, 0x3bf, 0x3b4, 0x3c9, 0x3e7, 0x0a8, 0x1b6,
    0x0ab, 0x0a4, 0x0aa, 0x0b2, 0x0c2, 0x0c5, 0x198, 0x1a4, 0x1b8, 0x38c,
    0x3a4, 0x3c4, 0x3c6, 0x3dd, 0x3e8, 0x0ad, 0x3af, 0x192, 0x0bd, 0x0bc,
    0x18e, 0x197, 0x19a, 0x1a3, 0x1b1, 0x38d, 0x398, 0x3b7, 0x3d3, 0x3d1,
    0x3db, 0x7dd, 0x0b4, 0x3de, 0x1a9, 0x19b, 0x19c, 0x1a1, 0x1aa, 0x1ad,
    0x1b3, 0x38b, 0x3b2, 0x3b8, 0x3ce, 0x3e1, 0x3e0, 0x7d2, 0x7e5, 0x0b7,
    0x7e3, 0x1bb, 0x1a8, 0x1a6, 0x1b0, 0x1b2, 0x1b7, 0x39b, 0x39a, 0x3ba,
    0x3b5, 0x3d6, 0x7d7, 0x3e4, 0x7d8, 0x7ea, 0x0ba, 0x7e8, 0x3a0, 0x1bd,
    0x1b4, 0x38a, 0x1c4, 0x392, 0x3aa, 0x3b0, 0x3bc, 0x3d7, 0x7d4, 0x7dc,
    0x7db, 0x7d5, 0x7f0, 0x0c1, 0x7fb, 0x3c8, 0x3a3, 0x395, 0x39d, 0x3ac,
    0x3ae, 0x3c5, 0x3d8, 0x3e2, 0x3e6, 0x7e4, 0x7e7, 0x7e0, 0x7e9, 0x7f7,
    0x190, 0x7f2, 0x393, 0x1be, 0x1c0, 0x394, 0x397, 0x3ad, 0x3c3, 0x3c1,
    0x3d2, 0x7da, 0x7d9, 0x7df, 0x7eb, 0x7f4, 0x7fa, 0x195, 0x7f8, 0x3bd,
    0x39c, 0x3ab, 0x3a8, 0x3b3, 0x3b9, 0x3d0, 0x3e3, 0x3e5, 0x7e2, 0x7de,
    0x7ed, 0x7f1, 0x7f9, 0x7fc, 0x193, 0xffd, 0x3dc, 0x3b6, 0x3c7, 0x3cc,
    0x3cb, 0x3d9, 0x3da, 0x7d3, 0x7e1, 0x7ee, 0x7ef, 0x7f5, 0x7f6, 0xffc,
    0xfff, 0x19d, 0x1c2, 0x0b5, 0x0a1, 0x096, 0x097, 0x095, 0x099, 0x0a0,
    0x0a2, 0x0ac, 0x0a9, 0x0b1, 0x0b3, 0x0bb, 0x0c0, 0x18f, 0x004,
];
