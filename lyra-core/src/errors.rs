// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type.
//!
//! Every error maps onto a small, stable, positive integer code. A code of 0 is never produced by
//! an `Error` and denotes success.

use std::error;
use std::fmt;
use std::result;

/// `Error` provides an enumeration of all possible errors reported by Lyra decoders.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Error {
    /// Gain control is not implemented.
    GainControlUnsupported,
    /// Pulse coding is not allowed in short blocks.
    PulseInShortBlock,
    /// An invalid Huffman codebook was selected.
    InvalidCodebook,
    /// A scale factor is out of range.
    ScaleFactorRange,
    /// An ADTS syncword could not be found.
    NoSyncword,
    /// Channel coupling is not implemented.
    CouplingUnsupported,
    /// The channel configuration is not allowed in an error resilient frame.
    ErChannelConfig,
    /// A bit error was detected in error resilient scale factor decoding.
    ErScaleFactorBitError,
    /// A scale factor Huffman codeword could not be decoded.
    ScaleFactorHuffman,
    /// A spectral Huffman codeword could not be decoded.
    SpectralHuffman,
    /// A non-existent Huffman codebook number was found.
    NonexistentCodebook,
    /// The number of channels is invalid.
    InvalidChannelCount,
    /// The maximum number of bitstream elements was exceeded.
    MaxElementsExceeded,
    /// The input buffer is too small to contain the frame.
    InputTooSmall,
    /// An array index derived from the bitstream is out of range.
    IndexOutOfRange,
    /// The maximum number of scale factor bands was exceeded.
    MaxSfbExceeded,
    /// A quantised value is out of range.
    QuantizedValueRange,
    /// The LTP lag is out of range.
    LtpLagRange,
    /// An invalid SBR parameter was decoded.
    InvalidSbrParameter,
    /// SBR was invoked without being initialised.
    SbrUninitialized,
    /// The channel configuration changed unexpectedly.
    UnexpectedChannelConfigChange,
    /// The program config element is malformed.
    ProgramConfigError,
    /// The first SBR frame is not the same as the first AAC frame.
    FirstSbrFrameMismatch,
    /// A fill element carried unexpected SBR data.
    UnexpectedSbrFill,
    /// Not all elements were provided with SBR data.
    IncompleteSbrElements,
    /// LTP decoding is not available.
    LtpUnavailable,
    /// The output buffer is too small.
    OutputTooSmall,
    /// The CRC of DRM data did not match.
    CrcMismatch,
    /// PNS is not allowed in a DRM data stream.
    PnsNotAllowed,
    /// No standard extension payload is allowed in DRM.
    NoStandardExtension,
    /// The program config element must be the first element of a frame.
    PceNotFirst,
    /// A bitstream value is not allowed.
    ValueNotAllowed,
    /// MAIN prediction state was used before being initialised.
    PredictionUninitialized,
}

const ALL_ERRORS: [Error; 33] = [
    Error::GainControlUnsupported,
    Error::PulseInShortBlock,
    Error::InvalidCodebook,
    Error::ScaleFactorRange,
    Error::NoSyncword,
    Error::CouplingUnsupported,
    Error::ErChannelConfig,
    Error::ErScaleFactorBitError,
    Error::ScaleFactorHuffman,
    Error::SpectralHuffman,
    Error::NonexistentCodebook,
    Error::InvalidChannelCount,
    Error::MaxElementsExceeded,
    Error::InputTooSmall,
    Error::IndexOutOfRange,
    Error::MaxSfbExceeded,
    Error::QuantizedValueRange,
    Error::LtpLagRange,
    Error::InvalidSbrParameter,
    Error::SbrUninitialized,
    Error::UnexpectedChannelConfigChange,
    Error::ProgramConfigError,
    Error::FirstSbrFrameMismatch,
    Error::UnexpectedSbrFill,
    Error::IncompleteSbrElements,
    Error::LtpUnavailable,
    Error::OutputTooSmall,
    Error::CrcMismatch,
    Error::PnsNotAllowed,
    Error::NoStandardExtension,
    Error::PceNotFirst,
    Error::ValueNotAllowed,
    Error::PredictionUninitialized,
];

impl Error {
    /// Gets the numeric error code. Codes start at 1.
    pub fn code(&self) -> u8 {
        match *self {
            Error::GainControlUnsupported => 1,
            Error::PulseInShortBlock => 2,
            Error::InvalidCodebook => 3,
            Error::ScaleFactorRange => 4,
            Error::NoSyncword => 5,
            Error::CouplingUnsupported => 6,
            Error::ErChannelConfig => 7,
            Error::ErScaleFactorBitError => 8,
            Error::ScaleFactorHuffman => 9,
            Error::SpectralHuffman => 10,
            Error::NonexistentCodebook => 11,
            Error::InvalidChannelCount => 12,
            Error::MaxElementsExceeded => 13,
            Error::InputTooSmall => 14,
            Error::IndexOutOfRange => 15,
            Error::MaxSfbExceeded => 16,
            Error::QuantizedValueRange => 17,
            Error::LtpLagRange => 18,
            Error::InvalidSbrParameter => 19,
            Error::SbrUninitialized => 20,
            Error::UnexpectedChannelConfigChange => 21,
            Error::ProgramConfigError => 22,
            Error::FirstSbrFrameMismatch => 23,
            Error::UnexpectedSbrFill => 24,
            Error::IncompleteSbrElements => 25,
            Error::LtpUnavailable => 26,
            Error::OutputTooSmall => 27,
            Error::CrcMismatch => 28,
            Error::PnsNotAllowed => 29,
            Error::NoStandardExtension => 30,
            Error::PceNotFirst => 31,
            Error::ValueNotAllowed => 32,
            Error::PredictionUninitialized => 33,
        }
    }

    /// Gets the error for a numeric error code, if the code is known.
    pub fn from_code(code: u8) -> Option<Error> {
        ALL_ERRORS.iter().copied().find(|err| err.code() == code)
    }

    /// Returns true if the error reports a feature that is not implemented, rather than a
    /// malformed bitstream.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            *self,
            Error::GainControlUnsupported | Error::CouplingUnsupported | Error::LtpUnavailable
        )
    }

    fn as_str(&self) -> &'static str {
        match *self {
            Error::GainControlUnsupported => "gain control not yet implemented",
            Error::PulseInShortBlock => "pulse coding not allowed in short blocks",
            Error::InvalidCodebook => "invalid huffman codebook",
            Error::ScaleFactorRange => "scalefactor out of range",
            Error::NoSyncword => "unable to find ADTS syncword",
            Error::CouplingUnsupported => "channel coupling not yet implemented",
            Error::ErChannelConfig => "channel configuration not allowed in error resilient frame",
            Error::ErScaleFactorBitError => {
                "bit error in error resilient scalefactor decoding"
            }
            Error::ScaleFactorHuffman => "error decoding huffman scalefactor (bitstream error)",
            Error::SpectralHuffman => "error decoding huffman codeword (bitstream error)",
            Error::NonexistentCodebook => "non existent huffman codebook number found",
            Error::InvalidChannelCount => "invalid number of channels",
            Error::MaxElementsExceeded => "maximum number of bitstream elements exceeded",
            Error::InputTooSmall => "input data buffer too small",
            Error::IndexOutOfRange => "array index out of range",
            Error::MaxSfbExceeded => "maximum number of scalefactor bands exceeded",
            Error::QuantizedValueRange => "quantised value out of range",
            Error::LtpLagRange => "LTP lag out of range",
            Error::InvalidSbrParameter => "invalid SBR parameter decoded",
            Error::SbrUninitialized => "SBR called without being initialised",
            Error::UnexpectedChannelConfigChange => "unexpected channel configuration change",
            Error::ProgramConfigError => "error in program config element",
            Error::FirstSbrFrameMismatch => "first SBR frame is not the same as first AAC frame",
            Error::UnexpectedSbrFill => "unexpected fill element with SBR data",
            Error::IncompleteSbrElements => "not all elements were provided with SBR data",
            Error::LtpUnavailable => "LTP decoding not available",
            Error::OutputTooSmall => "output data buffer too small",
            Error::CrcMismatch => "CRC error in DRM data",
            Error::PnsNotAllowed => "PNS not allowed in DRM data stream",
            Error::NoStandardExtension => "no standard extension payload allowed in DRM",
            Error::PceNotFirst => "PCE shall be the first element in a frame",
            Error::ValueNotAllowed => "bitstream value not allowed by the standard",
            Error::PredictionUninitialized => "MAIN prediction not initialised",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unsupported() {
            write!(f, "unsupported feature: {}", self.as_str())
        }
        else {
            write!(f, "malformed stream: {}", self.as_str())
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

/// Convenience function to create a decode error.
pub fn decode_error<T>(err: Error) -> Result<T> {
    debug_assert!(!err.is_unsupported());
    Err(err)
}

/// Convenience function to create an unsupported feature error.
pub fn unsupported_error<T>(err: Error) -> Result<T> {
    debug_assert!(err.is_unsupported());
    Err(err)
}
