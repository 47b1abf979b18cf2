// Lyra
// Copyright (c) 2019-2022 The Project Lyra Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use lyra_core::errors::{Error, Result};
use lyra_core::io::ReadBits;

use crate::aac::common::validate;

/// Pulses added to the quantized spectrum of a long window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pulse {
    number_pulse: usize,
    pulse_start_sfb: usize,
    pulse_offset: [u8; 4],
    pulse_amp: [u8; 4],
}

impl Pulse {
    pub fn read<B: ReadBits>(bs: &mut B, num_swb: usize) -> Result<Option<Self>> {
        let pulse_data_present = bs.read_bool();

        if !pulse_data_present {
            return Ok(None);
        }

        let number_pulse = bs.read_bits_leq32(2) as usize + 1;
        let pulse_start_sfb = bs.read_bits_leq32(6) as usize;

        validate!(pulse_start_sfb <= num_swb, Error::MaxSfbExceeded);

        let mut pulse_offset: [u8; 4] = [0; 4];
        let mut pulse_amp: [u8; 4] = [0; 4];

        for i in 0..number_pulse {
            pulse_offset[i] = bs.read_bits_leq32(5) as u8;
            pulse_amp[i] = bs.read_bits_leq32(4) as u8;
        }

        Ok(Some(Self { number_pulse, pulse_start_sfb, pulse_offset, pulse_amp }))
    }

    /// Adds the pulses to the quantized values of a long window. The magnitude of each value
    /// grows by the pulse amplitude.
    pub fn apply(&self, bands: &[usize], quant: &mut [i32]) -> Result<()> {
        let swb_offset_max = bands[bands.len() - 1];

        let mut k = bands[self.pulse_start_sfb].min(swb_offset_max);

        for pno in 0..self.number_pulse {
            k += usize::from(self.pulse_offset[pno]);

            validate!(k < quant.len(), Error::IndexOutOfRange);

            let amp = i32::from(self.pulse_amp[pno]);

            if quant[k] > 0 {
                quant[k] += amp;
            }
            else {
                quant[k] -= amp;
            }
        }

        Ok(())
    }
}
