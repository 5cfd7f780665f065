/*
    TapeFox

    Copyright 2024 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.

    --------------------------------------------------------------------------

    src/blocks/signal.rs

    Blocks that describe a signal: data blocks at standard or turbo speed, and the raw
    tone, pulse and data building blocks used by custom loaders.
*/

use crate::{baud::PulseTiming, blocks::U24};
use binrw::binrw;

/// Block 0x10. Data recorded with the ZX Spectrum ROM timings.
#[binrw]
#[brw(little)]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StandardSpeedBlock {
    pub pause_ms: u16,
    #[br(temp)]
    #[bw(calc = data.len() as u16)]
    data_len: u16,
    #[br(count = data_len as usize)]
    pub data: Vec<u8>,
}

/// Block 0x11. Data recorded with arbitrary pilot, sync and bit timings. CPC firmware
/// records are always stored as turbo speed blocks.
#[binrw]
#[brw(little)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TurboSpeedBlock {
    pub pilot_pulse: u16,
    pub sync1_pulse: u16,
    pub sync2_pulse: u16,
    pub zero_pulse:  u16,
    pub one_pulse:   u16,
    pub pilot_len:   u16,
    pub used_bits:   u8,
    pub pause_ms:    u16,
    #[br(temp)]
    #[bw(calc = U24::from_len(data.len()))]
    data_len: U24,
    #[br(count = data_len.value())]
    pub data: Vec<u8>,
}

impl TurboSpeedBlock {
    pub fn new(timing: PulseTiming, pause_ms: u16, data: Vec<u8>) -> Self {
        TurboSpeedBlock {
            pilot_pulse: timing.pilot_pulse,
            sync1_pulse: timing.sync1_pulse,
            sync2_pulse: timing.sync2_pulse,
            zero_pulse: timing.zero_pulse,
            one_pulse: timing.one_pulse,
            pilot_len: timing.pilot_len,
            used_bits: 8,
            pause_ms,
            data,
        }
    }

    /// Approximate bit rate of the block, derived from its bit pulse lengths.
    pub fn baud(&self) -> u32 {
        let bit_time = self.zero_pulse as u32 + self.one_pulse as u32;
        if bit_time == 0 {
            return 0;
        }
        crate::baud::TZX_CLOCK_HZ / bit_time
    }
}

/// Block 0x12. A run of identical pulses.
#[binrw]
#[brw(little)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PureToneBlock {
    pub pulse_len: u16,
    pub pulse_count: u16,
}

/// Block 0x13. A sequence of pulses of individual lengths.
#[binrw]
#[brw(little)]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PulseSequenceBlock {
    #[br(temp)]
    #[bw(calc = pulses.len() as u8)]
    pulse_count: u8,
    #[br(count = pulse_count as usize)]
    pub pulses: Vec<u16>,
}

/// Block 0x14. Data without pilot tone or sync pulses.
#[binrw]
#[brw(little)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PureDataBlock {
    pub zero_pulse: u16,
    pub one_pulse: u16,
    pub used_bits: u8,
    pub pause_ms: u16,
    #[br(temp)]
    #[bw(calc = U24::from_len(data.len()))]
    data_len: U24,
    #[br(count = data_len.value())]
    pub data: Vec<u8>,
}
