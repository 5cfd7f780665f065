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

    src/baud.rs

    Conversion of CPC cassette baud rates into TZX pulse timings.
*/

use std::{
    fmt,
    fmt::{Display, Formatter},
};

/// TZX pulse lengths are expressed in Z80 T-states of a 3.5MHz ZX Spectrum.
pub const TZX_CLOCK_HZ: u32 = 3_500_000;
/// The CPC leader is 2048 '1' bits, or 4096 pulses.
pub const PILOT_PULSE_COUNT: u16 = 4096;
pub const MINIMUM_BAUD: u32 = 100;
pub const MAXIMUM_BAUD: u32 = 6000;

/// The speed at which a file is written to tape.
/// The CPC firmware offers two speeds through `SPEED WRITE`, but the cassette routines accept
/// any rate, and turbo loaders commonly use others.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BaudRate {
    Baud1000,
    #[default]
    Baud2000,
    Nonstandard(u32),
}

impl From<u32> for BaudRate {
    fn from(rate: u32) -> Self {
        match rate {
            1000 => BaudRate::Baud1000,
            2000 => BaudRate::Baud2000,
            _ => BaudRate::Nonstandard(rate),
        }
    }
}

impl From<BaudRate> for u32 {
    fn from(rate: BaudRate) -> Self {
        match rate {
            BaudRate::Baud1000 => 1000,
            BaudRate::Baud2000 => 2000,
            BaudRate::Nonstandard(rate) => rate,
        }
    }
}

impl Display for BaudRate {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} baud", u32::from(*self))
    }
}

impl BaudRate {
    /// Returns `true` if the rate can be expressed as TZX pulse lengths.
    pub fn is_valid(&self) -> bool {
        (MINIMUM_BAUD..=MAXIMUM_BAUD).contains(&u32::from(*self))
    }

    pub fn timing(&self) -> PulseTiming {
        PulseTiming::from(*self)
    }
}

/// Pulse lengths, in T-states, for a turbo speed block carrying CPC records.
///
/// A '0' bit is two pulses of `zero_pulse`, a '1' bit two pulses of twice that length, so
/// a stream of evenly mixed bits runs at the nominal baud rate.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PulseTiming {
    pub pilot_pulse: u16,
    pub sync1_pulse: u16,
    pub sync2_pulse: u16,
    pub zero_pulse:  u16,
    pub one_pulse:   u16,
    pub pilot_len:   u16,
}

impl From<BaudRate> for PulseTiming {
    fn from(rate: BaudRate) -> Self {
        let baud = u32::from(rate).clamp(MINIMUM_BAUD, MAXIMUM_BAUD);
        let divisor = baud * 3;
        let zero_pulse = ((TZX_CLOCK_HZ + divisor / 2) / divisor) as u16;
        let one_pulse = zero_pulse * 2;

        PulseTiming {
            pilot_pulse: one_pulse,
            sync1_pulse: zero_pulse,
            sync2_pulse: zero_pulse,
            zero_pulse,
            one_pulse,
            pilot_len: PILOT_PULSE_COUNT,
        }
    }
}
