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

    src/blocks/mod.rs

    The TZX block model. Every block begins with a one byte ID that fixes the layout of the
    body that follows. Not every layout carries its own length, so a block with an unknown
    ID cannot be skipped and parsing must stop there.
*/

pub mod control;
pub mod signal;
pub mod text;

pub use control::{GroupStartBlock, PauseBlock};
pub use signal::{PulseSequenceBlock, PureDataBlock, PureToneBlock, StandardSpeedBlock, TurboSpeedBlock};
pub use text::{ArchiveEntry, ArchiveField, ArchiveInfoBlock, TextDescriptionBlock};

use crate::{FormatError, TapeError};
use binrw::{binrw, BinRead, BinResult, BinWrite};
use std::{
    fmt,
    fmt::{Display, Formatter},
    io::Cursor,
};
use strum::{EnumIter, FromRepr};

pub const MAXIMUM_U24: usize = 0xFF_FFFF;

/// A 24-bit little-endian length field.
#[binrw]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct U24([u8; 3]);

impl U24 {
    pub fn from_len(len: usize) -> Self {
        let bytes = (len as u32).to_le_bytes();
        U24([bytes[0], bytes[1], bytes[2]])
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        self.0
    }

    pub fn value(&self) -> usize {
        u32::from_le_bytes([self.0[0], self.0[1], self.0[2], 0]) as usize
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, EnumIter, FromRepr)]
pub enum BlockId {
    StandardSpeed = 0x10,
    TurboSpeed = 0x11,
    PureTone = 0x12,
    PulseSequence = 0x13,
    PureData = 0x14,
    Pause = 0x20,
    GroupStart = 0x21,
    GroupEnd = 0x22,
    TextDescription = 0x30,
    ArchiveInfo = 0x32,
}

impl Display for BlockId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        use BlockId::*;
        match self {
            StandardSpeed => write!(f, "Standard Speed Data"),
            TurboSpeed => write!(f, "Turbo Speed Data"),
            PureTone => write!(f, "Pure Tone"),
            PulseSequence => write!(f, "Pulse Sequence"),
            PureData => write!(f, "Pure Data"),
            Pause => write!(f, "Pause"),
            GroupStart => write!(f, "Group Start"),
            GroupEnd => write!(f, "Group End"),
            TextDescription => write!(f, "Text Description"),
            ArchiveInfo => write!(f, "Archive Info"),
        }
    }
}

/// A single record of a tape image, in physical tape order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    StandardSpeed(StandardSpeedBlock),
    TurboSpeed(TurboSpeedBlock),
    PureTone(PureToneBlock),
    PulseSequence(PulseSequenceBlock),
    PureData(PureDataBlock),
    Pause(PauseBlock),
    GroupStart(GroupStartBlock),
    GroupEnd,
    TextDescription(TextDescriptionBlock),
    ArchiveInfo(ArchiveInfoBlock),
}

fn read_body<'a, T>(
    id: u8,
    body: &'a [u8],
    offset: usize,
    read: impl FnOnce(&mut Cursor<&'a [u8]>) -> BinResult<T>,
) -> Result<(T, &'a [u8]), FormatError> {
    let mut cursor = Cursor::new(body);
    let value = read(&mut cursor).map_err(|e| {
        if e.is_eof() {
            FormatError::Truncated { id, offset }
        }
        else {
            FormatError::Malformed {
                id,
                offset,
                reason: e.to_string(),
            }
        }
    })?;
    let consumed = cursor.position() as usize;
    Ok((value, &body[consumed..]))
}

impl Block {
    /// Parse the body of a block with the given `id` from the start of `body`, returning the
    /// block and the bytes that follow it. `offset` is the position of the ID byte within the
    /// image and is only used for error reporting.
    pub fn parse(id: u8, body: &[u8], offset: usize) -> Result<(Block, &[u8]), FormatError> {
        let block_id = BlockId::from_repr(id).ok_or(FormatError::UnknownBlock { id, offset })?;

        let (block, rest) = match block_id {
            BlockId::StandardSpeed => {
                let (b, rest) = read_body(id, body, offset, |c| StandardSpeedBlock::read(c))?;
                (Block::StandardSpeed(b), rest)
            }
            BlockId::TurboSpeed => {
                let (b, rest) = read_body(id, body, offset, |c| TurboSpeedBlock::read(c))?;
                (Block::TurboSpeed(b), rest)
            }
            BlockId::PureTone => {
                let (b, rest) = read_body(id, body, offset, |c| PureToneBlock::read(c))?;
                (Block::PureTone(b), rest)
            }
            BlockId::PulseSequence => {
                let (b, rest) = read_body(id, body, offset, |c| PulseSequenceBlock::read(c))?;
                if b.pulses.is_empty() {
                    return Err(FormatError::Malformed {
                        id,
                        offset,
                        reason: "pulse sequence is empty".to_string(),
                    });
                }
                (Block::PulseSequence(b), rest)
            }
            BlockId::PureData => {
                let (b, rest) = read_body(id, body, offset, |c| PureDataBlock::read(c))?;
                (Block::PureData(b), rest)
            }
            BlockId::Pause => {
                let (b, rest) = read_body(id, body, offset, |c| PauseBlock::read(c))?;
                (Block::Pause(b), rest)
            }
            BlockId::GroupStart => {
                let (b, rest) = read_body(id, body, offset, |c| GroupStartBlock::read(c))?;
                (Block::GroupStart(b), rest)
            }
            BlockId::GroupEnd => (Block::GroupEnd, body),
            BlockId::TextDescription => {
                let (b, rest) = read_body(id, body, offset, |c| TextDescriptionBlock::read(c))?;
                (Block::TextDescription(b), rest)
            }
            BlockId::ArchiveInfo => {
                let (b, rest) = read_body(id, body, offset, |c| ArchiveInfoBlock::read(c))?;
                // The length word must agree with the entries it covers.
                let declared = u16::from_le_bytes([body[0], body[1]]) as usize;
                if declared != b.body_len() {
                    return Err(FormatError::Malformed {
                        id,
                        offset,
                        reason: format!("length field {} does not match entries ({})", declared, b.body_len()),
                    });
                }
                (Block::ArchiveInfo(b), rest)
            }
        };

        log::trace!("parse(): {} ({:02X}) at offset {:X}", block_id, id, offset);
        Ok((block, rest))
    }

    pub fn id(&self) -> BlockId {
        match self {
            Block::StandardSpeed(_) => BlockId::StandardSpeed,
            Block::TurboSpeed(_) => BlockId::TurboSpeed,
            Block::PureTone(_) => BlockId::PureTone,
            Block::PulseSequence(_) => BlockId::PulseSequence,
            Block::PureData(_) => BlockId::PureData,
            Block::Pause(_) => BlockId::Pause,
            Block::GroupStart(_) => BlockId::GroupStart,
            Block::GroupEnd => BlockId::GroupEnd,
            Block::TextDescription(_) => BlockId::TextDescription,
            Block::ArchiveInfo(_) => BlockId::ArchiveInfo,
        }
    }

    fn write_body(&self, out: &mut Cursor<Vec<u8>>) -> BinResult<()> {
        match self {
            Block::StandardSpeed(b) => b.write(out),
            Block::TurboSpeed(b) => b.write(out),
            Block::PureTone(b) => b.write(out),
            Block::PulseSequence(b) => b.write(out),
            Block::PureData(b) => b.write(out),
            Block::Pause(b) => b.write(out),
            Block::GroupStart(b) => b.write(out),
            Block::GroupEnd => Ok(()),
            Block::TextDescription(b) => b.write(out),
            Block::ArchiveInfo(b) => b.write(out),
        }
    }

    /// Compose the block into its on-tape representation, ID byte included.
    pub fn compose(&self) -> Result<Vec<u8>, TapeError> {
        let mut out = Cursor::new(vec![self.id() as u8]);
        out.set_position(1);
        self.write_body(&mut out)
            .map_err(|e| TapeError::WriteError(format!("{}: {}", self.id(), e)))?;
        Ok(out.into_inner())
    }

    /// The payload of a block that can carry a CPC cassette record.
    pub fn record_data(&self) -> Option<&[u8]> {
        match self {
            Block::StandardSpeed(b) => Some(&b.data),
            Block::TurboSpeed(b) => Some(&b.data),
            _ => None,
        }
    }

    /// The pause following this block, in milliseconds, if it has one.
    pub fn pause_ms(&self) -> Option<u16> {
        match self {
            Block::StandardSpeed(b) => Some(b.pause_ms),
            Block::TurboSpeed(b) => Some(b.pause_ms),
            Block::PureData(b) => Some(b.pause_ms),
            Block::Pause(b) => Some(b.pause_ms),
            _ => None,
        }
    }

    /// Verify that the block can be written back with the field widths of its layout.
    pub fn check(&self) -> Result<(), String> {
        match self {
            Block::StandardSpeed(b) => check_len("data", b.data.len(), u16::MAX as usize),
            Block::TurboSpeed(b) => {
                check_used_bits(b.used_bits)?;
                check_len("data", b.data.len(), MAXIMUM_U24)
            }
            Block::PureData(b) => {
                check_used_bits(b.used_bits)?;
                check_len("data", b.data.len(), MAXIMUM_U24)
            }
            Block::PulseSequence(b) => {
                if b.pulses.is_empty() {
                    return Err("pulse sequence is empty".to_string());
                }
                check_len("pulse sequence", b.pulses.len(), u8::MAX as usize)
            }
            Block::GroupStart(b) => check_len("group name", b.name.len(), u8::MAX as usize),
            Block::TextDescription(b) => check_len("description", b.text.len(), u8::MAX as usize),
            Block::ArchiveInfo(b) => {
                check_len("archive entries", b.entries.len(), u8::MAX as usize)?;
                for entry in &b.entries {
                    check_len("archive entry", entry.text.len(), u8::MAX as usize)?;
                }
                check_len("archive info", b.body_len(), u16::MAX as usize)
            }
            Block::PureTone(_) | Block::Pause(_) | Block::GroupEnd => Ok(()),
        }
    }
}

fn check_len(what: &str, len: usize, max: usize) -> Result<(), String> {
    if len > max {
        Err(format!("{} length {} exceeds maximum of {}", what, len, max))
    }
    else {
        Ok(())
    }
}

fn check_used_bits(used_bits: u8) -> Result<(), String> {
    if !(1..=8).contains(&used_bits) {
        return Err(format!("invalid used bits in last byte: {}", used_bits));
    }
    Ok(())
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{:02X} {:<20}", self.id() as u8, self.id().to_string())?;
        match self {
            Block::StandardSpeed(b) => write!(f, " {:>6} bytes, pause {}ms", b.data.len(), b.pause_ms),
            Block::TurboSpeed(b) => write!(
                f,
                " {:>6} bytes, ~{} baud, pilot {}x{}, pause {}ms",
                b.data.len(),
                b.baud(),
                b.pilot_len,
                b.pilot_pulse,
                b.pause_ms
            ),
            Block::PureTone(b) => write!(f, " {} pulses of {}", b.pulse_count, b.pulse_len),
            Block::PulseSequence(b) => write!(f, " {:?}", b.pulses),
            Block::PureData(b) => write!(f, " {:>6} bytes, pause {}ms", b.data.len(), b.pause_ms),
            Block::Pause(b) if b.is_stop() => write!(f, " stop the tape"),
            Block::Pause(b) => write!(f, " {}ms", b.pause_ms),
            Block::GroupStart(b) => write!(f, " \"{}\"", b.name()),
            Block::GroupEnd => Ok(()),
            Block::TextDescription(b) => write!(f, " \"{}\"", b.text()),
            Block::ArchiveInfo(b) => {
                for entry in &b.entries {
                    write!(f, " {}: \"{}\"", entry.field(), entry.text())?;
                }
                Ok(())
            }
        }
    }
}
