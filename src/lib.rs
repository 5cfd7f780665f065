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

    src/lib.rs

    tapefox is a library crate for reading, writing and modifying CDT tape images for the
    Amstrad CPC. CDT images are TZX containers: a short preamble followed by a stream of
    tagged blocks, in physical tape order.
*/

pub mod baud;
pub mod blocks;
pub mod catalog;
pub mod crc;
mod encoder;
pub mod header;
pub mod record;
pub mod tape_image;
pub mod tape_writer;
mod util;

use thiserror::Error;

/// The sync byte that precedes a CPC cassette header record.
pub const HEADER_SYNC: u8 = 0x2C;
/// The sync byte that precedes a CPC cassette data record.
pub const DATA_SYNC: u8 = 0x16;
/// Every CPC cassette record ends with four 0xFF bytes.
pub const RECORD_TRAILER: [u8; 4] = [0xFF; 4];
/// The firmware transfers data in 256 byte segments, each followed by a CRC.
pub const SEGMENT_SIZE: usize = 256;
/// The firmware writes at most 8 segments (2K) per header/data record pair.
pub const SEGMENTS_PER_RECORD: usize = 8;
pub const MAXIMUM_RECORD_SIZE: usize = SEGMENT_SIZE * SEGMENTS_PER_RECORD;

/// Pause after a header record, in milliseconds.
pub const PAUSE_HEADER_MS: u16 = 10;
/// Pause after a data record, in milliseconds.
pub const PAUSE_DATA_MS: u16 = 2000;
/// Pause appended after the last record of a file, in milliseconds.
pub const PAUSE_FILE_MS: u16 = 3000;
/// Pause block written at the start of a freshly created tape, in milliseconds.
pub const PAUSE_IDLE_MS: u16 = 2000;

/// Errors raised while decoding the block stream of a tape image.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("The tape image does not begin with a TZX signature")]
    BadSignature,
    #[error("Unsupported TZX major version: {0}")]
    UnsupportedVersion(u8),
    #[error("Unsupported block ID {id:#04X} at offset {offset:#X}")]
    UnknownBlock { id: u8, offset: usize },
    #[error("Block {id:#04X} at offset {offset:#X} is truncated")]
    Truncated { id: u8, offset: usize },
    #[error("Block {id:#04X} at offset {offset:#X} is malformed: {reason}")]
    Malformed { id: u8, offset: usize, reason: String },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TapeError {
    #[error("The tape image format parser encountered an error: {0}")]
    FormatError(#[from] FormatError),
    #[error("The tape image file was not found: {0}")]
    FileNotFound(String),
    #[error("An IO error occurred reading the tape image: {0}")]
    ReadError(String),
    #[error("An IO error occurred writing the tape image: {0}")]
    WriteError(String),
    #[error("Integrity check failed at block {index}: {reason}")]
    IntegrityError { index: usize, reason: String },
    #[error("Invalid parameters were specified to a library function: {0}")]
    ParameterError(String),
}

pub use crate::{
    baud::{BaudRate, PulseTiming},
    blocks::{Block, BlockId},
    catalog::{EntryOrigin, NameSource, TapeEntry, TapeFile},
    crc::tape_crc,
    header::{AmsdosHeader, FileHeaderRecord, FileType},
    tape_image::{TapeImage, TapeInfo, TzxPreamble},
    tape_writer::TapeWriter,
};

pub mod prelude {
    pub use crate::{
        BaudRate,
        Block,
        BlockId,
        FileHeaderRecord,
        FileType,
        FormatError,
        TapeEntry,
        TapeError,
        TapeFile,
        TapeImage,
    };
}
