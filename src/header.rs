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

    src/header.rs

    The CPC cassette file header, and the AMSDOS disk file header that precedes many CPC
    files found on PCs.
*/

use crate::{blocks::U24, util::pad_name, TapeError};
use binrw::{binrw, BinRead, BinResult, BinWrite};
use std::{
    fmt,
    fmt::{Display, Formatter},
    io::Cursor,
};

/// Size of the cassette header record. On tape it is padded to a full segment.
pub const HEADER_RECORD_SIZE: usize = 64;
pub const FILE_NAME_LEN: usize = 16;
pub const AMSDOS_HEADER_SIZE: usize = 128;

/// The type byte of a CPC file.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FileType {
    #[doc = "A tokenized BASIC program."]
    Basic,
    #[doc = "A protected (unlistable) BASIC program."]
    Protected,
    #[default]
    #[doc = "A memory image with load and entry addresses."]
    Binary,
    #[doc = "An ASCII file, as written by `OPENOUT`."]
    Ascii,
    Other(u8),
}

impl From<u8> for FileType {
    fn from(value: u8) -> Self {
        match value {
            0x00 => FileType::Basic,
            0x01 => FileType::Protected,
            0x02 => FileType::Binary,
            0x16 => FileType::Ascii,
            _ => FileType::Other(value),
        }
    }
}

impl From<FileType> for u8 {
    fn from(file_type: FileType) -> Self {
        match file_type {
            FileType::Basic => 0x00,
            FileType::Protected => 0x01,
            FileType::Binary => 0x02,
            FileType::Ascii => 0x16,
            FileType::Other(value) => value,
        }
    }
}

impl Display for FileType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            FileType::Basic => write!(f, "BASIC"),
            FileType::Protected => write!(f, "PROTECTED"),
            FileType::Binary => write!(f, "BINARY"),
            FileType::Ascii => write!(f, "ASCII"),
            FileType::Other(value) => write!(f, "TYPE {:02X}", value),
        }
    }
}

fn flag_byte(flag: bool) -> u8 {
    if flag {
        0xFF
    }
    else {
        0x00
    }
}

/// The header record written by the CPC firmware before every data record of a file.
/// Each header describes the data record that immediately follows it.
#[binrw]
#[brw(little)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileHeaderRecord {
    pub name: [u8; FILE_NAME_LEN],
    /// Ordinal of the data record, starting from 1.
    pub block_num: u8,
    #[br(map = |b: u8| b != 0)]
    #[bw(map = |b: &bool| flag_byte(*b))]
    pub last_block: bool,
    #[br(map = |b: u8| FileType::from(b))]
    #[bw(map = |t: &FileType| u8::from(*t))]
    pub file_type: FileType,
    /// Number of bytes carried by the data record.
    pub block_len: u16,
    pub load_addr: u16,
    #[br(map = |b: u8| b != 0)]
    #[bw(map = |b: &bool| flag_byte(*b))]
    pub first_block: bool,
    /// Total length of the file.
    pub logical_len: u16,
    pub exec_addr: u16,
    pub reserved: [u8; 36],
}

impl FileHeaderRecord {
    /// Build a header for a new file. `name` is truncated to 16 characters and NUL padded.
    /// A load or exec address of 0 means 'not specified'.
    pub fn new(name: &str, load_addr: u16, exec_addr: u16, file_type: FileType) -> Self {
        FileHeaderRecord {
            name: pad_name(name),
            block_num: 1,
            last_block: false,
            file_type,
            block_len: 0,
            load_addr,
            first_block: true,
            logical_len: 0,
            exec_addr,
            reserved: [0; 36],
        }
    }

    /// Build a header carrying over the name, type and addresses of an AMSDOS header.
    pub fn from_amsdos(amsdos: &AmsdosHeader) -> Self {
        FileHeaderRecord::new(
            &amsdos.file_name(),
            amsdos.load_addr,
            amsdos.exec_addr,
            FileType::from(amsdos.file_type),
        )
    }

    /// Read a header record from the start of `buf`. Bytes past the record are ignored.
    pub fn from_slice(buf: &[u8]) -> BinResult<Self> {
        FileHeaderRecord::read(&mut Cursor::new(buf))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, TapeError> {
        let mut out = Cursor::new(Vec::with_capacity(HEADER_RECORD_SIZE));
        self.write(&mut out)
            .map_err(|e| TapeError::WriteError(format!("file header: {}", e)))?;
        Ok(out.into_inner())
    }

    /// The file name with its padding removed.
    pub fn name(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(FILE_NAME_LEN);
        String::from_utf8_lossy(&self.name[..end]).trim_end().to_string()
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = pad_name(name);
    }
}

impl Display for FileHeaderRecord {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{:<16} {:<9} {:>6} &{:04X} &{:04X} {:>3}",
            self.name(),
            self.file_type.to_string(),
            self.block_len,
            self.load_addr,
            self.exec_addr,
            self.block_num
        )
    }
}

/// The 128 byte header AMSDOS places in front of files on disk.
#[binrw]
#[brw(little)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmsdosHeader {
    pub user: u8,
    pub name: [u8; 8],
    pub extension: [u8; 3],
    pub unused0: [u8; 4],
    pub block_num: u8,
    pub last_block: u8,
    pub file_type: u8,
    pub data_len: u16,
    pub load_addr: u16,
    pub first_block: u8,
    pub logical_len: u16,
    pub exec_addr: u16,
    pub unused1: [u8; 36],
    pub file_len: U24,
    pub checksum: u16,
    pub unused2: [u8; 59],
}

/// The AMSDOS header checksum: the sum of the first 67 bytes.
pub fn amsdos_checksum(buf: &[u8]) -> u16 {
    buf.iter().take(67).fold(0u16, |acc, &b| acc.wrapping_add(b as u16))
}

impl AmsdosHeader {
    /// Detect an AMSDOS header at the start of `payload`. On success, returns the header and
    /// the file contents following it, trimmed to the length recorded in the header.
    pub fn detect(payload: &[u8]) -> Option<(AmsdosHeader, &[u8])> {
        if payload.len() < AMSDOS_HEADER_SIZE {
            return None;
        }
        let head = &payload[..AMSDOS_HEADER_SIZE];
        if head[..67].iter().all(|&b| b == 0) {
            return None;
        }
        if amsdos_checksum(head) != u16::from_le_bytes([head[67], head[68]]) {
            return None;
        }

        let header = AmsdosHeader::read(&mut Cursor::new(head)).ok()?;
        let body = &payload[AMSDOS_HEADER_SIZE..];
        let file_len = header.file_len.value();
        let body = if file_len > 0 && file_len <= body.len() {
            &body[..file_len]
        }
        else {
            body
        };
        log::debug!(
            "detect(): AMSDOS header for \"{}\" type {:02X}, {} bytes",
            header.file_name(),
            header.file_type,
            body.len()
        );
        Some((header, body))
    }

    /// The file name as NAME.EXT, with attribute bits and padding removed.
    pub fn file_name(&self) -> String {
        let clean = |bytes: &[u8]| -> String {
            let s: String = bytes.iter().map(|&b| (b & 0x7F) as char).collect();
            s.trim_end().to_string()
        };
        let name = clean(&self.name);
        let ext = clean(&self.extension);
        if ext.is_empty() {
            name
        }
        else {
            format!("{}.{}", name, ext)
        }
    }
}
