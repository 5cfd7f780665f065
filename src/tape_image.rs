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

    src/tape_image.rs

    TapeImage is the in-memory representation of a CDT tape: a TZX preamble followed by
    an ordered list of blocks. A tape is append-only, like the physical medium; blocks are
    never edited in place.
*/

use crate::{
    blocks::{ArchiveField, ArchiveInfoBlock, Block, PauseBlock},
    header::FileHeaderRecord,
    record::{is_header_frame, verify_frame},
    tape_writer::TapeWriter,
    FormatError,
    TapeError,
    DATA_SYNC,
    PAUSE_IDLE_MS,
};
use binrw::{binrw, BinRead, BinWrite};
use std::{
    io::{Cursor, Read, Write},
    path::{Path, PathBuf},
};

pub const TZX_SIGNATURE: &[u8; 8] = b"ZXTape!\x1A";
pub const TZX_VERSION_MAJOR: u8 = 1;
pub const TZX_VERSION_MINOR: u8 = 20;
pub const PREAMBLE_SIZE: usize = 10;

/// The fixed header at the start of every TZX file.
#[binrw]
#[brw(little, magic = b"ZXTape!\x1A")]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TzxPreamble {
    pub major: u8,
    pub minor: u8,
}

impl Default for TzxPreamble {
    fn default() -> Self {
        TzxPreamble {
            major: TZX_VERSION_MAJOR,
            minor: TZX_VERSION_MINOR,
        }
    }
}

/// Summary information about a tape.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TapeInfo {
    pub title: String,
    pub major: u8,
    pub minor: u8,
    pub blocks: usize,
    pub files: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TapeImage {
    pub(crate) preamble: TzxPreamble,
    pub(crate) blocks: Vec<Block>,
    pub(crate) path: Option<PathBuf>,
}

impl Default for TapeImage {
    fn default() -> Self {
        TapeImage::create()
    }
}

impl TapeImage {
    /// Create a new, empty tape. An empty tape holds a single pause block.
    pub fn create() -> Self {
        TapeImage {
            preamble: TzxPreamble::default(),
            blocks: vec![Block::Pause(PauseBlock::new(PAUSE_IDLE_MS))],
            path: None,
        }
    }

    /// Create a new, empty tape carrying a title in an archive info block.
    pub fn create_titled(title: &str) -> Self {
        let mut image = TapeImage::create();
        image.blocks.push(Block::ArchiveInfo(ArchiveInfoBlock::with_title(title)));
        image
    }

    /// Erase the tape, keeping the path it is associated with.
    pub fn format(&mut self) {
        let path = self.path.take();
        *self = TapeImage::create();
        self.path = path;
    }

    /// Parse a tape image from a byte slice. Either the whole image parses or an error is
    /// returned; no partially read image is produced.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TapeError> {
        if bytes.len() < PREAMBLE_SIZE || !bytes.starts_with(TZX_SIGNATURE) {
            return Err(FormatError::BadSignature.into());
        }
        let preamble =
            TzxPreamble::read(&mut Cursor::new(&bytes[..PREAMBLE_SIZE])).map_err(|_| FormatError::BadSignature)?;
        if preamble.major != TZX_VERSION_MAJOR {
            return Err(FormatError::UnsupportedVersion(preamble.major).into());
        }
        log::debug!("from_bytes(): TZX version {}.{:02}", preamble.major, preamble.minor);

        let mut blocks = Vec::new();
        let mut rest = &bytes[PREAMBLE_SIZE..];
        while let Some((&id, body)) = rest.split_first() {
            let offset = bytes.len() - rest.len();
            let (block, next) = Block::parse(id, body, offset)?;
            blocks.push(block);
            rest = next;
        }
        log::debug!("from_bytes(): read {} blocks", blocks.len());

        Ok(TapeImage {
            preamble,
            blocks,
            path: None,
        })
    }

    /// Read a tape image in its entirety from `reader`.
    pub fn read<R: Read>(mut reader: R) -> Result<Self, TapeError> {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|e| TapeError::ReadError(e.to_string()))?;
        TapeImage::from_bytes(&buf)
    }

    /// Load a tape image from a file. The image remembers the path for [TapeImage::save].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, TapeError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TapeError::FileNotFound(path.display().to_string()));
        }
        let buf = std::fs::read(path).map_err(|e| TapeError::ReadError(format!("{}: {}", path.display(), e)))?;

        let mut image = TapeImage::from_bytes(&buf)?;
        image.path = Some(path.to_path_buf());
        Ok(image)
    }

    /// Compose the preamble and every block, in order.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TapeError> {
        let mut out = Cursor::new(Vec::new());
        self.preamble
            .write(&mut out)
            .map_err(|e| TapeError::WriteError(e.to_string()))?;
        let mut bytes = out.into_inner();
        for block in &self.blocks {
            bytes.extend(block.compose()?);
        }
        Ok(bytes)
    }

    pub fn write<W: Write>(&self, mut writer: W) -> Result<(), TapeError> {
        let bytes = self.to_bytes()?;
        writer
            .write_all(&bytes)
            .map_err(|e| TapeError::WriteError(e.to_string()))
    }

    /// Save the tape to `path`, or to the path it was loaded from or last saved to if `None`.
    /// The image is not modified if the write fails.
    pub fn save(&mut self, path: Option<&Path>) -> Result<(), TapeError> {
        let target = path
            .map(Path::to_path_buf)
            .or_else(|| self.path.clone())
            .ok_or_else(|| TapeError::WriteError("No file name specified for save".to_string()))?;

        TapeWriter::new(self).with_path(target.clone()).write()?;
        self.path = Some(target);
        Ok(())
    }

    /// Append a block to the end of the tape.
    pub fn add_block(&mut self, block: Block) -> Result<(), TapeError> {
        block
            .check()
            .map_err(|reason| TapeError::ParameterError(format!("{}: {}", block.id(), reason)))?;
        self.blocks.push(block);
        Ok(())
    }

    /// Verify the consistency of every block, stopping at the first problem found.
    ///
    /// Besides checking that each block fits its layout, every CPC header record is checked
    /// against its CRC, and the data record following it against the block size it declares.
    pub fn check(&self) -> Result<(), TapeError> {
        let mut pending: Option<FileHeaderRecord> = None;

        for (index, block) in self.blocks.iter().enumerate() {
            let integrity = |reason: String| TapeError::IntegrityError { index, reason };

            block.check().map_err(integrity)?;

            let header = pending.take();
            let Some(data) = block.record_data()
            else {
                continue;
            };

            if is_header_frame(data) {
                verify_frame(data, crate::SEGMENT_SIZE).map_err(integrity)?;
                let header = FileHeaderRecord::from_slice(&data[1..]).map_err(|e| integrity(e.to_string()))?;
                pending = Some(header);
            }
            else if let (Some(header), Some(&DATA_SYNC)) = (header, data.first()) {
                verify_frame(data, header.block_len as usize)
                    .map_err(|reason| integrity(format!("\"{}\" block {}: {}", header.name(), header.block_num, reason)))?;
            }
        }
        Ok(())
    }

    pub fn preamble(&self) -> &TzxPreamble {
        &self.preamble
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The title of the tape, taken from an archive info title entry or else the first text
    /// description. Returns an empty string for an untitled tape.
    pub fn title(&self) -> String {
        let archive_title = self.blocks.iter().find_map(|b| match b {
            Block::ArchiveInfo(info) => info.get(ArchiveField::Title),
            _ => None,
        });
        let description = || {
            self.blocks.iter().find_map(|b| match b {
                Block::TextDescription(text) => Some(text.text()),
                _ => None,
            })
        };
        archive_title.or_else(description).unwrap_or_default()
    }

    pub fn info(&self) -> TapeInfo {
        TapeInfo {
            title: self.title(),
            major: self.preamble.major,
            minor: self.preamble.minor,
            blocks: self.blocks.len(),
            files: self.catalog().len(),
        }
    }

    pub fn dump_info<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        let info = self.info();
        writeln!(out, "Title: {}", info.title)?;
        writeln!(out, "Version: {}.{:02}", info.major, info.minor)?;
        if let Some(path) = &self.path {
            writeln!(out, "Path: {}", path.display())?;
        }
        writeln!(out)?;
        writeln!(out, "{} blocks:", info.blocks)?;
        for (i, block) in self.blocks.iter().enumerate() {
            writeln!(out, "{:>4}: {}", i, block)?;
        }
        writeln!(out)?;
        writeln!(out, "{} files:", info.files)?;
        for file in self.catalog() {
            writeln!(out, "      {}", file)?;
        }
        Ok(())
    }
}
