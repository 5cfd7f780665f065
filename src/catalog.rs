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

    src/catalog.rs

    Reconstructs a directory of the files on a tape from the records in its blocks.
    Tapes carry no directory of their own, so this is a best-effort listing: blocks that
    carry no recognizable CPC record are left out.
*/

use crate::{
    blocks::Block,
    header::{FileHeaderRecord, FileType, HEADER_RECORD_SIZE},
    record::raw_payload_len,
    util::file_stem,
    TapeImage,
    DATA_SYNC,
    HEADER_SYNC,
};
use std::{
    fmt,
    fmt::{Display, Formatter},
};

/// Name given to a header-less record when no better name can be found.
pub const PLACEHOLDER_NAME: &str = "UNNAMED";

/// Where the name of a synthesized entry came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NameSource {
    /// The last header record seen before the data.
    Sibling,
    /// The file name of the tape image itself.
    FileName,
    Placeholder,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EntryOrigin {
    /// The header was read from a header record on the tape.
    Recovered,
    /// The block held a data record with no header; the header was made up.
    Synthetic(NameSource),
}

/// A block holding a CPC record, and the header that describes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TapeEntry<'a> {
    pub index: usize,
    pub block: &'a Block,
    pub header: FileHeaderRecord,
    pub origin: EntryOrigin,
}

impl TapeEntry<'_> {
    /// The number of file bytes the entry describes. For a synthesized entry this is the
    /// length of the data record's payload.
    pub fn size(&self) -> usize {
        match self.origin {
            EntryOrigin::Recovered => self.header.block_len as usize,
            EntryOrigin::Synthetic(_) => self.block.record_data().map(raw_payload_len).unwrap_or(0),
        }
    }
}

/// Pick a name for a data record that has no header of its own.
pub fn resolve_name(sibling: Option<&FileHeaderRecord>, file_name: Option<&str>) -> (String, NameSource) {
    if let Some(name) = sibling.map(|h| h.name()).filter(|n| !n.is_empty()) {
        return (name, NameSource::Sibling);
    }
    if let Some(name) = file_name.filter(|n| !n.is_empty()) {
        return (name.to_string(), NameSource::FileName);
    }
    (PLACEHOLDER_NAME.to_string(), NameSource::Placeholder)
}

fn synthetic_header(name: &str, size: usize) -> FileHeaderRecord {
    let mut header = FileHeaderRecord::new(name, 0, 0, FileType::Binary);
    let len = size.min(u16::MAX as usize) as u16;
    header.block_len = len;
    header.logical_len = len;
    header.last_block = true;
    header
}

/// A file on tape, assembled from the entries of its records.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TapeFile {
    pub name: String,
    pub file_type: FileType,
    pub size: usize,
    pub load_addr: u16,
    pub exec_addr: u16,
    /// Number of records the file was found in.
    pub blocks: usize,
    /// Index of the block holding the first record of the file.
    pub first_index: usize,
    /// Whether both the first and last records of the file were found.
    pub complete: bool,
}

impl TapeFile {
    fn from_entry(entry: &TapeEntry) -> Self {
        let header = &entry.header;
        TapeFile {
            name: header.name(),
            file_type: header.file_type,
            size: entry.size(),
            load_addr: header.load_addr,
            exec_addr: header.exec_addr,
            blocks: 1,
            first_index: entry.index,
            complete: match entry.origin {
                EntryOrigin::Recovered => header.first_block && header.last_block,
                EntryOrigin::Synthetic(_) => true,
            },
        }
    }

    /// Returns `true` if `entry` is a continuation record of this file.
    fn continued_by(&self, entry: &TapeEntry) -> bool {
        entry.origin == EntryOrigin::Recovered
            && !self.complete
            && !entry.header.first_block
            && entry.header.name() == self.name
            && entry.header.file_type == self.file_type
    }
}

impl Display for TapeFile {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{:<16} {:<9} {:>6} &{:04X} &{:04X} {:>2} record(s){}",
            self.name,
            self.file_type.to_string(),
            self.size,
            self.load_addr,
            self.exec_addr,
            self.blocks,
            if self.complete { "" } else { " (incomplete)" }
        )
    }
}

impl TapeImage {
    /// List every block that carries a CPC record, in tape order, with the header that
    /// describes it. Data records directly following their header are not listed
    /// separately.
    pub fn list_files(&self) -> Vec<TapeEntry<'_>> {
        let file_name = self.path.as_deref().and_then(file_stem);
        let mut entries = Vec::new();
        let mut sibling: Option<FileHeaderRecord> = None;
        let mut after_header = false;

        for (index, block) in self.blocks.iter().enumerate() {
            let companion = std::mem::take(&mut after_header);
            let Some(data) = block.record_data()
            else {
                continue;
            };

            match data.first() {
                Some(&HEADER_SYNC) => {
                    if data.len() < 1 + HEADER_RECORD_SIZE {
                        log::warn!("list_files(): header record in block {} is too short", index);
                        continue;
                    }
                    match FileHeaderRecord::from_slice(&data[1..]) {
                        Ok(header) => {
                            sibling = Some(header.clone());
                            after_header = true;
                            entries.push(TapeEntry {
                                index,
                                block,
                                header,
                                origin: EntryOrigin::Recovered,
                            });
                        }
                        Err(e) => {
                            log::warn!("list_files(): can't read header record in block {}: {}", index, e);
                        }
                    }
                }
                Some(&DATA_SYNC) if companion => {}
                Some(&DATA_SYNC) => {
                    let (name, source) = resolve_name(sibling.as_ref(), file_name.as_deref());
                    log::debug!("list_files(): header-less record in block {} named \"{}\"", index, name);
                    entries.push(TapeEntry {
                        index,
                        block,
                        header: synthetic_header(&name, raw_payload_len(data)),
                        origin: EntryOrigin::Synthetic(source),
                    });
                }
                _ => {}
            }
        }
        entries
    }

    /// List the files on the tape, with the records of each file folded together.
    pub fn catalog(&self) -> Vec<TapeFile> {
        let mut files: Vec<TapeFile> = Vec::new();

        for entry in self.list_files() {
            match files.last_mut() {
                Some(file) if file.continued_by(&entry) => {
                    file.size += entry.size();
                    file.blocks += 1;
                    file.complete = entry.header.last_block;
                }
                _ => files.push(TapeFile::from_entry(&entry)),
            }
        }
        files
    }
}
