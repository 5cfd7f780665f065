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

    src/blocks/text.rs

    Free text metadata blocks. Text is kept as raw bytes; TZX text is nominally ASCII but
    images in the wild carry Latin-1 and worse, and it must survive a round trip.
*/

use binrw::binrw;
use std::{
    fmt,
    fmt::{Display, Formatter},
};

/// Block 0x30. A single line of free text.
#[binrw]
#[brw(little)]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextDescriptionBlock {
    #[br(temp)]
    #[bw(calc = text.len() as u8)]
    text_len: u8,
    #[br(count = text_len as usize)]
    pub text: Vec<u8>,
}

impl TextDescriptionBlock {
    pub fn new(text: &str) -> Self {
        TextDescriptionBlock {
            text: text.as_bytes().to_vec(),
        }
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.text).to_string()
    }
}

/// The meaning of a text entry in an archive info block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArchiveField {
    Title,
    Publisher,
    Author,
    Year,
    Language,
    Category,
    Price,
    Loader,
    Origin,
    Comment,
    Unknown(u8),
}

impl From<u8> for ArchiveField {
    fn from(id: u8) -> Self {
        use ArchiveField::*;
        match id {
            0x00 => Title,
            0x01 => Publisher,
            0x02 => Author,
            0x03 => Year,
            0x04 => Language,
            0x05 => Category,
            0x06 => Price,
            0x07 => Loader,
            0x08 => Origin,
            0xFF => Comment,
            _ => Unknown(id),
        }
    }
}

impl From<ArchiveField> for u8 {
    fn from(field: ArchiveField) -> Self {
        use ArchiveField::*;
        match field {
            Title => 0x00,
            Publisher => 0x01,
            Author => 0x02,
            Year => 0x03,
            Language => 0x04,
            Category => 0x05,
            Price => 0x06,
            Loader => 0x07,
            Origin => 0x08,
            Comment => 0xFF,
            Unknown(id) => id,
        }
    }
}

impl Display for ArchiveField {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        use ArchiveField::*;
        match self {
            Title => write!(f, "Title"),
            Publisher => write!(f, "Publisher"),
            Author => write!(f, "Author"),
            Year => write!(f, "Year"),
            Language => write!(f, "Language"),
            Category => write!(f, "Type"),
            Price => write!(f, "Price"),
            Loader => write!(f, "Loader"),
            Origin => write!(f, "Origin"),
            Comment => write!(f, "Comment"),
            Unknown(id) => write!(f, "Field {:02X}", id),
        }
    }
}

#[binrw]
#[brw(little)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub id: u8,
    #[br(temp)]
    #[bw(calc = text.len() as u8)]
    text_len: u8,
    #[br(count = text_len as usize)]
    pub text: Vec<u8>,
}

impl ArchiveEntry {
    pub fn new(field: ArchiveField, text: &str) -> Self {
        ArchiveEntry {
            id: field.into(),
            text: text.as_bytes().to_vec(),
        }
    }

    pub fn field(&self) -> ArchiveField {
        ArchiveField::from(self.id)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.text).to_string()
    }
}

/// Block 0x32. A set of tagged text entries describing the tape.
#[binrw]
#[brw(little)]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArchiveInfoBlock {
    #[br(temp)]
    #[bw(calc = archive_body_len(entries) as u16)]
    body_len: u16,
    #[br(temp)]
    #[bw(calc = entries.len() as u8)]
    entry_count: u8,
    #[br(count = entry_count as usize)]
    pub entries: Vec<ArchiveEntry>,
}

/// Size of an archive info block after its length word.
pub(crate) fn archive_body_len(entries: &[ArchiveEntry]) -> usize {
    1 + entries.iter().map(|e| 2 + e.text.len()).sum::<usize>()
}

impl ArchiveInfoBlock {
    pub fn with_title(title: &str) -> Self {
        ArchiveInfoBlock {
            entries: vec![ArchiveEntry::new(ArchiveField::Title, title)],
        }
    }

    pub fn body_len(&self) -> usize {
        archive_body_len(&self.entries)
    }

    /// Return the text of the first entry of the given kind.
    pub fn get(&self, field: ArchiveField) -> Option<String> {
        self.entries.iter().find(|e| e.field() == field).map(|e| e.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binrw::{BinRead, BinWrite};
    use std::io::Cursor;

    #[test]
    fn archive_info_layout() {
        let block = ArchiveInfoBlock {
            entries: vec![
                ArchiveEntry::new(ArchiveField::Title, "Gryzor"),
                ArchiveEntry::new(ArchiveField::Year, "1987"),
            ],
        };
        let mut out = Cursor::new(Vec::new());
        block.write(&mut out).unwrap();
        let bytes = out.into_inner();

        assert_eq!(block.body_len(), 1 + 8 + 6);
        assert_eq!(&bytes[0..3], &[15, 0, 2][..]);
        assert_eq!(&bytes[3..5], &[0x00, 6][..]);
        assert_eq!(&bytes[5..11], b"Gryzor");
        assert_eq!(bytes.len(), 2 + 15);

        let read_back = ArchiveInfoBlock::read(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(read_back.get(ArchiveField::Year), Some("1987".to_string()));
        assert_eq!(read_back, block);
    }

    #[test]
    fn archive_field_ids() {
        assert_eq!(ArchiveField::from(0xFF), ArchiveField::Comment);
        assert_eq!(u8::from(ArchiveField::Unknown(0x42)), 0x42);
        assert_eq!(u8::from(ArchiveField::Loader), 0x07);
    }

    #[test]
    fn description_keeps_raw_bytes() {
        let bytes = vec![3, b'C', 0xE9, b'!'];
        let block = TextDescriptionBlock::read(&mut Cursor::new(&bytes)).unwrap();
        assert_eq!(block.text, vec![b'C', 0xE9, b'!']);

        let mut out = Cursor::new(Vec::new());
        block.write(&mut out).unwrap();
        assert_eq!(out.into_inner(), bytes);
    }
}
