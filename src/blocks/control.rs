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

    src/blocks/control.rs

    Blocks that control playback or structure the tape without carrying data.
*/

use binrw::binrw;

/// Block 0x20. Silence for the given number of milliseconds. A pause of 0 means 'stop the
/// tape'.
#[binrw]
#[brw(little)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PauseBlock {
    pub pause_ms: u16,
}

impl PauseBlock {
    pub fn new(pause_ms: u16) -> Self {
        PauseBlock { pause_ms }
    }

    pub fn is_stop(&self) -> bool {
        self.pause_ms == 0
    }
}

/// Block 0x21. Marks the start of a group of blocks shown under a single name.
#[binrw]
#[brw(little)]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupStartBlock {
    #[br(temp)]
    #[bw(calc = name.len() as u8)]
    name_len: u8,
    #[br(count = name_len as usize)]
    pub name: Vec<u8>,
}

impl GroupStartBlock {
    pub fn new(name: &str) -> Self {
        GroupStartBlock {
            name: name.as_bytes().to_vec(),
        }
    }

    pub fn name(&self) -> String {
        String::from_utf8_lossy(&self.name).to_string()
    }
}
