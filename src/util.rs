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

    src/util.rs

    Miscellaneous helpers.
*/

use crate::header::FILE_NAME_LEN;
use std::path::Path;

/// Convert a name into a NUL padded CPC file name field. Characters outside of ASCII are
/// replaced with '?', and names longer than the field are truncated.
pub(crate) fn pad_name(name: &str) -> [u8; FILE_NAME_LEN] {
    let mut field = [0u8; FILE_NAME_LEN];
    for (dst, c) in field.iter_mut().zip(name.chars()) {
        *dst = if c.is_ascii() { c as u8 } else { b'?' };
    }
    field
}

/// Return the stem of a path as a string, if it has one.
pub(crate) fn file_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|os| os.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
}
