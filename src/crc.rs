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

    src/crc.rs

    The CRC used by the CPC firmware cassette routines.
*/

//! The CPC firmware protects every 256 byte segment of a cassette record with a
//! CRC-16 (polynomial 0x1021, initial value 0xFFFF, inverted result). The value is
//! recorded on tape high byte first, directly after the segment it covers.

pub const CRC_POLY: u16 = 0x1021;
pub const CRC_INIT: u16 = 0xFFFF;

/// Calculate the cassette CRC of `buf`.
pub fn tape_crc(buf: &[u8]) -> u16 {
    let mut crc = CRC_INIT;
    for byte in buf {
        crc ^= (*byte as u16) << 8;
        for _j in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ CRC_POLY;
            }
            else {
                crc <<= 1;
            }
        }
    }
    !crc
}

/// Return the CRC of `buf` in on-tape byte order.
pub fn tape_crc_bytes(buf: &[u8]) -> [u8; 2] {
    tape_crc(buf).to_be_bytes()
}
