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

    src/record.rs

    Framing of CPC cassette records. A record is a sync byte, one or more 256 byte segments
    each followed by its CRC (high byte first), and a four byte 0xFF trailer.
*/

use crate::{
    crc::{tape_crc, tape_crc_bytes},
    DATA_SYNC,
    HEADER_SYNC,
    RECORD_TRAILER,
    SEGMENT_SIZE,
};

const CRC_SIZE: usize = 2;

/// Length of a framed header record: the 64 byte header padded to one segment.
pub const HEADER_FRAME_LEN: usize = 1 + SEGMENT_SIZE + CRC_SIZE + RECORD_TRAILER.len();

/// Number of segments needed to carry `len` bytes.
pub fn segment_count(len: usize) -> usize {
    len.div_ceil(SEGMENT_SIZE)
}

/// Length of a framed record carrying `len` bytes.
pub fn frame_len(len: usize) -> usize {
    1 + segment_count(len) * (SEGMENT_SIZE + CRC_SIZE) + RECORD_TRAILER.len()
}

/// Frame `payload` as a record, zero padding its last segment.
pub fn frame_segments(sync: u8, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(frame_len(payload.len()));
    frame.push(sync);
    for chunk in payload.chunks(SEGMENT_SIZE) {
        let mut segment = [0u8; SEGMENT_SIZE];
        segment[..chunk.len()].copy_from_slice(chunk);
        frame.extend_from_slice(&segment);
        frame.extend_from_slice(&tape_crc_bytes(&segment));
    }
    frame.extend_from_slice(&RECORD_TRAILER);
    frame
}

/// Frame `payload` as a single unsegmented data record with one CRC over all of it.
pub fn frame_raw(payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(payload.len() + 1 + CRC_SIZE + RECORD_TRAILER.len());
    frame.push(DATA_SYNC);
    frame.extend_from_slice(payload);
    frame.extend_from_slice(&tape_crc_bytes(payload));
    frame.extend_from_slice(&RECORD_TRAILER);
    frame
}

/// Length of the payload carried by a raw data record.
pub fn raw_payload_len(frame: &[u8]) -> usize {
    frame.len().saturating_sub(1 + CRC_SIZE + RECORD_TRAILER.len())
}

pub fn is_header_frame(data: &[u8]) -> bool {
    data.len() == HEADER_FRAME_LEN && data[0] == HEADER_SYNC
}

/// Verify that `frame` is a segmented record carrying `len` bytes: its length, the CRC of
/// every segment and the trailer.
pub fn verify_frame(frame: &[u8], len: usize) -> Result<(), String> {
    let expected = frame_len(len);
    if frame.len() != expected {
        return Err(format!(
            "record length {} does not match {} bytes of data (expected {})",
            frame.len(),
            len,
            expected
        ));
    }

    for (i, chunk) in frame[1..frame.len() - RECORD_TRAILER.len()]
        .chunks_exact(SEGMENT_SIZE + CRC_SIZE)
        .enumerate()
    {
        let (segment, crc) = chunk.split_at(SEGMENT_SIZE);
        let stored = u16::from_be_bytes([crc[0], crc[1]]);
        let calculated = tape_crc(segment);
        if stored != calculated {
            return Err(format!(
                "CRC mismatch in segment {}: stored {:04X}, calculated {:04X}",
                i, stored, calculated
            ));
        }
    }

    if frame[frame.len() - RECORD_TRAILER.len()..] != RECORD_TRAILER {
        return Err("record trailer is missing".to_string());
    }
    Ok(())
}
