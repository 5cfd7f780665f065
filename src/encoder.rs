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

    src/encoder.rs

    Encodes file payloads into the header and data records the CPC firmware would write,
    carried in turbo speed blocks at the requested baud rate.
*/

use crate::{
    baud::{BaudRate, PulseTiming},
    blocks::{Block, PauseBlock, TurboSpeedBlock, MAXIMUM_U24},
    header::{FileHeaderRecord, HEADER_RECORD_SIZE},
    record::{frame_raw, frame_segments},
    TapeError,
    TapeImage,
    DATA_SYNC,
    HEADER_SYNC,
    MAXIMUM_RECORD_SIZE,
    PAUSE_DATA_MS,
    PAUSE_FILE_MS,
    PAUSE_HEADER_MS,
    SEGMENT_SIZE,
};

/// Largest payload that fits the 16-bit length field of a file header.
pub const MAXIMUM_FILE_SIZE: usize = u16::MAX as usize;
/// Largest payload that can be written as a single raw data record.
pub const MAXIMUM_RAW_SIZE: usize = 0xFF_FFF0;

impl TapeImage {
    /// Append a file to the end of the tape.
    ///
    /// With a `header`, the payload is written the way the firmware writes a file: in
    /// records of up to 2K, each preceded by a copy of the header describing it. The
    /// header's name, type and addresses are kept; its block number is taken as the
    /// number of the first record. Without a header, the payload is written as a single
    /// unsegmented data record.
    ///
    /// Either every block of the file is appended or none are.
    pub fn add_file(
        &mut self,
        payload: &[u8],
        header: Option<FileHeaderRecord>,
        speed: BaudRate,
    ) -> Result<(), TapeError> {
        if !speed.is_valid() {
            return Err(TapeError::ParameterError(format!("Unsupported baud rate: {}", speed)));
        }
        let timing = PulseTiming::from(speed);

        let blocks = match header {
            Some(header) => encode_file(payload, header, timing)?,
            None => encode_raw(payload, timing)?,
        };

        log::debug!(
            "add_file(): appending {} blocks for {} byte payload at {} baud",
            blocks.len(),
            payload.len(),
            speed
        );
        self.blocks.extend(blocks);
        Ok(())
    }
}

fn record_block(timing: PulseTiming, pause_ms: u16, frame: Vec<u8>) -> Block {
    Block::TurboSpeed(TurboSpeedBlock::new(timing, pause_ms, frame))
}

fn encode_file(payload: &[u8], header: FileHeaderRecord, timing: PulseTiming) -> Result<Vec<Block>, TapeError> {
    if payload.len() > MAXIMUM_FILE_SIZE {
        return Err(TapeError::ParameterError(format!(
            "File of {} bytes exceeds maximum size of {} bytes",
            payload.len(),
            MAXIMUM_FILE_SIZE
        )));
    }

    let batches: Vec<&[u8]> = if payload.is_empty() {
        vec![payload]
    }
    else {
        payload.chunks(MAXIMUM_RECORD_SIZE).collect()
    };
    let batch_ct = batches.len();

    let mut blocks = Vec::with_capacity(batch_ct * 2 + 1);
    for (i, batch) in batches.into_iter().enumerate() {
        let mut record = header.clone();
        record.block_num = header.block_num.wrapping_add(i as u8);
        record.first_block = i == 0;
        record.last_block = i == batch_ct - 1;
        record.block_len = batch.len() as u16;
        record.logical_len = payload.len() as u16;

        log::trace!(
            "encode_file(): \"{}\" record {} of {} bytes",
            record.name(),
            record.block_num,
            batch.len()
        );

        let mut header_bytes = record.to_bytes()?;
        debug_assert_eq!(header_bytes.len(), HEADER_RECORD_SIZE);
        header_bytes.resize(SEGMENT_SIZE, 0);

        blocks.push(record_block(
            timing,
            PAUSE_HEADER_MS,
            frame_segments(HEADER_SYNC, &header_bytes),
        ));
        blocks.push(record_block(timing, PAUSE_DATA_MS, frame_segments(DATA_SYNC, batch)));
    }
    blocks.push(Block::Pause(PauseBlock::new(PAUSE_FILE_MS)));

    Ok(blocks)
}

fn encode_raw(payload: &[u8], timing: PulseTiming) -> Result<Vec<Block>, TapeError> {
    if payload.len() > MAXIMUM_RAW_SIZE {
        return Err(TapeError::ParameterError(format!(
            "Raw payload of {} bytes exceeds maximum size of {} bytes",
            payload.len(),
            MAXIMUM_RAW_SIZE
        )));
    }
    let frame = frame_raw(payload);
    debug_assert!(frame.len() <= MAXIMUM_U24);

    Ok(vec![
        record_block(timing, PAUSE_DATA_MS, frame),
        Block::Pause(PauseBlock::new(PAUSE_FILE_MS)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        header::FileType,
        record::{frame_len, verify_frame, HEADER_FRAME_LEN},
    };

    fn record_headers(image: &TapeImage) -> Vec<FileHeaderRecord> {
        image
            .blocks()
            .iter()
            .filter_map(|b| b.record_data())
            .filter(|d| d[0] == HEADER_SYNC)
            .map(|d| FileHeaderRecord::from_slice(&d[1..]).unwrap())
            .collect()
    }

    #[test]
    fn small_file_blocks() {
        let mut image = TapeImage::create();
        let header = FileHeaderRecord::new("TEST", 0x170, 0, FileType::Ascii);
        image.add_file(b"10 PRINT 1", Some(header), BaudRate::Baud2000).unwrap();

        let blocks = image.blocks();
        assert_eq!(blocks.len(), 4);
        match &blocks[1] {
            Block::TurboSpeed(b) => {
                assert_eq!(b.data.len(), HEADER_FRAME_LEN);
                assert_eq!(b.pause_ms, PAUSE_HEADER_MS);
                assert_eq!(b.zero_pulse, 583);
                assert_eq!(b.one_pulse, 1166);
                assert_eq!(b.pilot_len, 4096);
                assert_eq!(b.used_bits, 8);
            }
            other => panic!("unexpected block {}", other),
        }
        match &blocks[2] {
            Block::TurboSpeed(b) => {
                assert_eq!(b.data.len(), frame_len(10));
                assert_eq!(b.pause_ms, PAUSE_DATA_MS);
                assert!(verify_frame(&b.data, 10).is_ok());
            }
            other => panic!("unexpected block {}", other),
        }
        assert_eq!(blocks[3], Block::Pause(PauseBlock::new(PAUSE_FILE_MS)));

        let headers = record_headers(&image);
        assert_eq!(headers.len(), 1);
        assert!(headers[0].first_block);
        assert!(headers[0].last_block);
        assert_eq!(headers[0].block_len, 10);
        assert_eq!(headers[0].logical_len, 10);
        assert!(image.check().is_ok());
    }

    #[test]
    fn large_file_is_split_into_records() {
        let payload: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
        let mut image = TapeImage::create();
        let header = FileHeaderRecord::new("BIG", 0x4000, 0x4000, FileType::Binary);
        image.add_file(&payload, Some(header), BaudRate::Baud1000).unwrap();

        // idle pause + 3 header/data pairs + end of file pause
        assert_eq!(image.blocks().len(), 8);

        let headers = record_headers(&image);
        let nums: Vec<u8> = headers.iter().map(|h| h.block_num).collect();
        let lens: Vec<u16> = headers.iter().map(|h| h.block_len).collect();
        let first: Vec<bool> = headers.iter().map(|h| h.first_block).collect();
        let last: Vec<bool> = headers.iter().map(|h| h.last_block).collect();
        assert_eq!(nums, vec![1, 2, 3]);
        assert_eq!(lens, vec![2048, 2048, 904]);
        assert_eq!(first, vec![true, false, false]);
        assert_eq!(last, vec![false, false, true]);
        assert!(headers.iter().all(|h| h.logical_len == 5000));
        assert!(image.check().is_ok());
    }

    #[test]
    fn empty_file_has_one_pair() {
        let mut image = TapeImage::create();
        let header = FileHeaderRecord::new("EMPTY", 0, 0, FileType::Binary);
        image.add_file(&[], Some(header), BaudRate::Baud2000).unwrap();

        assert_eq!(image.blocks().len(), 4);
        let data = image.blocks()[2].record_data().unwrap();
        assert_eq!(data, &[DATA_SYNC, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert!(image.check().is_ok());
    }

    #[test]
    fn raw_payload_is_one_record() {
        let mut image = TapeImage::create();
        image.add_file(&[0xAA; 1000], None, BaudRate::Baud2000).unwrap();

        assert_eq!(image.blocks().len(), 3);
        let data = image.blocks()[1].record_data().unwrap();
        assert_eq!(data.len(), 1000 + 7);
        assert_eq!(data[0], DATA_SYNC);
        assert!(image.check().is_ok());
    }

    #[test]
    fn rejected_input_appends_nothing() {
        let mut image = TapeImage::create();
        let header = FileHeaderRecord::new("HUGE", 0, 0, FileType::Binary);
        let payload = vec![0u8; MAXIMUM_FILE_SIZE + 1];

        assert!(matches!(
            image.add_file(&payload, Some(header.clone()), BaudRate::Baud2000),
            Err(TapeError::ParameterError(_))
        ));
        assert!(matches!(
            image.add_file(b"X", Some(header), BaudRate::Nonstandard(10)),
            Err(TapeError::ParameterError(_))
        ));
        assert_eq!(image.blocks().len(), 1);
    }
}
