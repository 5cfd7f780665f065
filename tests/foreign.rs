mod common;

use common::*;
use tapefox::prelude::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A tape using every supported block type, as written by other tools.
fn foreign_tape() -> Vec<u8> {
    let mut bytes = b"ZXTape!\x1A\x01\x14".to_vec();
    // Text description, with a byte that is not valid UTF-8
    bytes.extend_from_slice(&[0x30, 0x05, b'H', b'e', 0xE9, b'l', b'o']);
    // Archive info: title and author
    bytes.extend_from_slice(&[
        0x32, 0x0C, 0x00, 0x02, 0x00, 0x04, b'T', b'e', b's', b't', 0x02, 0x03, b'B', b'o', b'b',
    ]);
    bytes.extend_from_slice(&[0x21, 0x04, b'L', b'o', b'a', b'd']);
    bytes.extend_from_slice(&[0x12, 0x78, 0x08, 0x97, 0x0C]);
    bytes.extend_from_slice(&[0x13, 0x02, 0x9B, 0x02, 0xDF, 0x02]);
    bytes.extend_from_slice(&[0x10, 0xE8, 0x03, 0x03, 0x00, 0x00, 0xAA, 0x55]);
    bytes.extend_from_slice(&[
        0x14, 0x57, 0x03, 0xAE, 0x06, 0x08, 0x00, 0x00, 0x02, 0x00, 0x00, 0x12, 0x34,
    ]);
    bytes.push(0x22);
    bytes.extend_from_slice(&[0x20, 0x00, 0x00]);
    bytes.extend_from_slice(&[
        0x11, 0x8E, 0x04, 0x47, 0x02, 0x47, 0x02, 0x47, 0x02, 0x8E, 0x04, 0x00, 0x10, 0x08, 0x0A, 0x00, 0x01, 0x00,
        0x00, 0x16,
    ]);
    bytes
}

#[test]
fn test_foreign_tape_invertibility() {
    init();
    let original = foreign_tape();
    let image = TapeImage::from_bytes(&original).unwrap();

    let ids: Vec<BlockId> = image.blocks().iter().map(|b| b.id()).collect();
    assert_eq!(
        ids,
        vec![
            BlockId::TextDescription,
            BlockId::ArchiveInfo,
            BlockId::GroupStart,
            BlockId::PureTone,
            BlockId::PulseSequence,
            BlockId::StandardSpeed,
            BlockId::PureData,
            BlockId::GroupEnd,
            BlockId::Pause,
            BlockId::TurboSpeed,
        ]
    );

    let written = image.to_bytes().unwrap();
    assert_eq!(compute_slice_hash(&written), compute_slice_hash(&original));
    assert_eq!(written, original);
}

#[test]
fn test_foreign_tape_info() {
    init();
    let image = TapeImage::from_bytes(&foreign_tape()).unwrap();
    assert_eq!(image.title(), "Test");
    assert!(image.check().is_ok());

    let info = image.info();
    assert_eq!(info.major, 1);
    assert_eq!(info.minor, 20);
    assert_eq!(info.blocks, 10);

    // Only the one byte data record in the turbo block looks like a CPC record.
    let entries = image.list_files();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].index, 9);

    let mut out = Vec::new();
    image.dump_info(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("Title: Test"));
    assert!(text.contains("Pure Tone"));
}

#[test]
fn test_unknown_block_rejected() {
    init();
    let mut bytes = foreign_tape();
    let offset = bytes.len();
    bytes.extend_from_slice(&[0x5A, 0x00, 0x00, 0x00, 0x00]);

    match TapeImage::from_bytes(&bytes) {
        Err(TapeError::FormatError(FormatError::UnknownBlock { id, offset: at })) => {
            assert_eq!(id, 0x5A);
            assert_eq!(at, offset);
        }
        other => panic!("Unexpected result: {:?}", other),
    }
}

#[test]
fn test_unknown_block_rejected_on_load() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.cdt");
    let mut bytes = foreign_tape();
    bytes.push(0x4B);
    std::fs::write(&path, bytes).unwrap();

    assert!(matches!(
        TapeImage::load(&path),
        Err(TapeError::FormatError(FormatError::UnknownBlock { id: 0x4B, .. }))
    ));
    assert!(matches!(
        TapeImage::load(dir.path().join("missing.cdt")),
        Err(TapeError::FileNotFound(_))
    ));
}

#[test]
fn test_truncated_tape_rejected() {
    init();
    let bytes = foreign_tape();
    let truncated = &bytes[..bytes.len() - 1];
    assert!(matches!(
        TapeImage::from_bytes(truncated),
        Err(TapeError::FormatError(FormatError::Truncated { id: 0x11, .. }))
    ));
}
