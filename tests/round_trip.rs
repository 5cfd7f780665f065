mod common;

use common::*;
use tapefox::{prelude::*, AmsdosHeader, EntryOrigin};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_print_scenario() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.cdt");

    let mut image = TapeImage::create();
    let header = FileHeaderRecord::new("TEST", 0, 0, FileType::Ascii);
    image
        .add_file(b"10 PRINT 1", Some(header), BaudRate::Baud2000)
        .unwrap();
    image.save(Some(&path)).unwrap();
    assert_eq!(image.path(), Some(path.as_path()));

    let loaded = TapeImage::load(&path).unwrap();
    let entries = loaded.list_files();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].header.name(), "TEST");
    assert_eq!(entries[0].header.file_type, FileType::Ascii);
    assert_eq!(entries[0].size(), 10);
    assert_eq!(entries[0].origin, EntryOrigin::Recovered);

    match entries[0].block {
        Block::TurboSpeed(b) => assert_eq!(b.baud(), 2001),
        other => panic!("Unexpected block: {}", other),
    }
    assert!(loaded.check().is_ok());
}

#[test]
fn test_round_trip_preserves_blocks() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("many.cdt");

    let big = test_pattern(5000);
    let mut image = build_tape(&[
        ("LOADER", FileType::Basic, b"10 MODE 1:LOAD\"!CODE\""),
        ("CODE", FileType::Binary, &big),
        ("EMPTY", FileType::Binary, &[]),
    ]);
    image.add_file(&test_pattern(300), None, BaudRate::Baud1000).unwrap();
    image.save(Some(&path)).unwrap();

    let loaded = TapeImage::load(&path).unwrap();
    assert_eq!(loaded.blocks(), image.blocks());
    assert_eq!(loaded.preamble(), image.preamble());
    assert_eq!(compute_file_hash(&path), compute_slice_hash(&image.to_bytes().unwrap()));
    assert!(loaded.check().is_ok());
}

#[test]
fn test_files_listed_in_order() {
    init();
    let image = build_tape(&[("A", FileType::Binary, b"first"), ("B", FileType::Binary, b"second")]);
    let bytes = image.to_bytes().unwrap();
    let loaded = TapeImage::from_bytes(&bytes).unwrap();

    let names: Vec<String> = loaded.list_files().iter().map(|e| e.header.name()).collect();
    assert_eq!(names, vec!["A", "B"]);

    let files = loaded.catalog();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].size, 5);
    assert_eq!(files[1].size, 6);
}

#[test]
fn test_multi_record_file() {
    init();
    let payload = test_pattern(2048 * 2 + 1);
    let image = build_tape(&[("LONG", FileType::Binary, &payload)]);

    let entries = image.list_files();
    assert_eq!(entries.len(), 3);
    let sizes: Vec<usize> = entries.iter().map(|e| e.size()).collect();
    assert_eq!(sizes, vec![2048, 2048, 1]);
    assert!(entries[0].header.first_block && !entries[0].header.last_block);
    assert!(!entries[1].header.first_block && !entries[1].header.last_block);
    assert!(!entries[2].header.first_block && entries[2].header.last_block);

    let files = image.catalog();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].size, payload.len());
    assert_eq!(files[0].blocks, 3);
    assert!(files[0].complete);
}

#[test]
fn test_save_reuses_path() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reuse.cdt");

    let mut image = TapeImage::create_titled("Reuse");
    image.save(Some(&path)).unwrap();
    let first_hash = compute_file_hash(&path);

    image
        .add_file(b"MORE", Some(FileHeaderRecord::new("MORE", 0, 0, FileType::Binary)), BaudRate::Baud2000)
        .unwrap();
    image.save(None).unwrap();
    assert_ne!(compute_file_hash(&path), first_hash);

    let loaded = TapeImage::load(&path).unwrap();
    assert_eq!(loaded.title(), "Reuse");
    assert_eq!(loaded.info().files, 1);
}

#[test]
fn test_failed_save_keeps_image() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.cdt");
    let bad = dir.path().join("nodir").join("bad.cdt");

    let mut image = TapeImage::create();
    image.save(Some(&good)).unwrap();
    image
        .add_file(b"RETRY", Some(FileHeaderRecord::new("RETRY", 0, 0, FileType::Binary)), BaudRate::Baud2000)
        .unwrap();
    let blocks = image.blocks().to_vec();

    assert!(matches!(image.save(Some(&bad)), Err(TapeError::WriteError(_))));
    assert_eq!(image.path(), Some(good.as_path()));
    assert_eq!(image.blocks(), &blocks[..]);
    assert!(!bad.exists());

    // A retry to the remembered path writes the new file.
    image.save(None).unwrap();
    let loaded = TapeImage::load(&good).unwrap();
    assert_eq!(loaded.blocks(), &blocks[..]);
}

#[test]
fn test_amsdos_file() {
    init();
    let body = test_pattern(700);
    let mut file = vec![0u8; 128];
    file[1..9].copy_from_slice(b"DEMO    ");
    file[9..12].copy_from_slice(b"BIN");
    file[18] = 0x02;
    file[21..23].copy_from_slice(&0x4000u16.to_le_bytes());
    file[24..26].copy_from_slice(&(body.len() as u16).to_le_bytes());
    file[26..28].copy_from_slice(&0x4000u16.to_le_bytes());
    file[64..66].copy_from_slice(&(body.len() as u16).to_le_bytes());
    let sum = file[..67].iter().fold(0u16, |acc, &b| acc.wrapping_add(b as u16));
    file[67..69].copy_from_slice(&sum.to_le_bytes());
    file.extend_from_slice(&body);

    let (amsdos, contents) = AmsdosHeader::detect(&file).unwrap();
    assert_eq!(contents, &body[..]);

    let mut image = TapeImage::create();
    image
        .add_file(contents, Some(FileHeaderRecord::from_amsdos(&amsdos)), BaudRate::Baud2000)
        .unwrap();

    let files = image.catalog();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "DEMO.BIN");
    assert_eq!(files[0].file_type, FileType::Binary);
    assert_eq!(files[0].load_addr, 0x4000);
    assert_eq!(files[0].size, 700);
}
