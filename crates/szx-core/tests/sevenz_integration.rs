//! Integration tests against real 7z files.
//!
//! The fixtures hold stored (copy-method) streams so they stay small and
//! byte-predictable. `sample.7z` is one solid block:
//!
//! ```text
//! docs/                  dir
//! docs/notes/            dir
//! docs/readme.txt        "Hello from szx\n"
//! docs/notes/todo.txt    "1. write tests\n"
//! bin/                   dir
//! bin/data.bin           bytes 0..=255
//! empty.txt              empty
//! ```
//!
//! `corrupt.7z` is the same archive with one byte of `todo.txt` flipped.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use szx_core::ErrorKind;
use szx_core::ExtractOptions;
use szx_core::ListOptions;
use szx_core::checksum::crc32;
use szx_core::codec::CodePage;
use szx_core::extract_archive;
use szx_core::format::AttributeStyle;
use szx_core::list_archive;
use szx_core::source::ArchiveSource;
use szx_core::source::BlockLocation;
use szx_core::source::SevenZSource;
use szx_core::verify_archive;
use tempfile::TempDir;

const README: &[u8] = b"Hello from szx\n";
const TODO: &[u8] = b"1. write tests\n";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn open(name: &str) -> SevenZSource<BufReader<File>> {
    let file = File::open(fixture(name)).expect("fixture should exist");
    SevenZSource::open(BufReader::new(file)).unwrap()
}

fn data_bin() -> Vec<u8> {
    (0..=255u8).collect()
}

#[test]
fn test_open_reads_file_table() {
    let source = open("sample.7z");
    let names: Vec<String> = source.entries().iter().map(|e| e.display_name()).collect();

    assert_eq!(
        names,
        [
            "docs",
            "docs/notes",
            "docs/readme.txt",
            "docs/notes/todo.txt",
            "bin",
            "bin/data.bin",
            "empty.txt",
        ]
    );
    let dirs: Vec<bool> = source.entries().iter().map(|e| e.is_dir).collect();
    assert_eq!(dirs, [true, true, false, false, true, false, false]);
    assert_eq!(source.format_name(), "7z");
}

#[test]
fn test_open_reads_metadata() {
    let source = open("sample.7z");
    let entries = source.entries();

    assert_eq!(entries[0].attributes, Some(0x10));
    assert_eq!(entries[2].attributes, Some(0x20));
    assert_eq!(entries[2].size, README.len() as u64);
    assert_eq!(entries[2].crc, Some(crc32(README)));
    assert_eq!(entries[5].crc, Some(crc32(&data_bin())));
    assert_eq!(entries[0].modified, Some(130_714_560_000_000_000));
    assert_eq!(entries[2].modified, Some(130_714_560_010_000_000));
}

#[test]
fn test_solid_block_locations() {
    let source = open("sample.7z");

    assert_eq!(source.block_location(0), None);
    assert_eq!(
        source.block_location(2),
        Some(BlockLocation {
            block: 0,
            offset: 0,
            len: README.len(),
        })
    );
    assert_eq!(
        source.block_location(3),
        Some(BlockLocation {
            block: 0,
            offset: README.len(),
            len: TODO.len(),
        })
    );
    assert_eq!(
        source.block_location(5),
        Some(BlockLocation {
            block: 0,
            offset: README.len() + TODO.len(),
            len: 256,
        })
    );
    assert_eq!(source.block_location(6), None);
    assert_eq!(source.block_size(0), Some(286));
}

#[test]
fn test_decode_whole_block() {
    let mut source = open("sample.7z");
    let mut out = Vec::new();
    source.decode_block(0, &mut out).unwrap();

    let mut expected = README.to_vec();
    expected.extend_from_slice(TODO);
    expected.extend(data_bin());
    assert_eq!(out, expected);
}

#[test]
fn test_extract_full_paths() {
    let temp = TempDir::new().expect("failed to create temp dir");

    let report = extract_archive(fixture("sample.7z"), &ExtractOptions::new(temp.path())).unwrap();

    assert_eq!(report.files_extracted, 4);
    assert_eq!(report.directories_created, 3);
    assert_eq!(report.bytes_written, 286);
    assert_eq!(report.blocks_decoded, 1);
    assert_eq!(
        std::fs::read(temp.path().join("docs/readme.txt")).unwrap(),
        README
    );
    assert_eq!(
        std::fs::read(temp.path().join("docs/notes/todo.txt")).unwrap(),
        TODO
    );
    assert_eq!(
        std::fs::read(temp.path().join("bin/data.bin")).unwrap(),
        data_bin()
    );
    assert_eq!(std::fs::metadata(temp.path().join("empty.txt")).unwrap().len(), 0);
}

#[test]
fn test_extract_flattened() {
    let temp = TempDir::new().expect("failed to create temp dir");
    let options = ExtractOptions {
        output_dir: temp.path().to_path_buf(),
        preserve_full_paths: false,
        ..ExtractOptions::default()
    };

    let report = extract_archive(fixture("sample.7z"), &options).unwrap();

    assert_eq!(report.directories_created, 0);
    assert!(!temp.path().join("docs").exists());
    assert_eq!(std::fs::read(temp.path().join("readme.txt")).unwrap(), README);
    assert_eq!(std::fs::read(temp.path().join("todo.txt")).unwrap(), TODO);
    assert!(temp.path().join("data.bin").is_file());
    assert!(temp.path().join("empty.txt").is_file());
}

#[test]
fn test_extract_two_blocks() {
    let temp = TempDir::new().expect("failed to create temp dir");

    let report =
        extract_archive(fixture("two_blocks.7z"), &ExtractOptions::new(temp.path())).unwrap();

    assert_eq!(report.blocks_decoded, 2);
    assert_eq!(
        std::fs::read(temp.path().join("first.txt")).unwrap(),
        b"first block\n"
    );
    assert_eq!(
        std::fs::read(temp.path().join("second.txt")).unwrap(),
        b"second block\n"
    );
}

#[test]
fn test_list_sample() {
    let mut buf = vec![0u8; 4096];
    let options = ListOptions {
        code_page: CodePage::Utf8,
        attribute_style: AttributeStyle::None,
    };

    let summary = list_archive(fixture("sample.7z"), &mut buf, &options).unwrap();

    assert!(summary.is_complete());
    assert_eq!(summary.lines_written, 7);
    let text = std::str::from_utf8(&buf[..summary.bytes_used]).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "2015-03-22 00:00:00\t\t0\tdocs");
    assert_eq!(lines[2], "2015-03-22 00:00:01\t\t15\tdocs/readme.txt");
    assert_eq!(lines[5], "2015-03-22 00:00:01\t\t256\tbin/data.bin");
    assert_eq!(lines[6], "2015-03-22 00:00:01\t\t0\tempty.txt");
}

#[test]
fn test_list_does_not_decode() {
    // The corrupt block is never touched when only the header is read.
    let mut buf = vec![0u8; 4096];
    let summary = list_archive(fixture("corrupt.7z"), &mut buf, &ListOptions::default()).unwrap();
    assert_eq!(summary.lines_written, 7);
}

#[test]
fn test_verify_sample() {
    let report = verify_archive(fixture("sample.7z")).unwrap();

    assert_eq!(report.files_verified, 4);
    assert_eq!(report.bytes_verified, 286);
    assert_eq!(report.blocks_decoded, 1);
}

#[test]
fn test_verify_corrupt() {
    let err = verify_archive(fixture("corrupt.7z")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_extract_corrupt_fails_with_format_error() {
    let temp = TempDir::new().expect("failed to create temp dir");

    let err = extract_archive(fixture("corrupt.7z"), &ExtractOptions::new(temp.path())).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(!temp.path().join("docs/notes/todo.txt").exists());
}

#[test]
fn test_empty_archive() {
    let source = open("empty.7z");
    assert!(source.entries().is_empty());

    let temp = TempDir::new().expect("failed to create temp dir");
    let report = extract_archive(fixture("empty.7z"), &ExtractOptions::new(temp.path())).unwrap();
    assert_eq!(report.total_items(), 0);
    assert_eq!(report.blocks_decoded, 0);

    let mut buf = vec![0u8; 64];
    let summary = list_archive(fixture("empty.7z"), &mut buf, &ListOptions::default()).unwrap();
    assert_eq!(summary.bytes_used, 0);
}
