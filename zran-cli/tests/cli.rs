//! Integration tests for the `zran` front-end: parse real argv vectors with
//! [`clap`] and drive them through [`zran_cli::process::run`] end to end,
//! the way `xz-cli`'s `tests/test_cli` drives its binaries but without the
//! overhead of spawning a child process for a single-binary front-end.

use std::fs::File;
use std::io::Write as _;

use clap::Parser;
use flate2::write::GzEncoder;
use flate2::Compression;

use zran_cli::{process, Cli};

fn write_gzip_fixture(dir: &tempfile::TempDir, name: &str, data: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut enc = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap();
    path
}

#[test]
fn cat_subcommand_reproduces_original_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let payload: Vec<u8> = (0u8..=255).cycle().take(40_000).collect();
    let path = write_gzip_fixture(&dir, "data.gz", &payload);

    let cli = Cli::parse_from(["zran", "cat", path.to_str().unwrap()]);
    let mut out = Vec::new();
    process::run(cli, &mut out).unwrap();

    assert_eq!(out, payload);
}

#[test]
fn pread_subcommand_reads_requested_slice() {
    let dir = tempfile::tempdir().unwrap();
    let payload: Vec<u8> = (0u8..=255).cycle().take(70_000).collect();
    let path = write_gzip_fixture(&dir, "data.gz", &payload);

    let cli = Cli::parse_from([
        "zran",
        "pread",
        path.to_str().unwrap(),
        "--offset",
        "2000",
        "--length",
        "64",
    ]);
    let mut out = Vec::new();
    process::run(cli, &mut out).unwrap();

    assert_eq!(out, payload[2000..2064]);
}

#[test]
fn seek_points_subcommand_prints_a_monotonic_table() {
    let dir = tempfile::tempdir().unwrap();
    let payload: Vec<u8> = (0u8..=255).cycle().take(150_000).collect();
    let path = write_gzip_fixture(&dir, "data.gz", &payload);

    let cli = Cli::parse_from([
        "zran",
        "seek-points",
        path.to_str().unwrap(),
        "--spacing",
        "16384",
    ]);
    let mut out = Vec::new();
    process::run(cli, &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    let rows: Vec<(u64, u64)> = text
        .lines()
        .map(|line| {
            let mut parts = line.split('\t');
            let compressed: u64 = parts.next().unwrap().parse().unwrap();
            let uncompressed: u64 = parts.next().unwrap().parse().unwrap();
            (compressed, uncompressed)
        })
        .collect();

    assert!(!rows.is_empty());
    for pair in rows.windows(2) {
        assert!(pair[1].0 >= pair[0].0);
        assert!(pair[1].1 > pair[0].1);
    }
}

#[test]
fn build_index_then_pread_via_exported_index_file() {
    let dir = tempfile::tempdir().unwrap();
    let payload: Vec<u8> = (0u8..=255).cycle().take(300_000).collect();
    let path = write_gzip_fixture(&dir, "data.gz", &payload);
    let index_path = dir.path().join("data.zidx");

    let build_cli = Cli::parse_from([
        "zran",
        "build-index",
        path.to_str().unwrap(),
        "--output",
        index_path.to_str().unwrap(),
        "--spacing",
        "32768",
    ]);
    let mut build_out = Vec::new();
    process::run(build_cli, &mut build_out).unwrap();
    assert!(String::from_utf8(build_out).unwrap().contains("points"));

    let pread_cli = Cli::parse_from([
        "zran",
        "pread",
        path.to_str().unwrap(),
        "--offset",
        "250000",
        "--length",
        "128",
        "--index",
        index_path.to_str().unwrap(),
    ]);
    let mut out = Vec::new();
    process::run(pread_cli, &mut out).unwrap();

    assert_eq!(out, payload[250_000..250_128]);
}

#[test]
fn cat_subcommand_with_mmap_and_drop_handles_flags() {
    let dir = tempfile::tempdir().unwrap();
    let payload: Vec<u8> = (0u8..=255).cycle().take(40_000).collect();
    let path = write_gzip_fixture(&dir, "data.gz", &payload);

    let cli = Cli::parse_from([
        "zran",
        "cat",
        path.to_str().unwrap(),
        "--mmap",
        "--drop-handles",
    ]);
    let mut out = Vec::new();
    process::run(cli, &mut out).unwrap();

    assert_eq!(out, payload);
}

#[test]
fn missing_input_file_is_reported_as_an_error_not_a_panic() {
    let cli = Cli::parse_from(["zran", "cat", "/no/such/file.gz"]);
    let mut out = Vec::new();
    let result = process::run(cli, &mut out);

    assert!(result.is_err());
}
