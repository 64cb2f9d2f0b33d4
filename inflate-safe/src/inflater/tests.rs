use std::io::Write;

use flate2::write::{DeflateEncoder, GzEncoder};
use flate2::Compression;

use super::*;

fn deflate_raw(data: &[u8]) -> Vec<u8> {
    let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

fn gzip(data: &[u8]) -> Vec<u8> {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

/// Drive an `Inflater` to completion, collecting all decoded output, and
/// returning the list of `(uncompressed_offset, compressed_offset, bit)`
/// observed at every `BlockEnd`.
fn drain(inflater: &mut Inflater, mut input: &[u8]) -> (Vec<u8>, Vec<(u64, u64, u8)>) {
    let mut out = Vec::new();
    let mut points = Vec::new();
    let mut buf = [0u8; 256];

    loop {
        if inflater.avail_in() == 0 && !input.is_empty() {
            let take = input.len().min(64);
            inflater.set_input(&input[..take]);
            input = &input[take..];
        }

        let step = inflater.inflate(&mut buf).unwrap();
        out.extend_from_slice(&buf[..step.produced]);

        match step.status {
            InflateStatus::BlockEnd => {
                let (byte, bit) = inflater.stream_position_bits();
                points.push((inflater.total_out(), byte, bit));
            }
            InflateStatus::StreamEnd => break,
            InflateStatus::NeedInput if input.is_empty() => break,
            _ => {}
        }
    }

    (out, points)
}

#[test]
fn raw_round_trip() {
    let data = b"The quick brown fox jumps over the lazy dog. ".repeat(200);
    let compressed = deflate_raw(&data);

    let mut inflater = Inflater::init(Mode::Raw).unwrap();
    let (decoded, _points) = drain(&mut inflater, &compressed);

    assert_eq!(decoded, data);
}

#[test]
fn gzip_mode_round_trip_via_zlib_header_parsing() {
    let data = b"some arbitrary payload bytes, repeated. ".repeat(500);
    let compressed = gzip(&data);

    let mut inflater = Inflater::init(Mode::Gzip).unwrap();
    let (decoded, _points) = drain(&mut inflater, &compressed);

    assert_eq!(decoded, data);
}

#[test]
fn block_boundaries_are_monotonic_and_cover_output() {
    let data = (0u32..200_000).flat_map(u32::to_le_bytes).collect::<Vec<_>>();
    let compressed = deflate_raw(&data);

    let mut inflater = Inflater::init(Mode::Raw).unwrap();
    let (decoded, points) = drain(&mut inflater, &compressed);

    assert_eq!(decoded, data);
    assert!(!points.is_empty(), "a stream this large must cross at least one block boundary");

    let mut prev_uncompressed = 0u64;
    let mut prev_compressed = 0u64;
    for (uncompressed, compressed_off, bit) in &points {
        assert!(bit <= &7);
        assert!(*uncompressed >= prev_uncompressed);
        assert!(*compressed_off >= prev_compressed);
        prev_uncompressed = *uncompressed;
        prev_compressed = *compressed_off;
    }
}

#[test]
fn window_capture_and_resume_from_dictionary() {
    let data = (0u32..100_000).flat_map(u32::to_le_bytes).collect::<Vec<_>>();
    let compressed = deflate_raw(&data);

    let mut inflater = Inflater::init(Mode::Raw).unwrap();
    let mut buf = [0u8; 4096];
    let mut input = compressed.as_slice();
    let mut total_out = 0u64;
    let mut captured: Option<(u64, u64, u8, Vec<u8>)> = None;

    loop {
        if inflater.avail_in() == 0 && !input.is_empty() {
            let take = input.len().min(512);
            inflater.set_input(&input[..take]);
            input = &input[take..];
        }

        let step = inflater.inflate(&mut buf).unwrap();
        total_out += step.produced as u64;

        if step.status == InflateStatus::BlockEnd
            && captured.is_none()
            && total_out > WINDOW_SIZE as u64
        {
            let (byte, bit) = inflater.stream_position_bits();
            let window = inflater.get_window().unwrap();
            assert_eq!(window.len(), WINDOW_SIZE);
            captured = Some((total_out, byte, bit, window));
        }

        if step.status == InflateStatus::StreamEnd || (input.is_empty() && inflater.avail_in() == 0)
        {
            break;
        }
    }

    let (resume_uncompressed, resume_byte, resume_bit, window) =
        captured.expect("stream large enough to cross a full window");

    // Resume fresh from the captured access point and decode forward.
    let mut resumed = Inflater::init(Mode::Raw).unwrap();
    if resume_bit > 0 {
        let prev_byte = compressed[resume_byte as usize - 1];
        resumed.prime(resume_bit, prev_byte).unwrap();
    }
    resumed.set_dictionary(&window).unwrap();

    let mut rest_in = &compressed[resume_byte as usize..];
    let mut rest_out = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        if resumed.avail_in() == 0 && !rest_in.is_empty() {
            let take = rest_in.len().min(1024);
            resumed.set_input(&rest_in[..take]);
            rest_in = &rest_in[take..];
        }
        let step = resumed.inflate(&mut buf).unwrap();
        rest_out.extend_from_slice(&buf[..step.produced]);
        if step.status == InflateStatus::StreamEnd {
            break;
        }
        if rest_in.is_empty() && resumed.avail_in() == 0 && step.produced == 0 {
            break;
        }
    }

    assert_eq!(rest_out, &data[resume_uncompressed as usize..]);
}

#[test]
fn corrupt_input_reports_data_error() {
    let mut inflater = Inflater::init(Mode::Raw).unwrap();
    let garbage = vec![0xFFu8; 64];
    inflater.set_input(&garbage);

    let mut buf = [0u8; 64];
    let err = loop {
        match inflater.inflate(&mut buf) {
            Ok(step) if step.status == InflateStatus::NeedInput => {
                break None;
            }
            Ok(_) => continue,
            Err(e) => break Some(e),
        }
    };

    assert_eq!(err, Some(Error::DataError));
}
