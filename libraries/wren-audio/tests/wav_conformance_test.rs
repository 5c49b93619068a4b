//! Parser conformance against real WAV writers and adversarial chunk layouts

use std::io::{Cursor, Read, Seek, SeekFrom};

use proptest::prelude::*;
use wren_audio::{wav, AudioError};

fn chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(id);
    bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    bytes.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        bytes.push(0);
    }
    bytes
}

fn fmt_payload(channels: u16, sample_rate: u32, bits: u16) -> Vec<u8> {
    let block_align = channels * bits / 8;
    let byte_rate = sample_rate * u32::from(block_align);
    let mut payload = Vec::new();
    payload.extend_from_slice(&1u16.to_le_bytes());
    payload.extend_from_slice(&channels.to_le_bytes());
    payload.extend_from_slice(&sample_rate.to_le_bytes());
    payload.extend_from_slice(&byte_rate.to_le_bytes());
    payload.extend_from_slice(&block_align.to_le_bytes());
    payload.extend_from_slice(&bits.to_le_bytes());
    payload
}

fn riff(chunks: &[Vec<u8>]) -> Vec<u8> {
    let body_len: usize = chunks.iter().map(Vec::len).sum();
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&((body_len + 4) as u32).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    for c in chunks {
        bytes.extend_from_slice(c);
    }
    bytes
}

#[test]
fn parses_hound_written_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tone.wav");

    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for n in 0..44100u32 {
        let t = n as f32 / 44100.0;
        let sample = (8000.0 * (2.0 * std::f32::consts::PI * 440.0 * t).sin()) as i16;
        writer.write_sample(sample).unwrap();
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();

    let mut file = std::fs::File::open(&path).unwrap();
    let format = wav::parse(&mut file).unwrap();

    assert_eq!(format.channels, 2);
    assert_eq!(format.sample_rate_hz, 44100);
    assert_eq!(format.bits_per_sample, 16);
    assert_eq!(format.byte_rate, 44100 * 4);
    assert_eq!(format.data_size_bytes, 44100 * 4);
    assert_eq!(format.duration_s(), 1);
}

#[test]
fn data_start_is_stable_across_chunk_orders() {
    let pcm: Vec<u8> = (0..64u8).collect();

    let forward = riff(&[
        chunk(b"fmt ", &fmt_payload(1, 16000, 16)),
        chunk(b"data", &pcm),
    ]);
    let backward = riff(&[
        chunk(b"data", &pcm),
        chunk(b"LIST", b"INFOjunk!"),
        chunk(b"fmt ", &fmt_payload(1, 16000, 16)),
    ]);

    for bytes in [forward, backward] {
        let mut cursor = Cursor::new(bytes);
        let format = wav::parse(&mut cursor).unwrap();
        assert_eq!(format.data_size_bytes, 64);

        let mut head = [0u8; 4];
        cursor.read_exact(&mut head).unwrap();
        assert_eq!(head, [0, 1, 2, 3]);
    }
}

#[test]
fn reparsing_after_seek_is_idempotent() {
    let bytes = riff(&[
        chunk(b"fmt ", &fmt_payload(2, 22050, 8)),
        chunk(b"data", &[0x80; 128]),
    ]);
    let mut cursor = Cursor::new(bytes);

    let first = wav::parse(&mut cursor).unwrap();
    cursor.seek(SeekFrom::Start(0)).unwrap();
    let second = wav::parse(&mut cursor).unwrap();

    assert_eq!(first, second);
}

#[test]
fn garbage_is_rejected_not_panicked() {
    for bytes in [
        Vec::new(),
        b"not a wav at all".to_vec(),
        b"RIFF\xff\xff\xff\xffWAVE".to_vec(),
        riff(&[chunk(b"junk", &[0; 8])]),
    ] {
        assert!(wav::parse(&mut Cursor::new(bytes)).is_err());
    }
}

proptest! {
    /// Any number of unknown chunks, in any position, must not disturb the
    /// located format or data extent.
    #[test]
    fn unknown_chunks_are_transparent(
        junk_sizes in prop::collection::vec(0usize..48, 0..5),
        data_first in any::<bool>(),
        data_len in 1usize..256,
    ) {
        let mut chunks = Vec::new();
        for (i, size) in junk_sizes.iter().enumerate() {
            let id = [b'j', b'n', b'k', b'0' + (i as u8 % 10)];
            chunks.push(chunk(&id, &vec![0xEE; *size]));
        }

        let fmt = chunk(b"fmt ", &fmt_payload(1, 16000, 16));
        let data = chunk(b"data", &vec![0x42; data_len]);
        if data_first {
            chunks.insert(0, data);
            chunks.push(fmt);
        } else {
            chunks.insert(0, fmt);
            chunks.push(data);
        }

        let mut cursor = Cursor::new(riff(&chunks));
        let format = wav::parse(&mut cursor).unwrap();

        prop_assert_eq!(format.sample_rate_hz, 16000);
        prop_assert_eq!(format.data_size_bytes, data_len as u32);

        let mut first = [0u8; 1];
        cursor.read_exact(&mut first).unwrap();
        prop_assert_eq!(first[0], 0x42);
    }

    /// Corrupting either magic must yield MalformedHeader, never a panic.
    #[test]
    fn corrupt_magics_are_malformed(byte_index in 0usize..4, replacement in any::<u8>()) {
        let mut bytes = riff(&[
            chunk(b"fmt ", &fmt_payload(1, 16000, 16)),
            chunk(b"data", &[0; 16]),
        ]);
        prop_assume!(bytes[byte_index] != replacement);
        bytes[byte_index] = replacement;

        let err = wav::parse(&mut Cursor::new(bytes)).unwrap_err();
        prop_assert!(matches!(err, AudioError::MalformedHeader(_)));
    }
}
