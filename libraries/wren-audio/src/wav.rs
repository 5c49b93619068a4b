//! RIFF/WAVE container parsing
//!
//! Chunk-level parser for linear PCM WAV files. The container is a 12-byte
//! RIFF/WAVE header followed by sub-chunks in arbitrary order; each chunk is
//! a 4-byte ASCII ID, a 4-byte little-endian size and a word-aligned payload.
//! Only the `fmt ` and `data` chunks matter here - everything else (LIST,
//! fact, cue, ...) is skipped over.

use std::io::{ErrorKind, Read, Seek, SeekFrom};

use crate::error::{AudioError, Result};

/// WAVE format tag for linear PCM
const FORMAT_TAG_PCM: u16 = 1;

/// Byte length of the canonical PCM `fmt ` payload
const FMT_PCM_LEN: u32 = 16;

/// Canonical PCM format, parsed once per file
///
/// Owned by the active playback session and discarded with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormat {
    /// Channel count (1 = mono, 2 = stereo)
    pub channels: u16,

    /// Sample rate in Hz
    pub sample_rate_hz: u32,

    /// Sample width (8 or 16)
    pub bits_per_sample: u16,

    /// Declared bytes of audio per second; drives duration and progress
    pub byte_rate: u32,

    /// Size of the `data` chunk payload in bytes
    pub data_size_bytes: u32,
}

impl WavFormat {
    /// Whole seconds of audio in the data chunk (truncated)
    pub fn duration_s(&self) -> u32 {
        if self.byte_rate == 0 {
            0
        } else {
            self.data_size_bytes / self.byte_rate
        }
    }

    /// Bytes per single-channel sample (1 or 2)
    pub fn bytes_per_sample(&self) -> u32 {
        u32::from(self.bits_per_sample) / 8
    }
}

/// Parse the container and leave `reader` positioned at the first PCM byte.
///
/// Chunks may appear in any order; when `data` precedes `fmt ` the scanner
/// remembers the data offset, keeps walking until `fmt ` is found and seeks
/// back. Unknown chunks are skipped, including the pad byte after an
/// odd-sized payload.
///
/// # Returns
/// * `Ok(format)` - validated PCM format, stream at data start
/// * `Err(MalformedHeader)` - RIFF/WAVE magic mismatch or broken `fmt ` chunk
/// * `Err(UnsupportedFormat)` - non-PCM, odd channel/bit layout, zero byte rate
/// * `Err(TruncatedFile)` - stream ended before both `fmt ` and `data` were seen
pub fn parse<R: Read + Seek>(reader: &mut R) -> Result<WavFormat> {
    let mut header = [0u8; 12];
    reader
        .read_exact(&mut header)
        .map_err(|e| map_eof(e, AudioError::MalformedHeader("short RIFF header")))?;

    if &header[0..4] != b"RIFF" {
        return Err(AudioError::MalformedHeader("missing RIFF magic"));
    }
    if &header[8..12] != b"WAVE" {
        return Err(AudioError::MalformedHeader("missing WAVE magic"));
    }

    let mut fmt: Option<PcmFields> = None;
    let mut data: Option<(u64, u32)> = None;

    loop {
        let mut chunk = [0u8; 8];
        match reader.read_exact(&mut chunk) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }
        let size = u32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);

        match &chunk[0..4] {
            b"fmt " => fmt = Some(read_fmt(reader, size)?),
            b"data" => {
                data = Some((reader.stream_position()?, size));
                if fmt.is_some() {
                    break;
                }
                // `fmt ` still outstanding - skip over the sample data
                skip_payload(reader, size)?;
            }
            _ => skip_payload(reader, size)?,
        }

        if fmt.is_some() && data.is_some() {
            break;
        }
    }

    let Some(fields) = fmt else {
        return Err(AudioError::TruncatedFile("no fmt chunk before end of stream"));
    };
    let Some((data_offset, data_size)) = data else {
        return Err(AudioError::TruncatedFile("no data chunk before end of stream"));
    };

    let format = validate(fields, data_size)?;
    reader.seek(SeekFrom::Start(data_offset))?;
    Ok(format)
}

/// Raw fields of the canonical 16-byte PCM `fmt ` payload
struct PcmFields {
    format_tag: u16,
    channels: u16,
    sample_rate_hz: u32,
    byte_rate: u32,
    bits_per_sample: u16,
}

fn read_fmt<R: Read + Seek>(reader: &mut R, size: u32) -> Result<PcmFields> {
    if size < FMT_PCM_LEN {
        return Err(AudioError::MalformedHeader("fmt chunk shorter than 16 bytes"));
    }

    let mut payload = [0u8; FMT_PCM_LEN as usize];
    reader
        .read_exact(&mut payload)
        .map_err(|e| map_eof(e, AudioError::TruncatedFile("fmt chunk cut short")))?;

    // Extension bytes (cbSize etc.) are irrelevant for plain PCM
    skip_payload(reader, size - FMT_PCM_LEN)?;

    Ok(PcmFields {
        format_tag: u16::from_le_bytes([payload[0], payload[1]]),
        channels: u16::from_le_bytes([payload[2], payload[3]]),
        sample_rate_hz: u32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]),
        byte_rate: u32::from_le_bytes([payload[8], payload[9], payload[10], payload[11]]),
        // payload[12..14] is block align, implied by the other fields
        bits_per_sample: u16::from_le_bytes([payload[14], payload[15]]),
    })
}

fn validate(fields: PcmFields, data_size: u32) -> Result<WavFormat> {
    if fields.format_tag != FORMAT_TAG_PCM {
        return Err(AudioError::UnsupportedFormat(format!(
            "format tag {} is not linear PCM",
            fields.format_tag
        )));
    }
    if !matches!(fields.channels, 1 | 2) {
        return Err(AudioError::UnsupportedFormat(format!(
            "{} channels (only mono/stereo supported)",
            fields.channels
        )));
    }
    if !matches!(fields.bits_per_sample, 8 | 16) {
        return Err(AudioError::UnsupportedFormat(format!(
            "{} bits per sample (only 8/16 supported)",
            fields.bits_per_sample
        )));
    }
    if fields.byte_rate == 0 {
        // Rejected here so duration/progress math can never divide by zero
        return Err(AudioError::UnsupportedFormat("zero byte rate".to_string()));
    }

    Ok(WavFormat {
        channels: fields.channels,
        sample_rate_hz: fields.sample_rate_hz,
        bits_per_sample: fields.bits_per_sample,
        byte_rate: fields.byte_rate,
        data_size_bytes: data_size,
    })
}

/// Skip a chunk payload, honouring RIFF word alignment (odd sizes are padded)
fn skip_payload<R: Read + Seek>(reader: &mut R, size: u32) -> Result<()> {
    let skip = i64::from(size) + i64::from(size & 1);
    reader.seek(SeekFrom::Current(skip))?;
    Ok(())
}

fn map_eof(err: std::io::Error, replacement: AudioError) -> AudioError {
    if err.kind() == ErrorKind::UnexpectedEof {
        replacement
    } else {
        AudioError::Io(err)
    }
}
