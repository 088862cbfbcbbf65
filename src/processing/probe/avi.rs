use std::{
    io::{Read, Seek, SeekFrom},
    time::Duration,
};

use super::{
    AnalyzeError, AudioTrackMeta, ContainerFormat, MediaMetadata, TrackMeta, VideoTrackMeta,
};

// header chunks in a sane AVI are tiny, anything bigger is not worth reading
const MAX_HEADER_CHUNK: u32 = 64 * 1024;

struct MainHeader {
    micro_sec_per_frame: u32,
    total_frames: u32,
    width: u32,
    height: u32,
}

struct AviStream {
    kind: [u8; 4],
    handler: [u8; 4],
    format: Vec<u8>,
}

/// Walks the RIFF chunk tree far enough to read the `hdrl` header list.
/// Sizes come from the `avih` main header, with the `vids` stream's
/// BITMAPINFOHEADER as fallback when `avih` carries zeros.
pub(super) fn parse(reader: &mut (impl Read + Seek)) -> Result<MediaMetadata, AnalyzeError> {
    let mut header = [0u8; 12];
    reader.read_exact(&mut header)?;
    if &header[0..4] != b"RIFF" || &header[8..12] != b"AVI " {
        return Err(parse_err("missing RIFF AVI signature"));
    }
    let mut main_header = None;
    let mut streams = Vec::default();
    while let Some((fourcc, size)) = next_chunk(reader)? {
        if &fourcc == b"LIST" {
            if size < 4 {
                return Err(parse_err("LIST chunk too short"));
            }
            let mut list_type = [0u8; 4];
            reader.read_exact(&mut list_type)?;
            if &list_type == b"hdrl" {
                parse_hdrl(reader, padded(size) - 4, &mut main_header, &mut streams)?;
                // everything we need lives in hdrl
                break;
            }
            skip(reader, padded(size) - 4)?;
        } else {
            skip(reader, padded(size))?;
        }
    }
    let main_header = main_header.ok_or_else(|| parse_err("missing avih main header"))?;

    let mut tracks = Vec::default();
    for stream in &streams {
        match &stream.kind {
            b"vids" => {
                let mut width = i64::from(main_header.width);
                let mut height = i64::from(main_header.height);
                if (width == 0 || height == 0) && stream.format.len() >= 12 {
                    // BITMAPINFOHEADER: biWidth at offset 4, biHeight at 8;
                    // negative height means top-down row order
                    width = i64::from(i32_le(&stream.format, 4));
                    height = i64::from(i32_le(&stream.format, 8)).abs();
                }
                tracks.push(TrackMeta::Video(VideoTrackMeta {
                    codec: fourcc_name(&stream.handler),
                    resolution_x: (width > 0).then_some(width),
                    resolution_y: (height > 0).then_some(height),
                }));
            }
            b"auds" => {
                // WAVEFORMATEX: nChannels at offset 2
                let channels =
                    (stream.format.len() >= 4).then(|| i64::from(u16_le(&stream.format, 2)));
                tracks.push(TrackMeta::Audio(AudioTrackMeta {
                    codec: None,
                    channels,
                }));
            }
            _ => {}
        }
    }
    let duration = (main_header.micro_sec_per_frame > 0 && main_header.total_frames > 0).then(
        || {
            Duration::from_micros(
                u64::from(main_header.micro_sec_per_frame) * u64::from(main_header.total_frames),
            )
        },
    );
    Ok(MediaMetadata {
        container: ContainerFormat::Avi,
        duration,
        tracks,
    })
}

fn parse_hdrl(
    reader: &mut (impl Read + Seek),
    mut remaining: u64,
    main_header: &mut Option<MainHeader>,
    streams: &mut Vec<AviStream>,
) -> Result<(), AnalyzeError> {
    while remaining >= 8 {
        let (fourcc, size) = match next_chunk(reader)? {
            Some(chunk) => chunk,
            None => return Ok(()),
        };
        remaining -= 8;
        let padded_size = padded(size);
        if padded_size > remaining {
            return Err(parse_err("chunk overruns hdrl list"));
        }
        match &fourcc {
            b"avih" => {
                let data = read_chunk_data(reader, size)?;
                *main_header = Some(parse_avih(&data)?);
            }
            b"LIST" => {
                if size < 4 {
                    return Err(parse_err("LIST chunk too short"));
                }
                let mut list_type = [0u8; 4];
                reader.read_exact(&mut list_type)?;
                if &list_type == b"strl" {
                    if let Some(stream) = parse_strl(reader, padded_size - 4)? {
                        streams.push(stream);
                    }
                } else {
                    skip(reader, padded_size - 4)?;
                }
            }
            _ => skip(reader, padded_size)?,
        }
        remaining -= padded_size;
    }
    skip(reader, remaining)
}

fn parse_strl(
    reader: &mut (impl Read + Seek),
    mut remaining: u64,
) -> Result<Option<AviStream>, AnalyzeError> {
    let mut kind = None;
    let mut handler = [0u8; 4];
    let mut format = Vec::default();
    while remaining >= 8 {
        let (fourcc, size) = match next_chunk(reader)? {
            Some(chunk) => chunk,
            None => break,
        };
        remaining -= 8;
        let padded_size = padded(size);
        if padded_size > remaining {
            return Err(parse_err("chunk overruns strl list"));
        }
        match &fourcc {
            b"strh" => {
                let data = read_chunk_data(reader, size)?;
                if data.len() < 8 {
                    return Err(parse_err("strh chunk too short"));
                }
                kind = Some([data[0], data[1], data[2], data[3]]);
                handler.copy_from_slice(&data[4..8]);
            }
            b"strf" => {
                format = read_chunk_data(reader, size)?;
            }
            _ => skip(reader, padded_size)?,
        }
        remaining -= padded_size;
    }
    skip(reader, remaining)?;
    Ok(kind.map(|kind| AviStream {
        kind,
        handler,
        format,
    }))
}

fn parse_avih(data: &[u8]) -> Result<MainHeader, AnalyzeError> {
    if data.len() < 40 {
        return Err(parse_err("avih chunk too short"));
    }
    Ok(MainHeader {
        micro_sec_per_frame: u32_le(data, 0),
        total_frames: u32_le(data, 16),
        width: u32_le(data, 32),
        height: u32_le(data, 36),
    })
}

fn parse_err(reason: &str) -> AnalyzeError {
    AnalyzeError::Parse {
        container: ContainerFormat::Avi,
        reason: reason.to_owned(),
    }
}

/// RIFF chunks are padded to even byte boundaries
fn padded(size: u32) -> u64 {
    u64::from(size) + u64::from(size & 1)
}

fn next_chunk(reader: &mut impl Read) -> Result<Option<([u8; 4], u32)>, AnalyzeError> {
    let mut fourcc = [0u8; 4];
    match reader.read_exact(&mut fourcc) {
        Ok(()) => {}
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err.into()),
    }
    let mut size = [0u8; 4];
    reader.read_exact(&mut size)?;
    Ok(Some((fourcc, u32::from_le_bytes(size))))
}

fn read_chunk_data(reader: &mut impl Read, size: u32) -> Result<Vec<u8>, AnalyzeError> {
    if size > MAX_HEADER_CHUNK {
        return Err(parse_err("header chunk unreasonably large"));
    }
    let mut data = vec![0u8; size as usize];
    reader.read_exact(&mut data)?;
    if size & 1 == 1 {
        let mut pad = [0u8; 1];
        reader.read_exact(&mut pad)?;
    }
    Ok(data)
}

fn skip(reader: &mut (impl Read + Seek), amount: u64) -> Result<(), AnalyzeError> {
    if amount > 0 {
        reader.seek(SeekFrom::Current(amount as i64))?;
    }
    Ok(())
}

fn fourcc_name(fourcc: &[u8; 4]) -> Option<String> {
    let name = std::str::from_utf8(fourcc).ok()?;
    let name = name.trim_matches(|c: char| c == ' ' || c == '\0');
    if name.is_empty() {
        None
    } else {
        Some(name.to_ascii_lowercase())
    }
}

fn u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn i32_le(data: &[u8], offset: usize) -> i32 {
    u32_le(data, offset) as i32
}

fn u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}
