//! Byte-level builders for the tiny container files the probe tests run
//! against. The MP4 builder emits an init-segment style file (full box tree,
//! empty sample tables, no media data), the Matroska builder a minimal
//! EBML/Segment tree, the AVI builder a RIFF file with only the header list.

fn be16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn be32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

// ---- MP4 ----

fn mp4_box(fourcc: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + payload.len());
    be32(&mut out, 8 + payload.len() as u32);
    out.extend_from_slice(fourcc);
    out.extend_from_slice(payload);
    out
}

fn mp4_full_box(fourcc: &[u8; 4], version: u8, flags: u32, body: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(4 + body.len());
    payload.push(version);
    payload.extend_from_slice(&flags.to_be_bytes()[1..]);
    payload.extend_from_slice(body);
    mp4_box(fourcc, &payload)
}

fn unity_matrix(out: &mut Vec<u8>) {
    for value in [
        0x0001_0000u32,
        0,
        0,
        0,
        0x0001_0000,
        0,
        0,
        0,
        0x4000_0000,
    ] {
        be32(out, value);
    }
}

pub(crate) fn minimal_mp4(width: u16, height: u16) -> Vec<u8> {
    let mut ftyp_payload = Vec::new();
    ftyp_payload.extend_from_slice(b"isom");
    be32(&mut ftyp_payload, 0x200);
    ftyp_payload.extend_from_slice(b"isom");
    ftyp_payload.extend_from_slice(b"avc1");
    let ftyp = mp4_box(b"ftyp", &ftyp_payload);

    let mut mvhd_body = Vec::new();
    be32(&mut mvhd_body, 0); // creation time
    be32(&mut mvhd_body, 0); // modification time
    be32(&mut mvhd_body, 1000); // timescale
    be32(&mut mvhd_body, 0); // duration
    be32(&mut mvhd_body, 0x0001_0000); // rate 1.0
    be16(&mut mvhd_body, 0x0100); // volume 1.0
    mvhd_body.extend_from_slice(&[0u8; 10]); // reserved
    unity_matrix(&mut mvhd_body);
    mvhd_body.extend_from_slice(&[0u8; 24]); // pre_defined
    be32(&mut mvhd_body, 2); // next track id
    let mvhd = mp4_full_box(b"mvhd", 0, 0, &mvhd_body);

    let mut tkhd_body = Vec::new();
    be32(&mut tkhd_body, 0); // creation time
    be32(&mut tkhd_body, 0); // modification time
    be32(&mut tkhd_body, 1); // track id
    be32(&mut tkhd_body, 0); // reserved
    be32(&mut tkhd_body, 0); // duration
    tkhd_body.extend_from_slice(&[0u8; 8]); // reserved
    be16(&mut tkhd_body, 0); // layer
    be16(&mut tkhd_body, 0); // alternate group
    be16(&mut tkhd_body, 0); // volume
    be16(&mut tkhd_body, 0); // reserved
    unity_matrix(&mut tkhd_body);
    be32(&mut tkhd_body, u32::from(width) << 16); // 16.16 fixed point
    be32(&mut tkhd_body, u32::from(height) << 16);
    let tkhd = mp4_full_box(b"tkhd", 0, 0x7, &tkhd_body);

    let mut mdhd_body = Vec::new();
    be32(&mut mdhd_body, 0); // creation time
    be32(&mut mdhd_body, 0); // modification time
    be32(&mut mdhd_body, 90000); // timescale
    be32(&mut mdhd_body, 0); // duration
    be16(&mut mdhd_body, 0x55C4); // language "und"
    be16(&mut mdhd_body, 0); // pre_defined
    let mdhd = mp4_full_box(b"mdhd", 0, 0, &mdhd_body);

    let mut hdlr_body = Vec::new();
    be32(&mut hdlr_body, 0); // pre_defined
    hdlr_body.extend_from_slice(b"vide");
    hdlr_body.extend_from_slice(&[0u8; 12]); // reserved
    hdlr_body.extend_from_slice(b"VideoHandler\0");
    let hdlr = mp4_full_box(b"hdlr", 0, 0, &hdlr_body);

    let mut vmhd_body = Vec::new();
    be16(&mut vmhd_body, 0); // graphicsmode
    vmhd_body.extend_from_slice(&[0u8; 6]); // opcolor
    let vmhd = mp4_full_box(b"vmhd", 0, 0x1, &vmhd_body);

    let url = mp4_full_box(b"url ", 0, 0x1, &[]); // data is self-contained
    let mut dref_body = Vec::new();
    be32(&mut dref_body, 1);
    dref_body.extend_from_slice(&url);
    let dinf = mp4_box(b"dinf", &mp4_full_box(b"dref", 0, 0, &dref_body));

    let sps = [0x67, 0x64, 0x00, 0x28, 0xAC, 0xD9, 0x40, 0x78];
    let pps = [0x68, 0xEB, 0xEC, 0xB2, 0x2C];
    let mut avcc_payload = vec![
        0x01, // configuration version
        0x64, // profile (high)
        0x00, // profile compatibility
        0x28, // level 4.0
        0xFF, // 4-byte NAL length
        0xE1, // one SPS
    ];
    be16(&mut avcc_payload, sps.len() as u16);
    avcc_payload.extend_from_slice(&sps);
    avcc_payload.push(0x01); // one PPS
    be16(&mut avcc_payload, pps.len() as u16);
    avcc_payload.extend_from_slice(&pps);
    let avcc = mp4_box(b"avcC", &avcc_payload);

    let mut avc1_payload = Vec::new();
    avc1_payload.extend_from_slice(&[0u8; 6]); // reserved
    be16(&mut avc1_payload, 1); // data reference index
    be16(&mut avc1_payload, 0); // pre_defined
    be16(&mut avc1_payload, 0); // reserved
    avc1_payload.extend_from_slice(&[0u8; 12]); // pre_defined
    be16(&mut avc1_payload, width);
    be16(&mut avc1_payload, height);
    be32(&mut avc1_payload, 0x0048_0000); // 72 dpi horizontal
    be32(&mut avc1_payload, 0x0048_0000); // 72 dpi vertical
    be32(&mut avc1_payload, 0); // reserved
    be16(&mut avc1_payload, 1); // frame count
    avc1_payload.extend_from_slice(&[0u8; 32]); // compressor name
    be16(&mut avc1_payload, 24); // depth
    be16(&mut avc1_payload, 0xFFFF); // pre_defined
    avc1_payload.extend_from_slice(&avcc);
    let avc1 = mp4_box(b"avc1", &avc1_payload);

    let mut stsd_body = Vec::new();
    be32(&mut stsd_body, 1);
    stsd_body.extend_from_slice(&avc1);
    let stsd = mp4_full_box(b"stsd", 0, 0, &stsd_body);
    let stts = mp4_full_box(b"stts", 0, 0, &0u32.to_be_bytes());
    let stsc = mp4_full_box(b"stsc", 0, 0, &0u32.to_be_bytes());
    let mut stsz_body = Vec::new();
    be32(&mut stsz_body, 0);
    be32(&mut stsz_body, 0);
    let stsz = mp4_full_box(b"stsz", 0, 0, &stsz_body);
    let stco = mp4_full_box(b"stco", 0, 0, &0u32.to_be_bytes());
    let stbl = mp4_box(b"stbl", &[stsd, stts, stsc, stsz, stco].concat());

    let minf = mp4_box(b"minf", &[vmhd, dinf, stbl].concat());
    let mdia = mp4_box(b"mdia", &[mdhd, hdlr, minf].concat());
    let trak = mp4_box(b"trak", &[tkhd, mdia].concat());
    let moov = mp4_box(b"moov", &[mvhd, trak].concat());
    [ftyp, moov].concat()
}

// ---- Matroska / WebM ----

fn ebml_size(value: u64) -> Vec<u8> {
    // smallest width whose all-ones (reserved "unknown") pattern is not hit
    let mut length = 1;
    while value >= (1u64 << (7 * length)) - 1 {
        length += 1;
    }
    let marked = value | (1u64 << (7 * length));
    (0..length)
        .map(|i| (marked >> (8 * (length - 1 - i))) as u8)
        .collect()
}

fn ebml_element(id: &[u8], payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(id.len() + 8 + payload.len());
    out.extend_from_slice(id);
    out.extend_from_slice(&ebml_size(payload.len() as u64));
    out.extend_from_slice(payload);
    out
}

fn ebml_uint(id: &[u8], value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first_used = bytes.iter().position(|b| *b != 0).unwrap_or(7);
    ebml_element(id, &bytes[first_used..])
}

fn ebml_string(id: &[u8], value: &str) -> Vec<u8> {
    ebml_element(id, value.as_bytes())
}

fn minimal_matroska(doc_type: &str, width: u64, height: u64) -> Vec<u8> {
    let ebml_header = ebml_element(
        &[0x1A, 0x45, 0xDF, 0xA3],
        &[
            ebml_uint(&[0x42, 0x86], 1),          // EBMLVersion
            ebml_uint(&[0x42, 0xF7], 1),          // EBMLReadVersion
            ebml_uint(&[0x42, 0xF2], 4),          // EBMLMaxIDLength
            ebml_uint(&[0x42, 0xF3], 8),          // EBMLMaxSizeLength
            ebml_string(&[0x42, 0x82], doc_type), // DocType
            ebml_uint(&[0x42, 0x87], 2),          // DocTypeVersion
            ebml_uint(&[0x42, 0x85], 2),          // DocTypeReadVersion
        ]
        .concat(),
    );
    let info = ebml_element(
        &[0x15, 0x49, 0xA9, 0x66],
        &[
            ebml_uint(&[0x2A, 0xD7, 0xB1], 1_000_000), // TimestampScale
            ebml_string(&[0x4D, 0x80], "video-dimensions-tests"), // MuxingApp
            ebml_string(&[0x57, 0x41], "video-dimensions-tests"), // WritingApp
        ]
        .concat(),
    );
    let video = ebml_element(
        &[0xE0],
        &[
            ebml_uint(&[0xB0], width),  // PixelWidth
            ebml_uint(&[0xBA], height), // PixelHeight
        ]
        .concat(),
    );
    let track_entry = ebml_element(
        &[0xAE],
        &[
            ebml_uint(&[0xD7], 1),           // TrackNumber
            ebml_uint(&[0x73, 0xC5], 1),     // TrackUID
            ebml_uint(&[0x83], 1),           // TrackType: video
            ebml_string(&[0x86], "V_VP8"),   // CodecID
            video,
        ]
        .concat(),
    );
    let tracks = ebml_element(&[0x16, 0x54, 0xAE, 0x6B], &track_entry);
    let segment = ebml_element(&[0x18, 0x53, 0x80, 0x67], &[info, tracks].concat());
    [ebml_header, segment].concat()
}

pub(crate) fn minimal_webm(width: u64, height: u64) -> Vec<u8> {
    minimal_matroska("webm", width, height)
}

pub(crate) fn minimal_mkv(width: u64, height: u64) -> Vec<u8> {
    minimal_matroska("matroska", width, height)
}

// ---- AVI ----

fn riff_chunk(fourcc: &[u8; 4], data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + data.len() + 1);
    out.extend_from_slice(fourcc);
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(data);
    if data.len() % 2 == 1 {
        out.push(0);
    }
    out
}

fn riff_list(list_type: &[u8; 4], children: &[u8]) -> Vec<u8> {
    riff_chunk(b"LIST", &[&list_type[..], children].concat())
}

fn build_avi(main_width: u32, main_height: u32, strf_width: i32, strf_height: i32) -> Vec<u8> {
    let mut avih = vec![0u8; 56];
    avih[0..4].copy_from_slice(&33_366u32.to_le_bytes()); // dwMicroSecPerFrame, ~29.97fps
    avih[16..20].copy_from_slice(&120u32.to_le_bytes()); // dwTotalFrames
    avih[24..28].copy_from_slice(&1u32.to_le_bytes()); // dwStreams
    avih[32..36].copy_from_slice(&main_width.to_le_bytes());
    avih[36..40].copy_from_slice(&main_height.to_le_bytes());

    let mut strh = vec![0u8; 56];
    strh[0..4].copy_from_slice(b"vids");
    strh[4..8].copy_from_slice(b"XVID");

    let mut strf = vec![0u8; 40]; // BITMAPINFOHEADER
    strf[0..4].copy_from_slice(&40u32.to_le_bytes());
    strf[4..8].copy_from_slice(&strf_width.to_le_bytes());
    strf[8..12].copy_from_slice(&strf_height.to_le_bytes());
    strf[12..14].copy_from_slice(&1u16.to_le_bytes()); // biPlanes
    strf[14..16].copy_from_slice(&24u16.to_le_bytes()); // biBitCount
    strf[16..20].copy_from_slice(b"XVID"); // biCompression

    let strl = riff_list(
        b"strl",
        &[riff_chunk(b"strh", &strh), riff_chunk(b"strf", &strf)].concat(),
    );
    let hdrl = riff_list(b"hdrl", &[riff_chunk(b"avih", &avih), strl].concat());
    let movi = riff_list(b"movi", &[]);
    let body = [&b"AVI "[..], &hdrl[..], &movi[..]].concat();

    let mut out = Vec::with_capacity(8 + body.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

pub(crate) fn minimal_avi(width: u32, height: u32) -> Vec<u8> {
    build_avi(width, height, width as i32, height as i32)
}

/// `avih` claims no size, forcing the fallback to the stream format header.
/// The negative height is the common bottom-up/top-down encoding quirk.
pub(crate) fn minimal_avi_zeroed_main_header(width: u32, height: u32) -> Vec<u8> {
    build_avi(0, 0, width as i32, -(height as i32))
}
