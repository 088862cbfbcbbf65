use std::io::Read;

use super::{
    AnalyzeError, AudioTrackMeta, ContainerFormat, MediaMetadata, TrackMeta, VideoTrackMeta,
};

/// `tkhd` stores width and height as 16.16 fixed point
fn fixed_point_to_int(value: u32) -> i64 {
    i64::from(value >> 16)
}

pub(super) fn parse(reader: &mut impl Read) -> Result<MediaMetadata, AnalyzeError> {
    let context = mp4parse::read_mp4(reader).map_err(|err| AnalyzeError::Parse {
        container: ContainerFormat::Mp4,
        reason: format!("{:?}", err),
    })?;
    let mut tracks = Vec::default();
    for track in &context.tracks {
        match track.track_type {
            mp4parse::TrackType::Video => {
                let tkhd = track.tkhd.as_ref();
                tracks.push(TrackMeta::Video(VideoTrackMeta {
                    codec: None,
                    resolution_x: tkhd.map(|tkhd| fixed_point_to_int(tkhd.width)),
                    resolution_y: tkhd.map(|tkhd| fixed_point_to_int(tkhd.height)),
                }));
            }
            mp4parse::TrackType::Audio => {
                tracks.push(TrackMeta::Audio(AudioTrackMeta::default()));
            }
            _ => {}
        }
    }
    Ok(MediaMetadata {
        container: ContainerFormat::Mp4,
        duration: None,
        tracks,
    })
}
