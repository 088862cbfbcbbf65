use std::fs::File;

use super::{
    AnalyzeError, AudioTrackMeta, ContainerFormat, MediaMetadata, TrackMeta, VideoTrackMeta,
};

pub(super) fn parse(file: File) -> Result<MediaMetadata, AnalyzeError> {
    let mkv = matroska::Matroska::open(file).map_err(|err| AnalyzeError::Parse {
        container: ContainerFormat::Matroska,
        reason: format!("{}", err),
    })?;
    let mut tracks = Vec::default();
    for track in &mkv.tracks {
        match track.tracktype {
            matroska::Tracktype::Video => {
                let settings = match &track.settings {
                    matroska::Settings::Video(video) => Some(video),
                    _ => None,
                };
                tracks.push(TrackMeta::Video(VideoTrackMeta {
                    codec: Some(track.codec_id.clone()),
                    resolution_x: settings.map(|video| video.pixel_width as i64),
                    resolution_y: settings.map(|video| video.pixel_height as i64),
                }));
            }
            matroska::Tracktype::Audio => {
                let channels = match &track.settings {
                    matroska::Settings::Audio(audio) => Some(audio.channels as i64),
                    _ => None,
                };
                tracks.push(TrackMeta::Audio(AudioTrackMeta {
                    codec: Some(track.codec_id.clone()),
                    channels,
                }));
            }
            _ => {}
        }
    }
    Ok(MediaMetadata {
        container: ContainerFormat::Matroska,
        duration: mkv.info.duration,
        tracks,
    })
}
