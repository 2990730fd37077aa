use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Result, ZoomError};
use crate::oauth::OAuthClient;
use crate::tokens::{valid_access_token, TokenStore};

/// Payload of `recording.transcript_completed`.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptPayload {
    pub object: MeetingRecording,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeetingRecording {
    pub id: serde_json::Value,
    pub host_id: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub recording_files: Vec<RecordingFile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordingFile {
    #[serde(default)]
    pub recording_type: String,
    pub download_url: String,
    #[serde(default)]
    pub file_type: String,
}

/// Pick the transcript out of the recording file list.
pub fn find_transcript_file(files: &[RecordingFile]) -> Option<&RecordingFile> {
    files.iter().find(|f| f.recording_type == "audio_transcript")
}

/// Handle a completed transcript: resolve the host's access token
/// (refreshing if needed) and download the transcript text.
///
/// A payload without a transcript file is acknowledged with nothing to do;
/// a host that never completed OAuth is an error for this event only.
pub async fn handle_transcript_completed(
    payload: &TranscriptPayload,
    store: &TokenStore,
    oauth: &OAuthClient,
) -> Result<Option<String>> {
    let object = &payload.object;
    info!(
        meeting = %object.id,
        topic = %object.topic,
        files = object.recording_files.len(),
        "transcript completed"
    );

    let Some(file) = find_transcript_file(&object.recording_files) else {
        warn!(meeting = %object.id, "no transcript file in payload");
        return Ok(None);
    };

    let access_token = valid_access_token(store, oauth, &object.host_id).await?;

    let resp = reqwest::Client::new()
        .get(&file.download_url)
        .bearer_auth(&access_token)
        .send()
        .await?;

    let status = resp.status().as_u16();
    if !resp.status().is_success() {
        let text = resp.text().await.unwrap_or_default();
        warn!(status, meeting = %object.id, "transcript download failed");
        return Err(ZoomError::Api {
            status,
            message: text,
        });
    }

    let transcript = resp.text().await?;
    info!(
        meeting = %object.id,
        bytes = transcript.len(),
        "transcript downloaded"
    );
    Ok(Some(transcript))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(recording_type: &str) -> RecordingFile {
        RecordingFile {
            recording_type: recording_type.to_string(),
            download_url: "https://zoom.us/rec/x".to_string(),
            file_type: "TRANSCRIPT".to_string(),
        }
    }

    #[test]
    fn finds_the_audio_transcript_among_recordings() {
        let files = vec![file("shared_screen_with_speaker_view"), file("audio_transcript")];
        let found = find_transcript_file(&files).unwrap();
        assert_eq!(found.recording_type, "audio_transcript");
    }

    #[test]
    fn no_transcript_file_yields_none() {
        let files = vec![file("shared_screen_with_speaker_view")];
        assert!(find_transcript_file(&files).is_none());
    }
}
