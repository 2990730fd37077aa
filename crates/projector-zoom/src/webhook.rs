use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::error::{Result, ZoomError};
use crate::transcript::TranscriptPayload;

type HmacSha256 = Hmac<Sha256>;

/// Raw webhook body: an event name plus an event-shaped payload.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEnvelope {
    pub event: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Closed classification of inbound Zoom events, fixed once at the
/// boundary. Anything unrecognized lands in `Unknown` and is acknowledged
/// without action.
#[derive(Debug, Clone)]
pub enum ZoomEvent {
    UrlValidation { plain_token: String },
    RecordingTranscriptCompleted(Box<TranscriptPayload>),
    MeetingEnded { meeting: serde_json::Value },
    Unknown { event: String },
}

impl WebhookEnvelope {
    pub fn classify(self) -> ZoomEvent {
        match self.event.as_str() {
            "endpoint.url_validation" => {
                let plain_token = self
                    .payload
                    .get("plainToken")
                    .and_then(|t| t.as_str())
                    .unwrap_or_default()
                    .to_string();
                ZoomEvent::UrlValidation { plain_token }
            }
            "recording.transcript_completed" => {
                match serde_json::from_value::<TranscriptPayload>(self.payload) {
                    Ok(payload) => ZoomEvent::RecordingTranscriptCompleted(Box::new(payload)),
                    Err(_) => ZoomEvent::Unknown { event: self.event },
                }
            }
            "meeting.ended" => ZoomEvent::MeetingEnded {
                meeting: self.payload.get("object").cloned().unwrap_or_default(),
            },
            _ => ZoomEvent::Unknown { event: self.event },
        }
    }
}

/// Answer to `endpoint.url_validation` — must go back within the
/// platform's short deadline.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    pub plain_token: String,
    pub encrypted_token: String,
}

/// Build the validation answer: `encryptedToken` is the hex HMAC-SHA256 of
/// the plain token under the webhook secret. A missing secret is a server
/// configuration error, never a pass.
pub fn validation_response(secret: Option<&str>, plain_token: &str) -> Result<ValidationResponse> {
    let secret = secret.ok_or_else(|| ZoomError::Config("webhook secret not set".into()))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| ZoomError::Config("invalid webhook secret".into()))?;
    mac.update(plain_token.as_bytes());

    Ok(ValidationResponse {
        plain_token: plain_token.to_string(),
        encrypted_token: hex::encode(mac.finalize().into_bytes()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(json: &str) -> WebhookEnvelope {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn url_validation_extracts_plain_token() {
        let event = envelope(
            r#"{"event":"endpoint.url_validation","payload":{"plainToken":"abc123"}}"#,
        )
        .classify();
        match event {
            ZoomEvent::UrlValidation { plain_token } => assert_eq!(plain_token, "abc123"),
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn transcript_completed_parses_payload() {
        let event = envelope(
            r#"{"event":"recording.transcript_completed","payload":{"object":{
                "id":"m1","host_id":"u1","account_id":"a1","topic":"standup",
                "recording_files":[{"recording_type":"audio_transcript",
                    "download_url":"https://zoom.us/rec/t.vtt","file_type":"TRANSCRIPT"}]
            }}}"#,
        )
        .classify();
        match event {
            ZoomEvent::RecordingTranscriptCompleted(payload) => {
                assert_eq!(payload.object.id, "m1");
                assert_eq!(payload.object.recording_files.len(), 1);
            }
            other => panic!("unexpected classification: {other:?}"),
        }
    }

    #[test]
    fn unknown_events_stay_unknown() {
        let event = envelope(r#"{"event":"meeting.started","payload":{}}"#).classify();
        assert!(matches!(event, ZoomEvent::Unknown { event } if event == "meeting.started"));
    }

    #[test]
    fn validation_response_is_hmac_hex_of_plain_token() {
        let resp = validation_response(Some("top-secret"), "tok").unwrap();
        assert_eq!(resp.plain_token, "tok");

        let mut mac = HmacSha256::new_from_slice(b"top-secret").unwrap();
        mac.update(b"tok");
        assert_eq!(resp.encrypted_token, hex::encode(mac.finalize().into_bytes()));
    }

    #[test]
    fn validation_without_secret_fails_closed() {
        assert!(matches!(
            validation_response(None, "tok"),
            Err(ZoomError::Config(_))
        ));
    }

    #[test]
    fn validation_response_serializes_camel_case() {
        let resp = validation_response(Some("s"), "tok").unwrap();
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("plainToken").is_some());
        assert!(json.get("encryptedToken").is_some());
    }
}
