use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::config::PublishConfig;
use super::error::SinkError;
use super::publisher::{MessageId, MessageSink};

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize)]
struct PublishRequest {
    messages: [PubsubMessage; 1],
}

#[derive(Serialize)]
struct PubsubMessage {
    data: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    #[serde(default)]
    message_ids: Vec<String>,
}

/// Publishes to a Google Cloud Pub/Sub topic through its REST API, or to the local
/// emulator when `PUBSUB_EMULATOR_HOST` is set.
pub struct PubSubSink {
    client: Client,
    url: String,
    access_token: Option<String>,
}

impl PubSubSink {
    pub fn new(config: &PublishConfig) -> Result<Self, SinkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(PubSubSink {
            client,
            url: publish_url(config),
            access_token: config.access_token.clone(),
        })
    }
}

pub fn publish_url(config: &PublishConfig) -> String {
    format!(
        "{}/v1/projects/{}/topics/{}:publish",
        config.endpoint, config.project_id, config.topic
    )
}

impl MessageSink for PubSubSink {
    fn publish(&mut self, payload: &[u8]) -> Result<MessageId, SinkError> {
        let body = PublishRequest {
            messages: [PubsubMessage {
                data: STANDARD.encode(payload),
            }],
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let parsed: PublishResponse = response.json()?;
        parsed
            .message_ids
            .into_iter()
            .next()
            .map(MessageId)
            .ok_or(SinkError::NoAcknowledgment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_url() {
        let config = PublishConfig {
            project_id: "travel-123".to_string(),
            topic: "journeys".to_string(),
            endpoint: "http://localhost:8085".to_string(),
            access_token: None,
        };
        assert_eq!(
            publish_url(&config),
            "http://localhost:8085/v1/projects/travel-123/topics/journeys:publish"
        );
    }

    #[test]
    fn test_request_body_is_base64() {
        let body = PublishRequest {
            messages: [PubsubMessage {
                data: STANDARD.encode(br#"{"id":1}"#),
            }],
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"messages":[{"data":"eyJpZCI6MX0="}]}"#
        );
    }

    #[test]
    fn test_response_without_ids() {
        let parsed: PublishResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.message_ids.is_empty());
        let parsed: PublishResponse =
            serde_json::from_str(r#"{"messageIds":["4211"]}"#).unwrap();
        assert_eq!(parsed.message_ids, vec!["4211"]);
    }
}
