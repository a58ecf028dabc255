use tracing::{info, warn};

use super::error::{SinkError, StoreError};
use super::journey::StoredJourney;
use super::store::Store;

/// Id the topic assigns to an accepted message. Receiving one is the acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId(pub String);

/// Somewhere journeys are delivered to, at least once.
pub trait MessageSink {
    fn publish(&mut self, payload: &[u8]) -> Result<MessageId, SinkError>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub published: usize,
    pub failed: usize,
}

pub fn encode_message(journey: &StoredJourney) -> Result<Vec<u8>, SinkError> {
    Ok(serde_json::to_vec(journey)?)
}

/// Sends every unprocessed journey to `sink` one at a time and marks each processed
/// once acknowledged. Failures leave the journey unprocessed for the next run.
pub fn publish_unprocessed<S: MessageSink>(
    store: &Store,
    sink: &mut S,
) -> Result<PublishReport, StoreError> {
    let pending = store.unprocessed()?;
    let mut report = PublishReport::default();

    for journey in &pending {
        let acknowledged = encode_message(journey).and_then(|payload| sink.publish(&payload));
        let message_id = match acknowledged {
            Ok(message_id) => message_id,
            Err(e) => {
                warn!(id = journey.id, error = %e, "error publishing journey");
                report.failed += 1;
                continue;
            }
        };

        if let Err(e) = store.mark_processed(journey.id) {
            warn!(id = journey.id, error = %e, "error updating journey");
            report.failed += 1;
            continue;
        }
        info!(id = journey.id, message_id = %message_id.0, "journey published");
        report.published += 1;
    }

    Ok(report)
}
