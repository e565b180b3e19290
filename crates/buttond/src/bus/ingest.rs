use tracing::debug;
use tracing::info;

use super::BusError;
use super::MqttClient;
use super::decode_envelope;
use crate::engine::ButtonEventSender;

/// Feeds button events from the bus into the engine.
pub struct EventIngestor<C: MqttClient> {
    client: C,
    topic: String,
    to_engine: ButtonEventSender,
}

impl<C: MqttClient> EventIngestor<C> {
    pub fn new(client: C, topic: impl Into<String>, to_engine: ButtonEventSender) -> Self {
        Self {
            client,
            topic: topic.into(),
            to_engine,
        }
    }

    /// Subscribe and forward events until the engine or the client goes away.
    pub async fn run(mut self) -> Result<(), BusError> {
        self.client.connect().await?;

        info!("Subscribing to {}", self.topic);
        self.client.subscribe(&self.topic).await?;

        while let Some(msg) = self.client.poll_message().await {
            let event = match decode_envelope(&msg.payload) {
                Ok(Some(event)) => event,
                Ok(None) => {
                    debug!("Dropping non-button event on {}", msg.topic);
                    continue;
                }
                Err(e) => {
                    debug!("Dropping message on {}: {}", msg.topic, e);
                    continue;
                }
            };

            if self.to_engine.send(event).await.is_err() {
                info!("Engine stopped, ending ingest");
                break;
            }
        }

        Ok(())
    }
}
