#[cfg(test)]
use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use rumqttc::AsyncClient;
use rumqttc::Event;
use rumqttc::EventLoop;
use rumqttc::MqttOptions;
use rumqttc::Packet;
use rumqttc::QoS;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::config::BusConfig;

/// A publish received on one of the subscribed topics.
#[derive(Debug, Clone)]
pub struct MqttMessage {
    pub topic: String,
    pub payload: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("not connected to the broker")]
    NotConnected,

    #[error("MQTT request failed: {0}")]
    Client(#[from] rumqttc::ClientError),
}

/// The subset of an MQTT client the ingestor needs.
#[async_trait]
pub trait MqttClient: Send {
    async fn connect(&mut self) -> Result<(), BusError>;

    /// Subscribe to a topic filter. Only valid after [`MqttClient::connect`].
    async fn subscribe(&mut self, topic: &str) -> Result<(), BusError>;

    /// Next received publish, or `None` once no more will arrive.
    async fn poll_message(&mut self) -> Option<MqttMessage>;
}

/// In-memory client for tests. Queued messages are delivered in order, then the client
/// reports that it has stopped.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockMqttClient {
    pub queued: VecDeque<MqttMessage>,
    pub subscriptions: Vec<String>,
    pub connected: bool,
}

#[cfg(test)]
#[async_trait]
impl MqttClient for MockMqttClient {
    async fn connect(&mut self) -> Result<(), BusError> {
        self.connected = true;
        Ok(())
    }

    async fn subscribe(&mut self, topic: &str) -> Result<(), BusError> {
        if !self.connected {
            return Err(BusError::NotConnected);
        }
        self.subscriptions.push(topic.to_string());
        Ok(())
    }

    async fn poll_message(&mut self) -> Option<MqttMessage> {
        self.queued.pop_front()
    }
}

#[cfg(test)]
impl MockMqttClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_message(&mut self, topic: &str, payload: &[u8]) {
        self.queued.push_back(MqttMessage {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        });
    }
}

/// Publishes buffered between the rumqttc event loop and the ingestor.
const INBOX_SIZE: usize = 256;

/// Connection to the broker carrying the button events, built on rumqttc.
pub struct RumqttcClient {
    options: MqttOptions,
    /// Set by `connect`.
    session: Option<Session>,
}

struct Session {
    handle: AsyncClient,
    inbox: mpsc::Receiver<MqttMessage>,
    pump: JoinHandle<()>,
}

impl RumqttcClient {
    pub fn new(config: &BusConfig) -> Self {
        let mut options =
            MqttOptions::new(config.client_id.clone(), config.broker.clone(), config.port);
        options.set_keep_alive(Duration::from_secs(30));

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            options.set_credentials(username, password);
        }

        Self {
            options,
            session: None,
        }
    }
}

/// Drive the rumqttc event loop, forwarding publishes to `inbox`.
///
/// rumqttc reconnects by itself as long as the loop keeps being polled. Stops once the
/// receiving side is gone.
async fn pump(mut event_loop: EventLoop, inbox: mpsc::Sender<MqttMessage>) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let message = MqttMessage {
                    topic: publish.topic.clone(),
                    payload: publish.payload.to_vec(),
                };
                if inbox.send(message).await.is_err() {
                    break;
                }
            }
            Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                info!("Connected to broker ({:?})", ack.code);
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Broker connection error: {}", e);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
        }
    }
    debug!("Broker event loop stopped");
}

#[async_trait]
impl MqttClient for RumqttcClient {
    async fn connect(&mut self) -> Result<(), BusError> {
        let (handle, event_loop) = AsyncClient::new(self.options.clone(), 10);
        let (tx, inbox) = mpsc::channel(INBOX_SIZE);

        if let Some(old) = self.session.replace(Session {
            handle,
            inbox,
            pump: tokio::spawn(pump(event_loop, tx)),
        }) {
            old.pump.abort();
        }

        Ok(())
    }

    async fn subscribe(&mut self, topic: &str) -> Result<(), BusError> {
        let session = self.session.as_ref().ok_or(BusError::NotConnected)?;
        session.handle.subscribe(topic, QoS::AtMostOnce).await?;
        info!("Subscribed to {}", topic);
        Ok(())
    }

    async fn poll_message(&mut self) -> Option<MqttMessage> {
        self.session.as_mut()?.inbox.recv().await
    }
}

impl Drop for RumqttcClient {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.pump.abort();
        }
    }
}
