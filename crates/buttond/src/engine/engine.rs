use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;

use super::event::ButtonEvent;
use super::router::EventRouter;
use super::zones::FRONT_DOOR_AUTO_OFF;
use super::zones::ZoneMachines;
use crate::fixtures::FixtureControl;

/// Channel types for button events flowing into the engine
pub type ButtonEventSender = mpsc::Sender<ButtonEvent>;
pub type ButtonEventReceiver = mpsc::Receiver<ButtonEvent>;

/// Capacity for the ingest→engine event channel
/// Provides backpressure while a slow fixture service holds up a handler
const EVENT_CHANNEL_SIZE: usize = 1024;

/// Construction-time settings of the engine
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Delay before the front door light is switched off again
    pub auto_off_delay: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            auto_off_delay: FRONT_DOOR_AUTO_OFF,
        }
    }
}

impl From<&crate::config::Config> for EngineSettings {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            auto_off_delay: config.front_door.auto_off_delay(),
        }
    }
}

/// buttond engine
///
/// Owns the zone state machines and feeds them button events, one at a time. A handler
/// runs to completion, remote calls included, before the next event is received.
pub struct Engine<C> {
    router: EventRouter<C>,

    /// Receive button events from the ingestor
    event_rx: ButtonEventReceiver,

    /// Kept to hand out senders; dropped when the engine starts running
    event_tx: ButtonEventSender,
}

impl<C: FixtureControl + 'static> Engine<C> {
    /// Create a new Engine instance
    pub fn new(client: Arc<C>, settings: EngineSettings) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_SIZE);
        let zones = ZoneMachines::new(client, settings.auto_off_delay);
        Self {
            router: EventRouter::new(zones),
            event_rx,
            event_tx,
        }
    }

    /// Sender for ingestors to deliver decoded button events
    pub fn sender(&self) -> ButtonEventSender {
        self.event_tx.clone()
    }

    /// Run the engine's main event loop
    ///
    /// Returns once every sender is gone and the queue is drained.
    pub async fn run(self) {
        let Engine {
            mut router,
            mut event_rx,
            event_tx,
        } = self;
        drop(event_tx);

        info!("Engine starting");

        while let Some(event) = event_rx.recv().await {
            router.route(&event).await;
        }

        info!("Engine shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Call;
    use crate::fixtures::FixtureId;
    use crate::fixtures::MockFixtureControl;

    #[tokio::test]
    async fn test_events_are_handled_in_order() {
        let mock = Arc::new(MockFixtureControl::new());
        let engine = Engine::new(mock.clone(), EngineSettings::default());
        let tx = engine.sender();

        tx.send(ButtonEvent::down("button-glassdoor-left"))
            .await
            .unwrap();
        tx.send(ButtonEvent::down("button-unknown")).await.unwrap();
        tx.send(ButtonEvent::down("button-glassdoor-left"))
            .await
            .unwrap();
        tx.send(ButtonEvent::long_press("button-glassdoor-left", 1))
            .await
            .unwrap();
        drop(tx);

        engine.run().await;

        assert_eq!(
            mock.commands(),
            vec![
                Call::set(FixtureId::StringLights, "party"),
                Call::set(FixtureId::StringLights, "OFF"),
                Call::set(FixtureId::StringLights, "ON"),
            ]
        );
    }

    #[tokio::test]
    async fn test_survives_failing_service() {
        let mock = Arc::new(MockFixtureControl::new());
        mock.fail_commands_to(FixtureId::BedroomLight);
        let engine = Engine::new(mock.clone(), EngineSettings::default());
        let tx = engine.sender();

        for _ in 0..5 {
            tx.send(ButtonEvent::down("button-bedroom-left"))
                .await
                .unwrap();
        }
        tx.send(ButtonEvent::down("button-bedroom-right"))
            .await
            .unwrap();
        drop(tx);

        engine.run().await;

        assert_eq!(mock.calls().len(), 6);
        assert_eq!(mock.program_of(FixtureId::OutdoorCleaningLight), "ON");
    }

    #[test]
    fn test_settings_from_config() {
        let config: crate::config::Config = toml::from_str(
            r#"
            [bus]
            broker = "localhost"

            [fixtures]
            base_url = "http://localhost:3545"

            [front_door]
            auto_off_secs = 90
            "#,
        )
        .unwrap();

        let settings = EngineSettings::from(&config);
        assert_eq!(settings.auto_off_delay, Duration::from_secs(90));
    }
}
