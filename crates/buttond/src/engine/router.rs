use strum::IntoEnumIterator;
use tracing::debug;
use tracing::warn;

use super::event::ButtonEvent;
use super::zones::Zone;
use super::zones::ZoneMachines;
use crate::fixtures::FixtureControl;

/// Sends each button event to the zone that owns the button.
pub struct EventRouter<C> {
    zones: ZoneMachines<C>,
}

/// Zone owning the button called `alias`.
pub fn zone_of(alias: &str) -> Option<Zone> {
    Zone::iter().find(|zone| zone.buttons().contains(&alias))
}

impl<C: FixtureControl + 'static> EventRouter<C> {
    pub fn new(zones: ZoneMachines<C>) -> Self {
        Self { zones }
    }

    pub fn zones(&self) -> &ZoneMachines<C> {
        &self.zones
    }

    /// Hand `event` to its zone and wait for the zone to finish with it.
    ///
    /// Events from unknown buttons are dropped. Failures of the zone handler are logged
    /// and end there. Returns the zone the event went to.
    pub async fn route(&mut self, event: &ButtonEvent) -> Option<Zone> {
        let Some(zone) = zone_of(&event.alias) else {
            debug!("Ignoring event from unknown button {}", event.alias);
            return None;
        };

        debug!("[{}] {}: {:?}", zone, event.alias, event.kind);
        if let Err(e) = self.zones.handle(zone, event).await {
            warn!(
                "[{}] Failed to handle {:?} from {}: {}",
                zone, event.kind, event.alias, e
            );
        }

        Some(zone)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::zones::FRONT_DOOR_AUTO_OFF;
    use crate::fixtures::Call;
    use crate::fixtures::FixtureId;
    use crate::fixtures::MockFixtureControl;

    fn router() -> (EventRouter<MockFixtureControl>, Arc<MockFixtureControl>) {
        let mock = Arc::new(MockFixtureControl::new());
        let zones = ZoneMachines::new(mock.clone(), FRONT_DOOR_AUTO_OFF);
        (EventRouter::new(zones), mock)
    }

    #[test]
    fn test_button_table() {
        let all: Vec<&str> = Zone::iter().flat_map(|zone| zone.buttons()).collect();
        assert_eq!(all.len(), 8);

        assert_eq!(zone_of("button-front-door-right"), Some(Zone::FrontDoor));
        assert_eq!(zone_of("button-kitchen-left"), Some(Zone::Kitchen));
        assert_eq!(zone_of("button-bedroom-right"), Some(Zone::Bedroom));
        assert_eq!(zone_of("button-glassdoor-left"), Some(Zone::GlassDoor));
        assert_eq!(zone_of("button-glass-door-left"), None);
        assert_eq!(zone_of(""), None);
    }

    #[tokio::test]
    async fn test_unknown_button_is_ignored() {
        let (mut router, mock) = router();

        let zone = router.route(&ButtonEvent::down("button-garage-left")).await;
        assert_eq!(zone, None);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_routes_to_owning_zone() {
        let (mut router, mock) = router();

        let zone = router.route(&ButtonEvent::down("button-bedroom-right")).await;
        assert_eq!(zone, Some(Zone::Bedroom));
        assert_eq!(
            mock.calls(),
            vec![Call::CycleProgram(FixtureId::OutdoorCleaningLight)]
        );
    }

    #[tokio::test]
    async fn test_failures_do_not_escape() {
        let (mut router, mock) = router();
        mock.fail_status_of(FixtureId::StringLights);

        let zone = router.route(&ButtonEvent::down("button-glassdoor-left")).await;
        assert_eq!(zone, Some(Zone::GlassDoor));

        // The next press is the retry.
        mock.recover(FixtureId::StringLights);
        router.route(&ButtonEvent::down("button-glassdoor-left")).await;
        assert_eq!(mock.program_of(FixtureId::StringLights), "party");
    }

    #[tokio::test]
    async fn test_repeated_press_toggles_back() {
        let (mut router, mock) = router();

        for alias in [
            "button-front-door-left",
            "button-kitchen-left",
            "button-kitchen-right",
            "button-bedroom-left",
            "button-glassdoor-left",
            "button-glassdoor-right",
        ] {
            router.route(&ButtonEvent::down(alias)).await;
        }
        let lit = [
            FixtureId::ToiletRgbw,
            FixtureId::KitchenRgbw,
            FixtureId::KitchenSpots,
            FixtureId::RedGreenPartyLight,
            FixtureId::BedroomLight,
            FixtureId::StringLights,
            FixtureId::Spoider,
        ];
        for fixture in lit {
            assert_ne!(mock.program_of(fixture), "OFF", "{} should be on", fixture);
        }

        for alias in [
            "button-front-door-left",
            "button-kitchen-left",
            "button-bedroom-left",
            "button-glassdoor-left",
            "button-glassdoor-right",
        ] {
            router.route(&ButtonEvent::down(alias)).await;
        }
        for fixture in [
            FixtureId::ToiletRgbw,
            FixtureId::KitchenRgbw,
            FixtureId::KitchenSpots,
            FixtureId::BedroomLight,
            FixtureId::StringLights,
            FixtureId::Spoider,
        ] {
            assert_eq!(mock.program_of(fixture), "OFF", "{} should be off", fixture);
        }
    }
}
