//! Per-zone button logic.
//!
//! Every zone has a left and a right button. Zones act on two patterns only, a button
//! going down ([`Trigger::Press`]) and a one second hold ([`Trigger::Hold`]). Ups, clicks
//! and longer holds are ignored.
//!
//! Apart from the front door, zones keep no state of their own. Where a press toggles
//! something, the current fixture state is read from the fixture service first. Any failed
//! call ends the handler; calls already made are not undone.

use std::sync::Arc;
use std::time::Duration;

use strum::Display;
use strum::EnumIter;
use tracing::info;
use tracing::warn;

use super::event::ButtonEvent;
use super::event::Trigger;
use super::scene;
use super::timer::DeferredActionTimer;
use crate::fixtures::ControlError;
use crate::fixtures::FixtureControl;
use crate::fixtures::FixtureId;
use crate::fixtures::program;

/// Default delay before the front door light switches itself off again.
pub const FRONT_DOOR_AUTO_OFF: Duration = Duration::from_secs(30 * 60);

/// A pair of buttons mounted together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Zone {
    FrontDoor,
    Kitchen,
    Bedroom,
    GlassDoor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Zone {
    /// Aliases of the zone's buttons, left then right.
    pub const fn buttons(self) -> [&'static str; 2] {
        match self {
            Zone::FrontDoor => ["button-front-door-left", "button-front-door-right"],
            Zone::Kitchen => ["button-kitchen-left", "button-kitchen-right"],
            Zone::Bedroom => ["button-bedroom-left", "button-bedroom-right"],
            Zone::GlassDoor => ["button-glassdoor-left", "button-glassdoor-right"],
        }
    }

    pub fn side_of(self, alias: &str) -> Option<Side> {
        let [left, right] = self.buttons();
        if alias == left {
            Some(Side::Left)
        } else if alias == right {
            Some(Side::Right)
        } else {
            None
        }
    }
}

/// What a press on the kitchen's right button does to the blacklight and the red/green
/// party light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PartyStep {
    /// Both off.
    AllOff,
    /// Party light on, blacklight untouched.
    PartyOn,
    /// Blacklight on, party light off.
    SwapToBlacklight,
}

impl PartyStep {
    fn from_state(blacklight_on: bool, party_on: bool) -> Self {
        match (blacklight_on, party_on) {
            (true, true) => PartyStep::AllOff,
            (true, false) => PartyStep::PartyOn,
            (false, true) => PartyStep::SwapToBlacklight,
            (false, false) => PartyStep::PartyOn,
        }
    }
}

/// Front door state kept by the controller between events.
#[derive(Debug, Default)]
pub struct FrontDoorState {
    /// Whether the basic scene was last switched on from here. The fixture service may
    /// disagree; this is never reconciled.
    pub basic_scene_active: bool,
}

/// The state machines of all four zones.
pub struct ZoneMachines<C> {
    client: Arc<C>,
    front_door: FrontDoorState,
    /// Pending auto-off actions, keyed by the zone that scheduled them.
    timers: DeferredActionTimer<Zone>,
    auto_off_delay: Duration,
}

impl<C: FixtureControl + 'static> ZoneMachines<C> {
    pub fn new(client: Arc<C>, auto_off_delay: Duration) -> Self {
        Self {
            client,
            front_door: FrontDoorState::default(),
            timers: DeferredActionTimer::new(),
            auto_off_delay,
        }
    }

    pub fn front_door(&self) -> &FrontDoorState {
        &self.front_door
    }

    /// Whether the front door light is waiting to be switched off.
    pub fn auto_off_pending(&self) -> bool {
        self.timers.is_pending(&Zone::FrontDoor)
    }

    /// Handle `event` from one of `zone`'s buttons.
    pub async fn handle(&mut self, zone: Zone, event: &ButtonEvent) -> Result<(), ControlError> {
        let Some(side) = zone.side_of(&event.alias) else {
            return Ok(());
        };
        let Some(trigger) = event.trigger() else {
            return Ok(());
        };

        match zone {
            Zone::FrontDoor => self.handle_front_door(side, trigger).await,
            Zone::Kitchen => self.handle_kitchen(side, trigger).await,
            Zone::Bedroom => self.handle_bedroom(side, trigger).await,
            Zone::GlassDoor => self.handle_glass_door(side, trigger).await,
        }
    }

    async fn handle_front_door(&mut self, side: Side, trigger: Trigger) -> Result<(), ControlError> {
        let client = self.client.as_ref();

        match (side, trigger) {
            (Side::Left, Trigger::Press) => {
                if !client.is_off(FixtureId::ToiletRgbw).await? {
                    client.set_program(FixtureId::ToiletRgbw, program::OFF).await?;
                } else {
                    self.noise(FixtureId::ToiletRgbw, program::LEVEL_NIGHT).await?;
                }
            }
            (Side::Left, Trigger::Hold) => {
                self.noise(FixtureId::ToiletRgbw, program::LEVEL_DAY).await?;
            }
            (Side::Right, Trigger::Press) => {
                client.cycle_program(FixtureId::FrontDoorLight).await?;
                if !client.is_off(FixtureId::FrontDoorLight).await? {
                    info!("Setting front door turn-off timer");
                    self.schedule_front_door_off();
                } else if self.timers.cancel(&Zone::FrontDoor) {
                    info!("Canceling front door turn-off timer");
                }
            }
            (Side::Right, Trigger::Hold) => {
                if self.front_door.basic_scene_active {
                    scene::BASIC_OFF.apply(client).await?;
                    self.front_door.basic_scene_active = false;
                } else {
                    scene::BASIC_ON.apply(client).await?;
                    self.front_door.basic_scene_active = true;
                }
            }
        }

        Ok(())
    }

    async fn handle_kitchen(&self, side: Side, trigger: Trigger) -> Result<(), ControlError> {
        let client = self.client.as_ref();

        match (side, trigger) {
            (Side::Left, Trigger::Press) => {
                if !client.is_off(FixtureId::KitchenRgbw).await? {
                    client.set_program(FixtureId::KitchenRgbw, program::OFF).await?;
                    client.set_program(FixtureId::KitchenSpots, program::OFF).await?;
                } else {
                    self.noise(FixtureId::KitchenRgbw, program::LEVEL_NIGHT).await?;
                    client.set_program(FixtureId::KitchenSpots, program::ON).await?;
                }
            }
            (Side::Left, Trigger::Hold) => {
                self.noise(FixtureId::KitchenRgbw, program::LEVEL_DAY).await?;
                client.set_program(FixtureId::KitchenSpots, program::ON).await?;
            }
            (Side::Right, Trigger::Press) => {
                let blacklight_on = !client.is_off(FixtureId::Blacklight).await?;
                let party_on = !client.is_off(FixtureId::RedGreenPartyLight).await?;

                match PartyStep::from_state(blacklight_on, party_on) {
                    PartyStep::AllOff => {
                        client.set_program(FixtureId::Blacklight, program::OFF).await?;
                        client
                            .set_program(FixtureId::RedGreenPartyLight, program::OFF)
                            .await?;
                    }
                    PartyStep::PartyOn => {
                        client
                            .set_program(FixtureId::RedGreenPartyLight, program::ON)
                            .await?;
                    }
                    PartyStep::SwapToBlacklight => {
                        client.set_program(FixtureId::Blacklight, program::ON).await?;
                        client
                            .set_program(FixtureId::RedGreenPartyLight, program::OFF)
                            .await?;
                    }
                }
            }
            (Side::Right, Trigger::Hold) => {}
        }

        Ok(())
    }

    async fn handle_bedroom(&self, side: Side, trigger: Trigger) -> Result<(), ControlError> {
        if trigger != Trigger::Press {
            return Ok(());
        }

        let fixture = match side {
            Side::Left => FixtureId::BedroomLight,
            Side::Right => FixtureId::OutdoorCleaningLight,
        };
        self.client.cycle_program(fixture).await?;
        Ok(())
    }

    async fn handle_glass_door(&self, side: Side, trigger: Trigger) -> Result<(), ControlError> {
        let client = self.client.as_ref();

        match (side, trigger) {
            (Side::Left, Trigger::Press) => {
                if !client.is_off(FixtureId::StringLights).await? {
                    client.set_program(FixtureId::StringLights, program::OFF).await?;
                } else {
                    client.set_program(FixtureId::StringLights, program::PARTY).await?;
                }
            }
            (Side::Left, Trigger::Hold) => {
                client.set_program(FixtureId::StringLights, program::ON).await?;
            }
            (Side::Right, Trigger::Press) => {
                client.cycle_program(FixtureId::Spoider).await?;
            }
            (Side::Right, Trigger::Hold) => {}
        }

        Ok(())
    }

    /// Set the `noise` program's brightness, then activate it.
    async fn noise(&self, fixture: FixtureId, level: &str) -> Result<(), ControlError> {
        self.client
            .set_discrete_parameter(fixture, program::NOISE, program::BRIGHTNESS, level)
            .await?;
        self.client.set_program(fixture, program::NOISE).await
    }

    fn schedule_front_door_off(&self) {
        let client = self.client.clone();
        self.timers
            .schedule(Zone::FrontDoor, self.auto_off_delay, async move {
                info!("Front door turn-off timer expired");
                if let Err(e) = client
                    .set_program(FixtureId::FrontDoorLight, program::OFF)
                    .await
                {
                    warn!("Failed to switch off front door light: {}", e);
                }
            });
    }
}
