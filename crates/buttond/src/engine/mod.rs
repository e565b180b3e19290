mod engine;
mod event;
mod router;
pub mod scene;
mod timer;
mod zones;

pub use engine::ButtonEventReceiver;
pub use engine::ButtonEventSender;
pub use engine::Engine;
pub use engine::EngineSettings;
pub use event::ButtonEvent;
pub use event::ButtonEventKind;
pub use event::Trigger;
pub use router::EventRouter;
pub use router::zone_of;
pub use timer::DeferredActionTimer;
pub use zones::FRONT_DOOR_AUTO_OFF;
pub use zones::FrontDoorState;
pub use zones::Side;
pub use zones::Zone;
pub use zones::ZoneMachines;
