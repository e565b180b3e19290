pub mod bus;
pub mod config;
pub mod engine;
pub mod fixtures;

pub use config::Config;
pub use config::LogLevel;
pub use engine::ButtonEvent;
pub use engine::Engine;
pub use engine::EngineSettings;
pub use fixtures::FixtureControl;
pub use fixtures::FixtureId;
