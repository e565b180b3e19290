use strum::AsRefStr;
use strum::Display;
use strum::EnumIter;
use strum::EnumString;

/// Program names understood by the fixture service.
///
/// `ON`, `OFF`, `MANUAL` and `EXTERNAL` are built into every fixture. The rest are
/// fixture-specific and opaque to the controller.
pub mod program {
    pub const ON: &str = "ON";
    pub const OFF: &str = "OFF";
    pub const MANUAL: &str = "MANUAL";
    pub const EXTERNAL: &str = "EXTERNAL";

    pub const NOISE: &str = "noise";
    pub const STROBO: &str = "strobo";
    pub const PARTY: &str = "party";
    pub const BRIGHT: &str = "bright";

    /// Discrete `brightness` parameter of the `noise` program.
    pub const BRIGHTNESS: &str = "brightness";
    pub const LEVEL_DAY: &str = "day";
    pub const LEVEL_NIGHT: &str = "night";
}

/// A controllable fixture, rendered as the name the fixture service uses for it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, AsRefStr, EnumString, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum FixtureId {
    KitchenRgbw,
    KitchenSpots,
    /// RGBW strip in the toilet.
    #[strum(serialize = "klo_rgbw")]
    ToiletRgbw,
    Spoider,
    #[strum(serialize = "front_door")]
    FrontDoorLight,
    Blacklight,
    BedroomLight,
    RedGreenPartyLight,
    /// Outdoor cleaning light.
    #[strum(serialize = "putzlicht")]
    OutdoorCleaningLight,
    #[strum(serialize = "lichterketten")]
    StringLights,
}

/// A program to activate, with discrete parameter levels to set on it first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramDirective {
    pub program: &'static str,
    /// `(parameter, level)` pairs, applied in order before the program is activated.
    pub parameters: &'static [(&'static str, &'static str)],
}

impl ProgramDirective {
    pub const fn new(program: &'static str) -> Self {
        Self {
            program,
            parameters: &[],
        }
    }

    pub const fn with_parameters(
        program: &'static str,
        parameters: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            program,
            parameters,
        }
    }
}
