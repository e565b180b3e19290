//! Named batches of fixture directives.

use tracing::info;

use crate::fixtures::ControlError;
use crate::fixtures::FixtureControl;
use crate::fixtures::FixtureId;
use crate::fixtures::ProgramDirective;
use crate::fixtures::program;

/// An ordered list of fixture directives, applied one after the other.
#[derive(Debug, PartialEq, Eq)]
pub struct Scene {
    pub name: &'static str,
    pub steps: &'static [(FixtureId, ProgramDirective)],
}

const DAY_NOISE: ProgramDirective =
    ProgramDirective::with_parameters(program::NOISE, &[(program::BRIGHTNESS, program::LEVEL_DAY)]);

/// Everyday lighting in the kitchen, toilet, bedroom and living room.
pub static BASIC_ON: Scene = Scene {
    name: "basic-on",
    steps: &[
        (FixtureId::KitchenRgbw, DAY_NOISE),
        (FixtureId::KitchenSpots, ProgramDirective::new(program::ON)),
        (FixtureId::ToiletRgbw, DAY_NOISE),
        (FixtureId::Spoider, ProgramDirective::new(program::BRIGHT)),
        (FixtureId::BedroomLight, ProgramDirective::new(program::ON)),
        (FixtureId::StringLights, ProgramDirective::new(program::ON)),
    ],
};

/// Everything indoors off. The front door and outdoor lights are left alone.
pub static BASIC_OFF: Scene = Scene {
    name: "basic-off",
    steps: &[
        (FixtureId::Blacklight, ProgramDirective::new(program::OFF)),
        (FixtureId::Spoider, ProgramDirective::new(program::OFF)),
        (FixtureId::KitchenRgbw, ProgramDirective::new(program::OFF)),
        (FixtureId::KitchenSpots, ProgramDirective::new(program::OFF)),
        (FixtureId::ToiletRgbw, ProgramDirective::new(program::OFF)),
        (FixtureId::RedGreenPartyLight, ProgramDirective::new(program::OFF)),
        (FixtureId::BedroomLight, ProgramDirective::new(program::OFF)),
        (FixtureId::StringLights, ProgramDirective::new(program::OFF)),
    ],
};

static SCENES: &[&Scene] = &[&BASIC_ON, &BASIC_OFF];

/// Look up a scene by name.
pub fn scene(name: &str) -> Option<&'static Scene> {
    SCENES.iter().copied().find(|scene| scene.name == name)
}

impl Scene {
    /// Apply every step in declaration order.
    ///
    /// Parameters of a step are set before its program is activated. The first failing
    /// call stops the scene; steps already applied stay applied.
    pub async fn apply<C>(&self, client: &C) -> Result<(), ControlError>
    where
        C: FixtureControl + ?Sized,
    {
        info!("Applying scene {}", self.name);

        for (fixture, directive) in self.steps {
            for (parameter, level) in directive.parameters {
                client
                    .set_discrete_parameter(*fixture, directive.program, parameter, level)
                    .await?;
            }
            client.set_program(*fixture, directive.program).await?;
        }

        Ok(())
    }
}
