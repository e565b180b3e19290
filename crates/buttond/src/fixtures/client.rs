use async_trait::async_trait;
use serde::Deserialize;

use super::ControlError;
use super::FixtureId;
use super::program;

/// Status document of a fixture as reported by the fixture service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FixtureStatus {
    /// Name of the currently selected program.
    pub selected_program: String,
}

impl FixtureStatus {
    pub fn is_off(&self) -> bool {
        self.selected_program == program::OFF
    }
}

/// Commands and queries against the fixture service.
///
/// Every call is one request/response exchange with the service. Nothing is cached, so
/// two consecutive `is_off` calls are two remote reads.
#[async_trait]
pub trait FixtureControl: Send + Sync {
    /// Activate `program` on `fixture`.
    async fn set_program(&self, fixture: FixtureId, program: &str) -> Result<(), ControlError>;

    /// Advance `fixture` to the next program of its cycle. The cycle order is owned by
    /// the service.
    async fn cycle_program(&self, fixture: FixtureId) -> Result<String, ControlError>;

    /// Set a discrete parameter of `program` on `fixture` to `level`.
    async fn set_discrete_parameter(
        &self,
        fixture: FixtureId,
        program: &str,
        parameter: &str,
        level: &str,
    ) -> Result<(), ControlError>;

    /// Advance a discrete parameter of `program` on `fixture` to its next level.
    async fn cycle_discrete_parameter(
        &self,
        fixture: FixtureId,
        program: &str,
        parameter: &str,
    ) -> Result<String, ControlError>;

    /// Fetch the current status of `fixture`.
    async fn fixture_status(&self, fixture: FixtureId) -> Result<FixtureStatus, ControlError>;

    /// Whether `fixture` currently runs the built-in `OFF` program.
    async fn is_off(&self, fixture: FixtureId) -> Result<bool, ControlError> {
        Ok(self.fixture_status(fixture).await?.is_off())
    }
}

/// A call received by [`MockFixtureControl`].
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SetProgram(FixtureId, String),
    CycleProgram(FixtureId),
    SetParameter(FixtureId, String, String, String),
    CycleParameter(FixtureId, String, String),
    Status(FixtureId),
}

#[cfg(test)]
impl Call {
    pub fn set(fixture: FixtureId, program: &str) -> Self {
        Call::SetProgram(fixture, program.to_string())
    }

    pub fn param(fixture: FixtureId, program: &str, parameter: &str, level: &str) -> Self {
        Call::SetParameter(
            fixture,
            program.to_string(),
            parameter.to_string(),
            level.to_string(),
        )
    }
}

/// In-memory fixture service for testing
///
/// Records every call in order and keeps a selected program per fixture, so toggling
/// logic sees its own writes. Fixtures start out `OFF` and cycle `OFF -> ON` unless told
/// otherwise.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFixtureControl {
    calls: std::sync::Mutex<Vec<Call>>,
    programs: std::sync::Mutex<std::collections::HashMap<FixtureId, String>>,
    cycles: std::sync::Mutex<std::collections::HashMap<FixtureId, Vec<String>>>,
    failing_status: std::sync::Mutex<std::collections::HashSet<FixtureId>>,
    failing_commands: std::sync::Mutex<std::collections::HashSet<FixtureId>>,
}

#[cfg(test)]
impl MockFixtureControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `fixture` on `program`.
    pub fn with_program(self, fixture: FixtureId, program: &str) -> Self {
        self.set_state(fixture, program);
        self
    }

    /// Use `cycle` as the program cycle of `fixture`.
    pub fn with_cycle(self, fixture: FixtureId, cycle: &[&str]) -> Self {
        self.cycles
            .lock()
            .unwrap()
            .insert(fixture, cycle.iter().map(|p| p.to_string()).collect());
        self
    }

    /// Change the selected program behind the controller's back.
    pub fn set_state(&self, fixture: FixtureId, program: &str) {
        self.programs
            .lock()
            .unwrap()
            .insert(fixture, program.to_string());
    }

    pub fn program_of(&self, fixture: FixtureId) -> String {
        self.programs
            .lock()
            .unwrap()
            .get(&fixture)
            .cloned()
            .unwrap_or_else(|| program::OFF.to_string())
    }

    /// Make status reads of `fixture` fail.
    pub fn fail_status_of(&self, fixture: FixtureId) {
        self.failing_status.lock().unwrap().insert(fixture);
    }

    /// Make every command to `fixture` fail.
    pub fn fail_commands_to(&self, fixture: FixtureId) {
        self.failing_commands.lock().unwrap().insert(fixture);
    }

    pub fn recover(&self, fixture: FixtureId) {
        self.failing_status.lock().unwrap().remove(&fixture);
        self.failing_commands.lock().unwrap().remove(&fixture);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Return the recorded calls and start a fresh record.
    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    /// Recorded calls that change fixture state, leaving out status reads.
    pub fn commands(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Status(_)))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(
        &self,
        fixture: FixtureId,
        failing: &std::sync::Mutex<std::collections::HashSet<FixtureId>>,
    ) -> Result<(), ControlError> {
        if failing.lock().unwrap().contains(&fixture) {
            return Err(ControlError::Status {
                url: format!("mock://fixtures/{}", fixture),
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[async_trait]
impl FixtureControl for MockFixtureControl {
    async fn set_program(&self, fixture: FixtureId, program: &str) -> Result<(), ControlError> {
        self.record(Call::set(fixture, program));
        self.check(fixture, &self.failing_commands)?;
        self.set_state(fixture, program);
        Ok(())
    }

    async fn cycle_program(&self, fixture: FixtureId) -> Result<String, ControlError> {
        self.record(Call::CycleProgram(fixture));
        self.check(fixture, &self.failing_commands)?;

        let cycle = self
            .cycles
            .lock()
            .unwrap()
            .get(&fixture)
            .cloned()
            .unwrap_or_else(|| vec![program::OFF.to_string(), program::ON.to_string()]);
        let current = self.program_of(fixture);
        let next = match cycle.iter().position(|p| *p == current) {
            Some(i) => cycle[(i + 1) % cycle.len()].clone(),
            None => cycle[0].clone(),
        };
        self.set_state(fixture, &next);
        Ok(next)
    }

    async fn set_discrete_parameter(
        &self,
        fixture: FixtureId,
        program: &str,
        parameter: &str,
        level: &str,
    ) -> Result<(), ControlError> {
        self.record(Call::param(fixture, program, parameter, level));
        self.check(fixture, &self.failing_commands)
    }

    async fn cycle_discrete_parameter(
        &self,
        fixture: FixtureId,
        program: &str,
        parameter: &str,
    ) -> Result<String, ControlError> {
        self.record(Call::CycleParameter(
            fixture,
            program.to_string(),
            parameter.to_string(),
        ));
        self.check(fixture, &self.failing_commands)?;
        Ok(String::new())
    }

    async fn fixture_status(&self, fixture: FixtureId) -> Result<FixtureStatus, ControlError> {
        self.record(Call::Status(fixture));
        self.check(fixture, &self.failing_status)?;
        Ok(FixtureStatus {
            selected_program: self.program_of(fixture),
        })
    }
}
