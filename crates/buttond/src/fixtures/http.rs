use std::time::Duration;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use reqwest::Response;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use super::ControlError;
use super::FixtureControl;
use super::FixtureId;
use super::FixtureStatus;
use crate::config::FixturesConfig;

/// Body of a discrete parameter update.
#[derive(Serialize)]
struct SetDiscreteParameter<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    level: &'a str,
}

/// [`FixtureControl`] over the fixture service's HTTP API.
pub struct HttpFixtureClient {
    http: reqwest::Client,
    /// Service root plus API prefix, without a trailing slash.
    api_base: String,
}

impl HttpFixtureClient {
    /// Create a client without contacting the service.
    pub fn new(config: &FixturesConfig) -> Result<Self, ControlError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| ControlError::Transport {
                url: config.base_url.clone(),
                source,
            })?;

        Ok(Self {
            http,
            api_base: config.api_base(),
        })
    }

    /// Create a client and make sure the service answers at its base URL.
    pub async fn connect(config: &FixturesConfig) -> Result<Self, ControlError> {
        let client = Self::new(config)?;

        let url = config.base_url.clone();
        info!("Checking fixture service at {}", url);
        client.send(&url, client.http.get(&url)).await?;

        Ok(client)
    }

    fn fixture_url(&self, fixture: FixtureId) -> String {
        format!("{}/fixtures/{}", self.api_base, fixture)
    }

    fn parameter_url(&self, fixture: FixtureId, program: &str, parameter: &str) -> String {
        format!(
            "{}/programs/{}/parameters/{}",
            self.fixture_url(fixture),
            program,
            parameter
        )
    }

    /// Send a request and reject anything but 200 OK.
    async fn send(&self, url: &str, request: RequestBuilder) -> Result<Response, ControlError> {
        let response = request
            .send()
            .await
            .map_err(|source| ControlError::Transport {
                url: url.to_string(),
                source,
            })?;

        match response.status() {
            StatusCode::OK => Ok(response),
            status => Err(ControlError::Status {
                url: url.to_string(),
                status,
            }),
        }
    }

    async fn send_for_text(&self, url: &str, request: RequestBuilder) -> Result<String, ControlError> {
        self.send(url, request)
            .await?
            .text()
            .await
            .map_err(|source| ControlError::Transport {
                url: url.to_string(),
                source,
            })
    }
}

#[async_trait]
impl FixtureControl for HttpFixtureClient {
    async fn set_program(&self, fixture: FixtureId, program: &str) -> Result<(), ControlError> {
        debug!(
            "attempting to set program {} for fixture {}",
            program, fixture
        );

        let url = format!("{}/set_active_program", self.fixture_url(fixture));
        let request = self.http.post(&url).body(program.to_string());
        self.send(&url, request).await?;
        Ok(())
    }

    async fn cycle_program(&self, fixture: FixtureId) -> Result<String, ControlError> {
        debug!("attempting to cycle program for fixture {}", fixture);

        let url = format!("{}/cycle_active_program", self.fixture_url(fixture));
        self.send_for_text(&url, self.http.post(&url)).await
    }

    async fn set_discrete_parameter(
        &self,
        fixture: FixtureId,
        program: &str,
        parameter: &str,
        level: &str,
    ) -> Result<(), ControlError> {
        debug!(
            "attempting to set parameter {} to {} for program {} for fixture {}",
            parameter, level, program, fixture
        );

        let url = self.parameter_url(fixture, program, parameter);
        let request = self.http.post(&url).json(&SetDiscreteParameter {
            kind: "discrete",
            level,
        });
        self.send(&url, request).await?;
        Ok(())
    }

    async fn cycle_discrete_parameter(
        &self,
        fixture: FixtureId,
        program: &str,
        parameter: &str,
    ) -> Result<String, ControlError> {
        debug!(
            "attempting to cycle parameter {} for program {} for fixture {}",
            parameter, program, fixture
        );

        let url = format!("{}/cycle", self.parameter_url(fixture, program, parameter));
        self.send_for_text(&url, self.http.post(&url)).await
    }

    async fn fixture_status(&self, fixture: FixtureId) -> Result<FixtureStatus, ControlError> {
        debug!("checking running program of fixture {}", fixture);

        let url = self.fixture_url(fixture);
        let body = self.send_for_text(&url, self.http.get(&url)).await?;
        serde_json::from_str(&body).map_err(|source| ControlError::Decode { fixture, source })
    }
}
