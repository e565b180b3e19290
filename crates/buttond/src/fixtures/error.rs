use reqwest::StatusCode;

use super::FixtureId;

/// Failure of a single call to the fixture service.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// The request could not be completed at all.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered, but not with 200 OK.
    #[error("{url} answered with status {status}")]
    Status { url: String, status: StatusCode },

    /// The status document of a fixture could not be understood.
    #[error("could not decode status of fixture {fixture}: {source}")]
    Decode {
        fixture: FixtureId,
        #[source]
        source: serde_json::Error,
    },
}
