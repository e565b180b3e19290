//! Lighting fixtures and the remote service that drives them.
//!
//! The fixture service owns all fixture state. This module only names the fixtures and
//! programs the controller knows about and issues commands over the service's HTTP API.

mod client;
mod error;
mod fixture;
mod http;

pub use client::FixtureControl;
pub use client::FixtureStatus;
pub use error::ControlError;
pub use fixture::FixtureId;
pub use fixture::ProgramDirective;
pub use fixture::program;
pub use http::HttpFixtureClient;

#[cfg(test)]
pub use client::Call;
#[cfg(test)]
pub use client::MockFixtureControl;
