//! Event bus boundary.
//!
//! Button telemetry arrives as JSON envelopes on an MQTT topic. This module subscribes to
//! it, decodes the envelopes and forwards button events to the engine. Everything that is
//! not a well-formed button event is dropped here.

mod client;
mod envelope;
mod ingest;

pub use client::BusError;
pub use client::MqttClient;
pub use client::MqttMessage;
pub use client::RumqttcClient;
pub use envelope::EnvelopeError;
pub use envelope::decode_envelope;
pub use ingest::EventIngestor;
