use std::time::Duration;

use serde::Deserialize;
use serde::de::IgnoredAny;

use crate::engine::ButtonEvent;
use crate::engine::ButtonEventKind;

/// A message on the bus that is not an event envelope at all.
#[derive(Debug, thiserror::Error)]
#[error("malformed event envelope: {0}")]
pub struct EnvelopeError(#[from] serde_json::Error);

/// `{"alias": ..., "event": {"inner": {"Ok": ...} | {"Err": ...}}}`
#[derive(Debug, Deserialize)]
struct Envelope {
    alias: String,
    event: EnvelopeEvent,
}

#[derive(Debug, Deserialize)]
struct EnvelopeEvent {
    inner: Inner,
}

/// Outcome of reading the device, as reported by the publisher.
#[derive(Debug, Deserialize)]
enum Inner {
    Ok(Payload),
    Err(IgnoredAny),
}

/// Typed payload of a successful reading. Only buttons are of interest; any other
/// payload leaves `button` empty.
#[derive(Debug, Deserialize)]
struct Payload {
    #[serde(rename = "Button")]
    button: Option<WireButtonEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum WireButtonEvent {
    Down,
    Up,
    Clicked { duration: WireDuration },
    LongPress { seconds: u64 },
}

#[derive(Debug, Deserialize)]
struct WireDuration {
    secs: u64,
    #[serde(default)]
    nanos: u32,
}

impl From<WireButtonEvent> for ButtonEventKind {
    fn from(event: WireButtonEvent) -> Self {
        match event {
            WireButtonEvent::Down => ButtonEventKind::Down,
            WireButtonEvent::Up => ButtonEventKind::Up,
            WireButtonEvent::Clicked { duration } => ButtonEventKind::Clicked {
                duration: Duration::new(duration.secs, duration.nanos),
            },
            WireButtonEvent::LongPress { seconds } => ButtonEventKind::LongPress { seconds },
        }
    }
}

/// Decode a bus message into a button event.
///
/// Returns `Ok(None)` for well-formed envelopes that carry an error or a non-button
/// payload.
pub fn decode_envelope(payload: &[u8]) -> Result<Option<ButtonEvent>, EnvelopeError> {
    let envelope: Envelope = serde_json::from_slice(payload)?;

    let event = match envelope.event.inner {
        Inner::Ok(Payload {
            button: Some(button),
        }) => Some(ButtonEvent::new(envelope.alias, button.into())),
        Inner::Ok(Payload { button: None }) | Inner::Err(_) => None,
    };

    Ok(event)
}
