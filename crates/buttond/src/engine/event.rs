use std::time::Duration;

/// Long presses are reported once per second held; only the first one is acted on.
const LONG_PRESS_SECONDS: u64 = 1;

/// Transition reported by a physical button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEventKind {
    Down,
    Up,
    /// Released after `duration`.
    Clicked { duration: Duration },
    /// Still held after `seconds` whole seconds.
    LongPress { seconds: u64 },
}

/// A decoded button event, addressed by the alias of the button that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonEvent {
    pub alias: String,
    pub kind: ButtonEventKind,
}

/// The press patterns zones react to. Everything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Button went down.
    Press,
    /// Button held for exactly one second.
    Hold,
}

impl ButtonEvent {
    pub fn new(alias: impl Into<String>, kind: ButtonEventKind) -> Self {
        Self {
            alias: alias.into(),
            kind,
        }
    }

    pub fn down(alias: impl Into<String>) -> Self {
        Self::new(alias, ButtonEventKind::Down)
    }

    pub fn long_press(alias: impl Into<String>, seconds: u64) -> Self {
        Self::new(alias, ButtonEventKind::LongPress { seconds })
    }

    /// A click released within its first second.
    pub fn is_simple_click(&self) -> bool {
        matches!(self.kind, ButtonEventKind::Clicked { duration } if duration.as_secs() == 0)
    }

    pub fn trigger(&self) -> Option<Trigger> {
        match self.kind {
            ButtonEventKind::Down => Some(Trigger::Press),
            ButtonEventKind::LongPress { seconds } if seconds == LONG_PRESS_SECONDS => {
                Some(Trigger::Hold)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triggers() {
        assert_eq!(ButtonEvent::down("b").trigger(), Some(Trigger::Press));
        assert_eq!(ButtonEvent::long_press("b", 1).trigger(), Some(Trigger::Hold));
        assert_eq!(ButtonEvent::long_press("b", 2).trigger(), None);
        assert_eq!(ButtonEvent::long_press("b", 0).trigger(), None);
        assert_eq!(ButtonEvent::new("b", ButtonEventKind::Up).trigger(), None);

        let click = ButtonEvent::new(
            "b",
            ButtonEventKind::Clicked {
                duration: Duration::from_millis(200),
            },
        );
        assert!(click.is_simple_click());
        assert_eq!(click.trigger(), None);
    }

    #[test]
    fn test_slow_click_is_not_simple() {
        let click = ButtonEvent::new(
            "b",
            ButtonEventKind::Clicked {
                duration: Duration::from_millis(1500),
            },
        );
        assert!(!click.is_simple_click());
        assert!(!ButtonEvent::down("b").is_simple_click());
    }
}
