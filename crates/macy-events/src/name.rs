//! Validated event names and the layout engine's well-known events.

use std::fmt;

use crate::error::{EventError, Result};

/// A non-empty event name used as a key in the listener tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventName(String);

impl EventName {
    /// Validates and wraps a name. Blank names are rejected.
    pub fn new(name: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref();
        if name.trim().is_empty() {
            return Err(EventError::InvalidName(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EventName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for EventName {
    type Error = EventError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<String> for EventName {
    type Error = EventError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

/// Events emitted by the layout engine itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutEvent {
    /// The layout finished its first pass.
    Initialized,
    /// Column positions were recalculated.
    Recalculated,
    /// A single image finished loading.
    ImageLoad,
    /// A single image failed to load.
    ImageError,
    /// Every tracked image has either loaded or failed.
    ImagesComplete,
    /// The container was resized.
    Resize,
}

impl LayoutEvent {
    /// All well-known events, in lifecycle order.
    pub const ALL: [LayoutEvent; 6] = [
        LayoutEvent::Initialized,
        LayoutEvent::Recalculated,
        LayoutEvent::ImageLoad,
        LayoutEvent::ImageError,
        LayoutEvent::ImagesComplete,
        LayoutEvent::Resize,
    ];

    /// Returns the wire name listeners subscribe with.
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutEvent::Initialized => "macy.initialized",
            LayoutEvent::Recalculated => "macy.recalculated",
            LayoutEvent::ImageLoad => "macy.image.load",
            LayoutEvent::ImageError => "macy.image.error",
            LayoutEvent::ImagesComplete => "macy.images.complete",
            LayoutEvent::Resize => "macy.resize",
        }
    }

    /// Looks up a well-known event by wire name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.as_str() == name)
    }
}

impl AsRef<str> for LayoutEvent {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for LayoutEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<LayoutEvent> for EventName {
    fn from(event: LayoutEvent) -> Self {
        Self(event.as_str().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_blank_names() {
        assert!(matches!(EventName::new(""), Err(EventError::InvalidName(_))));
        assert!(matches!(EventName::new("   "), Err(EventError::InvalidName(_))));
        assert!(EventName::try_from("x").is_ok());
    }

    #[test]
    fn test_name_keeps_padding() {
        let name = EventName::new(" padded ").unwrap();
        assert_eq!(name.as_str(), " padded ");
        assert_eq!(name.to_string(), " padded ");
    }

    #[test]
    fn test_layout_event_names_are_unique() {
        for (i, a) in LayoutEvent::ALL.iter().enumerate() {
            for b in &LayoutEvent::ALL[i + 1..] {
                assert_ne!(a.as_str(), b.as_str());
            }
        }
    }

    #[test]
    fn test_layout_event_parse() {
        assert_eq!(
            LayoutEvent::parse("macy.images.complete"),
            Some(LayoutEvent::ImagesComplete)
        );
        assert_eq!(LayoutEvent::parse("macy.unknown"), None);

        let name: EventName = LayoutEvent::Resize.into();
        assert_eq!(name.as_str(), "macy.resize");
    }
}
