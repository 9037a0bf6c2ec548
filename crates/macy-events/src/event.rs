//! The value delivered to listeners on every emission.

use std::fmt;
use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::name::EventName;

/// Caller-supplied key/value data attached to an emission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// Creates an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, replacing any previous value under `key`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Gets a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the payload has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Unwraps the underlying JSON object.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Payload {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A single delivery to listeners.
///
/// Built once per emission and shared by reference with every callback in
/// both phases. It holds only a weak reference to the owning layout
/// instance, so an event that outlives its owner reports no instance.
pub struct Event<O> {
    name: EventName,
    instance: Option<Weak<O>>,
    data: Payload,
}

impl<O> Event<O> {
    pub(crate) fn new(name: EventName, instance: Option<Weak<O>>, data: Payload) -> Self {
        Self {
            name,
            instance,
            data,
        }
    }

    /// The name this event was emitted under.
    pub fn name(&self) -> &EventName {
        &self.name
    }

    /// The owning instance, if the manager has one and it is still alive.
    pub fn instance(&self) -> Option<Arc<O>> {
        self.instance.as_ref().and_then(Weak::upgrade)
    }

    /// The payload passed to `emit`.
    pub fn data(&self) -> &Payload {
        &self.data
    }
}

impl<O> fmt::Debug for Event<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("has_instance", &self.instance.is_some())
            .field("data", &self.data)
            .finish()
    }
}
