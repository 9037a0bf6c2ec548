//! Manager configuration.

use serde::{Deserialize, Serialize};

/// What `emit` does when a listener reports a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure in the report and keep delivering.
    #[default]
    Isolate,
    /// Stop at the first failure and return it as an error.
    Abort,
}

/// Condition an emission must meet before any listener runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmitGate {
    /// Proceed only if the persistent table has an entry for the name, even
    /// an empty one. One-shot listeners alone are not enough.
    #[default]
    PersistentTable,
    /// Proceed if either table has an entry for the name.
    AnyListener,
}

/// Configuration for an [`EventManager`](crate::EventManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Listener failure handling.
    pub failure_policy: FailurePolicy,
    /// Emission gating.
    pub gate: EmitGate,
}

impl ManagerConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the failure policy.
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Sets the emission gate.
    pub fn with_gate(mut self, gate: EmitGate) -> Self {
        self.gate = gate;
        self
    }
}
