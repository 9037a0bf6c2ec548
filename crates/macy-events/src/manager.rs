//! EventManager - per-instance listener registry with synchronous dispatch.
//!
//! Two independent tables are keyed by event name:
//! - **persistent**: listeners stay until removed with `off`
//! - **one-shot**: listeners run on the next emission of their name, after
//!   which the whole one-shot list for that name is dropped
//!
//! Both tables share one `RwLock`. The lock is released before any callback
//! runs, so listeners may register or remove listeners while an emission is
//! in progress. Each phase works on a snapshot taken just before it starts:
//! listeners added to a list after its snapshot wait for the next emission,
//! and listeners removed after it still run this time.
//!
//! The one-shot list is taken out of the table in the same write that
//! snapshots it, so concurrent emissions of one name never share a one-shot
//! listener, and a one-shot registered while phase 2 runs is kept for the
//! next emission.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use tracing::{debug, trace, warn};

use crate::config::{EmitGate, FailurePolicy, ManagerConfig};
use crate::error::{EventError, Result};
use crate::event::{Event, Payload};
use crate::listener::{Listener, ListenerError, ListenerId, ListenerOutcome, Registration};
use crate::name::EventName;

/// Which table a listener was delivered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Registered with `on`.
    Persistent,
    /// Registered with `once`.
    Once,
}

/// A listener failure recorded under [`FailurePolicy::Isolate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerFailure {
    /// Registration that failed.
    pub id: ListenerId,
    /// Phase the listener ran in.
    pub phase: Phase,
    /// Error returned by the callback.
    pub error: ListenerError,
}

/// Outcome of a successful `emit`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Persistent listeners invoked, failures included.
    pub persistent_invoked: usize,
    /// One-shot listeners invoked, failures included.
    pub once_invoked: usize,
    /// Failures isolated during delivery, in invocation order.
    pub failures: Vec<ListenerFailure>,
}

impl EmitReport {
    /// Total listeners invoked across both phases.
    pub fn invoked(&self) -> usize {
        self.persistent_invoked + self.once_invoked
    }

    /// Returns true if no listener failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, phase: Phase) {
        match phase {
            Phase::Persistent => self.persistent_invoked += 1,
            Phase::Once => self.once_invoked += 1,
        }
    }
}

struct Entry<O> {
    id: ListenerId,
    listener: Listener<O>,
}

impl<O> Clone for Entry<O> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            listener: self.listener.clone(),
        }
    }
}

type Table<O> = HashMap<EventName, Vec<Entry<O>>>;

struct Tables<O> {
    events: Table<O>,
    once: Table<O>,
}

impl<O> Tables<O> {
    fn table(&self, phase: Phase) -> &Table<O> {
        match phase {
            Phase::Persistent => &self.events,
            Phase::Once => &self.once,
        }
    }

    fn table_mut(&mut self, phase: Phase) -> &mut Table<O> {
        match phase {
            Phase::Persistent => &mut self.events,
            Phase::Once => &mut self.once,
        }
    }
}

/// Listener registry owned by a single layout instance.
///
/// # Example
///
/// ```
/// use macy_events::{EventManager, LayoutEvent, Payload};
/// use std::sync::{Arc, Mutex};
///
/// let manager: EventManager = EventManager::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let s = seen.clone();
/// manager
///     .on(LayoutEvent::Recalculated, move |event| {
///         s.lock().unwrap().push(event.data().clone());
///     })
///     .unwrap();
///
/// manager
///     .emit(LayoutEvent::Recalculated, Payload::new().with("columns", 3))
///     .unwrap();
///
/// assert_eq!(seen.lock().unwrap().len(), 1);
/// ```
pub struct EventManager<O = ()> {
    instance: Option<Weak<O>>,
    config: ManagerConfig,
    tables: RwLock<Tables<O>>,
}

impl<O> EventManager<O> {
    /// Creates a manager with no owner.
    pub fn new() -> Self {
        Self {
            instance: None,
            config: ManagerConfig::default(),
            tables: RwLock::new(Tables {
                events: HashMap::new(),
                once: HashMap::new(),
            }),
        }
    }

    /// Creates a manager whose events refer back to `owner`.
    ///
    /// Only a weak reference is kept, so the manager never keeps its owner
    /// alive.
    pub fn with_owner(owner: &Arc<O>) -> Self {
        Self {
            instance: Some(Arc::downgrade(owner)),
            ..Self::new()
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// The owning instance, if any and still alive.
    pub fn owner(&self) -> Option<Arc<O>> {
        self.instance.as_ref().and_then(Weak::upgrade)
    }

    /// Registers `f` to run on every emission of `name` until removed.
    ///
    /// Returns the subscription handle and the new length of the persistent
    /// list. The same callback may be registered any number of times.
    pub fn on<F, R>(&self, name: impl AsRef<str>, f: F) -> Result<Registration>
    where
        F: Fn(&Event<O>) -> R + Send + Sync + 'static,
        R: ListenerOutcome,
    {
        self.register(Phase::Persistent, name.as_ref(), Listener::new(f))
    }

    /// Registers an existing listener handle as persistent.
    pub fn on_listener(&self, name: impl AsRef<str>, listener: Listener<O>) -> Result<Registration> {
        self.register(Phase::Persistent, name.as_ref(), listener)
    }

    /// Registers `f` to run on the next emission of `name` only.
    pub fn once<F, R>(&self, name: impl AsRef<str>, f: F) -> Result<Registration>
    where
        F: Fn(&Event<O>) -> R + Send + Sync + 'static,
        R: ListenerOutcome,
    {
        self.register(Phase::Once, name.as_ref(), Listener::new(f))
    }

    /// Registers an existing listener handle as one-shot.
    pub fn once_listener(&self, name: impl AsRef<str>, listener: Listener<O>) -> Result<Registration> {
        self.register(Phase::Once, name.as_ref(), listener)
    }

    /// Removes the persistent registration `id` from `name`.
    ///
    /// Returns `Ok(false)` if nothing matched. One-shot registrations are
    /// never removed. An empty persistent list is left behind for `name`,
    /// which makes it emittable under [`EmitGate::PersistentTable`].
    pub fn off(&self, name: impl AsRef<str>, id: ListenerId) -> Result<bool> {
        self.remove_first(name.as_ref(), |entry| entry.id == id)
    }

    /// Removes the first persistent registration of `listener` from `name`,
    /// matching by reference identity.
    ///
    /// Same semantics as [`off`](Self::off) otherwise.
    pub fn off_listener(&self, name: impl AsRef<str>, listener: &Listener<O>) -> Result<bool> {
        self.remove_first(name.as_ref(), |entry| entry.listener.ptr_eq(listener))
    }

    /// Delivers one event to every listener registered for `name`.
    ///
    /// Persistent listeners run first, then one-shot listeners, each in
    /// registration order and all receiving the same [`Event`]. The one-shot
    /// list for `name` is removed from the table once phase 1 finishes, even
    /// when delivery aborts.
    ///
    /// # Errors
    ///
    /// - [`EventError::InvalidName`] for a blank name
    /// - [`EventError::NoListeners`] when the configured gate is closed
    /// - [`EventError::Listener`] under [`FailurePolicy::Abort`]
    pub fn emit(&self, name: impl AsRef<str>, data: Payload) -> Result<EmitReport> {
        let name = EventName::new(name)?;

        let persistent = {
            let tables = self.read()?;
            let open = match self.config.gate {
                EmitGate::PersistentTable => tables.events.contains_key(&name),
                EmitGate::AnyListener => {
                    tables.events.contains_key(&name) || tables.once.contains_key(&name)
                }
            };
            if !open {
                debug!(event = %name, "emit skipped, no listeners");
                return Err(EventError::NoListeners(name.to_string()));
            }
            tables.events.get(&name).cloned().unwrap_or_default()
        };

        let event = Event::new(name.clone(), self.instance.clone(), data);
        let mut report = EmitReport::default();

        let mut outcome = self.deliver(Phase::Persistent, &persistent, &event, &mut report);
        let once = self.write()?.once.remove(&name).unwrap_or_default();
        if outcome.is_ok() {
            outcome = self.deliver(Phase::Once, &once, &event, &mut report);
        }
        outcome?;

        debug!(
            event = %name,
            persistent = report.persistent_invoked,
            once = report.once_invoked,
            failures = report.failures.len(),
            "event emitted"
        );
        Ok(report)
    }

    /// Number of persistent listeners for `name`.
    pub fn listener_count(&self, name: impl AsRef<str>) -> usize {
        self.count(Phase::Persistent, name.as_ref())
    }

    /// Number of pending one-shot listeners for `name`.
    pub fn once_count(&self, name: impl AsRef<str>) -> usize {
        self.count(Phase::Once, name.as_ref())
    }

    /// Returns true if the persistent table has an entry for `name`, even
    /// an empty one.
    pub fn has_listeners(&self, name: impl AsRef<str>) -> bool {
        let Ok(name) = EventName::new(name) else {
            return false;
        };
        self.tables
            .read()
            .map(|t| t.events.contains_key(&name))
            .unwrap_or(false)
    }

    fn register(&self, phase: Phase, name: &str, listener: Listener<O>) -> Result<Registration> {
        let name = EventName::new(name)?;
        let id = ListenerId::new();

        let mut tables = self.write()?;
        let list = tables.table_mut(phase).entry(name.clone()).or_default();
        list.push(Entry { id, listener });
        let len = list.len();

        debug!(event = %name, listener = %id, ?phase, len, "listener registered");
        Ok(Registration { id, len })
    }

    fn remove_first(&self, name: &str, predicate: impl Fn(&Entry<O>) -> bool) -> Result<bool> {
        let name = EventName::new(name)?;

        let mut tables = self.write()?;
        let list = tables.events.entry(name.clone()).or_default();
        match list.iter().position(predicate) {
            Some(index) => {
                let entry = list.remove(index);
                debug!(event = %name, listener = %entry.id, "listener removed");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn deliver(
        &self,
        phase: Phase,
        entries: &[Entry<O>],
        event: &Event<O>,
        report: &mut EmitReport,
    ) -> Result<()> {
        for entry in entries {
            trace!(event = %event.name(), listener = %entry.id, ?phase, "invoking listener");
            report.record(phase);

            let Err(error) = entry.listener.call(event) else {
                continue;
            };
            match self.config.failure_policy {
                FailurePolicy::Isolate => {
                    warn!(
                        event = %event.name(),
                        listener = %entry.id,
                        error = %error,
                        "listener failed"
                    );
                    report.failures.push(ListenerFailure {
                        id: entry.id,
                        phase,
                        error,
                    });
                }
                FailurePolicy::Abort => {
                    return Err(EventError::Listener {
                        name: event.name().to_string(),
                        id: entry.id,
                        message: error.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn count(&self, phase: Phase, name: &str) -> usize {
        let Ok(name) = EventName::new(name) else {
            return 0;
        };
        self.tables
            .read()
            .map(|t| t.table(phase).get(&name).map(Vec::len).unwrap_or(0))
            .unwrap_or(0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables<O>>> {
        self.tables
            .read()
            .map_err(|e| EventError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables<O>>> {
        self.tables
            .write()
            .map_err(|e| EventError::LockPoisoned(e.to_string()))
    }
}

impl<O> Default for EventManager<O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O> fmt::Debug for EventManager<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (events, once) = self
            .tables
            .read()
            .map(|t| (t.events.len(), t.once.len()))
            .unwrap_or((0, 0));
        f.debug_struct("EventManager")
            .field("has_owner", &self.instance.is_some())
            .field("config", &self.config)
            .field("events", &events)
            .field("once", &once)
            .finish()
    }
}
