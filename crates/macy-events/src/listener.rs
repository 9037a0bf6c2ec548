//! Listener callbacks and the handles issued when they are registered.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::event::Event;

/// Failure reported by a listener callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerError(String);

impl ListenerError {
    /// Creates an error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListenerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ListenerError {}

/// Return types a listener closure may produce.
///
/// Closures returning `()` never fail; closures returning `Result` fail
/// with the `Display` text of their error.
pub trait ListenerOutcome {
    /// Normalizes the closure's return value.
    fn into_outcome(self) -> Result<(), ListenerError>;
}

impl ListenerOutcome for () {
    fn into_outcome(self) -> Result<(), ListenerError> {
        Ok(())
    }
}

impl<E: fmt::Display> ListenerOutcome for Result<(), E> {
    fn into_outcome(self) -> Result<(), ListenerError> {
        self.map_err(|e| ListenerError::new(e.to_string()))
    }
}

type Callback<O> = dyn Fn(&Event<O>) -> Result<(), ListenerError> + Send + Sync;

/// A registered callback.
///
/// Cloning is cheap and keeps identity: clones compare equal under
/// [`Listener::ptr_eq`], so the same listener can be registered several
/// times and later removed by reference.
pub struct Listener<O> {
    callback: Arc<Callback<O>>,
}

impl<O> Listener<O> {
    /// Wraps a closure.
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&Event<O>) -> R + Send + Sync + 'static,
        R: ListenerOutcome,
    {
        Self {
            callback: Arc::new(move |event: &Event<O>| f(event).into_outcome()),
        }
    }

    /// Invokes the callback.
    pub fn call(&self, event: &Event<O>) -> Result<(), ListenerError> {
        (self.callback)(event)
    }

    /// Returns true if both handles wrap the same callback.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl<O> Clone for Listener<O> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<O> fmt::Debug for Listener<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("callback", &Arc::as_ptr(&self.callback))
            .finish()
    }
}

/// Handle identifying one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a successful `on` or `once`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// Handle to pass to `off`.
    pub id: ListenerId,
    /// Length of the listener list after appending.
    pub len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Payload;
    use crate::name::EventName;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn event() -> Event<()> {
        Event::new(EventName::new("x").unwrap(), None, Payload::default())
    }

    #[test]
    fn test_unit_closure_never_fails() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let listener = Listener::new(move |_: &Event<()>| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        assert!(listener.call(&event()).is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_result_closure_reports_message() {
        let listener = Listener::new(|_: &Event<()>| Err::<(), _>("image missing"));
        let err = listener.call(&event()).unwrap_err();
        assert_eq!(err.message(), "image missing");
    }

    #[test]
    fn test_identity() {
        let a = Listener::new(|_: &Event<()>| {});
        let b = Listener::new(|_: &Event<()>| {});
        let a2 = a.clone();

        assert!(a.ptr_eq(&a2));
        assert!(!a.ptr_eq(&b));
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(ListenerId::new(), ListenerId::new());
    }
}
