//! Synchronous event registry and dispatch for the Macy layout engine.
//!
//! Each layout instance owns one [`EventManager`]. Components register
//! listeners by event name, and the layout emits events as it initializes,
//! recalculates, and tracks image loading:
//! - `on` registers a persistent listener
//! - `once` registers a listener for the next emission only
//! - `off` removes a persistent listener by handle or identity
//! - `emit` runs persistent listeners, then one-shot listeners, inline
//!
//! # Example
//!
//! ```
//! use macy_events::{EventManager, LayoutEvent, Payload};
//! use std::sync::Arc;
//!
//! struct Layout {
//!     columns: usize,
//! }
//!
//! let layout = Arc::new(Layout { columns: 4 });
//! let manager = EventManager::with_owner(&layout);
//!
//! manager
//!     .on(LayoutEvent::Resize, |event| {
//!         let layout = event.instance().expect("layout alive");
//!         assert_eq!(layout.columns, 4);
//!     })
//!     .unwrap();
//! manager.once(LayoutEvent::Resize, |_| {}).unwrap();
//!
//! let report = manager.emit(LayoutEvent::Resize, Payload::default()).unwrap();
//! assert_eq!(report.invoked(), 2);
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod listener;
pub mod manager;
pub mod name;

pub use config::{EmitGate, FailurePolicy, ManagerConfig};
pub use error::{EventError, Result};
pub use event::{Event, Payload};
pub use listener::{Listener, ListenerError, ListenerId, ListenerOutcome, Registration};
pub use manager::{EmitReport, EventManager, ListenerFailure, Phase};
pub use name::{EventName, LayoutEvent};
