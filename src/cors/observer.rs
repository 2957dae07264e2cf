//! CORS decision events.
//!
//! Every decision is logged through `tracing` at the level configured in
//! [`LogLevels`] and, when one is attached, handed to a [`CorsObserver`].
//! Observers are fire-and-forget: an error or a panic inside one is logged
//! and otherwise ignored.

use std::error::Error;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, trace, warn};

/// Which CORS handling path produced the event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    /// Actual (non-preflight) request
    Simple,
    /// Preflight `OPTIONS` request
    Preflight,
}

/// Outcome category of a CORS decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// CORS headers were attached
    Accepted,
    /// A well-formed CORS request failed a policy check
    Rejected,
    /// The request is not a well-formed CORS request of the expected kind
    Invalid,
}

/// Why a request was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum RejectReason {
    /// `Origin` matched none of the configured origins
    OriginNotAllowed,
    /// The requested preflight method is not allowed
    MethodNotAllowed(String),
    /// These requested preflight headers are not allowed
    HeadersNotAllowed(Vec<String>),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::OriginNotAllowed => write!(f, "origin not allowed"),
            RejectReason::MethodNotAllowed(m) => write!(f, "method {m} not allowed"),
            RejectReason::HeadersNotAllowed(h) => {
                write!(f, "headers not allowed: {}", h.join(", "))
            }
        }
    }
}

/// Structured record of one CORS decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorsEvent {
    /// Accepted, rejected or invalid
    pub kind: EventKind,
    /// Simple or preflight
    pub request: RequestKind,
    /// The request's `Origin`, if it had one
    pub origin: Option<String>,
    /// Set for rejections
    pub reason: Option<RejectReason>,
}

/// Error type observers may return
pub type ObserverError = Box<dyn Error + Send + Sync>;

/// Receives CORS decision events
///
/// Called synchronously on the request thread; keep it cheap.
pub trait CorsObserver: Send + Sync {
    /// Handle one event. Errors are logged, never propagated.
    fn on_event(&self, event: &CorsEvent) -> Result<(), ObserverError>;
}

impl<T: CorsObserver + ?Sized> CorsObserver for Arc<T> {
    fn on_event(&self, event: &CorsEvent) -> Result<(), ObserverError> {
        (**self).on_event(event)
    }
}

/// Cloneable handle to an observer, stored in [`Options`](super::Options)
#[derive(Clone)]
pub struct SharedObserver(pub Arc<dyn CorsObserver>);

impl fmt::Debug for SharedObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedObserver(<observer>)")
    }
}

impl SharedObserver {
    /// Wrap an observer
    pub fn new(observer: impl CorsObserver + 'static) -> Self {
        SharedObserver(Arc::new(observer))
    }
}

/// Level at which an event kind is logged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    /// Do not log
    Off,
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// Log level per event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogLevels {
    /// Default `debug`
    pub accepted: EventLevel,
    /// Default `warn`
    pub rejected: EventLevel,
    /// Default `debug`
    pub invalid: EventLevel,
}

impl Default for LogLevels {
    fn default() -> Self {
        Self {
            accepted: EventLevel::Debug,
            rejected: EventLevel::Warn,
            invalid: EventLevel::Debug,
        }
    }
}

impl LogLevels {
    /// Silence all CORS decision logging
    #[must_use]
    pub fn off() -> Self {
        Self {
            accepted: EventLevel::Off,
            rejected: EventLevel::Off,
            invalid: EventLevel::Off,
        }
    }

    fn level_for(&self, kind: EventKind) -> EventLevel {
        match kind {
            EventKind::Accepted => self.accepted,
            EventKind::Rejected => self.rejected,
            EventKind::Invalid => self.invalid,
        }
    }
}

macro_rules! log_event {
    ($mac:ident, $event:expr, $reason:expr) => {
        $mac!(
            kind = ?$event.kind,
            request = ?$event.request,
            origin = $event.origin.as_deref().unwrap_or(""),
            reason = %$reason,
            "CORS request {}",
            match $event.kind {
                EventKind::Accepted => "accepted",
                EventKind::Rejected => "rejected",
                EventKind::Invalid => "invalid",
            }
        )
    };
}

/// Log `event` and forward it to `observer`
///
/// Observer failures (errors or panics) are contained here.
pub(crate) fn emit(levels: &LogLevels, observer: Option<&SharedObserver>, event: CorsEvent) {
    let reason = event
        .reason
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    match levels.level_for(event.kind) {
        EventLevel::Off => {}
        EventLevel::Trace => log_event!(trace, event, reason),
        EventLevel::Debug => log_event!(debug, event, reason),
        EventLevel::Info => log_event!(info, event, reason),
        EventLevel::Warn => log_event!(warn, event, reason),
        EventLevel::Error => log_event!(error, event, reason),
    }

    let Some(SharedObserver(observer)) = observer else {
        return;
    };
    match catch_unwind(AssertUnwindSafe(|| observer.on_event(&event))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "CORS observer failed; ignoring"),
        Err(panic) => warn!(panic = ?panic, "CORS observer panicked; ignoring"),
    }
}
