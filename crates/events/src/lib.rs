#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for the stowage fetch engine
//!
//! Library code never prints. Status changes and diagnostics are sent as
//! [`EventMessage`]s over an unbounded channel; whoever holds the receiver
//! decides how to render or log them.

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{AppEvent, FetchEvent, FetchStatus, GeneralEvent};

use stowage_errors::UserFacingError;
use stowage_types::LoggedPackage;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// An event together with its emission metadata
#[derive(Debug, Clone)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    #[must_use]
    pub fn new(meta: EventMeta, event: AppEvent) -> Self {
        Self { meta, event }
    }

    /// Wrap an event with metadata derived from the event itself
    #[must_use]
    pub fn from_event(event: AppEvent) -> Self {
        let mut meta = EventMeta::new(event.log_level(), event.event_source());
        meta.correlation_id = event.correlation_id();
        Self { meta, event }
    }
}

pub type EventSender = UnboundedSender<EventMessage>;

pub type EventReceiver = UnboundedReceiver<EventMessage>;

#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Single API for emitting events, whether from a raw sender or a struct
/// holding an optional one
pub trait EventEmitter {
    fn event_sender(&self) -> Option<&EventSender>;

    /// Hook for adding labels before a message is sent
    fn enrich_event_meta(&self, _event: &AppEvent, _meta: &mut EventMeta) {}

    fn emit_with_meta(&self, meta: EventMeta, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // A dropped receiver just means nobody is listening
            let _ = sender.send(EventMessage::new(meta, event));
        }
    }

    fn emit(&self, event: AppEvent) {
        let EventMessage { mut meta, event } = EventMessage::from_event(event);
        self.enrich_event_meta(&event, &mut meta);
        self.emit_with_meta(meta, event);
    }

    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message, None)));
    }

    fn emit_warning_with_context(&self, message: impl Into<String>, context: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(
            message,
            Some(context.into()),
        )));
    }

    fn emit_error(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error(message, None)));
    }

    /// Emit an error event rendered from a user-facing error
    fn emit_failure<E: UserFacingError + ?Sized>(&self, message: impl Into<String>, error: &E) {
        let mut details = error.user_message().into_owned();
        if let Some(hint) = error.user_hint() {
            details.push_str(" (");
            details.push_str(hint);
            details.push(')');
        }
        self.emit(AppEvent::General(GeneralEvent::error(message, Some(details))));
    }

    fn emit_fetch_status(&self, status: FetchStatus, package: &LoggedPackage) {
        self.emit(AppEvent::Fetch(FetchEvent::status(status, package.clone())));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}
