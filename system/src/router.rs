use crate::message::{
    CommandResult, IdentifiableEvent, LiveEvent, LiveEventKind, SystemEvent,
};
use std::collections::HashMap;

pub type LiveEventHandler = Box<dyn FnMut(LiveEvent)>;

/// Dispatches incoming live events to the handler registered for their kind,
/// at most once per event, in receipt order. Malformed frames are dropped and
/// logged; events without a registered handler are ignored so newer peers can
/// send kinds this build does not know.
pub struct LiveEventRouter {
    handlers: HashMap<LiveEventKind, LiveEventHandler>,
}

impl LiveEventRouter {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn on<F>(&mut self, kind: LiveEventKind, handler: F)
    where
        F: FnMut(LiveEvent) + 'static,
    {
        if self.handlers.insert(kind, Box::new(handler)).is_some() {
            log::warn!("handler for {:?} replaced", kind);
        }
    }

    /// Entry point for raw wire frames.
    pub fn dispatch_frame(&mut self, frame: &[u8]) {
        match bincode::deserialize::<IdentifiableEvent>(frame) {
            Ok(event) => self.dispatch_identifiable(event),
            Err(err) => {
                log::warn!("dropping malformed frame: {}", err);
            }
        }
    }

    pub fn dispatch_identifiable(&mut self, event: IdentifiableEvent) {
        let system_event = match event {
            IdentifiableEvent::ByMyself { result, command_id } => match result {
                CommandResult::SystemEvent(system_event) => system_event,
                CommandResult::Error(error) => {
                    log::warn!("command {} failed: {:?}", command_id, error);
                    return;
                }
            },
            IdentifiableEvent::BySystem { system_event } => system_event,
        };
        match system_event {
            SystemEvent::LiveEvent(live_event) => self.dispatch(live_event),
            // Session lifecycle events are consumed by the connection owner.
            other => {
                log::debug!("session event not routed: {:?}", other);
            }
        }
    }

    pub fn dispatch(&mut self, event: LiveEvent) {
        let kind = event.kind();
        if let Some(handler) = self.handlers.get_mut(&kind) {
            handler(event);
        } else {
            log::debug!("no handler registered for {:?}", kind);
        }
    }
}
