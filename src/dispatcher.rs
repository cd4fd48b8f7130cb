//! Decoding of `WM_WTSSESSION_CHANGE` and fan-out to subscribers.
//!
//! Subscribers run synchronously on the listener thread, one after another,
//! in the order they were added. A subscriber that blocks holds up every
//! event queued behind it; keep callbacks short or hand the work off to
//! another thread.

use core::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{event, Level};

use crate::event::{SessionEvent, SessionEventKind, UnknownSubtype};

pub const WM_WTSSESSION_CHANGE: u32 = 0x02B1;

pub type Subscriber = Box<dyn FnMut(u32) + Send + 'static>;

/// Callbacks per event kind, in registration order.
#[derive(Default)]
pub struct SubscriberTable {
    slots: [Vec<Subscriber>; 9],
}

impl SubscriberTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: SessionEventKind, subscriber: Subscriber) {
        self.slots[kind.index()].push(subscriber);
    }

    pub fn count(&self, kind: SessionEventKind) -> usize {
        self.slots[kind.index()].len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Vec::is_empty)
    }

    /// Invokes every subscriber for `event.kind`; returns how many ran to
    /// completion. A panicking subscriber is logged and skipped.
    pub fn notify(&mut self, event: SessionEvent) -> usize {
        let mut completed = 0;
        for (position, subscriber) in self.slots[event.kind.index()].iter_mut().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| subscriber(event.session_id))) {
                Ok(()) => completed += 1,
                Err(_) => event!(
                    Level::ERROR,
                    "subscriber #{position} for {} panicked on session {}",
                    event.kind,
                    event.session_id
                ),
            }
        }
        completed
    }
}

impl fmt::Debug for SubscriberTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for kind in SessionEventKind::ALL {
            map.entry(&kind, &self.count(kind));
        }
        map.finish()
    }
}

/// What a raw window message turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Event(SessionEvent),
    Unknown(UnknownSubtype),
    Other,
}

/// Whether the dispatcher consumed a message or it belongs to the
/// default window procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    Handled,
    Default,
}

pub fn decode(message: u32, wparam: usize, lparam: isize) -> Decoded {
    if message != WM_WTSSESSION_CHANGE {
        return Decoded::Other;
    }
    match SessionEventKind::try_from(wparam) {
        Ok(kind) => Decoded::Event(SessionEvent {
            kind,
            // the session id travels in the low 32 bits of lParam
            session_id: lparam as u32,
        }),
        Err(unknown) => Decoded::Unknown(unknown),
    }
}

#[derive(Debug, Default)]
pub struct EventDispatcher {
    subscribers: SubscriberTable,
}

impl EventDispatcher {
    pub fn new(subscribers: SubscriberTable) -> Self {
        Self { subscribers }
    }

    pub fn handle(&mut self, message: u32, wparam: usize, lparam: isize) -> Routed {
        match decode(message, wparam, lparam) {
            Decoded::Event(session_event) => {
                let delivered = self.subscribers.notify(session_event);
                event!(
                    Level::DEBUG,
                    "{} for session {} delivered to {delivered} subscriber(s)",
                    session_event.kind,
                    session_event.session_id
                );
                Routed::Handled
            }
            Decoded::Unknown(UnknownSubtype(code)) => {
                event!(Level::DEBUG, "ignoring unknown session change subtype {code}");
                Routed::Handled
            }
            Decoded::Other => Routed::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<(String, u32)>>>;

    fn recorder(log: &Log, tag: impl Into<String>) -> Subscriber {
        let log = Arc::clone(log);
        let tag = tag.into();
        Box::new(move |id| log.lock().unwrap().push((tag.clone(), id)))
    }

    fn entries(log: &Log) -> Vec<(String, u32)> {
        log.lock().unwrap().clone()
    }

    fn dispatcher_for_every_kind(log: &Log) -> EventDispatcher {
        let mut table = SubscriberTable::new();
        for kind in SessionEventKind::ALL {
            table.push(kind, recorder(log, kind.to_string()));
        }
        EventDispatcher::new(table)
    }

    #[test]
    fn lock_reaches_only_lock_subscribers() {
        let log: Log = Default::default();
        let mut dispatcher = dispatcher_for_every_kind(&log);
        dispatcher
            .subscribers
            .push(SessionEventKind::SessionLock, recorder(&log, "second-lock"));

        let routed = dispatcher.handle(WM_WTSSESSION_CHANGE, 0x7, 7);

        assert_eq!(routed, Routed::Handled);
        assert_eq!(
            entries(&log),
            vec![("SessionLock".to_string(), 7), ("second-lock".to_string(), 7)]
        );
    }

    #[test]
    fn unknown_subtype_invokes_nobody() {
        let log: Log = Default::default();
        let mut dispatcher = dispatcher_for_every_kind(&log);

        assert_eq!(dispatcher.handle(WM_WTSSESSION_CHANGE, 0x42, 3), Routed::Handled);
        assert_eq!(dispatcher.handle(WM_WTSSESSION_CHANGE, 0, 3), Routed::Handled);
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn other_messages_go_to_the_default_procedure() {
        let log: Log = Default::default();
        let mut dispatcher = dispatcher_for_every_kind(&log);

        // WM_TIMER carrying what would otherwise look like a lock
        assert_eq!(dispatcher.handle(0x0113, 0x7, 7), Routed::Default);
        assert!(entries(&log).is_empty());
    }

    #[test]
    fn no_subscribers_is_silent() {
        let mut dispatcher = EventDispatcher::default();
        assert_eq!(dispatcher.handle(WM_WTSSESSION_CHANGE, 0x5, 1), Routed::Handled);
    }

    #[test]
    fn subscribers_run_in_insertion_order() {
        let log: Log = Default::default();
        let mut table = SubscriberTable::new();
        table.push(SessionEventKind::SessionLogon, recorder(&log, "a"));
        table.push(SessionEventKind::SessionLogon, recorder(&log, "b"));
        table.push(SessionEventKind::SessionLogon, recorder(&log, "c"));
        let mut dispatcher = EventDispatcher::new(table);

        dispatcher.handle(WM_WTSSESSION_CHANGE, 0x5, 12);

        let order: Vec<_> = entries(&log).into_iter().map(|(tag, _)| tag).collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn panicking_subscriber_does_not_stop_the_rest() {
        let log: Log = Default::default();
        let mut table = SubscriberTable::new();
        table.push(SessionEventKind::SessionUnlock, Box::new(|_| panic!("boom")));
        table.push(SessionEventKind::SessionUnlock, recorder(&log, "after"));

        let delivered = table.notify(SessionEvent {
            kind: SessionEventKind::SessionUnlock,
            session_id: 4,
        });

        assert_eq!(delivered, 1);
        assert_eq!(entries(&log), vec![("after".to_string(), 4)]);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn decode_keeps_the_low_32_bits_of_lparam() {
        assert_eq!(
            decode(WM_WTSSESSION_CHANGE, 0x3, 0x1_0000_0002),
            Decoded::Event(SessionEvent {
                kind: SessionEventKind::RemoteConnect,
                session_id: 2,
            })
        );
    }

    #[test]
    fn debug_lists_counts_per_kind() {
        let mut table = SubscriberTable::new();
        assert!(table.is_empty());
        table.push(SessionEventKind::ConsoleConnect, Box::new(|_| {}));
        assert!(!table.is_empty());
        assert!(format!("{table:?}").contains("ConsoleConnect: 1"));
    }
}
