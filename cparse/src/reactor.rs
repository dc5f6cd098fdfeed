// cparse — a staged, event-driven lexical analysis pipeline for C.
//
// Distributed under the GPL 2.0 with a linking exception. See COPYING.

use crate::error::Status;
use crate::event::Event;
use crate::message::Message;

/// A boxed, owned closure subscribed to a stage's `EventReactor`. Subscribing
/// requires `'static` state because the closure may be called long after the
/// call that subscribed it returned (from within a later `run()`).
pub type EventHandler = Box<dyn FnMut(&Event) -> Status>;

/// A stage's downward control endpoint. Each stage in the pipeline
/// implements this trait; a stage that doesn't recognize a message forwards
/// it, unchanged, to whatever it holds as its downstream sink.
pub trait MessageSink {
    fn send(&mut self, msg: Message) -> Status;
}

/// Maintains the ordered set of handlers subscribed to one stage, and
/// broadcasts events to them in subscription order.
#[derive(Default)]
pub struct EventReactor {
    handlers: Vec<EventHandler>,
}

impl EventReactor {
    pub fn new() -> Self {
        EventReactor {
            handlers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, handler: EventHandler) {
        self.handlers.push(handler);
    }

    /// Dispatches `event` to every subscribed handler in subscription order.
    /// Stops at (and returns) the first non-success status.
    pub fn broadcast(&mut self, event: &Event) -> Status {
        for handler in &mut self.handlers {
            handler(event)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn broadcast_visits_handlers_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut reactor = EventReactor::new();
        for id in 0..3 {
            let seen = Rc::clone(&seen);
            reactor.subscribe(Box::new(move |_: &Event| {
                seen.borrow_mut().push(id);
                Ok(())
            }));
        }
        reactor
            .broadcast(&Event::Eof(crate::cursor::Cursor::sentinel()))
            .unwrap();
        assert_eq!(*seen.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn broadcast_stops_at_first_failure() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut reactor = EventReactor::new();
        for id in 0..3 {
            let seen = Rc::clone(&seen);
            reactor.subscribe(Box::new(move |_: &Event| {
                seen.borrow_mut().push(id);
                if id == 1 {
                    Err(crate::error::ErrorKind::BadCast.into())
                } else {
                    Ok(())
                }
            }));
        }
        let status = reactor.broadcast(&Event::Eof(crate::cursor::Cursor::sentinel()));
        assert!(status.is_err());
        assert_eq!(*seen.borrow(), vec![0, 1]);
    }
}
