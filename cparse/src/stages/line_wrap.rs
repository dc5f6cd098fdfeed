// cparse — a staged, event-driven lexical analysis pipeline for C.
//
// Distributed under the GPL 2.0 with a linking exception. See COPYING.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Status;
use crate::event::Event;
use crate::message::{Message, StageId};
use crate::reactor::{EventReactor, MessageSink};

enum State {
    Normal,
    SawBackslash(Event),
}

struct Shared {
    reactor: EventReactor,
    state: State,
}

impl Shared {
    fn on_event(&mut self, event: &Event) -> Status {
        match (&self.state, event) {
            (State::Normal, Event::RawChar { byte: b'\\', .. }) => {
                self.state = State::SawBackslash(event.clone());
                Ok(())
            }
            (State::SawBackslash(_), Event::RawChar { byte: b'\n', .. }) => {
                self.state = State::Normal;
                Ok(())
            }
            (State::SawBackslash(_), _) => {
                let State::SawBackslash(buffered) = std::mem::replace(&mut self.state, State::Normal)
                else {
                    unreachable!()
                };
                self.reactor.broadcast(&buffered)?;
                self.on_event(event)
            }
            (State::Normal, _) => self.reactor.broadcast(event),
        }
    }
}

/// Stage 2: elides backslash-newline line continuations, preserving the
/// cursor of the (eventually forwarded) backslash when it turns out not to
/// precede a newline.
pub struct LineWrapFilter {
    downstream: Box<dyn MessageSink>,
    shared: Rc<RefCell<Shared>>,
}

impl LineWrapFilter {
    pub fn new<D: MessageSink + 'static>(mut downstream: D) -> Self {
        let shared = Rc::new(RefCell::new(Shared {
            reactor: EventReactor::new(),
            state: State::Normal,
        }));
        let cb = Rc::clone(&shared);
        downstream
            .send(Message::Subscribe {
                target_stage: StageId::FileLineOverride,
                handler: Box::new(move |event: &Event| cb.borrow_mut().on_event(event)),
            })
            .expect("wiring the file/line override filter's reactor never fails");
        LineWrapFilter {
            downstream: Box::new(downstream),
            shared,
        }
    }
}

impl MessageSink for LineWrapFilter {
    fn send(&mut self, msg: Message) -> Status {
        match msg {
            Message::Subscribe {
                target_stage: StageId::LineWrap,
                handler,
            } => {
                self.shared.borrow_mut().reactor.subscribe(handler);
                Ok(())
            }
            other => self.downstream.send(other),
        }
    }
}
