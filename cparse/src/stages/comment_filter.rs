// cparse — a staged, event-driven lexical analysis pipeline for C.
//
// Distributed under the GPL 2.0 with a linking exception. See COPYING.

use std::cell::RefCell;
use std::rc::Rc;

use crate::cursor::Cursor;
use crate::error::Status;
use crate::event::Event;
use crate::message::{Message, StageId};
use crate::reactor::{EventReactor, MessageSink};

struct Shared {
    reactor: EventReactor,
    /// The begin-marker's cursor, set while inside a comment.
    in_comment: Option<Cursor>,
}

impl Shared {
    fn on_event(&mut self, event: &Event) -> Status {
        match event {
            Event::CommentBlockBegin(cursor) | Event::CommentLineBegin(cursor) => {
                self.in_comment = Some(cursor.clone());
                Ok(())
            }
            Event::CommentBlockEnd(cursor) | Event::CommentLineEnd(cursor) => {
                let begin = self.in_comment.take().unwrap_or_else(|| cursor.clone());
                self.reactor.broadcast(&Event::RawChar {
                    cursor: Cursor::span(&begin, cursor),
                    byte: b' ',
                })
            }
            Event::RawChar { .. } if self.in_comment.is_some() => Ok(()),
            other => self.reactor.broadcast(other),
        }
    }
}

/// Stage 4: replaces each comment with a single space, otherwise passing
/// `RawChar`/`Eof` events through unchanged.
pub struct CommentFilter {
    downstream: Box<dyn MessageSink>,
    shared: Rc<RefCell<Shared>>,
}

impl CommentFilter {
    pub fn new<D: MessageSink + 'static>(mut downstream: D) -> Self {
        let shared = Rc::new(RefCell::new(Shared {
            reactor: EventReactor::new(),
            in_comment: None,
        }));
        let cb = Rc::clone(&shared);
        downstream
            .send(Message::Subscribe {
                target_stage: StageId::CommentScanner,
                handler: Box::new(move |event: &Event| cb.borrow_mut().on_event(event)),
            })
            .expect("wiring the comment scanner's reactor never fails");
        CommentFilter {
            downstream: Box::new(downstream),
            shared,
        }
    }
}

impl MessageSink for CommentFilter {
    fn send(&mut self, msg: Message) -> Status {
        match msg {
            Message::Subscribe {
                target_stage: StageId::CommentFilter,
                handler,
            } => {
                self.shared.borrow_mut().reactor.subscribe(handler);
                Ok(())
            }
            other => self.downstream.send(other),
        }
    }
}
