// cparse — a staged, event-driven lexical analysis pipeline for C.
//
// Distributed under the GPL 2.0 with a linking exception. See COPYING.

use std::cell::RefCell;
use std::rc::Rc;

use crate::cursor::Cursor;
use crate::error::{ErrorKind, Status};
use crate::event::Event;
use crate::message::{Message, StageId};
use crate::reactor::{EventReactor, MessageSink};

struct PendingOverride {
    file: Option<String>,
    line: u32,
}

/// Tracks cursor position once it has diverged from the raw-stack scanner's
/// own count, because a `#line`-style override has been applied. This is
/// the "file position cache" the status-code taxonomy alludes to; it never
/// escapes this module.
struct ActiveOverride {
    stream: Rc<str>,
    line: u32,
    col: u32,
}

struct Shared {
    reactor: EventReactor,
    pending: Option<PendingOverride>,
    active: Option<ActiveOverride>,
}

impl Shared {
    fn on_event(&mut self, event: &Event) -> Status {
        match event {
            Event::RawChar { cursor, byte } => {
                let out_cursor = if let Some(pending) = self.pending.take() {
                    let stream: Rc<str> = match pending.file {
                        Some(file) => Rc::from(file.as_str()),
                        None => Rc::clone(&cursor.stream),
                    };
                    let out = Cursor::point(Rc::clone(&stream), pending.line, 1);
                    self.active = Some(ActiveOverride {
                        stream,
                        line: pending.line,
                        col: 1,
                    });
                    out
                } else if let Some(active) = &self.active {
                    Cursor::point(Rc::clone(&active.stream), active.line, active.col)
                } else {
                    cursor.clone()
                };
                if let Some(active) = &mut self.active {
                    if *byte == b'\n' {
                        active.line += 1;
                        active.col = 1;
                    } else {
                        active.col += 1;
                    }
                }
                self.reactor.broadcast(&Event::RawChar {
                    cursor: out_cursor,
                    byte: *byte,
                })
            }
            Event::Eof(cursor) => self.reactor.broadcast(&Event::Eof(cursor.clone())),
            other => self.reactor.broadcast(other),
        }
    }

    fn latch(&mut self, file: Option<String>, line: u32) -> Status {
        if self.pending.is_some() {
            return Err(ErrorKind::FilePositionCacheAlreadySet.into());
        }
        self.pending = Some(PendingOverride { file, line });
        Ok(())
    }
}

/// Stage 1: rewrites cursor positions in response to `#line`-style
/// directives recognized by a higher stage and reported via
/// [`Message::FileLineOverride`].
pub struct FileLineOverrideFilter {
    downstream: Box<dyn MessageSink>,
    shared: Rc<RefCell<Shared>>,
}

impl FileLineOverrideFilter {
    pub fn new<D: MessageSink + 'static>(mut downstream: D) -> Self {
        let shared = Rc::new(RefCell::new(Shared {
            reactor: EventReactor::new(),
            pending: None,
            active: None,
        }));
        let cb = Rc::clone(&shared);
        downstream
            .send(Message::Subscribe {
                target_stage: StageId::RawStack,
                handler: Box::new(move |event: &Event| cb.borrow_mut().on_event(event)),
            })
            .expect("wiring the raw-stack scanner's reactor never fails");
        FileLineOverrideFilter {
            downstream: Box::new(downstream),
            shared,
        }
    }
}

impl MessageSink for FileLineOverrideFilter {
    fn send(&mut self, msg: Message) -> Status {
        match msg {
            Message::Subscribe {
                target_stage: StageId::FileLineOverride,
                handler,
            } => {
                self.shared.borrow_mut().reactor.subscribe(handler);
                Ok(())
            }
            Message::FileLineOverride { file, line } => self.shared.borrow_mut().latch(file, line),
            other => self.downstream.send(other),
        }
    }
}
