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

struct Run {
    has_newline: bool,
    cursor: Cursor,
}

struct Shared {
    reactor: EventReactor,
    run: Option<Run>,
}

impl Shared {
    fn flush(&mut self) -> Status {
        if let Some(run) = self.run.take() {
            let event = if run.has_newline {
                Event::Newline(run.cursor)
            } else {
                Event::Whitespace(run.cursor)
            };
            self.reactor.broadcast(&event)?;
        }
        Ok(())
    }

    fn on_event(&mut self, event: &Event) -> Status {
        match event {
            Event::RawChar { cursor, byte } => {
                if byte.is_ascii_whitespace() {
                    match &mut self.run {
                        Some(run) => {
                            run.cursor.extend(cursor);
                            run.has_newline |= *byte == b'\n';
                        }
                        None => {
                            self.run = Some(Run {
                                has_newline: *byte == b'\n',
                                cursor: cursor.clone(),
                            });
                        }
                    }
                    Ok(())
                } else {
                    self.flush()?;
                    self.reactor.broadcast(&Event::RawChar {
                        cursor: cursor.clone(),
                        byte: *byte,
                    })
                }
            }
            Event::Eof(cursor) => {
                self.flush()?;
                self.reactor.broadcast(&Event::Eof(cursor.clone()))
            }
            other => self.reactor.broadcast(other),
        }
    }
}

/// Stage 5: collapses runs of non-newline whitespace into a single
/// `Whitespace` event, and runs containing a newline into a single
/// `Newline` event.
pub struct WhitespaceFilter {
    downstream: Box<dyn MessageSink>,
    shared: Rc<RefCell<Shared>>,
}

impl WhitespaceFilter {
    pub fn new<D: MessageSink + 'static>(mut downstream: D) -> Self {
        let shared = Rc::new(RefCell::new(Shared {
            reactor: EventReactor::new(),
            run: None,
        }));
        let cb = Rc::clone(&shared);
        downstream
            .send(Message::Subscribe {
                target_stage: StageId::CommentFilter,
                handler: Box::new(move |event: &Event| cb.borrow_mut().on_event(event)),
            })
            .expect("wiring the comment filter's reactor never fails");
        WhitespaceFilter {
            downstream: Box::new(downstream),
            shared,
        }
    }
}

impl MessageSink for WhitespaceFilter {
    fn send(&mut self, msg: Message) -> Status {
        match msg {
            Message::Subscribe {
                target_stage: StageId::Whitespace,
                handler,
            } => {
                self.shared.borrow_mut().reactor.subscribe(handler);
                Ok(())
            }
            other => self.downstream.send(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SliceInput;
    use crate::stages::{CommentFilter, CommentScanner, FileLineOverrideFilter, LineWrapFilter, RawStackScanner};
    use std::cell::RefCell as StdRefCell;

    fn collect(input: &str) -> Vec<Event> {
        let raw = RawStackScanner::new();
        let file_line = FileLineOverrideFilter::new(raw);
        let wrap = LineWrapFilter::new(file_line);
        let comments = CommentScanner::new(wrap);
        let filter = CommentFilter::new(comments);
        let mut ws = WhitespaceFilter::new(filter);
        let events = Rc::new(StdRefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        ws.send(Message::Subscribe {
            target_stage: StageId::Whitespace,
            handler: Box::new(move |e: &Event| {
                sink.borrow_mut().push(e.clone());
                Ok(())
            }),
        })
        .unwrap();
        ws.send(Message::AddInputStream {
            name: "a".into(),
            stream: Box::new(SliceInput::new(input.as_bytes().to_vec())),
        })
        .unwrap();
        ws.send(Message::Run).unwrap();
        Rc::try_unwrap(events).unwrap().into_inner()
    }

    fn kinds(events: &[Event]) -> Vec<&'static str> {
        events
            .iter()
            .map(|e| match e {
                Event::RawChar { .. } => "char",
                Event::Whitespace(_) => "ws",
                Event::Newline(_) => "nl",
                Event::Eof(_) => "eof",
                _ => "other",
            })
            .collect()
    }

    #[test]
    fn s5_collapses_non_newline_whitespace() {
        let events = collect("a  \t b");
        assert_eq!(kinds(&events), vec!["char", "ws", "char", "eof"]);
    }

    #[test]
    fn s5_collapses_whitespace_with_newline() {
        let events = collect("a \n b");
        assert_eq!(kinds(&events), vec!["char", "nl", "char", "eof"]);
    }

    #[test]
    fn whitespace_collapse_law() {
        // No two Whitespace-or-Newline events ever appear back to back.
        let events = collect("a   b\n\n\nc \t\t d");
        for pair in events.windows(2) {
            let both_runs = matches!(pair[0], Event::Whitespace(_) | Event::Newline(_))
                && matches!(pair[1], Event::Whitespace(_) | Event::Newline(_));
            assert!(!both_runs, "adjacent whitespace-like events: {pair:?}");
        }
    }
}
