// cparse — a staged, event-driven lexical analysis pipeline for C.
//
// Distributed under the GPL 2.0 with a linking exception. See COPYING.

use std::rc::Rc;

use crate::cursor::Cursor;
use crate::error::{CparseError, ErrorKind, Status};
use crate::event::Event;
use crate::input::InputStream;
use crate::message::{Message, StageId};
use crate::reactor::{EventReactor, MessageSink};

struct StreamFrame {
    name: Rc<str>,
    stream: Box<dyn InputStream>,
    line: u32,
    col: u32,
}

/// Stage 0: multiplexes a LIFO stack of input streams into a single stream
/// of positioned `RawChar` events, followed by one `Eof`.
///
/// This is the bottom of the pipeline: it has no downstream to forward
/// unrecognized messages to, so it rejects them with
/// [`ErrorKind::UnhandledMessage`].
pub struct RawStackScanner {
    stack: Vec<StreamFrame>,
    reactor: EventReactor,
    last_position: Cursor,
}

impl RawStackScanner {
    pub fn new() -> Self {
        RawStackScanner {
            stack: Vec::new(),
            reactor: EventReactor::new(),
            last_position: Cursor::sentinel(),
        }
    }

    fn push_input_stream(&mut self, name: String, stream: Box<dyn InputStream>) {
        self.stack.push(StreamFrame {
            name: Rc::from(name.as_str()),
            stream,
            line: 1,
            col: 1,
        });
    }

    fn run(&mut self) -> Status {
        tracing::debug!("raw-stack scanner: starting drain loop");
        loop {
            let Some(frame) = self.stack.last_mut() else {
                tracing::debug!("raw-stack scanner: all streams drained");
                return self.reactor.broadcast(&Event::Eof(self.last_position.clone()));
            };
            match frame.stream.read_byte().map_err(CparseError::Io)? {
                None => {
                    let frame = self.stack.pop().expect("just matched Some above");
                    self.last_position = Cursor::point(frame.name, frame.line, frame.col);
                    tracing::trace!(stream = %self.last_position.stream, "input stream drained");
                }
                Some(byte) => {
                    let cursor = Cursor::point(Rc::clone(&frame.name), frame.line, frame.col);
                    if byte == b'\n' {
                        frame.line += 1;
                        frame.col = 1;
                    } else {
                        frame.col += 1;
                    }
                    self.last_position = cursor.clone();
                    self.reactor.broadcast(&Event::RawChar { cursor, byte })?;
                }
            }
        }
    }
}

impl Default for RawStackScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageSink for RawStackScanner {
    fn send(&mut self, msg: Message) -> Status {
        match msg {
            Message::AddInputStream { name, stream } => {
                self.push_input_stream(name, stream);
                Ok(())
            }
            Message::Subscribe {
                target_stage: StageId::RawStack,
                handler,
            } => {
                self.reactor.subscribe(handler);
                Ok(())
            }
            Message::Run => self.run(),
            _ => Err(ErrorKind::UnhandledMessage.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SliceInput;
    use std::cell::RefCell;

    fn collect(input: &str) -> Vec<Event> {
        let mut scanner = RawStackScanner::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        scanner
            .send(Message::Subscribe {
                target_stage: StageId::RawStack,
                handler: Box::new(move |e: &Event| {
                    sink.borrow_mut().push(e.clone());
                    Ok(())
                }),
            })
            .unwrap();
        scanner
            .send(Message::AddInputStream {
                name: "a".into(),
                stream: Box::new(SliceInput::new(input.as_bytes().to_vec())),
            })
            .unwrap();
        scanner.send(Message::Run).unwrap();
        Rc::try_unwrap(events).unwrap().into_inner()
    }

    #[test]
    fn s1_byte_positions() {
        let events = collect("a\nb");
        assert_eq!(events.len(), 4);
        match &events[0] {
            Event::RawChar { cursor, byte } => {
                assert_eq!(*byte, b'a');
                assert_eq!((cursor.begin_line, cursor.begin_col), (1, 1));
            }
            other => panic!("unexpected {other:?}"),
        }
        match &events[1] {
            Event::RawChar { cursor, byte } => {
                assert_eq!(*byte, b'\n');
                assert_eq!((cursor.begin_line, cursor.begin_col), (1, 2));
            }
            other => panic!("unexpected {other:?}"),
        }
        match &events[2] {
            Event::RawChar { cursor, byte } => {
                assert_eq!(*byte, b'b');
                assert_eq!((cursor.begin_line, cursor.begin_col), (2, 1));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(events[3].is_eof());
    }

    #[test]
    fn byte_conservation() {
        let input = "int main(void) {\n  return 0;\n}\n";
        let events = collect(input);
        let raw_chars = events.iter().filter(|e| matches!(e, Event::RawChar { .. })).count();
        assert_eq!(raw_chars, input.len());
        assert!(events.last().unwrap().is_eof());
    }

    #[test]
    fn multiple_streams_drain_lifo() {
        let mut scanner = RawStackScanner::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        scanner
            .send(Message::Subscribe {
                target_stage: StageId::RawStack,
                handler: Box::new(move |e: &Event| {
                    sink.borrow_mut().push(e.clone());
                    Ok(())
                }),
            })
            .unwrap();
        scanner
            .send(Message::AddInputStream {
                name: "first".into(),
                stream: Box::new(SliceInput::new(b"a".to_vec())),
            })
            .unwrap();
        scanner
            .send(Message::AddInputStream {
                name: "second".into(),
                stream: Box::new(SliceInput::new(b"b".to_vec())),
            })
            .unwrap();
        scanner.send(Message::Run).unwrap();
        let events = events.borrow();
        // The most recently pushed stream drains first (LIFO).
        match &events[0] {
            Event::RawChar { cursor, byte } => {
                assert_eq!(*byte, b'b');
                assert_eq!(&*cursor.stream, "second");
            }
            other => panic!("unexpected {other:?}"),
        }
        match &events[1] {
            Event::RawChar { cursor, byte } => {
                assert_eq!(*byte, b'a');
                assert_eq!(&*cursor.stream, "first");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unhandled_message_is_rejected() {
        let mut scanner = RawStackScanner::new();
        let status = scanner.send(Message::FileLineOverride { file: None, line: 1 });
        assert!(status.is_err());
    }
}
