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

enum State {
    Init,
    /// Buffered `/`, awaiting a second character to decide whether this
    /// opens a comment.
    MaybeComment(Cursor),
    LineComment,
    BlockComment,
    /// Buffered `*` inside a block comment, awaiting a `/` to close it.
    BlockCommentMaybeEnd(Cursor),
    InString,
    InStringEscape,
    InChar,
    InCharEscape,
}

struct Shared {
    reactor: EventReactor,
    state: State,
}

impl Shared {
    fn on_event(&mut self, event: &Event) -> Status {
        match event {
            Event::RawChar { cursor, byte } => self.on_char(cursor.clone(), *byte),
            Event::Eof(cursor) => self.on_eof(cursor.clone()),
            other => self.reactor.broadcast(other),
        }
    }

    fn on_char(&mut self, cursor: Cursor, byte: u8) -> Status {
        match std::mem::replace(&mut self.state, State::Init) {
            State::Init => match byte {
                b'/' => {
                    self.state = State::MaybeComment(cursor);
                    Ok(())
                }
                b'"' => {
                    self.state = State::InString;
                    self.reactor.broadcast(&Event::RawChar { cursor, byte })
                }
                b'\'' => {
                    self.state = State::InChar;
                    self.reactor.broadcast(&Event::RawChar { cursor, byte })
                }
                _ => {
                    self.state = State::Init;
                    self.reactor.broadcast(&Event::RawChar { cursor, byte })
                }
            },
            State::MaybeComment(slash) => match byte {
                b'/' => {
                    self.state = State::LineComment;
                    self.reactor
                        .broadcast(&Event::CommentLineBegin(Cursor::span(&slash, &cursor)))
                }
                b'*' => {
                    self.state = State::BlockComment;
                    self.reactor
                        .broadcast(&Event::CommentBlockBegin(Cursor::span(&slash, &cursor)))
                }
                _ => {
                    self.state = State::Init;
                    self.reactor
                        .broadcast(&Event::RawChar { cursor: slash, byte: b'/' })?;
                    self.on_char(cursor, byte)
                }
            },
            State::LineComment => {
                if byte == b'\n' {
                    self.state = State::Init;
                    let end = Cursor::point(Rc::clone(&cursor.stream), cursor.begin_line, cursor.begin_col);
                    self.reactor.broadcast(&Event::CommentLineEnd(end))?;
                    self.reactor.broadcast(&Event::RawChar { cursor, byte })
                } else {
                    self.state = State::LineComment;
                    self.reactor.broadcast(&Event::RawChar { cursor, byte })
                }
            }
            State::BlockComment => {
                if byte == b'*' {
                    self.state = State::BlockCommentMaybeEnd(cursor);
                    Ok(())
                } else {
                    self.state = State::BlockComment;
                    self.reactor.broadcast(&Event::RawChar { cursor, byte })
                }
            }
            State::BlockCommentMaybeEnd(star) => match byte {
                b'/' => {
                    self.state = State::Init;
                    self.reactor
                        .broadcast(&Event::CommentBlockEnd(Cursor::span(&star, &cursor)))
                }
                b'*' => {
                    self.reactor
                        .broadcast(&Event::RawChar { cursor: star, byte: b'*' })?;
                    self.state = State::BlockCommentMaybeEnd(cursor);
                    Ok(())
                }
                _ => {
                    self.reactor
                        .broadcast(&Event::RawChar { cursor: star, byte: b'*' })?;
                    self.state = State::BlockComment;
                    self.reactor.broadcast(&Event::RawChar { cursor, byte })
                }
            },
            State::InString => match byte {
                b'\\' => {
                    self.state = State::InStringEscape;
                    self.reactor.broadcast(&Event::RawChar { cursor, byte })
                }
                b'"' => {
                    self.state = State::Init;
                    self.reactor.broadcast(&Event::RawChar { cursor, byte })
                }
                _ => {
                    self.state = State::InString;
                    self.reactor.broadcast(&Event::RawChar { cursor, byte })
                }
            },
            State::InStringEscape => {
                self.state = State::InString;
                self.reactor.broadcast(&Event::RawChar { cursor, byte })
            }
            State::InChar => match byte {
                b'\\' => {
                    self.state = State::InCharEscape;
                    self.reactor.broadcast(&Event::RawChar { cursor, byte })
                }
                b'\'' => {
                    self.state = State::Init;
                    self.reactor.broadcast(&Event::RawChar { cursor, byte })
                }
                _ => {
                    self.state = State::InChar;
                    self.reactor.broadcast(&Event::RawChar { cursor, byte })
                }
            },
            State::InCharEscape => {
                self.state = State::InChar;
                self.reactor.broadcast(&Event::RawChar { cursor, byte })
            }
        }
    }

    fn on_eof(&mut self, cursor: Cursor) -> Status {
        match std::mem::replace(&mut self.state, State::Init) {
            State::Init | State::LineComment => self.reactor.broadcast(&Event::Eof(cursor)),
            State::MaybeComment(slash) => {
                self.reactor
                    .broadcast(&Event::RawChar { cursor: slash, byte: b'/' })?;
                self.reactor.broadcast(&Event::Eof(cursor))
            }
            State::BlockComment | State::BlockCommentMaybeEnd(_) => {
                tracing::warn!("comment scanner: unterminated block comment at eof");
                Err(ErrorKind::CommentExpectingStarSlash.into())
            }
            State::InString => {
                tracing::warn!("comment scanner: unterminated string literal at eof");
                Err(ErrorKind::CommentExpectingDoubleQuote.into())
            }
            State::InStringEscape => Err(ErrorKind::CommentExpectingCharDoubleQuote.into()),
            State::InChar => {
                tracing::warn!("comment scanner: unterminated char literal at eof");
                Err(ErrorKind::CommentExpectingSingleQuote.into())
            }
            State::InCharEscape => Err(ErrorKind::CommentExpectingCharSingleQuote.into()),
        }
    }
}

/// Stage 3: recognizes `/* */` and `//` comments, aware of string and
/// character literals so that quoted slashes and asterisks never look like
/// comment delimiters.
pub struct CommentScanner {
    downstream: Box<dyn MessageSink>,
    shared: Rc<RefCell<Shared>>,
}

impl CommentScanner {
    pub fn new<D: MessageSink + 'static>(mut downstream: D) -> Self {
        let shared = Rc::new(RefCell::new(Shared {
            reactor: EventReactor::new(),
            state: State::Init,
        }));
        let cb = Rc::clone(&shared);
        downstream
            .send(Message::Subscribe {
                target_stage: StageId::LineWrap,
                handler: Box::new(move |event: &Event| cb.borrow_mut().on_event(event)),
            })
            .expect("wiring the line-wrap filter's reactor never fails");
        CommentScanner {
            downstream: Box::new(downstream),
            shared,
        }
    }
}

impl MessageSink for CommentScanner {
    fn send(&mut self, msg: Message) -> Status {
        match msg {
            Message::Subscribe {
                target_stage: StageId::CommentScanner,
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
    use crate::stages::{FileLineOverrideFilter, LineWrapFilter, RawStackScanner};
    use std::cell::RefCell as StdRefCell;

    fn collect(input: &str) -> Vec<Event> {
        let raw = RawStackScanner::new();
        let file_line = FileLineOverrideFilter::new(raw);
        let wrap = LineWrapFilter::new(file_line);
        let mut scanner = CommentScanner::new(wrap);
        let events = Rc::new(StdRefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        scanner
            .send(Message::Subscribe {
                target_stage: StageId::CommentScanner,
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

    fn try_collect(input: &str) -> Status {
        let raw = RawStackScanner::new();
        let file_line = FileLineOverrideFilter::new(raw);
        let wrap = LineWrapFilter::new(file_line);
        let mut scanner = CommentScanner::new(wrap);
        scanner
            .send(Message::Subscribe {
                target_stage: StageId::CommentScanner,
                handler: Box::new(|_: &Event| Ok(())),
            })
            .unwrap();
        scanner
            .send(Message::AddInputStream {
                name: "a".into(),
                stream: Box::new(SliceInput::new(input.as_bytes().to_vec())),
            })
            .unwrap();
        scanner.send(Message::Run)
    }

    #[test]
    fn s3_block_comment_delimiters() {
        let events = collect("a/*c*/b");
        let kinds: Vec<&str> = events
            .iter()
            .map(|e| match e {
                Event::RawChar { byte, .. } => match byte {
                    b'a' => "a",
                    b'c' => "c",
                    b'b' => "b",
                    _ => "?",
                },
                Event::CommentBlockBegin(_) => "begin",
                Event::CommentBlockEnd(_) => "end",
                Event::Eof(_) => "eof",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["a", "begin", "c", "end", "b", "eof"]);
    }

    #[test]
    fn line_comment_preserves_trailing_newline() {
        let events = collect("a//c\nb");
        let kinds: Vec<&str> = events
            .iter()
            .map(|e| match e {
                Event::RawChar { byte: b'\n', .. } => "nl",
                Event::RawChar { byte, .. } => {
                    if *byte == b'a' {
                        "a"
                    } else if *byte == b'c' {
                        "c"
                    } else {
                        "b"
                    }
                }
                Event::CommentLineBegin(_) => "begin",
                Event::CommentLineEnd(_) => "end",
                Event::Eof(_) => "eof",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["a", "begin", "c", "end", "nl", "b", "eof"]);
    }

    #[test]
    fn division_is_not_a_comment() {
        let events = collect("a/b");
        let bytes: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                Event::RawChar { byte, .. } => Some(*byte),
                _ => None,
            })
            .collect();
        assert_eq!(bytes, b"a/b");
    }

    #[test]
    fn slashes_inside_strings_are_not_comments() {
        let events = collect(r#""a/*b*/c""#);
        assert!(!events.iter().any(|e| matches!(e, Event::CommentBlockBegin(_))));
    }

    #[test]
    fn unterminated_block_comment_errors() {
        let status = try_collect("a/*never closed");
        assert_eq!(status, Err(ErrorKind::CommentExpectingStarSlash.into()));
    }

    #[test]
    fn unterminated_string_errors() {
        let status = try_collect("\"never closed");
        assert_eq!(status, Err(ErrorKind::CommentExpectingDoubleQuote.into()));
    }
}
