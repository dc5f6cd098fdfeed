// cparse — a staged, event-driven lexical analysis pipeline for C.
//
// Distributed under the GPL 2.0 with a linking exception. See COPYING.

use std::cell::RefCell;
use std::rc::Rc;

use crate::cursor::Cursor;
use crate::error::{ErrorKind, Status};
use crate::event::{Event, IntKind, PunctKind};
use crate::message::{Message, StageId};
use crate::reactor::{EventReactor, MessageSink};

/// Every punctuator this scanner recognizes, longest-match first within
/// each starting character (the table is searched exhaustively since the
/// set is tiny; a generated trie would be overkill here).
const PUNCTUATORS: &[(&str, PunctKind)] = &[
    ("%:%:", PunctKind::HashHashDigraph),
    ("<<=", PunctKind::ShiftLeftAssign),
    (">>=", PunctKind::ShiftRightAssign),
    ("...", PunctKind::Ellipsis),
    ("->", PunctKind::Arrow),
    ("++", PunctKind::PlusPlus),
    ("--", PunctKind::MinusMinus),
    ("<<", PunctKind::ShiftLeft),
    (">>", PunctKind::ShiftRight),
    ("<=", PunctKind::LessEq),
    (">=", PunctKind::GreaterEq),
    ("==", PunctKind::EqEq),
    ("!=", PunctKind::NotEq),
    ("&&", PunctKind::AmpAmp),
    ("||", PunctKind::PipePipe),
    ("*=", PunctKind::StarAssign),
    ("/=", PunctKind::SlashAssign),
    ("%=", PunctKind::PercentAssign),
    ("+=", PunctKind::PlusAssign),
    ("-=", PunctKind::MinusAssign),
    ("&=", PunctKind::AmpAssign),
    ("^=", PunctKind::CaretAssign),
    ("|=", PunctKind::PipeAssign),
    ("##", PunctKind::HashHash),
    ("<:", PunctKind::LBracketDigraph),
    (":>", PunctKind::RBracketDigraph),
    ("<%", PunctKind::LBraceDigraph),
    ("%>", PunctKind::RBraceDigraph),
    ("%:", PunctKind::HashDigraph),
    ("[", PunctKind::LBracket),
    ("]", PunctKind::RBracket),
    ("(", PunctKind::LParen),
    (")", PunctKind::RParen),
    ("{", PunctKind::LBrace),
    ("}", PunctKind::RBrace),
    (".", PunctKind::Dot),
    ("&", PunctKind::Amp),
    ("*", PunctKind::Star),
    ("+", PunctKind::Plus),
    ("-", PunctKind::Minus),
    ("~", PunctKind::Tilde),
    ("!", PunctKind::Bang),
    ("/", PunctKind::Slash),
    ("%", PunctKind::Percent),
    ("<", PunctKind::Less),
    (">", PunctKind::Greater),
    ("^", PunctKind::Caret),
    ("|", PunctKind::Pipe),
    ("?", PunctKind::Question),
    (":", PunctKind::Colon),
    (";", PunctKind::Semicolon),
    ("=", PunctKind::Assign),
    (",", PunctKind::Comma),
    ("#", PunctKind::Hash),
];

fn punct_lookup(s: &str) -> Option<PunctKind> {
    PUNCTUATORS.iter().find(|(t, _)| *t == s).map(|(_, k)| *k)
}

fn punct_is_prefix(s: &str) -> bool {
    PUNCTUATORS.iter().any(|(t, _)| t.starts_with(s))
}

/// Characters that can start a punctuator, excluding `.` (handled
/// separately because of the `.`/`...`/pp-number ambiguity).
fn starts_punctuator(byte: u8) -> bool {
    matches!(
        byte,
        b'[' | b']' | b'(' | b')' | b'{' | b'}' | b'-' | b'&' | b'*' | b'+' | b'~' | b'!' | b'/'
            | b'%' | b'<' | b'>' | b'=' | b'^' | b'|' | b'?' | b':' | b';' | b',' | b'#'
    )
}

enum State {
    Start,
    /// Buffered `.`, deciding between a pp-number and a `.`/`...` punctuator.
    DotStart(Cursor),
    Identifier { text: String, begin: Cursor, last: Cursor },
    PpNumber { text: String, begin: Cursor, last: Cursor, last_byte: u8 },
    StringLiteral { text: String, begin: Cursor, last: Cursor, escape: bool },
    CharLiteral { text: String, begin: Cursor, last: Cursor, escape: bool },
    Punctuator { text: String, begin: Cursor, last: Cursor },
}

fn classify_pp_number(text: &str) -> Result<EventKind, ErrorKind> {
    let lower = text.to_ascii_lowercase();
    let is_hex = lower.starts_with("0x");
    if is_hex {
        let has_dot = text.contains('.');
        let has_p = lower.contains('p');
        if has_dot && !has_p {
            return Err(ErrorKind::PpScannerHexFloatExpectingP);
        }
        if has_p {
            Ok(EventKind::Float)
        } else {
            Ok(EventKind::Integer(IntKind::Hex))
        }
    } else if text.contains('.') || lower.contains('e') {
        Ok(EventKind::Float)
    } else {
        Ok(EventKind::Integer(IntKind::DecOrOctal))
    }
}

enum EventKind {
    Float,
    Integer(IntKind),
}

struct Shared {
    reactor: EventReactor,
    state: State,
}

impl Shared {
    fn on_event(&mut self, event: &Event) -> Status {
        match event {
            Event::RawChar { cursor, byte } => self.on_char(cursor.clone(), *byte),
            Event::Whitespace(cursor) => self.on_delimiter(Event::Whitespace(cursor.clone())),
            Event::Newline(cursor) => self.on_delimiter(Event::Newline(cursor.clone())),
            Event::Eof(cursor) => self.on_eof(cursor.clone()),
            other => self.reactor.broadcast(other),
        }
    }

    /// A `Whitespace`/`Newline` event from stage 5 terminates whatever
    /// token is being accumulated, the same as any non-matching character
    /// would, then is forwarded (or, inside a literal, folded into the
    /// accumulated text as a single representative byte — stage 5 collapses
    /// whitespace irrespective of quoting, so this scanner must cope with
    /// losing the exact run length inside literals).
    fn on_delimiter(&mut self, event: Event) -> Status {
        let filler = if matches!(event, Event::Newline(_)) { b'\n' } else { b' ' };
        match std::mem::replace(&mut self.state, State::Start) {
            State::Start => {
                self.state = State::Start;
                self.reactor.broadcast(&event)
            }
            State::StringLiteral { mut text, begin, last, .. } => {
                text.push(filler as char);
                self.state = State::StringLiteral {
                    text,
                    begin,
                    last,
                    escape: false,
                };
                Ok(())
            }
            State::CharLiteral { mut text, begin, last, .. } => {
                text.push(filler as char);
                self.state = State::CharLiteral {
                    text,
                    begin,
                    last,
                    escape: false,
                };
                Ok(())
            }
            other => {
                self.state = other;
                self.finish_token()?;
                self.state = State::Start;
                self.reactor.broadcast(&event)
            }
        }
    }

    fn on_char(&mut self, cursor: Cursor, byte: u8) -> Status {
        match std::mem::replace(&mut self.state, State::Start) {
            State::Start => self.start(cursor, byte),
            State::DotStart(dot) => {
                if byte.is_ascii_digit() {
                    let mut text = String::from(".");
                    text.push(byte as char);
                    self.state = State::PpNumber {
                        text,
                        begin: dot,
                        last: cursor,
                        last_byte: byte,
                    };
                    Ok(())
                } else if byte == b'.' {
                    self.state = State::Punctuator {
                        text: "..".to_string(),
                        begin: dot,
                        last: cursor,
                    };
                    Ok(())
                } else {
                    self.reactor
                        .broadcast(&Event::Punctuator { cursor: dot, kind: PunctKind::Dot })?;
                    self.start(cursor, byte)
                }
            }
            State::Identifier { mut text, begin, last } => {
                if byte.is_ascii_alphanumeric() || byte == b'_' {
                    text.push(byte as char);
                    self.state = State::Identifier { text, begin, last: cursor };
                    Ok(())
                } else {
                    self.reactor.broadcast(&Event::Identifier {
                        cursor: Cursor::span(&begin, &last),
                        name: text,
                    })?;
                    self.start(cursor, byte)
                }
            }
            State::PpNumber { mut text, begin, last, last_byte } => {
                let continues = byte.is_ascii_digit()
                    || byte == b'.'
                    || byte.is_ascii_alphabetic()
                    || ((byte == b'+' || byte == b'-')
                        && matches!(last_byte, b'e' | b'E' | b'p' | b'P'));
                if continues {
                    text.push(byte as char);
                    self.state = State::PpNumber {
                        text,
                        begin,
                        last: cursor,
                        last_byte: byte,
                    };
                    Ok(())
                } else {
                    self.emit_pp_number(text, Cursor::span(&begin, &last))?;
                    self.start(cursor, byte)
                }
            }
            State::StringLiteral { mut text, begin, last, escape } => {
                text.push(byte as char);
                if escape {
                    self.state = State::StringLiteral { text, begin, last: cursor, escape: false };
                    Ok(())
                } else if byte == b'\\' {
                    self.state = State::StringLiteral { text, begin, last: cursor, escape: true };
                    Ok(())
                } else if byte == b'"' {
                    self.reactor.broadcast(&Event::RawString {
                        cursor: Cursor::span(&begin, &cursor),
                        literal: text,
                        system: false,
                    })
                } else {
                    self.state = State::StringLiteral { text, begin, last: cursor, escape: false };
                    Ok(())
                }
            }
            State::CharLiteral { mut text, begin, last, escape } => {
                text.push(byte as char);
                if escape {
                    self.state = State::CharLiteral { text, begin, last: cursor, escape: false };
                    Ok(())
                } else if byte == b'\\' {
                    self.state = State::CharLiteral { text, begin, last: cursor, escape: true };
                    Ok(())
                } else if byte == b'\'' {
                    self.reactor.broadcast(&Event::RawCharLit {
                        cursor: Cursor::span(&begin, &cursor),
                        literal: text,
                    })
                } else {
                    self.state = State::CharLiteral { text, begin, last: cursor, escape: false };
                    Ok(())
                }
            }
            State::Punctuator { text, begin, last } => {
                let mut candidate = text.clone();
                candidate.push(byte as char);
                if punct_is_prefix(&candidate) {
                    self.state = State::Punctuator { text: candidate, begin, last: cursor };
                    Ok(())
                } else {
                    self.emit_punctuator(text, Cursor::span(&begin, &last))?;
                    self.start(cursor, byte)
                }
            }
        }
    }

    fn start(&mut self, cursor: Cursor, byte: u8) -> Status {
        match byte {
            b'_' | b'a'..=b'z' | b'A'..=b'Z' => {
                self.state = State::Identifier {
                    text: (byte as char).to_string(),
                    begin: cursor.clone(),
                    last: cursor,
                };
                Ok(())
            }
            b'0'..=b'9' => {
                self.state = State::PpNumber {
                    text: (byte as char).to_string(),
                    begin: cursor.clone(),
                    last: cursor,
                    last_byte: byte,
                };
                Ok(())
            }
            b'.' => {
                self.state = State::DotStart(cursor);
                Ok(())
            }
            b'"' => {
                self.state = State::StringLiteral {
                    text: (byte as char).to_string(),
                    begin: cursor.clone(),
                    last: cursor,
                    escape: false,
                };
                Ok(())
            }
            b'\'' => {
                self.state = State::CharLiteral {
                    text: (byte as char).to_string(),
                    begin: cursor.clone(),
                    last: cursor,
                    escape: false,
                };
                Ok(())
            }
            b if starts_punctuator(b) => {
                self.state = State::Punctuator {
                    text: (byte as char).to_string(),
                    begin: cursor.clone(),
                    last: cursor,
                };
                Ok(())
            }
            _ => {
                tracing::warn!(byte, "preprocessor scanner: unexpected character");
                Err(ErrorKind::PpScannerUnexpectedCharacter.into())
            }
        }
    }

    fn emit_pp_number(&mut self, text: String, cursor: Cursor) -> Status {
        match classify_pp_number(&text) {
            Ok(EventKind::Float) => self.reactor.broadcast(&Event::RawFloat { cursor, digits: text }),
            Ok(EventKind::Integer(kind)) => self.reactor.broadcast(&Event::RawInteger {
                cursor,
                digits: text,
                kind,
                signed_flag: false,
            }),
            Err(kind) => Err(kind.into()),
        }
    }

    fn emit_punctuator(&mut self, text: String, cursor: Cursor) -> Status {
        let kind = punct_lookup(&text).ok_or(ErrorKind::PpScannerBadState)?;
        self.reactor.broadcast(&Event::Punctuator { cursor, kind })
    }

    /// Finalizes whatever token is currently being accumulated, without
    /// starting a new one. Used when a run boundary (whitespace/newline) or
    /// Eof interrupts accumulation.
    fn finish_token(&mut self) -> Status {
        match std::mem::replace(&mut self.state, State::Start) {
            State::Start => Ok(()),
            State::DotStart(dot) => {
                self.reactor
                    .broadcast(&Event::Punctuator { cursor: dot, kind: PunctKind::Dot })
            }
            State::Identifier { text, begin, last } => self.reactor.broadcast(&Event::Identifier {
                cursor: Cursor::span(&begin, &last),
                name: text,
            }),
            State::PpNumber { text, begin, last, .. } => self.emit_pp_number(text, Cursor::span(&begin, &last)),
            State::StringLiteral { .. } | State::CharLiteral { .. } => {
                Err(ErrorKind::PpScannerBadState.into())
            }
            State::Punctuator { text, begin, last } => self.emit_punctuator(text, Cursor::span(&begin, &last)),
        }
    }

    fn on_eof(&mut self, cursor: Cursor) -> Status {
        self.finish_token()?;
        self.reactor.broadcast(&Event::Eof(cursor))
    }
}

/// Stage 6: the preprocessor token scanner. Consumes `RawChar`,
/// `Whitespace`, `Newline`, and `Eof` events from the whitespace filter
/// below, emitting identifiers, pp-numbers, string/char literals,
/// punctuators, and forwarding `Whitespace`/`Newline`/`Eof` as tokens of
/// their own.
pub struct PpTokenScanner {
    downstream: Box<dyn MessageSink>,
    shared: Rc<RefCell<Shared>>,
}

impl PpTokenScanner {
    pub fn new<D: MessageSink + 'static>(mut downstream: D) -> Self {
        let shared = Rc::new(RefCell::new(Shared {
            reactor: EventReactor::new(),
            state: State::Start,
        }));
        let cb = Rc::clone(&shared);
        downstream
            .send(Message::Subscribe {
                target_stage: StageId::Whitespace,
                handler: Box::new(move |event: &Event| cb.borrow_mut().on_event(event)),
            })
            .expect("wiring the whitespace filter's reactor never fails");
        PpTokenScanner {
            downstream: Box::new(downstream),
            shared,
        }
    }
}

impl MessageSink for PpTokenScanner {
    fn send(&mut self, msg: Message) -> Status {
        match msg {
            Message::Subscribe {
                target_stage: StageId::PpToken,
                handler,
            } => {
                self.shared.borrow_mut().reactor.subscribe(handler);
                Ok(())
            }
            other => self.downstream.send(other),
        }
    }
}
