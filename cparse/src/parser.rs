// cparse — a staged, event-driven lexical analysis pipeline for C.
//
// Distributed under the GPL 2.0 with a linking exception. See COPYING.

use crate::error::Status;
use crate::event::Event;
use crate::input::InputStream;
use crate::message::{Message, StageId};
use crate::reactor::{EventHandler, MessageSink};
use crate::stages::{
    CommentFilter, CommentScanner, FileLineOverrideFilter, LineWrapFilter, PpTokenScanner,
    RawStackScanner, WhitespaceFilter,
};

/// Wires the seven pipeline stages together, bottom to top, and exposes a
/// single downward [`MessageSink`] endpoint for driving the whole chain.
///
/// Subscribing to any stage's events is just sending a
/// [`Message::Subscribe`] down the chain: each stage recognizes the message
/// addressed to it and otherwise forwards it further down.
pub struct Parser {
    root: Box<dyn MessageSink>,
}

impl Parser {
    pub fn new() -> Self {
        let raw = RawStackScanner::new();
        let file_line = FileLineOverrideFilter::new(raw);
        let wrap = LineWrapFilter::new(file_line);
        let comments = CommentScanner::new(wrap);
        let filtered = CommentFilter::new(comments);
        let whitespace = WhitespaceFilter::new(filtered);
        let pp_token = PpTokenScanner::new(whitespace);
        Parser {
            root: Box::new(pp_token),
        }
    }

    /// Hands ownership of `stream`, named `name`, to the raw-stack scanner.
    /// Streams drain LIFO: the most recently pushed stream is read to
    /// completion (or until it is itself nested by another push) before
    /// control returns to the one beneath it.
    pub fn push_input_stream(&mut self, name: impl Into<String>, stream: Box<dyn InputStream>) -> Status {
        self.root.send(Message::AddInputStream {
            name: name.into(),
            stream,
        })
    }

    /// Subscribes `handler` to the named stage's events.
    pub fn subscribe(&mut self, target_stage: StageId, handler: EventHandler) -> Status {
        self.root.send(Message::Subscribe { target_stage, handler })
    }

    pub fn subscribe_raw_stack(&mut self, handler: EventHandler) -> Status {
        self.subscribe(StageId::RawStack, handler)
    }

    pub fn subscribe_file_line_override(&mut self, handler: EventHandler) -> Status {
        self.subscribe(StageId::FileLineOverride, handler)
    }

    pub fn subscribe_line_wrap(&mut self, handler: EventHandler) -> Status {
        self.subscribe(StageId::LineWrap, handler)
    }

    pub fn subscribe_comment_scanner(&mut self, handler: EventHandler) -> Status {
        self.subscribe(StageId::CommentScanner, handler)
    }

    pub fn subscribe_comment_filter(&mut self, handler: EventHandler) -> Status {
        self.subscribe(StageId::CommentFilter, handler)
    }

    pub fn subscribe_whitespace(&mut self, handler: EventHandler) -> Status {
        self.subscribe(StageId::Whitespace, handler)
    }

    pub fn subscribe_pp_token(&mut self, handler: EventHandler) -> Status {
        self.subscribe(StageId::PpToken, handler)
    }

    /// Latches a `#line`-directive-style file/line rewrite for the next raw
    /// character the file/line override filter observes.
    pub fn file_line_override(&mut self, file: Option<String>, line: u32) -> Status {
        self.root.send(Message::FileLineOverride { file, line })
    }

    /// Begins draining every pushed input stream, broadcasting events to
    /// every subscriber until the stack empties and a final `Eof` fires.
    pub fn run(&mut self) -> Status {
        self.root.send(Message::Run)
    }

    /// Swaps the root `MessageSink` for `new`, returning the one being
    /// replaced so the caller can rethread it further down a custom chain
    /// (for stacking an additional filter in front of the built-in stages).
    pub fn handler_override(&mut self, new: Box<dyn MessageSink>) -> Box<dyn MessageSink> {
        std::mem::replace(&mut self.root, new)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::SliceInput;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn run_collecting(input: &str, target: StageId) -> Vec<Event> {
        let mut parser = Parser::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        parser
            .subscribe(
                target,
                Box::new(move |e: &Event| {
                    sink.borrow_mut().push(e.clone());
                    Ok(())
                }),
            )
            .unwrap();
        parser
            .push_input_stream("a", Box::new(SliceInput::new(input.as_bytes().to_vec())))
            .unwrap();
        parser.run().unwrap();
        Rc::try_unwrap(events).unwrap().into_inner()
    }

    #[test]
    fn s8_full_pipeline_collapses_comment_and_tokenizes() {
        // A line comment followed by a newline and an identifier: the full
        // chain should collapse the comment to nothing observable at the
        // token level (stage 4 turns it into a space, which stage 5 folds
        // into the surrounding newline run) and emit a single identifier.
        let events = run_collecting("//hi\nX", StageId::PpToken);
        let kinds: Vec<&str> = events
            .iter()
            .map(|e| match e {
                Event::Newline(_) => "newline",
                Event::Identifier { name, .. } if name == "X" => "identifier(X)",
                Event::Eof(_) => "eof",
                other => panic!("unexpected event in pipeline output: {other:?}"),
            })
            .collect();
        assert_eq!(kinds, vec!["newline", "identifier(X)", "eof"]);
    }

    #[test]
    fn subscribing_lower_stage_sees_unfiltered_comments() {
        let events = run_collecting("//hi\nX", StageId::CommentScanner);
        assert!(events.iter().any(|e| matches!(e, Event::CommentLineBegin(_))));
    }

    #[test]
    fn file_line_override_is_visible_to_token_stage() {
        let mut parser = Parser::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        parser
            .subscribe_pp_token(Box::new(move |e: &Event| {
                sink.borrow_mut().push(e.clone());
                Ok(())
            }))
            .unwrap();
        parser
            .file_line_override(Some("other.c".into()), 42)
            .unwrap();
        parser
            .push_input_stream("a", Box::new(SliceInput::new(b"x".to_vec())))
            .unwrap();
        parser.run().unwrap();
        let events = events.borrow();
        match &events[0] {
            Event::Identifier { cursor, name } => {
                assert_eq!(name, "x");
                assert_eq!(&*cursor.stream, "other.c");
                assert_eq!(cursor.begin_line, 42);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn handler_override_swaps_the_root_sink() {
        let mut parser = Parser::new();
        let diverted = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&diverted);
        struct Diversion {
            seen: Rc<RefCell<Vec<String>>>,
        }
        impl MessageSink for Diversion {
            fn send(&mut self, msg: Message) -> Status {
                if let Message::AddInputStream { name, .. } = &msg {
                    self.seen.borrow_mut().push(name.clone());
                }
                Ok(())
            }
        }
        let old_root = parser.handler_override(Box::new(Diversion { seen: sink }));
        parser
            .push_input_stream("diverted", Box::new(SliceInput::new(b"x".to_vec())))
            .unwrap();
        assert_eq!(*diverted.borrow(), vec!["diverted".to_string()]);
        // Rethread the original chain back in so it isn't silently dropped.
        let _ = parser.handler_override(old_root);
    }
}
