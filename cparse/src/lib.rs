// cparse — a staged, event-driven lexical analysis pipeline for C.
//
// Distributed under the GPL 2.0 with a linking exception. See COPYING.

//! A staged, event-driven lexical analysis pipeline for the C preprocessor.
//!
//! Source bytes flow upward through seven stages — raw-stack scanning,
//! `#line` override rewriting, backslash-newline elision, comment scanning,
//! comment filtering, whitespace collapsing, and preprocessor token
//! scanning — each publishing [`event::Event`]s to whatever subscribed above
//! it and forwarding [`message::Message`]s downward to whichever stage
//! recognizes them. [`parser::Parser`] wires the full chain together.

pub mod cursor;
pub mod error;
pub mod event;
pub mod input;
pub mod message;
pub mod parser;
pub mod reactor;
pub mod stages;

pub use cursor::Cursor;
pub use error::{CparseError, ErrorKind, Status};
pub use event::Event;
pub use message::{Message, StageId};
pub use parser::Parser;
pub use reactor::{EventReactor, MessageSink};
