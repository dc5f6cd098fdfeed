// cparse — a staged, event-driven lexical analysis pipeline for C.
//
// Distributed under the GPL 2.0 with a linking exception. See COPYING.

use crate::cursor::Cursor;

/// The kind of a [`Event::RawInteger`]'s digit text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntKind {
    /// Decimal or octal (a leading `0` that isn't `0x`/`0X`).
    DecOrOctal,
    /// Hexadecimal (`0x`/`0X` prefix).
    Hex,
}

/// Every distinct C punctuator this scanner recognizes, including the
/// digraphs. Each has its own discriminant, so downstream stages never need
/// to re-parse the punctuator's spelling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PunctKind {
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Dot,
    Arrow,
    PlusPlus,
    MinusMinus,
    Amp,
    Star,
    Plus,
    Minus,
    Tilde,
    Bang,
    Slash,
    Percent,
    ShiftLeft,
    ShiftRight,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    EqEq,
    NotEq,
    Caret,
    Pipe,
    AmpAmp,
    PipePipe,
    Question,
    Colon,
    Semicolon,
    Ellipsis,
    Assign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    PlusAssign,
    MinusAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    AmpAssign,
    CaretAssign,
    PipeAssign,
    Comma,
    Hash,
    HashHash,
    /// `<:`, a digraph for `[`.
    LBracketDigraph,
    /// `:>`, a digraph for `]`.
    RBracketDigraph,
    /// `<%`, a digraph for `{`.
    LBraceDigraph,
    /// `%>`, a digraph for `}`.
    RBraceDigraph,
    /// `%:`, a digraph for `#`.
    HashDigraph,
    /// `%:%:`, a digraph for `##`.
    HashHashDigraph,
}

/// A typed integer-constant value. Classifying a [`Event::RawInteger`]'s
/// digit text into one of these is a higher preprocessor-control-line
/// stage's job (see the crate's design notes); this type exists so that
/// stage's event taxonomy (`Event::IntegerToken`) has something concrete to
/// carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntValue {
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    LongLong(i64),
    ULongLong(u64),
}

/// An upward event, carrying the source position it was scanned from.
///
/// Events are produced fresh at emission time and own any text they carry;
/// a subscriber that wants to hold on to one past the synchronous dispatch
/// call that delivered it simply keeps its own `clone()`.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Emitted exactly once per run, after every input stream has drained.
    Eof(Cursor),
    /// A single raw source byte.
    RawChar { cursor: Cursor, byte: u8 },
    /// The `/*` that opens a block comment.
    CommentBlockBegin(Cursor),
    /// The `*/` that closes a block comment.
    CommentBlockEnd(Cursor),
    /// The `//` that opens a line comment.
    CommentLineBegin(Cursor),
    /// The position just before the newline that ends a line comment.
    CommentLineEnd(Cursor),
    /// A run of non-newline whitespace.
    Whitespace(Cursor),
    /// A run of whitespace containing at least one newline.
    Newline(Cursor),
    /// A C identifier or keyword; this lexer does not classify keywords.
    Identifier { cursor: Cursor, name: String },
    /// A preprocessor integer token, not yet classified into a signed value.
    RawInteger {
        cursor: Cursor,
        digits: String,
        kind: IntKind,
        signed_flag: bool,
    },
    /// A preprocessor floating-point token.
    RawFloat { cursor: Cursor, digits: String },
    /// A string literal, including its quotes and any encoding prefix.
    RawString {
        cursor: Cursor,
        literal: String,
        system: bool,
    },
    /// A character literal, including its quotes and any encoding prefix.
    RawCharLit { cursor: Cursor, literal: String },
    /// A C punctuator.
    Punctuator { cursor: Cursor, kind: PunctKind },
    /// An `#include` path, produced by a higher stage but defined here
    /// because the event taxonomy is shared.
    Include {
        cursor: Cursor,
        path: String,
        system: bool,
    },
    /// A classified integer constant, produced by a higher stage.
    IntegerToken { cursor: Cursor, value: IntValue },
}

impl Event {
    /// The cursor every event variant carries.
    pub fn cursor(&self) -> &Cursor {
        match self {
            Event::Eof(c)
            | Event::RawChar { cursor: c, .. }
            | Event::CommentBlockBegin(c)
            | Event::CommentBlockEnd(c)
            | Event::CommentLineBegin(c)
            | Event::CommentLineEnd(c)
            | Event::Whitespace(c)
            | Event::Newline(c)
            | Event::Identifier { cursor: c, .. }
            | Event::RawInteger { cursor: c, .. }
            | Event::RawFloat { cursor: c, .. }
            | Event::RawString { cursor: c, .. }
            | Event::RawCharLit { cursor: c, .. }
            | Event::Punctuator { cursor: c, .. }
            | Event::Include { cursor: c, .. }
            | Event::IntegerToken { cursor: c, .. } => c,
        }
    }

    /// Whether this is the terminal [`Event::Eof`].
    pub fn is_eof(&self) -> bool {
        matches!(self, Event::Eof(_))
    }
}
