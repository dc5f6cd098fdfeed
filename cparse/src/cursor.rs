// cparse — a staged, event-driven lexical analysis pipeline for C.
//
// Distributed under the GPL 2.0 with a linking exception. See COPYING.

use std::fmt;
use std::rc::Rc;

/// A position, or span of positions, within a named input stream.
///
/// Lines and columns are 1-based. A `Cursor` referring to a single byte has
/// `begin == end`; one produced by [`Cursor::span`] covers everything from
/// the first cursor's begin to the second cursor's end.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub stream: Rc<str>,
    pub begin_line: u32,
    pub begin_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl Cursor {
    /// A cursor for a single point in `stream`.
    pub fn point(stream: Rc<str>, line: u32, col: u32) -> Self {
        Cursor {
            stream,
            begin_line: line,
            begin_col: col,
            end_line: line,
            end_col: col,
        }
    }

    /// A cursor spanning from the start of `begin` to the end of `end`.
    ///
    /// The stream name is taken from `begin`; callers never span across
    /// streams.
    pub fn span(begin: &Cursor, end: &Cursor) -> Self {
        Cursor {
            stream: Rc::clone(&begin.stream),
            begin_line: begin.begin_line,
            begin_col: begin.begin_col,
            end_line: end.end_line,
            end_col: end.end_col,
        }
    }

    /// Extends this cursor's end to the end of `to`, in place.
    pub fn extend(&mut self, to: &Cursor) {
        self.end_line = to.end_line;
        self.end_col = to.end_col;
    }

    /// A synthetic cursor used before any input stream has produced a byte.
    pub fn sentinel() -> Self {
        Cursor::point(Rc::from("<none>"), 1, 1)
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (self.begin_line, self.begin_col) == (self.end_line, self.end_col) {
            write!(f, "{}:{}:{}", self.stream, self.begin_line, self.begin_col)
        } else {
            write!(
                f,
                "{}:{}:{}-{}:{}",
                self.stream, self.begin_line, self.begin_col, self.end_line, self.end_col
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_has_equal_begin_and_end() {
        let c = Cursor::point(Rc::from("a"), 3, 4);
        assert_eq!((c.begin_line, c.begin_col), (3, 4));
        assert_eq!((c.end_line, c.end_col), (3, 4));
    }

    #[test]
    fn span_takes_stream_from_begin() {
        let a = Cursor::point(Rc::from("a"), 1, 1);
        let b = Cursor::point(Rc::from("a"), 1, 5);
        let s = Cursor::span(&a, &b);
        assert_eq!((s.begin_line, s.begin_col), (1, 1));
        assert_eq!((s.end_line, s.end_col), (1, 5));
    }

    #[test]
    fn display_collapses_point_cursors() {
        let c = Cursor::point(Rc::from("f.c"), 2, 3);
        assert_eq!(c.to_string(), "f.c:2:3");
    }
}
