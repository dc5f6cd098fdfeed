// cparse — a staged, event-driven lexical analysis pipeline for C.
//
// Distributed under the GPL 2.0 with a linking exception. See COPYING.

use crate::input::InputStream;
use crate::reactor::EventHandler;

/// Identifies which stage's `EventReactor` a [`Message::Subscribe`] or
/// [`Message::FileLineOverride`] targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StageId {
    RawStack,
    FileLineOverride,
    LineWrap,
    CommentScanner,
    CommentFilter,
    Whitespace,
    PpToken,
}

/// A downward control message. Messages are owned values: a stage either
/// consumes one (taking ownership of its payload) or passes it further down
/// the chain unchanged.
pub enum Message {
    /// Hand ownership of an input stream to the raw-stack scanner.
    AddInputStream {
        name: String,
        stream: Box<dyn InputStream>,
    },
    /// Attach `handler` to the `EventReactor` of `target_stage`.
    Subscribe {
        target_stage: StageId,
        handler: EventHandler,
    },
    /// Begin draining input.
    Run,
    /// Latch a `#line`-directive-style file/line rewrite for the next raw
    /// character the file/line override filter observes.
    FileLineOverride { file: Option<String>, line: u32 },
}
