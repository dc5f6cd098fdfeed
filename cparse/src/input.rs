// cparse — a staged, event-driven lexical analysis pipeline for C.
//
// Distributed under the GPL 2.0 with a linking exception. See COPYING.

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

/// A byte producer the raw-stack scanner drains one byte at a time.
///
/// `Ok(None)` signals end of stream; it is never treated as a failure by the
/// scanner, only as the cue to pop the frame.
pub trait InputStream {
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// An in-memory, byte-slice-backed input stream.
pub struct SliceInput {
    bytes: Vec<u8>,
    pos: usize,
}

impl SliceInput {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        SliceInput {
            bytes: bytes.into(),
            pos: 0,
        }
    }
}

impl InputStream for SliceInput {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if self.pos >= self.bytes.len() {
            return Ok(None);
        }
        let byte = self.bytes[self.pos];
        self.pos += 1;
        Ok(Some(byte))
    }
}

/// A file-descriptor-backed input stream, read through a `BufReader` so the
/// byte-at-a-time contract above doesn't mean a syscall per byte.
pub struct FileInput<R = File> {
    reader: BufReader<R>,
}

impl FileInput<File> {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(FileInput::new(File::open(path)?))
    }
}

impl<R: Read> FileInput<R> {
    pub fn new(reader: R) -> Self {
        FileInput {
            reader: BufReader::new(reader),
        }
    }
}

impl<R: Read> InputStream for FileInput<R> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            return match self.reader.read(&mut buf) {
                Ok(0) => Ok(None),
                Ok(_) => Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => Err(e),
            };
        }
    }
}
