//! Newline-delimited JSON stream decoding.
//!
//! The chat and generate endpoints answer with one JSON object per line and
//! no enclosing array. [`RecordStream`] turns such a body into an iterator of
//! typed records:
//!
//! - blank lines are ignored
//! - a line that fails to decode is logged and skipped
//! - a `{"error": "..."}` line ends the stream with [`Error::Api`]
//! - the record whose `done` flag is set is the last one read; anything the
//!   server sends after it is left unread
//! - an I/O failure is yielded once as [`Error::Stream`] and ends the stream

use std::io::{BufRead, ErrorKind};
use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::error::{Error, ErrorResponse, Result};
use crate::types::Timings;

/// A decoded line of a streamed response.
pub trait StreamRecord: DeserializeOwned {
    /// Text carried by this record (possibly empty).
    fn fragment(&self) -> &str;

    /// Whether this is the final record of the stream.
    fn is_done(&self) -> bool;

    /// Continuation token, present on the final generate record.
    fn context(&self) -> Option<&[i64]>;

    /// Statistics, present on the final record.
    fn timings(&self) -> &Timings;
}

/// Iterator over the records of a newline-delimited JSON body.
pub struct RecordStream<R, T> {
    reader: R,
    buf: Vec<u8>,
    line_no: usize,
    skipped: usize,
    finished: bool,
    _record: PhantomData<fn() -> T>,
}

impl<R: BufRead, T: StreamRecord> RecordStream<R, T> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_no: 0,
            skipped: 0,
            finished: false,
            _record: PhantomData,
        }
    }

    /// Number of malformed lines skipped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Whether the stream has ended (completion record, error, or EOF).
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn decode_line(&mut self) -> Option<Result<T>> {
        let line = self.buf.trim_ascii();
        if line.is_empty() {
            return None;
        }

        // A server failure arrives as an object with an `error` key.
        if let Ok(server) = serde_json::from_slice::<ErrorResponse>(line) {
            self.finished = true;
            return Some(Err(Error::Api {
                status: 200,
                message: server.error,
            }));
        }

        match serde_json::from_slice::<T>(line) {
            Ok(record) => {
                if record.is_done() {
                    self.finished = true;
                }
                Some(Ok(record))
            }
            Err(e) => {
                self.skipped += 1;
                tracing::warn!(line = self.line_no, error = %e, "Skipping malformed stream record");
                None
            }
        }
    }
}

impl<R: BufRead, T: StreamRecord> Iterator for RecordStream<R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.finished = true;
                }
                Ok(_) => {
                    self.line_no += 1;
                    if let Some(item) = self.decode_line() {
                        return Some(item);
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    self.finished = true;
                    return Some(Err(Error::Stream(e)));
                }
            }
        }
        None
    }
}
