use crate::error::{ShellError, ShellResult};
use crate::source::LineSource;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{Result as IoResult, Write};
use std::rc::Rc;

/// Memory-backed line source.
///
/// Behaves like the console: running out of lines is an unexpected end of input.
pub struct MemorySource {
    lines: VecDeque<String>,
    line_number: usize,
}

impl MemorySource {
    /// Create a MemorySource that will hand out `lines` in order.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            line_number: 0,
        }
    }

    /// Lines not consumed yet.
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }

    fn next(&mut self) -> ShellResult<String> {
        let line = self.lines.pop_front().ok_or(ShellError::EndOfInput)?;
        self.line_number += 1;
        Ok(line)
    }
}

impl LineSource for MemorySource {
    fn read_line(&mut self) -> ShellResult<String> {
        self.next()
    }

    fn read_prompted(&mut self, _prompt: &str) -> ShellResult<String> {
        self.next()
    }

    fn has_next_line(&mut self) -> ShellResult<bool> {
        Ok(!self.lines.is_empty())
    }

    fn line_number(&self) -> usize {
        self.line_number
    }
}

/// Memory-backed writer for capturing shell output.
#[derive(Default)]
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    /// Public constructor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience: create writer and return (writer, rc_handle).
    pub fn with_handle() -> (Self, Rc<RefCell<Vec<u8>>>) {
        let mw = MemWriter::new();
        let rc = mw.buf.clone();
        (mw, rc)
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}
