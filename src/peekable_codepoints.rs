use std::io::{
    Bytes,
    Read,
};

use anyhow::{
    Result,
    Error,
};
use unicode_reader::CodePoints;

/// A char stream over any byte reader that allows looking ahead and remembers
/// the line/column of the next unconsumed char.
pub struct PeekableCodePoints<R>
    where R: Read
{
    codepoints: CodePoints<Bytes<R>>,
    buffer: Vec<char>,
    line: usize,
    column: usize,
}

impl<R: Read> PeekableCodePoints<R> {
    pub fn new(reader: R) -> Self {
        PeekableCodePoints {
            codepoints: CodePoints::from(reader),
            buffer: Vec::new(),
            line: 1,
            column: 1,
        }
    }

    fn feed_buffer(&mut self, count: usize) -> Result<usize> {
        for i in 0..count {
            match self.codepoints.next() {
                None => return Ok(i),
                Some(Err(e)) => return Err(Error::new(e)),
                Some(Ok(c)) => self.buffer.push(c),
            }
        }

        Ok(count)
    }

    /// Position (1-based line and column) of the next char to be consumed.
    pub fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    pub fn peek_char(&mut self, index: usize) -> Result<Option<char>> {
        if index >= self.buffer.len() {
            self.feed_buffer(index + 1 - self.buffer.len())?;
        }

        Ok(self.buffer.get(index).copied())
    }

    pub fn next_char(&mut self) -> Result<Option<char>> {
        let c = self.peek_char(0)?;
        if c.is_some() {
            self.discard_buffer(1);
        }

        Ok(c)
    }

    /// Drops up to `count` chars, returning how many were actually dropped.
    pub fn skip(&mut self, count: usize) -> Result<usize> {
        if count > self.buffer.len() {
            self.feed_buffer(count - self.buffer.len())?;
        }

        Ok(self.discard_buffer(count))
    }

    pub fn pop(&mut self, count: usize) -> Result<String> {
        if count > self.buffer.len() {
            self.feed_buffer(count - self.buffer.len())?;
        }

        let actual_count = count.min(self.buffer.len());
        let pop_str = self.buffer[..actual_count].iter().collect();
        self.discard_buffer(actual_count);

        Ok(pop_str)
    }

    fn discard_buffer(&mut self, count: usize) -> usize {
        let actual_count = count.min(self.buffer.len());
        for c in self.buffer.drain(0..actual_count) {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }

        actual_count
    }
}
