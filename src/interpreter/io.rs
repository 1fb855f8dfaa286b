// File: src/interpreter/io.rs
//
// Numeric input and output for READ and PRINT.
//
// Input is line oriented: a line is read only when the previous one has
// been used up, and each READ target takes the next whitespace-separated
// word. Output goes to stdout or, for tests and embedding, to a shared buffer.

use crate::errors::{ErrorKind, LangError, SourceLocation};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};

enum InputSource {
    /// Shared process stdin, locked per line so the REPL editor can read it too
    Stdin,
    Reader(Box<dyn BufRead>),
}

impl InputSource {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        match self {
            InputSource::Stdin => io::stdin().read_line(buf),
            InputSource::Reader(reader) => reader.read_line(buf),
        }
    }
}

pub struct NumberInput {
    source: InputSource,
    words: VecDeque<String>,
    line: usize,
}

impl NumberInput {
    pub fn stdin() -> Self {
        NumberInput { source: InputSource::Stdin, words: VecDeque::new(), line: 0 }
    }

    pub fn from_reader(reader: impl BufRead + 'static) -> Self {
        NumberInput { source: InputSource::Reader(Box::new(reader)), words: VecDeque::new(), line: 0 }
    }

    /// Blocks until a word is available. `location` is the READ being served.
    pub fn next_number(&mut self, location: &SourceLocation) -> Result<f64, LangError> {
        while self.words.is_empty() {
            let mut buf = String::new();
            let read = self.source.read_line(&mut buf).map_err(|e| {
                LangError::new(ErrorKind::IoError, format!("Failed to read input: {}", e), location.clone())
            })?;
            if read == 0 {
                return Err(LangError::input_error(
                    "Unexpected end of input while reading a number",
                    location.clone(),
                ));
            }
            self.line += 1;
            self.words.extend(buf.split_whitespace().map(str::to_string));
        }

        let word = self.words.pop_front().unwrap_or_default();
        word.parse::<f64>().map_err(|_| {
            LangError::input_error(
                format!("Expected a number on input line {}, found '{}'", self.line, word),
                location.clone(),
            )
        })
    }
}

#[derive(Clone, Default)]
pub enum Output {
    #[default]
    Stdout,
    Buffer(Arc<Mutex<Vec<u8>>>),
}

impl Output {
    pub fn write_line(&self, text: &str) -> io::Result<()> {
        match self {
            Output::Stdout => {
                let mut out = io::stdout().lock();
                writeln!(out, "{}", text)?;
                out.flush()
            }
            Output::Buffer(buffer) => {
                let mut buf = buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                writeln!(buf, "{}", text)
            }
        }
    }
}

/// PRINT formatting: shortest round-trip form, so `9` rather than `9.0`
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Avoid printing "-0"
        return "0".to_string();
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::io::{Cursor, Read};
    use std::rc::Rc;

    /// Counts the lines handed out so tests can see how far input was consumed
    struct LineCounter {
        inner: Cursor<&'static str>,
        lines: Rc<Cell<usize>>,
    }

    impl Read for LineCounter {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl BufRead for LineCounter {
        fn fill_buf(&mut self) -> io::Result<&[u8]> {
            self.inner.fill_buf()
        }

        fn consume(&mut self, amt: usize) {
            self.inner.consume(amt)
        }

        fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
            self.lines.set(self.lines.get() + 1);
            self.inner.read_line(buf)
        }
    }

    #[test]
    fn test_words_span_lines() {
        let mut input = NumberInput::from_reader(Cursor::new("1 2\n\n  3.5\n"));
        let at = SourceLocation::unknown();
        assert_eq!(input.next_number(&at).unwrap(), 1.0);
        assert_eq!(input.next_number(&at).unwrap(), 2.0);
        assert_eq!(input.next_number(&at).unwrap(), 3.5);
        assert_eq!(input.next_number(&at).unwrap_err().kind, ErrorKind::InputError);
    }

    #[test]
    fn test_next_line_is_read_only_when_needed() {
        let lines = Rc::new(Cell::new(0));
        let reader = LineCounter { inner: Cursor::new("1 2\n3\n4\n"), lines: lines.clone() };
        let mut input = NumberInput::from_reader(reader);
        let at = SourceLocation::unknown();

        assert_eq!(input.next_number(&at).unwrap(), 1.0);
        assert_eq!(lines.get(), 1);
        assert_eq!(input.next_number(&at).unwrap(), 2.0);
        assert_eq!(lines.get(), 1);
        assert_eq!(input.next_number(&at).unwrap(), 3.0);
        assert_eq!(lines.get(), 2);
    }

    #[test]
    fn test_non_numeric_word() {
        let mut input = NumberInput::from_reader(Cursor::new("seven\n"));
        let err = input.next_number(&SourceLocation::unknown()).unwrap_err();
        assert_eq!(err.message, "Expected a number on input line 1, found 'seven'");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(9.0), "9");
        assert_eq!(format_number(-2.5), "-2.5");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn test_buffer_output() {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let out = Output::Buffer(buffer.clone());
        out.write_line("12").unwrap();
        assert_eq!(String::from_utf8(buffer.lock().unwrap().clone()).unwrap(), "12\n");
    }
}
