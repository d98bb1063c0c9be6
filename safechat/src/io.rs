//! Terminal input seam.

use async_trait::async_trait;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Stdin};

/// Source of a single line of user text.
#[async_trait]
pub trait LineReader: Send {
    /// Shows `prompt` and reads one line without its trailing newline.
    ///
    /// Returns `Ok(None)` at end of input.
    async fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>>;

    /// Releases the underlying input. Further reads return `Ok(None)`.
    fn close(&mut self);
}

/// Reads from the process's standard input.
#[derive(Debug)]
pub struct StdinLineReader {
    input: Option<BufReader<Stdin>>,
}

impl StdinLineReader {
    /// Creates a reader over stdin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            input: Some(BufReader::new(tokio::io::stdin())),
        }
    }
}

impl Default for StdinLineReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LineReader for StdinLineReader {
    async fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>> {
        let Some(input) = self.input.as_mut() else {
            return Ok(None);
        };

        let mut stdout = std::io::stdout();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        Ok(Some(strip_newline(line)))
    }

    fn close(&mut self) {
        self.input = None;
    }
}

fn strip_newline(mut line: String) -> String {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_newline() {
        assert_eq!(strip_newline("hello\n".to_string()), "hello");
        assert_eq!(strip_newline("hello\r\n".to_string()), "hello");
        assert_eq!(strip_newline("hello".to_string()), "hello");
        assert_eq!(strip_newline("  padded  \n".to_string()), "  padded  ");
    }

    #[test]
    fn test_closed_stdin_reader_yields_none() {
        let line = tokio_test::block_on(async {
            let mut reader = StdinLineReader::new();
            reader.close();
            reader.read_line("> ").await
        })
        .unwrap();
        assert_eq!(line, None);
    }
}
