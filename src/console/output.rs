//! Line writer for the console stream.
//!
//! Serial terminals expect `\r\n`, so every line written here ends with it
//! regardless of how the text was built. Logs go to stderr through
//! `tracing`; only command output and the prompt go through this writer.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::Result;

/// Console line terminator.
pub const LINE_ENDING: &str = "\r\n";

/// Writes console lines and prompts.
pub struct ConsoleWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> ConsoleWriter<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write one line followed by `\r\n` and flush.
    pub async fn write_line(&mut self, line: &str) -> Result<()> {
        self.inner.write_all(line.as_bytes()).await?;
        self.inner.write_all(LINE_ENDING.as_bytes()).await?;
        self.inner.flush().await?;
        Ok(())
    }

    /// Write multi-line command output.
    ///
    /// Each `\n`-separated line is rewritten with `\r\n`. Empty text writes
    /// nothing.
    pub async fn write_block(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        for line in text.lines() {
            self.inner.write_all(line.as_bytes()).await?;
            self.inner.write_all(LINE_ENDING.as_bytes()).await?;
        }
        self.inner.flush().await?;
        Ok(())
    }

    /// Print the prompt without a line ending.
    pub async fn prompt(&mut self, prompt: &str) -> Result<()> {
        self.inner.write_all(prompt.as_bytes()).await?;
        self.inner.flush().await?;
        Ok(())
    }

    /// Recover the wrapped writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_line_uses_crlf() {
        let mut writer = ConsoleWriter::new(Vec::new());
        writer.write_line("AMOTA: connected").await.unwrap();
        assert_eq!(writer.into_inner(), b"AMOTA: connected\r\n");
    }

    #[tokio::test]
    async fn test_write_block_rewrites_newlines() {
        let mut writer = ConsoleWriter::new(Vec::new());
        writer.write_block("usage: x\n\n  y\n").await.unwrap();
        assert_eq!(writer.into_inner(), b"usage: x\r\n\r\n  y\r\n");
    }

    #[tokio::test]
    async fn test_write_block_empty() {
        let mut writer = ConsoleWriter::new(Vec::new());
        writer.write_block("").await.unwrap();
        assert!(writer.into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_prompt_has_no_line_ending() {
        let mut writer = ConsoleWriter::new(Vec::new());
        writer.prompt("> ").await.unwrap();
        assert_eq!(writer.into_inner(), b"> ");
    }
}
