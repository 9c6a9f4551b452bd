use crate::selector::EXIT_SENTINEL;
use crate::suggest::Suggestion;
use anyhow::{Context, Result};
use std::io::{BufRead, Write};

pub const PROMPT_PREFIX: &str = "> ";

/// Line-reading collaborator used by the selector.
pub trait Prompt {
    /// Show `message`, offer `suggestions` and block until one line is submitted.
    fn read_line(&mut self, message: &str, suggestions: &[Suggestion]) -> Result<String>;

    /// Emit an empty separator line after a rejected input.
    fn break_line(&mut self) -> Result<()>;
}

/// Plain prompt for non-interactive input (pipes, redirected stdin).
/// Suggestions are not rendered.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn read_line(&mut self, message: &str, _suggestions: &[Suggestion]) -> Result<String> {
        writeln!(self.output, "{}", message)?;
        write!(self.output, "{}", PROMPT_PREFIX)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read selection")?;
        if read == 0 {
            // End of input can never produce a valid selection.
            writeln!(self.output)?;
            return Ok(EXIT_SENTINEL.to_string());
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    fn break_line(&mut self) -> Result<()> {
        writeln!(self.output)?;
        Ok(())
    }
}
