//! Human interaction during conflict resolution.
//!
//! The resolver talks to the user only through [`InteractionPort`]. A session
//! is handed an [`Interaction`] value; non-interactive sessions get
//! [`Interaction::Disabled`] and therefore have no port to call.

use std::io::{self, BufRead, Write};

use crate::error::Result;

/// Collects choices from a human.
pub trait InteractionPort {
    /// Show a block of text.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn render(&mut self, text: &str) -> Result<()>;

    /// Ask the user to pick one of `choices`.
    ///
    /// Returns the index of the chosen entry, or `None` if the input ended.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read or written.
    fn select_one(&mut self, prompt: &str, choices: &[&str]) -> Result<Option<usize>>;

    /// Ask a yes/no question. End of input counts as "no".
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be read or written.
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Whether a session may talk to a human.
pub enum Interaction<'a> {
    /// Non-interactive: no prompts can be issued.
    Disabled,
    /// Interactive: prompts go through this port.
    Enabled(&'a mut dyn InteractionPort),
}

impl Interaction<'_> {
    /// Whether a port is attached.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }
}

impl std::fmt::Debug for Interaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => f.write_str("Interaction::Disabled"),
            Self::Enabled(_) => f.write_str("Interaction::Enabled"),
        }
    }
}

/// Line-based prompt over any reader/writer pair.
pub struct TerminalPort<R, W> {
    input: R,
    output: W,
}

impl TerminalPort<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's stdin/stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPort<R, W> {
    /// Create a port over explicit streams.
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Read one trimmed line; `None` at end of input.
    fn read_answer(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl<R: BufRead, W: Write> InteractionPort for TerminalPort<R, W> {
    fn render(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}")?;
        self.output.flush()?;
        Ok(())
    }

    fn select_one(&mut self, prompt: &str, choices: &[&str]) -> Result<Option<usize>> {
        writeln!(self.output, "{prompt}")?;
        for (i, choice) in choices.iter().enumerate() {
            writeln!(self.output, "  {}) {choice}", i + 1)?;
        }

        loop {
            write!(self.output, "Select [1-{}]: ", choices.len())?;
            self.output.flush()?;

            let Some(answer) = self.read_answer()? else {
                return Ok(None);
            };
            match answer.parse::<usize>() {
                Ok(n) if (1..=choices.len()).contains(&n) => return Ok(Some(n - 1)),
                _ => writeln!(self.output, "Please enter a number between 1 and {}.", choices.len())?,
            }
        }
    }

    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        loop {
            write!(self.output, "{prompt} [y/n]: ")?;
            self.output.flush()?;

            let Some(answer) = self.read_answer()? else {
                return Ok(false);
            };
            match answer.to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer y or n.")?,
            }
        }
    }
}
