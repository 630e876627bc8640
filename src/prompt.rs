//! Interactive prompts: free text, masked text, enumerated choice, confirmation
//!
//! Every prompt blocks until it gets an acceptable answer. Invalid answers are
//! rejected with a message and asked again, up to `MAX_ATTEMPTS` times. End of
//! input aborts the prompt.

use std::io::{self, BufRead, IsTerminal, Stderr, StdinLock, Write};
use thiserror::Error;

pub const MAX_ATTEMPTS: usize = 5;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Aborted!")]
    Aborted,

    #[error("no valid answer for '{label}' after {attempts} attempts")]
    TooManyAttempts { label: String, attempts: usize },

    #[error("failed to read from terminal: {0}")]
    Io(#[from] io::Error),

    #[error("unexpected answer '{answer}' for '{label}'")]
    Unexpected { label: String, answer: String },
}

pub trait Prompter {
    /// Free text. An empty answer takes `default` when there is one.
    fn text(&mut self, label: &str, default: Option<&str>) -> Result<String, PromptError>;

    /// Text that is not echoed back.
    fn secret(&mut self, label: &str) -> Result<String, PromptError>;

    /// One of `choices`. An empty answer takes `default` when there is one.
    fn choice(&mut self, label: &str, choices: &[&str], default: Option<&str>) -> Result<String, PromptError>;

    /// Yes/no question, defaulting to no.
    fn confirm(&mut self, label: &str) -> Result<bool, PromptError>;

    /// Informational line shown alongside the prompts.
    fn note(&mut self, text: &str);
}

/// Line-oriented prompter over any reader/writer pair
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
    masked: bool,
}

impl TerminalPrompter<StdinLock<'static>, Stderr> {
    /// Prompts on stderr so stdout stays clean for results. Secrets are read
    /// without echo when stdin is a terminal.
    pub fn stdio() -> Self {
        let stdin = io::stdin();
        let masked = stdin.is_terminal();
        Self {
            input: stdin.lock(),
            output: io::stderr(),
            masked,
        }
    }
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            masked: false,
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    fn ask(&mut self, prompt: &str) -> Result<String, PromptError> {
        write!(self.output, "{}: ", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Err(PromptError::Aborted);
        }
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }

    fn reject(&mut self, message: &str) -> Result<(), PromptError> {
        writeln!(self.output, "Error: {}", message)?;
        Ok(())
    }

    /// Ask until `accept` returns a value
    fn ask_until<T, F>(&mut self, label: &str, prompt: &str, mut accept: F) -> Result<T, PromptError>
    where
        F: FnMut(&str) -> Result<T, String>,
    {
        for _ in 0..MAX_ATTEMPTS {
            let answer = self.ask(prompt)?;
            match accept(&answer) {
                Ok(value) => return Ok(value),
                Err(message) => self.reject(&message)?,
            }
        }
        Err(PromptError::TooManyAttempts {
            label: label.to_string(),
            attempts: MAX_ATTEMPTS,
        })
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn text(&mut self, label: &str, default: Option<&str>) -> Result<String, PromptError> {
        let prompt = match default {
            Some(d) => format!("{} [{}]", label, d),
            None => label.to_string(),
        };
        self.ask_until(label, &prompt, |answer| match (answer.trim(), default) {
            ("", Some(d)) => Ok(d.to_string()),
            ("", None) => Err("a value is required".to_string()),
            (value, _) => Ok(value.to_string()),
        })
    }

    fn secret(&mut self, label: &str) -> Result<String, PromptError> {
        if !self.masked {
            return self.ask_until(label, label, |answer| {
                if answer.is_empty() {
                    Err("a value is required".to_string())
                } else {
                    Ok(answer.to_string())
                }
            });
        }

        for _ in 0..MAX_ATTEMPTS {
            let answer = rpassword::prompt_password(format!("{}: ", label))?;
            if !answer.is_empty() {
                return Ok(answer);
            }
            self.reject("a value is required")?;
        }
        Err(PromptError::TooManyAttempts {
            label: label.to_string(),
            attempts: MAX_ATTEMPTS,
        })
    }

    fn choice(&mut self, label: &str, choices: &[&str], default: Option<&str>) -> Result<String, PromptError> {
        let listed = choices.join(", ");
        let prompt = match default {
            Some(d) => format!("{} ({}) [{}]", label, listed, d),
            None => format!("{} ({})", label, listed),
        };
        self.ask_until(label, &prompt, |answer| {
            let answer = match (answer.trim(), default) {
                ("", Some(d)) => d,
                (value, _) => value,
            };
            if choices.contains(&answer) {
                Ok(answer.to_string())
            } else {
                Err(format!("'{}' is not one of {}.", answer, listed))
            }
        })
    }

    fn confirm(&mut self, label: &str) -> Result<bool, PromptError> {
        let prompt = format!("{} [y/N]", label);
        self.ask_until(label, &prompt, |answer| match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => Ok(true),
            "" | "n" | "no" => Ok(false),
            _ => Err("invalid input".to_string()),
        })
    }

    fn note(&mut self, text: &str) {
        // A broken terminal shows up on the next prompt read
        let _ = writeln!(self.output, "{}", text);
    }
}
