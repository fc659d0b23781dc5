//! User interface module - interaction (prompts) and formatting.
//!
//! Separates concerns:
//! - `formatter` - Pure formatting functions
//! - This module - Interactive prompts and user input handling

use std::io::{self, BufRead, Stdin, Stdout, Write};

use crate::error::{ReleaseError, Result};

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_command, display_dry_run_command, display_error, display_manual_instruction,
    display_status, display_success, display_version_change, display_warning,
};

/// Operator's answer to a yes/no question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
}

/// Map a raw input line to an answer.
///
/// Accepts "y"/"yes" and "n"/"no", case-insensitive, surrounding whitespace
/// ignored. Anything else (including an empty line) is `None`.
pub fn parse_answer(input: &str) -> Option<Answer> {
    match input.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(Answer::Yes),
        "n" | "no" => Some(Answer::No),
        _ => None,
    }
}

/// Questions asked to the operator during a release
pub trait Prompter {
    /// Ask a yes/no question until a valid answer is given.
    fn confirm(&mut self, question: &str) -> Result<Answer>;

    /// Ask a free-text question and return the line without its newline.
    fn ask_text(&mut self, question: &str) -> Result<String>;
}

/// Line-based prompt over any reader/writer pair
///
/// `TerminalPrompt::stdio()` is the interactive one; tests feed a byte
/// buffer as input and capture the output.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
    retries: usize,
}

impl TerminalPrompt<io::StdinLock<'static>, Stdout> {
    /// Prompt on the process' standard input and output
    pub fn stdio() -> Self {
        let stdin: Stdin = io::stdin();
        TerminalPrompt::new(stdin.lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        TerminalPrompt {
            input,
            output,
            retries: 0,
        }
    }

    /// Number of invalid answers rejected by the last `confirm` call
    pub fn retries(&self) -> usize {
        self.retries
    }

    /// Consume the prompt, returning the writer (used to inspect output in tests)
    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ReleaseError::InputClosed);
        }
        Ok(line.trim_end_matches(&['\r', '\n'][..]).to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompt<R, W> {
    fn confirm(&mut self, question: &str) -> Result<Answer> {
        self.retries = 0;

        loop {
            write!(self.output, "{} (Y/n) ", question)?;
            self.output.flush()?;

            let line = self.read_line()?;
            match parse_answer(&line) {
                Some(Answer::Yes) => {
                    writeln!(self.output, "Confirmed! Proceeding...")?;
                    return Ok(Answer::Yes);
                }
                Some(Answer::No) => {
                    writeln!(self.output, "Cancelled. Exiting...")?;
                    return Ok(Answer::No);
                }
                None => {
                    writeln!(self.output, "Invalid input. Please enter Y or n.")?;
                    self.retries += 1;
                }
            }
        }
    }

    fn ask_text(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        self.read_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompt(input: &str) -> TerminalPrompt<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompt::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_parse_answer() {
        assert_eq!(parse_answer("y"), Some(Answer::Yes));
        assert_eq!(parse_answer("YES\n"), Some(Answer::Yes));
        assert_eq!(parse_answer("  No "), Some(Answer::No));
        assert_eq!(parse_answer("n"), Some(Answer::No));
        assert_eq!(parse_answer(""), None);
        assert_eq!(parse_answer("yep"), None);
        assert_eq!(parse_answer("1"), None);
    }

    #[test]
    fn test_confirm_yes() {
        let mut p = prompt("Y\n");
        assert_eq!(p.confirm("Ready?").unwrap(), Answer::Yes);
        assert_eq!(p.retries(), 0);
        let out = String::from_utf8(p.into_output()).unwrap();
        assert!(out.starts_with("Ready? (Y/n) "));
        assert!(out.contains("Confirmed! Proceeding..."));
    }

    #[test]
    fn test_confirm_no() {
        let mut p = prompt("no\n");
        assert_eq!(p.confirm("Ready?").unwrap(), Answer::No);
        let out = String::from_utf8(p.into_output()).unwrap();
        assert!(out.contains("Cancelled. Exiting..."));
    }

    #[test]
    fn test_confirm_reprompts_on_invalid_input() {
        let mut p = prompt("maybe\n\nyeah\nyes\n");
        assert_eq!(p.confirm("Ready?").unwrap(), Answer::Yes);
        assert_eq!(p.retries(), 3);
        let out = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(out.matches("Ready? (Y/n) ").count(), 4);
        assert_eq!(out.matches("Invalid input. Please enter Y or n.").count(), 3);
    }

    #[test]
    fn test_confirm_input_closed() {
        let mut p = prompt("what\n");
        assert!(matches!(p.confirm("Ready?"), Err(ReleaseError::InputClosed)));
    }

    #[test]
    fn test_ask_text_returns_line_verbatim() {
        let mut p = prompt(" 123456 \r\n");
        assert_eq!(p.ask_text("OTP? ").unwrap(), " 123456 ");
        let out = String::from_utf8(p.into_output()).unwrap();
        assert_eq!(out, "OTP? ");
    }

    #[test]
    fn test_confirm_resets_retries_between_calls() {
        let mut p = prompt("x\ny\nn\n");
        p.confirm("First?").unwrap();
        assert_eq!(p.retries(), 1);
        assert_eq!(p.confirm("Second?").unwrap(), Answer::No);
        assert_eq!(p.retries(), 0);
    }
}
