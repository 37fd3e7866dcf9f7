//! User input and interaction handling.
//!
//! The wizard talks to the user only through [`Prompter`]: one line of text
//! in, one line of text out, plus messages tagged with a [`Severity`]. The
//! terminal implementation owns the colors; the line implementation works
//! over any reader/writer pair and is what tests script against.

use crate::error::{Error, Result};
use dialoguer::console::{Style, Term};
use dialoguer::Input;
use log::debug;
use std::cell::RefCell;
use std::io::{self, BufRead, IsTerminal, StdinLock, Stdout, Write};

/// Kind of a message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Heading,
    Info,
    Hint,
    Warning,
    Success,
}

/// A line-oriented interactive session.
pub trait Prompter {
    /// Asks one question and returns the trimmed answer.
    /// An empty answer means "keep the displayed default".
    fn ask(&self, question: &str, default: Option<&str>) -> Result<String>;

    /// Yes/no question. Only `y` or `yes` (any case) count as yes.
    fn confirm(&self, question: &str) -> Result<bool> {
        let answer = self.ask(&format!("{question} (y/N)"), None)?;
        Ok(is_affirmative(&answer))
    }

    fn message(&self, severity: Severity, text: &str);
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Question text with the default in brackets, without the trailing `: `.
pub fn question_text(question: &str, default: Option<&str>) -> String {
    match default {
        Some(default) if !default.is_empty() => format!("{question} [{default}]"),
        _ => question.to_string(),
    }
}

/// Terminal styles for each kind of output.
#[derive(Debug, Clone)]
pub struct Palette {
    pub heading: Style,
    pub accent: Style,
    pub text: Style,
    pub hint: Style,
    pub warning: Style,
    pub success: Style,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            heading: Style::new().blue().bold(),
            accent: Style::new().color256(214).bold(),
            text: Style::new().white(),
            hint: Style::new().dim(),
            warning: Style::new().yellow().bold(),
            success: Style::new().green().bold(),
        }
    }
}

/// Interactive prompts on a real terminal, rendered with dialoguer.
pub struct DialoguerPrompter {
    palette: Palette,
}

impl DialoguerPrompter {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new(Palette::default())
    }
}

impl Prompter for DialoguerPrompter {
    fn ask(&self, question: &str, default: Option<&str>) -> Result<String> {
        let prompt = self.palette.accent.apply_to(question_text(question, default));
        let answer: String = Input::new()
            .with_prompt(prompt.to_string())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| Error::PromptError(e.to_string()))?;

        Ok(answer.trim().to_string())
    }

    fn message(&self, severity: Severity, text: &str) {
        match severity {
            Severity::Heading => println!("\n{}", self.palette.heading.apply_to(text)),
            Severity::Info => println!("{}", self.palette.text.apply_to(text)),
            Severity::Hint => println!("   {}", self.palette.hint.apply_to(text)),
            Severity::Warning => {
                eprintln!("{}", self.palette.warning.apply_to(format!("warning: {text}")))
            }
            Severity::Success => println!("{}", self.palette.success.apply_to(text)),
        }
    }
}

impl Drop for DialoguerPrompter {
    fn drop(&mut self) {
        // dialoguer hides the cursor while editing; an interrupted prompt can leave it hidden
        let _ = Term::stdout().show_cursor();
    }
}

/// Plain prompts over any line reader, used when stdin is not a terminal.
pub struct LinePrompter<R: BufRead, W: Write> {
    input: RefCell<R>,
    output: RefCell<W>,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input: RefCell::new(input), output: RefCell::new(output) }
    }
}

impl LinePrompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&self, question: &str, default: Option<&str>) -> Result<String> {
        {
            let mut output = self.output.borrow_mut();
            write!(output, "{}: ", question_text(question, default))?;
            output.flush()?;
        }

        let mut line = String::new();
        if self.input.borrow_mut().read_line(&mut line)? == 0 {
            return Err(Error::PromptError(format!(
                "input closed while asking '{question}'"
            )));
        }
        Ok(line.trim().to_string())
    }

    fn message(&self, severity: Severity, text: &str) {
        let mut output = self.output.borrow_mut();
        let written = match severity {
            Severity::Heading => writeln!(output, "\n{text}"),
            Severity::Info | Severity::Success => writeln!(output, "{text}"),
            Severity::Hint => writeln!(output, "   {text}"),
            Severity::Warning => writeln!(output, "warning: {text}"),
        };
        if let Err(e) = written {
            debug!("Failed to write message: {e}");
        }
    }
}

impl<R: BufRead, W: Write> Drop for LinePrompter<R, W> {
    fn drop(&mut self) {
        if let Err(e) = self.output.get_mut().flush() {
            debug!("Failed to flush prompt output: {e}");
        }
    }
}

/// Opens the prompt session for one wizard run.
pub fn session(plain: bool) -> Box<dyn Prompter> {
    if plain || !io::stdin().is_terminal() || !io::stdout().is_terminal() {
        Box::new(LinePrompter::stdio())
    } else {
        Box::new(DialoguerPrompter::default())
    }
}
