//! Terminal prompts for the wizard.

use std::io::{self, ErrorKind};

use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use texforge_core::collect::{Answer, Prompter, Question};
use texforge_core::FieldError;

/// [`Prompter`] backed by dialoguer on the controlling terminal.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        TerminalPrompter {
            theme: ColorfulTheme::default(),
        }
    }

    /// Pick one of `items`. `None` when the user backs out with Esc or q.
    pub fn select(&self, prompt: &str, items: &[String], default: usize) -> io::Result<Option<usize>> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default)
            .interact_opt()
            .map_err(dialoguer_io)
    }

    pub fn confirm(&self, prompt: &str, default: bool) -> io::Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(dialoguer_io)
    }

    pub fn text(&self, prompt: &str, default: Option<&str>) -> io::Result<String> {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input.interact_text().map_err(dialoguer_io)
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, question: &Question<'_>) -> Result<Answer, FieldError> {
        match self.text(&question.prompt, question.default.as_deref()) {
            Ok(line) => Ok(Answer::Line(line)),
            Err(err) => cancelled_or(question, err),
        }
    }

    fn ask_multiline(&mut self, question: &Question<'_>) -> Result<Answer, FieldError> {
        println!(
            "{} {}",
            question.prompt.bold(),
            "(finish with an empty line)".bright_black()
        );
        if let Some(default) = &question.default {
            println!("{} {default}", "default:".bright_black());
        }

        let theme = &self.theme;
        let read_line = || {
            Input::<String>::with_theme(theme)
                .with_prompt("│")
                .allow_empty(true)
                .interact_text()
                .map_err(dialoguer_io)
        };
        match read_lines(read_line) {
            Ok(lines) if lines.is_empty() => Ok(Answer::Line(question.default.clone().unwrap_or_default())),
            Ok(lines) => Ok(Answer::Line(lines.join("\n"))),
            Err(err) => cancelled_or(question, err),
        }
    }

    fn note(&mut self, message: &str) {
        println!("{}", message.cyan());
    }

    fn warn(&mut self, message: &str) {
        eprintln!("{} {message}", "✗".red().bold());
    }
}

fn cancelled_or(question: &Question<'_>, err: io::Error) -> Result<Answer, FieldError> {
    if err.kind() == ErrorKind::Interrupted {
        return Ok(Answer::Cancelled);
    }
    Err(FieldError::Prompt {
        field: question.field.name.clone(),
        message: err.to_string(),
    })
}

/// Lines from `read_line` up to the first empty one.
fn read_lines(mut read_line: impl FnMut() -> io::Result<String>) -> io::Result<Vec<String>> {
    let mut lines = Vec::new();
    loop {
        let line = read_line()?;
        if line.is_empty() {
            return Ok(lines);
        }
        lines.push(line);
    }
}

fn dialoguer_io(err: dialoguer::Error) -> io::Error {
    match err {
        dialoguer::Error::IO(err) => err,
    }
}
