//! Field-value collection.
//!
//! [`Collector`] walks the fields of a schema and obtains one value per
//! field through a [`Prompter`]. Parsing and validation live in
//! [`parse_answer`], which batch callers can use directly; the collector adds
//! defaults, re-prompting and the cancellation policy on top.
//!
//! Collected values are written at their dotted paths, so a field named
//! `student.name` produces `{"student": {"name": ...}}`.

use chrono::Local;
use serde_json::Value;

use crate::error::FieldError;
use crate::nested;
use crate::schema::{FieldKind, FieldSpec, SectionSpec};
use crate::ValueMap;

// ---------------------------------------------------------------------------
// Prompter seam
// ---------------------------------------------------------------------------

/// One answer from the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// A line of input, possibly empty.
    Line(String),
    /// The user interrupted input for this field.
    Cancelled,
}

/// What the collector shows when asking for a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Question<'a> {
    pub field: &'a FieldSpec,
    /// Prompt text, e.g. "Enter document title" or "Item 2".
    pub prompt: String,
    /// Default shown to the user; an empty answer selects it.
    pub default: Option<String>,
}

/// Source of raw answers. The CLI implements this on top of a terminal;
/// tests script it.
pub trait Prompter {
    /// Ask for a single line.
    fn ask(&mut self, question: &Question<'_>) -> Result<Answer, FieldError>;

    /// Ask for free text spanning several lines.
    fn ask_multiline(&mut self, question: &Question<'_>) -> Result<Answer, FieldError>;

    /// Show an informational line (field label, choice listing).
    fn note(&mut self, message: &str);

    /// Report a rejected answer before asking again.
    fn warn(&mut self, message: &str);
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// What happens to the whole collection when one field is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancelPolicy {
    /// Leave the field out of the result, whether or not it is required.
    #[default]
    Omit,
    /// Fail the collection with [`FieldError::Cancelled`].
    Abort,
}

/// Collector settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectOptions {
    pub cancel_policy: CancelPolicy,
    /// Attempts per field before a recoverable error is returned.
    pub max_attempts: usize,
}

impl Default for CollectOptions {
    fn default() -> Self {
        CollectOptions {
            cancel_policy: CancelPolicy::Omit,
            max_attempts: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Turn one raw answer into a value for `field`.
///
/// `Ok(None)` means "no value" (optional field left empty, or empty list).
/// Empty input selects the field default, if any.
pub fn parse_answer(field: &FieldSpec, input: &str) -> Result<Option<Value>, FieldError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return empty_answer(field);
    }
    let value = match field.kind {
        FieldKind::String | FieldKind::Date | FieldKind::Multiline => {
            Value::String(input.to_string())
        }
        FieldKind::Integer => {
            let n: i64 = trimmed.parse().map_err(|_| FieldError::InvalidNumber {
                field: field.name.clone(),
                input: trimmed.to_string(),
            })?;
            field.check_range(n as f64)?;
            Value::from(n)
        }
        FieldKind::Float => {
            let n: f64 = trimmed
                .parse()
                .ok()
                .filter(|n: &f64| n.is_finite())
                .ok_or_else(|| FieldError::InvalidNumber {
                    field: field.name.clone(),
                    input: trimmed.to_string(),
                })?;
            field.check_range(n)?;
            Value::from(n)
        }
        FieldKind::Boolean => Value::Bool(parse_bool(field, trimmed)?),
        FieldKind::Choice => Value::String(pick_choice(field, trimmed)?.to_string()),
        FieldKind::List => {
            let items: Vec<Value> = trimmed
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| Value::String(s.to_string()))
                .collect();
            if items.is_empty() {
                return Ok(None);
            }
            Value::Array(items)
        }
    };
    Ok(Some(value))
}

fn empty_answer(field: &FieldSpec) -> Result<Option<Value>, FieldError> {
    if let Some(default) = &field.default {
        return Ok(Some(default.clone()));
    }
    match field.kind {
        FieldKind::Choice => {
            // The first choice is pre-selected.
            let first = field.choice_list().first().cloned();
            Ok(first.map(Value::String))
        }
        FieldKind::List => Ok(None),
        _ if field.required => Err(FieldError::MissingValue {
            field: field.name.clone(),
        }),
        FieldKind::String | FieldKind::Date | FieldKind::Multiline => {
            Ok(Some(Value::String(String::new())))
        }
        FieldKind::Integer | FieldKind::Float | FieldKind::Boolean => Ok(None),
    }
}

fn parse_bool(field: &FieldSpec, input: &str) -> Result<bool, FieldError> {
    match input.to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Ok(true),
        "n" | "no" | "false" | "0" => Ok(false),
        _ => Err(FieldError::InvalidBoolean {
            field: field.name.clone(),
            input: input.to_string(),
        }),
    }
}

/// Resolve a 1-based choice number to its choice.
pub fn pick_choice<'a>(field: &'a FieldSpec, input: &str) -> Result<&'a str, FieldError> {
    let choices = field.choice_list();
    let invalid = || FieldError::InvalidChoice {
        field: field.name.clone(),
        input: input.to_string(),
        count: choices.len(),
    };
    let index: usize = input.trim().parse().map_err(|_| invalid())?;
    if index == 0 || index > choices.len() {
        return Err(invalid());
    }
    Ok(choices[index - 1].as_str())
}

// ---------------------------------------------------------------------------
// Collector
// ---------------------------------------------------------------------------

/// Interactive collection of field values.
pub struct Collector<'p, P: Prompter + ?Sized> {
    prompter: &'p mut P,
    options: CollectOptions,
}

impl<'p, P: Prompter + ?Sized> Collector<'p, P> {
    pub fn new(prompter: &'p mut P) -> Self {
        Collector {
            prompter,
            options: CollectOptions::default(),
        }
    }

    pub fn with_options(prompter: &'p mut P, options: CollectOptions) -> Self {
        Collector { prompter, options }
    }

    /// Collect every field into a nested value map.
    pub fn collect_all(&mut self, fields: &[FieldSpec]) -> Result<ValueMap, FieldError> {
        let mut values = ValueMap::new();
        for field in fields {
            self.prompter.note(&field.label);
            if let Some(description) = &field.description {
                self.prompter.note(description);
            }
            match self.collect_field(field)? {
                Some(value) => nested::assign(&mut values, &field.name, value)?,
                None => tracing::debug!(field = %field.name, "no value collected"),
            }
        }
        Ok(values)
    }

    /// Collect `count` records for a repeated section, one map per item.
    pub fn collect_repeated(
        &mut self,
        section: &SectionSpec,
        count: usize,
    ) -> Result<Vec<Value>, FieldError> {
        let mut items = Vec::with_capacity(count);
        for n in 1..=count {
            self.prompter.note(&format!("{} {n}", section.title));
            let item = self.collect_all(&section.item_fields(n))?;
            items.push(Value::Object(item));
        }
        Ok(items)
    }

    /// Collect one field. `Ok(None)` means the field is left out.
    pub fn collect_field(&mut self, field: &FieldSpec) -> Result<Option<Value>, FieldError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.ask_once(field) {
                Ok(value) => return Ok(value),
                Err(FieldError::Cancelled { .. }) => {
                    return match self.options.cancel_policy {
                        CancelPolicy::Omit => Ok(None),
                        CancelPolicy::Abort => Err(FieldError::Cancelled {
                            field: field.name.clone(),
                        }),
                    }
                }
                Err(err) if err.is_recoverable() && attempt < self.options.max_attempts => {
                    self.prompter.warn(&err.to_string());
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn ask_once(&mut self, field: &FieldSpec) -> Result<Option<Value>, FieldError> {
        match field.kind {
            FieldKind::String | FieldKind::Integer | FieldKind::Float | FieldKind::Date => {
                let question = self.question(field, format!("Enter {}", field.label.to_lowercase()));
                let line = self.line(field, &question)?;
                parse_answer(field, &line)
            }
            FieldKind::Boolean => {
                let question = self.question(field, format!("{}?", field.label));
                let line = self.line(field, &question)?;
                parse_answer(field, &line)
            }
            FieldKind::Multiline => {
                let question = self.question(field, format!("Enter {}", field.label.to_lowercase()));
                match self.prompter.ask_multiline(&question)? {
                    Answer::Line(text) => parse_answer(field, &text),
                    Answer::Cancelled => Err(cancelled(field)),
                }
            }
            FieldKind::Choice => {
                for (i, choice) in field.choice_list().iter().enumerate() {
                    self.prompter.note(&format!("  {}. {}", i + 1, choice));
                }
                let mut question =
                    self.question(field, format!("Select {} by number", field.label.to_lowercase()));
                question.default = Some(self.default_choice_number(field).to_string());
                let line = self.line(field, &question)?;
                parse_answer(field, &line)
            }
            FieldKind::List => self.ask_list(field),
        }
    }

    fn ask_list(&mut self, field: &FieldSpec) -> Result<Option<Value>, FieldError> {
        self.prompter.note(&format!(
            "Enter items for {} (one per line, empty line to finish):",
            field.label.to_lowercase()
        ));
        let mut items = Vec::new();
        loop {
            let question = Question {
                field,
                prompt: format!("Item {}", items.len() + 1),
                default: None,
            };
            let line = self.line(field, &question)?;
            let item = line.trim();
            if item.is_empty() {
                break;
            }
            items.push(Value::String(item.to_string()));
        }
        if items.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Value::Array(items)))
        }
    }

    fn line(&mut self, field: &FieldSpec, question: &Question<'_>) -> Result<String, FieldError> {
        match self.prompter.ask(question)? {
            Answer::Line(line) => Ok(line),
            Answer::Cancelled => Err(cancelled(field)),
        }
    }

    fn question<'f>(&self, field: &'f FieldSpec, prompt: String) -> Question<'f> {
        Question {
            field,
            prompt,
            default: suggested_default(field),
        }
    }

    fn default_choice_number(&self, field: &FieldSpec) -> usize {
        field
            .default
            .as_ref()
            .and_then(Value::as_str)
            .and_then(|d| field.choice_list().iter().position(|c| c == d))
            .map_or(1, |i| i + 1)
    }
}

fn cancelled(field: &FieldSpec) -> FieldError {
    FieldError::Cancelled {
        field: field.name.clone(),
    }
}

/// The default offered to the user for `field`, rendered as text.
///
/// Date fields without a declared default suggest today's date.
pub fn suggested_default(field: &FieldSpec) -> Option<String> {
    match (&field.default, field.kind) {
        (Some(Value::String(s)), _) => Some(s.clone()),
        (Some(Value::Bool(b)), _) => Some(if *b { "yes" } else { "no" }.to_string()),
        (Some(Value::Array(items)), _) => Some(
            items
                .iter()
                .map(|v| v.as_str().map_or_else(|| v.to_string(), str::to_string))
                .collect::<Vec<_>>()
                .join(", "),
        ),
        (Some(other), _) => Some(other.to_string()),
        (None, FieldKind::Date) => Some(Local::now().format("%B %-d, %Y").to_string()),
        (None, _) => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
