//! Error types for texforge-core.

use std::path::PathBuf;

use thiserror::Error;

/// Structural failures while writing a dotted key into a nested mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The key (or one of its segments) is empty, e.g. `""`, `"a..b"`, `".a"`.
    #[error("invalid key '{key}': empty path segment")]
    EmptySegment { key: String },

    /// An intermediate segment already holds a value that is not a mapping.
    #[error("cannot assign '{key}': '{prefix}' already holds a {found}, not a mapping")]
    Conflict {
        key: String,
        prefix: String,
        found: &'static str,
    },

    /// The key has more segments than [`crate::nested::PATH_DEPTH_LIMIT`] allows.
    #[error("key has {depth} segments; at most {limit} are allowed")]
    TooDeep { depth: usize, limit: usize },
}

/// A sidecar schema that deserialized but breaks a schema invariant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("field '{name}' is declared more than once")]
    DuplicateField { name: String },

    #[error("invalid field name '{name}': {source}")]
    InvalidFieldName {
        name: String,
        #[source]
        source: PathError,
    },

    #[error("choice field '{field}' must declare at least one choice")]
    MissingChoices { field: String },

    #[error("field '{field}' declares choices but is not a choice field")]
    UnexpectedChoices { field: String },

    #[error("field '{field}' declares numeric bounds but is not numeric")]
    BoundsOnNonNumeric { field: String },

    #[error("field '{field}' has min_value {min} greater than max_value {max}")]
    InvalidBounds { field: String, min: f64, max: f64 },

    #[error("default of field '{field}' is not a valid {expected}")]
    DefaultTypeMismatch { field: String, expected: &'static str },

    #[error("default of field '{field}' is invalid: {source}")]
    InvalidDefault {
        field: String,
        #[source]
        source: FieldError,
    },

    #[error("section '{section}' repeats on '{field}', which is not an integer field")]
    InvalidRepeat { section: String, field: String },
}

/// Failure to turn sidecar YAML into a valid schema.
#[derive(Debug, Error)]
pub enum SchemaParseError {
    #[error("malformed schema: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Invalid(#[from] SchemaError),
}

/// A value for a single field that was rejected, either while prompting or
/// while checking a batch of values against the schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("a value for '{field}' is required")]
    MissingValue { field: String },

    #[error("'{input}' is not a valid number for '{field}'")]
    InvalidNumber { field: String, input: String },

    #[error("{value} is out of range for '{field}' (allowed: {})", describe_bounds(.min, .max))]
    OutOfRange {
        field: String,
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
    },

    #[error("'{input}' is not a valid choice number for '{field}' (pick 1-{count})")]
    InvalidChoice {
        field: String,
        input: String,
        count: usize,
    },

    #[error("'{value}' is not one of the choices for '{field}'")]
    NotAChoice { field: String, value: String },

    #[error("'{input}' is not a yes/no answer for '{field}'")]
    InvalidBoolean { field: String, input: String },

    #[error("value of '{field}' should be a {expected}")]
    TypeMismatch { field: String, expected: &'static str },

    #[error("input for '{field}' was cancelled")]
    Cancelled { field: String },

    #[error("prompt failed for '{field}': {message}")]
    Prompt { field: String, message: String },

    #[error(transparent)]
    Path(#[from] PathError),
}

impl FieldError {
    /// Whether re-asking the user can fix this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FieldError::MissingValue { .. }
                | FieldError::InvalidNumber { .. }
                | FieldError::OutOfRange { .. }
                | FieldError::InvalidChoice { .. }
                | FieldError::NotAChoice { .. }
                | FieldError::InvalidBoolean { .. }
        )
    }
}

fn describe_bounds(min: &Option<f64>, max: &Option<f64>) -> String {
    match (*min, *max) {
        (Some(lo), Some(hi)) => format!("{lo} to {hi}"),
        (Some(lo), None) => format!("at least {lo}"),
        (None, Some(hi)) => format!("at most {hi}"),
        (None, None) => "any value".to_string(),
    }
}

/// Errors from importing or listing fonts and images.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset source not found: {path}")]
    NotFound { path: PathBuf },

    #[error("not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("asset I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from loading or saving `~/.texforge/config.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}
