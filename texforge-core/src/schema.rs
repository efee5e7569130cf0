//! Sidecar schema types.
//!
//! A template `report.tex.j2` may ship a sidecar `report.yaml` that
//! deserializes into [`TemplateSchema`]. Known keys describe the template
//! (fields, sections, document settings); every other top-level key is a
//! template variable and becomes a default in the render context.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FieldError, PathError, SchemaError, SchemaParseError};
use crate::nested;
use crate::ValueMap;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// LaTeX document kinds a template can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    #[default]
    Article,
    Report,
    Book,
    Letter,
    Beamer,
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentType::Article => write!(f, "article"),
            DocumentType::Report => write!(f, "report"),
            DocumentType::Book => write!(f, "book"),
            DocumentType::Letter => write!(f, "letter"),
            DocumentType::Beamer => write!(f, "beamer"),
        }
    }
}

/// The closed set of field kinds. Each kind has exactly one collection
/// handler in [`crate::collect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    Date,
    Choice,
    List,
    Multiline,
}

impl FieldKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Integer | FieldKind::Float)
    }

    /// Noun used in type-mismatch messages.
    pub fn expected(self) -> &'static str {
        match self {
            FieldKind::String | FieldKind::Date | FieldKind::Multiline => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Choice => "choice",
            FieldKind::List => "list of strings",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::String => "string",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
            FieldKind::Choice => "choice",
            FieldKind::List => "list",
            FieldKind::Multiline => "multiline",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Structs
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_document_class() -> String {
    "article".to_string()
}

/// One input field of a template. `name` may be a dotted path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<f64>,
}

impl FieldSpec {
    /// A required field of `kind` with no default, bounds or choices.
    pub fn new(name: impl Into<String>, kind: FieldKind, label: impl Into<String>) -> Self {
        FieldSpec {
            name: name.into(),
            kind,
            label: label.into(),
            description: None,
            required: true,
            default: None,
            choices: None,
            min_value: None,
            max_value: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min_value = min;
        self.max_value = max;
        self
    }

    /// Choices of a choice field; empty for other kinds.
    pub fn choice_list(&self) -> &[String] {
        self.choices.as_deref().unwrap_or(&[])
    }

    /// Check `v` against the numeric bounds of this field.
    pub fn check_range(&self, v: f64) -> Result<(), FieldError> {
        let below = self.min_value.is_some_and(|min| v < min);
        let above = self.max_value.is_some_and(|max| v > max);
        if below || above {
            return Err(FieldError::OutOfRange {
                field: self.name.clone(),
                value: v,
                min: self.min_value,
                max: self.max_value,
            });
        }
        Ok(())
    }

    /// Check that `value` has this field's type and satisfies its
    /// bounds and choices.
    pub fn check_value(&self, value: &Value) -> Result<(), FieldError> {
        let mismatch = || FieldError::TypeMismatch {
            field: self.name.clone(),
            expected: self.kind.expected(),
        };
        match self.kind {
            FieldKind::String | FieldKind::Date | FieldKind::Multiline => {
                value.as_str().map(|_| ()).ok_or_else(mismatch)
            }
            FieldKind::Integer => {
                let n = value.as_i64().ok_or_else(mismatch)?;
                self.check_range(n as f64)
            }
            FieldKind::Float => {
                let n = value.as_f64().ok_or_else(mismatch)?;
                self.check_range(n)
            }
            FieldKind::Boolean => value.as_bool().map(|_| ()).ok_or_else(mismatch),
            FieldKind::Choice => {
                let s = value.as_str().ok_or_else(mismatch)?;
                if self.choice_list().iter().any(|c| c == s) {
                    Ok(())
                } else {
                    Err(FieldError::NotAChoice {
                        field: self.name.clone(),
                        value: s.to_string(),
                    })
                }
            }
            FieldKind::List => {
                let items = value.as_array().ok_or_else(mismatch)?;
                if items.iter().all(Value::is_string) {
                    Ok(())
                } else {
                    Err(mismatch())
                }
            }
        }
    }

    fn validate(&self) -> Result<(), SchemaError> {
        nested::split_path(&self.name).map_err(|source| SchemaError::InvalidFieldName {
            name: self.name.clone(),
            source,
        })?;

        match (self.kind, self.choices.as_ref()) {
            (FieldKind::Choice, None) => {
                return Err(SchemaError::MissingChoices {
                    field: self.name.clone(),
                })
            }
            (FieldKind::Choice, Some(c)) if c.is_empty() => {
                return Err(SchemaError::MissingChoices {
                    field: self.name.clone(),
                })
            }
            (FieldKind::Choice, Some(_)) | (_, None) => {}
            (_, Some(_)) => {
                return Err(SchemaError::UnexpectedChoices {
                    field: self.name.clone(),
                })
            }
        }

        let has_bounds = self.min_value.is_some() || self.max_value.is_some();
        if has_bounds && !self.kind.is_numeric() {
            return Err(SchemaError::BoundsOnNonNumeric {
                field: self.name.clone(),
            });
        }
        if let (Some(min), Some(max)) = (self.min_value, self.max_value) {
            if min > max {
                return Err(SchemaError::InvalidBounds {
                    field: self.name.clone(),
                    min,
                    max,
                });
            }
        }

        if let Some(default) = &self.default {
            self.check_value(default).map_err(|err| match err {
                FieldError::TypeMismatch { expected, .. } => SchemaError::DefaultTypeMismatch {
                    field: self.name.clone(),
                    expected,
                },
                other => SchemaError::InvalidDefault {
                    field: self.name.clone(),
                    source: other,
                },
            })?;
        }
        Ok(())
    }
}

/// A document section with its own optional template file and fields.
///
/// With `repeat` set to the name of an integer field, the section's fields
/// are filled once per item and stored as a list of records under `name`,
/// e.g. `problems: [{title, description, answer}, ...]` driven by
/// `num_problems`. `{n}` in labels and string defaults of a repeated
/// section becomes the 1-based item number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_file: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<String>,
}

impl SectionSpec {
    /// The section's fields as seen by item `n` of a repeated section.
    pub fn item_fields(&self, n: usize) -> Vec<FieldSpec> {
        let number = n.to_string();
        self.fields
            .iter()
            .map(|field| {
                let mut field = field.clone();
                field.label = field.label.replace("{n}", &number);
                if let Some(Value::String(default)) = &mut field.default {
                    *default = default.replace("{n}", &number);
                }
                field
            })
            .collect()
    }
}

/// Sidecar description of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSchema {
    pub name: String,
    pub description: String,
    pub document_type: DocumentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub sections: Vec<SectionSpec>,

    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default = "default_document_class")]
    pub document_class: String,
    #[serde(default)]
    pub class_options: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_image: Option<String>,

    /// Every other top-level key of the sidecar: template variables.
    #[serde(flatten)]
    pub variables: ValueMap,
}

impl TemplateSchema {
    /// A schema with the given metadata and nothing else.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        document_type: DocumentType,
    ) -> Self {
        TemplateSchema {
            name: name.into(),
            description: description.into(),
            document_type,
            author: None,
            version: default_version(),
            fields: Vec::new(),
            sections: Vec::new(),
            packages: Vec::new(),
            document_class: default_document_class(),
            class_options: Vec::new(),
            tags: Vec::new(),
            preview_image: None,
            variables: ValueMap::new(),
        }
    }

    /// Parse sidecar YAML and validate it.
    pub fn from_yaml(yaml: &str) -> Result<Self, SchemaParseError> {
        let schema: TemplateSchema = serde_yaml::from_str(yaml)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Serialize back to sidecar YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Check every schema invariant: unique field names, well-formed
    /// dotted names, choices iff choice kind, bounds only on numeric kinds,
    /// defaults consistent with their field.
    pub fn validate(&self) -> Result<(), SchemaError> {
        validate_fields(&self.fields)?;
        for section in &self.sections {
            validate_fields(&section.fields)?;
            if let Some(counter) = &section.repeat {
                let is_integer = self
                    .fields
                    .iter()
                    .any(|f| &f.name == counter && f.kind == FieldKind::Integer);
                if !is_integer {
                    return Err(SchemaError::InvalidRepeat {
                        section: section.name.clone(),
                        field: counter.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Names of fields that must be supplied (required and no default).
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required && f.default.is_none())
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Template-declared defaults: sidecar variables, then field defaults
    /// written at their dotted paths.
    pub fn defaults(&self) -> Result<ValueMap, PathError> {
        let mut out = self.variables.clone();
        for field in &self.fields {
            if let Some(default) = &field.default {
                nested::assign(&mut out, &field.name, default.clone())?;
            }
        }
        Ok(out)
    }

    /// Number of items of a repeated section: the counter's value in
    /// `values`, else the counter's default. `None` for plain sections.
    pub fn repeat_count(&self, section: &SectionSpec, values: &ValueMap) -> Option<usize> {
        let counter = section.repeat.as_deref()?;
        let value = nested::lookup(values, counter)
            .or_else(|| self.fields.iter().find(|f| f.name == counter)?.default.as_ref())?;
        value.as_u64().and_then(|n| usize::try_from(n).ok())
    }

    /// Give each repeated section without a value one record of field
    /// defaults per item.
    pub fn fill_repeated(&self, values: &mut ValueMap) -> Result<(), PathError> {
        for section in self.sections.iter().filter(|s| s.repeat.is_some()) {
            if nested::lookup(values, &section.name).is_some() {
                continue;
            }
            let Some(count) = self.repeat_count(section, values) else {
                continue;
            };
            let mut items = Vec::with_capacity(count);
            for n in 1..=count {
                let mut item = ValueMap::new();
                for field in section.item_fields(n) {
                    if let Some(default) = field.default {
                        nested::assign(&mut item, &field.name, default)?;
                    }
                }
                items.push(Value::Object(item));
            }
            nested::assign(values, &section.name, Value::Array(items))?;
        }
        Ok(())
    }

    /// Check a (nested) value map against the declared fields.
    ///
    /// Fields of mandatory sections are held to the same rules as top-level
    /// fields. Fields of optional sections are type-checked when present
    /// but never required. Repeated sections are checked item by item.
    pub fn check_values(&self, values: &ValueMap) -> Result<(), FieldError> {
        check_fields(&self.fields, values, true)?;
        for section in &self.sections {
            let mandatory = !section.optional;
            if section.repeat.is_none() {
                check_fields(&section.fields, values, mandatory)?;
                continue;
            }
            match nested::lookup(values, &section.name) {
                Some(Value::Null) | None => {
                    let count = self.repeat_count(section, values).unwrap_or(0);
                    let needs_input = section
                        .fields
                        .iter()
                        .any(|f| f.required && f.default.is_none());
                    if mandatory && count > 0 && needs_input {
                        return Err(FieldError::MissingValue {
                            field: section.name.clone(),
                        });
                    }
                }
                Some(Value::Array(items)) => {
                    for (i, item) in items.iter().enumerate() {
                        let item = item.as_object().ok_or_else(|| FieldError::TypeMismatch {
                            field: format!("{}[{}]", section.name, i + 1),
                            expected: "mapping",
                        })?;
                        check_fields(&section.item_fields(i + 1), item, mandatory)?;
                    }
                }
                Some(_) => {
                    return Err(FieldError::TypeMismatch {
                        field: section.name.clone(),
                        expected: "list",
                    })
                }
            }
        }
        Ok(())
    }
}

fn check_fields(fields: &[FieldSpec], values: &ValueMap, enforce_required: bool) -> Result<(), FieldError> {
    for field in fields {
        match nested::lookup(values, &field.name) {
            Some(Value::Null) | None => {
                if enforce_required && field.required && field.default.is_none() {
                    return Err(FieldError::MissingValue {
                        field: field.name.clone(),
                    });
                }
            }
            Some(value) => field.check_value(value)?,
        }
    }
    Ok(())
}

fn validate_fields(fields: &[FieldSpec]) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateField {
                name: field.name.clone(),
            });
        }
        field.validate()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn homework() -> TemplateSchema {
        let mut schema = TemplateSchema::new("homework", "Weekly homework", DocumentType::Article);
        schema.fields = vec![
            FieldSpec::new("title", FieldKind::String, "Title"),
            FieldSpec::new("student.name", FieldKind::String, "Student name"),
            FieldSpec::new("num_problems", FieldKind::Integer, "Problems")
                .with_bounds(Some(1.0), Some(10.0))
                .with_default(json!(4)),
            FieldSpec::new("semester", FieldKind::Choice, "Semester")
                .with_choices(["Fall", "Spring", "Summer"])
                .with_default(json!("Fall")),
        ];
        schema
    }

    #[test]
    fn minimal_yaml_uses_documented_defaults() {
        let schema = TemplateSchema::from_yaml(
            "name: memo\ndescription: A memo\ndocument_type: letter\n",
        )
        .unwrap();
        assert_eq!(schema.version, "1.0.0");
        assert_eq!(schema.document_class, "article");
        assert_eq!(schema.document_type, DocumentType::Letter);
        assert!(schema.fields.is_empty());
        assert!(schema.variables.is_empty());
    }

    #[test]
    fn unknown_keys_become_template_variables() {
        let schema = TemplateSchema::from_yaml(
            "name: hw\ndescription: d\ndocument_type: article\ncourse:\n  id: CS 1150\nnum_problems: 3\n",
        )
        .unwrap();
        assert_eq!(schema.variables.get("num_problems"), Some(&json!(3)));
        assert_eq!(schema.variables.get("course"), Some(&json!({"id": "CS 1150"})));
        assert!(!schema.variables.contains_key("name"));
    }

    #[test]
    fn field_required_defaults_to_true() {
        let schema = TemplateSchema::from_yaml(
            "name: a\ndescription: b\ndocument_type: article\nfields:\n  - name: title\n    type: string\n    label: Title\n",
        )
        .unwrap();
        assert!(schema.fields[0].required);
        assert_eq!(schema.fields[0].kind, FieldKind::String);
    }

    #[test]
    fn choice_without_choices_is_invalid() {
        let mut schema = homework();
        schema.fields[3].choices = Some(vec![]);
        assert_eq!(
            schema.validate(),
            Err(SchemaError::MissingChoices {
                field: "semester".into()
            })
        );
    }

    #[test]
    fn choices_on_a_string_field_are_invalid() {
        let mut schema = homework();
        schema.fields[0].choices = Some(vec!["x".into()]);
        assert!(matches!(
            schema.validate(),
            Err(SchemaError::UnexpectedChoices { .. })
        ));
    }

    #[test]
    fn duplicate_field_names_are_invalid() {
        let mut schema = homework();
        schema
            .fields
            .push(FieldSpec::new("title", FieldKind::String, "Again"));
        assert_eq!(
            schema.validate(),
            Err(SchemaError::DuplicateField {
                name: "title".into()
            })
        );
    }

    #[test]
    fn bounds_only_on_numeric_fields() {
        let mut schema = homework();
        schema.fields[0].min_value = Some(1.0);
        assert!(matches!(
            schema.validate(),
            Err(SchemaError::BoundsOnNonNumeric { .. })
        ));
    }

    #[test]
    fn inverted_bounds_are_invalid() {
        let mut schema = homework();
        schema.fields[2] = schema.fields[2]
            .clone()
            .with_bounds(Some(5.0), Some(2.0))
            .with_default(json!(3));
        assert!(matches!(
            schema.validate(),
            Err(SchemaError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn out_of_range_default_is_invalid() {
        let mut schema = homework();
        schema.fields[2].default = Some(json!(40));
        assert!(matches!(
            schema.validate(),
            Err(SchemaError::InvalidDefault {
                source: FieldError::OutOfRange { .. },
                ..
            })
        ));
    }

    #[test]
    fn default_of_wrong_type_is_invalid() {
        let mut schema = homework();
        schema.fields[2].default = Some(json!("four"));
        assert_eq!(
            schema.validate(),
            Err(SchemaError::DefaultTypeMismatch {
                field: "num_problems".into(),
                expected: "integer"
            })
        );
    }

    #[test]
    fn malformed_dotted_name_is_invalid() {
        let mut schema = homework();
        schema.fields[1].name = "student..name".into();
        assert!(matches!(
            schema.validate(),
            Err(SchemaError::InvalidFieldName { .. })
        ));
    }

    #[test]
    fn defaults_include_variables_and_nested_field_defaults() {
        let mut schema = homework();
        schema.variables.insert("university".into(), json!("UCCS"));
        schema
            .fields
            .push(FieldSpec::new("course.term", FieldKind::String, "Term").with_default(json!("Fall 2025")));
        let defaults = schema.defaults().unwrap();
        assert_eq!(defaults.get("university"), Some(&json!("UCCS")));
        assert_eq!(defaults.get("num_problems"), Some(&json!(4)));
        assert_eq!(defaults.get("course"), Some(&json!({"term": "Fall 2025"})));
        assert!(!defaults.contains_key("title"));
    }

    #[test]
    fn required_fields_skip_defaulted_ones() {
        assert_eq!(homework().required_fields(), vec!["title", "student.name"]);
    }

    #[test]
    fn check_values_reports_missing_nested_field() {
        let values = match json!({"title": "HW 1"}) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        assert_eq!(
            homework().check_values(&values),
            Err(FieldError::MissingValue {
                field: "student.name".into()
            })
        );
    }

    #[test]
    fn check_values_rejects_unknown_choice() {
        let values = match json!({"title": "HW", "student": {"name": "Ada"}, "semester": "Winter"}) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };
        assert!(matches!(
            homework().check_values(&values),
            Err(FieldError::NotAChoice { .. })
        ));
    }

    fn with_sections() -> TemplateSchema {
        let mut schema = homework();
        schema.sections = vec![
            SectionSpec {
                name: "grading".into(),
                title: "Grading".into(),
                template_file: None,
                fields: vec![FieldSpec::new("grading.points", FieldKind::Integer, "Points")
                    .with_bounds(Some(0.0), Some(100.0))],
                optional: false,
                repeat: None,
            },
            SectionSpec {
                name: "appendix".into(),
                title: "Appendix".into(),
                template_file: None,
                fields: vec![FieldSpec::new("appendix.text", FieldKind::Multiline, "Text")],
                optional: true,
                repeat: None,
            },
        ];
        schema
    }

    fn values(v: Value) -> ValueMap {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn check_values_requires_fields_of_mandatory_sections() {
        let base = json!({"title": "HW", "student": {"name": "Ada"}});
        assert_eq!(
            with_sections().check_values(&values(base)),
            Err(FieldError::MissingValue {
                field: "grading.points".into()
            })
        );

        let complete = json!({"title": "HW", "student": {"name": "Ada"}, "grading": {"points": 40}});
        assert_eq!(with_sections().check_values(&values(complete)), Ok(()));
    }

    #[test]
    fn optional_section_fields_are_checked_only_when_present() {
        let bad = json!({
            "title": "HW",
            "student": {"name": "Ada"},
            "grading": {"points": 400},
        });
        assert!(matches!(
            with_sections().check_values(&values(bad)),
            Err(FieldError::OutOfRange { .. })
        ));

        let wrong_type = json!({
            "title": "HW",
            "student": {"name": "Ada"},
            "grading": {"points": 40},
            "appendix": {"text": 7},
        });
        assert!(with_sections().check_values(&values(wrong_type)).is_err());
    }

    fn with_problems() -> TemplateSchema {
        let mut schema = homework();
        schema.sections = vec![SectionSpec {
            name: "problems".into(),
            title: "Problem".into(),
            template_file: None,
            fields: vec![
                FieldSpec::new("title", FieldKind::String, "Problem {n} title")
                    .with_default(json!("Problem {n}")),
                FieldSpec::new("answer", FieldKind::Multiline, "Answer").with_default(json!("")),
            ],
            optional: false,
            repeat: Some("num_problems".into()),
        }];
        schema
    }

    #[test]
    fn repeated_section_items_number_their_defaults() {
        let fields = with_problems().sections[0].item_fields(3);
        assert_eq!(fields[0].label, "Problem 3 title");
        assert_eq!(fields[0].default, Some(json!("Problem 3")));
    }

    #[test]
    fn fill_repeated_follows_the_counter() {
        let schema = with_problems();
        let mut defaults = schema.defaults().unwrap();
        schema.fill_repeated(&mut defaults).unwrap();
        let problems = defaults["problems"].as_array().unwrap();
        assert_eq!(problems.len(), 4);
        assert_eq!(problems[3], json!({"title": "Problem 4", "answer": ""}));

        let mut given = values(json!({"num_problems": 2}));
        schema.fill_repeated(&mut given).unwrap();
        assert_eq!(given["problems"].as_array().unwrap().len(), 2);

        let mut explicit = values(json!({"problems": [{"title": "Mine"}]}));
        schema.fill_repeated(&mut explicit).unwrap();
        assert_eq!(explicit["problems"], json!([{"title": "Mine"}]));
    }

    #[test]
    fn repeated_items_are_checked_individually() {
        let ok = json!({"title": "HW", "student": {"name": "Ada"}, "problems": [{"title": "P1"}]});
        assert_eq!(with_problems().check_values(&values(ok)), Ok(()));

        let bad = json!({"title": "HW", "student": {"name": "Ada"}, "problems": [{"title": 3}]});
        assert!(matches!(
            with_problems().check_values(&values(bad)),
            Err(FieldError::TypeMismatch { ref field, .. }) if field == "title"
        ));

        let scalar = json!({"title": "HW", "student": {"name": "Ada"}, "problems": "all"});
        assert!(matches!(
            with_problems().check_values(&values(scalar)),
            Err(FieldError::TypeMismatch { ref field, expected: "list" }) if field == "problems"
        ));
    }

    #[test]
    fn repeat_must_name_an_integer_field() {
        let mut schema = with_problems();
        schema.sections[0].repeat = Some("semester".into());
        assert_eq!(
            schema.validate(),
            Err(SchemaError::InvalidRepeat {
                section: "problems".into(),
                field: "semester".into()
            })
        );
        schema.sections[0].repeat = Some("nope".into());
        assert!(schema.validate().is_err());
    }

    #[test]
    fn yaml_roundtrip_keeps_variables() {
        let mut schema = homework();
        schema.variables.insert("university".into(), json!("UCCS"));
        let yaml = schema.to_yaml().unwrap();
        let back = TemplateSchema::from_yaml(&yaml).unwrap();
        assert_eq!(back, schema);
    }
}
