//! Boundary decoding of untyped step arguments.
//!
//! Tool arguments arrive as an arbitrary JSON value. [`validate_step`] turns
//! that bag into a [`StepRecord`] or reports every offending field at once.
//! It never touches session state.

use std::fmt;

use serde_json::{Map, Value};

use crate::core::types::{StepRecord, Workflow};

pub const THOUGHT: &str = "thought";
pub const THOUGHT_NUMBER: &str = "thoughtNumber";
pub const TOTAL_THOUGHTS: &str = "totalThoughts";
pub const NEXT_THOUGHT_NEEDED: &str = "nextThoughtNeeded";
pub const IS_REVISION: &str = "isRevision";
pub const REVISES_THOUGHT: &str = "revisesThought";
pub const BRANCH_FROM_THOUGHT: &str = "branchFromThought";
pub const BRANCH_ID: &str = "branchId";
pub const NEEDS_MORE_THOUGHTS: &str = "needsMoreThoughts";
pub const ANALYSIS: &str = "analysis";
pub const CRITICAL_QUESTIONS: &str = "critical_questions";
pub const NEXT_STEP: &str = "next_step";

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.field, self.message)
    }
}

/// All field errors found in one argument bag, in field declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self(vec![FieldError {
            field,
            message: message.into(),
        }])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Names of the rejected fields.
    pub fn fields(&self) -> Vec<&'static str> {
        self.0.iter().map(|err| err.field).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Decode and type-check one step's arguments.
///
/// Required: `thought`, `thoughtNumber`, `totalThoughts`, `nextThoughtNeeded`,
/// plus `critical_questions` and `next_step` for [`Workflow::Commit`].
/// Optional fields are checked only when present; `null` counts as absent.
pub fn validate_step(args: &Value, workflow: Workflow) -> Result<StepRecord, ValidationErrors> {
    let Some(obj) = args.as_object() else {
        return Err(ValidationErrors::single("arguments", "must be an object"));
    };
    let mut fields = Fields {
        obj,
        errors: Vec::new(),
    };

    let content = fields.required_text(THOUGHT);
    let step = fields.required_index(THOUGHT_NUMBER);
    let total_steps = fields.required_count(TOTAL_THOUGHTS);
    let next_step_needed = fields.required_bool(NEXT_THOUGHT_NEEDED);
    let (critical_questions, next_step) = match workflow {
        Workflow::Commit => (
            fields.required_text(CRITICAL_QUESTIONS),
            fields.required_text(NEXT_STEP),
        ),
        Workflow::Review => (
            fields.optional_text(CRITICAL_QUESTIONS),
            fields.optional_text(NEXT_STEP),
        ),
    };
    let analysis = fields.optional_text(ANALYSIS);
    let is_revision = fields.optional_bool(IS_REVISION);
    let revises_step = fields.optional_index(REVISES_THOUGHT);
    let branch_from = fields.optional_index(BRANCH_FROM_THOUGHT);
    let branch_id = fields.optional_id(BRANCH_ID);
    let needs_more_steps = fields.optional_bool(NEEDS_MORE_THOUGHTS);

    let Fields { errors, .. } = fields;
    match (content, step, total_steps, next_step_needed) {
        (Some(content), Some(step), Some(total_steps), Some(next_step_needed))
            if errors.is_empty() =>
        {
            Ok(StepRecord {
                content,
                step,
                total_steps,
                next_step_needed,
                is_revision,
                revises_step,
                branch_from,
                branch_id,
                needs_more_steps,
                analysis,
                critical_questions,
                next_step,
            })
        }
        _ => Err(ValidationErrors(errors)),
    }
}

struct Fields<'a> {
    obj: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl Fields<'_> {
    fn reject(&mut self, field: &'static str, message: &str) {
        self.errors.push(FieldError {
            field,
            message: message.to_string(),
        });
    }

    fn present(&self, field: &str) -> Option<&Value> {
        self.obj.get(field).filter(|value| !value.is_null())
    }

    fn required_text(&mut self, field: &'static str) -> Option<String> {
        match self.present(field).and_then(Value::as_str) {
            Some(text) if !text.is_empty() => Some(text.to_string()),
            _ => {
                self.reject(field, "must be a non-empty string");
                None
            }
        }
    }

    fn required_index(&mut self, field: &'static str) -> Option<u32> {
        let Some(value) = self.present(field) else {
            self.reject(field, "must be a number");
            return None;
        };
        let checked = positive_integer(value);
        if let Err(message) = checked {
            self.reject(field, message);
        }
        checked.ok()
    }

    fn required_count(&mut self, field: &'static str) -> Option<u32> {
        let number = self.present(field).and_then(Value::as_f64);
        let Some(number) = number else {
            self.reject(field, "must be a number");
            return None;
        };
        let truncated = number.trunc();
        if !truncated.is_finite() || truncated < 0.0 || truncated > f64::from(u32::MAX) {
            self.reject(field, "must be a non-negative number");
            return None;
        }
        Some(truncated as u32)
    }

    fn required_bool(&mut self, field: &'static str) -> Option<bool> {
        let flag = self.present(field).and_then(Value::as_bool);
        if flag.is_none() {
            self.reject(field, "must be a boolean");
        }
        flag
    }

    fn optional_text(&mut self, field: &'static str) -> Option<String> {
        let value = self.present(field)?;
        match value.as_str() {
            Some(text) => Some(text.to_string()),
            None => {
                self.reject(field, "must be a string");
                None
            }
        }
    }

    fn optional_id(&mut self, field: &'static str) -> Option<String> {
        let value = self.present(field)?;
        match value.as_str().map(str::trim) {
            Some(id) if !id.is_empty() => Some(id.to_string()),
            _ => {
                self.reject(field, "must be a non-empty string");
                None
            }
        }
    }

    fn optional_bool(&mut self, field: &'static str) -> Option<bool> {
        let value = self.present(field)?;
        let flag = value.as_bool();
        if flag.is_none() {
            self.reject(field, "must be a boolean");
        }
        flag
    }

    fn optional_index(&mut self, field: &'static str) -> Option<u32> {
        let value = self.present(field)?;
        match positive_integer(value) {
            Ok(index) => Some(index),
            Err(message) => {
                self.reject(field, message);
                None
            }
        }
    }
}

fn positive_integer(value: &Value) -> Result<u32, &'static str> {
    let Some(number) = value.as_f64() else {
        return Err("must be a number");
    };
    if number.fract() != 0.0 {
        return Err("must be an integer");
    }
    if number < 1.0 || number > f64::from(u32::MAX) {
        return Err("must be a positive integer");
    }
    Ok(number as u32)
}
