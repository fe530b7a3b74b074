//! `{field}` template substitution for file names and physical elements.
//!
//! Templates use named fields in braces. Time fields accept a strftime
//! format after a colon, e.g. `{begin_time:%Y%m%d_%H%M}`. `{{` and `}}`
//! produce literal braces.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::error::{ScmiError, ScmiResult};

/// Default SCMI output file name pattern.
pub const DEFAULT_OUTPUT_PATTERN: &str =
    "{source_name}_AII_{satellite}_{instrument}_{product_name}_{sector_id}_{tile_id}_{begin_time:%Y%m%d_%H%M}.nc";

/// Time format used when a time field has no explicit format.
const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Value substituted for one template field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Time(DateTime<Utc>),
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<usize> for FieldValue {
    fn from(v: usize) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::Time(v)
    }
}

/// Named values available to a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateFields {
    fields: BTreeMap<String, FieldValue>,
}

impl TemplateFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Render `template`, failing on unknown fields or malformed braces.
    pub fn render(&self, template: &str) -> ScmiResult<String> {
        let mut out = String::with_capacity(template.len());
        let mut chars = template.chars().peekable();

        while let Some(ch) = chars.next() {
            match ch {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    out.push('{');
                }
                '{' => {
                    let mut expr = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => expr.push(c),
                            None => {
                                return Err(ScmiError::config(format!(
                                    "unclosed field '{{{}' in pattern '{}'",
                                    expr, template
                                )))
                            }
                        }
                    }
                    self.render_field(&expr, template, &mut out)?;
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    out.push('}');
                }
                '}' => {
                    return Err(ScmiError::config(format!(
                        "unmatched '}}' in pattern '{}'",
                        template
                    )))
                }
                c => out.push(c),
            }
        }

        Ok(out)
    }

    fn render_field(&self, expr: &str, template: &str, out: &mut String) -> ScmiResult<()> {
        let (name, spec) = match expr.split_once(':') {
            Some((name, spec)) => (name, Some(spec)),
            None => (expr, None),
        };

        let value = self.fields.get(name).ok_or_else(|| {
            ScmiError::config(format!(
                "unknown field '{}' in pattern '{}'",
                name, template
            ))
        })?;

        let written = match (value, spec) {
            (FieldValue::Time(t), spec) => {
                write!(out, "{}", t.format(spec.unwrap_or(DEFAULT_TIME_FORMAT)))
            }
            (FieldValue::Text(s), None) => write!(out, "{}", s),
            (FieldValue::Int(i), None) => write!(out, "{}", i),
            (_, Some(spec)) => {
                return Err(ScmiError::config(format!(
                    "field '{}' does not accept format '{}'",
                    name, spec
                )))
            }
        };

        written.map_err(|_| {
            ScmiError::config(format!("invalid format for field '{}' in '{}'", name, template))
        })
    }
}
