//! Record-type descriptors.
//!
//! A single [`crate::GridController`] implementation serves every entity type.
//! What differs between entities (editable fields, columns, filters,
//! validators) lives in a static [`RecordDescriptor`] returned by
//! [`GridRecord::descriptor`].

use crate::error::ValidationError;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;

/// Stable server-assigned record identifier.
pub type RecordId = i64;

/// Field key to value mapping used for edit buffers and write payloads.
///
/// Keys are the canonical snake_case field names; the REST boundary maps
/// them to whatever spelling the server expects.
pub type FieldMap = BTreeMap<String, Value>;

/// Record-level validator run before create and save.
pub type Validator = fn(&FieldMap) -> Result<(), ValidationError>;

/// Which lookup table a foreign key points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForeignKind {
    Agent,
    Workflow,
}

/// Value shape of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    MultilineText,
    Integer,
    Status,
    ForeignKey(ForeignKind),
    Timestamp,
}

impl FieldKind {
    /// Convert raw editor input into a field value.
    ///
    /// Numeric kinds that fail to parse keep the raw string so validation can
    /// report it instead of silently dropping the user's input.
    pub fn parse_input(&self, input: &str) -> Value {
        match self {
            FieldKind::Integer | FieldKind::ForeignKey(_) => {
                let trimmed = input.trim();
                if trimmed.is_empty() {
                    return Value::Null;
                }
                trimmed
                    .parse::<i64>()
                    .map(Value::from)
                    .unwrap_or_else(|_| Value::String(input.to_string()))
            }
            FieldKind::Status => Value::String(input.trim().to_string()),
            FieldKind::Text | FieldKind::MultilineText | FieldKind::Timestamp => {
                Value::String(input.to_string())
            }
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Integer | FieldKind::ForeignKey(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub editable: bool,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub default_width: u16,
    pub min_width: u16,
    pub resizable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// One of a fixed set of values.
    Choice(&'static [&'static str]),
    Integer,
    Text,
    /// ISO calendar date, `YYYY-MM-DD`.
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FilterKind,
}

impl FilterSpec {
    /// Check a non-empty filter value against this filter's kind.
    pub fn check(&self, value: &str) -> Result<(), String> {
        match self.kind {
            FilterKind::Choice(options) => {
                if options.contains(&value) {
                    Ok(())
                } else {
                    Err(format!("expected one of {}", options.join(", ")))
                }
            }
            FilterKind::Integer => value
                .parse::<i64>()
                .map(|_| ())
                .map_err(|_| "must be an integer".to_string()),
            FilterKind::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| "must be a date (YYYY-MM-DD)".to_string()),
            FilterKind::Text => Ok(()),
        }
    }
}

/// Static description of one record type.
pub struct RecordDescriptor {
    /// Human name used in messages ("step", "content review").
    pub entity: &'static str,
    pub fields: &'static [FieldSpec],
    pub columns: &'static [ColumnSpec],
    pub filters: &'static [FilterSpec],
    pub validators: &'static [Validator],
    /// Status value written by mark-done; `None` when unsupported.
    pub done_status: Option<&'static str>,
    pub creatable: bool,
}

impl std::fmt::Debug for RecordDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordDescriptor")
            .field("entity", &self.entity)
            .field("fields", &self.fields)
            .field("columns", &self.columns)
            .field("filters", &self.filters)
            .field("validators", &self.validators.len())
            .field("done_status", &self.done_status)
            .field("creatable", &self.creatable)
            .finish()
    }
}

impl RecordDescriptor {
    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn editable_fields(&self) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(|f| f.editable)
    }

    pub fn column(&self, key: &str) -> Option<&'static ColumnSpec> {
        self.columns.iter().find(|c| c.key == key)
    }

    pub fn filter(&self, name: &str) -> Option<&'static FilterSpec> {
        self.filters.iter().find(|f| f.name == name)
    }

    /// Empty values for every editable field, used to seed a create form.
    pub fn blank_fields(&self) -> FieldMap {
        self.editable_fields()
            .map(|spec| {
                let value = if spec.kind.is_numeric() {
                    Value::Null
                } else {
                    Value::String(String::new())
                };
                (spec.key.to_string(), value)
            })
            .collect()
    }

    /// Required-field and type checks followed by the record validators.
    pub fn validate(&self, fields: &FieldMap) -> Result<(), ValidationError> {
        for spec in self.editable_fields() {
            let value = fields.get(spec.key).unwrap_or(&Value::Null);
            if spec.required && is_blank(value) {
                return Err(ValidationError::RequiredFieldMissing {
                    field: spec.key.to_string(),
                });
            }
            if spec.kind.is_numeric() && value.is_string() && !is_blank(value) {
                return Err(ValidationError::InvalidValue {
                    field: spec.key.to_string(),
                    reason: "must be an integer".to_string(),
                });
            }
        }
        for validator in self.validators {
            validator(fields)?;
        }
        Ok(())
    }
}

/// A record type the grid can hold.
///
/// Implementations are immutable snapshots of server state.
pub trait GridRecord: Clone + Send + Sync + 'static {
    fn descriptor() -> &'static RecordDescriptor;

    fn id(&self) -> RecordId;

    /// Canonical value of a field; `Value::Null` for unknown keys.
    fn field_value(&self, key: &str) -> Value;

    /// Whether the record already carries the descriptor's done status.
    fn is_done(&self) -> bool {
        match Self::descriptor().done_status {
            Some(done) => self
                .field_value("status")
                .as_str()
                .is_some_and(|s| s.eq_ignore_ascii_case(done)),
            None => false,
        }
    }

    /// Text shown in a table cell.
    fn cell_text(&self, key: &str) -> String {
        display_value(&self.field_value(key))
    }

    /// Editable field values, the starting point of an edit buffer.
    fn snapshot(&self) -> FieldMap {
        Self::descriptor()
            .editable_fields()
            .map(|spec| (spec.key.to_string(), self.field_value(spec.key)))
            .collect()
    }
}

/// Render a field value as plain text; null and empty become `—`.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => crate::entities::PLACEHOLDER.to_string(),
        Value::String(s) if s.is_empty() => crate::entities::PLACEHOLDER.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static FIELDS: &[FieldSpec] = &[
        FieldSpec {
            key: "name",
            label: "Name",
            kind: FieldKind::Text,
            editable: true,
            required: true,
        },
        FieldSpec {
            key: "order_index",
            label: "Order",
            kind: FieldKind::Integer,
            editable: true,
            required: false,
        },
        FieldSpec {
            key: "created_at",
            label: "Created",
            kind: FieldKind::Timestamp,
            editable: false,
            required: false,
        },
    ];

    static DESCRIPTOR: RecordDescriptor = RecordDescriptor {
        entity: "widget",
        fields: FIELDS,
        columns: &[],
        filters: &[],
        validators: &[],
        done_status: None,
        creatable: true,
    };

    #[test]
    fn test_parse_input_integer() {
        assert_eq!(FieldKind::Integer.parse_input(" 42 "), json!(42));
        assert_eq!(FieldKind::Integer.parse_input(""), Value::Null);
        assert_eq!(FieldKind::Integer.parse_input("4x"), json!("4x"));
    }

    #[test]
    fn test_parse_input_foreign_key_blank_is_null() {
        let kind = FieldKind::ForeignKey(ForeignKind::Agent);
        assert_eq!(kind.parse_input("  "), Value::Null);
        assert_eq!(kind.parse_input("7"), json!(7));
    }

    #[test]
    fn test_blank_fields_only_editable() {
        let blank = DESCRIPTOR.blank_fields();
        assert_eq!(blank.len(), 2);
        assert_eq!(blank["name"], json!(""));
        assert_eq!(blank["order_index"], Value::Null);
    }

    #[test]
    fn test_validate_required() {
        let mut fields = DESCRIPTOR.blank_fields();
        assert_eq!(
            DESCRIPTOR.validate(&fields),
            Err(ValidationError::RequiredFieldMissing {
                field: "name".to_string()
            })
        );
        fields.insert("name".to_string(), json!("Draft"));
        assert!(DESCRIPTOR.validate(&fields).is_ok());
    }

    #[test]
    fn test_validate_rejects_unparsed_integer() {
        let mut fields = DESCRIPTOR.blank_fields();
        fields.insert("name".to_string(), json!("Draft"));
        fields.insert("order_index".to_string(), json!("three"));
        assert!(matches!(
            DESCRIPTOR.validate(&fields),
            Err(ValidationError::InvalidValue { field, .. }) if field == "order_index"
        ));
    }

    #[test]
    fn test_filter_check() {
        let status = FilterSpec {
            name: "status",
            label: "Status",
            kind: FilterKind::Choice(&["DONE", "ERROR"]),
        };
        assert!(status.check("DONE").is_ok());
        assert!(status.check("done").is_err());

        let from = FilterSpec {
            name: "from",
            label: "From",
            kind: FilterKind::Date,
        };
        assert!(from.check("2024-02-29").is_ok());
        assert!(from.check("2024-02-30").is_err());
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&Value::Null), "—");
        assert_eq!(display_value(&json!("")), "—");
        assert_eq!(display_value(&json!(12)), "12");
        assert_eq!(display_value(&json!("abc")), "abc");
    }
}
