//! Entity types served by the dashboard and their descriptors.

use crate::error::ValidationError;
use crate::record::{
    ColumnSpec, FieldKind, FieldMap, FieldSpec, FilterKind, FilterSpec, ForeignKind, GridRecord,
    RecordDescriptor, RecordId,
};
use crate::Timestamp;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shown in place of absent values and zero-value dates.
pub const PLACEHOLDER: &str = "—";

/// Format a server timestamp for display.
///
/// Absent timestamps and the `0001-01-01` zero value render as [`PLACEHOLDER`].
pub fn format_timestamp(ts: Option<&Timestamp>) -> String {
    match ts {
        Some(ts) if ts.year() > 1 => ts.format("%Y-%m-%d %H:%M").to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Visual tone of a free-form status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Positive,
    Negative,
    Neutral,
}

pub fn status_tone(status: &str) -> StatusTone {
    match status.trim().to_ascii_lowercase().as_str() {
        "error" | "failed" => StatusTone::Negative,
        "done" | "success" | "approved" => StatusTone::Positive,
        _ => StatusTone::Neutral,
    }
}

/// Status values offered by the review filters and editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReviewStatus {
    Done,
    Error,
    Pending,
}

impl ReviewStatus {
    pub const ALL: [ReviewStatus; 3] = [ReviewStatus::Done, ReviewStatus::Error, ReviewStatus::Pending];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Done => "DONE",
            ReviewStatus::Error => "ERROR",
            ReviewStatus::Pending => "PENDING",
        }
    }

    /// Next value when cycling a status selector that includes "any".
    pub fn cycle(current: Option<&str>) -> Option<&'static str> {
        let position = current.and_then(|c| Self::ALL.iter().position(|s| s.as_str() == c));
        match position {
            None => Some(Self::ALL[0].as_str()),
            Some(i) if i + 1 < Self::ALL.len() => Some(Self::ALL[i + 1].as_str()),
            Some(_) => None,
        }
    }
}

const REVIEW_STATUS_OPTIONS: &[&str] = &["DONE", "ERROR", "PENDING"];

// ============================================================================
// LOOKUP ENTITIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: RecordId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: RecordId,
    pub name: String,
}

/// Selection data for foreign-key fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lookups {
    pub agents: Vec<Agent>,
    pub workflows: Vec<Workflow>,
}

impl Lookups {
    pub fn name_of(&self, kind: ForeignKind, id: RecordId) -> Option<&str> {
        match kind {
            ForeignKind::Agent => self
                .agents
                .iter()
                .find(|a| a.id == id)
                .map(|a| a.name.as_str()),
            ForeignKind::Workflow => self
                .workflows
                .iter()
                .find(|w| w.id == id)
                .map(|w| w.name.as_str()),
        }
    }

    /// Step through the ids of `kind`, wrapping back to "unset" after the last.
    pub fn cycle(&self, kind: ForeignKind, current: Option<RecordId>) -> Option<RecordId> {
        let ids: Vec<RecordId> = match kind {
            ForeignKind::Agent => self.agents.iter().map(|a| a.id).collect(),
            ForeignKind::Workflow => self.workflows.iter().map(|w| w.id).collect(),
        };
        let position = current.and_then(|c| ids.iter().position(|id| *id == c));
        match position {
            None => ids.first().copied(),
            Some(i) => ids.get(i + 1).copied(),
        }
    }
}

// ============================================================================
// STEP
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: RecordId,
    pub name: String,
    pub prompt: String,
    pub order_index: i64,
    pub workflow_id: Option<RecordId>,
    pub agent_id: Option<RecordId>,
    pub created_at: Option<Timestamp>,
}

static STEP_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "id",
        label: "ID",
        kind: FieldKind::Integer,
        editable: false,
        required: false,
    },
    FieldSpec {
        key: "name",
        label: "Name",
        kind: FieldKind::Text,
        editable: true,
        required: true,
    },
    FieldSpec {
        key: "prompt",
        label: "Prompt",
        kind: FieldKind::MultilineText,
        editable: true,
        required: false,
    },
    FieldSpec {
        key: "order_index",
        label: "Order",
        kind: FieldKind::Integer,
        editable: true,
        required: true,
    },
    FieldSpec {
        key: "workflow_id",
        label: "Workflow",
        kind: FieldKind::ForeignKey(ForeignKind::Workflow),
        editable: true,
        required: false,
    },
    FieldSpec {
        key: "agent_id",
        label: "Agent",
        kind: FieldKind::ForeignKey(ForeignKind::Agent),
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

static STEP_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        key: "id",
        label: "ID",
        default_width: 6,
        min_width: 4,
        resizable: true,
    },
    ColumnSpec {
        key: "name",
        label: "Name",
        default_width: 28,
        min_width: 8,
        resizable: true,
    },
    ColumnSpec {
        key: "order_index",
        label: "Order",
        default_width: 7,
        min_width: 5,
        resizable: true,
    },
    ColumnSpec {
        key: "workflow_id",
        label: "Workflow",
        default_width: 18,
        min_width: 8,
        resizable: true,
    },
    ColumnSpec {
        key: "agent_id",
        label: "Agent",
        default_width: 18,
        min_width: 8,
        resizable: true,
    },
    ColumnSpec {
        key: "created_at",
        label: "Created",
        default_width: 17,
        min_width: 8,
        resizable: true,
    },
];

static STEP_FILTERS: &[FilterSpec] = &[
    FilterSpec {
        name: "workflow_id",
        label: "Workflow ID",
        kind: FilterKind::Integer,
    },
    FilterSpec {
        name: "agent_id",
        label: "Agent ID",
        kind: FilterKind::Integer,
    },
];

fn step_order_not_negative(fields: &FieldMap) -> Result<(), ValidationError> {
    match fields.get("order_index").and_then(Value::as_i64) {
        Some(order) if order < 0 => Err(ValidationError::InvalidValue {
            field: "order_index".to_string(),
            reason: "must not be negative".to_string(),
        }),
        _ => Ok(()),
    }
}

static STEP_DESCRIPTOR: RecordDescriptor = RecordDescriptor {
    entity: "step",
    fields: STEP_FIELDS,
    columns: STEP_COLUMNS,
    filters: STEP_FILTERS,
    validators: &[step_order_not_negative],
    done_status: None,
    creatable: true,
};

impl GridRecord for Step {
    fn descriptor() -> &'static RecordDescriptor {
        &STEP_DESCRIPTOR
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn field_value(&self, key: &str) -> Value {
        match key {
            "id" => Value::from(self.id),
            "name" => Value::from(self.name.clone()),
            "prompt" => Value::from(self.prompt.clone()),
            "order_index" => Value::from(self.order_index),
            "workflow_id" => self.workflow_id.map(Value::from).unwrap_or(Value::Null),
            "agent_id" => self.agent_id.map(Value::from).unwrap_or(Value::Null),
            "created_at" => self
                .created_at
                .map(|ts| Value::from(ts.to_rfc3339()))
                .unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    fn cell_text(&self, key: &str) -> String {
        match key {
            "created_at" => format_timestamp(self.created_at.as_ref()),
            _ => crate::record::display_value(&self.field_value(key)),
        }
    }
}

// ============================================================================
// CONTENT REVIEW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentReview {
    pub id: RecordId,
    pub execution_id: Option<i64>,
    pub title: String,
    pub short_description: String,
    pub message: String,
    pub status: String,
    pub review_type: String,
    pub category: String,
    pub created: Option<Timestamp>,
}

static REVIEW_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        key: "id",
        label: "ID",
        kind: FieldKind::Integer,
        editable: false,
        required: false,
    },
    FieldSpec {
        key: "execution_id",
        label: "Execution",
        kind: FieldKind::Integer,
        editable: false,
        required: false,
    },
    FieldSpec {
        key: "title",
        label: "Title",
        kind: FieldKind::Text,
        editable: true,
        required: true,
    },
    FieldSpec {
        key: "short_description",
        label: "Short description",
        kind: FieldKind::Text,
        editable: true,
        required: false,
    },
    FieldSpec {
        key: "message",
        label: "Message",
        kind: FieldKind::MultilineText,
        editable: true,
        required: false,
    },
    FieldSpec {
        key: "status",
        label: "Status",
        kind: FieldKind::Status,
        editable: true,
        required: false,
    },
    FieldSpec {
        key: "review_type",
        label: "Type",
        kind: FieldKind::Text,
        editable: true,
        required: false,
    },
    FieldSpec {
        key: "category",
        label: "Category",
        kind: FieldKind::Text,
        editable: true,
        required: false,
    },
    FieldSpec {
        key: "created",
        label: "Created",
        kind: FieldKind::Timestamp,
        editable: false,
        required: false,
    },
];

static REVIEW_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec {
        key: "id",
        label: "ID",
        default_width: 6,
        min_width: 4,
        resizable: true,
    },
    ColumnSpec {
        key: "execution_id",
        label: "Execution",
        default_width: 10,
        min_width: 6,
        resizable: true,
    },
    ColumnSpec {
        key: "title",
        label: "Title",
        default_width: 32,
        min_width: 10,
        resizable: true,
    },
    ColumnSpec {
        key: "status",
        label: "Status",
        default_width: 10,
        min_width: 6,
        resizable: true,
    },
    ColumnSpec {
        key: "review_type",
        label: "Type",
        default_width: 10,
        min_width: 6,
        resizable: true,
    },
    ColumnSpec {
        key: "category",
        label: "Category",
        default_width: 14,
        min_width: 6,
        resizable: true,
    },
    ColumnSpec {
        key: "created",
        label: "Created",
        default_width: 17,
        min_width: 8,
        resizable: true,
    },
];

static REVIEW_FILTERS: &[FilterSpec] = &[
    FilterSpec {
        name: "status",
        label: "Status",
        kind: FilterKind::Choice(REVIEW_STATUS_OPTIONS),
    },
    FilterSpec {
        name: "execution_id",
        label: "Execution ID",
        kind: FilterKind::Integer,
    },
    FilterSpec {
        name: "category",
        label: "Category",
        kind: FilterKind::Text,
    },
    FilterSpec {
        name: "from",
        label: "From",
        kind: FilterKind::Date,
    },
    FilterSpec {
        name: "to",
        label: "To",
        kind: FilterKind::Date,
    },
];

fn review_status_is_single_word(fields: &FieldMap) -> Result<(), ValidationError> {
    let status = fields.get("status").and_then(Value::as_str).unwrap_or("");
    if status.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: "status".to_string(),
            reason: "must be a single word such as DONE or PENDING".to_string(),
        })
    }
}

static REVIEW_DESCRIPTOR: RecordDescriptor = RecordDescriptor {
    entity: "content review",
    fields: REVIEW_FIELDS,
    columns: REVIEW_COLUMNS,
    filters: REVIEW_FILTERS,
    validators: &[review_status_is_single_word],
    done_status: Some("DONE"),
    creatable: false,
};

impl GridRecord for ContentReview {
    fn descriptor() -> &'static RecordDescriptor {
        &REVIEW_DESCRIPTOR
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn field_value(&self, key: &str) -> Value {
        match key {
            "id" => Value::from(self.id),
            "execution_id" => self.execution_id.map(Value::from).unwrap_or(Value::Null),
            "title" => Value::from(self.title.clone()),
            "short_description" => Value::from(self.short_description.clone()),
            "message" => Value::from(self.message.clone()),
            "status" => Value::from(self.status.clone()),
            "review_type" => Value::from(self.review_type.clone()),
            "category" => Value::from(self.category.clone()),
            "created" => self
                .created
                .map(|ts| Value::from(ts.to_rfc3339()))
                .unwrap_or(Value::Null),
            _ => Value::Null,
        }
    }

    fn cell_text(&self, key: &str) -> String {
        match key {
            "status" if self.status.trim().is_empty() => ReviewStatus::Pending.as_str().to_string(),
            "created" => format_timestamp(self.created.as_ref()),
            _ => crate::record::display_value(&self.field_value(key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn review(status: &str) -> ContentReview {
        ContentReview {
            id: 7,
            execution_id: Some(70),
            title: "Launch copy".to_string(),
            short_description: "Hero banner".to_string(),
            message: "Please check tone".to_string(),
            status: status.to_string(),
            review_type: "copy".to_string(),
            category: "marketing".to_string(),
            created: None,
        }
    }

    #[test]
    fn test_format_timestamp_placeholder_for_zero_value() {
        let zero = Utc.with_ymd_and_hms(1, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_timestamp(Some(&zero)), PLACEHOLDER);
        assert_eq!(format_timestamp(None), PLACEHOLDER);

        let ts = Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap();
        assert_eq!(format_timestamp(Some(&ts)), "2024-05-17 09:30");
    }

    #[test]
    fn test_status_tone() {
        assert_eq!(status_tone("FAILED"), StatusTone::Negative);
        assert_eq!(status_tone("error"), StatusTone::Negative);
        assert_eq!(status_tone("Approved"), StatusTone::Positive);
        assert_eq!(status_tone("DONE"), StatusTone::Positive);
        assert_eq!(status_tone(""), StatusTone::Neutral);
        assert_eq!(status_tone("PENDING"), StatusTone::Neutral);
    }

    #[test]
    fn test_review_status_cycle_wraps_through_any() {
        assert_eq!(ReviewStatus::cycle(None), Some("DONE"));
        assert_eq!(ReviewStatus::cycle(Some("DONE")), Some("ERROR"));
        assert_eq!(ReviewStatus::cycle(Some("ERROR")), Some("PENDING"));
        assert_eq!(ReviewStatus::cycle(Some("PENDING")), None);
        assert_eq!(ReviewStatus::cycle(Some("weird")), Some("DONE"));
    }

    #[test]
    fn test_review_empty_status_displays_pending() {
        assert_eq!(review("").cell_text("status"), "PENDING");
        assert_eq!(review("ERROR").cell_text("status"), "ERROR");
    }

    #[test]
    fn test_review_is_done_ignores_case() {
        assert!(review("done").is_done());
        assert!(!review("PENDING").is_done());
    }

    #[test]
    fn test_step_never_done() {
        let step = Step {
            id: 1,
            name: "Outline".to_string(),
            prompt: String::new(),
            order_index: 0,
            workflow_id: None,
            agent_id: None,
            created_at: None,
        };
        assert!(!step.is_done());
        assert_eq!(step.cell_text("workflow_id"), PLACEHOLDER);
    }

    #[test]
    fn test_review_snapshot_has_editable_fields_only() {
        let snapshot = review("PENDING").snapshot();
        let keys: Vec<&str> = snapshot.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["category", "message", "review_type", "short_description", "status", "title"]
        );
        assert_eq!(snapshot["title"], json!("Launch copy"));
    }

    #[test]
    fn test_review_status_validator() {
        let mut fields = review("PENDING").snapshot();
        assert!(ContentReview::descriptor().validate(&fields).is_ok());
        fields.insert("status".to_string(), json!("not done"));
        assert!(ContentReview::descriptor().validate(&fields).is_err());
    }

    #[test]
    fn test_step_order_validator() {
        let mut fields = Step::descriptor().blank_fields();
        fields.insert("name".to_string(), json!("Draft"));
        fields.insert("order_index".to_string(), json!(-1));
        assert!(matches!(
            Step::descriptor().validate(&fields),
            Err(ValidationError::InvalidValue { field, .. }) if field == "order_index"
        ));
    }

    #[test]
    fn test_lookups_cycle_and_names() {
        let lookups = Lookups {
            agents: vec![
                Agent {
                    id: 3,
                    name: "Writer".to_string(),
                },
                Agent {
                    id: 9,
                    name: "Editor".to_string(),
                },
            ],
            workflows: Vec::new(),
        };
        assert_eq!(lookups.name_of(ForeignKind::Agent, 9), Some("Editor"));
        assert_eq!(lookups.name_of(ForeignKind::Workflow, 9), None);
        assert_eq!(lookups.cycle(ForeignKind::Agent, None), Some(3));
        assert_eq!(lookups.cycle(ForeignKind::Agent, Some(3)), Some(9));
        assert_eq!(lookups.cycle(ForeignKind::Agent, Some(9)), None);
        assert_eq!(lookups.cycle(ForeignKind::Workflow, None), None);
    }
}
