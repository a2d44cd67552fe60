//! JSON shapes exchanged with the record store.
//!
//! Steps travel with capitalized keys (`ID`, `Name`, `OrderIndex`, ...),
//! content reviews with snake_case keys and a `type` field. Both are mapped
//! into the canonical entity types here and nowhere else.

use backoffice_core::{Agent, ContentReview, FieldMap, RecordId, Step, Timestamp, Workflow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Treat `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Unparseable timestamps become absent rather than failing the whole page.
fn parse_timestamp(raw: Option<&str>) -> Option<Timestamp> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(err) => {
            tracing::debug!(value = raw, error = %err, "ignoring unparseable timestamp");
            None
        }
    }
}

// ============================================================================
// STEPS
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct StepDto {
    #[serde(rename = "ID", alias = "id", alias = "Id")]
    pub id: RecordId,
    #[serde(rename = "Name", alias = "name", default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(rename = "Prompt", alias = "prompt", default, deserialize_with = "nullable")]
    pub prompt: String,
    #[serde(
        rename = "OrderIndex",
        alias = "order_index",
        alias = "orderIndex",
        default,
        deserialize_with = "nullable"
    )]
    pub order_index: i64,
    #[serde(
        rename = "WorkflowID",
        alias = "workflow_id",
        alias = "workflowId",
        default
    )]
    pub workflow_id: Option<RecordId>,
    #[serde(rename = "AgentID", alias = "agent_id", alias = "agentId", default)]
    pub agent_id: Option<RecordId>,
    #[serde(
        rename = "CreatedAt",
        alias = "created_at",
        alias = "createdAt",
        default
    )]
    pub created_at: Option<String>,
}

impl From<StepDto> for Step {
    fn from(dto: StepDto) -> Self {
        Step {
            id: dto.id,
            name: dto.name,
            prompt: dto.prompt,
            order_index: dto.order_index,
            workflow_id: dto.workflow_id,
            agent_id: dto.agent_id,
            created_at: parse_timestamp(dto.created_at.as_deref()),
        }
    }
}

const STEP_WIRE_KEYS: &[(&str, &str)] = &[
    ("id", "ID"),
    ("name", "Name"),
    ("prompt", "Prompt"),
    ("order_index", "OrderIndex"),
    ("workflow_id", "WorkflowID"),
    ("agent_id", "AgentID"),
];

/// Step write body with capitalized keys. `id` is included for updates.
pub fn step_body(id: Option<RecordId>, fields: &FieldMap) -> Value {
    let mut body = Map::new();
    if let Some(id) = id {
        body.insert("ID".to_string(), Value::from(id));
    }
    for (key, value) in fields {
        if let Some((_, wire)) = STEP_WIRE_KEYS.iter().find(|(canonical, _)| canonical == key) {
            body.insert((*wire).to_string(), value.clone());
        }
    }
    Value::Object(body)
}

// ============================================================================
// CONTENT REVIEWS
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ContentReviewDto {
    pub id: RecordId,
    #[serde(default)]
    pub execution_id: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable")]
    pub short_description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub message: String,
    #[serde(default, deserialize_with = "nullable")]
    pub status: String,
    #[serde(rename = "type", alias = "review_type", default, deserialize_with = "nullable")]
    pub review_type: String,
    #[serde(default, deserialize_with = "nullable")]
    pub category: String,
    #[serde(default, alias = "created_at")]
    pub created: Option<String>,
}

impl From<ContentReviewDto> for ContentReview {
    fn from(dto: ContentReviewDto) -> Self {
        ContentReview {
            id: dto.id,
            execution_id: dto.execution_id,
            title: dto.title,
            short_description: dto.short_description,
            message: dto.message,
            status: dto.status,
            review_type: dto.review_type,
            category: dto.category,
            created: parse_timestamp(dto.created.as_deref()),
        }
    }
}

/// Review write body; `review_type` travels as `type`.
pub fn review_body(fields: &FieldMap) -> Value {
    let body: Map<String, Value> = fields
        .iter()
        .map(|(key, value)| {
            let wire = if key == "review_type" { "type" } else { key.as_str() };
            (wire.to_string(), value.clone())
        })
        .collect();
    Value::Object(body)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationDto {
    #[serde(rename = "totalPages", alias = "total_pages", default)]
    pub total_pages: Option<u32>,
}

/// `GET /content-reviews` envelope. Missing `data` means no rows; a missing
/// or zero page count means one page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewPageDto {
    #[serde(default, deserialize_with = "nullable")]
    pub data: Vec<ContentReviewDto>,
    #[serde(default)]
    pub pagination: Option<PaginationDto>,
}

impl ReviewPageDto {
    pub fn total_pages(&self) -> u32 {
        self.pagination
            .as_ref()
            .and_then(|p| p.total_pages)
            .filter(|total| *total > 0)
            .unwrap_or(1)
    }
}

// ============================================================================
// LOOKUPS
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct NamedDto {
    #[serde(rename = "ID", alias = "id", alias = "Id")]
    pub id: RecordId,
    #[serde(rename = "Name", alias = "name", default, deserialize_with = "nullable")]
    pub name: String,
}

impl From<NamedDto> for Agent {
    fn from(dto: NamedDto) -> Self {
        Agent {
            id: dto.id,
            name: dto.name,
        }
    }
}

impl From<NamedDto> for Workflow {
    fn from(dto: NamedDto) -> Self {
        Workflow {
            id: dto.id,
            name: dto.name,
        }
    }
}
