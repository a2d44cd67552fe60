//! BACKOFFICE Test Utilities
//!
//! Centralized test infrastructure for the BACKOFFICE workspace:
//! - An in-memory [`MockDataSource`] with scripted failures and a call log
//! - Proptest generators for record types
//! - Test fixtures for common scenarios
//! - Custom assertions for grid state

pub use backoffice_core::{
    ContentReview, DataSourceError, FieldMap, GridController, GridError, GridRecord, GridResult,
    Page, PageQuery, RecordId, RemoteDataSource, Step,
};

use async_trait::async_trait;
use backoffice_core::paginate_locally;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

// ============================================================================
// MOCK DATA SOURCE
// ============================================================================

/// Record types the mock can create and patch without a server.
pub trait MockRecord: GridRecord {
    /// Build a new record from a create payload.
    fn from_fields(id: RecordId, fields: &FieldMap) -> Self;

    /// Copy of `self` with `patch` applied, as a server would return it.
    fn apply(&self, patch: &FieldMap) -> Self;
}

fn text(fields: &FieldMap, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

fn integer(fields: &FieldMap, key: &str) -> Option<Option<i64>> {
    fields.get(key).map(Value::as_i64)
}

impl MockRecord for Step {
    fn from_fields(id: RecordId, fields: &FieldMap) -> Self {
        Step {
            id,
            name: String::new(),
            prompt: String::new(),
            order_index: 0,
            workflow_id: None,
            agent_id: None,
            created_at: None,
        }
        .apply(fields)
    }

    fn apply(&self, patch: &FieldMap) -> Self {
        let mut step = self.clone();
        if let Some(name) = text(patch, "name") {
            step.name = name;
        }
        if let Some(prompt) = text(patch, "prompt") {
            step.prompt = prompt;
        }
        if let Some(order) = integer(patch, "order_index") {
            step.order_index = order.unwrap_or_default();
        }
        if let Some(workflow) = integer(patch, "workflow_id") {
            step.workflow_id = workflow;
        }
        if let Some(agent) = integer(patch, "agent_id") {
            step.agent_id = agent;
        }
        step
    }
}

impl MockRecord for ContentReview {
    fn from_fields(id: RecordId, fields: &FieldMap) -> Self {
        fixtures::review(id, "").apply(fields)
    }

    fn apply(&self, patch: &FieldMap) -> Self {
        let mut review = self.clone();
        let slots: [(&str, &mut String); 6] = [
            ("title", &mut review.title),
            ("short_description", &mut review.short_description),
            ("message", &mut review.message),
            ("status", &mut review.status),
            ("review_type", &mut review.review_type),
            ("category", &mut review.category),
        ];
        for (key, slot) in slots {
            if let Some(value) = text(patch, key) {
                *slot = value;
            }
        }
        review
    }
}

/// Operation kinds a failure can be scripted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Fetch,
    Create,
    Update,
    Delete,
}

/// One call received by a [`MockDataSource`].
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Fetch(PageQuery),
    Create(FieldMap),
    Update(RecordId, FieldMap),
    Delete(RecordId),
}

/// In-memory data source.
///
/// Fetches page the stored records locally, applying any filter whose name
/// matches a record field by exact text. Writes mutate the store. Failures
/// scripted with [`MockDataSource::fail_next`] are consumed in call order.
#[derive(Debug)]
pub struct MockDataSource<R> {
    records: Arc<RwLock<Vec<R>>>,
    failures: Arc<Mutex<HashMap<MockOp, VecDeque<DataSourceError>>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
    next_id: Arc<AtomicI64>,
}

impl<R> Clone for MockDataSource<R> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            failures: Arc::clone(&self.failures),
            calls: Arc::clone(&self.calls),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<R: MockRecord> MockDataSource<R> {
    pub fn new(records: Vec<R>) -> Self {
        let next_id = records.iter().map(GridRecord::id).max().unwrap_or(0) + 1;
        Self {
            records: Arc::new(RwLock::new(records)),
            failures: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicI64::new(next_id)),
        }
    }

    /// Make the next call of kind `op` fail with `error`.
    pub fn fail_next(&self, op: MockOp, error: DataSourceError) {
        self.failures
            .lock()
            .unwrap()
            .entry(op)
            .or_default()
            .push_back(error);
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockCall::Fetch(_)))
            .count()
    }

    pub fn records(&self) -> Vec<R> {
        self.records.read().unwrap().clone()
    }

    /// Replace the stored records, e.g. to simulate another user's changes.
    pub fn set_records(&self, records: Vec<R>) {
        *self.records.write().unwrap() = records;
    }

    fn record_call(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn take_failure(&self, op: MockOp) -> Result<(), DataSourceError> {
        match self
            .failures
            .lock()
            .unwrap()
            .get_mut(&op)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<R: MockRecord> RemoteDataSource for MockDataSource<R> {
    type Record = R;

    async fn fetch_page(&self, query: &PageQuery) -> Result<Page<R>, DataSourceError> {
        self.record_call(MockCall::Fetch(query.clone()));
        self.take_failure(MockOp::Fetch)?;
        let descriptor = R::descriptor();
        let matching: Vec<R> = self
            .records
            .read()
            .unwrap()
            .iter()
            .filter(|record| {
                query
                    .criteria
                    .iter()
                    .filter(|(name, _)| descriptor.field(name).is_some())
                    .all(|(name, value)| record.cell_text(name) == value)
            })
            .cloned()
            .collect();
        Ok(paginate_locally(&matching, query))
    }

    async fn create_record(&self, payload: &FieldMap) -> Result<R, DataSourceError> {
        self.record_call(MockCall::Create(payload.clone()));
        self.take_failure(MockOp::Create)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = R::from_fields(id, payload);
        self.records.write().unwrap().insert(0, record.clone());
        Ok(record)
    }

    async fn update_record(&self, id: RecordId, patch: &FieldMap) -> Result<R, DataSourceError> {
        self.record_call(MockCall::Update(id, patch.clone()));
        self.take_failure(MockOp::Update)?;
        let mut records = self.records.write().unwrap();
        let slot = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| DataSourceError::server(404, format!("record {} not found", id)))?;
        *slot = slot.apply(patch);
        Ok(slot.clone())
    }

    async fn delete_record(&self, id: RecordId) -> Result<(), DataSourceError> {
        self.record_call(MockCall::Delete(id));
        self.take_failure(MockOp::Delete)?;
        let mut records = self.records.write().unwrap();
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(DataSourceError::server(404, format!("record {} not found", id)));
        }
        Ok(())
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for BACKOFFICE record types.

    use super::*;
    use backoffice_core::{PageNav, Timestamp};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    /// Generate a timestamp between 2020 and 2030, or none.
    pub fn arb_timestamp() -> impl Strategy<Value = Option<Timestamp>> {
        prop::option::of(
            (1_577_836_800i64..1_893_456_000i64)
                .prop_map(|secs| Utc.timestamp_opt(secs, 0).single().unwrap_or_default()),
        )
    }

    /// Generate a review status as the server sends it, including empty.
    pub fn arb_review_status() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            Just("DONE".to_string()),
            Just("ERROR".to_string()),
            Just("PENDING".to_string()),
        ]
    }

    pub fn arb_page_nav() -> impl Strategy<Value = PageNav> {
        prop_oneof![
            Just(PageNav::First),
            Just(PageNav::Prev),
            Just(PageNav::Next),
            Just(PageNav::Last),
        ]
    }

    pub fn arb_step(id: RecordId) -> impl Strategy<Value = Step> {
        (
            "[A-Za-z ]{1,24}",
            "[A-Za-z .]{0,80}",
            0i64..50,
            prop::option::of(1i64..10),
            prop::option::of(1i64..10),
            arb_timestamp(),
        )
            .prop_map(move |(name, prompt, order_index, workflow_id, agent_id, created_at)| Step {
                id,
                name,
                prompt,
                order_index,
                workflow_id,
                agent_id,
                created_at,
            })
    }

    pub fn arb_review(id: RecordId) -> impl Strategy<Value = ContentReview> {
        (
            "[A-Za-z ]{1,32}",
            arb_review_status(),
            "[a-z]{3,10}",
            prop::option::of(1i64..1000),
            arb_timestamp(),
        )
            .prop_map(move |(title, status, category, execution_id, created)| ContentReview {
                id,
                execution_id,
                title,
                short_description: String::new(),
                message: String::new(),
                status,
                review_type: "copy".to_string(),
                category,
                created,
            })
    }

    /// Reviews with distinct ids `1..=len`.
    pub fn arb_reviews(max_len: usize) -> impl Strategy<Value = Vec<ContentReview>> {
        (0..=max_len).prop_flat_map(|len| {
            (1..=len as RecordId)
                .map(arb_review)
                .collect::<Vec<_>>()
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built records and grids for common scenarios.

    use super::*;
    use backoffice_core::{ActionDispatcher, Agent, Lookups, Workflow};

    pub fn step(id: RecordId, name: &str) -> Step {
        Step {
            id,
            name: name.to_string(),
            prompt: format!("Prompt for {}", name),
            order_index: id,
            workflow_id: Some(1),
            agent_id: Some(1),
            created_at: None,
        }
    }

    pub fn review(id: RecordId, status: &str) -> ContentReview {
        ContentReview {
            id,
            execution_id: Some(id * 10),
            title: format!("Review {}", id),
            short_description: format!("Short description {}", id),
            message: format!("Message {}", id),
            status: status.to_string(),
            review_type: "copy".to_string(),
            category: "news".to_string(),
            created: None,
        }
    }

    /// Reviews with ids `1..=count`, all pending.
    pub fn reviews(count: RecordId) -> Vec<ContentReview> {
        (1..=count).map(|id| review(id, "PENDING")).collect()
    }

    pub fn steps(count: RecordId) -> Vec<Step> {
        (1..=count).map(|id| step(id, &format!("Step {}", id))).collect()
    }

    pub fn lookups() -> Lookups {
        Lookups {
            agents: vec![
                Agent {
                    id: 1,
                    name: "Writer".to_string(),
                },
                Agent {
                    id: 2,
                    name: "Editor".to_string(),
                },
            ],
            workflows: vec![Workflow {
                id: 1,
                name: "Blog post".to_string(),
            }],
        }
    }

    /// A dispatcher over `records` and a grid that has applied its first page.
    pub async fn loaded_grid<R: MockRecord>(
        records: Vec<R>,
        limit: u32,
    ) -> (ActionDispatcher<MockDataSource<R>>, GridController<R>) {
        let dispatcher = ActionDispatcher::new(MockDataSource::new(records));
        let mut grid = GridController::new(limit);
        let completion = dispatcher.refresh(&mut grid).await;
        dispatcher.reconcile(&mut grid, completion);
        (dispatcher, grid)
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for grid state.

    use super::*;
    use backoffice_core::{EditState, GridPhase};

    /// Assert the ids of the grid's rows, in order.
    #[track_caller]
    pub fn assert_row_ids<R: GridRecord>(grid: &GridController<R>, expected: &[RecordId]) {
        let ids: Vec<RecordId> = grid.rows().iter().map(GridRecord::id).collect();
        assert_eq!(ids, expected, "row ids mismatch");
    }

    #[track_caller]
    pub fn assert_ready<R: GridRecord>(grid: &GridController<R>) {
        assert_eq!(grid.phase(), &GridPhase::Ready, "Expected Ready phase");
    }

    /// Assert the grid is editing `id` (not saving).
    #[track_caller]
    pub fn assert_editing<R: GridRecord>(grid: &GridController<R>, id: RecordId) {
        match grid.edit().state() {
            EditState::Editing(buffer) if buffer.record_id() == id => {}
            other => panic!("Expected Editing({}), got: {:?}", id, other),
        }
    }

    #[track_caller]
    pub fn assert_viewing<R: GridRecord>(grid: &GridController<R>) {
        assert_eq!(grid.edit().state(), &EditState::Viewing, "Expected Viewing");
    }

    #[track_caller]
    pub fn assert_grid_error<T: std::fmt::Debug>(result: &GridResult<T>, expected: &GridError) {
        match result {
            Err(err) if err == expected => {}
            other => panic!("Expected Err({:?}), got: {:?}", expected, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_fetch_filters_and_pages() {
        let mut records = fixtures::reviews(5);
        records[1].status = "DONE".to_string();
        records[3].status = "DONE".to_string();
        let source = MockDataSource::new(records);
        let query = PageQuery {
            criteria: backoffice_core::FilterCriteria::new().with("status", "DONE"),
            page: 1,
            limit: 1,
        };
        let page = source.fetch_page(&query).await.unwrap();
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.records[0].id, 2);
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_scripted_failure_is_consumed_once() {
        let source = MockDataSource::new(fixtures::reviews(1));
        source.fail_next(MockOp::Update, DataSourceError::server(500, "boom"));
        let mut patch = FieldMap::new();
        patch.insert("title".to_string(), json!("x"));
        assert!(source.update_record(1, &patch).await.is_err());
        let updated = source.update_record(1, &patch).await.unwrap();
        assert_eq!(updated.title, "x");
    }

    #[tokio::test]
    async fn test_mock_create_assigns_next_id() {
        let source = MockDataSource::new(fixtures::steps(3));
        let mut payload = FieldMap::new();
        payload.insert("name".to_string(), json!("New"));
        payload.insert("order_index".to_string(), json!(4));
        let created = source.create_record(&payload).await.unwrap();
        assert_eq!(created.id, 4);
        assert_eq!(created.order_index, 4);
        assert_eq!(source.records()[0].id, 4);
    }

    #[tokio::test]
    async fn test_mock_delete_missing_is_error() {
        let source = MockDataSource::new(fixtures::steps(1));
        assert!(source.delete_record(9).await.is_err());
        assert!(source.delete_record(1).await.is_ok());
        assert!(source.records().is_empty());
    }
}
