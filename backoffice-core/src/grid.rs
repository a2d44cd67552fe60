//! Grid state controller.
//!
//! Owns rows, filters, pagination, the expanded set, the edit session, the
//! column layout and the per-row in-flight set for one record type. Every
//! transition is synchronous; remote calls are described by the values the
//! `begin_*` methods and [`FetchTicket`]s return and resolved by the matching
//! `finish_*` / [`GridController::apply_fetch`] calls.

use crate::data_source::{Page, PageQuery};
use crate::edit::EditSession;
use crate::error::{DataSourceError, GridError, GridResult};
use crate::filter::FilterCriteria;
use crate::layout::ColumnLayout;
use crate::pagination::{PageNav, Pagination};
use crate::record::{FieldMap, GridRecord, RecordDescriptor, RecordId};
use serde_json::Value;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridPhase {
    Loading,
    Ready,
    /// Last fetch failed. Filters and pagination are kept for retry.
    Error(String),
}

/// A fetch the host must run. Only the ticket with the latest `seq` is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub query: PageQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer fetch was issued since; the response was dropped.
    Stale,
    Failed,
    /// The response reported fewer pages than the current page. The page
    /// was clamped and this fetch replaces the dropped response.
    Reissued(FetchTicket),
}

/// Input for a record that does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateForm {
    fields: FieldMap,
    error: Option<String>,
    submitting: bool,
}

impl CreateForm {
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }
}

#[derive(Debug)]
pub struct GridController<R: GridRecord> {
    rows: Vec<R>,
    phase: GridPhase,
    pagination: Pagination,
    criteria: FilterCriteria,
    expanded: HashSet<RecordId>,
    edit: EditSession,
    layout: ColumnLayout,
    in_flight: HashSet<RecordId>,
    create_form: Option<CreateForm>,
    latest_seq: u64,
}

impl<R: GridRecord> GridController<R> {
    /// Empty grid in `Loading`; the host issues the first fetch.
    pub fn new(limit: u32) -> Self {
        Self {
            rows: Vec::new(),
            phase: GridPhase::Loading,
            pagination: Pagination::new(limit),
            criteria: FilterCriteria::new(),
            expanded: HashSet::new(),
            edit: EditSession::new(),
            layout: ColumnLayout::new(R::descriptor().columns),
            in_flight: HashSet::new(),
            create_form: None,
            latest_seq: 0,
        }
    }

    pub fn descriptor(&self) -> &'static RecordDescriptor {
        R::descriptor()
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn row(&self, id: RecordId) -> Option<&R> {
        self.rows.iter().find(|r| r.id() == id)
    }

    pub fn phase(&self) -> &GridPhase {
        &self.phase
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn edit(&self) -> &EditSession {
        &self.edit
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut ColumnLayout {
        &mut self.layout
    }

    pub fn create_form(&self) -> Option<&CreateForm> {
        self.create_form.as_ref()
    }

    pub fn is_expanded(&self, id: RecordId) -> bool {
        self.expanded.contains(&id)
    }

    pub fn is_in_flight(&self, id: RecordId) -> bool {
        self.in_flight.contains(&id)
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// Query for the current filters and page.
    pub fn query(&self) -> PageQuery {
        PageQuery {
            criteria: self.criteria.clone(),
            page: self.pagination.page(),
            limit: self.pagination.limit(),
        }
    }

    // ------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------

    /// Enter `Loading` and describe the fetch for the current query.
    ///
    /// Any response belonging to an earlier ticket becomes stale.
    pub fn issue_fetch(&mut self) -> FetchTicket {
        self.latest_seq += 1;
        self.phase = GridPhase::Loading;
        let ticket = FetchTicket {
            seq: self.latest_seq,
            query: self.query(),
        };
        tracing::debug!(
            entity = R::descriptor().entity,
            seq = ticket.seq,
            page = ticket.query.page,
            limit = ticket.query.limit,
            filters = ticket.query.criteria.len(),
            "fetch issued"
        );
        ticket
    }

    pub fn refresh(&mut self) -> FetchTicket {
        self.issue_fetch()
    }

    /// Reissue the fetch for the unchanged filters and page.
    pub fn retry(&mut self) -> FetchTicket {
        self.issue_fetch()
    }

    pub fn apply_fetch(
        &mut self,
        seq: u64,
        result: Result<Page<R>, DataSourceError>,
    ) -> FetchOutcome {
        if seq != self.latest_seq {
            tracing::debug!(seq, latest = self.latest_seq, "dropping stale fetch response");
            return FetchOutcome::Stale;
        }
        let page = match result {
            Ok(page) => page,
            Err(err) => {
                let entity = R::descriptor().entity;
                tracing::warn!(entity, seq, error = %err, "fetch failed");
                self.phase = GridPhase::Error(err.user_message(&format!("Failed to load {}s", entity)));
                return FetchOutcome::Failed;
            }
        };

        if self.pagination.accept_total(page.total_pages) {
            tracing::debug!(
                seq,
                total_pages = self.pagination.total_pages(),
                "page out of range, refetching last page"
            );
            return FetchOutcome::Reissued(self.issue_fetch());
        }

        let mut seen = HashSet::with_capacity(page.records.len());
        let mut rows = Vec::with_capacity(page.records.len());
        for record in page.records {
            if seen.insert(record.id()) {
                rows.push(record);
            } else {
                tracing::warn!(id = record.id(), "duplicate record id in response, keeping first");
            }
        }
        self.rows = rows;
        self.phase = GridPhase::Ready;
        FetchOutcome::Applied
    }

    /// Set or clear one filter. A change resets to page 1 and issues a fetch;
    /// an unchanged value returns `None`.
    pub fn set_filter(&mut self, name: &str, value: Option<String>) -> GridResult<Option<FetchTicket>> {
        let spec = R::descriptor()
            .filter(name)
            .ok_or_else(|| GridError::UnknownFilter {
                name: name.to_string(),
            })?;
        let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(value) = &value {
            spec.check(value).map_err(|reason| GridError::InvalidFilter {
                name: name.to_string(),
                reason,
            })?;
        }
        if !self.criteria.set(spec.name, value) {
            return Ok(None);
        }
        self.pagination.reset();
        Ok(Some(self.issue_fetch()))
    }

    pub fn clear_filters(&mut self) -> Option<FetchTicket> {
        if !self.criteria.clear() {
            return None;
        }
        self.pagination.reset();
        Some(self.issue_fetch())
    }

    /// Change the page size. A change resets to page 1 and issues a fetch.
    pub fn set_limit(&mut self, limit: u32) -> Option<FetchTicket> {
        if !self.pagination.set_limit(limit) {
            return None;
        }
        self.pagination.reset();
        Some(self.issue_fetch())
    }

    /// Move to another page. Navigation that lands on the current page is a
    /// no-op and issues nothing.
    pub fn navigate(&mut self, nav: PageNav) -> Option<FetchTicket> {
        let target = self.pagination.target(nav);
        if target == self.pagination.page() {
            return None;
        }
        self.pagination.set_page(target);
        Some(self.issue_fetch())
    }

    pub fn go_first(&mut self) -> Option<FetchTicket> {
        self.navigate(PageNav::First)
    }

    pub fn go_prev(&mut self) -> Option<FetchTicket> {
        self.navigate(PageNav::Prev)
    }

    pub fn go_next(&mut self) -> Option<FetchTicket> {
        self.navigate(PageNav::Next)
    }

    pub fn go_last(&mut self) -> Option<FetchTicket> {
        self.navigate(PageNav::Last)
    }

    // ------------------------------------------------------------------
    // Local row state
    // ------------------------------------------------------------------

    /// Open or close a row's detail region. Returns the new state.
    pub fn toggle_expand(&mut self, id: RecordId) -> bool {
        if self.expanded.remove(&id) {
            false
        } else {
            self.expanded.insert(id);
            true
        }
    }

    /// Swap in the server's copy of a record. Returns `false` when the row is
    /// no longer on the current page.
    pub fn replace_row(&mut self, record: R) -> bool {
        match self.rows.iter_mut().find(|r| r.id() == record.id()) {
            Some(row) => {
                *row = record;
                true
            }
            None => false,
        }
    }

    pub fn remove_row(&mut self, id: RecordId) -> Option<R> {
        let index = self.rows.iter().position(|r| r.id() == id)?;
        self.expanded.remove(&id);
        Some(self.rows.remove(index))
    }

    fn insert_row_first(&mut self, record: R) {
        self.rows.retain(|r| r.id() != record.id());
        self.rows.insert(0, record);
    }

    // ------------------------------------------------------------------
    // Inline editing
    // ------------------------------------------------------------------

    pub fn start_edit(&mut self, id: RecordId) -> GridResult<()> {
        let snapshot = self
            .row(id)
            .map(|row| row.snapshot())
            .ok_or(GridError::RowNotFound { id })?;
        if self.in_flight.contains(&id) {
            return Err(GridError::RowBusy { id });
        }
        self.edit.start(id, snapshot)
    }

    pub fn update_field(&mut self, key: &str, value: Value) -> GridResult<()> {
        self.edit.set_field(R::descriptor(), key, value)
    }

    /// Parse raw editor text according to the field kind, then store it.
    pub fn update_field_text(&mut self, key: &str, input: &str) -> GridResult<()> {
        let value = parse_field_input(R::descriptor(), key, input)?;
        self.update_field(key, value)
    }

    pub fn cancel_edit(&mut self) -> GridResult<()> {
        self.edit.cancel()
    }

    /// Validate the buffer and mark its row in flight.
    pub(crate) fn begin_save(&mut self) -> GridResult<(RecordId, FieldMap)> {
        let (id, payload) = self.edit.begin_save(R::descriptor())?;
        self.in_flight.insert(id);
        Ok((id, payload))
    }

    /// Resolve a save. `Err` carries the message shown to the user.
    pub(crate) fn finish_save(
        &mut self,
        id: RecordId,
        result: Result<R, DataSourceError>,
    ) -> Result<(), String> {
        self.in_flight.remove(&id);
        match result {
            Ok(record) => {
                self.replace_row(record);
                self.edit.finish_save(id, Ok(()));
                Ok(())
            }
            Err(err) => {
                let entity = R::descriptor().entity;
                tracing::warn!(entity, id, error = %err, "save failed");
                let message = err.user_message(&format!("Failed to save {}", entity));
                self.edit.finish_save(id, Err(message.clone()));
                Err(message)
            }
        }
    }

    // ------------------------------------------------------------------
    // Row actions
    // ------------------------------------------------------------------

    fn claim_row(&mut self, id: RecordId) -> GridResult<&R> {
        if self.edit.is_active(id) {
            return Err(GridError::EditInProgress { editing: id });
        }
        if self.in_flight.contains(&id) {
            return Err(GridError::RowBusy { id });
        }
        self.row(id).ok_or(GridError::RowNotFound { id })
    }

    /// Mark `id` in flight and return the done patch, or `None` when the row
    /// is already done.
    pub(crate) fn begin_mark_done(&mut self, id: RecordId) -> GridResult<Option<FieldMap>> {
        let descriptor = R::descriptor();
        let done = descriptor.done_status.ok_or(GridError::Unsupported {
            entity: descriptor.entity,
            action: "mark done",
        })?;
        if self.claim_row(id)?.is_done() {
            return Ok(None);
        }
        self.in_flight.insert(id);
        let mut patch = FieldMap::new();
        patch.insert("status".to_string(), Value::from(done));
        Ok(Some(patch))
    }

    pub(crate) fn finish_mark_done(
        &mut self,
        id: RecordId,
        result: Result<R, DataSourceError>,
    ) -> Result<(), String> {
        self.in_flight.remove(&id);
        match result {
            Ok(record) => {
                self.replace_row(record);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(id, error = %err, "mark done failed");
                Err(err.user_message(&format!(
                    "Failed to mark {} as done",
                    R::descriptor().entity
                )))
            }
        }
    }

    pub(crate) fn begin_delete(&mut self, id: RecordId) -> GridResult<()> {
        self.claim_row(id)?;
        self.in_flight.insert(id);
        Ok(())
    }

    /// Success removes exactly the deleted row. `total_pages` is left as the
    /// last fetch reported it.
    pub(crate) fn finish_delete(
        &mut self,
        id: RecordId,
        result: Result<(), DataSourceError>,
    ) -> Result<(), String> {
        self.in_flight.remove(&id);
        match result {
            Ok(()) => {
                self.remove_row(id);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(id, error = %err, "delete failed");
                Err(err.user_message(&format!("Failed to delete {}", R::descriptor().entity)))
            }
        }
    }

    // ------------------------------------------------------------------
    // Create form
    // ------------------------------------------------------------------

    /// Open an empty create form. Reopening keeps the current input.
    pub fn open_create(&mut self) -> GridResult<()> {
        let descriptor = R::descriptor();
        if !descriptor.creatable {
            return Err(GridError::Unsupported {
                entity: descriptor.entity,
                action: "create",
            });
        }
        if self.create_form.is_none() {
            self.create_form = Some(CreateForm {
                fields: descriptor.blank_fields(),
                error: None,
                submitting: false,
            });
        }
        Ok(())
    }

    pub fn close_create(&mut self) -> GridResult<()> {
        if self.create_form.as_ref().is_some_and(|f| f.submitting) {
            return Err(GridError::CreateInFlight);
        }
        self.create_form = None;
        Ok(())
    }

    pub fn update_create_field(&mut self, key: &str, value: Value) -> GridResult<()> {
        let descriptor = R::descriptor();
        let spec = descriptor.field(key).ok_or_else(|| GridError::UnknownField {
            key: key.to_string(),
        })?;
        if !spec.editable {
            return Err(GridError::ReadOnlyField {
                key: key.to_string(),
            });
        }
        let form = self.create_form.as_mut().ok_or(GridError::NoCreateForm)?;
        if form.submitting {
            return Err(GridError::CreateInFlight);
        }
        form.fields.insert(spec.key.to_string(), value);
        Ok(())
    }

    pub fn update_create_field_text(&mut self, key: &str, input: &str) -> GridResult<()> {
        let value = parse_field_input(R::descriptor(), key, input)?;
        self.update_create_field(key, value)
    }

    pub(crate) fn begin_create(&mut self) -> GridResult<FieldMap> {
        let form = self.create_form.as_mut().ok_or(GridError::NoCreateForm)?;
        if form.submitting {
            return Err(GridError::CreateInFlight);
        }
        if let Err(err) = R::descriptor().validate(&form.fields) {
            form.error = Some(err.to_string());
            return Err(err.into());
        }
        form.error = None;
        form.submitting = true;
        Ok(form.fields.clone())
    }

    /// Success closes the form and puts the new record first on the page.
    /// Failure keeps the input and stores the message on the form.
    pub(crate) fn finish_create(&mut self, result: Result<R, DataSourceError>) -> Result<RecordId, String> {
        match result {
            Ok(record) => {
                let id = record.id();
                self.create_form = None;
                self.insert_row_first(record);
                Ok(id)
            }
            Err(err) => {
                let entity = R::descriptor().entity;
                tracing::warn!(entity, error = %err, "create failed");
                let message = err.user_message(&format!("Failed to create {}", entity));
                if let Some(form) = self.create_form.as_mut() {
                    form.submitting = false;
                    form.error = Some(message.clone());
                }
                Err(message)
            }
        }
    }
}

fn parse_field_input(descriptor: &RecordDescriptor, key: &str, input: &str) -> GridResult<Value> {
    descriptor
        .field(key)
        .map(|spec| spec.kind.parse_input(input))
        .ok_or_else(|| GridError::UnknownField {
            key: key.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::EditState;
    use crate::entities::{ContentReview, Step};
    use serde_json::json;

    fn review(id: RecordId, status: &str) -> ContentReview {
        ContentReview {
            id,
            execution_id: None,
            title: format!("Review {}", id),
            short_description: String::new(),
            message: String::new(),
            status: status.to_string(),
            review_type: "copy".to_string(),
            category: "news".to_string(),
            created: None,
        }
    }

    fn page(ids: &[RecordId], total_pages: u32) -> Page<ContentReview> {
        Page {
            records: ids.iter().map(|id| review(*id, "PENDING")).collect(),
            total_pages,
        }
    }

    fn ready_grid(ids: &[RecordId], total_pages: u32) -> GridController<ContentReview> {
        let mut grid = GridController::new(10);
        let ticket = grid.issue_fetch();
        assert_eq!(grid.apply_fetch(ticket.seq, Ok(page(ids, total_pages))), FetchOutcome::Applied);
        grid
    }

    fn row_ids(grid: &GridController<ContentReview>) -> Vec<RecordId> {
        grid.rows().iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_new_grid_is_loading() {
        let grid: GridController<ContentReview> = GridController::new(50);
        assert_eq!(grid.phase(), &GridPhase::Loading);
        assert_eq!(grid.pagination().limit(), 50);
        assert!(grid.rows().is_empty());
    }

    #[test]
    fn test_only_latest_fetch_applies() {
        let mut grid: GridController<ContentReview> = GridController::new(10);
        let first = grid.issue_fetch();
        let second = grid.issue_fetch();
        assert_eq!(grid.apply_fetch(second.seq, Ok(page(&[2], 1))), FetchOutcome::Applied);
        assert_eq!(grid.apply_fetch(first.seq, Ok(page(&[1], 1))), FetchOutcome::Stale);
        assert_eq!(row_ids(&grid), vec![2]);
    }

    #[test]
    fn test_fetch_error_keeps_query() {
        let mut grid = ready_grid(&[1], 3);
        grid.set_filter("category", Some("news".to_string())).unwrap();
        let ticket = grid.go_next().unwrap();
        let outcome = grid.apply_fetch(ticket.seq, Err(DataSourceError::network("refused")));
        assert_eq!(outcome, FetchOutcome::Failed);
        assert_eq!(grid.phase(), &GridPhase::Error("Failed to load content reviews".to_string()));

        let retry = grid.retry();
        assert_eq!(retry.query, ticket.query);
        assert_eq!(grid.phase(), &GridPhase::Loading);
    }

    #[test]
    fn test_server_message_shown_on_fetch_error() {
        let mut grid: GridController<ContentReview> = GridController::new(10);
        let ticket = grid.issue_fetch();
        grid.apply_fetch(ticket.seq, Err(DataSourceError::server(500, "db down")));
        assert_eq!(grid.phase(), &GridPhase::Error("db down".to_string()));
    }

    #[test]
    fn test_out_of_range_page_is_refetched() {
        let mut grid = ready_grid(&[1], 5);
        let ticket = grid.go_last().unwrap();
        assert_eq!(ticket.query.page, 5);
        match grid.apply_fetch(ticket.seq, Ok(page(&[], 2))) {
            FetchOutcome::Reissued(next) => {
                assert_eq!(next.query.page, 2);
                assert_eq!(grid.pagination().page(), 2);
            }
            other => panic!("expected reissue, got {:?}", other),
        }
        assert_eq!(grid.phase(), &GridPhase::Loading);
    }

    #[test]
    fn test_duplicate_ids_are_dropped() {
        let grid = ready_grid(&[1, 2, 1], 1);
        assert_eq!(row_ids(&grid), vec![1, 2]);
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut grid = ready_grid(&[1], 3);
        let ticket = grid.go_next().unwrap();
        grid.apply_fetch(ticket.seq, Ok(page(&[11], 3)));
        assert_eq!(grid.pagination().page(), 2);

        let ticket = grid.set_filter("status", Some("DONE".to_string())).unwrap().unwrap();
        assert_eq!(ticket.query.page, 1);
        assert_eq!(ticket.query.criteria.get("status"), Some("DONE"));
    }

    #[test]
    fn test_unchanged_filter_issues_nothing() {
        let mut grid = ready_grid(&[1], 1);
        assert!(grid.set_filter("category", Some("news".to_string())).unwrap().is_some());
        assert!(grid.set_filter("category", Some(" news ".to_string())).unwrap().is_none());
        assert!(grid.set_filter("execution_id", Some("".to_string())).unwrap().is_none());
    }

    #[test]
    fn test_filter_validation() {
        let mut grid = ready_grid(&[1], 1);
        assert!(matches!(
            grid.set_filter("nope", Some("x".to_string())),
            Err(GridError::UnknownFilter { .. })
        ));
        assert!(matches!(
            grid.set_filter("execution_id", Some("abc".to_string())),
            Err(GridError::InvalidFilter { .. })
        ));
        assert!(grid.criteria().is_empty());
    }

    #[test]
    fn test_clear_filters() {
        let mut grid = ready_grid(&[1], 1);
        assert!(grid.clear_filters().is_none());
        grid.set_filter("category", Some("news".to_string())).unwrap();
        let ticket = grid.clear_filters().unwrap();
        assert!(ticket.query.criteria.is_empty());
    }

    #[test]
    fn test_page_size_change_resets_page() {
        let mut grid = ready_grid(&[1], 4);
        grid.go_last();
        let ticket = grid.set_limit(50).unwrap();
        assert_eq!(ticket.query.page, 1);
        assert_eq!(ticket.query.limit, 50);
        assert!(grid.set_limit(50).is_none());
    }

    #[test]
    fn test_navigation_at_bounds_is_noop() {
        let mut grid = ready_grid(&[1], 1);
        let seq = grid.latest_seq();
        assert!(grid.go_prev().is_none());
        assert!(grid.go_next().is_none());
        assert!(grid.go_first().is_none());
        assert!(grid.go_last().is_none());
        assert_eq!(grid.latest_seq(), seq);
    }

    #[test]
    fn test_toggle_expand_independent_of_edit() {
        let mut grid = ready_grid(&[1, 2], 1);
        assert!(grid.toggle_expand(1));
        grid.start_edit(2).unwrap();
        assert!(grid.is_expanded(1));
        assert!(!grid.toggle_expand(1));
        assert!(!grid.is_expanded(1));
    }

    #[test]
    fn test_edit_flow() {
        let mut grid = ready_grid(&[7], 1);
        grid.start_edit(7).unwrap();
        assert_eq!(grid.start_edit(7), Err(GridError::EditInProgress { editing: 7 }));
        grid.update_field_text("title", "Updated").unwrap();
        let (id, payload) = grid.begin_save().unwrap();
        assert_eq!(id, 7);
        assert_eq!(payload["title"], json!("Updated"));
        assert!(grid.is_in_flight(7));

        let mut saved = review(7, "PENDING");
        saved.title = "Updated by server".to_string();
        assert!(grid.finish_save(7, Ok(saved.clone())).is_ok());
        assert_eq!(grid.row(7), Some(&saved));
        assert_eq!(grid.edit().state(), &EditState::Viewing);
        assert!(!grid.is_in_flight(7));
    }

    #[test]
    fn test_save_failure_keeps_input() {
        let mut grid = ready_grid(&[7], 1);
        grid.start_edit(7).unwrap();
        grid.update_field("title", json!("Mine")).unwrap();
        grid.begin_save().unwrap();
        let message = grid
            .finish_save(7, Err(DataSourceError::validation("title taken")))
            .unwrap_err();
        assert_eq!(message, "title taken");
        let buffer = grid.edit().buffer().unwrap();
        assert!(matches!(grid.edit().state(), EditState::Editing(_)));
        assert_eq!(buffer.value("title"), Some(&json!("Mine")));
        assert_eq!(grid.row(7).unwrap().title, "Review 7");
    }

    #[test]
    fn test_start_edit_missing_row() {
        let mut grid = ready_grid(&[1], 1);
        assert_eq!(grid.start_edit(9), Err(GridError::RowNotFound { id: 9 }));
    }

    #[test]
    fn test_mark_done_patch_and_noop() {
        let mut grid = ready_grid(&[1], 1);
        let patch = grid.begin_mark_done(1).unwrap().unwrap();
        assert_eq!(patch.len(), 1);
        assert_eq!(patch["status"], json!("DONE"));
        assert_eq!(grid.begin_mark_done(1), Err(GridError::RowBusy { id: 1 }));
        grid.finish_mark_done(1, Ok(review(1, "DONE"))).unwrap();
        assert_eq!(grid.row(1).unwrap().status, "DONE");
        assert_eq!(grid.begin_mark_done(1), Ok(None));
        assert!(!grid.is_in_flight(1));
    }

    #[test]
    fn test_mark_done_rejected_while_editing() {
        let mut grid = ready_grid(&[1], 1);
        grid.start_edit(1).unwrap();
        assert_eq!(grid.begin_mark_done(1), Err(GridError::EditInProgress { editing: 1 }));
        assert_eq!(grid.begin_delete(1), Err(GridError::EditInProgress { editing: 1 }));
    }

    #[test]
    fn test_mark_done_unsupported_for_steps() {
        let mut grid: GridController<Step> = GridController::new(10);
        assert!(matches!(
            grid.begin_mark_done(1),
            Err(GridError::Unsupported { action: "mark done", .. })
        ));
    }

    #[test]
    fn test_delete_removes_one_row_and_keeps_total() {
        let mut grid = ready_grid(&[1, 2, 3], 4);
        grid.toggle_expand(2);
        grid.begin_delete(2).unwrap();
        assert_eq!(grid.start_edit(2), Err(GridError::RowBusy { id: 2 }));
        grid.finish_delete(2, Ok(())).unwrap();
        assert_eq!(row_ids(&grid), vec![1, 3]);
        assert!(!grid.is_expanded(2));
        assert_eq!(grid.pagination().total_pages(), 4);
    }

    #[test]
    fn test_delete_failure_keeps_row() {
        let mut grid = ready_grid(&[1, 2], 1);
        grid.begin_delete(1).unwrap();
        let message = grid
            .finish_delete(1, Err(DataSourceError::server(500, "")))
            .unwrap_err();
        assert_eq!(message, "Failed to delete content review");
        assert_eq!(row_ids(&grid), vec![1, 2]);
        assert!(!grid.is_in_flight(1));
    }

    #[test]
    fn test_create_unsupported_for_reviews() {
        let mut grid = ready_grid(&[1], 1);
        assert!(matches!(
            grid.open_create(),
            Err(GridError::Unsupported { action: "create", .. })
        ));
    }

    fn step(id: RecordId, name: &str) -> Step {
        Step {
            id,
            name: name.to_string(),
            prompt: "Do it".to_string(),
            order_index: 0,
            workflow_id: Some(1),
            agent_id: None,
            created_at: None,
        }
    }

    #[test]
    fn test_create_inserts_first() {
        let mut grid: GridController<Step> = GridController::new(10);
        let ticket = grid.issue_fetch();
        grid.apply_fetch(
            ticket.seq,
            Ok(Page {
                records: vec![step(1, "One")],
                total_pages: 1,
            }),
        );
        assert_eq!(grid.begin_create(), Err(GridError::NoCreateForm));
        grid.open_create().unwrap();
        assert!(matches!(grid.begin_create(), Err(GridError::Validation(_))));
        assert!(grid.create_form().unwrap().error().is_some());

        grid.update_create_field_text("name", "Two").unwrap();
        grid.update_create_field_text("order_index", "2").unwrap();
        let payload = grid.begin_create().unwrap();
        assert_eq!(payload["order_index"], json!(2));
        assert_eq!(grid.close_create(), Err(GridError::CreateInFlight));

        assert_eq!(grid.finish_create(Ok(step(2, "Two"))), Ok(2));
        assert!(grid.create_form().is_none());
        let ids: Vec<RecordId> = grid.rows().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn test_create_failure_keeps_form() {
        let mut grid: GridController<Step> = GridController::new(10);
        grid.open_create().unwrap();
        grid.update_create_field_text("name", "Draft").unwrap();
        grid.update_create_field_text("order_index", "0").unwrap();
        grid.begin_create().unwrap();
        let message = grid
            .finish_create(Err(DataSourceError::validation("workflow required")))
            .unwrap_err();
        assert_eq!(message, "workflow required");
        let form = grid.create_form().unwrap();
        assert!(!form.is_submitting());
        assert_eq!(form.value("name"), Some(&json!("Draft")));
        assert_eq!(form.error(), Some("workflow required"));
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::entities::ContentReview;
    use proptest::prelude::*;

    fn review(id: RecordId) -> ContentReview {
        ContentReview {
            id,
            execution_id: None,
            title: format!("Review {}", id),
            short_description: String::new(),
            message: String::new(),
            status: String::new(),
            review_type: String::new(),
            category: String::new(),
            created: None,
        }
    }

    fn nav_strategy() -> impl Strategy<Value = PageNav> {
        prop_oneof![
            Just(PageNav::First),
            Just(PageNav::Prev),
            Just(PageNav::Next),
            Just(PageNav::Last),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: page stays within [1, total_pages] across any navigation
        #[test]
        fn prop_navigation_stays_in_range(
            total in 1u32..20,
            navs in prop::collection::vec(nav_strategy(), 0..30),
        ) {
            let mut grid: GridController<ContentReview> = GridController::new(10);
            let ticket = grid.issue_fetch();
            grid.apply_fetch(ticket.seq, Ok(Page { records: vec![review(1)], total_pages: total }));
            for nav in navs {
                let before = grid.pagination().page();
                let issued = grid.navigate(nav);
                let after = grid.pagination().page();
                prop_assert!(after >= 1 && after <= total);
                prop_assert_eq!(issued.is_some(), before != after);
            }
        }

        /// Property: any filter change lands on page 1
        #[test]
        fn prop_filter_change_resets_page(
            start_page in 1u32..10,
            category in "[a-z]{1,8}",
        ) {
            let mut grid: GridController<ContentReview> = GridController::new(10);
            let ticket = grid.issue_fetch();
            grid.apply_fetch(ticket.seq, Ok(Page { records: vec![], total_pages: 10 }));
            grid.pagination.set_page(start_page);
            let ticket = grid.set_filter("category", Some(category)).unwrap();
            prop_assert_eq!(ticket.map(|t| t.query.page), Some(1));
            prop_assert_eq!(grid.pagination().page(), 1);
        }

        /// Property: only the last issued ticket is ever applied
        #[test]
        fn prop_only_latest_applies(issued in 1usize..8, pick in 0usize..8) {
            let mut grid: GridController<ContentReview> = GridController::new(10);
            let tickets: Vec<FetchTicket> = (0..issued).map(|_| grid.issue_fetch()).collect();
            let pick = pick % issued;
            let outcome = grid.apply_fetch(
                tickets[pick].seq,
                Ok(Page { records: vec![review(pick as RecordId)], total_pages: 1 }),
            );
            if pick == issued - 1 {
                prop_assert_eq!(outcome, FetchOutcome::Applied);
            } else {
                prop_assert_eq!(outcome, FetchOutcome::Stale);
                prop_assert!(grid.rows().is_empty());
            }
        }
    }
}
