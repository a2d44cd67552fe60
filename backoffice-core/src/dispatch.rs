//! Action dispatch and completion reconciliation.
//!
//! Every entry point updates the grid synchronously and hands back a
//! [`PendingAction`] describing the remote call. The host runs it wherever it
//! likes (a spawned task, or simply `.await` in tests) and passes the
//! resulting [`Completion`] to [`ActionDispatcher::reconcile`]. Completions
//! may arrive in any order; stale fetches are dropped by sequence number.

use crate::data_source::{Page, RemoteDataSource};
use crate::error::{DataSourceError, GridResult};
use crate::grid::{FetchOutcome, FetchTicket, GridController};
use crate::pagination::PageNav;
use crate::record::{GridRecord, RecordId};
use futures_util::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

/// A remote call waiting to be run. Resolves to the completion to reconcile.
pub type PendingAction<R> = BoxFuture<'static, Completion<R>>;

/// Result of a remote call, tagged with what it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion<R> {
    Fetched {
        seq: u64,
        result: Result<Page<R>, DataSourceError>,
    },
    Saved {
        id: RecordId,
        result: Result<R, DataSourceError>,
    },
    MarkedDone {
        id: RecordId,
        result: Result<R, DataSourceError>,
    },
    Deleted {
        id: RecordId,
        result: Result<(), DataSourceError>,
    },
    Created {
        result: Result<R, DataSourceError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// One-line outcome message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// What reconciling a completion produced.
pub struct Reconciliation<R> {
    pub notice: Option<Notice>,
    /// A fetch the grid issued while reconciling (page clamped past the end).
    pub follow_up: Option<PendingAction<R>>,
}

impl<R> Reconciliation<R> {
    fn quiet() -> Self {
        Self {
            notice: None,
            follow_up: None,
        }
    }

    fn notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            follow_up: None,
        }
    }
}

impl<R> fmt::Debug for Reconciliation<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciliation")
            .field("notice", &self.notice)
            .field("follow_up", &self.follow_up.is_some())
            .finish()
    }
}

/// A delete the user has been asked about but not yet confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteRequest {
    id: RecordId,
}

impl DeleteRequest {
    pub fn new(id: RecordId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn confirm(self) -> ConfirmedDelete {
        ConfirmedDelete { id: self.id }
    }
}

/// Proof the user confirmed a delete. Only obtainable from
/// [`DeleteRequest::confirm`].
#[derive(Debug, PartialEq, Eq)]
pub struct ConfirmedDelete {
    id: RecordId,
}

impl ConfirmedDelete {
    pub fn id(&self) -> RecordId {
        self.id
    }
}

/// Routes grid actions to a [`RemoteDataSource`].
pub struct ActionDispatcher<S: RemoteDataSource> {
    source: Arc<S>,
}

impl<S: RemoteDataSource> Clone for ActionDispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: RemoteDataSource> fmt::Debug for ActionDispatcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDispatcher")
            .field("entity", &S::Record::descriptor().entity)
            .finish()
    }
}

type Grid<S> = GridController<<S as RemoteDataSource>::Record>;
type Pending<S> = PendingAction<<S as RemoteDataSource>::Record>;

impl<S: RemoteDataSource> ActionDispatcher<S> {
    pub fn new(source: S) -> Self {
        Self::from_arc(Arc::new(source))
    }

    pub fn from_arc(source: Arc<S>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    fn fetch(&self, ticket: FetchTicket) -> Pending<S> {
        let source = Arc::clone(&self.source);
        Box::pin(async move {
            let result = source.fetch_page(&ticket.query).await;
            Completion::Fetched {
                seq: ticket.seq,
                result,
            }
        })
    }

    pub fn refresh(&self, grid: &mut Grid<S>) -> Pending<S> {
        self.fetch(grid.refresh())
    }

    pub fn retry(&self, grid: &mut Grid<S>) -> Pending<S> {
        self.fetch(grid.retry())
    }

    pub fn set_filter(
        &self,
        grid: &mut Grid<S>,
        name: &str,
        value: Option<String>,
    ) -> GridResult<Option<Pending<S>>> {
        Ok(grid.set_filter(name, value)?.map(|ticket| self.fetch(ticket)))
    }

    pub fn clear_filters(&self, grid: &mut Grid<S>) -> Option<Pending<S>> {
        grid.clear_filters().map(|ticket| self.fetch(ticket))
    }

    pub fn set_limit(&self, grid: &mut Grid<S>, limit: u32) -> Option<Pending<S>> {
        grid.set_limit(limit).map(|ticket| self.fetch(ticket))
    }

    pub fn navigate(&self, grid: &mut Grid<S>, nav: PageNav) -> Option<Pending<S>> {
        grid.navigate(nav).map(|ticket| self.fetch(ticket))
    }

    /// Purely local; never touches the data source.
    pub fn toggle_expand(&self, grid: &mut Grid<S>, id: RecordId) -> bool {
        grid.toggle_expand(id)
    }

    /// Send the edit buffer. The whole editable-field buffer is the payload.
    pub fn save(&self, grid: &mut Grid<S>) -> GridResult<Pending<S>> {
        let (id, payload) = grid.begin_save()?;
        tracing::info!(entity = S::Record::descriptor().entity, id, "saving record");
        let source = Arc::clone(&self.source);
        Ok(Box::pin(async move {
            let result = source.update_record(id, &payload).await;
            Completion::Saved { id, result }
        }))
    }

    /// `None` when the row is already done; nothing is sent.
    pub fn mark_done(&self, grid: &mut Grid<S>, id: RecordId) -> GridResult<Option<Pending<S>>> {
        let Some(patch) = grid.begin_mark_done(id)? else {
            tracing::debug!(id, "record already done, skipping");
            return Ok(None);
        };
        let source = Arc::clone(&self.source);
        Ok(Some(Box::pin(async move {
            let result = source.update_record(id, &patch).await;
            Completion::MarkedDone { id, result }
        })))
    }

    pub fn delete(&self, grid: &mut Grid<S>, confirmed: ConfirmedDelete) -> GridResult<Pending<S>> {
        let id = confirmed.id();
        grid.begin_delete(id)?;
        tracing::info!(entity = S::Record::descriptor().entity, id, "deleting record");
        let source = Arc::clone(&self.source);
        Ok(Box::pin(async move {
            let result = source.delete_record(id).await;
            Completion::Deleted { id, result }
        }))
    }

    /// Submit the open create form.
    pub fn create(&self, grid: &mut Grid<S>) -> GridResult<Pending<S>> {
        let payload = grid.begin_create()?;
        tracing::info!(entity = S::Record::descriptor().entity, "creating record");
        let source = Arc::clone(&self.source);
        Ok(Box::pin(async move {
            let result = source.create_record(&payload).await;
            Completion::Created { result }
        }))
    }

    /// Fold a completion back into the grid.
    pub fn reconcile(
        &self,
        grid: &mut Grid<S>,
        completion: Completion<S::Record>,
    ) -> Reconciliation<S::Record> {
        let entity = S::Record::descriptor().entity;
        match completion {
            Completion::Fetched { seq, result } => match grid.apply_fetch(seq, result) {
                FetchOutcome::Applied | FetchOutcome::Stale | FetchOutcome::Failed => {
                    Reconciliation::quiet()
                }
                FetchOutcome::Reissued(ticket) => Reconciliation {
                    notice: None,
                    follow_up: Some(self.fetch(ticket)),
                },
            },
            Completion::Saved { id, result } => match grid.finish_save(id, result) {
                Ok(()) => Reconciliation::notice(Notice::success(format!("Saved {} {}", entity, id))),
                Err(message) => Reconciliation::notice(Notice::error(message)),
            },
            Completion::MarkedDone { id, result } => match grid.finish_mark_done(id, result) {
                Ok(()) => Reconciliation::notice(Notice::success(format!(
                    "Marked {} {} as done",
                    entity, id
                ))),
                Err(message) => Reconciliation::notice(Notice::error(message)),
            },
            Completion::Deleted { id, result } => match grid.finish_delete(id, result) {
                Ok(()) => Reconciliation::notice(Notice::success(format!("Deleted {} {}", entity, id))),
                Err(message) => Reconciliation::notice(Notice::error(message)),
            },
            Completion::Created { result } => match grid.finish_create(result) {
                Ok(id) => Reconciliation::notice(Notice::success(format!("Created {} {}", entity, id))),
                Err(message) => Reconciliation::notice(Notice::error(message)),
            },
        }
    }
}
