//! BACKOFFICE Core - Editable Data Grid
//!
//! State machines behind every grid in the dashboard. Nothing in this crate
//! performs I/O: remote calls go through [`RemoteDataSource`] and come back
//! as [`Completion`]s that the host feeds into [`ActionDispatcher::reconcile`].

pub mod data_source;
pub mod dispatch;
pub mod edit;
pub mod entities;
pub mod error;
pub mod filter;
pub mod grid;
pub mod layout;
pub mod pagination;
pub mod record;

pub use data_source::{paginate_locally, Page, PageQuery, RemoteDataSource};
pub use dispatch::{
    ActionDispatcher, Completion, ConfirmedDelete, DeleteRequest, Notice, NoticeLevel,
    PendingAction, Reconciliation,
};
pub use edit::{EditBuffer, EditSession, EditState};
pub use entities::{
    format_timestamp, status_tone, Agent, ContentReview, Lookups, ReviewStatus, Step, StatusTone,
    Workflow, PLACEHOLDER,
};
pub use error::{DataSourceError, GridError, GridResult, ValidationError};
pub use filter::FilterCriteria;
pub use grid::{CreateForm, FetchOutcome, FetchTicket, GridController, GridPhase};
pub use layout::{resized_width, CaptureLease, ColumnLayout, NoCapture, PointerCapture};
pub use pagination::{next_page_size, PageNav, Pagination, PAGE_SIZES};
pub use record::{
    ColumnSpec, FieldKind, FieldMap, FieldSpec, FilterKind, FilterSpec, ForeignKind, GridRecord,
    RecordDescriptor, RecordId, Validator,
};

use chrono::{DateTime, Utc};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;
