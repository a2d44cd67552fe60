//! Event types for the TUI event loop.

use backoffice_core::{Completion, ContentReview, GridRecord, Lookups, PendingAction, Step};
use crossterm::event::{KeyEvent, MouseEvent};
use futures_util::future::{BoxFuture, FutureExt};

#[derive(Debug, Clone)]
pub enum TuiEvent {
    Input(KeyEvent),
    Mouse(MouseEvent),
    Tick,
    Resize { width: u16, height: u16 },
    Steps(Completion<Step>),
    Reviews(Completion<ContentReview>),
    Lookups(Result<Lookups, String>),
}

/// Remote work requested by the app. The event loop spawns it and feeds the
/// resulting event back in.
pub type Effect = BoxFuture<'static, TuiEvent>;

/// Record types whose completions have a home in [`TuiEvent`].
pub trait RoutedRecord: GridRecord {
    fn route(completion: Completion<Self>) -> TuiEvent;
}

impl RoutedRecord for Step {
    fn route(completion: Completion<Self>) -> TuiEvent {
        TuiEvent::Steps(completion)
    }
}

impl RoutedRecord for ContentReview {
    fn route(completion: Completion<Self>) -> TuiEvent {
        TuiEvent::Reviews(completion)
    }
}

pub fn effect<R: RoutedRecord>(pending: PendingAction<R>) -> Effect {
    pending.map(R::route).boxed()
}
