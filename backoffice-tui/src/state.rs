//! Application state and view state definitions.
//!
//! [`App`] owns one [`GridPane`] per view. Input is applied synchronously;
//! remote work comes back out as [`Effect`]s for the event loop to spawn, and
//! their results re-enter through [`App::handle_event`].

use crate::config::TuiConfig;
use crate::events::{effect, Effect, RoutedRecord, TuiEvent};
use crate::keys::{map_key, Action};
use crate::nav::View;
use crate::notifications::{Notification, NotificationLevel};
use crate::persistence::PersistedState;
use crate::sources::{ContentReviewSource, StepsSource};
use crate::theme::LedgerTheme;
use crate::views;
use backoffice_core::{
    next_page_size, ActionDispatcher, Completion, ContentReview, DeleteRequest, EditState,
    FieldKind, FieldSpec, FilterSpec, GridController, GridError, GridPhase, GridRecord,
    GridResult, Lookups, PageNav, PendingAction, PointerCapture, RecordId, RemoteDataSource,
    ReviewStatus, Step,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use serde_json::Value;
use std::sync::{Arc, Mutex};

const MAX_NOTIFICATIONS: usize = 50;

/// Data source serving the step grid.
pub trait StepStore: RemoteDataSource<Record = Step> {}
impl<T: RemoteDataSource<Record = Step>> StepStore for T {}

/// Data source serving the content review grid.
pub trait ReviewStore: RemoteDataSource<Record = ContentReview> {}
impl<T: RemoteDataSource<Record = ContentReview>> ReviewStore for T {}

/// Pointer capture for the terminal.
///
/// Mouse reporting is enabled for the whole screen, so capturing means
/// routing: while a column is captured every drag and release goes to the
/// grid that started the gesture, wherever the pointer is.
#[derive(Debug, Default)]
pub struct TerminalCapture {
    column: Mutex<Option<String>>,
}

impl TerminalCapture {
    pub fn captured(&self) -> Option<String> {
        self.column.lock().ok().and_then(|column| column.clone())
    }
}

impl PointerCapture for TerminalCapture {
    fn acquire(&self, column: &str) {
        tracing::trace!(column, "pointer captured");
        if let Ok(mut guard) = self.column.lock() {
            *guard = Some(column.to_string());
        }
    }

    fn release(&self) {
        tracing::trace!("pointer released");
        if let Ok(mut guard) = self.column.lock() {
            *guard = None;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Help,
    ConfirmDelete { view: View, request: DeleteRequest },
}

/// Inline editor for one grid's filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterPrompt {
    pub view: View,
    /// Index into the grid's filter list.
    pub index: usize,
    pub input: String,
}

/// Which form the field editor is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTarget {
    Edit,
    Create,
}

/// What a pane asks the app to do after handling input.
pub enum PaneOutcome {
    Nothing,
    Effect(Effect),
    Notify(Notification),
    Modal(Modal),
    OpenFilter,
}

impl PaneOutcome {
    fn pending<R: RoutedRecord>(pending: Option<PendingAction<R>>) -> Self {
        match pending {
            Some(pending) => PaneOutcome::Effect(effect(pending)),
            None => PaneOutcome::Nothing,
        }
    }
}

/// Result of feeding one event to the app.
#[derive(Default)]
pub struct Update {
    pub effects: Vec<Effect>,
    pub quit: bool,
}

/// Text form of a field value for the editor.
pub fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

// ============================================================================
// GRID PANE
// ============================================================================

/// One grid plus its dispatcher and the cursor state the terminal adds.
pub struct GridPane<S: RemoteDataSource> {
    pub grid: GridController<S::Record>,
    pub dispatcher: ActionDispatcher<S>,
    pub selected: Option<RecordId>,
    pub selected_column: usize,
    /// Index into the editable fields while a form is open.
    pub field_cursor: usize,
}

impl<S> GridPane<S>
where
    S: RemoteDataSource,
    S::Record: RoutedRecord,
{
    pub fn new(source: S, limit: u32, capture: Arc<dyn PointerCapture>) -> Self {
        let mut grid = GridController::new(limit);
        grid.layout_mut().set_capture(capture);
        Self {
            grid,
            dispatcher: ActionDispatcher::new(source),
            selected: None,
            selected_column: 0,
            field_cursor: 0,
        }
    }

    pub fn load(&mut self) -> Effect {
        effect(self.dispatcher.refresh(&mut self.grid))
    }

    pub fn selected_row(&self) -> Option<&S::Record> {
        self.selected.and_then(|id| self.grid.row(id))
    }

    pub fn selected_index(&self) -> Option<usize> {
        let id = self.selected?;
        self.grid.rows().iter().position(|row| row.id() == id)
    }

    pub fn select_next(&mut self) {
        let rows = self.grid.rows();
        if rows.is_empty() {
            self.selected = None;
            return;
        }
        let next = match self.selected_index() {
            Some(index) => (index + 1) % rows.len(),
            None => 0,
        };
        self.selected = Some(rows[next].id());
    }

    pub fn select_previous(&mut self) {
        let rows = self.grid.rows();
        if rows.is_empty() {
            self.selected = None;
            return;
        }
        let prev = match self.selected_index() {
            Some(0) | None => rows.len() - 1,
            Some(index) => index - 1,
        };
        self.selected = Some(rows[prev].id());
    }

    /// Keep the selection on a visible row after the rows changed.
    pub fn sync_selection(&mut self) {
        if self.selected_index().is_none() {
            self.selected = self.grid.rows().first().map(GridRecord::id);
        }
    }

    pub fn selected_column_key(&self) -> Option<&'static str> {
        self.grid
            .layout()
            .columns()
            .get(self.selected_column)
            .map(|c| c.key)
    }

    fn move_column(&mut self, delta: isize) {
        let count = self.grid.layout().columns().len();
        if count == 0 {
            return;
        }
        self.selected_column = self
            .selected_column
            .saturating_add_signed(delta)
            .min(count - 1);
    }

    pub fn form_target(&self) -> Option<FormTarget> {
        if self.grid.create_form().is_some() {
            Some(FormTarget::Create)
        } else if self.grid.edit().buffer().is_some() {
            Some(FormTarget::Edit)
        } else {
            None
        }
    }

    pub fn form_fields(&self) -> Vec<&'static FieldSpec> {
        self.grid.descriptor().editable_fields().collect()
    }

    pub fn current_field(&self) -> Option<&'static FieldSpec> {
        let fields = self.form_fields();
        fields
            .get(self.field_cursor.min(fields.len().saturating_sub(1)))
            .copied()
    }

    pub fn form_value(&self, target: FormTarget, key: &str) -> Option<&Value> {
        match target {
            FormTarget::Edit => self.grid.edit().buffer().and_then(|b| b.value(key)),
            FormTarget::Create => self.grid.create_form().and_then(|f| f.value(key)),
        }
    }

    pub fn form_error(&self, target: FormTarget) -> Option<&str> {
        match target {
            FormTarget::Edit => self.grid.edit().buffer().and_then(|b| b.error()),
            FormTarget::Create => self.grid.create_form().and_then(|f| f.error()),
        }
    }

    /// Rows the field editor needs, zero when no form is open.
    pub fn form_height(&self) -> u16 {
        match self.form_target() {
            Some(_) => u16::try_from(self.form_fields().len()).unwrap_or(u16::MAX).saturating_add(3),
            None => 0,
        }
    }

    fn set_form_value(&mut self, target: FormTarget, key: &str, value: Value) -> GridResult<()> {
        match target {
            FormTarget::Edit => self.grid.update_field(key, value),
            FormTarget::Create => self.grid.update_create_field(key, value),
        }
    }

    fn set_form_text(&mut self, target: FormTarget, key: &str, input: &str) -> GridResult<()> {
        match target {
            FormTarget::Edit => self.grid.update_field_text(key, input),
            FormTarget::Create => self.grid.update_create_field_text(key, input),
        }
    }

    /// Browse-mode actions. App-level actions never reach here.
    pub fn handle_action(&mut self, action: Action, view: View) -> GridResult<PaneOutcome> {
        let entity = self.grid.descriptor().entity;
        let outcome = match action {
            Action::MoveUp => {
                self.select_previous();
                PaneOutcome::Nothing
            }
            Action::MoveDown => {
                self.select_next();
                PaneOutcome::Nothing
            }
            Action::MoveLeft => {
                self.move_column(-1);
                PaneOutcome::Nothing
            }
            Action::MoveRight => {
                self.move_column(1);
                PaneOutcome::Nothing
            }
            Action::ToggleExpand | Action::Confirm => {
                if let Some(id) = self.selected {
                    self.dispatcher.toggle_expand(&mut self.grid, id);
                }
                PaneOutcome::Nothing
            }
            Action::EditItem => {
                let Some(id) = self.selected else {
                    return Ok(PaneOutcome::Nothing);
                };
                self.grid.start_edit(id)?;
                self.field_cursor = 0;
                PaneOutcome::Nothing
            }
            Action::NewItem => {
                self.grid.open_create()?;
                self.field_cursor = 0;
                PaneOutcome::Nothing
            }
            Action::MarkDone => {
                let Some(id) = self.selected else {
                    return Ok(PaneOutcome::Nothing);
                };
                match self.dispatcher.mark_done(&mut self.grid, id)? {
                    Some(pending) => PaneOutcome::Effect(effect(pending)),
                    None => PaneOutcome::Notify(Notification::new(
                        NotificationLevel::Info,
                        format!("{} {} is already done", capitalize(entity), id),
                    )),
                }
            }
            Action::DeleteItem => match self.selected {
                Some(id) if self.grid.row(id).is_some() => PaneOutcome::Modal(Modal::ConfirmDelete {
                    view,
                    request: DeleteRequest::new(id),
                }),
                _ => PaneOutcome::Nothing,
            },
            Action::OpenFilter => {
                if self.grid.descriptor().filters.is_empty() {
                    PaneOutcome::Nothing
                } else {
                    PaneOutcome::OpenFilter
                }
            }
            Action::CycleStatus => {
                if self.grid.descriptor().filter("status").is_none() {
                    return Err(GridError::UnknownFilter {
                        name: "status".to_string(),
                    });
                }
                let next = ReviewStatus::cycle(self.grid.criteria().get("status"));
                PaneOutcome::pending(self.dispatcher.set_filter(
                    &mut self.grid,
                    "status",
                    next.map(str::to_string),
                )?)
            }
            Action::ClearFilters => PaneOutcome::pending(self.dispatcher.clear_filters(&mut self.grid)),
            Action::FirstPage => self.navigate(PageNav::First),
            Action::PrevPage => self.navigate(PageNav::Prev),
            Action::NextPage => self.navigate(PageNav::Next),
            Action::LastPage => self.navigate(PageNav::Last),
            Action::NarrowColumn | Action::WidenColumn => {
                let delta = if action == Action::NarrowColumn { -1 } else { 1 };
                if let Some(key) = self.selected_column_key() {
                    self.grid.layout_mut().nudge(key, delta)?;
                }
                PaneOutcome::Nothing
            }
            Action::Refresh => {
                let pending = if matches!(self.grid.phase(), GridPhase::Error(_)) {
                    self.dispatcher.retry(&mut self.grid)
                } else {
                    self.dispatcher.refresh(&mut self.grid)
                };
                PaneOutcome::Effect(effect(pending))
            }
            Action::Quit
            | Action::Cancel
            | Action::CyclePageSize
            | Action::NextView
            | Action::PrevView
            | Action::SwitchView(_)
            | Action::OpenHelp => PaneOutcome::Nothing,
        };
        Ok(outcome)
    }

    fn navigate(&mut self, nav: PageNav) -> PaneOutcome {
        PaneOutcome::pending(self.dispatcher.navigate(&mut self.grid, nav))
    }

    pub fn set_page_size(&mut self, limit: u32) -> Option<Effect> {
        self.dispatcher.set_limit(&mut self.grid, limit).map(effect)
    }

    /// Keys while the edit buffer or create form is open.
    pub fn handle_form_key(&mut self, key: KeyEvent, lookups: &Lookups) -> GridResult<PaneOutcome> {
        let Some(target) = self.form_target() else {
            return Ok(PaneOutcome::Nothing);
        };
        let field_count = self.form_fields().len().max(1);
        match key.code {
            KeyCode::Esc => {
                match target {
                    FormTarget::Edit => self.grid.cancel_edit()?,
                    FormTarget::Create => self.grid.close_create()?,
                }
                return Ok(PaneOutcome::Nothing);
            }
            KeyCode::Enter if !key.modifiers.contains(KeyModifiers::ALT) => {
                let pending = match target {
                    FormTarget::Edit => self.dispatcher.save(&mut self.grid)?,
                    FormTarget::Create => self.dispatcher.create(&mut self.grid)?,
                };
                return Ok(PaneOutcome::Effect(effect(pending)));
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.field_cursor = (self.field_cursor + field_count - 1) % field_count;
                return Ok(PaneOutcome::Nothing);
            }
            KeyCode::Down | KeyCode::Tab => {
                self.field_cursor = (self.field_cursor + 1) % field_count;
                return Ok(PaneOutcome::Nothing);
            }
            _ => {}
        }

        let Some(spec) = self.current_field() else {
            return Ok(PaneOutcome::Nothing);
        };
        let current = self.form_value(target, spec.key).cloned();
        match (key.code, spec.kind) {
            (KeyCode::Right, FieldKind::ForeignKey(kind)) => {
                let next = lookups.cycle(kind, current.as_ref().and_then(Value::as_i64));
                self.set_form_value(target, spec.key, next.map(Value::from).unwrap_or(Value::Null))?;
            }
            (KeyCode::Left, FieldKind::ForeignKey(_)) => {
                self.set_form_value(target, spec.key, Value::Null)?;
            }
            (KeyCode::Right, FieldKind::Status) => {
                let next = ReviewStatus::cycle(current.as_ref().and_then(Value::as_str));
                self.set_form_value(target, spec.key, Value::from(next.unwrap_or_default()))?;
            }
            (KeyCode::Enter, FieldKind::MultilineText) => {
                let mut text = value_text(current.as_ref());
                text.push('\n');
                self.set_form_text(target, spec.key, &text)?;
            }
            (KeyCode::Backspace, _) => {
                let mut text = value_text(current.as_ref());
                text.pop();
                self.set_form_text(target, spec.key, &text)?;
            }
            (KeyCode::Char(c), _) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                let mut text = value_text(current.as_ref());
                text.push(c);
                self.set_form_text(target, spec.key, &text)?;
            }
            _ => {}
        }
        Ok(PaneOutcome::Nothing)
    }

    /// Drag-to-resize on the header row. `header` is the row holding the
    /// column titles, starting at the first column.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, header: Rect) -> GridResult<()> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if mouse.row != header.y || mouse.column < header.x {
                    return Ok(());
                }
                let offset = mouse.column - header.x;
                if let Some(key) = self.grid.layout().handle_at(offset, views::COLUMN_SPACING) {
                    self.grid
                        .layout_mut()
                        .begin_resize(key, i32::from(mouse.column))?;
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.grid.layout_mut().pointer_moved(i32::from(mouse.column));
            }
            MouseEventKind::Up(MouseButton::Left) => self.end_resize(),
            _ => {}
        }
        Ok(())
    }

    pub fn end_resize(&mut self) {
        if let Some((column, width)) = self.grid.layout_mut().end_resize() {
            tracing::debug!(column, width, "column resized");
        }
    }

    pub fn filter_specs(&self) -> &'static [FilterSpec] {
        self.grid.descriptor().filters
    }

    pub fn filter_value(&self, name: &str) -> String {
        self.grid.criteria().get(name).unwrap_or_default().to_string()
    }

    pub fn apply_filter(&mut self, name: &str, input: &str) -> GridResult<PaneOutcome> {
        let value = Some(input.trim().to_string());
        Ok(PaneOutcome::pending(
            self.dispatcher.set_filter(&mut self.grid, name, value)?,
        ))
    }

    pub fn confirm_delete(&mut self, request: DeleteRequest) -> GridResult<PaneOutcome> {
        let pending = self.dispatcher.delete(&mut self.grid, request.confirm())?;
        Ok(PaneOutcome::Effect(effect(pending)))
    }

    pub fn reconcile(
        &mut self,
        completion: Completion<S::Record>,
    ) -> (Option<Notification>, Option<Effect>) {
        let reconciliation = self.dispatcher.reconcile(&mut self.grid, completion);
        self.sync_selection();
        (
            reconciliation.notice.map(Notification::from),
            reconciliation.follow_up.map(effect),
        )
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// APP
// ============================================================================

macro_rules! with_pane {
    ($app:expr, $view:expr, $pane:ident => $body:expr) => {
        match $view {
            View::Steps => {
                let $pane = &mut $app.steps;
                $body
            }
            View::ContentReviews => {
                let $pane = &mut $app.reviews;
                $body
            }
        }
    };
}

pub struct App<SS: StepStore = StepsSource, RS: ReviewStore = ContentReviewSource> {
    pub config: TuiConfig,
    pub theme: LedgerTheme,
    pub active_view: View,
    pub steps: GridPane<SS>,
    pub reviews: GridPane<RS>,
    pub lookups: Lookups,
    pub notifications: Vec<Notification>,
    pub modal: Option<Modal>,
    pub filter_prompt: Option<FilterPrompt>,
    pub capture: Arc<TerminalCapture>,
    /// Last known terminal size, for mouse hit-testing.
    pub screen: Rect,
}

impl<SS: StepStore, RS: ReviewStore> App<SS, RS> {
    pub fn new(config: TuiConfig, steps: SS, reviews: RS) -> Self {
        let capture = Arc::new(TerminalCapture::default());
        let limit = config.page_size;
        Self {
            theme: LedgerTheme::ledger(),
            active_view: View::Steps,
            steps: GridPane::new(steps, limit, capture.clone()),
            reviews: GridPane::new(reviews, limit, capture.clone()),
            lookups: Lookups::default(),
            notifications: Vec::new(),
            modal: None,
            filter_prompt: None,
            capture,
            screen: Rect::default(),
            config,
        }
    }

    /// Reopen the view from the last session. The page size travels through
    /// [`TuiConfig::page_size`] since it must be known before the first fetch.
    pub fn restore(&mut self, state: &PersistedState) {
        self.active_view = state.active_view;
    }

    /// Both grids share one page size, see [`App::cycle_page_size`].
    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            active_view: self.active_view,
            page_size: self.steps.grid.pagination().limit(),
        }
    }

    /// Step to the next page size in every grid, refetching each from page 1.
    fn cycle_page_size(&mut self, update: &mut Update) {
        let view = self.active_view;
        let current = with_pane!(self, view, pane => pane.grid.pagination().limit());
        let limit = next_page_size(current);
        update.effects.extend(self.steps.set_page_size(limit));
        update.effects.extend(self.reviews.set_page_size(limit));
    }

    /// Grid whose column resize holds the pointer capture.
    fn resize_owner(&self) -> Option<View> {
        if self.steps.grid.layout().is_resizing() {
            Some(View::Steps)
        } else if self.reviews.grid.layout().is_resizing() {
            Some(View::ContentReviews)
        } else {
            None
        }
    }

    /// First fetch for every grid.
    pub fn start(&mut self) -> Vec<Effect> {
        vec![self.steps.load(), self.reviews.load()]
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.push_notification(Notification::new(level, message));
    }

    fn push_notification(&mut self, notification: Notification) {
        if notification.level == NotificationLevel::Error {
            tracing::warn!(message = %notification.message, "notifying error");
        }
        self.notifications.push(notification);
        if self.notifications.len() > MAX_NOTIFICATIONS {
            let excess = self.notifications.len() - MAX_NOTIFICATIONS;
            self.notifications.drain(..excess);
        }
    }

    /// Most recent notification still within its display time.
    pub fn current_notification(&self) -> Option<&Notification> {
        let now = chrono::Utc::now();
        self.notifications.last().filter(|n| !n.is_expired(now))
    }

    pub fn handle_event(&mut self, event: TuiEvent) -> Update {
        let mut update = Update::default();
        match event {
            TuiEvent::Input(key) => return self.handle_key(key),
            TuiEvent::Mouse(mouse) => self.handle_mouse(mouse),
            TuiEvent::Resize { width, height } => {
                self.screen = Rect::new(0, 0, width, height);
            }
            TuiEvent::Tick => {}
            TuiEvent::Steps(completion) => {
                let (note, follow_up) = self.steps.reconcile(completion);
                self.finish_reconcile(note, follow_up, &mut update);
            }
            TuiEvent::Reviews(completion) => {
                let (note, follow_up) = self.reviews.reconcile(completion);
                self.finish_reconcile(note, follow_up, &mut update);
            }
            TuiEvent::Lookups(Ok(lookups)) => {
                tracing::debug!(
                    agents = lookups.agents.len(),
                    workflows = lookups.workflows.len(),
                    "lookups loaded"
                );
                self.lookups = lookups;
            }
            TuiEvent::Lookups(Err(message)) => {
                self.notify(
                    NotificationLevel::Warning,
                    format!("Failed to load agents and workflows: {}", message),
                );
            }
        }
        update
    }

    fn finish_reconcile(
        &mut self,
        note: Option<Notification>,
        follow_up: Option<Effect>,
        update: &mut Update,
    ) {
        if let Some(note) = note {
            self.push_notification(note);
        }
        update.effects.extend(follow_up);
    }

    fn handle_key(&mut self, key: KeyEvent) -> Update {
        let mut update = Update::default();
        if self.modal.is_some() {
            self.handle_modal_key(key, &mut update);
            return update;
        }
        if self.filter_prompt.is_some() {
            self.handle_filter_key(key, &mut update);
            return update;
        }

        let view = self.active_view;
        let in_form = with_pane!(self, view, pane => pane.form_target().is_some());
        if in_form {
            let result = with_pane!(self, view, pane => pane.handle_form_key(key, &self.lookups));
            self.apply_outcome(result, &mut update);
            return update;
        }

        let Some(action) = map_key(key) else {
            return update;
        };
        match action {
            Action::Quit => update.quit = true,
            Action::NextView => self.active_view = self.active_view.next(),
            Action::PrevView => self.active_view = self.active_view.previous(),
            Action::SwitchView(index) => {
                if let Some(view) = View::from_index(index) {
                    self.active_view = view;
                }
            }
            Action::OpenHelp => self.modal = Some(Modal::Help),
            Action::CyclePageSize => self.cycle_page_size(&mut update),
            Action::Cancel => {
                if let Some(owner) = self.resize_owner() {
                    with_pane!(self, owner, pane => pane.grid.layout_mut().cancel_resize());
                }
            }
            action => {
                let result = with_pane!(self, view, pane => pane.handle_action(action, view));
                self.apply_outcome(result, &mut update);
            }
        }
        update
    }

    fn apply_outcome(&mut self, result: GridResult<PaneOutcome>, update: &mut Update) {
        match result {
            Ok(PaneOutcome::Nothing) => {}
            Ok(PaneOutcome::Effect(effect)) => update.effects.push(effect),
            Ok(PaneOutcome::Notify(note)) => self.push_notification(note),
            Ok(PaneOutcome::Modal(modal)) => self.modal = Some(modal),
            Ok(PaneOutcome::OpenFilter) => {
                let view = self.active_view;
                let input = with_pane!(self, view, pane => {
                    pane.filter_specs().first().map(|spec| pane.filter_value(spec.name))
                });
                self.filter_prompt = input.map(|input| FilterPrompt {
                    view,
                    index: 0,
                    input,
                });
            }
            Err(err) => self.notify(NotificationLevel::Error, err.to_string()),
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent, update: &mut Update) {
        let Some(modal) = self.modal.take() else {
            return;
        };
        match modal {
            Modal::Help => {}
            Modal::ConfirmDelete { view, request } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    let result = with_pane!(self, view, pane => pane.confirm_delete(request));
                    self.apply_outcome(result, update);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {}
                _ => self.modal = Some(Modal::ConfirmDelete { view, request }),
            },
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent, update: &mut Update) {
        let Some(mut prompt) = self.filter_prompt.take() else {
            return;
        };
        let view = prompt.view;
        let specs = with_pane!(self, view, pane => pane.filter_specs());
        if specs.is_empty() {
            return;
        }
        prompt.index = prompt.index.min(specs.len() - 1);
        match key.code {
            KeyCode::Esc => return,
            KeyCode::Enter => {
                let name = specs[prompt.index].name;
                let result = with_pane!(self, view, pane => pane.apply_filter(name, &prompt.input));
                let failed = result.is_err();
                self.apply_outcome(result, update);
                if failed {
                    self.filter_prompt = Some(prompt);
                }
                return;
            }
            KeyCode::Tab | KeyCode::Down => {
                prompt.index = (prompt.index + 1) % specs.len();
                prompt.input = with_pane!(self, view, pane => pane.filter_value(specs[prompt.index].name));
            }
            KeyCode::BackTab | KeyCode::Up => {
                prompt.index = (prompt.index + specs.len() - 1) % specs.len();
                prompt.input = with_pane!(self, view, pane => pane.filter_value(specs[prompt.index].name));
            }
            KeyCode::Backspace => {
                prompt.input.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                prompt.input.push(c);
            }
            _ => {}
        }
        self.filter_prompt = Some(prompt);
    }

    /// Presses go to the visible grid. Drags and releases go to the grid that
    /// owns the capture, even after a view switch.
    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let owner = self.resize_owner();
        let view = match mouse.kind {
            MouseEventKind::Down(_) => {
                // One capture serves both grids; the old gesture gives it up first.
                if let Some(owner) = owner.filter(|owner| *owner != self.active_view) {
                    with_pane!(self, owner, pane => pane.end_resize());
                }
                self.active_view
            }
            _ => match owner {
                Some(owner) => owner,
                None => return,
            },
        };
        let form_height = with_pane!(self, view, pane => pane.form_height());
        let header = views::header_row(views::screen_areas(self.screen, form_height).table);
        let result = with_pane!(self, view, pane => pane.handle_mouse(mouse, header));
        if let Err(err) = result {
            self.notify(NotificationLevel::Error, err.to_string());
        }
    }
}

impl<SS: StepStore, RS: ReviewStore> std::fmt::Debug for App<SS, RS> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("active_view", &self.active_view)
            .field("modal", &self.modal)
            .field("filter_prompt", &self.filter_prompt)
            .field("notifications", &self.notifications.len())
            .finish_non_exhaustive()
    }
}

/// Short label for the editor title bar.
pub fn edit_state_label(state: &EditState) -> Option<&'static str> {
    match state {
        EditState::Viewing => None,
        EditState::Editing(_) => Some("editing"),
        EditState::Saving(_) => Some("saving…"),
    }
}
