//! View rendering dispatch.

pub mod editor;
pub mod grid;
pub mod modal;
pub mod rows;

pub use rows::RowPresenter;

use crate::nav::View;
use crate::notifications::NotificationLevel;
use crate::state::{App, FilterPrompt, ReviewStore, StepStore};
use crate::theme::{notification_color, LedgerTheme};
use crate::widgets::StatusIndicator;
use backoffice_core::Lookups;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};

/// Cells between table columns.
pub const COLUMN_SPACING: u16 = 1;
pub const HIGHLIGHT_SYMBOL: &str = "▶ ";
const HIGHLIGHT_WIDTH: u16 = 2;

/// Everything a grid view reads besides its own pane.
pub struct RenderContext<'a> {
    pub theme: &'a LedgerTheme,
    pub lookups: &'a Lookups,
    pub filter_prompt: Option<&'a FilterPrompt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenAreas {
    pub header: Rect,
    pub filters: Rect,
    pub table: Rect,
    pub editor: Option<Rect>,
    pub pager: Rect,
    pub footer: Rect,
}

/// Split the screen. `form_height` is zero when no editor is open.
pub fn screen_areas(area: Rect, form_height: u16) -> ScreenAreas {
    let mut constraints = vec![
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
    ];
    if form_height > 0 {
        constraints.push(Constraint::Length(form_height));
    }
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Length(3));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let (editor, tail) = if form_height > 0 {
        (Some(chunks[3]), 4)
    } else {
        (None, 3)
    };
    ScreenAreas {
        header: chunks[0],
        filters: chunks[1],
        table: chunks[2],
        editor,
        pager: chunks[tail],
        footer: chunks[tail + 1],
    }
}

/// The table's header row, starting at the first data column.
pub fn header_row(table: Rect) -> Rect {
    Rect {
        x: table.x.saturating_add(1 + HIGHLIGHT_WIDTH),
        y: table.y.saturating_add(1),
        width: table.width.saturating_sub(2 + HIGHLIGHT_WIDTH),
        height: 1,
    }
}

pub fn render_view<SS: StepStore, RS: ReviewStore>(f: &mut Frame<'_>, app: &App<SS, RS>) {
    let view = app.active_view;
    let form_height = match view {
        View::Steps => app.steps.form_height(),
        View::ContentReviews => app.reviews.form_height(),
    };
    let areas = screen_areas(f.size(), form_height);
    let ctx = RenderContext {
        theme: &app.theme,
        lookups: &app.lookups,
        filter_prompt: app.filter_prompt.as_ref(),
    };

    render_header(f, app, areas.header);

    match view {
        View::Steps => grid::render(f, &ctx, &app.steps, view, &areas),
        View::ContentReviews => grid::render(f, &ctx, &app.reviews, view, &areas),
    }

    render_footer(f, app, areas.footer);

    if let Some(modal) = &app.modal {
        modal::render(f, app, modal);
    }
}

fn render_header<SS: StepStore, RS: ReviewStore>(f: &mut Frame<'_>, app: &App<SS, RS>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(14)])
        .split(area);

    let titles: Vec<&str> = View::all().iter().map(View::title).collect();
    let tabs = Tabs::new(titles)
        .select(app.active_view.index())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    format!("BACKOFFICE | {}", app.config.api_base_url),
                    Style::default().fg(app.theme.primary),
                )),
        )
        .style(Style::default().fg(app.theme.text_dim))
        .highlight_style(
            Style::default()
                .fg(app.theme.primary)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(tabs, chunks[0]);

    let phase = match app.active_view {
        View::Steps => app.steps.grid.phase(),
        View::ContentReviews => app.reviews.grid.phase(),
    };
    StatusIndicator::for_phase(phase, &app.theme).render(f, chunks[1]);
}

fn render_footer<SS: StepStore, RS: ReviewStore>(f: &mut Frame<'_>, app: &App<SS, RS>, area: Rect) {
    let in_form = match app.active_view {
        View::Steps => app.steps.form_target().is_some(),
        View::ContentReviews => app.reviews.form_target().is_some(),
    };
    let help = if let Some(column) = app.capture.captured() {
        format!("resizing {} • release to keep • Esc restore", column)
    } else if app.filter_prompt.is_some() {
        "type value • Tab next filter • Enter apply (empty clears) • Esc close".to_string()
    } else if in_form {
        "↑/↓ field • → cycle choice • ← clear choice • Enter save • Alt+Enter newline • Esc cancel"
            .to_string()
    } else {
        "j/k move • Space expand • e edit • n new • d delete • m done • / filter • [ ] page • ? help • q quit"
            .to_string()
    };
    let (text, style) = if let Some(note) = app.current_notification() {
        let label = match note.level {
            NotificationLevel::Info => "INFO",
            NotificationLevel::Warning => "WARN",
            NotificationLevel::Error => "ERROR",
            NotificationLevel::Success => "SUCCESS",
        };
        (
            format!("{}: {}", label, note.message),
            Style::default().fg(notification_color(note.level, &app.theme)),
        )
    } else {
        (help, Style::default().fg(app.theme.text_dim))
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(footer, area);
}
