//! Help and delete-confirmation overlays.

use crate::nav::View;
use crate::state::{App, Modal, ReviewStore, StepStore};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const HELP: &[(&str, &str)] = &[
    ("Tab / 1-2", "switch view"),
    ("j k / ↑ ↓", "select row"),
    ("h l / ← →", "select column"),
    ("< >", "narrow / widen column (or drag its edge)"),
    ("Space / Enter", "expand row"),
    ("e", "edit row"),
    ("n", "new record"),
    ("d", "delete row"),
    ("m", "mark done"),
    ("/ or f", "edit filters"),
    ("s", "cycle status filter"),
    ("c", "clear filters"),
    ("g [ ] G", "first / previous / next / last page"),
    ("z", "cycle page size"),
    ("r", "refresh or retry"),
    ("q", "quit"),
];

/// Rectangle of `width` x `height` centered in `area`, clamped to fit.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(area.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);
    horizontal[1]
}

/// Prompt for deleting `id`, naming the record when it is on screen.
pub fn delete_prompt<SS: StepStore, RS: ReviewStore>(app: &App<SS, RS>, view: View, id: i64) -> String {
    let (entity, name) = match view {
        View::Steps => ("step", app.steps.grid.row(id).map(|s| s.name.clone())),
        View::ContentReviews => (
            "content review",
            app.reviews.grid.row(id).map(|r| r.title.clone()),
        ),
    };
    match name.filter(|n| !n.trim().is_empty()) {
        Some(name) => format!("Delete {} {} \"{}\"?", entity, id, name),
        None => format!("Delete {} {}?", entity, id),
    }
}

pub fn render<SS: StepStore, RS: ReviewStore>(f: &mut Frame<'_>, app: &App<SS, RS>, modal: &Modal) {
    let theme = &app.theme;
    let (title, text, area) = match modal {
        Modal::Help => {
            let lines: Vec<Line> = HELP
                .iter()
                .map(|(keys, description)| {
                    Line::from(vec![
                        Span::styled(
                            format!("{:>14}  ", keys),
                            Style::default()
                                .fg(theme.primary)
                                .add_modifier(Modifier::BOLD),
                        ),
                        Span::raw(*description),
                    ])
                })
                .collect();
            let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);
            ("Keys (any key closes)", Text::from(lines), centered_rect(64, height, f.size()))
        }
        Modal::ConfirmDelete { view, request } => {
            let text = Text::from(vec![
                Line::styled(
                    delete_prompt(app, *view, request.id()),
                    Style::default().fg(theme.text),
                ),
                Line::styled("This cannot be undone.", Style::default().fg(theme.text_dim)),
                Line::from(""),
                Line::from(vec![
                    Span::styled("[y] delete", Style::default().fg(theme.error)),
                    Span::raw("   "),
                    Span::styled("[n] cancel", Style::default().fg(theme.text_dim)),
                ]),
            ]);
            ("Confirm delete", text, centered_rect(56, 6, f.size()))
        }
    };

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border_focus)),
        )
        .style(Style::default().bg(theme.bg_secondary))
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}
