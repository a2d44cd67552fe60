//! Table view shared by every grid.

use crate::events::RoutedRecord;
use crate::nav::View;
use crate::state::GridPane;
use crate::theme::status_color;
use crate::views::editor::{self, field_text};
use crate::views::{RenderContext, RowPresenter, ScreenAreas, COLUMN_SPACING, HIGHLIGHT_SYMBOL};
use crate::widgets::{FilterBar, FilterOption, Pager};
use backoffice_core::{GridController, GridPhase, GridRecord, RemoteDataSource};
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Text},
    widgets::{Block, Borders, Cell, HighlightSpacing, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

const ACTIONS_WIDTH: u16 = 24;

pub fn render<S>(
    f: &mut Frame<'_>,
    ctx: &RenderContext<'_>,
    pane: &GridPane<S>,
    view: View,
    areas: &ScreenAreas,
) where
    S: RemoteDataSource,
    S::Record: RowPresenter + RoutedRecord,
{
    render_filters(f, ctx, pane, view, areas.filters);
    render_table(f, ctx, pane, view, areas.table);
    if let Some(area) = areas.editor {
        editor::render(f, ctx, pane, area);
    }
    Pager::new(
        pane.grid.pagination(),
        pane.grid.rows().len(),
        Style::default().fg(ctx.theme.text),
        Style::default().fg(ctx.theme.text_muted),
    )
    .render(f, areas.pager);
}

/// Filter chips, with the prompt input in place of the applied value while
/// that filter is being edited.
pub fn filter_options<S>(pane: &GridPane<S>, view: View, ctx: &RenderContext<'_>) -> Vec<FilterOption>
where
    S: RemoteDataSource,
    S::Record: RoutedRecord,
{
    let prompt = ctx.filter_prompt.filter(|p| p.view == view);
    pane.filter_specs()
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            let editing = prompt.is_some_and(|p| p.index == index);
            let value = match prompt {
                Some(p) if editing => (!p.input.is_empty()).then(|| p.input.clone()),
                _ => pane.grid.criteria().get(spec.name).map(str::to_string),
            };
            FilterOption {
                label: spec.label.to_string(),
                value,
                editing,
            }
        })
        .collect()
}

fn render_filters<S>(f: &mut Frame<'_>, ctx: &RenderContext<'_>, pane: &GridPane<S>, view: View, area: Rect)
where
    S: RemoteDataSource,
    S::Record: RoutedRecord,
{
    let options = filter_options(pane, view, ctx);
    let bar = FilterBar {
        title: "Filters [/] [s] [c]",
        filters: &options,
        active_style: Style::default().fg(ctx.theme.primary),
        inactive_style: Style::default().fg(ctx.theme.text_dim),
        editing_style: Style::default()
            .fg(ctx.theme.bg)
            .bg(ctx.theme.primary)
            .add_modifier(Modifier::BOLD),
    };
    bar.render(f, area);
}

/// Row actions offered for `record`.
pub fn actions_text<R: GridRecord>(grid: &GridController<R>, record: &R) -> String {
    let id = record.id();
    if grid.is_in_flight(id) {
        return "…".to_string();
    }
    if grid.edit().is_active(id) {
        return "⏎ save · esc cancel".to_string();
    }
    let mut actions = vec!["e edit", "d delete"];
    if R::descriptor().done_status.is_some() && !record.is_done() {
        actions.push("m done");
    }
    actions.join(" · ")
}

fn render_table<S>(f: &mut Frame<'_>, ctx: &RenderContext<'_>, pane: &GridPane<S>, view: View, area: Rect)
where
    S: RemoteDataSource,
    S::Record: RowPresenter + RoutedRecord,
{
    let theme = ctx.theme;
    let grid = &pane.grid;
    let block = Block::default()
        .title(view.title())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border));

    let placeholder = match grid.phase() {
        GridPhase::Error(message) => Some(Text::from(vec![
            Line::styled(message.clone(), Style::default().fg(theme.error)),
            Line::styled("Press r to retry", Style::default().fg(theme.text_dim)),
        ])),
        GridPhase::Loading if grid.rows().is_empty() => Some(Text::styled(
            "Loading…",
            Style::default().fg(theme.text_dim),
        )),
        GridPhase::Ready if grid.rows().is_empty() => Some(Text::styled(
            format!("No {} records", grid.descriptor().entity),
            Style::default().fg(theme.text_dim),
        )),
        _ => None,
    };
    if let Some(text) = placeholder {
        let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
        return;
    }

    let layout = grid.layout();
    let mut widths: Vec<Constraint> = layout
        .widths()
        .into_iter()
        .map(|(_, width)| Constraint::Length(width))
        .collect();
    widths.push(Constraint::Min(ACTIONS_WIDTH));

    let header_style = Style::default()
        .fg(theme.primary)
        .add_modifier(Modifier::BOLD);
    let mut header_cells: Vec<Cell> = layout
        .columns()
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let mut style = header_style;
            if index == pane.selected_column {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            if layout.resizing_column() == Some(column.key) {
                style = style.fg(theme.warning);
            }
            Cell::from(column.label).style(style)
        })
        .collect();
    header_cells.push(Cell::from("Actions").style(header_style));

    let descriptor = grid.descriptor();
    let buffer = grid.edit().buffer();
    let rows: Vec<Row> = grid
        .rows()
        .iter()
        .map(|record| {
            let id = record.id();
            let editing = buffer.filter(|b| b.record_id() == id);
            let details = if grid.is_expanded(id) {
                record.detail_lines(ctx.lookups)
            } else {
                Vec::new()
            };

            let mut cells: Vec<Cell> = layout
                .columns()
                .iter()
                .map(|column| {
                    let text = match (editing, descriptor.field(column.key)) {
                        (Some(buffer), Some(spec)) if spec.editable => {
                            field_text(spec, buffer.value(column.key), ctx.lookups)
                        }
                        _ => record.display_cell(column.key, ctx.lookups),
                    };
                    let style = if column.key == "status" {
                        Style::default().fg(status_color(&text, theme))
                    } else {
                        Style::default()
                    };
                    if column.key == S::Record::DETAIL_COLUMN && !details.is_empty() {
                        let mut lines = vec![Line::styled(text, style)];
                        lines.extend(details.iter().map(|(label, value)| {
                            Line::styled(
                                format!("{}: {}", label, value),
                                Style::default().fg(theme.text_dim),
                            )
                        }));
                        Cell::from(Text::from(lines))
                    } else {
                        Cell::from(text).style(style)
                    }
                })
                .collect();
            cells.push(
                Cell::from(actions_text(grid, record)).style(Style::default().fg(theme.text_muted)),
            );

            let row_style = if editing.is_some() {
                Style::default().fg(theme.primary)
            } else if grid.is_in_flight(id) {
                Style::default().fg(theme.text_muted)
            } else {
                Style::default().fg(theme.text)
            };
            let height = u16::try_from(details.len() + 1).unwrap_or(u16::MAX);
            Row::new(cells).height(height).style(row_style)
        })
        .collect();

    let mut state = TableState::default();
    state.select(pane.selected_index());

    let table = Table::new(rows, widths)
        .header(Row::new(header_cells))
        .block(block)
        .column_spacing(COLUMN_SPACING)
        .highlight_symbol(HIGHLIGHT_SYMBOL)
        .highlight_spacing(HighlightSpacing::Always)
        .highlight_style(Style::default().bg(theme.bg_highlight));
    f.render_stateful_widget(table, area, &mut state);
}
