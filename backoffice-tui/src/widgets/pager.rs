//! One-line pagination summary.

use backoffice_core::Pagination;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub struct Pager {
    pub page: u32,
    pub total_pages: u32,
    pub limit: u32,
    pub rows: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub style: Style,
    /// Used for the arrows that cannot be followed.
    pub disabled_style: Style,
}

impl Pager {
    pub fn new(pagination: &Pagination, rows: usize, style: Style, disabled_style: Style) -> Self {
        Self {
            page: pagination.page(),
            total_pages: pagination.total_pages(),
            limit: pagination.limit(),
            rows,
            has_prev: pagination.has_prev(),
            has_next: pagination.has_next(),
            style,
            disabled_style,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            " page {} / {} · {} per page · {} rows ",
            self.page, self.total_pages, self.limit, self.rows
        )
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let arrow = |enabled: bool, text: &'static str| {
            let style = if enabled { self.style } else { self.disabled_style };
            Span::styled(text, style)
        };
        let line = Line::from(vec![
            arrow(self.has_prev, "« ‹"),
            Span::styled(self.summary(), self.style),
            arrow(self.has_next, "› »"),
        ]);
        f.render_widget(Paragraph::new(line), area);
    }
}
