//! Status indicator widget.

use crate::theme::LedgerTheme;
use backoffice_core::GridPhase;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub struct StatusIndicator {
    pub title: String,
    pub status: String,
    pub style: Style,
}

impl StatusIndicator {
    /// Load state of a grid.
    pub fn for_phase(phase: &GridPhase, theme: &LedgerTheme) -> Self {
        let (status, color) = match phase {
            GridPhase::Loading => ("Loading…", theme.warning),
            GridPhase::Ready => ("Ready", theme.success),
            GridPhase::Error(_) => ("Error", theme.error),
        };
        Self {
            title: "Data".to_string(),
            status: status.to_string(),
            style: Style::default().fg(color),
        }
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let paragraph = Paragraph::new(self.status.clone()).style(self.style).block(
            Block::default()
                .title(self.title.as_str())
                .borders(Borders::ALL),
        );
        f.render_widget(paragraph, area);
    }
}
