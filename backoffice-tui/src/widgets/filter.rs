//! Filter bar widget.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Debug, Clone)]
pub struct FilterOption {
    pub label: String,
    /// Applied value, or the prompt input while `editing`.
    pub value: Option<String>,
    pub editing: bool,
}

impl FilterOption {
    pub fn text(&self) -> String {
        match (&self.value, self.editing) {
            (Some(value), true) => format!("{}: {}▏", self.label, value),
            (None, true) => format!("{}: ▏", self.label),
            (Some(value), false) => format!("{}: {}", self.label, value),
            (None, false) => format!("{}: any", self.label),
        }
    }
}

pub struct FilterBar<'a> {
    pub title: &'a str,
    pub filters: &'a [FilterOption],
    pub active_style: Style,
    pub inactive_style: Style,
    pub editing_style: Style,
}

impl<'a> FilterBar<'a> {
    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let spans: Vec<Span> = self
            .filters
            .iter()
            .map(|filter| {
                let style = if filter.editing {
                    self.editing_style
                } else if filter.value.is_some() {
                    self.active_style
                } else {
                    self.inactive_style
                };
                Span::styled(format!(" {} ", filter.text()), style)
            })
            .collect();

        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().title(self.title).borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_text() {
        let mut option = FilterOption {
            label: "Status".to_string(),
            value: None,
            editing: false,
        };
        assert_eq!(option.text(), "Status: any");
        option.value = Some("DONE".to_string());
        assert_eq!(option.text(), "Status: DONE");
        option.editing = true;
        assert_eq!(option.text(), "Status: DONE▏");
    }
}
