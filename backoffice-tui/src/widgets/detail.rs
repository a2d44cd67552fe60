//! Detail panel widget for showing field/value pairs.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Marker in front of the focused field.
const CURSOR: &str = "▸ ";

pub struct DetailPanel<'a> {
    pub title: String,
    pub fields: Vec<(&'a str, String)>,
    /// Focused field, drawn with `selected_style`.
    pub selected: Option<usize>,
    pub style: Style,
    pub selected_style: Style,
    /// Trailing line, e.g. a validation message.
    pub footer: Option<(String, Style)>,
}

impl<'a> DetailPanel<'a> {
    pub fn lines(&self) -> Vec<Line<'_>> {
        let mut lines: Vec<Line> = self
            .fields
            .iter()
            .enumerate()
            .map(|(index, (label, value))| {
                let focused = self.selected == Some(index);
                let (marker, value_style) = if focused {
                    (CURSOR, self.selected_style)
                } else {
                    ("  ", Style::default())
                };
                Line::from(vec![
                    Span::styled(marker, self.selected_style),
                    Span::styled(format!("{}: ", label), self.style),
                    Span::styled(single_line(value), value_style),
                ])
            })
            .collect();
        if let Some((message, style)) = &self.footer {
            lines.push(Line::from(Span::styled(message.as_str(), *style)));
        }
        lines
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        let widget = Paragraph::new(Text::from(self.lines()))
            .block(Block::default().title(self.title.as_str()).borders(Borders::ALL))
            .wrap(Wrap { trim: true });

        f.render_widget(widget, area);
    }
}

/// Multi-line values are folded so every field keeps one row.
fn single_line(value: &str) -> String {
    value.replace('\n', " ⏎ ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_selected_field_is_marked_and_newlines_folded() {
        let panel = DetailPanel {
            title: "Edit step 1".to_string(),
            fields: vec![("Name", "Draft".to_string()), ("Prompt", "a\nb".to_string())],
            selected: Some(1),
            style: Style::default(),
            selected_style: Style::default(),
            footer: Some(("Required field missing: name".to_string(), Style::default())),
        };
        let lines = panel.lines();
        assert_eq!(lines.len(), 3);
        assert_eq!(text_of(&lines[0]), "  Name: Draft");
        assert_eq!(text_of(&lines[1]), "▸ Prompt: a ⏎ b");
        assert_eq!(text_of(&lines[2]), "Required field missing: name");
    }
}
