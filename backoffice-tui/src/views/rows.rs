//! Per-entity cell text and expanded-row details.

use backoffice_core::{
    format_timestamp, ContentReview, ForeignKind, GridRecord, Lookups, RecordId, Step, PLACEHOLDER,
};

pub trait RowPresenter: GridRecord {
    /// Column that grows to hold the details of an expanded row.
    const DETAIL_COLUMN: &'static str;

    fn display_cell(&self, key: &str, _lookups: &Lookups) -> String {
        self.cell_text(key)
    }

    fn detail_lines(&self, lookups: &Lookups) -> Vec<(&'static str, String)>;
}

/// Lookup name for a foreign key, falling back to the raw id.
pub fn foreign_name(lookups: &Lookups, kind: ForeignKind, id: Option<RecordId>) -> String {
    match id {
        Some(id) => lookups
            .name_of(kind, id)
            .map(str::to_string)
            .unwrap_or_else(|| id.to_string()),
        None => PLACEHOLDER.to_string(),
    }
}

fn or_placeholder(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        flat
    }
}

impl RowPresenter for Step {
    const DETAIL_COLUMN: &'static str = "name";

    fn display_cell(&self, key: &str, lookups: &Lookups) -> String {
        match key {
            "workflow_id" => foreign_name(lookups, ForeignKind::Workflow, self.workflow_id),
            "agent_id" => foreign_name(lookups, ForeignKind::Agent, self.agent_id),
            _ => self.cell_text(key),
        }
    }

    fn detail_lines(&self, lookups: &Lookups) -> Vec<(&'static str, String)> {
        vec![
            ("Prompt", or_placeholder(&self.prompt)),
            (
                "Workflow",
                foreign_name(lookups, ForeignKind::Workflow, self.workflow_id),
            ),
            ("Agent", foreign_name(lookups, ForeignKind::Agent, self.agent_id)),
        ]
    }
}

impl RowPresenter for ContentReview {
    const DETAIL_COLUMN: &'static str = "title";

    fn detail_lines(&self, _lookups: &Lookups) -> Vec<(&'static str, String)> {
        vec![
            ("Summary", or_placeholder(&self.short_description)),
            ("Message", or_placeholder(&self.message)),
            ("Category", or_placeholder(&self.category)),
            ("Created", format_timestamp(self.created.as_ref())),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoffice_test_utils::fixtures;

    #[test]
    fn test_step_foreign_keys_show_names() {
        let lookups = fixtures::lookups();
        let mut step = fixtures::step(1, "Draft");
        step.agent_id = Some(2);
        assert_eq!(step.display_cell("workflow_id", &lookups), "Blog post");
        assert_eq!(step.display_cell("agent_id", &lookups), "Editor");
        assert_eq!(step.display_cell("name", &lookups), "Draft");
    }

    #[test]
    fn test_unknown_and_missing_foreign_keys() {
        let lookups = fixtures::lookups();
        let mut step = fixtures::step(1, "Draft");
        step.agent_id = Some(42);
        step.workflow_id = None;
        assert_eq!(step.display_cell("agent_id", &lookups), "42");
        assert_eq!(step.display_cell("workflow_id", &lookups), PLACEHOLDER);
    }

    #[test]
    fn test_review_details_fold_whitespace() {
        let mut review = fixtures::review(3, "");
        review.message = "line one\nline two".to_string();
        review.category = String::new();
        let lines = review.detail_lines(&Lookups::default());
        assert_eq!(lines[1], ("Message", "line one line two".to_string()));
        assert_eq!(lines[2], ("Category", PLACEHOLDER.to_string()));
        assert_eq!(review.display_cell("status", &Lookups::default()), "PENDING");
    }
}
