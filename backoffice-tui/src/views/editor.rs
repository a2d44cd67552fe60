//! Field editor for the inline edit buffer and the create form.

use crate::events::RoutedRecord;
use crate::state::{edit_state_label, value_text, FormTarget, GridPane};
use crate::views::RenderContext;
use crate::widgets::DetailPanel;
use backoffice_core::{EditSession, FieldKind, FieldSpec, Lookups, RemoteDataSource};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    Frame,
};
use serde_json::Value;

/// Editor text for one field; foreign keys show the lookup name.
pub fn field_text(spec: &FieldSpec, value: Option<&Value>, lookups: &Lookups) -> String {
    match (spec.kind, value) {
        (FieldKind::ForeignKey(kind), Some(Value::Number(n))) => match n.as_i64() {
            Some(id) => match lookups.name_of(kind, id) {
                Some(name) => format!("{} (#{})", name, id),
                None => format!("#{}", id),
            },
            None => n.to_string(),
        },
        (FieldKind::ForeignKey(_), None | Some(Value::Null)) => "(none)".to_string(),
        _ => value_text(value),
    }
}

/// Title for the inline editor, counting fields changed since it opened.
pub fn edit_title(entity: &str, edit: &EditSession) -> String {
    let id = edit.active_id().map(|id| id.to_string()).unwrap_or_default();
    let label = edit_state_label(edit.state()).unwrap_or("editing");
    match edit.buffer().filter(|buffer| buffer.is_dirty()) {
        Some(buffer) => format!(
            "Edit {} {} ({}, {} changed)",
            entity,
            id,
            label,
            buffer.changed_fields().len()
        ),
        None => format!("Edit {} {} ({})", entity, id, label),
    }
}

pub fn render<S>(f: &mut Frame<'_>, ctx: &RenderContext<'_>, pane: &GridPane<S>, area: Rect)
where
    S: RemoteDataSource,
    S::Record: RoutedRecord,
{
    let Some(target) = pane.form_target() else {
        return;
    };
    let entity = pane.grid.descriptor().entity;
    let title = match target {
        FormTarget::Create => {
            let submitting = pane.grid.create_form().is_some_and(|form| form.is_submitting());
            if submitting {
                format!("New {} (creating…)", entity)
            } else {
                format!("New {}", entity)
            }
        }
        FormTarget::Edit => edit_title(entity, pane.grid.edit()),
    };

    let fields = pane
        .form_fields()
        .into_iter()
        .map(|spec| {
            (
                spec.label,
                field_text(spec, pane.form_value(target, spec.key), ctx.lookups),
            )
        })
        .collect();
    let footer = pane
        .form_error(target)
        .map(|message| (message.to_string(), Style::default().fg(ctx.theme.error)));

    let panel = DetailPanel {
        title,
        fields,
        selected: Some(pane.field_cursor),
        style: Style::default().fg(ctx.theme.secondary),
        selected_style: Style::default()
            .fg(ctx.theme.primary)
            .add_modifier(Modifier::BOLD),
        footer,
    };
    panel.render(f, area);
}
