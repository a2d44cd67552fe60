//! Inline edit session.
//!
//! At most one [`EditBuffer`] exists per grid. A second `start` while a row is
//! being edited or saved is rejected with [`GridError::EditInProgress`]; the
//! user has to save or cancel first.

use crate::error::{GridError, GridResult};
use crate::record::{FieldMap, RecordDescriptor, RecordId};
use serde_json::Value;

/// Working copy of one record's editable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct EditBuffer {
    record_id: RecordId,
    fields: FieldMap,
    original: FieldMap,
    error: Option<String>,
}

impl EditBuffer {
    fn new(record_id: RecordId, snapshot: FieldMap) -> Self {
        Self {
            record_id,
            fields: snapshot.clone(),
            original: snapshot,
            error: None,
        }
    }

    pub fn record_id(&self) -> RecordId {
        self.record_id
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn original(&self) -> &FieldMap {
        &self.original
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Message from the last failed save, shown inline next to the editor.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.fields != self.original
    }

    /// Keys whose value differs from the snapshot taken at `start`.
    pub fn changed_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(key, value)| self.original.get(key.as_str()) != Some(*value))
            .map(|(key, _)| key.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditState {
    #[default]
    Viewing,
    Editing(EditBuffer),
    Saving(EditBuffer),
}

#[derive(Debug, Clone, Default)]
pub struct EditSession {
    state: EditState,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    /// Record held by the session, whether editing or saving.
    pub fn active_id(&self) -> Option<RecordId> {
        self.buffer().map(EditBuffer::record_id)
    }

    pub fn is_active(&self, id: RecordId) -> bool {
        self.active_id() == Some(id)
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.state, EditState::Saving(_))
    }

    pub fn buffer(&self) -> Option<&EditBuffer> {
        match &self.state {
            EditState::Viewing => None,
            EditState::Editing(buffer) | EditState::Saving(buffer) => Some(buffer),
        }
    }

    pub fn start(&mut self, record_id: RecordId, snapshot: FieldMap) -> GridResult<()> {
        if let Some(editing) = self.active_id() {
            return Err(GridError::EditInProgress { editing });
        }
        self.state = EditState::Editing(EditBuffer::new(record_id, snapshot));
        Ok(())
    }

    pub fn set_field(
        &mut self,
        descriptor: &RecordDescriptor,
        key: &str,
        value: Value,
    ) -> GridResult<()> {
        let spec = descriptor.field(key).ok_or_else(|| GridError::UnknownField {
            key: key.to_string(),
        })?;
        if !spec.editable {
            return Err(GridError::ReadOnlyField {
                key: key.to_string(),
            });
        }
        match &mut self.state {
            EditState::Editing(buffer) => {
                buffer.fields.insert(key.to_string(), value);
                Ok(())
            }
            EditState::Saving(buffer) => Err(GridError::SaveInFlight {
                id: buffer.record_id,
            }),
            EditState::Viewing => Err(GridError::NotEditing),
        }
    }

    /// Drop the buffer without a server call. A no-op while viewing.
    pub fn cancel(&mut self) -> GridResult<()> {
        match &self.state {
            EditState::Saving(buffer) => Err(GridError::SaveInFlight {
                id: buffer.record_id,
            }),
            _ => {
                self.state = EditState::Viewing;
                Ok(())
            }
        }
    }

    /// Validate the buffer and move to `Saving`.
    ///
    /// Returns the full buffer of editable fields; that is the save payload
    /// for every record type. A validation failure stays in `Editing` with
    /// the message stored on the buffer.
    pub fn begin_save(&mut self, descriptor: &RecordDescriptor) -> GridResult<(RecordId, FieldMap)> {
        let state = std::mem::take(&mut self.state);
        match state {
            EditState::Editing(mut buffer) => {
                if let Err(err) = descriptor.validate(&buffer.fields) {
                    buffer.error = Some(err.to_string());
                    self.state = EditState::Editing(buffer);
                    return Err(err.into());
                }
                buffer.error = None;
                let request = (buffer.record_id, buffer.fields.clone());
                self.state = EditState::Saving(buffer);
                Ok(request)
            }
            EditState::Saving(buffer) => {
                let id = buffer.record_id;
                self.state = EditState::Saving(buffer);
                Err(GridError::SaveInFlight { id })
            }
            EditState::Viewing => Err(GridError::NotEditing),
        }
    }

    /// Resolve a save for `record_id`. Returns `false` when no matching save
    /// was in flight.
    pub fn finish_save(&mut self, record_id: RecordId, outcome: Result<(), String>) -> bool {
        let state = std::mem::take(&mut self.state);
        match state {
            EditState::Saving(mut buffer) if buffer.record_id == record_id => {
                match outcome {
                    Ok(()) => self.state = EditState::Viewing,
                    Err(message) => {
                        buffer.error = Some(message);
                        self.state = EditState::Editing(buffer);
                    }
                }
                true
            }
            other => {
                self.state = other;
                false
            }
        }
    }
}
