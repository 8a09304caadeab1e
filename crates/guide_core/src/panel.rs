use thiserror::Error;

use crate::snapshot::{CareerSnapshot, SnapshotField, SnapshotUpdate, UnknownStage};

pub const EMPTY_LIST_TEXT: &str = "None identified yet";
pub const EMPTY_VALUE_TEXT: &str = "Not specified";

/// Why a save produced no update. Either way the edit is closed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditRejected {
    #[error("{0:?} cannot be set to an empty value")]
    EmptyValue(SnapshotField),
    #[error(transparent)]
    UnknownStage(#[from] UnknownStage),
}

/// A manual override being typed on the snapshot panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelEdit {
    field: SnapshotField,
    staged: String,
}

impl PanelEdit {
    /// Opens an edit pre-filled with the field's current value.
    pub fn begin(field: SnapshotField, snapshot: &CareerSnapshot) -> Self {
        Self {
            field,
            staged: editable_value(snapshot, field),
        }
    }

    pub fn field(&self) -> SnapshotField {
        self.field
    }

    pub fn staged(&self) -> &str {
        &self.staged
    }

    pub fn set_staged(&mut self, text: impl Into<String>) {
        self.staged = text.into();
    }

    /// Turns the staged text into a partial snapshot.
    ///
    /// Lists are split on commas, trimmed and may end up empty. A scalar whose
    /// staged text is blank, or a stage name that does not parse, is rejected
    /// and the current value stays.
    pub fn commit(self) -> Result<SnapshotUpdate, EditRejected> {
        let mut update = SnapshotUpdate::default();
        match self.field {
            SnapshotField::Skills => update.skills = Some(split_list(&self.staged)),
            SnapshotField::Gaps => update.gaps = Some(split_list(&self.staged)),
            scalar => {
                if self.staged.trim().is_empty() {
                    return Err(EditRejected::EmptyValue(scalar));
                }
                match scalar {
                    SnapshotField::Education => update.education = Some(self.staged),
                    SnapshotField::Goal => update.goal = Some(self.staged),
                    SnapshotField::Stage => update.stage = Some(self.staged.parse()?),
                    SnapshotField::Skills | SnapshotField::Gaps => {}
                }
            }
        }
        Ok(update)
    }
}

/// Comma-separated list, trimmed, empty entries dropped.
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Raw value used to pre-fill an edit.
pub fn editable_value(snapshot: &CareerSnapshot, field: SnapshotField) -> String {
    match field {
        SnapshotField::Education => snapshot.education.clone(),
        SnapshotField::Skills => snapshot.skills.join(", "),
        SnapshotField::Goal => snapshot.goal.clone(),
        SnapshotField::Stage => snapshot.stage.to_string(),
        SnapshotField::Gaps => snapshot.gaps.join(", "),
    }
}

/// Value as shown on the panel, with placeholders for empty fields.
pub fn display_value(snapshot: &CareerSnapshot, field: SnapshotField) -> String {
    let value = editable_value(snapshot, field);
    if !value.is_empty() {
        value
    } else if field.is_list() {
        EMPTY_LIST_TEXT.to_string()
    } else {
        EMPTY_VALUE_TEXT.to_string()
    }
}
