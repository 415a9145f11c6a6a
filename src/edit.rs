//! Inline edit confirmation.
//!
//! Every inline cell edit goes through the same state machine:
//!
//! ```text
//! Viewing -> PendingConfirmation -> Persisting -> Viewing
//!                    |
//!                    +-- cancel --> Viewing
//! ```
//!
//! Nothing reaches the backend until the user has confirmed a
//! "Change X from A to B?" prompt. While an edit is pending or persisting,
//! further edits are rejected.

use serde_json::Value;

use crate::error::{DeskError, Result};
use crate::filter::loosely_equal;
use crate::record::RecordId;
use crate::render::RendererRegistry;
use crate::resources::ResourceSpec;

/// An uncommitted field change awaiting confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEdit {
    pub id: RecordId,
    pub field: String,
    pub old: Value,
    pub new: Value,
}

impl PendingEdit {
    /// `Change <Column> from <A> to <B>?`, with both values rendered the
    /// way the column shows them
    pub fn prompt(&self, spec: &ResourceSpec, registry: &RendererRegistry) -> String {
        let kind = spec.kind_of(&self.field);
        format!(
            "Change {} from {} to {}?",
            spec.column_title(&self.field),
            registry.render(kind, &self.old),
            registry.render(kind, &self.new)
        )
    }
}

/// Edit workflow state
///
/// `PendingEdit` is boxed to keep the idle `Viewing` variant small.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EditPhase {
    #[default]
    Viewing,
    PendingConfirmation(Box<PendingEdit>),
    Persisting(Box<PendingEdit>),
}

/// How a confirmed edit ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The backend accepted the change
    Saved,
    /// The backend rejected the change and the old value was restored
    Reverted,
}

/// Single-slot edit state machine
#[derive(Debug, Clone, Default)]
pub struct EditWorkflow {
    phase: EditPhase,
}

impl EditWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> &EditPhase {
        &self.phase
    }

    /// The edit awaiting confirmation or being persisted
    pub fn pending(&self) -> Option<&PendingEdit> {
        match &self.phase {
            EditPhase::PendingConfirmation(edit) | EditPhase::Persisting(edit) => Some(&**edit),
            EditPhase::Viewing => None,
        }
    }

    /// True while an edit blocks further edits
    pub fn is_blocking(&self) -> bool {
        !matches!(self.phase, EditPhase::Viewing)
    }

    /// Open a pending edit.
    ///
    /// Returns `Ok(None)` when `new` equals `old`, leaving the workflow
    /// in `Viewing`.
    pub fn propose(
        &mut self,
        id: RecordId,
        field: &str,
        old: Value,
        new: Value,
    ) -> Result<Option<&PendingEdit>> {
        if let Some(current) = self.pending() {
            return Err(DeskError::EditPending(current.field.clone()));
        }
        if loosely_equal(&old, &new) {
            return Ok(None);
        }

        tracing::debug!(%id, field, "edit pending confirmation");
        self.phase = EditPhase::PendingConfirmation(Box::new(PendingEdit {
            id,
            field: field.to_string(),
            old,
            new,
        }));
        Ok(self.pending())
    }

    /// Drop the pending edit; the caller restores `old`
    pub fn cancel(&mut self) -> Result<PendingEdit> {
        match std::mem::take(&mut self.phase) {
            EditPhase::PendingConfirmation(edit) => Ok(*edit),
            other => {
                self.phase = other;
                Err(DeskError::NoPendingEdit)
            }
        }
    }

    /// Move the pending edit to `Persisting`; the caller sends the update
    pub fn confirm(&mut self) -> Result<PendingEdit> {
        match std::mem::take(&mut self.phase) {
            EditPhase::PendingConfirmation(edit) => {
                let sent = (*edit).clone();
                self.phase = EditPhase::Persisting(edit);
                Ok(sent)
            }
            other => {
                self.phase = other;
                Err(DeskError::NoPendingEdit)
            }
        }
    }

    /// Return to `Viewing` once the update has settled
    pub fn finish(&mut self) -> Option<PendingEdit> {
        match std::mem::take(&mut self.phase) {
            EditPhase::Persisting(edit) => Some(*edit),
            other => {
                self.phase = other;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources;
    use serde_json::json;

    fn propose(workflow: &mut EditWorkflow, old: Value, new: Value) -> Result<bool> {
        workflow
            .propose(RecordId::new("7"), "status", old, new)
            .map(|edit| edit.is_some())
    }

    #[test]
    fn test_unchanged_value_is_a_no_op() {
        let mut workflow = EditWorkflow::new();
        assert!(!propose(&mut workflow, json!("A"), json!("A")).unwrap());
        assert!(!propose(&mut workflow, json!(5), json!("5")).unwrap());
        assert_eq!(workflow.phase(), &EditPhase::Viewing);
    }

    #[test]
    fn test_numeric_looking_text_change_needs_confirmation() {
        let mut workflow = EditWorkflow::new();
        assert!(propose(&mut workflow, json!("0812"), json!("812")).unwrap());
        workflow.cancel().unwrap();
        assert!(propose(&mut workflow, json!("1e3"), json!("1000")).unwrap());
        workflow.cancel().unwrap();
        assert!(!propose(&mut workflow, json!(1000), json!("1e3")).unwrap());
    }

    #[test]
    fn test_confirm_then_finish() {
        let mut workflow = EditWorkflow::new();
        assert!(propose(&mut workflow, json!("O"), json!("A")).unwrap());
        assert!(matches!(workflow.phase(), EditPhase::PendingConfirmation(_)));

        let sent = workflow.confirm().unwrap();
        assert_eq!(sent.new, json!("A"));
        assert!(matches!(workflow.phase(), EditPhase::Persisting(_)));
        assert!(workflow.is_blocking());

        let done = workflow.finish().unwrap();
        assert_eq!(done.old, json!("O"));
        assert_eq!(workflow.phase(), &EditPhase::Viewing);
        assert!(workflow.finish().is_none());
    }

    #[test]
    fn test_cancel_returns_edit() {
        let mut workflow = EditWorkflow::new();
        propose(&mut workflow, json!("O"), json!("F")).unwrap();
        let cancelled = workflow.cancel().unwrap();
        assert_eq!(cancelled.old, json!("O"));
        assert!(!workflow.is_blocking());
        assert!(matches!(workflow.cancel(), Err(DeskError::NoPendingEdit)));
    }

    #[test]
    fn test_second_edit_is_rejected_while_pending() {
        let mut workflow = EditWorkflow::new();
        propose(&mut workflow, json!("O"), json!("A")).unwrap();
        assert!(matches!(
            propose(&mut workflow, json!(1), json!(2)),
            Err(DeskError::EditPending(field)) if field == "status"
        ));

        workflow.confirm().unwrap();
        assert!(propose(&mut workflow, json!(1), json!(2)).is_err());
        assert!(matches!(workflow.cancel(), Err(DeskError::NoPendingEdit)));
        assert!(workflow.pending().is_some());
    }

    #[test]
    fn test_confirm_without_pending_edit() {
        let mut workflow = EditWorkflow::new();
        assert!(matches!(workflow.confirm(), Err(DeskError::NoPendingEdit)));
    }

    #[test]
    fn test_prompt_uses_rendered_values() {
        let spec = resources::find("projects").unwrap();
        let registry = RendererRegistry::default();
        let edit = PendingEdit {
            id: RecordId::new("7"),
            field: "status".to_string(),
            old: json!("O"),
            new: json!("A"),
        };
        insta::assert_snapshot!(edit.prompt(&spec, &registry), @"Change Status from On Progress to Completed?");

        let edit = PendingEdit {
            id: RecordId::new("7"),
            field: "contract_value".to_string(),
            old: Value::Null,
            new: json!(1500000),
        };
        insta::assert_snapshot!(edit.prompt(&spec, &registry), @"Change Contract Value from - to Rp 1.500.000?");
    }
}
