use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single to-do record: a title, optional subject/memo, an optional due
/// date and a completion flag. Completion never deletes — `done` tasks stay
/// in the collection so the calendar keeps its history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    #[serde(default)]
    pub subject: Option<String>,
    pub name: String,
    #[serde(default)]
    pub memo: Option<String>,
    /// Local-calendar day, serialized as `YYYY-MM-DD`. `None` is legal;
    /// undated tasks appear in lists but never on the calendar.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub done: bool,
    /// Millisecond creation timestamp, assigned once by the store. Only used
    /// as a stable tie-break when sorting.
    pub created_at: i64,
}

impl Task {
    /// Ordering key for rendered lists: ascending date with undated tasks
    /// first, then creation order.
    pub fn sort_key(&self) -> (Option<NaiveDate>, i64) {
        (self.date, self.created_at)
    }

    /// Overwrite the four editable fields from a draft. `id`, `created_at`
    /// and `done` are untouched.
    pub fn apply_draft(&mut self, draft: &TaskDraft) {
        self.subject = draft.trimmed_subject();
        self.name = draft.trimmed_name().unwrap_or_default();
        self.memo = draft.trimmed_memo();
        self.date = draft.date;
    }

    pub fn apply_patch(&mut self, patch: &TaskPatch) {
        match patch {
            TaskPatch::Fields {
                subject,
                name,
                memo,
                date,
            } => {
                self.subject = subject.clone();
                self.name = name.clone();
                self.memo = memo.clone();
                self.date = *date;
            }
            TaskPatch::Done(value) => self.done = *value,
        }
    }
}

/// Raw form input for add and edit. Whitespace is not yet normalized; the
/// trimming accessors below decide what actually lands on the task.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub subject: String,
    pub name: String,
    pub memo: String,
    pub date: Option<NaiveDate>,
}

impl TaskDraft {
    /// The required title, or `None` when it is empty after trimming.
    pub fn trimmed_name(&self) -> Option<String> {
        non_empty(&self.name)
    }

    pub fn trimmed_subject(&self) -> Option<String> {
        non_empty(&self.subject)
    }

    pub fn trimmed_memo(&self) -> Option<String> {
        non_empty(&self.memo)
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Partial update shape for the remote persistence port. The two shapes
/// match the two mutations the store actually sends: an edit replaces the
/// editable fields wholesale, a toggle only flips the completion flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskPatch {
    Fields {
        subject: Option<String>,
        name: String,
        memo: Option<String>,
        date: Option<NaiveDate>,
    },
    Done(bool),
}

impl TaskPatch {
    pub fn from_draft(draft: &TaskDraft) -> Self {
        Self::Fields {
            subject: draft.trimmed_subject(),
            name: draft.trimmed_name().unwrap_or_default(),
            memo: draft.trimmed_memo(),
            date: draft.date,
        }
    }
}
