pub mod local;
pub mod remote;

pub use local::LocalStore;
pub use remote::{
    FixedIdentity, IdentityProvider, MemoryRemote, RemoteOp, RemoteSession, RemoteStore, Snapshot,
};

use uuid::Uuid;

use crate::error::PlannerError;
use crate::model::{Task, TaskDraft, TaskPatch};

/// The persistence backend the store writes through. Chosen by deployment;
/// the mutation logic is identical for both.
pub enum Backend {
    Local(LocalStore),
    Remote(RemoteSession),
}

/// Owns the in-memory task collection, the single active edit target, and
/// the decision which persistence calls each mutation triggers.
///
/// Under a remote backend the collection is a read-through cache: whatever
/// the last push snapshot delivered is authoritative, and [`TaskStore::poll_remote`]
/// can replace it wholesale at any frame boundary.
pub struct TaskStore {
    tasks: Vec<Task>,
    editing: Option<Uuid>,
    backend: Backend,
}

impl TaskStore {
    /// Local mode: load the whole collection up front; a failed load starts
    /// empty and is logged.
    pub fn local(store: LocalStore) -> Self {
        let tasks = store.read_all().unwrap_or_else(|e| {
            log::error!("failed to load tasks: {e}");
            Vec::new()
        });
        Self {
            tasks,
            editing: None,
            backend: Backend::Local(store),
        }
    }

    /// Remote mode: starts empty; the first pushed snapshot populates it.
    pub fn remote(session: RemoteSession) -> Self {
        Self {
            tasks: Vec::new(),
            editing: None,
            backend: Backend::Remote(session),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.backend, Backend::Remote(_))
    }

    pub fn remote_user(&self) -> Option<&str> {
        match &self.backend {
            Backend::Remote(session) => session.user(),
            Backend::Local(_) => None,
        }
    }

    // --- Mutations ---

    /// Create a task from the draft. The name must be non-empty after
    /// trimming; on success the pending edit target (if any) is cleared.
    pub fn add(&mut self, draft: &TaskDraft) -> Result<Uuid, PlannerError> {
        let name = draft
            .trimmed_name()
            .ok_or_else(|| PlannerError::validation("task name is required"))?;
        let task = Task {
            id: Uuid::new_v4(),
            subject: draft.trimmed_subject(),
            name,
            memo: draft.trimmed_memo(),
            date: draft.date,
            done: false,
            created_at: self.next_created_at(),
        };
        let id = task.id;
        self.tasks.push(task.clone());
        self.editing = None;
        self.persist(RemoteOp::Put(task));
        Ok(id)
    }

    /// Record `id` as the single active edit target and hand its current
    /// field values to the form. Unknown ids are a silent no-op. Starting a
    /// new edit abandons the previous target without mutating it.
    pub fn begin_edit(&mut self, id: Uuid) -> Option<&Task> {
        if !self.tasks.iter().any(|t| t.id == id) {
            return None;
        }
        self.editing = Some(id);
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Submit the form: overwrite the edit target's editable fields, or
    /// behave exactly like [`TaskStore::add`] when no edit is active (a
    /// single submit action serves both).
    ///
    /// A `NotFound` return means the target vanished under a concurrent
    /// remote update; callers treat it as a silent no-op.
    pub fn commit_edit(&mut self, draft: &TaskDraft) -> Result<Uuid, PlannerError> {
        let Some(id) = self.editing else {
            return self.add(draft);
        };
        if draft.trimmed_name().is_none() {
            // Validation failures mutate nothing, including the edit target.
            return Err(PlannerError::validation("task name is required"));
        }
        self.editing = None;
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return Err(PlannerError::NotFound(id));
        };
        task.apply_draft(draft);
        self.persist(RemoteOp::Update(id, TaskPatch::from_draft(draft)));
        Ok(id)
    }

    pub fn toggle_done(&mut self, id: Uuid) {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return;
        };
        task.done = !task.done;
        let done = task.done;
        self.persist(RemoteOp::Update(id, TaskPatch::Done(done)));
    }

    pub fn set_done(&mut self, id: Uuid, value: bool) {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return;
        };
        if task.done == value {
            return;
        }
        task.done = value;
        self.persist(RemoteOp::Update(id, TaskPatch::Done(value)));
    }

    /// Delete unconditionally. Confirmation gating is the caller's job; an
    /// unknown id is a silent no-op.
    pub fn remove(&mut self, id: Uuid) {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return;
        }
        self.persist(RemoteOp::Delete(id));
    }

    // --- Derived views ---

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn pending_tasks(&self) -> Vec<&Task> {
        self.sorted_view(false)
    }

    pub fn completed_tasks(&self) -> Vec<&Task> {
        self.sorted_view(true)
    }

    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    pub fn editing_task(&self) -> Option<&Task> {
        let id = self.editing?;
        self.tasks.iter().find(|t| t.id == id)
    }

    fn sorted_view(&self, done: bool) -> Vec<&Task> {
        let mut view: Vec<&Task> = self.tasks.iter().filter(|t| t.done == done).collect();
        view.sort_by_key(|t| t.sort_key());
        view
    }

    // --- Remote reconciliation ---

    /// Replace the collection with an incoming push snapshot. Wholesale,
    /// last-writer-via-push wins: local-only state that was not yet
    /// persisted is discarded. The edit target survives only if its id is
    /// still present.
    pub fn reconcile(&mut self, snapshot: Vec<Task>) {
        self.tasks = snapshot;
        if let Some(id) = self.editing {
            if !self.tasks.iter().any(|t| t.id == id) {
                self.editing = None;
            }
        }
    }

    /// Drain the remote channels; returns true when a snapshot arrived and
    /// the collection was replaced. Local mode never reports changes.
    pub fn poll_remote(&mut self) -> bool {
        let Backend::Remote(session) = &mut self.backend else {
            return false;
        };
        let Some(snapshot) = session.poll() else {
            return false;
        };
        self.reconcile(snapshot);
        true
    }

    // --- Persistence ---

    fn persist(&mut self, op: RemoteOp) {
        match &mut self.backend {
            Backend::Local(store) => {
                if let Err(e) = store.write_all(&self.tasks) {
                    log::error!("local write failed: {e}");
                }
            }
            Backend::Remote(session) => session.dispatch(op),
        }
    }

    /// Creation timestamps are strictly monotonic within a store so the
    /// sort tie-break is stable even for tasks created in the same
    /// millisecond.
    fn next_created_at(&self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        let max = self.tasks.iter().map(|t| t.created_at).max().unwrap_or(0);
        now.max(max.saturating_add(1))
    }
}
