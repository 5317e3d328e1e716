use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::PlannerError;
use crate::model::{Task, TaskPatch};

/// The full task list for one user, as delivered by a push notification.
pub type Snapshot = Vec<Task>;

/// Remote persistence port: one document per task under a per-user
/// collection, plus a push channel that delivers the full list on the
/// initial load and after every change.
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    async fn put(&self, user: &str, task: Task) -> Result<(), PlannerError>;
    async fn update(&self, user: &str, id: Uuid, patch: TaskPatch) -> Result<(), PlannerError>;
    /// Deleting an absent document is idempotent.
    async fn delete(&self, user: &str, id: Uuid) -> Result<(), PlannerError>;
    async fn subscribe(&self, user: &str) -> Result<mpsc::UnboundedReceiver<Snapshot>, PlannerError>;
}

/// Supplies the opaque user identifier the remote port is scoped by. All
/// remote operations are deferred until this resolves.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    async fn user_id(&self) -> Result<String, PlannerError>;
}

/// Identity that is already known, e.g. restored from an earlier session.
pub struct FixedIdentity(pub String);

#[async_trait]
impl IdentityProvider for FixedIdentity {
    async fn user_id(&self) -> Result<String, PlannerError> {
        Ok(self.0.clone())
    }
}

/// One write operation scoped to a single task document.
#[derive(Debug, Clone)]
pub enum RemoteOp {
    Put(Task),
    Update(Uuid, TaskPatch),
    Delete(Uuid),
}

/// In-memory `RemoteStore` with live push, used as the sync backend in
/// tests and self-contained deployments.
#[derive(Default)]
pub struct MemoryRemote {
    users: Mutex<HashMap<String, UserDocs>>,
}

#[derive(Default)]
struct UserDocs {
    tasks: Vec<Task>,
    watchers: Vec<mpsc::UnboundedSender<Snapshot>>,
}

impl UserDocs {
    fn notify(&mut self) {
        let snapshot = self.tasks.clone();
        self.watchers.retain(|w| w.send(snapshot.clone()).is_ok());
    }
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, UserDocs>>, PlannerError> {
        self.users
            .lock()
            .map_err(|_| PlannerError::persistence("memory remote lock poisoned"))
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn put(&self, user: &str, task: Task) -> Result<(), PlannerError> {
        let mut users = self.lock()?;
        let docs = users.entry(user.to_string()).or_default();
        // Last write wins on id collision.
        match docs.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task,
            None => docs.tasks.push(task),
        }
        docs.notify();
        Ok(())
    }

    async fn update(&self, user: &str, id: Uuid, patch: TaskPatch) -> Result<(), PlannerError> {
        let mut users = self.lock()?;
        let docs = users.entry(user.to_string()).or_default();
        let task = docs
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(PlannerError::NotFound(id))?;
        task.apply_patch(&patch);
        docs.notify();
        Ok(())
    }

    async fn delete(&self, user: &str, id: Uuid) -> Result<(), PlannerError> {
        let mut users = self.lock()?;
        let docs = users.entry(user.to_string()).or_default();
        let before = docs.tasks.len();
        docs.tasks.retain(|t| t.id != id);
        if docs.tasks.len() != before {
            docs.notify();
        }
        Ok(())
    }

    async fn subscribe(&self, user: &str) -> Result<mpsc::UnboundedReceiver<Snapshot>, PlannerError> {
        let mut users = self.lock()?;
        let docs = users.entry(user.to_string()).or_default();
        let (tx, rx) = mpsc::unbounded_channel();
        // Initial load: the subscriber sees the current list immediately.
        let _ = tx.send(docs.tasks.clone());
        docs.watchers.push(tx);
        Ok(rx)
    }
}

/// Live connection between the task store and a remote backend.
///
/// Writes flow through one ordered channel consumed by a single worker
/// task, so a session's mutations reach the remote in dispatch order even
/// when individual calls are slow (an update must never outrun the put that
/// creates its document). The UI thread never awaits: failures are only
/// logged, and the authoritative read path is the snapshot channel, drained
/// by [`RemoteSession::poll`] once per frame. Ops dispatched before the
/// identity provider resolves sit in the channel, in order, until the
/// worker picks them up.
pub struct RemoteSession {
    // Keeps a self-built runtime alive when no ambient runtime exists.
    _runtime: Option<tokio::runtime::Runtime>,
    user: Option<String>,
    op_tx: mpsc::UnboundedSender<RemoteOp>,
    id_rx: mpsc::UnboundedReceiver<String>,
    snap_rx: mpsc::UnboundedReceiver<Snapshot>,
}

impl RemoteSession {
    pub fn new(
        store: Arc<dyn RemoteStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Result<Self, PlannerError> {
        let (handle, runtime) = match tokio::runtime::Handle::try_current() {
            Ok(handle) => (handle, None),
            Err(_) => {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .enable_all()
                    .build()
                    .map_err(PlannerError::persistence)?;
                (runtime.handle().clone(), Some(runtime))
            }
        };

        let (op_tx, mut op_rx) = mpsc::unbounded_channel::<RemoteOp>();
        let (id_tx, id_rx) = mpsc::unbounded_channel();
        let (snap_tx, snap_rx) = mpsc::unbounded_channel();
        handle.spawn(async move {
            let user = match identity.user_id().await {
                Ok(user) => user,
                Err(e) => {
                    log::error!("identity acquisition failed: {e}");
                    return;
                }
            };
            let mut snapshots = match store.subscribe(&user).await {
                Ok(rx) => rx,
                Err(e) => {
                    log::error!("remote subscribe failed: {e}");
                    return;
                }
            };
            if id_tx.send(user.clone()).is_err() {
                return;
            }
            loop {
                tokio::select! {
                    snapshot = snapshots.recv() => match snapshot {
                        Some(snapshot) => {
                            if snap_tx.send(snapshot).is_err() {
                                break;
                            }
                        }
                        None => break,
                    },
                    op = op_rx.recv() => match op {
                        // Each op completes before the next starts.
                        Some(op) => apply_op(store.as_ref(), &user, op).await,
                        None => break,
                    },
                }
            }
        });

        Ok(Self {
            _runtime: runtime,
            user: None,
            op_tx,
            id_rx,
            snap_rx,
        })
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Hand an op to the worker. Apply order equals dispatch order; ops sent
    /// while the user id is still pending are buffered, never reordered.
    pub fn dispatch(&mut self, op: RemoteOp) {
        if self.op_tx.send(op).is_err() {
            log::error!("remote worker is gone, dropping write");
        }
    }

    /// Drain identity and snapshot channels. Returns the latest pushed
    /// snapshot, if any arrived since the last poll — intermediate snapshots
    /// are superseded, the newest one wins.
    pub fn poll(&mut self) -> Option<Snapshot> {
        while let Ok(user) = self.id_rx.try_recv() {
            log::info!("remote identity acquired");
            self.user = Some(user);
        }
        let mut latest = None;
        while let Ok(snapshot) = self.snap_rx.try_recv() {
            latest = Some(snapshot);
        }
        latest
    }
}

async fn apply_op(store: &dyn RemoteStore, user: &str, op: RemoteOp) {
    let result = match op {
        RemoteOp::Put(task) => store.put(user, task).await,
        RemoteOp::Update(id, patch) => store.update(user, id, patch).await,
        RemoteOp::Delete(id) => store.delete(user, id).await,
    };
    match result {
        Ok(()) => {}
        // Stale reference after a concurrent remote change.
        Err(PlannerError::NotFound(id)) => {
            log::debug!("remote op targeted missing task {id}");
        }
        Err(e) => log::error!("remote write failed: {e}"),
    }
}
