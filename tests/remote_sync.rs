//! End-to-end tests of the remote backend: two task stores sharing one
//! in-memory remote, exchanging state through push snapshots.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use planner::error::PlannerError;
use planner::model::{Task, TaskDraft, TaskPatch};
use planner::store::{
    FixedIdentity, IdentityProvider, MemoryRemote, RemoteSession, RemoteStore, Snapshot, TaskStore,
};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Identity that resolves only after a delay, to exercise the op buffer.
struct SlowIdentity(String);

#[async_trait]
impl IdentityProvider for SlowIdentity {
    async fn user_id(&self) -> Result<String, PlannerError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(self.0.clone())
    }
}

/// Remote whose puts land slowly, so any write reordering would surface.
struct LaggyRemote(MemoryRemote);

#[async_trait]
impl RemoteStore for LaggyRemote {
    async fn put(&self, user: &str, task: Task) -> Result<(), PlannerError> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.0.put(user, task).await
    }

    async fn update(&self, user: &str, id: Uuid, patch: TaskPatch) -> Result<(), PlannerError> {
        self.0.update(user, id, patch).await
    }

    async fn delete(&self, user: &str, id: Uuid) -> Result<(), PlannerError> {
        self.0.delete(user, id).await
    }

    async fn subscribe(
        &self,
        user: &str,
    ) -> Result<mpsc::UnboundedReceiver<Snapshot>, PlannerError> {
        self.0.subscribe(user).await
    }
}

fn draft(name: &str, date: Option<NaiveDate>) -> TaskDraft {
    TaskDraft {
        subject: String::new(),
        name: name.to_string(),
        memo: String::new(),
        date,
    }
}

fn remote_store(remote: &Arc<MemoryRemote>, user: &str) -> TaskStore {
    let session =
        RemoteSession::new(
            Arc::clone(remote) as Arc<dyn RemoteStore>,
            Arc::new(FixedIdentity(user.to_string())),
        )
        .unwrap();
    TaskStore::remote(session)
}

/// Poll the store once per tick until the condition holds.
async fn wait_until(store: &mut TaskStore, mut cond: impl FnMut(&TaskStore) -> bool) {
    for _ in 0..400 {
        store.poll_remote();
        if cond(store) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached before timeout");
}

#[tokio::test(flavor = "multi_thread")]
async fn ops_queued_before_identity_resolve_afterwards() {
    let remote = Arc::new(MemoryRemote::new());
    let session = RemoteSession::new(
        Arc::clone(&remote) as Arc<dyn RemoteStore>,
        Arc::new(SlowIdentity("mhj".to_string())),
    )
    .unwrap();
    let mut store = TaskStore::remote(session);

    // Identity is still pending, so this write can only be queued.
    assert_eq!(store.remote_user(), None);
    store.add(&draft("queued", None)).unwrap();

    wait_until(&mut store, |s| s.remote_user().is_some()).await;
    assert_eq!(store.remote_user(), Some("mhj"));

    // The queued put must have reached the remote and come back by push.
    let mut observer = remote_store(&remote, "mhj");
    wait_until(&mut observer, |s| {
        s.tasks().iter().any(|t| t.name == "queued")
    })
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn add_propagates_between_sessions() {
    let remote = Arc::new(MemoryRemote::new());
    let mut a = remote_store(&remote, "mhj");
    let mut b = remote_store(&remote, "mhj");

    wait_until(&mut a, |s| s.remote_user().is_some()).await;
    a.add(&draft("shared", NaiveDate::from_ymd_opt(2024, 3, 5)))
        .unwrap();

    wait_until(&mut b, |s| s.tasks().len() == 1).await;
    assert_eq!(b.tasks()[0].name, "shared");
    assert_eq!(b.tasks()[0].date, NaiveDate::from_ymd_opt(2024, 3, 5));
}

#[tokio::test(flavor = "multi_thread")]
async fn toggle_and_delete_propagate() {
    let remote = Arc::new(MemoryRemote::new());
    let mut a = remote_store(&remote, "mhj");
    let mut b = remote_store(&remote, "mhj");

    wait_until(&mut a, |s| s.remote_user().is_some()).await;
    let id = a.add(&draft("flip", None)).unwrap();
    wait_until(&mut b, |s| s.tasks().len() == 1).await;

    a.toggle_done(id);
    wait_until(&mut b, |s| s.tasks().first().is_some_and(|t| t.done)).await;

    a.remove(id);
    wait_until(&mut b, |s| s.tasks().is_empty()).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn slow_put_does_not_reorder_a_following_update() {
    let remote = Arc::new(LaggyRemote(MemoryRemote::new()));
    let session = RemoteSession::new(
        Arc::clone(&remote) as Arc<dyn RemoteStore>,
        Arc::new(FixedIdentity("mhj".to_string())),
    )
    .unwrap();
    let mut a = TaskStore::remote(session);
    wait_until(&mut a, |s| s.remote_user().is_some()).await;

    // The toggle's update is dispatched while the add's put is still in
    // flight. The remote must still end up with done=true.
    let id = a.add(&draft("slow", None)).unwrap();
    a.toggle_done(id);

    let session = RemoteSession::new(
        Arc::clone(&remote) as Arc<dyn RemoteStore>,
        Arc::new(FixedIdentity("mhj".to_string())),
    )
    .unwrap();
    let mut b = TaskStore::remote(session);
    wait_until(&mut b, |s| s.tasks().first().is_some_and(|t| t.done)).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn buffered_add_then_delete_does_not_resurrect() {
    let remote = Arc::new(MemoryRemote::new());
    let session = RemoteSession::new(
        Arc::clone(&remote) as Arc<dyn RemoteStore>,
        Arc::new(SlowIdentity("mhj".to_string())),
    )
    .unwrap();
    let mut store = TaskStore::remote(session);

    // Both ops buffer before the identity resolves; they must apply in this
    // order or the delete hits nothing and the put wins.
    let id = store.add(&draft("ephemeral", None)).unwrap();
    store.remove(id);

    wait_until(&mut store, |s| s.remote_user().is_some()).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    store.poll_remote();
    assert!(store.tasks().is_empty());

    let mut observer = remote_store(&remote, "mhj");
    wait_until(&mut observer, |s| s.remote_user().is_some()).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    observer.poll_remote();
    assert!(observer.tasks().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn users_do_not_see_each_others_tasks() {
    let remote = Arc::new(MemoryRemote::new());
    let mut a = remote_store(&remote, "alice");
    let mut b = remote_store(&remote, "bob");

    wait_until(&mut a, |s| s.remote_user().is_some()).await;
    wait_until(&mut b, |s| s.remote_user().is_some()).await;
    a.add(&draft("private", None)).unwrap();
    wait_until(&mut a, |s| s.tasks().len() == 1).await;

    // Give bob's channel time to deliver anything it would.
    tokio::time::sleep(Duration::from_millis(50)).await;
    b.poll_remote();
    assert!(b.tasks().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn push_cancels_edit_of_remotely_deleted_task() {
    let remote = Arc::new(MemoryRemote::new());
    let mut a = remote_store(&remote, "mhj");
    let mut b = remote_store(&remote, "mhj");

    wait_until(&mut a, |s| s.remote_user().is_some()).await;
    let id = a.add(&draft("contested", None)).unwrap();
    wait_until(&mut b, |s| s.tasks().len() == 1).await;

    b.begin_edit(id);
    a.remove(id);
    wait_until(&mut b, |s| s.tasks().is_empty()).await;
    assert_eq!(b.editing(), None);
}

#[tokio::test(flavor = "multi_thread")]
async fn initial_snapshot_populates_a_late_joiner() {
    let remote = Arc::new(MemoryRemote::new());
    let mut a = remote_store(&remote, "mhj");
    wait_until(&mut a, |s| s.remote_user().is_some()).await;
    a.add(&draft("early", None)).unwrap();
    wait_until(&mut a, |s| s.tasks().len() == 1).await;

    let mut late = remote_store(&remote, "mhj");
    wait_until(&mut late, |s| s.tasks().len() == 1).await;
    assert_eq!(late.tasks()[0].name, "early");
}
