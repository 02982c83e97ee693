//! Session context: auth state plus the resolved role
//!
//! Replaces an implicitly global auth subscription with an owned handle:
//! [`crate::Taskdeck::session`] spawns the driver task (init), dropping or
//! closing the handle aborts it (teardown). Consumers watch
//! [`AuthSnapshot`] values instead of polling the auth client.

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::auth::Session;
use crate::model::{Role, User};
use crate::Taskdeck;

/// Point-in-time view of the authenticated user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    pub user: Option<User>,
    pub role: Option<Role>,
    /// True until the first session lookup completes
    pub loading: bool,
}

/// Owned subscription to auth state changes
///
/// The driver task re-resolves the role on every session change and
/// publishes a fresh snapshot. Dropping the handle unsubscribes.
pub struct SessionHandle {
    snapshot_rx: watch::Receiver<AuthSnapshot>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub(crate) fn spawn(client: Taskdeck) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(AuthSnapshot {
            user: None,
            role: None,
            loading: true,
        });
        let mut session_rx = client.auth().subscribe();

        let task = tokio::spawn(async move {
            loop {
                let session = session_rx.borrow_and_update().clone();
                let snapshot = build_snapshot(&client, session).await;
                snapshot_tx.send_replace(snapshot);
                if session_rx.changed().await.is_err() {
                    break;
                }
            }
        });

        Self { snapshot_rx, task }
    }

    /// Watch for snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.snapshot_rx.clone()
    }

    /// The latest published snapshot
    pub fn snapshot(&self) -> AuthSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Stop the driver task
    pub fn close(self) {
        self.task.abort();
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn build_snapshot(client: &Taskdeck, session: Option<Session>) -> AuthSnapshot {
    let Some(session) = session else {
        return AuthSnapshot {
            user: None,
            role: None,
            loading: false,
        };
    };

    let role = resolve_role(client, &session.user.id).await;
    let user = User {
        id: session.user.id,
        email: session.user.email.unwrap_or_default(),
        role: Some(role),
    };
    AuthSnapshot {
        user: Some(user),
        role: Some(role),
        loading: false,
    }
}

/// Resolve the role from the `profiles` row keyed by user id
///
/// Fails open: a missing row, missing role, or lookup error all resolve to
/// `Role::User`. This is a known risk kept for compatibility; an attacker
/// who can break the profile lookup gets a regular user, not a lockout.
async fn resolve_role(client: &Taskdeck, user_id: &str) -> Role {
    #[derive(serde::Deserialize)]
    struct ProfileRow {
        #[serde(default)]
        role: Option<Role>,
    }

    let result = client
        .from("profiles")
        .select("role")
        .eq("id", user_id)
        .limit(1)
        .execute::<ProfileRow>()
        .await;

    match result {
        Ok(rows) => match rows.into_iter().next().and_then(|row| row.role) {
            Some(role) => role,
            None => {
                tracing::warn!(user_id, "profile missing or has no role, defaulting to user");
                Role::User
            }
        },
        Err(error) => {
            tracing::warn!(user_id, %error, "profile lookup failed, defaulting to user");
            Role::User
        }
    }
}
