//! Taskdeck client library
//!
//! Data access and client-side authorization for a task/project management
//! application backed by a hosted Supabase project. Persistence, identity
//! and row-level security stay with the backend; this crate wraps the auth
//! and PostgREST endpoints, resolves the caller's role, and enforces the
//! role rules before issuing writes.

pub mod auth;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod policy;
pub mod postgrest;
pub mod session;
pub mod store;

use std::sync::Arc;

use reqwest::Client;

use crate::auth::Auth;
use crate::config::Config;
use crate::policy::Actor;
use crate::postgrest::Table;
use crate::session::SessionHandle;
use crate::store::TaskStore;

pub use crate::error::Error;

/// The main entry point for the taskdeck client
///
/// Cheap to clone; clones share the HTTP client and session state.
#[derive(Clone)]
pub struct Taskdeck {
    inner: Arc<Inner>,
}

struct Inner {
    config: Config,
    http_client: Client,
    auth: Auth,
}

impl Taskdeck {
    /// Create a client from explicit credentials
    ///
    /// # Example
    ///
    /// ```
    /// use taskdeck::Taskdeck;
    ///
    /// let client = Taskdeck::new("https://your-project.supabase.co", "anon-key");
    /// ```
    pub fn new(url: &str, anon_key: &str) -> Self {
        Self::from_config(Config::new(url, anon_key))
    }

    /// Create a client from the environment (`SUPABASE_URL`,
    /// `SUPABASE_ANON_KEY`)
    ///
    /// Missing or placeholder values produce a degraded client that blocks
    /// sign-in and sign-up with a configuration error.
    pub fn from_env() -> Self {
        Self::from_config(Config::from_env())
    }

    /// Create a client from a prepared [`Config`]
    pub fn from_config(config: Config) -> Self {
        let http_client = Client::new();
        let auth = Auth::new(config.clone(), http_client.clone());
        Self {
            inner: Arc::new(Inner {
                config,
                http_client,
                auth,
            }),
        }
    }

    /// The active configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// The auth client
    pub fn auth(&self) -> &Auth {
        &self.inner.auth
    }

    /// Start a query against a table, attaching the current session token
    /// when one is present
    pub fn from(&self, table: &str) -> Table {
        let mut table = Table::new(
            &self.inner.config.url,
            &self.inner.config.anon_key,
            table,
            self.inner.http_client.clone(),
            self.inner.config.options.request_timeout,
        );
        if let Some(session) = self.inner.auth.get_session() {
            table = table.with_auth(&session.access_token);
        }
        table
    }

    /// Spawn a session context that tracks auth state changes and resolves
    /// the caller's role; dropping the handle tears the subscription down
    pub fn session(&self) -> SessionHandle {
        SessionHandle::spawn(self.clone())
    }

    /// A task/project store acting for `actor`
    pub fn store(&self, actor: Actor) -> TaskStore {
        TaskStore::new(self.clone(), actor)
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::{ClientOptions, Config};
    pub use crate::error::Error;
    pub use crate::filter::{TaskFilter, TaskStats};
    pub use crate::model::{
        NewProject, NewTask, Project, Role, Task, TaskPatch, TaskPriority, TaskStatus, User,
    };
    pub use crate::policy::Actor;
    pub use crate::Taskdeck;
}
