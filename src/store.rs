//! Task and project data access
//!
//! The store fetches role-filtered task/project collections, caches the
//! latest snapshot, and gates every mutation through
//! [`crate::policy::check`]. Successful mutations trigger a full re-fetch
//! rather than patching the cache; a failed re-fetch after a successful
//! mutation is logged, not raised, so the mutation result is never masked.

use std::sync::RwLock;

use serde::Serialize;

use crate::error::Error;
use crate::model::{NewProject, NewTask, Project, Role, Task, TaskPatch};
use crate::policy::{self, Action, Actor};
use crate::postgrest::SortOrder;
use crate::Taskdeck;

/// Role-aware access to the `tasks` and `projects` tables
pub struct TaskStore {
    client: Taskdeck,
    actor: Actor,
    tasks: RwLock<Vec<Task>>,
    projects: RwLock<Vec<Project>>,
}

impl TaskStore {
    pub fn new(client: Taskdeck, actor: Actor) -> Self {
        Self {
            client,
            actor,
            tasks: RwLock::new(Vec::new()),
            projects: RwLock::new(Vec::new()),
        }
    }

    /// The caller this store acts for
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// The cached task list, newest first
    pub fn tasks(&self) -> Vec<Task> {
        self.tasks.read().unwrap().clone()
    }

    /// The cached project list, newest first
    pub fn projects(&self) -> Vec<Project> {
        self.projects.read().unwrap().clone()
    }

    /// Fetch the tasks visible to the actor and replace the cache
    ///
    /// Users see tasks assigned to their email; admins see tasks they
    /// created (`user_id` filter), not every admin's tasks.
    pub async fn refresh_tasks(&self) -> Result<(), Error> {
        let mut query = self.client.from("tasks").select("*");
        query = match self.actor.role {
            Role::User => query.eq("assigned_to", &self.actor.email),
            Role::Admin => query.eq("user_id", &self.actor.user_id),
        };
        let fetched: Vec<Task> = query
            .order("created_at", SortOrder::Descending)
            .execute()
            .await?;

        *self.tasks.write().unwrap() = fetched;
        Ok(())
    }

    /// Fetch all projects, visible to any authenticated caller
    pub async fn refresh_projects(&self) -> Result<(), Error> {
        let fetched: Vec<Project> = self
            .client
            .from("projects")
            .select("*")
            .order("created_at", SortOrder::Descending)
            .execute()
            .await?;

        *self.projects.write().unwrap() = fetched;
        Ok(())
    }

    /// Create a task owned by the actor; admin-only
    pub async fn create_task(&self, task: NewTask) -> Result<Task, Error> {
        policy::check(&self.actor, Action::CreateTask).into_result()?;

        #[derive(Serialize)]
        struct InsertTask<'a> {
            #[serde(flatten)]
            task: &'a NewTask,
            user_id: &'a str,
        }

        let rows: Vec<Task> = self
            .client
            .from("tasks")
            .insert(&[InsertTask {
                task: &task,
                user_id: &self.actor.user_id,
            }])
            .await?;
        let created = rows
            .into_iter()
            .next()
            .ok_or_else(|| Error::general("insert returned no rows"))?;

        self.refetch_tasks_after_mutation().await;
        Ok(created)
    }

    /// Update a task
    ///
    /// Two authorization paths: a status-only patch by the task's assignee
    /// is allowed regardless of role; anything else requires admin. The
    /// assignee is looked up in the cached task list, so the decision is
    /// made from already-fetched state.
    pub async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<Task, Error> {
        let assigned_to = {
            let tasks = self.tasks.read().unwrap();
            tasks
                .iter()
                .find(|task| task.id == id)
                .map(|task| task.assigned_to.clone())
        };

        policy::check(
            &self.actor,
            Action::UpdateTask {
                status_only: patch.is_status_only(),
                assigned_to: assigned_to.as_deref().unwrap_or(""),
            },
        )
        .into_result()?;

        let rows: Vec<Task> = self
            .client
            .from("tasks")
            .eq("id", id)
            .update(&patch)
            .await?;
        let updated = rows
            .into_iter()
            .next()
            .ok_or_else(|| Error::general("update returned no rows"))?;

        self.refetch_tasks_after_mutation().await;
        Ok(updated)
    }

    /// Delete a task; admin-only
    pub async fn delete_task(&self, id: &str) -> Result<(), Error> {
        policy::check(&self.actor, Action::DeleteTask).into_result()?;

        self.client.from("tasks").eq("id", id).delete().await?;

        self.refetch_tasks_after_mutation().await;
        Ok(())
    }

    /// Create a project owned by the actor; admin-only
    pub async fn create_project(&self, project: NewProject) -> Result<Project, Error> {
        policy::check(&self.actor, Action::CreateProject).into_result()?;

        #[derive(Serialize)]
        struct InsertProject<'a> {
            #[serde(flatten)]
            project: &'a NewProject,
            user_id: &'a str,
        }

        let rows: Vec<Project> = self
            .client
            .from("projects")
            .insert(&[InsertProject {
                project: &project,
                user_id: &self.actor.user_id,
            }])
            .await?;
        let created = rows
            .into_iter()
            .next()
            .ok_or_else(|| Error::general("insert returned no rows"))?;

        if let Err(error) = self.refresh_projects().await {
            tracing::error!(%error, "failed to refresh projects after mutation");
        }
        Ok(created)
    }

    /// Known assignee emails from the `user_emails` table, ascending
    pub async fn user_emails(&self) -> Result<Vec<String>, Error> {
        #[derive(serde::Deserialize)]
        struct EmailRow {
            email: String,
        }

        let rows: Vec<EmailRow> = self
            .client
            .from("user_emails")
            .select("email")
            .order("email", SortOrder::Ascending)
            .execute()
            .await?;
        Ok(rows.into_iter().map(|row| row.email).collect())
    }

    async fn refetch_tasks_after_mutation(&self) {
        if let Err(error) = self.refresh_tasks().await {
            tracing::error!(%error, "failed to refresh tasks after mutation");
        }
    }
}
