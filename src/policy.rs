//! Authorization policy
//!
//! Every mutator consults [`check`] instead of branching on the role
//! inline, so the rules live in one place:
//!
//! - only admins create projects, create tasks, delete tasks, or update
//!   arbitrary task fields;
//! - a task's assignee (matched by email) may update the status, and
//!   nothing else, regardless of role.

use crate::error::Error;
use crate::model::Role;

/// The caller on whose behalf the store operates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: &str, email: &str, role: Role) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: email.to_string(),
            role,
        }
    }
}

/// A mutation subject to authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    CreateTask,
    UpdateTask {
        /// Whether the patch touches only the status field
        status_only: bool,
        /// The email the task is assigned to
        assigned_to: &'a str,
    },
    DeleteTask,
    CreateProject,
}

/// Outcome of a policy check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(&'static str),
}

impl Decision {
    /// Convert a denial into [`Error::Forbidden`] with the reason
    pub fn into_result(self) -> Result<(), Error> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(Error::forbidden(reason)),
        }
    }
}

/// Decide whether `actor` may perform `action`
pub fn check(actor: &Actor, action: Action<'_>) -> Decision {
    match action {
        Action::CreateTask => admin_only(actor, "Only admin can create tasks"),
        Action::UpdateTask {
            status_only,
            assigned_to,
        } => {
            if status_only && assigned_to == actor.email {
                Decision::Allow
            } else {
                admin_only(actor, "Only admin can update tasks")
            }
        }
        Action::DeleteTask => admin_only(actor, "Only admin can delete tasks"),
        Action::CreateProject => admin_only(actor, "Only admin can create projects"),
    }
}

fn admin_only(actor: &Actor, reason: &'static str) -> Decision {
    if actor.role == Role::Admin {
        Decision::Allow
    } else {
        Decision::Deny(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Actor {
        Actor::new("admin-1", "alice@x.com", Role::Admin)
    }

    fn bob() -> Actor {
        Actor::new("user-1", "bob@x.com", Role::User)
    }

    #[test]
    fn admin_may_do_everything() {
        let actor = admin();
        assert_eq!(check(&actor, Action::CreateTask), Decision::Allow);
        assert_eq!(check(&actor, Action::DeleteTask), Decision::Allow);
        assert_eq!(check(&actor, Action::CreateProject), Decision::Allow);
        assert_eq!(
            check(
                &actor,
                Action::UpdateTask {
                    status_only: false,
                    assigned_to: "someone-else@x.com"
                }
            ),
            Decision::Allow
        );
    }

    #[test]
    fn non_admin_mutations_are_denied() {
        let actor = bob();
        assert_eq!(
            check(&actor, Action::CreateTask),
            Decision::Deny("Only admin can create tasks")
        );
        assert_eq!(
            check(&actor, Action::DeleteTask),
            Decision::Deny("Only admin can delete tasks")
        );
        assert_eq!(
            check(&actor, Action::CreateProject),
            Decision::Deny("Only admin can create projects")
        );
    }

    #[test]
    fn assignee_may_update_status_only() {
        let actor = bob();
        assert_eq!(
            check(
                &actor,
                Action::UpdateTask {
                    status_only: true,
                    assigned_to: "bob@x.com"
                }
            ),
            Decision::Allow
        );
    }

    #[test]
    fn assignee_may_not_update_other_fields() {
        let actor = bob();
        assert_eq!(
            check(
                &actor,
                Action::UpdateTask {
                    status_only: false,
                    assigned_to: "bob@x.com"
                }
            ),
            Decision::Deny("Only admin can update tasks")
        );
    }

    #[test]
    fn non_assignee_may_not_update_status() {
        let actor = bob();
        assert_eq!(
            check(
                &actor,
                Action::UpdateTask {
                    status_only: true,
                    assigned_to: "carol@x.com"
                }
            ),
            Decision::Deny("Only admin can update tasks")
        );
    }

    #[test]
    fn denial_converts_to_forbidden_error() {
        let err = check(&bob(), Action::CreateTask).into_result().unwrap_err();
        assert_eq!(err.to_string(), "Only admin can create tasks");
    }
}
