//! Role-based permission checks.

use crate::{
    AppState,
    api::models::users::{CurrentUser, Role},
    errors::{Error, Result},
    types::{Operation, Permission, Resource, UserId},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

/// Whether `role` is granted exactly `operation` on `resource`.
fn role_allows(role: Role, resource: Resource, operation: Operation) -> bool {
    use Operation::*;
    use Resource::*;

    match role {
        Role::Admin => true,
        Role::Manager => {
            matches!((resource, operation), (Analyses | Recommendations | Trends, ReadAll))
                || role_allows(Role::Operator, resource, operation)
        }
        Role::Operator => {
            matches!(
                (resource, operation),
                (Analyses, CreateOwn | UpdateOwn | DeleteOwn) | (Recommendations, UpdateOwn)
            ) || role_allows(Role::Viewer, resource, operation)
        }
        Role::Viewer => matches!(
            (resource, operation),
            (Users | Analyses | Recommendations | Trends, ReadOwn)
        ),
    }
}

/// The unrestricted counterpart of an `*Own` operation.
fn widened(operation: Operation) -> Option<Operation> {
    match operation {
        Operation::CreateOwn => Some(Operation::CreateAll),
        Operation::ReadOwn => Some(Operation::ReadAll),
        Operation::UpdateOwn => Some(Operation::UpdateAll),
        Operation::DeleteOwn => Some(Operation::DeleteAll),
        _ => None,
    }
}

/// Check whether a user may perform `operation` on `resource`.
///
/// Holding the `*All` form of an operation implies its `*Own` form.
pub fn has_permission(user: &CurrentUser, resource: Resource, operation: Operation) -> bool {
    role_allows(user.role, resource, operation)
        || widened(operation).is_some_and(|all| role_allows(user.role, resource, all))
}

/// Whether the user may see records belonging to other users.
pub fn can_read_all_resources(user: &CurrentUser, resource: Resource) -> bool {
    has_permission(user, resource, Operation::ReadAll)
}

/// Check access to a record owned by `owner`: own records need the `*Own` operation, anyone
/// else's need the `*All` operation.
pub fn can_access_owned(user: &CurrentUser, resource: Resource, own: Operation, owner: UserId) -> bool {
    if user.id == owner {
        has_permission(user, resource, own)
    } else {
        widened(own).is_some_and(|all| has_permission(user, resource, all))
    }
}

/// Resolve whose records a list request targets: the caller unless another user is named, which
/// requires `ReadAll` on the resource.
pub fn target_user(user: &CurrentUser, requested: Option<UserId>, resource: Resource) -> Result<UserId> {
    match requested {
        Some(other) if other != user.id && !can_read_all_resources(user, resource) => Err(Error::InsufficientPermissions {
            required: Permission(resource, Operation::ReadAll),
            action: Operation::ReadAll,
            resource: format!("other users' {resource}"),
        }),
        Some(other) => Ok(other),
        None => Ok(user.id),
    }
}

pub trait ResourceMarker {
    const RESOURCE: Resource;
}

pub trait OperationMarker {
    const OPERATION: Operation;
}

/// Type-level resources for [`RequiresPermission`].
pub mod resource {
    use super::ResourceMarker;
    use crate::types::Resource;

    pub struct Users;
    pub struct Analyses;
    pub struct Recommendations;
    pub struct Trends;

    impl ResourceMarker for Users {
        const RESOURCE: Resource = Resource::Users;
    }
    impl ResourceMarker for Analyses {
        const RESOURCE: Resource = Resource::Analyses;
    }
    impl ResourceMarker for Recommendations {
        const RESOURCE: Resource = Resource::Recommendations;
    }
    impl ResourceMarker for Trends {
        const RESOURCE: Resource = Resource::Trends;
    }
}

/// Type-level operations for [`RequiresPermission`].
pub mod operation {
    use super::OperationMarker;
    use crate::types::Operation;

    pub struct CreateOwn;
    pub struct ReadAll;
    pub struct ReadOwn;
    pub struct UpdateAll;
    pub struct UpdateOwn;
    pub struct DeleteOwn;

    impl OperationMarker for CreateOwn {
        const OPERATION: Operation = Operation::CreateOwn;
    }
    impl OperationMarker for ReadAll {
        const OPERATION: Operation = Operation::ReadAll;
    }
    impl OperationMarker for ReadOwn {
        const OPERATION: Operation = Operation::ReadOwn;
    }
    impl OperationMarker for UpdateAll {
        const OPERATION: Operation = Operation::UpdateAll;
    }
    impl OperationMarker for UpdateOwn {
        const OPERATION: Operation = Operation::UpdateOwn;
    }
    impl OperationMarker for DeleteOwn {
        const OPERATION: Operation = Operation::DeleteOwn;
    }
}

/// Extractor that authenticates the caller and rejects with 403 unless their role grants
/// operation `O` on resource `R`.
pub struct RequiresPermission<R, O> {
    pub user: CurrentUser,
    _marker: PhantomData<fn() -> (R, O)>,
}

impl<R, O> FromRequestParts<AppState> for RequiresPermission<R, O>
where
    R: ResourceMarker,
    O: OperationMarker,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !has_permission(&user, R::RESOURCE, O::OPERATION) {
            return Err(Error::InsufficientPermissions {
                required: Permission(R::RESOURCE, O::OPERATION),
                action: O::OPERATION,
                resource: R::RESOURCE.to_string(),
            });
        }

        Ok(Self {
            user,
            _marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(role: Role) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: format!("{role:?}@example.com").to_lowercase(),
            display_name: None,
            role,
        }
    }

    #[test]
    fn viewer_only_reads_own_records() {
        let viewer = user(Role::Viewer);
        assert!(has_permission(&viewer, Resource::Analyses, Operation::ReadOwn));
        assert!(has_permission(&viewer, Resource::Trends, Operation::ReadOwn));
        assert!(!has_permission(&viewer, Resource::Analyses, Operation::CreateOwn));
        assert!(!has_permission(&viewer, Resource::Recommendations, Operation::UpdateOwn));
        assert!(!has_permission(&viewer, Resource::Analyses, Operation::ReadAll));
    }

    #[test]
    fn operator_manages_own_analyses() {
        let operator = user(Role::Operator);
        for op in [Operation::CreateOwn, Operation::UpdateOwn, Operation::DeleteOwn, Operation::ReadOwn] {
            assert!(has_permission(&operator, Resource::Analyses, op), "{op:?}");
        }
        assert!(has_permission(&operator, Resource::Recommendations, Operation::UpdateOwn));
        assert!(!has_permission(&operator, Resource::Analyses, Operation::ReadAll));
        assert!(!has_permission(&operator, Resource::Users, Operation::ReadAll));
    }

    #[test]
    fn manager_reads_everything_but_users() {
        let manager = user(Role::Manager);
        assert!(can_read_all_resources(&manager, Resource::Analyses));
        assert!(can_read_all_resources(&manager, Resource::Recommendations));
        assert!(can_read_all_resources(&manager, Resource::Trends));
        assert!(!can_read_all_resources(&manager, Resource::Users));
        assert!(!has_permission(&manager, Resource::Analyses, Operation::DeleteAll));
    }

    #[test]
    fn admin_has_every_permission() {
        let admin = user(Role::Admin);
        assert!(has_permission(&admin, Resource::Users, Operation::UpdateAll));
        assert!(has_permission(&admin, Resource::Analyses, Operation::DeleteAll));
    }

    #[test]
    fn ownership_decides_between_own_and_all() {
        let operator = user(Role::Operator);
        let manager = user(Role::Manager);
        let someone_else = Uuid::new_v4();

        assert!(can_access_owned(&operator, Resource::Analyses, Operation::ReadOwn, operator.id));
        assert!(!can_access_owned(&operator, Resource::Analyses, Operation::ReadOwn, someone_else));
        assert!(can_access_owned(&manager, Resource::Analyses, Operation::ReadOwn, someone_else));
        // Managers read other users' analyses but cannot change them
        assert!(!can_access_owned(&manager, Resource::Analyses, Operation::UpdateOwn, someone_else));
        assert!(can_access_owned(&user(Role::Admin), Resource::Analyses, Operation::DeleteOwn, someone_else));
    }

    #[test]
    fn target_user_defaults_to_caller() {
        let operator = user(Role::Operator);
        let manager = user(Role::Manager);
        let someone_else = Uuid::new_v4();

        assert_eq!(target_user(&operator, None, Resource::Trends).unwrap(), operator.id);
        assert_eq!(target_user(&operator, Some(operator.id), Resource::Trends).unwrap(), operator.id);
        assert!(matches!(
            target_user(&operator, Some(someone_else), Resource::Trends),
            Err(Error::InsufficientPermissions { .. })
        ));
        assert_eq!(target_user(&manager, Some(someone_else), Resource::Recommendations).unwrap(), someone_else);
        assert!(target_user(&manager, Some(someone_else), Resource::Users).is_err());
    }
}
