use uuid::Uuid;

use crate::{auth::AuthUser, error::ApiError, models::Role};

/// Action
///
/// Every role-gated operation the API exposes. The whole authorization
/// surface of the application is this enumeration plus one static table;
/// there are no per-route role comparisons anywhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateCategory,
    ReadCategories,
    CreateContent,
    ReadContent,
    UpdateContent,
    DeleteContent,
}

const ANY_AUTHENTICATED: &[Role] = &[Role::Admin, Role::Reader, Role::Creator];

/// The static role table. Kept as one function so the mapping reads like
/// the access-control matrix it is.
fn allowed_roles(action: Action) -> &'static [Role] {
    match action {
        Action::CreateCategory => &[Role::Admin],
        Action::ReadCategories => ANY_AUTHENTICATED,
        Action::CreateContent => &[Role::Admin, Role::Creator],
        Action::ReadContent => ANY_AUTHENTICATED,
        Action::UpdateContent => &[Role::Admin, Role::Creator],
        Action::DeleteContent => &[Role::Admin],
    }
}

/// Decides allow/deny for an authenticated identity and a requested action.
///
/// Two rules apply:
/// 1. the identity's role must be in the action's allowed set;
/// 2. for UpdateContent, a Creator may only touch content they own;
///    `resource_owner` carries the content's creator id for that check.
///    Admins bypass the ownership rule.
pub fn authorize(
    user: &AuthUser,
    action: Action,
    resource_owner: Option<Uuid>,
) -> Result<(), ApiError> {
    if !allowed_roles(action).contains(&user.role) {
        return Err(ApiError::Authorization("access denied".to_string()));
    }

    if action == Action::UpdateContent && user.role == Role::Creator {
        if let Some(owner) = resource_owner {
            if owner != user.id {
                return Err(ApiError::Authorization(
                    "you can only update your own content".to_string(),
                ));
            }
        }
    }

    Ok(())
}
