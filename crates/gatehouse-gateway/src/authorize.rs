//! Strict self-access authorization
//!
//! A protected resource under `/users/:id` may only be touched by the
//! identity whose id is in the path. There are no roles and no overrides.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use gatehouse_core::audit::{audit_log, extract_ip_address, AuditEvent};
use gatehouse_core::GatehouseError;
use uuid::Uuid;

use crate::gate::AuthenticatedUser;

/// Allow the request only if `resource_owner` is the caller's own id
pub fn authorize_self_access(
    user: &AuthenticatedUser,
    resource_owner: &str,
) -> Result<Uuid, GatehouseError> {
    match Uuid::parse_str(resource_owner) {
        Ok(owner) if owner == user.user_id => Ok(owner),
        _ => Err(GatehouseError::Forbidden),
    }
}

/// Path id of a resource the caller is entitled to
///
/// Extracting this runs [`authorize_self_access`] against the `:id` path
/// segment, so a handler taking `SelfAccess(id)` only runs for its owner.
#[derive(Debug, Clone, Copy)]
pub struct SelfAccess(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for SelfAccess
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let Path(owner) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| GatehouseError::Forbidden.into_response())?;

        authorize_self_access(&user, &owner)
            .map(SelfAccess)
            .map_err(|e| {
                audit_log(&AuditEvent::AccessDenied {
                    user_id: user.user_id,
                    resource: parts.uri.path().to_string(),
                    ip_address: extract_ip_address(&parts.headers),
                });
                e.into_response()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_resource_allowed() {
        let user = AuthenticatedUser {
            user_id: Uuid::new_v4(),
        };
        assert_eq!(
            authorize_self_access(&user, &user.user_id.to_string()).unwrap(),
            user.user_id
        );
    }

    #[test]
    fn test_other_resource_forbidden() {
        let user = AuthenticatedUser {
            user_id: Uuid::new_v4(),
        };
        let other = Uuid::new_v4().to_string();
        assert!(matches!(
            authorize_self_access(&user, &other),
            Err(GatehouseError::Forbidden)
        ));
    }

    #[test]
    fn test_unparseable_owner_forbidden() {
        let user = AuthenticatedUser {
            user_id: Uuid::new_v4(),
        };
        assert!(matches!(
            authorize_self_access(&user, "me"),
            Err(GatehouseError::Forbidden)
        ));
        assert!(matches!(
            authorize_self_access(&user, ""),
            Err(GatehouseError::Forbidden)
        ));
    }
}
