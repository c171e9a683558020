use crate::model::role::Role;
use actix_web::{
    FromRequest, HttpMessage, HttpRequest,
    dev::Payload,
    error::{ErrorForbidden, ErrorUnauthorized},
};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
}

/// Only `auth_middleware` creates an `AuthUser`, after it has checked that the
/// bearer token is an access token. Outside the protected scope there is no
/// caller to extract.
impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<AuthUser>()
                .cloned()
                .ok_or_else(|| ErrorUnauthorized("Not authenticated")),
        )
    }
}

impl AuthUser {
    /// Any signed-in role: USER, MODERATOR or ADMIN.
    pub fn require_user(&self) -> actix_web::Result<()> {
        if matches!(self.role, Role::User | Role::Moderator | Role::Admin) {
            Ok(())
        } else {
            Err(ErrorForbidden("Access denied"))
        }
    }

    pub fn require_moderator_or_admin(&self) -> actix_web::Result<()> {
        if matches!(self.role, Role::Moderator | Role::Admin) {
            Ok(())
        } else {
            Err(ErrorForbidden("Moderator/Admin only"))
        }
    }

    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ErrorForbidden("Admin only"))
        }
    }
}
