use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::ServiceError;
use crate::model::role::Role;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<String>,
}

fn bearer(req: &HttpRequest) -> Result<&str, ServiceError> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| ServiceError::Unauthorized("Missing token".into()))
}

impl AuthUser {
    pub fn from_token(token: &str, secret: &str) -> Result<Self, ServiceError> {
        let claims = verify_token(token, secret)
            .map_err(|e| ServiceError::Unauthorized(format!("Invalid or expired token: {e}")))?;
        let role = Role::from_id(claims.role)
            .ok_or_else(|| ServiceError::Unauthorized("Invalid role".into()))?;
        Ok(AuthUser {
            user_id: claims.user_id,
            username: claims.sub,
            role,
            employee_id: claims.employee_id,
        })
    }

    fn decode(req: &HttpRequest) -> Result<Self, ServiceError> {
        // set by the auth middleware on protected routes
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return Ok(user.clone());
        }
        let config = req
            .app_data::<Data<Config>>()
            .ok_or_else(|| ServiceError::Unauthorized("Config missing".into()))?;
        Self::from_token(bearer(req)?, &config.jwt_secret)
    }

    pub fn require_manager(&self) -> Result<(), ServiceError> {
        if self.role.can_manage() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden("Admin/Employer only".into()))
        }
    }

    /// The caller's own employee id.
    pub fn own_employee_id(&self) -> Result<&str, ServiceError> {
        self.employee_id
            .as_deref()
            .ok_or_else(|| ServiceError::Forbidden("No employee profile".into()))
    }

    /// Whose records an operation targets. Employees always act for
    /// themselves; managers must name the employee.
    pub fn acting_for(&self, requested: Option<&str>) -> Result<String, ServiceError> {
        if self.role.can_manage() {
            return requested
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .ok_or_else(|| ServiceError::Validation("employee_id is required".into()));
        }
        let own = self.own_employee_id()?;
        match requested {
            Some(other) if other.trim() != own => Err(ServiceError::Forbidden(
                "Employees can only access their own records".into(),
            )),
            _ => Ok(own.to_string()),
        }
    }

    /// `None` for managers (every employee), the caller's id otherwise.
    pub fn owner_scope(&self) -> Result<Option<&str>, ServiceError> {
        if self.role.can_manage() {
            Ok(None)
        } else {
            self.own_employee_id().map(Some)
        }
    }
}

impl FromRequest for AuthUser {
    type Error = ServiceError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::decode(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn user(role: Role, employee_id: Option<&str>) -> AuthUser {
        AuthUser {
            user_id: 1,
            username: "someone".into(),
            role,
            employee_id: employee_id.map(str::to_string),
        }
    }

    #[rstest]
    #[case(None)]
    #[case(Some("EMP1"))]
    fn employees_act_for_themselves(#[case] requested: Option<&str>) {
        let emp = user(Role::Employee, Some("EMP1"));
        assert_eq!(emp.acting_for(requested).unwrap(), "EMP1");
    }

    #[rstest]
    fn employees_cannot_act_for_others() {
        let emp = user(Role::Employee, Some("EMP1"));
        assert!(matches!(emp.acting_for(Some("EMP2")), Err(ServiceError::Forbidden(_))));
    }

    #[rstest]
    #[case(Role::Admin)]
    #[case(Role::Employer)]
    fn managers_must_name_the_employee(#[case] role: Role) {
        let manager = user(role, None);
        assert_eq!(manager.acting_for(Some("EMP2")).unwrap(), "EMP2");
        assert!(matches!(manager.acting_for(None), Err(ServiceError::Validation(_))));
        assert_eq!(manager.owner_scope().unwrap(), None);
    }

    #[rstest]
    fn token_identity_is_carried_on_the_user() {
        use crate::auth::jwt::testing::access_token;

        let token = access_token(Role::Employee, Some("EMP1"), "secret");
        let user = AuthUser::from_token(&token, "secret").unwrap();
        assert_eq!(user.user_id, 1);
        assert_eq!(user.username, "EMP1");
        assert_eq!(user.employee_id.as_deref(), Some("EMP1"));
    }

    #[rstest]
    fn employee_without_profile_is_forbidden() {
        let emp = user(Role::Employee, None);
        assert!(matches!(emp.owner_scope(), Err(ServiceError::Forbidden(_))));
    }
}
