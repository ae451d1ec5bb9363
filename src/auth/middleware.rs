use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::ServiceError;

/// Rejects requests without a valid access token and stores the caller in
/// the request extensions for the `AuthUser` extractor.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let secret = match req.app_data::<Data<Config>>() {
        Some(config) => config.jwt_secret.clone(),
        None => {
            let resp = ServiceError::Unauthorized("App config missing".into()).error_response();
            return Ok(req.into_response(resp));
        }
    };

    let token = match req
        .headers()
        .get("Authorization")
        .map(|h| h.to_str())
    {
        Some(Ok(value)) => match value.strip_prefix("Bearer ") {
            Some(t) => t.to_string(),
            None => {
                let resp = ServiceError::Unauthorized(
                    "Authorization header must start with Bearer".into(),
                )
                .error_response();
                return Ok(req.into_response(resp));
            }
        },
        Some(Err(_)) => {
            let resp =
                ServiceError::Unauthorized("Invalid Authorization header encoding".into())
                    .error_response();
            return Ok(req.into_response(resp));
        }
        None => {
            let resp =
                ServiceError::Unauthorized("Missing Authorization header".into()).error_response();
            return Ok(req.into_response(resp));
        }
    };

    let auth_user = match AuthUser::from_token(&token, &secret) {
        Ok(user) => user,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected token");
            return Ok(req.into_response(e.error_response()));
        }
    };

    req.extensions_mut().insert(auth_user);

    next.call(req).await
}
