use jsonwebtoken::{DecodingKey, Validation, decode, errors::Error};

use crate::models::{Claims, TokenType};

/// Verifies an HS256 access token. Refresh tokens are refused here.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e: Error| e.to_string())?;

    if claims.token_type != TokenType::Access {
        return Err("not an access token".to_string());
    }
    Ok(claims)
}


#[cfg(test)]
mod tests {
    use super::testing::{access_token, sign};
    use super::*;
    use crate::model::role::Role;

    #[test]
    fn accepts_access_tokens() {
        let token = access_token(Role::Employee, Some("EMP1"), "secret");
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.employee_id.as_deref(), Some("EMP1"));
        assert_eq!(claims.role, 3);
    }

    #[test]
    fn refuses_refresh_tokens_and_wrong_secrets() {
        let refresh = sign(Role::Admin, None, TokenType::Refresh, "secret");
        assert!(verify_token(&refresh, "secret").is_err());
        let token = access_token(Role::Admin, None, "secret");
        assert!(verify_token(&token, "other").is_err());
    }
}
