use super::model::{AuthenticatedUser, Role};
use crate::core::config::AuthConfig;
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

/// Validates HS256 access tokens issued by the identity service.
pub struct JwtValidator {
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,
    role: String,
    #[serde(rename = "iss")]
    _iss: String,
    #[serde(rename = "exp")]
    _exp: u64,
}

impl JwtValidator {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            leeway: config.jwt_leeway.as_secs(),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        if header.alg != Algorithm::HS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only HS256 is allowed",
                header.alg
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let claims = token_data.claims;
        let role = Role::from_claim(&claims.role)
            .ok_or_else(|| AppError::Auth(format!("Unknown role claim '{}'", claims.role)))?;

        Ok(AuthenticatedUser {
            user_id: claims.sub,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;
    use std::time::Duration;

    const SECRET: &str = "test-secret-that-is-at-least-32-bytes-long";

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        role: &'a str,
        iss: &'a str,
        aud: &'a str,
        exp: u64,
    }

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: SECRET.to_string(),
            issuer: "storefront-auth".to_string(),
            audience: "storefront-api".to_string(),
            jwt_leeway: Duration::from_secs(0),
        }
    }

    fn sign(role: &str, iss: &str, secret: &str) -> String {
        let exp = (chrono::Utc::now().timestamp() + 3600) as u64;
        let claims = TestClaims {
            sub: "user-42",
            role,
            iss,
            aud: "storefront-api",
            exp,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_admin_token() {
        let validator = JwtValidator::new(&config());
        let user = validator
            .validate_token(&sign("admin", "storefront-auth", SECRET))
            .unwrap();
        assert_eq!(user.user_id, "user-42");
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let validator = JwtValidator::new(&config());
        let token = sign("admin", "storefront-auth", "another-secret-that-is-32-bytes-long!!");
        assert!(matches!(
            validator.validate_token(&token),
            Err(AppError::Auth(_))
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let validator = JwtValidator::new(&config());
        let token = sign("admin", "someone-else", SECRET);
        assert!(validator.validate_token(&token).is_err());
    }

    #[test]
    fn test_unknown_role_rejected() {
        let validator = JwtValidator::new(&config());
        let token = sign("superuser", "storefront-auth", SECRET);
        assert!(matches!(
            validator.validate_token(&token),
            Err(AppError::Auth(_))
        ));
    }
}
