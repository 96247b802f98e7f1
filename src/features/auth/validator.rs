use super::model::AuthenticatedUser;
use crate::core::config::AuthConfig;
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

/// Verifies HS256 bearer tokens minted by the session provider
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    sub: String,
    #[serde(rename = "exp")]
    _exp: u64,
    #[serde(default)]
    roles: Vec<String>,
}

impl JwtValidator {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.jwt_leeway.as_secs();
        validation.validate_nbf = true;
        match &config.issuer {
            Some(issuer) => validation.set_issuer(&[issuer]),
            None => validation.iss = None,
        }
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
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

        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        Ok(AuthenticatedUser {
            sub: token_data.claims.sub,
            roles: token_data.claims.roles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;
    use std::time::Duration;

    #[derive(Serialize)]
    struct TestClaims<'a> {
        sub: &'a str,
        exp: u64,
        roles: Vec<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        aud: Option<&'a str>,
    }

    fn config(audience: Option<&str>) -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            issuer: None,
            audience: audience.map(str::to_string),
            jwt_leeway: Duration::from_secs(0),
        }
    }

    fn future_exp() -> u64 {
        (chrono::Utc::now().timestamp() + 3600) as u64
    }

    fn token(secret: &str, claims: &TestClaims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_yields_user_with_roles() {
        let validator = JwtValidator::new(&config(None));
        let claims = TestClaims {
            sub: "user-1",
            exp: future_exp(),
            roles: vec!["admin"],
            aud: None,
        };
        let user = validator
            .validate_token(&token("test-secret", &claims))
            .unwrap();
        assert_eq!(user.sub, "user-1");
        assert!(user.is_admin());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let validator = JwtValidator::new(&config(None));
        let claims = TestClaims {
            sub: "user-1",
            exp: future_exp(),
            roles: vec![],
            aud: None,
        };
        let result = validator.validate_token(&token("other-secret", &claims));
        assert!(matches!(result, Err(AppError::Auth(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let validator = JwtValidator::new(&config(None));
        let claims = TestClaims {
            sub: "user-1",
            exp: 1_000,
            roles: vec![],
            aud: None,
        };
        assert!(validator
            .validate_token(&token("test-secret", &claims))
            .is_err());
    }

    #[test]
    fn test_audience_is_checked_when_configured() {
        let validator = JwtValidator::new(&config(Some("role-mark")));
        let wrong = TestClaims {
            sub: "user-1",
            exp: future_exp(),
            roles: vec![],
            aud: Some("elsewhere"),
        };
        assert!(validator
            .validate_token(&token("test-secret", &wrong))
            .is_err());

        let right = TestClaims {
            aud: Some("role-mark"),
            ..wrong
        };
        assert!(validator
            .validate_token(&token("test-secret", &right))
            .is_ok());
    }
}
