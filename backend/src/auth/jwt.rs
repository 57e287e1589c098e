use jsonwebtoken::{decode, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Claims issued by the identity provider. Anything beyond `sub` and `exp` is ignored.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
}

pub fn verify_token(token: &str, config: &Config) -> AppResult<TokenData<Claims>> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AppError::Unauthorized
    })
}

#[cfg(test)]
pub fn sign_token(user_id: Uuid, ttl_secs: i64, secret: &str) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = Claims {
        sub: user_id,
        exp: chrono::Utc::now().timestamp() + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_config;

    #[test]
    fn test_verify_roundtrip() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let token = sign_token(user_id, 600, &config.jwt_secret);
        let data = verify_token(&token, &config).unwrap();
        assert_eq!(data.claims.sub, user_id);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let config = test_config();
        let token = sign_token(Uuid::new_v4(), 600, "not-the-secret");
        assert!(matches!(
            verify_token(&token, &config),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = test_config();
        // Past the default 60s leeway.
        let token = sign_token(Uuid::new_v4(), -600, &config.jwt_secret);
        assert!(verify_token(&token, &config).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let config = test_config();
        assert!(verify_token("abc.def.ghi", &config).is_err());
    }
}
