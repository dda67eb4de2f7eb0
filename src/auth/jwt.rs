use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::models::Role;

#[derive(Clone)]
pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    expiry: Duration,
}

impl JwtService {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            expiry: Duration::days(config.jwt_expiry_days),
        })
    }

    pub fn issue_token(&self, user_id: Uuid, role: Role) -> Result<String> {
        let now = Utc::now();
        let exp = now + self.expiry;
        let claims = Claims {
            sub: user_id,
            role,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(&[self.audience.clone()]);
        validation.set_issuer(&[self.issuer.clone()]);
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub iss: String,
    pub aud: String,
    pub iat: usize,
    pub exp: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_config() -> AppConfig {
        AppConfig {
            database_url: "postgres://localhost/unused".to_string(),
            database_max_pool_size: 1,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            jwt_secret: "unit-test-secret".to_string(),
            jwt_issuer: "test-issuer".to_string(),
            jwt_audience: "test-audience".to_string(),
            jwt_expiry_days: 7,
            upload_dir: PathBuf::from("uploads"),
            cors_allowed_origin: None,
        }
    }

    #[test]
    fn issued_token_verifies_with_same_identity() {
        let jwt = JwtService::from_config(&test_config()).unwrap();
        let user_id = Uuid::new_v4();

        let token = jwt.issue_token(user_id, Role::DeliveryBoy).unwrap();
        let claims = jwt.verify_token(&token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::DeliveryBoy);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut config = test_config();
        config.jwt_expiry_days = -1;
        let jwt = JwtService::from_config(&config).unwrap();

        let token = jwt.issue_token(Uuid::new_v4(), Role::Volunteer).unwrap();
        assert!(jwt.verify_token(&token).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let jwt = JwtService::from_config(&test_config()).unwrap();
        let other = JwtService::from_config(&AppConfig {
            jwt_secret: "different-secret".to_string(),
            ..test_config()
        })
        .unwrap();

        let token = other.issue_token(Uuid::new_v4(), Role::Admin).unwrap();
        assert!(jwt.verify_token(&token).is_err());
    }
}
