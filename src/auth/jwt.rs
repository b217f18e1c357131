use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::{configuration::JwtSettings, models::{User, UserRole}};

// Signs and verifies the two token kinds: short-lived access tokens carrying
// identity claims, and long-lived refresh tokens carrying only the user id.
// The two kinds use separate secrets, so one can never stand in for the other.
#[derive(Clone)]
pub struct Tokenizer {
    access_secret: SecretString,
    refresh_secret: SecretString,
    pub access_expiry_minutes: u64,
    pub refresh_expiry_days: u64,
}

impl Tokenizer {
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            access_secret: SecretString::new(settings.access_secret.clone().into()),
            refresh_secret: SecretString::new(settings.refresh_secret.clone().into()),
            access_expiry_minutes: settings.access_expiry_minutes,
            refresh_expiry_days: settings.refresh_expiry_days,
        }
    }

    pub fn generate_access_token(&self, user_id: i32, email: String, role: UserRole) -> String {
        let expiry = Utc::now() + Duration::minutes(self.access_expiry_minutes as i64);

        let claims = AccessClaims {
            sub: user_id,
            exp: expiry.timestamp() as usize,
            email,
            role,
        };

        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.access_secret.expose_secret().as_bytes()),
        )
        .unwrap()
    }

    pub fn generate_refresh_token(&self, user_id: i32) -> String {
        let expiry = Utc::now() + Duration::days(self.refresh_expiry_days as i64);

        let claims = RefreshClaims {
            sub: user_id,
            exp: expiry.timestamp() as usize,
        };

        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.refresh_secret.expose_secret().as_bytes()),
        )
        .unwrap()
    }

    pub fn generate_token_pair(&self, user: &User) -> TokenPair {
        TokenPair {
            access_token: self.generate_access_token(user.id, user.email.clone(), user.role),
            refresh_token: self.generate_refresh_token(user.id),
        }
    }

    pub fn decode_access_token(&self, token: String) -> Option<AccessClaims> {
        match jsonwebtoken::decode::<AccessClaims>(
            &token,
            &DecodingKey::from_secret(self.access_secret.expose_secret().as_bytes()),
            &Validation::new(Algorithm::HS256),
        ) {
            Ok(decoded_data) => Some(decoded_data.claims),
            Err(_) => None,
        }
    }

    pub fn decode_refresh_token(&self, token: String) -> Option<RefreshClaims> {
        match jsonwebtoken::decode::<RefreshClaims>(
            &token,
            &DecodingKey::from_secret(self.refresh_secret.expose_secret().as_bytes()),
            &Validation::new(Algorithm::HS256),
        ) {
            Ok(decoded_data) => Some(decoded_data.claims),
            Err(_) => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: i32,
    pub exp: usize,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: i32,
    pub exp: usize,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
