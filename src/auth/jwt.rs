use axum::extract::FromRef;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tracing::debug;

use super::{claims::Claims, error::AuthError};
use crate::{config::JwtConfig, state::AppState};

/// Verification material for bearer tokens.
#[derive(Clone)]
pub struct JwtKeys {
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
}

impl From<&JwtConfig> for JwtKeys {
    fn from(cfg: &JwtConfig) -> Self {
        Self {
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

impl JwtKeys {
    /// Checks signature, expiry, issuer and audience and returns the claims.
    /// Every failure collapses to [`AuthError::InvalidToken`].
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "jwt rejected");
            AuthError::InvalidToken
        })?;
        if data.claims.sub.is_empty() {
            debug!("jwt without subject");
            return Err(AuthError::InvalidToken);
        }
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}
