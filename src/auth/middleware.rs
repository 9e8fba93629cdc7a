use std::fmt;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use super::{error::AuthError, jwt::JwtKeys};

/// Identity of the authenticated caller. Only the auth stage creates one, so
/// its presence in the request extensions proves the token was validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(String);

impl UserId {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Expects `Authorization: Bearer <token>` with exactly two whitespace
/// separated parts; the scheme is matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MalformedHeader),
    }
}

pub fn authenticate(headers: &HeaderMap, keys: &JwtKeys) -> Result<UserId, AuthError> {
    let token = bearer_token(headers)?;
    let claims = keys.validate(token)?;
    Ok(UserId::new(claims.sub))
}

/// Authentication stage. Rejects with 401 before the handler runs; on success
/// the caller's [`UserId`] is attached to the request.
pub async fn require_auth(
    State(keys): State<JwtKeys>,
    mut req: Request,
    next: Next,
) -> Response {
    match authenticate(req.headers(), &keys) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(e) => {
            warn!(reason = %e, "unauthorized request");
            e.into_response()
        }
    }
}
