//! Authentication gate.
//!
//! Callers present `Authorization: Bearer <user-id>.<signature>`, where the
//! signature is the hex HMAC-SHA256 of the user id under the server secret.
//! [`require_auth`] resolves the caller before any schedule handler runs and
//! stores an [`AuthUser`] in the request extensions.

use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;
use uuid::Uuid;

use crate::state::AppState;
use crate::store::OwnerScope;
use crate::utils::error::AppError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("auth secret must not be empty")]
    EmptySecret,

    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Authorization header must use Bearer scheme")]
    WrongScheme,

    #[error("Malformed token")]
    Malformed,

    #[error("Invalid token signature")]
    BadSignature,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::AuthError(err.to_string())
    }
}

#[derive(Clone)]
pub struct TokenSigner {
    mac: HmacSha256,
}

impl TokenSigner {
    pub fn new(secret: &str) -> Result<Self, TokenError> {
        if secret.trim().is_empty() {
            return Err(TokenError::EmptySecret);
        }
        let mac =
            HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::EmptySecret)?;
        Ok(Self { mac })
    }

    pub fn issue(&self, user_id: Uuid) -> String {
        let subject = user_id.to_string();
        let signature = hex::encode(self.sign(&subject));
        format!("{subject}.{signature}")
    }

    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        let (subject, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let user_id = Uuid::parse_str(subject).map_err(|_| TokenError::Malformed)?;
        let expected = hex::decode(signature).map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac.clone();
        mac.update(subject.as_bytes());
        mac.verify_slice(&expected)
            .map_err(|_| TokenError::BadSignature)?;

        Ok(user_id)
    }

    fn sign(&self, subject: &str) -> Vec<u8> {
        let mut mac = self.mac.clone();
        mac.update(subject.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// Extracts the bearer token from the request headers.
fn bearer_token(headers: &HeaderMap) -> Result<&str, TokenError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(TokenError::MissingHeader)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(TokenError::WrongScheme)?
        .trim();

    if token.is_empty() {
        return Err(TokenError::Malformed);
    }
    Ok(token)
}

/// The resolved caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
}

impl AuthUser {
    /// The filter every schedule query for this caller runs under.
    pub fn scope(&self) -> OwnerScope {
        OwnerScope::new(self.id)
    }
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())?;
    let id = state.tokens.verify(token)?;

    tracing::debug!(user_id = %id, "Authenticated request");
    request.extensions_mut().insert(AuthUser { id });

    Ok(next.run(request).await)
}

/// Handlers behind [`require_auth`] take `AuthUser` directly. A route that
/// forgot the gate rejects instead of running unscoped.
#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or_else(|| AppError::AuthError("Not authenticated".to_string()))
    }
}
