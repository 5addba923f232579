use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Basic, Authorization},
    TypedHeader,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::handlers::ErrorResponse;
use crate::AppState;

/// Users and bcrypt hashes loaded from an htpasswd file
#[derive(Debug, Clone, Default)]
pub struct Htpasswd {
    users: HashMap<String, String>,
}

impl Htpasswd {
    pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read htpasswd file {}: {}", path.display(), e))?;
        let htpasswd = Self::parse(&content);
        tracing::info!("Loaded {} htpasswd users", htpasswd.users.len());
        Ok(htpasswd)
    }

    /// `user:hash` per line. Only bcrypt hashes are kept.
    pub fn parse(content: &str) -> Self {
        let mut users = HashMap::new();
        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((user, hash)) = line.split_once(':') else {
                continue;
            };
            if !["$2y$", "$2b$", "$2a$"].iter().any(|p| hash.starts_with(p)) {
                tracing::warn!(user, "Skipping htpasswd entry without a bcrypt hash");
                continue;
            }
            users.insert(user.to_string(), hash.to_string());
        }
        Self { users }
    }

    pub fn verify(&self, user: &str, password: &str) -> bool {
        self.users
            .get(user)
            .map(|hash| bcrypt::verify(password, hash).unwrap_or(false))
            .unwrap_or(false)
    }
}

/// Extractor for HTTP basic auth on the master API.
///
/// Passes through when no htpasswd file is configured.
pub struct AuthUser {
    #[allow(dead_code)]
    pub username: Option<String>,
}

#[async_trait::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(htpasswd) = &state.htpasswd else {
            return Ok(AuthUser { username: None });
        };

        let TypedHeader(Authorization(basic)) =
            TypedHeader::<Authorization<Basic>>::from_request_parts(parts, state)
                .await
                .map_err(|_| AuthError::MissingCredentials)?;

        if !htpasswd.verify(basic.username(), basic.password()) {
            tracing::warn!(user = basic.username(), "Rejected basic auth");
            return Err(AuthError::InvalidCredentials);
        }
        Ok(AuthUser {
            username: Some(basic.username().to_string()),
        })
    }
}

pub enum AuthError {
    MissingCredentials,
    InvalidCredentials,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingCredentials => "Missing basic auth credentials",
            AuthError::InvalidCredentials => "Invalid username or password",
        };
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Basic realm=\"Basic Realm\"")],
            Json(ErrorResponse::new(message)),
        )
            .into_response()
    }
}
