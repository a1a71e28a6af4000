//! Bearer-token authentication middleware
//!
//! Validates `Authorization: Bearer <jwt>` against the shared signing
//! secret for every request whose path is not on the allow-list, and
//! attaches the decoded claims to request extensions for downstream
//! handlers. Rejections carry the same `{"detail": ...}` body shape as
//! every other error in the API.

use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use libras_common::config::AuthConfig;
use libras_common::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Paths served without authentication
const ALLOW_LIST: [&str; 3] = ["/health", "/users/register", "/check/user"];

/// Decoded token claims, attached to request extensions on success
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    pub exp: usize,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Validated token settings, built once from config at startup
pub struct AuthSettings {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthSettings {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let algorithm = Algorithm::from_str(&config.algorithm).map_err(|_| {
            Error::Config(format!(
                "unsupported signing algorithm: {}",
                config.algorithm
            ))
        })?;

        Ok(Self {
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation: Validation::new(algorithm),
        })
    }

    fn decode_claims(&self, token: &str) -> std::result::Result<Claims, ErrorKind> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| e.into_kind())
    }
}

/// True when the path may pass through unauthenticated
pub fn is_allow_listed(path: &str) -> bool {
    ALLOW_LIST.iter().any(|prefix| path.starts_with(prefix))
}

/// Tower layer enforcing bearer authentication
#[derive(Clone)]
pub struct AuthLayer {
    settings: Arc<AuthSettings>,
}

impl AuthLayer {
    pub fn new(settings: Arc<AuthSettings>) -> Self {
        Self { settings }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthGate<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthGate {
            inner,
            settings: self.settings.clone(),
        }
    }
}

/// Tower service that validates the credential before dispatch
#[derive(Clone)]
pub struct AuthGate<S> {
    inner: S,
    settings: Arc<AuthSettings>,
}

impl<S> Service<Request> for AuthGate<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request) -> Self::Future {
        let settings = self.settings.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if is_allow_listed(request.uri().path()) {
                return inner.call(request).await;
            }

            let claims = match authenticate(&settings, &request) {
                Ok(claims) => claims,
                Err(response) => return Ok(response),
            };

            request.extensions_mut().insert(claims);
            inner.call(request).await
        })
    }
}

/// Extract and verify the bearer credential from a request
fn authenticate(
    settings: &AuthSettings,
    request: &Request,
) -> std::result::Result<Claims, Response> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            auth_error_response(StatusCode::UNAUTHORIZED, "No authorization token provided")
        })?;

    let mut parts = header.splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().unwrap_or_default().trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(auth_error_response(
            StatusCode::UNAUTHORIZED,
            "Invalid authentication scheme",
        ));
    }

    settings.decode_claims(token).map_err(|kind| match kind {
        ErrorKind::ExpiredSignature => {
            auth_error_response(StatusCode::UNAUTHORIZED, "Token has expired")
        }
        ErrorKind::InvalidToken
        | ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::ImmatureSignature => {
            auth_error_response(StatusCode::UNAUTHORIZED, "Invalid token")
        }
        other => {
            tracing::error!(error = ?other, "Unexpected fault during token verification");
            auth_error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error during authentication",
            )
        }
    })
}

fn auth_error_response(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn settings(secret: &str) -> AuthSettings {
        AuthSettings::new(&AuthConfig {
            secret: secret.to_string(),
            algorithm: "HS256".to_string(),
        })
        .unwrap()
    }

    fn token(secret: &str, exp: i64) -> String {
        let claims = json!({ "sub": "user-1", "exp": exp });
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    #[test]
    fn allow_list_covers_public_paths() {
        assert!(is_allow_listed("/health"));
        assert!(is_allow_listed("/users/register"));
        assert!(is_allow_listed("/check/user"));
        assert!(!is_allow_listed("/generate/content"));
        assert!(!is_allow_listed("/users/abc123"));
        assert!(!is_allow_listed("/api/roadmaps/abc123"));
    }

    #[test]
    fn valid_token_decodes_claims() {
        let settings = settings("secret-1");
        let claims = settings.decode_claims(&token("secret-1", future_exp())).unwrap();
        assert_eq!(claims.sub.as_deref(), Some("user-1"));
    }

    #[test]
    fn expired_token_is_distinguished() {
        let settings = settings("secret-1");
        let expired = token("secret-1", chrono::Utc::now().timestamp() - 3600);
        assert!(matches!(
            settings.decode_claims(&expired),
            Err(ErrorKind::ExpiredSignature)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let settings = settings("secret-1");
        let forged = token("other-secret", future_exp());
        assert!(settings.decode_claims(&forged).is_err());
    }

    #[test]
    fn unsupported_algorithm_is_a_config_error() {
        let result = AuthSettings::new(&AuthConfig {
            secret: "s".to_string(),
            algorithm: "HS99".to_string(),
        });
        assert!(result.is_err());
    }
}
