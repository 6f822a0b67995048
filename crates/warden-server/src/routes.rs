//! HTTP routes.
//!
//! Handlers decode JSON, apply field-level checks, call the auth
//! service and shape the response. They hold no state of their own.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warden_auth::service::{AuthService, LoginInput, RegisterInput, ResetPasswordInput};
use warden_core::error::WardenError;
use warden_core::models::user::{Role, UserId};
use warden_core::notify::Notifier;
use warden_core::repository::{ResetTokenRepository, UserRepository};

use crate::error::ApiError;

const MIN_PASSWORD_LEN: usize = 8;

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
    pub password: String,
}

fn default_role() -> String {
    Role::GeneralUser.as_str().to_string()
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user_id: UserId,
    pub role: Role,
    pub expires_at: i64,
}

fn invalid(message: impl Into<String>) -> ApiError {
    ApiError(WardenError::Validation {
        message: message.into(),
    })
}

fn require(field: &str, value: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(invalid(format!("{field} is required")));
    }
    Ok(())
}

fn check_email(value: &str) -> ApiResult<()> {
    require("email", value)?;
    match value.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(invalid("email is not a valid email address")),
    }
}

fn check_password(field: &str, value: &str) -> ApiResult<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid(format!(
            "{field} must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

/// Build the application router around a shared auth service.
pub fn router<U, R, N>(service: Arc<AuthService<U, R, N>>) -> Router
where
    U: UserRepository + 'static,
    R: ResetTokenRepository + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/register", post(register::<U, R, N>))
        .route("/login", post(login::<U, R, N>))
        .route("/forgot-password", post(forgot_password::<U, R, N>))
        .route("/reset-password", post(reset_password::<U, R, N>))
        .route("/session", get(session::<U, R, N>))
        .with_state(service)
}

async fn health() -> &'static str {
    "ok"
}

async fn register<U, R, N>(
    State(service): State<Arc<AuthService<U, R, N>>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)>
where
    U: UserRepository,
    R: ResetTokenRepository,
    N: Notifier,
{
    require("username", &req.username)?;
    check_email(&req.email)?;
    check_password("password", &req.password)?;

    let out = service
        .register(RegisterInput {
            username: req.username,
            email: req.email,
            role: req.role,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: out.id,
            username: out.username,
            email: out.email,
            role: out.role,
            created_at: out.created_at,
            updated_at: out.updated_at,
        }),
    ))
}

async fn login<U, R, N>(
    State(service): State<Arc<AuthService<U, R, N>>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>>
where
    U: UserRepository,
    R: ResetTokenRepository,
    N: Notifier,
{
    require("email", &req.email)?;
    require("password", &req.password)?;

    let out = service
        .login(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(LoginResponse {
        access_token: out.access_token,
        token_type: "Bearer".into(),
        expires_in: out.expires_in,
    }))
}

async fn forgot_password<U, R, N>(
    State(service): State<Arc<AuthService<U, R, N>>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>>
where
    U: UserRepository,
    R: ResetTokenRepository,
    N: Notifier,
{
    check_email(&req.email)?;

    // The token only travels by email.
    service.initiate_password_reset(&req.email).await?;

    Ok(Json(MessageResponse {
        message: "password reset email sent".into(),
    }))
}

async fn reset_password<U, R, N>(
    State(service): State<Arc<AuthService<U, R, N>>>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>>
where
    U: UserRepository,
    R: ResetTokenRepository,
    N: Notifier,
{
    require("token", &req.token)?;
    check_password("new_password", &req.new_password)?;

    service
        .reset_password(ResetPasswordInput {
            token: req.token,
            new_password: req.new_password,
        })
        .await?;

    Ok(Json(MessageResponse {
        message: "password updated".into(),
    }))
}

async fn session<U, R, N>(
    State(service): State<Arc<AuthService<U, R, N>>>,
    headers: HeaderMap,
) -> ApiResult<Json<SessionResponse>>
where
    U: UserRepository,
    R: ResetTokenRepository,
    N: Notifier,
{
    let unauthorized = || {
        ApiError(WardenError::AuthenticationFailed {
            reason: "missing bearer token".into(),
        })
    };
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(unauthorized)?;

    let claims = service.validate_session(token)?.0;
    let user_id = claims
        .user_id()
        .map_err(|e| ApiError(WardenError::from(e)))?;

    Ok(Json(SessionResponse {
        user_id,
        role: claims.role,
        expires_at: claims.exp,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use surrealdb::Surreal;
    use surrealdb::engine::local::Mem;
    use tower::ServiceExt;
    use warden_auth::config::{Argon2Params, AuthConfig};
    use warden_db::repository::{SurrealResetTokenRepository, SurrealUserRepository};
    use warden_mail::LogNotifier;

    async fn app() -> Router {
        let db = Surreal::new::<Mem>(()).await.unwrap();
        db.use_ns("test").use_db("test").await.unwrap();
        warden_db::run_migrations(&db).await.unwrap();

        let config = AuthConfig {
            jwt_secret: SecretString::from("route-secret".to_string()),
            session_token_ttl: Some("600".into()),
            email_sender: "noreply@warden.test".into(),
            base_url: "https://warden.test".into(),
            argon2: Argon2Params {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1,
            },
            ..AuthConfig::default()
        };
        router(Arc::new(AuthService::new(
            SurrealUserRepository::new(db.clone()),
            SurrealResetTokenRepository::new(db),
            LogNotifier,
            config,
        )))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn alice() -> Value {
        json!({
            "username": "alice",
            "email": "alice@x.com",
            "role": "general-user",
            "password": "longenough1"
        })
    }

    #[tokio::test]
    async fn register_login_and_session() {
        let app = app().await;

        let (status, body) = call(&app, "POST", "/register", alice()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["username"], "alice");
        assert!(body.get("password_hash").is_none());

        let (status, body) = call(
            &app,
            "POST",
            "/login",
            json!({ "email": "alice@x.com", "password": "longenough1" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["expires_in"], 600);
        let token = body["access_token"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/session")
                    .header("authorization", format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn duplicate_register_is_conflict() {
        let app = app().await;
        call(&app, "POST", "/register", alice()).await;

        let (status, _) = call(&app, "POST", "/register", alice()).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn unknown_role_is_bad_request() {
        let app = app().await;
        let mut body = alice();
        body["role"] = json!("root");

        let (status, _) = call(&app, "POST", "/register", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_failures_share_status_and_body() {
        let app = app().await;
        call(&app, "POST", "/register", alice()).await;

        let wrong = call(
            &app,
            "POST",
            "/login",
            json!({ "email": "alice@x.com", "password": "wrongpassword" }),
        )
        .await;
        let unknown = call(
            &app,
            "POST",
            "/login",
            json!({ "email": "bob@x.com", "password": "longenough1" }),
        )
        .await;

        assert_eq!(wrong.0, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong, unknown);
    }

    #[tokio::test]
    async fn forgot_password_does_not_return_token() {
        let app = app().await;
        call(&app, "POST", "/register", alice()).await;

        let (status, body) = call(
            &app,
            "POST",
            "/forgot-password",
            json!({ "email": "alice@x.com" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("token").is_none());

        let (status, _) = call(
            &app,
            "POST",
            "/forgot-password",
            json!({ "email": "nobody@x.com" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reset_password_with_unknown_token_is_unauthorized() {
        let app = app().await;

        let (status, _) = call(
            &app,
            "POST",
            "/reset-password",
            json!({ "token": "AAAAAAAAAAAAAAAAAAAAAAAA", "new_password": "longenough2" }),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn session_without_token_is_unauthorized() {
        let app = app().await;
        let response = app
            .oneshot(Request::builder().uri("/session").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn email_shape() {
        assert!(check_email("alice@x.com").is_ok());
        assert!(check_email("").is_err());
        assert!(check_email("alice").is_err());
        assert!(check_email("@x.com").is_err());
        assert!(check_email("alice@localhost").is_err());
    }

    #[test]
    fn password_length() {
        assert!(check_password("password", "longenough1").is_ok());
        let err = check_password("password", "short").unwrap_err();
        assert!(err.0.to_string().contains("at least 8"));
    }

    #[test]
    fn register_role_defaults_to_general_user() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"username":"alice","email":"alice@x.com","password":"longenough1"}"#,
        )
        .unwrap();
        assert_eq!(req.role, "general-user");
    }
}
