//! Handlers for the `/auth` pages: signup, login, token refresh, logout
//! and password change.

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use yatube_core::error::CoreError;
use yatube_core::forms::{
    FormErrors, PasswordChangeForm, SignupForm, LOGIN_FIELDS, PASSWORD_CHANGE_FIELDS,
    PASSWORD_INCORRECT_MESSAGE, SIGNUP_FIELDS, USERNAME_TAKEN_MESSAGE,
};
use yatube_core::types::DbId;
use yatube_db::models::user::{CreateUser, User};
use yatube_db::repositories::{SessionRepo, UserRepo};

use crate::auth::jwt::{generate_access_token, generate_refresh_token, hash_refresh_token};
use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::FormBody;
use crate::handlers::posts::FormSchema;
use crate::middleware::auth::{LoginRequired, MaybeUser};
use crate::response::DataResponse;
use crate::state::AppState;

/// Where a successful password change lands.
const PASSWORD_CHANGE_DONE_URL: &str = "/auth/password_change/done/";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct NextParams {
    pub next: Option<String>,
}

/// Form body for `POST /auth/login/`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Form body for `POST /auth/refresh/`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginPage {
    pub form: FormSchema,
    pub next: Option<String>,
}

/// Tokens handed out by login and refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserInfo,
    /// Page the client should continue to.
    pub redirect_to: String,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    /// Number of refresh sessions revoked.
    pub revoked_sessions: u64,
}

#[derive(Debug, Serialize)]
pub struct MessagePage {
    pub message: &'static str,
}

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

/// GET /auth/signup/
pub async fn signup_form() -> Json<DataResponse<FormSchema>> {
    Json(DataResponse {
        data: FormSchema {
            fields: SIGNUP_FIELDS,
        },
    })
}

/// POST /auth/signup/
///
/// Register an account, then send the visitor to the index.
pub async fn signup(
    State(state): State<AppState>,
    FormBody(form): FormBody<SignupForm>,
) -> AppResult<Redirect> {
    let clean = form.clean().map_err(CoreError::from)?;

    if UserRepo::username_exists(&state.pool, &clean.username).await? {
        let errors = FormErrors::single("username", USERNAME_TAKEN_MESSAGE);
        return Err(CoreError::from(errors).into());
    }

    let password_hash = hash_password(&clean.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: clean.username,
            email: clean.email,
            first_name: clean.first_name,
            last_name: clean.last_name,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User signed up");
    Ok(Redirect::to("/"))
}

// ---------------------------------------------------------------------------
// Login / tokens
// ---------------------------------------------------------------------------

/// GET /auth/login/
pub async fn login_form(Query(params): Query<NextParams>) -> Json<DataResponse<LoginPage>> {
    Json(DataResponse {
        data: LoginPage {
            form: FormSchema {
                fields: LOGIN_FIELDS,
            },
            next: params.next,
        },
    })
}

/// POST /auth/login/
///
/// Check credentials and issue tokens. `?next=` is echoed back as
/// `redirect_to` when it is a local path.
pub async fn login(
    State(state): State<AppState>,
    Query(params): Query<NextParams>,
    FormBody(input): FormBody<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let invalid = || {
        AppError::Core(CoreError::Unauthorized(
            "Invalid username or password".into(),
        ))
    };

    let user = UserRepo::find_by_username(&state.pool, input.username.trim())
        .await?
        .ok_or_else(invalid)?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(user_id = user.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    UserRepo::record_successful_login(&state.pool, user.id).await?;

    let redirect_to = safe_redirect(params.next.as_deref());
    let response = create_auth_response(&state, &user, redirect_to).await?;
    tracing::info!(user_id = user.id, "User logged in");
    Ok(Json(DataResponse { data: response }))
}

/// POST /auth/refresh/
///
/// Exchange a live refresh token for a new pair. The old session is revoked.
pub async fn refresh(
    State(state): State<AppState>,
    FormBody(input): FormBody<RefreshRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let token_hash = hash_refresh_token(&input.refresh_token);

    let session = SessionRepo::consume(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired refresh token".into(),
            ))
        })?;

    let user = UserRepo::find_by_id(&state.pool, session.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("User no longer exists".into())))?;

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let response = create_auth_response(&state, &user, "/".to_string()).await?;
    Ok(Json(DataResponse { data: response }))
}

/// GET|POST /auth/logout/
///
/// Revokes every refresh session of the caller. Anonymous visitors get the
/// same page with nothing revoked.
pub async fn logout(
    State(state): State<AppState>,
    viewer: MaybeUser,
) -> AppResult<Json<DataResponse<LogoutResponse>>> {
    let revoked_sessions = match viewer.user_id() {
        Some(user_id) => {
            let revoked = SessionRepo::revoke_for_user(&state.pool, user_id).await?;
            tracing::info!(user_id, revoked, "User logged out");
            revoked
        }
        None => 0,
    };
    Ok(Json(DataResponse {
        data: LogoutResponse { revoked_sessions },
    }))
}

// ---------------------------------------------------------------------------
// Password change
// ---------------------------------------------------------------------------

/// GET /auth/password_change/
pub async fn password_change_form(
    LoginRequired(_user): LoginRequired,
) -> Json<DataResponse<FormSchema>> {
    Json(DataResponse {
        data: FormSchema {
            fields: PASSWORD_CHANGE_FIELDS,
        },
    })
}

/// POST /auth/password_change/
///
/// Existing refresh sessions are revoked once the new password is stored.
pub async fn password_change(
    State(state): State<AppState>,
    LoginRequired(auth): LoginRequired,
    FormBody(form): FormBody<PasswordChangeForm>,
) -> AppResult<Redirect> {
    let clean = form.clean().map_err(CoreError::from)?;

    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;

    let old_ok = verify_password(&clean.old_password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !old_ok {
        let errors = FormErrors::single("old_password", PASSWORD_INCORRECT_MESSAGE);
        return Err(CoreError::from(errors).into());
    }

    let password_hash = hash_password(&clean.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, user.id, &password_hash).await?;
    SessionRepo::revoke_for_user(&state.pool, user.id).await?;

    tracing::info!(user_id = user.id, "Password changed");
    Ok(Redirect::to(PASSWORD_CHANGE_DONE_URL))
}

/// GET /auth/password_change/done/
pub async fn password_change_done(
    LoginRequired(_user): LoginRequired,
) -> Json<DataResponse<MessagePage>> {
    Json(DataResponse {
        data: MessagePage {
            message: "Ваш пароль был изменён.",
        },
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Accept `next` only as a same-site absolute path; anything else goes home.
///
/// Browsers read `\` as `/`, so a backslash anywhere could turn the path
/// into a scheme-relative URL.
fn safe_redirect(next: Option<&str>) -> String {
    match next {
        Some(path) if is_local_path(path) => path.to_string(),
        _ => "/".to_string(),
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.chars().any(|c| c == '\\' || c.is_control())
}

/// Sign an access token, persist a refresh session and build the response.
async fn create_auth_response(
    state: &AppState,
    user: &User,
    redirect_to: String,
) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, &user.username, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    let (refresh_plaintext, refresh_hash) = generate_refresh_token();
    let expires_at =
        Utc::now() + chrono::Duration::days(state.config.jwt.refresh_token_expiry_days);

    SessionRepo::issue(&state.pool, user.id, &refresh_hash, expires_at).await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh_plaintext,
        expires_in: state.config.jwt.access_token_expiry_mins * 60,
        user: UserInfo {
            id: user.id,
            username: user.username.clone(),
        },
        redirect_to,
    })
}
