//! Authentication route handlers.
//!
//! Login, signup, logout, and the password-reset flow. Validation failures
//! re-render the submitting form with a message and the entered values;
//! the reset-request endpoint responds identically whether or not the
//! email belongs to an account.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use fernwood_core::UserId;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{CsrfToken, clear_current_user, require_valid_token, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub csrf_token: String,
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub csrf_token: String,
}

/// Logout form data.
#[derive(Debug, Deserialize)]
pub struct LogoutForm {
    pub csrf_token: String,
}

/// Reset request form data.
#[derive(Debug, Deserialize)]
pub struct ResetRequestForm {
    pub email: String,
    pub csrf_token: String,
}

/// New password form data.
#[derive(Debug, Deserialize)]
pub struct NewPasswordForm {
    pub user_id: i32,
    pub token: String,
    pub password: String,
    pub confirm_password: String,
    pub csrf_token: String,
}

/// Query parameters for message display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Turn a redirect message code into display text.
fn message_text(code: &str) -> String {
    match code {
        "account_created" => "Account created. Please log in.".to_string(),
        "password_reset" => "Password updated. Please log in.".to_string(),
        "reset_sent" => {
            "If an account with that email exists, a reset link is on its way.".to_string()
        }
        "invalid_token" => "That reset link is invalid or has expired.".to_string(),
        other => other.to_string(),
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
    pub email: String,
    pub logged_in: bool,
    pub csrf: String,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub error: Option<String>,
    pub email: String,
    pub logged_in: bool,
    pub csrf: String,
}

/// Reset request page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/reset.html")]
pub struct ResetTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
    pub email: String,
    pub logged_in: bool,
    pub csrf: String,
}

/// New password page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/new_password.html")]
pub struct NewPasswordTemplate {
    pub error: Option<String>,
    pub user_id: UserId,
    pub token: String,
    pub logged_in: bool,
    pub csrf: String,
}

// =============================================================================
// Login / Logout
// =============================================================================

/// Display the login page.
pub async fn login_page(
    Query(query): Query<MessageQuery>,
    CsrfToken(csrf): CsrfToken,
) -> impl IntoResponse {
    LoginTemplate {
        error: query.error.as_deref().map(message_text),
        success: query.success.as_deref().map(message_text),
        email: String::new(),
        logged_in: false,
        csrf,
    }
}

/// Handle login form submission.
///
/// An unknown email and a wrong password produce the identical re-rendered
/// form; nothing distinguishes the two.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    CsrfToken(csrf): CsrfToken,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    require_valid_token(&session, &form.csrf_token).await?;

    match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            let current = CurrentUser {
                id: user.id,
                email: user.email.clone(),
            };
            set_current_user(&session, &current).await?;
            set_sentry_user(&user.id, Some(user.email.as_str()));

            Ok(Redirect::to("/").into_response())
        }
        Err(AuthError::InvalidCredentials) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            LoginTemplate {
                error: Some("Invalid email or password.".to_string()),
                success: None,
                email: form.email,
                logged_in: false,
                csrf,
            },
        )
            .into_response()),
        Err(other) => Err(other.into()),
    }
}

/// Handle logout.
pub async fn logout(session: Session, Form(form): Form<LogoutForm>) -> Result<Response> {
    require_valid_token(&session, &form.csrf_token).await?;

    clear_current_user(&session).await?;
    clear_sentry_user();

    // Destroy the entire session, checkout state included.
    session.flush().await?;

    Ok(Redirect::to("/").into_response())
}

// =============================================================================
// Signup
// =============================================================================

/// Display the signup page.
pub async fn signup_page(
    Query(query): Query<MessageQuery>,
    CsrfToken(csrf): CsrfToken,
) -> impl IntoResponse {
    SignupTemplate {
        error: query.error.as_deref().map(message_text),
        email: String::new(),
        logged_in: false,
        csrf,
    }
}

/// Handle signup form submission.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    CsrfToken(csrf): CsrfToken,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    require_valid_token(&session, &form.csrf_token).await?;

    let rerender = |error: String, email: String, csrf: String| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            SignupTemplate {
                error: Some(error),
                email,
                logged_in: false,
                csrf,
            },
        )
            .into_response()
    };

    if form.password != form.confirm_password {
        return Ok(rerender(
            "Passwords do not match.".to_string(),
            form.email,
            csrf,
        ));
    }

    match AuthService::new(state.pool())
        .register(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "account created");
            Ok(Redirect::to("/auth/login?success=account_created").into_response())
        }
        Err(AuthError::UserAlreadyExists) => Ok(rerender(
            "An account with this email already exists.".to_string(),
            form.email,
            csrf,
        )),
        Err(AuthError::InvalidEmail(_)) => Ok(rerender(
            "Enter a valid email address.".to_string(),
            form.email,
            csrf,
        )),
        Err(AuthError::WeakPassword(msg)) => Ok(rerender(msg, form.email, csrf)),
        Err(other) => Err(other.into()),
    }
}

// =============================================================================
// Password Reset
// =============================================================================

/// Display the reset request page.
pub async fn reset_page(
    Query(query): Query<MessageQuery>,
    CsrfToken(csrf): CsrfToken,
) -> impl IntoResponse {
    ResetTemplate {
        error: query.error.as_deref().map(message_text),
        success: query.success.as_deref().map(message_text),
        email: String::new(),
        logged_in: false,
        csrf,
    }
}

/// Handle a reset request.
///
/// Whether or not the account exists, the response is the same redirect; a
/// failed email send is logged but deliberately not surfaced either.
pub async fn request_reset(
    State(state): State<AppState>,
    session: Session,
    CsrfToken(csrf): CsrfToken,
    Form(form): Form<ResetRequestForm>,
) -> Result<Response> {
    require_valid_token(&session, &form.csrf_token).await?;

    match AuthService::new(state.pool())
        .start_password_reset(&form.email)
        .await
    {
        Ok(Some(reset)) => {
            let base_url = state.config().base_url.trim_end_matches('/');
            let reset_url = format!("{base_url}/auth/reset/{}", reset.token);

            if let Err(e) = state
                .mailer()
                .send_password_reset(reset.user.email.as_str(), &reset_url)
                .await
            {
                tracing::error!(user_id = %reset.user.id, "failed to send reset email: {e}");
            }
        }
        Ok(None) => {
            tracing::debug!("reset requested for unknown email");
        }
        Err(AuthError::InvalidEmail(_)) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                ResetTemplate {
                    error: Some("Enter a valid email address.".to_string()),
                    success: None,
                    email: form.email,
                    logged_in: false,
                    csrf,
                },
            )
                .into_response());
        }
        Err(other) => return Err(other.into()),
    }

    Ok(Redirect::to("/auth/reset?success=reset_sent").into_response())
}

/// Display the new-password form behind an emailed reset link.
///
/// An invalid or expired token goes back to the request form.
pub async fn new_password_page(
    State(state): State<AppState>,
    CsrfToken(csrf): CsrfToken,
    Path(token): Path<String>,
) -> Result<Response> {
    match AuthService::new(state.pool()).find_reset_user(&token).await {
        Ok(user) => Ok(NewPasswordTemplate {
            error: None,
            user_id: user.id,
            token,
            logged_in: false,
            csrf,
        }
        .into_response()),
        Err(AuthError::InvalidResetToken) => {
            Ok(Redirect::to("/auth/reset?error=invalid_token").into_response())
        }
        Err(other) => Err(other.into()),
    }
}

/// Handle the new-password form: single-use, expiring token.
pub async fn new_password(
    State(state): State<AppState>,
    session: Session,
    CsrfToken(csrf): CsrfToken,
    Form(form): Form<NewPasswordForm>,
) -> Result<Response> {
    require_valid_token(&session, &form.csrf_token).await?;

    let rerender = |error: String| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            NewPasswordTemplate {
                error: Some(error),
                user_id: UserId::new(form.user_id),
                token: form.token.clone(),
                logged_in: false,
                csrf: csrf.clone(),
            },
        )
            .into_response()
    };

    if form.password != form.confirm_password {
        return Ok(rerender("Passwords do not match.".to_string()));
    }

    match AuthService::new(state.pool())
        .reset_password(UserId::new(form.user_id), &form.token, &form.password)
        .await
    {
        Ok(()) => Ok(Redirect::to("/auth/login?success=password_reset").into_response()),
        Err(AuthError::WeakPassword(msg)) => Ok(rerender(msg)),
        Err(AuthError::InvalidResetToken) => {
            Ok(Redirect::to("/auth/reset?error=invalid_token").into_response())
        }
        Err(other) => Err(other.into()),
    }
}
