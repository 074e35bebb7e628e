//! REST handlers for the account, booking and help-bot forms.
//!
//! Every endpoint answers JSON. Rejections a page should show to the user
//! (wrong password, taken email, duplicate booking) come back as
//! `{error, flag: false}` with status 200; unreadable bodies get 400 and
//! server-side failures 500.

use axum::{
    Json,
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::error;

use crate::{
    context::AppContext,
    models::NewAppointment,
    operations::{self, AppointmentOutcome, GoogleProfile, OperationError, SignupForm},
};

/// Routes served under the site root.
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(health))
        .route("/sign-up", post(sign_up))
        .route("/verify-email", post(verify_email))
        .route("/login", post(login))
        .route("/login-google", post(login_google))
        .route("/appointment", post(appointment))
        .route("/bot-response", post(bot_response))
}

/// A failure rendered as `{error, flag: false}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Map an operation failure: client errors surface their own message
    /// with status 200, anything else is logged and replaced by `fallback`.
    fn from_operation(err: OperationError, fallback: &str) -> Self {
        if err.is_client_error() {
            Self::new(StatusCode::OK, err.to_string())
        } else {
            error!(error = ?err, "{fallback}");
            Self::new(StatusCode::INTERNAL_SERVER_ERROR, fallback)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({"error": self.message, "flag": false})),
        )
            .into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

async fn health() -> Json<Value> { Json(json!({"status": "ok"})) }

async fn sign_up(
    State(ctx): State<AppContext>,
    payload: Result<Json<SignupForm>, JsonRejection>,
) -> ApiResult {
    let Json(form) = payload?;
    match operations::signup(&ctx, &form).await {
        Ok(code) => Ok(Json(
            json!({"message": "Signup successful", "flag": true, "code": code}),
        )),
        Err(OperationError::InvalidInput(msg)) => Err(ApiError::new(StatusCode::BAD_REQUEST, msg)),
        Err(e) => Err(ApiError::from_operation(e, "Failed to signup")),
    }
}

/// A verification code as sent by the page: a number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum CodeValue {
    Number(u64),
    Text(String),
}

impl CodeValue {
    fn value(&self) -> Option<u32> {
        match self {
            Self::Number(n) => u32::try_from(*n).ok(),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerifyRequest {
    true_code: CodeValue,
    code: CodeValue,
    form_data: SignupForm,
}

async fn verify_email(
    State(ctx): State<AppContext>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;
    let (Some(true_code), Some(code)) = (req.true_code.value(), req.code.value()) else {
        return Err(ApiError::new(StatusCode::OK, "Invalid verification code"));
    };
    operations::verify_email(&ctx, true_code, code, &req.form_data)
        .await
        .map_err(|e| ApiError::from_operation(e, "Failed to verify code or insert user"))?;
    Ok(Json(
        json!({"message": "User inserted successfully", "flag": true}),
    ))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(ctx): State<AppContext>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;
    match operations::login(&ctx, &req.email, &req.password).await {
        Ok(user) => Ok(Json(
            json!({"message": "Password is correct", "flag": true, "user": user}),
        )),
        Err(e) if e.is_client_error() => Err(ApiError::new(StatusCode::OK, e.to_string())),
        Err(e) => {
            error!(error = ?e, "login failed");
            Err(ApiError::new(StatusCode::OK, "Failed to login"))
        }
    }
}

async fn login_google(
    State(ctx): State<AppContext>,
    payload: Result<Json<GoogleProfile>, JsonRejection>,
) -> ApiResult {
    let Json(profile) = payload?;
    match operations::login_google(&ctx, &profile).await {
        Ok(login) => {
            let message = if login.existed {
                "User already exists"
            } else {
                "User inserted successfully"
            };
            Ok(Json(
                json!({"message": message, "flag": true, "user": login.user}),
            ))
        }
        Err(e) if e.is_client_error() => Err(ApiError::new(StatusCode::OK, e.to_string())),
        Err(e) => {
            error!(error = ?e, "google login failed");
            Err(ApiError::new(StatusCode::OK, "Failed to login"))
        }
    }
}

async fn appointment(
    State(ctx): State<AppContext>,
    payload: Result<Json<NewAppointment>, JsonRejection>,
) -> ApiResult {
    let Json(booking) = payload?;
    match operations::make_appointment(&ctx, booking).await {
        Ok(AppointmentOutcome::Created(appointment)) => Ok(Json(json!({
            "message": "Appointment made successfully",
            "flag": true,
            "appointment": appointment,
        }))),
        Ok(AppointmentOutcome::AlreadyExists) => Err(ApiError::new(
            StatusCode::OK,
            "Appointment already exists",
        )),
        Err(e) => Err(ApiError::from_operation(e, "Failed to make appointment")),
    }
}

#[derive(Debug, Deserialize)]
struct BotRequest {
    message: String,
}

async fn bot_response(
    State(ctx): State<AppContext>,
    payload: Result<Json<BotRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return ApiError::from(rejection).into_response(),
    };
    match operations::bot_response(&ctx, &req.message).await {
        Ok(reply) => Json(reply).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "Failed to get bot response"})),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(json!(123_456), Some(123_456))]
    #[case(json!("123456"), Some(123_456))]
    #[case(json!(" 654321 "), Some(654_321))]
    #[case(json!("abc"), None)]
    #[case(json!(99_999_999_999_u64), None)]
    fn reads_codes_as_numbers_or_strings(#[case] raw: Value, #[case] expected: Option<u32>) {
        let code: CodeValue = serde_json::from_value(raw).expect("code deserialises");
        assert_eq!(code.value(), expected);
    }

    #[rstest]
    fn client_errors_keep_their_message_and_status_200() {
        let err = ApiError::from_operation(
            OperationError::Conflict("Email already exists".into()),
            "Failed to signup",
        );
        assert_eq!(err.status, StatusCode::OK);
        assert_eq!(err.message, "Email already exists");
    }

    #[rstest]
    fn server_errors_use_the_fallback_message() {
        let err = ApiError::from_operation(
            OperationError::from(diesel::result::Error::NotFound),
            "Failed to make appointment",
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Failed to make appointment");
    }
}
