//! Account signup, email verification and login.
//!
//! Signup is two-step: [`signup`] validates the form and mails a six-digit
//! code which the client echoes back alongside the form to [`verify_email`],
//! which then stores the account. Google sign-in bypasses both and creates a
//! password-less account on first use.

use std::sync::LazyLock;

use rand::Rng;
use regex::Regex;
use serde::Deserialize;
use tracing::info;

use super::OperationError;
use crate::{
    context::AppContext,
    db::{self, DbConnection, is_unique_violation},
    mail::verification_message,
    models::{NewUser, User},
    passwords::{hash_password, verify_password},
};

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"));

/// Whether `email` looks like `local@domain.tld`.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_ok_and(|pattern| pattern.is_match(email))
}

/// Signup form as posted by the registration page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    /// First name.
    #[serde(default)]
    pub first_name: String,
    /// Last name.
    #[serde(default)]
    pub last_name: String,
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Confirmation field; never stored.
    #[serde(default)]
    pub confirm_password: Option<String>,
}

/// Profile returned by Google sign-in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GoogleProfile {
    /// Verified Google email.
    pub email: String,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub family_name: Option<String>,
    /// Given name.
    #[serde(default)]
    pub given_name: Option<String>,
}

/// Result of a Google sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleLogin {
    /// The signed-in account.
    pub user: User,
    /// Whether the account existed before this sign-in.
    pub existed: bool,
}

fn validate_form(form: &SignupForm) -> Result<(), OperationError> {
    if !is_valid_email(&form.email) {
        return Err(OperationError::InvalidInput("Invalid email format".to_owned()));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(OperationError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters long"
        )));
    }
    Ok(())
}

fn email_taken() -> OperationError { OperationError::Conflict("Email already exists".to_owned()) }

/// Validate a signup form and mail a verification code to its address.
///
/// Returns the code so the client can submit it back with the form. Nothing
/// is mailed when the address already has an account.
///
/// # Errors
/// Returns [`OperationError::InvalidInput`] for a malformed form,
/// [`OperationError::Conflict`] for a registered email,
/// [`OperationError::Upstream`] when mail delivery fails and
/// [`OperationError::Unavailable`] when the store fails.
pub async fn signup(ctx: &AppContext, form: &SignupForm) -> Result<u32, OperationError> {
    validate_form(form)?;
    {
        let mut conn = ctx.conn().await?;
        if db::get_user_by_email(&mut conn, &form.email).await?.is_some() {
            info!(email = %form.email, "signup rejected: email already registered");
            return Err(email_taken());
        }
    }
    let code: u32 = rand::thread_rng().gen_range(100_000..=999_999);
    let message = verification_message(&form.email, &form.first_name, code);
    ctx.mailer
        .send(&message)
        .await
        .map_err(|e| OperationError::Upstream(Box::new(e)))?;
    info!(email = %form.email, "verification code sent");
    Ok(code)
}

/// Store the account described by `form` once `code` matches `true_code`.
///
/// The form is validated again here: this is the step that writes, and the
/// client may post it without going through [`signup`].
///
/// # Errors
/// Returns [`OperationError::InvalidInput`] for a malformed form, when the
/// codes differ or when the password cannot be hashed, [`OperationError::Conflict`] when the email was
/// registered in the meantime and [`OperationError::Unavailable`] when the
/// store fails.
pub async fn verify_email(
    ctx: &AppContext,
    true_code: u32,
    code: u32,
    form: &SignupForm,
) -> Result<User, OperationError> {
    validate_form(form)?;
    if true_code != code {
        return Err(OperationError::InvalidInput(
            "Invalid verification code".to_owned(),
        ));
    }
    let hashed = hash_password(&ctx.argon2, &form.password)
        .map_err(|e| OperationError::InvalidInput(format!("password rejected: {e}")))?;
    let new_user = NewUser {
        email: &form.email,
        password: Some(&hashed),
        first_name: Some(&form.first_name),
        last_name: Some(&form.last_name),
        given_name: Some(&form.first_name),
        ..NewUser::default()
    };
    let mut conn = ctx.conn().await?;
    match db::create_user(&mut conn, &new_user).await {
        Ok(user) => {
            info!(id = user.id, email = %user.email, "user registered");
            Ok(user)
        }
        Err(e) if is_unique_violation(&e) => Err(email_taken()),
        Err(e) => Err(e.into()),
    }
}

/// Check `password` against the account stored for `email`.
///
/// # Errors
/// Returns [`OperationError::NotFound`] for an unknown email,
/// [`OperationError::InvalidInput`] for a wrong password or a password-less
/// account and [`OperationError::Unavailable`] when the store fails.
pub async fn login(ctx: &AppContext, email: &str, password: &str) -> Result<User, OperationError> {
    let mut conn = ctx.conn().await?;
    let user = db::get_user_by_email(&mut conn, email)
        .await?
        .ok_or_else(|| OperationError::NotFound("User not found".to_owned()))?;
    let verified = user
        .password
        .as_deref()
        .is_some_and(|hash| verify_password(&ctx.argon2, hash, password));
    if !verified {
        info!(email, "login rejected: invalid password");
        return Err(OperationError::InvalidInput("Invalid password".to_owned()));
    }
    info!(id = user.id, "login succeeded");
    Ok(user)
}

/// Sign in with a Google profile, creating the account on first use.
///
/// # Errors
/// Returns [`OperationError::InvalidInput`] for a malformed email and
/// [`OperationError::Unavailable`] when the store fails.
pub async fn login_google(
    ctx: &AppContext,
    profile: &GoogleProfile,
) -> Result<GoogleLogin, OperationError> {
    if !is_valid_email(&profile.email) {
        return Err(OperationError::InvalidInput("Invalid email format".to_owned()));
    }
    let mut conn = ctx.conn().await?;
    if let Some(user) = db::get_user_by_email(&mut conn, &profile.email).await? {
        return Ok(GoogleLogin {
            user,
            existed: true,
        });
    }
    store_google_user(&mut conn, profile).await
}

/// Insert a password-less account for `profile`.
///
/// Losing a race to a concurrent sign-in with the same email returns the
/// winner's row instead of an error.
async fn store_google_user(
    conn: &mut DbConnection,
    profile: &GoogleProfile,
) -> Result<GoogleLogin, OperationError> {
    let new_user = NewUser {
        email: &profile.email,
        name: profile.name.as_deref(),
        family_name: profile.family_name.as_deref(),
        given_name: profile.given_name.as_deref(),
        ..NewUser::default()
    };
    match db::create_user(conn, &new_user).await {
        Ok(user) => {
            info!(id = user.id, email = %user.email, "google account created");
            Ok(GoogleLogin {
                user,
                existed: false,
            })
        }
        Err(e) if is_unique_violation(&e) => {
            let user = db::get_user_by_email(conn, &profile.email)
                .await?
                .ok_or_else(email_taken)?;
            Ok(GoogleLogin {
                user,
                existed: true,
            })
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("a@b.com", true)]
    #[case("first.last@clinic.example.org", true)]
    #[case("a@b", false)]
    #[case("a b@c.com", false)]
    #[case("@b.com", false)]
    #[case("a@@b.com", false)]
    #[case("", false)]
    fn email_format(#[case] email: &str, #[case] expected: bool) {
        assert_eq!(is_valid_email(email), expected);
    }

    fn form(email: &str, password: &str) -> SignupForm {
        SignupForm {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: email.into(),
            password: password.into(),
            confirm_password: None,
        }
    }

    #[rstest]
    #[case(form("not-an-email", "long-enough"), "Invalid email format")]
    #[case(form("a@b.com", "short"), "Password must be at least 8 characters long")]
    fn rejects_malformed_forms(#[case] form: SignupForm, #[case] message: &str) {
        let err = validate_form(&form).expect_err("form must be rejected");
        assert!(matches!(err, OperationError::InvalidInput(_)));
        assert_eq!(err.to_string(), message);
    }

    #[rstest]
    fn accepts_well_formed_form() {
        assert!(validate_form(&form("a@b.com", "12345678")).is_ok());
    }

    #[rstest]
    fn signup_form_reads_camel_case_fields() {
        let parsed: SignupForm = serde_json::from_value(serde_json::json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "email": "ada@example.com",
            "password": "analytical",
            "confirmPassword": "analytical"
        }))
        .expect("parse form");
        assert_eq!(parsed.first_name, "Ada");
        assert_eq!(parsed.confirm_password.as_deref(), Some("analytical"));
    }

    #[rstest]
    #[case(form("x", "a"))]
    #[case(form("ada@example.com", "a"))]
    #[tokio::test]
    async fn verification_rejects_forms_signup_would_reject(#[case] form: SignupForm) {
        let ctx = crate::context::tests::unreachable_context();
        let err = verify_email(&ctx, 1, 1, &form)
            .await
            .expect_err("malformed form must not be stored");
        assert!(matches!(err, OperationError::InvalidInput(_)));
    }

    #[cfg(feature = "sqlite")]
    #[rstest]
    #[tokio::test]
    async fn google_sign_in_losing_the_insert_race_reuses_the_account() {
        let mut conn = crate::db::migrated_memory_store().await;
        let existing = db::create_user(
            &mut conn,
            &NewUser {
                email: "ada@example.com",
                given_name: Some("Ada"),
                ..NewUser::default()
            },
        )
        .await
        .expect("competing insert");
        let profile = GoogleProfile {
            email: "ada@example.com".into(),
            given_name: Some("Augusta".into()),
            ..GoogleProfile::default()
        };

        let login = store_google_user(&mut conn, &profile).await.expect("login");

        assert!(login.existed);
        assert_eq!(login.user, existing);
    }

    #[cfg(feature = "sqlite")]
    #[rstest]
    #[tokio::test]
    async fn google_sign_in_creates_password_less_account() {
        let mut conn = crate::db::migrated_memory_store().await;
        let profile = GoogleProfile {
            email: "grace@example.com".into(),
            name: Some("Grace Hopper".into()),
            ..GoogleProfile::default()
        };

        let login = store_google_user(&mut conn, &profile).await.expect("login");

        assert!(!login.existed);
        assert!(login.user.password.is_none());
        assert_eq!(login.user.name.as_deref(), Some("Grace Hopper"));
    }
}
