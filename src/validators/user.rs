use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use sqlx::SqlitePool;

use super::ValidationErrors;
use crate::database::models::user;
use crate::error::ApiError;

/// Conservative RFC 5322 subset; the store's unique index is the final word
/// on anything this lets through.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub user: RegisterUser,
}

/// Missing fields deserialize to empty strings so the validators can report
/// them per-field instead of failing the whole body.
#[derive(Debug, Deserialize)]
pub struct RegisterUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub user: LoginUser,
}

#[derive(Debug, Deserialize)]
pub struct LoginUser {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub user: UpdateUser,
}

/// Absent fields stay `None` and leave the stored value untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

pub async fn validate_register(
    pool: &SqlitePool,
    req: &RegisterUser,
) -> Result<(), ApiError> {
    let mut errors = ValidationErrors::new();

    if req.username.trim().is_empty() {
        errors.add("username", "can't be blank");
    } else if user::username_taken(pool, &req.username, None).await? {
        errors.add("username", "has already been taken");
    }

    if !EMAIL_RE.is_match(&req.email) {
        errors.add("email", "is invalid");
    } else if user::email_taken(pool, &req.email, None).await? {
        errors.add("email", "has already been taken");
    }

    if req.password.chars().count() < MIN_PASSWORD_CHARS {
        errors.add("password", "is too short (minimum is 6 characters)");
    }

    errors.into_result().map_err(ApiError::from)
}

pub fn validate_login(req: &LoginUser) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if req.email.trim().is_empty() {
        errors.add("email", "can't be blank");
    }
    if req.password.is_empty() {
        errors.add("password", "can't be blank");
    }

    errors.into_result()
}

/// Update rules: a present field must pass the same checks as at
/// registration, with the account's own row excluded from uniqueness.
pub async fn validate_update(
    pool: &SqlitePool,
    user_id: i64,
    req: &UpdateUser,
) -> Result<(), ApiError> {
    let mut errors = ValidationErrors::new();

    if let Some(username) = &req.username {
        if username.trim().is_empty() {
            errors.add("username", "can't be blank");
        } else if user::username_taken(pool, username, Some(user_id)).await? {
            errors.add("username", "has already been taken");
        }
    }

    if let Some(email) = &req.email {
        if !EMAIL_RE.is_match(email) {
            errors.add("email", "is invalid");
        } else if user::email_taken(pool, email, Some(user_id)).await? {
            errors.add("email", "has already been taken");
        }
    }

    if let Some(password) = &req.password {
        if password.chars().count() < MIN_PASSWORD_CHARS {
            errors.add("password", "is too short (minimum is 6 characters)");
        }
    }

    errors.into_result().map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::connect_memory;

    fn register(username: &str, email: &str, password: &str) -> RegisterUser {
        RegisterUser {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn email_pattern_accepts_common_shapes() {
        for ok in ["a@b.co", "first.last@example.com", "user+tag@sub.domain.org"] {
            assert!(EMAIL_RE.is_match(ok), "{} should match", ok);
        }
        for bad in ["", "plain", "a@b", "a@.com", "@example.com", "a b@c.de"] {
            assert!(!EMAIL_RE.is_match(bad), "{} should not match", bad);
        }
    }

    #[tokio::test]
    async fn short_password_reports_the_password_field() {
        let pool = connect_memory().await.unwrap();
        let err = validate_register(&pool, &register("tester", "t@example.com", "12345"))
            .await
            .unwrap_err();

        match err {
            ApiError::Validation { field_errors } => {
                assert!(field_errors.contains_key("password"));
                assert!(!field_errors.contains_key("username"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn registration_collects_every_violation() {
        let pool = connect_memory().await.unwrap();
        let err = validate_register(&pool, &register("", "nope", "123"))
            .await
            .unwrap_err();

        match err {
            ApiError::Validation { field_errors } => {
                assert!(field_errors.contains_key("username"));
                assert!(field_errors.contains_key("email"));
                assert!(field_errors.contains_key("password"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn taken_username_and_email_are_reported() {
        let pool = connect_memory().await.unwrap();
        user::create_user(&pool, "taken", "taken@example.com", "hash")
            .await
            .unwrap();

        let err = validate_register(&pool, &register("taken", "taken@example.com", "password"))
            .await
            .unwrap_err();

        match err {
            ApiError::Validation { field_errors } => {
                assert_eq!(field_errors["username"], vec!["has already been taken"]);
                assert_eq!(field_errors["email"], vec!["has already been taken"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn update_ignores_absent_fields_but_checks_present_ones() {
        let pool = connect_memory().await.unwrap();
        let me = user::create_user(&pool, "me", "me@example.com", "hash")
            .await
            .unwrap();

        // Nothing supplied, nothing to complain about
        assert!(validate_update(&pool, me.id, &UpdateUser::default())
            .await
            .is_ok());

        // Keeping your own email is not a collision
        let keep_own = UpdateUser {
            email: Some("me@example.com".to_string()),
            ..Default::default()
        };
        assert!(validate_update(&pool, me.id, &keep_own).await.is_ok());

        // A present but invalid field still fails
        let bad = UpdateUser {
            password: Some("123".to_string()),
            ..Default::default()
        };
        assert!(validate_update(&pool, me.id, &bad).await.is_err());
    }

    #[test]
    fn login_requires_both_fields() {
        let err = validate_login(&LoginUser {
            email: String::new(),
            password: String::new(),
        })
        .unwrap_err();

        assert!(err.contains("email"));
        assert!(err.contains("password"));
    }
}
