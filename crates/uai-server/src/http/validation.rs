//! Request checks applied before any workflow runs.

use std::sync::LazyLock;

use regex::Regex;

use super::handlers::{ActivateRequest, CreateUserRequest, LoginRequest};
use crate::error::ServiceError;

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_EMAIL_BYTES: usize = 254;
pub const MIN_PASSWORD_BYTES: usize = 8;
/// Longer inputs would be silently truncated by some digest schemes.
pub const MAX_PASSWORD_BYTES: usize = 72;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("static regex should compile")
});

/// Rejected at activation regardless of length. Compared case-insensitively.
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "passw0rd",
    "12345678",
    "123456789",
    "1234567890",
    "87654321",
    "11111111",
    "00000000",
    "qwertyui",
    "qwerty123",
    "qwertyuiop",
    "1q2w3e4r",
    "1qaz2wsx",
    "abc12345",
    "abcd1234",
    "iloveyou",
    "sunshine",
    "princess",
    "football",
    "baseball",
    "superman",
    "trustno1",
    "welcome1",
    "letmein1",
    "starwars",
    "whatever",
    "dragon12",
    "master123",
    "changeme",
    "admin123",
    "administrator",
];

pub fn new_user(request: &CreateUserRequest) -> Result<(), ServiceError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ServiceError::invalid("name", "must be provided"));
    }
    if name.chars().count() > MAX_NAME_CHARS {
        return Err(ServiceError::invalid(
            "name",
            format!("must not be more than {MAX_NAME_CHARS} characters long"),
        ));
    }
    email(request.email.trim())?;
    if request.roles.is_empty() {
        return Err(ServiceError::invalid("roles", "must contain at least one role"));
    }
    Ok(())
}

pub fn activation(request: &ActivateRequest) -> Result<(), ServiceError> {
    if request.token.trim().is_empty() {
        return Err(ServiceError::invalid("token", "must be provided"));
    }
    password(&request.password)
}

pub fn login(request: &LoginRequest) -> Result<(), ServiceError> {
    if request.email.trim().is_empty() {
        return Err(ServiceError::invalid("email", "must be provided"));
    }
    if request.password.is_empty() {
        return Err(ServiceError::invalid("password", "must be provided"));
    }
    Ok(())
}

pub fn password(password: &str) -> Result<(), ServiceError> {
    if password.is_empty() {
        return Err(ServiceError::invalid("password", "must be provided"));
    }
    if password.len() < MIN_PASSWORD_BYTES {
        return Err(ServiceError::invalid(
            "password",
            format!("must be at least {MIN_PASSWORD_BYTES} bytes long"),
        ));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ServiceError::invalid(
            "password",
            format!("must not be more than {MAX_PASSWORD_BYTES} bytes long"),
        ));
    }
    if is_common_password(password) {
        return Err(ServiceError::invalid("password", "is too common"));
    }
    Ok(())
}

pub fn email(email: &str) -> Result<(), ServiceError> {
    if email.is_empty() {
        return Err(ServiceError::invalid("email", "must be provided"));
    }
    if !looks_like_email(email) {
        return Err(ServiceError::invalid("email", "must be a valid email address"));
    }
    Ok(())
}

fn looks_like_email(email: &str) -> bool {
    email.len() <= MAX_EMAIL_BYTES && EMAIL_RE.is_match(email)
}

fn is_common_password(password: &str) -> bool {
    COMMON_PASSWORDS
        .iter()
        .any(|common| common.eq_ignore_ascii_case(password))
}
