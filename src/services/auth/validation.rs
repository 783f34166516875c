//! Form checks run before any request leaves the machine.

use std::fmt;

pub const INVALID_EMAIL: &str = "Please enter a valid email address";
pub const PASSWORD_REQUIRED: &str = "Password is required";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters";
pub const PASSWORD_NEEDS_UPPERCASE: &str = "Password must contain at least one uppercase letter";
pub const PASSWORD_NEEDS_NUMBER: &str = "Password must contain at least one number";
pub const PASSWORD_NEEDS_SYMBOL: &str = "Password must contain at least one symbol";

const MIN_PASSWORD_LEN: usize = 6;

/// Per-field messages shown inline under the form inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub email: Vec<String>,
    pub password: Vec<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.email.is_empty() && self.password.is_empty()
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let all: Vec<&str> = self
            .email
            .iter()
            .chain(self.password.iter())
            .map(String::as_str)
            .collect();
        f.write_str(&all.join("; "))
    }
}

/// `local@domain.tld` with no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Every sign-up rule the password breaks, in display order.
pub fn password_problems(password: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        problems.push(PASSWORD_TOO_SHORT.to_string());
    }
    if !password.chars().any(char::is_uppercase) {
        problems.push(PASSWORD_NEEDS_UPPERCASE.to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        problems.push(PASSWORD_NEEDS_NUMBER.to_string());
    }
    if !password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
    {
        problems.push(PASSWORD_NEEDS_SYMBOL.to_string());
    }
    problems
}

/// Sign-in only needs a plausible email and a non-empty password.
pub fn validate_sign_in(email: &str, password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if !is_valid_email(email.trim()) {
        errors.email.push(INVALID_EMAIL.to_string());
    }
    if password.is_empty() {
        errors.password.push(PASSWORD_REQUIRED.to_string());
    }
    errors.into_result()
}

pub fn validate_sign_up(email: &str, password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    if !is_valid_email(email.trim()) {
        errors.email.push(INVALID_EMAIL.to_string());
    }
    errors.password = password_problems(password);
    errors.into_result()
}
