//! Registration input rules.

use regex::Regex;
use thiserror::Error;

pub const USERNAME_MIN_LEN: usize = 5;
pub const USERNAME_MAX_LEN: usize = 20;
pub const PASSWORD_MIN_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("Username is empty!")]
    UsernameEmpty,
    #[error("Username should be longer than 5 symbols!")]
    UsernameTooShort,
    #[error("Username should be shorter than 20 symbols!")]
    UsernameTooLong,
    #[error("Username should contain only letters and numbers")]
    UsernameNotAlphanumeric,
    #[error("Password is empty!")]
    PasswordEmpty,
    #[error("Password should be longer then 8 symbols!")]
    PasswordTooShort,
    #[error(r#"Password should contain only letters, numbers and "!@#$%^&*()_+.," symbols"#)]
    PasswordCharset,
}

/// The first 8 characters must come from the allowed set; whatever follows
/// them is accepted.
pub fn valid_password(password: &str) -> bool {
    Regex::new(r"^[a-zA-Z0-9!@#$%^&*()_+.,]{8,30}").is_ok_and(|re| re.is_match(password))
}

/// Check a registration form, returning the violations in display order.
///
/// At most one username and one password violation is reported. An empty
/// password replaces everything else with [`Violation::PasswordEmpty`].
#[must_use]
pub fn validate(username: &str, password: &str) -> Vec<Violation> {
    let mut violations = Vec::new();

    let username_len = username.chars().count();
    if username.is_empty() {
        return vec![Violation::UsernameEmpty];
    } else if username_len < USERNAME_MIN_LEN {
        violations.push(Violation::UsernameTooShort);
    } else if username_len > USERNAME_MAX_LEN {
        violations.push(Violation::UsernameTooLong);
    } else if !username.chars().all(char::is_alphanumeric) {
        violations.push(Violation::UsernameNotAlphanumeric);
    }

    if password.is_empty() {
        return vec![Violation::PasswordEmpty];
    } else if password.chars().count() < PASSWORD_MIN_LEN {
        violations.push(Violation::PasswordTooShort);
    } else if !valid_password(password) {
        violations.push(Violation::PasswordCharset);
    }

    violations
}
