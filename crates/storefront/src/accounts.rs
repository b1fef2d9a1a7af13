//! Sign-in and registration forms.
//!
//! Both forms are validated locally first; a form with errors never reaches
//! the server.

use secrecy::{ExposeSecret, SecretString};
use shopfront_core::Email;

use crate::api::NewAccount;
use crate::validation::FieldErrors;

/// Username and password for `token/`.
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Both fields are required.
    ///
    /// # Errors
    ///
    /// Returns the missing fields.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.username.trim().is_empty() {
            errors.push("username", "Enter your username.");
        }
        if self.password.expose_secret().is_empty() {
            errors.push("password", "Enter your password.");
        }
        errors.into_result()
    }
}

/// The sign-up form.
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: SecretString,
    pub password_confirmation: SecretString,
}

impl std::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"[REDACTED]")
            .field("password_confirmation", &"[REDACTED]")
            .finish()
    }
}

/// A registration form that passed local validation.
#[derive(Debug)]
pub struct ValidRegistration<'a> {
    username: &'a str,
    email: Email,
    phone: &'a str,
    password: &'a SecretString,
}

impl ValidRegistration<'_> {
    /// The request body fields.
    #[must_use]
    pub fn as_new_account(&self) -> NewAccount<'_> {
        NewAccount {
            username: self.username,
            email: &self.email,
            phone: self.phone,
            password: self.password,
        }
    }
}

impl RegistrationForm {
    /// Check every field, collecting all failures.
    ///
    /// # Errors
    ///
    /// Returns every rule the form breaks.
    pub fn validate(&self) -> Result<ValidRegistration<'_>, FieldErrors> {
        let mut errors = FieldErrors::new();

        let username = self.username.trim();
        if username.is_empty() {
            errors.push("username", "Enter a username.");
        }

        let email = Email::parse(&self.email)
            .inspect_err(|e| errors.push("email", e.to_string()))
            .ok();

        let phone = self.phone.trim();
        if phone.is_empty() {
            errors.push("phone", "Enter a phone number.");
        }

        let password = self.password.expose_secret();
        if password.is_empty() {
            errors.push("password", "Enter a password.");
        } else if password != self.password_confirmation.expose_secret() {
            errors.push("password_confirmation", "Passwords do not match.");
        }

        match (email, errors.is_empty()) {
            (Some(email), true) => Ok(ValidRegistration {
                username,
                email,
                phone,
                password: &self.password,
            }),
            _ => Err(errors),
        }
    }
}
