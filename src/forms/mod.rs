//! Submitted auth forms and their validation rules.
//!
//! Each field reports only its first failing rule, so every field rule is a
//! single custom function that checks its conditions in order.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

use crate::auth::{EmailSignIn, EmailSignUp};

pub const SIGN_IN_FALLBACK: &str = "An error occurred during sign in. Please try again.";
pub const SIGN_UP_FALLBACK: &str = "An error occurred during sign up. Please try again.";
pub const FORGOT_PASSWORD_FALLBACK: &str = "An error occurred while sending the reset email. Please try again.";
pub const RESET_PASSWORD_FALLBACK: &str = "An error occurred while resetting your password. Please try again.";
pub const MISSING_RESET_TOKEN: &str = "Invalid or missing reset token.";

/// Code that schema-level rules use to name the field they report on
const SCHEMA_KEY: &str = "__all__";

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct SignInForm {
    #[validate(custom(function = "sign_in_email"))]
    pub email: String,
    #[validate(custom(function = "sign_in_password"))]
    #[serde(skip_serializing)]
    pub password: String,
}

impl SignInForm {
    pub fn credentials(&self) -> EmailSignIn {
        EmailSignIn {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct SignUpForm {
    #[validate(custom(function = "sign_up_name"))]
    pub name: String,
    #[validate(custom(function = "sign_up_email"))]
    pub email: String,
    #[validate(custom(function = "new_password"))]
    #[serde(skip_serializing)]
    pub password: String,
}

impl SignUpForm {
    pub fn account(&self) -> EmailSignUp {
        EmailSignUp {
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct ForgotPasswordForm {
    #[validate(custom(function = "forgot_email"))]
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(default)]
#[validate(schema(function = "passwords_match", skip_on_field_errors = true))]
pub struct ResetPasswordForm {
    #[validate(custom(function = "new_password"))]
    #[serde(skip_serializing)]
    pub password: String,
    #[validate(custom(function = "new_password"))]
    #[serde(skip_serializing)]
    pub confirm_password: String,
    pub token: Option<String>,
}

impl ResetPasswordForm {
    /// The reset token, when one was submitted
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Inline errors for a form: one message per field plus a form-level one
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormErrors {
    pub fields: BTreeMap<String, String>,
    pub root: Option<String>,
}

impl FormErrors {
    pub fn root(message: impl Into<String>) -> Self {
        Self {
            fields: BTreeMap::new(),
            root: Some(message.into()),
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

impl From<&ValidationErrors> for FormErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut fields = BTreeMap::new();
        for (field, list) in errors.field_errors() {
            let Some(first) = list.first() else {
                continue;
            };
            let key = if field.to_string() == SCHEMA_KEY {
                first.code.to_string()
            } else {
                field.to_string()
            };
            let message = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| first.code.to_string());
            fields.entry(key).or_insert(message);
        }
        Self { fields, root: None }
    }
}

/// Run the form's rules, collecting the first message per field
pub fn check<F: Validate>(form: &F) -> Result<(), FormErrors> {
    form.validate().map_err(|errors| FormErrors::from(&errors))
}

fn failure(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn is_email(value: &str) -> bool {
    value.to_string().validate_email()
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn sign_in_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(failure("required", "Email is required."));
    }
    if char_len(value) > 256 {
        return Err(failure("length", "Invalid Email or password."));
    }
    if !is_email(value) {
        return Err(failure("email", "Invalid email."));
    }
    Ok(())
}

fn sign_in_password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(failure("required", "Password is required."));
    }
    if char_len(value) > 128 {
        return Err(failure("length", "Invalid Email or password."));
    }
    Ok(())
}

fn sign_up_name(value: &str) -> Result<(), ValidationError> {
    let len = char_len(value);
    if len < 2 {
        return Err(failure("length", "Name must be at least 2 characters."));
    }
    if len > 128 {
        return Err(failure("length", "Name is too long."));
    }
    Ok(())
}

fn sign_up_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(failure("required", "Email is required."));
    }
    if !is_email(value) {
        return Err(failure("email", "Please enter a valid email address."));
    }
    if char_len(value) > 256 {
        return Err(failure("length", "Email is too long."));
    }
    Ok(())
}

fn forgot_email(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(failure("required", "Email is required."));
    }
    if char_len(value) > 256 {
        return Err(failure("length", "Email is too long."));
    }
    if !is_email(value) {
        return Err(failure("email", "Invalid email."));
    }
    Ok(())
}

fn new_password(value: &str) -> Result<(), ValidationError> {
    let len = char_len(value);
    if len < 6 {
        return Err(failure("length", "Password must be at least 6 characters."));
    }
    if len > 128 {
        return Err(failure("length", "Password is too long."));
    }
    Ok(())
}

fn passwords_match(form: &ResetPasswordForm) -> Result<(), ValidationError> {
    if form.password != form.confirm_password {
        // Reported against the confirmation field
        return Err(failure("confirm_password", "Passwords don't match."));
    }
    Ok(())
}
