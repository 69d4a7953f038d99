use std::fmt;

use serde::Deserialize;

use super::AuthError;
use crate::backend::Credentials;

/// Sign-up form as submitted from the account page.
#[derive(Clone, Default, Deserialize)]
pub struct SignUpForm {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for SignUpForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignUpForm")
            .field("company_name", &self.company_name)
            .field("contact_name", &self.contact_name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl SignUpForm {
    /// Client-side checks; nothing leaves the process when these fail.
    pub fn validate(&self) -> Result<Credentials, AuthError> {
        validate_credentials(&self.email, &self.password)
    }
}

#[derive(Clone, Default, Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for SignInForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInForm")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl SignInForm {
    pub fn validate(&self) -> Result<Credentials, AuthError> {
        validate_credentials(&self.email, &self.password)
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<Credentials, AuthError> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::Validation("A valid email is required".to_string()));
    }
    if password.trim().is_empty() {
        return Err(AuthError::Validation("Password is required".to_string()));
    }
    Ok(Credentials::new(email, password))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(email: &str, password: &str) -> SignUpForm {
        SignUpForm {
            company_name: "Acme Insurance".into(),
            contact_name: "Dana".into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn test_empty_or_blank_password_is_rejected() {
        assert_eq!(
            form("dana@acme.test", "").validate(),
            Err(AuthError::Validation("Password is required".into()))
        );
        assert_eq!(
            form("dana@acme.test", "   ").validate(),
            Err(AuthError::Validation("Password is required".into()))
        );
    }

    #[test]
    fn test_email_must_look_like_an_address() {
        assert!(form("", "secret-pass").validate().is_err());
        assert!(form("dana.acme.test", "secret-pass").validate().is_err());
    }

    #[test]
    fn test_valid_form_trims_email_but_not_password() {
        let credentials = form("  dana@acme.test ", " pass word ").validate().unwrap();
        assert_eq!(credentials.email, "dana@acme.test");
        assert_eq!(credentials.password, " pass word ");
    }

    #[test]
    fn test_debug_never_prints_password() {
        let printed = format!("{:?}", form("dana@acme.test", "hunter22"));
        assert!(!printed.contains("hunter22"));
        let printed = format!(
            "{:?}",
            SignInForm { email: "dana@acme.test".into(), password: "hunter22".into() }
        );
        assert!(!printed.contains("hunter22"));
    }
}
