//! User accounts, roles and credential validation.

use crate::error::{Result, VoiceEaseError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = VoiceEaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            _ => Err(VoiceEaseError::validation("role", "Invalid role")),
        }
    }
}

/// The authenticated caller of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: i64,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Public projection of a user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserView {
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            role: self.role,
        }
    }
}

/// Register / login body
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Credentials that passed validation
#[derive(Clone)]
pub struct ValidCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for ValidCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    /// Username must be an email address; password at least six characters.
    /// Usernames are compared case-insensitively, so they are lowercased here.
    pub fn validate(self) -> Result<ValidCredentials> {
        let username = self
            .username
            .map(|u| u.trim().to_lowercase())
            .unwrap_or_default();
        if !is_email(&username) {
            return Err(VoiceEaseError::validation("username", "Invalid email"));
        }

        let password = self.password.unwrap_or_default();
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(VoiceEaseError::validation(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }

        Ok(ValidCredentials { username, password })
    }
}

/// Admin role change body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleUpdate {
    pub role: Option<String>,
}

impl RoleUpdate {
    pub fn validate(self) -> Result<Role> {
        self.role
            .as_deref()
            .ok_or_else(|| VoiceEaseError::validation("role", "Invalid role"))?
            .parse()
    }
}

/// Loose email shape check: one `@`, non-empty local part, dotted domain.
pub fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
                    .unwrap_or(false)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shapes() {
        assert!(is_email("demo@voiceease.com"));
        assert!(is_email("a.b@mail.co.uk"));
        assert!(!is_email("demo"));
        assert!(!is_email("@voiceease.com"));
        assert!(!is_email("demo@localhost"));
        assert!(!is_email("de mo@voiceease.com"));
        assert!(!is_email("a@b@c.com"));
    }

    #[test]
    fn test_credentials_validation() {
        let ok = Credentials {
            username: Some(" Demo@VoiceEase.com ".into()),
            password: Some("secret1".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.username, "demo@voiceease.com");

        let short = Credentials {
            username: Some("demo@voiceease.com".into()),
            password: Some("12345".into()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(short.field(), Some("password"));

        let missing = Credentials::default().validate().unwrap_err();
        assert_eq!(missing.field(), Some("username"));
    }

    #[test]
    fn test_debug_hides_password() {
        let creds = ValidCredentials {
            username: "demo@voiceease.com".into(),
            password: "hunter22".into(),
        };
        assert!(!format!("{:?}", creds).contains("hunter22"));
    }

    #[test]
    fn test_role_update() {
        let role = RoleUpdate {
            role: Some("admin".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(role, Role::Admin);
        assert!(RoleUpdate {
            role: Some("owner".into())
        }
        .validate()
        .is_err());
        assert!(RoleUpdate::default().validate().is_err());
    }
}
