//! Demo leads and contact messages from the public site.

use crate::accounts::is_email;
use crate::error::{Result, VoiceEaseError};
use crate::intake::{optional, required};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoLeadForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub business_name: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDemoLead {
    pub name: String,
    pub email: String,
    pub business_name: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoLead {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub business_name: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DemoLeadForm {
    pub fn validate(self) -> Result<NewDemoLead> {
        Ok(NewDemoLead {
            name: required("name", self.name)?,
            email: email("email", self.email)?,
            business_name: optional(self.business_name),
            phone: optional(self.phone),
            message: optional(self.message),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl ContactForm {
    pub fn validate(self) -> Result<NewContactMessage> {
        Ok(NewContactMessage {
            name: required("name", self.name)?,
            email: email("email", self.email)?,
            message: required("message", self.message)?,
        })
    }
}

/// Row counts for the admin dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStats {
    pub user_count: u64,
    pub request_count: u64,
    pub lead_count: u64,
    pub contact_count: u64,
}

fn email(field: &str, value: Option<String>) -> Result<String> {
    let value = required(field, value)?;
    if is_email(&value) {
        Ok(value)
    } else {
        Err(VoiceEaseError::validation(field, "Invalid email"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_lead_requires_name_and_email() {
        let err = DemoLeadForm {
            email: Some("jo@shop.com".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field(), Some("name"));

        let err = DemoLeadForm {
            name: Some("Jo".into()),
            email: Some("not-an-email".into()),
            ..Default::default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field(), Some("email"));
    }

    #[test]
    fn test_contact_requires_message() {
        let err = ContactForm {
            name: Some("Jo".into()),
            email: Some("jo@shop.com".into()),
            message: Some(" ".into()),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field(), Some("message"));
    }
}
