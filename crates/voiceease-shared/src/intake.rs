//! Agent request intake form and its validation.
//!
//! The form arrives with every field optional so that validation can name
//! the first missing field instead of failing on deserialization.

use crate::error::{Result, VoiceEaseError};
use crate::recommend::ClassifierInput;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PREFERRED_LANGUAGE: &str = "English";

/// Raw create-request body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRequestForm {
    pub business_name: Option<String>,
    pub industry: Option<String>,
    pub business_phone: Option<String>,
    pub business_hours: Option<String>,
    pub services_offered: Option<String>,
    pub appointment_types: Option<String>,
    pub calendar_used: Option<String>,
    pub typical_questions: Option<String>,
    pub primary_goal: Option<String>,
    pub preferred_language: Option<String>,
}

/// Validated intake details stored on an agent request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeDetails {
    pub business_name: String,
    pub industry: String,
    pub business_phone: String,
    pub business_hours: Option<String>,
    pub services_offered: Option<String>,
    pub appointment_types: Option<String>,
    pub calendar_used: Option<String>,
    pub typical_questions: Option<String>,
    pub primary_goal: Option<String>,
    pub preferred_language: String,
}

impl AgentRequestForm {
    /// Check required fields in form order and normalize the optional ones.
    ///
    /// Required: businessName, industry, businessPhone. Descriptive optional
    /// fields are trimmed and blank values become absent. The fields the
    /// classifier measures (services, appointment types, calendar) keep their
    /// text as submitted; only an empty string counts as absent.
    pub fn validate(self) -> Result<IntakeDetails> {
        let business_name = required("businessName", self.business_name)?;
        let industry = required("industry", self.industry)?;
        let business_phone = required("businessPhone", self.business_phone)?;

        Ok(IntakeDetails {
            business_name,
            industry,
            business_phone,
            business_hours: optional(self.business_hours),
            services_offered: present(self.services_offered),
            appointment_types: present(self.appointment_types),
            calendar_used: present(self.calendar_used),
            typical_questions: optional(self.typical_questions),
            primary_goal: optional(self.primary_goal),
            preferred_language: optional(self.preferred_language)
                .unwrap_or_else(|| DEFAULT_PREFERRED_LANGUAGE.to_string()),
        })
    }
}

impl IntakeDetails {
    pub fn classifier_input(&self) -> ClassifierInput<'_> {
        ClassifierInput {
            business_name: &self.business_name,
            industry: &self.industry,
            services_offered: self.services_offered.as_deref(),
            appointment_types: self.appointment_types.as_deref(),
            calendar_used: self.calendar_used.as_deref(),
        }
    }
}

pub(crate) fn required(field: &str, value: Option<String>) -> Result<String> {
    match optional(value) {
        Some(v) => Ok(v),
        None => Err(VoiceEaseError::validation(
            field,
            format!("{} is required", field),
        )),
    }
}

/// Non-empty value, untouched
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
