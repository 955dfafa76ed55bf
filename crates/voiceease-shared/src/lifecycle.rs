//! Agent request lifecycle.
//!
//! ```text
//! create ──> NEW (recommendation attached) ──confirm──> REQUESTED
//! ```
//!
//! `RECOMMENDED` is kept as a readable status for stored rows and status
//! counts, but no transition assigns it. Ownership is fixed at creation.

use crate::accounts::Principal;
use crate::error::{Result, VoiceEaseError};
use crate::intake::IntakeDetails;
use crate::recommend::{classify, ClassificationReason, Recommendation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    #[default]
    New,
    Recommended,
    Requested,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::New => "NEW",
            RequestStatus::Recommended => "RECOMMENDED",
            RequestStatus::Requested => "REQUESTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Requested)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = VoiceEaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "NEW" => Ok(RequestStatus::New),
            "RECOMMENDED" => Ok(RequestStatus::Recommended),
            "REQUESTED" => Ok(RequestStatus::Requested),
            other => Err(VoiceEaseError::validation(
                "status",
                format!("Unknown status '{}'", other),
            )),
        }
    }
}

/// A persisted agent request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRequest {
    pub id: i64,
    pub user_id: i64,
    #[serde(flatten)]
    pub intake: IntakeDetails,
    #[serde(flatten)]
    pub recommendation: Option<Recommendation>,
    pub plan_selected: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A classified request ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAgentRequest {
    pub user_id: i64,
    pub intake: IntakeDetails,
    pub recommendation: Recommendation,
    pub reasons: Vec<ClassificationReason>,
    pub status: RequestStatus,
}

impl NewAgentRequest {
    /// Classify the intake for `owner`. The record starts in `NEW` with the
    /// recommendation already attached.
    pub fn classify(owner: &Principal, intake: IntakeDetails) -> Self {
        let classification = classify(&intake.classifier_input());
        Self {
            user_id: owner.id,
            intake,
            recommendation: classification.recommendation,
            reasons: classification.reasons,
            status: RequestStatus::New,
        }
    }
}

/// Owner confirmation body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPlan {
    pub plan_selected: Option<String>,
    pub status: Option<String>,
}

/// The write a confirmation resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub plan_selected: String,
    pub status: RequestStatus,
}

/// Owners and admins may read a request.
pub fn ensure_can_view(request: &AgentRequest, caller: &Principal) -> Result<()> {
    if request.user_id == caller.id || caller.is_admin() {
        Ok(())
    } else {
        Err(VoiceEaseError::Unauthorized)
    }
}

/// Only the owner may change a request.
pub fn ensure_owner(request: &AgentRequest, caller: &Principal) -> Result<()> {
    if request.user_id == caller.id {
        Ok(())
    } else {
        Err(VoiceEaseError::Unauthorized)
    }
}

/// Resolve an owner confirmation into the fields to write.
///
/// `planSelected` defaults to the recommended plan. The only status a
/// caller may ask for is `REQUESTED`. Re-confirming a `REQUESTED` request
/// is allowed and rewrites `planSelected`.
pub fn resolve_confirmation(
    request: &AgentRequest,
    caller: &Principal,
    confirm: &ConfirmPlan,
) -> Result<Confirmation> {
    ensure_owner(request, caller)?;

    if let Some(status) = confirm.status.as_deref() {
        let status: RequestStatus = status.trim().parse()?;
        if status != RequestStatus::Requested {
            return Err(VoiceEaseError::validation(
                "status",
                format!("Cannot move a request to {}", status),
            ));
        }
    }

    let supplied = confirm
        .plan_selected
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());

    let plan_selected = match (supplied, &request.recommendation, &request.plan_selected) {
        (Some(plan), _, _) => plan.to_string(),
        (None, _, Some(previous)) if request.status.is_terminal() => previous.clone(),
        (None, Some(rec), _) => rec.plan.to_string(),
        (None, None, _) => {
            return Err(VoiceEaseError::validation(
                "planSelected",
                "planSelected is required",
            ))
        }
    };

    Ok(Confirmation {
        plan_selected,
        status: RequestStatus::Requested,
    })
}

impl AgentRequest {
    /// Apply a resolved confirmation in memory.
    pub fn apply(&mut self, confirmation: Confirmation, now: DateTime<Utc>) {
        self.plan_selected = Some(confirmation.plan_selected);
        self.status = confirmation.status;
        self.updated_at = now;
    }
}
