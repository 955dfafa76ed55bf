//! Deterministic plan recommendation for agent requests.
//!
//! A request is classified `Custom` when any complexity signal fires:
//! a regulated/hospitality industry keyword, a long services description,
//! more than three appointment types, or an external calendar. Otherwise
//! it is `Starter`. No scoring and no weighting: the signals are ORed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Industry substrings (matched case-insensitively) that require a custom build
pub const CUSTOM_INDUSTRY_KEYWORDS: [&str; 6] =
    ["dentist", "doctor", "clinic", "lawyer", "resort", "hotel"];

/// Longest services description (in characters) that still fits Starter
pub const MAX_STARTER_SERVICES_CHARS: usize = 200;

/// Most comma-separated appointment types that still fit Starter
pub const MAX_STARTER_APPOINTMENT_TYPES: usize = 3;

/// Calendar value meaning "no calendar integration"
pub const NO_CALENDAR: &str = "None";

/// Call flows every plan gets, in display order
pub const BASE_CALL_FLOWS: [&str; 5] = [
    "Greeting & Company Intro",
    "Service Inquiry & Qualification",
    "Appointment Scheduling",
    "FAQ Handling",
    "Out of Hours Routing",
];

/// Extra call flows appended for Custom plans
pub const CUSTOM_CALL_FLOWS: [&str; 2] = ["Complex Routing Logic", "CRM Integration Handshake"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Plan {
    Starter,
    Custom,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Starter => "Starter",
            Plan::Custom => "Custom",
        }
    }

    /// Display price shown next to the plan
    pub fn list_price(&self) -> &'static str {
        match self {
            Plan::Starter => "$500",
            Plan::Custom => "$1000",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Starter" => Ok(Plan::Starter),
            "Custom" => Ok(Plan::Custom),
            other => Err(format!("unknown plan '{}'", other)),
        }
    }
}

/// Display material that accompanies a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationData {
    pub call_flows: Vec<String>,
    pub sample_script: String,
    pub expected_impact: String,
}

/// Plan label and its display data. Always set together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "recommendationPlan")]
    pub plan: Plan,
    #[serde(rename = "recommendationData")]
    pub data: RecommendationData,
}

/// Which complexity signal pushed a request to Custom
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassificationReason {
    IndustryKeyword { keyword: String },
    ServicesTooLong { chars: usize },
    ManyAppointmentTypes { count: usize },
    ExternalCalendar { calendar: String },
}

impl fmt::Display for ClassificationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndustryKeyword { keyword } => write!(f, "industry matches '{}'", keyword),
            Self::ServicesTooLong { chars } => write!(
                f,
                "services description is {} chars (> {})",
                chars, MAX_STARTER_SERVICES_CHARS
            ),
            Self::ManyAppointmentTypes { count } => write!(
                f,
                "{} appointment types (> {})",
                count, MAX_STARTER_APPOINTMENT_TYPES
            ),
            Self::ExternalCalendar { calendar } => write!(f, "uses calendar '{}'", calendar),
        }
    }
}

/// The fields the classifier looks at
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifierInput<'a> {
    pub business_name: &'a str,
    pub industry: &'a str,
    pub services_offered: Option<&'a str>,
    pub appointment_types: Option<&'a str>,
    pub calendar_used: Option<&'a str>,
}

/// Recommendation plus the signals that fired
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    #[serde(flatten)]
    pub recommendation: Recommendation,
    pub reasons: Vec<ClassificationReason>,
}

impl Classification {
    pub fn plan(&self) -> Plan {
        self.recommendation.plan
    }
}

/// Evaluate every signal and build the recommendation.
pub fn classify(input: &ClassifierInput<'_>) -> Classification {
    let mut reasons = Vec::new();

    let industry = input.industry.to_lowercase();
    if let Some(keyword) = CUSTOM_INDUSTRY_KEYWORDS
        .iter()
        .find(|k| industry.contains(*k))
    {
        reasons.push(ClassificationReason::IndustryKeyword {
            keyword: keyword.to_string(),
        });
    }

    let services_chars = input.services_offered.map_or(0, |s| s.chars().count());
    if services_chars > MAX_STARTER_SERVICES_CHARS {
        reasons.push(ClassificationReason::ServicesTooLong {
            chars: services_chars,
        });
    }

    let appointment_count = input.appointment_types.map_or(0, |s| s.split(',').count());
    if appointment_count > MAX_STARTER_APPOINTMENT_TYPES {
        reasons.push(ClassificationReason::ManyAppointmentTypes {
            count: appointment_count,
        });
    }

    if let Some(calendar) = input.calendar_used {
        if !calendar.is_empty() && calendar != NO_CALENDAR {
            reasons.push(ClassificationReason::ExternalCalendar {
                calendar: calendar.to_string(),
            });
        }
    }

    let plan = if reasons.is_empty() {
        Plan::Starter
    } else {
        Plan::Custom
    };

    Classification {
        recommendation: Recommendation {
            plan,
            data: recommendation_data(plan, input.business_name),
        },
        reasons,
    }
}

/// Plan and display data for an intake. Pure and total.
pub fn generate_recommendation(input: &ClassifierInput<'_>) -> Recommendation {
    classify(input).recommendation
}

fn recommendation_data(plan: Plan, business_name: &str) -> RecommendationData {
    let mut call_flows: Vec<String> = BASE_CALL_FLOWS.iter().map(|s| s.to_string()).collect();
    if plan == Plan::Custom {
        call_flows.extend(CUSTOM_CALL_FLOWS.iter().map(|s| s.to_string()));
    }

    RecommendationData {
        call_flows,
        sample_script: format!(
            "Agent: \"Hi, thanks for calling {}. I'm the AI assistant. How can I help you today?\"\n\
             Caller: \"I'd like to book an appointment.\"\n\
             Agent: \"I can help with that. What service are you looking for?\"",
            business_name
        ),
        expected_impact: format!(
            "Reduce missed calls by up to 100% and increase booked appointments for {}.",
            business_name
        ),
    }
}
