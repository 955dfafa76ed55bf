//! Shared types and domain logic for VoiceEase components.
//!
//! Everything here is pure: no I/O, no clock reads except where a caller
//! passes a timestamp in.

pub mod accounts;
pub mod error;
pub mod intake;
pub mod lifecycle;
pub mod marketing;
pub mod recommend;

pub use accounts::{Credentials, Principal, Role, RoleUpdate, UserView, ValidCredentials};
pub use error::{Result, VoiceEaseError};
pub use intake::{AgentRequestForm, IntakeDetails};
pub use lifecycle::{AgentRequest, ConfirmPlan, Confirmation, NewAgentRequest, RequestStatus};
pub use marketing::{ContactForm, ContactMessage, DemoLead, DemoLeadForm, SystemStats};
pub use recommend::{
    classify, generate_recommendation, Classification, ClassificationReason, ClassifierInput,
    Plan, Recommendation, RecommendationData,
};
