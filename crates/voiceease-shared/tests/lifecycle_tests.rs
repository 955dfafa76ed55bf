//! Tests for lifecycle.rs

use chrono::Utc;
use voiceease_shared::lifecycle::{ensure_can_view, resolve_confirmation};
use voiceease_shared::{
    generate_recommendation, AgentRequest, AgentRequestForm, ClassifierInput, ConfirmPlan,
    NewAgentRequest, Plan, Principal, RequestStatus, Role, VoiceEaseError,
};

const ALICE: Principal = Principal {
    id: 1,
    role: Role::User,
};
const BOB: Principal = Principal {
    id: 2,
    role: Role::User,
};

fn request_for(owner: &Principal, industry: &str) -> AgentRequest {
    let intake = AgentRequestForm {
        business_name: Some("Harbor View".into()),
        industry: Some(industry.into()),
        business_phone: Some("555-0199".into()),
        appointment_types: Some("Check-in".into()),
        calendar_used: Some("None".into()),
        ..Default::default()
    }
    .validate()
    .unwrap();
    let new = NewAgentRequest::classify(owner, intake);
    let now = Utc::now();
    AgentRequest {
        id: 1,
        user_id: new.user_id,
        intake: new.intake,
        recommendation: Some(new.recommendation),
        plan_selected: None,
        status: new.status,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn test_create_classifies_inline() {
    let req = request_for(&ALICE, "Boutique Hotel");
    assert_eq!(req.status, RequestStatus::New);
    assert_eq!(req.recommendation.unwrap().plan, Plan::Custom);

    let req = request_for(&ALICE, "Bakery");
    assert_eq!(req.recommendation.unwrap().plan, Plan::Starter);
}

#[test]
fn test_other_user_cannot_confirm() {
    let mut req = request_for(&ALICE, "Bakery");
    let before = req.clone();

    let result = resolve_confirmation(&req, &BOB, &ConfirmPlan::default());
    assert_eq!(result, Err(VoiceEaseError::Unauthorized));

    // Nothing to apply, so the record is untouched
    if let Ok(c) = result {
        req.apply(c, Utc::now());
    }
    assert_eq!(req, before);
    assert_eq!(req.status, RequestStatus::New);
}

#[test]
fn test_other_user_cannot_view() {
    let req = request_for(&ALICE, "Bakery");
    assert_eq!(ensure_can_view(&req, &BOB), Err(VoiceEaseError::Unauthorized));
    assert!(ensure_can_view(&req, &ALICE).is_ok());
}

#[test]
fn test_owner_confirm_moves_to_requested() {
    let mut req = request_for(&ALICE, "Bakery");
    let c = resolve_confirmation(
        &req,
        &ALICE,
        &ConfirmPlan {
            plan_selected: None,
            status: Some("REQUESTED".into()),
        },
    )
    .unwrap();
    req.apply(c, Utc::now());
    assert_eq!(req.status, RequestStatus::Requested);
    assert_eq!(req.plan_selected.as_deref(), Some("Starter"));
}

#[test]
fn test_recommended_cannot_be_requested_by_caller() {
    let req = request_for(&ALICE, "Bakery");
    let err = resolve_confirmation(
        &req,
        &ALICE,
        &ConfirmPlan {
            plan_selected: None,
            status: Some("RECOMMENDED".into()),
        },
    )
    .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

/// The create path must agree with the classifier run on the submitted text
fn create_path_plan(services: &str, calendar: &str) -> (Plan, Plan) {
    let form = AgentRequestForm {
        business_name: Some("Harbor View".into()),
        industry: Some("Retail".into()),
        business_phone: Some("555-0199".into()),
        services_offered: Some(services.into()),
        appointment_types: Some("Check-in".into()),
        calendar_used: Some(calendar.into()),
        ..Default::default()
    };
    let direct = generate_recommendation(&ClassifierInput {
        business_name: "Harbor View",
        industry: "Retail",
        services_offered: Some(services),
        appointment_types: Some("Check-in"),
        calendar_used: Some(calendar),
    });
    let created = NewAgentRequest::classify(&ALICE, form.validate().unwrap());
    (direct.plan, created.recommendation.plan)
}

#[test]
fn test_padded_calendar_is_external() {
    let (direct, created) = create_path_plan("Shoes", " None ");
    assert_eq!(direct, Plan::Custom);
    assert_eq!(created, Plan::Custom);
}

#[test]
fn test_trailing_spaces_count_toward_services_length() {
    let services = format!("{}  ", "a".repeat(200));
    let (direct, created) = create_path_plan(&services, "None");
    assert_eq!(direct, Plan::Custom);
    assert_eq!(created, Plan::Custom);
}

#[test]
fn test_plain_intake_agrees_with_classifier() {
    let (direct, created) = create_path_plan("Shoes", "None");
    assert_eq!(direct, Plan::Starter);
    assert_eq!(created, Plan::Starter);
}
