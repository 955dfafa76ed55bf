//! Tests for recommend.rs

use voiceease_shared::recommend::{
    classify, generate_recommendation, ClassifierInput, Plan, BASE_CALL_FLOWS,
    CUSTOM_INDUSTRY_KEYWORDS,
};

fn intake<'a>(
    industry: &'a str,
    services: &'a str,
    appointment_types: &'a str,
    calendar: Option<&'a str>,
) -> ClassifierInput<'a> {
    ClassifierInput {
        business_name: "Acme",
        industry,
        services_offered: Some(services),
        appointment_types: Some(appointment_types),
        calendar_used: calendar,
    }
}

#[test]
fn test_dental_clinic_is_custom() {
    let rec = generate_recommendation(&intake(
        "Dental Clinic",
        "Cleanings",
        "Cleaning,Filling",
        Some("None"),
    ));
    assert_eq!(rec.plan, Plan::Custom);
}

#[test]
fn test_long_services_is_custom() {
    let services = "a".repeat(201);
    let rec = generate_recommendation(&intake("Retail", &services, "Sale", Some("None")));
    assert_eq!(rec.plan, Plan::Custom);
}

#[test]
fn test_services_at_limit_is_starter() {
    let services = "a".repeat(200);
    let rec = generate_recommendation(&intake("Retail", &services, "Sale", Some("None")));
    assert_eq!(rec.plan, Plan::Starter);
}

#[test]
fn test_four_appointment_types_is_custom() {
    let rec = generate_recommendation(&intake("Retail", "Shoes", "A,B,C,D", Some("None")));
    assert_eq!(rec.plan, Plan::Custom);
}

#[test]
fn test_three_appointment_types_is_starter() {
    let rec = generate_recommendation(&intake("Retail", "Shoes", "A,B,C", Some("None")));
    assert_eq!(rec.plan, Plan::Starter);
}

#[test]
fn test_external_calendar_is_custom() {
    let rec = generate_recommendation(&intake("Retail", "Shoes", "A,B", Some("Google Calendar")));
    assert_eq!(rec.plan, Plan::Custom);
}

#[test]
fn test_quiet_retail_is_starter() {
    let rec = generate_recommendation(&intake("Retail", "Shoes", "A,B", Some("None")));
    assert_eq!(rec.plan, Plan::Starter);
}

#[test]
fn test_absent_optional_fields_are_starter() {
    let input = ClassifierInput {
        business_name: "Acme",
        industry: "Bakery",
        ..Default::default()
    };
    assert_eq!(generate_recommendation(&input).plan, Plan::Starter);
}

#[test]
fn test_every_keyword_wins_regardless_of_other_fields() {
    for keyword in CUSTOM_INDUSTRY_KEYWORDS {
        let industry = format!("Downtown {}s", keyword.to_uppercase());
        let input = ClassifierInput {
            business_name: "Acme",
            industry: &industry,
            ..Default::default()
        };
        assert_eq!(
            generate_recommendation(&input).plan,
            Plan::Custom,
            "keyword {} should force Custom",
            keyword
        );
    }
}

#[test]
fn test_classifier_is_deterministic() {
    let input = intake("Hotel", "Rooms", "Stay", Some("Outlook"));
    let a = serde_json::to_vec(&classify(&input)).unwrap();
    let b = serde_json::to_vec(&classify(&input)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_call_flow_counts_share_prefix() {
    let custom = generate_recommendation(&intake("Lawyer", "Wills", "A", None));
    let starter = generate_recommendation(&intake("Retail", "Shoes", "A", None));

    assert_eq!(custom.data.call_flows.len(), 7);
    assert_eq!(starter.data.call_flows.len(), 5);
    assert_eq!(custom.data.call_flows[..5], starter.data.call_flows[..]);
    assert_eq!(starter.data.call_flows, BASE_CALL_FLOWS.to_vec());
}

#[test]
fn test_business_name_is_interpolated() {
    let input = ClassifierInput {
        business_name: "Demo Salon",
        industry: "Salons & Spas",
        ..Default::default()
    };
    let rec = generate_recommendation(&input);
    assert!(rec
        .data
        .sample_script
        .starts_with("Agent: \"Hi, thanks for calling Demo Salon. I'm the AI assistant."));
    assert_eq!(
        rec.data.expected_impact,
        "Reduce missed calls by up to 100% and increase booked appointments for Demo Salon."
    );
}
