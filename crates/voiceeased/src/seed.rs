//! Start-up bootstrap: admin account, demo account and a sample request.
//!
//! Every step checks for existing rows first, so running it on every boot
//! is safe.

use crate::config::SeedConfig;
use crate::password::hash_password;
use crate::store::Store;
use anyhow::Result;
use tracing::info;
use voiceease_shared::{AgentRequestForm, NewAgentRequest, Role};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub demo_created: bool,
    pub sample_request_created: bool,
}

pub fn bootstrap(store: &Store, seed: &SeedConfig, iterations: u32) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    if store.get_user_by_username(&seed.admin_username)?.is_none() {
        let hash = hash_password(&seed.admin_password, iterations);
        store.create_user(&seed.admin_username, &hash, Role::Admin)?;
        info!("[SEED] Created admin account {}", seed.admin_username);
        report.admin_created = true;
    }

    if store.get_user_by_username(&seed.demo_username)?.is_none() {
        let hash = hash_password(&seed.demo_password, iterations);
        let demo = store.create_user(&seed.demo_username, &hash, Role::User)?;
        info!("[SEED] Created demo account {}", seed.demo_username);
        report.demo_created = true;

        let intake = sample_intake().validate()?;
        let request = store.insert_agent_request(&NewAgentRequest::classify(&demo.principal(), intake))?;
        info!(
            request_id = request.id,
            "[SEED] Created sample agent request for {}", request.intake.business_name
        );
        report.sample_request_created = true;
    }

    Ok(report)
}

fn sample_intake() -> AgentRequestForm {
    AgentRequestForm {
        business_name: Some("Demo Salon".into()),
        industry: Some("Salons & Spas".into()),
        business_phone: Some("555-0123".into()),
        business_hours: Some("Mon-Fri 9-5".into()),
        services_offered: Some("Haircuts, Coloring, Styling".into()),
        appointment_types: Some("Cut, Color".into()),
        calendar_used: Some("Google Calendar".into()),
        typical_questions: Some("How much is a cut?".into()),
        primary_goal: Some("Increase bookings".into()),
        preferred_language: Some("English".into()),
    }
}
