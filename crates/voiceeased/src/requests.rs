//! Agent request operations: create (classify + persist), read, confirm.

use crate::error::{ApiError, ApiResult};
use crate::store::{ConfirmOutcome, Store};
use tracing::{info, warn};
use voiceease_shared::lifecycle::{ensure_can_view, resolve_confirmation};
use voiceease_shared::{AgentRequest, AgentRequestForm, ConfirmPlan, NewAgentRequest, Principal};

/// Validate, classify and store a new request for `owner`.
///
/// Classification happens before the insert; if the insert fails nothing
/// is kept.
pub fn create(store: &Store, owner: &Principal, form: AgentRequestForm) -> ApiResult<AgentRequest> {
    let intake = form.validate()?;
    let new = NewAgentRequest::classify(owner, intake);
    let reasons: Vec<String> = new.reasons.iter().map(|r| r.to_string()).collect();

    let saved = store.insert_agent_request(&new)?;
    info!(
        request_id = saved.id,
        user_id = owner.id,
        plan = %new.recommendation.plan,
        reasons = ?reasons,
        "Agent request classified"
    );
    Ok(saved)
}

/// Requests owned by `caller`
pub fn list_own(store: &Store, caller: &Principal) -> ApiResult<Vec<AgentRequest>> {
    Ok(store.list_agent_requests_for_user(caller.id)?)
}

/// One request, visible to its owner and to admins
pub fn get(store: &Store, caller: &Principal, id: i64) -> ApiResult<AgentRequest> {
    let request = store
        .get_agent_request(id)?
        .ok_or_else(|| ApiError::not_found("Request"))?;
    if let Err(err) = ensure_can_view(&request, caller) {
        warn!(request_id = id, user_id = caller.id, "Read rejected: {}", err);
        return Err(err.into());
    }
    Ok(request)
}

/// Owner confirmation: NEW/REQUESTED -> REQUESTED with `planSelected` set.
pub fn confirm(
    store: &Store,
    caller: &Principal,
    id: i64,
    body: ConfirmPlan,
) -> ApiResult<AgentRequest> {
    let outcome =
        store.confirm_agent_request(id, |request| resolve_confirmation(request, caller, &body))?;

    match outcome {
        ConfirmOutcome::Updated(request) => {
            info!(
                request_id = request.id,
                user_id = caller.id,
                plan_selected = request.plan_selected.as_deref().unwrap_or_default(),
                "Agent request confirmed"
            );
            Ok(request)
        }
        ConfirmOutcome::Missing => Err(ApiError::not_found("Request")),
        ConfirmOutcome::Rejected(err) => {
            warn!(request_id = id, user_id = caller.id, "Confirmation rejected: {}", err);
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voiceease_shared::{Plan, RequestStatus, Role};

    fn setup() -> (Store, Principal, Principal) {
        let store = Store::open_in_memory().unwrap();
        let alice = store.create_user("alice@shop.com", "x", Role::User).unwrap();
        let bob = store.create_user("bob@shop.com", "x", Role::User).unwrap();
        (store, alice.principal(), bob.principal())
    }

    fn form(industry: &str) -> AgentRequestForm {
        AgentRequestForm {
            business_name: Some("Harbor".into()),
            industry: Some(industry.into()),
            business_phone: Some("555-0100".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_requires_fields() {
        let (store, alice, _) = setup();
        let mut f = form("Retail");
        f.business_phone = None;
        let err = create(&store, &alice, f).unwrap_err();
        assert_eq!(err.0.field(), Some("businessPhone"));
        assert_eq!(store.stats().unwrap().request_count, 0);
    }

    #[test]
    fn test_create_and_confirm() {
        let (store, alice, _) = setup();
        let created = create(&store, &alice, form("Law Office - Lawyer")).unwrap();
        assert_eq!(created.recommendation.as_ref().unwrap().plan, Plan::Custom);
        assert_eq!(created.status, RequestStatus::New);

        let confirmed = confirm(&store, &alice, created.id, ConfirmPlan::default()).unwrap();
        assert_eq!(confirmed.status, RequestStatus::Requested);
        assert_eq!(confirmed.plan_selected.as_deref(), Some("Custom"));
    }

    #[test]
    fn test_cross_user_confirm_is_unauthorized_and_harmless() {
        let (store, alice, bob) = setup();
        let created = create(&store, &alice, form("Retail")).unwrap();

        let err = confirm(&store, &bob, created.id, ConfirmPlan::default()).unwrap_err();
        assert_eq!(err.0.status_code(), 401);

        let after = store.get_agent_request(created.id).unwrap().unwrap();
        assert_eq!(after.status, RequestStatus::New);
        assert_eq!(after.plan_selected, None);
    }

    #[test]
    fn test_cross_user_read_is_unauthorized() {
        let (store, alice, bob) = setup();
        let created = create(&store, &alice, form("Retail")).unwrap();

        let err = get(&store, &bob, created.id).unwrap_err();
        assert_eq!(err.0, voiceease_shared::VoiceEaseError::Unauthorized);
        assert_eq!(get(&store, &alice, created.id).unwrap().id, created.id);

        let admin = store
            .create_user("root@shop.com", "x", Role::Admin)
            .unwrap()
            .principal();
        assert!(get(&store, &admin, created.id).is_ok());
    }

    #[test]
    fn test_missing_request_is_not_found() {
        let (store, alice, _) = setup();
        assert_eq!(get(&store, &alice, 42).unwrap_err().0.status_code(), 404);
        assert_eq!(
            confirm(&store, &alice, 42, ConfirmPlan::default())
                .unwrap_err()
                .0
                .status_code(),
            404
        );
    }

    #[test]
    fn test_list_own_only() {
        let (store, alice, bob) = setup();
        create(&store, &alice, form("Retail")).unwrap();
        create(&store, &bob, form("Hotel")).unwrap();
        let mine = list_own(&store, &alice).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].user_id, alice.id);
    }
}
