//! API routes for voiceeased
//!
//! Handlers stay thin: extract, call into `accounts` / `requests` / `store`,
//! and shape the response.

use crate::accounts;
use crate::error::{ApiError, ApiResult, MessageBody};
use crate::extract::{clear_session_cookie, session_cookie, session_token, AdminUser, CurrentUser, JsonBody};
use crate::requests;
use crate::server::AppState;
use crate::sessions::mask_token;
use axum::{
    extract::{Path, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};
use voiceease_shared::{
    AgentRequest, AgentRequestForm, ConfirmPlan, ContactForm, ContactMessage, Credentials,
    DemoLead, DemoLeadForm, RoleUpdate, SystemStats, UserView,
};

type AppStateArc = Arc<AppState>;

// ============================================================================
// Auth Routes
// ============================================================================

pub fn auth_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/user", get(me))
}

async fn register(
    State(state): State<AppStateArc>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> ApiResult<Response> {
    let user = accounts::register(
        &state.store,
        credentials,
        state.config.auth.pbkdf2_iterations,
    )
    .await?;
    start_session(&state, StatusCode::CREATED, user.view()).await
}

async fn login(
    State(state): State<AppStateArc>,
    JsonBody(credentials): JsonBody<Credentials>,
) -> ApiResult<Response> {
    let user = accounts::authenticate(&state.store, credentials).await?;
    info!(user_id = user.id, "  Login");
    start_session(&state, StatusCode::OK, user.view()).await
}

async fn start_session(state: &AppState, status: StatusCode, user: UserView) -> ApiResult<Response> {
    let token = state.sessions.create(user.id).await;
    let cookie = session_cookie(&token, state.sessions.ttl(), state.config.auth.cookie_secure)?;
    Ok((status, [(SET_COOKIE, cookie)], Json(user)).into_response())
}

async fn logout(State(state): State<AppStateArc>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        if state.sessions.remove(&token).await {
            debug!("  Session ended ({})", mask_token(&token));
        }
    }
    (
        [(SET_COOKIE, clear_session_cookie())],
        MessageBody::new("Logged out"),
    )
        .into_response()
}

async fn me(CurrentUser(user): CurrentUser) -> Json<UserView> {
    Json(user.view())
}

// ============================================================================
// Agent Request Routes
// ============================================================================

pub fn agent_request_routes() -> Router<AppStateArc> {
    Router::new()
        .route(
            "/api/agent-requests",
            post(create_agent_request).get(list_agent_requests),
        )
        .route(
            "/api/agent-requests/:id",
            get(get_agent_request).patch(confirm_agent_request),
        )
}

async fn create_agent_request(
    State(state): State<AppStateArc>,
    user: CurrentUser,
    JsonBody(form): JsonBody<AgentRequestForm>,
) -> ApiResult<(StatusCode, Json<AgentRequest>)> {
    let request = requests::create(&state.store, &user.principal(), form)?;
    Ok((StatusCode::CREATED, Json(request)))
}

async fn list_agent_requests(
    State(state): State<AppStateArc>,
    user: CurrentUser,
) -> ApiResult<Json<Vec<AgentRequest>>> {
    Ok(Json(requests::list_own(&state.store, &user.principal())?))
}

async fn get_agent_request(
    State(state): State<AppStateArc>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<AgentRequest>> {
    let id = parse_id(&id, "Request")?;
    Ok(Json(requests::get(&state.store, &user.principal(), id)?))
}

async fn confirm_agent_request(
    State(state): State<AppStateArc>,
    user: CurrentUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<ConfirmPlan>,
) -> ApiResult<Json<AgentRequest>> {
    let id = parse_id(&id, "Request")?;
    Ok(Json(requests::confirm(
        &state.store,
        &user.principal(),
        id,
        body,
    )?))
}

/// Path ids that are not integers cannot name a row
fn parse_id(raw: &str, what: &str) -> ApiResult<i64> {
    raw.parse().map_err(|_| ApiError::not_found(what))
}

// ============================================================================
// Marketing Routes
// ============================================================================

pub fn marketing_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/demo-leads", post(create_demo_lead))
        .route("/api/contact", post(create_contact_message))
}

async fn create_demo_lead(
    State(state): State<AppStateArc>,
    JsonBody(form): JsonBody<DemoLeadForm>,
) -> ApiResult<(StatusCode, Json<DemoLead>)> {
    let lead = state.store.create_demo_lead(&form.validate()?)?;
    info!(lead_id = lead.id, "  Demo lead received");
    Ok((StatusCode::CREATED, Json(lead)))
}

async fn create_contact_message(
    State(state): State<AppStateArc>,
    JsonBody(form): JsonBody<ContactForm>,
) -> ApiResult<(StatusCode, Json<ContactMessage>)> {
    let message = state.store.create_contact_message(&form.validate()?)?;
    info!(contact_id = message.id, "  Contact message received");
    Ok((StatusCode::CREATED, Json(message)))
}

// ============================================================================
// Admin Routes
// ============================================================================

pub fn admin_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/api/admin/users", get(admin_list_users))
        .route("/api/admin/users/:id", delete(admin_delete_user))
        .route("/api/admin/users/:id/role", patch(admin_update_role))
        .route("/api/admin/requests", get(admin_list_requests))
        .route("/api/admin/leads", get(admin_list_leads))
        .route("/api/admin/contacts", get(admin_list_contacts))
        .route("/api/admin/stats", get(admin_stats))
}

async fn admin_list_users(
    State(state): State<AppStateArc>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<UserView>>> {
    let users = state.store.list_users()?;
    Ok(Json(users.iter().map(|u| u.view()).collect()))
}

async fn admin_delete_user(
    State(state): State<AppStateArc>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageBody>> {
    let id = parse_id(&id, "User")?;
    accounts::delete_user(&state.store, &state.sessions, &admin.principal(), id).await?;
    Ok(MessageBody::new("User deleted successfully"))
}

async fn admin_update_role(
    State(state): State<AppStateArc>,
    _admin: AdminUser,
    Path(id): Path<String>,
    JsonBody(update): JsonBody<RoleUpdate>,
) -> ApiResult<Json<UserView>> {
    let id = parse_id(&id, "User")?;
    Ok(Json(accounts::set_role(&state.store, id, update)?.view()))
}

async fn admin_list_requests(
    State(state): State<AppStateArc>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<AgentRequest>>> {
    Ok(Json(state.store.list_agent_requests()?))
}

async fn admin_list_leads(
    State(state): State<AppStateArc>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<DemoLead>>> {
    Ok(Json(state.store.list_demo_leads()?))
}

async fn admin_list_contacts(
    State(state): State<AppStateArc>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<ContactMessage>>> {
    Ok(Json(state.store.list_contact_messages()?))
}

async fn admin_stats(
    State(state): State<AppStateArc>,
    _admin: AdminUser,
) -> ApiResult<Json<SystemStats>> {
    Ok(Json(state.store.stats()?))
}

// ============================================================================
// Health Routes
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/api/health", get(health_check))
}

async fn health_check(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}
