//! SQLite-backed storage for users, agent requests, leads and contact messages.
//!
//! Schema:
//! - users: email username (unique), PBKDF2 password hash, role
//! - agent_requests: intake fields, recommendation (plan + JSON data), status.
//!   Rows are deleted with their owning user (ON DELETE CASCADE).
//! - demo_leads, contact_messages: append-only marketing intake

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use voiceease_shared::marketing::{NewContactMessage, NewDemoLead};
use voiceease_shared::{
    AgentRequest, Confirmation, ContactMessage, DemoLead, IntakeDetails, NewAgentRequest, Plan,
    Principal, Recommendation, RecommendationData, RequestStatus, Role, SystemStats, UserView,
    VoiceEaseError,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'user',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS agent_requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    business_name TEXT NOT NULL,
    industry TEXT NOT NULL,
    business_phone TEXT NOT NULL,
    business_hours TEXT,
    services_offered TEXT,
    appointment_types TEXT,
    calendar_used TEXT,
    typical_questions TEXT,
    primary_goal TEXT,
    preferred_language TEXT NOT NULL DEFAULT 'English',
    recommendation_plan TEXT,
    recommendation_data TEXT,
    plan_selected TEXT,
    status TEXT NOT NULL DEFAULT 'NEW',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    CHECK ((recommendation_plan IS NULL) = (recommendation_data IS NULL))
);

CREATE INDEX IF NOT EXISTS idx_agent_requests_user ON agent_requests(user_id);

CREATE TABLE IF NOT EXISTS demo_leads (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    business_name TEXT,
    phone TEXT,
    message TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS contact_messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    message TEXT NOT NULL,
    created_at TEXT NOT NULL
);
"#;

const REQUEST_COLUMNS: &str = "id, user_id, business_name, industry, business_phone, \
    business_hours, services_offered, appointment_types, calendar_used, typical_questions, \
    primary_goal, preferred_language, recommendation_plan, recommendation_data, plan_selected, \
    status, created_at, updated_at";

const USER_COLUMNS: &str = "id, username, password_hash, role, created_at";

/// A stored user, including the password hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }

    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            role: self.role,
        }
    }
}

/// Result of a guarded confirmation
#[derive(Debug)]
pub enum ConfirmOutcome {
    Missing,
    Rejected(VoiceEaseError),
    Updated(AgentRequest),
}

/// Storage backed by SQLite
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open or create the database at a specific path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {:?}", path))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn)
    }

    /// Private in-memory database (tests, `classify` dry runs)
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize schema")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database lock poisoned"))
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub fn create_user(&self, username: &str, password_hash: &str, role: Role) -> Result<UserRecord> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (username, password_hash, role, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![username, password_hash, role.as_str(), Utc::now()],
        )?;
        let id = conn.last_insert_rowid();
        fetch_user(&conn, id)?.ok_or_else(|| anyhow!("user {} vanished after insert", id))
    }

    pub fn get_user(&self, id: i64) -> Result<Option<UserRecord>> {
        let conn = self.conn()?;
        fetch_user(&conn, id)
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                &format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS),
                params![username],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn list_users(&self) -> Result<Vec<UserRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM users ORDER BY id", USER_COLUMNS))?;
        let rows = stmt.query_map([], row_to_user)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Delete a user and, through the foreign key, their agent requests.
    /// Returns whether the user existed.
    pub fn delete_user(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    pub fn update_user_role(&self, id: i64, role: Role) -> Result<Option<UserRecord>> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE users SET role = ?1 WHERE id = ?2",
            params![role.as_str(), id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        fetch_user(&conn, id)
    }

    // ------------------------------------------------------------------
    // Agent requests
    // ------------------------------------------------------------------

    pub fn insert_agent_request(&self, new: &NewAgentRequest) -> Result<AgentRequest> {
        let data = serde_json::to_string(&new.recommendation.data)?;
        let now = Utc::now();
        let intake = &new.intake;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO agent_requests (
                user_id, business_name, industry, business_phone, business_hours,
                services_offered, appointment_types, calendar_used, typical_questions,
                primary_goal, preferred_language, recommendation_plan, recommendation_data,
                plan_selected, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, NULL, ?14, ?15, ?15)",
            params![
                new.user_id,
                intake.business_name,
                intake.industry,
                intake.business_phone,
                intake.business_hours,
                intake.services_offered,
                intake.appointment_types,
                intake.calendar_used,
                intake.typical_questions,
                intake.primary_goal,
                intake.preferred_language,
                new.recommendation.plan.as_str(),
                data,
                new.status.as_str(),
                now,
            ],
        )?;
        let id = conn.last_insert_rowid();
        fetch_request(&conn, id)?.ok_or_else(|| anyhow!("agent request {} vanished after insert", id))
    }

    pub fn get_agent_request(&self, id: i64) -> Result<Option<AgentRequest>> {
        let conn = self.conn()?;
        fetch_request(&conn, id)
    }

    pub fn list_agent_requests_for_user(&self, user_id: i64) -> Result<Vec<AgentRequest>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM agent_requests WHERE user_id = ?1 ORDER BY id",
            REQUEST_COLUMNS
        ))?;
        let rows = stmt.query_map(params![user_id], row_to_request)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn list_agent_requests(&self) -> Result<Vec<AgentRequest>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM agent_requests ORDER BY id",
            REQUEST_COLUMNS
        ))?;
        let rows = stmt.query_map([], row_to_request)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Read a request, let `resolve` decide the write, and apply it while
    /// holding the connection. Concurrent confirmations are last-write-wins.
    pub fn confirm_agent_request<F>(&self, id: i64, resolve: F) -> Result<ConfirmOutcome>
    where
        F: FnOnce(&AgentRequest) -> voiceease_shared::Result<Confirmation>,
    {
        let conn = self.conn()?;
        let Some(existing) = fetch_request(&conn, id)? else {
            return Ok(ConfirmOutcome::Missing);
        };
        let confirmation = match resolve(&existing) {
            Ok(c) => c,
            Err(e) => return Ok(ConfirmOutcome::Rejected(e)),
        };

        conn.execute(
            "UPDATE agent_requests SET plan_selected = ?1, status = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                confirmation.plan_selected,
                confirmation.status.as_str(),
                Utc::now(),
                id
            ],
        )?;
        match fetch_request(&conn, id)? {
            Some(updated) => Ok(ConfirmOutcome::Updated(updated)),
            None => Ok(ConfirmOutcome::Missing),
        }
    }

    // ------------------------------------------------------------------
    // Marketing intake
    // ------------------------------------------------------------------

    pub fn create_demo_lead(&self, lead: &NewDemoLead) -> Result<DemoLead> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO demo_leads (name, email, business_name, phone, message, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                lead.name,
                lead.email,
                lead.business_name,
                lead.phone,
                lead.message,
                Utc::now()
            ],
        )?;
        let id = conn.last_insert_rowid();
        let lead = conn.query_row(
            "SELECT id, name, email, business_name, phone, message, created_at
             FROM demo_leads WHERE id = ?1",
            params![id],
            row_to_lead,
        )?;
        Ok(lead)
    }

    pub fn list_demo_leads(&self) -> Result<Vec<DemoLead>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, email, business_name, phone, message, created_at
             FROM demo_leads ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_lead)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn create_contact_message(&self, message: &NewContactMessage) -> Result<ContactMessage> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO contact_messages (name, email, message, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![message.name, message.email, message.message, Utc::now()],
        )?;
        let id = conn.last_insert_rowid();
        let message = conn.query_row(
            "SELECT id, name, email, message, created_at FROM contact_messages WHERE id = ?1",
            params![id],
            row_to_contact,
        )?;
        Ok(message)
    }

    pub fn list_contact_messages(&self) -> Result<Vec<ContactMessage>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, email, message, created_at FROM contact_messages ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_contact)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ------------------------------------------------------------------
    // Stats
    // ------------------------------------------------------------------

    pub fn stats(&self) -> Result<SystemStats> {
        let conn = self.conn()?;
        let count = |table: &str| -> Result<u64> {
            let n: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
            Ok(n.max(0) as u64)
        };
        Ok(SystemStats {
            user_count: count("users")?,
            request_count: count("agent_requests")?,
            lead_count: count("demo_leads")?,
            contact_count: count("contact_messages")?,
        })
    }
}

fn fetch_user(conn: &Connection, id: i64) -> Result<Option<UserRecord>> {
    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
            params![id],
            row_to_user,
        )
        .optional()?;
    Ok(user)
}

fn fetch_request(conn: &Connection, id: i64) -> Result<Option<AgentRequest>> {
    let request = conn
        .query_row(
            &format!("SELECT {} FROM agent_requests WHERE id = ?1", REQUEST_COLUMNS),
            params![id],
            row_to_request,
        )
        .optional()?;
    Ok(request)
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<UserRecord> {
    let role: String = row.get(3)?;
    Ok(UserRecord {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role: role.parse().map_err(|e| conversion_error(3, e))?,
        created_at: row.get(4)?,
    })
}

fn row_to_request(row: &Row<'_>) -> rusqlite::Result<AgentRequest> {
    let plan: Option<String> = row.get(12)?;
    let data: Option<String> = row.get(13)?;
    let recommendation = match (plan, data) {
        (Some(plan), Some(data)) => {
            let plan: Plan = plan
                .parse()
                .map_err(|e: String| conversion_error(12, VoiceEaseError::Storage(e)))?;
            let data: RecommendationData =
                serde_json::from_str(&data).map_err(|e| conversion_error(13, e))?;
            Some(Recommendation { plan, data })
        }
        _ => None,
    };
    let status: String = row.get(15)?;

    Ok(AgentRequest {
        id: row.get(0)?,
        user_id: row.get(1)?,
        intake: IntakeDetails {
            business_name: row.get(2)?,
            industry: row.get(3)?,
            business_phone: row.get(4)?,
            business_hours: row.get(5)?,
            services_offered: row.get(6)?,
            appointment_types: row.get(7)?,
            calendar_used: row.get(8)?,
            typical_questions: row.get(9)?,
            primary_goal: row.get(10)?,
            preferred_language: row.get(11)?,
        },
        recommendation,
        plan_selected: row.get(14)?,
        status: status
            .parse::<RequestStatus>()
            .map_err(|e| conversion_error(15, e))?,
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
    })
}

fn row_to_lead(row: &Row<'_>) -> rusqlite::Result<DemoLead> {
    Ok(DemoLead {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        business_name: row.get(3)?,
        phone: row.get(4)?,
        message: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn row_to_contact(row: &Row<'_>) -> rusqlite::Result<ContactMessage> {
    Ok(ContactMessage {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        message: row.get(3)?,
        created_at: row.get(4)?,
    })
}
