use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Client,
    Lawyer,
}

/// User fields safe to put in a response. The password hash never leaves
/// the users table.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub phone: Option<String>,
}

impl PublicUser {
    pub async fn fetch(db_pool: &SqlitePool, id: &str) -> Result<Option<PublicUser>, sqlx::Error> {
        sqlx::query_as("SELECT id,name,email,avatar,phone FROM users WHERE id=?")
            .bind(id)
            .fetch_optional(db_pool)
            .await
    }
}

pub fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Unix seconds (as stored) to an RFC 3339 string for responses.
pub fn rfc3339(ts: i64) -> String {
    OffsetDateTime::from_unix_timestamp(ts)
        .ok()
        .and_then(|t| t.format(&Rfc3339).ok())
        .unwrap_or_default()
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT,
    role          TEXT NOT NULL CHECK (role IN ('CLIENT','LAWYER')),
    verified      INTEGER NOT NULL DEFAULT 0,
    avatar        TEXT,
    phone         TEXT,
    created_at    INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS client_profiles (
    user_id TEXT PRIMARY KEY REFERENCES users(id)
);

CREATE TABLE IF NOT EXISTS lawyer_profiles (
    user_id          TEXT PRIMARY KEY REFERENCES users(id),
    license_number   TEXT NOT NULL,
    license_state    TEXT NOT NULL,
    specialties      TEXT NOT NULL,
    biography        TEXT,
    education        TEXT,
    experience       TEXT,
    office_address   TEXT,
    office_phone     TEXT,
    consultation_fee REAL,
    rating           REAL NOT NULL DEFAULT 0,
    review_count     INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS oauth_accounts (
    id                  TEXT PRIMARY KEY,
    user_id             TEXT NOT NULL REFERENCES users(id),
    provider            TEXT NOT NULL,
    provider_account_id TEXT NOT NULL,
    UNIQUE (provider, provider_account_id)
);

CREATE TABLE IF NOT EXISTS cases (
    id          TEXT PRIMARY KEY,
    client_id   TEXT NOT NULL REFERENCES users(id),
    lawyer_id   TEXT NOT NULL REFERENCES users(id),
    title       TEXT NOT NULL,
    description TEXT,
    status      TEXT NOT NULL CHECK (status IN ('OPEN','IN_PROGRESS','CLOSED')),
    created_at  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS consultations (
    id           TEXT PRIMARY KEY,
    client_id    TEXT NOT NULL REFERENCES users(id),
    lawyer_id    TEXT NOT NULL REFERENCES users(id),
    title        TEXT NOT NULL,
    description  TEXT,
    scheduled_at INTEGER NOT NULL,
    duration_min INTEGER NOT NULL,
    status       TEXT NOT NULL CHECK (status IN ('SCHEDULED','CONFIRMED','COMPLETED','CANCELLED')),
    created_at   INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_consultations_lawyer_time
    ON consultations (lawyer_id, scheduled_at);

CREATE TABLE IF NOT EXISTS conversations (
    id              TEXT PRIMARY KEY,
    created_at      INTEGER NOT NULL,
    last_message_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS conversation_participants (
    conversation_id TEXT NOT NULL REFERENCES conversations(id),
    user_id         TEXT NOT NULL REFERENCES users(id),
    PRIMARY KEY (conversation_id, user_id)
);

CREATE TABLE IF NOT EXISTS messages (
    id              TEXT PRIMARY KEY,
    conversation_id TEXT NOT NULL REFERENCES conversations(id),
    sender_id       TEXT NOT NULL REFERENCES users(id),
    content         TEXT NOT NULL,
    created_at      INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_messages_conversation
    ON messages (conversation_id, created_at);

CREATE TABLE IF NOT EXISTS notifications (
    id         TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(id),
    title      TEXT NOT NULL,
    content    TEXT NOT NULL,
    kind       TEXT NOT NULL CHECK (kind IN ('INFO','SUCCESS','WARNING','ERROR')),
    link       TEXT,
    read       INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS payments (
    id                TEXT PRIMARY KEY,
    user_id           TEXT NOT NULL REFERENCES users(id),
    consultation_id   TEXT NOT NULL REFERENCES consultations(id),
    amount            INTEGER NOT NULL,
    currency          TEXT NOT NULL,
    status            TEXT NOT NULL CHECK (status IN ('PENDING','COMPLETED','FAILED','REFUNDED')),
    stripe_session_id TEXT NOT NULL,
    created_at        INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS events (
    id         TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(id),
    event_name TEXT NOT NULL,
    event_type TEXT NOT NULL CHECK (event_type IN
        ('PAGE_VIEW','CONSULTATION_BOOKED','PAYMENT_COMPLETED','MESSAGE_SENT','PROFILE_VIEWED')),
    metadata   TEXT NOT NULL,
    created_at INTEGER NOT NULL
);
"#;

pub async fn init(db_pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(db_pool).await?;
    Ok(())
}
