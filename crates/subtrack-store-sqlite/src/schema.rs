//! SQL schema for the SubTrack SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id           TEXT PRIMARY KEY,
    email             TEXT NOT NULL UNIQUE,
    monthly_budget    REAL NOT NULL DEFAULT 0,   -- 0 = no budget set
    payment_reminders INTEGER NOT NULL DEFAULT 1,
    budget_alerts     INTEGER NOT NULL DEFAULT 1,
    monthly_summary   INTEGER NOT NULL DEFAULT 0,
    new_subscription  INTEGER NOT NULL DEFAULT 1,
    created_at        TEXT NOT NULL              -- ISO 8601 UTC
);

CREATE TABLE IF NOT EXISTS subscriptions (
    subscription_id TEXT PRIMARY KEY,
    user_id         TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    name            TEXT NOT NULL,
    monthly_price   REAL NOT NULL,
    billing_day     INTEGER NOT NULL CHECK (billing_day BETWEEN 1 AND 31),
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS subscriptions_user_idx ON subscriptions(user_id);
CREATE INDEX IF NOT EXISTS users_email_idx        ON users(email);

PRAGMA user_version = 1;
";
