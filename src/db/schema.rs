//! Database schema and migrations.
//!
//! Migrations are applied in order when the database is opened. The
//! schema_version table tracks which ones have run.

/// Database migrations.
pub const MIGRATIONS: &[&str] = &[
    // v1: users and products
    r#"
CREATE TABLE users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE products (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    description TEXT,
    created_at  TEXT NOT NULL DEFAULT (datetime('now'))
);
"#,
    // v2: product grants and ownership
    r#"
CREATE TABLE product_users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id  INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    role        TEXT NOT NULL               -- 'viewer' or 'editor'
);

CREATE INDEX idx_product_users_user ON product_users(user_id);

CREATE TABLE product_owners (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    product_id  INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
    user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX idx_product_owners_user ON product_owners(user_id);
"#,
    // v3: login sessions
    r#"
CREATE TABLE user_sessions (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL,
    session_id    TEXT NOT NULL UNIQUE,
    created_at    TEXT NOT NULL,
    last_activity TEXT NOT NULL,
    ip_address    TEXT,                     -- up to 45 chars (IPv6)
    user_agent    TEXT,
    is_active     INTEGER NOT NULL DEFAULT 1
);

CREATE INDEX idx_user_sessions_username ON user_sessions(username);
CREATE INDEX idx_user_sessions_last_activity ON user_sessions(last_activity);

-- At most one active session per username
CREATE UNIQUE INDEX idx_user_sessions_one_active
    ON user_sessions(username) WHERE is_active = 1;
"#,
    // v4: unauthorized login audit trail
    r#"
CREATE TABLE unauthorized_login_attempts (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL,
    ip_address    TEXT,
    user_agent    TEXT,
    attempted_at  TEXT NOT NULL,
    reason        TEXT NOT NULL
);

CREATE INDEX idx_login_attempts_username ON unauthorized_login_attempts(username);
CREATE INDEX idx_login_attempts_attempted_at ON unauthorized_login_attempts(attempted_at);
"#,
];
