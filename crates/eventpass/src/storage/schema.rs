//! `SQLite` schema definitions for eventpass.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the preferences table.
///
/// This is the strings-by-key document that holds the serialized
/// registration and notification lists.
pub const CREATE_PREFERENCES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the quarantine table for undecodable values.
pub const CREATE_QUARANTINE_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS quarantine (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    key TEXT NOT NULL,
    value TEXT NOT NULL,
    reason TEXT NOT NULL,
    quarantined_at TEXT NOT NULL
)
";

/// SQL statement to create an index on the quarantined key.
pub const CREATE_QUARANTINE_KEY_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_quarantine_key ON quarantine(key)
";

/// SQL statement to create the local accounts table.
pub const CREATE_ACCOUNTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS accounts (
    uid TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT,
    provider TEXT NOT NULL,
    created_at TEXT NOT NULL
)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_PREFERENCES_TABLE,
    CREATE_QUARANTINE_TABLE,
    CREATE_QUARANTINE_KEY_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.trim().is_empty());
        }
    }

    #[test]
    fn test_preferences_table_is_key_value() {
        assert!(CREATE_PREFERENCES_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_PREFERENCES_TABLE.contains("value TEXT NOT NULL"));
    }

    #[test]
    fn test_accounts_email_unique() {
        assert!(CREATE_ACCOUNTS_TABLE.contains("email TEXT NOT NULL UNIQUE"));
    }

    #[test]
    fn test_accounts_created_by_migration_not_base_schema() {
        assert!(!SCHEMA_STATEMENTS.contains(&CREATE_ACCOUNTS_TABLE));
    }
}
