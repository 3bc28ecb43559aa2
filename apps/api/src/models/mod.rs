// Persisted record shapes. Every record serializes as camelCase JSON so the
// browser client can read and write them without translation.

pub mod activity;
pub mod profile;
pub mod prompt;
pub mod resume;
pub mod settings;

/// Milliseconds since the Unix epoch, the timestamp unit used by all records.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
