use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStatus {
    Success,
    Error,
}

impl ActivityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityStatus::Success => "success",
            ActivityStatus::Error => "error",
        }
    }
}

/// One provider call: what was sent, what came back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    /// Assigned by the store on append.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub timestamp: i64,
    pub provider: String,
    pub model: String,
    pub request: Value,
    pub response: Value,
    pub status: ActivityStatus,
}
