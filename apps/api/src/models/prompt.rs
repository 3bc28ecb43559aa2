use serde::{Deserialize, Serialize};

/// A stored system/user prompt pair. `user_prompt_template` carries
/// `{{placeholder}}` tokens filled at call time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub system_prompt: String,
    pub user_prompt_template: String,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub last_updated: i64,
}
