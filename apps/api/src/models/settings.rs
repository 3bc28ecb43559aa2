use std::fmt;

use serde::{Deserialize, Serialize};

/// Settings are a singleton stored under this id.
pub const APP_SETTINGS_ID: &str = "app";

/// A chat-completion vendor. All of them speak the OpenAI wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    OpenRouter,
    Gemini,
    Anthropic,
    Grok,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::OpenAi,
        ProviderKind::OpenRouter,
        ProviderKind::Gemini,
        ProviderKind::Anthropic,
        ProviderKind::Grok,
    ];

    /// Identifier used in URLs, settings and the activity log.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::OpenRouter => "openrouter",
            ProviderKind::Gemini => "gemini",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Grok => "grok",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::OpenRouter => "OpenRouter",
            ProviderKind::Gemini => "Gemini",
            ProviderKind::Anthropic => "Anthropic",
            ProviderKind::Grok => "Grok",
        }
    }

    /// OpenAI-compatible endpoint root, without a trailing slash.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::OpenRouter => "https://openrouter.ai/api/v1",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
            ProviderKind::Anthropic => "https://api.anthropic.com/v1",
            ProviderKind::Grok => "https://api.x.ai/v1",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderCredentials {
    pub key: String,
    pub model: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Providers {
    pub openai: ProviderCredentials,
    pub gemini: ProviderCredentials,
    pub anthropic: ProviderCredentials,
    pub grok: ProviderCredentials,
    pub openrouter: ProviderCredentials,
}

impl Providers {
    pub fn get(&self, kind: ProviderKind) -> &ProviderCredentials {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::OpenRouter => &self.openrouter,
            ProviderKind::Gemini => &self.gemini,
            ProviderKind::Anthropic => &self.anthropic,
            ProviderKind::Grok => &self.grok,
        }
    }

    pub fn get_mut(&mut self, kind: ProviderKind) -> &mut ProviderCredentials {
        match kind {
            ProviderKind::OpenAi => &mut self.openai,
            ProviderKind::OpenRouter => &mut self.openrouter,
            ProviderKind::Gemini => &mut self.gemini,
            ProviderKind::Anthropic => &mut self.anthropic,
            ProviderKind::Grok => &mut self.grok,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    pub id: String,
    pub providers: Providers,
    pub active_provider: ProviderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active_resume_id: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            id: APP_SETTINGS_ID.to_string(),
            providers: Providers::default(),
            active_provider: ProviderKind::OpenAi,
            last_active_resume_id: None,
        }
    }
}

impl AppSettings {
    /// Credentials of the currently selected provider.
    pub fn active(&self) -> (ProviderKind, &ProviderCredentials) {
        (self.active_provider, self.providers.get(self.active_provider))
    }
}
