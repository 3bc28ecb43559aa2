/// Provider client: the single point of entry for chat-completion calls.
///
/// Every provider is reached through its OpenAI-compatible endpoint. Each
/// completion request writes exactly one activity log entry, whatever the
/// outcome, before the result is returned.
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::activity::{ActivityLog, ActivityStatus};
use crate::models::now_millis;
use crate::models::settings::ProviderKind;
use crate::notifications::NotificationSink;
use crate::store::activity::ActivitySink;
use crate::store::StoreError;

pub mod activation;
pub mod prompts;

use prompts::ACCEPTED_GREETINGS;

const APP_TITLE: &str = "Resume Architect";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Provider returned empty content")]
    EmptyContent,

    #[error("{} API Key not found. Please activate your connection in Settings.", .0.display_name())]
    MissingKey(ProviderKind),

    #[error("{0}")]
    Handshake(String),

    #[error("Activation prompt not found in database.")]
    PromptMissing,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LlmError {
    /// The message a user should see, without the transport prefix.
    pub fn user_message(&self) -> String {
        match self {
            LlmError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Base URLs per provider, defaulting to each vendor's public endpoint.
#[derive(Debug, Clone, Default)]
pub struct ProviderEndpoints {
    overrides: HashMap<ProviderKind, String>,
}

impl ProviderEndpoints {
    pub fn with_override(mut self, kind: ProviderKind, url: impl Into<String>) -> Self {
        self.overrides.insert(kind, url.into());
        self
    }

    pub fn base_url(&self, kind: ProviderKind) -> &str {
        self.overrides
            .get(&kind)
            .map(String::as_str)
            .unwrap_or_else(|| kind.default_base_url())
            .trim_end_matches('/')
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    data: Vec<RawModel>,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    id: String,
    name: Option<String>,
    description: Option<String>,
    context_length: Option<u64>,
    pricing: Option<ModelPricing>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub prompt: String,
    pub completion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<ModelPricing>,
}

/// The provider client shared by every service.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoints: ProviderEndpoints,
    app_origin: String,
    activity: Arc<dyn ActivitySink>,
    notifier: Arc<dyn NotificationSink>,
}

impl LlmClient {
    pub fn new(
        endpoints: ProviderEndpoints,
        app_origin: String,
        timeout: Duration,
        activity: Arc<dyn ActivitySink>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoints,
            app_origin,
            activity,
            notifier,
        })
    }

    pub fn notifier(&self) -> &dyn NotificationSink {
        self.notifier.as_ref()
    }

    fn authorized(&self, provider: ProviderKind, request: RequestBuilder, key: &str) -> RequestBuilder {
        let request = request.bearer_auth(key);
        match provider {
            ProviderKind::OpenRouter => request
                .header("HTTP-Referer", &self.app_origin)
                .header("X-Title", APP_TITLE),
            _ => request,
        }
    }

    /// Sends one chat completion. Returns the body to log alongside the
    /// extracted reply. Nothing is logged here.
    async fn send_chat(
        &self,
        provider: ProviderKind,
        key: &str,
        payload: &ChatRequest<'_>,
    ) -> (Value, Result<String, LlmError>) {
        let url = format!("{}/chat/completions", self.endpoints.base_url(provider));
        let request = self.authorized(provider, self.client.post(&url), key).json(payload);

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("{provider} request failed: {e}");
                return (json!({"error": {"message": e.to_string()}}), Err(e.into()));
            }
        };
        let status = response.status();
        let text = match response.text().await {
            Ok(t) => t,
            Err(e) => return (json!({"error": {"message": e.to_string()}}), Err(e.into())),
        };
        let body: Value = serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.clone()));

        if !status.is_success() {
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Failed to reach {}", provider.display_name()));
            warn!("{provider} returned {status}: {message}");
            return (
                body,
                Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                }),
            );
        }

        let content = serde_json::from_str::<ChatResponse>(&text)
            .map_err(LlmError::Parse)
            .and_then(|r| {
                r.choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                    .ok_or(LlmError::EmptyContent)
            });
        (body, content)
    }

    async fn record(
        &self,
        provider: ProviderKind,
        model: &str,
        payload: &ChatRequest<'_>,
        response: Value,
        ok: bool,
    ) {
        let request = serde_json::to_value(payload).unwrap_or(Value::Null);
        self.activity
            .record(ActivityLog {
                id: None,
                timestamp: now_millis(),
                provider: provider.as_str().to_string(),
                model: model.to_string(),
                request,
                response,
                status: if ok {
                    ActivityStatus::Success
                } else {
                    ActivityStatus::Error
                },
            })
            .await;
    }

    /// One system/user exchange. Returns the first choice's text.
    pub async fn complete(
        &self,
        provider: ProviderKind,
        key: &str,
        system: &str,
        user: &str,
        model: &str,
    ) -> Result<String, LlmError> {
        let payload = chat_request(model, system, user);
        let (body, result) = self.send_chat(provider, key, &payload).await;
        self.record(provider, model, &payload, body, result.is_ok())
            .await;
        if let Ok(content) = &result {
            debug!("{provider} completion succeeded ({} chars)", content.len());
        }
        result
    }

    /// Sends the handshake pair and checks the reply carries an accepted
    /// greeting. The activity entry reflects the handshake verdict.
    pub async fn handshake(
        &self,
        provider: ProviderKind,
        key: &str,
        model: &str,
        system: &str,
        user: &str,
    ) -> Result<(), LlmError> {
        let payload = chat_request(model, system, user);
        let (body, result) = self.send_chat(provider, key, &payload).await;
        let result = result.and_then(|content| check_greeting(&content));
        self.record(provider, model, &payload, body, result.is_ok())
            .await;
        result
    }

    /// Available models, sorted by display name.
    pub async fn list_models(
        &self,
        provider: ProviderKind,
        key: &str,
    ) -> Result<Vec<ModelInfo>, LlmError> {
        let url = format!("{}/models", self.endpoints.base_url(provider));
        let response = self
            .authorized(provider, self.client.get(&url), key)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.pointer("/error/message")?.as_str().map(str::to_string))
                .unwrap_or_else(|| "Failed to fetch models".to_string());
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ModelsResponse = serde_json::from_str(&text)?;
        let mut models: Vec<ModelInfo> = parsed
            .data
            .into_iter()
            .map(|m| ModelInfo {
                name: m.name.filter(|n| !n.is_empty()).unwrap_or_else(|| m.id.clone()),
                id: m.id,
                description: m.description,
                context_length: m.context_length,
                pricing: m.pricing,
            })
            .collect();
        models.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(models)
    }
}

fn chat_request<'a>(model: &'a str, system: &'a str, user: &'a str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: [
            ChatMessage {
                role: "system",
                content: system,
            },
            ChatMessage {
                role: "user",
                content: user,
            },
        ],
    }
}

/// Pulls a JSON payload out of model output: the body of the first code
/// fence if there is one, else the outermost `{...}` span.
fn extract_json_payload(text: &str) -> &str {
    if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        if let Some(end) = after.find("```") {
            let inner = &after[..end];
            return inner.strip_prefix("json").unwrap_or(inner).trim();
        }
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(open), Some(close)) if open < close => &text[open..=close],
        _ => text.trim(),
    }
}

fn check_greeting(content: &str) -> Result<(), LlmError> {
    let parsed: Value = serde_json::from_str(extract_json_payload(content)).map_err(|_| {
        LlmError::Handshake("Handshake failed: Response was not valid JSON.".to_string())
    })?;
    match parsed.get("greetings").and_then(Value::as_str) {
        Some(g) if ACCEPTED_GREETINGS.contains(&g) => Ok(()),
        _ => Err(LlmError::Handshake(
            "Handshake failed: Unexpected response format.".to_string(),
        )),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use axum::{
        extract::State,
        http::{HeaderMap, StatusCode},
        routing::{get, post},
        Json, Router,
    };

    use super::*;
    use crate::notifications::NotificationQueue;

    /// Activity sink that keeps entries in memory.
    #[derive(Default)]
    pub struct MemoryActivity(pub Mutex<Vec<ActivityLog>>);

    #[async_trait]
    impl ActivitySink for MemoryActivity {
        async fn record(&self, entry: ActivityLog) {
            self.0.lock().unwrap().push(entry);
        }
    }

    impl MemoryActivity {
        pub fn entries(&self) -> Vec<ActivityLog> {
            self.0.lock().unwrap().clone()
        }
    }

    /// What the stub provider answers, and what it saw.
    #[derive(Clone)]
    pub struct Stub {
        pub status: StatusCode,
        pub body: String,
        pub seen: Arc<Mutex<Vec<(HeaderMap, Value)>>>,
    }

    impl Stub {
        pub fn reply(content: &str) -> Self {
            Self::raw(
                StatusCode::OK,
                &json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
                    .to_string(),
            )
        }

        pub fn raw(status: StatusCode, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    async fn chat(
        State(stub): State<Stub>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, String) {
        stub.seen.lock().unwrap().push((headers, body));
        (stub.status, stub.body.clone())
    }

    async fn models(State(stub): State<Stub>, headers: HeaderMap) -> (StatusCode, String) {
        stub.seen.lock().unwrap().push((headers, Value::Null));
        (stub.status, stub.body.clone())
    }

    /// Serves the stub on an ephemeral port and returns its base URL.
    pub async fn serve(stub: Stub) -> String {
        let app = Router::new()
            .route("/chat/completions", post(chat))
            .route("/models", get(models))
            .with_state(stub);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// A client pointing every provider at `base`.
    pub fn client(base: &str) -> (LlmClient, Arc<MemoryActivity>, NotificationQueue) {
        let endpoints = ProviderKind::ALL
            .iter()
            .fold(ProviderEndpoints::default(), |e, kind| {
                e.with_override(*kind, base)
            });
        let activity = Arc::new(MemoryActivity::default());
        let queue = NotificationQueue::default();
        let client = LlmClient::new(
            endpoints,
            "http://localhost:5173".to_string(),
            Duration::from_secs(5),
            activity.clone(),
            Arc::new(queue.clone()),
        )
        .unwrap();
        (client, activity, queue)
    }
}
