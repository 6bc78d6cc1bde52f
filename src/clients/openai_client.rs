use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::AssistantError;
use crate::models::run::RunStatus;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct ObjectId {
    id: String,
}

#[derive(Debug, Deserialize)]
pub struct RunObject {
    pub id: String,
    pub status: RunStatus,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<ThreadMessage>,
}

#[derive(Debug, Deserialize)]
struct ThreadMessage {
    #[serde(default)]
    content: Vec<MessageContent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MessageContent {
    Text { text: TextContent },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct TextContent {
    value: String,
}

/// Thin HTTP wrapper over the Assistants API (threads, messages, runs).
pub struct OpenAIAssistantsClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAIAssistantsClient {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn create_thread(&self) -> Result<String, AssistantError> {
        let thread: ObjectId = self
            .send(self.http.post(self.url("threads")).json(&serde_json::json!({})))
            .await?;
        Ok(thread.id)
    }

    pub async fn create_message(&self, thread_id: &str, content: &str) -> Result<(), AssistantError> {
        let request = CreateMessageRequest {
            role: "user",
            content,
        };
        let _: ObjectId = self
            .send(
                self.http
                    .post(self.url(&format!("threads/{}/messages", thread_id)))
                    .json(&request),
            )
            .await?;
        Ok(())
    }

    pub async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<RunObject, AssistantError> {
        let request = CreateRunRequest { assistant_id };
        self.send(
            self.http
                .post(self.url(&format!("threads/{}/runs", thread_id)))
                .json(&request),
        )
        .await
    }

    pub async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<RunObject, AssistantError> {
        self.send(
            self.http
                .get(self.url(&format!("threads/{}/runs/{}", thread_id, run_id))),
        )
        .await
    }

    pub async fn latest_message_text(&self, thread_id: &str) -> Result<String, AssistantError> {
        let body = self
            .send_raw(
                self.http
                    .get(self.url(&format!("threads/{}/messages", thread_id)))
                    .query(&[("order", "desc"), ("limit", "1")]),
            )
            .await?;
        first_text_value(&body)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T, AssistantError> {
        let body = self.send_raw(request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn send_raw(&self, request: reqwest::RequestBuilder) -> Result<String, AssistantError> {
        let response = request
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?; // read the body once

        if !status.is_success() {
            return Err(AssistantError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }
}

// Newest message first; takes its first text part.
fn first_text_value(body: &str) -> Result<String, AssistantError> {
    let list: MessageList = serde_json::from_str(body)?;
    list.data
        .into_iter()
        .next()
        .and_then(|message| {
            message.content.into_iter().find_map(|part| match part {
                MessageContent::Text { text } => Some(text.value),
                MessageContent::Other => None,
            })
        })
        .ok_or(AssistantError::EmptyResponse)
}
