use async_trait::async_trait;

use crate::clients::openai_client::OpenAIAssistantsClient;
use crate::error::AssistantError;
use crate::models::run::RunStatus;

/// Remote assistant conversation: one thread, many runs.
#[async_trait]
pub trait AssistantClient: Send + Sync {
    async fn create_thread(&self) -> Result<String, AssistantError>;

    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<(), AssistantError>;

    /// Starts a run on the thread and returns its id.
    async fn start_run(&self, thread_id: &str) -> Result<String, AssistantError>;

    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<RunStatus, AssistantError>;

    async fn latest_message(&self, thread_id: &str) -> Result<String, AssistantError>;
}

pub struct OpenAIAssistantService {
    client: OpenAIAssistantsClient,
    assistant_id: String,
}

impl OpenAIAssistantService {
    pub fn new(api_key: String, assistant_id: String, base_url: String) -> Self {
        Self {
            client: OpenAIAssistantsClient::new(api_key, base_url),
            assistant_id,
        }
    }
}

#[async_trait]
impl AssistantClient for OpenAIAssistantService {
    async fn create_thread(&self) -> Result<String, AssistantError> {
        self.client.create_thread().await
    }

    async fn add_user_message(&self, thread_id: &str, content: &str) -> Result<(), AssistantError> {
        self.client.create_message(thread_id, content).await
    }

    async fn start_run(&self, thread_id: &str) -> Result<String, AssistantError> {
        let run = self.client.create_run(thread_id, &self.assistant_id).await?;
        Ok(run.id)
    }

    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<RunStatus, AssistantError> {
        let run = self.client.retrieve_run(thread_id, run_id).await?;
        Ok(run.status)
    }

    async fn latest_message(&self, thread_id: &str) -> Result<String, AssistantError> {
        self.client.latest_message_text(thread_id).await
    }
}
