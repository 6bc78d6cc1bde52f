use std::sync::Arc;

use serde_json::Value;

use crate::error::StoreError;
use crate::models::event::{EVENT_ID_FIELD, EventDocument, generate_event_id};
use crate::service::event_store::EventStore;

pub struct EventService {
    store: Arc<dyn EventStore>,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    // Any caller-supplied event_id is overwritten.
    pub async fn create(&self, mut payload: EventDocument) -> Result<String, StoreError> {
        let event_id = generate_event_id(&mut rand::thread_rng());
        payload.insert(EVENT_ID_FIELD.to_string(), Value::String(event_id.clone()));
        self.store.insert_one(payload).await?;
        Ok(event_id)
    }

    pub async fn list(&self) -> Result<Vec<EventDocument>, StoreError> {
        self.store.find_all().await
    }
}
