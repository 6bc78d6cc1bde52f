use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::event::EventDocument;

pub const INTERNAL_ID_FIELD: &str = "_id";

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert_one(&self, document: EventDocument) -> Result<(), StoreError>;

    // Insertion order, without the internal id.
    async fn find_all(&self) -> Result<Vec<EventDocument>, StoreError>;
}

#[derive(Default)]
pub struct MemoryEventStore {
    documents: Mutex<Vec<EventDocument>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn insert_one(&self, mut document: EventDocument) -> Result<(), StoreError> {
        document.insert(
            INTERNAL_ID_FIELD.to_string(),
            Value::String(Uuid::new_v4().to_string()),
        );
        self.documents.lock().await.push(document);
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<EventDocument>, StoreError> {
        let documents = self.documents.lock().await;
        Ok(documents
            .iter()
            .map(|doc| {
                let mut doc = doc.clone();
                doc.remove(INTERNAL_ID_FIELD);
                doc
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn memory_store_hides_internal_id() {
        let store = MemoryEventStore::new();
        let doc = json!({"event_name": "Meetup"}).as_object().unwrap().clone();
        store.insert_one(doc.clone()).await.unwrap();

        let stored = store.documents.lock().await;
        assert!(stored[0].contains_key(INTERNAL_ID_FIELD));
        drop(stored);

        let found = store.find_all().await.unwrap();
        assert_eq!(found, vec![doc]);
    }
}
