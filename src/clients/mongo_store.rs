use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::{Client, Collection};
use serde_json::Value;

use crate::error::StoreError;
use crate::models::event::EventDocument;
use crate::service::event_store::EventStore;

pub struct MongoEventStore {
    collection: Collection<Document>,
}

impl MongoEventStore {
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(Self::from_collection(
            client.database(database).collection::<Document>(collection),
        ))
    }

    pub fn from_collection(collection: Collection<Document>) -> Self {
        Self { collection }
    }
}

// Integers above i64::MAX have no bson type and fail here as a conversion error.
fn to_bson_document(document: &EventDocument) -> Result<Document, StoreError> {
    mongodb::bson::to_document(document).map_err(|e| StoreError::Conversion(e.to_string()))
}

fn to_event_document(document: Document) -> Result<EventDocument, StoreError> {
    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Conversion(format!(
            "expected an object, found {}",
            other
        ))),
    }
}

#[async_trait]
impl EventStore for MongoEventStore {
    async fn insert_one(&self, document: EventDocument) -> Result<(), StoreError> {
        let document = to_bson_document(&document)?;
        self.collection
            .insert_one(document)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<EventDocument>, StoreError> {
        let cursor = self
            .collection
            .find(doc! {})
            .projection(doc! { "_id": 0 })
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let documents: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        documents.into_iter().map(to_event_document).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn documents_convert_both_ways() {
        let event = json!({
            "event_id": "EVT000AAA",
            "event_name": "Rust Meetup",
            "attendees": 40,
            "tags": ["rust", "systems"],
            "sponsorship": {"gold": "Acme"}
        });
        let event = event.as_object().unwrap().clone();
        let bson = to_bson_document(&event).unwrap();
        assert_eq!(bson.get_str("event_id").unwrap(), "EVT000AAA");
        assert_eq!(to_event_document(bson).unwrap(), event);
    }

    #[test]
    fn integers_beyond_i64_are_conversion_errors() {
        let event = json!({"attendees": u64::MAX});
        let err = to_bson_document(event.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::Conversion(_)));
    }
}
