use std::sync::Arc;

use tracing::info;

use crate::clients::mongo_store::MongoEventStore;
use crate::config::{ApiSettings, StoreBackend};
use crate::error::StoreError;
use crate::handlers::events_http;
use crate::service::event_service::EventService;
use crate::service::event_store::{EventStore, MemoryEventStore};

pub async fn build_store(backend: &StoreBackend) -> Result<Arc<dyn EventStore>, StoreError> {
    match backend {
        StoreBackend::Mongo {
            uri,
            database,
            collection,
        } => {
            let store = MongoEventStore::connect(uri, database, collection).await?;
            info!(database = %database, collection = %collection, "connected to document store");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            info!("using in-memory event store");
            Ok(Arc::new(MemoryEventStore::new()))
        }
    }
}

pub async fn run_api(settings: ApiSettings) -> Result<(), StoreError> {
    let store = build_store(&settings.store).await?;
    let service = Arc::new(EventService::new(store));
    let routes = events_http::events_api(service);

    info!(addr = %settings.bind_addr, "event api listening");
    warp::serve(routes).run(settings.bind_addr).await;
    Ok(())
}
