use std::convert::Infallible;
use std::sync::Arc;

use serde_json::json;
use tracing::{error, info};
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

use crate::error::StoreError;
use crate::models::event::{CreateEventResponse, EventDocument};
use crate::service::event_service::EventService;

#[derive(Debug)]
struct StoreRejection(StoreError);

impl warp::reject::Reject for StoreRejection {}

pub fn events_api(
    service: Arc<EventService>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let create = warp::path("events")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json::<EventDocument>())
        .and(with_service(service.clone()))
        .and_then(create_event);

    let list = warp::path("events")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_service(service))
        .and_then(list_events);

    // Development-mode policy: any origin.
    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type"]);

    create.or(list).recover(handle_rejection).with(cors)
}

fn with_service(
    service: Arc<EventService>,
) -> impl Filter<Extract = (Arc<EventService>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

async fn create_event(
    payload: EventDocument,
    service: Arc<EventService>,
) -> Result<impl Reply, Rejection> {
    let event_id = service.create(payload).await.map_err(|e| {
        error!(error = %e, "failed to store event");
        warp::reject::custom(StoreRejection(e))
    })?;
    info!(event_id = %event_id, "event created");
    Ok(warp::reply::with_status(
        warp::reply::json(&CreateEventResponse::created(event_id)),
        StatusCode::CREATED,
    ))
}

async fn list_events(service: Arc<EventService>) -> Result<impl Reply, Rejection> {
    let events = service.list().await.map_err(|e| {
        error!(error = %e, "failed to list events");
        warp::reject::custom(StoreRejection(e))
    })?;
    Ok(warp::reply::with_status(
        warp::reply::json(&events),
        StatusCode::OK,
    ))
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Rejection> {
    let (status, message) = if let Some(StoreRejection(store_err)) = err.find::<StoreRejection>() {
        (StatusCode::INTERNAL_SERVER_ERROR, store_err.to_string())
    } else if let Some(body_err) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, body_err.to_string())
    } else {
        return Err(err);
    };
    Ok(warp::reply::with_status(
        warp::reply::json(&json!({ "error": message })),
        status,
    ))
}
