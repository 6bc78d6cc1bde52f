pub mod events_http;
