pub mod assistant_service;
pub mod event_service;
pub mod event_store;
pub mod output_writer;
pub mod spreadsheet;
