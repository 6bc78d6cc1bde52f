pub mod mongo_store;
pub mod openai_client;
