pub mod api;
pub mod audio;
pub mod citations;
pub mod config;
pub mod conversation;
pub mod embeddings;
pub mod fixtures;
pub mod llm;
pub mod server;
pub mod store;
