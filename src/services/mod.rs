// src/services/mod.rs
pub mod chat_session;
pub mod classifier;
pub mod demo_client;
pub mod insights;
pub mod mentor_api;
pub mod mentor_client;
pub mod sse_decoder;
