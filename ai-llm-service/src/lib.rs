//! Shared LLM plumbing for the PR automation pipelines.
//!
//! The crate exposes one explicitly constructed [`LlmClient`] that callers
//! receive by reference. It talks to an OpenAI-compatible chat-completions
//! endpoint (Groq by default), retries transient failures with exponential
//! backoff and memoizes successful answers on disk.
//!
//! Model output that is supposed to be JSON goes through [`json_coerce`],
//! a tolerant extractor that never fails and reports which strategy worked.

pub mod cache;
pub mod client;
pub mod config;
pub mod error_handler;
pub mod json_coerce;
pub mod retry;
pub mod services;

pub use client::{ChatMessage, ChatRequest, LlmClient, ResponseFormat};
pub use config::llm_model_config::{LlmConfig, ModelProfile};
pub use error_handler::{AiLlmError, Result};
