//! modelmux - Preference-aware LLM routing.
//!
//! A small HTTP service that picks the best backend model for each chat
//! prompt by asking a meta-model to choose from a static catalog, then
//! forwards the prompt to whichever model was picked.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod invoker;
pub mod selector;
pub mod upstream;

pub use config::Config;
pub use error::{Error, Result};
