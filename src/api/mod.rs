//! HTTP API module.
//!
//! Stateless request/response endpoints: validate the incoming fields,
//! invoke the selector or invoker, and map failures to uniform responses.

mod handlers;
mod server;
pub mod types;

pub use server::{create_router, run_server, AppState};
