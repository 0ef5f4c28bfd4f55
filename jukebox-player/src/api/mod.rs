//! HTTP control API
//!
//! Session commands under `/api/v1/sessions/:session_id/`, reaction intake
//! at `/api/v1/reactions` and the event stream at `/api/v1/events`.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{create_router, run, AppContext};
