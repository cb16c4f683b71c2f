//! Session Recording
//!
//! Hands a finished practice off to whatever keeps the player's history.
//! Recording is fire-and-forget: the engine declares completion first and
//! only then spawns the save, so a failing recorder can never affect what the
//! player sees.
//!
//! # Available Recorders
//!
//! - **Http**: `POST {base_url}/sessions` on the yogaflow API
//! - **Memory**: keeps summaries in process (offline mode, tests)
//! - **Log**: writes summaries to the tracing log only

mod http;
mod memory;
mod traits;

pub use http::HttpSessionRecorder;
pub use memory::{LogRecorder, MemoryRecorder};
pub use traits::{SessionRecorder, SessionSummary};
