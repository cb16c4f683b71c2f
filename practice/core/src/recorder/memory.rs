//! In-process Recorders

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::traits::{SessionRecorder, SessionSummary};

/// Recorder that keeps summaries in memory
///
/// Clones share storage, so a surface can hold one handle while the engine
/// owns another.
#[derive(Clone, Debug, Default)]
pub struct MemoryRecorder {
    saved: Arc<Mutex<Vec<SessionSummary>>>,
    attempts: Arc<Mutex<usize>>,
    fail: bool,
}

impl MemoryRecorder {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a recorder whose saves always fail (an unreachable backend)
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Summaries saved so far
    #[must_use]
    pub fn saved(&self) -> Vec<SessionSummary> {
        self.saved.lock().clone()
    }

    /// Number of save calls, successful or not
    #[must_use]
    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }
}

#[async_trait]
impl SessionRecorder for MemoryRecorder {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn save(&self, summary: SessionSummary) -> anyhow::Result<()> {
        *self.attempts.lock() += 1;
        if self.fail {
            anyhow::bail!("session store unavailable");
        }
        self.saved.lock().push(summary);
        Ok(())
    }
}

/// Recorder that only logs
#[derive(Clone, Copy, Debug, Default)]
pub struct LogRecorder;

#[async_trait]
impl SessionRecorder for LogRecorder {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn save(&self, summary: SessionSummary) -> anyhow::Result<()> {
        tracing::info!(
            sequence_id = %summary.sequence_id,
            duration_minutes = summary.duration_minutes,
            poses_completed = summary.poses_completed,
            completed_at = %summary.completed_at,
            "Practice completed"
        );
        Ok(())
    }
}
