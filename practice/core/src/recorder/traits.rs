//! Session Recorder Traits

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sequence::{Sequence, SequenceId};

/// Summary of a naturally completed practice
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Which sequence was practised
    pub sequence_id: SequenceId,
    /// Total scheduled time, rounded to the nearest minute
    pub duration_minutes: u32,
    /// Number of poses in the completed sequence
    pub poses_completed: u32,
    /// When the final pose expired
    pub completed_at: DateTime<Utc>,
}

impl SessionSummary {
    /// Summarise a completed sequence
    ///
    /// The duration is the scheduled total (sum of pose durations), not the
    /// wall time spent, so pauses do not inflate it.
    #[must_use]
    pub fn for_sequence(sequence: &Sequence, completed_at: DateTime<Utc>) -> Self {
        let minutes = (sequence.total_duration_seconds() + 30) / 60;
        Self {
            sequence_id: sequence.id().clone(),
            duration_minutes: u32::try_from(minutes).unwrap_or(u32::MAX),
            poses_completed: u32::try_from(sequence.len()).unwrap_or(u32::MAX),
            completed_at,
        }
    }
}

/// Receiver of completed-session summaries
#[async_trait]
pub trait SessionRecorder: Send + Sync {
    /// Recorder name for logs
    fn name(&self) -> &str;

    /// Persist a summary
    ///
    /// Errors are logged by the caller and never retried.
    async fn save(&self, summary: SessionSummary) -> anyhow::Result<()>;
}

#[async_trait]
impl<R: SessionRecorder + ?Sized> SessionRecorder for Arc<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn save(&self, summary: SessionSummary) -> anyhow::Result<()> {
        (**self).save(summary).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::Pose;

    fn sequence(durations: &[u32]) -> Sequence {
        let poses = durations
            .iter()
            .enumerate()
            .map(|(i, d)| Pose::new(format!("Pose {i}"), *d))
            .collect();
        Sequence::new("test".into(), "Test", poses).unwrap()
    }

    #[test]
    fn test_summary_rounds_half_minutes_up() {
        let summary = SessionSummary::for_sequence(&sequence(&[60, 90, 120]), Utc::now());
        assert_eq!(summary.duration_minutes, 5);
        assert_eq!(summary.poses_completed, 3);
    }

    #[test]
    fn test_summary_rounds_down_below_half() {
        let summary = SessionSummary::for_sequence(&sequence(&[60, 29]), Utc::now());
        assert_eq!(summary.duration_minutes, 1);
    }

    #[test]
    fn test_summary_short_practice_is_zero_minutes() {
        let summary = SessionSummary::for_sequence(&sequence(&[20]), Utc::now());
        assert_eq!(summary.duration_minutes, 0);
        assert_eq!(summary.poses_completed, 1);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = SessionSummary::for_sequence(&sequence(&[60]), Utc::now());
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["durationMinutes"], 1);
        assert_eq!(json["posesCompleted"], 1);
        assert_eq!(json["sequenceId"], "test");
        assert!(json["completedAt"].is_string());
    }
}
