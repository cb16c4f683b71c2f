//! Poses and Sequences
//!
//! The immutable practice content the engine walks through. A [`Sequence`]
//! is fetched once from a [`SequenceSource`](crate::source::SequenceSource)
//! and never mutated afterwards; the engine only ever reads from it.
//!
//! # Wire Format
//!
//! The sequence API speaks camelCase JSON:
//!
//! ```json
//! {
//!   "id": "sun-salutation",
//!   "name": "Sun Salutation A",
//!   "poses": [
//!     {
//!       "name": "Mountain Pose",
//!       "sanskritName": "Tadasana",
//!       "imageRef": "poses/mountain.png",
//!       "instructions": "Stand tall...",
//!       "durationSeconds": 30
//!     }
//!   ]
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a sequence in the library
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceId(pub String);

impl SequenceId {
    /// Create a sequence ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SequenceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Reasons a sequence cannot be played
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// The sequence has no poses
    #[error("sequence '{0}' has no poses")]
    Empty(SequenceId),

    /// A pose has a zero hold duration
    #[error("pose {index} ('{name}') has a zero duration")]
    ZeroDuration {
        /// Position of the pose in the sequence
        index: usize,
        /// Pose name
        name: String,
    },
}

/// One held position in a sequence
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pose {
    /// English name
    pub name: String,
    /// Sanskrit name (may be empty)
    #[serde(default)]
    pub sanskrit_name: String,
    /// Image reference (URL or asset path)
    #[serde(default)]
    pub image_ref: String,
    /// Cueing instructions shown while holding the pose
    #[serde(default)]
    pub instructions: String,
    /// Hold duration in seconds (always > 0 in a valid sequence)
    pub duration_seconds: u32,
}

impl Pose {
    /// Create a pose with a name and hold duration
    pub fn new(name: impl Into<String>, duration_seconds: u32) -> Self {
        Self {
            name: name.into(),
            sanskrit_name: String::new(),
            image_ref: String::new(),
            instructions: String::new(),
            duration_seconds,
        }
    }

    /// Set the sanskrit name
    #[must_use]
    pub fn with_sanskrit(mut self, sanskrit_name: impl Into<String>) -> Self {
        self.sanskrit_name = sanskrit_name.into();
        self
    }

    /// Set the image reference
    #[must_use]
    pub fn with_image(mut self, image_ref: impl Into<String>) -> Self {
        self.image_ref = image_ref.into();
        self
    }

    /// Set the instructions
    #[must_use]
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }
}

/// Difficulty level shown in the library
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Suitable for first-timers
    #[default]
    Beginner,
    /// Some practice assumed
    Intermediate,
    /// Strong, experienced practitioners
    Advanced,
}

/// Wire shape of a sequence before validation
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceRecord {
    /// Sequence identifier
    pub id: SequenceId,
    /// Display name
    pub name: String,
    /// Library description
    #[serde(default)]
    pub description: Option<String>,
    /// Difficulty level
    #[serde(default)]
    pub level: Level,
    /// Poses in order
    pub poses: Vec<Pose>,
}

/// An ordered, validated list of poses
///
/// Construction enforces at least one pose and a non-zero duration for every
/// pose, so the engine never has to handle an empty traversal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "SequenceRecord")]
pub struct Sequence {
    id: SequenceId,
    name: String,
    description: Option<String>,
    level: Level,
    poses: Vec<Pose>,
}

impl TryFrom<SequenceRecord> for Sequence {
    type Error = SequenceError;

    fn try_from(raw: SequenceRecord) -> Result<Self, Self::Error> {
        Ok(Self::new(raw.id, raw.name, raw.poses)?
            .with_level(raw.level)
            .with_description(raw.description))
    }
}

impl Sequence {
    /// Create a sequence, validating its poses
    ///
    /// # Errors
    ///
    /// Returns [`SequenceError::Empty`] for an empty pose list and
    /// [`SequenceError::ZeroDuration`] for any pose held for zero seconds.
    pub fn new(
        id: SequenceId,
        name: impl Into<String>,
        poses: Vec<Pose>,
    ) -> Result<Self, SequenceError> {
        if poses.is_empty() {
            return Err(SequenceError::Empty(id));
        }
        if let Some((index, pose)) = poses
            .iter()
            .enumerate()
            .find(|(_, p)| p.duration_seconds == 0)
        {
            return Err(SequenceError::ZeroDuration {
                index,
                name: pose.name.clone(),
            });
        }

        Ok(Self {
            id,
            name: name.into(),
            description: None,
            level: Level::default(),
            poses,
        })
    }

    /// Set the difficulty level
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Attach a library description
    #[must_use]
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Sequence identifier
    #[must_use]
    pub fn id(&self) -> &SequenceId {
        &self.id
    }

    /// Display name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Library description, if any
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Difficulty level
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// All poses in order
    #[must_use]
    pub fn poses(&self) -> &[Pose] {
        &self.poses
    }

    /// Pose at `index`, if in range
    #[must_use]
    pub fn pose(&self, index: usize) -> Option<&Pose> {
        self.poses.get(index)
    }

    /// Number of poses (always ≥ 1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Always false; kept for API symmetry with `len`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Index of the final pose
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.poses.len() - 1
    }

    /// Sum of all pose durations
    #[must_use]
    pub fn total_duration_seconds(&self) -> u64 {
        self.poses.iter().map(|p| u64::from(p.duration_seconds)).sum()
    }

    /// Seconds contained in the poses before `index`
    #[must_use]
    pub fn seconds_before(&self, index: usize) -> u64 {
        self.poses
            .iter()
            .take(index)
            .map(|p| u64::from(p.duration_seconds))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_poses() -> Vec<Pose> {
        vec![
            Pose::new("Mountain", 60),
            Pose::new("Forward Fold", 90),
            Pose::new("Child's Pose", 120),
        ]
    }

    #[test]
    fn test_total_duration() {
        let seq = Sequence::new("flow".into(), "Flow", three_poses()).unwrap();
        assert_eq!(seq.total_duration_seconds(), 270);
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.last_index(), 2);
        assert_eq!(seq.seconds_before(2), 150);
    }

    #[test]
    fn test_empty_sequence_rejected() {
        let err = Sequence::new("empty".into(), "Empty", Vec::new()).unwrap_err();
        assert_eq!(err, SequenceError::Empty("empty".into()));
    }

    #[test]
    fn test_zero_duration_rejected() {
        let poses = vec![Pose::new("Mountain", 30), Pose::new("Broken", 0)];
        let err = Sequence::new("bad".into(), "Bad", poses).unwrap_err();
        assert!(matches!(err, SequenceError::ZeroDuration { index: 1, .. }));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "id": "sun",
            "name": "Sun Salutation",
            "level": "intermediate",
            "poses": [
                {"name": "Mountain Pose", "sanskritName": "Tadasana",
                 "imageRef": "mountain.png", "instructions": "Stand tall",
                 "durationSeconds": 30}
            ]
        }"#;
        let seq: Sequence = serde_json::from_str(json).unwrap();
        assert_eq!(seq.id().as_str(), "sun");
        assert_eq!(seq.level(), Level::Intermediate);
        assert_eq!(seq.poses()[0].sanskrit_name, "Tadasana");
        assert_eq!(seq.poses()[0].duration_seconds, 30);
    }

    #[test]
    fn test_deserialize_rejects_empty_poses() {
        let json = r#"{"id": "x", "name": "X", "poses": []}"#;
        assert!(serde_json::from_str::<Sequence>(json).is_err());
    }
}
